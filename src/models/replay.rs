//! Serializable replay structures.
//!
//! A replay is the ordered list of scored actions of one play. Every score,
//! health and rating series can be rebuilt from it together with the map,
//! the mods and the scoring configuration.

use crate::models::engine::hit_window::TimingWindows;
use crate::models::settings::Mods;
use crate::models::stats::{Judgement, KeyPressType};
use serde::{Deserialize, Serialize};

/// Current replay format version for compatibility.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// One scored action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEvent {
    /// Position in the track when the hit was recorded (ms).
    pub song_position: i32,
    /// Actual minus expected time (ms): negative = early, positive = late.
    pub hit_difference: i32,
    pub key_press_type: KeyPressType,
    /// Pre-assigned judgement. When absent it is derived from `hit_difference`.
    #[serde(default)]
    pub judgement: Option<Judgement>,
}

impl HitEvent {
    pub fn press(song_position: i32, hit_difference: i32) -> Self {
        Self {
            song_position,
            hit_difference,
            key_press_type: KeyPressType::Press,
            judgement: None,
        }
    }

    pub fn release(song_position: i32, hit_difference: i32) -> Self {
        Self {
            song_position,
            hit_difference,
            key_press_type: KeyPressType::Release,
            judgement: None,
        }
    }

    /// A note that passed without any key event. The offset is the miss window.
    pub fn miss(song_position: i32, windows: &TimingWindows) -> Self {
        Self {
            song_position,
            hit_difference: windows.miss_ms.round() as i32,
            key_press_type: KeyPressType::None,
            judgement: Some(Judgement::Miss),
        }
    }

    /// Same event with an explicit judgement that bypasses classification.
    pub fn with_judgement(mut self, judgement: Judgement) -> Self {
        self.judgement = Some(judgement);
        self
    }

    pub fn is_release(&self) -> bool {
        self.key_press_type == KeyPressType::Release
    }
}

/// Recorded play: the scored actions plus what is needed to rescore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    /// Format version for future compatibility.
    pub version: u8,
    /// md5 of the map file the replay was recorded on.
    #[serde(default)]
    pub map_md5: Option<String>,
    pub mods: Mods,
    /// Scored actions in chronological order.
    pub events: Vec<HitEvent>,
}

impl Default for ReplayData {
    fn default() -> Self {
        Self::new(Mods::NONE)
    }
}

impl ReplayData {
    pub fn new(mods: Mods) -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            map_md5: None,
            mods,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: HitEvent) {
        self.events.push(event);
    }

    /// True when song positions never go backwards.
    pub fn is_time_ordered(&self) -> bool {
        first_out_of_order(&self.events).is_none()
    }

    /// Hex md5 of the binary payload, used as the storage key.
    pub fn hash(&self) -> Result<String, bincode::error::EncodeError> {
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())?;
        Ok(format!("{:x}", md5::compute(bytes)))
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Index of the first event whose song position is earlier than its predecessor's.
pub fn first_out_of_order(events: &[HitEvent]) -> Option<usize> {
    events
        .windows(2)
        .position(|w| w[1].song_position < w[0].song_position)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_detection() {
        let mut replay = ReplayData::new(Mods::NONE);
        replay.push(HitEvent::press(100, 0));
        replay.push(HitEvent::press(100, 3));
        replay.push(HitEvent::press(200, -4));
        assert!(replay.is_time_ordered());

        replay.push(HitEvent::press(150, 0));
        assert!(!replay.is_time_ordered());
        assert_eq!(first_out_of_order(&replay.events), Some(3));
    }

    #[test]
    fn test_miss_event() {
        let event = HitEvent::miss(500, &TimingWindows::standard());
        assert_eq!(event.key_press_type, KeyPressType::None);
        assert_eq!(event.judgement, Some(Judgement::Miss));
        assert_eq!(event.hit_difference, 164);
    }

    #[test]
    fn test_json_keeps_events() {
        let mut replay = ReplayData::new(Mods::NO_FAIL);
        replay.map_md5 = Some("abc".to_string());
        replay.push(HitEvent::press(10, -5));
        replay.push(HitEvent::release(90, 12));

        let json = replay.to_json().unwrap();
        assert_eq!(ReplayData::from_json(&json).unwrap(), replay);
    }

    #[test]
    fn test_hash_depends_on_events() {
        let mut a = ReplayData::new(Mods::NONE);
        a.push(HitEvent::press(10, 0));
        let mut b = a.clone();
        b.push(HitEvent::press(20, 0));
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
        assert_eq!(a.hash().unwrap(), a.clone().hash().unwrap());
    }
}
