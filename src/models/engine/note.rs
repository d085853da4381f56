//! Map hit objects as seen by the scoring core, and loading from .osu files.

use rosu_map::Beatmap;
use rosu_map::section::hit_objects::{HitObject as OsuHitObject, HitObjectKind};
use std::path::Path;

/// A single note of a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitObject {
    /// When the note should be hit (ms).
    pub start_time: i32,
    /// Release time for long notes.
    pub end_time: Option<i32>,
    /// Which column/lane (0-indexed).
    pub lane: u8,
}

impl HitObject {
    pub fn tap(start_time: i32, lane: u8) -> Self {
        Self {
            start_time,
            end_time: None,
            lane,
        }
    }

    pub fn long_note(start_time: i32, end_time: i32, lane: u8) -> Self {
        Self {
            start_time,
            end_time: Some(end_time),
            lane,
        }
    }

    pub fn is_long_note(&self) -> bool {
        self.end_time.is_some()
    }

    /// A long note is judged on press and again on release.
    pub fn judgement_count(&self) -> u32 {
        if self.is_long_note() { 2 } else { 1 }
    }
}

/// Map geometry needed to score a play.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapInfo {
    /// Sorted by start time.
    pub hit_objects: Vec<HitObject>,
    pub key_count: u8,
    pub md5: Option<String>,
}

impl MapInfo {
    pub fn new(mut hit_objects: Vec<HitObject>, key_count: u8) -> Self {
        hit_objects.sort_by_key(|h| h.start_time);
        Self {
            hit_objects,
            key_count,
            md5: None,
        }
    }

    /// Number of scorable actions: presses plus long note releases.
    pub fn total_judgement_count(&self) -> u32 {
        self.hit_objects.iter().map(HitObject::judgement_count).sum()
    }

    /// Objects starting strictly after `time`.
    pub fn objects_after(&self, time: i32) -> &[HitObject] {
        let start = self.hit_objects.partition_point(|h| h.start_time <= time);
        &self.hit_objects[start..]
    }

    /// Every scorable action as `(time, is_release)`: one press per object and
    /// one release per long note end, in time order. Actions sharing a time
    /// keep map order, presses of an object before its release.
    pub fn judgement_actions(&self) -> Vec<(i32, bool)> {
        let mut actions = Vec::with_capacity(self.total_judgement_count() as usize);
        for object in &self.hit_objects {
            actions.push((object.start_time, false));
            if let Some(end_time) = object.end_time {
                actions.push((end_time, true));
            }
        }
        // Long note ends interleave with later presses.
        actions.sort_by_key(|&(time, _)| time);
        actions
    }

    /// Builds map info from a parsed beatmap. Sliders and spinners are skipped.
    pub fn from_beatmap(map: &Beatmap) -> Self {
        let key_count = (map.circle_size.round() as u8).max(1);

        let hit_objects = map
            .hit_objects
            .iter()
            .filter_map(|h| parse_hit_object(h, key_count))
            .collect();

        Self::new(hit_objects, key_count)
    }

    /// Loads map info from a .osu file, tagging it with the file's md5.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let map = Beatmap::from_bytes(&bytes)?;

        let mut info = Self::from_beatmap(&map);
        info.md5 = Some(format!("{:x}", md5::compute(&bytes)));

        log::info!(
            "Loaded {:?}: {} objects, {}K",
            path,
            info.hit_objects.len(),
            info.key_count
        );
        Ok(info)
    }
}

fn parse_hit_object(hit_object: &OsuHitObject, key_count: u8) -> Option<HitObject> {
    let start = hit_object.start_time.round() as i32;

    match &hit_object.kind {
        HitObjectKind::Circle(circle) => {
            let lane = x_to_column(circle.pos.x as i32, key_count)?;
            Some(HitObject::tap(start, lane))
        }
        HitObjectKind::Hold(hold) => {
            let lane = x_to_column(hold.pos_x as i32, key_count)?;
            let end = (hit_object.start_time + hold.duration).round() as i32;
            Some(HitObject::long_note(start, end, lane))
        }
        _ => None,
    }
}

/// Converts an osu!mania x position into a column index.
fn x_to_column(x: i32, key_count: u8) -> Option<u8> {
    let column_width = 512.0 / key_count as f32;
    let col = (x as f32 / column_width).floor() as i32;
    if (0..key_count as i32).contains(&col) {
        Some(col as u8)
    } else {
        log::warn!("Unknown column position: {x}");
        None
    }
}
