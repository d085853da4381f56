use rvsrg_scoring::logic::ScoreError;
use rvsrg_scoring::logic::SimulationError;
use rvsrg_scoring::{
    HitEvent, HitObject, Judgement, KeyPressType, MapInfo, Mods, RatingProcessor, ReplayData,
    ReplayEngine, ScoreProcessor, ScoringConfig, TimingWindows,
};

fn quaver_config() -> ScoringConfig {
    ScoringConfig::with_windows(TimingWindows::from_custom(
        18.0, 43.0, 76.0, 106.0, 127.0, 164.0,
    ))
}

fn taps(count: i32) -> MapInfo {
    MapInfo::new(
        (0..count)
            .map(|i| HitObject::tap(1000 + i * 250, (i % 4) as u8))
            .collect(),
        4,
    )
}

#[test]
fn judgement_and_combo_sequence() {
    let mut processor = ScoreProcessor::new(4, quaver_config(), Mods::NONE);

    let results: Vec<(Judgement, u32)> = [5, -20, 200, 0]
        .into_iter()
        .map(|diff| {
            let judgement = processor
                .calculate_score_for_hit(diff, KeyPressType::Press)
                .unwrap();
            (judgement, processor.combo())
        })
        .collect();

    assert_eq!(
        results,
        vec![
            (Judgement::Marv, 1),
            (Judgement::Perf, 2),
            (Judgement::Miss, 0),
            (Judgement::Marv, 1),
        ]
    );
    assert_eq!(processor.max_combo(), 2);
}

#[test]
fn early_stop_synthesizes_remaining_marvs() {
    let map = taps(10);
    let engine = ReplayEngine::new(&map, quaver_config(), Mods::NONE, 20.0);

    let events: Vec<HitEvent> = map.hit_objects[..6]
        .iter()
        .map(|h| HitEvent::press(h.start_time, 0))
        .collect();
    let result = engine.simulate(&events).unwrap();

    assert_eq!(result.snapshot.counts.total(), 6);
    assert_eq!(result.max_possible.len(), 4);

    let best = result.max_possible_snapshot.unwrap();
    assert_eq!(best.counts.marv, 10);
    assert_eq!(best.counts.total(), map.total_judgement_count());

    let last = result.max_possible.last().unwrap();
    assert_eq!(last.accuracy, 100.0);
    assert_eq!(last.rating, engine.rating_processor().max_rating());
}

#[test]
fn early_stop_after_mistake_never_reaches_100() {
    let map = taps(10);
    let engine = ReplayEngine::new(&map, quaver_config(), Mods::NONE, 20.0);

    let mut events: Vec<HitEvent> = map.hit_objects[..5]
        .iter()
        .map(|h| HitEvent::press(h.start_time, 0))
        .collect();
    events.push(HitEvent::press(map.hit_objects[5].start_time, 60));

    let result = engine.simulate(&events).unwrap();
    let last = result.max_possible.last().unwrap();
    assert_eq!(result.max_possible.len(), 4);
    assert!(last.accuracy < 100.0);
    assert!(last.accuracy > result.snapshot.accuracy);
}

#[test]
fn rating_ceiling_scales_with_difficulty() {
    assert!(
        RatingProcessor::new(20.0).calculate_rating(100.0)
            > RatingProcessor::new(10.0).calculate_rating(100.0)
    );
}

#[test]
fn repeated_simulations_are_identical() {
    let map = MapInfo::new(
        (0..40)
            .map(|i| {
                if i % 5 == 0 {
                    HitObject::long_note(1000 + i * 200, 1100 + i * 200, (i % 4) as u8)
                } else {
                    HitObject::tap(1000 + i * 200, (i % 4) as u8)
                }
            })
            .collect(),
        4,
    );

    let mut replay = ReplayData::new(Mods::NO_FAIL);
    for (i, object) in map.hit_objects.iter().enumerate() {
        let offset = ((i as i32 * 37) % 150) - 75;
        replay.push(HitEvent::press(object.start_time + offset.max(0), offset));
        if let Some(end) = object.end_time {
            replay.push(HitEvent::release(end + 10, offset * 2));
        }
    }
    // Offsets above can push a release past the next press.
    replay.events.sort_by_key(|e| e.song_position);

    let config = ScoringConfig::default();
    let engine = ReplayEngine::for_replay(&map, &replay, config, 31.5);

    let first = engine.simulate(&replay.events).unwrap();
    let second = engine.simulate(&replay.events).unwrap();
    assert_eq!(first, second);

    let bits = |r: &rvsrg_scoring::SimulationResult| -> Vec<u64> {
        r.rating.points().iter().map(|p| p.rating.to_bits()).collect()
    };
    assert_eq!(bits(&first), bits(&second));
    assert!(first.health.points().iter().all(|p| (0.0..=100.0).contains(&p.health)));
    assert!(first.rating.points().iter().all(|p| (0.0..=100.0).contains(&p.accuracy)));
}

#[test]
fn unmatched_release_counts_as_miss() {
    let map = MapInfo::new(vec![HitObject::long_note(1000, 2000, 0)], 4);
    let engine = ReplayEngine::new(&map, ScoringConfig::default(), Mods::NONE, 10.0);

    let events = [HitEvent::press(1000, 0), HitEvent::release(2500, 500)];
    let result = engine.simulate(&events).unwrap();

    assert_eq!(result.snapshot.counts.marv, 1);
    assert_eq!(result.snapshot.counts.miss, 1);
    assert_eq!(result.snapshot.counts.get(Judgement::Ghost), 0);
    assert_eq!(result.snapshot.combo, 0);
}

#[test]
fn feeding_past_the_map_total_is_an_error() {
    let map = taps(2);
    let engine = ReplayEngine::new(&map, ScoringConfig::default(), Mods::NONE, 10.0);
    let events = [
        HitEvent::press(1000, 0),
        HitEvent::press(1250, 0),
        HitEvent::press(1250, 0),
    ];

    assert_eq!(
        engine.simulate(&events),
        Err(SimulationError::Score(ScoreError::JudgementOverflow {
            total: 2
        }))
    );
}

#[test]
fn scoreboard_processor_at_time() {
    let map = taps(8);
    let engine = ReplayEngine::new(&map, ScoringConfig::default(), Mods::NONE, 10.0);
    let events: Vec<HitEvent> = map
        .hit_objects
        .iter()
        .map(|h| HitEvent::press(h.start_time, 50))
        .collect();

    let halfway = engine.processor_at(&events, 1750).unwrap();
    assert_eq!(halfway.processed_judgement_count(), 4);
    assert_eq!(halfway.counts().great, 4);
    assert_eq!(halfway.remaining_judgement_count(), 4);
}
