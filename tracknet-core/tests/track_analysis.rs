use tracknet_core::prelude::*;

/// 1 Hz walk along x: slow (1 m/s) for 10 s, fast (5 m/s) for 10 s, slow again
fn walk() -> Track {
    let mut x = 0.0;
    let mut observations = Vec::new();
    for t in 0..30 {
        let step = if (10..20).contains(&t) { 5.0 } else { 1.0 };
        if t > 0 {
            x += step;
        }
        observations.push(Observation::new(
            Position::planar(x, 0.0),
            timestamp_from_secs(f64::from(t)),
        ));
    }
    Track::with_observations("walk", observations)
}

#[test]
fn segment_then_split_covers_the_track() {
    let mut track = walk();
    track.compute_speed();
    segment(&mut track, &[SPEED], &[2.0], ComparisonMode::And, "fast").unwrap();

    let marks = track.feature("fast").unwrap();
    assert_eq!(marks.iter().filter(|&&m| m == 1.0).count(), 10);

    let pieces = split(&track, "fast").unwrap();
    assert_eq!(pieces.total_size(), track.size());
    let first = pieces.get(0).unwrap();
    assert_eq!(first.id(), "walk.0");
    assert_eq!(first.size(), 11);
    assert!(pieces.iter().all(|piece| piece.has_feature("fast")));

    let joined: Vec<Observation> = pieces
        .iter()
        .flat_map(|piece| piece.observations().iter().copied())
        .collect();
    assert_eq!(joined, track.observations());
    let joined_marks: Vec<f64> = pieces
        .iter()
        .flat_map(|piece| piece.feature("fast").unwrap().to_vec())
        .collect();
    assert_eq!(joined_marks, marks);
}

#[test]
fn or_mode_passes_when_any_feature_passes() {
    let mut track = walk();
    track.compute_speed();
    track.compute_abs_curv();
    segment(
        &mut track,
        &[SPEED, ABS_CURV],
        &[2.0, 1000.0],
        ComparisonMode::Or,
        "mark",
    )
    .unwrap();
    assert!(track.feature("mark").unwrap().iter().all(|&m| m == 0.0));
    assert!(split(&track, "mark").unwrap().is_empty());
}

#[test]
fn stops_are_found_and_removed() {
    let mut observations = Vec::new();
    for t in 0..60 {
        let x = match t {
            0..20 => f64::from(t) * 10.0,
            20..40 => 200.0,
            _ => 200.0 + f64::from(t - 39) * 10.0,
        };
        observations.push(Observation::new(
            Position::planar(x, 0.0),
            timestamp_from_secs(f64::from(t)),
        ));
    }
    let track = Track::with_observations("drive", observations);

    let global = find_stops(&track, 3.0, 10.0, StopMode::Global).unwrap();
    assert_eq!(global.len(), 1);
    assert_eq!((global[0].id_ini, global[0].id_end), (20, 39));
    assert_eq!(global[0].position, Position::planar(200.0, 0.0));

    let local = find_stops(&track, 0.5, 10.0, StopMode::Local).unwrap();
    assert_eq!(local.len(), 1);

    let moving = remove_stops(&track, &global);
    assert_eq!(moving.size(), 60 - 18);
    assert!(find_stops(&moving, 0.5, 10.0, StopMode::Local).unwrap().is_empty());

    let summary = global.to_track("stops").unwrap();
    assert_eq!(summary.feature("duration").unwrap(), &[19.0]);
}
