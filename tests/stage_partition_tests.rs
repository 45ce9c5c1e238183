use proptest::prelude::*;

use spc_chart::core::DataPoint;
use spc_chart::stats::partition_stages;

fn numeric_points(ys: &[f64]) -> Vec<DataPoint> {
    ys.iter()
        .enumerate()
        .map(|(i, &y)| DataPoint::new(i as f64, y))
        .collect()
}

#[test]
fn unlabeled_series_forms_one_stage() {
    let points = numeric_points(&[4.0, 6.0, 5.0, 9.0]);
    let stages = partition_stages(&points, None);

    assert_eq!(stages.len(), 1);
    let stage = &stages[0];
    assert_eq!(stage.first_id, 0);
    assert_eq!(stage.last_id, 3);
    assert_eq!(stage.count, 4);
    assert_eq!(stage.label, "");
    assert!((stage.mean - 6.0).abs() <= 1e-12);
    assert_eq!(stage.start_x, 0.0);
    assert_eq!(stage.end_x, 3.0);
    assert_eq!(stage.divider_x, 3.0);
}

#[test]
fn label_change_splits_at_boundary() {
    let points = numeric_points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let labels: Vec<String> = ["A", "A", "B", "B", "B"]
        .iter()
        .map(ToString::to_string)
        .collect();

    let stages = partition_stages(&points, Some(&labels));
    assert_eq!(stages.len(), 2);

    let first = &stages[0];
    assert_eq!((first.first_id, first.last_id), (0, 1));
    assert_eq!(first.count, 2);
    assert_eq!(first.label, "A");
    assert!((first.mean - 1.5).abs() <= 1e-12);
    assert_eq!(first.end_x, 1.0);
    // Divider sits halfway between the closing point and the opener of "B".
    assert!((first.divider_x - 1.5).abs() <= 1e-12);

    let second = &stages[1];
    assert_eq!((second.first_id, second.last_id), (2, 4));
    assert_eq!(second.count, 3);
    assert_eq!(second.label, "B");
    assert!((second.mean - 4.0).abs() <= 1e-12);
    assert_eq!(second.end_x, 4.0);
    assert_eq!(second.divider_x, 4.0);
}

#[test]
fn single_point_series_yields_one_stage() {
    let points = numeric_points(&[42.5]);
    let stages = partition_stages(&points, None);

    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].count, 1);
    assert!((stages[0].mean - 42.5).abs() <= 1e-12);
    assert_eq!(stages[0].start_x, stages[0].end_x);
}

#[test]
fn empty_series_yields_no_stages() {
    assert!(partition_stages(&[], None).is_empty());
}

#[test]
fn divider_midpoint_uses_timestamp_average() {
    // Unevenly spaced date axis (unix seconds): boundary is the raw average.
    let points = vec![
        DataPoint::new(1_700_000_000.0, 1.0),
        DataPoint::new(1_700_000_100.0, 2.0),
        DataPoint::new(1_700_000_500.0, 3.0),
    ];
    let labels: Vec<String> = ["A", "A", "B"].iter().map(ToString::to_string).collect();

    let stages = partition_stages(&points, Some(&labels));
    assert_eq!(stages.len(), 2);
    assert!((stages[0].divider_x - 1_700_000_300.0).abs() <= 1e-9);
}

#[test]
fn missing_label_entries_read_as_empty() {
    // A short label series falls back to "" past its end, splitting there.
    let points = numeric_points(&[1.0, 2.0, 3.0]);
    let labels: Vec<String> = vec!["A".to_owned(), "A".to_owned()];

    let stages = partition_stages(&points, Some(&labels));
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].label, "A");
    assert_eq!(stages[1].label, "");
}

proptest! {
    #[test]
    fn stages_cover_series_without_gaps_or_overlaps(
        ys in proptest::collection::vec(-1.0e6_f64..1.0e6, 1..80),
        label_ids in proptest::collection::vec(0_u8..4, 1..80),
    ) {
        let points = numeric_points(&ys);
        let labels: Vec<String> = (0..points.len())
            .map(|i| format!("S{}", label_ids[i % label_ids.len()]))
            .collect();

        let stages = partition_stages(&points, Some(&labels));

        let mut next_expected = 0_usize;
        for stage in &stages {
            prop_assert_eq!(stage.first_id, next_expected);
            prop_assert!(stage.last_id >= stage.first_id);
            prop_assert_eq!(stage.count, stage.last_id - stage.first_id + 1);

            let span = &ys[stage.first_id..=stage.last_id];
            let mean = span.iter().sum::<f64>() / span.len() as f64;
            prop_assert!((stage.mean - mean).abs() <= 1e-6);

            next_expected = stage.last_id + 1;
        }
        prop_assert_eq!(next_expected, points.len());
    }
}
