use spc_chart::core::DataPoint;
use spc_chart::stats::{
    RuleKind, RuleToggles, apply_control_limits, detect_violations, partition_stages,
};

fn numeric_points(ys: &[f64]) -> Vec<DataPoint> {
    ys.iter()
        .enumerate()
        .map(|(i, &y)| DataPoint::new(i as f64, y))
        .collect()
}

fn stages_with_limits(
    points: &[DataPoint],
    labels: Option<&[String]>,
    moving_range: usize,
) -> Vec<spc_chart::stats::Stage> {
    let mut stages = partition_stages(points, labels);
    apply_control_limits(&mut stages, points, moving_range, 3.0);
    stages
}

const RULE1_ONLY: RuleToggles = RuleToggles {
    outside_limits: true,
    trend_run: false,
    mean_run: false,
};
const RULE2_ONLY: RuleToggles = RuleToggles {
    outside_limits: false,
    trend_run: true,
    mean_run: false,
};
const RULE3_ONLY: RuleToggles = RuleToggles {
    outside_limits: false,
    trend_run: false,
    mean_run: true,
};

#[test]
fn rule1_flags_points_outside_limits() {
    // Tight process with one wild excursion.
    let ys = [10.0, 10.5, 9.5, 10.0, 60.0, 10.5, 9.5, 10.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    let ucl = stages[0].ucl.expect("ucl");
    assert!(ys[4] > ucl, "excursion should sit above UCL {ucl}");

    let flagged = detect_violations(&stages, &points, RULE1_ONLY);
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged.get(&4), Some(&RuleKind::OutsideLimits));
}

#[test]
fn rule1_skips_stages_without_limits() {
    // Window wider than the population: no limits exist, so nothing flags
    // even though every y differs wildly from zero.
    let points = numeric_points(&[100.0, -100.0]);
    let stages = stages_with_limits(&points, None, 5);
    assert!(stages[0].mr_error);

    let flagged = detect_violations(&stages, &points, RULE1_ONLY);
    assert!(flagged.is_empty());
}

#[test]
fn rule2_requires_run_longer_than_five() {
    // Exactly five strictly increasing points: below the threshold.
    let five = numeric_points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let stages = stages_with_limits(&five, None, 2);
    assert!(detect_violations(&stages, &five, RULE2_ONLY).is_empty());

    // Six strictly increasing points: the whole run flags.
    let six = numeric_points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let stages = stages_with_limits(&six, None, 2);
    let flagged = detect_violations(&stages, &six, RULE2_ONLY);
    assert_eq!(flagged.len(), 6);
    for index in 0..6 {
        assert_eq!(flagged.get(&index), Some(&RuleKind::TrendRun));
    }
}

#[test]
fn rule2_flags_broken_run_and_continues() {
    // Seven rising points, then a drop, then a short rise.
    let ys = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 3.0, 4.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    let flagged = detect_violations(&stages, &points, RULE2_ONLY);
    assert_eq!(flagged.len(), 7);
    assert!(flagged.contains_key(&0));
    assert!(flagged.contains_key(&6));
    assert!(!flagged.contains_key(&7));
    assert!(!flagged.contains_key(&8));
}

#[test]
fn rule2_detects_decreasing_runs() {
    let ys = [9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    let flagged = detect_violations(&stages, &points, RULE2_ONLY);
    assert_eq!(flagged.len(), 7);
}

#[test]
fn rule2_equal_neighbors_break_the_run() {
    // The plateau at index 3 splits what would otherwise be a long run.
    let ys = [1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 6.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    assert!(detect_violations(&stages, &points, RULE2_ONLY).is_empty());
}

#[test]
fn rule2_runs_do_not_cross_stage_boundaries() {
    // Eight rising points, but split 4/4 across two stages.
    let ys = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let points = numeric_points(&ys);
    let labels: Vec<String> = ["A", "A", "A", "A", "B", "B", "B", "B"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let stages = stages_with_limits(&points, Some(&labels), 2);

    assert!(detect_violations(&stages, &points, RULE2_ONLY).is_empty());
}

#[test]
fn rule3_requires_run_longer_than_eight() {
    // Eight points above the mean: not enough.
    let mut ys = vec![10.0; 8];
    ys.extend([1.0, 1.0, 1.0]);
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);
    assert!(detect_violations(&stages, &points, RULE3_ONLY).is_empty());

    // Nine points above the mean: the run flags.
    let mut ys = vec![10.0; 9];
    ys.extend([1.0, 1.0, 1.0]);
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);
    let flagged = detect_violations(&stages, &points, RULE3_ONLY);
    assert_eq!(flagged.len(), 9);
    for index in 0..9 {
        assert_eq!(flagged.get(&index), Some(&RuleKind::MeanRun));
    }
    assert!(!flagged.contains_key(&9));
}

#[test]
fn rule3_detects_runs_below_the_mean() {
    let mut ys = vec![1.0; 9];
    ys.extend([20.0, 20.0, 20.0]);
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    let flagged = detect_violations(&stages, &points, RULE3_ONLY);
    assert_eq!(flagged.len(), 9);
    assert_eq!(flagged.get(&0), Some(&RuleKind::MeanRun));
}

#[test]
fn rule3_points_on_the_mean_break_the_run() {
    // Symmetric series: mean is 5, and the exact-mean points at the center
    // split the above-mean points into short runs.
    let ys = [9.0, 9.0, 9.0, 9.0, 5.0, 9.0, 9.0, 9.0, 9.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);
    let mean = stages[0].mean;
    assert!((mean - 5.0).abs() <= 1e-12);

    let flagged = detect_violations(&stages, &points, RULE3_ONLY);
    // Only the below-mean tail (8 points at 1.0) is a candidate, and at
    // exactly 8 it stays under the threshold.
    assert!(flagged.is_empty());
}

#[test]
fn disabled_toggles_skip_their_scans() {
    let ys = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    assert!(detect_violations(&stages, &points, RuleToggles::none()).is_empty());
    assert!(!detect_violations(&stages, &points, RuleToggles::all()).is_empty());
}

#[test]
fn later_rule_overwrites_earlier_flag() {
    // The spike at index 6 is both beyond the UCL (Rule 1) and the end of a
    // seven-point rising run (Rule 2); Rule 2 runs later so it wins.
    let ys = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
    let points = numeric_points(&ys);
    let stages = stages_with_limits(&points, None, 2);

    let ucl = stages[0].ucl.expect("ucl");
    assert!(ys[6] > ucl);

    let rule1_only = detect_violations(&stages, &points, RULE1_ONLY);
    assert_eq!(rule1_only.get(&6), Some(&RuleKind::OutsideLimits));

    let combined = detect_violations(
        &stages,
        &points,
        RuleToggles {
            outside_limits: true,
            trend_run: true,
            mean_run: false,
        },
    );
    assert_eq!(combined.get(&6), Some(&RuleKind::TrendRun));
    assert_eq!(combined.len(), 7);
}
