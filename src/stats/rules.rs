use std::collections::BTreeMap;

use crate::core::DataPoint;
use crate::stats::Stage;

/// A monotonic run longer than this flags its points (Rule 2).
pub const TREND_RUN_THRESHOLD: usize = 5;
/// A one-side-of-mean run longer than this flags its points (Rule 3).
pub const MEAN_RUN_THRESHOLD: usize = 8;

/// Which detection rule flagged a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Rule 1: the measurement falls outside the stage's control limits.
    OutsideLimits,
    /// Rule 2: the measurement belongs to a long strictly monotonic run.
    TrendRun,
    /// Rule 3: the measurement belongs to a long run on one side of the
    /// stage mean.
    MeanRun,
}

/// Independent enablement toggles for the three detection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleToggles {
    pub outside_limits: bool,
    pub trend_run: bool,
    pub mean_run: bool,
}

impl RuleToggles {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            outside_limits: true,
            trend_run: true,
            mean_run: true,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            outside_limits: false,
            trend_run: false,
            mean_run: false,
        }
    }
}

/// Walks each stage applying the enabled rules and returns the flagged
/// point indices.
///
/// Rules run in order 1, 2, 3 and a later rule overwrites an earlier entry
/// for the same index, so the map records the winning rule per point. Runs
/// never cross stage boundaries; a run still open when its stage ends is
/// closed and tested there.
#[must_use]
pub fn detect_violations(
    stages: &[Stage],
    points: &[DataPoint],
    toggles: RuleToggles,
) -> BTreeMap<usize, RuleKind> {
    let mut flagged = BTreeMap::new();

    if toggles.outside_limits {
        for stage in stages {
            // mr_error stages carry no limits and are skipped outright.
            let (Some(ucl), Some(lcl)) = (stage.ucl, stage.lcl) else {
                continue;
            };
            for index in stage.first_id..=stage.last_id {
                let y = points[index].y;
                if y > ucl || y < lcl {
                    flagged.insert(index, RuleKind::OutsideLimits);
                }
            }
        }
    }

    if toggles.trend_run {
        for stage in stages {
            flag_monotonic_runs(points, stage, Direction::Rising, &mut flagged);
            flag_monotonic_runs(points, stage, Direction::Falling, &mut flagged);
        }
    }

    if toggles.mean_run {
        for stage in stages {
            flag_mean_side_runs(points, stage, Side::Above, &mut flagged);
            flag_mean_side_runs(points, stage, Side::Below, &mut flagged);
        }
    }

    flagged
}

#[derive(Clone, Copy)]
enum Direction {
    Rising,
    Falling,
}

#[derive(Clone, Copy)]
enum Side {
    Above,
    Below,
}

fn flag_monotonic_runs(
    points: &[DataPoint],
    stage: &Stage,
    direction: Direction,
    flagged: &mut BTreeMap<usize, RuleKind>,
) {
    let mut run_start = stage.first_id;
    let mut run_len = 1_usize;

    for index in stage.first_id + 1..=stage.last_id {
        let extends = match direction {
            Direction::Rising => points[index].y > points[index - 1].y,
            Direction::Falling => points[index].y < points[index - 1].y,
        };
        if extends {
            run_len += 1;
            continue;
        }
        close_run(run_start, run_len, TREND_RUN_THRESHOLD, RuleKind::TrendRun, flagged);
        run_start = index;
        run_len = 1;
    }

    close_run(run_start, run_len, TREND_RUN_THRESHOLD, RuleKind::TrendRun, flagged);
}

fn flag_mean_side_runs(
    points: &[DataPoint],
    stage: &Stage,
    side: Side,
    flagged: &mut BTreeMap<usize, RuleKind>,
) {
    let mut run_start: Option<usize> = None;
    let mut run_len = 0_usize;

    for index in stage.first_id..=stage.last_id {
        let on_side = match side {
            Side::Above => points[index].y > stage.mean,
            Side::Below => points[index].y < stage.mean,
        };
        if on_side {
            if run_start.is_none() {
                run_start = Some(index);
            }
            run_len += 1;
            continue;
        }
        if let Some(start) = run_start.take() {
            close_run(start, run_len, MEAN_RUN_THRESHOLD, RuleKind::MeanRun, flagged);
            run_len = 0;
        }
    }

    if let Some(start) = run_start {
        close_run(start, run_len, MEAN_RUN_THRESHOLD, RuleKind::MeanRun, flagged);
    }
}

fn close_run(
    start: usize,
    len: usize,
    threshold: usize,
    kind: RuleKind,
    flagged: &mut BTreeMap<usize, RuleKind>,
) {
    if len <= threshold {
        return;
    }
    for index in start..start + len {
        flagged.insert(index, kind);
    }
}
