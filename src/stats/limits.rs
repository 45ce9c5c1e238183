use tracing::warn;

use crate::core::DataPoint;
use crate::stats::Stage;

/// Smallest accepted moving-range window width.
pub const MOVING_RANGE_MIN: usize = 2;
/// Largest accepted moving-range window width.
pub const MOVING_RANGE_MAX: usize = 50;

// d2 bias-correction constants (mean of the range distribution of a normal
// sample) indexed by window width 1..=50. Index 0 corresponds to width 1.
const D2: [f64; 50] = [
    1.0, 1.128, 1.693, 2.059, 2.326, 2.534, 2.704, 2.847, 2.970, 3.078, //
    3.173, 3.258, 3.336, 3.407, 3.472, 3.532, 3.588, 3.640, 3.689, 3.735, //
    3.778, 3.819, 3.858, 3.895, 3.931, 3.964, 3.997, 4.027, 4.057, 4.086, //
    4.113, 4.139, 4.165, 4.189, 4.213, 4.236, 4.259, 4.280, 4.301, 4.322, //
    4.341, 4.361, 4.379, 4.398, 4.415, 4.433, 4.450, 4.466, 4.482, 4.498,
];

/// Looks up the d2 constant for a moving-range window width.
///
/// Widths of zero or below fall back to 1.0; widths beyond the table use
/// the last tabulated value.
#[must_use]
pub fn d2(window_width: i64) -> f64 {
    if window_width <= 0 {
        return 1.0;
    }
    let index = (window_width as usize).min(D2.len()) - 1;
    D2[index]
}

/// Computes per-stage control limits from the mean moving range.
///
/// Each stage is handled independently. A stage whose population is smaller
/// than the window width is flagged with `mr_error` and keeps `ucl`/`lcl`
/// unset. Returns whether any stage was flagged, for the on-chart warning.
pub fn apply_control_limits(
    stages: &mut [Stage],
    points: &[DataPoint],
    moving_range: usize,
    num_sds: f64,
) -> bool {
    let mut any_flagged = false;

    for stage in stages.iter_mut() {
        if moving_range > stage.count {
            stage.mr_error = true;
            any_flagged = true;
            warn!(
                stage = %stage.label,
                count = stage.count,
                moving_range,
                "moving-range window exceeds stage population; skipping limits"
            );
            continue;
        }

        let mut range_sum = 0.0;
        for j in (stage.first_id + moving_range - 1)..=stage.last_id {
            let window = &points[j + 1 - moving_range..=j];
            let mut lowest = f64::INFINITY;
            let mut highest = f64::NEG_INFINITY;
            for point in window {
                lowest = lowest.min(point.y);
                highest = highest.max(point.y);
            }
            range_sum += highest - lowest;
        }

        let r_bar = range_sum / (stage.count - moving_range + 1) as f64;
        let spread = num_sds * r_bar / d2(moving_range as i64);
        stage.ucl = Some(stage.mean + spread);
        stage.lcl = Some(stage.mean - spread);
    }

    any_flagged
}

/// Line segment in domain coordinates (pre-projection).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl ChartSegment {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Stage boundary marker: the divider position plus the previous boundary,
/// which together bound the span used for stage label placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerMark {
    pub x: f64,
    pub previous_x: f64,
}

/// The per-stage line families consumed by the frame builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentFamilies {
    pub mean: Vec<ChartSegment>,
    pub ucl: Vec<ChartSegment>,
    pub lcl: Vec<ChartSegment>,
    pub dividers: Vec<DividerMark>,
}

/// Emits mean/UCL/LCL segments and divider marks across the stage list.
///
/// Each stage's segments span from the previous stage's divider (or the
/// stage's own start for the first stage) to its own divider. Stages
/// without limits contribute a mean segment but no UCL/LCL segments.
#[must_use]
pub fn limit_segments(stages: &[Stage]) -> SegmentFamilies {
    let mut families = SegmentFamilies::default();
    let mut previous_divider: Option<f64> = None;

    for stage in stages {
        let span_start = previous_divider.unwrap_or(stage.start_x);
        families.mean.push(ChartSegment::new(
            span_start,
            stage.mean,
            stage.divider_x,
            stage.mean,
        ));

        if let (Some(ucl), Some(lcl)) = (stage.ucl, stage.lcl) {
            families
                .ucl
                .push(ChartSegment::new(span_start, ucl, stage.divider_x, ucl));
            families
                .lcl
                .push(ChartSegment::new(span_start, lcl, stage.divider_x, lcl));
        }

        families.dividers.push(DividerMark {
            x: stage.divider_x,
            previous_x: span_start,
        });
        previous_divider = Some(stage.divider_x);
    }

    families
}
