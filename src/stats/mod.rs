//! The statistical core: stage partitioning, moving-range control limits,
//! and the out-of-control detection rules.

pub mod limits;
pub mod rules;
pub mod stage;

pub use limits::{
    ChartSegment, DividerMark, MOVING_RANGE_MAX, MOVING_RANGE_MIN, SegmentFamilies,
    apply_control_limits, d2, limit_segments,
};
pub use rules::{
    MEAN_RUN_THRESHOLD, RuleKind, RuleToggles, TREND_RUN_THRESHOLD, detect_violations,
};
pub use stage::{Stage, partition_stages};
