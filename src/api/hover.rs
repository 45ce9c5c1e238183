use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::api::UpdateContext;
use crate::api::frame_builder::{plot_area, project_x, project_y};
use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::stats::RuleKind;

/// Resolved hover target: the nearest measurement plus the stage context
/// the host tooltip displays alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSample {
    pub point_index: usize,
    pub x: f64,
    pub y: f64,
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub stage_label: String,
    pub stage_mean: f64,
    pub ucl: Option<f64>,
    pub lcl: Option<f64>,
    pub rule: Option<RuleKind>,
}

/// Finds the measurement nearest to the pointer, within `max_distance_px`.
///
/// Returns `None` when no point is close enough. Deterministic: ties keep
/// the earliest point in series order.
pub fn resolve_hover(
    ctx: &UpdateContext,
    viewport: Viewport,
    pointer_x: f64,
    pointer_y: f64,
    max_distance_px: f64,
) -> ChartResult<Option<HoverSample>> {
    if !pointer_x.is_finite() || !pointer_y.is_finite() {
        return Err(ChartError::InvalidData(
            "pointer coordinates must be finite".to_owned(),
        ));
    }
    if !max_distance_px.is_finite() || max_distance_px <= 0.0 {
        return Err(ChartError::InvalidData(
            "hover distance must be finite and > 0".to_owned(),
        ));
    }

    let plot = plot_area(viewport)?;
    let mut candidates: SmallVec<[(OrderedFloat<f64>, usize, f64, f64); 4]> = SmallVec::new();

    for (index, point) in ctx.view_model.points.iter().enumerate() {
        let px = project_x(ctx, plot, point.x)?;
        let py = project_y(ctx, plot, point.y)?;
        let distance = ((px - pointer_x).powi(2) + (py - pointer_y).powi(2)).sqrt();
        if distance <= max_distance_px {
            candidates.push((OrderedFloat(distance), index, px, py));
        }
    }

    let Some((_, index, pixel_x, pixel_y)) = candidates.into_iter().min_by_key(|c| c.0) else {
        return Ok(None);
    };

    let stage = ctx
        .stages
        .iter()
        .find(|stage| stage.first_id <= index && index <= stage.last_id);
    let point = ctx.view_model.points[index];

    Ok(Some(HoverSample {
        point_index: index,
        x: point.x,
        y: point.y,
        pixel_x,
        pixel_y,
        stage_label: stage.map(|s| s.label.clone()).unwrap_or_default(),
        stage_mean: stage.map(|s| s.mean).unwrap_or(f64::NAN),
        ucl: stage.and_then(|s| s.ucl),
        lcl: stage.and_then(|s| s.lcl),
        rule: ctx.highlights.get(&index).copied(),
    }))
}
