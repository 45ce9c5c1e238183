use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::core::{CategoryScale, ScaleTuning, ValueScale, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer};
use crate::stats::{
    RuleKind, SegmentFamilies, Stage, apply_control_limits, detect_violations, limit_segments,
    partition_stages,
};

pub mod frame_builder;
pub mod hover;
pub mod schema;
pub mod view_model;

pub use frame_builder::{PlotArea, build_frame, plot_area};
pub use hover::{HoverSample, resolve_hover};
pub use schema::{PropertyDescriptor, PropertyRange, PropertySchema, property_schema};
pub use view_model::{
    AxisStyle, ChartViewModel, EmptyReason, LineStyle, ViewModelOutcome, build_view_model,
};

use view_model::ViewModelOutcome::{Empty, Ready};

/// Everything computed for one chart update, owned for the duration of
/// that update and discarded afterward. No state carries over between
/// updates; the next host event rebuilds the context from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateContext {
    pub view_model: ChartViewModel,
    pub stages: Vec<Stage>,
    pub segments: SegmentFamilies,
    pub highlights: BTreeMap<usize, RuleKind>,
    pub mr_error: bool,
    pub x_scale: CategoryScale,
    pub y_scale: ValueScale,
}

/// Runs the statistical pipeline over a built view model: partition into
/// stages, compute control limits, emit segment families, apply detection
/// rules, and fit both axis scales.
pub fn prepare_update(view_model: ChartViewModel) -> ChartResult<UpdateContext> {
    let mut stages = partition_stages(&view_model.points, view_model.labels.as_deref());
    let mr_error = apply_control_limits(
        &mut stages,
        &view_model.points,
        view_model.moving_range,
        view_model.num_sds,
    );
    let segments = limit_segments(&stages);
    let highlights = detect_violations(&stages, &view_model.points, view_model.rules);

    let x_scale = CategoryScale::from_points(&view_model.points, ScaleTuning::default())?;
    let overlay: Vec<f64> = stages
        .iter()
        .flat_map(|stage| [Some(stage.mean), stage.ucl, stage.lcl])
        .flatten()
        .collect();
    let y_scale = ValueScale::from_chart_data(&view_model.points, &overlay, ScaleTuning::default())?;

    debug!(
        points = view_model.points.len(),
        stages = stages.len(),
        flagged = highlights.len(),
        mr_error,
        "prepared chart update"
    );

    Ok(UpdateContext {
        view_model,
        stages,
        segments,
        highlights,
        mr_error,
        x_scale,
        y_scale,
    })
}

/// Outcome report for one engine update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSummary {
    pub stage_count: usize,
    pub flagged_point_count: usize,
    pub mr_warning: bool,
    /// Present when the chart degraded to an empty rendering.
    pub empty_reason: Option<EmptyReason>,
}

impl UpdateSummary {
    fn empty(reason: EmptyReason) -> Self {
        Self {
            stage_count: 0,
            flagged_point_count: 0,
            mr_warning: false,
            empty_reason: Some(reason),
        }
    }
}

/// The embeddable chart engine: one instance per chart surface.
///
/// Each `update` call is a full, independent recomputation from the host's
/// current data/settings snapshot. Malformed input degrades to an empty
/// frame; the host never sees an error for bad data, only for a broken
/// contract (an unusable viewport or a failing renderer).
pub struct ChartEngine<R: Renderer> {
    renderer: R,
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn update(
        &mut self,
        data: &crate::host::DataView,
        settings: &crate::host::SettingsBag,
        viewport: Viewport,
    ) -> ChartResult<UpdateSummary> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let view_model = match build_view_model(data, settings) {
            Ready(model) => model,
            Empty(reason) => {
                debug!(?reason, "input unusable; rendering empty chart");
                self.renderer.render(&RenderFrame::new(viewport))?;
                return Ok(UpdateSummary::empty(reason));
            }
        };

        let outcome = prepare_update(view_model)
            .and_then(|ctx| build_frame(&ctx, viewport).map(|frame| (ctx, frame)));
        match outcome {
            Ok((ctx, frame)) => {
                self.renderer.render(&frame)?;
                Ok(UpdateSummary {
                    stage_count: ctx.stages.len(),
                    flagged_point_count: ctx.highlights.len(),
                    mr_warning: ctx.mr_error,
                    empty_reason: None,
                })
            }
            Err(err) => {
                warn!(error = %err, "chart computation failed; rendering empty chart");
                self.renderer.render(&RenderFrame::new(viewport))?;
                Ok(UpdateSummary::empty(EmptyReason::Extraction(
                    err.to_string(),
                )))
            }
        }
    }
}
