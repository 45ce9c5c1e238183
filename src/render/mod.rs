mod frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, LineStrokeStyle, TextHAlign, TextPrimitive,
};

use crate::error::ChartResult;

/// Contract implemented by the host's rendering surface.
///
/// The surface receives a fully materialized, deterministic `RenderFrame`
/// so drawing code stays isolated from the statistical pipeline.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
