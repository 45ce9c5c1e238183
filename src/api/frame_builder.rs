use chrono::TimeZone;

use crate::api::UpdateContext;
use crate::api::view_model::{AxisStyle, LineStyle};
use crate::core::{AxisKind, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::host::format_trimmed;
use crate::render::{CirclePrimitive, Color, LinePrimitive, RenderFrame, TextHAlign, TextPrimitive};
use crate::stats::ChartSegment;

const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 28.0;
const MARGIN_BOTTOM: f64 = 48.0;

const X_TICK_COUNT: usize = 6;
const Y_TICK_COUNT: usize = 5;
const TICK_MARK_PX: f64 = 4.0;
const AXIS_LINE_WIDTH: f64 = 1.0;

// Neutral stand-in for host color strings that fail to parse; the chart
// keeps rendering rather than degrading over one bad style value.
const FALLBACK_COLOR: Color = Color::rgb(0.4, 0.4, 0.4);

/// Inner drawing region of the viewport, excluding axis margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }
}

/// Computes the plot area for a viewport, rejecting viewports too small to
/// hold the axis margins.
pub fn plot_area(viewport: Viewport) -> ChartResult<PlotArea> {
    let width = f64::from(viewport.width) - MARGIN_LEFT - MARGIN_RIGHT;
    let height = f64::from(viewport.height) - MARGIN_TOP - MARGIN_BOTTOM;
    if !viewport.is_valid() || width <= 0.0 || height <= 0.0 {
        return Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(PlotArea {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        width,
        height,
    })
}

pub(crate) fn project_x(ctx: &UpdateContext, plot: PlotArea, value: f64) -> ChartResult<f64> {
    Ok(plot.left + ctx.x_scale.to_pixel(value, plot.width)?)
}

pub(crate) fn project_y(ctx: &UpdateContext, plot: PlotArea, value: f64) -> ChartResult<f64> {
    Ok(plot.top + ctx.y_scale.to_pixel(value, plot.height)?)
}

/// Materializes the per-update context into a backend-agnostic frame:
/// axes, the measurement trace, control-limit overlays, stage dividers,
/// and rule-highlighted markers.
pub fn build_frame(ctx: &UpdateContext, viewport: Viewport) -> ChartResult<RenderFrame> {
    let plot = plot_area(viewport)?;
    let mut frame = RenderFrame::new(viewport);

    draw_axes(&mut frame, ctx, plot)?;
    draw_segment_family(&mut frame, ctx, plot, &ctx.segments.mean, &ctx.view_model.mean_line)?;
    draw_segment_family(&mut frame, ctx, plot, &ctx.segments.ucl, &ctx.view_model.limit_line)?;
    draw_segment_family(&mut frame, ctx, plot, &ctx.segments.lcl, &ctx.view_model.limit_line)?;
    draw_dividers(&mut frame, ctx, plot)?;
    draw_trend(&mut frame, ctx, plot)?;
    draw_markers(&mut frame, ctx, plot)?;

    if ctx.mr_error {
        frame.push_text(
            TextPrimitive::new(
                "Moving range exceeds a subgroup's population",
                plot.left + 4.0,
                plot.top - 8.0,
                11.0,
                css_or(&ctx.view_model.rule_color),
                TextHAlign::Left,
            )
            .with_font_family(ctx.view_model.x_axis.font_family.clone()),
        );
    }

    Ok(frame)
}

fn draw_axes(frame: &mut RenderFrame, ctx: &UpdateContext, plot: PlotArea) -> ChartResult<()> {
    let x_axis = &ctx.view_model.x_axis;
    let y_axis = &ctx.view_model.y_axis;
    let x_label_color = css_or(&x_axis.label_color);
    let y_label_color = css_or(&y_axis.label_color);

    frame.push_line(LinePrimitive::new(
        plot.left,
        plot.bottom(),
        plot.right(),
        plot.bottom(),
        AXIS_LINE_WIDTH,
        x_label_color,
    ));
    frame.push_line(LinePrimitive::new(
        plot.left,
        plot.top,
        plot.left,
        plot.bottom(),
        AXIS_LINE_WIDTH,
        y_label_color,
    ));

    let (x_start, x_end) = ctx.x_scale.domain();
    for step in 0..X_TICK_COUNT {
        let value = x_start + (x_end - x_start) * step as f64 / (X_TICK_COUNT - 1) as f64;
        let px = project_x(ctx, plot, value)?;
        frame.push_line(LinePrimitive::new(
            px,
            plot.bottom(),
            px,
            plot.bottom() + TICK_MARK_PX,
            AXIS_LINE_WIDTH,
            x_label_color,
        ));
        let label = format_category_label(value, ctx.view_model.axis_kind, &x_axis.format);
        if !label.is_empty() {
            frame.push_text(
                TextPrimitive::new(
                    label,
                    px,
                    plot.bottom() + TICK_MARK_PX + x_axis.label_size,
                    x_axis.label_size,
                    x_label_color,
                    TextHAlign::Center,
                )
                .with_font_family(x_axis.font_family.clone())
                .with_rotation(x_axis.label_rotation),
            );
        }
    }

    let (y_start, y_end) = ctx.y_scale.domain();
    for step in 0..Y_TICK_COUNT {
        let value = y_start + (y_end - y_start) * step as f64 / (Y_TICK_COUNT - 1) as f64;
        let py = project_y(ctx, plot, value)?;
        frame.push_line(LinePrimitive::new(
            plot.left - TICK_MARK_PX,
            py,
            plot.left,
            py,
            AXIS_LINE_WIDTH,
            y_label_color,
        ));
        let label = format_measure_label(value, &y_axis.format);
        if !label.is_empty() {
            frame.push_text(
                TextPrimitive::new(
                    label,
                    plot.left - TICK_MARK_PX - 2.0,
                    py + y_axis.label_size / 3.0,
                    y_axis.label_size,
                    y_label_color,
                    TextHAlign::Right,
                )
                .with_font_family(y_axis.font_family.clone()),
            );
        }
    }

    draw_axis_title(frame, x_axis, plot.left + plot.width / 2.0, plot.bottom() + MARGIN_BOTTOM - 8.0, 0.0);
    draw_axis_title(frame, y_axis, MARGIN_LEFT - 40.0, plot.top + plot.height / 2.0, 270.0);
    Ok(())
}

fn draw_axis_title(frame: &mut RenderFrame, axis: &AxisStyle, x: f64, y: f64, rotation: f64) {
    if axis.title.is_empty() {
        return;
    }
    frame.push_text(
        TextPrimitive::new(
            axis.title.clone(),
            x,
            y,
            axis.title_size,
            css_or(&axis.title_color),
            TextHAlign::Center,
        )
        .with_font_family(axis.font_family.clone())
        .with_rotation(rotation),
    );
}

fn draw_segment_family(
    frame: &mut RenderFrame,
    ctx: &UpdateContext,
    plot: PlotArea,
    segments: &[ChartSegment],
    style: &LineStyle,
) -> ChartResult<()> {
    let color = css_or(&style.color);
    for segment in segments {
        frame.push_line(
            LinePrimitive::new(
                project_x(ctx, plot, segment.x1)?,
                project_y(ctx, plot, segment.y1)?,
                project_x(ctx, plot, segment.x2)?,
                project_y(ctx, plot, segment.y2)?,
                style.width,
                color,
            )
            .with_stroke_style(style.style),
        );
    }
    Ok(())
}

fn draw_dividers(frame: &mut RenderFrame, ctx: &UpdateContext, plot: PlotArea) -> ChartResult<()> {
    let model = &ctx.view_model;
    let divider_color = css_or(&model.divider.color);
    let label_color = css_or(&model.stage_label_color);
    let last = ctx.stages.len().saturating_sub(1);

    for (position, (stage, mark)) in ctx.stages.iter().zip(&ctx.segments.dividers).enumerate() {
        // The final divider coincides with the chart's right edge; only
        // interior boundaries get a line.
        if position < last {
            let px = project_x(ctx, plot, mark.x)?;
            frame.push_line(
                LinePrimitive::new(px, plot.top, px, plot.bottom(), model.divider.width, divider_color)
                    .with_stroke_style(model.divider.style),
            );
        }

        if model.show_stage_labels && !stage.label.is_empty() {
            let center = project_x(ctx, plot, (mark.previous_x + mark.x) / 2.0)?;
            frame.push_text(
                TextPrimitive::new(
                    stage.label.clone(),
                    center,
                    plot.top + model.stage_label_size,
                    model.stage_label_size,
                    label_color,
                    TextHAlign::Center,
                )
                .with_font_family(model.x_axis.font_family.clone()),
            );
        }
    }
    Ok(())
}

fn draw_trend(frame: &mut RenderFrame, ctx: &UpdateContext, plot: PlotArea) -> ChartResult<()> {
    let style = &ctx.view_model.trend;
    let color = css_or(&style.color);
    for pair in ctx.view_model.points.windows(2) {
        frame.push_line(
            LinePrimitive::new(
                project_x(ctx, plot, pair[0].x)?,
                project_y(ctx, plot, pair[0].y)?,
                project_x(ctx, plot, pair[1].x)?,
                project_y(ctx, plot, pair[1].y)?,
                style.width,
                color,
            )
            .with_stroke_style(style.style),
        );
    }
    Ok(())
}

fn draw_markers(frame: &mut RenderFrame, ctx: &UpdateContext, plot: PlotArea) -> ChartResult<()> {
    let model = &ctx.view_model;
    let base_color = css_or(&model.marker_color);
    let rule_color = css_or(&model.rule_color);
    let radius = (model.marker_size / 2.0).max(0.5);

    for (index, point) in model.points.iter().enumerate() {
        let color = if ctx.highlights.contains_key(&index) {
            rule_color
        } else {
            base_color
        };
        frame.push_circle(CirclePrimitive::new(
            project_x(ctx, plot, point.x)?,
            project_y(ctx, plot, point.y)?,
            radius,
            color,
        ));
    }
    Ok(())
}

fn css_or(text: &str) -> Color {
    Color::from_css_str(text).unwrap_or(FALLBACK_COLOR)
}

fn format_category_label(value: f64, kind: AxisKind, format: &str) -> String {
    match kind {
        AxisKind::Date => {
            let pattern = if format.is_empty() { "%Y-%m-%d" } else { format };
            chrono::Utc
                .timestamp_millis_opt((value * 1000.0).round() as i64)
                .single()
                .map(|time| time.format(pattern).to_string())
                .unwrap_or_else(|| format_trimmed(value))
        }
        AxisKind::Numeric => format_measure_label(value, format),
    }
}

fn format_measure_label(value: f64, format: &str) -> String {
    match decimals_from_format(format) {
        Some(decimals) => format!("{value:.decimals$}"),
        None => format_trimmed(value),
    }
}

// Interprets `0.00`-style decimal patterns; anything else falls back to
// automatic trimming.
fn decimals_from_format(format: &str) -> Option<usize> {
    if format.is_empty() {
        return None;
    }
    let mut parts = format.splitn(2, '.');
    let integer = parts.next()?;
    if integer.is_empty() || !integer.chars().all(|c| c == '0' || c == '#' || c == ',') {
        return None;
    }
    match parts.next() {
        None => Some(0),
        Some(fraction) if !fraction.is_empty() && fraction.chars().all(|c| c == '0') => {
            Some(fraction.len())
        }
        _ => None,
    }
}
