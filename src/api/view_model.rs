use crate::core::{AxisKind, DataPoint, datetime_to_unix_seconds};
use crate::host::{CellValue, Column, ColumnKind, DataView, SettingsBag};
use crate::render::LineStrokeStyle;
use crate::stats::{MOVING_RANGE_MAX, MOVING_RANGE_MIN, RuleToggles};

/// Documented defaults for every configuration scalar the builder reads.
/// The property schema (`api::schema`) advertises the same values and the
/// valid numeric ranges to the host settings UI.
pub mod defaults {
    pub const TREND_COLOR: &str = "#4477AA";
    pub const TREND_WIDTH: f64 = 2.0;
    pub const MARKER_COLOR: &str = "#4477AA";
    pub const MARKER_SIZE: f64 = 4.0;

    pub const FONT_FAMILY: &str = "sans-serif";
    pub const AXIS_LABEL_COLOR: &str = "#666666";
    pub const AXIS_LABEL_SIZE: f64 = 10.0;
    pub const AXIS_TITLE_COLOR: &str = "#666666";
    pub const AXIS_TITLE_SIZE: f64 = 12.0;
    pub const AXIS_LABEL_ROTATION: f64 = 0.0;

    pub const MEAN_COLOR: &str = "#35BF4D";
    pub const MEAN_WIDTH: f64 = 2.0;
    pub const MEAN_STYLE: &str = "solid";
    pub const LIMIT_COLOR: &str = "#FFA500";
    pub const LIMIT_WIDTH: f64 = 2.0;
    pub const LIMIT_STYLE: &str = "dashed";
    pub const MOVING_RANGE: i64 = 2;
    pub const NUM_SDS: f64 = 3.0;

    pub const DIVIDER_COLOR: &str = "#999999";
    pub const DIVIDER_WIDTH: f64 = 1.0;
    pub const DIVIDER_STYLE: &str = "dotted";
    pub const SHOW_STAGE_LABELS: bool = true;
    pub const STAGE_LABEL_COLOR: &str = "#666666";
    pub const STAGE_LABEL_SIZE: f64 = 10.0;

    pub const RULE_1: bool = true;
    pub const RULE_2: bool = true;
    pub const RULE_3: bool = true;
    pub const RULE_COLOR: &str = "#E8112D";
}

/// Stroke styling for one line family, as configured by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub style: LineStrokeStyle,
}

/// Axis presentation metadata for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    pub title: String,
    pub font_family: String,
    pub label_color: String,
    pub label_size: f64,
    pub label_rotation: f64,
    pub title_color: String,
    pub title_size: f64,
    /// Format string: a `chrono` pattern for date axes, a `0.00`-style
    /// decimal pattern for numeric axes. Empty means automatic.
    pub format: String,
}

/// Immutable per-update aggregation of the point series, styling, and
/// statistics configuration. Built once per host update and replaced
/// wholesale on the next.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartViewModel {
    pub axis_kind: AxisKind,
    pub points: Vec<DataPoint>,
    /// Parallel stage labels from the optional second value column.
    pub labels: Option<Vec<String>>,

    pub trend: LineStyle,
    pub marker_color: String,
    pub marker_size: f64,
    pub x_axis: AxisStyle,
    pub y_axis: AxisStyle,
    pub mean_line: LineStyle,
    pub limit_line: LineStyle,
    pub divider: LineStyle,
    pub show_stage_labels: bool,
    pub stage_label_color: String,
    pub stage_label_size: f64,

    pub rules: RuleToggles,
    pub rule_color: String,
    /// Moving-range window width, clamped to `[MOVING_RANGE_MIN, MOVING_RANGE_MAX]`.
    pub moving_range: usize,
    pub num_sds: f64,
}

/// Why view-model construction produced an empty chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The category column carried no rows.
    NoData,
    /// No category column was supplied.
    MissingCategory,
    /// No measure column was supplied.
    MissingMeasure,
    /// The category column's declared type is neither date nor numeric.
    CategoryNotPlottable,
    /// The measure column's declared type is not numeric.
    MeasureNotNumeric,
    /// Cell extraction failed; the cause is preserved for logging.
    Extraction(String),
}

/// Outcome of view-model construction. Invalid input is a tagged empty
/// variant, never an error surfaced to the host: the chart degrades to an
/// empty rendering instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewModelOutcome {
    Ready(ChartViewModel),
    Empty(EmptyReason),
}

/// Validates the data view, classifies its columns, and assembles the view
/// model from the point series plus the configuration bag.
#[must_use]
pub fn build_view_model(data: &DataView, settings: &SettingsBag) -> ViewModelOutcome {
    let Some(category) = data.category.as_ref() else {
        return ViewModelOutcome::Empty(EmptyReason::MissingCategory);
    };
    let Some(measure) = data.values.first() else {
        return ViewModelOutcome::Empty(EmptyReason::MissingMeasure);
    };

    let axis_kind = match category.kind {
        ColumnKind::Date => AxisKind::Date,
        ColumnKind::Numeric => AxisKind::Numeric,
        ColumnKind::Text => return ViewModelOutcome::Empty(EmptyReason::CategoryNotPlottable),
    };
    if measure.kind != ColumnKind::Numeric {
        return ViewModelOutcome::Empty(EmptyReason::MeasureNotNumeric);
    }
    if category.cells.is_empty() {
        return ViewModelOutcome::Empty(EmptyReason::NoData);
    }

    let points = match extract_points(category, measure, axis_kind) {
        Ok(points) => points,
        Err(reason) => return ViewModelOutcome::Empty(EmptyReason::Extraction(reason)),
    };

    let labels = data
        .values
        .get(1)
        .map(|column| column.cells.iter().map(CellValue::display).collect());

    ViewModelOutcome::Ready(ChartViewModel {
        axis_kind,
        points,
        labels,
        trend: line_style(
            settings,
            "chart",
            "lineColor",
            defaults::TREND_COLOR,
            "lineWidth",
            defaults::TREND_WIDTH,
            None,
        ),
        marker_color: settings.color_or("chart", "markerColor", defaults::MARKER_COLOR),
        marker_size: settings.number_or("chart", "markerSize", defaults::MARKER_SIZE),
        x_axis: axis_style(settings, "xAxis", category.name.as_str(), true),
        y_axis: axis_style(settings, "yAxis", measure.name.as_str(), false),
        mean_line: line_style(
            settings,
            "statistics",
            "meanColor",
            defaults::MEAN_COLOR,
            "meanWidth",
            defaults::MEAN_WIDTH,
            Some(("meanStyle", defaults::MEAN_STYLE)),
        ),
        limit_line: line_style(
            settings,
            "statistics",
            "limitColor",
            defaults::LIMIT_COLOR,
            "limitWidth",
            defaults::LIMIT_WIDTH,
            Some(("limitStyle", defaults::LIMIT_STYLE)),
        ),
        divider: line_style(
            settings,
            "subgroups",
            "dividerColor",
            defaults::DIVIDER_COLOR,
            "dividerWidth",
            defaults::DIVIDER_WIDTH,
            Some(("dividerStyle", defaults::DIVIDER_STYLE)),
        ),
        show_stage_labels: settings.bool_or("subgroups", "showLabels", defaults::SHOW_STAGE_LABELS),
        stage_label_color: settings.color_or(
            "subgroups",
            "labelColor",
            defaults::STAGE_LABEL_COLOR,
        ),
        stage_label_size: settings.number_or("subgroups", "labelSize", defaults::STAGE_LABEL_SIZE),
        rules: RuleToggles {
            outside_limits: settings.bool_or("rules", "rule1", defaults::RULE_1),
            trend_run: settings.bool_or("rules", "rule2", defaults::RULE_2),
            mean_run: settings.bool_or("rules", "rule3", defaults::RULE_3),
        },
        rule_color: settings.color_or("rules", "highlightColor", defaults::RULE_COLOR),
        moving_range: settings.integer_in_range(
            "statistics",
            "movingRange",
            defaults::MOVING_RANGE,
            MOVING_RANGE_MIN as i64,
            MOVING_RANGE_MAX as i64,
        ) as usize,
        num_sds: settings.number_or("statistics", "numSds", defaults::NUM_SDS),
    })
}

fn extract_points(
    category: &Column,
    measure: &Column,
    axis_kind: AxisKind,
) -> Result<Vec<DataPoint>, String> {
    if measure.cells.len() != category.cells.len() {
        return Err(format!(
            "measure column has {} cells for {} categories",
            measure.cells.len(),
            category.cells.len()
        ));
    }

    let mut points = Vec::with_capacity(category.cells.len());
    for (index, cell) in category.cells.iter().enumerate() {
        let x = match (axis_kind, cell) {
            (AxisKind::Date, CellValue::Date(time)) => datetime_to_unix_seconds(*time),
            (AxisKind::Numeric, CellValue::Number(value)) if value.is_finite() => *value,
            _ => {
                return Err(format!(
                    "category cell {index} does not match its declared type"
                ));
            }
        };
        let y = match &measure.cells[index] {
            CellValue::Number(value) if value.is_finite() => *value,
            _ => return Err(format!("measure cell {index} is not a finite number")),
        };
        points.push(DataPoint::new(x, y));
    }
    Ok(points)
}

fn axis_style(settings: &SettingsBag, object: &str, column_name: &str, rotatable: bool) -> AxisStyle {
    let rotation = if rotatable {
        settings.number_or(object, "labelRotation", defaults::AXIS_LABEL_ROTATION)
    } else {
        defaults::AXIS_LABEL_ROTATION
    };
    AxisStyle {
        title: settings.text_or(object, "title", column_name),
        font_family: settings.text_or(object, "fontFamily", defaults::FONT_FAMILY),
        label_color: settings.color_or(object, "labelColor", defaults::AXIS_LABEL_COLOR),
        label_size: settings.number_or(object, "labelSize", defaults::AXIS_LABEL_SIZE),
        label_rotation: rotation,
        title_color: settings.color_or(object, "titleColor", defaults::AXIS_TITLE_COLOR),
        title_size: settings.number_or(object, "titleSize", defaults::AXIS_TITLE_SIZE),
        format: settings.text_or(object, "format", ""),
    }
}

fn line_style(
    settings: &SettingsBag,
    object: &str,
    color_property: &str,
    color_default: &str,
    width_property: &str,
    width_default: f64,
    style_property: Option<(&str, &str)>,
) -> LineStyle {
    let style = match style_property {
        Some((property, default)) => {
            stroke_style_from(&settings.text_or(object, property, default))
        }
        None => LineStrokeStyle::Solid,
    };
    LineStyle {
        color: settings.color_or(object, color_property, color_default),
        width: settings.number_or(object, width_property, width_default),
        style,
    }
}

fn stroke_style_from(text: &str) -> LineStrokeStyle {
    match text {
        "dashed" => LineStrokeStyle::Dashed,
        "dotted" => LineStrokeStyle::Dotted,
        _ => LineStrokeStyle::Solid,
    }
}
