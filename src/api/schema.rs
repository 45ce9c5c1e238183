use indexmap::IndexMap;
use serde::Serialize;

use crate::api::view_model::ChartViewModel;
use crate::host::SettingValue;
use crate::render::LineStrokeStyle;
use crate::stats::{MOVING_RANGE_MAX, MOVING_RANGE_MIN};

pub const LINE_WIDTH_RANGE: (f64, f64) = (1.0, 10.0);
pub const MARKER_SIZE_RANGE: (f64, f64) = (1.0, 20.0);
pub const LABEL_SIZE_RANGE: (f64, f64) = (4.0, 30.0);
pub const ROTATION_RANGE: (f64, f64) = (0.0, 360.0);
pub const NUM_SDS_RANGE: (f64, f64) = (1.0, 6.0);

/// Valid numeric range advertised for one editable property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyRange {
    pub min: f64,
    pub max: f64,
}

impl PropertyRange {
    #[must_use]
    const fn from_pair(pair: (f64, f64)) -> Self {
        Self {
            min: pair.0,
            max: pair.1,
        }
    }
}

/// One editable property: its name, current value, and numeric range when
/// the host UI should constrain input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub value: SettingValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<PropertyRange>,
}

impl PropertyDescriptor {
    fn plain(name: &'static str, value: SettingValue) -> Self {
        Self {
            name,
            value,
            range: None,
        }
    }

    fn ranged(name: &'static str, value: f64, range: (f64, f64)) -> Self {
        Self {
            name,
            value: SettingValue::Number(value),
            range: Some(PropertyRange::from_pair(range)),
        }
    }
}

/// The settings-UI enumeration returned to the host each update: every
/// configuration object with its current values and documented ranges, in
/// stable order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
    pub objects: IndexMap<String, Vec<PropertyDescriptor>>,
}

impl PropertySchema {
    pub fn to_json_pretty(&self) -> crate::error::ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::error::ChartError::InvalidSettings(format!("failed to serialize schema: {e}"))
        })
    }
}

/// Enumerates the property schema for the current view model.
#[must_use]
pub fn property_schema(model: &ChartViewModel) -> PropertySchema {
    let mut objects = IndexMap::new();

    objects.insert(
        "chart".to_owned(),
        vec![
            PropertyDescriptor::plain("lineColor", SettingValue::color(model.trend.color.clone())),
            PropertyDescriptor::ranged("lineWidth", model.trend.width, LINE_WIDTH_RANGE),
            PropertyDescriptor::plain(
                "markerColor",
                SettingValue::color(model.marker_color.clone()),
            ),
            PropertyDescriptor::ranged("markerSize", model.marker_size, MARKER_SIZE_RANGE),
        ],
    );

    objects.insert(
        "xAxis".to_owned(),
        axis_descriptors(&model.x_axis, true),
    );
    objects.insert(
        "yAxis".to_owned(),
        axis_descriptors(&model.y_axis, false),
    );

    objects.insert(
        "statistics".to_owned(),
        vec![
            PropertyDescriptor::plain(
                "meanColor",
                SettingValue::color(model.mean_line.color.clone()),
            ),
            PropertyDescriptor::ranged("meanWidth", model.mean_line.width, LINE_WIDTH_RANGE),
            PropertyDescriptor::plain(
                "meanStyle",
                SettingValue::Text(stroke_style_name(model.mean_line.style).to_owned()),
            ),
            PropertyDescriptor::plain(
                "limitColor",
                SettingValue::color(model.limit_line.color.clone()),
            ),
            PropertyDescriptor::ranged("limitWidth", model.limit_line.width, LINE_WIDTH_RANGE),
            PropertyDescriptor::plain(
                "limitStyle",
                SettingValue::Text(stroke_style_name(model.limit_line.style).to_owned()),
            ),
            PropertyDescriptor::ranged(
                "movingRange",
                model.moving_range as f64,
                (MOVING_RANGE_MIN as f64, MOVING_RANGE_MAX as f64),
            ),
            PropertyDescriptor::ranged("numSds", model.num_sds, NUM_SDS_RANGE),
        ],
    );

    objects.insert(
        "subgroups".to_owned(),
        vec![
            PropertyDescriptor::plain(
                "dividerColor",
                SettingValue::color(model.divider.color.clone()),
            ),
            PropertyDescriptor::ranged("dividerWidth", model.divider.width, LINE_WIDTH_RANGE),
            PropertyDescriptor::plain(
                "dividerStyle",
                SettingValue::Text(stroke_style_name(model.divider.style).to_owned()),
            ),
            PropertyDescriptor::plain("showLabels", SettingValue::Bool(model.show_stage_labels)),
            PropertyDescriptor::plain(
                "labelColor",
                SettingValue::color(model.stage_label_color.clone()),
            ),
            PropertyDescriptor::ranged("labelSize", model.stage_label_size, LABEL_SIZE_RANGE),
        ],
    );

    objects.insert(
        "rules".to_owned(),
        vec![
            PropertyDescriptor::plain("rule1", SettingValue::Bool(model.rules.outside_limits)),
            PropertyDescriptor::plain("rule2", SettingValue::Bool(model.rules.trend_run)),
            PropertyDescriptor::plain("rule3", SettingValue::Bool(model.rules.mean_run)),
            PropertyDescriptor::plain(
                "highlightColor",
                SettingValue::color(model.rule_color.clone()),
            ),
        ],
    );

    PropertySchema { objects }
}

fn axis_descriptors(
    axis: &crate::api::view_model::AxisStyle,
    rotatable: bool,
) -> Vec<PropertyDescriptor> {
    let mut descriptors = vec![
        PropertyDescriptor::plain("title", SettingValue::Text(axis.title.clone())),
        PropertyDescriptor::plain("fontFamily", SettingValue::Text(axis.font_family.clone())),
        PropertyDescriptor::plain("labelColor", SettingValue::color(axis.label_color.clone())),
        PropertyDescriptor::ranged("labelSize", axis.label_size, LABEL_SIZE_RANGE),
    ];
    if rotatable {
        descriptors.push(PropertyDescriptor::ranged(
            "labelRotation",
            axis.label_rotation,
            ROTATION_RANGE,
        ));
    }
    descriptors.push(PropertyDescriptor::plain(
        "titleColor",
        SettingValue::color(axis.title_color.clone()),
    ));
    descriptors.push(PropertyDescriptor::ranged(
        "titleSize",
        axis.title_size,
        LABEL_SIZE_RANGE,
    ));
    descriptors.push(PropertyDescriptor::plain(
        "format",
        SettingValue::Text(axis.format.clone()),
    ));
    descriptors
}

fn stroke_style_name(style: LineStrokeStyle) -> &'static str {
    match style {
        LineStrokeStyle::Solid => "solid",
        LineStrokeStyle::Dashed => "dashed",
        LineStrokeStyle::Dotted => "dotted",
    }
}
