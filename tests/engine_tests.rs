use spc_chart::api::{
    EmptyReason, ViewModelOutcome, build_frame, build_view_model, prepare_update, property_schema,
    resolve_hover,
};
use spc_chart::core::Viewport;
use spc_chart::host::{CellValue, Column, ColumnKind, DataView, SettingValue, SettingsBag};
use spc_chart::render::NullRenderer;
use spc_chart::stats::RuleKind;
use spc_chart::{ChartEngine, ChartError};

fn numeric_view(ys: &[f64]) -> DataView {
    let categories = (0..ys.len())
        .map(|i| CellValue::Number(i as f64))
        .collect();
    let measures = ys.iter().map(|&y| CellValue::Number(y)).collect();
    DataView::new()
        .with_category(Column::new("batch", ColumnKind::Numeric, categories))
        .with_value(Column::new("measurement", ColumnKind::Numeric, measures))
}

fn labeled_view(ys: &[f64], labels: &[&str]) -> DataView {
    let cells = labels
        .iter()
        .map(|&l| CellValue::Text(l.to_owned()))
        .collect();
    numeric_view(ys).with_value(Column::new("stage", ColumnKind::Text, cells))
}

fn ready_model(data: &DataView, settings: &SettingsBag) -> spc_chart::api::ChartViewModel {
    match build_view_model(data, settings) {
        ViewModelOutcome::Ready(model) => model,
        ViewModelOutcome::Empty(reason) => panic!("expected ready model, got {reason:?}"),
    }
}

const WORKED_SERIES: [f64; 8] = [10.0, 12.0, 11.0, 30.0, 11.0, 12.0, 10.0, 11.0];

#[test]
fn worked_example_keeps_excursion_inside_three_sigma_limits() {
    // r_bar = 45/7, so UCL = 13.375 + 3 * (45/7) / 1.128 ≈ 30.47: the
    // excursion at index 3 (y = 30) stays just inside and nothing flags.
    let mut engine = ChartEngine::new(NullRenderer::default());
    let summary = engine
        .update(
            &numeric_view(&WORKED_SERIES),
            &SettingsBag::new(),
            Viewport::new(800, 500),
        )
        .expect("update");

    assert_eq!(summary.stage_count, 1);
    assert_eq!(summary.flagged_point_count, 0);
    assert!(!summary.mr_warning);
    assert!(summary.empty_reason.is_none());
    assert_eq!(engine.renderer().last_circle_count, 8);
    assert!(engine.renderer().last_line_count > 0);
}

#[test]
fn worked_example_flags_excursion_under_two_sigma_limits() {
    // With numSds = 2 the UCL drops to ≈ 24.77 and index 3 goes outside.
    let settings = SettingsBag::new().with("statistics", "numSds", SettingValue::Number(2.0));
    let model = ready_model(&numeric_view(&WORKED_SERIES), &settings);
    let ctx = prepare_update(model).expect("prepare");

    assert_eq!(ctx.highlights.len(), 1);
    assert_eq!(ctx.highlights.get(&3), Some(&RuleKind::OutsideLimits));

    let ucl = ctx.stages[0].ucl.expect("ucl");
    assert!(WORKED_SERIES[3] > ucl);
    assert!(ucl > ctx.stages[0].mean);
}

#[test]
fn update_is_deterministic_across_rebuilds() {
    let data = labeled_view(
        &[10.0, 12.0, 11.0, 13.0, 25.0, 24.0, 26.0, 25.5],
        &["A", "A", "A", "A", "B", "B", "B", "B"],
    );
    let settings = SettingsBag::new();

    let first = prepare_update(ready_model(&data, &settings)).expect("first");
    let second = prepare_update(ready_model(&data, &settings)).expect("second");
    assert_eq!(first, second);

    let viewport = Viewport::new(640, 400);
    let frame_a = build_frame(&first, viewport).expect("frame a");
    let frame_b = build_frame(&second, viewport).expect("frame b");
    assert_eq!(frame_a, frame_b);
}

#[test]
fn empty_input_renders_empty_frame_without_error() {
    let mut engine = ChartEngine::new(NullRenderer::default());
    let summary = engine
        .update(&DataView::new(), &SettingsBag::new(), Viewport::new(800, 500))
        .expect("update");

    assert_eq!(summary.empty_reason, Some(EmptyReason::MissingCategory));
    assert_eq!(summary.stage_count, 0);
    assert_eq!(engine.renderer().last_line_count, 0);
    assert_eq!(engine.renderer().last_circle_count, 0);
    assert_eq!(engine.renderer().last_text_count, 0);
}

#[test]
fn zero_viewport_is_a_contract_error() {
    let mut engine = ChartEngine::new(NullRenderer::default());
    let result = engine.update(
        &numeric_view(&[1.0, 2.0]),
        &SettingsBag::new(),
        Viewport::new(0, 400),
    );
    assert!(matches!(result, Err(ChartError::InvalidViewport { .. })));
}

#[test]
fn undersized_viewport_degrades_instead_of_failing() {
    // Nonzero but smaller than the axis margins: the engine logs, renders
    // an empty frame, and reports the degradation in the summary.
    let mut engine = ChartEngine::new(NullRenderer::default());
    let summary = engine
        .update(
            &numeric_view(&[1.0, 2.0]),
            &SettingsBag::new(),
            Viewport::new(40, 40),
        )
        .expect("update");

    assert!(matches!(summary.empty_reason, Some(EmptyReason::Extraction(_))));
    assert_eq!(engine.renderer().last_circle_count, 0);
}

#[test]
fn moving_range_warning_surfaces_in_summary_and_frame() {
    // Stage "A" holds 2 points, below the window of 3.
    let data = labeled_view(
        &[1.0, 2.0, 10.0, 12.0, 11.0, 13.0],
        &["A", "A", "B", "B", "B", "B"],
    );
    let settings = SettingsBag::new().with("statistics", "movingRange", SettingValue::Number(3.0));

    let ctx = prepare_update(ready_model(&data, &settings)).expect("prepare");
    assert!(ctx.mr_error);
    assert_eq!(ctx.segments.ucl.len(), 1);
    assert_eq!(ctx.segments.mean.len(), 2);

    let frame = build_frame(&ctx, Viewport::new(800, 500)).expect("frame");
    assert!(
        frame
            .texts
            .iter()
            .any(|text| text.text.contains("Moving range")),
        "warning text should be in the frame"
    );

    let mut engine = ChartEngine::new(NullRenderer::default());
    let summary = engine
        .update(&data, &settings, Viewport::new(800, 500))
        .expect("update");
    assert!(summary.mr_warning);
    assert_eq!(summary.stage_count, 2);
}

#[test]
fn stage_dividers_and_labels_render_between_stages() {
    let data = labeled_view(&[1.0, 2.0, 3.0, 4.0, 5.0], &["A", "A", "B", "B", "B"]);
    let ctx = prepare_update(ready_model(&data, &SettingsBag::new())).expect("prepare");
    let frame = build_frame(&ctx, Viewport::new(800, 500)).expect("frame");

    let labels: Vec<&str> = frame
        .texts
        .iter()
        .map(|text| text.text.as_str())
        .filter(|text| *text == "A" || *text == "B")
        .collect();
    assert_eq!(labels, vec!["A", "B"]);
}

#[test]
fn hover_resolves_nearest_point_with_stage_context() {
    let data = labeled_view(&[5.0, 6.0, 40.0, 41.0], &["A", "A", "B", "B"]);
    let ctx = prepare_update(ready_model(&data, &SettingsBag::new())).expect("prepare");
    let viewport = Viewport::new(800, 500);

    // Far-left pointer with a generous radius resolves to the first point.
    let sample = resolve_hover(&ctx, viewport, 0.0, 250.0, 10_000.0)
        .expect("resolve")
        .expect("sample");
    assert_eq!(sample.point_index, 0);
    assert_eq!(sample.stage_label, "A");
    assert!((sample.stage_mean - 5.5).abs() <= 1e-12);
    assert!(sample.ucl.is_some());

    // A tiny radius at the viewport origin matches nothing.
    let none = resolve_hover(&ctx, viewport, 0.0, 0.0, 1.0).expect("resolve");
    assert!(none.is_none());
}

#[test]
fn property_schema_reports_current_values_and_ranges() {
    let settings = SettingsBag::new().with("statistics", "movingRange", SettingValue::Number(5.0));
    let model = ready_model(&numeric_view(&[1.0, 2.0]), &settings);
    let schema = property_schema(&model);

    let names: Vec<&str> = schema.objects.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["chart", "xAxis", "yAxis", "statistics", "subgroups", "rules"]
    );

    let statistics = &schema.objects["statistics"];
    let moving_range = statistics
        .iter()
        .find(|descriptor| descriptor.name == "movingRange")
        .expect("movingRange descriptor");
    let range = moving_range.range.expect("range");
    assert_eq!(range.min, 2.0);
    assert_eq!(range.max, 50.0);
    assert_eq!(moving_range.value, SettingValue::Number(5.0));

    let chart = &schema.objects["chart"];
    let marker_size = chart
        .iter()
        .find(|descriptor| descriptor.name == "markerSize")
        .expect("markerSize descriptor");
    assert_eq!(marker_size.range.expect("range").max, 20.0);

    let rendered = schema.to_json_pretty().expect("schema json");
    assert!(rendered.contains("movingRange"));
}

#[test]
fn rule_highlights_recolor_their_markers() {
    let ys = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
    let settings =
        SettingsBag::new().with("rules", "highlightColor", SettingValue::color("#FF0000"));
    let ctx = prepare_update(ready_model(&numeric_view(&ys), &settings)).expect("prepare");
    assert!(!ctx.highlights.is_empty());

    let frame = build_frame(&ctx, Viewport::new(800, 500)).expect("frame");
    let red = frame
        .circles
        .iter()
        .filter(|circle| circle.color.red == 1.0 && circle.color.green == 0.0)
        .count();
    assert_eq!(red, ctx.highlights.len());
}
