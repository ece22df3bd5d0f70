use gridscope::render::{DataView, Pointer};
use gridscope::{
    Dashboard, DashboardConfig, DashboardError, DataSources, HighlightClass, RecordId, Selection,
    load_config_sync,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn sources() -> DataSources {
    let root = fixtures_root();
    DataSources::new(root.join("regions.geojson"), root.join("nerc.csv"))
}

fn fixture_dashboard() -> Dashboard {
    futures::executor::block_on(Dashboard::load(&sources(), &DashboardConfig::default()))
        .expect("dashboard")
}

fn keys(items: &[&str]) -> gridscope::KeySet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn builds_all_three_views_from_fixtures() {
    let d = fixture_dashboard();
    assert_eq!(d.records().len(), 20);

    let groups = d
        .bar_chart()
        .groups()
        .into_iter()
        .map(|g| (g.category, g.count))
        .collect::<Vec<_>>();
    let expected = [
        ("Severe Weather", 7),
        ("Vandalism", 5),
        ("Suspicious Activity", 2),
        ("Actual Physical Attack", 1),
        ("Cyber Event", 1),
        ("Fuel Supply Emergency", 1),
        ("Sabotage", 1),
    ];
    assert_eq!(
        groups,
        expected
            .iter()
            .map(|(c, n)| (c.to_string(), *n))
            .collect::<Vec<_>>()
    );

    let cartogram = d.cartogram().layout().expect("cartogram layout");
    assert_eq!(cartogram.nodes().count(), 16);
    assert!(
        cartogram
            .nodes()
            .all(|(_, n)| n.record != RecordId(3) && n.record != RecordId(11))
    );

    assert_eq!(
        d.line_chart().counts(),
        vec![(2015, 5), (2016, 5), (2017, 6), (2018, 4)]
    );
}

#[test]
fn category_selection_flows_across_views() {
    let d = fixture_dashboard();

    d.click_bar("Vandalism");
    assert_eq!(d.bar_chart().selection(), Selection::Filtered(keys(&["Vandalism"])));
    assert_eq!(d.cartogram().selection(), d.bar_chart().selection());

    let bars = d.bar_chart().layout().expect("bar layout").bars;
    for bar in &bars {
        let expected = if bar.category == "Vandalism" {
            HighlightClass::Selected
        } else {
            HighlightClass::NotSelected
        };
        assert_eq!(bar.highlight, Some(expected), "{}", bar.category);
    }

    // Record 0 is Severe Weather: outside the selection, so inert.
    d.hover_circle(RecordId(0), Pointer::new(10.0, 10.0));
    assert!(!d.tooltip().visible);
    d.click_circle(RecordId(0));
    assert_eq!(d.cartogram().selection(), Selection::Filtered(keys(&["Vandalism"])));

    d.click_bar("Severe Weather");
    assert_eq!(
        d.cartogram().selection(),
        Selection::Filtered(keys(&["Vandalism", "Severe Weather"]))
    );

    // Record 1 is Vandalism: clicking removes its cause.
    d.click_circle(RecordId(1));
    assert_eq!(d.bar_chart().selection(), Selection::Filtered(keys(&["Severe Weather"])));

    d.click_bar_background();
    assert_eq!(d.bar_chart().selection(), Selection::Unfiltered);
    let cartogram = d.cartogram().layout().expect("cartogram layout");
    assert!(cartogram.nodes().all(|(_, n)| n.highlight.is_none()));
}

#[test]
fn hovering_a_circle_shows_record_details() {
    let d = fixture_dashboard();
    d.hover_circle(RecordId(0), Pointer::new(100.0, 40.0));

    let tooltip = d.tooltip();
    assert!(tooltip.visible);
    assert_eq!((tooltip.left, tooltip.top), (115.0, 55.0));
    assert!(tooltip.html.contains("Begin: 1/15/2015 8:00"));
    assert!(tooltip.html.contains("Demand Loss (MW): 150"));

    d.leave_circle();
    assert!(!d.tooltip().visible);
}

#[test]
fn region_click_marks_the_cluster() {
    let d = fixture_dashboard();
    d.click_region("WECC");

    assert_eq!(d.cartogram().selected_regions(), keys(&["WECC"]));
    let layout = d.cartogram().layout().expect("cartogram layout");
    for cluster in &layout.clusters {
        assert_eq!(cluster.region_selected, cluster.region == "WECC");
    }
    // The bar chart ignores region selections.
    assert_eq!(d.bar_chart().selection(), Selection::Unfiltered);
}

#[test]
fn brushing_filters_and_clearing_restores_the_same_records() {
    let d = fixture_dashboard();
    let full = d.records().clone();

    // Default layout: years 2015..2018 span 970px, so 2016 sits between ~323px and ~647px.
    d.brush_move(Some((330.0, 640.0))).expect("brush");
    let brushed = d.bar_chart().data();
    assert_eq!(brushed.len(), 5);
    assert!(brushed.iter().all(|r| r.year == Some(2016)));
    assert_eq!(d.cartogram().data().len(), 5);
    assert_eq!(d.cartogram().layout().expect("layout").nodes().count(), 4);
    assert_eq!(d.bar_chart().groups().len(), 4);

    // Releasing with a selection keeps the brush.
    d.brush_end(Some((330.0, 640.0))).expect("brush end");
    assert_eq!(d.bar_chart().data().len(), 5);

    d.brush_end(None).expect("clear");
    assert!(Rc::ptr_eq(&d.bar_chart().data(), &full));
    assert!(Rc::ptr_eq(&d.cartogram().data(), &full));
    assert_eq!(d.bar_chart().groups().len(), 7);
}

#[test]
fn renders_three_svg_documents() {
    let d = fixture_dashboard();
    d.click_bar("Vandalism");
    let views = d.render_all().expect("render");

    assert!(views.bar_chart.starts_with(r#"<svg id="bar-chart""#));
    assert_eq!(views.bar_chart.matches(r#"class="bar cause-selected""#).count(), 1);
    assert_eq!(views.bar_chart.matches(r#"class="bar cause-not-selected""#).count(), 6);

    assert!(views.cartogram.starts_with(r#"<svg id="dorling-cartogram""#));
    assert_eq!(views.cartogram.matches(r#"class="event-circle"#).count(), 16);
    assert_eq!(views.cartogram.matches(r#"class="geo-path""#).count(), 8);

    assert!(views.line_chart.starts_with(r#"<svg class="line-chart""#));
    assert_eq!(views.line_chart.matches(r#"class="point""#).count(), 4);
    assert!(views.line_chart.contains(r#"class="chart-line""#));

    let json = serde_json::to_value(&views).expect("serialize");
    assert!(json["cartogram"].is_string());
}

#[test]
fn config_file_overrides_view_defaults() {
    let config = load_config_sync(fixtures_root().join("dashboard.json")).expect("config");
    let d = Dashboard::load_sync(&sources(), &config).expect("dashboard");

    assert_eq!(d.bar_chart().config().margin.left, 45.0);
    assert_eq!(d.cartogram().config().max_iterations, 600);
    let layout = d.cartogram().layout().expect("layout");
    assert_eq!((layout.width, layout.height), (900.0, 520.0));
}

#[test]
fn missing_record_file_builds_nothing() {
    let root = fixtures_root();
    let sources = DataSources::new(root.join("regions.geojson"), root.join("missing.csv"));
    let err = Dashboard::load_sync(&sources, &DashboardConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Load(gridscope::Error::Io { .. })
    ));
}

#[test]
fn view_errors_surface_through_the_render_variant() {
    let records = gridscope::load_records_sync(fixtures_root().join("nerc.csv")).expect("records");
    let boundaries =
        gridscope::load_boundaries_sync(fixtures_root().join("regions.geojson")).expect("bounds");
    let config = DashboardConfig::from_value(serde_json::json!({
        "cartogram": { "minRadius": 30, "maxRadius": 10 }
    }));

    let err = Dashboard::from_parts(
        records,
        boundaries,
        &config,
        &gridscope::render::RenderOptions::default(),
    )
    .unwrap_err();
    match err {
        DashboardError::Render(inner) => assert!(inner.to_string().contains("cartogram")),
        other => panic!("unexpected error: {other}"),
    }
}
