use gridscope_core::{
    AlbersProjection, BoundaryCollection, Dispatcher, EventName, KeySet, Records,
    load_boundaries_sync, load_records_sync,
};
use gridscope_render::{
    BarChart, BarChartConfig, Cartogram, CartogramConfig, DataView, LineChart, LineChartConfig,
    RenderOptions, TooltipOverlay,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn records() -> Records {
    load_records_sync(fixtures_root().join("nerc.csv")).expect("records")
}

fn projected_boundaries(config: &CartogramConfig) -> Rc<BoundaryCollection> {
    let mut boundaries =
        load_boundaries_sync(fixtures_root().join("regions.geojson")).expect("boundaries");
    let projection =
        AlbersProjection::usa().fit_size(config.inner_width(), config.inner_height(), &boundaries);
    boundaries.apply_projection(&projection);
    Rc::new(boundaries)
}

fn cartogram(bus: Rc<Dispatcher>) -> Cartogram {
    let config = CartogramConfig::default();
    let boundaries = projected_boundaries(&config);
    Cartogram::new(
        config,
        records(),
        boundaries,
        bus,
        Rc::new(TooltipOverlay::new()),
    )
}

#[test]
fn cartogram_clusters_pack_without_overlap() {
    let view = cartogram(Rc::new(Dispatcher::new()));
    view.update().expect("update");
    let layout = view.layout().expect("layout");
    let config = view.config();

    assert_eq!(layout.clusters.len(), 8);
    for cluster in &layout.clusters {
        for (i, a) in cluster.nodes.iter().enumerate() {
            assert!(a.r >= config.min_radius - 1e-9 && a.r <= config.max_radius + 1e-9);
            assert!((a.x.hypot(a.y) + a.r) <= cluster.r + 1e-6, "{} escapes", a.record);
            for b in &cluster.nodes[i + 1..] {
                let d = (a.x - b.x).hypot(a.y - b.y);
                assert!(d + 1e-6 >= a.r + b.r, "{} overlaps {}", a.record, b.record);
            }
        }
        assert!(cluster.x.is_finite() && cluster.y.is_finite());
    }

    // Longest and shortest outages take the ends of the radius range.
    let radii = layout.nodes().map(|(_, n)| n.r).collect::<Vec<_>>();
    let max = radii.iter().copied().fold(f64::MIN, f64::max);
    let min = radii.iter().copied().fold(f64::MAX, f64::min);
    assert!((max - config.max_radius).abs() < 1e-9);
    assert!((min - config.min_radius).abs() < 1e-9);
}

#[test]
fn cartogram_click_publishes_on_the_bus() {
    let bus = Rc::new(Dispatcher::new());
    let seen = Rc::new(RefCell::new(Vec::<KeySet>::new()));
    let sink = seen.clone();
    bus.register(EventName::CategorySelected, move |keys| {
        sink.borrow_mut().push(keys.clone());
    });

    let view = cartogram(bus);
    view.update().expect("update");
    let layout = view.layout().expect("layout");
    let (_, node) = layout.nodes().next().expect("node");
    view.click_circle(node.record);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].iter().collect::<Vec<_>>(), vec![&node.category]);
}

#[test]
fn brushed_line_chart_feeds_the_bar_chart() {
    let data = records();
    let bar = Rc::new(BarChart::new(
        BarChartConfig::default(),
        data.clone(),
        Rc::new(Dispatcher::new()),
        Rc::new(TooltipOverlay::new()),
        &RenderOptions::default(),
    ));
    bar.update().expect("bar update");
    let line = LineChart::new(
        LineChartConfig::default(),
        data.clone(),
        vec![bar.clone() as Rc<dyn DataView>],
    );
    line.update().expect("line update");

    // The year axis spans 970px from 2015.0 to 2018.0; everything begun before 2018 survives.
    line.brush_move(Some((0.0, 970.0))).expect("brush");
    assert_eq!(bar.data().len(), 16);
    assert!(bar.data().iter().all(|r| r.year.is_some_and(|y| y < 2018)));
    assert!(!Rc::ptr_eq(&bar.data(), &data));
    assert!(line.layout().expect("layout").brush.is_some());

    line.brush_end(None).expect("clear");
    assert!(Rc::ptr_eq(&bar.data(), &data));
    assert_eq!(line.brush_range(), None);
}

#[test]
fn bar_chart_svg_animates_towards_final_geometry() {
    let bar = BarChart::new(
        BarChartConfig::default(),
        records(),
        Rc::new(Dispatcher::new()),
        Rc::new(TooltipOverlay::new()),
        &RenderOptions::default(),
    );
    let svg = bar.render().expect("render");

    assert_eq!(svg.matches("<rect class=\"bar\"").count(), 7);
    assert_eq!(svg.matches(r#"attributeName="height""#).count(), 7);
    assert!(svg.contains(r#"dur="1000ms""#));
    assert!(svg.contains(r#"dur="1500ms""#));
    assert!(svg.contains(">Event Causes</text>"));
    assert!(svg.contains(">Counts</text>"));
}

#[test]
fn line_chart_axes_follow_the_reference_window() {
    let line = LineChart::new(LineChartConfig::default(), records(), Vec::new());
    line.update().expect("update");
    let layout = line.layout().expect("layout");

    assert_eq!(layout.points.len(), 4);
    let years = layout
        .year_ticks
        .iter()
        .map(|t| t.lines.join(" "))
        .collect::<Vec<_>>();
    assert_eq!(years, vec!["2015", "2016", "2017", "2018"]);
    assert!(
        layout
            .calendar_ticks
            .iter()
            .all(|t| t.lines.join(" ").split(' ').count() == 2)
    );
}
