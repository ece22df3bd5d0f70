//! Event counts per cause, with click-to-select and per-region tooltips.

use gridscope_core::{
    DashboardConfig, Dispatcher, EventName, EventRecord, KeySet, Records, Selection,
    highlight_class,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::model::{AxisTick, BarChartLayout, BarLayout, Margin};
use crate::scale::{BandScale, LinearScale};
use crate::text::{TextMeasurer, TextStyle, wrap_words};
use crate::tooltip::{Pointer, TooltipOverlay, list_item};
use crate::view::DataView;
use crate::{Error, RenderOptions, Result, svg};

const SECTION: &str = "barChart";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartConfig {
    pub container_width: f64,
    pub container_height: f64,
    pub margin: Margin,
    pub max_bar_width: f64,
    pub tooltip_padding: f64,
    pub padding_inner: f64,
    pub y_tick_count: usize,
    pub bar_duration_ms: u64,
    pub label_duration_ms: u64,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            container_width: 1150.0,
            container_height: 200.0,
            margin: Margin::new(20.0, 20.0, 45.0, 30.0),
            max_bar_width: 60.0,
            tooltip_padding: 15.0,
            padding_inner: 0.1,
            y_tick_count: 6,
            bar_duration_ms: 1000,
            label_duration_ms: 1500,
        }
    }
}

impl BarChartConfig {
    pub fn from_config(cfg: &DashboardConfig) -> Result<Self> {
        let d = Self::default();
        let key = |k: &str| format!("{SECTION}.{k}");
        let out = Self {
            container_width: cfg
                .get_f64(&key("containerWidth"))
                .unwrap_or(d.container_width),
            container_height: cfg
                .get_f64(&key("containerHeight"))
                .unwrap_or(d.container_height),
            margin: d.margin.overridden_by(cfg, SECTION),
            max_bar_width: cfg.get_f64(&key("maxBandWidth")).unwrap_or(d.max_bar_width),
            tooltip_padding: cfg
                .get_f64(&key("tooltipPadding"))
                .unwrap_or(d.tooltip_padding),
            ..d
        };
        out.validate()?;
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        if self.inner_width() <= 0.0 || self.inner_height() <= 0.0 {
            return Err(Error::InvalidConfig {
                view: SECTION,
                message: "margins leave no room for the chart".to_string(),
            });
        }
        if !(self.max_bar_width > 0.0) {
            return Err(Error::InvalidConfig {
                view: SECTION,
                message: format!("maxBandWidth must be positive, got {}", self.max_bar_width),
            });
        }
        Ok(())
    }

    pub fn inner_width(&self) -> f64 {
        self.container_width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.container_height - self.margin.top - self.margin.bottom
    }
}

/// Records of one cause, with the per-region breakdown shown in its tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub count: usize,
    /// `(region, count)` by descending count, ties in first-occurrence order.
    pub regions: Vec<(String, usize)>,
}

/// Groups records with a known region by cause, most frequent first (stable on ties).
pub fn group_categories(records: &[EventRecord]) -> Vec<CategoryGroup> {
    let mut groups: IndexMap<&str, IndexMap<&str, usize>> = IndexMap::new();
    for r in records.iter().filter(|r| r.has_region()) {
        *groups
            .entry(r.event_type.as_str())
            .or_default()
            .entry(r.region.as_str())
            .or_insert(0) += 1;
    }

    let mut out = groups
        .into_iter()
        .map(|(category, regions)| {
            let mut regions = regions
                .into_iter()
                .map(|(region, n)| (region.to_string(), n))
                .collect::<Vec<_>>();
            regions.sort_by(|a, b| b.1.cmp(&a.1));
            CategoryGroup {
                category: category.to_string(),
                count: regions.iter().map(|(_, n)| n).sum(),
                regions,
            }
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

const LABEL_OFFSET: f64 = 15.0;

#[derive(Debug)]
struct BarChartState {
    config: BarChartConfig,
    data: Records,
    selection: Selection,
    groups: Vec<CategoryGroup>,
    layout: Option<BarChartLayout>,
    hovered: Option<String>,
}

pub struct BarChart {
    bus: Rc<Dispatcher>,
    tooltip: Rc<TooltipOverlay>,
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    label_style: TextStyle,
    state: RefCell<BarChartState>,
}

impl std::fmt::Debug for BarChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarChart")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl BarChart {
    pub fn new(
        config: BarChartConfig,
        data: Records,
        bus: Rc<Dispatcher>,
        tooltip: Rc<TooltipOverlay>,
        options: &RenderOptions,
    ) -> Self {
        Self {
            bus,
            tooltip,
            measurer: options.text_measurer.clone(),
            label_style: TextStyle::default(),
            state: RefCell::new(BarChartState {
                config,
                data,
                selection: Selection::Unfiltered,
                groups: Vec::new(),
                layout: None,
                hovered: None,
            }),
        }
    }

    pub fn configure(&self, config: BarChartConfig) -> Result<()> {
        config.validate()?;
        let mut st = self.state.borrow_mut();
        st.config = config;
        st.layout = None;
        Ok(())
    }

    pub fn config(&self) -> BarChartConfig {
        self.state.borrow().config.clone()
    }

    pub fn selection(&self) -> Selection {
        self.state.borrow().selection.clone()
    }

    pub fn groups(&self) -> Vec<CategoryGroup> {
        self.state.borrow().groups.clone()
    }

    pub fn layout(&self) -> Option<BarChartLayout> {
        self.state.borrow().layout.clone()
    }

    fn compute_layout(&self, st: &BarChartState) -> BarChartLayout {
        let cfg = &st.config;
        let (w, h) = (cfg.inner_width(), cfg.inner_height());
        let x = BandScale::new(
            st.groups.iter().map(|g| g.category.clone()).collect(),
            (0.0, w),
            cfg.padding_inner,
        );
        let max = st.groups.iter().map(|g| g.count).max().unwrap_or(0) as f64;
        let y = LinearScale::new((0.0, max), (h, 0.0));
        let bw = x.bandwidth();

        let mut bars = Vec::with_capacity(st.groups.len());
        let mut x_ticks = Vec::with_capacity(st.groups.len());
        for g in &st.groups {
            let left = x.position(&g.category).unwrap_or(0.0);
            let top = y.apply(g.count as f64);
            bars.push(BarLayout {
                category: g.category.clone(),
                count: g.count,
                x: left + (bw - cfg.max_bar_width).max(0.0) / 2.0,
                y: top,
                width: bw.min(cfg.max_bar_width),
                height: h - top,
                label_x: left + bw / 2.0,
                label_y: top - LABEL_OFFSET,
                highlight: highlight_class(&st.selection, &g.category),
            });
            x_ticks.push(AxisTick {
                offset: left + bw / 2.0,
                lines: wrap_words(&g.category, bw, &self.label_style, self.measurer.as_ref()),
            });
        }

        // The baseline tick is dropped; the x axis already marks zero.
        let y_ticks = y
            .ticks(cfg.y_tick_count)
            .into_iter()
            .skip(1)
            .map(|v| AxisTick::single(y.apply(v), svg::fmt(v)))
            .collect();

        BarChartLayout {
            width: cfg.container_width,
            height: cfg.container_height,
            inner_width: w,
            inner_height: h,
            bandwidth: bw,
            bars,
            x_ticks,
            y_ticks,
        }
    }

    pub fn render(&self) -> Result<String> {
        if self.state.borrow().layout.is_none() {
            self.update()?;
        }
        let st = self.state.borrow();
        match st.layout.as_ref() {
            Some(layout) => Ok(svg::render_bar_chart_svg(layout, &st.config)),
            None => Ok(String::new()),
        }
    }

    /// Unfiltered: selects only `category`. Filtered: toggles `category` in the selection.
    pub fn click_bar(&self, category: &str) {
        let next = {
            let st = self.state.borrow();
            if !st.groups.iter().any(|g| g.category == category) {
                tracing::debug!(category, "click on a category without a bar; ignored");
                return;
            }
            st.selection.toggled(category)
        };
        self.bus.emit(EventName::CategorySelected, &next);
    }

    /// Clears the selection everywhere.
    pub fn click_background(&self) {
        self.bus.emit(EventName::CategorySelected, &KeySet::new());
    }

    pub fn hover_bar(&self, category: &str, pointer: Pointer) {
        let mut st = self.state.borrow_mut();
        let Some(group) = st.groups.iter().find(|g| g.category == category) else {
            return;
        };
        let items = group
            .regions
            .iter()
            .map(|(region, n)| list_item(&format!("{region}: {n}")))
            .collect::<String>();
        let html = format!(
            r#"<div class="tooltip-title">{title}</div><div class="tooltip-subtitle">Total: {total}</div><ul class="tooltip-list">{items}</ul>"#,
            title = svg::escape_xml(&group.category),
            total = group.count,
        );
        st.hovered = Some(category.to_string());
        self.tooltip.show(html);
        self.tooltip.move_to(pointer, st.config.tooltip_padding);
    }

    pub fn move_pointer(&self, pointer: Pointer) {
        let st = self.state.borrow();
        if st.hovered.is_some() {
            self.tooltip.move_to(pointer, st.config.tooltip_padding);
        }
    }

    pub fn leave(&self) {
        if self.state.borrow_mut().hovered.take().is_some() {
            self.tooltip.hide();
        }
    }

    pub fn on_category_selected(&self, keys: &KeySet) {
        let mut st = self.state.borrow_mut();
        st.selection = Selection::from_keys(keys.clone());
        let selection = st.selection.clone();
        if let Some(layout) = st.layout.as_mut() {
            for bar in &mut layout.bars {
                bar.highlight = highlight_class(&selection, &bar.category);
            }
        }
    }

    /// Region selections do not affect the bar chart.
    pub fn on_region_selected(&self, _keys: &KeySet) {}
}

impl DataView for BarChart {
    fn data(&self) -> Records {
        self.state.borrow().data.clone()
    }

    fn set_data(&self, records: Records) {
        self.state.borrow_mut().data = records;
    }

    fn update(&self) -> Result<()> {
        let mut st = self.state.borrow_mut();
        let groups = group_categories(&st.data);
        st.groups = groups;
        let layout = self.compute_layout(&st);
        tracing::debug!(
            records = st.data.len(),
            bars = layout.bars.len(),
            "bar chart updated"
        );
        st.layout = Some(layout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridscope_core::{EventRecord, RawRecord, RecordId};
    use std::cell::RefCell;

    fn record(id: usize, event_type: &str, region: &str) -> EventRecord {
        EventRecord::from_raw(
            RecordId(id),
            RawRecord {
                event_type: event_type.to_string(),
                nerc_region: region.to_string(),
                date_event_begin: "1/1/2016".to_string(),
                time_event_begin: "10:00".to_string(),
                date_of_restoration: "1/1/2016".to_string(),
                time_of_restoration: "11:00".to_string(),
                ..RawRecord::default()
            },
        )
    }

    fn records(items: &[(&str, &str)]) -> Records {
        items
            .iter()
            .enumerate()
            .map(|(i, (t, r))| record(i, t, r))
            .collect::<Vec<_>>()
            .into()
    }

    fn chart(data: Records) -> (BarChart, Rc<RefCell<Vec<KeySet>>>) {
        let bus = Rc::new(Dispatcher::new());
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let sink = emitted.clone();
        bus.register(EventName::CategorySelected, move |k: &KeySet| {
            sink.borrow_mut().push(k.clone())
        });
        let chart = BarChart::new(
            BarChartConfig::default(),
            data,
            bus,
            Rc::new(TooltipOverlay::new()),
            &RenderOptions::default(),
        );
        (chart, emitted)
    }

    #[test]
    fn groups_by_category_with_descending_counts() {
        let data = records(&[("A", "WECC"), ("A", "WECC"), ("B", "SERC")]);
        let groups = group_categories(&data);
        let summary = groups
            .iter()
            .map(|g| (g.category.as_str(), g.count))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn grouping_skips_unknown_regions_and_keeps_tie_order() {
        let data = records(&[
            ("C", "WECC"),
            ("A", "PR"),
            ("B", "SERC"),
            ("B", "MRO"),
            ("B", "MRO"),
            ("D", "TRE"),
        ]);
        let groups = group_categories(&data);
        let cats = groups.iter().map(|g| g.category.as_str()).collect::<Vec<_>>();
        assert_eq!(cats, vec!["B", "C", "D"]);
        assert_eq!(
            groups[0].regions,
            vec![("MRO".to_string(), 2), ("SERC".to_string(), 1)]
        );
    }

    #[test]
    fn bars_are_capped_and_centered_in_wide_bands() {
        let (chart, _) = chart(records(&[("A", "WECC"), ("A", "WECC"), ("B", "SERC")]));
        chart.update().expect("update");
        let layout = chart.layout().expect("layout");
        assert_eq!(layout.inner_width, 1100.0);
        assert_eq!(layout.inner_height, 135.0);
        assert!(layout.bandwidth > 60.0);

        let a = &layout.bars[0];
        assert_eq!(a.width, 60.0);
        assert_eq!(a.y, 0.0);
        assert_eq!(a.height, 135.0);
        assert!((a.x - (layout.bandwidth - 60.0) / 2.0).abs() < 1e-9);
        let b = &layout.bars[1];
        assert!((b.height - 67.5).abs() < 1e-9);
        assert_eq!(a.highlight, None);

        // Ticks for [0, 2] step by 0.5; the zero tick is dropped.
        assert_eq!(layout.y_ticks.first().map(|t| t.lines[0].as_str()), Some("0.5"));
    }

    #[test]
    fn click_sequence_drives_the_bus() {
        let (chart, emitted) = chart(records(&[("A", "WECC"), ("B", "SERC")]));
        chart.update().expect("update");

        chart.click_bar("A");
        let last = emitted.borrow().last().cloned().expect("emit");
        assert_eq!(last, KeySet::from(["A".to_string()]));
        chart.on_category_selected(&last);

        chart.click_bar("B");
        let last = emitted.borrow().last().cloned().expect("emit");
        assert_eq!(last.iter().collect::<Vec<_>>(), vec!["A", "B"]);
        chart.on_category_selected(&last);

        chart.click_bar("A");
        let last = emitted.borrow().last().cloned().expect("emit");
        assert_eq!(last, KeySet::from(["B".to_string()]));
        chart.on_category_selected(&last);
        let layout = chart.layout().expect("layout");
        assert_eq!(
            layout.bars.iter().map(|b| b.highlight).collect::<Vec<_>>(),
            vec![
                Some(gridscope_core::HighlightClass::NotSelected),
                Some(gridscope_core::HighlightClass::Selected)
            ]
        );

        chart.click_background();
        let last = emitted.borrow().last().cloned().expect("emit");
        assert!(last.is_empty());
        chart.on_category_selected(&last);
        assert_eq!(chart.selection(), Selection::Unfiltered);
    }

    #[test]
    fn hover_shows_region_breakdown() {
        let bus = Rc::new(Dispatcher::new());
        let tooltip = Rc::new(TooltipOverlay::new());
        let chart = BarChart::new(
            BarChartConfig::default(),
            records(&[("A", "WECC"), ("A", "SERC"), ("A", "SERC")]),
            bus,
            tooltip.clone(),
            &RenderOptions::default(),
        );
        chart.update().expect("update");
        chart.hover_bar("A", Pointer::new(10.0, 20.0));
        let t = tooltip.snapshot();
        assert!(t.visible);
        assert!(t.html.contains("Total: 3"));
        let serc = t.html.find("SERC: 2").expect("serc");
        let wecc = t.html.find("WECC: 1").expect("wecc");
        assert!(serc < wecc);
        assert_eq!((t.left, t.top), (25.0, 35.0));

        chart.move_pointer(Pointer::new(0.0, 0.0));
        assert_eq!(tooltip.snapshot().left, 15.0);
        chart.leave();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn config_sections_override_defaults() {
        let cfg = DashboardConfig::from_value(serde_json::json!({
            "barChart": { "containerWidth": 800, "margin": { "left": 50 } }
        }));
        let c = BarChartConfig::from_config(&cfg).expect("config");
        assert_eq!(c.container_width, 800.0);
        assert_eq!(c.margin.left, 50.0);
        assert_eq!(c.margin.top, 20.0);

        let bad = DashboardConfig::from_value(serde_json::json!({
            "barChart": { "containerHeight": 10 }
        }));
        assert!(BarChartConfig::from_config(&bad).is_err());
    }
}
