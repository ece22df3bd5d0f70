//! Dorling cartogram: one circle per event, packed per region and relaxed towards each
//! region's projected centroid.

use gridscope_core::{
    BoundaryCollection, DashboardConfig, Dispatcher, EventName, EventRecord, KeySet, RecordId,
    Records, Selection, highlight_class, region_color,
};
use gridscope_layout::{Circle, ForceNode, ForceOptions, pack_siblings, relax};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::model::{CartogramLayout, ClusterLayout, EventNodeLayout, Margin, OutlineLayout};
use crate::scale::SqrtScale;
use crate::tooltip::{Pointer, TooltipOverlay, list_item};
use crate::view::DataView;
use crate::{Error, Result, svg};

const SECTION: &str = "cartogram";
const FALLBACK_FILL: &str = "gray";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartogramConfig {
    pub container_width: f64,
    pub container_height: f64,
    pub margin: Margin,
    pub tooltip_padding: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Upper bound on relaxation ticks.
    pub max_iterations: usize,
}

impl Default for CartogramConfig {
    fn default() -> Self {
        Self {
            container_width: 1200.0,
            container_height: 650.0,
            margin: Margin::ZERO,
            tooltip_padding: 15.0,
            min_radius: 5.0,
            max_radius: 22.0,
            max_iterations: ForceOptions::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl CartogramConfig {
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
            tooltip_padding: cfg
                .get_f64(&key("tooltipPadding"))
                .unwrap_or(d.tooltip_padding),
            min_radius: cfg.get_f64(&key("minRadius")).unwrap_or(d.min_radius),
            max_radius: cfg.get_f64(&key("maxRadius")).unwrap_or(d.max_radius),
            max_iterations: cfg
                .get_f64(&key("maxIterations"))
                .filter(|n| *n >= 1.0)
                .map_or(d.max_iterations, |n| n as usize),
        };
        out.validate()?;
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        if self.inner_width() <= 0.0 || self.inner_height() <= 0.0 {
            return Err(Error::InvalidConfig {
                view: SECTION,
                message: "margins leave no room for the map".to_string(),
            });
        }
        if !(self.min_radius >= 0.0 && self.max_radius >= self.min_radius) {
            return Err(Error::InvalidConfig {
                view: SECTION,
                message: format!(
                    "radius range must satisfy 0 <= min <= max, got [{}, {}]",
                    self.min_radius, self.max_radius
                ),
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

#[derive(Debug)]
struct CartogramState {
    config: CartogramConfig,
    data: Records,
    index: FxHashMap<RecordId, usize>,
    selection: Selection,
    selected_regions: KeySet,
    hovered: Option<RecordId>,
    layout: Option<CartogramLayout>,
}

impl CartogramState {
    fn record(&self, id: RecordId) -> Option<&EventRecord> {
        self.index.get(&id).and_then(|&i| self.data.get(i))
    }

    fn refresh_highlights(&mut self) {
        let Some(layout) = self.layout.as_mut() else {
            return;
        };
        for cluster in &mut layout.clusters {
            cluster.region_selected = self.selected_regions.contains(&cluster.region);
            for node in &mut cluster.nodes {
                node.highlight = highlight_class(&self.selection, &node.category);
                node.hovered = self.hovered == Some(node.record);
            }
        }
    }
}

fn index_records(data: &[EventRecord]) -> FxHashMap<RecordId, usize> {
    data.iter().enumerate().map(|(i, r)| (r.id, i)).collect()
}

pub struct Cartogram {
    bus: Rc<Dispatcher>,
    tooltip: Rc<TooltipOverlay>,
    boundaries: Rc<BoundaryCollection>,
    state: RefCell<CartogramState>,
}

impl std::fmt::Debug for Cartogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartogram")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Cartogram {
    /// `boundaries` must already be projected onto this view's inner canvas.
    pub fn new(
        config: CartogramConfig,
        data: Records,
        boundaries: Rc<BoundaryCollection>,
        bus: Rc<Dispatcher>,
        tooltip: Rc<TooltipOverlay>,
    ) -> Self {
        let index = index_records(&data);
        Self {
            bus,
            tooltip,
            boundaries,
            state: RefCell::new(CartogramState {
                config,
                data,
                index,
                selection: Selection::Unfiltered,
                selected_regions: KeySet::new(),
                hovered: None,
                layout: None,
            }),
        }
    }

    pub fn configure(&self, config: CartogramConfig) -> Result<()> {
        config.validate()?;
        let mut st = self.state.borrow_mut();
        st.config = config;
        st.layout = None;
        Ok(())
    }

    pub fn config(&self) -> CartogramConfig {
        self.state.borrow().config.clone()
    }

    pub fn selection(&self) -> Selection {
        self.state.borrow().selection.clone()
    }

    pub fn selected_regions(&self) -> KeySet {
        self.state.borrow().selected_regions.clone()
    }

    pub fn hovered(&self) -> Option<RecordId> {
        self.state.borrow().hovered
    }

    pub fn layout(&self) -> Option<CartogramLayout> {
        self.state.borrow().layout.clone()
    }

    fn compute_layout(&self, st: &CartogramState) -> Result<CartogramLayout> {
        let cfg = &st.config;
        let survivors = st
            .data
            .iter()
            .filter(|r| r.has_region())
            .filter_map(|r| r.duration.millis().map(|ms| (r, ms as f64)))
            .collect::<Vec<_>>();

        let (lo, hi) = survivors
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, ms)| {
                (lo.min(*ms), hi.max(*ms))
            });
        let radius = SqrtScale::new((lo, hi), (cfg.min_radius, cfg.max_radius));

        let mut by_region: IndexMap<&str, Vec<(&EventRecord, f64)>> = IndexMap::new();
        for (r, ms) in survivors {
            by_region
                .entry(r.region.as_str())
                .or_default()
                .push((r, ms));
        }

        struct Packed<'a> {
            region: &'a str,
            records: Vec<&'a EventRecord>,
            circles: Vec<Circle>,
            r: f64,
            anchor: (f64, f64),
        }

        let mut packed = Vec::with_capacity(by_region.len());
        for (region, members) in by_region {
            let Some(anchor) = self
                .boundaries
                .find(region)
                .and_then(|f| f.projected_centroid)
            else {
                tracing::warn!(region, "no projected boundary for region; cluster skipped");
                continue;
            };
            let mut circles = members
                .iter()
                .map(|(_, ms)| Circle::with_radius(radius.apply(*ms)))
                .collect::<Vec<_>>();
            let r = pack_siblings(&mut circles)?;
            packed.push(Packed {
                region,
                records: members.into_iter().map(|(rec, _)| rec).collect(),
                circles,
                r,
                anchor,
            });
        }

        let mut nodes = packed
            .iter()
            .map(|p| ForceNode::anchored(p.anchor.0, p.anchor.1, p.r))
            .collect::<Vec<_>>();
        let opts = ForceOptions {
            max_iterations: cfg.max_iterations,
            ..ForceOptions::centered_on(cfg.inner_width() / 2.0, cfg.inner_height() / 2.0)
        };
        let stats = relax(&mut nodes, &opts)?;

        let clusters = packed
            .into_iter()
            .zip(nodes)
            .map(|(p, node)| ClusterLayout {
                region: p.region.to_string(),
                x: node.x,
                y: node.y,
                anchor_x: p.anchor.0,
                anchor_y: p.anchor.1,
                r: p.r,
                region_selected: st.selected_regions.contains(p.region),
                nodes: p
                    .records
                    .iter()
                    .zip(&p.circles)
                    .map(|(rec, c)| EventNodeLayout {
                        record: rec.id,
                        category: rec.event_type.clone(),
                        x: c.x,
                        y: c.y,
                        r: c.r,
                        fill: region_color(&rec.region)
                            .unwrap_or(FALLBACK_FILL)
                            .to_string(),
                        highlight: highlight_class(&st.selection, &rec.event_type),
                        hovered: st.hovered == Some(rec.id),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        let outlines = self
            .boundaries
            .features
            .iter()
            .map(|f| OutlineLayout {
                region: f.region.clone(),
                rings: f.projected_rings.clone(),
            })
            .collect();

        Ok(CartogramLayout {
            width: cfg.container_width,
            height: cfg.container_height,
            outlines,
            clusters,
            relax_iterations: stats.iterations,
            relax_converged: stats.converged,
        })
    }

    pub fn render(&self) -> Result<String> {
        if self.state.borrow().layout.is_none() {
            self.update()?;
        }
        let st = self.state.borrow();
        match st.layout.as_ref() {
            Some(layout) => Ok(svg::render_cartogram_svg(layout, &st.config)),
            None => Ok(String::new()),
        }
    }

    /// Shows the record's details. Circles outside an active selection are inert.
    pub fn hover_circle(&self, id: RecordId, pointer: Pointer) {
        let mut st = self.state.borrow_mut();
        let Some(record) = st.record(id) else {
            return;
        };
        if !st.selection.is_interactive(&record.event_type) {
            return;
        }
        let html = format!(r#"<ul class="tooltip-list">{}</ul>"#, tooltip_items(record));
        let padding = st.config.tooltip_padding;
        st.hovered = Some(id);
        st.refresh_highlights();
        self.tooltip.show(html);
        self.tooltip.move_to(pointer, padding);
    }

    pub fn move_pointer(&self, pointer: Pointer) {
        let st = self.state.borrow();
        if st.hovered.is_some() {
            self.tooltip.move_to(pointer, st.config.tooltip_padding);
        }
    }

    /// Hides the tooltip and the hover stroke.
    pub fn leave(&self) {
        let mut st = self.state.borrow_mut();
        if st.hovered.take().is_some() {
            st.refresh_highlights();
            self.tooltip.hide();
        }
    }

    /// Unfiltered: selects only the circle's cause. Filtered: removes the cause when selected,
    /// otherwise does nothing.
    pub fn click_circle(&self, id: RecordId) {
        let next = {
            let st = self.state.borrow();
            let Some(record) = st.record(id) else {
                tracing::debug!(record = %id, "click on an unknown record; ignored");
                return;
            };
            match &st.selection {
                Selection::Unfiltered => Some(st.selection.toggled(&record.event_type)),
                Selection::Filtered(_) => st.selection.without(&record.event_type),
            }
        };
        if let Some(keys) = next {
            self.bus.emit(EventName::CategorySelected, &keys);
        }
    }

    pub fn click_region(&self, region: &str) {
        self.bus
            .emit(EventName::RegionSelected, &KeySet::from([region.to_string()]));
    }

    pub fn on_category_selected(&self, keys: &KeySet) {
        let mut st = self.state.borrow_mut();
        st.selection = Selection::from_keys(keys.clone());
        st.refresh_highlights();
    }

    pub fn on_region_selected(&self, keys: &KeySet) {
        let mut st = self.state.borrow_mut();
        st.selected_regions = keys.clone();
        st.refresh_highlights();
    }
}

fn or_unknown(v: Option<&str>) -> &str {
    v.unwrap_or("Unknown")
}

fn tooltip_items(r: &EventRecord) -> String {
    [
        format!("Begin: {} {}", r.begin_date, r.begin_time),
        format!("End: {} {}", r.end_date, r.end_time),
        format!("Event Type: {}", r.event_type),
        format!("Demand Loss (MW): {}", or_unknown(r.demand_loss.as_deref())),
        format!(
            "Number of Customers Affected: {}",
            or_unknown(r.customers_affected.as_deref())
        ),
    ]
    .iter()
    .map(|line| list_item(line))
    .collect()
}

impl DataView for Cartogram {
    fn data(&self) -> Records {
        self.state.borrow().data.clone()
    }

    /// A hovered record that is not part of `records` loses its hover and tooltip.
    fn set_data(&self, records: Records) {
        let mut st = self.state.borrow_mut();
        st.index = index_records(&records);
        st.data = records;
        let stale = st.hovered.is_some_and(|id| !st.index.contains_key(&id));
        if stale {
            st.hovered = None;
            self.tooltip.hide();
        }
    }

    fn update(&self) -> Result<()> {
        let layout = {
            let st = self.state.borrow();
            self.compute_layout(&st)?
        };
        tracing::debug!(
            clusters = layout.clusters.len(),
            iterations = layout.relax_iterations,
            converged = layout.relax_converged,
            "cartogram updated"
        );
        self.state.borrow_mut().layout = Some(layout);
        Ok(())
    }
}
