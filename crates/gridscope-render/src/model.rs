use gridscope_core::{DashboardConfig, HighlightClass, RecordId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const ZERO: Margin = Margin {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Reads `<section>.margin.{top,right,bottom,left}`, keeping `self` for missing sides.
    pub fn overridden_by(self, cfg: &DashboardConfig, section: &str) -> Self {
        let side = |name: &str, default: f64| {
            cfg.get_f64(&format!("{section}.margin.{name}"))
                .unwrap_or(default)
        };
        Self {
            top: side("top", self.top),
            right: side("right", self.right),
            bottom: side("bottom", self.bottom),
            left: side("left", self.left),
        }
    }
}

/// One axis tick: its offset along the axis and its (possibly wrapped) label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub offset: f64,
    pub lines: Vec<String>,
}

impl AxisTick {
    pub fn single(offset: f64, label: impl Into<String>) -> Self {
        Self {
            offset,
            lines: vec![label.into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarLayout {
    pub category: String,
    pub count: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_x: f64,
    pub label_y: f64,
    pub highlight: Option<HighlightClass>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartLayout {
    pub width: f64,
    pub height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub bandwidth: f64,
    pub bars: Vec<BarLayout>,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventNodeLayout {
    pub record: RecordId,
    pub category: String,
    /// Offset from the cluster origin.
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub fill: String,
    pub highlight: Option<HighlightClass>,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterLayout {
    pub region: String,
    /// Relaxed screen position of the cluster center.
    pub x: f64,
    pub y: f64,
    /// Projected centroid the cluster is anchored to.
    pub anchor_x: f64,
    pub anchor_y: f64,
    /// Radius of the enclosing circle of the packed events.
    pub r: f64,
    pub region_selected: bool,
    pub nodes: Vec<EventNodeLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineLayout {
    pub region: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartogramLayout {
    pub width: f64,
    pub height: f64,
    pub outlines: Vec<OutlineLayout>,
    pub clusters: Vec<ClusterLayout>,
    pub relax_iterations: usize,
    pub relax_converged: bool,
}

impl CartogramLayout {
    pub fn nodes(&self) -> impl Iterator<Item = (&ClusterLayout, &EventNodeLayout)> {
        self.clusters
            .iter()
            .flat_map(|c| c.nodes.iter().map(move |n| (c, n)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePointLayout {
    pub year: i32,
    pub count: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChartLayout {
    pub width: f64,
    pub height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
    pub points: Vec<LinePointLayout>,
    pub year_ticks: Vec<AxisTick>,
    pub calendar_ticks: Vec<AxisTick>,
    pub count_ticks: Vec<AxisTick>,
    /// Brush selection in inner-chart pixels.
    pub brush: Option<(f64, f64)>,
}
