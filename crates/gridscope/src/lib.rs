#![forbid(unsafe_code)]

//! `gridscope` is a headless dashboard over power-grid disruption events.
//!
//! Three linked views share one record set: a bar chart of event causes, a Dorling cartogram
//! of events clustered by NERC region, and a yearly line chart whose brush filters the other
//! two. Hosts feed pointer events into a [`Dashboard`] and display the SVG documents and the
//! tooltip it produces.
//!
//! ```no_run
//! use gridscope::{Dashboard, DashboardConfig, DataSources};
//!
//! let sources = DataSources::new("data/regions.geojson", "data/nerc.csv");
//! let dashboard = Dashboard::load_sync(&sources, &DashboardConfig::default())?;
//! dashboard.click_bar("Vandalism");
//! let views = dashboard.render_all()?;
//! # let _ = views;
//! # Ok::<(), gridscope::DashboardError>(())
//! ```

pub mod dashboard;
pub mod error;

pub use gridscope_core::*;

pub use dashboard::{Dashboard, DataSources, RenderedViews};
pub use error::{DashboardError, Result};

pub mod render {
    pub use gridscope_render::model::{
        BarChartLayout, CartogramLayout, ClusterLayout, EventNodeLayout, LineChartLayout,
    };
    pub use gridscope_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use gridscope_render::{
        BarChart, BarChartConfig, Cartogram, CartogramConfig, CategoryGroup, DataView, LineChart,
        LineChartConfig, Pointer, RenderOptions, Tooltip, group_categories, yearly_counts,
    };
}
