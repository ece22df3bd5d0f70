#![forbid(unsafe_code)]

//! Headless views of the grid disruption dashboard.
//!
//! Each view owns its records, derives a serializable layout in `update()`, and renders that
//! layout to an SVG document. Pointer interactions mutate view-local state and publish
//! selections on the shared [`gridscope_core::Dispatcher`].

pub mod bar_chart;
pub mod cartogram;
pub mod error;
pub mod line_chart;
pub mod model;
pub mod scale;
pub mod svg;
pub mod text;
pub mod tooltip;
pub mod view;

pub use bar_chart::{BarChart, BarChartConfig, CategoryGroup, group_categories};
pub use cartogram::{Cartogram, CartogramConfig};
pub use error::{Error, Result};
pub use line_chart::{LineChart, LineChartConfig, yearly_counts};
pub use tooltip::{Pointer, Tooltip, TooltipOverlay};
pub use view::DataView;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use std::sync::Arc;

#[derive(Clone)]
pub struct RenderOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions").finish_non_exhaustive()
    }
}
