//! The top-level orchestrator: loads sources, builds the three views and links them.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use gridscope_core::{
    AlbersProjection, BoundaryCollection, DashboardConfig, Dispatcher, EventName, KeySet,
    RecordId, Records, load_boundaries, load_boundaries_sync, load_records, load_records_sync,
};
use gridscope_render::{
    BarChart, BarChartConfig, Cartogram, CartogramConfig, DataView, LineChart, LineChartConfig,
    Pointer, RenderOptions, Tooltip, TooltipOverlay,
};
use serde::Serialize;

use crate::error::Result;

/// Locations of the two static inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub boundaries: PathBuf,
    pub records: PathBuf,
}

impl DataSources {
    pub fn new(boundaries: impl Into<PathBuf>, records: impl Into<PathBuf>) -> Self {
        Self {
            boundaries: boundaries.into(),
            records: records.into(),
        }
    }
}

/// One SVG document per view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedViews {
    pub bar_chart: String,
    pub cartogram: String,
    pub line_chart: String,
}

fn logged<T>(what: &'static str, path: &Path, res: gridscope_core::Result<T>) -> Result<T> {
    res.map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "failed to load {what}");
        err.into()
    })
}

/// Three linked views over one record set.
///
/// Selections travel over a shared [`Dispatcher`]; the line chart's brush pushes filtered
/// records straight into the bar chart and the cartogram.
pub struct Dashboard {
    records: Records,
    boundaries: Rc<BoundaryCollection>,
    projection: AlbersProjection,
    bus: Rc<Dispatcher>,
    tooltip: Rc<TooltipOverlay>,
    bar_chart: Rc<BarChart>,
    cartogram: Rc<Cartogram>,
    line_chart: Rc<LineChart>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("records", &self.records.len())
            .field("regions", &self.boundaries.features.len())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Reads boundaries, then records. Nothing is built unless both succeed.
    pub async fn load(sources: &DataSources, config: &DashboardConfig) -> Result<Self> {
        let boundaries = logged(
            "region boundaries",
            &sources.boundaries,
            load_boundaries(&sources.boundaries).await,
        )?;
        let records = logged(
            "records",
            &sources.records,
            load_records(&sources.records).await,
        )?;
        Self::from_parts(records, boundaries, config, &RenderOptions::default())
    }

    /// Synchronous variant of [`Dashboard::load`].
    pub fn load_sync(sources: &DataSources, config: &DashboardConfig) -> Result<Self> {
        let boundaries = logged(
            "region boundaries",
            &sources.boundaries,
            load_boundaries_sync(&sources.boundaries),
        )?;
        let records = logged(
            "records",
            &sources.records,
            load_records_sync(&sources.records),
        )?;
        Self::from_parts(records, boundaries, config, &RenderOptions::default())
    }

    /// Builds the views from already loaded inputs. `boundaries` are projected here, fitted to
    /// the cartogram's drawing area.
    pub fn from_parts(
        records: Records,
        mut boundaries: BoundaryCollection,
        config: &DashboardConfig,
        options: &RenderOptions,
    ) -> Result<Self> {
        let bar_config = BarChartConfig::from_config(config)?;
        let cartogram_config = CartogramConfig::from_config(config)?;
        let line_config = LineChartConfig::from_config(config)?;

        let projection = AlbersProjection::usa().fit_size(
            cartogram_config.inner_width(),
            cartogram_config.inner_height(),
            &boundaries,
        );
        boundaries.apply_projection(&projection);
        let boundaries = Rc::new(boundaries);

        let bus = Rc::new(Dispatcher::new());
        let tooltip = Rc::new(TooltipOverlay::new());

        let bar_chart = Rc::new(BarChart::new(
            bar_config,
            records.clone(),
            bus.clone(),
            tooltip.clone(),
            options,
        ));
        let cartogram = Rc::new(Cartogram::new(
            cartogram_config,
            records.clone(),
            boundaries.clone(),
            bus.clone(),
            tooltip.clone(),
        ));
        let targets = vec![
            bar_chart.clone() as Rc<dyn DataView>,
            cartogram.clone() as Rc<dyn DataView>,
        ];
        let line_chart = Rc::new(LineChart::new(line_config, records.clone(), targets));

        wire(&bus, &bar_chart, &cartogram);

        bar_chart.update()?;
        cartogram.update()?;
        line_chart.update()?;

        tracing::debug!(
            records = records.len(),
            regions = boundaries.features.len(),
            "dashboard ready"
        );

        Ok(Self {
            records,
            boundaries,
            projection,
            bus,
            tooltip,
            bar_chart,
            cartogram,
            line_chart,
        })
    }

    /// Every loaded record, independent of any brush.
    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn boundaries(&self) -> &BoundaryCollection {
        &self.boundaries
    }

    pub fn projection(&self) -> &AlbersProjection {
        &self.projection
    }

    pub fn bus(&self) -> &Rc<Dispatcher> {
        &self.bus
    }

    pub fn bar_chart(&self) -> &Rc<BarChart> {
        &self.bar_chart
    }

    pub fn cartogram(&self) -> &Rc<Cartogram> {
        &self.cartogram
    }

    pub fn line_chart(&self) -> &Rc<LineChart> {
        &self.line_chart
    }

    pub fn tooltip(&self) -> Tooltip {
        self.tooltip.snapshot()
    }

    pub fn click_bar(&self, category: &str) {
        self.bar_chart.click_bar(category);
    }

    pub fn click_bar_background(&self) {
        self.bar_chart.click_background();
    }

    pub fn hover_bar(&self, category: &str, pointer: Pointer) {
        self.bar_chart.hover_bar(category, pointer);
    }

    pub fn leave_bar(&self) {
        self.bar_chart.leave();
    }

    pub fn click_circle(&self, id: RecordId) {
        self.cartogram.click_circle(id);
    }

    pub fn hover_circle(&self, id: RecordId, pointer: Pointer) {
        self.cartogram.hover_circle(id, pointer);
    }

    pub fn leave_circle(&self) {
        self.cartogram.leave();
    }

    pub fn click_region(&self, region: &str) {
        self.cartogram.click_region(region);
    }

    /// Brush dragged to the pixel range `selection` of the line chart.
    pub fn brush_move(&self, selection: Option<(f64, f64)>) -> Result<()> {
        Ok(self.line_chart.brush_move(selection)?)
    }

    /// Brush released; `None` clears it and restores the full record set.
    pub fn brush_end(&self, selection: Option<(f64, f64)>) -> Result<()> {
        Ok(self.line_chart.brush_end(selection)?)
    }

    pub fn render_all(&self) -> Result<RenderedViews> {
        Ok(RenderedViews {
            bar_chart: self.bar_chart.render()?,
            cartogram: self.cartogram.render()?,
            line_chart: self.line_chart.render()?,
        })
    }
}

/// Subscribes the views to the bus. Handlers hold weak references; the views own the bus.
fn wire(bus: &Dispatcher, bar_chart: &Rc<BarChart>, cartogram: &Rc<Cartogram>) {
    let bar = Rc::downgrade(bar_chart);
    bus.register(EventName::CategorySelected, move |keys: &KeySet| {
        if let Some(view) = bar.upgrade() {
            view.on_category_selected(keys);
        }
    });
    let carto = Rc::downgrade(cartogram);
    bus.register(EventName::CategorySelected, move |keys: &KeySet| {
        if let Some(view) = carto.upgrade() {
            view.on_category_selected(keys);
        }
    });

    let bar = Rc::downgrade(bar_chart);
    bus.register(EventName::RegionSelected, move |keys: &KeySet| {
        if let Some(view) = bar.upgrade() {
            view.on_region_selected(keys);
        }
    });
    let carto = Rc::downgrade(cartogram);
    bus.register(EventName::RegionSelected, move |keys: &KeySet| {
        if let Some(view) = carto.upgrade() {
            view.on_region_selected(keys);
        }
    });
}
