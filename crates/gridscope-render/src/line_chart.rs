//! Yearly event counts with a horizontal brush that filters the other views by date.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use gridscope_core::time::find_date;
use gridscope_core::{DashboardConfig, EventRecord, Records};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::model::{AxisTick, LineChartLayout, LinePointLayout, Margin};
use crate::scale::{LinearScale, TimeScale};
use crate::view::DataView;
use crate::{Error, Result, svg};

const SECTION: &str = "lineChart";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChartConfig {
    pub container_width: f64,
    pub container_height: f64,
    pub margin: Margin,
    pub tooltip_padding: f64,
    /// Domain of the calendar axis drawn above the chart.
    pub reference_window: (NaiveDateTime, NaiveDateTime),
    /// Space left of the right edge that the year axis does not use.
    pub year_axis_inset: f64,
    pub year_tick_count: usize,
    pub count_tick_count: usize,
    pub calendar_interval_months: u32,
}

fn midnight(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)
}

impl Default for LineChartConfig {
    fn default() -> Self {
        let reference_window = match (midnight(2015, 1, 1), midnight(2021, 8, 1)) {
            (Some(a), Some(b)) => (a, b),
            _ => (NaiveDateTime::MIN, NaiveDateTime::MIN),
        };
        Self {
            container_width: 1150.0,
            container_height: 400.0,
            margin: Margin::new(80.0, 50.0, 40.0, 30.0),
            tooltip_padding: 15.0,
            reference_window,
            year_axis_inset: 100.0,
            year_tick_count: 6,
            count_tick_count: 8,
            calendar_interval_months: 6,
        }
    }
}

impl LineChartConfig {
    pub fn from_config(cfg: &DashboardConfig) -> Result<Self> {
        let d = Self::default();
        let key = |k: &str| format!("{SECTION}.{k}");
        let window_edge = |k: &str, default: NaiveDateTime| -> Result<NaiveDateTime> {
            let Some(text) = cfg.get_str(&key(k)) else {
                return Ok(default);
            };
            gridscope_core::time::parse_date(text)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(|| Error::InvalidConfig {
                    view: SECTION,
                    message: format!("{k} is not a date: {text:?}"),
                })
        };
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
            reference_window: (
                window_edge("referenceStart", d.reference_window.0)?,
                window_edge("referenceEnd", d.reference_window.1)?,
            ),
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
        if self.reference_window.0 >= self.reference_window.1 {
            return Err(Error::InvalidConfig {
                view: SECTION,
                message: "reference window must end after it starts".to_string(),
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

/// `(year, count)` pairs in ascending year order. Records without a year are not counted.
pub fn yearly_counts(records: &[EventRecord]) -> Vec<(i32, usize)> {
    let mut counts = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.year) {
        *counts.entry(year).or_insert(0usize) += 1;
    }
    counts.into_iter().collect()
}

#[derive(Debug)]
struct LineChartState {
    config: LineChartConfig,
    data: Records,
    counts: Vec<(i32, usize)>,
    brush: Option<(f64, f64)>,
    brush_range: Option<(NaiveDateTime, NaiveDateTime)>,
    layout: Option<LineChartLayout>,
}

impl LineChartState {
    fn year_scale(&self) -> LinearScale {
        let domain = match (self.counts.first(), self.counts.last()) {
            (Some((lo, _)), Some((hi, _))) => (f64::from(*lo), f64::from(*hi)),
            _ => {
                let (a, b) = self.config.reference_window;
                (f64::from(a.year()), f64::from(b.year()))
            }
        };
        LinearScale::new(
            domain,
            (0.0, self.config.inner_width() - self.config.year_axis_inset),
        )
    }
}

pub struct LineChart {
    targets: Vec<Rc<dyn DataView>>,
    state: RefCell<LineChartState>,
}

impl std::fmt::Debug for LineChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChart")
            .field("targets", &self.targets.len())
            .field("state", &self.state)
            .finish()
    }
}

impl LineChart {
    /// `targets` receive the brushed record subset (the bar chart and the cartogram).
    pub fn new(config: LineChartConfig, data: Records, targets: Vec<Rc<dyn DataView>>) -> Self {
        Self {
            targets,
            state: RefCell::new(LineChartState {
                config,
                data,
                counts: Vec::new(),
                brush: None,
                brush_range: None,
                layout: None,
            }),
        }
    }

    pub fn configure(&self, config: LineChartConfig) -> Result<()> {
        config.validate()?;
        let mut st = self.state.borrow_mut();
        st.config = config;
        st.layout = None;
        Ok(())
    }

    pub fn config(&self) -> LineChartConfig {
        self.state.borrow().config.clone()
    }

    pub fn counts(&self) -> Vec<(i32, usize)> {
        self.state.borrow().counts.clone()
    }

    pub fn layout(&self) -> Option<LineChartLayout> {
        self.state.borrow().layout.clone()
    }

    /// Active brush as a date range, if any.
    pub fn brush_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.state.borrow().brush_range
    }

    fn compute_layout(st: &LineChartState) -> LineChartLayout {
        let cfg = &st.config;
        let (w, h) = (cfg.inner_width(), cfg.inner_height());
        let x = st.year_scale();
        let calendar = TimeScale::new(cfg.reference_window, (0.0, w));
        let max = st.counts.iter().map(|(_, n)| *n).max().unwrap_or(0) as f64;
        let y = LinearScale::new((0.0, max), (h, 0.0));

        let points = st
            .counts
            .iter()
            .map(|&(year, count)| LinePointLayout {
                year,
                count,
                x: x.apply(f64::from(year)),
                y: y.apply(count as f64),
            })
            .collect();

        let year_ticks = x
            .ticks(cfg.year_tick_count)
            .into_iter()
            .filter(|v| v.fract() == 0.0)
            .map(|v| AxisTick::single(x.apply(v), format!("{v:.0}")))
            .collect();

        // Only every other calendar tick is labeled and kept.
        let calendar_ticks = calendar
            .month_ticks(cfg.calendar_interval_months)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 1)
            .map(|(_, t)| AxisTick::single(calendar.apply(t), t.format("%B %Y").to_string()))
            .collect();

        let count_ticks = y
            .ticks(cfg.count_tick_count)
            .into_iter()
            .map(|v| AxisTick::single(y.apply(v), svg::fmt(v)))
            .collect();

        LineChartLayout {
            width: cfg.container_width,
            height: cfg.container_height,
            inner_width: w,
            inner_height: h,
            points,
            year_ticks,
            calendar_ticks,
            count_ticks,
            brush: st.brush,
        }
    }

    pub fn render(&self) -> Result<String> {
        if self.state.borrow().layout.is_none() {
            self.update()?;
        }
        let st = self.state.borrow();
        match st.layout.as_ref() {
            Some(layout) => Ok(svg::render_line_chart_svg(layout, &st.config)),
            None => Ok(String::new()),
        }
    }

    /// Brush dragged. A cleared selection during a drag is ignored.
    pub fn brush_move(&self, selection: Option<(f64, f64)>) -> Result<()> {
        match selection {
            Some(px) => self.brushed(Some(px)),
            None => Ok(()),
        }
    }

    /// Brush released. Only a cleared selection has an effect.
    pub fn brush_end(&self, selection: Option<(f64, f64)>) -> Result<()> {
        match selection {
            Some(_) => Ok(()),
            None => self.brushed(None),
        }
    }

    fn brushed(&self, selection: Option<(f64, f64)>) -> Result<()> {
        let pushed = {
            let mut st = self.state.borrow_mut();
            match selection {
                Some((a, b)) => {
                    let w = st.config.inner_width();
                    let (x0, x1) = (a.min(b).clamp(0.0, w), a.max(b).clamp(0.0, w));
                    let x = st.year_scale();
                    let (Some(start), Some(end)) =
                        (find_date(x.invert(x0)), find_date(x.invert(x1)))
                    else {
                        tracing::warn!(x0, x1, "brush edges do not map to dates; ignored");
                        return Ok(());
                    };
                    let subset = st
                        .data
                        .iter()
                        .filter(|r| r.begin_day.is_some_and(|day| start <= day && day <= end))
                        .cloned()
                        .collect::<Vec<_>>();
                    tracing::debug!(
                        %start,
                        %end,
                        records = subset.len(),
                        "brush selection"
                    );
                    st.brush = Some((x0, x1));
                    st.brush_range = Some((start, end));
                    Records::from(subset)
                }
                None => {
                    tracing::debug!("brush cleared");
                    st.brush = None;
                    st.brush_range = None;
                    st.data.clone()
                }
            }
        };
        {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            if let Some(layout) = st.layout.as_mut() {
                layout.brush = st.brush;
            }
        }

        for target in &self.targets {
            target.set_data(pushed.clone());
            target.update()?;
        }
        Ok(())
    }
}

impl DataView for LineChart {
    fn data(&self) -> Records {
        self.state.borrow().data.clone()
    }

    fn set_data(&self, records: Records) {
        self.state.borrow_mut().data = records;
    }

    fn update(&self) -> Result<()> {
        let mut st = self.state.borrow_mut();
        let counts = yearly_counts(&st.data);
        st.counts = counts;
        let layout = Self::compute_layout(&st);
        tracing::debug!(years = layout.points.len(), "line chart updated");
        st.layout = Some(layout);
        Ok(())
    }
}
