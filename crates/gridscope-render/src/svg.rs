//! SVG emission for the three views.
//!
//! Layouts are computed in the view modules; this module only turns them into markup.
//! Transitions are expressed with SMIL `<animate>` elements so a static host still sees the
//! final state after the animation runs.

use std::fmt::Write as _;

use crate::bar_chart::BarChartConfig;
use crate::cartogram::CartogramConfig;
use crate::line_chart::LineChartConfig;
use crate::model::{AxisTick, BarChartLayout, CartogramLayout, LineChartLayout};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const BAR_FILL: &str = "#205cbd";
const HOVER_STROKE: &str = "#65676a";
const LINE_STROKE: &str = "steelblue";
const POINT_FILL: &str = "#222222";

pub const BAR_X_TITLE: &str = "Event Causes";
pub const BAR_Y_TITLE: &str = "Counts";
pub const LINE_X_TITLE: &str = "Time";
pub const LINE_Y_TITLE: &str = "Occurance";

/// Formats a number for an SVG attribute: at most three decimals, trailing zeros trimmed,
/// non-finite values and negative zero written as `0`.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{r:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `M x,y L x,y ...` through `points`; empty for no points.
pub fn polyline_path(points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(&mut out, "{cmd}{},{}", fmt(*x), fmt(*y));
    }
    out
}

/// Closed path over every ring (exterior and holes); rings with fewer than three points are skipped.
pub fn rings_path(rings: &[Vec<(f64, f64)>]) -> String {
    let mut out = String::new();
    for ring in rings.iter().filter(|r| r.len() >= 3) {
        out.push_str(&polyline_path(ring));
        out.push('Z');
    }
    out
}

fn open_svg(out: &mut String, id_attr: &str, width: f64, height: f64) {
    let _ = write!(
        out,
        r#"<svg {id_attr} width="{w}" height="{h}" xmlns="{SVG_NS}">"#,
        w = fmt(width),
        h = fmt(height),
    );
}

fn write_text_lines(out: &mut String, lines: &[String], y: f64, dy_em: f64) {
    if let [single] = lines {
        out.push_str(&escape_xml(single));
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<tspan x="0" y="{y}" dy="{dy}em">{text}</tspan>"#,
            y = fmt(y),
            dy = fmt(dy_em + i as f64 * 1.1),
            text = escape_xml(line)
        );
    }
}

fn bottom_ticks(out: &mut String, ticks: &[AxisTick], outward: f64) {
    for t in ticks {
        let _ = write!(
            out,
            r#"<g class="tick" opacity="1" transform="translate({x},0)"><line stroke="currentColor" y2="{o}"/><text fill="currentColor" y="{ty}" dy="0.71em">"#,
            x = fmt(t.offset),
            o = fmt(outward),
            ty = fmt(outward + 3.0 * outward.signum()),
        );
        write_text_lines(out, &t.lines, outward + 3.0, 0.71);
        out.push_str("</text></g>");
    }
}

fn top_ticks(out: &mut String, ticks: &[AxisTick]) {
    for t in ticks {
        let _ = write!(
            out,
            r#"<g class="tick" opacity="1" transform="translate({x},0)"><line stroke="currentColor" y2="-6"/><text fill="currentColor" y="-9" dy="0em">{label}</text></g>"#,
            x = fmt(t.offset),
            label = escape_xml(&t.lines.join(" ")),
        );
    }
}

fn left_ticks(out: &mut String, ticks: &[AxisTick]) {
    for t in ticks {
        let _ = write!(
            out,
            r#"<g class="tick" opacity="1" transform="translate(0,{y})"><line stroke="currentColor" x2="-6"/><text fill="currentColor" x="-9" dy="0.32em">{label}</text></g>"#,
            y = fmt(t.offset),
            label = escape_xml(&t.lines.join(" ")),
        );
    }
}

fn class_attr(base: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) => format!("{base} {extra}"),
        None => base.to_string(),
    }
}

pub fn render_bar_chart_svg(layout: &BarChartLayout, config: &BarChartConfig) -> String {
    let (w, h) = (layout.inner_width, layout.inner_height);
    let bar_dur = config.bar_duration_ms;
    let label_dur = config.label_duration_ms;

    let mut out = String::new();
    open_svg(&mut out, r#"id="bar-chart""#, layout.width, layout.height);
    let _ = write!(
        &mut out,
        r#"<g transform="translate({},{})">"#,
        fmt(config.margin.left),
        fmt(config.margin.top)
    );

    let _ = write!(
        &mut out,
        r#"<g class="axis x-axis" fill="none" font-size="10" font-family="sans-serif" text-anchor="middle" transform="translate(5,{h})">"#,
        h = fmt(h)
    );
    let _ = write!(
        &mut out,
        r#"<path class="domain" stroke="currentColor" d="M0,0H{w}"/>"#,
        w = fmt(w)
    );
    bottom_ticks(&mut out, &layout.x_ticks, 6.0);
    out.push_str("</g>");

    out.push_str(
        r#"<g class="axis y-axis" fill="none" font-size="10" font-family="sans-serif" text-anchor="end">"#,
    );
    left_ticks(&mut out, &layout.y_ticks);
    out.push_str("</g>");

    out.push_str(r#"<g class="chart-area" transform="translate(5,0)">"#);
    for bar in &layout.bars {
        let class = class_attr("bar", bar.highlight.map(|c| c.as_str()));
        let _ = write!(
            &mut out,
            r#"<rect class="{class}" data-category="{cat}" x="{x}" y="{y}" width="{bw}" height="{bh}" fill="{BAR_FILL}" opacity="0.8">"#,
            cat = escape_xml(&bar.category),
            x = fmt(bar.x),
            y = fmt(bar.y),
            bw = fmt(bar.width),
            bh = fmt(bar.height),
        );
        let _ = write!(
            &mut out,
            r#"<animate attributeName="y" from="{h}" to="{y}" dur="{bar_dur}ms" fill="freeze"/><animate attributeName="height" from="0" to="{bh}" dur="{bar_dur}ms" fill="freeze"/><animate attributeName="opacity" from="0.5" to="0.8" dur="{bar_dur}ms" fill="freeze"/></rect>"#,
            h = fmt(h),
            y = fmt(bar.y),
            bh = fmt(bar.height),
        );
    }
    for bar in &layout.bars {
        let _ = write!(
            &mut out,
            r#"<text class="bar-label" x="{x}" y="{y}" dy=".75em" text-anchor="middle" opacity="1">{n}<animate attributeName="opacity" from="0" to="1" dur="{label_dur}ms" fill="freeze"/></text>"#,
            x = fmt(bar.label_x),
            y = fmt(bar.label_y),
            n = bar.count,
        );
    }
    out.push_str("</g>");

    let _ = write!(
        &mut out,
        r#"<text class="axis-title" y="{y}" x="{x}" dy=".71em" style="text-anchor: end;">{BAR_X_TITLE}</text>"#,
        y = fmt(h - 35.0),
        x = fmt(w + 10.0),
    );
    out.push_str("</g>");
    let _ = write!(
        &mut out,
        r#"<text class="axis-title" x="0" y="3" dy=".71em">{BAR_Y_TITLE}</text>"#
    );
    out.push_str("</svg>");
    out
}

pub fn render_cartogram_svg(layout: &CartogramLayout, config: &CartogramConfig) -> String {
    let mut out = String::new();
    open_svg(&mut out, r#"id="dorling-cartogram""#, layout.width, layout.height);
    let _ = write!(
        &mut out,
        r#"<g transform="translate({},{})">"#,
        fmt(config.margin.left),
        fmt(config.margin.top)
    );

    out.push_str("<g>");
    for outline in &layout.outlines {
        let _ = write!(
            &mut out,
            r#"<path class="geo-path" data-region="{region}" d="{d}" fill="none" stroke="gray"/>"#,
            region = escape_xml(&outline.region),
            d = rings_path(&outline.rings),
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="region-packs">"#);
    for cluster in &layout.clusters {
        let class = class_attr(
            "region-pack",
            cluster.region_selected.then_some("region-selected"),
        );
        let _ = write!(
            &mut out,
            r#"<g class="{class}" data-region="{region}" transform="translate({x}, {y})"><circle r="{r}" fill="none"/>"#,
            region = escape_xml(&cluster.region),
            x = fmt(cluster.x),
            y = fmt(cluster.y),
            r = fmt(cluster.r),
        );
        for node in &cluster.nodes {
            let class = class_attr("event-circle", node.highlight.map(|c| c.as_str()));
            let stroke = if node.hovered {
                format!(r#" style="stroke: {HOVER_STROKE}; stroke-width: 1;""#)
            } else {
                String::new()
            };
            let _ = write!(
                &mut out,
                r#"<circle class="{class}" data-record="{id}" r="{r}" cx="{cx}" cy="{cy}" fill="{fill}" fill-opacity="0.8"{stroke}/>"#,
                id = node.record.0,
                r = fmt(node.r),
                cx = fmt(node.x),
                cy = fmt(node.y),
                fill = escape_xml(&node.fill),
            );
        }
        out.push_str("</g>");
    }
    out.push_str("</g></g></svg>");
    out
}

pub fn render_line_chart_svg(layout: &LineChartLayout, config: &LineChartConfig) -> String {
    let (w, h) = (layout.inner_width, layout.inner_height);
    let mut out = String::new();
    open_svg(&mut out, r#"class="line-chart""#, layout.width, layout.height);
    let _ = write!(
        &mut out,
        r#"<g transform="translate({},{})">"#,
        fmt(config.margin.left),
        fmt(config.margin.top)
    );

    let _ = write!(
        &mut out,
        r#"<g class="axis x-axis" fill="none" font-size="10" font-family="sans-serif" text-anchor="middle" transform="translate(0,{h})" stroke-opacity=".2" opacity="0.7">"#,
        h = fmt(h)
    );
    bottom_ticks(&mut out, &layout.year_ticks, 6.0);
    out.push_str("</g>");

    out.push_str(
        r#"<g class="axis x-half-year" fill="none" font-size="10" font-family="sans-serif" text-anchor="middle" transform="translate(0,-20)" stroke-opacity=".2" opacity="0.7">"#,
    );
    top_ticks(&mut out, &layout.calendar_ticks);
    out.push_str("</g>");

    out.push_str(
        r#"<g class="axis y-axis" fill="none" font-size="10" font-family="sans-serif" text-anchor="end" style="stroke-opacity: .2;" opacity="0.7">"#,
    );
    left_ticks(&mut out, &layout.count_ticks);
    out.push_str("</g>");

    let _ = write!(
        &mut out,
        r#"<text class="axis-title" y="{y}" x="{x}" dy=".71em" style="text-anchor: end;">{LINE_X_TITLE}</text>"#,
        y = fmt(h + 25.0),
        x = fmt(w + 40.0),
    );

    out.push_str(r#"<g class="chart-area" transform="translate(0,0)">"#);
    let _ = write!(
        &mut out,
        r#"<g class="brush x-brush" fill="none" pointer-events="all"><rect class="overlay" cursor="crosshair" x="0" y="0" width="{w}" height="{h}"/>"#,
        w = fmt(w),
        h = fmt(h)
    );
    if let Some((x0, x1)) = layout.brush {
        let _ = write!(
            &mut out,
            r##"<rect class="selection" cursor="move" fill="#777" fill-opacity="0.3" stroke="#fff" shape-rendering="crispEdges" x="{x}" y="0" width="{bw}" height="{h}"/>"##,
            x = fmt(x0),
            bw = fmt(x1 - x0),
            h = fmt(h)
        );
    }
    out.push_str("</g>");
    for p in &layout.points {
        let _ = write!(
            &mut out,
            r#"<circle class="point" data-year="{year}" r="5" cx="{cx}" cy="{cy}" fill="{POINT_FILL}" style="fill-opacity: 40%;"/>"#,
            year = p.year,
            cx = fmt(p.x),
            cy = fmt(p.y),
        );
    }
    for p in &layout.points {
        let _ = write!(
            &mut out,
            r#"<text class="circle-label" x="{x}" y="{y}" style="opacity: 1;">{n}</text>"#,
            x = fmt(p.x - 7.0),
            y = fmt(p.y - 7.0),
            n = p.count,
        );
    }
    out.push_str("</g>");

    let points = layout.points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
    let _ = write!(
        &mut out,
        r#"<path class="chart-line" fill="none" stroke="{LINE_STROKE}" stroke-width="2.5" d="{d}"/>"#,
        d = polyline_path(&points)
    );
    out.push_str("</g>");
    let _ = write!(
        &mut out,
        r#"<text class="axis-title" x="0" y="{y}" dy=".71em">{LINE_Y_TITLE}</text>"#,
        y = fmt(h - 240.0)
    );
    out.push_str("</svg>");
    out
}
