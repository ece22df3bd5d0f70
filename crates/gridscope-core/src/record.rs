//! Grid disruption records and their load-time normalization.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::time::{is_unknown, parse_date, parse_date_time};

/// The eight NERC reliability regions, in palette order.
pub const REGIONS: [&str; 8] = ["SPP", "WECC", "MRO", "SERC", "TRE", "FRCC", "NPCC", "RFC"];

/// Dark2 categorical palette, one color per entry of [`REGIONS`].
pub const REGION_PALETTE: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];

/// A shared, immutable record set. Views swap whole sets rather than editing them.
pub type Records = Rc<[EventRecord]>;

/// Raw event type labels and the canonical label each collapses onto.
pub const EVENT_TYPE_REMAP: [(&str, &str); 21] = [
    ("Severe Weather/Transmission Interruption", "Severe Weather"),
    ("Severe Weather/Distribution Interruption", "Severe Weather"),
    ("Weather", "Severe Weather"),
    ("Severe Weather - Winter", "Severe Weather"),
    ("Severe Weather - Wind", "Severe Weather"),
    ("Severe Weather - Thunderstorms", "Severe Weather"),
    ("Weather or Natural Disaster", "Severe Weather"),
    ("Sabotage - Operator Action(s)", "Sabotage"),
    ("Sabotage ", "Sabotage"),
    ("Distribution Interruption ", "Distribution Interruption"),
    ("Actual Physical Event", "Actual Physical Attack"),
    ("Physical Attack", "Actual Physical Attack"),
    (" Vandalism", "Vandalism"),
    ("Vandalism ", "Vandalism"),
    ("Transmission Interruption/Distribution Interruption", "Transmission Interruption"),
    ("Transmission Disruption", "Transmission Interruption"),
    ("Suspicious Activity ", "Suspicious Activity"),
    ("Suspected Physical Attack", "Suspicious Activity"),
    ("Potential Physical Attack", "Suspicious Activity"),
    ("Natural Disaster/Transmission Interruption", "Natural Disaster"),
    ("Cyber Attack", "Cyber Event"),
];

/// Collapses near-duplicate event type labels onto one canonical label.
///
/// Labels not in [`EVENT_TYPE_REMAP`] are already canonical and map to themselves.
pub fn normalize_event_type(label: &str) -> &str {
    EVENT_TYPE_REMAP
        .iter()
        .find(|(raw, _)| *raw == label)
        .map_or(label, |&(_, canonical)| canonical)
}

/// Maps a raw NERC region code onto one of [`REGIONS`], or `""` when the code is unknown,
/// ambiguous (spans several regions) or outside the eight regions.
pub fn normalize_region(code: &str) -> &'static str {
    match code.trim() {
        "RF" => "RFC",
        "SPP RE" => "SPP",
        other => REGIONS.iter().find(|r| **r == other).copied().unwrap_or(""),
    }
}

pub fn region_color(region: &str) -> Option<&'static str> {
    let idx = REGIONS.iter().position(|r| *r == region)?;
    Some(REGION_PALETTE[idx % REGION_PALETTE.len()])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub usize);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// Time from the event's beginning to its restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    Known { millis: i64 },
    Unknown,
}

impl Duration {
    pub fn millis(&self) -> Option<i64> {
        match self {
            Self::Known { millis } => Some(*millis),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { millis } => write!(f, "{millis}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// Computes the duration between two `(date, time)` pairs.
///
/// Any field carrying the `Unknown` marker yields [`Duration::Unknown`]; so does a field that is
/// concrete but unparseable.
pub fn compute_duration(
    begin_date: &str,
    begin_time: &str,
    end_date: &str,
    end_time: &str,
) -> Duration {
    if [begin_date, begin_time, end_date, end_time]
        .iter()
        .any(|f| is_unknown(f))
    {
        return Duration::Unknown;
    }
    match (
        parse_date_time(begin_date, begin_time),
        parse_date_time(end_date, end_time),
    ) {
        (Some(begin), Some(end)) => Duration::Known {
            millis: (end - begin).num_milliseconds(),
        },
        _ => {
            tracing::debug!(
                begin_date,
                begin_time,
                end_date,
                end_time,
                "unparseable timestamp; duration treated as unknown"
            );
            Duration::Unknown
        }
    }
}

/// One CSV row as found in the source file, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Event Type", default)]
    pub event_type: String,
    #[serde(rename = "NERC Region", default)]
    pub nerc_region: String,
    #[serde(rename = "Date Event Begin", default)]
    pub date_event_begin: String,
    #[serde(rename = "Time Event Begin", default)]
    pub time_event_begin: String,
    #[serde(rename = "Date of Restoration", default)]
    pub date_of_restoration: String,
    #[serde(rename = "Time of Restoration", default)]
    pub time_of_restoration: String,
    #[serde(rename = "Demand Loss (MW)", default)]
    pub demand_loss_mw: String,
    #[serde(rename = "Number of Customers Affected", default)]
    pub customers_affected: String,
    #[serde(rename = "Year", default)]
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: RecordId,
    /// Canonical event type (the bar chart category).
    pub event_type: String,
    /// Canonical NERC region, or empty when unknown.
    pub region: String,
    pub begin_date: String,
    pub begin_time: String,
    pub end_date: String,
    pub end_time: String,
    pub duration: Duration,
    /// Raw demand loss text; `None` when blank.
    pub demand_loss: Option<String>,
    /// Raw customer count text; `None` when blank.
    pub customers_affected: Option<String>,
    pub year: Option<i32>,
    /// Midnight of the begin date; the brush filters on the day, not the time of day.
    pub begin_day: Option<NaiveDateTime>,
}

impl EventRecord {
    pub fn from_raw(id: RecordId, raw: RawRecord) -> Self {
        let duration = compute_duration(
            &raw.date_event_begin,
            &raw.time_event_begin,
            &raw.date_of_restoration,
            &raw.time_of_restoration,
        );
        let begin_day = parse_date(&raw.date_event_begin).and_then(|d| d.and_hms_opt(0, 0, 0));
        let year = raw
            .year
            .trim()
            .parse::<i32>()
            .ok()
            .or_else(|| begin_day.map(|day| day.year()));

        Self {
            id,
            event_type: normalize_event_type(&raw.event_type).to_string(),
            region: normalize_region(&raw.nerc_region).to_string(),
            begin_date: raw.date_event_begin,
            begin_time: raw.time_event_begin,
            end_date: raw.date_of_restoration,
            end_time: raw.time_of_restoration,
            duration,
            demand_loss: non_blank(raw.demand_loss_mw),
            customers_affected: non_blank(raw.customers_affected),
            year,
            begin_day,
        }
    }

    pub fn has_region(&self) -> bool {
        !self.region.is_empty()
    }

    pub fn demand_loss_mw(&self) -> Option<f64> {
        parse_count(self.demand_loss.as_deref()?)
    }

    pub fn customers_affected_count(&self) -> Option<f64> {
        parse_count(self.customers_affected.as_deref()?)
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_count(text: &str) -> Option<f64> {
    text.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
