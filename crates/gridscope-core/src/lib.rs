#![forbid(unsafe_code)]

//! Grid disruption records, region boundaries and cross-view coordination (headless).
//!
//! Design goals:
//! - records are normalized exactly once at load time; malformed fields become sentinels
//! - deterministic, testable outputs (no wall-clock or locale dependence)
//! - runtime-agnostic async loading (no specific executor required)

pub mod boundary;
pub mod bus;
pub mod config;
pub mod error;
pub mod load;
pub mod record;
pub mod selection;
pub mod time;

pub use boundary::{AlbersProjection, BoundaryCollection, BoundaryFeature};
pub use bus::{Dispatcher, EventBus, EventName};
pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use load::{
    load_boundaries, load_boundaries_sync, load_config, load_config_sync, load_records,
    load_records_sync, parse_records,
};
pub use record::{
    Duration, EVENT_TYPE_REMAP, EventRecord, REGION_PALETTE, REGIONS, RawRecord, RecordId,
    Records, normalize_event_type, normalize_region, region_color,
};
pub use selection::{HighlightClass, KeySet, Selection, highlight_class};
