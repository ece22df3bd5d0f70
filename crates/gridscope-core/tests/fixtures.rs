use gridscope_core::{
    AlbersProjection, Duration, EVENT_TYPE_REMAP, REGIONS, load_boundaries, load_config,
    load_records, normalize_event_type, normalize_region,
};
use proptest::prelude::*;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

#[test]
fn fixture_records_load_and_normalize() {
    let records = futures::executor::block_on(load_records(fixtures_root().join("nerc.csv")))
        .expect("records");
    assert_eq!(records.len(), 20);

    for (idx, r) in records.iter().enumerate() {
        assert_eq!(r.id.0, idx);
        assert!(r.region.is_empty() || REGIONS.contains(&r.region.as_str()));
        assert_eq!(normalize_event_type(&r.event_type), r.event_type);
    }

    // Unknown timestamp fields are the only source of unknown durations in the fixture.
    let unknown = records
        .iter()
        .filter(|r| r.duration == Duration::Unknown)
        .map(|r| r.id.0)
        .collect::<Vec<_>>();
    assert_eq!(unknown, vec![3, 11]);

    // The blank Year cell falls back to the begin date.
    assert_eq!(records[13].year, Some(2017));
    assert_eq!(records[9].region, "");
    assert_eq!(records[18].region, "");
    assert_eq!(records[7].region, "SPP");
}

#[test]
fn fixture_boundaries_cover_every_region() {
    let mut boundaries =
        futures::executor::block_on(load_boundaries(fixtures_root().join("regions.geojson")))
            .expect("boundaries");
    for region in REGIONS {
        assert!(boundaries.find(region).is_some(), "missing {region}");
    }

    let projection = AlbersProjection::usa().fit_size(1200.0, 650.0, &boundaries);
    boundaries.apply_projection(&projection);
    for f in &boundaries.features {
        let (x, y) = f.projected_centroid.expect("centroid");
        assert!((0.0..=1200.0).contains(&x) && (0.0..=650.0).contains(&y));
    }
}

#[test]
fn every_remapped_label_normalizes_idempotently() {
    for (raw, canonical) in EVENT_TYPE_REMAP {
        assert_eq!(normalize_event_type(raw), canonical, "{raw:?}");
        assert_eq!(normalize_event_type(canonical), canonical, "{canonical:?}");
    }
}

#[test]
fn fixture_config_reads_view_sections() {
    let cfg = futures::executor::block_on(load_config(fixtures_root().join("dashboard.json")))
        .expect("config");
    assert_eq!(cfg.get_f64("barChart.margin.left"), Some(45.0));
    assert_eq!(cfg.get_f64("cartogram.maxIterations"), Some(600.0));
    assert_eq!(cfg.get_str("lineChart.referenceEnd"), Some("12/31/2018"));
    assert_eq!(cfg.get_f64("lineChart.margin.top"), None);
}

proptest! {
    #[test]
    fn event_type_normalization_is_idempotent(
        label in prop_oneof![
            prop::sample::select(EVENT_TYPE_REMAP.map(|(raw, _)| raw).to_vec())
                .prop_map(str::to_string),
            "[ A-Za-z/()-]{0,40}",
        ],
    ) {
        let once = normalize_event_type(&label);
        prop_assert_eq!(normalize_event_type(once), once);
    }

    #[test]
    fn region_normalization_is_canonical_or_empty(code in "[ A-Z,/]{0,16}") {
        let region = normalize_region(&code);
        prop_assert!(region.is_empty() || REGIONS.contains(&region));
        prop_assert_eq!(normalize_region(region), region);
    }
}
