//! NERC region boundaries: GeoJSON parsing, planar centroids and the conic equal-area
//! projection used to place region clusters on screen.

use geo::Centroid;
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: RawProperties,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(rename = "NERCregion")]
    nerc_region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Ring = Vec<Vec<f64>>;

impl RawGeometry {
    fn into_multi_polygon(self) -> Result<Option<MultiPolygon<f64>>> {
        let polygons = match self.kind.as_str() {
            "Polygon" => {
                let rings: Vec<Ring> = serde_json::from_value(self.coordinates)?;
                vec![polygon_from_rings(rings)]
            }
            "MultiPolygon" => {
                let polys: Vec<Vec<Ring>> = serde_json::from_value(self.coordinates)?;
                polys.into_iter().map(polygon_from_rings).collect()
            }
            _ => return Ok(None),
        };
        Ok(Some(MultiPolygon::new(
            polygons.into_iter().flatten().collect(),
        )))
    }
}

fn polygon_from_rings(rings: Vec<Ring>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter().map(|ring| {
        LineString::from(
            ring.into_iter()
                .filter_map(|pos| match pos.as_slice() {
                    [x, y, ..] => Some(Coord { x: *x, y: *y }),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )
    });
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

/// One region outline.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub region: String,
    /// Outline in longitude/latitude degrees.
    pub polygons: MultiPolygon<f64>,
    /// Planar (lon/lat) centroid, computed once at parse time.
    pub centroid: Option<Point<f64>>,
    /// Screen position of the centroid; set by [`BoundaryCollection::apply_projection`].
    pub projected_centroid: Option<(f64, f64)>,
    /// Projected rings (exterior and holes of every polygon), in screen coordinates.
    pub projected_rings: Vec<Vec<(f64, f64)>>,
}

impl BoundaryFeature {
    fn rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.polygons
            .0
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryCollection {
    /// Parses a GeoJSON `FeatureCollection`. Features without a `NERCregion` property or with
    /// a non-polygonal geometry are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawCollection = serde_json::from_str(text)?;
        let mut features = Vec::with_capacity(raw.features.len());
        for (idx, feature) in raw.features.into_iter().enumerate() {
            let Some(region) = feature.properties.nerc_region else {
                tracing::warn!(index = idx, "boundary feature without NERCregion; skipped");
                continue;
            };
            let region = region.trim().to_string();
            let Some(geometry) = feature.geometry else {
                tracing::warn!(region = %region, "boundary feature without geometry; skipped");
                continue;
            };
            let kind = geometry.kind.clone();
            let Some(polygons) = geometry.into_multi_polygon()? else {
                tracing::warn!(region = %region, kind = %kind, "unsupported boundary geometry; skipped");
                continue;
            };
            let centroid = polygons.centroid();
            features.push(BoundaryFeature {
                region,
                polygons,
                centroid,
                projected_centroid: None,
                projected_rings: Vec::new(),
            });
        }
        if features.is_empty() {
            return Err(Error::EmptyBoundaries);
        }
        Ok(Self { features })
    }

    pub fn find(&self, region: &str) -> Option<&BoundaryFeature> {
        self.features.iter().find(|f| f.region == region)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.region.as_str())
    }

    fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.features
            .iter()
            .flat_map(|f| f.rings())
            .flat_map(|ring| ring.coords().map(|c| (c.x, c.y)))
    }

    /// Projects every centroid and ring once, against a projection already fitted to the canvas.
    pub fn apply_projection(&mut self, projection: &AlbersProjection) {
        for feature in &mut self.features {
            feature.projected_centroid = feature
                .centroid
                .map(|c| projection.project(c.x(), c.y()));
            let rings = feature
                .rings()
                .map(|ring| {
                    ring.coords()
                        .map(|c| projection.project(c.x, c.y))
                        .collect::<Vec<_>>()
                })
                .collect();
            feature.projected_rings = rings;
        }
    }
}

/// Albers conic equal-area projection with the conventional contiguous-US parameters
/// (standard parallels 29.5°N and 45.5°N, rotated 96°).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersProjection {
    n: f64,
    c: f64,
    r0: f64,
    rotate_lambda: f64,
    scale: f64,
    translate: (f64, f64),
}

impl AlbersProjection {
    pub const PARALLELS: (f64, f64) = (29.5, 45.5);
    pub const ROTATE: f64 = 96.0;

    pub fn usa() -> Self {
        Self::with_parallels(Self::PARALLELS.0, Self::PARALLELS.1, Self::ROTATE)
    }

    pub fn with_parallels(phi0_deg: f64, phi1_deg: f64, rotate_deg: f64) -> Self {
        let sy0 = phi0_deg.to_radians().sin();
        let n = (sy0 + phi1_deg.to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        Self {
            n,
            c,
            r0: c.sqrt() / n,
            rotate_lambda: rotate_deg.to_radians(),
            scale: 1.0,
            translate: (0.0, 0.0),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    /// Unscaled projection of a rotated lon/lat pair in radians.
    pub fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let a = lambda * self.n;
        (r * a.sin(), self.r0 - r * a.cos())
    }

    fn project_unit(&self, lon: f64, lat: f64) -> (f64, f64) {
        let mut lambda = lon.to_radians() + self.rotate_lambda;
        if lambda > std::f64::consts::PI {
            lambda -= std::f64::consts::TAU;
        } else if lambda < -std::f64::consts::PI {
            lambda += std::f64::consts::TAU;
        }
        let (x, y) = self.raw(lambda, lat.to_radians());
        (x, -y)
    }

    /// Projects longitude/latitude degrees to screen coordinates (y grows downwards).
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.project_unit(lon, lat);
        (
            self.translate.0 + self.scale * x,
            self.translate.1 + self.scale * y,
        )
    }

    /// Chooses scale and translation so that the collection's projected bounds fit a
    /// `width × height` canvas, centered along the slack axis.
    pub fn fit_size(mut self, width: f64, height: f64, collection: &BoundaryCollection) -> Self {
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (lon, lat) in collection.positions() {
            let (x, y) = self.project_unit(lon, lat);
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        let (dx, dy) = (max.0 - min.0, max.1 - min.1);
        if !(dx.is_finite() && dy.is_finite()) || (dx <= 0.0 && dy <= 0.0) {
            tracing::warn!("boundary bounds are degenerate; projection left unfitted");
            return self;
        }
        let kx = if dx > 0.0 { width / dx } else { f64::INFINITY };
        let ky = if dy > 0.0 { height / dy } else { f64::INFINITY };
        let k = kx.min(ky);
        self.scale = k;
        self.translate = (
            (width - k * (max.0 + min.0)) / 2.0,
            (height - k * (max.1 + min.1)) / 2.0,
        );
        self
    }
}

impl Default for AlbersProjection {
    fn default() -> Self {
        Self::usa()
    }
}
