//! Line input: host layers, feature geometry checks and arc-length queries.
use geo::{Coord, EuclideanLength, Geometry, Line, LineString};
use glam::DVec2;
use mint::Vector2;

use crate::error::{Error, Result};

/// An ordered collection of line features with an opaque coordinate reference.
///
/// The CRS is never interpreted; it is handed back unchanged with the results.
#[derive(Debug, Clone, Default)]
pub struct HedgerowLayer {
    /// Coordinate reference identifier (WKT, EPSG code, anything the host uses).
    pub crs: Option<String>,
    /// One entry per source feature. Each feature becomes one group.
    pub features: Vec<Geometry<f64>>,
}

impl HedgerowLayer {
    pub fn new(features: Vec<Geometry<f64>>) -> Self {
        Self {
            crs: None,
            features,
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<Geometry<f64>>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Splits every feature into its line parts, failing on the first non-line feature.
    ///
    /// The whole layer is checked before anything is returned.
    pub fn line_parts(&self) -> Result<Vec<Vec<Polyline>>> {
        self.features
            .iter()
            .enumerate()
            .map(|(index, feature)| feature_parts(index, feature))
            .collect()
    }
}

fn feature_parts(index: usize, feature: &Geometry<f64>) -> Result<Vec<Polyline>> {
    match feature {
        Geometry::LineString(ls) => Ok(vec![Polyline::new(ls.clone())]),
        Geometry::MultiLineString(mls) => Ok(mls.0.iter().cloned().map(Polyline::new).collect()),
        Geometry::Line(line) => Ok(vec![Polyline::new(LineString::from(vec![
            line.start, line.end,
        ]))]),
        other => Err(Error::NotLineGeometry {
            feature: index,
            found: geometry_name(other).into(),
        }),
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Builds a line string from host-supplied vertices.
pub fn line_from_points<I, P>(points: I) -> LineString<f64>
where
    I: IntoIterator<Item = P>,
    P: Into<Vector2<f64>>,
{
    points
        .into_iter()
        .map(Into::into)
        .map(|p| Coord { x: p.x, y: p.y })
        .collect()
}

/// A single line part with a cumulative arc-length table.
#[derive(Debug, Clone)]
pub struct Polyline {
    vertices: Vec<DVec2>,
    /// `cumulative[i]` is the arc length from the first vertex to vertex `i`.
    cumulative: Vec<f64>,
}

impl Polyline {
    pub fn new(line: LineString<f64>) -> Self {
        let vertices: Vec<DVec2> = line.0.iter().map(|c| DVec2::new(c.x, c.y)).collect();
        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut acc = 0.0;
        for (i, _) in vertices.iter().enumerate() {
            if i > 0 {
                let seg = Line::new(line.0[i - 1], line.0[i]);
                acc += seg.euclidean_length();
            }
            cumulative.push(acc);
        }
        Self {
            vertices,
            cumulative,
        }
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Total arc length. Zero for empty or single-vertex parts.
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point at arc length `distance`, clamped to the part's ends.
    pub fn point_at(&self, distance: f64) -> Option<DVec2> {
        let (i, t) = self.locate(distance)?;
        if i + 1 >= self.vertices.len() {
            return Some(self.vertices[i]);
        }
        Some(self.vertices[i].lerp(self.vertices[i + 1], t))
    }

    /// Unit tangent of the segment containing `distance`.
    ///
    /// Zero-length segments are skipped; `None` if the whole part is degenerate.
    pub fn direction_at(&self, distance: f64) -> Option<DVec2> {
        let (i, _) = self.locate(distance)?;
        let n = self.vertices.len();
        if n < 2 {
            return None;
        }
        let seg = i.min(n - 2);
        // Containing segment first, then forward, then backward.
        (seg..n - 1)
            .chain((0..seg).rev())
            .map(|k| self.vertices[k + 1] - self.vertices[k])
            .find_map(|d| d.try_normalize())
    }

    /// Unit vector from the first to the last vertex, if they differ.
    pub fn chord_direction(&self) -> Option<DVec2> {
        let first = self.vertices.first()?;
        let last = self.vertices.last()?;
        (*last - *first).try_normalize()
    }

    /// Segment index and interpolation factor for `distance`.
    fn locate(&self, distance: f64) -> Option<(usize, f64)> {
        if self.vertices.is_empty() {
            return None;
        }
        let d = distance.clamp(0.0, self.length());
        // First vertex whose cumulative length exceeds d; the segment starts one before it.
        let upper = self.cumulative.partition_point(|&c| c <= d);
        if upper == 0 {
            return Some((0, 0.0));
        }
        if upper >= self.vertices.len() {
            return Some((self.vertices.len() - 1, 0.0));
        }
        let i = upper - 1;
        let seg_len = self.cumulative[upper] - self.cumulative[i];
        let t = if seg_len > 0.0 {
            (d - self.cumulative[i]) / seg_len
        } else {
            0.0
        };
        Some((i, t))
    }
}
