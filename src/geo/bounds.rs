//! Geographic bounding boxes in degrees.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// An axis-aligned lon/lat box.
///
/// Always satisfies `west <= east` and `south <= north`; use [`GeoBounds::new`]
/// to build one from untrusted numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Creates a box, returning `None` for inverted or non-finite edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Option<Self> {
        let finite = [west, south, east, north].iter().all(|v| v.is_finite());
        if !finite || west > east || south > north {
            return None;
        }
        Some(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Builds a box from a `[west, south, east, north]` slice (TileJSON order).
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [west, south, east, north] => Self::new(*west, *south, *east, *north),
            _ => None,
        }
    }

    /// Smallest box covering every coordinate. `None` when empty.
    pub fn from_coords(coords: impl IntoIterator<Item = Coord<f64>>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let (mut west, mut east, mut south, mut north) = (first.x, first.x, first.y, first.y);

        for c in iter {
            west = west.min(c.x);
            east = east.max(c.x);
            south = south.min(c.y);
            north = north.max(c.y);
        }

        Self::new(west, south, east, north)
    }

    /// Two boxes intersect unless one lies entirely to one side of the other.
    /// Shared edges count as intersecting.
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        !(self.east < other.west
            || self.west > other.east
            || self.north < other.south
            || self.south > other.north)
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.west + self.east) / 2.0,
            y: (self.south + self.north) / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Planar distance in degrees between this box's centre and a point.
    pub fn center_distance(&self, point: Coord<f64>) -> f64 {
        let c = self.center();
        let d_lon = c.x - point.x;
        let d_lat = c.y - point.y;
        (d_lon * d_lon + d_lat * d_lat).sqrt()
    }

    /// Extent line shown under result titles.
    pub fn describe(&self) -> String {
        format!(
            "{:.2}°N - {:.2}°N, {:.2}°E - {:.2}°E",
            self.south, self.north, self.west, self.east
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(west: f64, south: f64, east: f64, north: f64) -> GeoBounds {
        GeoBounds::new(west, south, east, north).unwrap()
    }

    #[test]
    fn test_rejects_inverted_edges() {
        assert!(GeoBounds::new(140.0, 35.0, 139.0, 36.0).is_none());
        assert!(GeoBounds::new(139.0, 36.0, 140.0, 35.0).is_none());
        assert!(GeoBounds::new(f64::NAN, 35.0, 140.0, 36.0).is_none());
        assert!(GeoBounds::new(139.0, 35.0, 139.0, 35.0).is_some());
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let cases = [
            (b(138.0, 35.0, 140.0, 37.0), b(139.0, 36.0, 141.0, 38.0)),
            (b(138.0, 35.0, 140.0, 37.0), b(141.0, 35.0, 142.0, 37.0)),
            (b(138.0, 35.0, 140.0, 37.0), b(138.5, 35.5, 139.5, 36.5)),
            (b(130.0, 30.0, 131.0, 31.0), b(138.0, 35.0, 140.0, 37.0)),
        ];
        for (a, other) in cases {
            assert_eq!(a.intersects(&other), other.intersects(&a));
        }
    }

    #[test]
    fn test_box_intersects_itself() {
        let a = b(138.0, 35.0, 140.0, 37.0);
        assert!(a.intersects(&a));
    }

    #[test]
    fn test_strictly_east_never_intersects() {
        let a = b(140.5, 35.0, 141.0, 37.0);
        let other = b(138.0, 35.0, 140.0, 37.0);
        assert!(a.west > other.east);
        assert!(!a.intersects(&other));
    }

    #[test]
    fn test_shared_edge_intersects() {
        let a = b(138.0, 35.0, 140.0, 37.0);
        let east_neighbour = b(140.0, 35.0, 142.0, 37.0);
        let north_neighbour = b(138.0, 37.0, 140.0, 39.0);
        assert!(a.intersects(&east_neighbour));
        assert!(a.intersects(&north_neighbour));
    }

    #[test]
    fn test_from_coords_takes_extrema() {
        let ring = vec![
            Coord { x: 139.5, y: 35.0 },
            Coord { x: 140.25, y: 35.0 },
            Coord { x: 140.25, y: 35.75 },
            Coord { x: 139.5, y: 35.75 },
            Coord { x: 139.5, y: 35.0 },
        ];
        let bounds = GeoBounds::from_coords(ring).unwrap();
        assert_eq!(bounds, b(139.5, 35.0, 140.25, 35.75));
        assert!(GeoBounds::from_coords(Vec::new()).is_none());
    }

    #[test]
    fn test_from_slice_requires_four_values() {
        assert_eq!(
            GeoBounds::from_slice(&[139.0, 35.0, 140.0, 36.0]),
            Some(b(139.0, 35.0, 140.0, 36.0))
        );
        assert!(GeoBounds::from_slice(&[139.0, 35.0, 140.0]).is_none());
    }
}
