use geo::{Area, BooleanOps, MultiPolygon, Polygon};

use crate::extent::Extent;
use crate::kml::Placemark;

/// Union of all grid rectangles of one file.
#[derive(Debug, Clone, PartialEq)]
pub enum MergedRegion {
    Single(Polygon<f64>),
    Multi(Vec<Polygon<f64>>),
}

impl MergedRegion {
    /// Returns `None` when the union is empty.
    pub fn from_extents(extents: &[Extent]) -> Option<Self> {
        let mut polygons = union_extents(extents).0;
        match polygons.len() {
            0 => None,
            1 => polygons.pop().map(MergedRegion::Single),
            _ => Some(MergedRegion::Multi(polygons)),
        }
    }

    pub fn polygons(&self) -> Vec<&Polygon<f64>> {
        match self {
            MergedRegion::Single(polygon) => vec![polygon],
            MergedRegion::Multi(polygons) => polygons.iter().collect(),
        }
    }

    pub fn part_count(&self) -> usize {
        match self {
            MergedRegion::Single(_) => 1,
            MergedRegion::Multi(polygons) => polygons.len(),
        }
    }

    pub fn area(&self) -> f64 {
        self.polygons().iter().map(|p| p.unsigned_area()).sum()
    }

    pub fn placemarks(&self) -> Vec<Placemark> {
        match self {
            MergedRegion::Single(polygon) => vec![Placemark::new("Merged", polygon.clone())],
            MergedRegion::Multi(polygons) => polygons
                .iter()
                .enumerate()
                .map(|(j, polygon)| {
                    Placemark::new(format!("Merged Part {}", j + 1), polygon.clone())
                })
                .collect(),
        }
    }
}

pub fn union_extents(extents: &[Extent]) -> MultiPolygon<f64> {
    // Multi-grid files repeat the first grid as the top-level dataset.
    let mut unique: Vec<&Extent> = Vec::with_capacity(extents.len());
    for extent in extents {
        if !unique.contains(&extent) {
            unique.push(extent);
        }
    }

    let mut polygons = unique.into_iter().map(Extent::to_polygon);

    let Some(first) = polygons.next() else {
        return MultiPolygon::new(Vec::new());
    };

    polygons.fold(MultiPolygon::new(vec![first]), |acc, polygon| {
        acc.union(&MultiPolygon::new(vec![polygon]))
    })
}
