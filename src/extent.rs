use geo::{LineString, Polygon};
use tracing::warn;

use crate::readers::ReadError;

/// Affine transform as GDAL reports it: `[x0, px, rx, y0, ry, py]`.
pub type GeoTransform = [f64; 6];

/// Geographic bounding rectangle of one grid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Derives the footprint of a `cols` x `rows` raster from its geotransform.
    pub fn from_geo_transform(
        gt: &GeoTransform,
        cols: usize,
        rows: usize,
    ) -> Result<Self, ReadError> {
        if gt.iter().any(|v| !v.is_finite()) {
            return Err(ReadError::InvalidGeometry(
                "geotransform contains non-finite values".to_string(),
            ));
        }

        if cols == 0 || rows == 0 || gt[1] == 0.0 || gt[5] == 0.0 {
            return Err(ReadError::InvalidGeometry(format!(
                "raster of {}x{} with pixel size {}x{} has no area",
                cols, rows, gt[1], gt[5]
            )));
        }

        if gt[2] != 0.0 || gt[4] != 0.0 {
            warn!(
                rotation_x = gt[2],
                rotation_y = gt[4],
                "Ignoring rotation terms of geotransform"
            );
        }

        let minx = gt[0];
        let maxy = gt[3];
        let maxx = minx + gt[1] * cols as f64;
        let miny = maxy + gt[5] * rows as f64;

        Ok(Extent {
            xmin: minx.min(maxx),
            ymin: miny.min(maxy),
            xmax: minx.max(maxx),
            ymax: miny.max(maxy),
        })
    }

    /// Closed ring starting at the lower-left corner, in (lon, lat) order.
    pub fn ring(&self) -> [(f64, f64); 5] {
        [
            (self.xmin, self.ymin),
            (self.xmin, self.ymax),
            (self.xmax, self.ymax),
            (self.xmax, self.ymin),
            (self.xmin, self.ymin),
        ]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.ring().to_vec()), vec![])
    }

    pub fn area(&self) -> f64 {
        (self.xmax - self.xmin) * (self.ymax - self.ymin)
    }
}
