use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{GridReader, ReadError};
use crate::extent::{Extent, GeoTransform};

const RECORD_LEN: usize = 16;
const HEADER_RECORDS: i32 = 11;
const SUBDATASET_PREFIX: &str = "NTv2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

struct Record {
    key: String,
    value: [u8; 8],
}

impl Record {
    fn int(&self, order: ByteOrder) -> i32 {
        let bytes = [self.value[0], self.value[1], self.value[2], self.value[3]];
        match order {
            ByteOrder::Little => i32::from_le_bytes(bytes),
            ByteOrder::Big => i32::from_be_bytes(bytes),
        }
    }

    fn float(&self, order: ByteOrder) -> f64 {
        match order {
            ByteOrder::Little => f64::from_le_bytes(self.value),
            ByteOrder::Big => f64::from_be_bytes(self.value),
        }
    }

    fn text(&self) -> String {
        trim_field(&self.value)
    }
}

fn trim_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\0', ' '])
        .to_string()
}

fn read_record<R: Read>(reader: &mut R) -> Result<Record, ReadError> {
    let mut buf = [0u8; RECORD_LEN];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ReadError::Format("truncated header".to_string()),
        _ => ReadError::Io(e),
    })?;

    let mut value = [0u8; 8];
    value.copy_from_slice(&buf[8..]);

    Ok(Record {
        key: trim_field(&buf[..8]),
        value,
    })
}

fn expect_record<R: Read>(reader: &mut R, key: &str) -> Result<Record, ReadError> {
    let record = read_record(reader)?;
    if record.key != key {
        return Err(ReadError::Format(format!(
            "expected {} record, found {:?}",
            key, record.key
        )));
    }
    Ok(record)
}

/// Header of one sub-file. Angles are in the file's `GS_TYPE` unit, longitudes positive west.
#[derive(Debug, Clone, PartialEq)]
pub struct SubGrid {
    pub name: String,
    pub parent: String,
    pub s_lat: f64,
    pub n_lat: f64,
    pub e_long: f64,
    pub w_long: f64,
    pub lat_inc: f64,
    pub long_inc: f64,
    pub gs_count: i32,
}

impl SubGrid {
    fn validate(&self) -> Result<(), ReadError> {
        for (key, value) in [
            ("S_LAT", self.s_lat),
            ("N_LAT", self.n_lat),
            ("E_LONG", self.e_long),
            ("W_LONG", self.w_long),
        ] {
            if !value.is_finite() {
                return Err(ReadError::Format(format!(
                    "{} of sub-file {:?} is not finite",
                    key, self.name
                )));
            }
        }
        for (key, value) in [("LAT_INC", self.lat_inc), ("LONG_INC", self.long_inc)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ReadError::Format(format!(
                    "{} of sub-file {:?} must be positive, found {}",
                    key, self.name, value
                )));
            }
        }
        Ok(())
    }

    /// Node counts along longitude and latitude.
    pub fn raster_size(&self) -> (usize, usize) {
        let cols = ((self.w_long - self.e_long) / self.long_inc + 1.5).floor();
        let rows = ((self.n_lat - self.s_lat) / self.lat_inc + 1.5).floor();
        (cols.max(0.0) as usize, rows.max(0.0) as usize)
    }

    /// Geotransform in degrees, east-positive, with nodes at pixel centres.
    pub fn geo_transform(&self, units_per_degree: f64) -> GeoTransform {
        [
            -(self.w_long + self.long_inc * 0.5) / units_per_degree,
            self.long_inc / units_per_degree,
            0.0,
            (self.n_lat + self.lat_inc * 0.5) / units_per_degree,
            0.0,
            -self.lat_inc / units_per_degree,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Ntv2File {
    pub gs_type: String,
    pub units_per_degree: f64,
    pub system_from: String,
    pub system_to: String,
    pub subgrids: Vec<SubGrid>,
    /// Set when the last data block ends past the end of the file.
    pub data_truncated: bool,
}

impl Ntv2File {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, ReadError> {
        let start = reader.stream_position()?;
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let first = expect_record(reader, "NUM_OREC")?;
        let order = if first.int(ByteOrder::Little) == HEADER_RECORDS {
            ByteOrder::Little
        } else if first.int(ByteOrder::Big) == HEADER_RECORDS {
            ByteOrder::Big
        } else {
            return Err(ReadError::Format(
                "NUM_OREC is not 11 in either byte order".to_string(),
            ));
        };

        let num_srec = expect_record(reader, "NUM_SREC")?.int(order);
        if num_srec != HEADER_RECORDS {
            return Err(ReadError::Format(format!(
                "unsupported NUM_SREC {}",
                num_srec
            )));
        }

        let num_file = expect_record(reader, "NUM_FILE")?.int(order);
        if num_file < 1 {
            return Err(ReadError::Format(format!("NUM_FILE is {}", num_file)));
        }

        let gs_type = expect_record(reader, "GS_TYPE")?.text();
        let units_per_degree = match gs_type.to_ascii_uppercase().as_str() {
            "SECONDS" => 3600.0,
            "MINUTES" => 60.0,
            "DEGREES" => 1.0,
            other => {
                return Err(ReadError::Format(format!("unknown GS_TYPE {:?}", other)));
            }
        };

        expect_record(reader, "VERSION")?;
        let system_from = expect_record(reader, "SYSTEM_F")?.text();
        let system_to = expect_record(reader, "SYSTEM_T")?.text();
        for key in ["MAJOR_F", "MINOR_F", "MAJOR_T", "MINOR_T"] {
            expect_record(reader, key)?;
        }

        let mut subgrids = Vec::with_capacity(num_file as usize);
        let mut data_truncated = false;
        for _ in 0..num_file {
            let subgrid = read_subgrid(reader, order)?;

            let (cols, rows) = subgrid.raster_size();
            debug!(
                subgrid = %subgrid.name,
                parent = %subgrid.parent,
                cols,
                rows,
                "Read sub-file header"
            );

            let nodes = cols.checked_mul(rows).and_then(|n| i64::try_from(n).ok());
            if nodes != Some(i64::from(subgrid.gs_count)) {
                warn!(
                    subgrid = %subgrid.name,
                    gs_count = subgrid.gs_count,
                    cols,
                    rows,
                    "GS_COUNT does not match grid dimensions"
                );
            }

            let skip = subgrid.gs_count.max(0) as i64 * RECORD_LEN as i64;
            let position = reader.seek(SeekFrom::Current(skip))?;
            if position > file_len {
                warn!(
                    subgrid = %subgrid.name,
                    missing_bytes = position - file_len,
                    "Grid shift records are truncated"
                );
                data_truncated = true;
            }
            subgrids.push(subgrid);
        }

        Ok(Self {
            gs_type,
            units_per_degree,
            system_from,
            system_to,
            subgrids,
            data_truncated,
        })
    }

    pub fn subgrid_extent(&self, index: usize) -> Result<Extent, ReadError> {
        let subgrid = self.subgrids.get(index).ok_or_else(|| {
            ReadError::Format(format!("sub-file {} out of range", index))
        })?;
        let (cols, rows) = subgrid.raster_size();
        Extent::from_geo_transform(&subgrid.geo_transform(self.units_per_degree), cols, rows)
    }
}

fn read_subgrid<R: Read>(reader: &mut R, order: ByteOrder) -> Result<SubGrid, ReadError> {
    let name = expect_record(reader, "SUB_NAME")?.text();
    let parent = expect_record(reader, "PARENT")?.text();
    expect_record(reader, "CREATED")?;
    expect_record(reader, "UPDATED")?;

    let subgrid = SubGrid {
        name,
        parent,
        s_lat: expect_record(reader, "S_LAT")?.float(order),
        n_lat: expect_record(reader, "N_LAT")?.float(order),
        e_long: expect_record(reader, "E_LONG")?.float(order),
        w_long: expect_record(reader, "W_LONG")?.float(order),
        lat_inc: expect_record(reader, "LAT_INC")?.float(order),
        long_inc: expect_record(reader, "LONG_INC")?.float(order),
        gs_count: expect_record(reader, "GS_COUNT")?.int(order),
    };
    subgrid.validate()?;
    Ok(subgrid)
}

/// Reads grid headers directly, exposing them the way GDAL's NTv2 driver does:
/// the first sub-file is the top-level dataset and, for multi-grid files, every
/// sub-file is also listed as `NTv2:<index>:<path>`.
pub struct Ntv2Reader {
    path: PathBuf,
    file: Ntv2File,
}

impl Ntv2Reader {
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        let handle = File::open(path).map_err(|e| ReadError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut reader = BufReader::new(handle);
        let file = Ntv2File::read(&mut reader)?;

        debug!(
            path = %path.display(),
            gs_type = %file.gs_type,
            subgrids = file.subgrids.len(),
            from = %file.system_from,
            to = %file.system_to,
            "Read NTv2 header"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn file(&self) -> &Ntv2File {
        &self.file
    }
}

impl GridReader for Ntv2Reader {
    fn extent(&self) -> Result<Extent, ReadError> {
        self.file.subgrid_extent(0)
    }

    fn subdatasets(&self) -> Vec<String> {
        if self.file.subgrids.len() < 2 {
            return Vec::new();
        }
        (0..self.file.subgrids.len())
            .map(|i| format!("{}:{}:{}", SUBDATASET_PREFIX, i, self.path.display()))
            .collect()
    }

    fn subdataset_extent(&self, name: &str) -> Result<Extent, ReadError> {
        let unknown = || ReadError::UnknownSubdataset(name.to_string());

        let mut parts = name.splitn(3, ':');
        if parts.next() != Some(SUBDATASET_PREFIX) {
            return Err(unknown());
        }
        let index: usize = parts
            .next()
            .and_then(|i| i.parse().ok())
            .ok_or_else(unknown)?;
        if parts.next().map(Path::new) != Some(self.path.as_path()) {
            return Err(unknown());
        }

        self.file.subgrid_extent(index).map_err(|e| match e {
            ReadError::Format(_) => unknown(),
            other => other,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{TestGrid, write_grid_file, write_grid_file_with_order};
    use super::*;
    use tempfile::tempdir;

    fn assert_extent(extent: Extent, expected: (f64, f64, f64, f64)) {
        let (xmin, ymin, xmax, ymax) = expected;
        assert!((extent.xmin - xmin).abs() < 1e-9, "xmin {}", extent.xmin);
        assert!((extent.ymin - ymin).abs() < 1e-9, "ymin {}", extent.ymin);
        assert!((extent.xmax - xmax).abs() < 1e-9, "xmax {}", extent.xmax);
        assert!((extent.ymax - ymax).abs() < 1e-9, "ymax {}", extent.ymax);
    }

    #[test]
    fn test_single_grid_has_no_subdatasets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.gsb");
        let grid = TestGrid::new(-80.0, 40.0, -70.0, 45.0, 0.5);
        write_grid_file(&path, &[grid]);

        let reader = Ntv2Reader::open(&path).unwrap();

        assert_eq!(reader.file().subgrids.len(), 1);
        assert_eq!(reader.file().subgrids[0].parent, "NONE");
        assert_eq!(reader.file().gs_type, "SECONDS");
        assert!(!reader.file().data_truncated);
        assert_eq!(reader.file().subgrids[0].raster_size(), (21, 11));
        assert!(reader.subdatasets().is_empty());
        assert_extent(reader.extent().unwrap(), grid.expected());
    }

    #[test]
    fn test_multi_grid_lists_every_subfile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.gsb");
        let grids = [
            TestGrid::new(-80.0, 40.0, -70.0, 45.0, 0.5),
            TestGrid::new(-60.0, 50.0, -55.0, 52.0, 0.25),
        ];
        write_grid_file(&path, &grids);

        let reader = Ntv2Reader::open(&path).unwrap();
        let names = reader.subdatasets();

        assert_eq!(names.len(), 2);
        assert_eq!(names[1], format!("NTv2:1:{}", path.display()));
        assert_extent(reader.subdataset_extent(&names[1]).unwrap(), grids[1].expected());
        assert_extent(reader.extent().unwrap(), grids[0].expected());
    }

    #[test]
    fn test_big_endian_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("be.gsb");
        let grid = TestGrid::new(5.0, 45.0, 10.0, 48.0, 1.0);
        write_grid_file_with_order(&path, &[grid], true);

        let reader = Ntv2Reader::open(&path).unwrap();
        assert_extent(reader.extent().unwrap(), grid.expected());
    }

    #[test]
    fn test_unknown_subdataset_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.gsb");
        write_grid_file(
            &path,
            &[
                TestGrid::new(0.0, 0.0, 1.0, 1.0, 0.5),
                TestGrid::new(2.0, 2.0, 3.0, 3.0, 0.5),
            ],
        );

        let reader = Ntv2Reader::open(&path).unwrap();

        for name in [
            format!("NTv2:7:{}", path.display()),
            "NTv2:0:/elsewhere.gsb".to_string(),
            "GTiff:0".to_string(),
        ] {
            assert!(matches!(
                reader.subdataset_extent(&name),
                Err(ReadError::UnknownSubdataset(_))
            ));
        }
    }

    #[test]
    fn test_rejects_non_ntv2_and_truncated_files() {
        let dir = tempdir().unwrap();

        let garbage = dir.path().join("garbage.gsb");
        std::fs::write(&garbage, b"this is not a grid shift file at all").unwrap();
        assert!(matches!(
            Ntv2Reader::open(&garbage),
            Err(ReadError::Format(_))
        ));

        let full = dir.path().join("full.gsb");
        write_grid_file(&full, &[TestGrid::new(0.0, 0.0, 1.0, 1.0, 0.5)]);
        let bytes = std::fs::read(&full).unwrap();
        let truncated = dir.path().join("truncated.gsb");
        std::fs::write(&truncated, &bytes[..RECORD_LEN * 14]).unwrap();
        assert!(matches!(
            Ntv2Reader::open(&truncated),
            Err(ReadError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_bad_increments_and_bounds() {
        let dir = tempdir().unwrap();
        let full = dir.path().join("full.gsb");
        write_grid_file(&full, &[TestGrid::new(0.0, 0.0, 1.0, 1.0, 0.5)]);
        let bytes = std::fs::read(&full).unwrap();

        // Value offsets of the first sub-file's S_LAT, LAT_INC and LONG_INC records.
        let s_lat = RECORD_LEN * 15 + 8;
        let lat_inc = RECORD_LEN * 19 + 8;
        let long_inc = RECORD_LEN * 20 + 8;

        for (i, (offset, value)) in [
            (long_inc, 0.0),
            (lat_inc, -1800.0),
            (long_inc, f64::INFINITY),
            (lat_inc, f64::NAN),
            (s_lat, f64::NAN),
        ]
        .into_iter()
        .enumerate()
        {
            let mut patched = bytes.clone();
            patched[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
            let path = dir.path().join(format!("bad_{}.gsb", i));
            std::fs::write(&path, &patched).unwrap();

            assert!(
                matches!(Ntv2Reader::open(&path), Err(ReadError::Format(_))),
                "value {} at offset {}",
                value,
                offset
            );
        }
    }

    #[test]
    fn test_truncated_data_block_still_opens() {
        let dir = tempdir().unwrap();
        let full = dir.path().join("full.gsb");
        let grid = TestGrid::new(0.0, 0.0, 2.0, 2.0, 0.5);
        write_grid_file(&full, &[grid]);
        let bytes = std::fs::read(&full).unwrap();

        // Drop the END record and the last three grid shift records.
        let truncated = dir.path().join("truncated.gsb");
        std::fs::write(&truncated, &bytes[..bytes.len() - RECORD_LEN * 4]).unwrap();

        let reader = Ntv2Reader::open(&truncated).unwrap();
        assert!(reader.file().data_truncated);
        assert_extent(reader.extent().unwrap(), grid.expected());
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempdir().unwrap();
        let result = Ntv2Reader::open(&dir.path().join("absent.gsb"));
        assert!(matches!(result, Err(ReadError::Open { .. })));
    }
}
