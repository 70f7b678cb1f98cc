// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::{manhattan_distance, Point, RoadSegment, StreetName};

mod codec;
mod error;
mod index;

pub use codec::{
    write_segments, write_shapes, write_street_names, SEGMENT_RECORD_SIZE,
    STREET_NAME_RECORD_SIZE,
};
pub use error::{DataFile, LoadError};
pub use index::EndpointIndex;

/// Compression of the data files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Compression {
    /// Guess the compression from the file extension (`.gz` or `.bz2`).
    /// When loading a directory, compressed variants of the data files are looked up
    /// if the uncompressed ones don't exist.
    #[default]
    Auto,

    /// Force uncompressed files
    None,

    /// Force [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    Gzip,

    /// Force [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    Bzip2,
}

impl Compression {
    fn for_path(self, path: &Path) -> Self {
        match self {
            Self::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some("gz") => Self::Gzip,
                Some("bz2") => Self::Bzip2,
                _ => Self::None,
            },
            other => other,
        }
    }
}

/// Additional controls for loading a [Store].
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    pub compression: Compression,
}

/// Immutable in-memory road network: tables of [RoadSegments](RoadSegment),
/// shape polylines and [StreetNames](StreetName).
///
/// Everything is accessed by index; the index of a segment is its identity.
/// The store is never modified after construction and can be shared between
/// any number of threads.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Store {
    segments: Vec<RoadSegment>,
    streets: Vec<StreetName>,
    shapes: Vec<Vec<Point>>,
}

impl Store {
    /// Creates a store from already decoded tables, checking that every segment
    /// refers to an existing street and shape.
    pub fn new(
        segments: Vec<RoadSegment>,
        streets: Vec<StreetName>,
        shapes: Vec<Vec<Point>>,
    ) -> Result<Self, LoadError> {
        for (idx, s) in segments.iter().enumerate() {
            if s.street as usize >= streets.len() {
                return Err(LoadError::DanglingReference {
                    segment: idx,
                    table: DataFile::Names,
                    index: s.street as usize,
                    len: streets.len(),
                });
            }

            if let Some(shape) = s.shape {
                if shape as usize >= shapes.len() {
                    return Err(LoadError::DanglingReference {
                        segment: idx,
                        table: DataFile::Shapes,
                        index: shape as usize,
                        len: shapes.len(),
                    });
                }
            }
        }

        Ok(Self {
            segments,
            streets,
            shapes,
        })
    }

    /// Decodes a store from the in-memory contents of the three data files.
    pub fn from_buffers(segments: &[u8], names: &[u8], shapes: &[u8]) -> Result<Self, LoadError> {
        let store = Self::new(
            codec::decode_segments(segments)?,
            codec::decode_street_names(names)?,
            codec::decode_shapes(shapes)?,
        )?;

        log::info!(
            "loaded {} segments, {} streets and {} shapes",
            store.segment_count(),
            store.street_count(),
            store.shape_count(),
        );

        Ok(store)
    }

    /// Reads a store from three streams with the contents of the data files.
    ///
    /// Streams are read to the end; wrap them in a decoder if they are compressed.
    pub fn from_io<S: io::Read, N: io::Read, C: io::Read>(
        mut segments: S,
        mut names: N,
        mut shapes: C,
    ) -> Result<Self, LoadError> {
        let mut segments_buf = Vec::default();
        let mut names_buf = Vec::default();
        let mut shapes_buf = Vec::default();

        segments.read_to_end(&mut segments_buf)?;
        names.read_to_end(&mut names_buf)?;
        shapes.read_to_end(&mut shapes_buf)?;

        Self::from_buffers(&segments_buf, &names_buf, &shapes_buf)
    }

    /// Loads a store from files at the provided paths, decompressing them as per the [LoadOptions].
    pub fn load<P1: AsRef<Path>, P2: AsRef<Path>, P3: AsRef<Path>>(
        segments: P1,
        names: P2,
        shapes: P3,
        options: &LoadOptions,
    ) -> Result<Self, LoadError> {
        Self::from_io(
            open_data_file(segments.as_ref(), options.compression)?,
            open_data_file(names.as_ref(), options.compression)?,
            open_data_file(shapes.as_ref(), options.compression)?,
        )
    }

    /// Loads `segments.dat`, `names.dat` and `chains.dat` from the provided directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P, options: &LoadOptions) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        Self::load(
            data_file_path(dir, DataFile::Segments, options.compression),
            data_file_path(dir, DataFile::Names, options.compression),
            data_file_path(dir, DataFile::Shapes, options.compression),
            options,
        )
    }

    /// Returns the number of segments in the store.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the number of street names in the store.
    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    /// Returns the number of shape polylines in the store.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Retrieves the [RoadSegment] with the provided index.
    pub fn segment(&self, idx: usize) -> Option<&RoadSegment> {
        self.segments.get(idx)
    }

    /// Returns all segments; the position in the slice is the segment's index.
    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    /// Retrieves the intermediate points of the shape with the provided index.
    pub fn shapeline(&self, idx: usize) -> Option<&[Point]> {
        self.shapes.get(idx).map(|s| s.as_slice())
    }

    /// Retrieves the intermediate points of a segment, empty for straight segments.
    pub fn segment_shape(&self, segment: &RoadSegment) -> &[Point] {
        segment
            .shape
            .and_then(|idx| self.shapeline(idx as usize))
            .unwrap_or_default()
    }

    /// Returns an iterator over the full geometry of a segment:
    /// its start point, all shape points and its end point.
    pub fn segment_geometry<'a>(
        &'a self,
        segment: &'a RoadSegment,
    ) -> impl Iterator<Item = Point> + 'a {
        std::iter::once(segment.start)
            .chain(self.segment_shape(segment).iter().copied())
            .chain(std::iter::once(segment.end))
    }

    /// Retrieves the [StreetName] with the provided index.
    pub fn street_name(&self, idx: usize) -> Option<&StreetName> {
        self.streets.get(idx)
    }

    /// Returns all street names; the position in the slice is the street's index.
    pub fn street_names(&self) -> &[StreetName] {
        &self.streets
    }

    /// Returns a human-readable name of the street with the provided index.
    pub fn format_street_name(&self, idx: usize) -> Option<String> {
        self.street_name(idx).map(|s| s.to_string())
    }

    /// Returns an iterator over all segments with an endpoint at `p`.
    ///
    /// This requires a walk over the whole segment table; see [EndpointIndex]
    /// for a faster alternative.
    pub fn segments_at(&self, p: Point) -> impl Iterator<Item = (usize, &RoadSegment)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.touches(p))
    }

    /// Finds the interstate segment whose start or end point is closest to `p`,
    /// measured with [manhattan_distance].
    ///
    /// This function requires computing the distance to every segment in the store.
    pub fn find_closest_highway(&self, p: Point) -> Option<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_interstate())
            .map(|(idx, s)| {
                let d = manhattan_distance(s.start, p).min(manhattan_distance(s.end, p));
                (d, idx)
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, idx)| idx)
    }

    /// Returns a [std::fmt::Display] adapter describing the segment with the provided index.
    pub fn describe_segment(&self, idx: usize) -> Option<SegmentDisplay<'_>> {
        self.segment(idx).map(|segment| SegmentDisplay {
            store: self,
            segment,
        })
    }
}

/// Human-readable description of a [RoadSegment]: its street name, address ranges and road class.
#[derive(Debug, Clone, Copy)]
pub struct SegmentDisplay<'a> {
    store: &'a Store,
    segment: &'a RoadSegment,
}

impl std::fmt::Display for SegmentDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.segment;
        match self.store.street_name(s.street as usize) {
            Some(street) => write!(f, "{}", street)?,
            None => write!(f, "<street {}>", s.street)?,
        }
        write!(
            f,
            " (L:{:04}-{:04} R:{:04}-{:04}) -A{}-",
            s.start_address_left,
            s.end_address_left,
            s.start_address_right,
            s.end_address_right,
            s.road_class,
        )
    }
}

fn data_file_path(dir: &Path, file: DataFile, compression: Compression) -> PathBuf {
    let plain = dir.join(file.file_name());

    let extension = match compression {
        Compression::None => return plain,
        Compression::Gzip => return with_suffix(&plain, ".gz"),
        Compression::Bzip2 => return with_suffix(&plain, ".bz2"),
        Compression::Auto => [".gz", ".bz2"]
            .into_iter()
            .find(|ext| !plain.exists() && with_suffix(&plain, ext).exists()),
    };

    match extension {
        Some(ext) => with_suffix(&plain, ext),
        None => plain,
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn open_data_file(path: &Path, compression: Compression) -> Result<Box<dyn io::Read>, LoadError> {
    let f = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    log::debug!("reading {}", path.display());

    let reader: Box<dyn io::Read> = match compression.for_path(path) {
        Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(io::BufReader::new(f))),
        Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(io::BufReader::new(f))),
        _ => Box::new(f),
    };
    Ok(reader)
}
