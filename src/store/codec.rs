// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Fixed-layout little-endian records of the `segments.dat`, `names.dat` and `chains.dat` files.

use std::io;

use super::{DataFile, LoadError};
use crate::{Point, RoadSegment, StreetName};

/// Size of a single serialized [RoadSegment] - 10 32-bit integers,
/// 1 byte of road class and 3 bytes of padding.
pub const SEGMENT_RECORD_SIZE: usize = 44;

/// Size of a single serialized [StreetName] - 2 + 30 + 4 + 2 space-padded characters.
pub const STREET_NAME_RECORD_SIZE: usize = 38;

/// Value of the shape index marking straight segments.
const NO_SHAPE: i32 = -1;

/// Cursor over a byte buffer, reporting [LoadError::Truncated] instead of panicking.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
    file: DataFile,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], file: DataFile) -> Self {
        Self {
            data,
            offset: 0,
            file,
        }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], LoadError> {
        let chunk = self
            .data
            .get(self.offset..self.offset + N)
            .ok_or(LoadError::Truncated {
                file: self.file,
                offset: self.offset,
            })?;
        self.offset += N;

        let mut out = [0; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    #[inline]
    fn i32(&mut self) -> Result<i32, LoadError> {
        self.bytes::<4>().map(i32::from_le_bytes)
    }

    #[inline]
    fn u8(&mut self) -> Result<u8, LoadError> {
        self.bytes::<1>().map(|b| b[0])
    }

    #[inline]
    fn point(&mut self) -> Result<Point, LoadError> {
        let longitude = self.i32()?;
        let latitude = self.i32()?;
        Ok(Point {
            longitude,
            latitude,
        })
    }

    /// Reads a non-negative 32-bit count.
    fn count(&mut self) -> Result<usize, LoadError> {
        let offset = self.offset;
        let count = self.i32()?;
        usize::try_from(count).map_err(|_| LoadError::NegativeCount {
            file: self.file,
            count,
            offset,
        })
    }
}

fn check_record_length(data: &[u8], file: DataFile, record_size: usize) -> Result<(), LoadError> {
    if data.len() % record_size != 0 {
        Err(LoadError::BadLength {
            file,
            len: data.len(),
            record_size,
        })
    } else {
        Ok(())
    }
}

/// Decodes the contents of a `segments.dat` file.
///
/// References to streets and shapes are not validated here, see [crate::Store::new].
pub fn decode_segments(data: &[u8]) -> Result<Vec<RoadSegment>, LoadError> {
    check_record_length(data, DataFile::Segments, SEGMENT_RECORD_SIZE)?;

    data.chunks_exact(SEGMENT_RECORD_SIZE)
        .enumerate()
        .map(|(idx, record)| decode_segment(idx, record))
        .collect()
}

fn decode_segment(idx: usize, record: &[u8]) -> Result<RoadSegment, LoadError> {
    let mut r = ByteReader::new(record, DataFile::Segments);
    let start_address_left = r.i32()?;
    let end_address_left = r.i32()?;
    let start_address_right = r.i32()?;
    let end_address_right = r.i32()?;
    let street = r.i32()?;
    let shape = r.i32()?;
    let start = r.point()?;
    let end = r.point()?;
    let road_class = r.u8()?;

    let street = u32::try_from(street).map_err(|_| LoadError::NegativeReference {
        segment: idx,
        table: DataFile::Names,
        index: street,
    })?;

    Ok(RoadSegment {
        start_address_left,
        end_address_left,
        start_address_right,
        end_address_right,
        street,
        // Any negative value marks a straight line
        shape: u32::try_from(shape).ok(),
        start,
        end,
        road_class,
    })
}

/// Decodes the contents of a `names.dat` file.
pub fn decode_street_names(data: &[u8]) -> Result<Vec<StreetName>, LoadError> {
    check_record_length(data, DataFile::Names, STREET_NAME_RECORD_SIZE)?;

    data.chunks_exact(STREET_NAME_RECORD_SIZE)
        .map(|record| {
            let mut r = ByteReader::new(record, DataFile::Names);
            Ok(StreetName {
                prefix: r.bytes::<2>()?,
                name: r.bytes::<30>()?,
                type_: r.bytes::<4>()?,
                suffix: r.bytes::<2>()?,
            })
        })
        .collect()
}

/// Decodes the contents of a `chains.dat` file: an entry count, followed by
/// entries made of a point count and that many points.
pub fn decode_shapes(data: &[u8]) -> Result<Vec<Vec<Point>>, LoadError> {
    let mut r = ByteReader::new(data, DataFile::Shapes);
    let count = r.count()?;

    // Every entry takes at least 4 bytes; don't trust the header for the allocation
    let mut shapes = Vec::with_capacity(count.min(r.remaining() / 4));

    for _ in 0..count {
        let points = r.count()?;
        let mut shape = Vec::with_capacity(points.min(r.remaining() / 8));
        for _ in 0..points {
            shape.push(r.point()?);
        }
        shapes.push(shape);
    }

    match r.remaining() {
        0 => Ok(shapes),
        count => Err(LoadError::TrailingBytes {
            file: DataFile::Shapes,
            count,
        }),
    }
}

/// Writes [RoadSegments](RoadSegment) in the `segments.dat` format.
pub fn write_segments<W: io::Write>(mut w: W, segments: &[RoadSegment]) -> io::Result<()> {
    for s in segments {
        let mut record = Vec::with_capacity(SEGMENT_RECORD_SIZE);
        for value in [
            s.start_address_left,
            s.end_address_left,
            s.start_address_right,
            s.end_address_right,
            s.street as i32,
            s.shape.map(|i| i as i32).unwrap_or(NO_SHAPE),
            s.start.longitude,
            s.start.latitude,
            s.end.longitude,
            s.end.latitude,
        ] {
            record.extend_from_slice(&value.to_le_bytes());
        }
        record.extend_from_slice(&[s.road_class, 0, 0, 0]);
        debug_assert_eq!(record.len(), SEGMENT_RECORD_SIZE);
        w.write_all(&record)?;
    }
    Ok(())
}

/// Writes [StreetNames](StreetName) in the `names.dat` format.
pub fn write_street_names<W: io::Write>(mut w: W, streets: &[StreetName]) -> io::Result<()> {
    for s in streets {
        w.write_all(&s.prefix)?;
        w.write_all(&s.name)?;
        w.write_all(&s.type_)?;
        w.write_all(&s.suffix)?;
    }
    Ok(())
}

/// Writes shape polylines in the `chains.dat` format.
pub fn write_shapes<W: io::Write, S: AsRef<[Point]>>(mut w: W, shapes: &[S]) -> io::Result<()> {
    w.write_all(&count_to_i32(shapes.len())?.to_le_bytes())?;
    for shape in shapes {
        let points = shape.as_ref();
        w.write_all(&count_to_i32(points.len())?.to_le_bytes())?;
        for p in points {
            w.write_all(&p.longitude.to_le_bytes())?;
            w.write_all(&p.latitude.to_le_bytes())?;
        }
    }
    Ok(())
}

fn count_to_i32(count: usize) -> io::Result<i32> {
    i32::try_from(count).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("count {count} does not fit in 32 bits"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_segment() -> RoadSegment {
        RoadSegment {
            start_address_left: 4201,
            end_address_left: 4299,
            start_address_right: 4200,
            end_address_right: 4298,
            street: 7,
            shape: Some(3),
            start: Point::new(28_054_000, -82_412_000),
            end: Point::new(28_054_000, -82_410_500),
            road_class: 41,
        }
    }

    #[test]
    fn segment_record_layout() {
        let mut buf = Vec::new();
        write_segments(&mut buf, &[sample_segment()]).unwrap();

        assert_eq!(buf.len(), SEGMENT_RECORD_SIZE);
        assert_eq!(&buf[0..4], &4201i32.to_le_bytes());
        assert_eq!(&buf[16..20], &7i32.to_le_bytes());
        assert_eq!(&buf[24..28], &(-82_412_000i32).to_le_bytes());
        assert_eq!(&buf[28..32], &28_054_000i32.to_le_bytes());
        assert_eq!(buf[40], 41);

        assert_eq!(decode_segments(&buf).unwrap(), vec![sample_segment()]);
    }

    #[test]
    fn negative_shape_index_is_straight_line() {
        let straight = RoadSegment {
            shape: None,
            ..sample_segment()
        };
        let mut buf = Vec::new();
        write_segments(&mut buf, &[straight]).unwrap();
        assert_eq!(&buf[20..24], &(-1i32).to_le_bytes());

        buf[20..24].copy_from_slice(&(-7i32).to_le_bytes());
        assert_eq!(decode_segments(&buf).unwrap()[0].shape, None);
    }

    #[test]
    fn negative_street_index_is_rejected() {
        let mut buf = Vec::new();
        write_segments(&mut buf, &[sample_segment()]).unwrap();
        buf[16..20].copy_from_slice(&(-1i32).to_le_bytes());

        assert!(matches!(
            decode_segments(&buf),
            Err(LoadError::NegativeReference {
                segment: 0,
                table: DataFile::Names,
                index: -1,
            })
        ));

        let err = decode_segments(&buf).unwrap_err();
        assert_eq!(err.to_string(), "segment 0: negative names.dat index -1");
    }

    #[test]
    fn segments_with_partial_record() {
        let mut buf = Vec::new();
        write_segments(&mut buf, &[sample_segment(), sample_segment()]).unwrap();
        buf.pop();

        assert!(matches!(
            decode_segments(&buf),
            Err(LoadError::BadLength {
                file: DataFile::Segments,
                len: 87,
                record_size: SEGMENT_RECORD_SIZE,
            })
        ));
    }

    #[test]
    fn street_names() {
        let streets = [
            StreetName::new("W", "Nassau", "St", ""),
            StreetName::new("", "Morris Bridge", "Rd", ""),
        ];
        let mut buf = Vec::new();
        write_street_names(&mut buf, &streets).unwrap();

        assert_eq!(buf.len(), 2 * STREET_NAME_RECORD_SIZE);
        assert_eq!(&buf[0..8], b"W Nassau");
        assert_eq!(decode_street_names(&buf).unwrap(), streets);

        assert!(matches!(
            decode_street_names(&buf[..50]),
            Err(LoadError::BadLength {
                file: DataFile::Names,
                ..
            })
        ));
    }

    #[test]
    fn shapes_round_trip() {
        let shapes = vec![
            vec![Point::new(1, 2), Point::new(3, 4), Point::new(5, 6)],
            vec![],
            vec![Point::new(-7, -8)],
            vec![],
        ];
        let mut buf = Vec::new();
        write_shapes(&mut buf, &shapes).unwrap();

        assert_eq!(buf.len(), 4 + 4 * 4 + 4 * 8);
        assert_eq!(decode_shapes(&buf).unwrap(), shapes);
    }

    #[test]
    fn empty_shape_table() {
        let mut buf = Vec::new();
        write_shapes::<_, Vec<Point>>(&mut buf, &[]).unwrap();
        assert_eq!(buf, 0i32.to_le_bytes());
        assert!(decode_shapes(&buf).unwrap().is_empty());

        assert!(matches!(
            decode_shapes(&[]),
            Err(LoadError::Truncated {
                file: DataFile::Shapes,
                offset: 0
            })
        ));
    }

    #[test]
    fn truncated_shapes() {
        let mut buf = Vec::new();
        write_shapes(&mut buf, &[vec![Point::new(1, 2), Point::new(3, 4)]]).unwrap();
        buf.truncate(buf.len() - 3);

        assert!(matches!(
            decode_shapes(&buf),
            Err(LoadError::Truncated {
                file: DataFile::Shapes,
                offset: 20
            })
        ));
    }

    #[test]
    fn shapes_with_bad_counts() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&(-2i32).to_le_bytes());
        assert!(matches!(
            decode_shapes(&buf),
            Err(LoadError::NegativeCount {
                count: -2,
                offset: 4,
                ..
            })
        ));

        let mut buf = Vec::new();
        write_shapes(&mut buf, &[vec![Point::new(1, 2)]]).unwrap();
        buf.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode_shapes(&buf),
            Err(LoadError::TrailingBytes { count: 2, .. })
        ));
    }
}
