// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;

/// Identifies one of the binary data files making up a [Store](crate::Store).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Segments,
    Names,
    Shapes,
}

impl DataFile {
    /// Conventional name of the file inside a data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Segments => "segments.dat",
            Self::Names => "names.dat",
            Self::Shapes => "chains.dat",
        }
    }
}

impl std::fmt::Display for DataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Error which can occur when loading a [Store](crate::Store).
///
/// All of these are fatal - a store with missing or malformed tables can't answer queries.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("{file}: length {len} is not a multiple of the record size {record_size}")]
    BadLength {
        file: DataFile,
        len: usize,
        record_size: usize,
    },

    #[error("{file}: unexpected end of data at byte {offset}")]
    Truncated { file: DataFile, offset: usize },

    #[error("{file}: negative count {count} at byte {offset}")]
    NegativeCount {
        file: DataFile,
        count: i32,
        offset: usize,
    },

    #[error("{file}: {count} unexpected trailing bytes")]
    TrailingBytes { file: DataFile, count: usize },

    #[error("segment {segment}: negative {table} index {index}")]
    NegativeReference {
        segment: usize,
        table: DataFile,
        index: i32,
    },

    #[error("segment {segment}: {table} index {index} out of range (table has {len} entries)")]
    DanglingReference {
        segment: usize,
        table: DataFile,
        index: usize,
        len: usize,
    },
}
