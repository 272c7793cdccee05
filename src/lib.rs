//! h5_extract: bounded-memory extraction of HDF5 matrices to text
//!
//! Reads a two-dimensional numeric dataset from an HDF5 file in fixed-size row
//! chunks, replaces NaNs with zero, optionally casts to a fixed-width integer
//! type, and writes one whitespace-separated line per row. Only one chunk is
//! resident at a time, so peak memory is bounded by
//! `chunk_row_count × columns × 8` bytes regardless of the dataset size.
//!
//! ## Key Features
//!
//! - **Byte budget**: emit as many whole rows as fit in a target output size
//! - **Chunked reads**: HDF5 hyperslab selection, never the whole matrix
//! - **Integer or float output**: `%d`-style integers or configurable floats
//! - **Atomic output**: temporary file renamed into place on success
//! - **Manifest**: optional JSON sidecar recording what was written
//! - **Inspection**: list and describe the datasets in a store
//!
//! ## Module Organization
//!
//! - [`config`]: extraction options, JSON loading, size parsing
//! - [`plan`]: row budget and chunk ranges
//! - [`source`]: row-addressable matrix sources (HDF5, in-memory)
//! - [`transform`]: NaN replacement and integer casts
//! - [`writer`]: text formatting, output file, manifest
//! - [`extract`]: the chunked read-transform-write driver
//! - [`metadata`]: HDF5 dataset listing and description
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use h5_extract::prelude::*;
//!
//! let mut config = ExtractConfig::new("matrix.h5", "extracted_matrix.txt");
//! config.target_bytes = parse_byte_size("1.5G").unwrap();
//!
//! let summary = h5_extract::extract::extract(&config).unwrap();
//! println!("Extracted {} rows", summary.stats.rows_written);
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod metadata;
pub mod plan;
pub mod source;
pub mod transform;
pub mod writer;

pub use errors::*;

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{parse_byte_size, ExtractConfig};
    pub use crate::errors::{ExtractError, Result};
    pub use crate::extract::{extract, ChunkedExtractor, ExtractStats, ExtractSummary};
    pub use crate::plan::ExtractionPlan;
    pub use crate::source::{ArrayMatrix, Hdf5Matrix, MatrixSource};
    pub use crate::transform::{Chunk, IntegerType, TransformPolicy};
    pub use crate::writer::{ExtractManifest, FloatFormat, OutputFile, TextMatrixWriter};
}
