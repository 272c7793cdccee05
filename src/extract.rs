//! Chunked read-transform-write driver
//!
//! The driver walks the plan's row ranges in order. Each iteration reads one
//! range from the source, transforms it, writes it, and drops it before the
//! next read, so at most one chunk is resident at any time.

use crate::config::ExtractConfig;
use crate::errors::{ExtractError, Result};
use crate::plan::ExtractionPlan;
use crate::source::{Hdf5Matrix, MatrixSource};
use crate::transform::TransformPolicy;
use crate::writer::{ExtractManifest, OutputFile, TextMatrixWriter};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Counters produced by one run of the chunk loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub rows_written: usize,
    pub chunks: usize,
    pub nans_replaced: usize,
}

pub struct ChunkedExtractor<'a, S: MatrixSource> {
    source: &'a S,
    plan: ExtractionPlan,
    policy: TransformPolicy,
}

impl<'a, S: MatrixSource> ChunkedExtractor<'a, S> {
    /// Creates a driver for `plan` over `source`.
    ///
    /// # Errors
    ///
    /// `InvalidShape` if the plan was computed for a different shape or asks
    /// for more rows than the source holds.
    pub fn new(source: &'a S, plan: ExtractionPlan, policy: TransformPolicy) -> Result<Self> {
        let (rows, columns) = source.shape();
        if plan.columns != columns || plan.rows_to_extract > rows {
            return Err(ExtractError::invalid_shape(format!(
                "plan for {} rows × {} columns does not fit source {} ({} × {})",
                plan.rows_to_extract,
                plan.columns,
                source.describe(),
                rows,
                columns
            )));
        }
        Ok(Self {
            source,
            plan,
            policy,
        })
    }

    /// Runs the chunk loop to completion, writing every row to `writer`.
    pub fn run<W: Write>(&self, writer: &mut TextMatrixWriter<W>) -> Result<ExtractStats> {
        let mut stats = ExtractStats::default();

        for range in self.plan.row_ranges() {
            let expected = range.len();
            let start = range.start;
            let raw = self.source.read_rows(range)?;
            if raw.nrows() != expected || raw.ncols() != self.plan.columns {
                return Err(ExtractError::invalid_shape(format!(
                    "read at row {} returned {} × {}, expected {} × {}",
                    start,
                    raw.nrows(),
                    raw.ncols(),
                    expected,
                    self.plan.columns
                )));
            }

            let (chunk, replaced) = self.policy.apply(raw);
            let rows = writer.write_chunk(&chunk)?;
            drop(chunk);

            stats.rows_written += rows;
            stats.chunks += 1;
            stats.nans_replaced += replaced;
            debug!(
                chunk = stats.chunks,
                start,
                rows,
                nans = replaced,
                total = stats.rows_written,
                "Wrote chunk"
            );
        }

        if stats.rows_written != self.plan.rows_to_extract {
            return Err(ExtractError::invalid_shape(format!(
                "wrote {} rows, planned {}",
                stats.rows_written, self.plan.rows_to_extract
            )));
        }
        Ok(stats)
    }
}

/// Outcome of a complete [`extract`] call
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSummary {
    pub output_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub plan: ExtractionPlan,
    pub stats: ExtractStats,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Extracts the configured dataset into the configured text file.
///
/// Opens the HDF5 matrix, computes the plan, streams all chunks through the
/// transform into the output, then commits the output and writes the manifest
/// if requested. All handles are released on every exit path.
///
/// The manifest is written only after the output has been committed. If the
/// manifest write fails the error is returned, the output stays in place, and
/// the missing manifest marks the run as unconfirmed.
pub fn extract(config: &ExtractConfig) -> Result<ExtractSummary> {
    config.validate()?;
    let started = Instant::now();

    let source = Hdf5Matrix::open(&config.input_path, &config.dataset_path)?;
    let plan = ExtractionPlan::new(
        source.shape(),
        config.target_bytes,
        config.element_byte_width,
        config.chunk_row_count,
    )?;
    info!(
        rows_to_extract = plan.rows_to_extract,
        total_rows = plan.total_rows,
        columns = plan.columns,
        chunks = plan.chunk_count(),
        peak_chunk_bytes = plan.peak_chunk_bytes(),
        "Computed extraction plan"
    );
    if plan.rows_to_extract == 0 {
        warn!(
            target_bytes = config.target_bytes,
            columns = plan.columns,
            "Budget is smaller than one row; output will be empty"
        );
    }

    let policy = config.transform_policy();
    let extractor = ChunkedExtractor::new(&source, plan, policy)?;

    let output = OutputFile::create(&config.output_path, config.atomic_write)?;
    let mut writer = TextMatrixWriter::new(output, config.float_format);
    let stats = extractor.run(&mut writer)?;
    let (output, bytes_written) = writer.finish()?;
    let output_path = output.commit()?;

    let manifest_path = if config.write_manifest {
        let manifest = ExtractManifest {
            input: config.input_path.clone(),
            dataset: config.dataset_path.clone(),
            output: output_path.clone(),
            rows: stats.rows_written,
            columns: plan.columns,
            chunks: stats.chunks,
            chunk_row_count: plan.chunk_row_count,
            format: policy.output_kind().to_string(),
            bytes_written,
            created: String::new(),
            complete: true,
        }
        .stamp_now();
        Some(manifest.write()?)
    } else {
        None
    };

    let elapsed = started.elapsed();
    info!(
        rows = stats.rows_written,
        chunks = stats.chunks,
        nans_replaced = stats.nans_replaced,
        bytes = bytes_written,
        output = %output_path.display(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Extraction complete"
    );

    Ok(ExtractSummary {
        output_path,
        manifest_path,
        plan,
        stats,
        bytes_written,
        elapsed,
    })
}
