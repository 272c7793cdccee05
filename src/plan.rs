//! Extraction plan: how many rows to emit and how to split them into chunks

use crate::errors::{ExtractError, Result};
use std::ops::Range;

/// Read-only plan computed once before the chunk loop starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub total_rows: usize,
    pub columns: usize,
    /// `target_bytes / element_byte_width`
    pub target_elements: u64,
    /// `min(total_rows, target_elements / columns)`
    pub rows_to_extract: usize,
    pub chunk_row_count: usize,
}

impl ExtractionPlan {
    /// Computes the plan for a matrix of `shape = (rows, columns)`.
    ///
    /// # Errors
    ///
    /// - `InvalidShape` when the matrix has no columns
    /// - `InvalidConfig` when the budget, element width or chunk size is zero
    pub fn new(
        shape: (usize, usize),
        target_bytes: u64,
        element_byte_width: u64,
        chunk_row_count: usize,
    ) -> Result<Self> {
        let (total_rows, columns) = shape;
        if columns == 0 {
            return Err(ExtractError::invalid_shape(format!(
                "matrix has {} rows but no columns",
                total_rows
            )));
        }
        if target_bytes == 0 {
            return Err(ExtractError::invalid_config("target_bytes must be > 0"));
        }
        if element_byte_width == 0 {
            return Err(ExtractError::invalid_config("element_byte_width must be > 0"));
        }
        if chunk_row_count == 0 {
            return Err(ExtractError::invalid_config("chunk_row_count must be > 0"));
        }

        let target_elements = target_bytes / element_byte_width;
        let budget_rows = target_elements / columns as u64;
        // budget_rows may exceed usize on 32-bit targets; the min keeps it <= total_rows
        let rows_to_extract = usize::try_from(budget_rows)
            .map_or(total_rows, |rows| rows.min(total_rows));

        Ok(Self {
            total_rows,
            columns,
            target_elements,
            rows_to_extract,
            chunk_row_count,
        })
    }

    /// Number of loop iterations the driver will perform
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.rows_to_extract.div_ceil(self.chunk_row_count)
    }

    /// Resident size of one decoded `f64` chunk
    #[must_use]
    pub fn peak_chunk_bytes(&self) -> u64 {
        let rows = self.chunk_row_count.min(self.rows_to_extract) as u64;
        rows * self.columns as u64 * std::mem::size_of::<f64>() as u64
    }

    #[must_use]
    pub fn row_ranges(&self) -> RowRanges {
        RowRanges {
            start: 0,
            end: self.rows_to_extract,
            step: self.chunk_row_count,
        }
    }

    /// Prints the plan in the CLI's report style.
    pub fn print(&self) {
        println!("\n Extraction Plan");
        println!("==================");
        println!("    Source shape: ({} × {})", self.total_rows, self.columns);
        println!("    Target elements: {}", self.target_elements);
        println!("    Rows to extract: {}", self.rows_to_extract);
        println!(
            "    Chunks: {} × up to {} rows",
            self.chunk_count(),
            self.chunk_row_count
        );
        println!(
            "    Peak chunk memory: {}",
            crate::metadata::format_bytes(self.peak_chunk_bytes())
        );
    }
}

/// Iterator over consecutive `[start, end)` row ranges of at most `step` rows
#[derive(Debug, Clone)]
pub struct RowRanges {
    start: usize,
    end: usize,
    step: usize,
}

impl Iterator for RowRanges {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.end {
            return None;
        }
        let rows = self.step.min(self.end - self.start);
        let range = self.start..self.start + rows;
        self.start += rows;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end.saturating_sub(self.start)).div_ceil(self.step);
        (n, Some(n))
    }
}

impl ExactSizeIterator for RowRanges {}
