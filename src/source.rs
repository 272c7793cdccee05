//! Row-addressable matrix sources
//!
//! [`MatrixSource`] is the seam between the chunk driver and the storage
//! format. [`Hdf5Matrix`] reads row ranges from an HDF5 dataset through
//! hyperslab selections, so only the requested rows are ever decoded.
//! [`ArrayMatrix`] serves an in-memory array through the same interface.

use crate::errors::{ExtractError, Result};
use ndarray::{s, Array2};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

/// A two-dimensional numeric matrix that can be read by contiguous row ranges
pub trait MatrixSource {
    /// `(rows, columns)`
    fn shape(&self) -> (usize, usize);

    /// Reads rows `[rows.start, rows.end)` with all columns as `f64`.
    fn read_rows(&self, rows: Range<usize>) -> Result<Array2<f64>>;

    /// Human-readable name used in logs
    fn describe(&self) -> String;
}

fn check_range(rows: &Range<usize>, total: usize) -> Result<()> {
    if rows.start > rows.end || rows.end > total {
        return Err(ExtractError::invalid_shape(format!(
            "row range {}..{} is outside 0..{}",
            rows.start, rows.end, total
        )));
    }
    Ok(())
}

/// Two-dimensional dataset inside an open HDF5 file.
///
/// The file handle is owned so the store stays open for exactly as long as the
/// matrix is alive.
pub struct Hdf5Matrix {
    _file: hdf5::File,
    dataset: hdf5::Dataset,
    file_path: PathBuf,
    dataset_path: String,
    rows: usize,
    columns: usize,
    element_size: usize,
}

impl Hdf5Matrix {
    /// Opens `dataset_path` (e.g. `t/block0_values`) in the file at `path`.
    ///
    /// # Errors
    ///
    /// - `Hdf5Error` if the file cannot be opened
    /// - `DatasetNotFound` if any component of `dataset_path` is missing
    /// - `InvalidShape` if the dataset is not two-dimensional
    pub fn open(path: &Path, dataset_path: &str) -> Result<Self> {
        let file = hdf5::File::open(path)?;
        let dataset = open_dataset(&file, dataset_path)?;

        let shape = dataset.shape();
        if shape.len() != 2 {
            return Err(ExtractError::invalid_shape(format!(
                "dataset '{}' has {} dimensions, expected 2",
                dataset_path,
                shape.len()
            )));
        }
        let element_size = dataset.dtype()?.size();

        info!(
            file = %path.display(),
            dataset = dataset_path,
            rows = shape[0],
            columns = shape[1],
            element_size,
            "Opened HDF5 matrix"
        );

        Ok(Self {
            _file: file,
            dataset,
            file_path: path.to_path_buf(),
            dataset_path: dataset_path.to_string(),
            rows: shape[0],
            columns: shape[1],
            element_size,
        })
    }

    /// Size in bytes of one stored element
    #[must_use]
    pub fn element_size(&self) -> usize {
        self.element_size
    }
}

/// Resolves a slash-separated dataset path, checking each link in turn so a
/// missing intermediate group reports the path instead of an HDF5 error stack.
pub(crate) fn open_dataset(file: &hdf5::File, dataset_path: &str) -> Result<hdf5::Dataset> {
    let not_found = || ExtractError::DatasetNotFound {
        path: dataset_path.to_string(),
    };

    let trimmed = dataset_path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(not_found());
    }

    let mut prefix = String::new();
    for part in trimmed.split('/') {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        if !file.link_exists(&prefix) {
            return Err(not_found());
        }
    }

    file.dataset(trimmed).map_err(|_| not_found())
}

impl MatrixSource for Hdf5Matrix {
    fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    fn read_rows(&self, rows: Range<usize>) -> Result<Array2<f64>> {
        check_range(&rows, self.rows)?;
        if rows.is_empty() {
            return Ok(Array2::zeros((0, self.columns)));
        }
        Ok(self.dataset.read_slice_2d::<f64, _>((rows, ..))?)
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.file_path.display(), self.dataset_path)
    }
}

/// In-memory matrix, mainly for embedding and tests
#[derive(Debug, Clone)]
pub struct ArrayMatrix {
    data: Array2<f64>,
}

impl ArrayMatrix {
    #[must_use]
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Builds a `rows × columns` matrix from row-major values.
    pub fn from_shape_vec(rows: usize, columns: usize, values: Vec<f64>) -> Result<Self> {
        Ok(Self::new(Array2::from_shape_vec((rows, columns), values)?))
    }
}

impl MatrixSource for ArrayMatrix {
    fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    fn read_rows(&self, rows: Range<usize>) -> Result<Array2<f64>> {
        check_range(&rows, self.data.nrows())?;
        Ok(self.data.slice(s![rows, ..]).to_owned())
    }

    fn describe(&self) -> String {
        let (r, c) = self.data.dim();
        format!("in-memory matrix ({} × {})", r, c)
    }
}
