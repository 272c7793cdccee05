//! HDF5 store inspection
//!
//! Lists the datasets in a file and describes their type, shape and storage
//! layout, so the right `--dataset` path can be found before extracting.

use crate::errors::Result;
use crate::source::open_dataset;

/// Structured metadata for one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    /// Absolute path inside the file, e.g. `/t/block0_values`
    pub path: String,
    pub data_type: String,
    pub shape: Vec<usize>,
    pub element_size: usize,
    /// Chunk shape for chunked layouts
    pub chunk: Option<Vec<usize>>,
    pub total_elements: usize,
    pub estimated_size_bytes: u64,
}

impl DatasetInfo {
    fn from_dataset(dataset: &hdf5::Dataset) -> Result<Self> {
        let dtype = dataset.dtype()?;
        let data_type = format!("{:?}", dtype.to_descriptor()?).to_lowercase();
        let element_size = dtype.size();
        let shape = dataset.shape();
        let total_elements: usize = shape.iter().product();

        Ok(Self {
            path: dataset.name(),
            data_type,
            shape,
            element_size,
            chunk: dataset.chunk(),
            total_elements,
            estimated_size_bytes: total_elements as u64 * element_size as u64,
        })
    }

    /// True for datasets the extractor can read
    #[must_use]
    pub fn is_matrix(&self) -> bool {
        self.shape.len() == 2
    }

    pub fn print(&self) {
        println!("\n Dataset Description: {}", self.path);
        println!("={}", "=".repeat(self.path.len() + 21));
        println!(" Data type: {}", self.data_type);
        println!(" Shape: ({})", join_shape(&self.shape));
        match &self.chunk {
            Some(chunk) => println!(" Layout: chunked ({})", join_shape(chunk)),
            None => println!(" Layout: contiguous"),
        }

        println!("\n Storage Information:");
        println!("    Total elements: {}", self.total_elements);
        println!("    Element size: {} bytes", self.element_size);
        println!("    Total size: {}", format_bytes(self.estimated_size_bytes));

        if !self.is_matrix() {
            println!("\n⚠ Not a two-dimensional matrix; cannot be extracted");
        }
    }
}

fn join_shape(shape: &[usize]) -> String {
    shape
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" × ")
}

/// Formats a byte count with a binary unit (`1.50 GB`).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} bytes", bytes)
    } else if b < KB * KB {
        format!("{:.2} KB", b / KB)
    } else if b < KB * KB * KB {
        format!("{:.2} MB", b / (KB * KB))
    } else {
        format!("{:.2} GB", b / (KB * KB * KB))
    }
}

/// Lists every dataset in the file, walking groups recursively, sorted by path.
pub fn list_datasets(file: &hdf5::File) -> Result<Vec<DatasetInfo>> {
    let mut found = Vec::new();
    collect_datasets(file, &mut found)?;
    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

fn collect_datasets(group: &hdf5::Group, found: &mut Vec<DatasetInfo>) -> Result<()> {
    for dataset in group.datasets()? {
        found.push(DatasetInfo::from_dataset(&dataset)?);
    }
    for child in group.groups()? {
        collect_datasets(&child, found)?;
    }
    Ok(())
}

/// Describes a single dataset by path.
pub fn describe_dataset(file: &hdf5::File, dataset_path: &str) -> Result<DatasetInfo> {
    let dataset = open_dataset(file, dataset_path)?;
    DatasetInfo::from_dataset(&dataset)
}

/// Prints a listing in the CLI's report style.
pub fn print_datasets(datasets: &[DatasetInfo]) {
    println!("\n Datasets");
    println!("============");

    if datasets.is_empty() {
        println!("   (No datasets found)");
        return;
    }

    for info in datasets {
        let marker = if info.is_matrix() { "" } else { "  (not 2-D)" };
        println!(
            "    {} ({}): ({}){}",
            info.path,
            info.data_type,
            join_shape(&info.shape),
            marker
        );
    }

    println!("\n💡 Tip: Use --dataset <path> to choose the matrix to extract");
}
