//! Defines command-line interface options using `clap` for the h5_extract binary.

use crate::config::{parse_byte_size, ExtractConfig};
use crate::errors::Result;
use crate::transform::IntegerType;
use crate::writer::FloatFormat;
use clap::Parser;
use std::path::PathBuf;

/// Extract a large HDF5 matrix into a whitespace-separated text file, chunk by chunk
#[derive(Parser, Debug)]
#[command(
    version,
    name = "h5_extract",
    about = "Bounded-memory HDF5 matrix to text extractor"
)]
pub struct Args {
    /// Path to the HDF5 input file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path of the text file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file; flags given on the command line override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dataset path inside the file [default: t/block0_values]
    #[arg(long)]
    pub dataset: Option<String>,

    /// Approximate output size budget, e.g. 16000, 512M, 1.5G [default: 1.5G]
    #[arg(long, value_parser = parse_byte_size)]
    pub target_size: Option<u64>,

    /// Bytes per element used to turn the size budget into an element count [default: 4]
    #[arg(long)]
    pub element_bytes: Option<u64>,

    /// Rows read and written per iteration [default: 500]
    #[arg(long)]
    pub chunk_rows: Option<usize>,

    /// Keep floating-point values instead of casting to integers
    #[arg(long)]
    pub float: bool,

    /// Integer type for the cast: i32 or i64 [default: i32]
    #[arg(long)]
    pub integer_type: Option<IntegerType>,

    /// Leave NaNs in floating-point output instead of writing 0
    #[arg(long)]
    pub keep_nan: bool,

    /// Float rendering: shortest, fixed:<N> or sci:<N> [default: shortest]
    #[arg(long)]
    pub float_format: Option<FloatFormat>,

    /// Write straight to the output path instead of renaming a temporary file
    #[arg(long)]
    pub no_atomic: bool,

    /// Write <output>.manifest.json after a successful run
    #[arg(long)]
    pub manifest: bool,

    /// List all datasets in the input file
    #[arg(long)]
    pub list_datasets: bool,

    /// Describe a dataset (type, shape, layout, size)
    #[arg(long)]
    pub describe: Option<String>,

    /// Print the extraction plan without writing output
    #[arg(long)]
    pub plan: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Builds the configuration: the `--config` file (or defaults) with every
    /// explicitly given flag applied on top.
    pub fn to_config(&self) -> Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractConfig::from_json_file(path)?,
            None => ExtractConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.clone();
        }
        if let Some(bytes) = self.target_size {
            config.target_bytes = bytes;
        }
        if let Some(width) = self.element_bytes {
            config.element_byte_width = width;
        }
        if let Some(rows) = self.chunk_rows {
            config.chunk_row_count = rows;
        }
        if self.float {
            config.cast_to_integer = false;
        }
        if let Some(integer_type) = self.integer_type {
            config.integer_type = integer_type;
        }
        if self.keep_nan {
            config.replace_nan = false;
        }
        if let Some(format) = self.float_format {
            config.float_format = format;
        }
        if self.no_atomic {
            config.atomic_write = false;
        }
        if self.manifest {
            config.write_manifest = true;
        }

        Ok(config)
    }

    /// True when the run only inspects the input and writes nothing
    #[must_use]
    pub fn is_inspection(&self) -> bool {
        self.list_datasets || self.describe.is_some() || self.plan
    }
}
