//! Extraction configuration
//!
//! One [`ExtractConfig`] covers every variant of the job: the size budget, the
//! element width used to convert it into an element count, and whether values
//! are cast to integers or kept as floats. It can be built in code, loaded from
//! a JSON file, or assembled from command-line flags.

use crate::errors::{ExtractError, Result};
use crate::transform::{IntegerType, TransformPolicy};
use crate::writer::FloatFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dataset path of the value block in a pandas `HDFStore` fixed-format table
pub const DEFAULT_DATASET_PATH: &str = "t/block0_values";

/// Rows read per iteration
pub const DEFAULT_CHUNK_ROWS: usize = 500;

/// 1.5 GiB
pub const DEFAULT_TARGET_BYTES: u64 = 3 * 512 * 1024 * 1024;

/// Width of an `int32`
pub const DEFAULT_ELEMENT_BYTES: u64 = 4;

const ACCEPTED_ELEMENT_WIDTHS: [u64; 4] = [1, 2, 4, 8];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub dataset_path: String,
    /// Approximate output size budget in bytes
    pub target_bytes: u64,
    /// Bytes per element used to turn `target_bytes` into an element count
    pub element_byte_width: u64,
    pub chunk_row_count: usize,
    /// Replace NaNs and cast to `integer_type`, or keep floating point
    pub cast_to_integer: bool,
    pub integer_type: IntegerType,
    /// NaN to 0 for floating-point output
    pub replace_nan: bool,
    pub float_format: FloatFormat,
    /// Write to a temporary file and rename it into place on success
    pub atomic_write: bool,
    /// Write `<output>.manifest.json` after a successful run
    pub write_manifest: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_path: PathBuf::new(),
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
            target_bytes: DEFAULT_TARGET_BYTES,
            element_byte_width: DEFAULT_ELEMENT_BYTES,
            chunk_row_count: DEFAULT_CHUNK_ROWS,
            cast_to_integer: true,
            integer_type: IntegerType::I32,
            replace_nan: true,
            float_format: FloatFormat::Shortest,
            atomic_write: true,
            write_manifest: false,
        }
    }
}

impl ExtractConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::invalid_config(format!(
                "cannot read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Checks option values that would make the extraction meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(ExtractError::invalid_config("input_path is required"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ExtractError::invalid_config("output_path is required"));
        }
        if self.dataset_path.trim_matches('/').is_empty() {
            return Err(ExtractError::invalid_config("dataset_path is empty"));
        }
        if self.target_bytes == 0 {
            return Err(ExtractError::invalid_config("target_bytes must be > 0"));
        }
        if !ACCEPTED_ELEMENT_WIDTHS.contains(&self.element_byte_width) {
            return Err(ExtractError::invalid_config(format!(
                "element_byte_width must be one of {:?}, got {}",
                ACCEPTED_ELEMENT_WIDTHS, self.element_byte_width
            )));
        }
        if self.chunk_row_count == 0 {
            return Err(ExtractError::invalid_config("chunk_row_count must be > 0"));
        }
        Ok(())
    }

    #[must_use]
    pub fn transform_policy(&self) -> TransformPolicy {
        if self.cast_to_integer {
            TransformPolicy::integer(self.integer_type)
        } else {
            TransformPolicy::float(self.replace_nan)
        }
    }
}

/// Parses a byte size such as `16000`, `512K`, `1.5G`, `1.5GiB` or `2MB`.
///
/// Suffixes are binary: `K`, `KB` and `KiB` all mean 1024 bytes.
pub fn parse_byte_size(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid size '{}': expected a number with optional unit", s))?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        other => return Err(format!("Invalid size unit '{}' in '{}'", other, s)),
    };

    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes < 1.0 {
        return Err(format!("Size '{}' must be at least one byte", s));
    }
    Ok(bytes as u64)
}
