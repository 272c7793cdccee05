//! Per-chunk value transforms: NaN replacement and integer casting
//!
//! Chunks are always decoded from the store as `f64`. The transform consumes
//! that raw chunk and produces a [`Chunk`] ready for the text writer.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer width used when casting is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegerType {
    /// 32-bit signed integers
    #[default]
    I32,
    /// 64-bit signed integers
    I64,
}

impl IntegerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I32 => "int32",
            Self::I64 => "int64",
        }
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "i32" | "int32" => Ok(Self::I32),
            "i64" | "int64" => Ok(Self::I64),
            other => Err(format!(
                "Invalid integer type '{}': expected 'i32' or 'i64'",
                other
            )),
        }
    }
}

/// A transformed chunk, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Float(Array2<f64>),
    Int32(Array2<i32>),
    Int64(Array2<i64>),
}

/// Conversion from `f64` that truncates toward zero.
///
/// Values outside the target range saturate to `MIN`/`MAX` and NaN maps to 0,
/// which is what Rust's `as` cast does for float-to-int.
pub trait TruncatingCast: Copy {
    fn truncate_from(value: f64) -> Self;
}

impl TruncatingCast for i32 {
    fn truncate_from(value: f64) -> Self {
        value as i32
    }
}

impl TruncatingCast for i64 {
    fn truncate_from(value: f64) -> Self {
        value as i64
    }
}

/// Replaces every NaN in `chunk` with 0 and returns how many were replaced.
pub fn replace_nan(chunk: &mut Array2<f64>) -> usize {
    let mut replaced = 0;
    chunk.mapv_inplace(|v| {
        if v.is_nan() {
            replaced += 1;
            0.0
        } else {
            v
        }
    });
    replaced
}

/// Casts every value to `T`, truncating toward zero.
#[must_use]
pub fn cast_truncating<T: TruncatingCast>(chunk: &Array2<f64>) -> Array2<T> {
    chunk.mapv(T::truncate_from)
}

/// How raw chunks are turned into output chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformPolicy {
    /// Integer target, or `None` to keep floating-point values
    pub cast: Option<IntegerType>,
    /// Replace NaN with 0 for floating-point output. Always on when casting.
    pub replace_nan: bool,
}

impl TransformPolicy {
    #[must_use]
    pub const fn integer(target: IntegerType) -> Self {
        Self {
            cast: Some(target),
            replace_nan: true,
        }
    }

    #[must_use]
    pub const fn float(replace_nan: bool) -> Self {
        Self {
            cast: None,
            replace_nan,
        }
    }

    /// Applies the policy, consuming the raw chunk.
    ///
    /// Returns the transformed chunk and the number of NaNs replaced.
    pub fn apply(&self, mut raw: Array2<f64>) -> (Chunk, usize) {
        let replaced = if self.cast.is_some() || self.replace_nan {
            replace_nan(&mut raw)
        } else {
            0
        };

        let chunk = match self.cast {
            Some(IntegerType::I32) => Chunk::Int32(cast_truncating(&raw)),
            Some(IntegerType::I64) => Chunk::Int64(cast_truncating(&raw)),
            None => Chunk::Float(raw),
        };
        (chunk, replaced)
    }

    /// Label recorded in manifests and logs
    #[must_use]
    pub fn output_kind(&self) -> &'static str {
        match self.cast {
            Some(t) => t.as_str(),
            None => "float64",
        }
    }
}

impl Default for TransformPolicy {
    fn default() -> Self {
        Self::integer(IntegerType::I32)
    }
}
