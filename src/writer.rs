//! Text output: chunk formatting, the output file, and the completion manifest
//!
//! Each source row becomes one line of values separated by a single space,
//! terminated by `\n`. Integer chunks are printed like `%d`; float chunks use
//! the configured [`FloatFormat`].

use crate::errors::{ExtractError, Result};
use crate::transform::Chunk;
use chrono::Utc;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::debug;

/// Rendering of floating-point values.
///
/// Serialized as the same `shortest` / `fixed:N` / `sci:N` strings the CLI accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FloatFormat {
    /// Shortest decimal that round-trips (`1`, `0.25`, `NaN`)
    #[default]
    Shortest,
    /// Fixed number of digits after the decimal point
    Fixed(usize),
    /// Scientific notation with the given mantissa precision
    Scientific(usize),
}

impl FloatFormat {
    fn write_value<W: Write>(self, out: &mut W, value: f64) -> io::Result<()> {
        match self {
            Self::Shortest => write!(out, "{}", value),
            Self::Fixed(p) => write!(out, "{:.*}", p, value),
            Self::Scientific(p) => write!(out, "{:.*e}", p, value),
        }
    }
}

impl Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortest => write!(f, "shortest"),
            Self::Fixed(p) => write!(f, "fixed:{}", p),
            Self::Scientific(p) => write!(f, "sci:{}", p),
        }
    }
}

impl FromStr for FloatFormat {
    type Err = String;

    /// Parses `shortest`, `fixed:N` or `sci:N`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let precision = |p: &str| {
            p.parse::<usize>()
                .map_err(|_| format!("Invalid precision '{}' in float format", p))
        };
        match parts.as_slice() {
            ["shortest"] => Ok(Self::Shortest),
            ["fixed", p] => Ok(Self::Fixed(precision(*p)?)),
            ["sci", p] | ["scientific", p] => Ok(Self::Scientific(precision(*p)?)),
            _ => Err(
                "Invalid float format: Expected 'shortest', 'fixed:<N>' or 'sci:<N>'.".to_string(),
            ),
        }
    }
}

impl TryFrom<String> for FloatFormat {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FloatFormat> for String {
    fn from(format: FloatFormat) -> Self {
        format.to_string()
    }
}

/// Streams chunks to a byte sink as whitespace-separated text
pub struct TextMatrixWriter<W: Write> {
    inner: BufWriter<CountingWriter<W>>,
    float_format: FloatFormat,
}

impl<W: Write> TextMatrixWriter<W> {
    pub fn new(inner: W, float_format: FloatFormat) -> Self {
        Self {
            inner: BufWriter::new(CountingWriter {
                inner,
                bytes: 0,
            }),
            float_format,
        }
    }

    /// Writes every row of `chunk`, returning the number of rows written.
    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<usize> {
        let rows = match chunk {
            Chunk::Int32(a) => write_rows(&mut self.inner, a, |w, v| write!(w, "{}", v))?,
            Chunk::Int64(a) => write_rows(&mut self.inner, a, |w, v| write!(w, "{}", v))?,
            Chunk::Float(a) => {
                let format = self.float_format;
                write_rows(&mut self.inner, a, |w, v| format.write_value(w, *v))?
            }
        };
        Ok(rows)
    }

    /// Flushes all buffered output and returns the sink with the total byte count.
    pub fn finish(self) -> Result<(W, u64)> {
        let counting = self
            .inner
            .into_inner()
            .map_err(|e| ExtractError::IoWrite(e.into_error()))?;
        let CountingWriter { mut inner, bytes } = counting;
        inner.flush()?;
        Ok((inner, bytes))
    }
}

fn write_rows<W, T, F>(out: &mut W, array: &Array2<T>, mut write_value: F) -> io::Result<usize>
where
    W: Write,
    F: FnMut(&mut W, &T) -> io::Result<()>,
{
    for row in array.rows() {
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.write_all(b" ")?;
            }
            write_value(out, value)?;
        }
        out.write_all(b"\n")?;
    }
    Ok(array.nrows())
}

struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Destination text file.
///
/// In atomic mode the data goes to a hidden temporary file next to the
/// destination and is renamed over it by [`OutputFile::commit`]. Dropping an
/// uncommitted atomic output removes the temporary file. In direct mode bytes
/// land in the destination immediately and stay there if the run fails.
pub enum OutputFile {
    Atomic { temp: NamedTempFile, dest: PathBuf },
    Direct { file: File, dest: PathBuf },
}

impl OutputFile {
    pub fn create(dest: &Path, atomic: bool) -> Result<Self> {
        if atomic {
            let dir = match dest.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let temp = tempfile::Builder::new()
                .prefix(".h5_extract-")
                .suffix(".tmp")
                .tempfile_in(dir)?;
            debug!(
                temp = %temp.path().display(),
                dest = %dest.display(),
                "Writing via temporary file"
            );
            Ok(Self::Atomic {
                temp,
                dest: dest.to_path_buf(),
            })
        } else {
            let file = File::create(dest)?;
            Ok(Self::Direct {
                file,
                dest: dest.to_path_buf(),
            })
        }
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        match self {
            Self::Atomic { dest, .. } | Self::Direct { dest, .. } => dest,
        }
    }

    /// Syncs the data to disk and moves it under the destination name.
    pub fn commit(self) -> Result<PathBuf> {
        match self {
            Self::Atomic { temp, dest } => {
                temp.as_file().sync_all()?;
                temp.persist(&dest).map_err(|e| ExtractError::IoWrite(e.error))?;
                Ok(dest)
            }
            Self::Direct { file, dest } => {
                file.sync_all()?;
                Ok(dest)
            }
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Atomic { temp, .. } => temp.write(buf),
            Self::Direct { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Atomic { temp, .. } => temp.flush(),
            Self::Direct { file, .. } => file.flush(),
        }
    }
}

/// Sidecar record written after a successful extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractManifest {
    pub input: PathBuf,
    pub dataset: String,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub chunks: usize,
    pub chunk_row_count: usize,
    pub format: String,
    pub bytes_written: u64,
    pub created: String,
    pub complete: bool,
}

impl ExtractManifest {
    /// Path of the manifest belonging to `output`: `<output>.manifest.json`.
    #[must_use]
    pub fn path_for(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_os_string();
        name.push(".manifest.json");
        PathBuf::from(name)
    }

    #[must_use]
    pub fn stamp_now(mut self) -> Self {
        self.created = Utc::now().to_rfc3339();
        self
    }

    /// Writes the manifest next to the output, via a temporary file renamed
    /// into place, so a reader never sees a half-written manifest.
    pub fn write(&self) -> Result<PathBuf> {
        let path = Self::path_for(&self.output);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".h5_extract-")
            .suffix(".manifest.tmp")
            .tempfile_in(dir)?;
        self.write_to(&mut temp)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| ExtractError::IoWrite(e.error))?;
        Ok(path)
    }

    /// Serializes the manifest as pretty JSON into `out`.
    ///
    /// Failures of `out` surface as `IoWrite`.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        out.write_all(&bytes)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
