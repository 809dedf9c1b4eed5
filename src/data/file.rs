use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::Path,
};

use tracing::{debug, instrument};

use super::Dataset;
use crate::{matrix::Matrix2, prelude::*};

/// Characters that separate values on a line of a data file.
const DELIMS: [char; 3] = [' ', ',', '\t'];

/// Parses delimited numeric text. Blank lines are skipped, the first
/// non-blank line fixes the column count.
pub(crate) fn parse_rows(content: &str) -> Result<Matrix2<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut cols = None;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let row = line
            .split(&DELIMS[..])
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|_| Error::Format {
                    line: idx + 1,
                    reason: format!("'{token}' is not a number"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match cols {
            None => cols = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(Error::Format {
                    line: idx + 1,
                    reason: format!("expected {expected} values, found {}", row.len()),
                })
            }
            Some(_) => {}
        }
        rows.push(row);
    }

    Matrix2::from_vec(rows)
}

impl Dataset {
    /// Reads a dataset from a delimited text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut data = Self::default();
        data.read_from_file(path)?;
        Ok(data)
    }

    /// Replaces this dataset with the contents of `path`. On failure the
    /// dataset keeps its previous contents.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let data = parse_rows(&content)?;
        debug!(rows = data.rows(), cols = data.cols(), "loaded dataset");

        *self = Dataset::from_matrix(data);
        Ok(())
    }

    /// Writes every row as space separated values with 2 decimals,
    /// truncating any existing file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(self.data.format(2, false, 0).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
