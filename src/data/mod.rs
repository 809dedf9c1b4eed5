//! Labeled tabular data: one row per sample, features first, then the
//! target columns.

mod file;
mod split;

pub use split::ExtractedSplit;

use crate::{matrix::Matrix2, prelude::*};
use tracing::debug;

/// Min-max scaling applied to one column by [`Dataset::normalize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnScale {
    pub min: f64,
    pub max: f64,
    /// `1 / (max - min)`
    pub scale: f64,
}

impl ColumnScale {
    /// Maps a normalized value back onto the column's original range.
    pub fn restore(&self, value: f64) -> f64 {
        value / self.scale + self.min
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    data: Matrix2<f64>,
    /// Filled lazily, one slot per column, by the first normalization.
    scales: Vec<Option<ColumnScale>>,
}

impl Dataset {
    /// Zero-filled dataset of `rows` x `cols`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_matrix(Matrix2::new(rows, cols))
    }

    /// `rows` rows with no columns yet.
    pub fn with_rows(rows: usize) -> Self {
        Self::new(rows, 0)
    }

    pub fn from_matrix(data: Matrix2<f64>) -> Self {
        Self {
            data,
            scales: Vec::new(),
        }
    }

    pub fn from_vec(rows: Vec<Vec<f64>>) -> Result<Self> {
        Ok(Self::from_matrix(Matrix2::from_vec(rows)?))
    }

    pub fn rows(&self) -> usize {
        self.data.rows()
    }

    pub fn cols(&self) -> usize {
        self.data.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    pub fn data(&self) -> &Matrix2<f64> {
        &self.data
    }

    pub fn row(&self, row: usize) -> Result<&[f64]> {
        if row >= self.rows() {
            return Err(Error::Range {
                row,
                col: 0,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        Ok(self.data.row(row))
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data.get(row, col).copied()
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.data.set(row, col, value)
    }

    /// Replaces a whole row. Fails with `Range` when `index` is out of bounds
    /// and `DimensionErr` when `values` has the wrong width.
    pub fn set_row(&mut self, index: usize, values: &[f64]) -> Result<()> {
        self.data.set_row(index, values)
    }

    /// The grid as nested rows.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.data.clone().to_vec()
    }

    /// Replaces the grid. A ragged input leaves the dataset untouched.
    pub fn set_matrix(&mut self, rows: Vec<Vec<f64>>) -> Result<()> {
        self.data = Matrix2::from_vec(rows)?;
        self.scales.clear();
        Ok(())
    }

    /// The scaling recorded for `column` by the last normalization, if any.
    pub fn normalization(&self, column: usize) -> Option<ColumnScale> {
        self.scales.get(column).copied().flatten()
    }

    /// Min-max scales every column in `first..=last` to [0, 1], each column
    /// independently. Fails without modifying anything when the range is out of
    /// bounds or a column has zero range.
    pub fn normalize(&mut self, first: usize, last: usize) -> Result<()> {
        if first > last || last >= self.cols() {
            return argument_err(format!(
                "cannot normalize columns {first}..={last} of a dataset with {} columns",
                self.cols()
            ));
        }
        if self.is_empty() {
            return argument_err("cannot normalize an empty dataset");
        }

        let mut found = Vec::with_capacity(last - first + 1);
        for col in first..=last {
            let (min, max) = self.data.iter_rows().map(|row| row[col]).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), x| (min.min(x), max.max(x)),
            );
            if max - min == 0.0 {
                return Err(Error::ZeroRange { column: col });
            }
            found.push(ColumnScale {
                min,
                max,
                scale: 1.0 / (max - min),
            });
        }

        if self.scales.len() != self.cols() {
            self.scales = vec![None; self.cols()];
        }

        for (col, scale) in (first..=last).zip(found) {
            for row in 0..self.rows() {
                let x = &mut self.data[(row, col)];
                *x = (*x - scale.min) * scale.scale;
            }
            debug!(col, min = scale.min, max = scale.max, "normalized column");
            self.scales[col] = Some(scale);
        }
        Ok(())
    }

    /// Returns a copy with `column` replaced by `num_classes` one-hot columns.
    pub fn exemplar(&self, column: usize, num_classes: usize, start_at: i64) -> Result<Dataset> {
        let mut out = self.clone();
        out.make_exemplar(column, num_classes, start_at)?;
        Ok(out)
    }

    /// Replaces `column` in place with `num_classes` one-hot columns. A row
    /// whose class value is `d` gets a 1 in block position `d - start_at`.
    /// Every other column keeps its order.
    pub fn make_exemplar(&mut self, column: usize, num_classes: usize, start_at: i64) -> Result<()> {
        if column >= self.cols() {
            return argument_err(format!(
                "exemplar column {column} out of range for {} columns",
                self.cols()
            ));
        }
        if num_classes == 0 {
            return argument_err("exemplar needs at least one class");
        }

        let mut classes = Vec::with_capacity(self.rows());
        for (row, values) in self.data.iter_rows().enumerate() {
            let class = (values[column] as i64)
                .checked_sub(start_at)
                .and_then(|c| usize::try_from(c).ok())
                .filter(|&c| c < num_classes);
            match class {
                Some(class) => classes.push(class),
                None => {
                    return argument_err(format!(
                        "row {row}: class value {} is not one of the {num_classes} classes starting at {start_at}",
                        values[column]
                    ))
                }
            }
        }

        let old_cols = self.cols();
        let Some(new_cols) = (old_cols - 1).checked_add(num_classes) else {
            return argument_err(format!("{num_classes} exemplar columns do not fit in a dataset"));
        };
        self.data.resize_cols(new_cols);

        // Walk right to left so no column is overwritten before it is moved.
        for (row, class) in classes.into_iter().enumerate() {
            let values = self.data.row_mut(row);
            for col in (column + 1..old_cols).rev() {
                values[col + num_classes - 1] = values[col];
            }
            for j in 0..num_classes {
                values[column + j] = if j == class { 1.0 } else { 0.0 };
            }
        }

        if !self.scales.is_empty() {
            let tail = self.scales.split_off(column + 1);
            self.scales.truncate(column);
            self.scales.resize(column + num_classes, None);
            self.scales.extend(tail);
        }
        Ok(())
    }

    /// Every row, prefixed with a "TOTAL" header.
    pub fn show_all(&self, precision: usize) -> String {
        format!(
            "TOTAL > Rows: {}, Columns: {}\n{}",
            self.rows(),
            self.cols(),
            self.data.format(precision, false, 0)
        )
    }

    /// The top-left `rows` x `cols` corner, bracketed, with an optional header.
    pub fn show_part(&self, rows: usize, cols: usize, precision: usize, header: &str) -> String {
        let rows = rows.min(self.rows());
        let cols = cols.min(self.cols());

        let mut out = String::new();
        if !header.trim().is_empty() {
            out.push_str(header);
            out.push('\n');
        }
        out.push_str(&format!(
            "TOTAL > Rows: {}, Columns: {}\n",
            self.rows(),
            self.cols()
        ));
        out.push_str(&format!("SHOWN > Rows: {rows}, Columns: {cols}\n"));
        for row in 0..rows {
            out.push('[');
            for x in &self.data.row(row)[..cols] {
                out.push_str(&format!(" {x:.precision$}"));
            }
            out.push_str(" ]\n");
        }
        out
    }
}
