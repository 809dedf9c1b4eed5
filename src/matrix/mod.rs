use crate::prelude::*;
use std::{
    fmt::{self, Display},
    ops::{Index, IndexMut},
};

pub mod ops;

/// Row-major resizable 2D grid. Every row holds exactly `cols` elements.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Matrix2<T> {
    data: Vec<T>,
    dim: (usize, usize),
}

impl<T: Default + Clone> Matrix2<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            dim: (rows, cols),
        }
    }

    /// Changes the row count, dropping trailing rows or appending zeroed ones.
    pub fn resize_rows(&mut self, rows: usize) {
        self.data.resize(rows * self.cols(), T::default());
        self.dim.0 = rows;
    }

    /// Changes the column count. Values below the old width are preserved,
    /// new cells are zeroed.
    pub fn resize_cols(&mut self, cols: usize) {
        let (rows, old_cols) = self.dim;
        if cols == old_cols {
            return;
        }

        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            let kept = old_cols.min(cols);
            data.extend_from_slice(&self.data[row * old_cols..row * old_cols + kept]);
            data.resize(data.len() + cols - kept, T::default());
        }

        self.data = data;
        self.dim.1 = cols;
    }

    /// Replaces row `row` with `values`.
    pub fn set_row(&mut self, row: usize, values: &[T]) -> Result<()> {
        if row >= self.rows() {
            return Err(self.range_err(row, 0));
        }
        if values.len() != self.cols() {
            return Err(Error::DimensionErr);
        }

        let cols = self.cols();
        self.data[row * cols..(row + 1) * cols].clone_from_slice(values);
        Ok(())
    }
}

impl<T> Matrix2<T> {
    pub fn from_array<const R: usize, const C: usize>(arr: [[T; C]; R]) -> Self {
        let mut data = Vec::with_capacity(R * C);

        for row in arr {
            for x in row {
                data.push(x);
            }
        }

        Self { data, dim: (R, C) }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.dim.0
    }

    pub fn cols(&self) -> usize {
        self.dim.1
    }

    /// Borrow one row as a slice. Panics when `row` is out of range.
    pub fn row(&self, row: usize) -> &[T] {
        let cols = self.cols();
        &self.data[row * cols..(row + 1) * cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let cols = self.cols();
        &mut self.data[row * cols..(row + 1) * cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows()).map(move |row| self.row(row))
    }

    /// Bounds-checked access.
    pub fn get(&self, row: usize, col: usize) -> Result<&T> {
        if row >= self.rows() || col >= self.cols() {
            return Err(self.range_err(row, col));
        }
        Ok(&self[(row, col)])
    }

    /// Bounds-checked write.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(self.range_err(row, col));
        }
        self[(row, col)] = value;
        Ok(())
    }

    pub fn from_row(row_vec: Vec<T>) -> Self {
        Self {
            dim: (1, row_vec.len()),
            data: row_vec,
        }
    }

    pub fn from_vec(vec: Vec<Vec<T>>) -> Result<Self> {
        let rows = vec.len();
        let cols = vec.first().map(|row| row.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(rows * cols);
        for row in vec {
            if cols != row.len() {
                return Err(Error::DimensionErr);
            }

            data.extend(row);
        }

        Ok(Self {
            data,
            dim: (rows, cols),
        })
    }

    pub fn to_vec(self) -> Vec<Vec<T>> {
        let cols = self.cols();
        let mut res = Vec::with_capacity(self.rows());
        let mut data = self.data.into_iter();
        for _ in 0..self.dim.0 {
            res.push(data.by_ref().take(cols).collect());
        }
        res
    }

    /// Consumes a single-row matrix into its elements.
    pub fn into_row(self) -> Vec<T> {
        self.data
    }

    fn range_err(&self, row: usize, col: usize) -> Error {
        Error::Range {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }
}

impl<T: Display> Matrix2<T> {
    /// Renders one line per row with `precision` decimals. `verbose` wraps
    /// each row in `[ ... ]`, `padding` right-aligns every field to that width.
    pub fn format(&self, precision: usize, verbose: bool, padding: usize) -> String {
        let mut out = String::new();
        for row in self.iter_rows() {
            let line = format_values(row, precision, verbose, padding);
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Renders a vector of values on one line, in the same style as `Matrix2::format`.
pub fn format_values<T: Display>(
    values: &[T],
    precision: usize,
    verbose: bool,
    padding: usize,
) -> String {
    let line = values
        .iter()
        .map(|x| format!("{x:>padding$.precision$}"))
        .collect::<Vec<_>>()
        .join(" ");
    if verbose {
        format!("[ {line} ]")
    } else {
        line
    }
}

impl<T: Display> Display for Matrix2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(6, false, 0))
    }
}

impl<T> Matrix2<T>
where
    T: Default,
{
    /// Applies a function to every element of the matrix
    pub fn apply<F: Fn(T) -> T>(&mut self, f: F) {
        for x in &mut self.data {
            let old = std::mem::take(x);
            *x = f(old);
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix2<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.cols() + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix2<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        let idx = i * self.cols() + j;
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn access_matrix2_from_array() {
        let matrix = Matrix2::from_array([[1, 2, 3], [4, 5, 6]]);
        assert_eq!(matrix[(0, 1)], 2);
        assert_eq!(matrix[(1, 2)], 6);
        assert_eq!(matrix[(0, 0)], 1);
        assert_eq!(matrix[(1, 1)], 5);
        assert_eq!(matrix.row(1), &[4, 5, 6]);
    }

    #[test]
    fn matrix2_from_vec() {
        let vec = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let matrix = Matrix2::from_vec(vec).unwrap();

        assert_eq!(matrix[(0, 1)], 2);
        assert_eq!(matrix[(1, 2)], 6);
        assert_eq!(matrix[(0, 0)], 1);
        assert_eq!(matrix[(1, 1)], 5);
    }

    #[test]
    fn matrix2_from_vec_err() {
        let vec = vec![vec![1, 2, 3], vec![4, 5, 9], vec![1, 2]];
        assert!(matches!(Matrix2::from_vec(vec), Err(Error::DimensionErr)));

        let vec = vec![vec![1, 2], vec![4, 5, 9], vec![1, 2, 2]];
        assert!(matches!(Matrix2::from_vec(vec), Err(Error::DimensionErr)));
    }

    #[test]
    fn matrix2_apply() {
        let mut matrix = Matrix2::from_array([[1, 2], [2, 2], [4, 8]]);

        matrix.apply(|x| x / 2);

        assert_eq!(matrix.to_vec(), [[0, 1], [1, 1], [2, 4]]);
    }

    #[test]
    fn checked_access() {
        let mut matrix = Matrix2::<f64>::new(2, 3);
        assert!(matrix.set(1, 2, 4.5).is_ok());
        assert_eq!(*matrix.get(1, 2).unwrap(), 4.5);

        assert!(matches!(
            matrix.get(2, 0),
            Err(Error::Range {
                row: 2,
                rows: 2,
                cols: 3,
                ..
            })
        ));
        assert!(matches!(matrix.set(0, 3, 1.0), Err(Error::Range { .. })));
    }

    #[test]
    fn set_row_checks_bounds_and_width() {
        let mut matrix = Matrix2::<i32>::new(2, 2);
        assert!(matrix.set_row(1, &[7, 8]).is_ok());
        assert_eq!(matrix.row(1), &[7, 8]);

        assert!(matches!(matrix.set_row(2, &[1, 1]), Err(Error::Range { .. })));
        assert!(matches!(matrix.set_row(0, &[1]), Err(Error::DimensionErr)));
    }

    #[test]
    fn resize_cols_preserves_values() {
        let mut matrix = Matrix2::from_array([[1, 2], [3, 4]]);

        matrix.resize_cols(4);
        assert_eq!(matrix.dim(), (2, 4));
        assert_eq!(matrix.clone().to_vec(), [[1, 2, 0, 0], [3, 4, 0, 0]]);

        matrix.resize_cols(1);
        assert_eq!(matrix.to_vec(), [[1], [3]]);
    }

    #[test]
    fn resize_rows_zero_fills() {
        let mut matrix = Matrix2::from_array([[1, 2], [3, 4]]);

        matrix.resize_rows(3);
        assert_eq!(matrix.clone().to_vec(), [[1, 2], [3, 4], [0, 0]]);

        matrix.resize_rows(1);
        assert_eq!(matrix.to_vec(), [[1, 2]]);
    }

    #[test]
    fn rows_without_columns() {
        let mut matrix = Matrix2::<f64>::new(3, 0);
        assert_eq!(matrix.dim(), (3, 0));

        matrix.resize_cols(2);
        assert_eq!(matrix.to_vec(), [[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]]);
    }

    #[test]
    fn format_plain_and_verbose() {
        let matrix = Matrix2::from_array([[1.0, -2.5], [0.126, 3.0]]);

        assert_eq!(matrix.format(2, false, 0), "1.00 -2.50\n0.13 3.00\n");
        assert_eq!(
            matrix.format(1, true, 5),
            "[   1.0  -2.5 ]\n[   0.1   3.0 ]\n"
        );
        assert_eq!(format_values(&[0.5, 1.0], 3, true, 0), "[ 0.500 1.000 ]");
    }
}
