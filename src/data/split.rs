use tracing::debug;

use super::Dataset;
use crate::{prelude::*, random::Random};

/// Result of [`Dataset::extract_split`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSplit {
    pub output: Dataset,
    pub remainder: Dataset,
}

impl Dataset {
    /// Moves `length` randomly chosen rows into `output` and every other row
    /// into `remainder`.
    pub fn extract_split(&self, length: usize, random: &mut Random) -> Result<ExtractedSplit> {
        if length > self.rows() {
            return argument_err(format!(
                "cannot extract {length} rows from a dataset of {}",
                self.rows()
            ));
        }

        let mut sets = self.split_into_sets(&[length, self.rows() - length], random);
        let remainder = sets.pop().unwrap_or_default();
        let output = sets.pop().unwrap_or_default();
        Ok(ExtractedSplit { output, remainder })
    }

    /// Splits into `n` sets of `rows / n` rows; the last set also takes the
    /// remainder. `n` is clamped to the row count.
    pub fn split_evenly(&self, n: usize, random: &mut Random) -> Result<Vec<Dataset>> {
        if n == 0 {
            return argument_err("cannot split into zero sets");
        }

        let n = n.min(self.rows()).max(1);
        let even = self.rows() / n;
        let rem = self.rows() - even * n;

        let mut sizes = vec![even; n];
        sizes[n - 1] += rem;
        Ok(self.split_into_sets(&sizes, random))
    }

    /// Splits into sets of exactly the requested sizes. Rows not claimed by
    /// any set are dropped.
    pub fn split_by_amount(&self, counts: &[usize], random: &mut Random) -> Result<Vec<Dataset>> {
        if counts.is_empty() {
            return argument_err("cannot split into zero sets");
        }

        let total: usize = counts.iter().sum();
        if total > self.rows() {
            return argument_err(format!(
                "attempt to split {total} rows from a dataset of {}",
                self.rows()
            ));
        }

        Ok(self.split_into_sets(counts, random))
    }

    /// Splits into sets holding `round(rows * p / 100)` rows for each
    /// percentage `p`. Rows not claimed by any set are dropped.
    pub fn split_by_percentage(
        &self,
        percents: &[f64],
        random: &mut Random,
    ) -> Result<Vec<Dataset>> {
        if percents.is_empty() {
            return argument_err("requires at least one percentage");
        }
        if let Some(p) = percents.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return argument_err(format!("invalid percentage {p}"));
        }

        let total: f64 = percents.iter().sum();
        if total > 100.0 {
            return argument_err(format!("cannot split into {total} percent"));
        }

        let rows = self.rows() as f64;
        let counts: Vec<usize> = percents
            .iter()
            .map(|p| (rows / 100.0 * p).round() as usize)
            .collect();

        if counts.iter().sum::<usize>() > self.rows() {
            return argument_err(format!(
                "percentages {percents:?} round to more than {} rows",
                self.rows()
            ));
        }

        Ok(self.split_into_sets(&counts, random))
    }

    /// Fills each set in turn from one random permutation of the rows.
    /// Callers guarantee `sizes` sums to at most `self.rows()`.
    fn split_into_sets(&self, sizes: &[usize], random: &mut Random) -> Vec<Dataset> {
        let sequence = random.permutation(self.rows());
        let mut order = sequence.into_iter();

        let sets: Vec<Dataset> = sizes
            .iter()
            .map(|&size| {
                let mut set = Dataset::new(size, self.cols());
                for (target, source) in order.by_ref().take(size).enumerate() {
                    set.data.row_mut(target).copy_from_slice(self.data.row(source));
                }
                set
            })
            .collect();

        debug!(?sizes, dropped = order.len(), "split dataset");
        sets
    }
}
