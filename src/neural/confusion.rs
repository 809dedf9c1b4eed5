use std::fmt::{self, Display};

use crate::matrix::Matrix2;

/// Counts of (actual class, predicted class) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    counts: Matrix2<usize>,
}

impl ConfusionMatrix {
    pub fn new(classes: usize) -> Self {
        Self {
            counts: Matrix2::new(classes, classes),
        }
    }

    pub fn classes(&self) -> usize {
        self.counts.rows()
    }

    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.counts[(actual, predicted)] += 1;
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts[(actual, predicted)]
    }

    /// Number of evaluated rows whose true class is `actual`.
    pub fn actual_total(&self, actual: usize) -> usize {
        self.counts.row(actual).iter().sum()
    }

    /// Number of evaluated rows predicted as `predicted`.
    pub fn predicted_total(&self, predicted: usize) -> usize {
        (0..self.classes()).map(|a| self.counts[(a, predicted)]).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter_rows().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.classes()).map(|c| self.counts[(c, c)]).sum()
    }

    pub fn counts(&self) -> &Matrix2<usize> {
        &self.counts
    }
}

/// One line per predicted class, one 4-wide column per actual class.
impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.classes();
        let divider = "-".repeat(n * 7);

        for predicted in 0..n {
            for actual in 0..n {
                write!(f, "{:>4} ", self.counts[(actual, predicted)])?;
                if actual != n - 1 {
                    f.write_str("| ")?;
                }
            }
            writeln!(f)?;
            if predicted != n - 1 {
                writeln!(f, "{divider}")?;
            }
        }
        Ok(())
    }
}
