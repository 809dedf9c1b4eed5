use std::{
    fmt::{self, Display},
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::mpsc,
};

use tracing::{info, instrument};

use crate::{data::Dataset, neural::NeuralNet, prelude::*, viz::Visualizer};

/// Errors and accuracies measured after one training epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number
    pub epoch: usize,
    pub train_mse: f64,
    pub test_mse: f64,
    /// Percent
    pub train_accuracy: f64,
    /// Percent
    pub test_accuracy: f64,
}

/// `epoch trainMSE testMSE trainAcc% testAcc%`, the line written to the log file.
impl Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.2}% {:.2}%",
            self.epoch, self.train_mse, self.test_mse, self.train_accuracy, self.test_accuracy
        )
    }
}

/// Runs stochastic backpropagation epochs over a training set, scoring a
/// held-out set after each one.
#[derive(Debug, Clone)]
pub struct Optimizer {
    epochs: usize,
    rate: f64,
    log: Option<PathBuf>,
}

impl Optimizer {
    pub fn new(epochs: usize, rate: f64) -> Self {
        Self {
            epochs,
            rate,
            log: None,
        }
    }

    /// Write one report line per epoch to `log`. The file is truncated when
    /// training starts.
    pub fn with_log(mut self, log: Option<PathBuf>) -> Self {
        self.log = log;
        self
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    pub fn set_epochs(&mut self, epochs: usize) {
        self.epochs = epochs;
    }

    /// Trains `net` and returns the report of every epoch. The network's
    /// accuracy histories are replaced by this run.
    pub fn train(
        &self,
        net: &mut NeuralNet,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<Vec<EpochReport>> {
        self.run(net, train, test, |_| {})
    }

    /// Same as [`Optimizer::train`], with a window plotting the accuracies as
    /// training runs on a background thread.
    pub fn train_gui<Gui: Visualizer>(
        &self,
        net: &mut NeuralNet,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<Vec<EpochReport>> {
        std::thread::scope(|scope| -> Result<Vec<EpochReport>> {
            let (tx, rx) = mpsc::channel();
            let handle = scope.spawn(move || {
                self.run(net, train, test, |report| {
                    // the window may already be closed
                    let _ = tx.send(*report);
                })
            });

            let shown = eframe::run_native(
                "RustANN",
                eframe::NativeOptions::default(),
                Box::new(|cc| Box::new(Gui::new(cc, rx))),
            );

            let reports = handle.join().map_err(|_| Error::Visualizer)??;
            shown.map_err(|_| Error::Visualizer)?;
            Ok(reports)
        })
    }

    #[instrument(skip_all, fields(epochs = self.epochs, rate = self.rate))]
    fn run(
        &self,
        net: &mut NeuralNet,
        train: &Dataset,
        test: &Dataset,
        mut on_epoch: impl FnMut(&EpochReport),
    ) -> Result<Vec<EpochReport>> {
        net.check_width(train)?;
        net.check_width(test)?;

        let mut log = match &self.log {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };

        net.training_accuracy = Vec::with_capacity(self.epochs);
        net.testing_accuracy = Vec::with_capacity(self.epochs);
        let mut reports = Vec::with_capacity(self.epochs);

        for epoch in 0..self.epochs {
            net.train_epoch(train, self.rate)?;
            let report = Self::measure(net, train, test, epoch + 1)?;

            net.training_accuracy.push(report.train_accuracy);
            net.testing_accuracy.push(report.test_accuracy);

            if let Some(log) = log.as_mut() {
                writeln!(log, "{report}")?;
            }
            info!(
                epoch = report.epoch,
                train_mse = report.train_mse,
                test_mse = report.test_mse,
                train_accuracy = report.train_accuracy,
                test_accuracy = report.test_accuracy,
                "epoch finished"
            );

            on_epoch(&report);
            reports.push(report);
        }

        if let Some(mut log) = log {
            log.flush()?;
        }
        Ok(reports)
    }

    fn measure(
        net: &mut NeuralNet,
        train: &Dataset,
        test: &Dataset,
        epoch: usize,
    ) -> Result<EpochReport> {
        Ok(EpochReport {
            epoch,
            train_mse: net.mean_squared_error(train)?,
            test_mse: net.mean_squared_error(test)?,
            train_accuracy: net.accuracy(train)? * 100.0,
            test_accuracy: net.accuracy(test)? * 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Random;

    fn xor_like() -> Dataset {
        Dataset::from_vec(vec![
            vec![0.9, 0.1, 1.0, 0.0],
            vec![0.8, 0.3, 1.0, 0.0],
            vec![0.2, 0.7, 0.0, 1.0],
            vec![0.1, 0.9, 0.0, 1.0],
        ])
        .unwrap()
    }

    fn net() -> NeuralNet {
        NeuralNet::with_random(2, 3, 2, Random::seeded(5)).unwrap()
    }

    #[test]
    fn report_line() {
        let report = EpochReport {
            epoch: 3,
            train_mse: 0.5,
            test_mse: 0.123_456_7,
            train_accuracy: 75.0,
            test_accuracy: 66.666,
        };
        assert_eq!(report.to_string(), "3 0.500000 0.123457 75.00% 66.67%");
    }

    #[test]
    fn histories_follow_the_last_run() {
        let mut net = net();
        let data = xor_like();

        Optimizer::new(4, 0.1).train(&mut net, &data, &data).unwrap();
        assert_eq!(net.training_accuracy().len(), 4);

        let reports = Optimizer::new(2, 0.1).train(&mut net, &data, &data).unwrap();
        assert_eq!(net.training_accuracy().len(), 2);
        assert_eq!(net.testing_accuracy().len(), 2);
        assert_eq!(net.training_accuracy()[1], reports[1].train_accuracy);
        assert_eq!(reports.iter().map(|r| r.epoch).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn zero_epochs_changes_nothing() {
        let mut net = net();
        let before = net.get_weights();

        let reports = Optimizer::new(0, 0.1)
            .train(&mut net, &xor_like(), &xor_like())
            .unwrap();

        assert!(reports.is_empty());
        assert!(net.training_accuracy().is_empty());
        assert_eq!(net.get_weights(), before);
    }

    #[test]
    fn accuracies_are_percentages() {
        let mut net = net();
        let data = xor_like();
        Optimizer::new(3, 0.1).train(&mut net, &data, &data).unwrap();

        // four rows: every accuracy is a multiple of 25 percent
        for &acc in net.training_accuracy() {
            assert!((0.0..=100.0).contains(&acc));
            assert_eq!(acc % 25.0, 0.0);
        }
    }

    #[test]
    fn empty_test_set() {
        let mut net = net();
        let reports = Optimizer::new(2, 0.1)
            .train(&mut net, &xor_like(), &Dataset::default())
            .unwrap();

        assert!(reports.iter().all(|r| r.test_accuracy == 0.0 && r.test_mse == 0.0));
    }

    #[test]
    fn mismatched_width_fails_before_training() {
        let mut net = net();
        let before = net.get_weights();
        let narrow = Dataset::new(2, 3);

        assert!(Optimizer::new(5, 0.1).train(&mut net, &xor_like(), &narrow).is_err());
        assert_eq!(net.get_weights(), before);
    }

    #[test]
    fn writes_log_file() {
        let path = std::env::temp_dir().join(format!("rust_ann_{}_train.log", std::process::id()));
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut net = net();
        let data = xor_like();
        let reports = Optimizer::new(3, 0.1)
            .with_log(Some(path.clone()))
            .train(&mut net, &data, &data)
            .unwrap();

        let log = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], reports[2].to_string());
        assert!(lines[0].starts_with("1 "));

        std::fs::remove_file(path).unwrap();
    }
}
