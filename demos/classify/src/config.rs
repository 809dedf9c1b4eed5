use std::{fmt, path::PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

/// Settings of one classification run. Also defines the config file format
/// (every field can be omitted).
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// First and last feature column to min-max scale
    pub normalize: Option<(usize, usize)>,
    /// Column holding the class label
    pub class_column: Option<usize>,
    pub classes: Option<usize>,
    /// Label of the first class
    pub start_at: Option<i64>,
    pub hidden: Option<usize>,
    pub epochs: Option<usize>,
    pub rate: Option<f64>,
    pub momentum: Option<f64>,
    pub decay: Option<f64>,
    pub seed: Option<u64>,
    /// Per-epoch report file
    pub log: Option<PathBuf>,
    /// Where the trained weights are written
    pub save: Option<PathBuf>,
    pub precision: Option<usize>,
    pub verbose_save: Option<bool>,
}

impl RunConfig {
    // merge configs where the second overwrites the first
    pub fn merge(self, other: Self) -> Self {
        Self {
            normalize: other.normalize.or(self.normalize),
            class_column: other.class_column.or(self.class_column),
            classes: other.classes.or(self.classes),
            start_at: other.start_at.or(self.start_at),
            hidden: other.hidden.or(self.hidden),
            epochs: other.epochs.or(self.epochs),
            rate: other.rate.or(self.rate),
            momentum: other.momentum.or(self.momentum),
            decay: other.decay.or(self.decay),
            seed: other.seed.or(self.seed),
            log: other.log.or(self.log),
            save: other.save.or(self.save),
            precision: other.precision.or(self.precision),
            verbose_save: other.verbose_save.or(self.verbose_save),
        }
    }

    pub fn resolve(self) -> Result<Run, MissingSetting> {
        Ok(Run {
            normalize: self.normalize.ok_or(MissingSetting("normalize"))?,
            class_column: self.class_column.ok_or(MissingSetting("class_column"))?,
            classes: self.classes.ok_or(MissingSetting("classes"))?,
            start_at: self.start_at.unwrap_or(1),
            hidden: self.hidden.ok_or(MissingSetting("hidden"))?,
            epochs: self.epochs.ok_or(MissingSetting("epochs"))?,
            rate: self.rate.ok_or(MissingSetting("rate"))?,
            momentum: self.momentum.unwrap_or(0.0),
            decay: self.decay.unwrap_or(0.0),
            seed: self.seed,
            log: self.log,
            save: self.save,
            precision: self.precision.unwrap_or(8),
            verbose_save: self.verbose_save.unwrap_or(false),
        })
    }
}

/// A [`RunConfig`] with every required setting present.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub normalize: (usize, usize),
    pub class_column: usize,
    pub classes: usize,
    pub start_at: i64,
    pub hidden: usize,
    pub epochs: usize,
    pub rate: f64,
    pub momentum: f64,
    pub decay: f64,
    pub seed: Option<u64>,
    pub log: Option<PathBuf>,
    pub save: Option<PathBuf>,
    pub precision: usize,
    pub verbose_save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingSetting(pub &'static str);

impl fmt::Display for MissingSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no value for `{}`: pass it on the command line, in --config or pick a --recipe",
            self.0
        )
    }
}

impl std::error::Error for MissingSetting {}

/// Preset pipelines for the UCI datasets the classifier was tuned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Recipe {
    /// 4 features, 3 species labelled 1..=3
    Iris,
    /// 9 features, benign or malignant labelled 1..=2
    Cancer,
    /// 13 features, 3 cultivars labelled 1..=3
    Wine,
}

impl Recipe {
    pub fn config(self) -> RunConfig {
        let (features, classes, hidden, epochs, rate) = match self {
            Recipe::Iris => (4, 3, 5, 100, 0.1),
            Recipe::Cancer => (9, 2, 3, 14, 0.03),
            Recipe::Wine => (13, 3, 5, 70, 0.05),
        };
        RunConfig {
            normalize: Some((0, features - 1)),
            class_column: Some(features),
            classes: Some(classes),
            start_at: Some(1),
            hidden: Some(hidden),
            epochs: Some(epochs),
            rate: Some(rate),
            ..RunConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_config_wins() {
        let file = RunConfig {
            epochs: Some(10),
            rate: Some(0.5),
            ..RunConfig::default()
        };
        let cli = RunConfig {
            epochs: Some(3),
            ..RunConfig::default()
        };

        let merged = Recipe::Iris.config().merge(file).merge(cli);
        assert_eq!(merged.epochs, Some(3));
        assert_eq!(merged.rate, Some(0.5));
        assert_eq!(merged.hidden, Some(5));
    }

    #[test]
    fn recipes_resolve() {
        let run = Recipe::Wine.config().resolve().unwrap();
        assert_eq!(run.normalize, (0, 12));
        assert_eq!(run.class_column, 13);
        assert_eq!((run.classes, run.hidden, run.epochs), (3, 5, 70));
        assert_eq!(run.precision, 8);
        assert!(!run.verbose_save);
    }

    #[test]
    fn missing_setting_is_named() {
        let err = RunConfig::default().resolve().unwrap_err();
        assert_eq!(err, MissingSetting("normalize"));
    }

    #[test]
    fn parses_yaml() {
        let config: RunConfig = serde_yaml::from_str(
            "normalize: [0, 8]\nclass_column: 9\nclasses: 2\nhidden: 3\nepochs: 14\nrate: 0.03\nsave: cancer.dat\n",
        )
        .unwrap();

        assert_eq!(config.normalize, Some((0, 8)));
        assert_eq!(config.save, Some(PathBuf::from("cancer.dat")));
        let cancer = Recipe::Cancer.config().merge(RunConfig {
            save: Some(PathBuf::from("cancer.dat")),
            ..RunConfig::default()
        });
        assert_eq!(config.resolve().unwrap(), cancer.resolve().unwrap());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(serde_yaml::from_str::<RunConfig>("epoch: 3\n").is_err());
    }
}
