mod config;
mod utils;

use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use config::{Recipe, Run, RunConfig};
use rust_ann::{
    data::Dataset,
    neural::{optimizer::Optimizer, NeuralNet},
    random::Random,
    viz::AccuracyGui,
};
use tracing::info;

/// Trains a one-hidden-layer classifier on a delimited data file.
///
/// The data is min-max normalized, its label column expanded to one-hot
/// targets and split into three random sets: training, testing and validation.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Space, comma or tab separated data file
    #[arg(short, long, value_name = "PATH")]
    data: PathBuf,
    /// Preset settings for a known dataset
    #[arg(short, long, value_enum)]
    recipe: Option<Recipe>,
    /// YAML file with run settings
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// First and last feature column to normalize
    #[arg(long, num_args = 2, value_names = ["FIRST", "LAST"])]
    normalize: Option<Vec<usize>>,
    /// Column holding the class label
    #[arg(long, value_name = "INT")]
    class_column: Option<usize>,
    #[arg(long, value_name = "INT")]
    classes: Option<usize>,
    /// Label of the first class
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    start_at: Option<i64>,
    #[arg(long, value_name = "INT")]
    hidden: Option<usize>,
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    #[arg(long, value_name = "FLOAT")]
    rate: Option<f64>,
    #[arg(long, value_name = "FLOAT")]
    momentum: Option<f64>,
    #[arg(long, value_name = "FLOAT")]
    decay: Option<f64>,
    /// Seed for the split and the initial weights
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,
    /// Write a report line per epoch to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Write the trained weights to this file
    #[arg(short, long, value_name = "PATH")]
    save: Option<PathBuf>,
    /// Decimals of the saved weights
    #[arg(long, value_name = "INT")]
    precision: Option<usize>,
    /// Save with labelled sections and bracketed rows
    #[arg(long)]
    verbose_save: bool,

    /// Print the first rows of the prepared dataset
    #[arg(long, value_name = "ROWS")]
    preview: Option<usize>,
    /// Plot accuracy per epoch in a window while training
    #[arg(long)]
    gui: bool,
    /// Show debug logs
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> RunConfig {
        RunConfig {
            normalize: self.normalize.as_deref().map(|n| (n[0], n[1])),
            class_column: self.class_column,
            classes: self.classes,
            start_at: self.start_at,
            hidden: self.hidden,
            epochs: self.epochs,
            rate: self.rate,
            momentum: self.momentum,
            decay: self.decay,
            seed: self.seed,
            log: self.log.clone(),
            save: self.save.clone(),
            precision: self.precision,
            verbose_save: self.verbose_save.then_some(true),
        }
    }

    fn run_config(&self) -> Result<Run, Box<dyn Error>> {
        let recipe = self.recipe.map(Recipe::config).unwrap_or_default();
        let file = match &self.config {
            Some(path) => serde_yaml::from_str(&fs::read_to_string(path)?)?,
            None => RunConfig::default(),
        };
        Ok(recipe.merge(file).merge(self.overrides()).resolve()?)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose)?;

    let run = cli.run_config()?;
    info!(?run, "starting");

    let mut random = run.seed.map_or_else(Random::new, Random::seeded);

    let mut data = Dataset::from_file(&cli.data)?;
    let (first, last) = run.normalize;
    data.normalize(first, last)?;
    data.make_exemplar(run.class_column, run.classes, run.start_at)?;
    if let Some(rows) = cli.preview {
        print!("{}", data.show_part(rows, data.cols(), 2, "Prepared dataset"));
    }

    let sets = data.split_evenly(3, &mut random)?;
    let empty = Dataset::new(0, data.cols());
    let train = &sets[0];
    let test = sets.get(1).unwrap_or(&empty);

    let net_random = run
        .seed
        .map_or_else(Random::new, |seed| Random::seeded(seed.wrapping_add(1)));
    let mut net = NeuralNet::with_random(
        data.cols() - run.classes,
        run.hidden,
        run.classes,
        net_random,
    )?;
    net.set_momentum_and_decay(run.momentum, run.decay)?;

    let optimizer = Optimizer::new(run.epochs, run.rate).with_log(run.log.clone());
    let reports = if cli.gui {
        optimizer.train_gui::<AccuracyGui>(&mut net, train, test)?
    } else {
        optimizer.train(&mut net, train, test)?
    };
    if let Some(last) = reports.last() {
        println!("Last epoch: {last}");
    }

    for (name, set) in ["Training", "Testing", "Validation"].iter().zip(&sets) {
        let accuracy = net.accuracy(set)?;
        println!("\n{name} accuracy: {:.2}% ({} rows)", accuracy * 100.0, set.rows());
        print!("{}", net.confusion_to_string());
    }

    if let Some(path) = &run.save {
        net.save(path, run.verbose_save, run.precision)?;
        info!(path = %path.display(), "saved weights");
    }
    Ok(())
}
