pub mod activations;
pub mod confusion;
pub mod optimizer;
mod utils;

use crate::prelude::*;
use std::{
    fmt::{self, Display},
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    ops::RangeInclusive,
    path::Path,
    sync::Arc,
};

use crate::{
    data::Dataset,
    matrix::{format_values, ops::Dot, Matrix2},
    random::Random,
};
use tracing::warn;

use self::{
    activations::{softmax, Activation, Activations},
    confusion::ConfusionMatrix,
    optimizer::{EpochReport, Optimizer},
    utils::{max_index, step, Deltas},
};

/// Range the initial weights and biases are drawn from.
pub const INIT_RANGE: RangeInclusive<f64> = -0.01..=0.01;

/// Feed-forward classifier with one hidden layer and a softmax output layer.
#[derive(Clone)]
pub struct NeuralNet {
    num_input: usize,
    num_hidden: usize,
    num_output: usize,

    inputs: Matrix2<f64>,
    ih_weights: Matrix2<f64>,
    h_biases: Matrix2<f64>,
    h_outputs: Matrix2<f64>,
    ho_weights: Matrix2<f64>,
    o_biases: Matrix2<f64>,
    outputs: Vec<f64>,

    h_grads: Vec<f64>,
    o_grads: Vec<f64>,
    prev_deltas: Deltas,

    momentum: f64,
    weight_decay: f64,
    activation: Arc<dyn Activation>,
    random: Random,

    training_accuracy: Vec<f64>,
    testing_accuracy: Vec<f64>,
    confusion: ConfusionMatrix,
}

/// Winner-take-all accuracy in [0, 1] and the confusion matrix behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

impl NeuralNet {
    /// Creates a network with entropy-seeded weights in [`INIT_RANGE`].
    pub fn new(num_input: usize, num_hidden: usize, num_output: usize) -> Result<Self> {
        Self::with_random(num_input, num_hidden, num_output, Random::new())
    }

    /// Creates a network that draws its initial weights and its per-epoch
    /// shuffles from `random`.
    pub fn with_random(
        num_input: usize,
        num_hidden: usize,
        num_output: usize,
        random: Random,
    ) -> Result<Self> {
        let mut net = Self::allocate(num_input, num_hidden, num_output, random)?;
        net.randomize(INIT_RANGE);
        Ok(net)
    }

    /// All buffers sized for the topology, every weight and bias zero.
    fn allocate(
        num_input: usize,
        num_hidden: usize,
        num_output: usize,
        random: Random,
    ) -> Result<Self> {
        if num_input == 0 || num_hidden == 0 || num_output == 0 {
            return argument_err(format!(
                "every layer needs at least one node, got {num_input}-{num_hidden}-{num_output}"
            ));
        }

        Ok(Self {
            num_input,
            num_hidden,
            num_output,
            inputs: Matrix2::new(1, num_input),
            ih_weights: Matrix2::new(num_input, num_hidden),
            h_biases: Matrix2::new(1, num_hidden),
            h_outputs: Matrix2::new(1, num_hidden),
            ho_weights: Matrix2::new(num_hidden, num_output),
            o_biases: Matrix2::new(1, num_output),
            outputs: vec![0.0; num_output],
            h_grads: vec![0.0; num_hidden],
            o_grads: vec![0.0; num_output],
            prev_deltas: Deltas::empty(num_input, num_hidden, num_output),
            momentum: 0.0,
            weight_decay: 0.0,
            activation: Arc::new(Activations::HyperTan),
            random,
            training_accuracy: Vec::new(),
            testing_accuracy: Vec::new(),
            confusion: ConfusionMatrix::new(num_output),
        })
    }

    /// Replace the hidden layer activation (hyperbolic tangent by default)
    pub fn with_activation(mut self, activation: impl Activation + 'static) -> Self {
        self.activation = Arc::new(activation);
        self
    }

    /// Reset parameters to uniformly random values between a specified range
    pub fn randomize(&mut self, r: RangeInclusive<f64>) {
        let (lo, hi) = r.into_inner();
        let weights: Vec<f64> = (0..self.num_weights())
            .map(|_| self.random.next_double_between(lo, hi))
            .collect();
        self.assign_weights(&weights);
    }

    pub fn topology(&self) -> (usize, usize, usize) {
        (self.num_input, self.num_hidden, self.num_output)
    }

    /// Total count of weights and biases.
    pub fn num_weights(&self) -> usize {
        (self.num_input * self.num_hidden)
            + self.num_hidden
            + (self.num_hidden * self.num_output)
            + self.num_output
    }

    /// All weights and biases flattened as input-hidden weights, hidden biases,
    /// hidden-output weights, output biases.
    pub fn get_weights(&self) -> Vec<f64> {
        let mut weights = Vec::with_capacity(self.num_weights());
        for grid in [
            &self.ih_weights,
            &self.h_biases,
            &self.ho_weights,
            &self.o_biases,
        ] {
            grid.iter_rows().for_each(|row| weights.extend_from_slice(row));
        }
        weights
    }

    /// Replaces every weight and bias, in the order of [`NeuralNet::get_weights`].
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.num_weights() {
            return argument_err(format!(
                "expected {} weights, got {}",
                self.num_weights(),
                weights.len()
            ));
        }
        self.assign_weights(weights);
        Ok(())
    }

    fn assign_weights(&mut self, weights: &[f64]) {
        let mut values = weights.iter().copied();
        for grid in [
            &mut self.ih_weights,
            &mut self.h_biases,
            &mut self.ho_weights,
            &mut self.o_biases,
        ] {
            for row in 0..grid.rows() {
                for x in grid.row_mut(row) {
                    *x = values.next().unwrap_or_default();
                }
            }
        }
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn weight_decay(&self) -> f64 {
        self.weight_decay
    }

    pub fn set_momentum_and_decay(&mut self, momentum: f64, weight_decay: f64) -> Result<()> {
        if !(momentum.is_finite() && momentum >= 0.0) {
            return argument_err(format!("momentum must be >= 0, got {momentum}"));
        }
        if !(weight_decay.is_finite() && weight_decay >= 0.0) {
            return argument_err(format!("weight decay must be >= 0, got {weight_decay}"));
        }
        self.momentum = momentum;
        self.weight_decay = weight_decay;
        Ok(())
    }

    /// Propagates one sample and keeps the hidden activations and outputs for
    /// the following [`NeuralNet::update_weights`].
    pub fn compute_outputs(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.num_input {
            return argument_err(format!(
                "expected {} inputs, got {}",
                self.num_input,
                x.len()
            ));
        }
        self.inputs = Matrix2::from_row(x.to_vec());

        let h_sums = self.inputs.dot(&self.ih_weights)?;
        let mut h_outputs = (&h_sums + &self.h_biases)?;
        h_outputs.apply(|s| self.activation.call(s));
        self.h_outputs = h_outputs;

        let o_sums = self.h_outputs.dot(&self.ho_weights)?;
        let o_sums = (&o_sums + &self.o_biases)?;
        self.outputs = softmax(&o_sums.into_row());

        Ok(self.outputs.clone())
    }

    /// One backpropagation step toward `targets` for the sample last passed to
    /// [`NeuralNet::compute_outputs`].
    pub fn update_weights(&mut self, targets: &[f64], learn_rate: f64) -> Result<()> {
        if targets.len() != self.num_output {
            return argument_err(format!(
                "expected {} targets, got {}",
                self.num_output,
                targets.len()
            ));
        }

        // Both gradient vectors are computed before any weight changes.
        for (i, &y) in self.outputs.iter().enumerate() {
            self.o_grads[i] = (1.0 - y) * y * (targets[i] - y);
        }
        for i in 0..self.num_hidden {
            let sum: f64 = (0..self.num_output)
                .map(|j| self.o_grads[j] * self.ho_weights[(i, j)])
                .sum();
            self.h_grads[i] = self.activation.derivative(self.h_outputs[(0, i)]) * sum;
        }

        let (momentum, decay) = (self.momentum, self.weight_decay);
        let deltas = &mut self.prev_deltas;

        for i in 0..self.num_input {
            for j in 0..self.num_hidden {
                let delta = learn_rate * self.h_grads[j] * self.inputs[(0, i)];
                step(
                    &mut self.ih_weights[(i, j)],
                    &mut deltas.ih_weights[(i, j)],
                    delta,
                    momentum,
                    decay,
                );
            }
        }
        for i in 0..self.num_hidden {
            let delta = learn_rate * self.h_grads[i];
            step(
                &mut self.h_biases[(0, i)],
                &mut deltas.h_biases[(0, i)],
                delta,
                momentum,
                decay,
            );
        }

        for i in 0..self.num_hidden {
            for j in 0..self.num_output {
                let delta = learn_rate * self.o_grads[j] * self.h_outputs[(0, i)];
                step(
                    &mut self.ho_weights[(i, j)],
                    &mut deltas.ho_weights[(i, j)],
                    delta,
                    momentum,
                    decay,
                );
            }
        }
        for i in 0..self.num_output {
            let delta = learn_rate * self.o_grads[i];
            step(
                &mut self.o_biases[(0, i)],
                &mut deltas.o_biases[(0, i)],
                delta,
                momentum,
                decay,
            );
        }

        Ok(())
    }

    /// One pass over every row of `train` in a freshly shuffled order.
    pub fn train_epoch(&mut self, train: &Dataset, learn_rate: f64) -> Result<()> {
        self.check_width(train)?;

        for idx in self.random.permutation(train.rows()) {
            let (x, t) = train.data().row(idx).split_at(self.num_input);
            self.compute_outputs(x)?;
            self.update_weights(t, learn_rate)?;
        }
        Ok(())
    }

    /// Trains for `max_epochs` epochs, evaluating both sets after each one.
    pub fn train(
        &mut self,
        train: &Dataset,
        test: &Dataset,
        max_epochs: usize,
        learn_rate: f64,
    ) -> Result<Vec<EpochReport>> {
        Optimizer::new(max_epochs, learn_rate).train(self, train, test)
    }

    /// Scores every row of `data` without touching the stored confusion matrix.
    pub fn evaluate(&mut self, data: &Dataset) -> Result<Evaluation> {
        self.check_width(data)?;

        let mut confusion = ConfusionMatrix::new(self.num_output);
        for row in data.data().iter_rows() {
            let (x, t) = row.split_at(self.num_input);
            let y = self.compute_outputs(x)?;
            confusion.record(max_index(t), max_index(&y));
        }

        let accuracy = match confusion.total() {
            0 => {
                warn!("evaluating an empty dataset");
                0.0
            }
            total => confusion.correct() as f64 / total as f64,
        };
        Ok(Evaluation {
            accuracy,
            confusion,
        })
    }

    /// Winner-take-all accuracy in [0, 1]. The confusion matrix of this call
    /// replaces the stored one.
    pub fn accuracy(&mut self, data: &Dataset) -> Result<f64> {
        let evaluation = self.evaluate(data)?;
        self.confusion = evaluation.confusion;
        Ok(evaluation.accuracy)
    }

    /// Confusion matrix of the last [`NeuralNet::accuracy`] call.
    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    pub fn confusion_to_string(&self) -> String {
        self.confusion.to_string()
    }

    /// Average over rows of the summed squared error between target and output.
    pub fn mean_squared_error(&mut self, data: &Dataset) -> Result<f64> {
        self.check_width(data)?;
        if data.is_empty() {
            return Ok(0.0);
        }

        let mut sum = 0.0;
        for row in data.data().iter_rows() {
            let (x, t) = row.split_at(self.num_input);
            let y = Matrix2::from_row(self.compute_outputs(x)?);
            let err = (&Matrix2::from_row(t.to_vec()) - &y)?;
            sum += err.into_row().iter().map(|e| e * e).sum::<f64>();
        }
        Ok(sum / data.rows() as f64)
    }

    /// Training accuracy per epoch of the last run, in percent.
    pub fn training_accuracy(&self) -> &[f64] {
        &self.training_accuracy
    }

    /// Testing accuracy per epoch of the last run, in percent.
    pub fn testing_accuracy(&self) -> &[f64] {
        &self.testing_accuracy
    }

    fn check_width(&self, data: &Dataset) -> Result<()> {
        let expected = self.num_input + self.num_output;
        if !data.is_empty() && data.cols() != expected {
            return argument_err(format!(
                "dataset has {} columns, network needs {expected}",
                data.cols()
            ));
        }
        Ok(())
    }

    /// Writes topology, weights and biases as text, truncating `path`.
    pub fn save(&self, path: impl AsRef<Path>, verbose: bool, precision: usize) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out, verbose, precision)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, out: &mut W, verbose: bool, precision: usize) -> Result<()> {
        let padding = if verbose { precision + 3 } else { 0 };

        if verbose {
            writeln!(out, "Input Nodes : {}", self.num_input)?;
            writeln!(out, "Hidden Nodes: {}", self.num_hidden)?;
            writeln!(out, "Output Nodes: {}", self.num_output)?;
        } else {
            writeln!(
                out,
                "{} {} {}",
                self.num_input, self.num_hidden, self.num_output
            )?;
        }

        let sections = [
            ("Input/Hidden Weights:", &self.ih_weights),
            ("Hidden Layer Biases:", &self.h_biases),
            ("Hidden/Output Weights:", &self.ho_weights),
            ("Output Layer Biases:", &self.o_biases),
        ];
        for (title, grid) in sections {
            if verbose {
                writeln!(out, "{title}")?;
            }
            out.write_all(grid.format(precision, verbose, padding).as_bytes())?;
        }
        Ok(())
    }

    /// Reads a network written by [`NeuralNet::save`] in non-verbose form.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let (idx, header) = lines.next().ok_or_else(|| Error::Format {
            line: 1,
            reason: "missing topology line".to_string(),
        })?;
        let topology = header
            .split_whitespace()
            .map(|token| {
                token.parse::<usize>().map_err(|_| Error::Format {
                    line: idx + 1,
                    reason: format!("'{token}' is not a node count"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let [num_input, num_hidden, num_output] = topology[..] else {
            return Err(Error::Format {
                line: idx + 1,
                reason: format!("expected 3 node counts, found {}", topology.len()),
            });
        };

        let mut weights = Vec::new();
        for (idx, line) in lines {
            for token in line.split_whitespace() {
                weights.push(token.parse::<f64>().map_err(|_| Error::Format {
                    line: idx + 1,
                    reason: format!("'{token}' is not a number"),
                })?);
            }
        }

        // Checked before anything is allocated for the topology.
        let expected = weight_count(num_input, num_hidden, num_output);
        if expected != Some(weights.len()) {
            let expected = expected.map_or_else(|| "more".to_string(), |n| n.to_string());
            return Err(Error::Format {
                line: idx + 1,
                reason: format!(
                    "{num_input}-{num_hidden}-{num_output} needs {expected} weights, found {}",
                    weights.len()
                ),
            });
        }

        let mut net = Self::allocate(num_input, num_hidden, num_output, Random::new())?;
        net.assign_weights(&weights);
        Ok(net)
    }
}

/// Weights and biases of a topology, `None` when the count overflows.
fn weight_count(num_input: usize, num_hidden: usize, num_output: usize) -> Option<usize> {
    let ih = num_input.checked_mul(num_hidden)?;
    let ho = num_hidden.checked_mul(num_output)?;
    ih.checked_add(num_hidden)?
        .checked_add(ho)?
        .checked_add(num_output)
}

/// Dumps topology, parameters and the state of the last forward and backward pass.
impl Display for NeuralNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(42);
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "numInput = {}, numHidden = {}, numOutput = {}\n",
            self.num_input, self.num_hidden, self.num_output
        )?;

        let vector = |v: &[f64], precision: usize| format_values(v, precision, false, 0);
        writeln!(f, "inputs:\n{}\n", vector(self.inputs.row(0), 2))?;
        writeln!(f, "ihWeights:\n{}", self.ih_weights.format(4, false, 0))?;
        writeln!(f, "hBiases:\n{}\n", vector(self.h_biases.row(0), 4))?;
        writeln!(f, "hOutputs:\n{}\n", vector(self.h_outputs.row(0), 4))?;
        writeln!(f, "hoWeights:\n{}", self.ho_weights.format(4, false, 0))?;
        writeln!(f, "oBiases:\n{}\n", vector(self.o_biases.row(0), 4))?;
        writeln!(f, "hGrads:\n{}\n", vector(&self.h_grads, 4))?;
        writeln!(f, "oGrads:\n{}\n", vector(&self.o_grads, 4))?;
        writeln!(
            f,
            "ihPrevWeightsDelta:\n{}",
            self.prev_deltas.ih_weights.format(4, false, 0)
        )?;
        writeln!(
            f,
            "hPrevBiasesDelta:\n{}\n",
            vector(self.prev_deltas.h_biases.row(0), 4)
        )?;
        writeln!(
            f,
            "hoPrevWeightsDelta:\n{}",
            self.prev_deltas.ho_weights.format(4, false, 0)
        )?;
        writeln!(
            f,
            "oPrevBiasesDelta:\n{}\n",
            vector(self.prev_deltas.o_biases.row(0), 4)
        )?;
        writeln!(f, "outputs:\n{}", vector(&self.outputs, 2))?;
        writeln!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two separable classes: label 0 when x0 > x1, label 1 otherwise.
    fn separable() -> Dataset {
        Dataset::from_vec(vec![
            vec![1.0, 0.0, 1.0, 0.0],
            vec![0.9, 0.1, 1.0, 0.0],
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.1, 0.9, 0.0, 1.0],
        ])
        .unwrap()
    }

    fn seeded(num_input: usize, num_hidden: usize, num_output: usize) -> NeuralNet {
        NeuralNet::with_random(num_input, num_hidden, num_output, Random::seeded(1234)).unwrap()
    }

    #[test]
    fn initial_weights_are_small() {
        let net = seeded(4, 5, 3);

        assert_eq!(net.num_weights(), 4 * 5 + 5 + 5 * 3 + 3);
        assert_eq!(net.get_weights().len(), net.num_weights());
        assert!(net
            .get_weights()
            .iter()
            .all(|w| INIT_RANGE.contains(w)));
    }

    #[test]
    fn empty_layer_rejected() {
        assert!(matches!(NeuralNet::new(2, 0, 2), Err(Error::Argument(_))));
    }

    #[test]
    fn same_seed_same_weights() {
        assert_eq!(seeded(3, 4, 2).get_weights(), seeded(3, 4, 2).get_weights());
    }

    #[test]
    fn set_weights_round_trip_order() {
        let mut net = seeded(2, 2, 2);
        let weights: Vec<f64> = (0..net.num_weights()).map(|i| i as f64).collect();
        net.set_weights(&weights).unwrap();

        assert_eq!(net.get_weights(), weights);
        // input-hidden first, then the hidden biases
        assert_eq!(net.ih_weights[(1, 0)], 2.0);
        assert_eq!(net.h_biases[(0, 1)], 5.0);
        assert_eq!(net.o_biases[(0, 0)], 10.0);

        assert!(matches!(net.set_weights(&[1.0]), Err(Error::Argument(_))));
    }

    #[test]
    fn outputs_are_a_distribution() {
        let mut net = seeded(3, 4, 3);
        net.randomize(-5.0..=5.0);

        for x in [[0.0, 0.0, 0.0], [100.0, -100.0, 3.0], [1e3, 1e3, 1e3]] {
            let y = net.compute_outputs(&x).unwrap();
            assert_eq!(y.len(), 3);
            assert!((y.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn forward_pass_by_hand() {
        let mut net = seeded(1, 1, 2);
        // w_ih, b_h, w_ho (1x2), b_o (2)
        net.set_weights(&[0.5, 0.1, 1.0, -1.0, 0.0, 0.0]).unwrap();

        let y = net.compute_outputs(&[2.0]).unwrap();

        let h = (2.0f64 * 0.5 + 0.1).tanh();
        let (e0, e1) = (h.exp(), (-h).exp());
        assert!((y[0] - e0 / (e0 + e1)).abs() < 1e-12);
        assert!((y[1] - e1 / (e0 + e1)).abs() < 1e-12);
        assert!((net.h_outputs[(0, 0)] - h).abs() < 1e-12);
    }

    #[test]
    fn wrong_input_lengths() {
        let mut net = seeded(2, 2, 2);
        assert!(matches!(net.compute_outputs(&[1.0]), Err(Error::Argument(_))));
        net.compute_outputs(&[1.0, 0.0]).unwrap();
        assert!(matches!(net.update_weights(&[1.0], 0.1), Err(Error::Argument(_))));
    }

    #[test]
    fn update_moves_output_toward_target() {
        let mut net = seeded(2, 3, 2);
        let x = [1.0, 0.0];
        let t = [1.0, 0.0];

        let before = net.compute_outputs(&x).unwrap()[0];
        for _ in 0..50 {
            net.compute_outputs(&x).unwrap();
            net.update_weights(&t, 0.5).unwrap();
        }
        let after = net.compute_outputs(&x).unwrap()[0];

        assert!(after > before);
    }

    #[test]
    fn single_update_matches_rule() {
        let mut net = seeded(1, 1, 2);
        net.set_weights(&[0.5, 0.1, 1.0, -1.0, 0.0, 0.0]).unwrap();

        let y = net.compute_outputs(&[2.0]).unwrap();
        let h = net.h_outputs[(0, 0)];
        let t = [1.0, 0.0];
        net.update_weights(&t, 0.1).unwrap();

        let o_grads: Vec<f64> = (0..2).map(|i| (1.0 - y[i]) * y[i] * (t[i] - y[i])).collect();
        let h_grad = (1.0 - h) * (1.0 + h) * (o_grads[0] * 1.0 + o_grads[1] * -1.0);

        let w = net.get_weights();
        assert!((w[0] - (0.5 + 0.1 * h_grad * 2.0)).abs() < 1e-12);
        assert!((w[1] - (0.1 + 0.1 * h_grad)).abs() < 1e-12);
        assert!((w[2] - (1.0 + 0.1 * o_grads[0] * h)).abs() < 1e-12);
        assert!((w[5] - 0.1 * o_grads[1]).abs() < 1e-12);
        assert!((net.prev_deltas.ih_weights[(0, 0)] - 0.1 * h_grad * 2.0).abs() < 1e-12);
    }

    #[test]
    fn weight_decay_shrinks_weights() {
        let mut net = seeded(2, 2, 2);
        net.set_weights(&vec![1.0; net.num_weights()]).unwrap();
        net.set_momentum_and_decay(0.0, 0.5).unwrap();

        net.compute_outputs(&[0.0, 0.0]).unwrap();
        // zero learning rate: only decay applies
        net.update_weights(&[1.0, 0.0], 0.0).unwrap();

        assert!(net.get_weights().iter().all(|&w| w == 0.5));
    }

    #[test]
    fn momentum_reapplies_previous_delta() {
        let mut net = seeded(1, 1, 2);
        net.set_momentum_and_decay(0.5, 0.0).unwrap();
        net.prev_deltas.o_biases[(0, 0)] = 0.2;
        let before = net.o_biases[(0, 0)];

        net.compute_outputs(&[0.0]).unwrap();
        net.update_weights(&[0.0, 0.0], 0.0).unwrap();

        assert!((net.o_biases[(0, 0)] - (before + 0.1)).abs() < 1e-12);
        assert_eq!(net.prev_deltas.o_biases[(0, 0)], 0.0);
    }

    #[test]
    fn invalid_momentum() {
        let mut net = seeded(1, 1, 1);
        assert!(net.set_momentum_and_decay(-0.1, 0.0).is_err());
        assert!(net.set_momentum_and_decay(0.1, f64::NAN).is_err());
        assert_eq!((net.momentum(), net.weight_decay()), (0.0, 0.0));
    }

    #[test]
    fn accuracy_of_empty_dataset_is_zero() {
        let mut net = seeded(2, 2, 2);
        assert_eq!(net.accuracy(&Dataset::default()).unwrap(), 0.0);
        assert_eq!(net.confusion().total(), 0);
        assert_eq!(net.mean_squared_error(&Dataset::new(0, 4)).unwrap(), 0.0);
    }

    #[test]
    fn dataset_width_must_match() {
        let mut net = seeded(2, 2, 3);
        assert!(matches!(net.accuracy(&separable()), Err(Error::Argument(_))));
        assert!(net.train_epoch(&separable(), 0.1).is_err());
    }

    #[test]
    fn confusion_totals_match_classes() {
        let mut net = seeded(2, 3, 2);
        let data = Dataset::from_vec(vec![
            vec![1.0, 0.0, 1.0, 0.0],
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.5, 0.5, 0.0, 1.0],
            vec![0.2, 0.1, 0.0, 1.0],
            vec![0.3, 0.9, 1.0, 0.0],
        ])
        .unwrap();

        let accuracy = net.accuracy(&data).unwrap();
        let confusion = net.confusion();

        assert_eq!(confusion.actual_total(0), 2);
        assert_eq!(confusion.actual_total(1), 3);
        assert!((accuracy - confusion.correct() as f64 / 5.0).abs() < 1e-12);

        // evaluate leaves the stored matrix alone
        let other = net.evaluate(&separable()).unwrap();
        assert_eq!(other.confusion.total(), 4);
        assert_eq!(net.confusion().total(), 5);
    }

    #[test]
    fn mse_by_hand() {
        let mut net = seeded(1, 1, 2);
        net.set_weights(&[0.0; 6]).unwrap();
        let data = Dataset::from_vec(vec![vec![3.0, 1.0, 0.0], vec![-3.0, 0.0, 1.0]]).unwrap();

        // all-zero weights give [0.5, 0.5] for every input
        assert!((net.mean_squared_error(&data).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn training_learns_separable_data() {
        let mut net = seeded(2, 4, 2);
        let data = separable();

        let reports = net.train(&data, &data, 500, 0.5).unwrap();

        assert_eq!(reports.len(), 500);
        assert_eq!(net.training_accuracy().len(), 500);
        assert_eq!(net.testing_accuracy()[499], 100.0);
        assert!(reports[499].train_mse < reports[0].train_mse);
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let data = separable();
        let mut a = seeded(2, 2, 2);
        let mut b = seeded(2, 2, 2);

        a.train(&data, &data, 50, 0.1).unwrap();
        b.train(&data, &data, 50, 0.1).unwrap();

        assert_eq!(a.get_weights(), b.get_weights());
        assert_eq!(a.testing_accuracy(), b.testing_accuracy());
    }

    #[test]
    fn save_plain_format() {
        let mut net = seeded(2, 1, 2);
        net.set_weights(&[0.5, -0.25, 1.0, 2.0, 3.0, 0.126, -0.5]).unwrap();

        let mut out = Vec::new();
        net.write_to(&mut out, false, 2).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2 1 2\n0.50\n-0.25\n1.00\n2.00 3.00\n0.13 -0.50\n"
        );
    }

    #[test]
    fn save_verbose_format() {
        let mut net = seeded(1, 1, 1);
        net.set_weights(&[0.5, -0.24, 1.0, 2.0]).unwrap();

        let mut out = Vec::new();
        net.write_to(&mut out, true, 1).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Input Nodes : 1\nHidden Nodes: 1\nOutput Nodes: 1\n\
             Input/Hidden Weights:\n[  0.5 ]\n\
             Hidden Layer Biases:\n[ -0.2 ]\n\
             Hidden/Output Weights:\n[  1.0 ]\n\
             Output Layer Biases:\n[  2.0 ]\n"
        );
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("rust_ann_{}_net.dat", std::process::id()));
        let net = seeded(3, 2, 2);

        net.save(&path, false, 10).unwrap();
        let loaded = NeuralNet::load(&path).unwrap();

        assert_eq!(loaded.topology(), (3, 2, 2));
        for (a, b) in loaded.get_weights().iter().zip(net.get_weights()) {
            assert!((a - b).abs() < 1e-10);
        }

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn parse_restores_exact_weights() {
        let net = NeuralNet::parse("1 1 2\n0.5\n-0.25\n1 -1\n0 0.125\n").unwrap();

        assert_eq!(net.topology(), (1, 1, 2));
        assert_eq!(net.get_weights(), [0.5, -0.25, 1.0, -1.0, 0.0, 0.125]);
        assert_eq!(net.prev_deltas, Deltas::empty(1, 1, 2));
    }

    #[test]
    fn load_rejects_bad_files() {
        assert!(matches!(NeuralNet::parse(""), Err(Error::Format { .. })));
        assert!(matches!(NeuralNet::parse("1 1\n"), Err(Error::Format { line: 1, .. })));
        assert!(matches!(
            NeuralNet::parse("1 1 1\n0.1\n0.2\n0.3\n"),
            Err(Error::Format { .. })
        ));
        assert!(matches!(
            NeuralNet::parse("1 1 1\n0.1\nx\n0.3\n0.4\n"),
            Err(Error::Format { line: 3, .. })
        ));
        // absurd topologies fail on the weight count, before any allocation
        assert!(matches!(
            NeuralNet::parse("18446744073709551615 2 2\n0.1\n"),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            NeuralNet::parse("4294967296 4294967296 1\n0.1\n"),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            NeuralNet::parse("100000000 100000000 1\n0.1\n"),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            NeuralNet::load("/definitely/not/here.dat"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn debug_dump_lists_sections() {
        let mut net = seeded(2, 2, 2);
        net.compute_outputs(&[0.5, 0.5]).unwrap();
        let dump = net.to_string();

        assert!(dump.starts_with(&"-".repeat(42)));
        assert!(dump.contains("numInput = 2, numHidden = 2, numOutput = 2"));
        for section in ["ihWeights:", "hoPrevWeightsDelta:", "outputs:"] {
            assert!(dump.contains(section), "missing {section}");
        }
    }
}
