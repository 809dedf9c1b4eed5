pub trait Activation: Send + Sync {
    /// Returns activation function at x
    fn call(&self, x: f64) -> f64;
    /// Returns derivative of activation function with respect to the function at x.
    /// For example, if our activation is sigmoid, then we would express the
    /// derivative as `a_x * (1-a_x)` instead of `sigmoid(a_x)(1-sigmoid(a_x))`.
    fn derivative(&self, a_x: f64) -> f64;
}

/// Beyond this magnitude tanh is treated as saturated.
const TANH_CLAMP: f64 = 20.0;

#[derive(Debug, Clone, Copy)]
pub enum Activations {
    /// tanh, clamped to ±1 outside [-20, 20]
    HyperTan,
    Sigmoid,
}

impl Activation for Activations {
    fn call(&self, x: f64) -> f64 {
        use Activations::*;
        match self {
            HyperTan => {
                if x < -TANH_CLAMP {
                    -1.0
                } else if x > TANH_CLAMP {
                    1.0
                } else {
                    x.tanh()
                }
            }
            Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    fn derivative(&self, a_x: f64) -> f64 {
        use Activations::*;
        match self {
            HyperTan => (1.0 - a_x) * (1.0 + a_x),
            Sigmoid => a_x * (1.0 - a_x),
        }
    }
}

/// Maps output sums to probabilities summing to 1. The largest sum is
/// subtracted before exponentiating so large sums cannot overflow.
pub fn softmax(sums: &[f64]) -> Vec<f64> {
    let max = sums.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let exps: Vec<f64> = sums.iter().map(|s| (s - max).exp()).collect();
    let scale: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / scale).collect()
}
