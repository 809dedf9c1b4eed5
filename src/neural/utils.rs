use crate::matrix::Matrix2;

/// Last update applied to every weight and bias, mirroring their shapes.
/// Read back as the momentum term of the next update.
#[derive(Debug, Clone, PartialEq)]
pub struct Deltas {
    pub ih_weights: Matrix2<f64>,
    pub h_biases: Matrix2<f64>,
    pub ho_weights: Matrix2<f64>,
    pub o_biases: Matrix2<f64>,
}

impl Deltas {
    pub fn empty(num_input: usize, num_hidden: usize, num_output: usize) -> Self {
        Self {
            ih_weights: Matrix2::new(num_input, num_hidden),
            h_biases: Matrix2::new(1, num_hidden),
            ho_weights: Matrix2::new(num_hidden, num_output),
            o_biases: Matrix2::new(1, num_output),
        }
    }
}

/// Applies `delta` to `weight`, then momentum from the previous delta, then
/// weight decay on the updated value. Records `delta` for the next step.
pub fn step(weight: &mut f64, prev_delta: &mut f64, delta: f64, momentum: f64, decay: f64) {
    *weight += delta;
    if momentum > 0.0 {
        *weight += momentum * *prev_delta;
    }
    if decay > 0.0 {
        *weight -= decay * *weight;
    }
    *prev_delta = delta;
}

/// Index of the first largest value ("winner takes all").
pub fn max_index(values: &[f64]) -> usize {
    let mut index = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[index] {
            index = i;
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_step() {
        let (mut w, mut prev) = (1.0, 0.5);
        step(&mut w, &mut prev, 0.25, 0.0, 0.0);
        assert_eq!((w, prev), (1.25, 0.25));
    }

    #[test]
    fn momentum_then_decay() {
        let (mut w, mut prev) = (1.0, 0.5);
        step(&mut w, &mut prev, 0.25, 0.5, 0.1);

        // 1 + 0.25 + 0.5 * 0.5 = 1.5, then 1.5 - 0.1 * 1.5
        assert!((w - 1.35).abs() < 1e-12);
        assert_eq!(prev, 0.25);
    }

    #[test]
    fn winner_takes_first_max() {
        assert_eq!(max_index(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(max_index(&[0.5, 0.5]), 0);
        assert_eq!(max_index(&[-3.0]), 0);
    }

    #[test]
    fn empty_deltas_shapes() {
        let deltas = Deltas::empty(4, 5, 3);
        assert_eq!(deltas.ih_weights.dim(), (4, 5));
        assert_eq!(deltas.h_biases.dim(), (1, 5));
        assert_eq!(deltas.ho_weights.dim(), (5, 3));
        assert_eq!(deltas.o_biases.dim(), (1, 3));
    }
}
