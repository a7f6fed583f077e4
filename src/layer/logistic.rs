use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  scalar::Real,
  ops::{ BaseOps, NumericOps, Hops },
  layer::{ check_batch, check_targets, cross_entropy },
};


/// Softmax classifier on top of the stack.
///
/// Starts out with zero weights and bias, predicting a uniform
/// distribution over classes.

#[derive(Debug, Clone)]
pub struct LogisticRegression<T: Real> {
  pub n_in: usize,
  pub n_out: usize,
  weights: Tensor<T>,
  bias: Tensor<T>,
  input: Tensor<T>,
  label: Tensor<T>,
}

impl<T: Real> LogisticRegression<T> {
  pub fn new(input: Tensor<T>, label: Tensor<T>, n_in: usize, n_out: usize) -> Result<Self> {
    check_batch("classifier input", &input, n_in)?;
    check_targets(&input, &label, n_out)?;
    Ok(Self {
      n_in,
      n_out,
      weights: Tensor::zeros(&[n_in, n_out]),
      bias: Tensor::zeros(&[n_out]),
      input,
      label,
    })
  }

  pub fn from_parameters(input: Tensor<T>, label: Tensor<T>, weights: Tensor<T>, bias: Tensor<T>) -> Result<Self> {
    if weights.rank() != 2 {
      return Err(Error::ShapeMismatch {
        context: "classifier weights",
        expected: vec![0, 0],
        actual: weights.shape().dims.clone(),
      })
    }
    let n_in = weights.dim(0);
    let n_out = weights.dim(1);
    if bias.shape().dims != [n_out] {
      return Err(Error::ShapeMismatch {
        context: "classifier bias",
        expected: vec![n_out],
        actual: bias.shape().dims.clone(),
      })
    }
    check_batch("classifier input", &input, n_in)?;
    check_targets(&input, &label, n_out)?;
    Ok(Self { n_in, n_out, weights, bias, input, label })
  }

  pub fn weights(&self) -> &Tensor<T> {
    &self.weights
  }

  pub fn bias(&self) -> &Tensor<T> {
    &self.bias
  }

  pub fn input(&self) -> &Tensor<T> {
    &self.input
  }

  pub fn label(&self) -> &Tensor<T> {
    &self.label
  }

  /// One step of gradient ascent on the log-likelihood of `targets`,
  /// with weight decay of strength `l2_penalty`.

  pub fn train(&mut self, input: &Tensor<T>, targets: &Tensor<T>, learning_rate: T, l2_penalty: T) -> Result<()> {
    let probabilities = self.predict(input)?;
    check_targets(input, targets, self.n_out)?;
    let error = targets - &probabilities;

    let delta_weights = &input.transpose(0, 1).mm(&error) - &(&self.weights * l2_penalty);
    let delta_bias = error.mean_over(0);

    self.weights.assign(&(&self.weights + delta_weights * learning_rate));
    self.bias.assign(&(&self.bias + delta_bias * learning_rate));

    self.input = input.clone();
    self.label = targets.clone();
    Ok(())
  }

  /// Class probabilities for every sample in `input`, each row summing to one.

  pub fn predict(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
    check_batch("classifier input", input, self.n_in)?;
    Ok((&input.mm(&self.weights) + &self.bias).softmax(-1))
  }

  /// Cross-entropy of the stored targets under the current model.
  ///
  /// Every class is scored as an independent binary outcome, so the
  /// probability assigned to wrong classes is penalized as well.

  pub fn negative_log_likelihood(&self) -> Result<T> {
    let probabilities = self.predict(&self.input)?;
    Ok(cross_entropy(&self.label, &probabilities))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  fn separable() -> (Tensor<f64>, Tensor<f64>) {
    let input = Tensor::new(&[4,2], vec![
      1.0, 0.0,
      0.9, 0.1,
      0.0, 1.0,
      0.1, 0.9,
    ]);
    let label = Tensor::<usize>::vec(&[0, 0, 1, 1]).one_hot(2);
    (input, label)
  }

  #[test]
  fn predict_shape() {
    let (input, label) = separable();
    let classifier = LogisticRegression::new(input.clone(), label, 2, 2).unwrap();
    let probabilities = classifier.predict(&input).unwrap();
    assert_eq!(probabilities.shape().dims, vec![4,2]);
    assert_eq!(probabilities, Tensor::fill(&[4,2], 0.5));
  }

  #[test]
  fn rows_sum_to_one() {
    let (input, label) = separable();
    let mut classifier = LogisticRegression::new(input.clone(), label.clone(), 2, 2).unwrap();
    for _ in 0..10 {
      classifier.train(&input, &label, 0.3, 0.0).unwrap();
    }
    for sum in classifier.predict(&input).unwrap().sum(-1).param_iter() {
      assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
    }
  }

  #[test]
  fn training_fits_targets() {
    let (input, label) = separable();
    let mut classifier = LogisticRegression::new(input.clone(), label.clone(), 2, 2).unwrap();
    let initial = classifier.negative_log_likelihood().unwrap();
    for _ in 0..50 {
      classifier.train(&input, &label, 0.1, 0.0).unwrap();
    }
    assert!(classifier.negative_log_likelihood().unwrap() < initial);
    let classes = classifier.predict(&input).unwrap().argmax::<usize>(-1);
    assert_eq!(classes, Tensor::vec(&[0, 0, 1, 1]));
  }

  #[test]
  fn l2_penalty_shrinks_weights() {
    let weights = Tensor::new(&[2,2], vec![1.0, 2.0, 3.0, 4.0]);
    let input = Tensor::zeros(&[1,2]);
    let targets = Tensor::fill(&[1,2], 0.5);
    let mut classifier = LogisticRegression::from_parameters(
      input.clone(), targets.clone(), weights, Tensor::zeros(&[2]),
    ).unwrap();
    classifier.train(&input, &targets, 0.1, 0.5).unwrap();
    let expected = [0.95, 1.9, 2.85, 3.8];
    for (w, e) in classifier.weights().param_iter().zip(expected) {
      assert_abs_diff_eq!(w, e, epsilon = 1e-12);
    }
    assert_eq!(classifier.bias(), &Tensor::zeros(&[2]));
  }

  #[test]
  fn uniform_likelihood() {
    // Both classes scored as binary outcomes at p = 0.5
    let (input, label) = separable();
    let classifier = LogisticRegression::new(input, label, 2, 2).unwrap();
    let expected = 2.0 * 2.0f64.ln();
    assert_abs_diff_eq!(classifier.negative_log_likelihood().unwrap(), expected, epsilon = 1e-12);
  }

  #[test]
  fn train_replaces_stored_batch() {
    let (input, label) = separable();
    let mut classifier = LogisticRegression::new(input, label, 2, 2).unwrap();
    let other = Tensor::new(&[1,2], vec![0.5, 0.5]);
    let target = Tensor::new(&[1,2], vec![1.0, 0.0]);
    classifier.train(&other, &target, 0.1, 0.0).unwrap();
    assert_eq!(classifier.input(), &other);
    assert_eq!(classifier.label(), &target);
  }

  #[test]
  fn rejects_mismatched_targets() {
    let (input, label) = separable();
    let mut classifier = LogisticRegression::new(input.clone(), label, 2, 2).unwrap();
    let short = Tensor::zeros(&[3,2]);
    let wide = Tensor::zeros(&[4,3]);
    assert!(matches!(classifier.train(&input, &short, 0.1, 0.0), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(classifier.train(&input, &wide, 0.1, 0.0), Err(Error::ShapeMismatch { .. })));
    assert!(LogisticRegression::new(input, Tensor::zeros(&[4,3]), 2, 2).is_err());
    assert!(classifier.predict(&Tensor::zeros(&[4,3])).is_err());
  }
}
