use serde::{ Serialize, Deserialize };

use crate::{
  tensor::Tensor,
  scalar::Real,
  ops::RealOps,
};


/// Elementwise nonlinearity applied by a [HiddenLayer](crate::layer::HiddenLayer).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
  #[default]
  Sigmoid,
  Tanh,
  /// Pass the affine output through unchanged.
  Identity,
}

impl Activation {
  pub fn apply<T: Real>(&self, input: &Tensor<T>) -> Tensor<T> {
    match self {
      Self::Sigmoid => input.sigmoid(),
      Self::Tanh => input.tanh(),
      Self::Identity => input.clone(),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_sigmoid() {
    assert_eq!(Activation::default(), Activation::Sigmoid);
  }

  #[test]
  fn apply() {
    let x = Tensor::vec(&[0.0, 2.0]);
    assert_eq!(Activation::Sigmoid.apply(&x).raw()[0], 0.5);
    assert_eq!(Activation::Tanh.apply(&x).raw()[0], 0.0);
    assert_eq!(Activation::Identity.apply(&x), x);
  }
}
