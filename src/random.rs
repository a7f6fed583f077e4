use std::rc::Rc;
use std::cell::RefCell;

use rand::{ Rng, SeedableRng, rngs::StdRng };

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  scalar::Real,
};


/// Seeded source of randomness, shared by handle.
///
/// Cloning a `Random` yields another handle to the same generator, so
/// every layer holding one draws from a single stream. For a fixed seed
/// results are reproducible as long as draws happen in the same order.
/// Tensors are always filled in row-major order.

#[derive(Debug, Clone)]
pub struct Random {
  rng: Rc<RefCell<StdRng>>,
}

impl Random {
  pub fn seeded(seed: u64) -> Self {
    Self { rng: Rc::new(RefCell::new(StdRng::seed_from_u64(seed))) }
  }

  /// Whether both handles draw from the same generator.

  pub fn shared_with(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.rng, &other.rng)
  }

  /// Independent draws from the half-open interval `[low, high)`.

  pub fn uniform<T: Real>(&self, shape: &[usize], low: T, high: T) -> Tensor<T> {
    let mut rng = self.rng.borrow_mut();
    Tensor::init(shape, || rng.gen_range(low, high) )
  }

  /// Binomial draws with a single trial each, using the elements
  /// of `probabilities` as success probabilities.
  ///
  /// Fails without drawing anything if a probability lies outside
  /// `[0, 1]` or is NaN.

  pub fn binomial<T: Real>(&self, probabilities: &Tensor<T>) -> Result<Tensor<T>> {
    let invalid = probabilities.param_iter()
      .find(|&p| !(p >= T::zero() && p <= T::one()) );
    if let Some(p) = invalid {
      return Err(Error::Probability(p.to_f64().unwrap_or(f64::NAN)))
    }
    let mut rng = self.rng.borrow_mut();
    Ok(probabilities.vectorize(|p| trial(&mut *rng, p) ))
  }

  /// Binomial draws with a single trial each and a common success probability.

  pub fn bernoulli<T: Real>(&self, shape: &[usize], probability: T) -> Tensor<T> {
    let mut rng = self.rng.borrow_mut();
    Tensor::init(shape, || trial(&mut *rng, probability) )
  }
}

fn trial<T: Real>(rng: &mut StdRng, probability: T) -> T {
  if rng.gen_range(T::zero(), T::one()) < probability {
    T::one()
  } else {
    T::zero()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reproducible() {
    let a = Random::seeded(7).uniform(&[3,4], -1.0, 1.0);
    let b = Random::seeded(7).uniform(&[3,4], -1.0, 1.0);
    assert_eq!(a, b);
  }

  #[test]
  fn shared_stream() {
    let random = Random::seeded(7);
    let handle = random.clone();
    assert!(handle.shared_with(&random));
    let first = random.uniform::<f64>(&[4], 0.0, 1.0);
    let second = handle.uniform::<f64>(&[4], 0.0, 1.0);
    assert_ne!(first, second);

    let fresh = Random::seeded(7);
    assert_eq!(fresh.uniform::<f64>(&[4], 0.0, 1.0), first);
    assert_eq!(fresh.uniform::<f64>(&[4], 0.0, 1.0), second);
  }

  #[test]
  fn uniform_bounds() {
    let a = Random::seeded(1).uniform(&[50], -0.25, 0.25);
    assert!(a.param_iter().all(|x| x >= -0.25 && x < 0.25 ));
  }

  #[test]
  fn binomial_extremes() {
    let random = Random::seeded(3);
    let p = Tensor::new(&[2,3], vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
    assert_eq!(random.binomial(&p).unwrap(), p);
  }

  #[test]
  fn binomial_rejects_invalid_probabilities() {
    let random = Random::seeded(3);
    let negative = Tensor::vec(&[0.5, -0.25, 0.5]);
    assert!(matches!(random.binomial(&negative), Err(Error::Probability(p)) if p == -0.25));
    assert!(matches!(random.binomial(&Tensor::vec(&[1.5])), Err(Error::Probability(_))));
    assert!(matches!(random.binomial(&Tensor::vec(&[f64::NAN])), Err(Error::Probability(p)) if p.is_nan()));

    // Nothing was drawn
    assert_eq!(random.uniform::<f64>(&[3], 0.0, 1.0), Random::seeded(3).uniform(&[3], 0.0, 1.0));
  }

  #[test]
  fn bernoulli_is_binary() {
    let mask = Random::seeded(3).bernoulli(&[10,10], 0.5);
    assert!(mask.param_iter().all(|x| x == 0.0 || x == 1.0 ));
    assert!(mask.param_iter().any(|x| x == 1.0 ));
  }
}
