use std::ops::{ Add, Sub, Mul, Div };

use crate::internal::*;
use crate::Shape;
use crate::scalar::{ Inner, Numeric, Real };


/// Low-level compute operations.

pub trait Cops<I: Numeric> {
  fn matmul(&self, rhs: &Self) -> Vec<I>;
}


/// Shape manipulating operations that are available for all [Inner] types.
///
/// These never copy data, but produce views into the same storage.

pub trait BaseOps<I: Inner>: Clone {
  fn scalar(item: I) -> Self;
  fn shape(&self) -> &Shape;
  fn broadcast(&self, shape: &Shape) -> Self;
  fn reshape(&self, dims: &[usize]) -> Self;
  fn unsqueeze(&self, dim: isize) -> Self;
  fn transpose(&self, dim1: isize, dim2: isize) -> Self;
}


/// The four basic arithmetic operators.

pub trait Arithmetic<Rhs = Self, Output = Self>:
  Add<Rhs, Output = Output> + Sub<Rhs, Output = Output> + Mul<Rhs, Output = Output> + Div<Rhs, Output = Output>
{}

impl<T, Rhs, Output> Arithmetic<Rhs, Output> for T
where
  T: Add<Rhs, Output = Output> + Sub<Rhs, Output = Output> + Mul<Rhs, Output = Output> + Div<Rhs, Output = Output>,
{}


/// Mid-level operations for [Numeric] inner types.

pub trait NumericOps<I: Numeric>: Arithmetic + Arithmetic<I, Self> + Sized {
  /// Collapse dimension `dim` and all dimensions behind it into their sum.
  fn sum(&self, dim: isize) -> Self;
  /// Sum along the single dimension `dim`, removing it.
  fn sum_over(&self, dim: isize) -> Self;
  fn mm(&self, rhs: &Self) -> Self;
  fn max(&self, dim: isize) -> Self;
}


/// Mid-level operations for [Real] inner types.

pub trait RealOps<I: Real>: std::ops::Neg {
  fn exp(&self) -> Self;
  fn tanh(&self) -> Self;
  fn sigmoid(&self) -> Self;
}


/// High-level operations, implemented exclusively on top of
/// the lower level op traits.

pub trait Hops<I>: BaseOps<I> + NumericOps<I> + RealOps<I>
where
  I: Real,
  for<'a> &'a Self: Arithmetic<&'a Self, Self> + Arithmetic<I, Self>,
{
  fn mean(&self, dim: isize) -> Self {
    let udim = negative_index(dim, self.shape().rank(), false);
    let n: usize = self.shape().dims[udim..].iter().product();
    let n = I::from(n).unwrap();
    &self.sum(dim) / n
  }

  /// Average along a single dimension, removing it.
  ///
  /// `mean_over(0)` of a batch yields the per-column mean.

  fn mean_over(&self, dim: isize) -> Self {
    let n = I::from(self.shape()[dim]).unwrap();
    &self.sum_over(dim) / n
  }

  /// Normalized exponential along `dim`.
  ///
  /// The maximum gets subtracted before exponentiation, which keeps large
  /// logits from overflowing and makes the result invariant to shifting
  /// all logits by a constant.

  fn softmax(&self, dim: isize) -> Self {
    let exp = (self - &self.max(dim).unsqueeze(-1)).exp();
    &exp / &exp.sum(dim).unsqueeze(-1)
  }
}
