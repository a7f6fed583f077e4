use std::rc::Rc;
use std::cell::{ Ref, RefCell };
use std::fmt::Debug;

use num_traits::NumCast;
use serde::{ Serialize, Deserialize };

mod cops;
mod lops;

use crate::{
  internal::*,
  shape::Shape,
  scalar::{ Inner, Numeric, Real, Unsigned },
  ops::{ BaseOps, Hops },
};


/// Multidimensional array.
///
/// Tensors may contain any type that satisfies [Inner], but
/// additional methods are available for [Numeric] and [Real]
/// inner types.
///
/// Cloning a tensor, as well as taking views like [transpose](Tensor::transpose),
/// yields a handle to the *same* storage. Writes through [assign](Tensor::assign)
/// are visible to every handle. Use [detach](Tensor::detach) to get an
/// independent copy.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredTensor<T>", bound(deserialize = "T: Inner + Deserialize<'de>"))]
pub struct Tensor<T: Inner> {
  shape: Shape,
  data: Rc<RefCell<Vec<T>>>,
}

/// Serialized form of a [Tensor], checked before it becomes one.

#[derive(Deserialize)]
struct StoredTensor<T> {
  shape: Shape,
  data: Vec<T>,
}

impl<T: Inner> TryFrom<StoredTensor<T>> for Tensor<T> {
  type Error = String;

  fn try_from(stored: StoredTensor<T>) -> Result<Self, Self::Error> {
    let StoredTensor { shape, data } = stored;
    if !shape.fits(data.len()) {
      return Err(format!("{} with strides {:?} and offset {} doesn't fit data length {}",
        shape, shape.strides, shape.offset, data.len()))
    }
    Ok(Self { shape, data: Rc::new(RefCell::new(data)) })
  }
}

impl<T: Real> Hops<T> for Tensor<T> {}

impl<T: Inner> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    if self.shape.squeeze().dims != rhs.shape.squeeze().dims { return false }
    let data_l = self.data.borrow();
    let data_r = rhs.data.borrow();
    for (i, j) in self.shape.iter().zip(rhs.shape.iter()) {
      if data_l[i] != data_r[j] { return false }
    }
    true
  }
}

impl<T: Inner> Tensor<T> {
  pub fn from_shape(shape: Shape, data: Vec<T>) -> Self {
    assert!(shape.size() == data.len() && shape.fits(data.len()),
      "{} doesn't match data length {}", shape, data.len());
    Self { shape, data: Rc::new(RefCell::new(data)) }
  }

  pub fn new(shape: &[usize], data: Vec<T>) -> Self {
    Self::from_shape(Shape::new(shape), data)
  }

  pub fn vec(vec: &[T]) -> Self {
    Self::new(&[vec.len()], vec.to_vec())
  }

  pub fn fill(shape: &[usize], filler: T) -> Self {
    Self::new(shape, vec![filler; shape.iter().product()])
  }

  /// Generate elements in row-major order.

  pub fn init(shape: &[usize], mut cb: impl FnMut() -> T) -> Self {
    let shape = Shape::new(shape);
    let data = (0..shape.size()).map(|_| cb() ).collect();
    Self::from_shape(shape, data)
  }

  /// Stack equally sized rows into a matrix.

  pub fn rows(rows: &[Vec<T>]) -> Self {
    let width = rows.first().map(|row| row.len() ).unwrap_or(0);
    assert!(rows.iter().all(|row| row.len() == width ),
      "Rows must have equal length");
    Self::new(&[rows.len(), width], rows.concat())
  }

  pub fn raw(&self) -> Ref<Vec<T>> {
    self.data.borrow()
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.param_iter().collect()
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn rank(&self) -> usize {
    self.shape.rank()
  }

  pub fn dim(&self, dim: isize) -> usize {
    self.shape[dim]
  }

  /// Whether both tensors are views into the same storage.

  pub fn shared_with(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.data, &other.data)
  }

  /// Overwrite this tensor's elements in place with those of `other`.
  ///
  /// All handles sharing storage with this tensor observe the change.

  pub fn assign(&self, other: &Self) {
    assert!(self.shape.squeeze().dims == other.shape.squeeze().dims,
      "Could not assign {} tensor to {} tensor", other.shape, self.shape);
    // Avoid clashing borrow when tensors share storage
    let other = if self.shared_with(other) {
      other.detach()
    } else {
      other.clone()
    };
    let mut data = self.data.borrow_mut();
    let other_data = other.data.borrow();
    for (i, j) in self.shape.iter().zip(other.shape.iter()) {
      data[i] = other_data[j];
    }
  }

  pub fn contiguous(&self) -> Self {
    if self.shape.contiguous() {
      self.clone()
    } else {
      self.detach()
    }
  }

  pub fn detach(&self) -> Self {
    self.vectorize(|a| a )
  }

  pub fn zip<O,F>(&self, rhs: &Self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn((T, T)) -> O,
  {
    let rhs = rhs.broadcast(&self.shape);
    let lhs = self.broadcast(&rhs.shape);
    let data: Vec<O> = lhs.param_iter()
      .zip(rhs.param_iter())
      .map(cb)
      .collect();
    Tensor::new(&lhs.shape.dims, data)
  }

  pub fn vectorize<O,F>(&self, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: FnMut(T) -> O,
  {
    let data = self.param_iter().map(cb).collect();
    Tensor::new(&self.shape.dims, data)
  }

  /// Collapse dimension `dim` and all dimensions behind it into a single value.

  pub fn collapse<O,F>(&self, dim: isize, cb: F) -> Tensor<O>
  where
    O: Inner,
    F: Fn(Self) -> O,
  {
    let dim = negative_index(dim, self.shape.rank(), false);
    let data = self.unsqueeze(0).iter(dim as isize)
      .map(cb)
      .collect();
    Tensor::new(&self.shape.dims[..dim], data)
  }

  /// Iterate over slices along `dim`, each slice
  /// containing all dimensions behind it.

  pub fn iter(&self, dim: isize) -> TensorSliceIterator<T> {
    TensorSliceIterator::new(self, dim)
  }

  /// Iterate over elements in row-major order.

  pub fn param_iter(&self) -> TensorIterator<T> {
    TensorIterator::new(self)
  }

  pub fn at(&self, indices: &[usize]) -> Self {
    let shape = self.shape.take(indices);
    let data = self.data.clone();
    Self { shape, data }
  }

  pub fn item(&self) -> T {
    assert!(self.shape.squeeze().rank() == 0,
      "Can't extract item from non-scalar {}", self.shape);
    self.raw()[self.shape.offset]
  }

  pub fn view(&self, shape: &[usize]) -> Self {
    let shape = self.shape.view(shape);
    let data = self.data.clone();
    Self { shape, data }
  }

  pub fn squeeze(&self) -> Self {
    let shape = self.shape.squeeze();
    let data = self.data.clone();
    Self { shape, data }
  }

  pub fn squeeze_only(&self, dim: isize) -> Self {
    let shape = self.shape.squeeze_only(dim);
    let data = self.data.clone();
    Self { shape, data }
  }

  pub fn equal(&self, rhs: &Self) -> Tensor<bool> {
    self.zip(rhs, |(a, b)| a == b )
  }
}

impl<T: Numeric> Tensor<T> {
  pub fn ones(shape: &[usize]) -> Self {
    Self::fill(shape, T::one())
  }

  pub fn zeros(shape: &[usize]) -> Self {
    Self::fill(shape, T::zero())
  }

  pub fn add(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a + b )
  }

  pub fn sub(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a - b )
  }

  pub fn mul(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a * b )
  }

  pub fn div(&self, rhs: &Self) -> Self {
    self.zip(rhs, |(a, b)| a / b )
  }

  /// Collapse last dimension using index of its greatest value.
  ///
  /// The first index wins on ties.

  pub fn argmax<O: Unsigned>(&self, dim: isize) -> Tensor<O> {
    self.collapse(dim, |values| {
      let mut best = None;
      let mut index = 0;
      for (i, value) in values.param_iter().enumerate() {
        if best.map_or(true, |best| value > best ) {
          best = Some(value);
          index = i;
        }
      }
      O::from(index).unwrap()
    })
  }

  pub fn cast<I: Numeric>(&self) -> Tensor<I> {
    self.vectorize(|a| I::from(a).unwrap() )
  }
}

impl<T: Real> Tensor<T> {
  /// Whether all elements lie within the closed interval `[low, high]`.

  pub fn within(&self, low: T, high: T) -> bool {
    self.param_iter().all(|a| a >= low && a <= high )
  }
}

impl<T: Unsigned> Tensor<T> {
  pub fn one_hot<O: Numeric>(&self, size: usize) -> Tensor<O> {
    let data = self.param_iter()
      .flat_map(|a| {
        let mut hot = vec![O::zero(); size];
        let i: usize = NumCast::from(a).unwrap();
        hot[i] = O::one();
        hot
      })
      .collect();
    let mut dims = self.shape.dims.clone();
    dims.push(size);
    Tensor::new(&dims, data)
  }

  pub fn accuracy<O: Real>(&self, labels: &Self) -> O {
    let hits = self.equal(labels)
      .param_iter()
      .filter(|&hit| hit )
      .count();
    O::from(hits).unwrap() / O::from(labels.size()).unwrap()
  }
}

impl<T: Inner> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Tensor{:?} ", self.shape.dims)?;
    print_chunks(0, &self.shape, &self.to_vec(), f)?;
    Ok(())
  }
}

fn print_chunks<T: Debug>(idx: usize, shape: &Shape, vec: &[T], f: &mut std::fmt::Formatter) -> std::fmt::Result {
  let indent = (0..idx * 2).map(|_| " ").collect::<String>();
  if shape.rank() == 0 {
    write!(f, "{indent}{:?}", vec[0])?;
  } else if idx == shape.rank() - 1 || vec.is_empty() {
    write!(f, "{indent}{:?}\n", vec)?;
  } else {
    let chunks = vec.chunks(vec.len() / shape.dims[idx]);
    write!(f, "{indent}[\n")?;
    for chunk in chunks {
      print_chunks(idx + 1, shape, chunk, f)?;
    }
    write!(f, "{indent}]\n")?;
  }
  Ok(())
}


pub struct TensorSliceIterator<T: Inner> {
  tensor: Tensor<T>,
  index: usize,
}

impl<T: Inner> TensorSliceIterator<T> {
  fn new(tensor: &Tensor<T>, dim: isize) -> Self {
    let dim = negative_index(dim, tensor.shape.rank(), false);
    // Merge all dimensions before `dim` into it, so slices can be taken along the front
    let mut shape = tensor.shape.dims.clone();
    for i in 0..dim { shape[i] = 1 }
    shape[dim] = 0;
    let mut tensor = tensor.reshape(&shape);
    for _ in 0..dim {
      tensor = tensor.squeeze_only(0);
    }
    Self {
      tensor,
      index: 0,
    }
  }
}

impl<T: Inner> Iterator for TensorSliceIterator<T> {
  type Item = Tensor<T>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.index == self.tensor.shape[0] { return None }
    let out = self.tensor.at(&[self.index]);
    self.index += 1;
    Some(out)
  }
}


pub struct TensorIterator<'a, T: Inner> {
  data: Ref<'a, Vec<T>>,
  shape_iter: Box<dyn Iterator<Item=usize> + 'a>,
}

impl<'a, T: Inner> TensorIterator<'a, T> {
  fn new(tensor: &'a Tensor<T>) -> Self {
    Self {
      data: tensor.data.borrow(),
      shape_iter: tensor.shape.iter(),
    }
  }
}

impl<T: Inner> Iterator for TensorIterator<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<Self::Item> {
    self.shape_iter.next().map(|i| self.data[i] )
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index() {
    let x = Tensor::new(&[2,2,2], vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(x.at(&[0,0]), Tensor::vec(&[1, 2]));
    assert_eq!(x.at(&[1,1]), Tensor::vec(&[7, 8]));
    assert_eq!(x.at(&[0,1,1]), Tensor::vec(&[4]));
    assert_eq!(x.at(&[0]), Tensor::new(&[2,2], vec![1, 2, 3, 4]));
  }

  #[test]
  fn broadcast() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);

    let y = Tensor::new(&[1], vec![1]);
    assert_eq!(x.add(&y), Tensor::new(&[2,3], vec![2, 3, 4, 5, 6, 7]));

    let y = Tensor::new(&[3], vec![1, 2, 3]);
    assert_eq!(x.add(&y), Tensor::new(&[2,3], vec![2, 4, 6, 5, 7, 9]));
    assert_eq!(y.add(&x), Tensor::new(&[2,3], vec![2, 4, 6, 5, 7, 9]));
  }

  #[test]
  fn assign_is_shared() {
    let weights = Tensor::new(&[2,2], vec![1.0, 2.0, 3.0, 4.0]);
    let alias = weights.clone();
    weights.assign(&Tensor::new(&[2,2], vec![0.0; 4]));
    assert!(alias.shared_with(&weights));
    assert_eq!(alias, Tensor::zeros(&[2,2]));
  }

  #[test]
  fn assign_from_own_view() {
    let a = Tensor::new(&[2,2], vec![1, 2, 3, 4]);
    a.assign(&a.transpose(0, 1));
    assert_eq!(a, Tensor::new(&[2,2], vec![1, 3, 2, 4]));
  }

  #[test]
  fn detach_copies() {
    let a = Tensor::vec(&[1, 2]);
    let b = a.detach();
    b.assign(&Tensor::vec(&[5, 5]));
    assert!(!a.shared_with(&b));
    assert_eq!(a, Tensor::vec(&[1, 2]));
  }

  #[test]
  fn deserialize_view() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);
    for view in [x.transpose(0, 1), x.at(&[1])] {
      let bytes = postcard::to_allocvec(&view).unwrap();
      let copy: Tensor<i32> = postcard::from_bytes(&bytes).unwrap();
      assert_eq!(copy, view);
    }
  }

  #[test]
  fn deserialize_rejects_inconsistent_shape() {
    let mut shifted = Shape::new(&[3]);
    shifted.offset = 9;
    let mut ragged = Shape::new(&[3,1]);
    ragged.strides = vec![1];
    for shape in [shifted, ragged] {
      let broken = Tensor { shape, data: Rc::new(RefCell::new(vec![1.0, 2.0, 3.0])) };
      let bytes = postcard::to_allocvec(&broken).unwrap();
      assert!(postcard::from_bytes::<Tensor<f64>>(&bytes).is_err());
    }
  }

  #[test]
  #[should_panic]
  fn from_shape_rejects_offset() {
    let mut shape = Shape::new(&[3]);
    shape.offset = 1;
    Tensor::from_shape(shape, vec![1, 2, 3]);
  }

  #[test]
  fn rows() {
    let a = Tensor::rows(&[vec![1, 2], vec![3, 4], vec![5, 6]]);
    assert_eq!(a.shape().dims, vec![3,2]);
    assert_eq!(a.iter(0).count(), 3);
  }

  #[test]
  fn argmax() {
    let a = Tensor::new(&[3,2], vec![0.1, 0.9, 0.7, 0.3, -2.0, -1.0]);
    assert_eq!(a.argmax::<u8>(-1), Tensor::vec(&[1, 0, 1]));
  }

  #[test]
  fn one_hot() {
    let labels = Tensor::vec(&[1u8, 0, 2]);
    let hot: Tensor<f32> = labels.one_hot(3);
    assert_eq!(hot, Tensor::new(&[3,3], vec![0., 1., 0., 1., 0., 0., 0., 0., 1.]));
  }

  #[test]
  fn accuracy() {
    let pred = Tensor::vec(&[1u8, 0, 1, 1]);
    let real = Tensor::vec(&[1u8, 0, 0, 1]);
    assert_eq!(pred.accuracy::<f32>(&real), 0.75);
  }
}
