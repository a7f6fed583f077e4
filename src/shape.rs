use serde::{ Serialize, Deserialize };

use crate::internal::*;


/// The shape of a [Tensor](crate::Tensor).
///
/// Besides its dimensions, a shape records the strides and offset used to
/// address elements in the underlying storage, which lets views like
/// transposes and broadcasts share storage with the tensor they came from.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
  pub dims: Vec<usize>,
  pub(crate) strides: Vec<isize>,
  pub(crate) offset: usize,
}

impl Shape {
  pub fn new(dims: &[usize]) -> Self {
    let strides = Self::make_strides(dims);
    Self {
      dims: dims.to_vec(),
      strides,
      offset: 0,
    }
  }

  fn make_strides(dims: &[usize]) -> Vec<isize> {
    if dims.len() == 0 { return vec![] }
    let mut strides = vec![0; dims.len()];
    strides[dims.len() - 1] = 1;
    for i in (1..dims.len()).rev() {
      strides[i - 1] = dims[i] as isize * strides[i];
    }
    strides
  }

  pub fn size(&self) -> usize {
    self.dims.iter().product()
  }

  pub fn rank(&self) -> usize {
    self.dims.len()
  }

  pub(crate) fn index(&self, indices: &[usize]) -> usize {
    assert!(indices.len() <= self.rank());
    // Append missing dimensions as zero
    (indices.iter()
      .chain(std::iter::repeat(&0))
      .zip(&self.strides)
      .map(|(&i, &s)| i as isize * s)
      .sum::<isize>() + self.offset as isize
    ) as usize
  }

  pub fn contiguous(&self) -> bool {
    self.strides == Self::make_strides(&self.dims)
  }

  /// Whether every element this shape addresses lies inside storage
  /// of length `len`.

  pub(crate) fn fits(&self, len: usize) -> bool {
    if self.strides.len() != self.dims.len() { return false }
    if self.dims.contains(&0) { return true }
    let Ok(offset) = isize::try_from(self.offset) else { return false };
    let mut low = offset;
    let mut high = offset;
    for (&dim, &stride) in self.dims.iter().zip(&self.strides) {
      let Some(extent) = isize::try_from(dim - 1).ok()
        .and_then(|last| last.checked_mul(stride) ) else { return false };
      let bound = if extent < 0 { &mut low } else { &mut high };
      let Some(moved) = bound.checked_add(extent) else { return false };
      *bound = moved;
    }
    low >= 0 && (high as usize) < len
  }

  /// Storage indices of all elements in row-major order.

  pub fn iter(&self) -> Box<dyn Iterator<Item=usize> + '_> {
    if self.contiguous() {
      Box::new(self.offset..self.offset + self.size())
    } else if self.size() == 0 {
      Box::new(std::iter::empty())
    } else {
      Box::new(ShapeIterator::new(self))
    }
  }

  /// Reinterpret contiguous dimensions. A zero in `shape` is a placeholder
  /// that absorbs whatever size remains.

  pub fn view(&self, shape: &[usize]) -> Self {
    assert!(self.contiguous(), "Cannot view non-contiguous {}", self);
    let dims: Vec<usize> = shape.iter().enumerate().map(|(i, &n)| if n == 0 {
      let product: usize =
        shape[0..i].iter()
        .chain(shape[i + 1..shape.len()].iter())
        .product();
      if product == 0 { 0 } else { self.size() / product }
    } else {
      n
    }).collect();
    assert_eq!(dims.iter().product::<usize>(), self.size(),
      "Cannot view {} as {:?}", self, dims);
    let strides = Self::make_strides(&dims);
    Self { dims, strides, offset: self.offset }
  }

  pub fn take(&self, indices: &[usize]) -> Self {
    let dims = self.dims[indices.len()..].to_vec();
    let strides = self.strides[indices.len()..].to_vec();
    let offset = self.index(indices);
    Self { dims, strides, offset }
  }

  pub fn squeeze(&self) -> Self {
    self.squeeze_if(|_| false )
  }

  pub fn squeeze_only(&self, dim: isize) -> Self {
    let dim = negative_index(dim, self.rank(), false);
    self.squeeze_if(|d| d != dim )
  }

  fn squeeze_if(&self, keep: impl Fn(usize) -> bool) -> Self {
    let mut dims = vec![];
    let mut strides = vec![];
    for (d, &n) in self.dims.iter().enumerate() {
      if n != 1 || keep(d) {
        dims.push(n);
        strides.push(self.strides[d]);
      }
    }
    Self { dims, strides, offset: self.offset }
  }

  pub fn unsqueeze(&self, dim: isize) -> Self {
    let d = negative_index(dim, self.rank(), true);
    let mut shape = self.clone();
    shape.strides.insert(d, if d < shape.dims.len() {
      shape.strides[d].abs() * shape.dims[d] as isize
    } else { 1 });
    shape.dims.insert(d, 1);
    shape
  }

  /// Stretch size-one and missing leading dimensions to match `other`,
  /// using zero strides so no data gets copied.

  pub fn broadcast(&self, other: &Self) -> Self {
    assert!(self.broadcastable(other), "Could not broadcast {} & {}", self, other);
    let rank = self.rank().max(other.rank());
    let mut dims = vec![];
    let mut strides = vec![];
    self.dims.iter()
      .rev()
      .chain(std::iter::repeat(&1))
      .zip(other.dims.iter()
        .rev()
        .chain(std::iter::repeat(&1)))
      .take(rank)
      .zip(self.strides.iter()
        .rev()
        .chain(std::iter::repeat(&0)))
      .for_each(|((&dl, &dr), &stride)| {
        dims.push(dl.max(dr));
        strides.push(if dl == 1 && dr != 1 { 0 } else { stride });
      });
    dims.reverse();
    strides.reverse();
    Self { dims, strides, offset: self.offset }
  }

  pub fn broadcastable(&self, other: &Self) -> bool {
    self.dims.iter().rev()
      .zip(other.dims.iter().rev())
      .all(|(&a, &b)| a == b || a == 1 || b == 1 )
  }

  pub fn transpose(&self, dim1: isize, dim2: isize) -> Self {
    let dim1 = negative_index(dim1, self.rank(), false);
    let dim2 = negative_index(dim2, self.rank(), false);
    let mut shape = self.clone();
    shape.dims.swap(dim1, dim2);
    shape.strides.swap(dim1, dim2);
    shape
  }
}

impl std::ops::Index<isize> for Shape {
  type Output = usize;

  fn index(&self, i: isize) -> &usize {
    let idx = negative_index(i, self.rank(), false);
    &self.dims[idx]
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Shape{:?}", self.dims)
  }
}


/// Iterate through a [Shape]'s storage indices.

pub struct ShapeIterator<'a> {
  shape: &'a Shape,
  counter: Vec<usize>,
  idx: isize,
  finished: bool,
}

impl<'a> ShapeIterator<'a> {
  fn new(shape: &'a Shape) -> Self {
    Self {
      counter: vec![0; shape.rank()],
      idx: shape.offset as isize,
      shape,
      finished: false,
    }
  }
}

impl<'a> Iterator for ShapeIterator<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished { return None }
    let out = self.idx as usize;
    let len = self.counter.len();
    if len == 0 { self.finished = true }
    // Walk backward through dimensions
    for cd in (0..len).rev() {
      // Increment counter on full turn of right hand dimension
      if cd == len - 1 || self.counter[cd + 1] == 0 {
        let count = &mut self.counter[cd];
        if *count == self.shape.dims[cd] - 1 {
          if cd == 0 { self.finished = true; break }
          *count = 0;
          let backstride = (self.shape.dims[cd] as isize - 1) * self.shape.strides[cd];
          self.idx -= backstride;
        } else {
          *count += 1;
          self.idx += self.shape.strides[cd];
        }
      } else {
        break
      }
    }
    Some(out)
  }
}
