use rand::distributions::uniform::SampleUniform;
use num_traits::{ NumAssignOps, Num, NumCast };
use itertools::iproduct;


/// All types that may be used in a [Tensor](crate::Tensor).
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Inner: PartialEq + Clone + Copy + std::fmt::Debug {}
impl<T: PartialEq + Clone + Copy + std::fmt::Debug> Inner for T {}


/// All numeric types.
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Numeric: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum {}
impl<T: Inner + PartialOrd + Num + NumCast + NumAssignOps + std::iter::Sum> Numeric for T {}


/// All signed numeric types.
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Signed: Numeric + num_traits::Signed {}
impl<T: Numeric + num_traits::Signed> Signed for T {}


/// All unsigned integer types.

pub trait Unsigned: Numeric + num_traits::Unsigned + num_traits::PrimInt {}
impl<T: Numeric + num_traits::Unsigned + num_traits::PrimInt> Unsigned for T {}


/// All continuous numeric types.
///
/// Only `f32` and `f64` qualify, as every real type must also
/// provide a [Gemm] kernel.

pub trait Real: Signed + num_traits::real::Real + SampleUniform + Gemm {}
impl<T: Signed + num_traits::real::Real + SampleUniform + Gemm> Real for T {}


/// Dense matrix product over strided storage.
///
/// Operands are given as a slice starting at the first element of the
/// matrix, plus row and column strides in elements. Zero strides are
/// allowed and denote broadcasted dimensions. The product is returned
/// in contiguous row-major order.

pub trait Gemm: Numeric {
  fn gemm(dims: [usize; 3], lhs: &[Self], strides_l: [isize; 2], rhs: &[Self], strides_r: [isize; 2]) -> Vec<Self> {
    let [rows, inner, cols] = dims;
    let at = |s: [isize; 2], i: usize, j: usize| (i as isize * s[0] + j as isize * s[1]) as usize;
    let mut data = vec![Self::zero(); rows * cols];
    for (i, j) in iproduct!(0..rows, 0..cols) {
      for k in 0..inner {
        data[i * cols + j] += lhs[at(strides_l, i, k)] * rhs[at(strides_r, k, j)];
      }
    }
    data
  }
}

macro_rules! accelerated_gemm {
  ($type:ty, $kernel:ident) => {
    #[cfg(feature = "unsafe")]
    impl Gemm for $type {
      fn gemm(dims: [usize; 3], lhs: &[Self], strides_l: [isize; 2], rhs: &[Self], strides_r: [isize; 2]) -> Vec<Self> {
        let [rows, inner, cols] = dims;
        let mut data = vec![0.0; rows * cols];
        if data.is_empty() { return data }
        // Strides address elements within the given slices, which are
        // borrowed for the duration of the call.
        unsafe {
          matrixmultiply::$kernel(
            rows,
            inner,
            cols,
            1.0,
            lhs.as_ptr(),
            strides_l[0],
            strides_l[1],
            rhs.as_ptr(),
            strides_r[0],
            strides_r[1],
            0.0,
            data.as_mut_ptr(),
            cols as isize,
            1,
          );
        }
        data
      }
    }

    #[cfg(not(feature = "unsafe"))]
    impl Gemm for $type {}
  };
}

accelerated_gemm!(f32, sgemm);
accelerated_gemm!(f64, dgemm);

impl Gemm for i32 {}
impl Gemm for i64 {}
impl Gemm for u8 {}
impl Gemm for u16 {}
impl Gemm for u32 {}
impl Gemm for u64 {}
impl Gemm for usize {}
