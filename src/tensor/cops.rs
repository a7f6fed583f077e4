use crate::{
  tensor::Tensor,
  scalar::Gemm,
  ops::Cops,
};


impl<T: Gemm> Cops<T> for Tensor<T> {
  fn matmul(&self, rhs: &Self) -> Vec<T> {
    assert!(self.rank() == 2 && rhs.rank() == 2,
      "Matrix product needs two matrices, got {} & {}", self.shape, rhs.shape);

    let rows_l = self.shape[-2];
    let cols_l = self.shape[-1];
    let rows_r = rhs.shape[-2];
    let cols_r = rhs.shape[-1];

    assert_eq!(cols_l, rows_r,
      "Could not multiply {} & {}", self.shape, rhs.shape);

    // Strided operands are passed straight to the kernel, so transposed
    // views get multiplied without copying their storage first.
    let data_l = self.data.borrow();
    let data_r = rhs.data.borrow();

    T::gemm(
      [rows_l, cols_l, cols_r],
      &data_l[self.shape.offset..],
      [self.shape.strides[0], self.shape.strides[1]],
      &data_r[rhs.shape.offset..],
      [rhs.shape.strides[0], rhs.shape.strides[1]],
    )
  }
}


#[cfg(test)]
mod tests {
  use crate::Tensor;
  use crate::ops::{ BaseOps, NumericOps };

  #[test]
  fn matmul() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);
    let y = Tensor::new(&[3,2], vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,2], vec![22, 28, 49, 64]));
  }

  #[test]
  fn matmul_vector() {
    let x = Tensor::new(&[2,3], vec![1, 2, 3, 4, 5, 6]);

    let y = Tensor::new(&[3,1], vec![1, 2, 3]);
    assert_eq!(x.mm(&y), Tensor::new(&[2,1], vec![14, 32]));

    let y = Tensor::vec(&[1, 2, 3]);
    assert_eq!(x.mm(&y), Tensor::vec(&[14, 32]));

    let v = Tensor::vec(&[1, 2]);
    assert_eq!(v.mm(&x), Tensor::vec(&[9, 12, 15]));
  }

  #[test]
  fn matmul_transposed_view() {
    let w = Tensor::new(&[3,2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let h = Tensor::new(&[1,2], vec![1.0, 1.0]);
    assert_eq!(h.mm(&w.transpose(0, 1)), Tensor::new(&[1,3], vec![3.0, 7.0, 11.0]));
    assert_eq!(w.transpose(0, 1).mm(&w), Tensor::new(&[2,2], vec![35.0, 44.0, 44.0, 56.0]));
  }

  #[test]
  #[should_panic(expected = "Could not multiply")]
  fn matmul_mismatch() {
    let x = Tensor::new(&[2,3], vec![1.0; 6]);
    let y = Tensor::new(&[2,2], vec![1.0; 4]);
    x.mm(&y);
  }
}
