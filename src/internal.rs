#[inline]
pub fn negative_index(i: isize, n: usize, start_behind: bool) -> usize {
  if i < 0 {
    let offset = if start_behind { 1 } else { 0 };
    (n as isize + i + offset) as usize
  } else {
    i as usize
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wraps_negative_indices() {
    assert_eq!(negative_index(-1, 3, false), 2);
    assert_eq!(negative_index(-1, 3, true), 3);
    assert_eq!(negative_index(1, 3, false), 1);
  }
}
