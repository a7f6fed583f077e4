// This example trains a small stack, saves its parameters to a file
// and restores them into a new stack that predicts exactly alike.

use sdae::{ Tensor, Random, SdA, Snapshot };

fn main() {
  env_logger::init();

  let filename = "model.sda";

  let x = Tensor::rows(&[
    vec![1.0, 1.0, 0.0, 0.0],
    vec![1.0, 0.8, 0.1, 0.0],
    vec![0.0, 0.1, 1.0, 1.0],
    vec![0.0, 0.0, 0.9, 1.0],
  ]);
  let y = Tensor::<usize>::vec(&[0, 0, 1, 1]).one_hot(2);

  // Build and train a model
  let mut sda = SdA::new(x.clone(), y.clone(), 4, &[6, 3], 2, &Random::seeded(123)).unwrap();
  sda.pretrain(0.2, 0.1, 20).unwrap();
  sda.finetune(0.2, 20).unwrap();

  // Save its parameters to disc
  Snapshot::capture(&sda).save(filename).unwrap();

  // Load them elsewhere
  let restored = Snapshot::<f64>::load(filename).unwrap()
    .restore(x.clone(), y, &Random::seeded(0))
    .unwrap();

  let original = sda.predict(&x).unwrap();
  let copy = restored.predict(&x).unwrap();
  println!("Original:\n{}\nRestored:\n{}", original, copy);
  assert_eq!(original, copy);

  std::fs::remove_file(filename).unwrap();
}
