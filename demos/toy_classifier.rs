// This example trains a stacked denoising autoencoder on noisy copies
// of two binary patterns and reports its accuracy on unseen samples.

// Pass the path of a TOML file to override the default hyperparameters.
// Set RUST_LOG=debug to follow training progress.

use sdae::{ Tensor, Random, SdA, Hyperparameters };

const N_FEATURES: usize = 20;

fn dataset(random: &Random, n_samples: usize) -> (Tensor<f64>, Tensor<usize>) {
  let prototypes: [Vec<f64>; 2] = [
    (0..N_FEATURES).map(|i| if i < N_FEATURES / 2 { 1.0 } else { 0.0 } ).collect(),
    (0..N_FEATURES).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 } ).collect(),
  ];
  let classes: Vec<usize> = (0..n_samples).map(|i| i % 2 ).collect();
  let rows: Vec<Vec<f64>> = classes.iter().map(|&class| prototypes[class].clone() ).collect();

  // Flip every bit with a small probability
  let flips = random.bernoulli(&[n_samples, N_FEATURES], 0.1);
  let samples = Tensor::rows(&rows).zip(&flips, |(x, flip)| if flip == 1.0 { 1.0 - x } else { x } );

  (samples, Tensor::vec(&classes))
}

fn main() {
  env_logger::init();

  let hyperparameters = match std::env::args().nth(1) {
    Some(path) => Hyperparameters::load(path).unwrap(),
    None => Hyperparameters::default().with_hidden_layer_sizes(&[12, 6]),
  };
  println!("{}", hyperparameters.to_toml_string().unwrap());

  // Data gets drawn independently of the model's generator
  let random = Random::seeded(7);
  let (train_x, train_classes) = dataset(&random, 60);
  let (test_x, test_classes) = dataset(&random, 20);

  let mut sda = SdA::from_hyperparameters(train_x, train_classes.one_hot(2), 2, &hyperparameters).unwrap();
  sda.fit(&hyperparameters).unwrap();
  println!("Finetune cost: {:?}", sda.finetune_cost().unwrap());

  let predicted = sda.classify(&test_x).unwrap();
  println!("Test accuracy: {}", predicted.accuracy::<f64>(&test_classes));
  println!("Class probabilities:\n{}", sda.predict(&test_x).unwrap());
}
