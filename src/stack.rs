//! Greedy layer-wise trained classifier.
//!
//! Every hidden level of the stack is a [HiddenLayer] tied to a
//! [DenoisingAutoencoder], with a [LogisticRegression] layer on top.
//! Training happens in two phases: [pretrain](StackedDenoisingAutoencoder::pretrain)
//! fits the autoencoders one after another without supervision, then
//! [finetune](StackedDenoisingAutoencoder::finetune) fits the output layer
//! on the learned representation.
//!
//! ```
//! use sdae::{ SdA, Tensor, Random, ops::BaseOps };
//!
//! let x = Tensor::new(&[4,3], vec![
//!   1.0, 1.0, 0.0,
//!   1.0, 0.9, 0.0,
//!   0.0, 0.1, 1.0,
//!   0.0, 0.0, 1.0,
//! ]);
//! let y = Tensor::<usize>::vec(&[0, 0, 1, 1]).one_hot(2);
//!
//! let random = Random::seeded(123);
//! let mut sda = SdA::new(x.clone(), y, 3, &[4], 2, &random).unwrap();
//! sda.pretrain(0.1, 0.1, 10).unwrap();
//! sda.finetune(0.1, 10).unwrap();
//!
//! let probabilities = sda.predict(&x).unwrap();
//! assert_eq!(probabilities.shape().dims, vec![4,2]);
//! ```

use log::{ debug, info, trace, warn, log_enabled, Level };

use crate::{
  error::{ Error, Result },
  activation::Activation,
  config::Hyperparameters,
  random::Random,
  tensor::Tensor,
  scalar::Real,
  ops::BaseOps,
  layer::{
    check_batch, check_targets, check_corruption_level,
    DenoisingAutoencoder, HiddenLayer, LogisticRegression,
  },
};


/// Factor applied to the fine-tuning rate after every epoch.
pub const FINETUNE_DECAY: f64 = 0.95;


/// Stack of denoising autoencoders with a softmax classifier on top.

#[derive(Debug, Clone)]
pub struct StackedDenoisingAutoencoder<T: Real> {
  pub n_ins: usize,
  pub n_outs: usize,
  input: Tensor<T>,
  label: Tensor<T>,
  encoders: Vec<HiddenLayer<T>>,
  autoencoders: Vec<DenoisingAutoencoder<T>>,
  output_layer: LogisticRegression<T>,
  random: Random,
}

pub type SdA<T> = StackedDenoisingAutoencoder<T>;

impl<T: Real> StackedDenoisingAutoencoder<T> {
  /// Stack with sigmoid encoders.
  ///
  /// `input` holds one sample of width `n_ins` per row and `label` the
  /// matching one-hot rows of width `n_outs`.
  ///
  /// Each level is wired to a binary sample of the level below, drawn
  /// once here. The resulting inputs serve as the layers' initial stored
  /// inputs only. Pretraining draws its own samples.

  pub fn new(
    input: Tensor<T>,
    label: Tensor<T>,
    n_ins: usize,
    hidden_layer_sizes: &[usize],
    n_outs: usize,
    random: &Random,
  ) -> Result<Self> {
    if hidden_layer_sizes.is_empty() {
      return Err(Error::EmptySchedule)
    }
    let widths = std::iter::once(n_ins)
      .chain(hidden_layer_sizes.iter().copied())
      .chain(std::iter::once(n_outs));
    for (layer, width) in widths.enumerate() {
      if width == 0 {
        return Err(Error::ZeroWidth { layer })
      }
    }
    check_batch("stack input", &input, n_ins)?;
    check_targets(&input, &label, n_outs)?;

    let mut encoders: Vec<HiddenLayer<T>> = Vec::with_capacity(hidden_layer_sizes.len());
    let mut autoencoders = Vec::with_capacity(hidden_layer_sizes.len());
    let mut layer_input = input.clone();
    let mut n_in = n_ins;
    for (i, &n_hidden) in hidden_layer_sizes.iter().enumerate() {
      if let Some(below) = encoders.last() {
        layer_input = below.sample(&layer_input)?;
      }
      let autoencoder = DenoisingAutoencoder::new(layer_input.clone(), n_in, n_hidden, random)?;
      encoders.push(HiddenLayer::tied(&autoencoder, Activation::Sigmoid));
      autoencoders.push(autoencoder);
      trace!("Wired layer {}: {} -> {}", i, n_in, n_hidden);
      n_in = n_hidden;
    }
    let top = match encoders.last() {
      Some(encoder) => encoder.sample(&layer_input)?,
      None => return Err(Error::EmptySchedule),
    };
    let output_layer = LogisticRegression::new(top, label.clone(), n_in, n_outs)?;
    trace!("Wired output layer: {} -> {}", n_in, n_outs);

    Ok(Self {
      n_ins,
      n_outs,
      input,
      label,
      encoders,
      autoencoders,
      output_layer,
      random: random.clone(),
    })
  }

  /// Stack laid out according to `hyperparameters`, drawing from a
  /// generator seeded with its seed.

  pub fn from_hyperparameters(
    input: Tensor<T>,
    label: Tensor<T>,
    n_outs: usize,
    hyperparameters: &Hyperparameters,
  ) -> Result<Self> {
    hyperparameters.validate()?;
    let n_ins = input.shape().dims.last().copied().unwrap_or(0);
    let random = Random::seeded(hyperparameters.seed);
    Self::new(input, label, n_ins, &hyperparameters.hidden_layer_sizes, n_outs, &random)
  }

  /// Stack around already built layers.
  ///
  /// Encoders get tied to the given autoencoders. Nothing is drawn from
  /// `random`.

  pub(crate) fn from_layers(
    input: Tensor<T>,
    label: Tensor<T>,
    autoencoders: Vec<DenoisingAutoencoder<T>>,
    output_layer: LogisticRegression<T>,
    random: &Random,
  ) -> Result<Self> {
    let n_ins = match autoencoders.first() {
      Some(autoencoder) => autoencoder.n_visible,
      None => return Err(Error::EmptySchedule),
    };
    let n_outs = output_layer.n_out;
    check_batch("stack input", &input, n_ins)?;
    check_targets(&input, &label, n_outs)?;
    let encoders = autoencoders.iter()
      .map(|autoencoder| HiddenLayer::tied(autoencoder, Activation::Sigmoid) )
      .collect();
    Ok(Self {
      n_ins,
      n_outs,
      input,
      label,
      encoders,
      autoencoders,
      output_layer,
      random: random.clone(),
    })
  }

  pub fn n_layers(&self) -> usize {
    self.autoencoders.len()
  }

  pub fn hidden_layer_sizes(&self) -> Vec<usize> {
    self.autoencoders.iter().map(|autoencoder| autoencoder.n_hidden ).collect()
  }

  pub fn encoders(&self) -> &[HiddenLayer<T>] {
    &self.encoders
  }

  pub fn autoencoders(&self) -> &[DenoisingAutoencoder<T>] {
    &self.autoencoders
  }

  pub fn output_layer(&self) -> &LogisticRegression<T> {
    &self.output_layer
  }

  pub fn input(&self) -> &Tensor<T> {
    &self.input
  }

  pub fn label(&self) -> &Tensor<T> {
    &self.label
  }

  pub fn random(&self) -> &Random {
    &self.random
  }

  /// Greedy unsupervised training, one layer at a time.
  ///
  /// Layer `i` trains for `epochs` epochs on the original input, passed
  /// once through binary samples of all layers below it. Layers are done
  /// in order, so a layer's input reflects the fully trained layers below.

  pub fn pretrain(&mut self, learning_rate: T, corruption_level: T, epochs: usize) -> Result<()> {
    check_corruption_level(corruption_level)?;
    let n_layers = self.n_layers();
    let mut layer_input = self.input.clone();
    for i in 0..n_layers {
      if i > 0 {
        layer_input = self.encoders[i - 1].sample(&layer_input)?;
      }
      info!("Pretraining layer {} of {}", i + 1, n_layers);
      let autoencoder = &mut self.autoencoders[i];
      for epoch in 0..epochs {
        autoencoder.train(&layer_input, learning_rate, corruption_level)?;
        if log_enabled!(Level::Debug) {
          let cost = autoencoder.reconstruction_cross_entropy(&layer_input)?;
          debug!("Layer {} epoch {}: reconstruction cost {:?}", i + 1, epoch, cost);
        }
      }
    }
    Ok(())
  }

  /// Supervised training of the output layer.
  ///
  /// The original input is passed once through binary samples of all
  /// layers. The output layer then trains on that fixed representation for
  /// `epochs` epochs, with the learning rate decaying by [FINETUNE_DECAY]
  /// after each.

  pub fn finetune(&mut self, learning_rate: T, epochs: usize) -> Result<()> {
    let mut representation = self.input.clone();
    for encoder in &self.encoders {
      representation = encoder.sample(&representation)?;
    }
    info!("Finetuning output layer for {} epochs", epochs);
    let decay = T::from(FINETUNE_DECAY).unwrap();
    let mut learning_rate = learning_rate;
    for epoch in 0..epochs {
      self.output_layer.train(&representation, &self.label, learning_rate, T::zero())?;
      if log_enabled!(Level::Debug) {
        let cost = self.output_layer.negative_log_likelihood()?;
        debug!("Finetune epoch {} at rate {:?}: cost {:?}", epoch, learning_rate, cost);
      }
      learning_rate *= decay;
    }
    Ok(())
  }

  /// Pretrain and finetune with the values in `hyperparameters`.
  ///
  /// The layout and seed in `hyperparameters` are not used here.

  pub fn fit(&mut self, hyperparameters: &Hyperparameters) -> Result<()> {
    hyperparameters.validate()?;
    if hyperparameters.hidden_layer_sizes != self.hidden_layer_sizes() {
      warn!("Ignoring hidden layer sizes {:?}, stack has {:?}",
        hyperparameters.hidden_layer_sizes, self.hidden_layer_sizes());
    }
    self.pretrain(
      T::from(hyperparameters.pretrain_learning_rate).unwrap(),
      T::from(hyperparameters.corruption_level).unwrap(),
      hyperparameters.pretraining_epochs,
    )?;
    self.finetune(
      T::from(hyperparameters.finetune_learning_rate).unwrap(),
      hyperparameters.finetune_epochs,
    )
  }

  /// Class probabilities for every sample in `input`.
  ///
  /// Uses the deterministic activation of each layer, so no randomness
  /// is consumed.

  pub fn predict(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
    let mut representation = input.clone();
    for encoder in &self.encoders {
      representation = encoder.activate(&representation)?;
    }
    self.output_layer.predict(&representation)
  }

  /// Most probable class of every sample in `input`.

  pub fn classify(&self, input: &Tensor<T>) -> Result<Tensor<usize>> {
    Ok(self.predict(input)?.argmax(-1))
  }

  /// Output layer cost on the representation it was last trained on.

  pub fn finetune_cost(&self) -> Result<T> {
    self.output_layer.negative_log_likelihood()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;
  use crate::ops::NumericOps;

  fn data() -> (Tensor<f64>, Tensor<f64>) {
    let x = Tensor::new(&[6,4], vec![
      1.0, 1.0, 0.0, 0.0,
      1.0, 0.8, 0.1, 0.0,
      0.9, 1.0, 0.0, 0.2,
      0.0, 0.1, 1.0, 1.0,
      0.0, 0.0, 0.9, 1.0,
      0.2, 0.0, 1.0, 0.8,
    ]);
    let y = Tensor::<usize>::vec(&[0, 0, 0, 1, 1, 1]).one_hot(2);
    (x, y)
  }

  fn trained(seed: u64) -> SdA<f64> {
    let (x, y) = data();
    let random = Random::seeded(seed);
    let mut sda = SdA::new(x, y, 4, &[5], 2, &random).unwrap();
    sda.pretrain(0.1, 0.2, 5).unwrap();
    sda.finetune(0.1, 5).unwrap();
    sda
  }

  #[test]
  fn layout() {
    let (x, y) = data();
    let sda = SdA::new(x, y, 4, &[5, 3], 2, &Random::seeded(1)).unwrap();
    assert_eq!(sda.n_layers(), 2);
    assert_eq!(sda.hidden_layer_sizes(), vec![5, 3]);
    assert_eq!(sda.autoencoders()[0].weights().shape().dims, vec![4,5]);
    assert_eq!(sda.autoencoders()[1].weights().shape().dims, vec![5,3]);
    assert_eq!(sda.output_layer().weights(), &Tensor::zeros(&[3,2]));
    assert_eq!(sda.autoencoders()[1].input().shape().dims, vec![6,5]);

    let top = sda.output_layer().input();
    assert_eq!(top.shape().dims, vec![6,3]);
    assert!(top.param_iter().all(|x| x == 0.0 || x == 1.0 ));
  }

  #[test]
  fn construction_order() {
    // Layer 0 weights come first, then the sample feeding layer 1
    let (x, y) = data();
    let sda = SdA::new(x.clone(), y, 4, &[5, 3], 2, &Random::seeded(8)).unwrap();
    let replay = Random::seeded(8);
    let first = DenoisingAutoencoder::<f64>::new(x.clone(), 4, 5, &replay).unwrap();
    assert_eq!(first.weights(), sda.autoencoders()[0].weights());
    let wiring = HiddenLayer::tied(&first, Activation::Sigmoid).sample(&x).unwrap();
    assert_eq!(&wiring, sda.autoencoders()[1].input());
  }

  #[test]
  fn invalid_layout() {
    let (x, y) = data();
    let random = Random::seeded(1);
    assert!(matches!(SdA::new(x.clone(), y.clone(), 4, &[], 2, &random), Err(Error::EmptySchedule)));
    assert!(matches!(SdA::new(x.clone(), y.clone(), 4, &[5, 0], 2, &random), Err(Error::ZeroWidth { layer: 2 })));
    assert!(matches!(SdA::new(x.clone(), y.clone(), 3, &[5], 2, &random), Err(Error::ShapeMismatch { .. })));
    assert!(matches!(SdA::new(x.clone(), y, 4, &[5], 3, &random), Err(Error::ShapeMismatch { .. })));
    let short = Tensor::zeros(&[5,2]);
    assert!(matches!(SdA::new(x, short, 4, &[5], 2, &random), Err(Error::ShapeMismatch { .. })));
  }

  #[test]
  fn tied_after_pretraining() {
    let sda = trained(3);
    for (encoder, autoencoder) in sda.encoders().iter().zip(sda.autoencoders()) {
      assert!(encoder.weights().shared_with(autoencoder.weights()));
      assert!(encoder.bias().shared_with(autoencoder.hidden_bias()));
      assert_eq!(encoder.weights(), autoencoder.weights());
    }
  }

  #[test]
  fn pretraining_rejects_corruption() {
    let (x, y) = data();
    let random = Random::seeded(4);
    let mut sda = SdA::new(x, y, 4, &[5], 2, &random).unwrap();
    let weights = sda.autoencoders()[0].weights().detach();
    assert!(matches!(sda.pretrain(0.1, 1.0, 5), Err(Error::CorruptionLevel(_))));
    assert_eq!(sda.autoencoders()[0].weights(), &weights);
  }

  #[test]
  fn zero_epochs_change_nothing() {
    let (x, y) = data();
    let mut sda = SdA::new(x, y, 4, &[5], 2, &Random::seeded(4)).unwrap();
    let weights = sda.autoencoders()[0].weights().detach();
    sda.pretrain(0.1, 0.2, 0).unwrap();
    sda.finetune(0.1, 0).unwrap();
    assert_eq!(sda.autoencoders()[0].weights(), &weights);
    assert_eq!(sda.output_layer().weights(), &Tensor::zeros(&[5,2]));
  }

  #[test]
  fn finetuning_decays_rate() {
    let (x, y) = data();
    let mut sda = SdA::new(x.clone(), y.clone(), 4, &[5], 2, &Random::seeded(6)).unwrap();
    let mut replay = SdA::new(x, y.clone(), 4, &[5], 2, &Random::seeded(6)).unwrap();

    sda.finetune(0.1, 3).unwrap();

    let mut representation = replay.input.clone();
    for encoder in &replay.encoders {
      representation = encoder.sample(&representation).unwrap();
    }
    let mut rate = 0.1;
    for _ in 0..3 {
      replay.output_layer.train(&representation, &y, rate, 0.0).unwrap();
      rate *= 0.95;
    }
    assert_eq!(sda.output_layer().weights(), replay.output_layer().weights());
    assert_eq!(sda.output_layer().bias(), replay.output_layer().bias());
  }

  #[test]
  fn reproducible() {
    let (x, _) = data();
    let a = trained(42).predict(&x).unwrap();
    let b = trained(42).predict(&x).unwrap();
    assert_eq!(a.to_vec(), b.to_vec());
  }

  #[test]
  fn prediction_is_deterministic() {
    let (x, _) = data();
    let sda = trained(42);
    assert_eq!(sda.predict(&x).unwrap(), sda.predict(&x).unwrap());
  }

  #[test]
  fn predictions_are_distributions() {
    let (x, _) = data();
    let probabilities = trained(7).predict(&x).unwrap();
    assert_eq!(probabilities.shape().dims, vec![6,2]);
    assert!(probabilities.within(0.0, 1.0));
    for sum in probabilities.sum(-1).param_iter() {
      assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
    }
  }

  #[test]
  fn classify() {
    let (x, _) = data();
    let classes = trained(7).classify(&x).unwrap();
    assert_eq!(classes.shape().dims, vec![6]);
    assert!(classes.param_iter().all(|class| class < 2 ));
  }

  #[test]
  fn fit() {
    let (x, y) = data();
    let hyperparameters = Hyperparameters::default()
      .with_hidden_layer_sizes(&[5])
      .with_pretraining(0.1, 0.2, 5)
      .with_finetuning(0.1, 5)
      .with_seed(42);
    let mut sda = SdA::from_hyperparameters(x.clone(), y, 2, &hyperparameters).unwrap();
    sda.fit(&hyperparameters).unwrap();
    assert_eq!(sda.predict(&x).unwrap().to_vec(), trained(42).predict(&x).unwrap().to_vec());
    assert!(sda.finetune_cost().unwrap().is_finite());
  }

  #[test]
  fn encoders_are_sigmoid() {
    let sda = trained(9);
    assert!(sda.encoders().iter().all(|encoder| encoder.activation() == Activation::Sigmoid ));
  }

  #[test]
  fn nan_weights_fail_sampling() {
    let (x, y) = data();
    let mut sda = SdA::new(x, y, 4, &[5, 3], 2, &Random::seeded(9)).unwrap();
    sda.autoencoders()[0].weights().assign(&Tensor::fill(&[4,5], f64::NAN));
    assert!(matches!(sda.pretrain(0.1, 0.1, 1), Err(Error::Probability(_))));
    assert!(matches!(sda.finetune(0.1, 1), Err(Error::Probability(_))));
  }

  #[test]
  fn predict_rejects_wrong_width() {
    let sda = trained(1);
    assert!(matches!(sda.predict(&Tensor::zeros(&[2,3])), Err(Error::ShapeMismatch { .. })));
  }
}
