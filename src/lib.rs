//! Stacked denoising autoencoders for classification.
//! Tiny. Few dependencies. CPU only. Stable Rust.
//!
//! # Features
//!
//! - **Greedy layer-wise pretraining** of every hidden level as a denoising
//! autoencoder, followed by supervised fine-tuning of a softmax output layer.
//!
//! - **Tied weights**: Every encoder shares its weight and bias storage with
//! the autoencoder it belongs to, and decoders use a transposed view of the
//! very same weight. Nothing is ever copied back and forth.
//!
//! - **Reproducible**: All randomness comes from a single seeded [Random]
//! handle passed into the stack. Same seed, same data, same results.
//!
//! - **Zero-copy views**: Tensors may be reshaped, transposed and broadcasted
//! without actually copying any data in most situations.
//!
//! - **Snapshots**: Trained parameters can be serialized and restored elsewhere.
//!
//! # Examples
//!
//! ```
//! use sdae::{ SdA, Tensor, Random };
//!
//! let x = Tensor::new(&[6,4], vec![
//!   1.0, 1.0, 0.0, 0.0,
//!   1.0, 0.8, 0.1, 0.0,
//!   0.9, 1.0, 0.0, 0.2,
//!   0.0, 0.1, 1.0, 1.0,
//!   0.0, 0.0, 0.9, 1.0,
//!   0.2, 0.0, 1.0, 0.8,
//! ]);
//! let y = Tensor::<usize>::vec(&[0, 0, 0, 1, 1, 1]).one_hot(2);
//!
//! let random = Random::seeded(123);
//! let mut sda = SdA::new(x.clone(), y, 4, &[5], 2, &random).unwrap();
//!
//! sda.pretrain(0.1, 0.2, 5).unwrap();
//! sda.finetune(0.1, 5).unwrap();
//!
//! let classes = sda.classify(&x).unwrap();
//! assert_eq!(classes.size(), 6);
//! ```
//!
//! Hyperparameters can also be read from TOML:
//! ```
//! use sdae::Hyperparameters;
//!
//! let hyperparameters = Hyperparameters::from_toml_str("
//!   hidden_layer_sizes = [16, 8]
//!   finetune_epochs = 50
//! ").unwrap();
//! assert_eq!(hyperparameters.seed, 123);
//! ```
//!
//! ## More examples
//! Check the `/demos` folder for more example code.
//!
//!
//! # Optional features
//!
//! Some features can be toggled in your `Cargo.toml`.
//!
//! - `unsafe` *(default)*: Accelerated matrix math using [matrixmultiply] crate.
//! - `threading`: Multi-threaded matrix products.

mod internal;
mod shape;
mod tensor;
mod random;
mod activation;
mod error;
mod config;
mod snapshot;

pub mod ops;
pub mod scalar;
pub mod layer;
pub mod stack;

pub use shape::Shape;
pub use tensor::Tensor;
pub use random::Random;
pub use activation::Activation;
pub use error::{ Error, Result };
pub use config::Hyperparameters;
pub use snapshot::{ Snapshot, LayerSnapshot };
pub use layer::{ DenoisingAutoencoder, HiddenLayer, LogisticRegression };
pub use stack::{ StackedDenoisingAutoencoder, SdA, FINETUNE_DECAY };
