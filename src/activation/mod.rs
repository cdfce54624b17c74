pub mod activation;

pub use activation::{Activation, CustomActivation, softmax, softmax_backward};
