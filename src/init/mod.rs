pub mod initializer;

pub use initializer::{WeightInit, CustomInit};
