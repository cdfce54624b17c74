pub mod rule;
pub mod optimizer;

pub use rule::UpdateRule;
pub use optimizer::{Optimizer, ParamId};
