#![deny(missing_docs)]
#![doc = "Search space, parameter domain and objective model for the DOE campaign engine."]

pub mod objective;
pub mod parameter;
pub mod space;

pub use objective::{Objective, Target, TargetMode};
pub use parameter::{Parameter, ParameterDomain};
pub use space::SearchSpace;
