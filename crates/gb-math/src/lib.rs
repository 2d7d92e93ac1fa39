//! Grade-bias math utilities.

pub mod math;

pub use math::beta_binomial;
pub use math::describe;
pub use math::normal;
pub use math::stable::*;
