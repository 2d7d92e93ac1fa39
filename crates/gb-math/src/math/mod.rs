//! Core math modules.

pub mod beta_binomial;
pub mod describe;
pub mod normal;
pub mod stable;
