//! Beta-Binomial regression of grades on reviewer and author gender.

pub mod covariates;
pub mod density;
pub mod transform;

pub use covariates::{design_row, encode_gender, Covariates, DESIGN_WIDTH, FEMALE, MALE};
pub use density::{outcome_frequencies, BetaBinomialModel};
pub use transform::{from_alpha_beta, is_valid_shape, to_alpha_beta, Coefficients};
