//! Phone number / OTP authentication
//!
//! `AuthFlow` walks a user from phone entry to a stored session, branching
//! into registration when the server does not know the number.

mod flow;
pub mod validate;

pub use flow::{AuthFlow, AuthStage};
