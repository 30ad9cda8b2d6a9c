//! Off-chain mirror of the token sale contract's arithmetic.
//!
//! The contract is the source of truth. This crate reproduces its integer
//! math step by step so that tests can compute expected balances, bonuses
//! and vesting claims without asking the chain.

pub mod calculator;
pub mod constants;
pub mod errors;
pub mod state;
pub mod vesting;

pub use calculator::{ConverterCalculator, Truncated};
pub use errors::SaleMathError;
pub use state::{DecimalsFactor, Pricing, SaleTerms, Stablecoin, TierId, TierTerms};
pub use vesting::{Allocation, Entitlements, VestingSchedule};
