use anchor_lang::prelude::*;

#[error_code]
pub enum SaleMathError {
    #[msg("Tier is not configured")]
    UnknownTier,
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Decimals cannot exceed 38 places")]
    InvalidDecimals,
    #[msg("Token price must be greater than 0")]
    InvalidPrice,
    #[msg("Percentage cannot exceed 100")]
    InvalidPercentage,
    #[msg("Vesting month length must be greater than 0")]
    InvalidVestingPeriod,
    #[msg("Nothing to claim")]
    NothingToClaim,
}
