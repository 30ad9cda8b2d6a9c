use anchor_lang::prelude::*;

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
/// The contract counts vesting in 30-day months.
#[constant]
pub const SECONDS_PER_MONTH: i64 = 30 * SECONDS_PER_DAY;

pub const PERCENT_DENOMINATOR: u128 = 100;
pub const CENTS_PER_DOLLAR: u128 = 100;

/// Largest exponent for which 10^places fits in a u128.
pub const MAX_DECIMAL_PLACES: u8 = 38;

#[constant]
pub const SALE_TOKEN_DECIMALS: u8 = 18;
#[constant]
pub const STABLECOIN_DECIMALS: u8 = 6;
#[constant]
pub const SALE_PRICE_USD_CENTS: u64 = 85;
pub const REFERRAL_DISCOUNT_PERCENT: u8 = 5;
pub const MINIMUM_PURCHASE_USD: u64 = 50;
