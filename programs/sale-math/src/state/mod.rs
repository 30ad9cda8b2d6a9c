use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::SaleMathError;

/// Tier identifier, matching the contract's `uint8 tier` argument.
pub type TierId = u8;

/// A power of ten that scales display units into atoms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecimalsFactor(u128);

impl DecimalsFactor {
    pub fn from_places(places: u8) -> Result<Self> {
        require!(places <= MAX_DECIMAL_PLACES, SaleMathError::InvalidDecimals);
        Ok(Self(10u128.pow(places as u32)))
    }

    pub fn get(self) -> u128 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stablecoin {
    Usdc,
    Usdt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierTerms {
    pub bonus_percent: u64,
    /// Whole months over which the purchase plus bonus vests. Zero vests at
    /// the vesting start.
    pub vesting_months: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pricing {
    /// One price for every tier (V2 contract).
    Flat { price_cents: u64 },
    /// A dedicated price per tier (V1 contract).
    PerTier(BTreeMap<TierId, u64>),
}

impl Pricing {
    pub fn price_cents(&self, tier: TierId) -> Result<u64> {
        match self {
            Pricing::Flat { price_cents } => Ok(*price_cents),
            Pricing::PerTier(prices) => prices
                .get(&tier)
                .copied()
                .ok_or_else(|| SaleMathError::UnknownTier.into()),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Pricing::Flat { price_cents } => {
                require!(*price_cents > 0, SaleMathError::InvalidPrice);
            }
            Pricing::PerTier(prices) => {
                require!(
                    prices.values().all(|price| *price > 0),
                    SaleMathError::InvalidPrice
                );
            }
        }
        Ok(())
    }
}

/// Fixed configuration of a sale, supplied once to the calculator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleTerms {
    pub sale_token: DecimalsFactor,
    pub usdc: DecimalsFactor,
    pub usdt: DecimalsFactor,
    pub pricing: Pricing,
    pub tiers: BTreeMap<TierId, TierTerms>,
    /// Unix timestamp when vesting starts
    pub vesting_start: i64,
    pub month_seconds: i64,
    pub referral_discount_percent: u8,
    pub minimum_purchase_usd: u64,
}

impl SaleTerms {
    /// Terms observed on the V2 contract: 85 cents per token, tiers 1/2/3
    /// with 85/25/0 percent bonus vesting over 9/6/0 months.
    pub fn v2_default(vesting_start: i64) -> Result<Self> {
        let terms = Self {
            sale_token: DecimalsFactor::from_places(SALE_TOKEN_DECIMALS)?,
            usdc: DecimalsFactor::from_places(STABLECOIN_DECIMALS)?,
            usdt: DecimalsFactor::from_places(STABLECOIN_DECIMALS)?,
            pricing: Pricing::Flat {
                price_cents: SALE_PRICE_USD_CENTS,
            },
            tiers: default_tiers(),
            vesting_start,
            month_seconds: SECONDS_PER_MONTH,
            referral_discount_percent: REFERRAL_DISCOUNT_PERCENT,
            minimum_purchase_usd: MINIMUM_PURCHASE_USD,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// V1 priced each tier separately and paid no bonus.
    pub fn v1_default(vesting_start: i64, tier_prices_cents: BTreeMap<TierId, u64>) -> Result<Self> {
        let tiers = tier_prices_cents
            .keys()
            .map(|tier| {
                let vesting_months = default_tiers()
                    .get(tier)
                    .map(|terms| terms.vesting_months)
                    .unwrap_or(0);
                (
                    *tier,
                    TierTerms {
                        bonus_percent: 0,
                        vesting_months,
                    },
                )
            })
            .collect();

        let terms = Self {
            pricing: Pricing::PerTier(tier_prices_cents),
            tiers,
            ..Self::v2_default(vesting_start)?
        };
        terms.validate()?;
        Ok(terms)
    }

    pub fn tier(&self, tier: TierId) -> Result<&TierTerms> {
        self.tiers
            .get(&tier)
            .ok_or_else(|| SaleMathError::UnknownTier.into())
    }

    pub fn stablecoin(&self, coin: Stablecoin) -> DecimalsFactor {
        match coin {
            Stablecoin::Usdc => self.usdc,
            Stablecoin::Usdt => self.usdt,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.pricing.validate()?;
        require!(self.month_seconds > 0, SaleMathError::InvalidVestingPeriod);
        require!(
            self.referral_discount_percent <= 100,
            SaleMathError::InvalidPercentage
        );
        Ok(())
    }
}

fn default_tiers() -> BTreeMap<TierId, TierTerms> {
    BTreeMap::from([
        (
            1,
            TierTerms {
                bonus_percent: 85,
                vesting_months: 9,
            },
        ),
        (
            2,
            TierTerms {
                bonus_percent: 25,
                vesting_months: 6,
            },
        ),
        (
            3,
            TierTerms {
                bonus_percent: 0,
                vesting_months: 0,
            },
        ),
    ])
}
