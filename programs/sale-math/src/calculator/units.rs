use anchor_lang::prelude::*;

use crate::errors::SaleMathError;
use crate::state::DecimalsFactor;

/// Result of an atoms to display-units conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Truncated {
    pub value: u128,
    /// The conversion rounded a non-zero amount down to nothing.
    pub lossy: bool,
}

/// Floor division of `atoms` by the decimals factor.
///
/// A non-zero amount that truncates to zero is reported through `lossy` and
/// logged; it is never an error.
pub fn to_display(atoms: u128, factor: DecimalsFactor) -> Truncated {
    let value = atoms / factor.get();
    let lossy = value == 0 && atoms != 0;
    if lossy {
        msg!(
            "Conversion of {} atoms yielded 0, possible lossy conversion",
            atoms
        );
    }
    Truncated { value, lossy }
}

pub fn to_atoms(display: u128, factor: DecimalsFactor) -> Result<u128> {
    let atoms = display
        .checked_mul(factor.get())
        .ok_or(SaleMathError::Overflow)?;
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;
    use proptest::prelude::*;

    fn factor(places: u8) -> DecimalsFactor {
        DecimalsFactor::from_places(places).unwrap()
    }

    #[test]
    fn to_display_truncates() {
        assert_eq!(
            to_display(1_999_999, factor(6)),
            Truncated {
                value: 1,
                lossy: false
            }
        );
    }

    #[test]
    fn to_display_flags_amounts_that_vanish() {
        assert!(to_display(999_999, factor(6)).lossy);
        assert_eq!(to_display(999_999, factor(6)).value, 0);
        // Zero in, zero out is not a loss.
        assert!(!to_display(0, factor(6)).lossy);
    }

    #[test]
    fn to_atoms_scales_sale_token_beyond_u64() {
        let atoms = to_atoms(80_000_000, factor(18)).unwrap();
        assert_eq!(atoms, 80_000_000 * 10u128.pow(18));
        assert!(atoms > u64::MAX as u128);
    }

    #[test]
    fn to_atoms_reports_overflow() {
        assert_eq!(
            to_atoms(u128::MAX / 10, factor(2)).unwrap_err(),
            Error::from(SaleMathError::Overflow)
        );
    }

    proptest! {
        #[test]
        fn round_trip_never_gains(atoms in any::<u128>(), places in 0u8..=38) {
            let factor = factor(places);
            let display = to_display(atoms, factor).value;
            let back = to_atoms(display, factor).unwrap();
            prop_assert!(back <= atoms);
            prop_assert!(atoms - back < factor.get());
        }
    }
}
