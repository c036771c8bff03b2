use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Every monetary value in the ledger (expense totals, shares, ledger entry
/// amounts, balances, suggested transfers) uses this type, so sums are exact
/// and independent of the order they are computed in.
///
/// The value is signed:
/// - positive = owed to the participant (creditor side)
/// - negative = owed by the participant (debtor side)
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest amount a single expense, share or settlement may carry
    /// (one trillion units).
    ///
    /// Keeps every stored amount far enough from `i64::MAX` that netting
    /// millions of entries cannot overflow.
    pub const MAX_AMOUNT: MoneyCents = MoneyCents(1_000_000_000_000_00);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Checked negation (returns `None` for `i64::MIN` cents).
    #[must_use]
    pub fn checked_neg(self) -> Option<MoneyCents> {
        self.0.checked_neg().map(MoneyCents)
    }

    /// Sums `amounts`, returning `None` if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = MoneyCents>) -> Option<MoneyCents> {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
    }

    /// Returns `true` if `0 <= self <= MAX_AMOUNT`.
    #[must_use]
    pub const fn is_storable(self) -> bool {
        self.0 >= 0 && self.0 <= Self::MAX_AMOUNT.0
    }

    /// Splits the amount into `parts` cent amounts that add up to `self`.
    ///
    /// The remainder cents go one by one to the first parts, so
    /// `100.00 / 3` becomes `[33.34, 33.33, 33.33]`. Returns an empty vector
    /// when `parts` is 0.
    #[must_use]
    pub fn split_evenly(self, parts: usize) -> Vec<MoneyCents> {
        if parts == 0 {
            return Vec::new();
        }
        let parts_i64 = parts as i64;
        let base = self.0 / parts_i64;
        let remainder = (self.0 % parts_i64).unsigned_abs() as usize;
        let step = self.0.signum();
        (0..parts)
            .map(|idx| {
                if idx < remainder {
                    MoneyCents(base + step)
                } else {
                    MoneyCents(base)
                }
            })
            .collect()
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        let signed = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(MoneyCents(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("0.001".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
        assert!("-".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn split_evenly_hands_remainder_to_first_parts() {
        let parts = MoneyCents::new(100_00).split_evenly(3);
        assert_eq!(
            parts,
            vec![
                MoneyCents::new(33_34),
                MoneyCents::new(33_33),
                MoneyCents::new(33_33)
            ]
        );
        assert_eq!(parts.iter().sum::<MoneyCents>(), MoneyCents::new(100_00));
    }

    #[test]
    fn split_evenly_handles_exact_and_empty() {
        assert_eq!(
            MoneyCents::new(300_00).split_evenly(3),
            vec![MoneyCents::new(100_00); 3]
        );
        assert!(MoneyCents::new(10).split_evenly(0).is_empty());
        assert_eq!(
            MoneyCents::new(2).split_evenly(3),
            vec![MoneyCents::new(1), MoneyCents::new(1), MoneyCents::ZERO]
        );
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let max = MoneyCents::new(i64::MAX);
        assert_eq!(MoneyCents::checked_sum([max, MoneyCents::new(1)]), None);
        assert_eq!(MoneyCents::checked_sum([max, max, MoneyCents::new(2)]), None);
        assert_eq!(
            MoneyCents::checked_sum([MoneyCents::new(2), MoneyCents::new(3)]),
            Some(MoneyCents::new(5))
        );
        assert_eq!(MoneyCents::new(i64::MIN).checked_neg(), None);
    }

    #[test]
    fn storable_amounts_are_bounded() {
        assert!(MoneyCents::ZERO.is_storable());
        assert!(MoneyCents::MAX_AMOUNT.is_storable());
        assert!(!MoneyCents::new(MoneyCents::MAX_AMOUNT.cents() + 1).is_storable());
        assert!(!MoneyCents::new(-1).is_storable());
    }
}
