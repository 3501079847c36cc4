//! Exact rational numbers for numeric literals
//!
//! Every numeric literal is kept as a numerator/denominator pair; there is no
//! floating point anywhere in the front end. Values are stored reduced to
//! lowest terms with a strictly positive denominator, so two rationals are
//! equal exactly when their fields are equal.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a literal's text could not become a [`Rational`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RationalError {
    #[error("empty numeric literal")]
    Empty,
    #[error("invalid digit in '{0}'")]
    InvalidDigit(String),
    #[error("zero denominator")]
    ZeroDenominator,
    #[error("value out of range")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    /// Builds `num/den`, normalizing sign and reducing.
    pub fn new(num: i64, den: i64) -> Result<Self, RationalError> {
        if den == 0 {
            return Err(RationalError::ZeroDenominator);
        }
        let (mut num, mut den) = (num, den);
        if den < 0 {
            num = num.checked_neg().ok_or(RationalError::Overflow)?;
            den = den.checked_neg().ok_or(RationalError::Overflow)?;
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
        Ok(Rational {
            num: num / g,
            den: den / g,
        })
    }

    pub fn from_integer(n: i64) -> Self {
        Rational { num: n, den: 1 }
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Parses `n`, `-n`, `n/d` or `n.f`.
    pub fn parse(text: &str) -> Result<Self, RationalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RationalError::Empty);
        }

        if let Some((num, den)) = text.split_once('/') {
            let num = parse_integer(num)?;
            let den = parse_integer(den)?;
            return Rational::new(num, den);
        }

        if let Some((whole, frac)) = text.split_once('.') {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RationalError::InvalidDigit(text.to_string()));
            }
            let negative = whole.starts_with('-');
            let whole = parse_integer(whole)?;
            let scale = 10i64
                .checked_pow(frac.len() as u32)
                .ok_or(RationalError::Overflow)?;
            let frac = parse_integer(frac)?;
            let magnitude = whole
                .checked_abs()
                .and_then(|w| w.checked_mul(scale))
                .and_then(|w| w.checked_add(frac))
                .ok_or(RationalError::Overflow)?;
            let num = if negative { -magnitude } else { magnitude };
            return Rational::new(num, scale);
        }

        Ok(Rational::from_integer(parse_integer(text)?))
    }
}

fn parse_integer(text: &str) -> Result<i64, RationalError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() {
        return Err(RationalError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RationalError::InvalidDigit(text.to_string()));
    }
    text.parse::<i64>().map_err(|_| RationalError::Overflow)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

impl FromStr for Rational {
    type Err = RationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rational::parse(s)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
