//! Numeric backends for evaluation and solving.
//!
//! The solver runs over any `Scalar`. Two backends exist: `Ratio`, an
//! exact rational over `i128` used whenever every weight is an exact
//! rational and no intermediate overflows, and plain `f64` otherwise.
//! All arithmetic is checked: an operation that cannot be represented in
//! the backend returns `None` instead of a wrong value.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Arithmetic required by expression evaluation and elimination.
pub trait Scalar: Copy + PartialEq + fmt::Debug + fmt::Display {
    /// Whether results in this backend are exact.
    const EXACT: bool;

    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// Convert a finite float, `None` if it is not representable.
    fn from_f64(f: f64) -> Option<Self>;

    /// Parse a numeric literal such as `0.25` or `1e-3`.
    fn from_literal(text: &str) -> Option<Self>;

    /// Convert to f64.
    fn to_f64(self) -> f64;

    fn checked_add(self, other: Self) -> Option<Self>;
    fn checked_sub(self, other: Self) -> Option<Self>;
    fn checked_mul(self, other: Self) -> Option<Self>;
    fn checked_div(self, other: Self) -> Option<Self>;
    fn checked_neg(self) -> Option<Self>;

    /// Whether the value is zero within `threshold`.
    ///
    /// Exact backends ignore the threshold.
    fn is_negligible(self, threshold: f64) -> bool;

    /// Absolute magnitude, used for pivot selection.
    fn magnitude(self) -> f64 {
        self.to_f64().abs()
    }

    /// Round to `digits` fractional digits. Exact values are left as is.
    fn round_to(self, digits: u32) -> Self;

    /// The exact rational value, if this backend tracks one.
    fn to_ratio(self) -> Option<Ratio>;
}

impl Scalar for f64 {
    const EXACT: bool = false;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_f64(f: f64) -> Option<Self> {
        f.is_finite().then_some(f)
    }

    fn from_literal(text: &str) -> Option<Self> {
        text.parse::<f64>().ok().filter(|f| f.is_finite())
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        finite(self + other)
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        finite(self - other)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        finite(self * other)
    }

    fn checked_div(self, other: Self) -> Option<Self> {
        if other == 0.0 {
            return None;
        }
        finite(self / other)
    }

    fn checked_neg(self) -> Option<Self> {
        Some(-self)
    }

    fn is_negligible(self, threshold: f64) -> bool {
        self.abs() <= threshold
    }

    fn round_to(self, digits: u32) -> Self {
        round_f64(self, digits)
    }

    fn to_ratio(self) -> Option<Ratio> {
        None
    }
}

fn finite(f: f64) -> Option<f64> {
    f.is_finite().then_some(f)
}

/// Round to `digits` fractional digits using decimal formatting.
pub fn round_f64(value: f64, digits: u32) -> f64 {
    format!("{:.*}", digits as usize, value)
        .parse::<f64>()
        .unwrap_or(value)
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    // gcd of two i128 magnitudes only exceeds i128::MAX for (MIN, MIN) or (MIN, 0)
    i128::try_from(a).unwrap_or(1)
}

/// Exact rational number `num / den` with `den > 0`, always reduced.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::numeric::{Ratio, Scalar};
///
/// let third = Ratio::new(1, 3).unwrap();
/// let sum = third.checked_add(third).unwrap();
/// assert_eq!(sum, Ratio::new(2, 3).unwrap());
///
/// let tenth = Ratio::from_literal("0.1").unwrap();
/// assert_eq!(tenth.to_string(), "1/10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    num: i128,
    den: i128,
}

impl Ratio {
    /// Create a reduced ratio, `None` if `den` is zero or the sign
    /// cannot be normalized.
    pub fn new(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den);
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg()?;
            den = den.checked_neg()?;
        }
        Some(Self { num, den })
    }

    /// An integer ratio.
    pub fn from_integer(n: i128) -> Self {
        Self { num: n, den: 1 }
    }

    /// Numerator.
    pub fn numer(self) -> i128 {
        self.num
    }

    /// Denominator (always positive).
    pub fn denom(self) -> i128 {
        self.den
    }

    /// Parse a decimal literal (`-12.5`, `.25`, `3e-2`) exactly.
    fn parse_decimal(text: &str) -> Option<Self> {
        let text = text.trim();
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(pos) => (&text[..pos], text[pos + 1..].parse::<i32>().ok()?),
            None => (text, 0),
        };
        let (negative, mantissa) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let mut num: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            num = num.checked_mul(10)?.checked_add(c.to_digit(10)? as i128)?;
        }
        let scale = exponent.checked_sub(i32::try_from(frac_part.len()).ok()?)?;
        let pow = 10_i128.checked_pow(scale.unsigned_abs())?;
        let ratio = if scale >= 0 {
            Self::from_integer(num.checked_mul(pow)?)
        } else {
            Self::new(num, pow)?
        };
        if negative {
            ratio.checked_neg()
        } else {
            Some(ratio)
        }
    }
}

impl Scalar for Ratio {
    const EXACT: bool = true;

    fn zero() -> Self {
        Self::from_integer(0)
    }

    fn one() -> Self {
        Self::from_integer(1)
    }

    /// Uses the shortest decimal rendering of the float, so `0.1` becomes
    /// `1/10` rather than its binary expansion.
    fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        Self::parse_decimal(&format!("{}", f))
    }

    fn from_literal(text: &str) -> Option<Self> {
        Self::parse_decimal(text)
    }

    fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        let g = gcd(self.den, other.den);
        let num = self
            .num
            .checked_mul(other.den / g)?
            .checked_add(other.num.checked_mul(self.den / g)?)?;
        let den = self.den.checked_mul(other.den / g)?;
        Self::new(num, den)
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        self.checked_add(other.checked_neg()?)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        let g1 = gcd(self.num, other.den);
        let g2 = gcd(other.num, self.den);
        let num = (self.num / g1).checked_mul(other.num / g2)?;
        let den = (self.den / g2).checked_mul(other.den / g1)?;
        Self::new(num, den)
    }

    fn checked_div(self, other: Self) -> Option<Self> {
        if other.num == 0 {
            return None;
        }
        let inverse = Self::new(other.den, other.num)?;
        self.checked_mul(inverse)
    }

    fn checked_neg(self) -> Option<Self> {
        Some(Self {
            num: self.num.checked_neg()?,
            den: self.den,
        })
    }

    fn is_negligible(self, _threshold: f64) -> bool {
        self.num == 0
    }

    fn round_to(self, _digits: u32) -> Self {
        self
    }

    fn to_ratio(self) -> Option<Ratio> {
        Some(self)
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Both denominators are positive, so cross-multiplying keeps the order.
        match (
            self.num.checked_mul(other.den),
            other.num.checked_mul(self.den),
        ) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(num: i128, den: i128) -> Ratio {
        Ratio::new(num, den).unwrap()
    }

    #[test]
    fn test_ratio_reduces_and_normalizes_sign() {
        assert_eq!(r(2, 4), r(1, 2));
        let neg = r(1, -3);
        assert_eq!(neg.numer(), -1);
        assert_eq!(neg.denom(), 3);
        assert!(Ratio::new(1, 0).is_none());
    }

    #[test]
    fn test_ratio_arithmetic() {
        let a = r(1, 6);
        let b = r(1, 3);
        assert_eq!(a.checked_add(b), Some(r(1, 2)));
        assert_eq!(a.checked_sub(b), Some(r(-1, 6)));
        assert_eq!(a.checked_mul(b), Some(r(1, 18)));
        assert_eq!(a.checked_div(b), Some(r(1, 2)));
        assert_eq!(a.checked_div(Ratio::zero()), None);
    }

    #[test]
    fn test_ratio_overflow_is_reported() {
        let big = Ratio::from_integer(i128::MAX);
        assert!(big.checked_add(Ratio::one()).is_none());
        assert!(big.checked_mul(Ratio::from_integer(2)).is_none());
    }

    #[test]
    fn test_decimal_literals() {
        assert_eq!(Ratio::from_literal("0.9"), Some(r(9, 10)));
        assert_eq!(Ratio::from_literal(".25"), Some(r(1, 4)));
        assert_eq!(Ratio::from_literal("3."), Some(r(3, 1)));
        assert_eq!(Ratio::from_literal("1.5e2"), Some(r(150, 1)));
        assert_eq!(Ratio::from_literal("25e-2"), Some(r(1, 4)));
        assert_eq!(Ratio::from_literal("-0.5"), Some(r(-1, 2)));
        assert_eq!(Ratio::from_literal("."), None);
        assert_eq!(Ratio::from_literal("1x"), None);
        assert_eq!(Ratio::from_literal("1.5e-2147483648"), None);
        assert_eq!(Ratio::from_literal("1e99999999999"), None);
    }

    #[test]
    fn test_from_f64_uses_shortest_decimal() {
        assert_eq!(Ratio::from_f64(0.1), Some(r(1, 10)));
        assert_eq!(Ratio::from_f64(2.0), Some(r(2, 1)));
        assert_eq!(Ratio::from_f64(f64::NAN), None);
        // Too many digits for i128
        assert_eq!(Ratio::from_f64(1e300), None);
    }

    #[test]
    fn test_ratio_ordering() {
        assert!(r(1, 3) < r(1, 2));
        assert!(r(-1, 2) < Ratio::zero());
    }

    #[test]
    fn test_f64_rounding() {
        assert_eq!(round_f64(0.1 + 0.2, 12), 0.3);
        assert_eq!(round_f64(5.0 / 6.0, 12), 0.833333333333);
        assert_eq!(<f64 as Scalar>::round_to(1.0 / 3.0, 3), 0.333);
    }

    #[test]
    fn test_f64_checked_ops() {
        assert_eq!(<f64 as Scalar>::checked_div(1.0, 0.0), None);
        assert_eq!(<f64 as Scalar>::checked_mul(f64::MAX, 2.0), None);
        assert!(<f64 as Scalar>::is_negligible(1e-13, 1e-12));
        assert!(!<f64 as Scalar>::is_negligible(1e-13, 0.0));
    }
}
