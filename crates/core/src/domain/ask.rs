use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::null_as_default;

/// Wire names of the `Ask` fields, in declaration order.
pub(crate) const ASK_FIELDS: [&str; 4] =
    ["PricePerByte", "UnsealPrice", "PaymentInterval", "PaymentIntervalIncrease"];

/// Number of atto units in one whole token.
pub const TOKEN_PRECISION: u64 = 1_000_000_000_000_000_000;

/// Non-negative token amount in atto units.
///
/// Encoded on the wire as a quoted decimal string so amounts beyond 64 bits
/// survive JSON intact. `null` decodes to zero.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(BigUint);

impl TokenAmount {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds `numerator / 10^scale` whole tokens, e.g. `from_whole_fraction(3, 4)`
    /// is 0.0003 tokens.
    pub fn from_whole_fraction(numerator: u64, scale: u32) -> Self {
        let whole = BigUint::from(TOKEN_PRECISION) * BigUint::from(numerator);
        Self(whole / BigUint::from(10u32).pow(scale))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }
}

impl From<BigUint> for TokenAmount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseTokenAmountError(String);

impl fmt::Display for ParseTokenAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a non-negative integer token amount", self.0)
    }
}

impl std::error::Error for ParseTokenAmountError {}

impl FromStr for TokenAmount {
    type Err = ParseTokenAmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.strip_prefix('+').unwrap_or(value);
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ParseTokenAmountError(value.to_string()));
        }

        BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| ParseTokenAmountError(value.to_string()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(Self::zero());
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Price and payment terms offered to a retrieval client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Ask {
    pub price_per_byte: TokenAmount,
    pub unseal_price: TokenAmount,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_interval: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_interval_increase: u64,
}
