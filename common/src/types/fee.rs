//! Fee tiers select which pool variant the router trades against between two
//! assets

use std::{fmt::Display, str::FromStr};

use constants::{
    FEE_TIER_HIGH, FEE_TIER_LOW, FEE_TIER_LOWEST, FEE_TIER_MEDIUM, FEE_WIDTH, MAX_FEE_TIER,
};
use serde::{Deserialize, Serialize};

use super::route::RouteError;

/// A pool fee tier, in hundredths of a basis point
///
/// Always fits in the 24 bits an encoded route reserves for it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FeeTier(u32);

impl FeeTier {
    /// The 0.01% tier
    pub const LOWEST: Self = Self(FEE_TIER_LOWEST);
    /// The 0.05% tier
    pub const LOW: Self = Self(FEE_TIER_LOW);
    /// The 0.3% tier
    pub const MEDIUM: Self = Self(FEE_TIER_MEDIUM);
    /// The 1% tier
    pub const HIGH: Self = Self(FEE_TIER_HIGH);

    /// Construct a fee tier, rejecting values that do not fit in 24 bits
    pub fn new(fee: u32) -> Result<Self, RouteError> {
        if fee > MAX_FEE_TIER {
            return Err(RouteError::FeeTierOutOfRange(fee));
        }

        Ok(Self(fee))
    }

    /// The raw fee value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The big-endian encoding used in route bytes
    pub fn to_be_bytes(self) -> [u8; FEE_WIDTH] {
        let bytes = self.0.to_be_bytes();
        [bytes[1], bytes[2], bytes[3]]
    }

    /// Decode a fee tier from its big-endian route encoding
    pub fn from_be_bytes(bytes: [u8; FEE_WIDTH]) -> Self {
        Self(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = RouteError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        Self::new(fee)
    }
}

impl From<FeeTier> for u32 {
    fn from(fee: FeeTier) -> Self {
        fee.0
    }
}

impl Display for FeeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeeTier {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fee = s.trim().parse::<u32>().map_err(|_| RouteError::InvalidFeeTier(s.to_string()))?;
        Self::new(fee)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests the 24-bit bound on fee tiers
    #[test]
    fn test_fee_bounds() {
        assert!(FeeTier::new(MAX_FEE_TIER).is_ok());
        assert_eq!(
            FeeTier::new(MAX_FEE_TIER + 1),
            Err(RouteError::FeeTierOutOfRange(MAX_FEE_TIER + 1))
        );
    }

    /// Tests the byte encoding of a fee tier
    #[test]
    fn test_fee_bytes() {
        assert_eq!(FeeTier::MEDIUM.to_be_bytes(), [0x00, 0x0b, 0xb8]);
        assert_eq!(FeeTier::from_be_bytes([0x00, 0x01, 0xf4]), FeeTier::LOW);

        let max = FeeTier::new(MAX_FEE_TIER).unwrap();
        assert_eq!(FeeTier::from_be_bytes(max.to_be_bytes()), max);
    }

    /// Tests parsing fee tiers from strings
    #[test]
    fn test_fee_from_str() {
        assert_eq!("10000".parse::<FeeTier>().unwrap(), FeeTier::HIGH);
        assert!(matches!("ten".parse::<FeeTier>(), Err(RouteError::InvalidFeeTier(_))));
        assert!(matches!("16777216".parse::<FeeTier>(), Err(RouteError::FeeTierOutOfRange(_))));
    }

    /// Tests that deserialization enforces the fee bound
    #[test]
    fn test_fee_serde_bound() {
        let fee: FeeTier = serde_json::from_str("500").unwrap();
        assert_eq!(fee, FeeTier::LOW);
        assert!(serde_json::from_str::<FeeTier>("16777216").is_err());
    }
}
