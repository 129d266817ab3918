use crate::error::IndexError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Divisor splitting a packed token value into its class (quotient) and mass
/// (remainder), exactly like the contract's `decodeClass`/`decodeMass`.
pub const CLASS_MULTIPLIER: u64 = 100_000_000;

/// One of the four mass classes a token can belong to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    One,
    Two,
    Three,
    Four,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::One, Tier::Two, Tier::Three, Tier::Four];

    fn from_class(class: u64) -> Option<Self> {
        match class {
            1 => Some(Tier::One),
            2 => Some(Tier::Two),
            3 => Some(Tier::Three),
            4 => Some(Tier::Four),
            _ => None,
        }
    }

    /// The class number as encoded on chain, `1..=4`.
    pub fn class(self) -> u64 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
            Tier::Four => 4,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::One => "ONE",
            Tier::Two => "TWO",
            Tier::Three => "THREE",
            Tier::Four => "FOUR",
        })
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Yellow,
    Blue,
    Red,
    Black,
}

impl Color {
    /// The alpha is always black, every other token is colored by its tier.
    pub fn of(tier: Tier, is_alpha: bool) -> Self {
        if is_alpha {
            return Color::Black;
        }
        match tier {
            Tier::One => Color::White,
            Tier::Two => Color::Yellow,
            Tier::Three => Color::Blue,
            Tier::Four => Color::Red,
        }
    }
}

/// The raw `getValueOf` integer of a token.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PackedValue(pub U256);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodedValue {
    pub tier: Tier,
    pub mass: u64,
}

impl PackedValue {
    pub fn decode(self) -> Result<DecodedValue, IndexError> {
        let multiplier = U256::from(CLASS_MULTIPLIER);
        let class = self.0 / multiplier;
        let tier = if class <= U256::from(4) {
            Tier::from_class(class.low_u64())
        } else {
            None
        }
        .ok_or(IndexError::UnknownTier(self.0))?;
        // The remainder is below `CLASS_MULTIPLIER` so it fits.
        let mass = (self.0 % multiplier).low_u64();
        Ok(DecodedValue { tier, mass })
    }

    pub fn encode(tier: Tier, mass: U256) -> Result<Self, IndexError> {
        let multiplier = U256::from(CLASS_MULTIPLIER);
        if mass >= multiplier {
            return Err(IndexError::MassOutOfRange(mass));
        }
        Ok(PackedValue(U256::from(tier.class()) * multiplier + mass))
    }
}
