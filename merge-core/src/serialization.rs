//! Module containing `serde` serialization helpers.

use primitive_types::U256;
use serde::{
    de::{Deserializer, Error},
    ser::Serializer,
    Deserialize, Serialize,
};
use std::{borrow::Cow, convert::TryFrom, marker::PhantomData};
use typenum::Unsigned;

/// Format version of a persisted file, checked on load. `T` is the only
/// version this build accepts.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "u32", into = "u32", bound = "T: Unsigned + Copy")]
pub struct Version<T>(PhantomData<T>);

impl<T: Unsigned> From<Version<T>> for u32 {
    fn from(_: Version<T>) -> u32 {
        T::U32
    }
}

impl<T: Unsigned> TryFrom<u32> for Version<T> {
    type Error = String;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        if version != T::U32 {
            return Err(format!(
                "file format version {} is not supported, expected {}",
                version,
                T::U32
            ));
        }
        Ok(Version(PhantomData))
    }
}

/// (De)serializes a `U256` as a decimal string, the way the subgraph schema
/// exposes `BigInt` fields.
pub mod decimal_u256 {
    use super::*;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Cow::<str>::deserialize(deserializer)?;
        U256::from_dec_str(&value).map_err(|err| {
            D::Error::custom(format!("invalid decimal integer '{}': {:?}", value, err))
        })
    }
}
