mod collection;
mod nft;
mod tier;
mod user;

pub use self::{
    collection::Collection,
    nft::{MergeRecord, Nft},
    tier::{Color, DecodedValue, PackedValue, Tier, CLASS_MULTIPLIER},
    user::User,
};
