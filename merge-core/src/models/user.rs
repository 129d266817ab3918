use serde::{Deserialize, Serialize};

/// An address that has received a Merge token.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub whitelist: bool,
}

impl User {
    pub fn new(id: String, whitelist: bool) -> Self {
        User { id, whitelist }
    }
}
