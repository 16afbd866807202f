use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::ask::Ask;
use crate::domain::null_as_default;

/// Content address carried as an opaque string. An empty value is the
/// undefined cid and encodes as `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn is_defined(&self) -> bool {
        !self.0.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct CidLink {
    #[serde(rename = "/")]
    target: String,
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_defined() {
            CidLink { target: self.0.clone() }.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let link = Option::<CidLink>::deserialize(deserializer)?;
        Ok(Self(link.map(|link| link.target).unwrap_or_default()))
    }
}

/// Identity of the retrieval client. The override key is the exact string.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_key(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ClientId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire names of the `PricingInput` fields, in declaration order.
pub(crate) const PRICING_INPUT_FIELDS: [&str; 7] = [
    "PayloadCID",
    "PieceCID",
    "PieceSize",
    "Client",
    "VerifiedDeal",
    "Unsealed",
    "CurrentAsk",
];

/// One retrieval pricing request as sent by the markets process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PricingInput {
    #[serde(rename = "PayloadCID")]
    pub payload_cid: ContentId,
    #[serde(rename = "PieceCID")]
    pub piece_cid: ContentId,
    /// Unpadded piece size in bytes.
    #[serde(deserialize_with = "null_as_default")]
    pub piece_size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub client: ClientId,
    #[serde(deserialize_with = "null_as_default")]
    pub verified_deal: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub unsealed: bool,
    /// Ask configured by the operator, used when no override matches.
    #[serde(deserialize_with = "null_as_default")]
    pub current_ask: Ask,
}
