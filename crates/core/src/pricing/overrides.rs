use std::collections::BTreeMap;

use crate::domain::ask::{Ask, TokenAmount};
use crate::domain::request::ClientId;

/// Per-client asks that take precedence over the operator's default ask.
///
/// Read-only once built; construct it with `collect()` or `merge`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideTable {
    asks: BTreeMap<ClientId, Ask>,
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        [(
            ClientId::new("peerid1"),
            Ask {
                price_per_byte: TokenAmount::from_whole_fraction(3, 4),
                unseal_price: TokenAmount::zero(),
                payment_interval: 0,
                payment_interval_increase: 0,
            },
        )]
        .into_iter()
        .collect()
    }

    /// Entries in `other` replace entries in `self` with the same client key.
    pub fn merge(self, other: OverrideTable) -> Self {
        self.asks.into_iter().chain(other.asks).collect()
    }

    pub fn get(&self, client: &str) -> Option<&Ask> {
        self.asks.get(client)
    }

    pub fn len(&self) -> usize {
        self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClientId, &Ask)> {
        self.asks.iter()
    }
}

impl FromIterator<(ClientId, Ask)> for OverrideTable {
    fn from_iter<I: IntoIterator<Item = (ClientId, Ask)>>(iter: I) -> Self {
        Self { asks: iter.into_iter().collect() }
    }
}
