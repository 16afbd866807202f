pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use codec::{decode_request, encode_ask};
pub use domain::ask::{Ask, TokenAmount, TOKEN_PRECISION};
pub use domain::request::{ClientId, ContentId, PricingInput};
pub use errors::{EncodeError, PricingError};
pub use pricing::overrides::OverrideTable;
pub use pricing::{decide, select_ask, AskSource, OverridePolicy, PricingDecision, PricingPolicy};
