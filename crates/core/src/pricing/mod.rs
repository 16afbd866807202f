pub mod overrides;

use serde::Serialize;

use crate::domain::ask::Ask;
use crate::domain::request::PricingInput;

use self::overrides::OverrideTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AskSource {
    Override,
    Default,
}

impl AskSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Default => "default",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingDecision {
    pub ask: Ask,
    pub source: AskSource,
}

pub trait PricingPolicy: Send + Sync {
    fn decide(&self, input: &PricingInput) -> PricingDecision;
}

/// Returns the client's override verbatim when one exists, otherwise the
/// caller's current ask. Deal flags and piece data do not affect the result.
#[derive(Clone, Debug, Default)]
pub struct OverridePolicy {
    overrides: OverrideTable,
}

impl OverridePolicy {
    pub fn new(overrides: OverrideTable) -> Self {
        Self { overrides }
    }
}

impl PricingPolicy for OverridePolicy {
    fn decide(&self, input: &PricingInput) -> PricingDecision {
        decide(input, &self.overrides)
    }
}

pub fn decide(input: &PricingInput, overrides: &OverrideTable) -> PricingDecision {
    match overrides.get(input.client.as_key()) {
        Some(ask) => PricingDecision { ask: ask.clone(), source: AskSource::Override },
        None => PricingDecision { ask: input.current_ask.clone(), source: AskSource::Default },
    }
}

pub fn select_ask(input: &PricingInput, overrides: &OverrideTable) -> Ask {
    decide(input, overrides).ask
}
