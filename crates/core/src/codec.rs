use std::io::{Read, Write};

use serde_json::{Deserializer, Map, Value};
use tracing::debug;

use crate::domain::ask::{Ask, ASK_FIELDS};
use crate::domain::request::{PricingInput, PRICING_INPUT_FIELDS};
use crate::errors::{EncodeError, PricingError};

/// Reads the leading JSON record from `reader`. Anything after the first record
/// is ignored.
///
/// Field names match case-insensitively and a repeated key overrides earlier
/// occurrences, following the markets process's JSON decoding rules.
pub fn decode_request<R: Read>(reader: R) -> Result<PricingInput, PricingError> {
    let mut records = Deserializer::from_reader(reader).into_iter::<Value>();
    let record = match records.next() {
        Some(record) => record.map_err(PricingError::MalformedInput)?,
        None => {
            let eof = <serde_json::Error as serde::de::Error>::custom("EOF before any record");
            return Err(PricingError::MalformedInput(eof));
        }
    };

    let input = serde_json::from_value::<PricingInput>(canonicalize_request(record))
        .map_err(PricingError::MalformedInput)?;

    debug!(
        event_name = "pricing.request.decoded",
        client = %input.client,
        piece_size = input.piece_size,
        verified_deal = input.verified_deal,
        unsealed = input.unsealed,
        "pricing request decoded"
    );
    Ok(input)
}

fn canonicalize_request(record: Value) -> Value {
    let Value::Object(fields) = record else {
        return record;
    };

    let mut fields = canonicalize_keys(fields, &PRICING_INPUT_FIELDS);
    if let Some(Value::Object(ask)) = fields.get_mut("CurrentAsk") {
        *ask = canonicalize_keys(std::mem::take(ask), &ASK_FIELDS);
    }
    Value::Object(fields)
}

/// Renames keys to their declared spelling when they match ignoring ASCII
/// case. Unknown keys pass through untouched.
fn canonicalize_keys(fields: Map<String, Value>, names: &[&str]) -> Map<String, Value> {
    let mut canonical = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let key = names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(&key))
            .map_or(key, |name| name.to_string());
        canonical.insert(key, value);
    }
    canonical
}

/// Writes `ask` as one newline-terminated JSON record. Nothing reaches
/// `writer` unless serialization succeeded.
pub fn encode_ask<W: Write>(mut writer: W, ask: &Ask) -> Result<(), PricingError> {
    let failure = |source: EncodeError| PricingError::EncodingFailure {
        source,
        rendered: format!("{ask:?}"),
    };

    let mut encoded = serde_json::to_vec(ask).map_err(|error| failure(error.into()))?;
    encoded.push(b'\n');

    writer.write_all(&encoded).map_err(|error| failure(error.into()))?;
    writer.flush().map_err(|error| failure(error.into()))?;
    Ok(())
}
