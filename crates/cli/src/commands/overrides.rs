use retrieval_ask_core::{Ask, OverrideTable};
use serde::Serialize;

use super::{CommandResult, EXIT_PRICING_FAILURE};

#[derive(Debug, Serialize)]
struct OverrideEntry<'a> {
    client: &'a str,
    ask: &'a Ask,
}

pub fn run(table: &OverrideTable, json_output: bool) -> CommandResult {
    if json_output {
        let entries: Vec<OverrideEntry<'_>> = table
            .iter()
            .map(|(client, ask)| OverrideEntry { client: client.as_key(), ask })
            .collect();

        return match serde_json::to_string_pretty(&entries) {
            Ok(output) => CommandResult::success(output),
            Err(error) => encoding_failure(&error),
        };
    }

    CommandResult::success(render_human(table))
}

fn encoding_failure(error: &serde_json::Error) -> CommandResult {
    CommandResult::failure(
        format!("failed to encode override table as json: {error}"),
        EXIT_PRICING_FAILURE,
    )
}

fn render_human(table: &OverrideTable) -> String {
    if table.is_empty() {
        return "no client overrides configured; every client receives the current ask".to_string();
    }

    let mut lines = vec![format!("{} client override(s):", table.len())];
    for (client, ask) in table.iter() {
        lines.push(format!(
            "- {:?}: price_per_byte={} unseal_price={} payment_interval={} \
             payment_interval_increase={}",
            client.as_key(),
            ask.price_per_byte,
            ask.unseal_price,
            ask.payment_interval,
            ask.payment_interval_increase
        ));
    }
    lines.join("\n")
}
