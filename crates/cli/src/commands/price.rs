use std::io::{Read, Write};

use retrieval_ask_core::{decode_request, encode_ask, PricingError, PricingPolicy};
use tracing::{error, info};

use super::{EXIT_OK, EXIT_PRICING_FAILURE};

/// Runs one decode-decide-encode cycle and returns the process exit code.
///
/// The structured ask only ever goes to `output`; failures are reported on
/// `diagnostics`.
pub fn run<R, W, E, P>(input: R, output: W, mut diagnostics: E, policy: &P) -> u8
where
    R: Read,
    W: Write,
    E: Write,
    P: PricingPolicy + ?Sized,
{
    match price(input, output, policy) {
        Ok(()) => EXIT_OK,
        Err(failure) => {
            error!(
                event_name = "pricing.request.failed",
                error_class = failure.class(),
                error = %failure,
                "pricing request failed"
            );
            let _ = writeln!(diagnostics, "{}", failure.diagnostic());
            let _ = diagnostics.flush();
            EXIT_PRICING_FAILURE
        }
    }
}

fn price<R, W, P>(input: R, output: W, policy: &P) -> Result<(), PricingError>
where
    R: Read,
    W: Write,
    P: PricingPolicy + ?Sized,
{
    let request = decode_request(input)?;
    let decision = policy.decide(&request);

    info!(
        event_name = "pricing.ask.selected",
        client = %request.client,
        ask_source = decision.source.as_str(),
        price_per_byte = %decision.ask.price_per_byte,
        unseal_price = %decision.ask.unseal_price,
        "ask selected"
    );

    encode_ask(output, &decision.ask)
}
