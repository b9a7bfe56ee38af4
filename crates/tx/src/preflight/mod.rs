// Path: crates/tx/src/preflight/mod.rs

//! Balance preflight: refuses to sign a call the signer cannot pay for.

use tracing::{debug, warn};
use waypoint_api::node::NodeApi;
use waypoint_telemetry::submission_metrics;
use waypoint_types::app::{Address, Call, FeeEstimate};
use waypoint_types::error::TransactionError;

/// Estimates the inclusion fee of `call` if signed by `signer`.
pub async fn estimate_fee(
    api: &dyn NodeApi,
    call: &Call,
    signer: &Address,
) -> Result<FeeEstimate, TransactionError> {
    Ok(api.payment_info(call, signer).await?)
}

/// Checks that `signer` can pay for the fully composed `call`.
///
/// The fee estimate and the free balance are fetched concurrently from current
/// state. A balance equal to the fee is rejected: it would leave nothing for
/// the existential deposit.
pub async fn check_affordability(
    api: &dyn NodeApi,
    call: &Call,
    signer: &Address,
) -> Result<FeeEstimate, TransactionError> {
    let (fee, balance, properties) = tokio::try_join!(
        api.payment_info(call, signer),
        api.free_balance(signer),
        api.chain_properties(),
    )?;

    if balance <= fee.partial_fee {
        warn!(
            target: "preflight",
            signer = %signer,
            balance = %properties.format_balance(balance),
            fee = %properties.format_balance(fee.partial_fee),
            "balance does not cover the estimated fee"
        );
        submission_metrics().inc_preflight_rejections();
        return Err(TransactionError::InsufficientBalance {
            balance,
            fee: fee.partial_fee,
            token: properties.token_symbol,
        });
    }

    debug!(
        target: "preflight",
        signer = %signer,
        fee = fee.partial_fee,
        "preflight passed"
    );
    Ok(fee)
}
