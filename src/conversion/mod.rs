//! Currency conversion
//!
//! The orchestrator converts through this trait only, so a rate-fetching
//! implementation can replace the pass-through one without touching it.

use rust_decimal::Decimal;

use crate::domain::CurrencyCode;

/// Converts an amount between two currencies.
///
/// The orchestrator calls this once per side of a transfer, before locking
/// either account, and applies whatever it returns: zero and negative results
/// included. Implementations should not panic; a panic aborts the transfer
/// after its record is written and before any balance moves.
pub trait CurrencyConverter: Send + Sync {
    fn convert(&self, amount: Decimal, from: CurrencyCode, to: CurrencyCode) -> Decimal;
}

/// Returns every amount unchanged, whatever the currencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughConverter;

impl CurrencyConverter for PassThroughConverter {
    fn convert(&self, amount: Decimal, from: CurrencyCode, to: CurrencyCode) -> Decimal {
        tracing::trace!(%amount, %from, %to, "pass-through conversion");
        amount
    }
}
