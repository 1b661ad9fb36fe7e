//! Transfer Handler
//!
//! Moves money between two registered accounts and records every validated
//! attempt in the ledger.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::conversion::CurrencyConverter;
use crate::domain::{CurrencyCode, OperationContext, Transaction, TransferError};
use crate::store::{lock_pair, AccountRegistry, TransactionLedger};

use super::{TransferCommand, TransferResult};

/// Handler for account-to-account transfers
pub struct TransferHandler {
    accounts: Arc<AccountRegistry>,
    ledger: Arc<TransactionLedger>,
    converter: Arc<dyn CurrencyConverter>,
}

impl TransferHandler {
    pub fn new(
        accounts: Arc<AccountRegistry>,
        ledger: Arc<TransactionLedger>,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            converter,
        }
    }

    /// Execute the transfer command.
    ///
    /// A rejected amount or currency leaves no trace. Any later failure
    /// leaves a `Fail` record in the ledger and no balance change.
    pub fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, TransferError> {
        let span = tracing::info_span!(
            "transfer",
            correlation_id = ?context.correlation_id,
            client_ip = ?context.client_ip,
        );
        let _enter = span.enter();

        let transaction = Transaction::new(
            command.source_account_id,
            command.target_account_id,
            command.amount,
            &command.currency,
        )
        .inspect_err(|e| tracing::warn!(error = %e, "transfer request rejected"))?;

        let transaction_id = transaction.id();
        let amount = transaction.amount().value();
        let currency = transaction.currency();

        self.ledger.insert(transaction).map_err(|e| {
            tracing::error!(%transaction_id, error = %e, "ledger insert failed");
            TransferError::from(e)
        })?;

        let outcome = self.settle(
            transaction_id,
            command.source_account_id,
            command.target_account_id,
            amount,
            currency,
        );

        match &outcome {
            Ok(result) => tracing::info!(
                %transaction_id,
                source = %result.source_account_id,
                target = %result.target_account_id,
                debited = %result.debited,
                credited = %result.credited,
                "transfer succeeded"
            ),
            Err(e) if e.is_client_error() => {
                tracing::warn!(%transaction_id, error = %e, "transfer failed")
            }
            Err(e) => tracing::error!(%transaction_id, error = %e, "transfer aborted"),
        }

        outcome
    }

    fn settle(
        &self,
        transaction_id: Uuid,
        source_id: Uuid,
        target_id: Uuid,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Result<TransferResult, TransferError> {
        let source_ref = self
            .accounts
            .find_by_id(source_id)
            .ok_or_else(TransferError::source_not_found)?;
        let target_ref = self
            .accounts
            .find_by_id(target_id)
            .ok_or_else(TransferError::target_not_found)?;

        if source_ref.id() == target_ref.id() {
            return Err(TransferError::same_account());
        }

        // The gateway runs before any lock is taken or balance touched.
        let debited = self.converter.convert(amount, currency, source_ref.currency());
        let credited = self.converter.convert(amount, currency, target_ref.currency());

        // Held until the record is marked, so the balance check and both
        // mutations are atomic with respect to other transfers.
        let (mut source, mut target) = lock_pair(&source_ref, &target_ref)?;

        if !source.can_cover(debited) {
            return Err(TransferError::insufficient_balance());
        }

        let source_before = source.balance();
        let target_before = target.balance();

        source
            .debit(debited)
            .ok_or_else(|| TransferError::unexpected("source debit failed after balance check"))?;

        if target.credit(credited).is_none() {
            source.restore_balance(source_before);
            return Err(TransferError::unexpected(format!(
                "crediting {} {} would overflow the target balance",
                credited,
                target.currency()
            )));
        }

        if let Err(e) = self.ledger.mark_success(transaction_id) {
            source.restore_balance(source_before);
            target.restore_balance(target_before);
            return Err(e.into());
        }

        Ok(TransferResult {
            transaction_id,
            source_account_id: source_id,
            target_account_id: target_id,
            debited,
            credited,
        })
    }

    /// All ledger records, in no particular order.
    pub fn find_all(&self) -> Vec<Transaction> {
        self.ledger.find_all()
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Transaction> {
        self.ledger.find_by_id(id)
    }
}
