//! Materialization targets for generated records.

use crate::config::SinkKind;
use crate::error::Result;
use crate::model::{Account, Invoice, Loan, Phase, Transaction, User};

pub mod database;
pub mod file;

pub use database::DatabaseSink;
pub use file::SqlFileSink;

/// Destination of flushed batches.
///
/// Every `write_*` call receives one whole batch, in generation order. A sink
/// must not reorder, drop or alter records; it only decides how they are
/// materialized.
pub trait Sink {
    fn kind(&self) -> SinkKind;

    /// # Errors
    /// Errors when the schema cannot be (re)created
    fn begin(&mut self) -> Result<()>;

    /// # Errors
    /// Errors when the batch cannot be written
    fn write_users(&mut self, batch: &[User]) -> Result<()>;

    /// # Errors
    /// Errors when the batch cannot be written
    fn write_accounts(&mut self, batch: &[Account]) -> Result<()>;

    /// # Errors
    /// Errors when the batch cannot be written
    fn write_transactions(&mut self, batch: &[Transaction]) -> Result<()>;

    /// # Errors
    /// Errors when the batch cannot be written
    fn write_invoices(&mut self, batch: &[Invoice]) -> Result<()>;

    /// # Errors
    /// Errors when the batch cannot be written
    fn write_loans(&mut self, batch: &[Loan]) -> Result<()>;

    /// Called once after the last batch of `phase`
    ///
    /// # Errors
    /// Errors when the phase separator cannot be written
    fn end_phase(&mut self, _phase: Phase) -> Result<()> {
        Ok(())
    }

    /// Called once after the last phase, before [`Sink::finish`]
    ///
    /// # Errors
    /// Errors when an index cannot be created
    fn create_indexes(&mut self) -> Result<()> {
        Ok(())
    }

    /// Consumes the sink once every phase and the indexes succeeded
    ///
    /// # Errors
    /// Errors when the output cannot be committed or flushed
    fn finish(self) -> Result<()>
    where
        Self: Sized;
}

/// A generated record that knows which phase produced it and which sink
/// capability materializes it.
pub trait Record: Sized {
    const PHASE: Phase;

    /// # Errors
    /// Propagates the sink's write error
    fn write_batch<S: Sink + ?Sized>(sink: &mut S, batch: &[Self]) -> Result<()>;
}

impl Record for User {
    const PHASE: Phase = Phase::Users;
    fn write_batch<S: Sink + ?Sized>(sink: &mut S, batch: &[Self]) -> Result<()> {
        sink.write_users(batch)
    }
}

impl Record for Account {
    const PHASE: Phase = Phase::Accounts;
    fn write_batch<S: Sink + ?Sized>(sink: &mut S, batch: &[Self]) -> Result<()> {
        sink.write_accounts(batch)
    }
}

impl Record for Transaction {
    const PHASE: Phase = Phase::Transactions;
    fn write_batch<S: Sink + ?Sized>(sink: &mut S, batch: &[Self]) -> Result<()> {
        sink.write_transactions(batch)
    }
}

impl Record for Invoice {
    const PHASE: Phase = Phase::Invoices;
    fn write_batch<S: Sink + ?Sized>(sink: &mut S, batch: &[Self]) -> Result<()> {
        sink.write_invoices(batch)
    }
}

impl Record for Loan {
    const PHASE: Phase = Phase::Loans;
    fn write_batch<S: Sink + ?Sized>(sink: &mut S, batch: &[Self]) -> Result<()> {
        sink.write_loans(batch)
    }
}
