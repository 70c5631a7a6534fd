use std::collections::BTreeMap;

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::batch::{BatchAccumulator, BatchStats};
use crate::config::Plan;
use crate::error::{GenError, Result, Stage};
use crate::generator::EntityGenerator;
use crate::model::Phase;
use crate::sink::Sink;
use crate::text::TextProvider;

/// Account ids owned by each user, keyed and ordered by user id
pub type UserAccounts = BTreeMap<u64, Vec<u64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub records: u64,
    pub batches: u64,
}

/// What a finished run produced, one entry per phase in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub phases: Vec<PhaseReport>,
}

impl Summary {
    fn record(&mut self, phase: Phase, stats: BatchStats) {
        info!("Generated {} {} in {} batches", stats.records, phase, stats.batches);
        self.phases.push(PhaseReport {
            phase,
            records: stats.records,
            batches: stats.batches,
        });
    }

    #[must_use]
    pub fn records(&self, phase: Phase) -> u64 {
        self.phases
            .iter()
            .find(|report| report.phase == phase)
            .map_or(0, |report| report.records)
    }

    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.phases.iter().map(|report| report.records).sum()
    }
}

/// Runs the five phases in dependency order against one sink.
///
/// Each phase fully completes, including its last partial batch, before the
/// next starts, so every foreign key written points at an id already handed
/// to the sink.
pub struct Orchestrator<R, T> {
    generator: EntityGenerator<R, T>,
    plan: Plan,
}

fn log_progress(phase: Phase, stats: BatchStats, batch_size: usize) {
    if stats.records % batch_size as u64 == 0 {
        info!("Generated {} {}", stats.records, phase);
    }
}

impl<R: Rng, T: TextProvider> Orchestrator<R, T> {
    #[must_use]
    pub fn new(generator: EntityGenerator<R, T>, plan: Plan) -> Self {
        Orchestrator { generator, plan }
    }

    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Generates every phase into `sink`. The sink is not finished here,
    /// see [`crate::run_with_sink`].
    ///
    /// # Errors
    /// The first failure aborts the run, wrapped with its phase and sink
    pub fn generate<S: Sink>(&mut self, sink: &mut S) -> Result<Summary> {
        self.plan.validate()?;
        let kind = sink.kind();
        sink.begin().map_err(|e| e.at_stage(Stage::Schema, kind))?;

        let mut summary = Summary::default();

        let (users, stats) = self
            .users(sink)
            .map_err(|e| e.in_phase(Phase::Users, kind))?;
        summary.record(Phase::Users, stats);

        let (user_accounts, stats) = self
            .accounts(sink, &users)
            .map_err(|e| e.in_phase(Phase::Accounts, kind))?;
        summary.record(Phase::Accounts, stats);

        let stats = self
            .transactions(sink, &user_accounts)
            .map_err(|e| e.in_phase(Phase::Transactions, kind))?;
        summary.record(Phase::Transactions, stats);

        let stats = self
            .invoices(sink, &users)
            .map_err(|e| e.in_phase(Phase::Invoices, kind))?;
        summary.record(Phase::Invoices, stats);

        let stats = self
            .loans(sink, &users)
            .map_err(|e| e.in_phase(Phase::Loans, kind))?;
        summary.record(Phase::Loans, stats);

        Ok(summary)
    }

    /// # Errors
    /// Propagates generator and sink failures
    pub fn users<S: Sink>(&mut self, sink: &mut S) -> Result<(Vec<u64>, BatchStats)> {
        info!("Generating {} users...", self.plan.users);
        let batch_size = self.plan.batch_size;
        let mut user_ids = Vec::new();
        let mut acc = BatchAccumulator::new(&mut *sink, batch_size);
        for id in 1..=self.plan.users {
            acc.add(self.generator.user(id)?)?;
            user_ids.push(id);
            log_progress(Phase::Users, acc.stats(), batch_size);
        }
        let stats = acc.finish()?;
        sink.end_phase(Phase::Users)?;
        Ok((user_ids, stats))
    }

    /// # Errors
    /// Propagates generator and sink failures
    pub fn accounts<S: Sink>(
        &mut self,
        sink: &mut S,
        user_ids: &[u64],
    ) -> Result<(UserAccounts, BatchStats)> {
        info!("Generating accounts for {} users...", user_ids.len());
        let batch_size = self.plan.batch_size;
        let mut user_accounts = UserAccounts::new();
        let mut acc = BatchAccumulator::new(&mut *sink, batch_size);
        let mut account_id = 0;
        for &user_id in user_ids {
            let mut owned = Vec::new();
            for _ in 0..self.plan.accounts_per_user {
                account_id += 1;
                acc.add(self.generator.account(account_id, user_id)?)?;
                owned.push(account_id);
                log_progress(Phase::Accounts, acc.stats(), batch_size);
            }
            user_accounts.insert(user_id, owned);
        }
        let stats = acc.finish()?;
        sink.end_phase(Phase::Accounts)?;
        Ok((user_accounts, stats))
    }

    /// # Errors
    /// Propagates generator and sink failures, including a pool too small
    /// to pick distinct source and destination accounts
    pub fn transactions<S: Sink>(
        &mut self,
        sink: &mut S,
        user_accounts: &UserAccounts,
    ) -> Result<BatchStats> {
        info!("Generating transactions...");
        let pool: Vec<u64> = user_accounts.values().flatten().copied().collect();
        if self.plan.transactions_per_account > 0 && !pool.is_empty() && pool.len() < 2 {
            return Err(GenError::AccountPoolTooSmall { pool: pool.len() });
        }
        let batch_size = self.plan.batch_size;
        let mut acc = BatchAccumulator::new(&mut *sink, batch_size);
        let mut transaction_id = 0;
        for &source in &pool {
            for _ in 0..self.plan.transactions_per_account {
                transaction_id += 1;
                acc.add(self.generator.transaction(transaction_id, source, &pool)?)?;
                log_progress(Phase::Transactions, acc.stats(), batch_size);
            }
        }
        let stats = acc.finish()?;
        sink.end_phase(Phase::Transactions)?;
        Ok(stats)
    }

    /// # Errors
    /// Propagates generator and sink failures
    pub fn invoices<S: Sink>(&mut self, sink: &mut S, user_ids: &[u64]) -> Result<BatchStats> {
        info!("Generating invoices...");
        let batch_size = self.plan.batch_size;
        let mut acc = BatchAccumulator::new(&mut *sink, batch_size);
        let mut invoice_id = 0;
        for &user_id in user_ids {
            for _ in 0..self.plan.invoices_per_user {
                invoice_id += 1;
                acc.add(self.generator.invoice(invoice_id, user_id)?)?;
                log_progress(Phase::Invoices, acc.stats(), batch_size);
            }
        }
        let stats = acc.finish()?;
        sink.end_phase(Phase::Invoices)?;
        Ok(stats)
    }

    /// # Errors
    /// Propagates generator and sink failures
    pub fn loans<S: Sink>(&mut self, sink: &mut S, user_ids: &[u64]) -> Result<BatchStats> {
        info!("Generating loans...");
        let batch_size = self.plan.batch_size;
        let mut acc = BatchAccumulator::new(&mut *sink, batch_size);
        let mut loan_id = 0;
        for &user_id in user_ids {
            for _ in 0..self.plan.loans_per_user {
                loan_id += 1;
                acc.add(self.generator.loan(loan_id, user_id)?)?;
                log_progress(Phase::Loans, acc.stats(), batch_size);
            }
        }
        let stats = acc.finish()?;
        sink.end_phase(Phase::Loans)?;
        Ok(stats)
    }
}
