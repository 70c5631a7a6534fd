use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::generator::CredentialStyle;

pub const TOTAL_USERS: u64 = 3_000_000;
pub const ACCOUNTS_PER_USER: u64 = 2;
pub const TRANSACTIONS_PER_ACCOUNT: u64 = 6;
pub const INVOICES_PER_USER: u64 = 2;
pub const LOANS_PER_USER: u64 = 2;
pub const BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// A SQL script of `INSERT` statements
    File,
    /// Batched inserts into a database
    #[serde(rename = "db")]
    Database,
}

impl SinkKind {
    /// Credentials each sink used historically: readable per-user data for
    /// scripts, id-derived emails and a shared hash for bulk loads
    #[must_use]
    pub fn default_credentials(self) -> CredentialStyle {
        match self {
            SinkKind::File => CredentialStyle::PerRecord,
            SinkKind::Database => CredentialStyle::Shared,
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::File => f.write_str("file"),
            SinkKind::Database => f.write_str("db"),
        }
    }
}

impl FromStr for SinkKind {
    type Err = GenError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(SinkKind::File),
            "db" => Ok(SinkKind::Database),
            _ => Err(GenError::InvalidConfig(format!(
                "Invalid generator type: {s}. Valid values are 'file' or 'db'"
            ))),
        }
    }
}

/// Per-entity volumes and batching for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub users: u64,
    pub accounts_per_user: u64,
    pub transactions_per_account: u64,
    pub invoices_per_user: u64,
    pub loans_per_user: u64,
    pub batch_size: usize,
}

impl Default for Plan {
    fn default() -> Self {
        Plan {
            users: TOTAL_USERS,
            accounts_per_user: ACCOUNTS_PER_USER,
            transactions_per_account: TRANSACTIONS_PER_ACCOUNT,
            invoices_per_user: INVOICES_PER_USER,
            loans_per_user: LOANS_PER_USER,
            batch_size: BATCH_SIZE,
        }
    }
}

impl Plan {
    /// # Errors
    /// Errors on a zero batch size, or when transactions are requested but
    /// fewer than two accounts will exist to move money between
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(GenError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        let accounts = self
            .users
            .checked_mul(self.accounts_per_user)
            .ok_or_else(|| GenError::InvalidConfig("account count overflows".to_string()))?;
        if self.transactions_per_account > 0 && accounts > 0 && accounts < 2 {
            return Err(GenError::InvalidConfig(format!(
                "transactions need at least two accounts, the plan only creates {accounts}"
            )));
        }
        Ok(())
    }
}

/// Everything a run needs. Built by the CLI, consumed as-is by [`crate::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub sink: SinkKind,
    /// Script path for the file sink
    pub output: PathBuf,
    /// SQLite database path for the db sink
    pub database: PathBuf,
    pub plan: Plan,
    /// Fixed seed for reproducible output, entropy otherwise
    pub seed: Option<u64>,
    /// Overrides the sink's default credential style
    pub credentials: Option<CredentialStyle>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            sink: SinkKind::File,
            output: PathBuf::from("data.sql"),
            database: PathBuf::from("data.db"),
            plan: Plan::default(),
            seed: None,
            credentials: None,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn credentials(&self) -> CredentialStyle {
        self.credentials
            .unwrap_or_else(|| self.sink.default_credentials())
    }

    /// # Errors
    /// See [`Plan::validate`]
    pub fn validate(&self) -> Result<()> {
        self.plan.validate()
    }
}
