use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use log::warn;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{GenError, Result};
use crate::model::{Account, Invoice, Loan, Money, Transaction, User};
use crate::text::TextProvider;

/// Bcrypt hash handed to every user when [`CredentialStyle::Shared`] is in effect
pub const SHARED_PASSWORD_HASH: &str =
    "$2a$10$0Pp2F39K/SwPJ9tmSNzk8.FWukmZTdGE/BiS4tXJ5QNSXGQTWdHY2";

/// Upper bound on redraws when picking a transfer destination different from its source
pub const MAX_DESTINATION_DRAWS: usize = 64;

const DUE_DATE_HORIZON_DAYS: i64 = 365;

/// How emails and password hashes are produced for users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialStyle {
    /// Emails from the text provider, a random secret salted and hashed per user
    PerRecord,
    /// `user<id>@example.com` and one precomputed hash shared by every user
    Shared,
}

impl fmt::Display for CredentialStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialStyle::PerRecord => f.write_str("per-record"),
            CredentialStyle::Shared => f.write_str("shared"),
        }
    }
}

impl FromStr for CredentialStyle {
    type Err = GenError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "per-record" => Ok(CredentialStyle::PerRecord),
            "shared" => Ok(CredentialStyle::Shared),
            other => Err(GenError::InvalidConfig(format!(
                "unknown credential style '{other}', expected 'per-record' or 'shared'"
            ))),
        }
    }
}

/// Produces single records. Every call consumes randomness from the one
/// stream held here, so output is reproducible for a seeded `R`.
pub struct EntityGenerator<R, T> {
    rng: R,
    text: T,
    credentials: CredentialStyle,
    today: NaiveDate,
}

/// Uniform draw from `[low, high)` as cents
fn money_in<R: Rng>(rng: &mut R, low: f64, high: f64) -> Result<Money> {
    Money::try_from(rng.gen_range(low..high))
}

#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("sha256${salt}${:x}", hasher.finalize())
}

impl<R: Rng, T: TextProvider> EntityGenerator<R, T> {
    #[must_use]
    pub fn new(rng: R, text: T, credentials: CredentialStyle, today: NaiveDate) -> Self {
        EntityGenerator {
            rng,
            text,
            credentials,
            today,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> CredentialStyle {
        self.credentials
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn random_token(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    /// # Errors
    /// Only if a drawn income cannot be represented as [`Money`]
    pub fn user(&mut self, id: u64) -> Result<User> {
        let name = self.text.full_name(&mut self.rng);
        let (email, password) = match self.credentials {
            CredentialStyle::PerRecord => {
                let email = self.text.email(&mut self.rng, &name);
                let secret = self.random_token(16);
                let salt = self.random_token(8);
                (email, hash_password(&secret, &salt))
            }
            CredentialStyle::Shared => (
                format!("user{id}@example.com"),
                SHARED_PASSWORD_HASH.to_string(),
            ),
        };
        Ok(User {
            id,
            name,
            email,
            password,
            age: self.rng.gen_range(18..80),
            monthly_income: money_in(&mut self.rng, 30_000.0, 180_000.0)?,
            credit_score: self.rng.gen_range(300..850),
            role: self.rng.gen(),
        })
    }

    /// # Errors
    /// Only if a drawn balance cannot be represented as [`Money`]
    pub fn account(&mut self, id: u64, user_id: u64) -> Result<Account> {
        Ok(Account {
            id,
            balance: money_in(&mut self.rng, 1_000.0, 51_000.0)?,
            status: self.rng.gen(),
            user_id,
        })
    }

    /// Draws a destination uniformly from `pool`, redrawing while it equals `source`.
    ///
    /// # Errors
    /// Errors when `pool` has fewer than two accounts, or when
    /// [`MAX_DESTINATION_DRAWS`] draws all landed on `source`
    pub fn destination(&mut self, source: u64, pool: &[u64]) -> Result<u64> {
        if pool.len() < 2 {
            return Err(GenError::AccountPoolTooSmall { pool: pool.len() });
        }
        for draw in 1..=MAX_DESTINATION_DRAWS {
            let candidate = pool[self.rng.gen_range(0..pool.len())];
            if candidate != source {
                if draw > 8 {
                    warn!("Needed {} draws to find a destination for account {}", draw, source);
                }
                return Ok(candidate);
            }
        }
        Err(GenError::DestinationDrawsExhausted {
            source_account: source,
            draws: MAX_DESTINATION_DRAWS,
        })
    }

    /// # Errors
    /// See [`EntityGenerator::destination`]
    pub fn transaction(&mut self, id: u64, source: u64, pool: &[u64]) -> Result<Transaction> {
        let destination_account_id = self.destination(source, pool)?;
        Ok(Transaction {
            id,
            tx_type: self.rng.gen(),
            amount: money_in(&mut self.rng, 10.0, 1_010.0)?,
            source_account_id: source,
            destination_account_id,
            status: self.rng.gen(),
        })
    }

    /// # Errors
    /// Only if a drawn amount cannot be represented as [`Money`]
    pub fn invoice(&mut self, id: u64, user_id: u64) -> Result<Invoice> {
        let amount_due = money_in(&mut self.rng, 100.0, 5_100.0)?;
        let offset = self.rng.gen_range(0..DUE_DATE_HORIZON_DAYS);
        Ok(Invoice {
            id,
            amount_due,
            due_date: self.today + Duration::days(offset),
            user_id,
        })
    }

    /// # Errors
    /// Only if a drawn principal or rate cannot be represented as [`Money`]
    pub fn loan(&mut self, id: u64, user_id: u64) -> Result<Loan> {
        Ok(Loan {
            id,
            principal: money_in(&mut self.rng, 10_000.0, 510_000.0)?,
            interest_rate: money_in(&mut self.rng, 5.0, 20.0)?,
            term_months: self.rng.gen_range(12..360),
            user_id,
            approved: self.rng.gen_bool(0.5),
        })
    }
}
