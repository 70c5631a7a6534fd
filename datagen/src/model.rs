use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GenError;

pub const NUM_DECIMAL_PLACES: u32 = 2;

/// One ordered stage of generation. Phases always run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Users,
    Accounts,
    Transactions,
    Invoices,
    Loans,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Users,
        Phase::Accounts,
        Phase::Transactions,
        Phase::Invoices,
        Phase::Loans,
    ];

    /// Name of the table this phase populates
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Phase::Users => "users",
            Phase::Accounts => "accounts",
            Phase::Transactions => "transactions",
            Phase::Invoices => "invoices",
            Phase::Loans => "loans",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Declares a closed set of SCREAMING_CASE values that can be drawn uniformly at random.
macro_rules! uniform_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = GenError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::VALUES
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        GenError::InvalidConfig(format!(
                            "unknown {} value '{}'",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }

        impl Distribution<$name> for Standard {
            fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> $name {
                $name::VALUES[rng.gen_range(0..$name::VALUES.len())]
            }
        }
    };
}

uniform_enum!(Role {
    Customer => "CUSTOMER",
    Admin => "ADMIN",
    Employee => "EMPLOYEE",
});

uniform_enum!(AccountStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Suspended => "SUSPENDED",
    Closed => "CLOSED",
});

uniform_enum!(TransactionType {
    Deposit => "DEPOSIT",
    Withdrawal => "WITHDRAWAL",
    Transfer => "TRANSFER",
    Payment => "PAYMENT",
});

uniform_enum!(
    /// Settlement state of a generated transfer
    TransactionStatus {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
);

/// A non-negative amount kept at cent precision.
/// Values are truncated rather than rounded so that a draw from a half-open
/// range never lands on its exclusive upper bound.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl TryFrom<Decimal> for Money {
    type Error = GenError;
    fn try_from(decimal: Decimal) -> Result<Self, Self::Error> {
        if decimal >= Decimal::ZERO {
            let mut truncated =
                decimal.round_dp_with_strategy(NUM_DECIMAL_PLACES, RoundingStrategy::ToZero);
            truncated.rescale(NUM_DECIMAL_PLACES);
            Ok(Money(truncated))
        } else {
            Err(GenError::InvalidAmount)
        }
    }
}

impl TryFrom<f64> for Money {
    type Error = GenError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Money::try_from(Decimal::from_f64(value).ok_or(GenError::InvalidAmount)?)
    }
}

impl Money {
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    pub monthly_income: Money,
    pub credit_score: u32,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: u64,
    pub balance: Money,
    pub status: AccountStatus,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: u64,
    pub tx_type: TransactionType,
    pub amount: Money,
    pub source_account_id: u64,
    pub destination_account_id: u64,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: u64,
    pub amount_due: Money,
    pub due_date: NaiveDate,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: u64,
    pub principal: Money,
    pub interest_rate: Money,
    pub term_months: u32,
    pub user_id: u64,
    pub approved: bool,
}
