use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use crate::config::SinkKind;
use crate::error::{GenError, Result};
use crate::model::{Account, Invoice, Loan, Phase, Transaction, User};
use crate::schema;
use crate::sink::Sink;

/// Quotes `value` as a SQL string literal, doubling embedded single quotes
#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Writes a PostgreSQL script: schema first, then one `INSERT` per line,
/// with a blank line after every phase.
pub struct SqlFileSink<W: Write> {
    writer: W,
    statements: u64,
}

impl SqlFileSink<BufWriter<File>> {
    /// # Errors
    /// Errors when `path` cannot be created
    pub fn create(path: &Path) -> Result<Self> {
        info!("Writing SQL script to {}", path.display());
        let file = File::create(path).map_err(|e| GenError::from(e).opening(path))?;
        Ok(SqlFileSink::new(BufWriter::new(file)))
    }
}

impl<W: Write> SqlFileSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        SqlFileSink {
            writer,
            statements: 0,
        }
    }

    /// Number of `INSERT` statements written so far
    #[must_use]
    pub fn statements(&self) -> u64 {
        self.statements
    }

    /// Hands back the underlying writer without flushing it
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn insert(&mut self, table: &str, columns: &str, values: &[String]) -> Result<()> {
        writeln!(
            self.writer,
            "INSERT INTO {table} ({columns}) VALUES ({});",
            values.join(", ")
        )?;
        self.statements += 1;
        Ok(())
    }
}

impl<W: Write> Sink for SqlFileSink<W> {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn begin(&mut self) -> Result<()> {
        for statement in schema::DROP_TABLES {
            writeln!(self.writer, "{statement} CASCADE;")?;
        }
        writeln!(self.writer)?;
        for create in schema::POSTGRES_TABLES {
            writeln!(self.writer, "{create};\n")?;
        }
        for index in schema::INDEXES {
            writeln!(self.writer, "{index};")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_users(&mut self, batch: &[User]) -> Result<()> {
        for user in batch {
            self.insert(
                "users",
                schema::USER_COLUMNS,
                &[
                    user.id.to_string(),
                    quote(&user.name),
                    quote(&user.email),
                    quote(&user.password),
                    user.age.to_string(),
                    user.monthly_income.to_string(),
                    user.credit_score.to_string(),
                    quote(user.role.as_str()),
                ],
            )?;
        }
        Ok(())
    }

    fn write_accounts(&mut self, batch: &[Account]) -> Result<()> {
        for account in batch {
            self.insert(
                "accounts",
                schema::ACCOUNT_COLUMNS,
                &[
                    account.id.to_string(),
                    account.balance.to_string(),
                    quote(account.status.as_str()),
                    account.user_id.to_string(),
                ],
            )?;
        }
        Ok(())
    }

    fn write_transactions(&mut self, batch: &[Transaction]) -> Result<()> {
        for tx in batch {
            self.insert(
                "transactions",
                schema::TRANSACTION_COLUMNS,
                &[
                    tx.id.to_string(),
                    quote(tx.tx_type.as_str()),
                    tx.amount.to_string(),
                    tx.source_account_id.to_string(),
                    tx.destination_account_id.to_string(),
                    quote(tx.status.as_str()),
                ],
            )?;
        }
        Ok(())
    }

    fn write_invoices(&mut self, batch: &[Invoice]) -> Result<()> {
        for invoice in batch {
            self.insert(
                "invoices",
                schema::INVOICE_COLUMNS,
                &[
                    invoice.id.to_string(),
                    invoice.amount_due.to_string(),
                    quote(&invoice.due_date.format("%Y-%m-%d").to_string()),
                    invoice.user_id.to_string(),
                ],
            )?;
        }
        Ok(())
    }

    fn write_loans(&mut self, batch: &[Loan]) -> Result<()> {
        for loan in batch {
            self.insert(
                "loans",
                schema::LOAN_COLUMNS,
                &[
                    loan.id.to_string(),
                    loan.principal.to_string(),
                    loan.interest_rate.to_string(),
                    loan.term_months.to_string(),
                    loan.user_id.to_string(),
                    loan.approved.to_string(),
                ],
            )?;
        }
        Ok(())
    }

    fn end_phase(&mut self, phase: Phase) -> Result<()> {
        debug!("Closing {} section", phase);
        writeln!(self.writer)?;
        Ok(())
    }

    /// Moves every id sequence past the explicitly inserted ids
    fn finish(mut self) -> Result<()> {
        for phase in Phase::ALL {
            let table = phase.table();
            writeln!(
                self.writer,
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                 COALESCE((SELECT MAX(id) FROM {table}), 1), \
                 (SELECT MAX(id) FROM {table}) IS NOT NULL);"
            )?;
        }
        self.writer.flush()?;
        info!("SQL script complete, {} insert statements", self.statements);
        Ok(())
    }
}
