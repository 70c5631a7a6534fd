use log::{debug, info};
use rusqlite::{params, Connection, Transaction as DbTransaction};

use crate::config::SinkKind;
use crate::error::Result;
use crate::model::{Account, Invoice, Loan, Transaction, User};
use crate::schema;
use crate::sink::Sink;

/// Loads records straight into SQLite inside a single transaction.
///
/// Nothing is visible to other connections until [`Sink::finish`] commits.
/// Dropping the sink early, which is what happens when any phase fails,
/// rolls the whole run back.
pub struct DatabaseSink<'c> {
    tx: DbTransaction<'c>,
    rows: u64,
}

impl<'c> DatabaseSink<'c> {
    /// # Errors
    /// Errors when foreign keys cannot be enabled or the transaction cannot be opened
    pub fn new(conn: &'c mut Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let tx = conn.transaction()?;
        Ok(DatabaseSink { tx, rows: 0 })
    }

    /// Rows inserted in this run so far, committed or not
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    fn insert_rows<T, F>(
        &mut self,
        table: &str,
        columns: &str,
        batch: &[T],
        mut bind: F,
    ) -> Result<()>
    where
        F: FnMut(&mut rusqlite::CachedStatement<'_>, &T) -> rusqlite::Result<usize>,
    {
        let mut stmt = self
            .tx
            .prepare_cached(&schema::insert_statement(table, columns))?;
        for record in batch {
            bind(&mut stmt, record)?;
        }
        self.rows += batch.len() as u64;
        debug!("Inserted {} rows into {}", batch.len(), table);
        Ok(())
    }
}

/// SQLite integers are signed, generated ids always fit
#[allow(clippy::cast_possible_wrap)]
fn sql_id(id: u64) -> i64 {
    id as i64
}

impl Sink for DatabaseSink<'_> {
    fn kind(&self) -> SinkKind {
        SinkKind::Database
    }

    fn begin(&mut self) -> Result<()> {
        info!("Creating tables...");
        for statement in schema::DROP_TABLES {
            self.tx.execute(statement, [])?;
        }
        for create in schema::SQLITE_TABLES {
            self.tx.execute(create, [])?;
        }
        Ok(())
    }

    fn write_users(&mut self, batch: &[User]) -> Result<()> {
        self.insert_rows("users", schema::USER_COLUMNS, batch, |stmt, user| {
            stmt.execute(params![
                sql_id(user.id),
                user.name,
                user.email,
                user.password,
                user.age,
                user.monthly_income.to_string(),
                user.credit_score,
                user.role.as_str(),
            ])
        })
    }

    fn write_accounts(&mut self, batch: &[Account]) -> Result<()> {
        self.insert_rows("accounts", schema::ACCOUNT_COLUMNS, batch, |stmt, account| {
            stmt.execute(params![
                sql_id(account.id),
                account.balance.to_string(),
                account.status.as_str(),
                sql_id(account.user_id),
            ])
        })
    }

    fn write_transactions(&mut self, batch: &[Transaction]) -> Result<()> {
        self.insert_rows("transactions", schema::TRANSACTION_COLUMNS, batch, |stmt, tx| {
            stmt.execute(params![
                sql_id(tx.id),
                tx.tx_type.as_str(),
                tx.amount.to_string(),
                sql_id(tx.source_account_id),
                sql_id(tx.destination_account_id),
                tx.status.as_str(),
            ])
        })
    }

    fn write_invoices(&mut self, batch: &[Invoice]) -> Result<()> {
        self.insert_rows("invoices", schema::INVOICE_COLUMNS, batch, |stmt, invoice| {
            stmt.execute(params![
                sql_id(invoice.id),
                invoice.amount_due.to_string(),
                invoice.due_date.format("%Y-%m-%d").to_string(),
                sql_id(invoice.user_id),
            ])
        })
    }

    fn write_loans(&mut self, batch: &[Loan]) -> Result<()> {
        self.insert_rows("loans", schema::LOAN_COLUMNS, batch, |stmt, loan| {
            stmt.execute(params![
                sql_id(loan.id),
                loan.principal.to_string(),
                loan.interest_rate.to_string(),
                loan.term_months,
                sql_id(loan.user_id),
                loan.approved,
            ])
        })
    }

    fn create_indexes(&mut self) -> Result<()> {
        info!("Creating indexes...");
        for index in schema::INDEXES {
            self.tx.execute(index, [])?;
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.tx.commit()?;
        info!("Committed {} rows", self.rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountStatus, Money, Role};

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    fn user(id: u64) -> User {
        User {
            id,
            name: "Ines Rossi".to_string(),
            email: format!("user{id}@example.com"),
            password: "hash".to_string(),
            age: 40,
            monthly_income: Money::try_from(50_000.0).unwrap(),
            credit_score: 610,
            role: Role::Customer,
        }
    }

    #[test]
    fn test_commit_on_finish() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut sink = DatabaseSink::new(&mut conn).unwrap();
        sink.begin().unwrap();
        sink.write_users(&[user(1), user(2)]).unwrap();
        sink.write_accounts(&[Account {
            id: 1,
            balance: Money::try_from(1_500.25).unwrap(),
            status: AccountStatus::Active,
            user_id: 2,
        }])
        .unwrap();
        assert_eq!(sink.rows(), 3);
        sink.create_indexes().unwrap();
        sink.finish().unwrap();

        assert_eq!(count(&conn, "users"), 2);
        assert_eq!(count(&conn, "accounts"), 1);
        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 10);
    }

    #[test]
    fn test_rollback_on_drop() {
        let mut conn = Connection::open_in_memory().unwrap();
        for create in schema::SQLITE_TABLES {
            conn.execute(create, []).unwrap();
        }
        {
            let mut sink = DatabaseSink::new(&mut conn).unwrap();
            sink.write_users(&[user(1)]).unwrap();
        }
        assert_eq!(count(&conn, "users"), 0);
    }

    #[test]
    fn test_foreign_key_enforced() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut sink = DatabaseSink::new(&mut conn).unwrap();
        sink.begin().unwrap();
        let orphan = Account {
            id: 1,
            balance: Money::default(),
            status: AccountStatus::Closed,
            user_id: 99,
        };
        assert!(sink.write_accounts(&[orphan]).is_err());
    }
}
