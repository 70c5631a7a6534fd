//! Table and index definitions for the five generated tables.

/// Drop order respects foreign keys, children first
pub const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS transactions",
    "DROP TABLE IF EXISTS loans",
    "DROP TABLE IF EXISTS invoices",
    "DROP TABLE IF EXISTS accounts",
    "DROP TABLE IF EXISTS users",
];

/// PostgreSQL flavour, written at the top of generated SQL scripts
pub const POSTGRES_TABLES: &[&str] = &[
    "CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    password VARCHAR(255) NOT NULL,
    age INTEGER NOT NULL,
    monthly_income NUMERIC(15,2) NOT NULL,
    credit_score INTEGER NOT NULL,
    role VARCHAR(20) NOT NULL
)",
    "CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    balance NUMERIC(15,2) NOT NULL,
    status VARCHAR(20) NOT NULL,
    user_id BIGINT NOT NULL REFERENCES users(id)
)",
    "CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    type VARCHAR(20) NOT NULL,
    amount NUMERIC(15,2) NOT NULL,
    source_account_id BIGINT NOT NULL REFERENCES accounts(id),
    destination_account_id BIGINT NOT NULL REFERENCES accounts(id),
    status VARCHAR(20) NOT NULL
)",
    "CREATE TABLE invoices (
    id BIGSERIAL PRIMARY KEY,
    amount_due NUMERIC(15,2) NOT NULL,
    due_date DATE NOT NULL,
    user_id BIGINT NOT NULL REFERENCES users(id)
)",
    "CREATE TABLE loans (
    id BIGSERIAL PRIMARY KEY,
    principal NUMERIC(15,2) NOT NULL,
    interest_rate NUMERIC(5,2) NOT NULL,
    term_months INTEGER NOT NULL,
    user_id BIGINT NOT NULL REFERENCES users(id),
    approved BOOLEAN NOT NULL
)",
];

/// SQLite flavour, used by the database sink
pub const SQLITE_TABLES: &[&str] = &[
    "CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    age INTEGER NOT NULL,
    monthly_income NUMERIC NOT NULL,
    credit_score INTEGER NOT NULL,
    role TEXT NOT NULL
)",
    "CREATE TABLE accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    balance NUMERIC NOT NULL,
    status TEXT NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id)
)",
    "CREATE TABLE transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    amount NUMERIC NOT NULL,
    source_account_id INTEGER NOT NULL REFERENCES accounts(id),
    destination_account_id INTEGER NOT NULL REFERENCES accounts(id),
    status TEXT NOT NULL
)",
    "CREATE TABLE invoices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    amount_due NUMERIC NOT NULL,
    due_date TEXT NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id)
)",
    "CREATE TABLE loans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    principal NUMERIC NOT NULL,
    interest_rate NUMERIC NOT NULL,
    term_months INTEGER NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users(id),
    approved INTEGER NOT NULL
)",
];

/// Created after the bulk load in the database sink, and listed in script headers
pub const INDEXES: &[&str] = &[
    "CREATE INDEX idx_user_role ON users(role)",
    "CREATE INDEX idx_account_status ON accounts(status)",
    "CREATE INDEX idx_account_user ON accounts(user_id)",
    "CREATE INDEX idx_transaction_status ON transactions(status)",
    "CREATE INDEX idx_transaction_source ON transactions(source_account_id)",
    "CREATE INDEX idx_transaction_dest ON transactions(destination_account_id)",
    "CREATE INDEX idx_invoice_due_date ON invoices(due_date)",
    "CREATE INDEX idx_invoice_user ON invoices(user_id)",
    "CREATE INDEX idx_loan_user ON loans(user_id)",
    "CREATE INDEX idx_loan_approved ON loans(approved)",
];

pub const USER_COLUMNS: &str =
    "id, name, email, password, age, monthly_income, credit_score, role";
pub const ACCOUNT_COLUMNS: &str = "id, balance, status, user_id";
pub const TRANSACTION_COLUMNS: &str =
    "id, type, amount, source_account_id, destination_account_id, status";
pub const INVOICE_COLUMNS: &str = "id, amount_due, due_date, user_id";
pub const LOAN_COLUMNS: &str = "id, principal, interest_rate, term_months, user_id, approved";

/// `INSERT` statement with `?N` placeholders for every column in `columns`
#[must_use]
pub fn insert_statement(table: &str, columns: &str) -> String {
    let placeholders = (1..=columns.split(',').count())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})")
}
