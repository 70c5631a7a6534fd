use std::collections::HashSet;
use std::fs;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;

use fin_datagen::config::{GeneratorConfig, Plan, SinkKind};
use fin_datagen::error::{GenError, Result, Stage};
use fin_datagen::generator::{CredentialStyle, EntityGenerator};
use fin_datagen::model::{Account, Invoice, Loan, Phase, Transaction, User};
use fin_datagen::orchestrator::Orchestrator;
use fin_datagen::schema;
use fin_datagen::sink::{DatabaseSink, Sink, SqlFileSink};
use fin_datagen::text::NameBank;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn make_orchestrator(plan: Plan, credentials: CredentialStyle) -> Orchestrator<StdRng, NameBank> {
    let generator = EntityGenerator::new(StdRng::seed_from_u64(99), NameBank, credentials, today());
    Orchestrator::new(generator, plan)
}

fn scenario_plan() -> Plan {
    Plan {
        users: 5,
        accounts_per_user: 2,
        transactions_per_account: 1,
        invoices_per_user: 2,
        loans_per_user: 2,
        batch_size: 1000,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

/// Pulls the parenthesised value list out of an `INSERT` line
fn values(line: &str) -> Vec<String> {
    let start = line.find("VALUES (").unwrap() + "VALUES (".len();
    let end = line.rfind(");").unwrap();
    line[start..end].split(", ").map(str::to_string).collect()
}

#[test]
fn test_file_scenario() {
    let mut orchestrator = make_orchestrator(scenario_plan(), CredentialStyle::PerRecord);
    let mut sink = SqlFileSink::new(Vec::new());
    let summary = orchestrator.generate(&mut sink).unwrap();
    assert_eq!(sink.statements(), summary.total_records());
    let text = String::from_utf8(sink.into_inner()).unwrap();

    let users: Vec<&str> = text.lines().filter(|l| l.starts_with("INSERT INTO users ")).collect();
    let accounts: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("INSERT INTO accounts "))
        .collect();
    let transactions: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("INSERT INTO transactions "))
        .collect();
    assert_eq!(users.len(), 5);
    assert_eq!(accounts.len(), 10);
    assert_eq!(transactions.len(), 10);

    let account_ids: Vec<u64> = accounts.iter().map(|l| values(l)[0].parse().unwrap()).collect();
    assert_eq!(account_ids, (1..=10).collect::<Vec<_>>());

    let valid: HashSet<u64> = account_ids.into_iter().collect();
    for line in transactions {
        let vals = values(line);
        let source: u64 = vals[3].parse().unwrap();
        let destination: u64 = vals[4].parse().unwrap();
        assert!(valid.contains(&source));
        assert!(valid.contains(&destination));
        assert_ne!(source, destination);
    }

    // schema header, then one blank line after each of the five phases
    assert!(text.starts_with("DROP TABLE IF EXISTS"));
    let body = &text[text.find("INSERT INTO users").unwrap()..];
    assert_eq!(body.matches("\n\n").count(), Phase::ALL.len());
}

#[test]
fn test_file_sink_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        sink: SinkKind::File,
        output: dir.path().join("seed.sql"),
        plan: Plan {
            batch_size: 3,
            ..scenario_plan()
        },
        seed: Some(7),
        ..GeneratorConfig::default()
    };
    let summary = fin_datagen::run(&config).unwrap();
    let text = fs::read_to_string(&config.output).unwrap();
    assert_eq!(
        text.lines().filter(|l| l.starts_with("INSERT INTO")).count() as u64,
        summary.total_records()
    );
    assert_eq!(text.matches("CREATE INDEX").count(), 10);
}

#[test]
fn test_database_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        sink: SinkKind::Database,
        database: dir.path().join("seed.db"),
        plan: Plan {
            batch_size: 4,
            ..scenario_plan()
        },
        seed: Some(7),
        ..GeneratorConfig::default()
    };
    let summary = fin_datagen::run(&config).unwrap();
    assert_eq!(summary.records(Phase::Loans), 10);

    let conn = Connection::open(&config.database).unwrap();
    assert_eq!(count(&conn, "users"), 5);
    assert_eq!(count(&conn, "accounts"), 10);
    assert_eq!(count(&conn, "transactions"), 10);
    assert_eq!(count(&conn, "invoices"), 10);
    assert_eq!(count(&conn, "loans"), 10);

    let self_transfers: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE source_account_id = destination_account_id",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(self_transfers, 0);

    let email: String = conn
        .query_row("SELECT email FROM users WHERE id = 3", [], |row| row.get(0))
        .unwrap();
    assert_eq!(email, "user3@example.com");
}

#[test]
fn test_sinks_receive_identical_data() {
    let mut file_sink = SqlFileSink::new(Vec::new());
    make_orchestrator(scenario_plan(), CredentialStyle::Shared)
        .generate(&mut file_sink)
        .unwrap();
    let text = String::from_utf8(file_sink.into_inner()).unwrap();

    let mut conn = Connection::open_in_memory().unwrap();
    let mut orchestrator = make_orchestrator(scenario_plan(), CredentialStyle::Shared);
    let db_sink = DatabaseSink::new(&mut conn).unwrap();
    fin_datagen::run_with_sink(&mut orchestrator, db_sink).unwrap();

    let mut stmt = conn
        .prepare("SELECT id, source_account_id, destination_account_id FROM transactions ORDER BY id")
        .unwrap();
    let from_db: Vec<(i64, i64, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    let from_file: Vec<(i64, i64, i64)> = text
        .lines()
        .filter(|l| l.starts_with("INSERT INTO transactions "))
        .map(|l| {
            let vals = values(l);
            (
                vals[0].parse().unwrap(),
                vals[3].parse().unwrap(),
                vals[4].parse().unwrap(),
            )
        })
        .collect();
    assert_eq!(from_db, from_file);
}

/// Delegates to the database sink but fails the first loan batch
struct FailingLoans<'c>(DatabaseSink<'c>);

impl Sink for FailingLoans<'_> {
    fn kind(&self) -> SinkKind {
        self.0.kind()
    }
    fn begin(&mut self) -> Result<()> {
        self.0.begin()
    }
    fn write_users(&mut self, batch: &[User]) -> Result<()> {
        self.0.write_users(batch)
    }
    fn write_accounts(&mut self, batch: &[Account]) -> Result<()> {
        self.0.write_accounts(batch)
    }
    fn write_transactions(&mut self, batch: &[Transaction]) -> Result<()> {
        self.0.write_transactions(batch)
    }
    fn write_invoices(&mut self, batch: &[Invoice]) -> Result<()> {
        self.0.write_invoices(batch)
    }
    fn write_loans(&mut self, _batch: &[Loan]) -> Result<()> {
        Err(GenError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
    fn end_phase(&mut self, phase: Phase) -> Result<()> {
        self.0.end_phase(phase)
    }
    fn create_indexes(&mut self) -> Result<()> {
        self.0.create_indexes()
    }
    fn finish(self) -> Result<()> {
        self.0.finish()
    }
}

#[test]
fn test_rollback_when_loans_fail() {
    let mut conn = Connection::open_in_memory().unwrap();
    for create in schema::SQLITE_TABLES {
        conn.execute(create, []).unwrap();
    }

    let mut orchestrator = make_orchestrator(
        Plan {
            batch_size: 3,
            ..scenario_plan()
        },
        CredentialStyle::Shared,
    );
    let sink = FailingLoans(DatabaseSink::new(&mut conn).unwrap());
    let err = fin_datagen::run_with_sink(&mut orchestrator, sink).unwrap_err();
    match err {
        GenError::Phase { phase, sink, .. } => {
            assert_eq!(phase, Phase::Loans);
            assert_eq!(sink, SinkKind::Database);
        }
        other => panic!("unexpected error {other:?}"),
    }

    for table in ["users", "accounts", "transactions", "invoices", "loans"] {
        assert_eq!(count(&conn, table), 0, "{table} kept rows after rollback");
    }
}

#[test]
fn test_invalid_config_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output: dir.path().join("never.sql"),
        plan: Plan {
            batch_size: 0,
            ..scenario_plan()
        },
        ..GeneratorConfig::default()
    };
    assert!(matches!(
        fin_datagen::run(&config),
        Err(GenError::InvalidConfig(_))
    ));
    assert!(!config.output.exists());
}

#[test]
fn test_missing_output_dir_names_path_and_sink() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        sink: SinkKind::File,
        output: dir.path().join("missing-dir").join("out.sql"),
        plan: scenario_plan(),
        ..GeneratorConfig::default()
    };
    let err = fin_datagen::run(&config).unwrap_err();
    assert!(matches!(
        err,
        GenError::Sink {
            stage: Stage::Open,
            sink: SinkKind::File,
            ..
        }
    ));
    let message = err.to_string();
    assert!(message.contains("file sink"));
    assert!(message.contains("missing-dir"));
}

#[test]
fn test_schema_failure_has_context() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute("CREATE VIEW users AS SELECT 1 AS id", []).unwrap();

    let mut orchestrator = make_orchestrator(scenario_plan(), CredentialStyle::Shared);
    let sink = DatabaseSink::new(&mut conn).unwrap();
    let err = fin_datagen::run_with_sink(&mut orchestrator, sink).unwrap_err();
    assert!(matches!(
        err,
        GenError::Sink {
            stage: Stage::Schema,
            sink: SinkKind::Database,
            ..
        }
    ));
    assert!(err.to_string().starts_with("schema stage failed on the db sink"));
}

#[test]
fn test_index_failure_rolls_back_with_context() {
    let mut conn = Connection::open_in_memory().unwrap();
    for create in schema::SQLITE_TABLES {
        conn.execute(create, []).unwrap();
    }
    conn.execute("CREATE TABLE audit (user_id INTEGER)", []).unwrap();
    conn.execute("CREATE INDEX idx_loan_user ON audit(user_id)", [])
        .unwrap();

    let mut orchestrator = make_orchestrator(scenario_plan(), CredentialStyle::Shared);
    let sink = DatabaseSink::new(&mut conn).unwrap();
    let err = fin_datagen::run_with_sink(&mut orchestrator, sink).unwrap_err();
    assert!(matches!(
        err,
        GenError::Sink {
            stage: Stage::Indexes,
            sink: SinkKind::Database,
            ..
        }
    ));
    assert!(err.to_string().contains("idx_loan_user"));

    for table in ["users", "accounts", "transactions", "invoices", "loans"] {
        assert_eq!(count(&conn, table), 0, "{table} kept rows after rollback");
    }
}
