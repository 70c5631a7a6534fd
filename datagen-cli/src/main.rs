use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use csv::WriterBuilder;
use log::info;

use fin_datagen::config::{self, GeneratorConfig, Plan, SinkKind};
use fin_datagen::generator::CredentialStyle;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Where records go: `file` for a SQL script, `db` for a direct database load
    #[clap(long, default_value = "file")]
    pub(crate) sink: String,
    /// SQL script written by the file sink
    #[clap(long, default_value = "data.sql")]
    pub(crate) output: PathBuf,
    /// SQLite database loaded by the db sink
    #[clap(long, default_value = "data.db")]
    pub(crate) database: PathBuf,
    #[clap(long, default_value_t = config::TOTAL_USERS)]
    pub(crate) users: u64,
    #[clap(long, default_value_t = config::ACCOUNTS_PER_USER)]
    pub(crate) accounts_per_user: u64,
    #[clap(long, default_value_t = config::TRANSACTIONS_PER_ACCOUNT)]
    pub(crate) transactions_per_account: u64,
    #[clap(long, default_value_t = config::INVOICES_PER_USER)]
    pub(crate) invoices_per_user: u64,
    #[clap(long, default_value_t = config::LOANS_PER_USER)]
    pub(crate) loans_per_user: u64,
    /// Records buffered before each write
    #[clap(long, default_value_t = config::BATCH_SIZE)]
    pub(crate) batch_size: usize,
    /// Seed for reproducible output
    #[clap(long)]
    pub(crate) seed: Option<u64>,
    /// `per-record` or `shared`, defaults depend on the sink
    #[clap(long)]
    pub(crate) credentials: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<GeneratorConfig, fin_datagen::error::GenError> {
        let sink: SinkKind = self.sink.parse()?;
        let credentials = self
            .credentials
            .as_deref()
            .map(str::parse::<CredentialStyle>)
            .transpose()?;
        let config = GeneratorConfig {
            sink,
            output: self.output,
            database: self.database,
            plan: Plan {
                users: self.users,
                accounts_per_user: self.accounts_per_user,
                transactions_per_account: self.transactions_per_account,
                invoices_per_user: self.invoices_per_user,
                loans_per_user: self.loans_per_user,
                batch_size: self.batch_size,
            },
            seed: self.seed,
            credentials,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = Cli::parse().into_config()?;

    let start = Instant::now();
    let summary = fin_datagen::run(&config)?;
    info!("Data generation completed in {:.2?}", start.elapsed());

    let mut writer = WriterBuilder::new().from_writer(io::stdout());
    for report in &summary.phases {
        writer.serialize(report)?;
    }
    writer.flush()?;

    Ok(())
}
