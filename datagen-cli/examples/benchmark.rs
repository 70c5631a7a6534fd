//! Times both sinks on the same seeded plan.
//! can be run with `cargo run --example benchmark`

use std::error::Error;
use std::io;
use std::time::Instant;

use csv::WriterBuilder;
use log::warn;

use fin_datagen::config::{GeneratorConfig, Plan, SinkKind};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let dir = std::env::temp_dir();
    let plan = Plan {
        users: 100_000,
        ..Plan::default()
    };
    let mut writer = WriterBuilder::new().from_writer(io::stdout());

    for sink in [SinkKind::File, SinkKind::Database] {
        let config = GeneratorConfig {
            sink,
            output: dir.join("fin-datagen-bench.sql"),
            database: dir.join("fin-datagen-bench.db"),
            plan,
            seed: Some(1),
            credentials: None,
        };
        let start = Instant::now();
        let summary = fin_datagen::run(&config)?;
        warn!(
            "{} sink: {} records took {:.2?}",
            sink,
            summary.total_records(),
            start.elapsed()
        );
        for report in &summary.phases {
            writer.serialize(report)?;
        }
    }
    writer.flush()?;

    Ok(())
}
