/// Генерация синтетического датасета

use anyhow::Context;
use clap::Parser;

use obesity_dx::config::GenerateConfig;
use obesity_dx::data::{generate, write_dataset};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = GenerateConfig::parse();

    let records = generate(config.samples, config.seed);
    write_dataset(&config.output, &records)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    tracing::info!("Generated {} rows (seed {})", records.len(), config.seed);
    println!("Dataset saved to {}", config.output.display());
    Ok(())
}
