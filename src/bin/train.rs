/// Обучение моделей и отбор лучшей по F1 (weighted)

use anyhow::Context;
use clap::Parser;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Table};

use obesity_dx::config::TrainConfig;
use obesity_dx::data::load_dataset;
use obesity_dx::training::CvResult;
use obesity_dx::{run_tournament, save_artifacts, ModelSpec, TournamentConfig};

fn comparison_table(results: &[CvResult], best: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Model").add_attribute(Attribute::Bold),
        Cell::new("F1 (mean)").add_attribute(Attribute::Bold),
        Cell::new("Accuracy (mean)").add_attribute(Attribute::Bold),
    ]);

    for (i, result) in results.iter().enumerate() {
        let name = if i == best {
            Cell::new(format!("{} *", result.model)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&result.model)
        };
        table.add_row(vec![
            name,
            Cell::new(format!("{:.4}", result.mean_f1)),
            Cell::new(format!("{:.4}", result.mean_accuracy)),
        ]);
    }
    table
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = TrainConfig::parse();

    let dataset = load_dataset(&config.data)
        .with_context(|| format!("failed to load dataset {}", config.data.display()))?;

    let tournament = TournamentConfig {
        test_size: config.test_size,
        n_splits: config.folds,
        seed: config.seed,
        candidates: ModelSpec::candidates(config.seed),
        ..TournamentConfig::new(config.mode)
    };

    println!("Comparing models ({} mode, {}-fold CV)...", config.mode, config.folds);
    let outcome = run_tournament(&dataset, &tournament).context("training failed")?;

    println!("{}", comparison_table(&outcome.cv_results, outcome.best));
    println!("Best model: {}", outcome.best_result().model);
    println!("Test accuracy: {:.4}", outcome.test_report.accuracy);
    println!("{}", outcome.test_report);

    let paths = save_artifacts(&config.models_dir, outcome)
        .with_context(|| format!("failed to save artifacts to {}", config.models_dir.display()))?;
    println!("Model saved to {}", paths.model.display());
    println!("Label encoder saved to {}", paths.label_encoder.display());
    println!("Report saved to {}", paths.report.display());

    Ok(())
}
