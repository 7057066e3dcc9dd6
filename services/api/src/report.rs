use crate::infra::{build_explanation_service, parse_date};
use chrono::NaiveDate;
use clap::Args;
use silson_guide::catalog::{Catalog, DATE_FORMAT};
use silson_guide::config::{AppConfig, ProvidersConfig};
use silson_guide::error::AppError;
use silson_guide::explain::Explanation;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    /// Enrollment date of the policy (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) join_date: NaiveDate,
    /// Override the reference catalog location (SILSON_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Skip external providers and print the offline report
    #[arg(long)]
    pub(crate) offline: bool,
    /// Print the response payload as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GenerationsArgs {
    /// Override the reference catalog location (SILSON_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run_explain(args: ExplainArgs) -> Result<(), AppError> {
    let ExplainArgs {
        join_date,
        catalog,
        offline,
        json,
    } = args;

    let config = AppConfig::load()?;
    let catalog_path = catalog.unwrap_or(config.catalog.path);
    let providers = if offline {
        ProvidersConfig::disabled()
    } else {
        config.providers
    };

    let service = build_explanation_service(&catalog_path, &providers)?;
    let explanation = service
        .explain(&join_date.format(DATE_FORMAT).to_string())
        .await?;

    if json {
        match serde_json::to_string_pretty(&explanation) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Explanation payload unavailable: {err}"),
        }
    } else {
        render_explanation(join_date, &explanation);
    }

    Ok(())
}

pub(crate) fn run_generations(args: GenerationsArgs) -> Result<(), AppError> {
    let catalog_path = match args.catalog {
        Some(path) => path,
        None => AppConfig::load()?.catalog.path,
    };

    let catalog = Catalog::from_path(&catalog_path)?;
    render_generations(&catalog, &catalog_path);
    Ok(())
}

fn render_explanation(join_date: NaiveDate, explanation: &Explanation) {
    println!("실손보험 세대 안내");
    println!("가입일: {}", join_date.format(DATE_FORMAT));
    println!(
        "판정: {}세대 ({})",
        explanation.generation, explanation.generation_name
    );
    println!("작성: {}", explanation.source);
    println!("{}", explanation.explanation);
}

fn render_generations(catalog: &Catalog, path: &std::path::Path) {
    println!("Reference catalog: {}", path.display());
    if catalog.is_empty() {
        println!("No generations defined");
        return;
    }

    for record in catalog.generations() {
        println!(
            "- {}세대 {} | {} | 보험료 수준: {}",
            record.generation,
            record.name,
            record.join_period.label(),
            record.premium.level
        );
    }

    if let Some(terminal) = catalog.terminal() {
        println!("Newest generation: {}세대 ({})", terminal.generation, terminal.name);
    }
}
