mod catalog;
mod config;
mod draft;
mod error;
mod models;
mod notify;
mod services;
mod submission;
mod uploader;
mod wizard;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use draft::Draft;
use error::SubmissionError;
use models::Attachment;
use notify::LogNotifier;
use services::ApiClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use submission::SubmissionOrchestrator;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wizard::{ValidationErrors, WizardController};

#[derive(Parser)]
#[command(name = "device-listing", about = "Publish a phone listing to the store")]
struct Cli {
    /// Settings file (defaults to ./listing.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List catalog models whose name or brand matches SEARCH
    Models {
        #[arg(default_value = "")]
        search: String,
    },
    /// Show the palette of model ID, filtered by SEARCH
    Colors {
        model: i64,
        #[arg(default_value = "")]
        search: String,
    },
    /// Fill the listing wizard from a JSON draft and publish it
    Publish {
        draft: PathBuf,
        /// Image to attach; repeat for several
        #[arg(long = "picture")]
        pictures: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref())?;

    info!("📱 Device Listing - {}", settings.api_base_url);

    let api = Arc::new(ApiClient::new(&settings)?);
    let catalog = catalog::CatalogProvider::new(api.clone(), api.clone());
    let mut wizard = WizardController::new(catalog);

    wizard
        .load_catalog()
        .await
        .context("Failed to load the model catalog")?;

    match cli.command {
        Command::Models { search } => {
            list_models(&mut wizard, search);
            Ok(())
        }
        Command::Colors { model, search } => list_colors(&mut wizard, model, search),
        Command::Publish { draft, pictures } => publish(&mut wizard, api, &draft, pictures).await,
    }
}

fn list_models(wizard: &mut WizardController, search: String) {
    wizard.set_search_term(search);

    for (i, model) in wizard.filtered_models().enumerate() {
        println!("{}. {} (id {})", i + 1, model.label(), model.id);
        if let Some(part_number) = &model.part_number {
            println!("   Part number: {}", part_number);
        }
        let colors: Vec<String> = model
            .colors
            .iter()
            .map(|c| format!("{} [{}] {}", c.id, c.hex_code, c.name))
            .collect();
        println!("   Colors: {}", colors.join(", "));
        println!();
    }
}

fn list_colors(wizard: &mut WizardController, model: i64, search: String) -> Result<()> {
    wizard.select_model_by_id(model)?;
    wizard.show_color_dropdown(true);
    wizard.set_color_search(search);

    println!("{}", wizard.search_term());
    for color in wizard.filtered_colors() {
        println!("   {} [{}] {}", color.id, color.hex_code, color.name);
    }
    Ok(())
}

async fn publish(
    wizard: &mut WizardController,
    api: Arc<ApiClient>,
    draft_path: &Path,
    pictures: Vec<PathBuf>,
) -> Result<()> {
    let draft = Draft::load(draft_path).await?;
    draft.apply(wizard).context("Draft does not fit the wizard")?;
    wizard.attach(pictures.into_iter().map(Attachment::from_path).collect());

    let part_num = wizard.listing().part_num.clone();
    let options = wizard.part_number_options().await?;
    if !options.is_empty() && !options.iter().any(|p| p.value == part_num) {
        warn!("Part number '{}' is not in the known list", part_num);
    }

    while !wizard.step().is_last() {
        let step = wizard.step();
        if !wizard.advance() {
            print_errors(wizard.errors());
            wizard.abandon();
            anyhow::bail!("Step '{}' has invalid fields", step.title());
        }
        info!("✔ {}", step.title());
    }

    let orchestrator = SubmissionOrchestrator::new(api.clone(), api, Arc::new(LogNotifier));
    match orchestrator.submit(wizard).await {
        Ok(receipt) => {
            let created_at = receipt.product.created_at.unwrap_or_else(Utc::now);
            println!(
                "Created product {} at {} with {} picture(s)",
                receipt.product.id,
                created_at.format("%Y-%m-%d %H:%M"),
                receipt.pictures.len()
            );
            for failed in &receipt.failed_pictures {
                println!("   Skipped {}: {}", failed.file_name, failed.reason);
            }
            Ok(())
        }
        Err(SubmissionError::Validation(errors)) => {
            print_errors(&errors);
            anyhow::bail!("Listing is not complete")
        }
        Err(err) => Err(err.into()),
    }
}

fn print_errors(errors: &ValidationErrors) {
    for (field, message) in errors.iter() {
        println!("   {}: {}", field, message);
    }
}
