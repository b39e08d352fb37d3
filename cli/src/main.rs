mod local;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Pantry CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping a running server
    Ping {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
    /// Generate a recipe locally with the configured providers
    Generate {
        /// Ingredients on hand, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ingredients: Vec<String>,
        /// Extra dollars available for shopping
        #[arg(long, default_value_t = 0.0)]
        budget: f64,
        /// Minutes available to cook
        #[arg(long, default_value_t = 0)]
        time: u32,
        #[arg(long, default_value_t = 0)]
        serves: u32,
        #[arg(long, default_value = "dinner")]
        meal_type: String,
    },
    /// Turn a photo of a dish into a recipe
    Scan {
        /// Path to the photo
        path: PathBuf,
    },
    /// Estimate nutrition facts for a recipe text
    Nutrition { recipe_text: String },
    /// Estimate the cost of a shopping list
    Estimate {
        /// Items to buy, comma separated
        #[arg(value_delimiter = ',', required = true)]
        items: Vec<String>,
    },
}

#[derive(Deserialize)]
struct PingResponse {
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ping { server } => {
            ping(&server).await?;
        }
        Commands::Generate {
            ingredients,
            budget,
            time,
            serves,
            meal_type,
        } => {
            let request = pantry_core::RecipeRequest {
                owner_id: local::LOCAL_OWNER.to_string(),
                ingredients,
                budget,
                time_minutes: time,
                serves,
                meal_type,
            };
            let recipe = local::service()?.create_recipe(&request).await?;
            print_json(&recipe)?;
        }
        Commands::Scan { path } => {
            let data = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("photo");
            let scanned = local::service()?
                .scan_and_save(file_name, &data, None)
                .await?;
            print_json(&scanned.recipe)?;
        }
        Commands::Nutrition { recipe_text } => {
            let facts = local::service()?.nutrition_facts(&recipe_text).await?;
            print_json(&facts)?;
        }
        Commands::Estimate { items } => {
            let estimate = local::service()?.estimate_cost(&items).await?;
            print_json(&estimate)?;
        }
    }

    Ok(())
}

async fn ping(server: &str) -> Result<()> {
    let url = format!("{}/api/test/ping", server.trim_end_matches('/'));
    let response: PingResponse = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()?
        .json()
        .await?;

    println!("{}", response.message);

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
