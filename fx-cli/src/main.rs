//! FX CLI
//!
//! Command-line interface for the currency conversion API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use fx_client::FxClient;
use fx_types::CurrencyCode;

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "Currency conversion API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the conversion API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Locale for the formatted amount (sent as Accept-Language)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the source currency
        amount: f64,
        /// Source currency code (e.g. USD)
        from: String,
        /// Target currency code (e.g. EUR)
        to: String,
        /// Log in as this user and use the CSRF-protected route
        #[arg(long)]
        user: Option<String>,
    },
}

fn parse_currency(s: &str) -> Result<CurrencyCode> {
    CurrencyCode::parse(s).map_err(|e| anyhow::anyhow!("{s}: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = FxClient::new(&cli.api_url)?;
    if let Some(locale) = cli.locale {
        client = client.with_locale(locale);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Convert {
            amount,
            from,
            to,
            user,
        } => {
            let from = parse_currency(&from)?;
            let to = parse_currency(&to)?;
            let result = match user {
                Some(user) => {
                    client.login(&user).await?;
                    let result = client
                        .convert_authenticated(amount, from.as_str(), to.as_str())
                        .await;
                    client.logout().await?;
                    result?
                }
                None => client.convert(amount, from.as_str(), to.as_str()).await?,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
