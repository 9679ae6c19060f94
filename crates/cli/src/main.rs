//! Bazaar CLI - the commerce API from a terminal.
//!
//! # Usage
//!
//! ```bash
//! export BAZAAR_API_URL=http://127.0.0.1:8000/api/
//!
//! bazaar login -e ann@example.com -p hunter22
//! bazaar products
//! bazaar add-to-cart 5 -q 2
//! bazaar buy 5
//! bazaar logout
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_API_URL` - Remote API base URL
//! - `BAZAAR_SESSION_FILE` - Where the session is stored
//! - `BAZAAR_PASSWORD` - Password for `login` when `-p` is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use bazaar_core::{CartItemId, ProductId};
use bazaar_storefront::api::ApiClient;
use bazaar_storefront::config::ApiConfig;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use url::Url;

mod commands;
mod store;

use commands::{CliError, Context};
use store::FileSessionStore;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar command-line client")]
struct Cli {
    /// Remote API base URL
    #[arg(long, env = "BAZAAR_API_URL", global = true, default_value = "http://127.0.0.1:8000/api/")]
    api_url: Url,

    /// Session file path
    #[arg(long, env = "BAZAAR_SESSION_FILE", global = true, default_value = ".bazaar/session.json")]
    session_file: PathBuf,

    /// Request timeout in seconds
    #[arg(long, env = "BAZAAR_API_TIMEOUT_SECS", global = true, default_value_t = 15)]
    timeout_secs: u64,

    /// Symbol printed before prices
    #[arg(long, env = "STOREFRONT_CURRENCY_SYMBOL", global = true, default_value = "₹")]
    currency_symbol: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List products, or show one
    Products {
        #[arg(long)]
        id: Option<ProductId>,
    },
    /// List categories
    Categories,
    /// List your orders
    Orders,
    /// Show the cart
    Cart,
    /// Remove a cart line
    CartRemove { id: CartItemId },
    /// Add a product to the cart
    AddToCart {
        product: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Order and pay for a product
    Buy {
        product: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Delete one of your products (sellers)
    DeleteProduct { id: ProductId },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Dropping the command future on Ctrl+C abandons its in-flight request
    let result = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    };

    match result {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if writeln!(stdout, "{output}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let api_config = ApiConfig::new(cli.api_url)
        .with_timeout(std::time::Duration::from_secs(cli.timeout_secs));
    let ctx = Context {
        api: ApiClient::new(&api_config)?,
        store: FileSessionStore::new(cli.session_file),
        currency_symbol: cli.currency_symbol,
    };

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, SecretString::from(password)).await
        }
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Products { id } => commands::catalog::products(&ctx, id).await,
        Commands::Categories => commands::catalog::categories(&ctx).await,
        Commands::Orders => commands::orders::orders(&ctx).await,
        Commands::Cart => commands::orders::cart(&ctx).await,
        Commands::CartRemove { id } => commands::orders::cart_remove(&ctx, id).await,
        Commands::AddToCart { product, quantity } => {
            let quantity = commands::orders::quantity(quantity)?;
            commands::orders::add_to_cart(&ctx, product, quantity).await
        }
        Commands::Buy { product, quantity } => {
            let quantity = commands::orders::quantity(quantity)?;
            commands::orders::buy(&ctx, product, quantity).await
        }
        Commands::DeleteProduct { id } => commands::catalog::delete_product(&ctx, id).await,
    }
}
