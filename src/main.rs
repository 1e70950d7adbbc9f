mod cli;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use genx_trade_desk::advice::{self, WidgetCopy, WidgetVariant};
use genx_trade_desk::config::Config;
use genx_trade_desk::quote::EmailJsClient;
use genx_trade_desk::server::{self, ProxyState};

use crate::cli::chat::ChatContext;
use crate::cli::quote::QuoteSession;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the trade assistant
    Chat {
        /// Send one message and exit
        #[arg(short, long)]
        input: Option<String>,

        /// Assistant presentation to use
        #[arg(long, value_enum, default_value_t = WidgetVariant::Desk)]
        variant: WidgetVariant,

        /// Route requests through a deployed trade proxy
        #[arg(long)]
        proxy: Option<Url>,
    },
    /// Request a quote from the export team
    Quote {
        /// Catalog id to preselect
        #[arg(short, long)]
        product: Option<String>,
    },
    /// Serve the /api/trade proxy
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value_t = 8787)]
        port: u16,
    },
    /// List the product catalog
    Catalog,
}

fn widget_copy(config: &Config, variant: WidgetVariant) -> Result<WidgetCopy> {
    let mut copy = WidgetCopy::new(variant, &config.contact_email);
    if let Some(path) = &config.copy_overrides {
        copy.fallbacks.load_overrides(path)?;
    }
    Ok(copy)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Chat {
        input: None,
        variant: WidgetVariant::Desk,
        proxy: None,
    }) {
        Commands::Chat {
            input,
            variant,
            proxy,
        } => {
            info!("Starting GenX Trade Desk chat");
            if proxy.is_some() {
                config.proxy_url = proxy;
            }
            let advice = advice::build_service(&config)?;
            let copy = widget_copy(&config, variant)?;
            let interactive = input.is_none();
            let mut chat_context =
                ChatContext::new(Box::new(io::stdout()), input, interactive, copy, advice)?;
            chat_context.run().await
        }
        Commands::Quote { product } => {
            let delivery = Arc::new(EmailJsClient::from_config(&config)?);
            let mut session = QuoteSession::new(&config.contact_email, delivery, product.as_deref());
            session.run().await
        }
        Commands::Serve { host, port } => {
            // The proxy always talks to the model directly.
            config.proxy_url = None;
            let advice = advice::build_service(&config)?;
            let copy = widget_copy(&config, WidgetVariant::Desk)?;
            let listener = server::bind(&host, port).await?;
            server::serve(
                ProxyState::new(advice, copy.fallbacks, config.contact_email.clone()),
                listener,
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Catalog => {
            cli::catalog::print_catalog(&mut io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
