//! adsmith is a CLI tool that turns a marketing website into advertising
//! banners.
//!
//! The tool has four commands:
//! 1. `scrape` - Extracts title, description, images and text of a page
//! 2. `layout` - Prints the collage layout for a number of images
//! 3. `run` - Walks every wizard step for a URL and prints the project
//! 4. `serve` - Serves the wizard steps as an HTTP API

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use llm::LLMProvider;
use llm::builder::{LLMBackend, LLMBuilder};
use log::{LevelFilter, info, warn};
use url::Url;

use adsmith::{
    BannerSize, CopyOptions, ImageGenerator, SiteScraper,
    analyze::rate_limiter,
    collage_layout,
    constants::{
        ANALYSIS_API_KEY_ENV_NAME, COPY_API_KEY_ENV_NAME, DEFAULT_FETCH_TIMEOUT_SECS,
        DEFAULT_IMAGE_ENDPOINT, DEFAULT_IMAGE_MODEL, DEFAULT_MAX_IMAGES, IMAGE_API_KEY_ENV_NAME,
        MAX_COPY_CANDIDATES,
    },
    server,
    wizard::Wizard,
};

/// A CLI tool to turn a website into ad banners
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape a page and print the extracted content as JSON
    Scrape {
        /// The page URL to scrape
        url: String,
        /// Maximum number of images to keep
        #[arg(long, default_value_t = DEFAULT_MAX_IMAGES)]
        max_images: usize,
        /// Fetch timeout in seconds
        #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
        timeout: u64,
    },
    /// Print the collage layout for a number of images as JSON
    Layout {
        /// Number of images
        count: usize,
    },
    /// Run every wizard step for a URL and print the project as JSON
    Run {
        /// The website URL
        url: String,
        /// Product category
        #[arg(long)]
        category: Option<String>,
        /// Desired tone of the copies
        #[arg(long)]
        tone: Option<String>,
        /// Product name
        #[arg(long)]
        product_name: Option<String>,
        /// Word no copy may contain (repeatable)
        #[arg(long = "ng-word")]
        ng_words: Vec<String>,
        /// Number of copy candidates
        #[arg(long, default_value_t = MAX_COPY_CANDIDATES)]
        copies: usize,
        /// Banner size: "square" or "vertical"
        #[arg(long, default_value = "square")]
        size: BannerSize,
        /// Number of banners to generate
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[command(flatten)]
        providers: ProviderArgs,
    },
    /// Serve the wizard steps as an HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
        #[command(flatten)]
        providers: ProviderArgs,
    },
}

#[derive(Args)]
struct ProviderArgs {
    /// Vision model for colors and marketing analysis, as backend://model
    /// (e.g. google://gemini-1.5-flash). Demo data is served when absent.
    #[arg(long)]
    analysis_model: Option<String>,
    /// Model for copywriting, as backend://model
    /// (e.g. anthropic://claude-3-5-sonnet-latest). Demo copies are served when absent.
    #[arg(long)]
    copy_model: Option<String>,
    /// Root of the Imagen-style image API
    #[arg(long, default_value = DEFAULT_IMAGE_ENDPOINT)]
    image_endpoint: String,
    /// Image model name
    #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
    image_model: String,
    /// Rate limit for language model calls: requests per minute (default: no limit)
    #[arg(long, short = 'r')]
    rpm: Option<u32>,
    /// Serve demo data for every step
    #[arg(long)]
    demo: bool,
    /// Fetch timeout in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    timeout: u64,
    /// Public root URL of the composition endpoints
    #[arg(long, default_value = "http://localhost:3000")]
    public_url: Url,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Scrape {
            url,
            max_images,
            timeout,
        } => {
            let scraper = SiteScraper::new(Duration::from_secs(timeout), max_images)?;
            let site = scraper.scrape(&url).await?;
            println!("{}", serde_json::to_string_pretty(&site)?);
            Ok(())
        }
        Command::Layout { count } => {
            println!("{}", serde_json::to_string_pretty(&collage_layout(count))?);
            Ok(())
        }
        Command::Run {
            url,
            category,
            tone,
            product_name,
            ng_words,
            copies,
            size,
            count,
            providers,
        } => {
            let wizard = build_wizard(providers)?;
            let options = CopyOptions {
                product_name,
                category,
                tone,
                ng_words,
                count: copies,
            };
            let project = wizard.run(&url, options, size, count).await;
            println!("{}", serde_json::to_string_pretty(&project)?);
            match project.error {
                Some(error) => Err(anyhow::anyhow!(
                    "Wizard failed at {:?}: {}",
                    error.step,
                    error.message
                )),
                None => Ok(()),
            }
        }
        Command::Serve { bind, providers } => {
            let wizard = build_wizard(providers)?;
            server::start(bind, Arc::new(wizard)).await
        }
    }
}

fn build_wizard(args: ProviderArgs) -> Result<Wizard> {
    let timeout = Duration::from_secs(args.timeout);
    let scraper = SiteScraper::new(timeout, DEFAULT_MAX_IMAGES)?;

    let (analysis_model, copy_model, image_generator) = if args.demo {
        info!("Demo mode: every step serves demo data");
        (None, None, None)
    } else {
        let image_generator = match std::env::var(IMAGE_API_KEY_ENV_NAME) {
            Ok(api_key) => Some(ImageGenerator::new(
                reqwest::Client::builder().timeout(timeout * 2).build()?,
                &args.image_endpoint,
                &args.image_model,
                api_key,
            )),
            Err(err) => {
                info!("{err} while reading {IMAGE_API_KEY_ENV_NAME}, backgrounds are placeholders");
                None
            }
        };

        (
            build_model(args.analysis_model.as_deref(), ANALYSIS_API_KEY_ENV_NAME, 0.4)?,
            build_model(args.copy_model.as_deref(), COPY_API_KEY_ENV_NAME, 0.8)?,
            image_generator,
        )
    };

    Ok(Wizard {
        scraper,
        analysis_model,
        copy_model,
        image_generator,
        rate_limiter: rate_limiter(args.rpm),
        demo: args.demo,
        public_url: args.public_url,
    })
}

/// Builds a model from a `backend://model` URL, with the API key read from
/// `key_env_name` when set.
fn build_model(
    model: Option<&str>,
    key_env_name: &str,
    temperature: f32,
) -> Result<Option<Box<dyn LLMProvider>>> {
    let Some(model) = model else {
        return Ok(None);
    };

    let model_url = Url::parse(model).map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(
            [
                model_url
                    .host_str()
                    .context("Specify model name as host URL.")?,
                model_url.username(),
            ]
            .iter()
            .filter(|x| !x.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":"),
        )
        .max_tokens(4096)
        .temperature(temperature);

    let llm_builder = match std::env::var(key_env_name) {
        Ok(model_key) => {
            info!("API key is provided for {model}");
            llm_builder.api_key(model_key)
        }
        Err(err) if model_url.scheme() == "ollama" => {
            info!("{err} while reading {key_env_name}, none needed for ollama");
            llm_builder
        }
        Err(err) => {
            warn!("{err} while reading {key_env_name}, serving demo data instead of {model}");
            return Ok(None);
        }
    };

    let provider = llm_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))?;

    Ok(Some(provider))
}
