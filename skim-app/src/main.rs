use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use skim_common::SkimError;
use skim_common::observability::{LogConfig, init_logging};
use skim_config::{SkimConfig, SkimConfigLoader};
use skim_drivers::skim_browser::driver::SkimDriver;
use skim_extract::parse_field_list;
use skim_web::card_session::{CardSession, split_topics};
use skim_web::output::write_csv;
use skim_web::{BrowserProvider, FieldSession, PageProvider};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "skim")]
#[command(about = "Extract loosely labelled fields from paginated web listings")]
struct Cli {
    /// Configuration file (YAML/TOML/JSON); skipped when missing
    #[arg(long, global = true, default_value = "skim.yaml")]
    config: PathBuf,

    /// WebDriver endpoint, overrides `browser.webdriver_url`
    #[arg(long, global = true)]
    webdriver: Option<String>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,

    /// Log encoding: text or json
    #[arg(long = "log-format", global = true)]
    log_format: Option<String>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract free-form fields from a listing, following its pages
    Fields(FieldsArgs),
    /// Collect article cards for one or more search topics
    Cards(CardsArgs),
}

#[derive(Args, Debug)]
struct FieldsArgs {
    /// Listing to start from
    #[arg(long)]
    url: String,

    /// Comma-separated field names, e.g. "title, date, source"; prompted when absent
    #[arg(long)]
    fields: Option<String>,

    /// Page cap, overrides `session.max_pages`
    #[arg(long = "max-pages")]
    max_pages: Option<u32>,

    /// CSV destination (default: `<output.directory>/<output.fields_file>`)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CardsArgs {
    /// Comma-separated topics; prompted when absent
    #[arg(long)]
    topic: Option<String>,
}

fn prompt(question: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{question}")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn load_config(cli: &Cli) -> Result<SkimConfig> {
    let mut cfg = SkimConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .map_err(|e| SkimError::Config(e.to_string()))?;

    if let Some(url) = &cli.webdriver {
        cfg.browser.webdriver_url = url.clone();
    }
    if cli.headless {
        cfg.browser.headless = true;
    }
    if let Some(format) = &cli.log_format {
        cfg.logging.format = format.clone();
    }
    if cli.verbose {
        cfg.logging.emit_stderr = true;
    }
    if let Command::Fields(args) = &cli.command {
        if let Some(n) = args.max_pages {
            cfg.session.max_pages = n;
        }
    }
    Ok(cfg)
}

fn log_config(cfg: &SkimConfig) -> Result<LogConfig> {
    Ok(LogConfig {
        log_dir: cfg.logging.log_dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg
            .logging
            .format
            .parse()
            .map_err(|e: String| SkimError::Config(e))?,
        default_filter: cfg.logging.default_filter.clone(),
        ..LogConfig::default()
    })
}

async fn run_fields(
    cfg: &SkimConfig,
    args: FieldsArgs,
    provider: &mut BrowserProvider,
) -> Result<()> {
    provider
        .navigate(&args.url)
        .await
        .map_err(|e| SkimError::Driver(e.into()))?;
    provider.pause(cfg.session.initial_load_pause()).await;

    let raw = match args.fields {
        Some(raw) => raw,
        None => {
            println!("Page is loaded. Which information should be extracted?");
            println!("Example: title, date, source, description");
            prompt("Fields (comma-separated): ")?
        }
    };
    let fields = parse_field_list(&raw);
    if fields.is_empty() {
        bail!("no field names given");
    }

    let report = FieldSession::new(fields, &cfg.session, &cfg.pagination)
        .run(provider)
        .await;

    let path = args
        .output
        .unwrap_or_else(|| cfg.output.directory.join(&cfg.output.fields_file));
    if write_csv(&report.result, &path)? {
        println!(
            "Saved {} rows from {} pages to {}",
            report.result.len(),
            report.pages,
            path.display()
        );
    } else {
        println!("No data found for the requested fields.");
    }
    Ok(())
}

async fn run_cards(
    cfg: &SkimConfig,
    args: CardsArgs,
    provider: &mut BrowserProvider,
) -> Result<()> {
    let raw = match args.topic {
        Some(raw) => raw,
        None => prompt("Topics to search (comma-separated): ")?,
    };
    let topics = split_topics(&raw);
    if topics.is_empty() {
        bail!("at least one topic is required");
    }

    let outcomes = CardSession::new(&cfg.cards, &cfg.session, &cfg.scroll)
        .run_topics(
            provider,
            &topics,
            &cfg.output.directory,
            &cfg.output.cards_prefix,
        )
        .await;

    for outcome in &outcomes {
        match (&outcome.path, &outcome.error) {
            (Some(path), _) => println!("{}: {} articles saved to {}", outcome.topic, outcome.rows, path.display()),
            (None, Some(err)) => println!("{}: failed ({err})", outcome.topic),
            (None, None) => println!("{}: no articles found", outcome.topic),
        }
    }
    if outcomes.iter().all(|o| o.error.is_some()) {
        bail!("every topic failed");
    }
    Ok(())
}

async fn execute(cli: Cli, cfg: SkimConfig, log_path: PathBuf) -> Result<()> {
    info!(target: "skim.app", log = %log_path.display(), config = %cli.config.display(), "starting");
    for problem in cfg.cards.schema().problems() {
        warn!(target: "skim.app", %problem, "card schema entry will be skipped");
    }

    let driver = SkimDriver::connect(&cfg.browser)
        .await
        .map_err(|e| SkimError::Setup(format!("{e:#}")))?;
    let mut provider = BrowserProvider::new(driver.page());

    let outcome = match cli.command {
        Command::Fields(args) => run_fields(&cfg, args, &mut provider).await,
        Command::Cards(args) => run_cards(&cfg, args, &mut provider).await,
    };

    if let Err(e) = driver.close().await {
        warn!(target: "skim.app", error = %e, "closing browser session failed");
    }
    outcome
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli)?;
    let log_path = init_logging(log_config(&cfg)?)?;

    let span = info_span!(target: "skim.app", "run", id = %Uuid::new_v4());
    execute(cli, cfg, log_path).instrument(span).await
}

/// 2 when the run could not start at all, 1 for any other failure.
fn failure_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SkimError>() {
        Some(e) if e.is_fatal() => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(failure_code(&e))
        }
    }
}
