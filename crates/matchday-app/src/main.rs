//! Matchday - match reads from pasted football context
//!
//! M A T C H D A Y
//!
//! A terminal form that sends free-form match notes to the analyze
//! function and renders the structured read it gets back. The same binary
//! also serves the function itself.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use matchday_adapters::config::{Config, PromptVariant};
use matchday_adapters::transport::HttpTransport;
use matchday_core::render::RenderedResult;
use matchday_ui::AnalyzeController;
use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MATCHDAY_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "matchday",
    about = "Football match analysis from pasted context",
    long_about = "M A T C H D A Y\n\n\
                  Paste line-ups, form and news; get back a temperature,\n\
                  intensity, triggers and the likeliest scorelines.",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive form (the default)
    Tui {
        /// Analyze function URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Seconds to wait between submissions
        #[arg(long)]
        cooldown: Option<u64>,
    },

    /// Serve the analyze function over HTTP
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,

        /// Prompt variant: json or schema
        #[arg(long)]
        variant: Option<PromptVariant>,

        /// Model id sent to the provider
        #[arg(long)]
        model: Option<String>,
    },

    /// Analyze once and print the result
    Analyze {
        /// Match context, or `-` to read stdin
        text: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Analyze function URL
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Tui {
        endpoint: None,
        cooldown: None,
    });

    match command {
        Command::Tui { endpoint, cooldown } => {
            let log_path = init_file_logging();
            let mut config = Config::load();
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            if let Some(secs) = cooldown {
                config.cooldown_secs = secs;
            }
            matchday_ui::run_tui(&config).await?;
            if let Some(path) = log_path {
                tracing::info!(path = %path.display(), "session ended");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve {
            bind,
            variant,
            model,
        } => {
            init_stderr_logging("info");
            let mut config = Config::load();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(variant) = variant {
                config.prompt_variant = variant;
            }
            if let Some(model) = model {
                config.model = model;
            }
            matchday_engine::server::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze {
            text,
            format,
            endpoint,
        } => {
            init_stderr_logging("warn");
            let mut config = Config::load();
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            analyze_once(&config, text, format).await
        }
        Command::Config { init } => {
            init_stderr_logging("warn");
            show_config(init)
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_stderr_logging(default: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Route TUI logs to `<cache>/matchday/matchday.log`; the alternate screen
/// owns stdout and stderr while the form is up.
fn init_file_logging() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("matchday");
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("matchday.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Some(path)
}

fn read_input(text: Option<String>) -> Result<String> {
    match text {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read match context from stdin")?;
            Ok(buf)
        }
    }
}

async fn analyze_once(
    config: &Config,
    text: Option<String>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let input = read_input(text)?;
    let transport = HttpTransport::new(config.endpoint.clone())?;
    let mut controller = AnalyzeController::new(Arc::new(transport), config.cooldown());

    match controller.submit(&input).await {
        Some(Ok(())) => {
            let Some(last) = controller.last_result() else {
                eprintln!("  ! No result was recorded.");
                return Ok(ExitCode::FAILURE);
            };
            match format {
                OutputFormat::Text => print!("{}", format_text(&last.rendered)),
                OutputFormat::Html => print!("{}", last.rendered.to_html()),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&last.rendered)?)
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Err(failure)) => {
            eprintln!("  ! {}", failure.error);
            if let Some(debug) = failure.debug {
                eprintln!();
                eprintln!("{}", debug);
            }
            Ok(ExitCode::FAILURE)
        }
        None => {
            eprintln!("  ! The submission was not sent.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn format_text(rendered: &RenderedResult) -> String {
    const BAR_WIDTH: usize = 10;
    let filled = ((rendered.fill_ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let bar = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);
    let triggers = rendered.triggers.join(" | ");

    let mut out = String::new();
    out.push_str(&format!("Temperature  {}\n", rendered.temperature_text));
    out.push_str(&format!("Intensity    {}  {}\n", rendered.intensity_text, bar));
    out.push_str(&format!("Triggers     {}\n", triggers));
    out.push_str(&format!("Scenario     {}\n", rendered.scenario_text));
    out.push_str(&format!("Factors      {}\n", rendered.factors_text));
    out.push_str("Outcomes\n");
    for card in &rendered.outcomes {
        match &card.tag {
            Some(tag) => out.push_str(&format!("  ● {}  [{}]\n", card.score, tag)),
            None => out.push_str(&format!("  ● {}\n", card.score)),
        }
        if let Some(why) = &card.why {
            out.push_str(&format!("    {}\n", why));
        }
    }
    out.push_str(&format!("Confidence   {}\n", rendered.confidence_text));
    out
}

fn show_config(init: bool) -> Result<ExitCode> {
    let config = Config::load();
    if init {
        config.save().map_err(|e| anyhow::anyhow!("{}", e))?;
        eprintln!("  + Wrote {}", Config::config_location());
    } else {
        eprintln!("  {}", Config::config_location());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    if Config::api_key().is_none() {
        eprintln!("  ! OPENAI_API_KEY is not set; `matchday serve` will answer with an error.");
    }
    Ok(ExitCode::SUCCESS)
}
