// SPDX-License-Identifier: MIT OR Apache-2.0
//! `prompt-math` - command line driver for prompt math expressions
//!
//! Parses expressions, evaluates them against a token vector library and
//! tabulates scheduled token weights over sampling progress. Every command
//! prints a JSON document on stdout; logs go to stderr.
//!
//! ## Configuration
//!
//! `--config <FILE>` points at a RON settings file (see
//! [`config::PromptMathSettings`]). `RUST_LOG` overrides its `log_filter`.

mod commands;
mod config;
mod error;
mod library;
mod payload;

use clap::{Args, Parser, Subcommand, ValueHint};
use config::PromptMathSettings;
use error::CliError;
use library::TokenLibrary;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Upper bound for `weights --steps`
const MAX_STEPS: i64 = 100_000;

#[derive(Parser)]
#[command(
    name = "prompt-math",
    version,
    about = "Evaluate bracketed prompt math expressions and their token schedules"
)]
struct Cli {
    /// RON settings file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Encoder passed to token lookups, overriding the settings file
    #[arg(long, global = true)]
    encoder: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an expression and print its tree
    Parse {
        /// Expression, e.g. "[[ [king] - [man] + [woman] ]]"
        expression: String,
    },

    /// Evaluate an expression and print the vector and its schedules
    Eval(EvalArgs),

    /// Evaluate an expression and print token weights per sampling step
    Weights {
        #[command(flatten)]
        eval: EvalArgs,

        /// Number of steps; the table has one extra row for the end point
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=MAX_STEPS))]
        steps: u32,
    },

    /// List schedule functions and example expressions
    Functions,

    /// Print the effective settings as RON
    Config {
        /// Also write them to this file
        #[arg(long, value_hint = ValueHint::FilePath)]
        write: Option<PathBuf>,
    },
}

#[derive(Args)]
struct EvalArgs {
    /// Expression to evaluate
    expression: String,

    /// Token library, a JSON or RON map of token to vector
    #[arg(long, value_hint = ValueHint::FilePath)]
    library: PathBuf,

    /// Library entry used for unresolved tokens
    #[arg(long)]
    pad_token: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Log a failure once on stderr
fn report(err: &CliError) {
    // Settings errors arrive before logging is configured
    if tracing::dispatcher::has_been_set() || init_tracing(config::DEFAULT_LOG_FILTER).is_ok() {
        tracing::error!(kind = ?err.kind(), "{err}");
    } else {
        eprintln!("error: {err}");
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let mut settings = PromptMathSettings::load_or_default(cli.config.as_deref())?;
    if let Some(encoder) = cli.encoder {
        settings.encoder = encoder;
    }
    init_tracing(&settings.log_filter)?;
    tracing::debug!(?settings, "loaded settings");

    match cli.command {
        Command::Parse { expression } => commands::parse_command(&expression),
        Command::Eval(args) => {
            let library = prepare(&args, &mut settings)?;
            commands::eval_command(&args.expression, &library, &settings)
        }
        Command::Weights { eval, steps } => {
            let library = prepare(&eval, &mut settings)?;
            commands::weights_command(&eval.expression, &library, &settings, steps)
        }
        Command::Functions => commands::functions_command(),
        Command::Config { write } => {
            if let Some(path) = write {
                settings.save(&path)?;
                tracing::info!(path = %path.display(), "wrote settings");
            }
            settings.to_ron()
        }
    }
}

fn prepare(args: &EvalArgs, settings: &mut PromptMathSettings) -> Result<TokenLibrary, CliError> {
    if args.pad_token.is_some() {
        settings.pad_token.clone_from(&args.pad_token);
    }
    TokenLibrary::load(&args.library)
}

fn init_tracing(default_filter: &str) -> Result<(), CliError> {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(default_filter)
            .map_err(|err| CliError::LogFilter(err.to_string()))?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| CliError::LogFilter(err.to_string()))
}
