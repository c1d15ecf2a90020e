// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};

use indicmt::app_config::{Config, LogLevel};
use indicmt::app_controller::{Controller, format_outcome, format_report};
use indicmt::errors::AppError;
use indicmt::language_utils::Language;
use indicmt::translation::TranslationRequest;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

fn parse_language(value: &str) -> Result<Language, String> {
    value.parse::<Language>().map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate or transliterate one text
    Translate(TranslateArgs),

    /// Re-score the translation history and write the evaluation file
    Evaluate {
        /// History CSV to read (default: <data_dir>/historical.csv)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Evaluation CSV to write (default: <out_dir>/eval_results.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translate every row again instead of reusing the logged output
        #[arg(long)]
        retranslate: bool,
    },

    /// Show the corpus summary of the last evaluation
    Report {
        /// Evaluation CSV to read (default: <out_dir>/eval_results.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the model pipeline used for a language pair
    Resolve {
        /// Source language (name or ISO code)
        #[arg(short, long, value_parser = parse_language)]
        source: Language,

        /// Target language (name or ISO code)
        #[arg(short, long, value_parser = parse_language)]
        target: Language,
    },

    /// Generate shell completions for indicmt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: String,

    /// Source language (name or ISO code, e.g. 'English', 'en', 'eng')
    #[arg(short, long, value_parser = parse_language)]
    source: Language,

    /// Target language (name or ISO code, e.g. 'Hindi', 'hi', 'hin')
    #[arg(short, long, value_parser = parse_language)]
    target: Language,

    /// Reference translation used for BLEU, TER and METEOR
    #[arg(short, long)]
    reference: Option<String>,

    /// Treat the input as romanized Hindi or Marathi
    #[arg(long)]
    transliterate: bool,

    /// Also ask Google Translate for comparison
    #[arg(long)]
    compare: bool,

    /// Do not append this translation to the history file
    #[arg(long)]
    no_history: bool,
}

/// indicmt - English, Hindi and Marathi translation with pivoting and evaluation
#[derive(Parser, Debug)]
#[command(name = "indicmt")]
#[command(version)]
#[command(about = "Indic machine translation with pivoting, history and evaluation")]
#[command(long_about = "indicmt translates between English, Hindi and Marathi using pre-trained models,
pivoting through English when a pair has no direct model.

EXAMPLES:
    indicmt translate \"How are you?\" -s en -t hi            # Direct model
    indicmt translate \"Namastey\" -s en -t hi                # Romanized input is transliterated
    indicmt translate \"मी शाळेत जातो\" -s mr -t hi --compare  # Pivot through English
    indicmt evaluate                                         # Score the history file
    indicmt report                                           # Show the last corpus summary
    indicmt resolve -s hi -t mr                              # Show the pipeline for a pair
    indicmt completions bash > indicmt.bash                  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. MT_MODEL_<src>_<tgt> variables override models.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Directory of the history file
    #[arg(long, global = true, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory of the evaluation file
    #[arg(long, global = true, env = "OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Root directory of local fine-tuned models
    #[arg(long, global = true, env = "LOCAL_MODEL_ROOT")]
    local_model_root: Option<PathBuf>,

    /// Token for the inference endpoint
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_api_token: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level.
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
    Ok(())
}

async fn run(cli: CommandLineOptions) -> Result<(), AppError> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "indicmt", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli).map_err(|e| AppError::Config(format!("{:#}", e)))?;
    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Translate(args) => run_translate(&controller, args).await?,
        Commands::Evaluate { history, output, retranslate } => {
            let report = controller.evaluate(history, output, retranslate).await?;
            println!("{}", format_report(&report));
        }
        Commands::Report { output } => {
            println!("{}", controller.report(output)?);
        }
        Commands::Resolve { source, target } => {
            let pipeline = controller.resolve(source, target)?;
            println!("{} -> {}: {}", source, target, pipeline);
        }
        Commands::Completions { .. } => {}
    }
    Ok(())
}

/// Load the config file and apply command line and environment overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(out_dir) = &cli.out_dir {
        config.storage.out_dir = out_dir.clone();
    }
    if let Some(root) = &cli.local_model_root {
        config.models.local_model_root = root.clone();
    }
    if let Some(token) = &cli.hf_api_token {
        config.inference.api_key = token.clone();
    }
    config.apply_env_overrides(std::env::vars());

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());
    info!("History: {:?}", config.storage.history_path());
    Ok(config)
}

async fn run_translate(controller: &Controller, args: TranslateArgs) -> Result<(), AppError> {
    let mut request = TranslationRequest::new(args.source, args.target, args.text)
        .with_transliteration(args.transliterate);
    if let Some(reference) = args.reference {
        request = request.with_reference(reference);
    }

    let outcome = controller.translate(&request, args.compare, !args.no_history).await?;
    println!("{}", format_outcome(&outcome));
    Ok(())
}
