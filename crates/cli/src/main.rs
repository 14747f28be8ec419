// Consolidator CLI - collect one column from every sheet of a workbook

mod ai;
mod driver;
mod exit_codes;
mod report;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use consolidator_config::ai::ResolvedAIConfig;
use consolidator_config::settings::Settings;
use consolidator_core::consolidate::ExtractionRules;
use consolidator_core::record::ConsolidationResult;
use consolidator_core::session::{Event, Notice, Session};
use consolidator_insights::{GeminiProvider, InsightError, InsightProvider};

use driver::Driver;
use exit_codes::{insight_exit_code, EXIT_ERROR, EXIT_EXPORT, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

/// Log filter variable; overrides the default `warn` level
const LOG_ENV: &str = "CONSOLIDATOR_LOG";

#[derive(Parser)]
#[command(name = "consolidator")]
#[command(about = "Collect one column from every sheet of a workbook into a single list")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/consolidator/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ExtractArgs {
    /// Column letter(s) to read from every sheet (default from settings: B)
    #[arg(long, short = 'c')]
    column: Option<String>,

    /// First 1-based row to read (default from settings: 4)
    #[arg(long, value_name = "N")]
    start_row: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate a workbook and print the values found
    #[command(after_help = "\
Examples:
  consolidator run vendas.xlsx
  consolidator run vendas.xlsx --column D --start-row 2
  consolidator run vendas.xlsx --json > vendas.json
  consolidator run vendas.xlsx --export out/ --insights")]
    Run {
        /// Workbook to read (.xlsx, .xls, .xlsb, .ods)
        file: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Records shown in the table (default from settings: 50)
        #[arg(long, value_name = "N")]
        preview: Option<usize>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Also write Consolidado_<file> (into DIR, or next to the input)
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,

        /// Also write the records as CSV
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Also ask the AI provider for a summary of the values
        #[arg(long)]
        insights: bool,
    },

    /// Consolidate a workbook and write Consolidado_<file>
    Export {
        /// Workbook to read
        file: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Output directory (default: next to the input)
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the export summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Consolidate a workbook and ask the AI provider for insights
    Insights {
        /// Workbook to read
        file: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Print the insights as JSON
        #[arg(long)]
        json: bool,
    },

    /// AI provider diagnostics and credentials
    Ai {
        #[command(subcommand)]
        command: AiCommands,
    },

    /// Show settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Show the resolved AI configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store the provider API key in the system keychain
    SetKey {
        key: String,
    },
    /// Remove the provider API key from the system keychain
    ClearKey,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings
    Show {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
    /// Print the settings file path
    Path,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nexport:  Consolidado_<file>, sheet Consolidado",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let settings = Settings::load_from(&config_path);

    let result = match cli.command {
        Commands::Run { file, extract, preview, json, export, csv, insights } => {
            cmd_run(&settings, file, extract, RunOptions { preview, json, export, csv, insights })
        }
        Commands::Export { file, extract, output, json } => cmd_export(&settings, file, extract, output, json),
        Commands::Insights { file, extract, json } => cmd_insights(&settings, file, extract, json),
        Commands::Ai { command } => match command {
            AiCommands::Doctor { json } => ai::cmd_ai_doctor(&settings, &config_path, json),
            AiCommands::SetKey { key } => ai::cmd_ai_set_key(&settings, &key),
            AiCommands::ClearKey => ai::cmd_ai_clear_key(&settings),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => cmd_config_show(&settings, &config_path, json),
            ConfigCommands::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(
            "warn,consolidator=debug,consolidator_core=debug,consolidator_io=debug,\
consolidator_config=debug,consolidator_insights=debug",
        )
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EXPORT, message: msg.into(), hint: None }
    }

    pub fn insight(err: &InsightError) -> Self {
        let hint = match err {
            InsightError::MissingKey => Some(format!(
                "set {} or run `consolidator ai set-key`",
                consolidator_config::ai::env_var_name("gemini")
            )),
            InsightError::Disabled => Some("set ai.provider to \"gemini\" in settings.json".to_string()),
            InsightError::EmptyDataset => None,
            other => Some(other.to_string()),
        };
        let message = match err {
            InsightError::EmptyDataset => "no consolidated values to analyze".to_string(),
            InsightError::MalformedResponse(_) => Notice::InsightsUnavailable { malformed: true }.message(),
            _ => Notice::InsightsUnavailable { malformed: false }.message(),
        };
        Self { code: insight_exit_code(err), message, hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Map the notice a failed session step left behind to a CLI error.
fn notice_error(notice: &Notice, driver: &Driver) -> CliError {
    match notice {
        Notice::InvalidColumn(_) => {
            CliError::args(notice.message()).with_hint("columns are letters only, e.g. B or AA; rows start at 1")
        }
        Notice::ProcessingFailed => {
            let err = CliError::parse(notice.message());
            if driver.input().exists() {
                err.with_hint("run with -v for the underlying cause")
            } else {
                err.with_hint(format!("no such file: {}", driver.input().display()))
            }
        }
        Notice::ExportFailed => CliError::export(notice.message()).with_hint("run with -v for the underlying cause"),
        Notice::InsightsUnavailable { malformed } => match &driver.insight_error {
            Some(err) => CliError::insight(err),
            None => CliError::insight(&if *malformed {
                InsightError::MalformedResponse(String::new())
            } else {
                InsightError::Network(String::new())
            }),
        },
    }
}

fn insight_provider(settings: &Settings) -> Result<Box<dyn InsightProvider>, InsightError> {
    let config = ResolvedAIConfig::from_settings(&settings.ai);
    GeminiProvider::from_config(&config).map(|p| Box::new(p) as Box<dyn InsightProvider>)
}

/// Select the file and run consolidation; any notice is fatal here.
fn consolidate_file(driver: &mut Driver, rules: ExtractionRules) -> Result<Session, CliError> {
    let name = driver.file_name();
    let session = driver.dispatch(Session::new(rules), Event::FileSelected { name });
    if let Some(notice) = &session.notice {
        return Err(notice_error(notice, driver));
    }
    Ok(session)
}

fn current_result(session: &Session) -> Result<&ConsolidationResult, CliError> {
    session
        .result
        .as_ref()
        .ok_or_else(|| CliError::io("consolidation produced no result"))
}

fn keep_first(slot: &mut Option<CliError>, err: CliError) {
    if slot.is_none() {
        *slot = Some(err);
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::io(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// ============================================================================
// run
// ============================================================================

struct RunOptions {
    preview: Option<usize>,
    json: bool,
    export: Option<Option<PathBuf>>,
    csv: Option<PathBuf>,
    insights: bool,
}

fn cmd_run(settings: &Settings, file: PathBuf, extract: ExtractArgs, opts: RunOptions) -> Result<(), CliError> {
    let rules = settings.rules(extract.column.as_deref(), extract.start_row);

    let mut driver = Driver::new(file);
    if let Some(Some(dir)) = &opts.export {
        driver = driver.with_export_dir(dir.clone());
    }
    if opts.insights {
        driver = driver.with_insights(insight_provider(settings), settings.ai.sample_limit);
    }

    let mut session = consolidate_file(&mut driver, rules.clone())?;

    // Later failures are reported after the result is printed
    let mut failure: Option<CliError> = None;

    if opts.export.is_some() {
        session = driver.dispatch(session, Event::ExportRequested);
        if let Some(notice) = session.notice.take() {
            keep_first(&mut failure, notice_error(&notice, &driver));
        }
    }

    if let Some(csv_path) = &opts.csv {
        let records = &current_result(&session)?.data;
        if let Err(e) = consolidator_io::csv::export(records, csv_path) {
            log::warn!("csv export failed: {}", e);
            keep_first(&mut failure, CliError::export(Notice::ExportFailed.message()).with_hint(e.to_string()));
        }
    }

    if opts.insights {
        if session.can_analyze() {
            session = driver.dispatch(session, Event::AnalysisRequested);
            if let Some(notice) = session.notice.take() {
                keep_first(&mut failure, notice_error(&notice, &driver));
            }
        } else {
            eprintln!("No values to analyze; skipping insights");
        }
    }

    let result = current_result(&session)?;
    if opts.json {
        print_json(&report::result_json(result, session.analysis.as_ref(), driver.exported.as_ref()))?;
    } else {
        let preview = opts.preview.unwrap_or(settings.display.preview_rows);
        print!("{}", report::render_result(result, &rules, preview));
        if let Some(exported) = &driver.exported {
            println!("\nExported: {}", exported.summary());
        }
        if let Some(csv_path) = &opts.csv {
            if failure.is_none() {
                println!("CSV: {}", csv_path.display());
            }
        }
        if let Some(analysis) = &session.analysis {
            println!();
            print!("{}", report::render_insights(analysis));
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ============================================================================
// export
// ============================================================================

fn cmd_export(
    settings: &Settings,
    file: PathBuf,
    extract: ExtractArgs,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let rules = settings.rules(extract.column.as_deref(), extract.start_row);

    let mut driver = Driver::new(file);
    if let Some(dir) = output {
        driver = driver.with_export_dir(dir);
    }

    let session = consolidate_file(&mut driver, rules)?;
    let session = driver.dispatch(session, Event::ExportRequested);
    if let Some(notice) = &session.notice {
        return Err(notice_error(notice, &driver));
    }

    let exported = driver
        .exported
        .as_ref()
        .ok_or_else(|| CliError::export("export produced no file"))?;

    if json {
        print_json(&serde_json::json!({
            "path": exported.path.to_string_lossy(),
            "fileName": exported.file_name(),
            "rows": exported.rows_exported,
            "durationMs": exported.export_duration_ms as u64,
        }))
    } else {
        println!("{}", exported.summary());
        Ok(())
    }
}

// ============================================================================
// insights
// ============================================================================

fn cmd_insights(settings: &Settings, file: PathBuf, extract: ExtractArgs, json: bool) -> Result<(), CliError> {
    let rules = settings.rules(extract.column.as_deref(), extract.start_row);

    let mut driver = Driver::new(file).with_insights(insight_provider(settings), settings.ai.sample_limit);
    let session = consolidate_file(&mut driver, rules)?;

    if !session.can_analyze() {
        return Err(CliError::insight(&InsightError::EmptyDataset));
    }

    let session = driver.dispatch(session, Event::AnalysisRequested);
    if let Some(notice) = &session.notice {
        return Err(notice_error(notice, &driver));
    }

    let analysis = session
        .analysis
        .as_ref()
        .ok_or_else(|| CliError::io("insight request produced no result"))?;

    if json {
        print_json(analysis)
    } else {
        print!("{}", report::render_insights(analysis));
        Ok(())
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_show(settings: &Settings, path: &Path, json: bool) -> Result<(), CliError> {
    if !json {
        let state = if path.exists() { "" } else { " (not found, using defaults)" };
        println!("# {}{}", path.display(), state);
    }
    print_json(settings)
}
