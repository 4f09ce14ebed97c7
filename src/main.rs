// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chapterpress::app_config::{self, Config};
use chapterpress::database::{DatabaseConnection, ProjectBundle, Repository};
use chapterpress::errors::AppError;
use chapterpress::export::{ExportFormat, ExportRequest, ExportService};
use chapterpress::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a project as a merged PDF (A) or a DOCX document (B)
    Export(ExportArgs),

    /// Import a project with its chapters, references and assets from JSON
    Import {
        /// Project file to import
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate shell completions for chapterpress
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Project to export
    #[arg(value_name = "PROJECT_ID", required_unless_present = "request")]
    project_id: Option<String>,

    /// Output format: A (pdf) or B (docx)
    #[arg(short, long, value_parser = parse_format, default_value = "A")]
    format: ExportFormat,

    /// Attachment id to merge before the body, in order (repeatable)
    #[arg(short, long = "doc", value_name = "ID")]
    docs: Vec<String>,

    /// Generate and include the abstract
    #[arg(long = "abstract")]
    include_abstract: bool,

    /// Include the table of contents
    #[arg(long = "toc")]
    include_toc: bool,

    /// Stamp page numbers on the rendered body
    #[arg(long = "page-numbers")]
    include_page_numbers: bool,

    /// Requesting user, for logging
    #[arg(short, long)]
    user: Option<String>,

    /// Read the whole request from a JSON file instead
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["project_id", "docs"])]
    request: Option<PathBuf>,
}

impl ExportArgs {
    fn into_request(self) -> Result<ExportRequest, AppError> {
        if let Some(path) = &self.request {
            return Ok(FileManager::read_json(path)?);
        }

        let project_id = self
            .project_id
            .ok_or_else(|| anyhow!("PROJECT_ID is required without --request"))?;
        let mut request = ExportRequest::new(project_id, self.format);
        request.user_id = self.user;
        request.ordered_doc_ids = self.docs;
        request.options.include_abstract = self.include_abstract;
        request.options.include_toc = self.include_toc;
        request.options.include_page_numbers = self.include_page_numbers;
        Ok(request)
    }
}

/// chapterpress - academic report export engine
///
/// Renders a stored report project as a merged PDF with attachments or as a
/// sectioned DOCX document, and uploads the result to object storage.
#[derive(Parser, Debug)]
#[command(name = "chapterpress")]
#[command(version)]
#[command(about = "Academic report export engine")]
#[command(long_about = "chapterpress renders stored report projects to PDF or DOCX and uploads them.

EXAMPLES:
    chapterpress import project.json                      # Load a project into the store
    chapterpress export p-42                              # Format A with default sections
    chapterpress export p-42 -f B --abstract --toc        # DOCX with abstract and contents
    chapterpress export p-42 -d form -d letter --page-numbers
    chapterpress export --request request.json            # Request body read from a file
    chapterpress completions bash > chapterpress.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in chapterpress.json by default. You can specify a
    different file with --config. If the file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "chapterpress.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: Color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Trace).map_err(|e| AppError::Unknown(e.to_string()))?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "chapterpress", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    config.validate().context("Configuration validation failed")?;

    let repository = open_repository(&config)?;

    match cli.command {
        Commands::Export(args) => run_export(config, repository, args).await,
        Commands::Import { file } => run_import(repository, file).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn open_repository(config: &Config) -> Result<Repository, AppError> {
    let connection = match &config.database.path {
        Some(path) => DatabaseConnection::new(path)?,
        None => DatabaseConnection::new_default()?,
    };
    info!("Using project store at {:?}", connection.path());
    Ok(Repository::new(connection))
}

async fn run_import(repository: Repository, file: PathBuf) -> Result<(), AppError> {
    let bundle: ProjectBundle = FileManager::read_json(&file)?;
    let project_id = bundle.project.id.clone();

    if bundle.chapters.is_empty() {
        warn!("Project {} has no chapters", project_id);
    }

    repository.import_project(bundle).await?;
    info!("Imported project {}", project_id);
    info!("{}", repository.connection().stats()?);
    Ok(())
}

async fn run_export(config: Config, repository: Repository, args: ExportArgs) -> Result<(), AppError> {
    let request = args.into_request()?;
    let service = ExportService::from_config(&config, Arc::new(repository));

    let response = service.export(&request).await;
    let body = serde_json::to_string_pretty(&response).map_err(|e| AppError::Unknown(e.to_string()))?;
    println!("{}", body);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
