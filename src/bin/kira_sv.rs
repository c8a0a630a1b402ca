use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_study_viewer::config::{ConfigLoader, SourceSpec};
use kira_study_viewer::diagnostics::TracingSink;
use kira_study_viewer::error::KiraError;
use kira_study_viewer::loader::{StudySource, source_for};
use kira_study_viewer::locale::NumberLocale;
use kira_study_viewer::output::{HtmlOutput, JsonOutput, OutputMode};
use kira_study_viewer::tui::{Tui, TuiSink};
use kira_study_viewer::view::StudyViewer;

#[derive(Parser)]
#[command(name = "kira-sv")]
#[command(about = "Study metadata viewer: sample, sequencing and taxa cards with NCBI links")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    /// URL or file path of study_metadata.json
    #[arg(long, global = true)]
    source: Option<String>,

    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    locale: Option<NumberLocale>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Write the study cards as a static HTML page")]
    Export(ExportArgs),
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long)]
    out: Utf8PathBuf,

    /// Taxon group to show expanded
    #[arg(long)]
    expand: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::ConfigRead(_) | KiraError::ConfigParse(_) | KiraError::InvalidSource(_) => 2,
        _ => 1,
    }
}

fn init_tracing(log_pane: Option<TuiSink>) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false);
    match log_pane {
        // stderr would draw over the alternate screen
        Some(sink) => builder
            .with_ansi(false)
            .without_time()
            .with_writer(sink)
            .init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let output_mode = if cli.non_interactive || cli.command.is_some() {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };
    let log_pane = (output_mode == OutputMode::Interactive).then(TuiSink::new);
    init_tracing(log_pane.clone());

    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;
    let spec = match cli.source.as_deref() {
        Some(value) => value.parse::<SourceSpec>()?,
        None => resolved.source,
    };
    let locale = cli.locale.unwrap_or(resolved.locale);
    tracing::debug!(source = %spec.describe(), %locale, "resolved study source");
    let source = source_for(&spec)?;

    match cli.command {
        Some(Commands::Export(args)) => run_export(args, source, locale),
        None => match output_mode {
            OutputMode::NonInteractive => run_print(source, locale),
            OutputMode::Interactive => {
                let mut tui = Tui::with_sink(locale, log_pane.unwrap_or_default());
                tui.run(source)
            }
        },
    }
}

fn run_print(source: Box<dyn StudySource>, locale: NumberLocale) -> miette::Result<()> {
    let mut viewer = StudyViewer::mount(source, TracingSink);
    viewer.wait();
    JsonOutput::print_fragments(&viewer.render(locale)).into_diagnostic()?;
    Ok(())
}

fn run_export(
    args: ExportArgs,
    source: Box<dyn StudySource>,
    locale: NumberLocale,
) -> miette::Result<()> {
    let mut viewer = StudyViewer::mount(source, TracingSink);
    viewer.wait();
    if let Some(name) = args.expand.as_deref() {
        if !viewer.toggle_group(name) {
            tracing::warn!(group = name, "no such taxon group; exporting collapsed");
        }
    }
    HtmlOutput::write(&args.out, &viewer.render(locale))?;
    println!("wrote {}", args.out);
    Ok(())
}
