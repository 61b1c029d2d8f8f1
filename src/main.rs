use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use leadtv::controller::Controller;
use leadtv::domain::{CSVSeparator, LeadConfig, LeadError};
use leadtv::model::{Model, Status};
use leadtv::ui::LeadUI;

#[derive(Parser, Debug)]
#[command(version, about = "A tui based lead records viewer.")]
struct Cli {
    /// Path to the lead data set (a JSON array of flat objects)
    #[arg(default_value = "leads_data.json")]
    data: String,

    /// Cards per page
    #[arg(long, default_value_t = 24)]
    page_size: usize,

    /// Use semicolons instead of commas in CSV exports
    #[arg(long)]
    semicolon: bool,

    /// Prefix CSV exports with a UTF-8 BOM for spreadsheet compatibility
    #[arg(long)]
    bom: bool,

    /// Write logs to this file (filtered via LEADTV_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), LeadError> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let separator = if cli.semicolon {
        CSVSeparator::Semicolon
    } else {
        CSVSeparator::Comma
    };
    let config = LeadConfig::default()
        .page_size(cli.page_size)
        .separator(separator)
        .bom(cli.bom);

    let data_path = shellexpand::full(&cli.data)
        .map(|p| PathBuf::from(p.as_ref()))
        .unwrap_or_else(|_| PathBuf::from(&cli.data));
    info!("Starting leadtv with {}", data_path.display());

    let mut model = Model::init(&config);
    model.load_data_file(&data_path);

    let ui = LeadUI::new();
    let controller = Controller::new(&config);
    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&mut model, f))?;

        // Handle events and map them to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        }

        // Background work: ingestion batches, debounced search, preloading
        model.tick();
    }

    Ok(())
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<(), LeadError> {
    let filter = EnvFilter::try_from_env("LEADTV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file)
                        .with_ansi(false),
                )
                .with(ErrorLayer::default())
                .init();
        }
        None => {
            // No sink: keep the terminal clean for the TUI.
            tracing_subscriber::registry()
                .with(filter)
                .with(ErrorLayer::default())
                .init();
        }
    }
    Ok(())
}
