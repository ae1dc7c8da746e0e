use clap::{Parser, Subcommand};
use lead_scout::api::{FetchError, HttpBackend};
use lead_scout::config::{parse_page_size, ConfigError};
use lead_scout::domain::{Field, FieldSchema, FilterKey};
use lead_scout::images::ImageManager;
use lead_scout::search::{Mode, SearchPhase, ViewState};
use lead_scout::spreadsheets::{export_filename, export_leads_xlsx};
use lead_scout::{ClientSettings, Presenter, SearchError, SearchOrchestrator, ViewModel};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Look up, page through and export property leads")]
struct Cli {
    /// Backend base URL. Overrides LEADS_API_URL.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Rows per listing page. Overrides LEADS_PAGE_SIZE.
    #[arg(long, value_name = "ROWS", value_parser = page_size_arg)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Leads for one zip code, scraping them first if needed.
    Search {
        zip: String,

        /// Open row N (1-based) with its street view image.
        #[arg(long, value_name = "N")]
        show: Option<usize>,

        /// Write the rows to an .xlsx file (or into this directory).
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// One page of the filtered lead list.
    List {
        /// Repeatable, e.g. --filter city=Austin --filter minValue=100000
        #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = filter_arg)]
        filters: Vec<(FilterKey, String)>,

        #[arg(long, value_name = "ORDER")]
        sort: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Save the street view image of an address.
    Image {
        address: String,

        #[arg(long, short, value_name = "PATH")]
        out: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Backend(#[from] FetchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn page_size_arg(raw: &str) -> Result<u32, String> {
    parse_page_size(raw).map_err(|e| e.to_string())
}

fn filter_arg(raw: &str) -> Result<(FilterKey, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim().parse::<FilterKey>().map_err(|e| e.to_string())?;
    Ok((key, value.to_string()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Search(e)) if !e.is_reportable() => {
            eprintln!("Search cancelled.");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lead_scout=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = ClientSettings::from_env_with_url(cli.api_url)?;
    if let Some(page_size) = cli.page_size {
        settings.page_size = page_size;
    }
    let api = HttpBackend::new(&settings.api)?;

    match cli.command {
        Command::Search { zip, show, export } => search(api, &settings, zip, show, export).await,
        Command::List {
            filters,
            sort,
            page,
        } => list(api, &settings, filters, sort, page).await,
        Command::Image { address, out } => {
            let mut images = ImageManager::new();
            let image = images.acquire(&api, &address).await?;
            std::fs::copy(image.path(), &out)?;
            match image.capture_date() {
                Some(date) => println!("🖼️  {} (captured {date})", out.display()),
                None => println!("🖼️  {}", out.display()),
            }
            Ok(())
        }
    }
}

async fn search(
    api: HttpBackend,
    settings: &ClientSettings,
    zip: String,
    show: Option<usize>,
    export: Option<PathBuf>,
) -> Result<(), CliError> {
    let presenter = TerminalPresenter::new(settings.schema.clone());
    let mut orch = SearchOrchestrator::new(api, presenter, settings);

    orch.set_query(zip.as_str());

    // Ctrl-C during the search abandons it cleanly.
    let cancel = orch.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let searched = orch.search().await;
    interrupt.abort();
    searched?;

    // tokio keeps its SIGINT handler installed, so later Ctrl-C must exit here.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted.");
            std::process::exit(130);
        }
    });

    if let Some(path) = export {
        let path = if path.is_dir() {
            path.join(export_filename(&zip))
        } else {
            path
        };
        let rows = &orch.state().results;
        let bytes = export_leads_xlsx(rows, orch.schema(), &Field::ALL)?;
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), leads = rows.len(), "📄 spreadsheet written");
    }

    if let Some(row) = show {
        if !orch.select(row.saturating_sub(1)) {
            let count = orch.state().results.len();
            return Err(SearchError::Validation(format!(
                "No row {row}; the search returned {count} leads"
            ))
            .into());
        }
        if let Err(e) = orch.load_street_view().await {
            warn!(error = %e, "street view unavailable");
        }
    }

    Ok(())
}

async fn list(
    api: HttpBackend,
    settings: &ClientSettings,
    filters: Vec<(FilterKey, String)>,
    sort: Option<String>,
    page: u32,
) -> Result<(), CliError> {
    let presenter = TerminalPresenter::new(settings.schema.clone());
    let mut orch = SearchOrchestrator::new(api, presenter, settings);

    for (key, value) in filters {
        orch.set_filter(key, value);
    }
    if let Some(sort) = sort {
        orch.set_sort_selector(&sort)?;
    }
    orch.set_page(page);

    orch.refresh_listing().await?;
    Ok(())
}

/// Prints each screen once, plus progress lines while a scrape runs.
/// Errors are left to `main`.
struct TerminalPresenter {
    schema: FieldSchema,
    shown: Option<(ViewState, SearchPhase)>,
    last_progress: Option<String>,
    last_image: Option<u64>,
    last_image_error: Option<String>,
}

impl TerminalPresenter {
    fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            shown: None,
            last_progress: None,
            last_image: None,
            last_image_error: None,
        }
    }

    fn print_results(&self, view: &ViewModel<'_>) {
        let total = view.total.unwrap_or(view.results.len() as u64);
        match (view.mode, view.page_count) {
            (Mode::Listing, Some(pages)) => {
                println!("{total} leads (page {} of {})", view.page, pages.max(1))
            }
            _ => println!("{total} leads for {}", view.query),
        }
        for (i, lead) in view.results.iter().enumerate() {
            println!("{:>4}. {}", i + 1, lead.summary_line(&self.schema));
        }
    }

    fn print_details(&self, view: &ViewModel<'_>) {
        let Some(lead) = view.selected else {
            return;
        };
        for field in Field::ALL {
            if let Some(text) = lead.field_text(&self.schema, field) {
                println!("{:>24}: {text}", field.label());
            }
        }
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, view: &ViewModel<'_>) {
        if let Some(progress) = view.progress {
            if self.last_progress.as_deref() != Some(progress) {
                eprintln!("⏳ {progress}");
                self.last_progress = Some(progress.to_string());
            }
        }

        let screen = (view.view, view.phase);
        if self.shown != Some(screen) {
            self.shown = Some(screen);
            match screen {
                (_, SearchPhase::CheckingStatus) => eprintln!("🔎 Checking {}...", view.query),
                (_, SearchPhase::FetchingCached) => eprintln!("📦 Loading cached leads..."),
                (_, SearchPhase::QueryingPaginated) => eprintln!("🔎 Querying leads..."),
                (ViewState::Results, SearchPhase::Results) => self.print_results(view),
                (ViewState::Details, _) => self.print_details(view),
                _ => {}
            }
        }

        if let Some(image) = view.image {
            if self.last_image != Some(image.id()) {
                self.last_image = Some(image.id());
                let captured = image.capture_date().unwrap_or("unknown date");
                println!(
                    "{:>24}: {} bytes, captured {captured}",
                    "Street View",
                    image.len()
                );
            }
        }

        if view.image_error != self.last_image_error.as_deref() {
            self.last_image_error = view.image_error.map(str::to_string);
            if let Some(err) = view.image_error {
                eprintln!("⚠️  {err}");
            }
        }
    }
}
