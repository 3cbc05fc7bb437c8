use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use reputation_report::builder::suggested_file_name;
use reputation_report::config::RuntimeConfig;
use reputation_report::store::{prepare_for_persistence, FsReportStore, PersistenceStore};
use reputation_report::{ReportBuilder, ReportData, ReportTheme};
use uuid::Uuid;

/// Renders reputation reports from JSON files and manages the local report store.
///
/// `REPORT_STORE_DIR`, `REPORT_OUTPUT_DIR` and `REPORT_THEME_PATH` configure the defaults; set
/// `RUST_LOG=info` to see progress.
#[derive(Parser)]
#[command(author, version, about = "Reputation report renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report JSON file to PDF.
    Render {
        input: PathBuf,
        /// Output file. Defaults to `<brand>_RP_Report_<date>.pdf` in the output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Theme JSON file, overriding `REPORT_THEME_PATH`.
        #[arg(long)]
        theme: Option<PathBuf>,
        /// Add a PDF outline for the section starts.
        #[arg(long)]
        bookmarks: bool,
    },

    /// Print the page plan of a report JSON file without rendering it.
    Pages {
        input: PathBuf,
        /// Print the full page descriptors as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage stored reports.
    #[command(subcommand)]
    Store(StoreCommand),
}

#[derive(Subcommand)]
enum StoreCommand {
    /// List stored reports, newest first.
    List,
    /// Print a stored report as JSON.
    Show { id: Uuid },
    /// Save a report JSON file, uploading embedded images.
    Save {
        input: PathBuf,
        /// Update this report instead of creating a new one.
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Delete a stored report.
    Delete { id: Uuid },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = RuntimeConfig::from_env()?;
    match cli.command {
        Commands::Render {
            input,
            output,
            theme,
            bookmarks,
        } => {
            let report = read_report(&input)?;
            let theme = match theme {
                Some(path) => ReportTheme::from_json_file(path)?,
                None => config.load_theme()?,
            };
            let rendered = ReportBuilder::new()
                .with_theme(theme)
                .with_bookmarks(bookmarks)
                .render(&report)?;
            let output =
                output.unwrap_or_else(|| config.output_dir.join(suggested_file_name(&report)));
            fs::write(&output, &rendered.bytes)?;
            println!("{} ({} pages)", output.display(), rendered.page_count);
        }
        Commands::Pages { input, json } => {
            let report = read_report(&input)?;
            let pages = ReportBuilder::new()
                .with_theme(config.load_theme()?)
                .plan(&report)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                for page in &pages {
                    let mut line = format!("{:>5}  {}", page.number.to_string(), page.kind.label());
                    if let Some(title) = page.title() {
                        line.push_str(&format!(" | {title}"));
                    }
                    if let Some(grid) = page.notes.grid {
                        line.push_str(&format!(
                            " | {}x{} grid, {} images",
                            grid.shape.columns, grid.shape.rows, grid.drawn
                        ));
                        if grid.dropped > 0 {
                            line.push_str(&format!(", {} dropped", grid.dropped));
                        }
                    }
                    if page.notes.omitted > 0 {
                        line.push_str(&format!(" | {} omitted", page.notes.omitted));
                    }
                    println!("{line}");
                }
            }
        }
        Commands::Store(command) => run_store(command, &config)?,
    }
    Ok(())
}

fn run_store(command: StoreCommand, config: &RuntimeConfig) -> Result<(), Box<dyn Error>> {
    let store = FsReportStore::open(&config.store_dir)?;
    match command {
        StoreCommand::List => {
            for summary in store.list()? {
                println!(
                    "{}  {}  {}  {}",
                    summary.id,
                    summary.updated_at.format("%Y-%m-%d %H:%M"),
                    summary.brand_name,
                    summary.title
                );
            }
        }
        StoreCommand::Show { id } => {
            let stored = store.get(id)?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        StoreCommand::Save { input, id } => {
            let mut report = read_report(&input)?;
            let uploaded = prepare_for_persistence(&mut report, &store)?;
            let stored = match id {
                Some(id) => store.update(id, &report)?,
                None => store.create(&report)?,
            };
            info!("stored {} with {uploaded} uploaded images", stored.id);
            println!("{}", stored.id);
        }
        StoreCommand::Delete { id } => {
            if store.delete(id)? {
                println!("deleted {id}");
            } else {
                println!("{id} not found");
            }
        }
    }
    Ok(())
}

fn read_report(path: &Path) -> Result<ReportData, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
