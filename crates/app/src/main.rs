use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use progress_core::model::Curriculum;
use progress_core::path::SitePaths;
use services::{Clock, ProgressError, ProgressStore, RepairReport, StorageKeys, VisitStatus};
use storage::repository::Storage;
use ui::{Anchor, DisplayRenderer, Fragment, HostPage, NavLink, ProgressController, StaticPage};

mod args;

use args::{Args, ArgsError, Command, print_usage};

/// Static page whose confirmations are answered on the terminal.
struct TerminalPage {
    page: StaticPage,
    assume_yes: bool,
}

impl HostPage for TerminalPage {
    fn location_path(&self) -> String {
        self.page.location_path()
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.page.nav_links()
    }

    fn mark_nav_visited(&mut self, index: usize, badge_html: &str) {
        self.page.mark_nav_visited(index, badge_html);
    }

    fn unmark_nav_visited(&mut self, index: usize) {
        self.page.unmark_nav_visited(index);
    }

    fn remove_fragment(&mut self, fragment: Fragment) -> bool {
        self.page.remove_fragment(fragment)
    }

    fn insert_fragment(&mut self, anchor: Anchor, fragment: Fragment, html: String) -> bool {
        self.page.insert_fragment(anchor, fragment, html)
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_curriculum(path: Option<&Path>) -> Result<Curriculum, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Curriculum::reference());
    };
    let raw = std::fs::read_to_string(path)?;
    let curriculum = Curriculum::from_json(&raw)?;
    info!(file = %path.display(), stages = curriculum.stages().len(), "curriculum loaded");
    Ok(curriculum)
}

/// Start-of-session cleanup. Returns the report only for the `repair` command,
/// which is also the only one that fails when the cleaned record cannot be saved.
async fn repair_for(
    controller: &mut ProgressController,
    command: &Command,
) -> Result<Option<RepairReport>, ProgressError> {
    match controller.repair_on_start().await {
        Ok(report) if *command == Command::Repair => Ok(Some(report)),
        Ok(_) => Ok(None),
        Err(err) if *command == Command::Repair => Err(err),
        Err(err) => {
            warn!(error = %err, "startup cleanup not saved");
            Ok(None)
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let curriculum = Arc::new(load_curriculum(parsed.config.curriculum.as_deref())?);
    let paths = SitePaths::new(&parsed.config.base_path)?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.config.db_url)?;
    let storage = Storage::sqlite(&parsed.config.db_url).await?;
    debug!(db = %parsed.config.db_url, "storage ready");

    let store = Arc::new(ProgressStore::new(
        Clock::default_clock(),
        Arc::clone(&curriculum),
        Arc::clone(&storage.kv),
        StorageKeys::default(),
    ));
    let mut controller =
        ProgressController::new(store, DisplayRenderer::new(Arc::clone(&curriculum), paths.clone()));

    if let Some(report) = repair_for(&mut controller, &parsed.command).await? {
        if report.removed.is_empty() {
            println!("nothing to repair ({} pages kept)", report.kept);
        } else {
            for page in &report.removed {
                println!("removed {page}");
            }
            println!("{} pages kept", report.kept);
        }
        return Ok(());
    }

    let page_at = |location: &str| TerminalPage {
        page: StaticPage::for_curriculum(&curriculum, &paths, location),
        assume_yes: parsed.assume_yes,
    };

    match &parsed.command {
        Command::Visit { location } => {
            let mut host = page_at(location);
            let Some(outcome) = controller.on_navigation(&mut host).await else {
                return Err(format!("not a page location: {location}").into());
            };
            match outcome.status {
                VisitStatus::Ignored => println!("not tracked: {location}"),
                VisitStatus::AlreadyVisited => println!("already read: {location}"),
                VisitStatus::Recorded => println!("recorded: {location}"),
            }
            if !outcome.persisted && outcome.status == VisitStatus::Recorded {
                println!("warning: progress could not be saved");
            }
            if let Some(notice) = outcome.notice {
                println!("completed {}", notice.stage_name);
                match notice.next_stage {
                    Some(next) => println!("next: {} ({})", next.name, next.url),
                    None => println!("every stage is complete"),
                }
            }
        }
        Command::Render { location } => {
            let mut host = page_at(location);
            controller.on_navigation(&mut host).await;
            print!("{}", host.page.to_html());
        }
        Command::Overview => {
            let overview = controller.store().overview().await;
            for stage in &overview.stages {
                let mark = if stage.completed { "x" } else { " " };
                println!(
                    "[{mark}] {:<32} {:>2}/{:<2} {:>5.1}%",
                    stage.name, stage.visited, stage.total, stage.percentage
                );
            }
            println!(
                "overall: {}/{} pages, {:.1}%",
                overview.visited_pages, overview.total_pages, overview.overall_percentage
            );
        }
        Command::Export { out_dir } => {
            let mut host = page_at(paths.base_path());
            let file = controller.handle_export(&mut host).await?;
            std::fs::create_dir_all(out_dir)?;
            let target = out_dir.join(&file.file_name);
            std::fs::write(&target, &file.contents)?;
            println!("exported {}", target.display());
        }
        Command::Import { file } => {
            let mut host = page_at(paths.base_path());
            let bytes = std::fs::read(file)?;
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match controller.handle_import_file(&mut host, &name, &bytes).await? {
                ui::ImportOutcome::Imported(record) => {
                    println!("imported {} pages", record.visited_pages().len());
                }
                ui::ImportOutcome::Cancelled => println!("import cancelled"),
            }
        }
        Command::Reset => {
            let mut host = page_at(paths.base_path());
            if controller.handle_reset(&mut host).await? {
                println!("progress reset");
            } else {
                println!("reset cancelled");
            }
        }
        Command::Repair | Command::Help => {}
    }

    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
