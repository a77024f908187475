use std::path::Path;

use curriculum_core::model::Curriculum;
use services::{AppServices, ContentError, ProgressSummary, load_curriculum};
use tracing_subscriber::EnvFilter;

mod args;

use args::{Args, Command, print_usage, sqlite_file_path};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn format_summary(summary: &ProgressSummary) -> String {
    format!(
        "{}/{} ({:.2}%)",
        summary.completed, summary.total, summary.percentage
    )
}

fn print_status(services: &AppServices) {
    let curriculum = services.curriculum();
    let progress = services.progress();

    println!(
        "Overall: {}",
        format_summary(&progress.total_progress(curriculum.phases()))
    );
    for phase in curriculum.phases() {
        println!(
            "  {} {}: {}",
            phase.id,
            phase.title,
            format_summary(&progress.phase_progress(&phase.modules))
        );
        for module in &phase.modules {
            let done = if progress.is_completed(&module.id) { "x" } else { " " };
            let mark = if progress.is_bookmarked(&module.id) { " *" } else { "" };
            println!("    [{done}] {} {}{mark}", module.id, module.title);
        }
    }
}

async fn run_command(services: &mut AppServices, command: Command) -> Result<(), ContentError> {
    match command {
        Command::Status => print_status(services),
        Command::Show(module) => {
            let progress = services.progress();
            match services.curriculum().locate(&module) {
                Some((phase, found)) => println!("{module} {} (phase {})", found.title, phase.id),
                None => println!("{module} (not in curriculum)"),
            }
            println!("  completed:  {}", progress.is_completed(&module));
            println!("  bookmarked: {}", progress.is_bookmarked(&module));
            let sections = progress.module_progress(&module);
            if sections.is_empty() {
                println!("  no sections recorded");
            }
            for (section, done) in &sections {
                println!("  [{}] {section}", if *done { "x" } else { " " });
            }
        }
        Command::Section {
            module,
            section,
            completed,
        } => {
            services
                .progress_mut()
                .update_module_progress(module, section, completed)
                .await;
        }
        Command::Complete(module) => services.progress_mut().mark_module_complete(module).await,
        Command::Incomplete(module) => {
            services.progress_mut().mark_module_incomplete(module).await;
        }
        Command::Bookmark(module) => {
            let bookmarked = services.progress_mut().toggle_bookmark(module.clone()).await;
            println!(
                "{module} {}",
                if bookmarked { "bookmarked" } else { "unbookmarked" }
            );
        }
        Command::Bookmarks => {
            for module in services.progress().bookmarks() {
                let title = services
                    .curriculum()
                    .locate(module)
                    .map_or("", |(_, found)| found.title.as_str());
                println!("{module} {title}");
            }
        }
        Command::Read { phase, module } => {
            let doc = services.content().load_module(&phase, &module).await?;
            println!("{}", doc.markdown);
        }
        Command::Reset => {
            services.progress_mut().reset_progress().await;
            println!("progress reset");
        }
        Command::Help => print_usage(),
    }
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = sqlite_file_path(db_url)? else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // sqlx refuses to open a missing file without `mode=rwc`.
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok(())
}

async fn open_curriculum(manifest: &Path) -> Result<Curriculum, Box<dyn std::error::Error>> {
    if !manifest.exists() {
        tracing::warn!(path = %manifest.display(), "curriculum manifest not found, using an empty curriculum");
        return Ok(Curriculum::default());
    }
    Ok(load_curriculum(manifest).await?)
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

    let curriculum = open_curriculum(&parsed.manifest).await?;

    // Open + migrate SQLite in the binary glue so core/services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let mut services =
        AppServices::new_sqlite(&parsed.db_url, parsed.content_root(), curriculum).await?;

    let outcome = run_command(&mut services, parsed.command).await;
    services.shutdown().await;

    match outcome {
        Err(err) if err.is_not_found() => {
            eprintln!("not found: {err}");
            std::process::exit(1);
        }
        other => Ok(other?),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
