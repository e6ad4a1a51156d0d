use crate::config::{self, JobConfig};
use crate::error::{StampError, StampResult};
use crate::excel::SheetImporter;
use crate::job::{preview_row, InvoiceJob};
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Resolve `--config` / `--preset` into a job configuration.
/// Exactly one of the two must be given.
pub fn resolve_config(config: Option<&Path>, preset: Option<&str>) -> StampResult<JobConfig> {
    match (config, preset) {
        (Some(path), None) => config::load_config(path),
        (None, Some(name)) => config::load_preset(name),
        (Some(_), Some(_)) => Err(StampError::Config(
            "use either --config or --preset, not both".to_string(),
        )),
        (None, None) => Err(StampError::Config(format!(
            "a job configuration is required: --config <file> or --preset <{}>",
            config::PRESETS.join("|")
        ))),
    }
}

/// Execute the run command: export invoices for every row (or one row).
#[allow(clippy::too_many_arguments)]
pub fn run(
    orders: PathBuf,
    template: PathBuf,
    config: Option<PathBuf>,
    preset: Option<String>,
    out_dir: Option<PathBuf>,
    row: Option<usize>,
    step: bool,
    dry_run: bool,
    verbose: bool,
) -> StampResult<()> {
    println!("{}", "📄 Stampa - Invoice Export".bold().green());
    println!("   Orders:   {}", orders.display());
    println!("   Template: {}\n", template.display());

    if dry_run {
        println!("{}", "📋 DRY RUN MODE - No files will be written\n".yellow());
    }

    let config = resolve_config(config.as_deref(), preset.as_deref())?;
    let mut job = InvoiceJob::new(&orders, &template, config, out_dir.as_deref())?;

    if verbose {
        println!("   Date token: {}", job.date_token().bright_yellow());
        println!("   Output dir: {}", job.output_dir().display());
        println!("   Rows:       {}\n", job.row_count());
    }

    if job.row_count() == 0 {
        println!("{}", "⚠️  Order sheet has no data rows".yellow());
        return Ok(());
    }

    if let Some(n) = row {
        let idx = one_based(n)?;
        if dry_run {
            println!("   {} {}", "→".cyan(), job.output_path(idx).display());
            println!("\n{}", "📋 Dry run complete - no files written".yellow());
            return Ok(());
        }
        let path = job.export_row(idx)?;
        println!("{} {}", "✅ Saved".bold().green(), path.display());
        return Ok(());
    }

    if step {
        return run_step(&mut job);
    }

    if dry_run {
        for idx in 0..job.row_count() {
            println!("   {} {}", "→".cyan(), job.output_path(idx).display());
        }
        println!("\n{}", "📋 Dry run complete - no files written".yellow());
        return Ok(());
    }

    let written = job.run_all()?;
    if verbose {
        for path in &written {
            println!("   {} {}", "✅".green(), path.display());
        }
    }
    println!(
        "{}",
        format!(
            "✅ Exported {} invoices to {}",
            written.len(),
            job.output_dir().display()
        )
        .bold()
        .green()
    );
    Ok(())
}

/// One row per keypress: show the row, wait for Enter, export, repeat.
fn run_step(job: &mut InvoiceJob) -> StampResult<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !job.is_done() {
        let idx = job.current_row();
        println!(
            "{}",
            format!("── Row {} of {} ──", idx + 1, job.row_count()).bold()
        );
        print!("{}", job.preview(idx)?);
        print!("{}", "Press Enter to export, q to quit: ".cyan());
        io::stdout().flush()?;

        match lines.next() {
            Some(line) => {
                if line?.trim().eq_ignore_ascii_case("q") {
                    println!("{}", "Stopped.".yellow());
                    return Ok(());
                }
            }
            // stdin closed
            None => {
                println!();
                return Ok(());
            }
        }

        if let Some(path) = job.export_next()? {
            println!("{} {}\n", "✅ Saved".green(), path.display());
        }
    }

    println!("{}", "✅ All invoices exported".bold().green());
    Ok(())
}

/// Execute the show command: print row previews.
pub fn show(
    orders: PathBuf,
    config: Option<PathBuf>,
    preset: Option<String>,
    row: Option<usize>,
) -> StampResult<()> {
    println!("{}", "📄 Stampa - Order Sheet".bold().green());
    println!("   Orders: {}\n", orders.display());

    let config = resolve_config(config.as_deref(), preset.as_deref())?;
    let sheet = SheetImporter::new(&orders)
        .with_sheet(config.sheet.clone())
        .import()?;

    if sheet.row_count() == 0 {
        println!("{}", "⚠️  Order sheet has no data rows".yellow());
        return Ok(());
    }

    let rows: Vec<usize> = match row {
        Some(n) => {
            let idx = one_based(n)?;
            if idx >= sheet.row_count() {
                return Err(StampError::Sheet(format!(
                    "Row {} out of range ({} rows)",
                    n,
                    sheet.row_count()
                )));
            }
            vec![idx]
        }
        None => (0..sheet.row_count()).collect(),
    };

    for idx in rows {
        println!(
            "{}",
            format!("── Row {} of {} ──", idx + 1, sheet.row_count()).bold()
        );
        print!("{}", preview_row(&sheet, &config, idx));
        println!();
    }
    Ok(())
}

/// Execute the check command: validate a job configuration, optionally
/// against an order sheet.
pub fn check(
    config: Option<PathBuf>,
    preset: Option<String>,
    orders: Option<PathBuf>,
) -> StampResult<()> {
    println!("{}", "🔍 Stampa - Config Check".bold().green());

    let config = resolve_config(config.as_deref(), preset.as_deref())?;
    println!(
        "   {} field mappings, folder prefix '{}'",
        config.fields.len(),
        config.folder_prefix
    );
    println!("{}", "✅ Configuration is valid".bold().green());

    let Some(orders) = orders else {
        return Ok(());
    };

    println!("\n   Checking against {}", orders.display());
    let sheet = SheetImporter::new(&orders)
        .with_sheet(config.sheet.clone())
        .import()?;

    let missing: Vec<String> = config
        .referenced_columns()
        .into_iter()
        .filter(|column| sheet.column_index(column).is_none())
        .collect();

    if missing.is_empty() {
        println!("{}", "✅ All referenced columns present".bold().green());
    } else {
        // Missing columns stamp as empty strings, so warn rather than fail
        for column in &missing {
            println!(
                "   {} column {:?} not in order sheet (stamps as empty)",
                "⚠️".yellow(),
                column
            );
        }
    }
    Ok(())
}

/// Execute the watch command: re-run the batch whenever the order sheet
/// (or the template) changes.
pub fn watch(
    orders: PathBuf,
    template: PathBuf,
    config: Option<PathBuf>,
    preset: Option<String>,
    out_dir: Option<PathBuf>,
    verbose: bool,
) -> StampResult<()> {
    println!("{}", "👁️  Stampa - Watch Mode".bold().green());
    println!("   Watching: {}", orders.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !orders.exists() {
        return Err(StampError::Config(format!(
            "File not found: {}",
            orders.display()
        )));
    }

    // Resolve once up front so a broken config fails fast
    let job_config = resolve_config(config.as_deref(), preset.as_deref())?;

    let canonical_path = orders.canonicalize().map_err(StampError::Io)?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| StampError::Config("Cannot determine parent directory".to_string()))?;

    let (tx, rx) = channel();

    // Debounce to avoid rapid-fire events during file saves
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| StampError::Config(format!("Failed to create file watcher: {}", e)))?;

    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| StampError::Config(format!("Failed to watch directory: {}", e)))?;

    if verbose {
        println!(
            "   {} {}",
            "Watching directory:".cyan(),
            parent_dir.display()
        );
    }

    println!("{}", "🔄 Initial run...".cyan());
    run_watch_action(&orders, &template, &job_config, out_dir.as_deref(), verbose);
    println!();

    let watched_names: Vec<_> = [orders.file_name(), template.file_name()]
        .into_iter()
        .flatten()
        .map(|n| n.to_os_string())
        .collect();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    if event.kind != DebouncedEventKind::Any {
                        return false;
                    }
                    event
                        .path
                        .file_name()
                        .map(|name| watched_names.iter().any(|w| w == name))
                        .unwrap_or(false)
                });

                if relevant {
                    println!(
                        "\n{} {}",
                        "🔄 Change detected at".cyan(),
                        utc_timestamp().cyan()
                    );
                    run_watch_action(&orders, &template, &job_config, out_dir.as_deref(), verbose);
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// One watch-triggered batch run. Failures are reported, not fatal -
/// the watch keeps going.
fn run_watch_action(
    orders: &Path,
    template: &Path,
    config: &JobConfig,
    out_dir: Option<&Path>,
    verbose: bool,
) {
    let result = InvoiceJob::new(orders, template, config.clone(), out_dir)
        .and_then(|mut job| job.run_all());
    match result {
        Ok(written) => {
            if verbose {
                for path in &written {
                    println!("   {} {}", "✅".green(), path.display());
                }
            }
            println!("   {} {} invoices written", "✅".green(), written.len());
        }
        Err(e) => eprintln!("   {} {}", "❌".red(), e),
    }
}

/// Convert a 1-based row argument to an index.
fn one_based(n: usize) -> StampResult<usize> {
    n.checked_sub(1)
        .ok_or_else(|| StampError::Config("--row is 1-based".to_string()))
}

/// Wall-clock HH:MM:SS in UTC.
fn utc_timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02} UTC", hours, minutes, seconds)
}
