use clap::{Parser, Subcommand};
use stampa::cli;
use stampa::error::StampResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stampa")]
#[command(about = "Order-sheet to invoice batch stamper")]
#[command(long_about = "Stampa - Order-sheet to invoice batch stamper

Reads rows from an Excel order sheet and copies each row's fields into
fixed cells of an invoice template, saving one .xlsx per row.

OUTPUTS:
  One INV_<date>_<NNN>.xlsx per order row, inside <prefix>_<date>/.
  The six-digit date is taken from the order-sheet file name.

COMMANDS:
  run    - Export invoices for every row (or a single row)
  show   - Preview order rows as they will be stamped
  check  - Validate a job configuration
  watch  - Re-run the export whenever the order sheet changes

EXAMPLES:
  stampa run orders_250509.xlsx -t invoice_template.xlsx --preset doctor
  stampa run orders_250509.xlsx -t tpl.xlsx -c job.yaml --step
  stampa show orders_250509.xlsx --preset courier --row 3
  stampa check -c job.yaml --orders orders_250509.xlsx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export invoices for every order row.

For each row the template is copied, the configured cells are filled
from the row's fields, and the copy is saved as
<prefix>_<date>/INV_<date>_<NNN>.xlsx (NNN = 1-based row number,
zero-padded to three digits).

A job configuration is required: either --config <file> or one of the
built-in presets (--preset doctor | courier). Columns missing from the
order sheet stamp as empty cells rather than failing.

STEP MODE:
  --step previews each row and waits for Enter before exporting it,
  one row at a time. Type q to stop.

EXAMPLES:
  stampa run orders_250509.xlsx -t template.xlsx --preset doctor
  stampa run orders_250509.xlsx -t template.xlsx -c job.yaml --row 2
  stampa run orders_250509.xlsx -t template.xlsx -c job.yaml --dry-run")]
    /// Export invoices for every order row
    Run {
        /// Path to the order sheet (.xlsx); its name carries the date
        orders: PathBuf,

        /// Path to the invoice template (.xlsx)
        #[arg(short, long)]
        template: PathBuf,

        /// Path to a job configuration YAML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in job configuration (doctor | courier)
        #[arg(short, long)]
        preset: Option<String>,

        /// Directory the output folder is created under (default: cwd)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Export a single 1-based row instead of all rows
        #[arg(short, long)]
        row: Option<usize>,

        /// Confirm each row on stdin before exporting it
        #[arg(long)]
        step: bool,

        /// Resolve everything and print the plan without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show per-file progress
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Preview order rows.

Prints each row as aligned label/value lines, with the configured
display renames applied and placeholder (\"Unnamed\") columns dropped -
exactly what the export will see.

EXAMPLES:
  stampa show orders_250509.xlsx --preset doctor
  stampa show orders_250509.xlsx -c job.yaml --row 3")]
    /// Preview order rows as they will be stamped
    Show {
        /// Path to the order sheet (.xlsx)
        orders: PathBuf,

        /// Path to a job configuration YAML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in job configuration (doctor | courier)
        #[arg(short, long)]
        preset: Option<String>,

        /// Show a single 1-based row
        #[arg(short, long)]
        row: Option<usize>,
    },

    #[command(long_about = "Validate a job configuration.

Checks the YAML against the embedded schema plus structural rules
(valid cell references, exactly one of column/template per mapping).
With --orders, also verifies that every referenced column exists in
the order sheet; missing columns are warnings, since they stamp as
empty cells.

EXAMPLES:
  stampa check -c job.yaml
  stampa check --preset courier --orders orders_250509.xlsx")]
    /// Validate a job configuration
    Check {
        /// Path to a job configuration YAML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in job configuration (doctor | courier)
        #[arg(short, long)]
        preset: Option<String>,

        /// Order sheet to check the referenced columns against
        #[arg(long)]
        orders: Option<PathBuf>,
    },

    #[command(long_about = "Watch the order sheet and re-export on changes.

Monitors the order sheet's directory (debounced) and re-runs the full
export whenever the order sheet or the template is saved. Failures of
a single run are reported and watching continues.

Press Ctrl+C to stop.")]
    /// Re-run the export whenever the order sheet changes
    Watch {
        /// Path to the order sheet (.xlsx)
        orders: PathBuf,

        /// Path to the invoice template (.xlsx)
        #[arg(short, long)]
        template: PathBuf,

        /// Path to a job configuration YAML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in job configuration (doctor | courier)
        #[arg(short, long)]
        preset: Option<String>,

        /// Directory the output folder is created under (default: cwd)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Show per-file progress
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> StampResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            orders,
            template,
            config,
            preset,
            out_dir,
            row,
            step,
            dry_run,
            verbose,
        } => cli::run(
            orders, template, config, preset, out_dir, row, step, dry_run, verbose,
        ),

        Commands::Show {
            orders,
            config,
            preset,
            row,
        } => cli::show(orders, config, preset, row),

        Commands::Check {
            config,
            preset,
            orders,
        } => cli::check(config, preset, orders),

        Commands::Watch {
            orders,
            template,
            config,
            preset,
            out_dir,
            verbose,
        } => cli::watch(orders, template, config, preset, out_dir, verbose),
    }
}
