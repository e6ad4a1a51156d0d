//! Stampa - order-sheet to invoice batch stamper
//!
//! This library reads rows from an Excel order sheet and stamps each
//! row's fields into fixed cells of a cloned invoice template, saving
//! one output file per row.
//!
//! # Features
//!
//! - Declarative column → cell mapping (YAML job configs, with presets)
//! - Composite cells via `{Column Name}` templates
//! - Date token and output naming derived from the order-sheet file name
//! - Template formatting preserved (read-modify-write)
//!
//! # Example
//!
//! ```no_run
//! use stampa::config;
//! use stampa::job::InvoiceJob;
//! use std::path::Path;
//!
//! let cfg = config::load_preset("doctor")?;
//! let mut job = InvoiceJob::new(
//!     Path::new("orders_250509.xlsx"),
//!     Path::new("invoice_template.xlsx"),
//!     cfg,
//!     None,
//! )?;
//!
//! let written = job.run_all()?;
//! println!("{} invoices written", written.len());
//! # Ok::<(), stampa::StampError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod job;
pub mod types;

// Re-export commonly used types
pub use error::{StampError, StampResult};
pub use types::{FieldValue, OrderRow, OrderSheet};
