//! The batch job: one order sheet in, one invoice file per row out.
//!
//! `InvoiceJob` carries what the original per-run state amounts to -
//! the loaded rows, the date token, the output folder and the current
//! row index - as explicit fields.

use crate::config::JobConfig;
use crate::error::{StampError, StampResult};
use crate::excel::{SheetImporter, TemplateStamper};
use crate::types::OrderSheet;
use regex::Regex;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Label column width in row previews
const PREVIEW_LABEL_WIDTH: usize = 20;

fn date_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{6}").expect("date token regex"))
}

/// Extract the first six-digit run from an order-sheet file name
/// ("OCS発送依頼書_250509.xlsx" → "250509"). No run is a fatal error.
pub fn extract_date_token(file_name: &str) -> StampResult<String> {
    date_token_re()
        .find(file_name)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| StampError::DateToken(file_name.to_string()))
}

pub struct InvoiceJob {
    sheet: OrderSheet,
    config: JobConfig,
    stamper: TemplateStamper,
    date_token: String,
    output_dir: PathBuf,
    index: usize,
}

impl InvoiceJob {
    /// Load the order sheet, derive the date token and output folder,
    /// and prepare the stamper. Nothing is written yet.
    pub fn new(
        orders: &Path,
        template: &Path,
        config: JobConfig,
        out_root: Option<&Path>,
    ) -> StampResult<Self> {
        let file_name = orders
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StampError::Sheet(format!("Invalid order sheet path: {}", orders.display()))
            })?;
        let date_token = extract_date_token(file_name)?;

        let sheet = SheetImporter::new(orders)
            .with_sheet(config.sheet.clone())
            .import()?;

        let folder = format!("{}_{}", config.folder_prefix, date_token);
        let output_dir = match out_root {
            Some(root) => root.join(folder),
            None => PathBuf::from(folder),
        };

        let stamper = TemplateStamper::new(template, config.clone());

        Ok(Self {
            sheet,
            config,
            stamper,
            date_token,
            output_dir,
            index: 0,
        })
    }

    pub fn sheet(&self) -> &OrderSheet {
        &self.sheet
    }

    pub fn date_token(&self) -> &str {
        &self.date_token
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn row_count(&self) -> usize {
        self.sheet.row_count()
    }

    /// Zero-based index of the next row to export.
    pub fn current_row(&self) -> usize {
        self.index
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.sheet.row_count()
    }

    /// Invoice name for a row: `INV_<token>_<NNN>`, 1-based, zero-padded.
    pub fn invoice_name(&self, row_idx: usize) -> String {
        format!("INV_{}_{:03}", self.date_token, row_idx + 1)
    }

    /// Output path for a row.
    pub fn output_path(&self, row_idx: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}.xlsx", self.invoice_name(row_idx)))
    }

    /// Stamp one row into a template copy and save it.
    pub fn export_row(&self, row_idx: usize) -> StampResult<PathBuf> {
        if row_idx >= self.sheet.row_count() {
            return Err(StampError::Sheet(format!(
                "Row {} out of range ({} rows)",
                row_idx + 1,
                self.sheet.row_count()
            )));
        }

        fs::create_dir_all(&self.output_dir)?;

        let invoice_name = self.invoice_name(row_idx);
        let output = self.output_path(row_idx);
        self.stamper
            .stamp_row(&self.sheet, row_idx, &invoice_name, &self.date_token, &output)?;
        Ok(output)
    }

    /// Export the current row and advance the index. `None` once every
    /// row has been exported.
    pub fn export_next(&mut self) -> StampResult<Option<PathBuf>> {
        if self.is_done() {
            return Ok(None);
        }
        let path = self.export_row(self.index)?;
        self.index += 1;
        Ok(Some(path))
    }

    /// Export every remaining row. A sheet of N rows yields exactly N
    /// files on a fresh job.
    pub fn run_all(&mut self) -> StampResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        while let Some(path) = self.export_next()? {
            written.push(path);
        }
        Ok(written)
    }

    /// Render a row as aligned `label: value` lines.
    pub fn preview(&self, row_idx: usize) -> StampResult<String> {
        if row_idx >= self.sheet.row_count() {
            return Err(StampError::Sheet(format!(
                "Row {} out of range ({} rows)",
                row_idx + 1,
                self.sheet.row_count()
            )));
        }
        Ok(preview_row(&self.sheet, &self.config, row_idx))
    }
}

/// Format one row for display: every kept column on its own line,
/// labels renamed per config and padded to a fixed width.
pub fn preview_row(sheet: &OrderSheet, config: &JobConfig, row_idx: usize) -> String {
    let mut out = String::new();
    let Some(row) = sheet.rows.get(row_idx) else {
        return out;
    };
    for (idx, column) in sheet.columns.iter().enumerate() {
        let label = config.display.get(column).unwrap_or(column);
        // Multi-line headers collapse onto one line
        let label = label.replace('\n', " ");
        let _ = writeln!(
            out,
            "{:<width$}: {}",
            label,
            row.get(idx).render(),
            width = PREVIEW_LABEL_WIDTH
        );
    }
    out
}
