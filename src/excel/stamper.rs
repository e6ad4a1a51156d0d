//! Template stamper - writes one order row into a fresh copy of the
//! invoice template and saves it.

use crate::config::{FieldMapping, JobConfig};
use crate::error::{StampError, StampResult};
use crate::types::{OrderRow, OrderSheet};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use umya_spreadsheet::{OrientationValues, Worksheet};

/// xlsx paper size code for A4
const PAPER_SIZE_A4: u32 = 9;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder regex"))
}

/// Stamps order rows into copies of a template workbook.
///
/// The template is re-read for every row so each output starts from the
/// pristine file, formatting included.
pub struct TemplateStamper {
    template: PathBuf,
    config: JobConfig,
}

impl TemplateStamper {
    pub fn new<P: AsRef<Path>>(template: P, config: JobConfig) -> Self {
        Self {
            template: template.as_ref().to_path_buf(),
            config,
        }
    }

    /// Stamp row `row_idx` of `sheet` into a copy of the template and
    /// save it at `output`.
    pub fn stamp_row(
        &self,
        sheet: &OrderSheet,
        row_idx: usize,
        invoice_name: &str,
        date_token: &str,
        output: &Path,
    ) -> StampResult<()> {
        let row = sheet.rows.get(row_idx).ok_or_else(|| {
            StampError::Sheet(format!(
                "Row {} out of range ({} rows)",
                row_idx + 1,
                sheet.row_count()
            ))
        })?;

        let mut book = umya_spreadsheet::reader::xlsx::read(&self.template).map_err(|e| {
            StampError::Template(format!(
                "Failed to open template {}: {}",
                self.template.display(),
                e
            ))
        })?;
        let worksheet = book
            .get_sheet_mut(&0)
            .ok_or_else(|| StampError::Template("Template has no worksheets".to_string()))?;

        if self.config.fit_to_page {
            apply_fit_to_page(worksheet);
        }

        if let Some(cell) = &self.config.invoice.number_cell {
            worksheet.get_cell_mut(cell.as_str()).set_value(invoice_name);
        }
        if let Some(cell) = &self.config.invoice.date_cell {
            worksheet.get_cell_mut(cell.as_str()).set_value(date_token);
        }

        for mapping in &self.config.fields {
            let value = render_mapping(mapping, sheet, row);
            worksheet.get_cell_mut(mapping.cell.as_str()).set_value(value);
        }

        umya_spreadsheet::writer::xlsx::write(&book, output).map_err(|e| {
            StampError::Template(format!("Failed to save {}: {}", output.display(), e))
        })?;

        Ok(())
    }
}

/// A4 portrait, scaled to one page wide and one page tall.
fn apply_fit_to_page(worksheet: &mut Worksheet) {
    let setup = worksheet.get_page_setup_mut();
    setup.set_paper_size(PAPER_SIZE_A4);
    setup.set_orientation(OrientationValues::Portrait);
    setup.set_fit_to_width(1);
    setup.set_fit_to_height(1);
}

/// Resolve one mapping to the string stamped into its cell.
pub fn render_mapping(mapping: &FieldMapping, sheet: &OrderSheet, row: &OrderRow) -> String {
    if let Some(column) = &mapping.column {
        return field_string(sheet, row, column);
    }
    if let Some(template) = &mapping.template {
        return render_template(template, sheet, row);
    }
    // Config validation guarantees one of the two is set
    String::new()
}

/// Replace `{Column Name}` placeholders with the row's rendered values.
/// Unknown columns render as empty strings.
pub fn render_template(template: &str, sheet: &OrderSheet, row: &OrderRow) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| field_string(sheet, row, &caps[1]))
        .into_owned()
}

fn field_string(sheet: &OrderSheet, row: &OrderRow, column: &str) -> String {
    match sheet.column_index(column) {
        Some(idx) => row.get(idx).render(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    fn sample_sheet() -> OrderSheet {
        OrderSheet {
            columns: vec![
                "Address".to_string(),
                "TEL".to_string(),
                "Doctor's Name".to_string(),
            ],
            rows: vec![OrderRow::new(vec![
                FieldValue::Text("1-2-3 Ginza, Tokyo".to_string()),
                FieldValue::Text("03-1234-5678".to_string()),
                FieldValue::Text("Tanaka".to_string()),
            ])],
        }
    }

    #[test]
    fn test_render_template_composite() {
        let sheet = sample_sheet();
        let rendered = render_template(
            "{Address} {TEL}\nDr.{Doctor's Name} +81 90 9302 0682",
            &sheet,
            &sheet.rows[0],
        );
        assert_eq!(
            rendered,
            "1-2-3 Ginza, Tokyo 03-1234-5678\nDr.Tanaka +81 90 9302 0682"
        );
    }

    #[test]
    fn test_render_template_unknown_column_is_empty() {
        let sheet = sample_sheet();
        assert_eq!(
            render_template("[{Missing}]", &sheet, &sheet.rows[0]),
            "[]"
        );
    }

    #[test]
    fn test_render_template_without_placeholders() {
        let sheet = sample_sheet();
        assert_eq!(
            render_template("plain text", &sheet, &sheet.rows[0]),
            "plain text"
        );
    }
}
