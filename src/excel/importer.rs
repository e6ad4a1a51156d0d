//! Order sheet reader - Excel (.xlsx) → `OrderSheet`

use crate::error::{StampError, StampResult};
use crate::types::{FieldValue, OrderRow, OrderSheet};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::{Path, PathBuf};

/// Placeholder prefix spreadsheet tools give to header cells without a
/// real name ("Unnamed: 0", ...). Such columns carry no order data.
const UNNAMED_PREFIX: &str = "Unnamed";

/// Reads an order sheet into rows of typed field values.
pub struct SheetImporter {
    path: PathBuf,
    sheet: Option<String>,
}

impl SheetImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: None,
        }
    }

    /// Select a worksheet by name instead of the first one.
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    /// Import the order sheet.
    pub fn import(&self) -> StampResult<OrderSheet> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| StampError::Sheet(format!("Failed to open order sheet: {}", e)))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = match &self.sheet {
            Some(name) => {
                if !sheet_names.iter().any(|n| n == name) {
                    return Err(StampError::Sheet(format!(
                        "Worksheet '{}' not found (available: {})",
                        name,
                        sheet_names.join(", ")
                    )));
                }
                name.clone()
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| StampError::Sheet("Workbook has no worksheets".to_string()))?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| StampError::Sheet(format!("Failed to read '{}': {}", sheet_name, e)))?;

        build_sheet(&range)
    }
}

/// Build an `OrderSheet` from a worksheet range. Row 0 is the header.
fn build_sheet(range: &Range<Data>) -> StampResult<OrderSheet> {
    if range.is_empty() {
        return Err(StampError::Sheet("Order sheet is empty".to_string()));
    }

    let (height, width) = range.get_size();

    // Header row: keep named columns, remember their physical position.
    // Unnamed placeholder columns are excluded from processing and
    // display; duplicate names resolve to the first occurrence.
    let mut columns: Vec<String> = Vec::new();
    let mut kept: Vec<usize> = Vec::new();
    for col in 0..width {
        let name = match range.get((0, col)) {
            Some(Data::String(s)) => s.clone(),
            Some(Data::Empty) | None => String::new(),
            Some(other) => other.to_string(),
        };
        if name.is_empty() || name.starts_with(UNNAMED_PREFIX) {
            continue;
        }
        if columns.contains(&name) {
            continue;
        }
        columns.push(name);
        kept.push(col);
    }

    if columns.is_empty() {
        return Err(StampError::Sheet(
            "Header row has no named columns".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for row in 1..height {
        let values: Vec<FieldValue> = kept
            .iter()
            .map(|&col| convert_cell(range.get((row, col))))
            .collect();
        let row = OrderRow::new(values);
        // Formatting often pads the used range with blank rows; a blank
        // row is not an order
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(OrderSheet { columns, rows })
}

fn convert_cell(cell: Option<&Data>) -> FieldValue {
    match cell {
        None | Some(Data::Empty) => FieldValue::Empty,
        Some(Data::Float(f)) => FieldValue::Number(*f),
        Some(Data::Int(i)) => FieldValue::Number(*i as f64),
        Some(Data::Bool(b)) => FieldValue::Boolean(*b),
        Some(Data::String(s)) => {
            if s.is_empty() {
                FieldValue::Empty
            } else {
                FieldValue::Text(s.clone())
            }
        }
        // Dates, durations and error cells degrade to their text form
        Some(other) => FieldValue::Text(other.to_string()),
    }
}
