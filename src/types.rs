use std::fmt;

//==============================================================================
// Field Values
//==============================================================================

/// A single cell value read from the order sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Empty,
}

impl FieldValue {
    /// Render the value the way it is stamped into the template.
    ///
    /// Absent fields render as the empty string rather than erroring.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "Number",
            FieldValue::Text(_) => "Text",
            FieldValue::Boolean(_) => "Boolean",
            FieldValue::Empty => "Empty",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Format a number for display, removing unnecessary decimal places.
/// Order quantities arrive from Excel as floats; "3.0" must stamp as "3".
pub fn format_number(n: f64) -> String {
    // Round to 6 decimal places, which also absorbs float artifacts
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

//==============================================================================
// Order Sheet
//==============================================================================

static EMPTY_FIELD: FieldValue = FieldValue::Empty;

/// One order record. Values are aligned with `OrderSheet::columns`.
#[derive(Debug, Clone, Default)]
pub struct OrderRow {
    pub values: Vec<FieldValue>,
}

impl OrderRow {
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    /// Value at a column index; out-of-range reads as an empty field.
    pub fn get(&self, idx: usize) -> &FieldValue {
        self.values.get(idx).unwrap_or(&EMPTY_FIELD)
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(FieldValue::is_empty)
    }
}

/// The loaded order sheet: named columns plus one `OrderRow` per order.
#[derive(Debug, Clone, Default)]
pub struct OrderSheet {
    pub columns: Vec<String>,
    pub rows: Vec<OrderRow>,
}

impl OrderSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by exact name. First occurrence wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Field value by row index and column name. Unknown columns and
    /// out-of-range rows read as empty fields.
    pub fn field(&self, row: usize, column: &str) -> &FieldValue {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(row), Some(idx)) => row.get(idx),
            _ => &EMPTY_FIELD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_strips_trailing_zeros() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(19.99), "19.99");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn test_format_number_rounds_artifacts() {
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }

    #[test]
    fn test_render() {
        assert_eq!(FieldValue::Text("Tanaka".to_string()).render(), "Tanaka");
        assert_eq!(FieldValue::Number(20.0).render(), "20");
        assert_eq!(FieldValue::Boolean(true).render(), "true");
        assert_eq!(FieldValue::Empty.render(), "");
    }

    #[test]
    fn test_field_lookup() {
        let sheet = OrderSheet {
            columns: vec!["Clinic Name".to_string(), "Qty".to_string()],
            rows: vec![OrderRow::new(vec![
                FieldValue::Text("Shinagawa".to_string()),
                FieldValue::Number(3.0),
            ])],
        };

        assert_eq!(sheet.field(0, "Clinic Name").render(), "Shinagawa");
        assert_eq!(sheet.field(0, "Qty").render(), "3");
        // Unknown column and unknown row both read as empty
        assert_eq!(sheet.field(0, "Nope"), &FieldValue::Empty);
        assert_eq!(sheet.field(9, "Qty"), &FieldValue::Empty);
    }

    #[test]
    fn test_duplicate_column_first_wins() {
        let sheet = OrderSheet {
            columns: vec!["TEL".to_string(), "TEL".to_string()],
            rows: vec![],
        };
        assert_eq!(sheet.column_index("TEL"), Some(0));
    }

    #[test]
    fn test_blank_row() {
        assert!(OrderRow::new(vec![FieldValue::Empty, FieldValue::Empty]).is_blank());
        assert!(!OrderRow::new(vec![FieldValue::Number(1.0)]).is_blank());
    }
}
