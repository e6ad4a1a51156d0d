//! Job configuration: the declarative column → cell mapping that turns
//! the near-duplicate invoice layouts into presets of one program.

use crate::error::{StampError, StampResult};
use jsonschema::JSONSchema;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Names of the job configurations shipped with the binary.
pub const PRESETS: &[&str] = &["doctor", "courier"];

/// A job configuration: where outputs go and which order-sheet fields
/// land in which template cells.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Output folder becomes `<folder_prefix>_<date-token>`
    pub folder_prefix: String,

    /// Source worksheet name; default is the first sheet
    #[serde(default)]
    pub sheet: Option<String>,

    /// Cells that receive the invoice number and the raw date token
    #[serde(default)]
    pub invoice: InvoiceCells,

    /// Field mappings applied per row, in order
    pub fields: Vec<FieldMapping>,

    /// Column → label renames used by row previews
    #[serde(default)]
    pub display: BTreeMap<String, String>,

    /// Force A4 portrait, fit to one page, on every output
    #[serde(default)]
    pub fit_to_page: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceCells {
    #[serde(default)]
    pub number_cell: Option<String>,

    #[serde(default)]
    pub date_cell: Option<String>,
}

/// One destination cell and its source: either a single `column`
/// (written verbatim) or a `template` with `{Column Name}` placeholders.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    pub cell: String,

    #[serde(default)]
    pub column: Option<String>,

    #[serde(default)]
    pub template: Option<String>,
}

fn cell_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{1,3}[1-9][0-9]*$").expect("cell ref regex"))
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder regex"))
}

/// Check an A1-style cell reference (after uppercasing).
pub fn is_cell_ref(s: &str) -> bool {
    cell_ref_re().is_match(s)
}

impl JobConfig {
    /// Every source column the mappings reference, in mapping order,
    /// template placeholders included.
    pub fn referenced_columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        for mapping in &self.fields {
            if let Some(column) = &mapping.column {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
            if let Some(template) = &mapping.template {
                for caps in placeholder_re().captures_iter(template) {
                    let column = caps[1].to_string();
                    if !columns.contains(&column) {
                        columns.push(column);
                    }
                }
            }
        }
        columns
    }

    /// Uppercase all cell references so `b9` and `B9` mean the same cell.
    fn normalize(&mut self) {
        if let Some(cell) = self.invoice.number_cell.as_mut() {
            *cell = cell.to_uppercase();
        }
        if let Some(cell) = self.invoice.date_cell.as_mut() {
            *cell = cell.to_uppercase();
        }
        for mapping in &mut self.fields {
            mapping.cell = mapping.cell.to_uppercase();
        }
    }

    /// Structural validation beyond what serde enforces.
    fn validate(&self) -> StampResult<()> {
        if self.folder_prefix.trim().is_empty() {
            return Err(StampError::Config(
                "folder_prefix must not be empty".to_string(),
            ));
        }
        if self.fields.is_empty() {
            return Err(StampError::Config(
                "at least one field mapping is required".to_string(),
            ));
        }

        for cell in [&self.invoice.number_cell, &self.invoice.date_cell]
            .into_iter()
            .flatten()
        {
            if !is_cell_ref(cell) {
                return Err(StampError::Config(format!(
                    "invoice cell '{}' is not a valid cell reference",
                    cell
                )));
            }
        }

        for mapping in &self.fields {
            if !is_cell_ref(&mapping.cell) {
                return Err(StampError::Config(format!(
                    "'{}' is not a valid cell reference",
                    mapping.cell
                )));
            }
            match (&mapping.column, &mapping.template) {
                (Some(_), Some(_)) => {
                    return Err(StampError::Config(format!(
                        "mapping for cell {} has both 'column' and 'template'",
                        mapping.cell
                    )));
                }
                (None, None) => {
                    return Err(StampError::Config(format!(
                        "mapping for cell {} needs 'column' or 'template'",
                        mapping.cell
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Parse and validate a job configuration from YAML text.
pub fn parse_config(content: &str) -> StampResult<JobConfig> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // Schema validation is advisory - warn but continue
    if let Err(e) = validate_against_schema(&yaml) {
        eprintln!("Warning: schema validation failed: {}", e);
    }

    let mut config: JobConfig = serde_yaml::from_value(yaml)?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Load a job configuration from a YAML file.
pub fn load_config(path: &Path) -> StampResult<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load one of the built-in presets.
pub fn load_preset(name: &str) -> StampResult<JobConfig> {
    let source = preset_source(name).ok_or_else(|| {
        StampError::Config(format!(
            "unknown preset '{}' (available: {})",
            name,
            PRESETS.join(", ")
        ))
    })?;
    parse_config(source)
}

/// YAML source of a built-in preset.
pub fn preset_source(name: &str) -> Option<&'static str> {
    match name {
        "doctor" => Some(include_str!("../presets/doctor.yaml")),
        "courier" => Some(include_str!("../presets/courier.yaml")),
        _ => None,
    }
}

/// Validate config YAML against the embedded JSON Schema.
fn validate_against_schema(yaml: &serde_yaml::Value) -> StampResult<()> {
    let schema_str = include_str!("../schema/stampa-config.schema.json");
    let schema_value: serde_json::Value = serde_json::from_str(schema_str)
        .map_err(|e| StampError::Config(format!("Failed to parse schema: {}", e)))?;

    let compiled_schema = JSONSchema::compile(&schema_value)
        .map_err(|e| StampError::Config(format!("Failed to compile schema: {}", e)))?;

    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| StampError::Config(format!("Failed to convert YAML to JSON: {}", e)))?;

    if let Err(errors) = compiled_schema.validate(&json_value) {
        let error_messages: Vec<String> = errors.map(|e| format!("  - {}", e)).collect();
        return Err(StampError::Config(format!(
            "Schema validation failed:\n{}",
            error_messages.join("\n")
        )));
    }

    Ok(())
}
