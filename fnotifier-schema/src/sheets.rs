//! Google Sheets v4 `spreadsheets.values.append` payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `valueInputOption`: cells are stored exactly as sent, never parsed as formulas.
pub const VALUE_INPUT_OPTION_RAW: &str = "RAW";

/// `insertDataOption`: new rows are inserted after the table instead of overwriting.
pub const INSERT_DATA_OPTION_INSERT_ROWS: &str = "INSERT_ROWS";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// A range body carrying exactly one row of plain strings.
    pub fn single_row<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row = cells
            .into_iter()
            .map(|cell| Value::String(cell.into()))
            .collect();
        Self {
            values: vec![row],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u64>,
    #[serde(default)]
    pub updated_cells: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}
