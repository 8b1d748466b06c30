//! Table-driven converters (shoe sizes, ring sizes, ...).
//!
//! Every size-chart calculator is the same engine over different data: find
//! the row whose `from` column holds the value and read its `to` column.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Instant;

use crate::error::CalcError;
use crate::types::{with_metadata, ComputationOutput, Precision};
use crate::CalcResult;

const BUILTIN_DATA: &str = include_str!("../../data/lookup_tables.json");

/// Numeric cells closer than this are the same size.
const NUMERIC_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LookupTable {
    /// Every row must carry exactly one cell per column, and column names
    /// must be unique ignoring case.
    pub fn validate(&self) -> CalcResult<()> {
        if self.columns.is_empty() {
            return Err(CalcError::invalid("columns", "Table has no columns"));
        }
        for (i, c) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|p| p.eq_ignore_ascii_case(c)) {
                return Err(CalcError::invalid(
                    "columns",
                    format!("Duplicate column '{c}' in table '{}'", self.id),
                ));
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(CalcError::invalid(
                    "rows",
                    format!(
                        "Row {i} of table '{}' has {} cells, expected {}",
                        self.id,
                        row.len(),
                        self.columns.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, key: &str) -> CalcResult<usize> {
        let key = key.trim();
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(key))
            .ok_or_else(|| {
                CalcError::invalid(
                    "column",
                    format!(
                        "Table '{}' has no column '{key}' (columns: {})",
                        self.id,
                        self.columns.join(", ")
                    ),
                )
            })
    }

    /// First row whose `from_key` cell matches `from_value`.
    pub fn find_row(&self, from_key: &str, from_value: &str) -> CalcResult<&[String]> {
        let col = self.column_index(from_key)?;
        self.rows
            .iter()
            .find(|row| cells_match(&row[col], from_value))
            .map(Vec::as_slice)
            .ok_or_else(|| CalcError::LookupMiss {
                table: self.id.clone(),
                column: self.columns[col].clone(),
                value: from_value.to_string(),
            })
    }
}

fn cells_match(cell: &str, value: &str) -> bool {
    let (a, b) = (cell.trim(), value.trim());
    if a.to_lowercase() == b.to_lowercase() {
        return true;
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => (x - y).abs() < NUMERIC_EPS,
        _ => false,
    }
}

/// Convert `from_value` in column `from_key` to the matching `to_key` cell.
pub fn lookup_convert(
    table: &LookupTable,
    from_key: &str,
    from_value: &str,
    to_key: &str,
) -> CalcResult<String> {
    let to = table.column_index(to_key)?;
    let row = table.find_row(from_key, from_value)?;
    Ok(row[to].clone())
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

static BUILTIN: OnceLock<Result<Vec<LookupTable>, String>> = OnceLock::new();

fn parse_builtin() -> Result<Vec<LookupTable>, String> {
    let tables: Vec<LookupTable> =
        serde_json::from_str(BUILTIN_DATA).map_err(|e| e.to_string())?;
    for t in &tables {
        t.validate().map_err(|e| e.to_string())?;
    }
    Ok(tables)
}

/// Tables shipped with the crate.
pub fn builtin_tables() -> CalcResult<&'static [LookupTable]> {
    match BUILTIN.get_or_init(parse_builtin) {
        Ok(tables) => Ok(tables.as_slice()),
        Err(e) => Err(CalcError::SerializationError(format!(
            "built-in lookup tables: {e}"
        ))),
    }
}

pub fn builtin_table(id: &str) -> CalcResult<&'static LookupTable> {
    builtin_tables()?
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CalcError::invalid("table", format!("No built-in table '{id}'")))
}

// ---------------------------------------------------------------------------
// Calculator entry point
// ---------------------------------------------------------------------------

/// A built-in table id, or a table supplied inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableRef {
    Builtin(String),
    Inline(LookupTable),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupInput {
    pub table: TableRef,
    pub from: String,
    /// Cell value to look up; numbers are accepted as well as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupOutput {
    pub table: String,
    pub result: String,
    /// The whole matched row, keyed by column.
    pub row: BTreeMap<String, String>,
}

/// Size-chart style conversion through a lookup table.
pub fn lookup(input: &LookupInput) -> CalcResult<ComputationOutput<LookupOutput>> {
    let start = Instant::now();

    let table = match &input.table {
        TableRef::Builtin(id) => builtin_table(id)?,
        TableRef::Inline(t) => {
            t.validate()?;
            t
        }
    };

    let to = table.column_index(&input.to)?;
    let row = table.find_row(&input.from, &input.value)?;

    let output = LookupOutput {
        table: table.id.clone(),
        result: row[to].clone(),
        row: table
            .columns
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "match": "first row, case-insensitive text or numeric equality",
        "table_name": table.name,
    });

    Ok(with_metadata(
        "Lookup table conversion",
        &assumptions,
        Vec::new(),
        elapsed,
        Precision::Float64,
        output,
    ))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
