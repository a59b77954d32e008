//! Cross-page accumulation of field values and the final rectangular table.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// A user-chosen field name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldRequest(String);

impl FieldRequest {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a comma-separated list into field requests, dropping blanks and
/// repeated names.
///
/// ```
/// use skim_extract::accumulator::parse_field_list;
///
/// let fields = parse_field_list(" title, date,, title ,author ");
/// let names: Vec<_> = fields.iter().map(|f| f.as_str()).collect();
/// assert_eq!(names, ["title", "date", "author"]);
/// ```
pub fn parse_field_list(raw: &str) -> Vec<FieldRequest> {
    let mut out: Vec<FieldRequest> = Vec::new();
    for part in raw.split(',') {
        let field = FieldRequest::new(part);
        if !field.as_str().is_empty() && !out.contains(&field) {
            out.push(field);
        }
    }
    out
}

/// One cleaned value and the page it was first seen on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedValue {
    pub text: String,
    pub page: u32,
}

#[derive(Debug, Clone)]
struct Column {
    field: FieldRequest,
    values: Vec<ExtractedValue>,
    seen: HashSet<String>,
}

/// Per-field ordered sets of unique values. Only ever grows.
#[derive(Debug, Clone)]
pub struct FieldAccumulator {
    columns: Vec<Column>,
}

impl FieldAccumulator {
    pub fn new(fields: &[FieldRequest]) -> Self {
        let mut columns: Vec<Column> = Vec::with_capacity(fields.len());
        for field in fields {
            if columns.iter().any(|c| &c.field == field) {
                continue;
            }
            columns.push(Column {
                field: field.clone(),
                values: Vec::new(),
                seen: HashSet::new(),
            });
        }
        Self { columns }
    }

    /// Append the values not yet recorded for `field`; returns how many were new.
    ///
    /// Values for a field that was not requested are ignored.
    pub fn append<I>(&mut self, field: &FieldRequest, page: u32, values: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let Some(column) = self.columns.iter_mut().find(|c| &c.field == field) else {
            return 0;
        };
        let mut added = 0;
        for text in values {
            if column.seen.insert(text.clone()) {
                column.values.push(ExtractedValue { text, page });
                added += 1;
            }
        }
        added
    }

    pub fn values(&self, field: &FieldRequest) -> &[ExtractedValue] {
        self.columns
            .iter()
            .find(|c| &c.field == field)
            .map(|c| c.values.as_slice())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldRequest> {
        self.columns.iter().map(|c| &c.field)
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Pad every column to the longest one and emit the table.
    pub fn finalize(self) -> SessionResult {
        let names = self.columns.iter().map(|c| c.field.to_string()).collect();
        let height = self
            .columns
            .iter()
            .map(|c| c.values.len())
            .max()
            .unwrap_or(0);
        let rows = (0..height)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| c.values.get(i).map(|v| v.text.clone()).unwrap_or_default())
                    .collect()
            })
            .collect();
        SessionResult {
            columns: names,
            rows,
        }
    }
}

/// Rectangular table handed to the output sink: every row has one cell per
/// column and missing cells are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SessionResult {
    /// Build a table from rows, padding short rows and cutting long ones to
    /// the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|r| r.len() == self.columns.len())
    }
}
