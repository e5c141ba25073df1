//! Column-oriented record sets.
//!
//! Several IG endpoints return lists of loosely structured records. They
//! are exposed as a [`Table`]: an ordered list of column names plus rows
//! of JSON values. [`Table::normalize`] flattens nested objects into
//! `.`-joined column names (`openPrice.bid`), which is the shape the
//! reshaping rules in the services operate on.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Timestamp layouts IG uses for `snapshotTime` across API versions.
const SNAPSHOT_TIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y:%m:%d-%H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// An ordered set of named columns over rows of JSON values.
///
/// Missing cells are `Value::Null`. Column order is the order in which
/// columns were first seen.
///
/// ```
/// use ig_rest::Table;
/// use serde_json::json;
///
/// let table = Table::normalize(&[
///     json!({"epic": "A", "balance": {"available": 10}}),
///     json!({"epic": "B"}),
/// ])
/// .unwrap();
///
/// assert_eq!(table.columns(), &["epic", "balance.available"]);
/// assert_eq!(table.get(1, "balance.available"), Some(&json!(null)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// An empty table with a fixed column schema.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from records, flattening nested objects into
    /// `.`-joined column names. Arrays are kept as cell values.
    pub fn normalize(records: &[Value]) -> Result<Self> {
        Self::build(records, true)
    }

    /// Build a table from records without flattening; nested objects
    /// stay as cell values.
    pub fn from_records(records: &[Value]) -> Result<Self> {
        Self::build(records, false)
    }

    fn build(records: &[Value], flatten: bool) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let object = record.as_object().ok_or_else(|| {
                Error::UnexpectedResponse(format!("expected a JSON object record, got {record}"))
            })?;

            let mut cells = Vec::new();
            if flatten {
                flatten_into(None, object, &mut cells);
            } else {
                cells.extend(object.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            let mut row = Vec::new();
            for (name, value) in cells {
                let idx = *positions.entry(name.clone()).or_insert_with(|| {
                    columns.push(name);
                    columns.len() - 1
                });
                if row.len() <= idx {
                    row.resize(idx + 1, Value::Null);
                }
                row[idx] = value;
            }
            rows.push(row);
        }

        for row in &mut rows {
            row.resize(columns.len(), Value::Null);
        }

        Ok(Self { columns, rows })
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, each aligned with [`columns`](Self::columns).
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns `true` if the column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// A single cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Remove the named columns. Names that are not present are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();

        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Rename columns by `(from, to)` pairs. Absent names are ignored.
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) {
        for column in &mut self.columns {
            if let Some((_, to)) = renames.iter().find(|(from, _)| column.as_str() == *from) {
                *column = (*to).to_string();
            }
        }
    }

    /// Remove a column and return its values.
    pub fn take_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        Some(self.rows.iter_mut().map(|row| row.remove(idx)).collect())
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Move a timestamp column out of the table and into a time index.
    pub fn into_time_series(
        mut self,
        column: &str,
        index_name: impl Into<String>,
    ) -> Result<TimeSeries> {
        let values = self.take_column(column).ok_or_else(|| {
            Error::UnexpectedResponse(format!("missing timestamp column {column}"))
        })?;

        let index = values
            .iter()
            .map(parse_timestamp)
            .collect::<Result<Vec<_>>>()?;

        Ok(TimeSeries {
            index_name: index_name.into(),
            index,
            table: self,
        })
    }
}

fn flatten_into(prefix: Option<&str>, object: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in object {
        let name = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(Some(&name), nested, out),
            other => out.push((name, other.clone())),
        }
    }
}

fn parse_timestamp(value: &Value) -> Result<NaiveDateTime> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::UnexpectedResponse(format!("timestamp is not a string: {value}")))?;

    SNAPSHOT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| Error::UnexpectedResponse(format!("unrecognised timestamp: {text}")))
}

/// A [`Table`] indexed by timestamps, one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    index_name: String,
    index: Vec<NaiveDateTime>,
    table: Table,
}

impl TimeSeries {
    /// An empty series with a fixed column schema.
    pub fn empty<I, S>(index_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_name: index_name.into(),
            index: Vec::new(),
            table: Table::with_columns(columns),
        }
    }

    /// Name of the index (`"DateTime"` for prices).
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Row timestamps.
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// The data columns.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Mutable access to the data columns.
    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate `(timestamp, row)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &Vec<Value>)> {
        self.index.iter().zip(self.table.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_normalize_flattens_nested_objects() {
        let table = Table::normalize(&[json!({
            "snapshotTime": "2024/01/05 10:00:00",
            "openPrice": {"bid": 1.1, "ask": 1.2, "lastTraded": null},
            "lastTradedVolume": 42
        })])
        .unwrap();

        assert_eq!(
            table.columns(),
            &[
                "snapshotTime",
                "openPrice.bid",
                "openPrice.ask",
                "openPrice.lastTraded",
                "lastTradedVolume"
            ]
        );
        assert_eq!(table.get(0, "openPrice.ask"), Some(&json!(1.2)));
    }

    #[test]
    fn test_normalize_unions_columns_in_first_seen_order() {
        let table = Table::normalize(&[json!({"a": 1}), json!({"b": 2, "a": 3})]).unwrap();

        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.rows()[0], vec![json!(1), Value::Null]);
        assert_eq!(table.rows()[1], vec![json!(3), json!(2)]);
    }

    #[test]
    fn test_normalize_keeps_arrays_and_deep_paths() {
        let table = Table::normalize(&[json!({
            "a": {"b": {"c": 1}},
            "tags": [1, 2]
        })])
        .unwrap();

        assert_eq!(table.columns(), &["a.b.c", "tags"]);
        assert_eq!(table.get(0, "tags"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_from_records_does_not_flatten() {
        let table = Table::from_records(&[json!({"details": {"size": 1}})]).unwrap();
        assert_eq!(table.columns(), &["details"]);
        assert_eq!(table.get(0, "details"), Some(&json!({"size": 1})));
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        assert!(Table::normalize(&[json!(5)]).is_err());
    }

    #[test]
    fn test_drop_and_rename() {
        let mut table =
            Table::normalize(&[json!({"x": {"keep": 1, "drop": 2}, "y": 3})]).unwrap();
        table.drop_columns(&["x.drop", "not-there"]);
        table.rename_columns(&[("x.keep", "keep")]);

        assert_eq!(table.columns(), &["keep", "y"]);
        assert_eq!(table.rows()[0], vec![json!(1), json!(3)]);
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let table = Table::with_columns(["id", "name"]);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["id", "name"]);
        assert_eq!(table.column("id"), Some(vec![]));
    }

    #[test]
    fn test_into_time_series() {
        let table = Table::normalize(&[
            json!({"snapshotTime": "2024/01/05 10:00:00", "v": 1}),
            json!({"snapshotTime": "2024-01-05T10:01:00", "v": 2}),
            json!({"snapshotTime": "2024:01:05-10:02:00", "v": 3}),
        ])
        .unwrap();

        let series = table.into_time_series("snapshotTime", "DateTime").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(series.index_name(), "DateTime");
        assert_eq!(series.table().columns(), &["v"]);
        assert_eq!(series.index()[0], day.and_hms_opt(10, 0, 0).unwrap());
        assert_eq!(series.index()[2], day.and_hms_opt(10, 2, 0).unwrap());
    }

    #[test]
    fn test_into_time_series_rejects_bad_timestamp() {
        let table = Table::normalize(&[json!({"snapshotTime": "yesterday"})]).unwrap();
        assert!(table.into_time_series("snapshotTime", "DateTime").is_err());
    }

    #[test]
    fn test_to_records() {
        let table = Table::normalize(&[json!({"a": 1, "b": {"c": 2}})]).unwrap();
        let records = table.to_records();
        assert_eq!(records[0]["b.c"], json!(2));
    }
}
