//! Schema catalog
//!
//! Introspects tables/columns, distinct column values and per-column
//! statistics. The rendered catalog is the schema context embedded in
//! generation prompts; distinct values and stats are what a UI offers
//! next to its filter choices.

use crate::execution::db::SqlStore;
use anyhow::{bail, Context, Result};
use rusqlite::types::ValueRef;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Rows scanned per stats request
pub const STATS_ROW_LIMIT: usize = 1000;
/// Sample values reported per column
pub const STATS_SAMPLE_SIZE: usize = 5;

/// One column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

/// One table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Summary of one column over the (filtered) rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub unique_values: usize,
    pub null_count: usize,
    pub sample_values: Vec<String>,
    /// Present when every non-null value is numeric
    #[serde(flatten)]
    pub numeric: Option<NumericStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl NumericStats {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };
        Some(Self {
            min: values[0],
            max: values[n - 1],
            mean: values.iter().sum::<f64>() / n as f64,
            median,
        })
    }
}

/// Accumulates one column's values row by row
#[derive(Default)]
struct StatsBuilder {
    nulls: usize,
    seen: HashSet<String>,
    samples: Vec<String>,
    numbers: Vec<f64>,
    non_numeric: bool,
}

impl StatsBuilder {
    fn push(&mut self, value: ValueRef<'_>) {
        let rendered = match value {
            ValueRef::Null => {
                self.nulls += 1;
                return;
            }
            ValueRef::Integer(i) => {
                self.numbers.push(i as f64);
                i.to_string()
            }
            ValueRef::Real(f) => {
                self.numbers.push(f);
                f.to_string()
            }
            ValueRef::Text(t) => {
                self.non_numeric = true;
                String::from_utf8_lossy(t).into_owned()
            }
            ValueRef::Blob(b) => {
                self.non_numeric = true;
                b.iter().map(|byte| format!("{:02x}", byte)).collect()
            }
        };
        if self.samples.len() < STATS_SAMPLE_SIZE {
            self.samples.push(rendered.clone());
        }
        self.seen.insert(rendered);
    }

    fn finish(self) -> ColumnStats {
        let numeric = if self.non_numeric {
            None
        } else {
            NumericStats::from_values(self.numbers)
        };
        ColumnStats {
            unique_values: self.seen.len(),
            null_count: self.nulls,
            sample_values: self.samples,
            numeric,
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqlStore {
    /// All user tables, by name, with their columns in declaration order
    pub fn describe_schema(&self) -> Result<Vec<TableSchema>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .context("Failed to list tables")?;
        let names: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let mut info = conn
                .prepare(&format!("PRAGMA table_info({})", quote_ident(&name)))
                .with_context(|| format!("Failed to inspect table {}", name))?;
            let columns = info
                .query_map([], |row| {
                    Ok(ColumnSchema {
                        name: row.get(1)?,
                        data_type: row.get(2)?,
                        nullable: row.get::<_, i64>(3)? == 0,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            tables.push(TableSchema { name, columns });
        }

        Ok(tables)
    }

    /// Distinct non-null values of `table.column`, ascending
    ///
    /// Both identifiers must exist in the catalog; they are never
    /// interpolated unchecked.
    pub fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<String>> {
        let schema = self.describe_schema()?;
        let Some(found) = schema.iter().find(|t| t.name == table) else {
            bail!("Unknown table: {}", table);
        };
        if found.column(column).is_none() {
            bail!("Unknown column: {}.{}", table, column);
        }

        let sql = format!(
            "SELECT DISTINCT CAST({col} AS TEXT) FROM {tbl} WHERE {col} IS NOT NULL ORDER BY {col}",
            col = quote_ident(column),
            tbl = quote_ident(table)
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    /// Stats for `columns` of `table` over at most [`STATS_ROW_LIMIT`] rows
    ///
    /// `selected_values` narrows the rows: each entry with a non-empty value
    /// list becomes `column IN (...)`, combined with AND. Every identifier is
    /// checked against the catalog; filter values are bound as parameters.
    pub fn column_stats(
        &self,
        table: &str,
        columns: &[String],
        selected_values: &BTreeMap<String, Vec<String>>,
    ) -> Result<BTreeMap<String, ColumnStats>> {
        if columns.is_empty() {
            bail!("Columns are required");
        }
        let schema = self.describe_schema()?;
        let Some(found) = schema.iter().find(|t| t.name == table) else {
            bail!("Unknown table: {}", table);
        };
        for column in columns.iter().chain(selected_values.keys()) {
            if found.column(column).is_none() {
                bail!("Unknown column: {}.{}", table, column);
            }
        }

        let mut conditions = Vec::new();
        let mut params = Vec::new();
        for (column, values) in selected_values {
            if values.is_empty() {
                continue;
            }
            let placeholders = vec!["?"; values.len()].join(", ");
            conditions.push(format!("{} IN ({})", quote_ident(column), placeholders));
            params.extend(values.iter().map(String::as_str));
        }

        let projection: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let mut sql = format!("SELECT {} FROM {}", projection.join(", "), quote_ident(table));
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(" LIMIT {}", STATS_ROW_LIMIT));

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare stats query for {}", table))?;
        let mut builders: Vec<StatsBuilder> = columns.iter().map(|_| StatsBuilder::default()).collect();
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        while let Some(row) = rows.next()? {
            for (i, builder) in builders.iter_mut().enumerate() {
                builder.push(row.get_ref(i)?);
            }
        }

        Ok(columns
            .iter()
            .cloned()
            .zip(builders.into_iter().map(StatsBuilder::finish))
            .collect())
    }
}

/// Render tables as prompt context, one table per line
///
/// `sampledb(id INTEGER, region TEXT, units INTEGER)`
pub fn render_schema_context(tables: &[TableSchema]) -> String {
    tables
        .iter()
        .map(|table| {
            let columns: Vec<String> = table
                .columns
                .iter()
                .map(|c| {
                    if c.data_type.is_empty() {
                        c.name.clone()
                    } else {
                        format!("{} {}", c.name, c.data_type)
                    }
                })
                .collect();
            format!("{}({})", table.name, columns.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqlStore {
        let store = SqlStore::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE sampledb (id INTEGER PRIMARY KEY, region TEXT NOT NULL, units INTEGER);
                 INSERT INTO sampledb (region, units) VALUES ('West', 3), ('East', 5), ('West', 1);",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_describe_schema() {
        let tables = store().describe_schema().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "sampledb");
        let names: Vec<_> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "region", "units"]);
        assert!(!tables[0].column("region").unwrap().nullable);
        assert!(tables[0].column("units").unwrap().nullable);
    }

    #[test]
    fn test_distinct_values_sorted() {
        let values = store().distinct_values("sampledb", "region").unwrap();
        assert_eq!(values, vec!["East", "West"]);
    }

    #[test]
    fn test_distinct_values_unknown_identifiers() {
        let store = store();
        assert!(store.distinct_values("nope", "region").is_err());
        assert!(store.distinct_values("sampledb", "region; DROP TABLE x").is_err());
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_column_stats_numeric_and_text() {
        let store = store();
        store
            .execute_batch("INSERT INTO sampledb (region, units) VALUES ('North', NULL)")
            .unwrap();
        let stats = store
            .column_stats("sampledb", &cols(&["region", "units"]), &BTreeMap::new())
            .unwrap();

        let region = &stats["region"];
        assert_eq!(region.unique_values, 3);
        assert_eq!(region.null_count, 0);
        assert_eq!(region.sample_values, vec!["West", "East", "West", "North"]);
        assert!(region.numeric.is_none());

        let units = &stats["units"];
        assert_eq!(units.unique_values, 3);
        assert_eq!(units.null_count, 1);
        assert_eq!(
            units.numeric,
            Some(NumericStats { min: 1.0, max: 5.0, mean: 3.0, median: 3.0 })
        );
    }

    #[test]
    fn test_column_stats_filtered_even_median() {
        let mut filter = BTreeMap::new();
        filter.insert("region".to_string(), vec!["West".to_string()]);
        let stats = store()
            .column_stats("sampledb", &cols(&["units"]), &filter)
            .unwrap();
        let numeric = stats["units"].numeric.unwrap();
        assert_eq!(numeric.median, 2.0);
        assert_eq!(numeric.mean, 2.0);
        assert_eq!(stats["units"].sample_values, vec!["3", "1"]);
    }

    #[test]
    fn test_column_stats_empty_filter_list_is_ignored() {
        let mut filter = BTreeMap::new();
        filter.insert("region".to_string(), Vec::new());
        let stats = store()
            .column_stats("sampledb", &cols(&["region"]), &filter)
            .unwrap();
        assert_eq!(stats["region"].sample_values.len(), 3);
    }

    #[test]
    fn test_column_stats_no_matching_rows() {
        let mut filter = BTreeMap::new();
        filter.insert("region".to_string(), vec!["Nowhere".to_string()]);
        let stats = store()
            .column_stats("sampledb", &cols(&["units"]), &filter)
            .unwrap();
        assert_eq!(stats["units"].unique_values, 0);
        assert!(stats["units"].numeric.is_none());
    }

    #[test]
    fn test_column_stats_rejects_bad_input() {
        let store = store();
        let none = BTreeMap::new();
        let err = store.column_stats("sampledb", &[], &none).unwrap_err();
        assert_eq!(err.to_string(), "Columns are required");
        assert!(store.column_stats("nope", &cols(&["units"]), &none).is_err());
        assert!(store
            .column_stats("sampledb", &cols(&["units\" FROM x --"]), &none)
            .is_err());

        let mut filter = BTreeMap::new();
        filter.insert("bogus".to_string(), vec!["x".to_string()]);
        assert!(store.column_stats("sampledb", &cols(&["units"]), &filter).is_err());
    }

    #[test]
    fn test_column_stats_json_shape() {
        let stats = store()
            .column_stats("sampledb", &cols(&["region", "units"]), &BTreeMap::new())
            .unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["region"].get("min").is_none());
        assert_eq!(json["units"]["max"], serde_json::json!(5.0));
        assert_eq!(json["units"]["null_count"], serde_json::json!(0));
    }

    #[test]
    fn test_render_schema_context() {
        let rendered = render_schema_context(&store().describe_schema().unwrap());
        assert_eq!(rendered, "sampledb(id INTEGER, region TEXT, units INTEGER)");
    }
}
