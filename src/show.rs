//! Read-back of the stored table and the derived mean-age metric.

use log::info;
use serde_json::Value as JsonValue;

use crate::{
    error::SyncError,
    schema::TARGET_FIELDS,
    store::{StoredRow, TabularStore},
};

/// Reads the full table back and prints it with the mean-age metric.
pub fn execute(store: &dyn TabularStore, table: &str) -> Result<(), SyncError> {
    let rows = store.select_all(table)?;
    if rows.is_empty() {
        info!("Table '{table}' is empty; upload a spreadsheet first");
        return Ok(());
    }

    let columns = column_order(&rows);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|col| display_cell(row.get(col))).collect())
        .collect();
    print!("{}", render_table(&columns, &cells));

    info!("{} row(s) stored in '{table}'", rows.len());
    if let Some(mean) = mean_age(&rows) {
        info!("Mean age: {mean:.1}");
    }
    Ok(())
}

/// Columns to display: the target fields first (in schema order, when
/// present in the data), then any extra store columns as encountered.
fn column_order(rows: &[StoredRow]) -> Vec<String> {
    let mut columns: Vec<String> = TARGET_FIELDS
        .iter()
        .map(|f| f.name.to_string())
        .filter(|name| rows.iter().any(|row| row.contains_key(name)))
        .collect();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn display_cell(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Mean of the `age` column over rows carrying a numeric (or
/// numeric-text) value. Bad values are skipped at display time rather
/// than failing the report; no usable values means no metric.
pub fn mean_age(rows: &[StoredRow]) -> Option<f64> {
    let ages: Vec<f64> = rows
        .iter()
        .filter_map(|row| numeric(row.get("age")?))
        .collect();
    if ages.is_empty() {
        return None;
    }
    Some(ages.iter().sum::<f64>() / ages.len() as f64)
}

fn numeric(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Plain column-aligned rendering with a dashed separator row.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(1)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    output.push_str(&format_row(headers, &widths));
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&format_row(&separator, &widths));
    for row in rows {
        output.push_str(&format_row(row, &widths));
    }
    output
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let padding = width.saturating_sub(cell.chars().count());
        line.push_str(&" ".repeat(padding));
    }
    while line.ends_with(' ') {
        line.pop();
    }
    line.push('\n');
    line
}
