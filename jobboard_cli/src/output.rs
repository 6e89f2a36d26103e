use anyhow::Result;
use jobboard_lib::{ListSection, ListSnapshot, Phase};
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Tabled, Serialize)]
struct ListRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    #[serde(rename = "Created")]
    created: String,
}

const NAME_FIELDS: &[&str] = &["name", "title", "full_name", "email", "plan_name"];
const CREATED_FIELDS: &[&str] = &["created_at", "joined_date"];

// -- Row builders --

fn build_rows(section: &ListSection, items: &[Value]) -> Vec<ListRow> {
    items
        .iter()
        .map(|item| {
            let status = text(item, section.filter_param);
            ListRow {
                id: text(item, "id"),
                name: first_text(item, NAME_FIELDS),
                status: section
                    .filter_label(&status)
                    .map(str::to_string)
                    .unwrap_or(status),
                created: format_date(&first_text(item, CREATED_FIELDS)),
            }
        })
        .collect()
}

fn text(item: &Value, field: &str) -> String {
    match item.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn first_text(item: &Value, fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| text(item, f))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Keeps the date part of an ISO-8601 timestamp.
fn format_date(value: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.date_naive().to_string(),
        Err(_) => value.to_string(),
    }
}

fn phase_label(phase: &Phase) -> String {
    match phase {
        Phase::Idle => "idle".to_string(),
        Phase::Loading => "loading".to_string(),
        Phase::Ready => "ready".to_string(),
        Phase::Error(reason) => format!("error: {}", reason.code()),
    }
}

// -- Output --

/// Prints `Page x/y (phase)` to stderr.
pub fn print_summary<T>(snapshot: &ListSnapshot<T>) {
    eprintln!(
        "Page {}/{} ({})",
        snapshot.pagination.page,
        snapshot.pagination.total_pages,
        phase_label(&snapshot.phase)
    );
}

pub fn print_snapshot(
    section: &ListSection,
    snapshot: &ListSnapshot<Value>,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", Table::new(build_rows(section, &snapshot.items)));
        }
        OutputFormat::Json => print_json(snapshot),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in build_rows(section, &snapshot.items) {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
