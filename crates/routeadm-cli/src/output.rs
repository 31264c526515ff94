//! Terminal output for collections and notices

use std::io::Write;

use routeadm_api::models::{Egress, Route};
use routeadm_api::{BatchOperationResult, ResourceId};
use routeadm_client::SignInRedirect;
use routeadm_core::{CollectionState, Notice, NoticeLevel, Notifier};
use serde::Serialize;
use serde_json::json;

/// A record that can be printed as a table row
pub trait Row: Serialize {
    /// Column headers
    const HEADERS: &'static [&'static str];

    /// Cells, in header order
    fn cells(&self) -> Vec<String>;
}

fn id_cell(id: Option<&ResourceId>) -> String {
    id.map_or_else(|| "-".to_string(), ToString::to_string)
}

impl Row for Egress {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "ADDRESS", "PROTOCOL", "ENABLED"];

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id.as_ref()),
            self.name.clone(),
            self.address.clone(),
            self.protocol.clone(),
            self.enabled.to_string(),
        ]
    }
}

impl Row for Route {
    const HEADERS: &'static [&'static str] = &["ID", "PATTERN", "EGRESS", "PRIORITY", "ENABLED"];

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id.as_ref()),
            self.pattern.clone(),
            self.egress.clone(),
            self.priority.to_string(),
            self.enabled.to_string(),
        ]
    }
}

/// Print one page of a collection
pub fn print_page<T: Row>(state: &CollectionState<T>, as_json: bool) -> eyre::Result<()> {
    let mut out = std::io::stdout().lock();
    if as_json {
        let page = json!({
            "data": state.data,
            "pagination": state.pagination,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&page)?)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = state.data.iter().map(Row::cells).collect();
    let widths: Vec<usize> = T::HEADERS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|row| row[i].len())
                .chain([header.len()])
                .max()
                .unwrap_or_default()
        })
        .collect();

    let header: Vec<String> = T::HEADERS.iter().map(ToString::to_string).collect();
    writeln!(out, "{}", format_row(&header, &widths))?;
    for row in &rows {
        writeln!(out, "{}", format_row(row, &widths))?;
    }

    let pagination = state.pagination;
    writeln!(
        out,
        "page {}/{} ({} total, {} per page)",
        pagination.current(),
        pagination.total_pages().max(1),
        pagination.total(),
        pagination.page_size()
    )?;
    Ok(())
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Print the per-id outcome of a batch delete
pub fn print_batch(result: &BatchOperationResult) {
    println!(
        "deleted {}, failed {}",
        result.success_count, result.failure_count
    );
    for failure in &result.failures {
        println!("  {}: {}", failure.id, failure.message);
    }
}

/// Prints notices to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("ok: {}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

/// Tells the user to sign in again once the session is gone
#[derive(Debug, Default, Clone, Copy)]
pub struct LoginHint;

impl SignInRedirect for LoginHint {
    fn redirect(&self, _sign_in_path: &str) {
        eprintln!("session expired, sign in again with `routeadm login --token <TOKEN>`");
    }
}
