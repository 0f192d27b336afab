//! UI utilities for the CLI

use colored::*;
use crossterm::terminal::size;
use std::fmt::Write as _;
use std::path::Path;

use billguard_core::{Error, VectorRecord, PAGE_KEY, SOURCE_KEY};
use billguard_rag::{IngestionReport, QueryResponse};

const MAX_RULE_WIDTH: usize = 60;

fn rule_width() -> usize {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    std::cmp::min(MAX_RULE_WIDTH, terminal_width.saturating_sub(4)).max(10)
}

/// Answer followed by the cited sources
pub fn render_answer(response: &QueryResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=== Answer ===".green().bold());
    let _ = writeln!(out, "{}", response.answer);
    let _ = writeln!(out, "\n{}", "=== Sources ===".green().bold());
    if response.sources.is_empty() {
        let _ = writeln!(out, "{}", "(no sources retrieved)".dimmed());
    }
    for source in &response.sources {
        let _ = writeln!(out, "- {}", source);
    }
    out
}

pub fn print_answer(response: &QueryResponse) {
    print!("{}", render_answer(response));
}

/// Record count and the given trailing records, numbered from their
/// position in the store
pub fn render_inspection(total: usize, tail: &[VectorRecord], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{} {}", "Total Documents in Store:".bold(), total);

    if total == 0 {
        let _ = writeln!(out, "Store is empty.");
        return out;
    }

    let _ = writeln!(out, "\n{}", format!("=== Last {} Documents ===", tail.len()).green().bold());
    let first = total.saturating_sub(tail.len());
    let rule = "-".repeat(width);
    for (i, record) in tail.iter().enumerate() {
        let source = record
            .metadata
            .get(SOURCE_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown");
        let page = record
            .metadata
            .get(PAGE_KEY)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string());

        let _ = writeln!(out, "\n{}", format!("[Document {}]", first + i + 1).cyan());
        let _ = writeln!(out, "ID: {}", record.id);
        let _ = writeln!(out, "Source: {}", source);
        let _ = writeln!(out, "Page: {}", page);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Content:\n{}", record.text);
        let _ = writeln!(out, "{}", rule);
    }
    out
}

pub fn print_inspection(total: usize, tail: &[VectorRecord]) {
    print!("{}", render_inspection(total, tail, rule_width()));
}

pub fn print_store_missing(path: &Path) {
    println!("{} Database directory not found at {}", "⚠️".yellow(), path.display());
}

pub fn render_ingestion_report(report: &IngestionReport) -> String {
    if report.documents == 0 {
        return format!("{} No documents to process.\n", "ℹ️".blue());
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} Ingested {} pages from {} files into {} chunks ({} records written)",
        "✅".green(),
        report.documents,
        report.files_loaded,
        report.chunks,
        report.records_written,
    );
    if report.files_failed > 0 {
        let _ = writeln!(
            out,
            "{} {} file(s) could not be read and were skipped",
            "⚠️".yellow(),
            report.files_failed
        );
    }
    out
}

pub fn print_ingestion_report(report: &IngestionReport) {
    print!("{}", render_ingestion_report(report));
}

/// Outcome of sending a probe prompt to the language model
pub fn render_llm_probe(model: &str, outcome: &Result<String, Error>, width: usize) -> String {
    let mut out = String::new();
    let rule = "-".repeat(width.min(20));
    match outcome {
        Ok(reply) => {
            let _ = writeln!(out, "\n{}", "Success! Response from Ollama:".green().bold());
            let _ = writeln!(out, "{}", rule);
            let _ = writeln!(out, "{}", reply);
            let _ = writeln!(out, "{}", rule);
        }
        Err(e) => {
            let _ = writeln!(out, "\n{}", "Error connecting to Ollama:".red().bold());
            let _ = writeln!(out, "{}", e);
            let _ = writeln!(out, "\n{}", "Troubleshooting Tips:".bold());
            let _ = writeln!(out, "1. Ensure Ollama is running (`ollama serve`).");
            let _ = writeln!(out, "2. Ensure you have pulled the model: 'ollama pull {}'", model);
        }
    }
    out
}

pub fn print_llm_probe(model: &str, outcome: &Result<String, Error>) {
    print!("{}", render_llm_probe(model, outcome, rule_width()));
}

/// User-facing failure line; precondition failures get a hint instead of a trace
pub fn print_error(error: &Error) {
    match error {
        Error::StoreNotFound(_) => eprintln!("{} {}", "⚠️".yellow(), error),
        Error::LLMInit(_) | Error::Embedding(_) | Error::Configuration(_) => {
            eprintln!("{} {}", "❌".red(), error)
        }
        other => eprintln!("{} {}", "❌".red(), format!("Error: {}", other).red()),
    }
}
