//! Rendering of check results

use anyhow::{Context, Result};
use serde::Serialize;
use typical_core::{DiagnosticCode, DocumentId, Range, Severity};

use crate::check::CheckReport;

/// `path:line:col: severity: message` per diagnostic, 1-based, then a summary
pub fn render_human(report: &CheckReport) -> String {
    let mut out = String::new();

    for (id, diagnostics) in &report.documents {
        for diagnostic in diagnostics {
            out.push_str(&format!(
                "{}:{}:{}: {}: {}\n",
                id,
                diagnostic.range.start.line + 1,
                diagnostic.range.start.character + 1,
                diagnostic.severity,
                diagnostic.message
            ));
        }
    }

    out.push_str(&format!(
        "checked {} {}: {} {}, {} {}\n",
        report.documents.len(),
        plural(report.documents.len(), "file", "files"),
        report.errors,
        plural(report.errors, "error", "errors"),
        report.warnings,
        plural(report.warnings, "warning", "warnings"),
    ));
    out
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    document: &'a DocumentId,
    severity: Severity,
    code: DiagnosticCode,
    range: Range,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    errors: usize,
    warnings: usize,
}

/// Flat JSON document with every diagnostic, ranges 0-based
pub fn render_json(report: &CheckReport) -> Result<String> {
    let diagnostics = report
        .documents
        .iter()
        .flat_map(|(document, diagnostics)| {
            diagnostics.iter().map(move |d| JsonDiagnostic {
                document,
                severity: d.severity,
                code: d.code,
                range: d.range,
                message: &d.message,
            })
        })
        .collect();

    let json = JsonReport {
        diagnostics,
        errors: report.errors,
        warnings: report.warnings,
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize report")
}
