//! CLI output formatting for all pipeline stages.
//!
//! Output lists what each stage produced, grouped by kind, with paths shown
//! relative to the package root so the listing reads as an inventory of the
//! package rather than of the filesystem.
//!
//! # Output Format
//!
//! ## Scaffold
//!
//! ```text
//! Directories
//!     MC-001/
//!     MC-001/media/images/
//! Images
//!     001 MC-001_0001.tif
//! Documents
//!     MC-001/media.jsonld.json
//! ```
//!
//! ## Describe
//!
//! ```text
//! Collection
//!     MC-001.jsonld.json
//! Subjects
//!     001 Agriculture
//!         Id: http://id.worldcat.org/fast/1
//!     002 http://id.worldcat.org/fast/2 (unresolved)
//! Pages
//!     001 MC-001_0001.tif.jsonld.json
//! ```
//!
//! ## Mint
//!
//! ```text
//! 001 MC-001/MC-001.jsonld.json → ark:/87293/d3abc123
//! 002 MC-001/media/images/MC-001_0002.tif.jsonld.json
//!     FAILED: authority rejected the request (status 400): error: bad request
//!
//! Minted 1 of 2 documents, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::describe::DescribeReport;
use crate::mint::MintRequest;
use crate::scaffold::ScaffoldReport;
use crate::update::{BatchReport, UpdateOutcome};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to `root`, falling back to the full path outside it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A titled section; empty sections are left out entirely.
fn section(lines: &mut Vec<String>, title: &str, entries: Vec<String>) {
    if entries.is_empty() {
        return;
    }
    lines.push(title.to_string());
    lines.extend(entries.into_iter().map(|e| format!("{}{}", indent(1), e)));
}

fn numbered(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{} {}", format_index(i + 1), file_name(p)))
        .collect()
}

fn warnings(lines: &mut Vec<String>, warnings: &[String]) {
    section(
        lines,
        "Warnings",
        warnings.iter().map(|w| format!("! {w}")).collect(),
    );
}

// ============================================================================
// Stage 1: Scaffold
// ============================================================================

pub fn format_scaffold_output(report: &ScaffoldReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    section(
        &mut lines,
        "Directories",
        report
            .directories
            .iter()
            .map(|d| format!("{}/", relative(d, root)))
            .collect(),
    );
    section(&mut lines, "Images", numbered(&report.images));
    section(&mut lines, "PDFs", numbered(&report.pdfs));
    section(
        &mut lines,
        "Documents",
        report.documents.iter().map(|d| relative(d, root)).collect(),
    );
    warnings(&mut lines, &report.warnings);
    lines
}

pub fn print_scaffold_output(report: &ScaffoldReport, root: &Path) {
    for line in format_scaffold_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Describe
// ============================================================================

pub fn format_describe_output(report: &DescribeReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    section(
        &mut lines,
        "Collection",
        vec![relative(&report.collection, root), relative(&report.labels, root)],
    );
    section(&mut lines, "Item", vec![relative(&report.item, root)]);

    let mut subjects = Vec::new();
    for (i, subject) in report.subjects.iter().enumerate() {
        if subject.resolved {
            subjects.push(format!("{} {}", format_index(i + 1), subject.label));
            subjects.push(format!("{}Id: {}", indent(1), subject.id));
        } else {
            subjects.push(format!("{} {} (unresolved)", format_index(i + 1), subject.id));
        }
    }
    section(&mut lines, "Subjects", subjects);
    section(&mut lines, "Pages", numbered(&report.pages));
    section(&mut lines, "PDFs", numbered(&report.pdfs));
    warnings(&mut lines, &report.warnings);
    lines
}

pub fn print_describe_output(report: &DescribeReport, root: &Path) {
    for line in format_describe_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Mint
// ============================================================================

/// The ANVL lines a request would send, one per line.
pub fn format_request(request: &MintRequest) -> Vec<String> {
    request
        .to_anvl()
        .to_body()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn format_mint_outcome(index: usize, outcome: &UpdateOutcome, root: &Path) -> Vec<String> {
    match outcome {
        UpdateOutcome::Minted { path, ark } => {
            vec![format!("{} {} → {}", format_index(index), relative(path, root), ark)]
        }
        UpdateOutcome::DryRun { path, request } => {
            let mut lines = vec![format!("{} {} (dry run)", format_index(index), relative(path, root))];
            lines.extend(
                format_request(request)
                    .into_iter()
                    .map(|l| format!("{}{}", indent(1), l)),
            );
            lines
        }
    }
}

pub fn format_batch_output(report: &BatchReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut index = 0;
    for outcome in &report.outcomes {
        index += 1;
        lines.extend(format_mint_outcome(index, outcome, root));
    }
    for failure in &report.failed {
        index += 1;
        lines.push(format!("{} {}", format_index(index), relative(failure.path(), root)));
        lines.push(format!("{}FAILED: {}", indent(1), failure));
    }

    let total = report.outcomes.len() + report.failed.len();
    let dry_runs = report.outcomes.len() - report.minted();
    lines.push(String::new());
    let mut summary = format!("Minted {} of {} documents", report.minted(), total);
    if dry_runs > 0 {
        summary.push_str(&format!(", {} dry run", dry_runs));
    }
    if !report.failed.is_empty() {
        summary.push_str(&format!(", {} failed", report.failed.len()));
    }
    lines.push(summary);
    lines
}

pub fn print_batch_output(report: &BatchReport, root: &Path) {
    for line in format_batch_output(report, root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::Ark;
    use crate::templates::SubjectLabel;
    use crate::update::UpdateError;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/pkg")
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn relative_strips_root() {
        assert_eq!(relative(Path::new("/pkg/MC-001/a.json"), &root()), "MC-001/a.json");
        assert_eq!(relative(Path::new("/elsewhere/a.json"), &root()), "/elsewhere/a.json");
    }

    #[test]
    fn scaffold_output_skips_empty_sections() {
        let report = ScaffoldReport {
            directories: vec![root().join("MC-001")],
            images: vec![root().join("MC-001/media/images/MC-001_0001.tif")],
            ..Default::default()
        };
        let lines = format_scaffold_output(&report, &root());
        assert_eq!(
            lines,
            vec![
                "Directories",
                "    MC-001/",
                "Images",
                "    001 MC-001_0001.tif",
            ]
        );
    }

    #[test]
    fn scaffold_output_shows_warnings() {
        let report = ScaffoldReport {
            warnings: vec!["source folder not found".into()],
            ..Default::default()
        };
        let lines = format_scaffold_output(&report, &root());
        assert_eq!(lines, vec!["Warnings", "    ! source folder not found"]);
    }

    #[test]
    fn describe_output_marks_unresolved_subjects() {
        let report = DescribeReport {
            collection: root().join("MC-001.jsonld.json"),
            labels: root().join("MC-001/labels.jsonld.json"),
            item: root().join("MC-001/MC-001.jsonld.json"),
            subjects: vec![
                SubjectLabel {
                    id: "fast/1".into(),
                    label: "Agriculture".into(),
                    resolved: true,
                },
                SubjectLabel {
                    id: "fast/2".into(),
                    label: "fast/2".into(),
                    resolved: false,
                },
            ],
            ..Default::default()
        };
        let lines = format_describe_output(&report, &root());
        assert!(lines.contains(&"    001 Agriculture".to_string()));
        assert!(lines.contains(&"        Id: fast/1".to_string()));
        assert!(lines.contains(&"    002 fast/2 (unresolved)".to_string()));
        assert!(!lines.contains(&"Pages".to_string()));
    }

    #[test]
    fn dry_run_shows_request_lines() {
        let outcome = UpdateOutcome::DryRun {
            path: root().join("MC-001.jsonld.json"),
            request: MintRequest {
                target: "https://example.org/mc-001".into(),
                what: Some("Album".into()),
                who: None,
                where_: None,
            },
        };
        let lines = format_mint_outcome(1, &outcome, &root());
        assert_eq!(lines[0], "001 MC-001.jsonld.json (dry run)");
        assert_eq!(lines[1], "    _target: https://example.org/mc-001");
        assert_eq!(lines[2], "    _profile: erc");
        assert_eq!(lines[3], "    erc.what: Album");
    }

    #[test]
    fn batch_output_lists_failures_and_summary() {
        let report = BatchReport {
            outcomes: vec![UpdateOutcome::Minted {
                path: root().join("a.jsonld.json"),
                ark: Ark::new("ark:/1/a"),
            }],
            failed: vec![UpdateError::Rejected {
                path: root().join("b.jsonld.json"),
                status: 400,
                body: "error: bad request".into(),
            }],
        };
        let lines = format_batch_output(&report, &root());
        assert_eq!(lines[0], "001 a.jsonld.json → ark:/1/a");
        assert_eq!(lines[1], "002 b.jsonld.json");
        assert!(lines[2].starts_with("    FAILED:"));
        assert!(lines[2].contains("error: bad request"));
        assert_eq!(lines.last().unwrap(), "Minted 1 of 2 documents, 1 failed");
    }

    #[test]
    fn batch_summary_counts_dry_runs() {
        let report = BatchReport {
            outcomes: vec![UpdateOutcome::DryRun {
                path: root().join("a.jsonld.json"),
                request: MintRequest {
                    target: "t".into(),
                    what: None,
                    who: None,
                    where_: None,
                },
            }],
            failed: vec![],
        };
        let lines = format_batch_output(&report, &root());
        assert_eq!(lines.last().unwrap(), "Minted 0 of 1 documents, 1 dry run");
    }
}
