//! Dependency ordering of migration files.
//!
//! Dependencies are inferred, not parsed: any line mentioning `REFERENCES`
//! names a table, and a table is mapped to the first migration (in filename
//! order) whose filename starts with that table name. The heuristic can both
//! miss and invent dependencies when file names do not follow table names.

use crate::file::MigrationFile;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static::lazy_static! {
    static ref REFERENCES_PATTERN: Regex =
        Regex::new(r"REFERENCES\s+(\w+)").expect("REFERENCES pattern is a valid regex");
}

/// Extracts the table names referenced by `REFERENCES` clauses in `sql`.
///
/// The scan is line based and case sensitive. A line contributes at most one
/// table: the first word following `REFERENCES`.
pub fn extract_referenced_tables(sql: &str) -> BTreeSet<String> {
    sql.lines()
        .filter(|line| line.contains("REFERENCES"))
        .filter_map(|line| REFERENCES_PATTERN.captures(line))
        .filter_map(|captures| captures.get(1))
        .map(|table| table.as_str().to_owned())
        .collect()
}

/// Finds the migration assumed to define `table`.
///
/// `files` must already be sorted by name; the first file whose name starts
/// with the table name wins.
pub fn resolve_table<'a>(files: &'a [MigrationFile], table: &str) -> Option<&'a MigrationFile> {
    files.iter().find(|file| file.name().starts_with(table))
}

/// Orders migrations so that resolvable dependencies come first.
///
/// Files are sorted by name, then visited depth first in that order: each file's
/// dependencies are emitted before the file itself. Every file is visited once,
/// so reference cycles terminate and simply fall back to visitation order.
/// Files without resolvable dependencies keep their lexicographic order.
pub fn compute_order(mut files: Vec<MigrationFile>) -> Vec<MigrationFile> {
    files.sort_by(|a, b| a.name().cmp(b.name()));

    let mut visited = vec![false; files.len()];
    let mut order = Vec::with_capacity(files.len());
    for index in 0..files.len() {
        visit(index, &files, &mut visited, &mut order);
    }

    let mut slots: Vec<Option<MigrationFile>> = files.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

fn visit(index: usize, files: &[MigrationFile], visited: &mut [bool], order: &mut Vec<usize>) {
    if visited[index] {
        return;
    }
    visited[index] = true;

    for table in files[index].referenced_tables() {
        if let Some(dependency) = files.iter().position(|f| f.name().starts_with(table.as_str())) {
            visit(dependency, files, visited, order);
        }
    }

    order.push(index);
}
