//! Aligned, colored output for `annotate` and `keys`.

use std::path::Path;

use colored::Colorize;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::core::sync::Annotation;
use crate::core::table::TranslationTable;

/// Build an index of line start byte offsets for position lookups.
fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, c) in content.char_indices() {
        if c == '\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// 1-based line and column for a byte offset.
fn locate(line_index: &[usize], offset: usize) -> (usize, usize) {
    let line = match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    };
    let col = offset - line_index[line - 1] + 1;
    (line, col)
}

pub fn print_annotations(file: &Path, text: &str, annotations: &[Annotation]) {
    if annotations.is_empty() {
        println!("{}", "No translation calls resolved.".dimmed());
        return;
    }

    let line_index = build_line_index(text);
    let rows: Vec<(String, String, String)> = annotations
        .iter()
        .map(|annotation| {
            let (line, col) = locate(&line_index, annotation.range.start);
            let location = format!("{}:{}:{}", file.display(), line, col);
            (location, annotation.hover.clone(), annotation.display.clone())
        })
        .collect();

    let location_width = rows.iter().map(|(l, _, _)| l.width()).max().unwrap_or(0);
    let hover_width = rows.iter().map(|(_, h, _)| h.width()).max().unwrap_or(0);

    for (location, hover, display) in &rows {
        println!(
            "{}{}  {}{}  {}",
            location.as_str().dimmed(),
            " ".repeat(location_width - location.width()),
            hover.as_str().cyan(),
            " ".repeat(hover_width - hover.width()),
            display.as_str().green()
        );
    }
    println!("{}", format!("{} translation(s) resolved.", rows.len()).dimmed());
}

pub fn print_keys(table: &TranslationTable) {
    if table.is_empty() {
        println!("{}", "Translation table is empty.".dimmed());
        return;
    }

    let mut rows: Vec<(String, String)> = Vec::new();
    for (key, value) in table.entries() {
        flatten(key.clone(), value, &mut rows);
    }

    let key_width = rows.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    for (key, value) in &rows {
        println!("{}{}  {}", key.as_str().cyan(), " ".repeat(key_width - key.width()), value);
    }
    println!("{}", format!("{} key(s).", rows.len()).dimmed());
}

fn flatten(prefix: String, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(format!("{}.{}", prefix, key), nested, rows);
            }
        }
        Value::String(text) => rows.push((prefix, text.clone())),
        other => rows.push((prefix, other.to_string())),
    }
}
