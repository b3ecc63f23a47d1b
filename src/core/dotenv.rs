//! Dotenv parsing.
//!
//! Reads `KEY=value` files as declared by a hosting platform. Entries keep
//! file order.

use std::path::Path;

/// Parse dotenv-formatted text.
///
/// Skips empty lines and comments (lines starting with `#`), accepts an
/// optional `export ` prefix, and unquotes single- or double-quoted values.
pub fn parse(contents: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();

    for line in contents.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            entries.push((key.to_string(), parse_value(value.trim())));
        }
    }

    entries
}

/// Read and parse a dotenv file.
pub fn load(path: &Path) -> std::io::Result<Vec<(String, String)>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse(&contents))
}

fn parse_value(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape_double_quoted(&raw[1..raw.len() - 1]);
    }

    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }

    raw.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
