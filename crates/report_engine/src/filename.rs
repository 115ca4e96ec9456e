use sha2::{Digest, Sha256};

use report_core::DEFAULT_FILENAME;

/// Windows-safe form of a server-supplied download name.
pub fn download_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut compacted = String::with_capacity(cleaned.len());
    for c in cleaned.trim_matches(&['_', ' ', '.'][..]).chars() {
        if c == '_' && compacted.ends_with('_') {
            continue;
        }
        compacted.push(c);
    }
    if compacted.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }
    if compacted.len() > 120 {
        let mut cut = 120;
        while !compacted.is_char_boundary(cut) {
            cut -= 1;
        }
        compacted.truncate(cut);
    }
    if is_reserved_windows_name(stem(&compacted)) {
        compacted.insert(stem(&compacted).len(), '_');
    }
    compacted
}

/// Deterministic name for reports that carry no name of their own:
/// `report--{short_hash(content)}.{extension}`.
pub fn content_file_name(bytes: &[u8], extension: &str) -> String {
    format!("{DEFAULT_FILENAME}--{}.{extension}", short_hash(bytes))
}

fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
