use std::fmt::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

const MAX_STEM_LEN: usize = 80;

/// Portable, deterministic record name: `{sanitized_title}--{short_hash(key)}.md`.
pub fn record_filename(title: &str, key: &str) -> String {
    let stem = sanitize_stem(title);
    let hash = short_hash(key.as_bytes());
    format!("{stem}--{hash}.md")
}

/// Name for a media file whose plain name is already taken by different
/// content: `{stem}-{short_hash(bytes)}.{ext}`.
pub fn disambiguated_media_name(original: &Path, bytes: &[u8]) -> String {
    let stem = original
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(sanitize_stem)
        .unwrap_or_else(|| "media".to_string());
    let hash = short_hash(bytes);
    match original.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}-{hash}.{ext}"),
        None => format!("{stem}-{hash}"),
    }
}

/// Plain media name, sanitized the same way as record names.
pub fn media_name(original: &Path) -> String {
    let name = original
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("media");
    sanitize_stem(name)
}

fn sanitize_stem(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return "untitled".to_string();
    }

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    if compacted.len() > MAX_STEM_LEN {
        let mut cut = MAX_STEM_LEN;
        while !compacted.is_char_boundary(cut) {
            cut -= 1;
        }
        compacted.truncate(cut);
    }
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    compacted
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

pub(crate) fn short_hash(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
