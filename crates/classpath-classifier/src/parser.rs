//! Exclude-list parser.
//!
//! Exclusions are written as a comma-separated list of package-style or
//! path-style prefixes (`com.example.internal, org/slf4j`). Dots are mapped to
//! path separators so both spellings select the same archive entries.

/// Errors produced while parsing an exclude list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExcludeParseError {
    #[error("exclude entry {index} ({entry:?}) contains whitespace")]
    EmbeddedWhitespace { index: usize, entry: String },

    #[error("exclude entry {index} ({entry:?}) must be relative to the archive root")]
    AbsolutePrefix { index: usize, entry: String },

    #[error("exclude entry {index} ({entry:?}) uses a backslash; use '.' or '/'")]
    Backslash { index: usize, entry: String },
}

/// Parse a comma-separated exclude list into slash-separated prefixes.
///
/// Empty items are dropped, so `""` and `"a,,b"` are both accepted.
pub fn parse_exclude_list(raw: &str) -> Result<Vec<String>, ExcludeParseError> {
    let mut prefixes = Vec::new();
    for (index, item) in raw.split(',').enumerate() {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if item.chars().any(char::is_whitespace) {
            return Err(ExcludeParseError::EmbeddedWhitespace {
                index,
                entry: item.to_string(),
            });
        }
        if item.contains('\\') {
            return Err(ExcludeParseError::Backslash {
                index,
                entry: item.to_string(),
            });
        }
        if item.starts_with('/') {
            return Err(ExcludeParseError::AbsolutePrefix {
                index,
                entry: item.to_string(),
            });
        }
        prefixes.push(item.replace('.', "/"));
    }
    Ok(prefixes)
}
