//! `.properties` text format.
//!
//! Reading follows the classic ISO-8859-1 properties grammar: `#`/`!`
//! comments, `=`, `:` or whitespace separators, backslash line continuations
//! and `\uXXXX` escapes. Writing is deterministic: keys sorted, one comment
//! line, `\n` terminators and pure ASCII output, so the same map always
//! produces the same bytes.

use std::collections::BTreeMap;

/// Key/value content of one properties resource
pub type PropertyMap = BTreeMap<String, String>;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Errors for properties parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertiesError {
    #[error("Malformed \\uxxxx escape on line {line}")]
    MalformedUnicodeEscape { line: usize },
}

/// Decode ISO-8859-1 bytes; every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as ISO-8859-1, replacing anything outside it with `?`.
///
/// Output of [`format_properties`] is ASCII, so nothing is replaced there.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Parse ISO-8859-1 encoded properties bytes.
pub fn parse_properties(bytes: &[u8]) -> Result<PropertyMap, PropertiesError> {
    parse_properties_str(&decode_latin1(bytes))
}

/// Parse already-decoded properties text. Later duplicates of a key win.
pub fn parse_properties_str(text: &str) -> Result<PropertyMap, PropertiesError> {
    let mut map = PropertyMap::new();
    for (line_no, logical) in logical_lines(text) {
        let (key, value) = split_key_value(&logical);
        let key = unescape(key, line_no)?;
        let value = unescape(value, line_no)?;
        map.insert(key, value);
    }
    Ok(map)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0C}')
}

/// Join continuation lines; yields (1-based starting line, logical line)
/// with comments and blank lines removed and leading whitespace stripped.
fn logical_lines(text: &str) -> Vec<(usize, Vec<char>)> {
    let natural: Vec<&str> = split_natural_lines(text);
    let mut out = Vec::new();
    let mut i = 0;
    while i < natural.len() {
        let start = i;
        let first = natural[i].trim_start_matches(is_blank);
        i += 1;
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }
        let mut logical: Vec<char> = first.chars().collect();
        while ends_with_odd_backslashes(&logical) {
            logical.pop();
            match natural.get(i) {
                Some(next) => {
                    logical.extend(next.trim_start_matches(is_blank).chars());
                    i += 1;
                }
                None => break,
            }
        }
        out.push((start + 1, logical));
    }
    out
}

fn split_natural_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(|c: char| c == '\n' || c == '\r') {
            Some(ix) => {
                lines.push(&rest[..ix]);
                let skip = if rest[ix..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[ix + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

fn ends_with_odd_backslashes(chars: &[char]) -> bool {
    chars.iter().rev().take_while(|&&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value.
fn split_key_value(line: &[char]) -> (&[char], &[char]) {
    let mut key_len = 0;
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut preceding_backslash = false;

    while key_len < line.len() {
        let c = line[key_len];
        if (c == '=' || c == ':') && !preceding_backslash {
            value_start = key_len + 1;
            has_separator = true;
            break;
        } else if is_blank(c) && !preceding_backslash {
            value_start = key_len + 1;
            break;
        }
        preceding_backslash = c == '\\' && !preceding_backslash;
        key_len += 1;
    }

    while value_start < line.len() {
        let c = line[value_start];
        if !is_blank(c) {
            if !has_separator && (c == '=' || c == ':') {
                has_separator = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    (&line[..key_len], &line[value_start.min(line.len())..])
}

fn unescape(raw: &[char], line: usize) -> Result<String, PropertiesError> {
    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let c = raw[i];
        i += 1;
        if c != '\\' {
            push_char(&mut units, c);
            continue;
        }
        let Some(&escaped) = raw.get(i) else {
            break;
        };
        i += 1;
        match escaped {
            'u' => {
                let digits = raw.get(i..i + 4).ok_or(PropertiesError::MalformedUnicodeEscape { line })?;
                let mut value: u16 = 0;
                for d in digits {
                    let nibble = d
                        .to_digit(16)
                        .ok_or(PropertiesError::MalformedUnicodeEscape { line })?;
                    value = (value << 4) | nibble as u16;
                }
                units.push(value);
                i += 4;
            }
            't' => units.push(u16::from(b'\t')),
            'r' => units.push(u16::from(b'\r')),
            'n' => units.push(u16::from(b'\n')),
            'f' => units.push(0x0C),
            other => push_char(&mut units, other),
        }
    }
    Ok(String::from_utf16_lossy(&units))
}

fn push_char(units: &mut Vec<u16>, c: char) {
    let mut buf = [0u16; 2];
    units.extend_from_slice(c.encode_utf16(&mut buf));
}

/// Escape a key or value so that [`parse_properties_str`] reads it back unchanged.
///
/// Keys escape every space; values escape only a leading space.
pub fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{0C}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => push_unicode_escape(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

fn push_unicode_escape(out: &mut String, c: char) {
    let mut buf = [0u16; 2];
    for unit in c.encode_utf16(&mut buf) {
        out.push_str("\\u");
        for shift in [12, 8, 4, 0] {
            out.push(char::from(HEX[usize::from((*unit >> shift) & 0xF)]));
        }
    }
}

fn escape_comment(comment: &str) -> String {
    let mut out = String::with_capacity(comment.len());
    for c in comment.chars() {
        match c {
            '\r' | '\n' => out.push(' '),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => push_unicode_escape(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

/// Render a properties map as text: optional `# comment` line, then
/// `key=value` lines in ascending key order, each ending in `\n`.
pub fn format_properties(map: &PropertyMap, comment: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(comment) = comment {
        out.push_str("# ");
        out.push_str(&escape_comment(comment));
        out.push('\n');
    }
    for (key, value) in map {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

/// [`format_properties`] encoded as ISO-8859-1 bytes.
pub fn properties_bytes(map: &PropertyMap, comment: Option<&str>) -> Vec<u8> {
    encode_latin1(&format_properties(map, comment))
}
