//! Jar manifest (`META-INF/MANIFEST.MF`) parsing and rendering.
//!
//! Only what the merged jar needs: keep the primary artifact's main
//! attributes and per-entry sections, set `Main-Class`, and write the result
//! back with CRLF terminators and 72-byte line wrapping.

/// Entry name of the manifest inside a jar
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

const MAX_LINE_BYTES: usize = 72;

type Section = Vec<(String, String)>;

/// Parsed manifest: main attributes plus named sections, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarManifest {
    main: Section,
    sections: Vec<Section>,
}

impl Default for JarManifest {
    fn default() -> Self {
        Self {
            main: vec![("Manifest-Version".to_string(), "1.0".to_string())],
            sections: Vec::new(),
        }
    }
}

impl JarManifest {
    /// Parse manifest bytes. Malformed lines (no `: `) are ignored.
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let mut blocks: Vec<Section> = vec![Vec::new()];
        let mut current: Option<(String, String)> = None;

        for line in text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)) {
            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(continuation);
                }
                continue;
            }
            let block = blocks.len() - 1;
            if let Some(attr) = current.take() {
                blocks[block].push(attr);
            }
            if line.is_empty() {
                if !blocks[block].is_empty() {
                    blocks.push(Vec::new());
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(": ") {
                current = Some((name.to_string(), value.to_string()));
            } else if let Some(name) = line.strip_suffix(':') {
                current = Some((name.to_string(), String::new()));
            }
        }
        if let Some(attr) = current.take() {
            let block = blocks.len() - 1;
            blocks[block].push(attr);
        }
        blocks.retain(|b| !b.is_empty());

        let mut manifest = Self::default();
        let mut iter = blocks.into_iter();
        if let Some(main) = iter.next() {
            if main.iter().any(|(k, _)| k.eq_ignore_ascii_case("Name")) {
                // A manifest without main attributes starts with a named section.
                manifest.sections.push(main);
            } else {
                manifest.main = main;
            }
        }
        manifest.sections.extend(iter);
        manifest.ensure_version();
        manifest
    }

    fn ensure_version(&mut self) {
        let has_version = self
            .main
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Manifest-Version"));
        if !has_version {
            self.main
                .insert(0, ("Manifest-Version".to_string(), "1.0".to_string()));
        }
    }

    /// Value of a main attribute (case-insensitive name).
    pub fn main_attribute(&self, name: &str) -> Option<&str> {
        self.main
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace a main attribute, keeping its position if present.
    pub fn set_main_attribute(&mut self, name: &str, value: &str) {
        match self.main.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => self.main.push((name.to_string(), value.to_string())),
        }
    }

    /// Number of named (per-entry) sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Render with CRLF terminators and continuation lines at 72 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_section(&mut out, &self.main);
        for section in &self.sections {
            out.extend_from_slice(b"\r\n");
            write_section(&mut out, section);
        }
        out.extend_from_slice(b"\r\n");
        out
    }
}

fn write_section(out: &mut Vec<u8>, section: &Section) {
    for (name, value) in section {
        write_wrapped(out, &format!("{}: {}", name, value));
    }
}

fn write_wrapped(out: &mut Vec<u8>, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_BYTES;
    loop {
        if rest.len() <= limit {
            out.extend_from_slice(rest.as_bytes());
            out.extend_from_slice(b"\r\n");
            return;
        }
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.extend_from_slice(rest[..cut].as_bytes());
        out.extend_from_slice(b"\r\n ");
        rest = &rest[cut..];
        // Continuation lines spend one byte on the leading space.
        limit = MAX_LINE_BYTES - 1;
    }
}
