//! Line-set accumulation for service registrations and list files.

use std::collections::{BTreeMap, HashSet};

use classpath_classifier::ResourcePath;

/// Ordered, de-duplicated lines of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    lines: Vec<String>,
    seen: HashSet<String>,
}

impl LineSet {
    /// Add a line unless it is already present. Returns true if added.
    pub fn insert(&mut self, line: &str) -> bool {
        if self.seen.contains(line) {
            return false;
        }
        self.seen.insert(line.to_string());
        self.lines.push(line.to_string());
        true
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split text into lines, dropping lines that are blank after trimming.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line.
pub fn read_lines(text: &str) -> Vec<&str> {
    text.split(|c| c == '\n' || c == '\r')
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Accumulates line sets per resource path across a run.
#[derive(Debug, Default)]
pub struct LineSetMerger {
    sets: BTreeMap<ResourcePath, LineSet>,
}

impl LineSetMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the lines of one archive's copy of `path` not already present.
    ///
    /// Returns how many new lines were added.
    pub fn merge_into<'a, I>(&mut self, path: &ResourcePath, incoming: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let set = self.sets.entry(path.clone()).or_default();
        incoming
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| set.insert(line))
            .count()
    }

    pub fn get(&self, path: &ResourcePath) -> Option<&LineSet> {
        self.sets.get(path)
    }

    /// Accumulated resources in ascending path order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourcePath, &LineSet)> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
