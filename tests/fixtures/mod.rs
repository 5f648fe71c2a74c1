//! Shared test fixtures
//!
//! - Jar builder writing small archives into a temp directory
//! - Readers for merged jar entries
//! - Classifier corpus loader

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Builds a jar entry by entry, in the order entries are added
pub struct JarBuilder {
    entries: Vec<(String, Vec<u8>, CompressionMethod)>,
    timestamp: DateTime,
}

impl JarBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            timestamp: DateTime::from_date_and_time(2021, 6, 15, 12, 30, 0)
                .expect("valid timestamp"),
        }
    }

    pub fn entry(mut self, name: &str, content: &str) -> Self {
        self.entries
            .push((name.to_string(), content.as_bytes().to_vec(), CompressionMethod::Deflated));
        self
    }

    pub fn stored(mut self, name: &str, content: &[u8]) -> Self {
        self.entries
            .push((name.to_string(), content.to_vec(), CompressionMethod::Stored));
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries
            .push((name.to_string(), Vec::new(), CompressionMethod::Stored));
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn write(self, path: &Path) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content, method) in self.entries {
            let options = FileOptions::default()
                .compression_method(method)
                .last_modified_time(self.timestamp);
            if name.ends_with('/') {
                zip.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                zip.start_file(name, options).unwrap();
                zip.write_all(&content).unwrap();
            }
        }
        zip.finish().unwrap();
        path.to_path_buf()
    }
}

/// Entry names of a jar in stored order
pub fn entry_names(jar: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(fs::read(jar).unwrap())).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Text of one jar entry, if present
pub fn entry_text(jar: &Path, name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(Cursor::new(fs::read(jar).unwrap())).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    Some(text)
}

/// Every entry's bytes, in stored order
pub fn all_entry_bytes(jar: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(fs::read(jar).unwrap())).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            (entry.name().to_string(), bytes)
        })
        .collect()
}

/// Path to the classifier corpus fixture
pub fn classifier_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/classifier_corpus/corpus.json")
}

/// Classifier test case from corpus.json
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClassifierTestCase {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    pub expected_strategy: String,
    pub expected_rule: String,
}

/// Full classifier corpus
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClassifierCorpus {
    pub schema_version: u32,
    pub description: String,
    pub test_cases: Vec<ClassifierTestCase>,
}

impl ClassifierCorpus {
    /// Load corpus from the fixture file
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(classifier_corpus_path())?;
        Ok(serde_json::from_str(&content)?)
    }
}
