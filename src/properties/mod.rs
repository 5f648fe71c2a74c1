//! Properties merging
//!
//! Settings files that several archives ship under the same name are merged
//! key by key. The archive processed last wins; differing values are
//! reported as diagnostics, never as errors.

mod codec;

pub use codec::{
    decode_latin1, encode_latin1, escape, format_properties, parse_properties,
    parse_properties_str, properties_bytes, PropertiesError, PropertyMap,
};

use std::collections::BTreeMap;

use classpath_classifier::ResourcePath;

use crate::run::{Diagnostic, Diagnostics};

/// Accumulates key/value maps per resource path across a run.
#[derive(Debug, Default)]
pub struct PropertiesMerger {
    maps: BTreeMap<ResourcePath, PropertyMap>,
}

impl PropertiesMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one archive's copy of `path` into the accumulated map.
    ///
    /// Incoming values always overwrite; a key that already had a different
    /// value produces a [`Diagnostic::KeyConflict`].
    pub fn merge_into(
        &mut self,
        path: &ResourcePath,
        incoming: PropertyMap,
        archive_id: &str,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(existing) = self.maps.get_mut(path) else {
            self.maps.insert(path.clone(), incoming);
            return;
        };
        for (key, value) in incoming {
            if let Some(old) = existing.get(&key) {
                if *old != value {
                    diagnostics.push(Diagnostic::KeyConflict {
                        path: path.to_string(),
                        key: key.clone(),
                        old_value: old.clone(),
                        new_value: value.clone(),
                        archive: archive_id.to_string(),
                    });
                }
            }
            existing.insert(key, value);
        }
    }

    /// Fold a pre-existing on-disk copy in as the lowest-priority layer.
    ///
    /// Returns the map to write: on-disk keys survive unless the merged map
    /// has the same key, in which case the merged value wins and a
    /// [`Diagnostic::LocalOverride`] is reported when the two differ.
    pub fn layer_on_disk(
        &self,
        path: &ResourcePath,
        on_disk: PropertyMap,
        location: &str,
        diagnostics: &mut Diagnostics,
    ) -> PropertyMap {
        let merged = self.maps.get(path);
        let mut result = on_disk;
        for (key, value) in merged.into_iter().flatten() {
            if let Some(local) = result.get(key) {
                if local != value {
                    diagnostics.push(Diagnostic::LocalOverride {
                        path: path.to_string(),
                        key: key.clone(),
                        local_value: local.clone(),
                        merged_value: value.clone(),
                        location: location.to_string(),
                    });
                }
            }
            result.insert(key.clone(), value.clone());
        }
        result
    }

    pub fn get(&self, path: &ResourcePath) -> Option<&PropertyMap> {
        self.maps.get(path)
    }

    /// Accumulated resources in ascending path order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourcePath, &PropertyMap)> {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
