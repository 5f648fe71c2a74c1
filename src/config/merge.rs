//! Layer merge for TOML tables
//!
//! - Tables: merged key by key (recursive)
//! - Arrays and scalars: the overlay replaces the base

/// Apply `overlay` on top of `base` in place.
pub fn overlay_table(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_inner)), toml::Value::Table(overlay_inner)) => {
                overlay_table(base_inner, overlay_inner);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Merge layers in order; the last layer has the highest precedence.
pub fn merge_tables(layers: Vec<toml::Table>) -> toml::Table {
    let mut merged = toml::Table::new();
    for layer in layers {
        overlay_table(&mut merged, layer);
    }
    merged
}
