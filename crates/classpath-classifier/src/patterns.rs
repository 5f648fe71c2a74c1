//! Precompiled path matchers shared by every classification in the process.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Entries that only make sense in the archive that carries them.
pub(crate) const BOOKKEEPING_ENTRIES: &[&str] =
    &["META-INF/MANIFEST.MF", "META-INF/", "META-INF/INDEX.LIST"];

/// Line-list files recognized by exact name.
pub(crate) const WELL_KNOWN_LIST_FILES: &[&str] = &[
    "META-INF/settings/namespaces.list",
    "META-INF/http/pages.list",
    "META-INF/http/modules.list",
    "META-INF/http/numble.list",
    "META-INF/LICENSE",
    "META-INF/LICENSE.txt",
    "META-INF/license",
    "META-INF/license.txt",
    "META-INF/NOTICE",
    "META-INF/notice",
];

pub(crate) const VENDOR_METADATA_PREFIX: &str = "META-INF/maven";

pub(crate) struct Matchers {
    pub settings_properties: Regex,
    pub services: Regex,
    pub registrations: Regex,
    pub signature: Regex,
}

impl Matchers {
    fn compile() -> Self {
        // Patterns are literals; a failure here is a programming error.
        Self {
            settings_properties: Regex::new(r"^META-INF/settings/[^/]*\.properties$")
                .expect("settings pattern"),
            services: Regex::new(r"^META-INF/services/\S[^/]*$").expect("services pattern"),
            registrations: Regex::new(r"^META-INF/[^/]+/.*\.registrations$")
                .expect("registrations pattern"),
            signature: Regex::new(r"^META-INF/[^/]*\.(?:SF|DSA|RSA)$").expect("signature pattern"),
        }
    }
}

/// Process-wide matcher set, compiled on first use.
pub(crate) fn matchers() -> &'static Matchers {
    static MATCHERS: OnceLock<Matchers> = OnceLock::new();
    MATCHERS.get_or_init(Matchers::compile)
}
