//! End-to-end merge scenarios
//!
//! Each test builds a primary jar and dependency jars in a temp directory,
//! runs the orchestrator and inspects the merged jar, the loose class-output
//! directory and the shared settings directory.

mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use classpath_merge::config::ConfigError;
use classpath_merge::properties::parse_properties;
use classpath_merge::resolve::ResolveError;
use classpath_merge::run::ResourceKind;
use classpath_merge::{
    BuildLayout, Dependency, Diagnostic, EffectiveConfig, MergeError, MergeOrchestrator,
    DependencyResolver, MergePhase, MergeReport, MergeRun, MergeSettings, Scope, StaticResolver,
};
use fixtures::{entry_names, entry_text, JarBuilder};
use tempfile::TempDir;

const SETTINGS: &str = "META-INF/settings/defaults.properties";
const SERVICES: &str = "META-INF/services/com.example.Plugin";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn primary(&self) -> PathBuf {
        self.root().join("build/libs/app.jar")
    }

    fn classes(&self) -> PathBuf {
        self.root().join("build/classes")
    }

    fn settings_dir(&self) -> PathBuf {
        self.root().join("build/settings")
    }

    fn dep(&self, name: &str) -> PathBuf {
        self.root().join("repo").join(name)
    }

    fn merged_jar(&self) -> PathBuf {
        self.root().join("build/libs/merged-jar.jar")
    }

    fn run(&self, settings: MergeSettings, deps: &[PathBuf]) -> Result<MergeReport, MergeError> {
        let resolver = StaticResolver::new(
            deps.iter()
                .map(|p| Dependency::new(p, Scope::Compile))
                .collect(),
        );
        MergeOrchestrator::new(settings, BuildLayout::new(self.primary(), self.classes()), resolver)?
            .run()
    }
}

fn defaults() -> MergeSettings {
    EffectiveConfig::build(None, false, None).unwrap().settings
}

fn key_conflicts(report: &MergeReport) -> Vec<&Diagnostic> {
    report
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::KeyConflict { .. }))
        .collect()
}

// =============================================================================
// Scenario A: properties merge, later archive wins
// =============================================================================

#[test]
fn test_scenario_a_dependency_overrides_primary() {
    let ws = Workspace::new();
    JarBuilder::new().entry(SETTINGS, "a=1\n").write(&ws.primary());
    let dep = JarBuilder::new()
        .entry(SETTINGS, "a=2\nb=3\n")
        .write(&ws.dep("dep.jar"));

    let report = ws.run(defaults(), &[dep]).unwrap();
    assert_eq!(report.phase, MergePhase::Done);
    assert_eq!(report.merged_resource_count(), 1);

    let expected = "# Merged by classpath-merge from app.jar, dep.jar\na=2\nb=3\n";
    assert_eq!(entry_text(&ws.merged_jar(), SETTINGS).unwrap(), expected);
    assert_eq!(
        fs::read_to_string(ws.classes().join(SETTINGS)).unwrap(),
        expected
    );
    assert_eq!(
        fs::read_to_string(ws.settings_dir().join("defaults.properties")).unwrap(),
        expected
    );

    let conflicts = key_conflicts(&report);
    assert_eq!(conflicts.len(), 1);
    match conflicts[0] {
        Diagnostic::KeyConflict {
            key,
            old_value,
            new_value,
            archive,
            ..
        } => {
            assert_eq!(key, "a");
            assert_eq!(old_value, "1");
            assert_eq!(new_value, "2");
            assert_eq!(archive, "dep.jar");
        }
        other => panic!("unexpected diagnostic {:?}", other),
    }
}

#[test]
fn test_properties_resolution_depends_on_order() {
    let ws = Workspace::new();
    JarBuilder::new().entry("App.class", "x").write(&ws.primary());
    let one = JarBuilder::new().entry(SETTINGS, "a=1\n").write(&ws.dep("one.jar"));
    let two = JarBuilder::new().entry(SETTINGS, "a=2\n").write(&ws.dep("two.jar"));

    ws.run(defaults(), &[one.clone(), two.clone()]).unwrap();
    let forward = parse_properties(entry_text(&ws.merged_jar(), SETTINGS).unwrap().as_bytes()).unwrap();
    assert_eq!(forward["a"], "2");

    fs::remove_dir_all(ws.classes()).unwrap();
    ws.run(defaults(), &[two, one]).unwrap();
    let reverse = parse_properties(entry_text(&ws.merged_jar(), SETTINGS).unwrap().as_bytes()).unwrap();
    assert_eq!(reverse["a"], "1");
}

// =============================================================================
// Scenario B: line-set union
// =============================================================================

#[test]
fn test_scenario_b_service_lines_are_unioned() {
    let ws = Workspace::new();
    JarBuilder::new().entry("App.class", "x").write(&ws.primary());
    let a = JarBuilder::new()
        .entry(SERVICES, "PluginA\n")
        .write(&ws.dep("a.jar"));
    let b = JarBuilder::new()
        .entry(SERVICES, "PluginB\r\n\r\nPluginA\n")
        .write(&ws.dep("b.jar"));

    let report = ws.run(defaults(), &[a.clone(), b.clone()]).unwrap();
    assert_eq!(
        entry_text(&ws.merged_jar(), SERVICES).unwrap(),
        "PluginA\nPluginB\n"
    );
    assert_eq!(report.merged_resources[0].kind, ResourceKind::LineSet);
    assert_eq!(report.merged_resources[0].origins, ["a.jar", "b.jar"]);

    // Same set either way round; only the order follows the archives.
    ws.run(defaults(), &[b, a]).unwrap();
    assert_eq!(
        entry_text(&ws.merged_jar(), SERVICES).unwrap(),
        "PluginB\nPluginA\n"
    );
    assert_eq!(
        fs::read_to_string(ws.classes().join(SERVICES)).unwrap(),
        "PluginB\nPluginA\n"
    );
}

// =============================================================================
// Scenario C: passthrough duplicates
// =============================================================================

#[test]
fn test_scenario_c_primary_copy_wins() {
    let ws = Workspace::new();
    JarBuilder::new()
        .entry("lib/helper.txt", "from primary")
        .write(&ws.primary());
    let dep = JarBuilder::new()
        .entry("lib/helper.txt", "from dependency")
        .write(&ws.dep("dep.jar"));

    let report = ws.run(defaults(), &[dep]).unwrap();
    assert_eq!(
        entry_text(&ws.merged_jar(), "lib/helper.txt").unwrap(),
        "from primary"
    );
    let count = entry_names(&ws.merged_jar())
        .iter()
        .filter(|n| n.as_str() == "lib/helper.txt")
        .count();
    assert_eq!(count, 1);

    assert_eq!(report.diagnostics.len(), 1);
    assert!(matches!(
        &report.diagnostics[0],
        Diagnostic::DuplicateEntryClobber { path, kept_from, archive }
            if path == "lib/helper.txt" && kept_from == "app.jar" && archive == "dep.jar"
    ));
}

#[test]
fn test_first_dependency_wins_when_primary_lacks_entry() {
    let ws = Workspace::new();
    JarBuilder::new().entry("App.class", "x").write(&ws.primary());
    let one = JarBuilder::new().entry("shared.txt", "one").write(&ws.dep("one.jar"));
    let two = JarBuilder::new().entry("shared.txt", "two").write(&ws.dep("two.jar"));
    let three = JarBuilder::new().entry("shared.txt", "three").write(&ws.dep("three.jar"));

    let report = ws.run(defaults(), &[one, two, three]).unwrap();
    assert_eq!(entry_text(&ws.merged_jar(), "shared.txt").unwrap(), "one");
    assert_eq!(report.diagnostics.len(), 2);
}

#[test]
fn test_repeated_directories_and_meta_inf_are_silent() {
    let ws = Workspace::new();
    JarBuilder::new()
        .dir("com/")
        .dir("META-INF/services/")
        .entry("META-INF/DEPENDENCIES", "primary")
        .write(&ws.primary());
    let dep = JarBuilder::new()
        .dir("com/")
        .dir("META-INF/services/")
        .entry("META-INF/DEPENDENCIES", "dependency")
        .write(&ws.dep("dep.jar"));

    let report = ws.run(defaults(), &[dep]).unwrap();
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.archives[1].stats.duplicates, 3);
    assert_eq!(
        entry_text(&ws.merged_jar(), "META-INF/DEPENDENCIES").unwrap(),
        "primary"
    );
}

// =============================================================================
// Scenario D: nothing to merge
// =============================================================================

#[test]
fn test_scenario_d_no_merge_eligible_resources() {
    let ws = Workspace::new();
    JarBuilder::new()
        .entry("com/example/App.class", "app")
        .write(&ws.primary());
    let dep = JarBuilder::new()
        .entry("org/lib/Lib.class", "lib")
        .write(&ws.dep("dep.jar"));

    let report = ws.run(defaults(), &[dep]).unwrap();
    assert_eq!(report.merged_resource_count(), 0);
    assert_eq!(report.passthrough_entries, 2);
    assert!(!ws.classes().exists());
    assert!(!ws.settings_dir().exists());
    assert_eq!(
        entry_names(&ws.merged_jar()),
        ["META-INF/MANIFEST.MF", "com/example/App.class", "org/lib/Lib.class"]
    );
}

// =============================================================================
// Skipped content
// =============================================================================

#[test]
fn test_skipped_paths_never_reach_any_output() {
    let ws = Workspace::new();
    JarBuilder::new()
        .entry("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\r\n\r\n")
        .entry("com/example/App.class", "app")
        .write(&ws.primary());
    let dep = JarBuilder::new()
        .entry("META-INF/maven/org.lib/lib/pom.xml", "<project/>")
        .entry("META-INF/SIGNER.SF", "signature")
        .entry("META-INF/SIGNER.RSA", "signature")
        .entry("META-INF/INDEX.LIST", "index")
        .entry("org/slf4j/Logger.class", "logger")
        .entry("org/lib/Lib.class", "lib")
        .write(&ws.dep("dep.jar"));

    let mut settings = defaults();
    settings.exclude = classpath_merge::config::ExcludeSpec::Joined("org.slf4j".to_string());
    ws.run(settings, &[dep]).unwrap();

    let names = entry_names(&ws.merged_jar());
    assert_eq!(
        names,
        ["META-INF/MANIFEST.MF", "com/example/App.class", "org/lib/Lib.class"]
    );
}

#[test]
fn test_license_files_merge_unless_skipped() {
    let ws = Workspace::new();
    JarBuilder::new()
        .entry("META-INF/LICENSE", "Apache License\n")
        .write(&ws.primary());
    let dep = JarBuilder::new()
        .entry("META-INF/LICENSE", "MIT License\nApache License\n")
        .write(&ws.dep("dep.jar"));

    ws.run(defaults(), &[dep.clone()]).unwrap();
    assert_eq!(
        entry_text(&ws.merged_jar(), "META-INF/LICENSE").unwrap(),
        "Apache License\nMIT License\n"
    );

    fs::remove_dir_all(ws.classes()).unwrap();
    fs::remove_dir_all(ws.settings_dir()).unwrap();
    let mut settings = defaults();
    settings.skip_license_files = true;
    ws.run(settings, &[dep]).unwrap();
    assert!(entry_text(&ws.merged_jar(), "META-INF/LICENSE").is_none());
}

// =============================================================================
// Dependency input
// =============================================================================

#[test]
fn test_test_and_provided_scopes_do_not_participate() {
    let ws = Workspace::new();
    JarBuilder::new().entry(SETTINGS, "a=1\n").write(&ws.primary());
    let test_jar = JarBuilder::new().entry(SETTINGS, "a=test\n").write(&ws.dep("test.jar"));
    let provided = JarBuilder::new()
        .entry(SETTINGS, "a=provided\n")
        .write(&ws.dep("provided.jar"));
    let pom = ws.dep("lib.pom");
    fs::write(&pom, "<project/>").unwrap();

    let resolver = StaticResolver::new(vec![
        Dependency::new(test_jar, Scope::Test),
        Dependency::new(provided, Scope::Provided),
        Dependency::new(pom, Scope::Compile),
    ]);
    let report = MergeOrchestrator::new(
        defaults(),
        BuildLayout::new(ws.primary(), ws.classes()),
        resolver,
    )
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(report.archives.len(), 1);
    let merged = parse_properties(entry_text(&ws.merged_jar(), SETTINGS).unwrap().as_bytes()).unwrap();
    assert_eq!(merged["a"], "1");
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_dependency_is_fatal_and_leaves_no_jar() {
    let ws = Workspace::new();
    JarBuilder::new().entry("App.class", "x").write(&ws.primary());
    let resolver = StaticResolver::new(vec![Dependency::new(ws.dep("missing.jar"), Scope::Compile)]);
    let orchestrator = MergeOrchestrator::new(
        defaults(),
        BuildLayout::new(ws.primary(), ws.classes()),
        resolver,
    )
    .unwrap();

    let mut run = MergeRun::new();
    let err = orchestrator.run_with(&mut run).unwrap_err();
    match &err {
        MergeError::ArchiveRead { archive, .. } => assert_eq!(archive, "missing.jar"),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().contains("missing.jar"));
    assert_eq!(run.phase(), MergePhase::Failed);
    assert!(!ws.merged_jar().exists());
    assert!(!ws.root().join("build/libs/.merged-jar.jar.partial").exists());
}

#[test]
fn test_corrupt_dependency_is_fatal() {
    let ws = Workspace::new();
    JarBuilder::new().entry("App.class", "x").write(&ws.primary());
    let corrupt = ws.dep("corrupt.jar");
    fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
    fs::write(&corrupt, b"this is not a zip archive").unwrap();

    let err = ws.run(defaults(), &[corrupt]).unwrap_err();
    assert!(matches!(err, MergeError::ArchiveRead { ref archive, .. } if archive == "corrupt.jar"));
    assert!(!ws.merged_jar().exists());
    let leftovers: Vec<_> = fs::read_dir(ws.root().join("build/libs"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, [std::ffi::OsString::from("app.jar")]);
}

#[test]
fn test_checksum_mismatch_names_the_entry() {
    let ws = Workspace::new();
    JarBuilder::new().entry("App.class", "x").write(&ws.primary());
    let payload = b"payload bytes for a stored entry";
    let dep = JarBuilder::new()
        .stored("lib/data.txt", payload)
        .write(&ws.dep("damaged.jar"));

    let mut bytes = fs::read(&dep).unwrap();
    let at = bytes
        .windows(payload.len())
        .position(|w| w == payload)
        .unwrap();
    bytes[at] ^= 0xff;
    fs::write(&dep, bytes).unwrap();

    let err = ws.run(defaults(), &[dep]).unwrap_err();
    match &err {
        MergeError::ArchiveRead { archive, entry, .. } => {
            assert_eq!(archive, "damaged.jar");
            assert_eq!(entry.as_deref(), Some("lib/data.txt"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!ws.merged_jar().exists());
    assert!(!ws.root().join("build/libs/.merged-jar.jar.partial").exists());
    let leftovers: Vec<_> = fs::read_dir(ws.root().join("build/libs"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, [std::ffi::OsString::from("app.jar")]);
}

struct UnavailableResolver;

impl DependencyResolver for UnavailableResolver {
    fn resolve(&self) -> Result<Vec<Dependency>, ResolveError> {
        Err(ResolveError::Other("repository offline".to_string()))
    }
}

#[test]
fn test_resolver_failure_is_fatal() {
    let ws = Workspace::new();
    JarBuilder::new().entry(SETTINGS, "a=1\n").write(&ws.primary());
    let orchestrator = MergeOrchestrator::new(
        defaults(),
        BuildLayout::new(ws.primary(), ws.classes()),
        UnavailableResolver,
    )
    .unwrap();

    let mut run = MergeRun::new();
    let err = orchestrator.run_with(&mut run).unwrap_err();
    assert!(matches!(err, MergeError::DependencyResolution(ResolveError::Other(_))));
    assert!(err.to_string().contains("repository offline"));
    assert_eq!(run.phase(), MergePhase::Failed);
    assert!(!ws.merged_jar().exists());
    assert!(!ws.classes().exists());
    assert!(!ws.settings_dir().exists());
}

#[test]
fn test_services_dot_entries_are_bundled_not_merged() {
    let ws = Workspace::new();
    JarBuilder::new()
        .entry(SERVICES, "PluginA\n")
        .write(&ws.primary());
    let dep = JarBuilder::new()
        .entry("META-INF/services/..", "Odd\n")
        .entry("META-INF/services/.", "Odder\n")
        .entry(SERVICES, "PluginB\n")
        .write(&ws.dep("odd.jar"));

    let report = ws.run(defaults(), &[dep]).unwrap();
    assert_eq!(report.phase, MergePhase::Done);
    assert_eq!(report.merged_resource_count(), 1);
    assert_eq!(report.merged_resources[0].path, SERVICES);

    let names = entry_names(&ws.merged_jar());
    assert!(names.iter().any(|n| n == "META-INF/services/.."));
    assert!(names.iter().any(|n| n == "META-INF/services/."));
    assert_eq!(
        entry_text(&ws.merged_jar(), SERVICES).unwrap(),
        "PluginA\nPluginB\n"
    );

    let settings: Vec<_> = fs::read_dir(ws.settings_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(settings, [std::ffi::OsString::from("com.example.Plugin")]);
}

#[test]
fn test_malformed_exclude_list_fails_before_io() {
    let ws = Workspace::new();
    let mut settings = defaults();
    settings.exclude = classpath_merge::config::ExcludeSpec::Joined("org slf4j".to_string());
    let result = MergeOrchestrator::new(
        settings,
        BuildLayout::new(ws.primary(), ws.classes()),
        StaticResolver::new(vec![]),
    );
    assert!(matches!(
        result,
        Err(MergeError::Configuration(ConfigError::Exclude(_)))
    ));
    assert!(!ws.root().join("build").exists());
}

// =============================================================================
// Merged jar construction
// =============================================================================

#[test]
fn test_manifest_carries_main_class_and_primary_attributes() {
    let ws = Workspace::new();
    JarBuilder::new()
        .entry(
            "META-INF/MANIFEST.MF",
            "Manifest-Version: 1.0\r\nCreated-By: test-suite\r\n\r\n",
        )
        .entry("com/example/Main.class", "main")
        .write(&ws.primary());

    let mut settings = defaults();
    settings.main_class = Some("com.example.Main".to_string());
    let report = ws.run(settings, &[]).unwrap();

    let jar = ws.root().join("build/libs/Main.jar");
    assert_eq!(report.merged_archive.as_deref(), Some(jar.as_path()));
    assert_eq!(entry_names(&jar)[0], "META-INF/MANIFEST.MF");
    let manifest = entry_text(&jar, "META-INF/MANIFEST.MF").unwrap();
    assert!(manifest.starts_with("Manifest-Version: 1.0\r\n"));
    assert!(manifest.contains("Created-By: test-suite\r\n"));
    assert!(manifest.contains("Main-Class: com.example.Main\r\n"));
}

#[test]
fn test_disabled_merged_archive_still_writes_loose_outputs() {
    let ws = Workspace::new();
    JarBuilder::new().entry(SERVICES, "PluginA\n").write(&ws.primary());
    let mut settings = defaults();
    settings.merged_archive = false;

    let report = ws.run(settings, &[]).unwrap();
    assert!(report.merged_archive.is_none());
    assert!(report.merged_archive_sha256.is_none());
    assert!(!ws.merged_jar().exists());
    assert_eq!(
        fs::read_to_string(ws.classes().join(SERVICES)).unwrap(),
        "PluginA\n"
    );
    assert!(ws.settings_dir().join("com.example.Plugin").is_file());
}

#[test]
fn test_existing_loose_properties_fold_in() {
    let ws = Workspace::new();
    let loose = ws.classes().join(SETTINGS);
    fs::create_dir_all(loose.parent().unwrap()).unwrap();
    fs::write(&loose, "local.only=yes\na=local\n").unwrap();
    JarBuilder::new().entry(SETTINGS, "a=1\n").write(&ws.primary());

    let report = ws.run(defaults(), &[]).unwrap();
    let merged = parse_properties(&fs::read(&loose).unwrap()).unwrap();
    assert_eq!(merged["a"], "1");
    assert_eq!(merged["local.only"], "yes");
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::LocalOverride { key, .. } if key == "a")));
    // The jar entry carries the folded map too.
    let in_jar = parse_properties(entry_text(&ws.merged_jar(), SETTINGS).unwrap().as_bytes()).unwrap();
    assert_eq!(in_jar, merged);
}
