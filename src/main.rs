//! classpath-merge CLI
//!
//! Entry point for the `classpath-merge` command-line tool.

use clap::{ArgAction, Parser, Subcommand};
use classpath_merge::config::DEFAULT_CONFIG_FILE;
use classpath_merge::{
    explain, telemetry, BuildLayout, ChainResolver, Dependency, DependencyResolver,
    EffectiveConfig, ListFileResolver, MergeOrchestrator, ResourcePath, Scope, StaticResolver,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "classpath-merge")]
#[command(about = "Merge classpath resources of a jar and its dependencies", version)]
struct Cli {
    /// More output (repeatable)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less output (repeatable)
    #[arg(long, short = 'q', action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the primary artifact with its dependency jars
    Merge {
        /// Path to config file (default: classpath-merge.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Archive built from the current project
        #[arg(long)]
        primary: PathBuf,

        /// Loose class-output directory
        #[arg(long)]
        classes_dir: PathBuf,

        /// Directory for the merged jar (default: the primary's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Dependency jar in compile scope (repeatable, in classpath order)
        #[arg(long = "dep")]
        deps: Vec<PathBuf>,

        /// TOML file listing [[dependency]] entries with path and scope
        #[arg(long)]
        dep_list: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Print the report as canonical JSON
        #[arg(long)]
        json: bool,

        /// Also write the canonical JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Explain how resource paths are classified
    Classify {
        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// Path to config file (default: classpath-merge.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Resource paths as stored in a jar
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Verify the configuration and print effective values
    Verify {
        /// Path to config file (default: classpath-merge.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

/// Settings that can be given on the command line
#[derive(clap::Args, Default)]
struct Overrides {
    /// Main class for the merged jar manifest ("none" to unset)
    #[arg(long)]
    main_class: Option<String>,

    /// Base name of the merged jar ("none" to unset)
    #[arg(long)]
    jar_name: Option<String>,

    /// Comma-separated path prefixes to leave out (dots map to '/')
    #[arg(long)]
    exclude: Option<String>,

    /// Drop LICENSE and NOTICE files
    #[arg(long)]
    skip_license_files: bool,

    /// Keep META-INF/maven metadata
    #[arg(long)]
    keep_vendor_metadata: bool,

    /// Treat settings properties as ordinary entries
    #[arg(long)]
    no_normalize_settings: bool,

    /// Do not write a merged jar
    #[arg(long)]
    no_merged_archive: bool,
}

impl Overrides {
    fn to_table(&self) -> Option<toml::Table> {
        let mut table = toml::Table::new();
        if let Some(main_class) = &self.main_class {
            table.insert("main_class".into(), main_class.clone().into());
        }
        if let Some(name) = &self.jar_name {
            table.insert("output_jar_name".into(), name.clone().into());
        }
        if let Some(exclude) = &self.exclude {
            table.insert("exclude".into(), exclude.clone().into());
        }
        if self.skip_license_files {
            table.insert("skip_license_files".into(), true.into());
        }
        if self.keep_vendor_metadata {
            table.insert("skip_vendor_metadata".into(), false.into());
        }
        if self.no_normalize_settings {
            table.insert("normalize_settings_files".into(), false.into());
        }
        if self.no_merged_archive {
            table.insert("merged_archive".into(), false.into());
        }
        if table.is_empty() {
            None
        } else {
            Some(table)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let verbosity = i8::try_from(i16::from(cli.verbose) - i16::from(cli.quiet)).unwrap_or(0);
    telemetry::init(verbosity);

    match cli.command {
        Commands::Merge {
            config,
            primary,
            classes_dir,
            output_dir,
            deps,
            dep_list,
            overrides,
            json,
            report,
        } => {
            let layout = BuildLayout::new(primary, classes_dir);
            let layout = match output_dir {
                Some(dir) => layout.with_output_dir(dir),
                None => layout,
            };
            run_merge(config, layout, deps, dep_list, &overrides, json, report);
        }
        Commands::Classify {
            human,
            config,
            overrides,
            paths,
        } => {
            run_classify(human, config, &overrides, &paths);
        }
        Commands::Verify { config } => {
            run_verify(config);
        }
    }
}

fn load_config(config_path: Option<PathBuf>, overrides: &Overrides) -> EffectiveConfig {
    // An explicitly named file must exist; the default one is optional.
    let require_file = config_path.is_some();
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match EffectiveConfig::build(Some(path.as_path()), require_file, overrides.to_table()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_merge(
    config_path: Option<PathBuf>,
    layout: BuildLayout,
    deps: Vec<PathBuf>,
    dep_list: Option<PathBuf>,
    overrides: &Overrides,
    json: bool,
    report_path: Option<PathBuf>,
) {
    let config = load_config(config_path, overrides);

    let mut resolvers: Vec<Box<dyn DependencyResolver>> = vec![Box::new(StaticResolver::new(
        deps.into_iter()
            .map(|path| Dependency::new(path, Scope::Compile))
            .collect(),
    ))];
    if let Some(list) = dep_list {
        resolvers.push(Box::new(ListFileResolver::new(list)));
    }

    let orchestrator =
        match MergeOrchestrator::new(config.settings, layout, ChainResolver::new(resolvers)) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };

    let report = match orchestrator.run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Merge failed: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = report_path {
        if let Err(e) = report.write_to_file(&path) {
            eprintln!("Error writing report {}: {}", path.display(), e);
            process::exit(1);
        }
    }

    if json {
        match report.to_canonical_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", report);
    }
}

#[derive(Serialize)]
struct ClassifyOutput {
    path: String,
    strategy: String,
    rule: String,
}

fn run_classify(human: bool, config_path: Option<PathBuf>, overrides: &Overrides, paths: &[String]) {
    let config = load_config(config_path, overrides);
    let classifier = match config.settings.classifier_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let mut outputs = Vec::with_capacity(paths.len());
    for raw in paths {
        let path = match ResourcePath::new(raw) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Invalid resource path {:?}: {}", raw, e);
                process::exit(1);
            }
        };
        let classification = explain(&path, &classifier);
        outputs.push(ClassifyOutput {
            path: path.to_string(),
            strategy: classification.strategy.to_string(),
            rule: classification.rule.to_code(),
        });
    }

    if human {
        for output in &outputs {
            println!("{}", output.path);
            println!("  Strategy: {}", output.strategy);
            println!("  Rule: {}", output.rule);
        }
    } else {
        match serde_json::to_string_pretty(&outputs) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_verify(config_path: Option<PathBuf>) {
    let config = load_config(config_path, &Overrides::default());
    let settings = &config.settings;

    println!("Configuration valid");
    println!();
    for source in &config.sources {
        match (&source.path, &source.digest) {
            (Some(path), Some(digest)) => {
                println!("  Source: {:?} {} (sha256 {})", source.origin, path, digest)
            }
            _ => println!("  Source: {:?}", source.origin),
        }
    }
    println!(
        "  Main class: {}",
        settings.main_class.as_deref().unwrap_or("(none)")
    );
    println!("  Merged jar: {}", settings.merged_jar_file_name());
    match settings.classifier_config() {
        Ok(classifier) if !classifier.exclude_prefixes.is_empty() => {
            println!("  Exclude: {}", classifier.exclude_prefixes.join(", "));
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
    println!("  Skip vendor metadata: {}", settings.skip_vendor_metadata);
    println!("  Normalize settings files: {}", settings.normalize_settings_files);
    println!("  Skip license files: {}", settings.skip_license_files);
    println!("  Merged archive: {}", settings.merged_archive);
    if !Path::new(DEFAULT_CONFIG_FILE).exists() && config.sources.len() == 1 {
        println!();
        println!("(no {} found; using built-in defaults)", DEFAULT_CONFIG_FILE);
    }
}
