//! `viewcache warm`: pre-cache every template under the roots.
//!
//! 1. Load config and apply `VIEWCACHE_*` overrides, then command-line flags
//! 2. Ask the configured host adapter whether to run, and over which roots
//! 3. Open the store and run `precache`
//! 4. Print a summary, or the JSON report with `--json`
//!
//! Exit codes: 0 when every file was cached durably, 1 on a fatal error,
//! 2 when some files or directories failed.

use viewcache_cache::{precache, PrecacheOptions, PrecacheReport};
use viewcache_config::{host_from_config, loader::validate_config, StoreBackend, ViewCacheConfig};

use crate::setup::{build_engine, load_config};
use crate::{GlobalArgs, StoreChoice, WarmArgs};

/// Runs the `viewcache warm` command.
pub async fn run(args: &WarmArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = load_config(global)?;
    apply_args(&mut config, args)?;

    let decision = host_from_config(&config).decision()?;
    if !decision.enabled {
        if !global.quiet {
            eprintln!("pre-cache is disabled for this host configuration");
        }
        return Ok(0);
    }

    let engine = build_engine(&config).await?;
    let options = PrecacheOptions::new(config.cache.concurrency)
        .with_extension(config.cache.extension.clone());
    let report = precache(engine, &decision.roots, &options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else if !global.quiet {
        print_summary(&report);
    }

    Ok(if report.is_clean() { 0 } else { 2 })
}

/// Layers command-line flags over the loaded configuration.
fn apply_args(config: &mut ViewCacheConfig, args: &WarmArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.roots.is_empty() {
        config.cache.roots = args.roots.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.cache.concurrency = concurrency;
    }
    if let Some(store) = args.store {
        config.store.backend = match store {
            StoreChoice::Memory => StoreBackend::Memory,
            StoreChoice::File => StoreBackend::File,
            StoreChoice::Redis => StoreBackend::Redis,
        };
    }
    if let Some(path) = &args.store_path {
        config.store.path = Some(path.clone());
    }
    validate_config(config)?;
    Ok(())
}

fn print_summary(report: &PrecacheReport) {
    eprintln!(
        "    Cached {} templates ({} compiled, {} reused, {} skipped)",
        report.cached.len(),
        report.compiled,
        report.reused,
        report.skipped
    );
    for failure in &report.failures {
        eprintln!("warning: {}: {}", failure.path.display(), failure.error);
    }
    for error in &report.directory_errors {
        eprintln!("error: {error}");
    }
}

fn report_json(report: &PrecacheReport) -> serde_json::Value {
    serde_json::json!({
        "cached": report.cached.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        "compiled": report.compiled,
        "reused": report.reused,
        "skipped": report.skipped,
        "failures": report
            .failures
            .iter()
            .map(|f| serde_json::json!({
                "path": f.path.display().to_string(),
                "error": f.error.to_string(),
            }))
            .collect::<Vec<_>>(),
        "directory_errors": report
            .directory_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        "clean": report.is_clean(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use viewcache_cache::{FileError, FileFailure, ResolveError};
    use viewcache_template::CompileError;

    fn args() -> WarmArgs {
        WarmArgs {
            roots: Vec::new(),
            concurrency: None,
            store: None,
            store_path: None,
            json: false,
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = ViewCacheConfig::default();
        let args = WarmArgs {
            roots: vec![PathBuf::from("templates")],
            concurrency: Some(16),
            store: Some(StoreChoice::File),
            store_path: Some(PathBuf::from(".cache")),
            ..args()
        };
        apply_args(&mut config, &args).unwrap();
        assert_eq!(config.cache.roots, vec![PathBuf::from("templates")]);
        assert_eq!(config.cache.concurrency, 16);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.path, Some(PathBuf::from(".cache")));
    }

    #[test]
    fn no_flags_keep_config() {
        let mut config = ViewCacheConfig::default();
        config.cache.roots = vec![PathBuf::from("views")];
        apply_args(&mut config, &args()).unwrap();
        assert_eq!(config.cache.roots, vec![PathBuf::from("views")]);
        assert_eq!(config.cache.concurrency, 4);
    }

    #[test]
    fn file_store_flag_without_path_is_rejected() {
        let mut config = ViewCacheConfig::default();
        let args = WarmArgs {
            store: Some(StoreChoice::File),
            ..args()
        };
        assert!(apply_args(&mut config, &args).is_err());
    }

    #[test]
    fn zero_concurrency_flag_is_rejected() {
        let mut config = ViewCacheConfig::default();
        let args = WarmArgs {
            concurrency: Some(0),
            ..args()
        };
        assert!(apply_args(&mut config, &args).is_err());
    }

    #[test]
    fn json_report_shape() {
        let report = PrecacheReport {
            cached: vec![PathBuf::from("views/a.tmpl")],
            compiled: 1,
            failures: vec![FileFailure {
                path: PathBuf::from("views/b.tmpl"),
                error: FileError::Resolve(ResolveError::Compilation {
                    path: PathBuf::from("views/b.tmpl"),
                    source: CompileError::UnterminatedTag { line: 2 },
                }),
            }],
            ..PrecacheReport::default()
        };
        let value = report_json(&report);
        assert_eq!(value["cached"][0], "views/a.tmpl");
        assert_eq!(value["compiled"], 1);
        assert_eq!(value["failures"][0]["path"], "views/b.tmpl");
        assert_eq!(value["clean"], false);
        assert!(value["directory_errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn warm_runs_over_file_store() {
        let views = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let config_dir = tempfile::tempdir().unwrap();
        std::fs::write(views.path().join("a.tmpl"), "{{ a }}").unwrap();
        let config_path = config_dir.path().join("viewcache.toml");
        std::fs::write(&config_path, "").unwrap();

        let global = GlobalArgs {
            quiet: true,
            config: Some(config_path),
        };
        let args = WarmArgs {
            roots: vec![views.path().to_path_buf()],
            store: Some(StoreChoice::File),
            store_path: Some(cache.path().to_path_buf()),
            ..args()
        };
        assert_eq!(run(&args, &global).await.unwrap(), 0);
        assert!(cache.path().join("artifacts").is_dir());
    }
}
