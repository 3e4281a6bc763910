//! Bounded-concurrency pre-caching over template roots.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::{self, JoinError, JoinSet};
use viewcache_template::CompiledTemplate;

use crate::engine::{Engine, Outcome, Resolved};
use crate::error::{FileError, PrecacheError, ResolveError, ScanError};
use crate::scan::{DirectoryLister, FsLister, TemplateWalker};

/// Callback invoked with each template installed into the registry.
pub type CompiledHook = Arc<dyn Fn(&Path, &CompiledTemplate) + Send + Sync>;

/// Walk results buffered ahead of dispatch.
const WALK_BUFFER: usize = 64;

/// Tuning for one [`precache`] run.
#[derive(Clone)]
pub struct PrecacheOptions {
    /// Maximum number of files resolved at once. Must be between 1 and
    /// [`Semaphore::MAX_PERMITS`].
    pub concurrency: usize,
    /// Template extension without the leading dot.
    pub extension: String,
    /// Called after each template is installed, whether reused or compiled.
    pub on_compiled: Option<CompiledHook>,
    /// Lists directories during the walk.
    pub lister: Arc<dyn DirectoryLister>,
}

impl PrecacheOptions {
    /// Options with the given concurrency, the `tmpl` extension, no hook and
    /// the filesystem lister.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            extension: "tmpl".to_string(),
            on_compiled: None,
            lister: Arc::new(FsLister),
        }
    }

    /// Sets the template extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the per-template callback.
    pub fn with_on_compiled(
        mut self,
        hook: impl Fn(&Path, &CompiledTemplate) + Send + Sync + 'static,
    ) -> Self {
        self.on_compiled = Some(Arc::new(hook));
        self
    }

    /// Sets the directory lister used by the walk.
    pub fn with_lister(mut self, lister: impl DirectoryLister + 'static) -> Self {
        self.lister = Arc::new(lister);
        self
    }
}

impl Default for PrecacheOptions {
    fn default() -> Self {
        Self::new(4)
    }
}

impl fmt::Debug for PrecacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrecacheOptions")
            .field("concurrency", &self.concurrency)
            .field("extension", &self.extension)
            .field("on_compiled", &self.on_compiled.is_some())
            .finish_non_exhaustive()
    }
}

/// One file that did not end up durably cached.
#[derive(Debug)]
pub struct FileFailure {
    /// The template path.
    pub path: PathBuf,
    /// What went wrong.
    pub error: FileError,
}

/// Summary of a [`precache`] run.
#[derive(Debug, Default)]
pub struct PrecacheReport {
    /// Paths installed into the registry during this run, sorted.
    pub cached: Vec<PathBuf>,
    /// Paths left alone because the registry already held them.
    pub skipped: usize,
    /// Per-file failures, sorted by path.
    pub failures: Vec<FileFailure>,
    /// Directories that could not be listed, in walk order.
    pub directory_errors: Vec<ScanError>,
    /// Templates served from stored artifacts.
    pub reused: usize,
    /// Templates compiled during this run.
    pub compiled: usize,
}

impl PrecacheReport {
    /// The first directory that could not be scanned, if any.
    pub fn first_fatal(&self) -> Option<&ScanError> {
        self.directory_errors.first()
    }

    /// Whether every discovered file was cached and every directory scanned.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.directory_errors.is_empty()
    }
}

type Joined = Result<(task::Id, (PathBuf, Result<Resolved, ResolveError>)), JoinError>;

/// Walks `roots` and resolves every template through `engine`, at most
/// `options.concurrency` at a time.
///
/// The walk runs on the blocking pool and streams paths back, so directory
/// listing never stalls the runtime. Only misconfiguration fails the call.
/// Unreadable directories and files that fail to resolve are collected in the
/// report.
#[tracing::instrument(skip_all, fields(roots = roots.len(), concurrency = options.concurrency))]
pub async fn precache(
    engine: Arc<Engine>,
    roots: &[PathBuf],
    options: &PrecacheOptions,
) -> Result<PrecacheReport, PrecacheError> {
    if options.concurrency == 0 || options.concurrency > Semaphore::MAX_PERMITS {
        return Err(PrecacheError::InvalidConcurrency {
            requested: options.concurrency,
            max: Semaphore::MAX_PERMITS,
        });
    }
    if roots.is_empty() {
        return Err(PrecacheError::NoRoots);
    }
    if let Some(missing) = roots.iter().find(|root| !root.is_dir()) {
        return Err(PrecacheError::MissingRoot {
            path: missing.clone(),
        });
    }

    let mut report = PrecacheReport::default();
    let semaphore = Arc::new(Semaphore::new(options.concurrency));
    let mut tasks = JoinSet::new();
    let mut in_flight: HashMap<task::Id, PathBuf> = HashMap::new();
    let mut seen = HashSet::new();

    let walker = TemplateWalker::new(roots.to_vec(), options.extension.clone())
        .with_lister(Arc::clone(&options.lister));
    let (tx, mut rx) = mpsc::channel(WALK_BUFFER);
    let walk = task::spawn_blocking(move || {
        for entry in walker {
            if tx.blocking_send(entry).is_err() {
                break;
            }
        }
    });

    while let Some(entry) = rx.recv().await {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                report.directory_errors.push(e);
                continue;
            }
        };
        if !seen.insert(path.clone()) {
            continue;
        }
        if engine.registry().contains(&path) {
            tracing::debug!(path = %path.display(), "already cached, skipping");
            report.skipped += 1;
            continue;
        }

        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let engine = Arc::clone(&engine);
        let task_path = path.clone();
        let handle = tasks.spawn(async move {
            let result = engine.resolve(&task_path).await;
            drop(permit);
            (task_path, result)
        });
        in_flight.insert(handle.id(), path);

        while let Some(joined) = tasks.try_join_next_with_id() {
            record(&mut report, options, &mut in_flight, joined);
        }
    }
    drop(rx);

    while let Some(joined) = tasks.join_next_with_id().await {
        record(&mut report, options, &mut in_flight, joined);
    }
    if let Err(e) = walk.await {
        tracing::error!(error = %e, "template walk did not complete");
    }

    report.cached.sort();
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));

    tracing::info!(
        cached = report.cached.len(),
        reused = report.reused,
        compiled = report.compiled,
        skipped = report.skipped,
        failures = report.failures.len(),
        directory_errors = report.directory_errors.len(),
        "template pre-cache finished"
    );
    Ok(report)
}

fn record(
    report: &mut PrecacheReport,
    options: &PrecacheOptions,
    in_flight: &mut HashMap<task::Id, PathBuf>,
    joined: Joined,
) {
    let (path, result) = match joined {
        Ok((id, done)) => {
            in_flight.remove(&id);
            done
        }
        Err(e) => {
            let Some(path) = in_flight.remove(&e.id()) else {
                tracing::error!(error = %e, "untracked template task did not complete");
                return;
            };
            tracing::error!(path = %path.display(), error = %e, "template task did not complete");
            report.failures.push(FileFailure {
                path,
                error: FileError::TaskFailed {
                    reason: e.to_string(),
                },
            });
            return;
        }
    };
    let resolved = match result {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "template not cached");
            report.failures.push(FileFailure {
                path,
                error: e.into(),
            });
            return;
        }
    };

    if let Some(hook) = &options.on_compiled {
        hook(&path, resolved.template.as_ref());
    }
    match resolved.outcome {
        Outcome::Reused => report.reused += 1,
        Outcome::Compiled => report.compiled += 1,
        Outcome::CompiledUnpersisted(e) => {
            report.compiled += 1;
            report.failures.push(FileFailure {
                path: path.clone(),
                error: FileError::NotPersisted(e),
            });
        }
    }
    report.cached.push(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ReadyRegistry;
    use std::sync::Mutex;
    use viewcache_store::MemoryStore;
    use viewcache_template::PlaceholderCompiler;

    fn engine() -> Arc<Engine> {
        Arc::new(Engine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(PlaceholderCompiler::new()),
            Arc::new(ReadyRegistry::new()),
        ))
    }

    #[tokio::test]
    async fn rejects_empty_roots() {
        let err = precache(engine(), &[], &PrecacheOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PrecacheError::NoRoots));
    }

    #[tokio::test]
    async fn rejects_missing_root_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tmpl"), "a").unwrap();
        let missing = dir.path().join("gone");
        let engine = engine();

        let err = precache(
            Arc::clone(&engine),
            &[dir.path().to_path_buf(), missing.clone()],
            &PrecacheOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PrecacheError::MissingRoot { path } if path == missing));
        assert!(engine.registry().is_empty());
    }

    #[tokio::test]
    async fn rejects_zero_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let err = precache(engine(), &[dir.path().to_path_buf()], &PrecacheOptions::new(0))
            .await
            .unwrap_err();
        assert!(matches!(err, PrecacheError::InvalidConcurrency { requested: 0, .. }));
    }

    #[tokio::test]
    async fn rejects_concurrency_above_permit_limit() {
        let dir = tempfile::tempdir().unwrap();
        let err = precache(
            engine(),
            &[dir.path().to_path_buf()],
            &PrecacheOptions::new(usize::MAX),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            PrecacheError::InvalidConcurrency { requested: usize::MAX, max } if max == Semaphore::MAX_PERMITS
        ));
    }

    #[tokio::test]
    async fn largest_concurrency_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tmpl"), "a").unwrap();
        let report = precache(
            engine(),
            &[dir.path().to_path_buf()],
            &PrecacheOptions::new(Semaphore::MAX_PERMITS),
        )
        .await
        .unwrap();
        assert_eq!(report.cached, vec![dir.path().join("a.tmpl")]);
    }

    #[tokio::test]
    async fn walk_feeds_more_files_than_the_buffer_holds() {
        let dir = tempfile::tempdir().unwrap();
        let count = WALK_BUFFER * 3;
        for i in 0..count {
            std::fs::write(dir.path().join(format!("t{i:03}.tmpl")), format!("{i}")).unwrap();
        }
        let report = precache(engine(), &[dir.path().to_path_buf()], &PrecacheOptions::new(1))
            .await
            .unwrap();
        assert_eq!(report.cached.len(), count);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn empty_root_gives_empty_clean_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = precache(engine(), &[dir.path().to_path_buf()], &PrecacheOptions::default())
            .await
            .unwrap();
        assert!(report.cached.is_empty());
        assert!(report.is_clean());
        assert!(report.first_fatal().is_none());
    }

    #[tokio::test]
    async fn duplicate_roots_resolve_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tmpl"), "a").unwrap();
        let root = dir.path().to_path_buf();
        let engine = engine();

        let report = precache(
            Arc::clone(&engine),
            &[root.clone(), root.clone()],
            &PrecacheOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(report.cached, vec![root.join("a.tmpl")]);
        assert_eq!(report.skipped, 0);
        assert_eq!(engine.stats().compiled, 1);
    }

    #[tokio::test]
    async fn hook_sees_every_installed_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tmpl"), "a").unwrap();
        std::fs::write(dir.path().join("b.tmpl"), "b {{").unwrap();
        std::fs::write(dir.path().join("c.tmpl"), "c").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = PrecacheOptions::new(2).with_on_compiled(move |path, _| {
            sink.lock().unwrap().push(path.to_path_buf());
        });

        let report = precache(engine(), &[dir.path().to_path_buf()], &options)
            .await
            .unwrap();
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, report.cached);
        assert_eq!(report.cached.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pug"), "a").unwrap();
        std::fs::write(dir.path().join("b.tmpl"), "b").unwrap();
        let options = PrecacheOptions::new(1).with_extension("pug");
        let report = precache(engine(), &[dir.path().to_path_buf()], &options)
            .await
            .unwrap();
        assert_eq!(report.cached, vec![dir.path().join("a.pug")]);
    }

    #[test]
    fn options_debug_hides_hook() {
        let options = PrecacheOptions::default().with_on_compiled(|_, _| {});
        let debug = format!("{options:?}");
        assert!(debug.contains("concurrency: 4"));
        assert!(debug.contains("on_compiled: true"));
        assert!(!debug.contains("lister"));
    }
}
