//! Running a pipeline: gate, minify, compress, record, clean up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::Pipeline;
use crate::asset::{AssetRoute, Minified, Minifier, write_gzip};
use crate::freshness::{self, Freshness};
use crate::{debug, log};

/// What happened to one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Timestamp record matched; nothing was written
    Skipped,
    /// Artifact and record were rewritten
    Compressed { input: PathBuf, output: PathBuf },
}

impl Pipeline {
    /// Process every asset in order, stopping at the first failure.
    pub fn run(&self, force: bool) -> Result<Vec<Outcome>> {
        self.routes
            .iter()
            .map(|route| self.process(route, force))
            .collect()
    }

    /// Process one asset.
    ///
    /// With `force`, the cache gate is bypassed.
    pub fn process(&self, route: &AssetRoute, force: bool) -> Result<Outcome> {
        if !force && freshness::is_up_to_date(&route.source, &route.record) {
            log!(&self.name; "{}.gz is up to date", route.name);
            return Ok(Outcome::Skipped);
        }
        debug!(
            &self.name;
            "{}: {}",
            route.name,
            freshness::check(&route.source, &route.record)
        );

        // Recorded once the artifact exists; an edit made while minifying
        // leaves the record behind the source and forces another pass.
        let mtime = freshness::get_mtime(&route.source)
            .ok_or_else(|| anyhow!("Source '{}' does not exist", self.show(&route.source)))?;

        let minified = self.minifier.apply(route, &self.root)?;
        let outcome = self.compress_and_record(route, &minified, mtime);
        // The intermediate goes away whether or not compression worked.
        let cleaned = minified.cleanup();

        let outcome = outcome?;
        cleaned?;
        Ok(outcome)
    }

    fn compress_and_record(
        &self,
        route: &AssetRoute,
        minified: &Minified,
        mtime: f64,
    ) -> Result<Outcome> {
        log!(
            &self.name;
            "gzip '{}' to '{}'",
            self.show(&minified.input),
            self.show(&route.output)
        );
        write_gzip(&minified.bytes, &route.output, self.level)?;
        freshness::write_record(&route.record, mtime)?;

        Ok(Outcome::Compressed {
            input: minified.input.clone(),
            output: route.output.clone(),
        })
    }

    /// Report the freshness of every asset without writing anything.
    pub fn status(&self) -> Vec<(&AssetRoute, Freshness)> {
        self.routes
            .iter()
            .map(|route| (route, freshness::check(&route.source, &route.record)))
            .collect()
    }

    /// Remove artifacts, records and leftover intermediates.
    ///
    /// Returns the number of files removed. Sources are never touched, and
    /// intermediates only exist for external minifiers: without one, a file
    /// at that path belongs to someone else.
    pub fn clean(&self) -> Result<usize> {
        let external = matches!(self.minifier, Minifier::External { .. });
        let mut removed = 0;
        for route in &self.routes {
            let intermediate = external.then_some(&route.intermediate);
            for path in [Some(&route.output), Some(&route.record), intermediate]
                .into_iter()
                .flatten()
            {
                if path == &route.source {
                    continue;
                }
                if remove_if_exists(path)? {
                    debug!(&self.name; "removed '{}'", self.show(path));
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove '{}'", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::section::default_pipelines;
    use crate::freshness::mtime::format_mtime;
    use flate2::read::GzDecoder;
    use std::fs::File;
    use std::io::Read;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    /// Stock pipeline by index (0 css, 1 embed, 2 db) rooted in `root`.
    fn stock(root: &Path, idx: usize) -> Pipeline {
        Pipeline::from_config(&default_pipelines()[idx], root, 9)
    }

    fn write_source(root: &Path, rel: &str, content: &[u8], mtime_secs: u64) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        set_mtime(&path, mtime_secs);
        path
    }

    fn set_mtime(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    fn gunzip(path: &Path) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    /// Stand-in for cleancss that strips spaces from `{input}` into `{output}`.
    #[cfg(unix)]
    fn fake_cleancss() -> Minifier {
        Minifier::External {
            program: "sh".into(),
            args: ["-c", "tr -d ' ' < \"$0\" > \"$1\"", "{input}", "{output}"]
                .map(String::from)
                .to_vec(),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_css_without_record() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "embed/toastify.css", b".toastify { padding: 12px; }", 1_700_000_000);

        let mut css = stock(root, 0);
        css.minifier = fake_cleancss();
        let route = &css.routes[0];

        let outcome = css.process(route, false).unwrap();
        assert_eq!(
            outcome,
            Outcome::Compressed {
                input: root.join(".pio/embed/toastify.css"),
                output: root.join(".pio/embed/toastify.css.gz"),
            }
        );
        assert_eq!(gunzip(&route.output), b".toastify{padding:12px;}");
        assert!(!route.intermediate.exists());
        assert_eq!(
            fs::read_to_string(root.join(".pio/embed/toastify.css.timestamp")).unwrap(),
            "1700000000.0"
        );
    }

    #[test]
    fn test_unchanged_db_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "assets/material_database.json", b"{\"PLA\":210}", 1_700_000_000);
        let db = stock(root, 2);
        let route = &db.routes[0];

        assert!(matches!(db.process(route, false).unwrap(), Outcome::Compressed { .. }));
        let artifact = fs::read(&route.output).unwrap();
        let record = fs::read(&route.record).unwrap();
        // Backdate the artifact: an untouched file keeps this mtime.
        set_mtime(&route.output, 1_600_000_000);

        assert_eq!(db.process(route, false).unwrap(), Outcome::Skipped);
        assert_eq!(fs::read(&route.output).unwrap(), artifact);
        assert_eq!(fs::read(&route.record).unwrap(), record);
        assert_eq!(freshness::get_mtime(&route.output), Some(1_600_000_000.0));
    }

    #[test]
    fn test_changed_source_is_reprocessed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let source = write_source(root, "assets/material_database.json", b"[1]", 1_700_000_000);
        let db = stock(root, 2);
        let route = &db.routes[0];
        db.run(false).unwrap();

        fs::write(&source, b"[1,2]").unwrap();
        set_mtime(&source, 1_700_000_100);

        assert!(matches!(db.process(route, false).unwrap(), Outcome::Compressed { .. }));
        assert_eq!(gunzip(&route.output), b"[1,2]");
        assert_eq!(
            fs::read_to_string(&route.record).unwrap(),
            format_mtime(1_700_000_100.0)
        );
    }

    #[test]
    fn test_legacy_record_is_honoured() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "embed/favicon.ico", b"\x00\x00\x01\x00", 1_700_000_000);
        let embed = stock(root, 1);
        let route = embed.routes.iter().find(|r| r.name == "favicon.ico").unwrap();

        fs::create_dir_all(route.record.parent().unwrap()).unwrap();
        fs::write(&route.record, "1700000000.0").unwrap();

        assert_eq!(embed.process(route, false).unwrap(), Outcome::Skipped);
        assert!(!route.output.exists());
    }

    #[test]
    fn test_force_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "embed/toastify.min.js", b"var a=1;", 1_700_000_000);
        let embed = stock(root, 1);
        let route = embed.routes.iter().find(|r| r.name == "toastify.min.js").unwrap();

        embed.process(route, false).unwrap();
        let first = (fs::read(&route.output).unwrap(), fs::read(&route.record).unwrap());

        assert!(matches!(embed.process(route, true).unwrap(), Outcome::Compressed { .. }));
        let second = (fs::read(&route.output).unwrap(), fs::read(&route.record).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_builtin_minifier() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(
            root,
            "assets/material_database.json",
            b"{\n  \"PLA\": 210,\n  \"PETG\": 240\n}\n",
            1_700_000_000,
        );
        let mut db = stock(root, 2);
        db.minifier = Minifier::Builtin;

        db.run(false).unwrap();
        assert_eq!(gunzip(&db.routes[0].output), br#"{"PLA":210,"PETG":240}"#);
    }

    #[test]
    #[cfg(unix)]
    fn test_minifier_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "embed/toastify.css", b".a{}", 1_700_000_000);
        let mut css = stock(root, 0);
        css.minifier = Minifier::External {
            program: "sh".into(),
            args: [
                "-c",
                "printf '.a{' > \"$0\"; echo 'unexpected token' >&2; exit 2",
                "{output}",
            ]
            .map(String::from)
            .to_vec(),
        };
        let route = &css.routes[0];

        let err = css.process(route, false).unwrap_err();
        assert!(format!("{err:#}").contains("unexpected token"));
        assert!(!route.output.exists());
        assert!(!route.record.exists());
        assert!(!route.intermediate.exists());
    }

    #[test]
    fn test_missing_source_stops_run() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        // Second asset exists, first does not.
        write_source(root, "embed/logo_thingy.svg", b"<svg/>", 1_700_000_000);
        let embed = stock(root, 1);

        let err = embed.run(false).unwrap_err();
        assert!(err.to_string().contains("embed/logo_captive.svg"));
        assert!(!embed.routes[0].record.exists());
        assert!(!embed.routes[1].output.exists());
    }

    #[test]
    fn test_status_and_clean() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "assets/material_database.json", b"{}", 1_700_000_000);
        let db = stock(root, 2);

        assert_eq!(db.status()[0].1, Freshness::NoRecord);
        db.run(false).unwrap();
        assert_eq!(db.status()[0].1, Freshness::UpToDate);

        assert_eq!(db.clean().unwrap(), 2);
        assert!(!db.routes[0].output.exists());
        assert!(!db.routes[0].record.exists());
        assert!(db.routes[0].source.exists());
        assert_eq!(db.clean().unwrap(), 0);
    }

    #[test]
    fn test_clean_keeps_unrelated_output_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_source(root, "assets/material_database.json", b"{}", 1_700_000_000);
        // Same name as the db intermediate path, but the db pipeline never minifies.
        let user_file = write_source(root, "data/material_database.json", b"[]", 1_700_000_000);
        let db = stock(root, 2);

        db.run(false).unwrap();
        assert_eq!(db.clean().unwrap(), 2);
        assert_eq!(fs::read(&user_file).unwrap(), b"[]");
    }

    #[test]
    #[cfg(unix)]
    fn test_clean_removes_leftover_intermediate() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let mut css = stock(root, 0);
        css.minifier = fake_cleancss();
        let leftover = write_source(root, ".pio/embed/toastify.css", b".a{}", 1_700_000_000);

        assert_eq!(css.clean().unwrap(), 1);
        assert!(!leftover.exists());
    }
}
