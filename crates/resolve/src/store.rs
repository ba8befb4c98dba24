//! Vocabulary persistence.
//!
//! One entry per line, each wrapped in double quotes, UTF-8. Reading is
//! lenient (unquoted lines, blank lines and a leading BOM are accepted);
//! writing always produces the canonical quoted form.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, SystemTime};

use log::{info, warn};

use crate::error::CanonError;
use crate::model::{CanonicalEntry, Vocabulary};

const LOCK_ATTEMPTS: u32 = 20;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(50);
/// A lock untouched for this long belongs to a writer that died mid-merge.
const STALE_LOCK_AGE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct VocabularyStore {
    path: PathBuf,
}

impl VocabularyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vocabulary, CanonError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        Ok(self.parse(&contents))
    }

    /// Like `load`, but a missing file is an empty vocabulary.
    pub fn load_or_empty(&self) -> Result<Vocabulary, CanonError> {
        match self.load() {
            Err(e) if e.is_not_found() => {
                warn!("vocabulary {} not found, starting empty", self.path.display());
                Ok(Vocabulary::new())
            }
            other => other,
        }
    }

    /// Append entries not already stored and write the result back.
    ///
    /// The file is re-read under an exclusive lock so edits made since this
    /// run loaded it are kept. Existing entries are never removed or
    /// reordered. The new contents go to a sibling temp file which replaces
    /// the original only once fully written.
    pub fn merge_and_save<I, S>(&self, new_entries: I) -> Result<MergeReport, CanonError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _lock = LockGuard::acquire(&self.path)?;

        let existed = self.path.exists();
        let mut vocab = self.load_or_empty()?;

        let mut added = 0;
        for raw in new_entries {
            if let Some(entry) = CanonicalEntry::new(raw.as_ref()) {
                if vocab.push(entry) {
                    added += 1;
                }
            }
        }

        let report = MergeReport { added, total: vocab.len() };
        if added == 0 && existed {
            return Ok(report);
        }

        self.write_atomic(&vocab)?;
        info!(
            "vocabulary {}: added {added}, {} total",
            self.path.display(),
            report.total
        );
        Ok(report)
    }

    fn parse(&self, contents: &str) -> Vocabulary {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let mut vocab = Vocabulary::new();
        for (lineno, line) in contents.lines().enumerate() {
            let Some(entry) = CanonicalEntry::new(line) else {
                continue;
            };
            let text = entry.as_str().to_string();
            if !vocab.push(entry) {
                warn!(
                    "{}:{}: duplicate entry '{text}' ignored",
                    self.path.display(),
                    lineno + 1
                );
            }
        }
        vocab
    }

    fn write_atomic(&self, vocab: &Vocabulary) -> Result<(), CanonError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let tmp_path = sibling(&self.path, ".tmp");
        let written = write_entries(&tmp_path, vocab)
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.write_error(e));
        }
        Ok(())
    }

    fn read_error(&self, e: io::Error) -> CanonError {
        if e.kind() == io::ErrorKind::NotFound {
            CanonError::VocabularyNotFound { path: self.path.clone() }
        } else {
            CanonError::VocabularyRead { path: self.path.clone(), message: e.to_string() }
        }
    }

    fn write_error(&self, e: io::Error) -> CanonError {
        CanonError::VocabularyWrite { path: self.path.clone(), message: e.to_string() }
    }
}

/// Serialize entries in the persisted format.
pub fn format_entries(vocab: &Vocabulary) -> String {
    let mut out = String::new();
    for entry in vocab.iter() {
        out.push('"');
        out.push_str(entry.as_str());
        out.push_str("\"\n");
    }
    out
}

fn write_entries(path: &Path, vocab: &Vocabulary) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(format_entries(vocab).as_bytes())?;
    file.sync_all()
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Writer lock
// ---------------------------------------------------------------------------

/// Exclusive `<file>.lock` held for one read-merge-write. Removed on drop.
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(target: &Path) -> Result<Self, CanonError> {
        let path = sibling(target, ".lock");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CanonError::VocabularyWrite {
                path: target.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let mut attempt = 0;
        while attempt < LOCK_ATTEMPTS {
            attempt += 1;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // Owner info for whoever finds a leftover lock.
                    let _ = writeln!(file, "{} {}", process::id(), chrono::Utc::now().to_rfc3339());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        warn!("breaking stale lock {}", path.display());
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    if attempt < LOCK_ATTEMPTS {
                        thread::sleep(LOCK_RETRY_DELAY);
                    }
                }
                Err(e) => {
                    return Err(CanonError::VocabularyWrite {
                        path: target.to_path_buf(),
                        message: format!("cannot create lock {}: {e}", path.display()),
                    })
                }
            }
        }

        Err(CanonError::VocabularyLocked { path: target.to_path_buf() })
    }
}

fn is_stale(lock: &Path) -> bool {
    fs::metadata(lock)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= STALE_LOCK_AGE)
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(vocab: &Vocabulary) -> Vec<&str> {
        vocab.iter().map(|e| e.as_str()).collect()
    }

    #[test]
    fn load_strips_quotes_blanks_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(&path, "\u{feff}\"原味牛角包\"\n\n  \"港式蛋撻\"  \nplain\r\n").unwrap();

        let vocab = VocabularyStore::new(&path).load().unwrap();
        assert_eq!(texts(&vocab), vec!["原味牛角包", "港式蛋撻", "plain"]);
    }

    #[test]
    fn load_collapses_duplicate_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(&path, "\"A\"\n\"B\"\nA\n").unwrap();

        let vocab = VocabularyStore::new(&path).load().unwrap();
        assert_eq!(texts(&vocab), vec!["A", "B"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabularyStore::new(dir.path().join("absent.txt"));
        assert!(store.load().unwrap_err().is_not_found());
        assert!(store.load_or_empty().unwrap().is_empty());
    }

    #[test]
    fn unreadable_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let err = VocabularyStore::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, CanonError::VocabularyRead { .. }));
    }

    #[test]
    fn merge_appends_in_order_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(&path, "\"A\"\n").unwrap();

        let store = VocabularyStore::new(&path);
        let report = store.merge_and_save(["B", "A", "C"]).unwrap();
        assert_eq!(report, MergeReport { added: 2, total: 3 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"A\"\n\"B\"\n\"C\"\n");
    }

    #[test]
    fn merge_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        let store = VocabularyStore::new(&path);

        store.merge_and_save(["A", "B"]).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        let report = store.merge_and_save(["A", "B"]).unwrap();
        assert_eq!(report.added, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn merge_creates_missing_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/products.txt");
        let store = VocabularyStore::new(&path);

        store.merge_and_save(Vec::<String>::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        store.merge_and_save(["\"quoted\"", "  "]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"quoted\"\n");
    }

    #[test]
    fn merge_keeps_external_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        let store = VocabularyStore::new(&path);
        store.merge_and_save(["A"]).unwrap();

        // Someone edits the file after this run loaded it.
        fs::write(&path, "\"A\"\n\"Z\"\n").unwrap();
        store.merge_and_save(["B"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"A\"\n\"Z\"\n\"B\"\n");
    }

    #[test]
    fn merge_leaves_no_temp_or_lock_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        VocabularyStore::new(&path).merge_and_save(["A"]).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["products.txt".to_string()]);
    }

    #[test]
    fn held_lock_reports_locked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(&path, "\"A\"\n").unwrap();
        fs::write(dir.path().join("products.txt.lock"), "").unwrap();

        let err = VocabularyStore::new(&path).merge_and_save(["B"]).unwrap_err();
        assert!(matches!(err, CanonError::VocabularyLocked { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"A\"\n");
    }

    #[test]
    fn stale_lock_is_broken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(&path, "\"A\"\n").unwrap();
        let lock = dir.path().join("products.txt.lock");
        fs::write(&lock, "4242 2026-01-01T00:00:00+00:00\n").unwrap();
        File::options()
            .write(true)
            .open(&lock)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();

        let report = VocabularyStore::new(&path).merge_and_save(["B"]).unwrap();
        assert_eq!(report, MergeReport { added: 1, total: 2 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"A\"\n\"B\"\n");
        assert!(!lock.exists());
    }

    #[test]
    fn lock_records_owner() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("products.txt");
        let guard = LockGuard::acquire(&target).unwrap();

        let contents = fs::read_to_string(dir.path().join("products.txt.lock")).unwrap();
        assert!(contents.starts_with(&format!("{} ", process::id())));
        drop(guard);
        assert!(!dir.path().join("products.txt.lock").exists());
    }

    #[test]
    fn failed_write_keeps_previous_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.txt");
        fs::write(&path, "\"A\"\n").unwrap();
        // The temp file cannot be created where a directory sits.
        fs::create_dir(dir.path().join("products.txt.tmp")).unwrap();

        let err = VocabularyStore::new(&path).merge_and_save(["B"]).unwrap_err();
        assert!(matches!(err, CanonError::VocabularyWrite { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"A\"\n");
        assert!(!dir.path().join("products.txt.lock").exists());
    }

    #[test]
    fn sibling_appends_suffix() {
        assert_eq!(
            sibling(Path::new("/tmp/v/products.txt"), ".tmp"),
            PathBuf::from("/tmp/v/products.txt.tmp")
        );
    }
}
