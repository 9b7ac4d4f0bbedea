//! The read-once source cache.
//!
//! File contents are read from disk at most once per process and retained for
//! the process lifetime. The cache also answers by-line queries, which the
//! diagnostic renderer uses to extract context windows around a failure.
//!
//! The cache serializes concurrent writers: a reader observes any prior
//! write, and critical sections cover only a single map operation. Contents
//! are immutable once inserted; `add` is idempotent and removals do not
//! exist.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

/// One cached file: its contents plus the byte offsets of line starts.
#[derive(Debug)]
struct CachedFile {
    contents: Arc<str>,
    /// Byte offsets of line starts (0-indexed, first entry is always 0)
    line_starts: Vec<usize>,
}

impl CachedFile {
    fn new(contents: Arc<str>) -> Self {
        let mut line_starts = vec![0];

        for (i, byte) in contents.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }

        Self { contents, line_starts }
    }

    /// Returns the contents of the 1-based `line`, without its terminator.
    fn line(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }

        let idx = line as usize - 1;
        let start = *self.line_starts.get(idx)?;

        let end = match self.line_starts.get(idx + 1) {
            Some(&next_start) => next_start - 1,
            None => self.contents.len(),
        };

        // A file ending in a newline has a phantom final entry; reject it.
        if start > self.contents.len() || start > end {
            return None;
        }

        let text = &self.contents[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }
}

/// A process-wide mapping from file path to contents.
///
/// The driver creates one cache and threads it through every stage; the
/// lexer populates it when tokenizing a file, the preprocessor reads
/// imported files through it, and the diagnostic renderer resolves context
/// lines from it.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: RwLock<FxHashMap<PathBuf, CachedFile>>,
}

impl SourceCache {
    /// Creates a new empty cache.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Inserts `contents` under `path`.
    ///
    /// Idempotent: if the path is already cached the existing contents are
    /// kept and this call is a no-op.
    pub fn add(&self, path: impl AsRef<Path>, contents: impl Into<Arc<str>>) {
        let mut files = self.files.write().expect("source cache lock poisoned");

        files
            .entry(path.as_ref().to_path_buf())
            .or_insert_with(|| CachedFile::new(contents.into()));
    }

    /// Returns the contents of `path`, reading from the filesystem on a miss.
    ///
    /// Returns `None` if the path was never added and the underlying read
    /// fails. Once read, the text is retained for the process lifetime.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Arc<str>> {
        let path = path.as_ref();

        {
            let files = self.files.read().expect("source cache lock poisoned");
            if let Some(file) = files.get(path) {
                return Some(Arc::clone(&file.contents));
            }
        }

        let text: Arc<str> = Arc::from(std::fs::read_to_string(path).ok()?);

        let mut files = self.files.write().expect("source cache lock poisoned");
        let entry = files
            .entry(path.to_path_buf())
            .or_insert_with(|| CachedFile::new(Arc::clone(&text)));

        Some(Arc::clone(&entry.contents))
    }

    /// Returns the contents of the 1-based `line` of `path`.
    ///
    /// Returns `None` if the path is not cached (and cannot be read) or the
    /// line is out of range.
    pub fn get_line(&self, path: impl AsRef<Path>, line: u32) -> Option<String> {
        let path = path.as_ref();

        {
            let files = self.files.read().expect("source cache lock poisoned");
            if let Some(file) = files.get(path) {
                return file.line(line).map(str::to_owned);
            }
        }

        // Populate on miss, then retry once.
        let _ = self.read(path)?;

        let files = self.files.read().expect("source cache lock poisoned");
        files.get(path).and_then(|file| file.line(line)).map(str::to_owned)
    }

    /// Returns true if `path` is already cached.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let files = self.files.read().expect("source cache lock poisoned");
        files.contains_key(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let cache = SourceCache::new();
        cache.add("mem.hlx", "first");
        cache.add("mem.hlx", "second");

        assert_eq!(cache.read("mem.hlx").as_deref(), Some("first"));
    }

    #[test]
    fn get_line_is_one_based() {
        let cache = SourceCache::new();
        cache.add("mem.hlx", "alpha\nbeta\ngamma");

        assert_eq!(cache.get_line("mem.hlx", 1).as_deref(), Some("alpha"));
        assert_eq!(cache.get_line("mem.hlx", 2).as_deref(), Some("beta"));
        assert_eq!(cache.get_line("mem.hlx", 3).as_deref(), Some("gamma"));
        assert_eq!(cache.get_line("mem.hlx", 0), None);
        assert_eq!(cache.get_line("mem.hlx", 4), None);
    }

    #[test]
    fn get_line_handles_trailing_newline() {
        let cache = SourceCache::new();
        cache.add("mem.hlx", "only\n");

        assert_eq!(cache.get_line("mem.hlx", 1).as_deref(), Some("only"));
        assert_eq!(cache.get_line("mem.hlx", 2).as_deref(), Some(""));
        assert_eq!(cache.get_line("mem.hlx", 3), None);
    }

    #[test]
    fn get_line_strips_carriage_return() {
        let cache = SourceCache::new();
        cache.add("mem.hlx", "left\r\nright");

        assert_eq!(cache.get_line("mem.hlx", 1).as_deref(), Some("left"));
        assert_eq!(cache.get_line("mem.hlx", 2).as_deref(), Some("right"));
    }

    #[test]
    fn read_missing_path_is_none() {
        let cache = SourceCache::new();
        assert!(cache.read("/nonexistent/not-here.hlx").is_none());
        assert!(cache.get_line("/nonexistent/not-here.hlx", 1).is_none());
    }
}
