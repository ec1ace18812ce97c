//! IV history store — per-index rolling window of ATM IV readings.
//!
//! The store is a plain owned value. The engine takes it in, appends to it,
//! and hands it back, so its lifetime is whatever the caller chooses: one
//! process, a `watch` loop, or a JSON file between scheduler runs.

use crate::domain::IndexSymbol;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Maximum number of readings kept per index.
pub const WINDOW_CAPACITY: usize = 30;

/// Rolling ATM-IV windows, oldest first, at most [`WINDOW_CAPACITY`] each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IvHistory {
    windows: BTreeMap<IndexSymbol, VecDeque<f64>>,
}

impl IvHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading, evicting the oldest one if the window is full.
    ///
    /// Returns the window after insertion.
    pub fn append(&mut self, symbol: IndexSymbol, value: f64) -> &[f64] {
        let window = self.windows.entry(symbol).or_default();
        if window.len() >= WINDOW_CAPACITY {
            window.pop_front();
        }
        window.push_back(value);
        window.make_contiguous()
    }

    /// Current window for an index, oldest first.
    pub fn window(&self, symbol: IndexSymbol) -> Vec<f64> {
        self.windows
            .get(&symbol)
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, symbol: IndexSymbol) -> usize {
        self.windows.get(&symbol).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.windows.values().all(VecDeque::is_empty)
    }

    /// Build from raw windows, keeping only the newest readings per index.
    fn from_windows(raw: impl IntoIterator<Item = (IndexSymbol, Vec<f64>)>) -> Self {
        let mut history = Self::new();
        for (symbol, values) in raw {
            let skip = values.len().saturating_sub(WINDOW_CAPACITY);
            for value in values.into_iter().skip(skip) {
                history.append(symbol, value);
            }
        }
        history
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("history file {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk shape. Keyed by index name so unknown names can be skipped.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryDocument {
    windows: BTreeMap<String, Vec<f64>>,
}

/// JSON file that carries an [`IvHistory`] across process restarts.
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored history. A missing file is an empty history.
    pub fn load(&self) -> Result<IvHistory, HistoryError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IvHistory::new()),
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let doc: HistoryDocument = serde_json::from_str(&text).map_err(|source| HistoryError::Format {
            path: self.path.clone(),
            source,
        })?;

        let raw = doc.windows.into_iter().filter_map(|(name, values)| match name.parse() {
            Ok(symbol) => Some((symbol, values)),
            Err(e) => {
                warn!(path = %self.path.display(), "skipping stored window: {e}");
                None
            }
        });

        Ok(IvHistory::from_windows(raw))
    }

    /// Where an unreadable history file is moved aside to.
    pub fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Load the stored history, starting empty if it cannot be read.
    ///
    /// A file that is not valid JSON is renamed to [`Self::quarantine_path`]
    /// first, so the next save does not destroy it.
    pub fn load_or_quarantine(&self) -> IvHistory {
        match self.load() {
            Ok(history) => history,
            Err(e @ HistoryError::Format { .. }) => {
                let aside = self.quarantine_path();
                match fs::rename(&self.path, &aside) {
                    Ok(()) => warn!(error = %e, moved_to = %aside.display(), "starting with an empty IV window"),
                    Err(rename_err) => warn!(error = %e, %rename_err, "starting with an empty IV window; corrupt file left in place"),
                }
                IvHistory::new()
            }
            Err(e) => {
                warn!(error = %e, "starting with an empty IV window");
                IvHistory::new()
            }
        }
    }

    /// Write the history, replacing the previous file.
    pub fn save(&self, history: &IvHistory) -> Result<(), HistoryError> {
        let doc = HistoryDocument {
            windows: history
                .windows
                .iter()
                .map(|(symbol, values)| (symbol.name().to_string(), values.iter().copied().collect()))
                .collect(),
        };

        let io_err = |source: io::Error| HistoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&doc).map_err(|source| HistoryError::Format {
            path: self.path.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_returns_window_after_insert() {
        let mut h = IvHistory::new();
        assert_eq!(h.append(IndexSymbol::Nifty, 12.0), &[12.0]);
        assert_eq!(h.append(IndexSymbol::Nifty, 13.5), &[12.0, 13.5]);
        assert_eq!(h.len(IndexSymbol::BankNifty), 0);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut h = IvHistory::new();
        for i in 0..WINDOW_CAPACITY {
            h.append(IndexSymbol::Nifty, i as f64);
        }
        let window = h.append(IndexSymbol::Nifty, 100.0).to_vec();

        assert_eq!(window.len(), WINDOW_CAPACITY);
        assert_eq!(window[0], 1.0);
        assert_eq!(window[WINDOW_CAPACITY - 1], 100.0);
        assert!(!window.contains(&0.0));
    }

    #[test]
    fn windows_are_independent_per_symbol() {
        let mut h = IvHistory::new();
        h.append(IndexSymbol::Nifty, 11.0);
        h.append(IndexSymbol::BankNifty, 15.0);
        h.append(IndexSymbol::BankNifty, 16.0);
        assert_eq!(h.window(IndexSymbol::Nifty), vec![11.0]);
        assert_eq!(h.window(IndexSymbol::BankNifty), vec![15.0, 16.0]);
    }

    #[test]
    fn save_then_load_restores_windows() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("nested/history.json"));

        let mut h = IvHistory::new();
        h.append(IndexSymbol::Nifty, 12.25);
        h.append(IndexSymbol::BankNifty, 14.5);
        file.save(&h).unwrap();

        assert_eq!(file.load().unwrap(), h);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("absent.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn load_truncates_oversized_windows_and_skips_unknown_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let values: Vec<f64> = (0..40).map(f64::from).collect();
        let doc = serde_json::json!({ "windows": { "NIFTY": values, "SENSEX": [1.0] } });
        fs::write(&path, doc.to_string()).unwrap();

        let h = HistoryFile::new(&path).load().unwrap();
        let window = h.window(IndexSymbol::Nifty);
        assert_eq!(window.len(), WINDOW_CAPACITY);
        assert_eq!(window[0], 10.0);
        assert_eq!(window[WINDOW_CAPACITY - 1], 39.0);
        assert_eq!(h.len(IndexSymbol::BankNifty), 0);
    }

    #[test]
    fn corrupt_file_is_moved_aside_before_starting_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{\"windows\": {\"NIFTY\": [12.0,").unwrap();
        let file = HistoryFile::new(&path);

        let history = file.load_or_quarantine();
        assert!(history.is_empty());
        assert!(!path.exists());
        assert_eq!(file.quarantine_path(), dir.path().join("history.json.corrupt"));
        assert_eq!(
            fs::read_to_string(file.quarantine_path()).unwrap(),
            "{\"windows\": {\"NIFTY\": [12.0,"
        );

        // A later save leaves the quarantined copy alone.
        file.save(&history).unwrap();
        assert!(file.quarantine_path().exists());
    }

    #[test]
    fn readable_file_is_not_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("history.json"));
        let mut h = IvHistory::new();
        h.append(IndexSymbol::Nifty, 12.5);
        file.save(&h).unwrap();

        assert_eq!(file.load_or_quarantine(), h);
        assert!(!file.quarantine_path().exists());
    }

    #[test]
    fn corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(HistoryFile::new(&path).load(), Err(HistoryError::Format { .. })));
    }
}
