use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Settings, Task};

/// The single record written to the store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub tasks: Vec<Task>,
    pub settings: Settings,
    pub pomodoro_count: u32,
}

impl PersistedState {
    /// Parses a state document, as stored or as exported.
    ///
    /// Duplicate ids and blank titles are rejected.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        let mut state: PersistedState = serde_json::from_str(s)?;
        state.validate()?;
        state.normalize();
        Ok(state)
    }

    fn validate(&self) -> serde_json::Result<()> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !seen.insert(&task.id) {
                return Err(serde_json::Error::custom(format!("duplicate task id '{}'", task.id)));
            }
            if task.title.trim().is_empty() {
                return Err(serde_json::Error::custom(format!("task '{}' has a blank title", task.id)));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(AppError::Serialize)
    }

    /// Restores the completion invariant on every task.
    fn normalize(&mut self) {
        let repaired = self.tasks.iter_mut().map(|t| t.normalize()).filter(|r| *r).count();
        if repaired > 0 {
            tracing::debug!(repaired, "normalized completion timestamps");
        }
    }
}

/// Where the repository keeps its state between runs.
pub trait Store {
    /// Reads the stored state.
    ///
    /// Returns `None` if nothing is stored yet or the stored data cannot be
    /// parsed; callers then start from defaults.
    fn load(&self) -> Option<PersistedState>;

    /// Replaces the stored state with `state`.
    fn persist(&mut self, state: &PersistedState) -> Result<()>;
}

/// Stores the state as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a malformed data file is moved aside: `<file>.bak`.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn read(&self) -> std::io::Result<String> {
        let mut f = OpenOptions::new().read(true).open(&self.path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(s)
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Option<PersistedState> {
        if !self.path.exists() {
            return None;
        }
        let s = match self.read() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read data file");
                return None;
            }
        };
        match PersistedState::from_json(&s) {
            Ok(state) => Some(state),
            Err(e) => {
                let backup = self.backup_path();
                match fs::rename(&self.path, &backup) {
                    Ok(()) => tracing::warn!(
                        path = %self.path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "data file is malformed, moved aside and starting empty"
                    ),
                    Err(re) => tracing::error!(
                        path = %self.path.display(),
                        error = %e,
                        rename_error = %re,
                        "data file is malformed and could not be moved aside"
                    ),
                }
                None
            }
        }
    }

    fn persist(&mut self, state: &PersistedState) -> Result<()> {
        let s = state.to_json()?;
        let io_err = |source| AppError::Persistence { path: self.path.clone(), source };
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(io_err)?;
            }
        }
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(io_err)?;
        f.write_all(s.as_bytes()).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), tasks = state.tasks.len(), "state written");
        Ok(())
    }
}

/// In-process store.
///
/// Clones share the same contents, so a test can inspect what a repository
/// wrote. Writes can be made to fail with [`MemoryStore::fail_writes`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Rc<RefCell<Option<String>>>,
    writes: Rc<Cell<usize>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `raw`, parsed on the next load.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        let store = Self::default();
        *store.contents.borrow_mut() = Some(raw.into());
        store
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.failing.set(fail);
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Option<PersistedState> {
        let raw = self.contents.borrow();
        let raw = raw.as_deref()?;
        match PersistedState::from_json(raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "stored state is malformed, starting empty");
                None
            }
        }
    }

    fn persist(&mut self, state: &PersistedState) -> Result<()> {
        if self.failing.get() {
            return Err(AppError::Persistence {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "write refused"),
            });
        }
        *self.contents.borrow_mut() = Some(state.to_json()?);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
