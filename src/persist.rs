//! Best-effort persistence of the last known-good tree.
//!
//! One compact JSON array under a fixed file name. Saves and loads never
//! propagate failures: a full disk or a corrupt file costs the previous
//! snapshot, not the in-flight job, so everything here is logged and
//! swallowed.

use crate::tree::Token;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fixed file name the tree snapshot is persisted under.
const TREE_FILE_NAME: &str = "prev-tree.json";

/// Durable keyed store for the tree snapshot.
#[derive(Debug, Clone)]
pub struct TreeStorage {
    path: PathBuf,
}

impl TreeStorage {
    /// Storage at the platform data directory (`<data_dir>/loomtree/`).
    pub fn new() -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join("loomtree"))
            .unwrap_or_else(|| PathBuf::from(".loomtree"));
        Self::at(dir)
    }

    /// Storage under a caller-supplied directory. The file name is fixed.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(TREE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the roots. Failures are logged and swallowed; callers never
    /// observe them.
    pub fn save(&self, roots: &[Token]) {
        if let Err(e) = self.try_save(roots) {
            warn!(path = %self.path.display(), error = %format!("{e:#}"), "failed to persist tree");
        }
    }

    fn try_save(&self, roots: &[Token]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string(roots)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    /// Read back the persisted roots. A missing file, unreadable contents,
    /// or a value that isn't an array all yield an empty tree.
    pub fn load(&self) -> Vec<Token> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read persisted tree");
                return Vec::new();
            }
        };
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse persisted tree");
                return Vec::new();
            }
        };
        match value {
            Value::Array(items) => {
                let roots: Vec<Token> = items.into_iter().map(Token::from_value).collect();
                debug!(path = %self.path.display(), roots = roots.len(), "loaded persisted tree");
                roots
            }
            _ => {
                warn!(path = %self.path.display(), "persisted tree is not an array, ignoring");
                Vec::new()
            }
        }
    }
}

impl Default for TreeStorage {
    fn default() -> Self {
        Self::new()
    }
}
