//! Tree import, export, and reset.
//!
//! All three are guarded by the same "not while running" rule as every
//! other mutator. Export and reset degrade silently; import reports its
//! failures to the caller and leaves state untouched on any of them.

use crate::error::StoreError;
use crate::model::TreeValue;
use crate::store::TreeStore;
use crate::tree::Token;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::error;

/// Fixed file name used by [`TreeStore::export_to_file`].
pub const EXPORT_FILE_NAME: &str = "loomtree.json";

impl TreeStore {
    /// Write the current tree, pretty-printed, to [`EXPORT_FILE_NAME`]
    /// under `dir` and return the written path.
    ///
    /// Returns `None` without writing while a job is running, when the
    /// store is showing an error instead of a tree, or when the write
    /// itself fails; the last two are logged.
    pub fn export_to_file(&self, dir: &Path) -> Option<PathBuf> {
        let state = self.snapshot();
        if state.running {
            return None;
        }
        let Some(roots) = state.value.roots() else {
            error!("export failed: no valid tree data");
            return None;
        };
        let path = dir.join(EXPORT_FILE_NAME);
        let data = match serde_json::to_string_pretty(roots) {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "export failed: serializing tree");
                return None;
            }
        };
        if let Err(e) = fs::write(&path, data) {
            error!(path = %path.display(), error = %e, "export failed: writing file");
            return None;
        }
        Some(path)
    }

    /// Replace the tree with the contents of `path`.
    ///
    /// The file must parse as a JSON array; token shapes inside it are not
    /// validated (loosely-shaped tokens are accepted as-is). Fails
    /// immediately while a job is running, and on any failure the state is
    /// left unchanged.
    pub async fn import_from_file(&self, path: &Path) -> Result<(), StoreError> {
        if self.snapshot().running {
            return Err(StoreError::ImportWhileRunning);
        }
        let text = tokio::fs::read_to_string(path).await?;
        let value: Value = serde_json::from_str(&text)?;
        let Value::Array(items) = value else {
            return Err(StoreError::InvalidTreeFormat);
        };
        let roots: Vec<Token> = items.into_iter().map(Token::from_value).collect();
        {
            let mut state = self.inner.state();
            // A job may have started while the file was being read.
            if state.running {
                return Err(StoreError::ImportWhileRunning);
            }
            state.value = TreeValue::Tree {
                roots: roots.clone(),
            };
        }
        self.inner.storage.save(&roots);
        self.inner.notify();
        Ok(())
    }

    /// Replace the tree with an empty one and persist it, overwriting the
    /// stored snapshot. No-op while a job is running.
    pub fn reset_tree(&self) {
        {
            let mut state = self.inner.state();
            if state.running {
                return;
            }
            state.value = TreeValue::empty();
        }
        self.inner.storage.save(&[]);
        self.inner.notify();
    }
}
