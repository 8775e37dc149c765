//! Job lifecycle: start, cooperative interrupt, terminal reconciliation.
//!
//! Exactly one job runs at a time. The `running` flag is the single guard:
//! `run` checks and flips it under one lock acquisition, so a second request
//! while a job is in flight is dropped, not queued. Cancellation is advisory
//! only; the job observes it exclusively through the boolean returned by
//! [`Progress::tick`], and a generator that never ticks (or ignores the
//! flag) cannot be stopped.

use crate::error::StoreError;
use crate::model::{GenerationConfig, RunOptions, State, TreeValue};
use crate::store::{Shared, TreeStore};
use crate::tree::Token;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

/// The external generation collaborator.
///
/// Both operations receive a [`Progress`] handle and are expected (but not
/// required) to call [`Progress::tick`] with intermediate trees and to stop
/// early when a tick returns `true`.
pub trait Generator: Send + Sync {
    /// Build a new tree from scratch.
    fn build(
        &self,
        config: GenerationConfig,
        progress: Progress,
    ) -> impl Future<Output = anyhow::Result<Vec<Token>>> + Send;

    /// Expand the existing tree at the node with `node_id`.
    fn expand(
        &self,
        config: GenerationConfig,
        roots: Vec<Token>,
        node_id: String,
        progress: Progress,
    ) -> impl Future<Output = anyhow::Result<Vec<Token>>> + Send;
}

/// Progress handle passed into a generation call.
///
/// Doubles as the cancellation token: each tick reports the current
/// interrupt request back to the generator.
#[derive(Clone)]
pub struct Progress {
    shared: Arc<Shared>,
}

impl Progress {
    /// Publish an intermediate tree: replaces the observable value while
    /// preserving the `running`/`interrupting` flags, best-effort persists,
    /// and notifies listeners.
    ///
    /// Returns `true` when an interrupt has been requested, meaning "please
    /// stop if you can".
    pub fn tick(&self, roots: Vec<Token>) -> bool {
        let interrupting = {
            let mut state = self.shared.state();
            state.value = TreeValue::Tree {
                roots: roots.clone(),
            };
            state.interrupting
        };
        self.shared.storage.save(&roots);
        self.shared.notify();
        interrupting
    }
}

impl TreeStore {
    /// Start a generation job.
    ///
    /// Silently ignored when a job is already running (the caller is
    /// responsible for disabling re-entrant triggers). Fails with
    /// [`StoreError::NoTreeToExpand`] when `from_node_id` is set while the
    /// store is showing an error: that's a caller bug, and nothing is
    /// started or mutated.
    ///
    /// Must be called within a tokio runtime; the job runs as a spawned
    /// task and reconciles its terminal outcome back into the store.
    pub fn run<G>(&self, generator: G, opts: RunOptions) -> Result<(), StoreError>
    where
        G: Generator + 'static,
    {
        // Check preconditions and flip `running` under a single lock
        // acquisition so the roots snapshot for expand is race-free.
        let expand_roots = {
            let mut state = self.inner.state();
            if state.running {
                debug!("run requested while a job is in flight, ignoring");
                return Ok(());
            }
            let expand_roots = match (&opts.from_node_id, &state.value) {
                (None, _) => None,
                (Some(_), TreeValue::Tree { roots }) => Some(roots.clone()),
                (Some(node_id), TreeValue::Error { .. }) => {
                    return Err(StoreError::NoTreeToExpand {
                        node_id: node_id.clone(),
                    });
                }
            };
            state.running = true;
            expand_roots
        };
        self.inner.notify();

        let config = opts.generation_config();
        let from_node_id = opts.from_node_id;
        let progress = Progress {
            shared: self.inner.clone(),
        };
        let shared = self.inner.clone();
        tokio::spawn(async move {
            let outcome = match (from_node_id, expand_roots) {
                (Some(node_id), Some(roots)) => {
                    generator.expand(config, roots, node_id, progress).await
                }
                _ => generator.build(config, progress).await,
            };
            match outcome {
                Ok(roots) => finish_ok(&shared, roots),
                Err(e) => finish_err(&shared, e),
            }
        });
        Ok(())
    }

    /// Request cooperative cancellation of the in-flight job.
    ///
    /// No-op unless a job is running and not already interrupting. Only
    /// arms the flag; the generator observes it at its next progress tick
    /// and may or may not honor it.
    pub fn interrupt_run(&self) {
        {
            let mut state = self.inner.state();
            if !state.running || state.interrupting {
                return;
            }
            state.interrupting = true;
        }
        self.inner.notify();
    }
}

fn finish_ok(shared: &Shared, roots: Vec<Token>) {
    {
        let mut state = shared.state();
        *state = State {
            running: false,
            interrupting: false,
            value: TreeValue::Tree {
                roots: roots.clone(),
            },
        };
    }
    shared.storage.save(&roots);
    shared.notify();
}

fn finish_err(shared: &Shared, e: anyhow::Error) {
    error!(error = %format!("{e:#}"), "generation job failed");
    // Storage is left alone here: it keeps the last good tree even though
    // the observable state now shows the error.
    {
        let mut state = shared.state();
        *state = State {
            running: false,
            interrupting: false,
            value: TreeValue::Error { error: Arc::new(e) },
        };
    }
    shared.notify();
}
