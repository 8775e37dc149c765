//! Observable state store for branching token-tree generation.
//!
//! `loomtree` sequences one cancellable, long-running generation job at a
//! time and exposes its evolving result to a rendering layer. The
//! generation algorithm itself is an external collaborator implementing
//! [`Generator`]; this crate owns the lifecycle around it:
//!
//! - a snapshot store ([`TreeStore`]) with subscribe/notify and a
//!   synchronous read, mutated only by whole-value replacement;
//! - a job controller (`run` / `interrupt_run`) guaranteeing a single job
//!   at a time with cooperative, progress-polled cancellation;
//! - best-effort persistence ([`TreeStorage`]) of the last known-good tree,
//!   whose failures never reach callers;
//! - import/export of the tree as a JSON file.
//!
//! ```no_run
//! use loomtree::{ModelKind, RunOptions, TreeStore};
//!
//! # async fn demo(generator: impl loomtree::Generator + 'static) {
//! let store = TreeStore::new();
//! store.load_persisted();
//!
//! let _sub = store.subscribe(|| { /* re-render from store.snapshot() */ });
//!
//! store
//!     .run(generator, RunOptions {
//!         base_url: "https://api.example.com/v1".into(),
//!         api_key: "secret".into(),
//!         model_name: "some-model".into(),
//!         model_kind: ModelKind::Chat,
//!         prompt: Some("Once upon a time".into()),
//!         prefill: None,
//!         depth: 4,
//!         max_width: 3,
//!         cover_prob: 0.8,
//!         from_node_id: None,
//!     })
//!     .expect("not expanding, can't fault");
//! # }
//! ```

mod controller;
mod error;
mod model;
mod persist;
mod store;
mod transfer;
mod tree;

pub use controller::{Generator, Progress};
pub use error::StoreError;
pub use model::{GenerationConfig, ModelKind, RunOptions, State, TreeValue};
pub use persist::TreeStorage;
pub use store::{Subscription, TreeStore};
pub use transfer::EXPORT_FILE_NAME;
pub use tree::{path_to_node, Token};
