use crate::tree::Token;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The single observable value held by the store.
///
/// Mutated only by whole-value replacement; every transition produces a new
/// `State` and notifies listeners afterwards.
#[derive(Debug, Clone)]
pub struct State {
    /// True while a generation job is in flight.
    pub running: bool,
    /// True once cancellation has been requested for the in-flight job.
    /// Meaningless while `running` is false.
    pub interrupting: bool,
    pub value: TreeValue,
}

impl State {
    /// The value the store starts with: idle, empty tree.
    pub fn initial() -> Self {
        Self {
            running: false,
            interrupting: false,
            value: TreeValue::Tree { roots: Vec::new() },
        }
    }
}

/// The last known-good tree, or the most recent job's terminal failure.
#[derive(Debug, Clone)]
pub enum TreeValue {
    Tree { roots: Vec<Token> },
    Error { error: Arc<anyhow::Error> },
}

impl TreeValue {
    pub fn empty() -> Self {
        TreeValue::Tree { roots: Vec::new() }
    }

    /// The tree roots, or `None` when the store is showing an error.
    pub fn roots(&self) -> Option<&[Token]> {
        match self {
            TreeValue::Tree { roots } => Some(roots),
            TreeValue::Error { .. } => None,
        }
    }
}

/// How the remote model is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Chat-style completion endpoint.
    Chat,
    /// Completion-style (base model) endpoint.
    Base,
}

/// Everything one `run` call needs: connection parameters for the remote
/// model, the prompt/prefill, exploration parameters, and optionally an
/// existing node to expand from instead of starting fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub model_kind: ModelKind,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub prefill: Option<String>,
    /// Exploration depth, >= 0.
    pub depth: u32,
    /// Maximum branching width, >= 1.
    pub max_width: u32,
    /// Probability-mass threshold in [0, 1] used by the generator to decide
    /// branch coverage.
    pub cover_prob: f64,
    /// Expand the existing tree at this node rather than building fresh.
    #[serde(default)]
    pub from_node_id: Option<String>,
}

/// The bundle handed to the generator: `RunOptions` minus `from_node_id`,
/// which the controller consumes to pick build vs expand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model_name: String,
    pub model_kind: ModelKind,
    pub prompt: Option<String>,
    pub prefill: Option<String>,
    pub depth: u32,
    pub max_width: u32,
    pub cover_prob: f64,
}

impl RunOptions {
    /// Split off the generator-facing config.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            model_kind: self.model_kind,
            prompt: self.prompt.clone(),
            prefill: self.prefill.clone(),
            depth: self.depth,
            max_width: self.max_width,
            cover_prob: self.cover_prob,
        }
    }
}
