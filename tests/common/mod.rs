//! Shared test harness: a scripted generator driven step-by-step over
//! channels, plus small state-polling helpers.

#![allow(dead_code)] // each integration test file uses a subset

use loomtree::{
    GenerationConfig, Generator, ModelKind, Progress, RunOptions, State, Token, TreeStore,
    TreeStorage,
};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, timeout};

/// One scripted action for the fake generator to perform.
pub enum Step {
    /// Call `progress.tick` with this tree; the returned interrupt flag is
    /// forwarded on the `flags` channel.
    Tick(Vec<Token>),
    /// Resolve the job successfully with this tree.
    Resolve(Vec<Token>),
    /// Fail the job with this message.
    Fail(String),
}

/// Record of which generator operation the controller invoked.
pub enum Call {
    Build,
    Expand { node_id: String, roots: Vec<Token> },
}

/// Fake collaborator that performs whatever `Step`s the test feeds it.
pub struct Scripted {
    steps: Mutex<mpsc::UnboundedReceiver<Step>>,
    flags: mpsc::UnboundedSender<bool>,
    calls: mpsc::UnboundedSender<Call>,
}

/// Test-side handle for driving and observing a `Scripted` generator.
pub struct Script {
    pub steps: mpsc::UnboundedSender<Step>,
    pub flags: mpsc::UnboundedReceiver<bool>,
    pub calls: mpsc::UnboundedReceiver<Call>,
}

pub fn scripted() -> (Scripted, Script) {
    let (step_tx, step_rx) = mpsc::unbounded_channel();
    let (flag_tx, flag_rx) = mpsc::unbounded_channel();
    let (call_tx, call_rx) = mpsc::unbounded_channel();
    (
        Scripted {
            steps: Mutex::new(step_rx),
            flags: flag_tx,
            calls: call_tx,
        },
        Script {
            steps: step_tx,
            flags: flag_rx,
            calls: call_rx,
        },
    )
}

impl Scripted {
    async fn drive(&self, progress: Progress) -> anyhow::Result<Vec<Token>> {
        let mut steps = self.steps.lock().await;
        while let Some(step) = steps.recv().await {
            match step {
                Step::Tick(roots) => {
                    let _ = self.flags.send(progress.tick(roots));
                }
                Step::Resolve(roots) => return Ok(roots),
                Step::Fail(msg) => anyhow::bail!(msg),
            }
        }
        anyhow::bail!("script channel closed before a terminal step")
    }
}

impl Generator for Scripted {
    async fn build(
        &self,
        _config: GenerationConfig,
        progress: Progress,
    ) -> anyhow::Result<Vec<Token>> {
        let _ = self.calls.send(Call::Build);
        self.drive(progress).await
    }

    async fn expand(
        &self,
        _config: GenerationConfig,
        roots: Vec<Token>,
        node_id: String,
        progress: Progress,
    ) -> anyhow::Result<Vec<Token>> {
        let _ = self.calls.send(Call::Expand { node_id, roots });
        self.drive(progress).await
    }
}

/// Route store logs through the test writer, once per process.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A store backed by a fresh temp directory.
pub fn store() -> (TreeStore, tempfile::TempDir) {
    init_tracing();
    let temp = tempfile::tempdir().expect("tempdir");
    let store = TreeStore::with_storage(TreeStorage::at(temp.path()));
    (store, temp)
}

pub fn opts(from_node_id: Option<&str>) -> RunOptions {
    RunOptions {
        base_url: "http://localhost:8080/v1".into(),
        api_key: "test-key".into(),
        model_name: "test-model".into(),
        model_kind: ModelKind::Chat,
        prompt: Some("Hello".into()),
        prefill: None,
        depth: 3,
        max_width: 2,
        cover_prob: 0.8,
        from_node_id: from_node_id.map(str::to_owned),
    }
}

/// A one-root forest tagged for easy equality checks.
pub fn forest(tag: &str) -> Vec<Token> {
    vec![Token::new(tag, format!("text-{tag}"))]
}

/// Poll the store until `pred` holds, or panic after five seconds.
pub async fn wait_for(
    store: &TreeStore,
    desc: &str,
    pred: impl Fn(&State) -> bool,
) -> State {
    timeout(Duration::from_secs(5), async {
        loop {
            let state = store.snapshot();
            if pred(&state) {
                return state;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {desc}"))
}
