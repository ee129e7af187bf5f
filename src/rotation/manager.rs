//! Three-generation context pool driven by a one-second clock
//!
//! Generations move `staged -> active -> retiring -> closed`, keyed on the
//! wall-clock second: fresh contexts are staged at second 50, promoted at
//! second 0, and the displaced generation is closed at second 15 so in-flight
//! readers get a grace period before their token is invalidated.

use crate::index::{ContextToken, IndexProvider, IndexResult};
use crate::rotation::config::RotationConfig;
use crate::rotation::TokenSource;
use chrono::{Timelike, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const STAGE_ATTEMPTS: u32 = 3;
const STAGE_SECOND: u32 = 50;
const PROMOTE_SECOND: u32 = 0;
const CLOSE_SECOND: u32 = 15;

#[derive(Default)]
struct Slots {
    retiring: Vec<ContextToken>,
    active: Vec<ContextToken>,
    staged: Vec<ContextToken>,
    cursor: usize,
}

struct RotationInner {
    provider: Arc<dyn IndexProvider>,
    config: RotationConfig,
    slots: Mutex<Slots>,
}

/// Owns the rotation clock task and the three token generations.
pub struct ContextRotation {
    inner: Arc<RotationInner>,
    stop: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ContextRotation {
    /// Open the initial generation and start the clock task.
    ///
    /// An initial open failure is logged, not fatal: the pool serves empty
    /// until the next staging cycle succeeds.
    pub async fn start(provider: Arc<dyn IndexProvider>, config: RotationConfig) -> Self {
        let inner = Arc::new(RotationInner {
            provider,
            config,
            slots: Mutex::new(Slots::default()),
        });

        match inner.open_generation().await {
            Ok(tokens) => {
                info!(contexts = tokens.len(), "initial context generation opened");
                inner.slots.lock().active = tokens;
            }
            Err(e) => error!(error = %e, "initial context generation failed, pool starts empty"),
        }

        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_clock(inner.clone(), stop_rx));

        Self {
            inner,
            stop,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Stop the clock task and wait for it to drain its current tick.
    ///
    /// Idempotent: later calls find no handle and return immediately. Tokens
    /// still in *active* or *staged* are left to expire provider-side.
    pub async fn shutdown(&self) {
        let _ = self.stop.send(true);

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "rotation clock task join failed");
            }
            info!("context rotation stopped");
        }
    }
}

impl TokenSource for ContextRotation {
    fn get(&self) -> Option<ContextToken> {
        self.inner.get()
    }
}

async fn run_clock(inner: Arc<RotationInner>, mut stop: watch::Receiver<bool>) {
    info!("context rotation started");

    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; the clock acts on whole seconds only.
    tick.tick().await;

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = tick.tick() => {
                inner.handle_second(Utc::now().second()).await;
            }
        }
    }
}

impl RotationInner {
    fn get(&self) -> Option<ContextToken> {
        let mut slots = self.slots.lock();
        if slots.active.is_empty() {
            return None;
        }
        slots.cursor %= slots.active.len();
        let token = slots.active[slots.cursor].clone();
        slots.cursor += 1;
        Some(token)
    }

    async fn handle_second(&self, second: u32) {
        match second {
            STAGE_SECOND => {
                if let Err(e) = self.stage().await {
                    error!(error = %e, "staging fresh contexts failed, keeping current generation");
                }
            }
            PROMOTE_SECOND => self.promote().await,
            CLOSE_SECOND => self.close_retiring().await,
            _ => {}
        }
    }

    /// Open a full staged generation, retrying the whole batch up to three
    /// times. On persistent failure *staged* is left empty and the previous
    /// active generation keeps serving.
    async fn stage(&self) -> IndexResult<()> {
        let mut outcome = self.open_generation().await;
        for attempt in 2..=STAGE_ATTEMPTS {
            match outcome {
                Ok(_) => break,
                Err(e) => {
                    warn!(attempt = attempt - 1, error = %e, "context generation attempt failed");
                    outcome = self.open_generation().await;
                }
            }
        }

        let tokens = outcome?;
        debug!(contexts = tokens.len(), "staged fresh context generation");
        self.slots.lock().staged = tokens;
        Ok(())
    }

    /// Rotate generations. If staging failed this cycle, make one more attempt
    /// here so rotation is not skipped indefinitely; if that also fails, the
    /// current active set stays in place.
    async fn promote(&self) {
        let staged_empty = self.slots.lock().staged.is_empty();
        if staged_empty {
            match self.open_generation().await {
                Ok(tokens) => self.slots.lock().staged = tokens,
                Err(e) => {
                    error!(error = %e, "late context generation failed, serving previous generation");
                    return;
                }
            }
        }

        let mut slots = self.slots.lock();
        if slots.staged.is_empty() {
            return;
        }
        slots.retiring = std::mem::take(&mut slots.active);
        slots.active = std::mem::take(&mut slots.staged);
        info!(
            active = slots.active.len(),
            retiring = slots.retiring.len(),
            "promoted staged contexts"
        );
    }

    /// Release every token in *retiring*. Tokens that fail to close are still
    /// dropped here; the provider's keep-alive expiry reclaims them.
    async fn close_retiring(&self) {
        let retiring = std::mem::take(&mut self.slots.lock().retiring);
        for token in retiring {
            if let Err(e) = self.provider.close_context(&token).await {
                warn!(error = %e, "closing retired context failed");
            }
        }
    }

    async fn open_generation(&self) -> IndexResult<Vec<ContextToken>> {
        let mut tokens = Vec::with_capacity(self.config.pool_size);
        for _ in 0..self.config.pool_size {
            // A partial batch on failure is abandoned to provider-side expiry.
            tokens.push(self.provider.open_context(self.config.keep_alive()).await?);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    #[derive(Default)]
    struct FakeProvider {
        counter: AtomicU64,
        failing: AtomicBool,
        closed: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl IndexProvider for FakeProvider {
        async fn open_context(&self, _keep_alive: Duration) -> IndexResult<ContextToken> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(IndexError::Transport("connection refused".into()));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(ContextToken::new(format!("ctx-{n}")))
        }

        async fn close_context(&self, token: &ContextToken) -> IndexResult<()> {
            self.closed.lock().push(token.id().to_string());
            Ok(())
        }

        async fn execute(&self, _body: serde_json::Value, _timeout: Duration) -> IndexResult<String> {
            Ok("{}".into())
        }
    }

    fn inner(provider: Arc<FakeProvider>, pool_size: usize) -> RotationInner {
        RotationInner {
            provider,
            config: RotationConfig {
                pool_size,
                keep_alive_secs: 120,
            },
            slots: Mutex::new(Slots::default()),
        }
    }

    fn slot_total(inner: &RotationInner) -> usize {
        let slots = inner.slots.lock();
        slots.retiring.len() + slots.active.len() + slots.staged.len()
    }

    #[tokio::test]
    async fn round_robin_covers_pool_then_wraps() {
        let provider = Arc::new(FakeProvider::default());
        let rotation = ContextRotation::start(provider, RotationConfig {
            pool_size: 3,
            keep_alive_secs: 120,
        })
        .await;

        let first: Vec<_> = (0..3).filter_map(|_| rotation.get()).collect();
        assert_eq!(first.len(), 3);
        assert_ne!(first[0], first[1]);
        assert_ne!(first[1], first[2]);
        assert_ne!(first[0], first[2]);

        assert_eq!(rotation.get(), Some(first[0].clone()));

        rotation.shutdown().await;
        rotation.shutdown().await; // second call is a no-op
    }

    #[tokio::test]
    async fn empty_pool_fails_fast() {
        let provider = Arc::new(FakeProvider::default());
        provider.set_failing(true);
        let rotation = ContextRotation::start(provider, RotationConfig::default()).await;

        assert_eq!(rotation.get(), None);
        rotation.shutdown().await;
    }

    #[tokio::test]
    async fn full_cycle_stages_promotes_and_closes() {
        let provider = Arc::new(FakeProvider::default());
        let inner = inner(provider.clone(), 2);

        inner.slots.lock().active = inner.open_generation().await.unwrap();
        let initial = inner.slots.lock().active.clone();

        inner.handle_second(STAGE_SECOND).await;
        assert_eq!(inner.slots.lock().staged.len(), 2);
        assert!(slot_total(&inner) <= 3 * 2);

        inner.handle_second(PROMOTE_SECOND).await;
        {
            let slots = inner.slots.lock();
            assert_eq!(slots.retiring, initial);
            assert_eq!(slots.active.len(), 2);
            assert_ne!(slots.active, initial);
            assert!(slots.staged.is_empty());
        }

        inner.handle_second(CLOSE_SECOND).await;
        assert!(inner.slots.lock().retiring.is_empty());
        let closed = provider.closed.lock().clone();
        assert_eq!(closed.len(), 2);
        for token in &initial {
            assert!(closed.contains(&token.id().to_string()));
        }
    }

    #[tokio::test]
    async fn failed_generation_keeps_previous_active() {
        let provider = Arc::new(FakeProvider::default());
        let inner = inner(provider.clone(), 2);

        inner.slots.lock().active = inner.open_generation().await.unwrap();
        let initial = inner.slots.lock().active.clone();

        provider.set_failing(true);
        inner.handle_second(STAGE_SECOND).await;
        assert!(inner.slots.lock().staged.is_empty());

        inner.handle_second(PROMOTE_SECOND).await;
        let slots = inner.slots.lock();
        assert_eq!(slots.active, initial);
        assert!(slots.retiring.is_empty());
    }

    #[tokio::test]
    async fn late_generation_at_promotion_recovers() {
        let provider = Arc::new(FakeProvider::default());
        let inner = inner(provider.clone(), 1);

        inner.slots.lock().active = inner.open_generation().await.unwrap();
        let initial = inner.slots.lock().active.clone();

        // Staging window missed entirely, but the open succeeds at promotion.
        inner.handle_second(PROMOTE_SECOND).await;
        let slots = inner.slots.lock();
        assert_eq!(slots.retiring, initial);
        assert_eq!(slots.active.len(), 1);
        assert_ne!(slots.active, initial);
    }

    #[tokio::test]
    async fn other_seconds_are_noops() {
        let provider = Arc::new(FakeProvider::default());
        let inner = inner(provider.clone(), 2);
        inner.slots.lock().active = inner.open_generation().await.unwrap();
        let before = inner.slots.lock().active.clone();

        for second in [1, 14, 16, 30, 49, 51, 59] {
            inner.handle_second(second).await;
        }

        let slots = inner.slots.lock();
        assert_eq!(slots.active, before);
        assert!(slots.staged.is_empty());
        assert!(slots.retiring.is_empty());
    }
}
