// Lifecycle coordinator: owns the one cancellation token every loop races
// against. First trigger wins; teardown hooks run exactly once.

use crate::error::GaugeError;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What stopped the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// `q` / `Q` in the terminal.
    QuitKey,
    /// SIGINT, Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// A loop hit a fatal error.
    Fault,
}

type TeardownHook = Box<dyn FnOnce() + Send>;

pub struct Coordinator {
    token: CancellationToken,
    fired: OnceLock<ShutdownTrigger>,
    hooks: Mutex<Vec<TeardownHook>>,
    torn_down: AtomicBool,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            fired: OnceLock::new(),
            hooks: Mutex::new(Vec::new()),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Handle to pass to a task at spawn time.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Fires the shared token. Returns `true` only for the call that won;
    /// later triggers are no-ops.
    pub fn trigger(&self, trigger: ShutdownTrigger) -> bool {
        let won = self.fired.set(trigger).is_ok();
        if won {
            tracing::info!(?trigger, "shutdown requested");
        } else {
            tracing::debug!(?trigger, "shutdown already in progress");
        }
        self.token.cancel();
        won
    }

    /// The trigger that won, if any has fired.
    pub fn fired(&self) -> Option<ShutdownTrigger> {
        self.fired.get().copied()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Registers a teardown step. Steps run in registration order.
    pub fn on_teardown(&self, hook: impl FnOnce() + Send + 'static) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    /// Runs the teardown sequence once. Returns `false` if it already ran.
    pub fn teardown(&self) -> bool {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return false;
        }
        let hooks = std::mem::take(&mut *self.hooks.lock().unwrap_or_else(PoisonError::into_inner));
        tracing::debug!(steps = hooks.len(), "teardown");
        for hook in hooks {
            hook();
        }
        true
    }

    /// Maps Ctrl-C / SIGTERM onto `trigger`. Exits quietly once the token is
    /// cancelled by anything else.
    pub fn spawn_signal_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let trigger = tokio::select! {
                _ = coordinator.token.cancelled() => return,
                t = wait_for_signal() => t,
            };
            tracing::debug!(?trigger, "received shutdown signal");
            coordinator.trigger(trigger);
        })
    }

    /// Waits for every task. The first failure fires `Fault` so the rest stop;
    /// that error is returned once all tasks have finished.
    pub async fn supervise(
        &self,
        tasks: Vec<JoinHandle<Result<(), GaugeError>>>,
    ) -> Result<(), GaugeError> {
        let mut pending: FuturesUnordered<_> = tasks.into_iter().collect();
        let mut first_error = None;

        while let Some(joined) = pending.next().await {
            let result = joined
                .map_err(|e| GaugeError::Task(e.to_string()))
                .and_then(|r| r);
            let Err(e) = result else { continue };
            if first_error.is_none() {
                tracing::error!(error = %e, "fatal task error");
                self.trigger(ShutdownTrigger::Fault);
                first_error = Some(e);
            } else {
                tracing::debug!(error = %e, "further task error during shutdown");
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn wait_for_signal() -> ShutdownTrigger {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable; Ctrl-C only");
                ctrl_c().await;
                return ShutdownTrigger::Interrupt;
            }
        };
        tokio::select! {
            _ = ctrl_c() => ShutdownTrigger::Interrupt,
            _ = sigterm.recv() => ShutdownTrigger::Terminate,
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c().await;
        ShutdownTrigger::Interrupt
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}
