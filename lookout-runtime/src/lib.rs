//! Process runtime for lookout commands.
//!
//! The CLI runs every command on one [`LookoutRuntime`]. One-shot commands
//! (`scan`, `content`, `snapshot`) simply `block_on` their future; `watch`
//! spawns a [`SuppressionLoop`] through the [`LookoutHandle`] and hands it a
//! child of the runtime's cancellation token, so runtime shutdown also stops
//! the loop between passes.
use anyhow::Result;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub mod watch;

pub use watch::{SuppressionLoop, WatchStats};

/// Cloneable spawner tied to a [`LookoutRuntime`].
#[derive(Clone)]
pub struct LookoutHandle {
    inner: Handle,
    cancel: Arc<CancellationToken>,
}

/// Multi-threaded Tokio runtime owning the session-wide cancellation token.
pub struct LookoutRuntime {
    runtime: Runtime,
    cancel: Arc<CancellationToken>,
}

impl LookoutRuntime {
    /// Worker threads are named after `thread_name`; `None` leaves the count
    /// to Tokio.
    ///
    /// ```
    /// use lookout_runtime::LookoutRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = LookoutRuntime::build("lookout-worker", Some(1)).unwrap();
    /// let title = runtime.block_on(async { String::from("Checkout") });
    /// assert_eq!(title, "Checkout");
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);

        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        let runtime = builder.build()?;
        let cancel = Arc::new(CancellationToken::new());
        Ok(Self { runtime, cancel })
    }

    pub fn handle(&self) -> LookoutHandle {
        LookoutHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel running watch loops, then give their tasks `graceful` to
    /// finish the pass they are in.
    pub fn shutdown(self, graceful: std::time::Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl LookoutHandle {
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Session-wide token. Background loops should take a child of it so
    /// they can be stopped on their own.
    ///
    /// ```
    /// use lookout_runtime::LookoutRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = LookoutRuntime::build("lookout-watch", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let stop = handle.cancellation().child_token();
    ///
    /// let passes = handle.spawn({
    ///     let stop = stop.clone();
    ///     async move {
    ///         let mut passes = 0u32;
    ///         while !stop.is_cancelled() {
    ///             passes += 1;
    ///             if passes == 3 {
    ///                 stop.cancel();
    ///             }
    ///             tokio::task::yield_now().await;
    ///         }
    ///         passes
    ///     }
    /// });
    /// assert_eq!(runtime.block_on(passes).unwrap(), 3);
    /// assert!(!handle.cancellation().is_cancelled());
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }
}
