//! Toast notification queue
//!
//! Messages are queued FIFO and drained by a single worker so only one
//! toast is visible at a time. The `draining` flag is the single-owner
//! token: whichever caller flips it false-to-true spawns the drain loop,
//! and toasts pushed mid-drain are picked up by the running loop.

use crate::config;
use crate::view::ToastSink;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Visual category of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Info,
    Success,
    Warn,
    Error,
}

impl ToastVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Info => "info",
            ToastVariant::Success => "success",
            ToastVariant::Warn => "warn",
            ToastVariant::Error => "error",
        }
    }
}

/// A single queued notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub variant: ToastVariant,
    pub duration: Duration,
}

/// FIFO toast queue with a single-flight drain loop
#[derive(Clone)]
pub struct ToastQueue {
    queue: Arc<Mutex<VecDeque<Toast>>>,
    draining: Arc<AtomicBool>,
    sink: Arc<dyn ToastSink>,
}

impl ToastQueue {
    pub fn new(sink: Arc<dyn ToastSink>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            draining: Arc::new(AtomicBool::new(false)),
            sink,
        }
    }

    /// Queue a toast with the default display duration
    pub async fn show(&self, message: impl Into<String>, variant: ToastVariant) {
        self.show_with_duration(
            message,
            variant,
            Duration::from_millis(config::TOAST_DURATION_MS),
        )
        .await;
    }

    /// Queue a toast; starts the drain loop unless one is already running
    pub async fn show_with_duration(
        &self,
        message: impl Into<String>,
        variant: ToastVariant,
        duration: Duration,
    ) {
        let toast = Toast {
            message: message.into(),
            variant,
            duration,
        };
        self.queue.lock().await.push_back(toast);

        if !self.draining.swap(true, Ordering::SeqCst) {
            let queue = self.clone();
            tokio::spawn(async move {
                queue.drain().await;
            });
        }
    }

    async fn drain(&self) {
        loop {
            let next = self.queue.lock().await.pop_front();
            match next {
                Some(toast) => {
                    tracing::debug!("Showing toast: {}", toast.message);
                    self.sink.show(&toast);
                    tokio::time::sleep(toast.duration).await;
                }
                None => {
                    self.draining.store(false, Ordering::SeqCst);
                    // a push may have raced between the pop and the reset;
                    // re-acquire the token if so, otherwise we are done
                    if self.queue.lock().await.is_empty()
                        || self.draining.swap(true, Ordering::SeqCst)
                    {
                        break;
                    }
                }
            }
        }
    }

    /// True while a drain loop owns the queue
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }
}
