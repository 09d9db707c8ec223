use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AppError;

pub const COPY_FEEDBACK: Duration = Duration::from_millis(1500);

pub trait ClipboardBackend: Send {
    fn name(&self) -> &'static str;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

// Kept open between writes. On X11 the copied text lives only as long as the
// handle that owns it.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
}

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|err| anyhow!("clipboard unavailable: {err}"))?;
            self.clipboard = Some(clipboard);
        }
        let written = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text.to_string()),
            None => return Err(anyhow!("clipboard unavailable")),
        };
        written.map_err(|err| {
            // Reconnect on the next write.
            self.clipboard = None;
            anyhow!("failed to write clipboard: {err}")
        })
    }
}

pub struct LegacyClipboard;

impl ClipboardBackend for LegacyClipboard {
    fn name(&self) -> &'static str {
        "legacy"
    }

    #[cfg(target_os = "windows")]
    fn write_text(&mut self, text: &str) -> Result<()> {
        clipboard_win::set_clipboard_string(text)
            .map_err(|err| anyhow!("failed to write clipboard: {err}"))
    }

    #[cfg(not(target_os = "windows"))]
    fn write_text(&mut self, _text: &str) -> Result<()> {
        Err(anyhow!("legacy clipboard is not supported on this platform"))
    }
}

/// The "Copied!" flag. Set on copy, cleared by a timer that dies with the owner.
pub struct CopyFeedback {
    flag: Arc<AtomicBool>,
    reset_after: Duration,
    timer: Option<JoinHandle<()>>,
}

impl CopyFeedback {
    pub fn new(reset_after: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            reset_after,
            timer: None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn reset_after(&self) -> Duration {
        self.reset_after
    }

    pub fn trigger(&mut self) {
        self.cancel();
        self.flag.store(true, Ordering::Relaxed);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime, copy feedback will not reset");
            return;
        };
        let flag = Arc::clone(&self.flag);
        let reset_after = self.reset_after;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(reset_after).await;
            flag.store(false, Ordering::Relaxed);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    pub fn clear(&mut self) {
        self.cancel();
        self.flag.store(false, Ordering::Relaxed);
    }

    #[cfg(test)]
    fn flag_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

impl Drop for CopyFeedback {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Skipped,
    Copied { backend: &'static str },
}

pub struct ClipboardHelper {
    primary: Box<dyn ClipboardBackend>,
    fallback: Box<dyn ClipboardBackend>,
    feedback: CopyFeedback,
}

impl Default for ClipboardHelper {
    fn default() -> Self {
        Self::new(
            Box::new(SystemClipboard::default()),
            Box::new(LegacyClipboard),
        )
    }
}

impl ClipboardHelper {
    pub fn new(primary: Box<dyn ClipboardBackend>, fallback: Box<dyn ClipboardBackend>) -> Self {
        Self {
            primary,
            fallback,
            feedback: CopyFeedback::new(COPY_FEEDBACK),
        }
    }

    pub fn copied(&self) -> bool {
        self.feedback.is_set()
    }

    pub fn feedback(&self) -> &CopyFeedback {
        &self.feedback
    }

    pub fn reset_feedback(&mut self) {
        self.feedback.clear();
    }

    pub fn copy(&mut self, document: &str) -> Result<CopyOutcome, AppError> {
        if document.is_empty() {
            return Ok(CopyOutcome::Skipped);
        }

        let backend = match self.primary.write_text(document) {
            Ok(()) => self.primary.name(),
            Err(primary_err) => {
                debug!(
                    error = %primary_err,
                    backend = self.primary.name(),
                    "clipboard write failed, trying fallback"
                );
                match self.fallback.write_text(document) {
                    Ok(()) => self.fallback.name(),
                    Err(fallback_err) => {
                        warn!(
                            primary = %primary_err,
                            fallback = %fallback_err,
                            "copy failed"
                        );
                        return Err(AppError::CopyFailed(primary_err.to_string()));
                    }
                }
            }
        };

        self.feedback.trigger();
        Ok(CopyOutcome::Copied { backend })
    }
}

#[cfg(test)]
mod tests {
    use super::{ClipboardBackend, ClipboardHelper, CopyFeedback, CopyOutcome, COPY_FEEDBACK};
    use crate::error::AppError;
    use anyhow::{anyhow, Result};
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Recording {
        name: &'static str,
        fail: bool,
        writes: Arc<Mutex<Vec<String>>>,
    }

    impl ClipboardBackend for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn write_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(anyhow!("{} unavailable", self.name));
            }
            self.writes.lock().expect("writes lock").push(text.to_string());
            Ok(())
        }
    }

    fn helper(
        primary_fails: bool,
        fallback_fails: bool,
    ) -> (ClipboardHelper, Arc<Mutex<Vec<String>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let helper = ClipboardHelper::new(
            Box::new(Recording {
                name: "primary",
                fail: primary_fails,
                writes: writes.clone(),
            }),
            Box::new(Recording {
                name: "fallback",
                fail: fallback_fails,
                writes: writes.clone(),
            }),
        );
        (helper, writes)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_document_is_a_no_op() {
        let (mut helper, writes) = helper(false, false);
        assert_eq!(helper.copy(""), Ok(CopyOutcome::Skipped));
        assert!(!helper.copied());
        assert!(writes.lock().expect("writes lock").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn flag_resets_after_feedback_window() {
        let (mut helper, writes) = helper(false, false);
        assert_eq!(
            helper.copy("<h1>Hi</h1>"),
            Ok(CopyOutcome::Copied { backend: "primary" })
        );
        assert!(helper.copied());
        assert_eq!(*writes.lock().expect("writes lock"), vec!["<h1>Hi</h1>"]);

        tokio::time::sleep(COPY_FEEDBACK - Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert!(helper.copied());

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert!(!helper.copied());
    }

    #[tokio::test(start_paused = true)]
    async fn recopy_restarts_the_window() {
        let (mut helper, _) = helper(false, false);
        helper.copy("a").expect("copy");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        helper.copy("b").expect("copy");
        tokio::time::sleep(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        assert!(helper.copied(), "second copy keeps the flag for its own window");
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_when_primary_fails() {
        let (mut helper, writes) = helper(true, false);
        assert_eq!(
            helper.copy("<p>x</p>"),
            Ok(CopyOutcome::Copied { backend: "fallback" })
        );
        assert!(helper.copied());
        assert_eq!(writes.lock().expect("writes lock").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn both_backends_failing_is_copy_failed() {
        let (mut helper, _) = helper(true, true);
        let err = helper.copy("<p>x</p>").expect_err("copy should fail");
        assert!(matches!(err, AppError::CopyFailed(_)));
        assert!(!helper.copied());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_does_not_fire_after_teardown() {
        let mut feedback = CopyFeedback::new(COPY_FEEDBACK);
        feedback.trigger();
        let flag = feedback.flag_handle();
        drop(feedback);

        tokio::time::sleep(COPY_FEEDBACK * 2).await;
        tokio::task::yield_now().await;
        assert!(
            flag.load(Ordering::Relaxed),
            "aborted timer must not touch the flag"
        );
    }
}
