// Fire-once timers and auto-dismissing inline messages

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delays used for inline banners and the post-booking redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimings {
    pub error: Duration,
    pub success: Duration,
    pub confirmation: Duration,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            error: Duration::from_secs(5),
            success: Duration::from_secs(3),
            confirmation: Duration::from_secs(10),
        }
    }
}

impl FlowTimings {
    pub fn for_kind(&self, kind: NoticeKind) -> Duration {
        match kind {
            NoticeKind::Error => self.error,
            NoticeKind::Success => self.success,
            NoticeKind::Confirmation => self.confirmation,
        }
    }
}

/// A single delayed action on the tokio runtime. Dropping the handle cancels
/// it, so a timer never outlives the component that armed it.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
    Confirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    notice: Option<Notice>,
}

/// One inline message area. Showing a new message replaces the old one and
/// restarts the dismissal timer.
#[derive(Debug)]
pub struct Banner {
    slot: Arc<Mutex<Slot>>,
    timer: Option<ScheduledTask>,
    timings: FlowTimings,
}

impl Banner {
    pub fn new(timings: FlowTimings) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timer: None,
            timings,
        }
    }

    pub fn show(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let generation = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.notice = Some(Notice {
                kind,
                message: message.into(),
            });
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        self.timer = Some(ScheduledTask::schedule(
            self.timings.for_kind(kind),
            move || {
                let mut slot = slot.lock();
                // A newer message owns the slot now
                if slot.generation == generation {
                    slot.notice = None;
                }
            },
        ));
    }

    pub fn current(&self) -> Option<Notice> {
        self.slot.lock().notice.clone()
    }

    pub fn clear(&mut self) {
        self.timer = None;
        let mut slot = self.slot.lock();
        slot.generation += 1;
        slot.notice = None;
    }

    /// Teardown: cancels the pending dismissal and drops the message.
    pub fn close(&mut self) {
        self.clear();
    }
}
