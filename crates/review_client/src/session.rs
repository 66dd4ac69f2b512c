use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use shared::domain::InstanceIndex;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::ReviewError,
    loader::{self, LoadOutcome},
    locale::Locale,
    navigator::{self, NavigationIntent, NavigationTarget},
    submit,
    view::{NoticeAnchor, NoticeKind, ResponseForm, ReviewView},
    ReviewApi,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Values the hosting page provides once, at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub start_index: InstanceIndex,
    pub evaluator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub locale: Locale,
    pub notice_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            notice_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    InstanceRendered { index: InstanceIndex },
    OutOfRange { index: InstanceIndex },
    EvaluationAccepted { index: InstanceIndex },
    FeedbackAccepted { index: InstanceIndex },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReport {
    Rendered(InstanceIndex),
    /// A newer load started while this one was in flight; its result was dropped.
    Superseded,
    /// The session hit the end of the instance range and loads no more.
    Halted,
}

/// Drives one review page: owns the current index and the rendered view.
pub struct ReviewSession {
    api: Arc<dyn ReviewApi>,
    evaluator: String,
    options: SessionOptions,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

struct SessionState {
    current_index: InstanceIndex,
    view: ReviewView,
    load_ticket: u64,
    halted: bool,
}

impl ReviewSession {
    pub fn new(
        api: Arc<dyn ReviewApi>,
        context: SessionContext,
        options: SessionOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            evaluator: context.evaluator,
            options,
            inner: Mutex::new(SessionState {
                current_index: context.start_index,
                view: ReviewView::default(),
                load_ticket: 0,
                halted: false,
            }),
            events,
        })
    }

    pub fn evaluator(&self) -> &str {
        &self.evaluator
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn current_index(&self) -> InstanceIndex {
        self.inner.lock().await.current_index
    }

    pub async fn is_halted(&self) -> bool {
        self.inner.lock().await.halted
    }

    pub async fn view(&self) -> ReviewView {
        self.inner.lock().await.view.clone()
    }

    pub async fn edit_form(&self, edit: impl FnOnce(&mut ResponseForm)) {
        let mut guard = self.inner.lock().await;
        edit(&mut guard.view.form);
    }

    pub async fn expire_notices(&self, now: Instant) {
        self.inner.lock().await.view.expire_notices(now);
    }

    /// Loads the injected start index.
    pub async fn start(&self) -> Result<LoadReport, ReviewError> {
        let index = self.current_index().await;
        info!(index = index.0, evaluator = %self.evaluator, "review: session started");
        self.load(index).await
    }

    /// Fetches and renders `index` in place. Only the most recently started
    /// load may paint; older ones report [`LoadReport::Superseded`].
    pub async fn load(&self, index: InstanceIndex) -> Result<LoadReport, ReviewError> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            if guard.halted {
                debug!(index = index.0, "review: load skipped, session halted");
                return Ok(LoadReport::Halted);
            }
            guard.current_index = index;
            guard.load_ticket += 1;
            guard.load_ticket
        };

        let result = loader::load_instance(self.api.as_ref(), index).await;

        let mut guard = self.inner.lock().await;
        if guard.load_ticket != ticket {
            debug!(index = index.0, "review: discarding superseded load");
            return Ok(LoadReport::Superseded);
        }
        match result {
            Ok(LoadOutcome::Loaded(view)) => {
                guard.view.render(&view, self.options.locale);
                drop(guard);
                info!(index = index.0, "review: instance rendered");
                self.publish(SessionEvent::InstanceRendered { index });
                Ok(LoadReport::Rendered(index))
            }
            Ok(LoadOutcome::OutOfRange) => {
                guard.halted = true;
                self.notify(&mut guard, NoticeKind::OutOfRange, NoticeAnchor::InstanceInfo);
                guard.view.clear();
                drop(guard);
                info!(index = index.0, "review: index out of range, halting");
                self.publish(SessionEvent::OutOfRange { index });
                Err(ReviewError::OutOfRange { index })
            }
            Err(err) => {
                warn!(index = index.0, error = %err, "review: load failed");
                self.notify(&mut guard, NoticeKind::LoadFailed, NoticeAnchor::Page);
                guard.view.clear();
                Err(err)
            }
        }
    }

    pub async fn submit_evaluation(&self) -> Result<(), ReviewError> {
        let submission = {
            let mut guard = self.inner.lock().await;
            let built = guard
                .view
                .snapshot()
                .ok_or(ReviewError::NothingDisplayed)
                .and_then(|snapshot| {
                    submit::build_evaluation(snapshot, &guard.view.form, &self.evaluator)
                });
            match built {
                Ok(submission) => submission,
                Err(err) => {
                    debug!(error = %err, "review: evaluation rejected locally");
                    self.notify(&mut guard, err.notice_kind(), NoticeAnchor::EvaluationSubmit);
                    return Err(err);
                }
            }
        };

        let index = submission.index;
        let result = submit::post_evaluation(self.api.as_ref(), &submission).await;
        let kind = match &result {
            Ok(()) => NoticeKind::EvaluationAccepted,
            Err(err) => err.notice_kind(),
        };
        {
            let mut guard = self.inner.lock().await;
            self.notify(&mut guard, kind, NoticeAnchor::EvaluationSubmit);
        }
        result?;

        let event = SessionEvent::EvaluationAccepted { index };
        self.publish(event.clone());
        self.handle_event(&event).await;
        Ok(())
    }

    pub async fn submit_feedback(&self) -> Result<(), ReviewError> {
        let submission = {
            let mut guard = self.inner.lock().await;
            let built = guard
                .view
                .snapshot()
                .ok_or(ReviewError::NothingDisplayed)
                .and_then(|snapshot| {
                    submit::build_feedback(snapshot, &guard.view.form, &self.evaluator)
                });
            match built {
                Ok(submission) => submission,
                Err(err) => {
                    let kind = match err {
                        ReviewError::ValidationIncomplete { .. } => NoticeKind::FeedbackEmpty,
                        ref other => other.notice_kind(),
                    };
                    self.notify(&mut guard, kind, NoticeAnchor::FeedbackSubmit);
                    return Err(err);
                }
            }
        };

        let index = submission.index;
        let result = submit::post_feedback(self.api.as_ref(), &submission).await;
        let kind = match &result {
            Ok(()) => NoticeKind::FeedbackAccepted,
            Err(err) => err.notice_kind(),
        };
        {
            let mut guard = self.inner.lock().await;
            self.notify(&mut guard, kind, NoticeAnchor::FeedbackSubmit);
        }
        result?;

        self.publish(SessionEvent::FeedbackAccepted { index });
        Ok(())
    }

    /// Reacts to session events. An accepted evaluation advances to the next
    /// index in place, keeping the success notice on screen.
    pub async fn handle_event(&self, event: &SessionEvent) {
        if let SessionEvent::EvaluationAccepted { .. } = event {
            let next = self.current_index().await.next();
            debug!(index = next.0, "review: advancing after accepted evaluation");
            // Failures already surfaced as notices by `load`.
            let _ = self.load(next).await;
        }
    }

    /// Resolves a navigation intent against the current index. `None` means
    /// the intent was refused and a notice explains why.
    pub async fn navigate(&self, intent: NavigationIntent) -> Option<NavigationTarget> {
        let mut guard = self.inner.lock().await;
        match navigator::resolve(intent, guard.current_index) {
            Ok(target) => {
                info!(target = %target.path(), "review: navigating");
                Some(target)
            }
            Err(_) => {
                self.notify(
                    &mut guard,
                    NoticeKind::FirstInstanceBoundary,
                    NoticeAnchor::Page,
                );
                None
            }
        }
    }

    fn notify(&self, state: &mut SessionState, kind: NoticeKind, anchor: NoticeAnchor) {
        state.view.post_notice(
            kind,
            anchor,
            self.options.locale,
            Instant::now(),
            self.options.notice_timeout,
        );
    }

    fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}
