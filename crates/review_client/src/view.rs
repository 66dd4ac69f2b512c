//! Display model of the review page and the renderer that paints into it.
//!
//! `ReviewView` is the state a front end draws: the instance label, the message
//! history, both completion panels, the progress line, the response form and
//! the stacked notices. Rendering always starts with an explicit [`ReviewView::clear`]
//! so nothing typed or selected for one instance survives into the next.

use std::time::{Duration, Instant};

use shared::{
    domain::{Acceptability, InstanceIndex, InstanceQuality, ModelId, Panel, Preference, Role},
    protocol::{Completion, InstancesStatus},
};

use crate::{locale::Locale, submit::InstanceSnapshot};

/// Instance data as fetched by the loader, ready to be painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceView {
    pub index: InstanceIndex,
    pub messages: Vec<HistoryMessage>,
    pub completion_a: Completion,
    pub completion_b: Completion,
    pub progress: InstancesStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub role: Role,
    pub text: String,
}

impl HistoryMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPanel {
    pub model: ModelId,
    pub element_id: String,
    pub text: String,
}

impl From<&Completion> for CompletionPanel {
    fn from(completion: &Completion) -> Self {
        Self {
            model: completion.model.clone(),
            element_id: completion.model.element_id(),
            text: completion.completion.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseForm {
    pub completion_a_acceptable: Option<Acceptability>,
    pub completion_b_acceptable: Option<Acceptability>,
    pub preference: Option<Preference>,
    pub instance_quality: Option<InstanceQuality>,
    pub comment: String,
}

impl ResponseForm {
    pub fn set_acceptability(&mut self, panel: Panel, value: Acceptability) {
        match panel {
            Panel::A => self.completion_a_acceptable = Some(value),
            Panel::B => self.completion_b_acceptable = Some(value),
        }
    }

    /// True when no selection is made and the comment is empty.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    OutOfRange,
    ValidationIncomplete,
    FeedbackEmpty,
    EvaluationAccepted,
    FeedbackAccepted,
    Unauthenticated,
    SubmissionFailed,
    LoadFailed,
    FirstInstanceBoundary,
}

impl NoticeKind {
    pub fn level(self) -> NoticeLevel {
        match self {
            Self::EvaluationAccepted | Self::FeedbackAccepted => NoticeLevel::Success,
            Self::ValidationIncomplete | Self::FeedbackEmpty | Self::FirstInstanceBoundary => {
                NoticeLevel::Warning
            }
            Self::OutOfRange
            | Self::Unauthenticated
            | Self::SubmissionFailed
            | Self::LoadFailed => NoticeLevel::Danger,
        }
    }

    pub fn is_persistent(self) -> bool {
        self == Self::OutOfRange
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

/// Page region a notice is shown next to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeAnchor {
    Page,
    InstanceInfo,
    EvaluationSubmit,
    FeedbackSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub anchor: NoticeAnchor,
    pub message: String,
    /// `None` keeps the notice until the next full page load.
    pub expires_at: Option<Instant>,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewView {
    pub instance_label: Option<String>,
    pub messages: Vec<HistoryMessage>,
    pub completion_a: Option<CompletionPanel>,
    pub completion_b: Option<CompletionPanel>,
    pub progress_line: Option<String>,
    pub form: ResponseForm,
    pub notices: Vec<Notice>,
    pub address: Option<String>,
    /// Addresses pushed without a reload, oldest first.
    pub history: Vec<String>,
    rendered_index: Option<InstanceIndex>,
}

impl ReviewView {
    /// Drops everything instance-specific. Notices and the address survive.
    pub fn clear(&mut self) {
        self.instance_label = None;
        self.messages.clear();
        self.completion_a = None;
        self.completion_b = None;
        self.progress_line = None;
        self.form = ResponseForm::default();
        self.rendered_index = None;
    }

    pub fn render(&mut self, view: &InstanceView, locale: Locale) {
        self.clear();
        self.instance_label = Some(locale.instance_label(view.index));
        self.messages = view.messages.clone();
        self.completion_a = Some(CompletionPanel::from(&view.completion_a));
        self.completion_b = Some(CompletionPanel::from(&view.completion_b));
        self.progress_line = Some(locale.progress_line(&view.progress));
        self.push_address(view.index.address());
        self.rendered_index = Some(view.index);
    }

    pub fn rendered_index(&self) -> Option<InstanceIndex> {
        self.rendered_index
    }

    pub fn is_cleared(&self) -> bool {
        self.rendered_index.is_none()
            && self.instance_label.is_none()
            && self.messages.is_empty()
            && self.completion_a.is_none()
            && self.completion_b.is_none()
            && self.form.is_blank()
    }

    /// Prompt and completions exactly as currently displayed.
    pub fn snapshot(&self) -> Option<InstanceSnapshot> {
        let index = self.rendered_index?;
        let a = self.completion_a.as_ref()?;
        let b = self.completion_b.as_ref()?;
        let prompt = self
            .messages
            .iter()
            .filter(|message| message.role == Role::User)
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Some(InstanceSnapshot {
            index,
            model_a: a.model.clone(),
            model_b: b.model.clone(),
            prompt,
            completion_a: a.text.clone(),
            completion_b: b.text.clone(),
        })
    }

    pub fn post_notice(
        &mut self,
        kind: NoticeKind,
        anchor: NoticeAnchor,
        locale: Locale,
        now: Instant,
        timeout: Duration,
    ) {
        let expires_at = (!kind.is_persistent()).then(|| now + timeout);
        self.notices.push(Notice {
            kind,
            level: kind.level(),
            anchor,
            message: locale.notice(kind).to_string(),
            expires_at,
        });
    }

    pub fn expire_notices(&mut self, now: Instant) {
        self.notices.retain(|notice| !notice.is_expired(now));
    }

    pub fn has_notice(&self, kind: NoticeKind) -> bool {
        self.notices.iter().any(|notice| notice.kind == kind)
    }

    fn push_address(&mut self, address: String) {
        if self.address.as_deref() != Some(address.as_str()) {
            self.history.push(address.clone());
        }
        self.address = Some(address);
    }
}
