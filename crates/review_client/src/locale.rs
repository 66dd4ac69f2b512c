//! User-facing texts for the review view, in the languages the tool ships with.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{InstanceIndex, Role},
    error::ParseValueError,
    protocol::InstancesStatus,
};

use crate::view::NoticeKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Fa,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fa => "fa",
        }
    }

    pub fn instance_label(self, index: InstanceIndex) -> String {
        match self {
            Self::En => format!("Instance #{index}"),
            Self::Fa => format!("نمونه شماره {index}"),
        }
    }

    pub fn progress_line(self, status: &InstancesStatus) -> String {
        match self {
            Self::En => format!(
                "You have {} unevaluated instances out of {}.",
                status.count_left_indices, status.count_all_indices
            ),
            Self::Fa => format!(
                "تعداد {} نمونه انجام نشده از {} نمونه دارید.",
                status.count_left_indices, status.count_all_indices
            ),
        }
    }

    pub fn role_icon(self, role: Role) -> &'static str {
        match role {
            Role::User => "🧑",
            Role::Assistant => "🤖",
        }
    }

    pub fn role_heading(self, role: Role) -> &'static str {
        match (self, role) {
            (Self::En, Role::User) => "Input/question given to the model:",
            (Self::En, Role::Assistant) => "Model response:",
            (Self::Fa, Role::User) => "ورودی/سوال داده شده به مدل:",
            (Self::Fa, Role::Assistant) => "پاسخ مدل:",
        }
    }

    pub fn notice(self, kind: NoticeKind) -> &'static str {
        match self {
            Self::En => match kind {
                NoticeKind::OutOfRange => {
                    "You requested an instance outside the available range. You may have \
                     completed every evaluation. Thank you for your help!"
                }
                NoticeKind::ValidationIncomplete => "Please answer all of the questions.",
                NoticeKind::FeedbackEmpty => "No feedback was provided.",
                NoticeKind::EvaluationAccepted => "Evaluation submitted successfully.",
                NoticeKind::FeedbackAccepted => "Feedback submitted successfully.",
                NoticeKind::Unauthenticated => "You must be logged in to submit.",
                NoticeKind::SubmissionFailed => "Submission failed. Please try again.",
                NoticeKind::LoadFailed => "Could not load the instance. Please reload.",
                NoticeKind::FirstInstanceBoundary => "You are already at the first instance.",
            },
            Self::Fa => match kind {
                NoticeKind::OutOfRange => {
                    "شما یک نمونه خارج از محدوده درخواست کردید. شما ممکن است تمام ارزیابی ها را \
                     تکمیل کرده باشید. از همکاری شما سپاسگذاریم!"
                }
                NoticeKind::ValidationIncomplete => "لطفا تمامی سوال ها را پاسخ دهید.",
                NoticeKind::FeedbackEmpty => "بازخوردی ارائه نشده است.",
                NoticeKind::EvaluationAccepted => "ارزیابی با موفقیت ثبت شد.",
                NoticeKind::FeedbackAccepted => "بازخورد با موفقیت ثبت شد.",
                NoticeKind::Unauthenticated => "برای ثبت باید وارد شوید.",
                NoticeKind::SubmissionFailed => "خطا در هنگام ثبت. لطفا دوباره تلاش کنید.",
                NoticeKind::LoadFailed => "خطا در بارگذاری نمونه. لطفا صفحه را دوباره بارگذاری کنید.",
                NoticeKind::FirstInstanceBoundary => {
                    "شما در حال حاضر در اولین نمونه از داده هستید."
                }
            },
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fa" => Ok(Self::Fa),
            other => Err(ParseValueError::new("locale", other, ["en", "fa"])),
        }
    }
}
