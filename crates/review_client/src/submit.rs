//! Validation and posting of evaluations and feedback.

use reqwest::StatusCode;
use shared::{
    domain::{InstanceIndex, ModelId},
    protocol::{EvaluationSubmission, FeedbackSubmission},
};
use tracing::{error, info, warn};

use crate::{error::ReviewError, view::ResponseForm, ReviewApi};

/// Instance fields as read back from the rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub index: InstanceIndex,
    pub model_a: ModelId,
    pub model_b: ModelId,
    pub prompt: String,
    pub completion_a: String,
    pub completion_b: String,
}

pub fn build_evaluation(
    snapshot: InstanceSnapshot,
    form: &ResponseForm,
    evaluator: &str,
) -> Result<EvaluationSubmission, ReviewError> {
    let mut missing = Vec::new();
    if form.completion_a_acceptable.is_none() {
        missing.push("completion_a_is_acceptable");
    }
    if form.completion_b_acceptable.is_none() {
        missing.push("completion_b_is_acceptable");
    }
    if form.preference.is_none() {
        missing.push("preference");
    }
    let (Some(a_ok), Some(b_ok), Some(preference)) = (
        form.completion_a_acceptable,
        form.completion_b_acceptable,
        form.preference,
    ) else {
        return Err(ReviewError::ValidationIncomplete { missing });
    };

    Ok(EvaluationSubmission {
        index: snapshot.index,
        model_a: snapshot.model_a,
        model_b: snapshot.model_b,
        prompt: snapshot.prompt,
        completion_a: snapshot.completion_a,
        completion_b: snapshot.completion_b,
        completion_a_is_acceptable: a_ok,
        completion_b_is_acceptable: b_ok,
        preference,
        evaluator: evaluator.to_string(),
    })
}

pub fn build_feedback(
    snapshot: InstanceSnapshot,
    form: &ResponseForm,
    evaluator: &str,
) -> Result<FeedbackSubmission, ReviewError> {
    if form.instance_quality.is_none() && form.comment.is_empty() {
        return Err(ReviewError::ValidationIncomplete {
            missing: vec!["instance_quality", "comment"],
        });
    }

    Ok(FeedbackSubmission {
        index: snapshot.index,
        model_a: snapshot.model_a,
        model_b: snapshot.model_b,
        prompt: snapshot.prompt,
        completion_a: snapshot.completion_a,
        completion_b: snapshot.completion_b,
        instance_quality: form.instance_quality,
        comment: form.comment.clone(),
        evaluator: evaluator.to_string(),
    })
}

pub fn classify_status(status: StatusCode) -> Result<(), ReviewError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => Err(ReviewError::Unauthenticated),
        other => Err(ReviewError::SubmissionFailed {
            reason: format!("server answered {other}"),
        }),
    }
}

pub async fn post_evaluation(
    api: &dyn ReviewApi,
    submission: &EvaluationSubmission,
) -> Result<(), ReviewError> {
    let index = submission.index.0;
    let status = api.submit_evaluation(submission).await.map_err(|err| {
        error!(index, error = %err, "review: evaluation request failed");
        ReviewError::SubmissionFailed {
            reason: err.to_string(),
        }
    })?;
    match classify_status(status) {
        Ok(()) => {
            info!(index, preference = %submission.preference, "review: evaluation accepted");
            Ok(())
        }
        Err(err) => {
            warn!(index, status = status.as_u16(), "review: evaluation rejected");
            Err(err)
        }
    }
}

pub async fn post_feedback(
    api: &dyn ReviewApi,
    submission: &FeedbackSubmission,
) -> Result<(), ReviewError> {
    let index = submission.index.0;
    let status = api.submit_feedback(submission).await.map_err(|err| {
        error!(index, error = %err, "review: feedback request failed");
        ReviewError::SubmissionFailed {
            reason: err.to_string(),
        }
    })?;
    match classify_status(status) {
        Ok(()) => {
            info!(index, "review: feedback accepted");
            Ok(())
        }
        Err(err) => {
            warn!(index, status = status.as_u16(), "review: feedback rejected");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{Acceptability, InstanceQuality, Panel, Preference};

    use super::*;

    fn snapshot() -> InstanceSnapshot {
        InstanceSnapshot {
            index: InstanceIndex(3),
            model_a: ModelId::new("m1"),
            model_b: ModelId::new("m2"),
            prompt: "p".into(),
            completion_a: "a".into(),
            completion_b: "b".into(),
        }
    }

    #[test]
    fn evaluation_lists_every_missing_answer() {
        let mut form = ResponseForm::default();
        form.set_acceptability(Panel::A, Acceptability::Yes);
        match build_evaluation(snapshot(), &form, "alice") {
            Err(ReviewError::ValidationIncomplete { missing }) => {
                assert_eq!(missing, vec!["completion_b_is_acceptable", "preference"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn evaluation_carries_snapshot_and_answers() {
        let form = ResponseForm {
            completion_a_acceptable: Some(Acceptability::No),
            completion_b_acceptable: Some(Acceptability::Yes),
            preference: Some(Preference::BIsSlightlyBetter),
            ..ResponseForm::default()
        };
        let submission = build_evaluation(snapshot(), &form, "alice").expect("valid");
        assert_eq!(submission.index, InstanceIndex(3));
        assert_eq!(submission.model_a, ModelId::new("m1"));
        assert_eq!(submission.completion_b, "b");
        assert_eq!(submission.preference, Preference::BIsSlightlyBetter);
        assert_eq!(submission.evaluator, "alice");
    }

    #[test]
    fn feedback_needs_rating_or_comment() {
        let form = ResponseForm::default();
        assert!(matches!(
            build_feedback(snapshot(), &form, "alice"),
            Err(ReviewError::ValidationIncomplete { .. })
        ));

        let form = ResponseForm {
            instance_quality: Some(InstanceQuality::Good),
            ..ResponseForm::default()
        };
        let feedback = build_feedback(snapshot(), &form, "alice").expect("rating only");
        assert_eq!(feedback.comment, "");

        let form = ResponseForm {
            comment: "duplicate of #2".into(),
            ..ResponseForm::default()
        };
        let feedback = build_feedback(snapshot(), &form, "alice").expect("comment only");
        assert_eq!(feedback.instance_quality, None);
    }

    #[test]
    fn classifies_submit_statuses() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED),
            Err(ReviewError::Unauthenticated)
        ));
        assert!(matches!(
            classify_status(StatusCode::CREATED),
            Err(ReviewError::SubmissionFailed { .. })
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(ReviewError::SubmissionFailed { .. })
        ));
    }
}
