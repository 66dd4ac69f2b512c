use super::*;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{Acceptability, InstanceQuality, Panel, Preference},
    error::ApiErrorBody,
    protocol::Completion,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MockServerState {
    prompts: Arc<Vec<String>>,
    evaluation_status: StatusCode,
    feedback_status: StatusCode,
    evaluations: Arc<Mutex<Vec<serde_json::Value>>>,
    feedback: Arc<Mutex<Vec<serde_json::Value>>>,
    cookies: Arc<Mutex<Vec<Option<String>>>>,
    logouts: Arc<Mutex<u32>>,
}

impl MockServerState {
    fn new(instance_count: usize) -> Self {
        Self {
            prompts: Arc::new((0..instance_count).map(|i| format!("question {i}")).collect()),
            evaluation_status: StatusCode::OK,
            feedback_status: StatusCode::OK,
            evaluations: Arc::new(Mutex::new(Vec::new())),
            feedback: Arc::new(Mutex::new(Vec::new())),
            cookies: Arc::new(Mutex::new(Vec::new())),
            logouts: Arc::new(Mutex::new(0)),
        }
    }

    async fn record_cookie(&self, headers: &HeaderMap) {
        let cookie = headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.cookies.lock().await.push(cookie);
    }
}

async fn handle_model_outputs(
    State(state): State<MockServerState>,
    Path(index): Path<usize>,
    headers: HeaderMap,
) -> Json<ModelOutputsResponse> {
    state.record_cookie(&headers).await;
    match state.prompts.get(index) {
        Some(prompt) => Json(ModelOutputsResponse::Instance {
            prompt: prompt.clone(),
            completions: vec![
                Completion::new("baseline-7b", format!("baseline answer {index}")),
                Completion::new("tuned-7b", format!("tuned answer {index}")),
            ],
        }),
        None => Json(ModelOutputsResponse::Error(
            ApiErrorBody::index_out_of_range(),
        )),
    }
}

async fn handle_instances_status(
    State(state): State<MockServerState>,
    headers: HeaderMap,
) -> Json<InstancesStatus> {
    state.record_cookie(&headers).await;
    let done = state.evaluations.lock().await.len() as u64;
    let all = state.prompts.len() as u64;
    Json(InstancesStatus {
        count_left_indices: all.saturating_sub(done),
        count_all_indices: all,
    })
}

async fn handle_submit_evaluation(
    State(state): State<MockServerState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    if state.evaluation_status == StatusCode::OK {
        state.evaluations.lock().await.push(body);
    }
    state.evaluation_status
}

async fn handle_submit_feedback(
    State(state): State<MockServerState>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    state.feedback.lock().await.push(body);
    state.feedback_status
}

async fn handle_logout(State(state): State<MockServerState>) -> StatusCode {
    *state.logouts.lock().await += 1;
    StatusCode::OK
}

async fn spawn_review_server(state: MockServerState) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/api/model-outputs/:index", get(handle_model_outputs))
        .route("/api/instances-status", get(handle_instances_status))
        .route("/api/submit-evaluation", post(handle_submit_evaluation))
        .route("/api/submit-feedback", post(handle_submit_feedback))
        .route("/logout", get(handle_logout))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn http_session(api: HttpReviewApi, start: u64) -> Arc<ReviewSession> {
    ReviewSession::new(
        Arc::new(api),
        SessionContext {
            start_index: InstanceIndex(start),
            evaluator: "alice".into(),
        },
        SessionOptions::default(),
    )
}

#[tokio::test]
async fn decodes_instance_and_out_of_range_bodies() {
    let server_url = spawn_review_server(MockServerState::new(2))
        .await
        .expect("spawn server");
    let api = HttpReviewApi::new(&server_url).expect("api");

    match api.model_outputs(InstanceIndex(1)).await.expect("instance") {
        ModelOutputsResponse::Instance {
            prompt,
            completions,
        } => {
            assert_eq!(prompt, "question 1");
            assert_eq!(completions.len(), 2);
            assert_eq!(completions[1].model.as_str(), "tuned-7b");
        }
        other => panic!("unexpected body: {other:?}"),
    }

    match api.model_outputs(InstanceIndex(7)).await.expect("error body") {
        ModelOutputsResponse::Error(body) => assert!(body.is_index_out_of_range()),
        other => panic!("unexpected body: {other:?}"),
    }

    let status = api.instances_status().await.expect("status");
    assert_eq!(status.count_all_indices, 2);
}

#[tokio::test]
async fn session_cookie_is_sent_with_every_request() {
    let state = MockServerState::new(1);
    let cookies = state.cookies.clone();
    let server_url = spawn_review_server(state).await.expect("spawn server");
    let api = HttpReviewApi::with_session_cookie(&server_url, Some("session=s3cr3t"))
        .expect("api");

    http_session(api, 0).start().await.expect("start");

    let seen = cookies.lock().await;
    assert_eq!(seen.len(), 2);
    assert!(seen
        .iter()
        .all(|cookie| cookie.as_deref() == Some("session=s3cr3t")));
}

#[tokio::test]
async fn evaluation_round_trip_over_http_advances() {
    let state = MockServerState::new(3);
    let evaluations = state.evaluations.clone();
    let server_url = spawn_review_server(state).await.expect("spawn server");
    let session = http_session(HttpReviewApi::new(&server_url).expect("api"), 0);
    session.start().await.expect("start");

    session
        .edit_form(|form| {
            form.set_acceptability(Panel::A, Acceptability::Yes);
            form.set_acceptability(Panel::B, Acceptability::Yes);
            form.preference = Some(Preference::BIsBetter);
        })
        .await;
    session.submit_evaluation().await.expect("submit");

    let sent = evaluations.lock().await;
    assert_eq!(sent.len(), 1);
    let body = &sent[0];
    assert_eq!(body["index"], 0);
    assert_eq!(body["model_a"], "baseline-7b");
    assert_eq!(body["model_b"], "tuned-7b");
    assert_eq!(body["prompt"], "question 0");
    assert_eq!(body["completion_a"], "baseline answer 0");
    assert_eq!(body["completion_a_is_acceptable"], "yes");
    assert_eq!(body["completion_b_is_acceptable"], "yes");
    assert_eq!(body["preference"], "b-is-better");
    assert_eq!(body["evaluator"], "alice");
    drop(sent);

    assert_eq!(session.current_index().await, InstanceIndex(1));
    let view = session.view().await;
    assert_eq!(view.address.as_deref(), Some("/instances/1"));
    assert!(view.progress_line.expect("progress").contains('2'));
}

#[tokio::test]
async fn unauthenticated_evaluation_over_http_keeps_index() {
    let mut state = MockServerState::new(3);
    state.evaluation_status = StatusCode::UNAUTHORIZED;
    let server_url = spawn_review_server(state).await.expect("spawn server");
    let session = http_session(HttpReviewApi::new(&server_url).expect("api"), 1);
    session.start().await.expect("start");
    session
        .edit_form(|form| {
            form.set_acceptability(Panel::A, Acceptability::No);
            form.set_acceptability(Panel::B, Acceptability::No);
            form.preference = Some(Preference::Tie);
        })
        .await;

    let err = session.submit_evaluation().await.expect_err("401");
    assert!(matches!(err, ReviewError::Unauthenticated));
    assert_eq!(session.current_index().await, InstanceIndex(1));
    assert!(session.view().await.has_notice(NoticeKind::Unauthenticated));
}

#[tokio::test]
async fn feedback_body_carries_null_quality() {
    let state = MockServerState::new(2);
    let feedback = state.feedback.clone();
    let server_url = spawn_review_server(state).await.expect("spawn server");
    let session = http_session(HttpReviewApi::new(&server_url).expect("api"), 0);
    session.start().await.expect("start");

    session
        .edit_form(|form| form.comment = "prompt leaks the answer".into())
        .await;
    session.submit_feedback().await.expect("comment only");
    session
        .edit_form(|form| {
            form.comment.clear();
            form.instance_quality = Some(InstanceQuality::Acceptable);
        })
        .await;
    session.submit_feedback().await.expect("rating only");

    let sent = feedback.lock().await;
    assert!(sent[0]["instance_quality"].is_null());
    assert_eq!(sent[0]["comment"], "prompt leaks the answer");
    assert_eq!(sent[1]["instance_quality"], "acceptable");
    assert_eq!(sent[1]["comment"], "");
    assert_eq!(session.current_index().await, InstanceIndex(0));
}

#[tokio::test]
async fn unreachable_server_is_a_submission_failure() {
    let dead_api = HttpReviewApi::new("http://127.0.0.1:9").expect("api");
    let submission = EvaluationSubmission {
        index: InstanceIndex(0),
        model_a: shared::domain::ModelId::new("a"),
        model_b: shared::domain::ModelId::new("b"),
        prompt: "p".into(),
        completion_a: "x".into(),
        completion_b: "y".into(),
        completion_a_is_acceptable: Acceptability::Yes,
        completion_b_is_acceptable: Acceptability::No,
        preference: Preference::Tie,
        evaluator: "alice".into(),
    };
    let err = submit::post_evaluation(&dead_api, &submission)
        .await
        .expect_err("connection refused");
    assert!(matches!(err, ReviewError::SubmissionFailed { .. }));
}

#[tokio::test]
async fn follow_requests_logout_endpoint() {
    let state = MockServerState::new(1);
    let logouts = state.logouts.clone();
    let server_url = spawn_review_server(state).await.expect("spawn server");
    let api = HttpReviewApi::new(&server_url).expect("api");

    let status = api.follow(&NavigationTarget::Logout).await.expect("logout");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(*logouts.lock().await, 1);
}

#[test]
fn base_url_path_gets_trailing_slash() {
    let api = HttpReviewApi::new("http://review.local:5000/eval").expect("api");
    assert_eq!(api.base_url().as_str(), "http://review.local:5000/eval/");
    assert_eq!(
        api.endpoint("api/instances-status").expect("endpoint").as_str(),
        "http://review.local:5000/eval/api/instances-status"
    );
}

#[test]
fn rejects_invalid_server_url() {
    assert!(HttpReviewApi::new("review.local").is_err());
}
