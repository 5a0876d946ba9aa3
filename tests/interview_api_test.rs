use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adaptive_interviewer::models::evaluation::{EvaluationResult, TurnRecord};
use adaptive_interviewer::models::question::QuestionRecord;
use adaptive_interviewer::services::assessor::Assessor;
use adaptive_interviewer::services::interview_service::InterviewService;
use adaptive_interviewer::services::question_bank::QuestionBank;
use adaptive_interviewer::services::session_store::SessionRetention;
use adaptive_interviewer::{app, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

struct ScriptedAssessor {
    scores: Mutex<VecDeque<i32>>,
    reports: AtomicUsize,
}

#[async_trait]
impl Assessor for ScriptedAssessor {
    async fn evaluate_answer(&self, _question: &str, _answer: &str, _rubric: &str) -> EvaluationResult {
        let score = self.scores.lock().unwrap().pop_front().unwrap_or(5);
        EvaluationResult::new(score, format!("Scored {}", score))
    }

    async fn generate_report(&self, results: &[TurnRecord]) -> String {
        self.reports.fetch_add(1, Ordering::SeqCst);
        format!("## Overall Summary\n{} answers reviewed.", results.len())
    }
}

fn sample_bank(bank_size: usize) -> Arc<QuestionBank> {
    Arc::new(QuestionBank::new(
        (1..=bank_size)
            .map(|i| {
                QuestionRecord::new(format!("Excel question {}", i))
                    .with_rubric(format!("Rubric {}", i))
                    .with_hint(format!("Hint {}", i))
            })
            .collect(),
    ))
}

fn scripted(scores: &[i32]) -> Arc<ScriptedAssessor> {
    Arc::new(ScriptedAssessor {
        scores: Mutex::new(scores.iter().copied().collect()),
        reports: AtomicUsize::new(0),
    })
}

fn setup_app(bank_size: usize, interview_length: usize, scores: &[i32]) -> (Router, Arc<ScriptedAssessor>) {
    let assessor = scripted(scores);
    let state = AppState::with_assessor(sample_bank(bank_size), assessor.clone(), interview_length);
    (app(state, 1000), assessor)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            builder = builder.header("content-type", "application/json");
            Body::from(b.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn say(app: &Router, id: &str, text: &str) -> (StatusCode, JsonValue) {
    send(
        app,
        "POST",
        &format!("/api/interviews/{}/messages", id),
        Some(json!({ "text": text })),
    )
    .await
}

fn last_message(view: &JsonValue) -> String {
    let messages = view["messages"].as_array().unwrap();
    messages.last().unwrap()["content"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup_app(3, 3, &[]);
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn interview_flow_with_retry_and_report() {
    let (app, assessor) = setup_app(5, 3, &[4, 2, 2, 1]);

    let (status, view) = send(&app, "POST", "/api/interviews", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["stage"], "welcome");
    assert_eq!(view["progress"]["total"], 3);
    assert_eq!(view["progress"]["answered"], 0);
    assert!(view["average_score"].is_null());
    assert!(view["report"].is_null());
    let id = view["id"].as_str().unwrap().to_string();

    let (status, view) = say(&app, &id, "hi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["stage"], "welcome");
    assert_eq!(view["messages"].as_array().unwrap().len(), 2);

    let (_, view) = say(&app, &id, "start").await;
    assert_eq!(view["stage"], "interviewing");
    assert!(last_message(&view).starts_with("Excel question"));

    let (_, view) = say(&app, &id, "first answer").await;
    assert_eq!(view["progress"]["answered"], 1);
    assert_eq!(view["average_score"], 4.0);

    let (_, view) = say(&app, &id, "weak answer").await;
    assert_eq!(view["progress"]["answered"], 1);
    assert_eq!(view["retry_pending"], true);
    assert!(last_message(&view).contains("Here's a hint"));

    let (_, view) = say(&app, &id, "weak again").await;
    assert_eq!(view["progress"]["answered"], 2);
    assert_eq!(view["retry_pending"], false);
    assert_eq!(view["average_score"], 3.0);
    assert_eq!(view["stage"], "interviewing");

    let (_, view) = say(&app, &id, "last answer").await;
    assert_eq!(view["stage"], "finished");
    assert_eq!(view["progress"]["answered"], 3);
    assert_eq!(view["progress"]["percent"], 100.0);
    assert!(view["report"].as_str().unwrap().contains("3 answers reviewed"));

    for _ in 0..3 {
        let (status, view) = send(&app, "GET", &format!("/api/interviews/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["stage"], "finished");
    }
    assert_eq!(assessor.reports.load(Ordering::SeqCst), 1);

    let (status, body) = say(&app, &id, "anything else?").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "interview_finished");
}

#[tokio::test]
async fn low_scores_end_interview_early() {
    let (app, _) = setup_app(4, 4, &[1, 1, 1, 1, 2, 2]);
    let (_, view) = send(&app, "POST", "/api/interviews", None).await;
    let id = view["id"].as_str().unwrap().to_string();
    say(&app, &id, "start").await;

    let mut view = JsonValue::Null;
    for _ in 0..6 {
        view = say(&app, &id, "not sure").await.1;
    }

    assert_eq!(view["stage"], "finished");
    assert_eq!(view["progress"]["answered"], 3);
    assert_eq!(view["progress"]["total"], 4);
    assert!(last_message(&view).starts_with("Thank you for your time."));
}

#[tokio::test]
async fn rejects_blank_text_and_unknown_sessions() {
    let (app, _) = setup_app(3, 3, &[]);
    let (_, view) = send(&app, "POST", "/api/interviews", None).await;
    let id = view["id"].as_str().unwrap().to_string();

    let (status, _) = say(&app, &id, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = say(&app, &id, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("/api/interviews/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&missing.to_string()));
}

#[tokio::test]
async fn deleting_a_session_tears_it_down() {
    let (app, _) = setup_app(3, 2, &[]);
    let (_, view) = send(&app, "POST", "/api/interviews", None).await;
    let id = view["id"].as_str().unwrap().to_string();
    assert_eq!(view["progress"]["total"], 2);

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["active_sessions"], 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/interviews/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = say(&app, &id, "start").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/interviews/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_do_not_share_state() {
    let (app, _) = setup_app(5, 3, &[]);
    let (_, a) = send(&app, "POST", "/api/interviews", None).await;
    let (_, b) = send(&app, "POST", "/api/interviews", None).await;
    let (a, b) = (a["id"].as_str().unwrap().to_string(), b["id"].as_str().unwrap().to_string());
    assert_ne!(a, b);

    say(&app, &a, "start").await;
    let (_, view_a) = say(&app, &a, "great answer").await;
    assert_eq!(view_a["progress"]["answered"], 1);

    let (_, view_b) = send(&app, "GET", &format!("/api/interviews/{}", b), None).await;
    assert_eq!(view_b["stage"], "welcome");
    assert_eq!(view_b["progress"]["answered"], 0);
}

#[tokio::test]
async fn finished_sessions_are_evicted_on_next_create() {
    let retention = SessionRetention {
        idle_ttl: Duration::from_secs(3600),
        finished_ttl: Duration::ZERO,
    };
    let service = InterviewService::new(sample_bank(3), scripted(&[]), 1).with_retention(retention);
    let app = app(AppState { interview_service: service }, 1000);

    for _ in 0..5 {
        let (_, view) = send(&app, "POST", "/api/interviews", None).await;
        let id = view["id"].as_str().unwrap().to_string();
        say(&app, &id, "start").await;
        let (_, view) = say(&app, &id, "my answer").await;
        assert_eq!(view["stage"], "finished");
    }

    let (_, idle) = send(&app, "POST", "/api/interviews", None).await;
    let (_, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(body["active_sessions"], 1);

    let (status, _) = send(&app, "GET", &format!("/api/interviews/{}", idle["id"].as_str().unwrap()), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn answer_length_is_capped() {
    let (app, _) = setup_app(3, 2, &[4]);
    let (_, view) = send(&app, "POST", "/api/interviews", None).await;
    let id = view["id"].as_str().unwrap().to_string();
    say(&app, &id, "start").await;

    let (status, body) = say(&app, &id, &"x".repeat(10_001)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, view) = say(&app, &id, &"long answer ".repeat(800)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["progress"]["answered"], 1);
}
