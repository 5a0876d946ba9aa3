pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{
    ai_service::AIService, assessor::Assessor, interview_service::InterviewService,
    question_bank::QuestionBank, session_store::SessionRetention,
};
use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub interview_service: InterviewService,
}

impl AppState {
    pub fn new(bank: Arc<QuestionBank>) -> error::Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        let ai_service = AIService::new(config.openai_api_key.clone(), http_client)
            .with_endpoint(config.openai_api_url.clone(), config.openai_model.clone())
            .with_call_delay(Duration::from_millis(config.llm_call_delay_ms));

        let retention = SessionRetention {
            idle_ttl: Duration::from_secs(config.session_idle_ttl_secs),
            finished_ttl: Duration::from_secs(config.finished_session_ttl_secs),
        };

        Ok(Self {
            interview_service: InterviewService::new(
                bank,
                Arc::new(ai_service),
                config.interview_length,
            )
            .with_retention(retention),
        })
    }

    pub fn with_assessor(
        bank: Arc<QuestionBank>,
        assessor: Arc<dyn Assessor>,
        interview_length: usize,
    ) -> Self {
        Self {
            interview_service: InterviewService::new(bank, assessor, interview_length),
        }
    }
}

pub fn app(state: AppState, public_rps: u32) -> Router {
    let interview_api = Router::new()
        .route("/api/interviews", post(routes::interview::create_interview))
        .route(
            "/api/interviews/:id",
            get(routes::interview::get_interview).delete(routes::interview::delete_interview),
        )
        .route(
            "/api/interviews/:id/messages",
            post(routes::interview::submit_message),
        )
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(public_rps),
            middleware::rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(interview_api)
        .with_state(state)
        .layer(middleware::cors::interview_cors())
        .layer(TraceLayer::new_for_http())
}
