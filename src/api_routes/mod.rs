use crate::api::LeadClient;
use crate::config::{Config, MessagingConfig};
use crate::feedback::{Notice, NoticeQueue};
use crate::flow::{self, SubmitOutcome};
use crate::leads::form::FormState;
use crate::leads::schema::{FieldErrors, FieldRule};
use crate::leads::{ContactDraft, KundliDraft, LeadDraft, LeadTarget};
use crate::notify::{self, LinkOpener};
use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AppState {
    pub client: LeadClient,
    pub messaging: MessagingConfig,
    pub opener: Box<dyn LinkOpener>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: LeadClient::from_config(config),
            messaging: config.messaging.clone(),
            opener: notify::opener_for(config.server.open_links),
        }
    }
}

// --- Models ---

#[derive(Debug, Deserialize)]
struct SchemaQuery {
    form: Option<String>,
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    form: LeadTarget,
    fields: &'static [FieldRule],
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    #[serde(flatten)]
    outcome: SubmitOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: String,
}

// --- Handlers ---

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        backend: state.client.base_url().to_string(),
    })
}

async fn lead_schema(Query(query): Query<SchemaQuery>) -> impl IntoResponse {
    let form = match query
        .form
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some("kundli") => LeadTarget::Kundli,
        Some("contact") | None => LeadTarget::Contact,
        Some(other) => {
            return (StatusCode::BAD_REQUEST, format!("Unknown form: {other}")).into_response();
        }
    };

    let fields = match form {
        LeadTarget::Contact => ContactDraft::SCHEMA,
        LeadTarget::Kundli => KundliDraft::SCHEMA,
    };
    (StatusCode::OK, Json(SchemaResponse { form, fields })).into_response()
}

fn outcome_response(outcome: SubmitOutcome, notices: NoticeQueue) -> axum::response::Response {
    let status = match &outcome {
        _ if outcome.is_success() => StatusCode::OK,
        SubmitOutcome::Invalid { .. } => StatusCode::BAD_REQUEST,
        SubmitOutcome::Busy => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    };
    let notice = notices.latest().cloned();
    (status, Json(SubmitResponse { outcome, notice })).into_response()
}

/// A body that is not a draft at all gets the same shape as a draft that fails its rules.
fn unreadable_body(rejection: JsonRejection) -> axum::response::Response {
    tracing::debug!(error = %rejection.body_text(), "rejected lead body");
    let errors = FieldErrors::single("body", rejection.body_text());
    let mut notices = NoticeQueue::new();
    notices.push(Notice::validation(&errors));
    outcome_response(SubmitOutcome::Invalid { errors }, notices)
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContactDraft>, JsonRejection>,
) -> impl IntoResponse {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(rejection),
    };
    let mut form = FormState::with_draft(draft);
    let mut notices = NoticeQueue::new();
    let outcome = flow::submit_contact(&mut form, &state.client, &mut notices).await;
    outcome_response(outcome, notices)
}

async fn submit_kundli(
    State(state): State<Arc<AppState>>,
    body: Result<Json<KundliDraft>, JsonRejection>,
) -> impl IntoResponse {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return unreadable_body(rejection),
    };
    let mut form = FormState::with_draft(draft);
    let mut notices = NoticeQueue::new();
    let outcome = flow::submit_kundli(
        &mut form,
        &state.client,
        &state.messaging,
        state.opener.as_ref(),
        Local::now().naive_local(),
        &mut notices,
    )
    .await;
    outcome_response(outcome, notices)
}

pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/leads/schema", get(lead_schema))
        .route("/api/contact", post(submit_contact))
        .route("/api/kundli", post(submit_kundli))
        .with_state(state)
}
