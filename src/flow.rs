//! Submit flows for the two lead forms.
//!
//! Contact: validate, post, report. A failed post is a failed attempt and the form keeps its
//! values for a manual retry.
//!
//! Kundli: validate, post, then always hand the lead to WhatsApp. A failed post is only
//! logged; the lead still reaches the shop through the chat link, so the attempt succeeds.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::LeadClient;
use crate::config::MessagingConfig;
use crate::feedback::{Notice, NoticeQueue};
use crate::leads::form::{FormState, SubmitBlocked};
use crate::leads::schema::FieldErrors;
use crate::leads::{ContactDraft, KundliDraft, LeadDraft, LeadTarget};
use crate::notify::{self, LinkOpener};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Contact lead accepted by the backend.
    Sent { message: String },
    /// Kundli lead handed to WhatsApp; `backend_accepted` records whether the post also landed.
    Submitted {
        message: String,
        whatsapp_url: String,
        backend_accepted: bool,
    },
    Invalid { errors: FieldErrors },
    Failed { message: String },
    Busy,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Sent { .. } | SubmitOutcome::Submitted { .. }
        )
    }
}

fn blocked<D: LeadDraft>(blocked: SubmitBlocked, notices: &mut NoticeQueue) -> SubmitOutcome {
    match blocked {
        SubmitBlocked::InFlight => {
            tracing::debug!(form = D::TARGET.as_str(), "submit ignored while in flight");
            notices.push(Notice::busy());
            SubmitOutcome::Busy
        }
        SubmitBlocked::Invalid(errors) => {
            tracing::info!(
                form = D::TARGET.as_str(),
                fields = errors.len(),
                "submission rejected by validation"
            );
            notices.push(Notice::validation(&errors));
            SubmitOutcome::Invalid { errors }
        }
    }
}

pub async fn submit_contact(
    form: &mut FormState<ContactDraft>,
    client: &LeadClient,
    notices: &mut NoticeQueue,
) -> SubmitOutcome {
    let submission = match form.begin_submit() {
        Ok(submission) => submission,
        Err(err) => return blocked::<ContactDraft>(err, notices),
    };

    tracing::info!(service = submission.service.code(), "submitting contact lead");
    match client.submit(LeadTarget::Contact, &submission).await {
        Ok(response) => {
            let notice = Notice::contact_sent(response.confirmation());
            let message = notice.description.clone();
            notices.push(notice);
            form.finish(true);
            SubmitOutcome::Sent { message }
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                transport = err.is_transport(),
                "contact submission failed"
            );
            let notice = Notice::contact_failed();
            let message = notice.description.clone();
            notices.push(notice);
            form.finish(false);
            SubmitOutcome::Failed { message }
        }
    }
}

pub async fn submit_kundli(
    form: &mut FormState<KundliDraft>,
    client: &LeadClient,
    messaging: &MessagingConfig,
    opener: &dyn LinkOpener,
    submitted_at: NaiveDateTime,
    notices: &mut NoticeQueue,
) -> SubmitOutcome {
    let request = match form.begin_submit() {
        Ok(request) => request,
        Err(err) => return blocked::<KundliDraft>(err, notices),
    };

    tracing::info!(service = request.service_type.code(), "submitting kundli lead");
    let backend_accepted = match client.submit(LeadTarget::Kundli, &request).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "backend unavailable, continuing with WhatsApp-only delivery"
            );
            false
        }
    };

    let whatsapp_url = notify::deliver_kundli(&request, submitted_at, messaging, opener);
    let notice = Notice::kundli_sent();
    let message = notice.description.clone();
    notices.push(notice);
    form.finish(true);

    SubmitOutcome::Submitted {
        message,
        whatsapp_url,
        backend_accepted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{closed_addr, spawn_server};
    use crate::config::Config;
    use crate::feedback::{CONTACT_FAILED, KUNDLI_SENT_TITLE};
    use crate::leads::fixtures::{contact_draft, kundli_draft};
    use crate::leads::form::{AttemptResult, FormPhase};
    use crate::notify::test_support::RecordingOpener;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn counting_backend(path: &'static str, status: StatusCode, hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            path,
            post(move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (status, Json(serde_json::json!({ "message": "Thanks!" })))
                }
            }),
        )
    }

    #[tokio::test]
    async fn contact_success_shows_server_message_and_resets() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (addr, handle) =
            spawn_server(counting_backend("/api/contact", StatusCode::OK, Arc::clone(&hits))).await;
        let client = LeadClient::with_url(format!("http://{addr}"));

        let mut form = FormState::with_draft(contact_draft());
        let mut notices = NoticeQueue::new();
        let outcome = submit_contact(&mut form, &client, &mut notices).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Sent {
                message: "Thanks!".to_string()
            }
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(notices.latest().unwrap().description, "Thanks!");
        assert_eq!(form.draft(), &ContactDraft::default());
        assert_eq!(form.phase(), FormPhase::Idle);

        handle.abort();
    }

    #[tokio::test]
    async fn contact_failure_keeps_values_and_reports_error() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (addr, handle) = spawn_server(counting_backend(
            "/api/contact",
            StatusCode::SERVICE_UNAVAILABLE,
            Arc::clone(&hits),
        ))
        .await;
        let client = LeadClient::with_url(format!("http://{addr}"));

        let mut form = FormState::with_draft(contact_draft());
        let mut notices = NoticeQueue::new();
        let outcome = submit_contact(&mut form, &client, &mut notices).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: CONTACT_FAILED.to_string()
            }
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!notices.latest().unwrap().is_success());
        assert_eq!(form.draft(), &contact_draft());
        assert_eq!(form.last_attempt(), Some(AttemptResult::Failed));

        handle.abort();
    }

    #[tokio::test]
    async fn contact_missing_fields_never_reach_the_network() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (addr, handle) =
            spawn_server(counting_backend("/api/contact", StatusCode::OK, Arc::clone(&hits))).await;
        let client = LeadClient::with_url(format!("http://{addr}"));

        for field in ["name", "email", "phone", "service"] {
            let mut form = FormState::with_draft(contact_draft());
            form.update(field, "").unwrap();
            let mut notices = NoticeQueue::new();

            let outcome = submit_contact(&mut form, &client, &mut notices).await;
            assert!(matches!(outcome, SubmitOutcome::Invalid { .. }), "{field}");
            assert_eq!(notices.latest().unwrap().title, "Validation Error");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn kundli_backend_down_still_delivers_via_whatsapp() {
        let addr = closed_addr().await;
        let client = LeadClient::with_url(format!("http://{addr}"));
        let config = Config::default();
        let opener = RecordingOpener::default();

        let mut form = FormState::with_draft(kundli_draft());
        let mut notices = NoticeQueue::new();
        let outcome =
            submit_kundli(&mut form, &client, &config.messaging, &opener, at(), &mut notices).await;

        let (whatsapp_url, backend_accepted) = match outcome {
            SubmitOutcome::Submitted {
                whatsapp_url,
                backend_accepted,
                ..
            } => (whatsapp_url, backend_accepted),
            other => panic!("expected a submitted outcome, got {other:?}"),
        };
        assert!(!backend_accepted);
        assert!(whatsapp_url.starts_with("https://wa.me/919660306030?text="));
        assert!(whatsapp_url.contains("Marriage%20Compatibility%20Analysis"));
        assert_eq!(opener.urls(), vec![whatsapp_url]);
        assert_eq!(notices.latest().unwrap().title, KUNDLI_SENT_TITLE);
        assert!(notices.latest().unwrap().is_success());
        assert_eq!(form.draft(), &KundliDraft::default());
    }

    #[tokio::test]
    async fn kundli_backend_up_also_opens_the_link() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (addr, handle) =
            spawn_server(counting_backend("/api/kundli", StatusCode::OK, Arc::clone(&hits))).await;
        let client = LeadClient::with_url(format!("http://{addr}"));
        let config = Config::default();
        let opener = RecordingOpener::blocked();

        let mut form = FormState::with_draft(kundli_draft());
        let mut notices = NoticeQueue::new();
        let outcome =
            submit_kundli(&mut form, &client, &config.messaging, &opener, at(), &mut notices).await;

        assert!(outcome.is_success());
        assert!(matches!(
            outcome,
            SubmitOutcome::Submitted {
                backend_accepted: true,
                ..
            }
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(opener.urls().len(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn kundli_invalid_opens_nothing() {
        let addr = closed_addr().await;
        let client = LeadClient::with_url(format!("http://{addr}"));
        let config = Config::default();
        let opener = RecordingOpener::default();

        let mut form = FormState::with_draft(kundli_draft());
        form.update("name", "P").unwrap();
        let mut notices = NoticeQueue::new();
        let outcome =
            submit_kundli(&mut form, &client, &config.messaging, &opener, at(), &mut notices).await;

        let SubmitOutcome::Invalid { errors } = outcome else {
            panic!("expected invalid outcome");
        };
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert!(opener.urls().is_empty());
        assert_eq!(form.draft().name, "P");
    }

    #[tokio::test]
    async fn submit_while_in_flight_is_refused() {
        let addr = closed_addr().await;
        let client = LeadClient::with_url(format!("http://{addr}"));

        let mut form = FormState::with_draft(contact_draft());
        form.begin_submit().unwrap();
        let mut notices = NoticeQueue::new();
        let outcome = submit_contact(&mut form, &client, &mut notices).await;

        assert_eq!(outcome, SubmitOutcome::Busy);
        assert!(form.is_busy());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = SubmitOutcome::Sent {
            message: "Thanks!".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "sent");
        assert_eq!(json["message"], "Thanks!");
    }
}
