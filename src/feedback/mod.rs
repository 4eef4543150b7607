//! User-facing notices for a submit attempt.
//!
//! Flows push notices onto a [`NoticeQueue`] owned by the caller; the terminal and the
//! local web API each render the queue their own way.

use std::collections::VecDeque;

use serde::Serialize;

use crate::leads::schema::FieldErrors;

pub mod cli;

pub const CONTACT_SENT_TITLE: &str = "Message Sent!";
pub const CONTACT_SENT_DEFAULT: &str =
    "Thank you for your message! We'll get back to you soon.";
pub const CONTACT_FAILED: &str = "Failed to send message. Please try again.";
pub const KUNDLI_SENT_TITLE: &str = "Request Submitted Successfully! 🎉";
pub const KUNDLI_SENT_BODY: &str =
    "Opening WhatsApp to send your Kundli request details...";
pub const VALIDATION_BODY: &str = "Please fill in all required fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
            details: Vec::new(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
            details: Vec::new(),
        }
    }

    pub fn validation(errors: &FieldErrors) -> Self {
        let mut notice = Self::error("Validation Error", VALIDATION_BODY);
        notice.details = errors.iter().map(|(_, message)| message.to_string()).collect();
        notice
    }

    pub fn contact_sent(server_message: Option<&str>) -> Self {
        Self::success(
            CONTACT_SENT_TITLE,
            server_message.unwrap_or(CONTACT_SENT_DEFAULT),
        )
    }

    pub fn contact_failed() -> Self {
        Self::error("Error", CONTACT_FAILED)
    }

    pub fn kundli_sent() -> Self {
        Self::success(KUNDLI_SENT_TITLE, KUNDLI_SENT_BODY)
    }

    pub fn busy() -> Self {
        Self::error("Please wait", "Your previous submission is still being sent.")
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Notice> + '_ {
        self.notices.drain(..)
    }
}
