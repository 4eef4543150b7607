//! Fallback delivery of Kundli leads and the direct-contact links.
//!
//! After a Kundli request passes validation the lead is also handed to WhatsApp as a
//! pre-filled chat, whether or not the backend accepted it.

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::config::{BusinessConfig, MessagingConfig};
use crate::leads::KundliSubmission;

pub mod whatsapp;

/// Opens a URL in whatever handles it on this machine (browser, WhatsApp desktop, ...).
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;

    /// Whether `open` actually launches anything on this machine.
    fn launches(&self) -> bool {
        true
    }
}

pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url)?;
        Ok(())
    }
}

/// Leaves the link for the caller to present.
pub struct NoopOpener;

impl LinkOpener for NoopOpener {
    fn open(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    fn launches(&self) -> bool {
        false
    }
}

pub fn opener_for(open_links: bool) -> Box<dyn LinkOpener> {
    if open_links {
        Box::new(SystemOpener)
    } else {
        Box::new(NoopOpener)
    }
}

/// Builds the pre-filled chat link for `request` and tries to open it.
///
/// A failure to open (no handler, blocked pop-up) is logged and otherwise ignored; the
/// link is returned either way.
pub fn deliver_kundli(
    request: &KundliSubmission,
    submitted_at: NaiveDateTime,
    messaging: &MessagingConfig,
    opener: &dyn LinkOpener,
) -> String {
    let message = whatsapp::kundli_message(request, submitted_at, &messaging.source_label);
    let url = whatsapp::deep_link(&messaging.whatsapp_number, &message);

    if !opener.launches() {
        tracing::debug!("leaving WhatsApp deep link to the caller");
        return url;
    }

    match opener.open(&url) {
        Ok(()) => tracing::info!(service = request.service_type.code(), "opened WhatsApp deep link"),
        Err(err) => tracing::warn!(error = %err, "could not open WhatsApp deep link"),
    }

    url
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLinks {
    pub call: String,
    pub whatsapp: String,
    pub email: String,
}

pub fn tel_link(phone: &str) -> String {
    let dialable: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{dialable}")
}

pub fn mailto_link(email: &str) -> String {
    format!("mailto:{}", email.trim())
}

pub fn contact_links(business: &BusinessConfig, messaging: &MessagingConfig) -> ContactLinks {
    ContactLinks {
        call: tel_link(&business.phone),
        whatsapp: whatsapp::chat_link(&messaging.whatsapp_number),
        email: mailto_link(&business.email),
    }
}
