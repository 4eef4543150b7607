//! Idempotency key helpers.
//!
//! Every submit attempt gets a fresh key so the backend can drop a duplicate POST
//! (for example a double-clicked button that slipped past the in-flight guard).

use uuid::Uuid;

use crate::leads::LeadTarget;

const KEY_PREFIX: &str = "lead-desk-";

pub fn new_lead_key(target: LeadTarget) -> String {
    format!("{KEY_PREFIX}{}-{}", target.as_str(), Uuid::new_v4().simple())
}
