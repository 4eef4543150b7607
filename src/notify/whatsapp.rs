//! Pre-filled WhatsApp message for a Kundli request.

use chrono::NaiveDateTime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::leads::KundliSubmission;

/// Characters left as-is by a browser's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const WA_BASE: &str = "https://wa.me/";

/// Local time the way the site's visitors (en-IN) read it: `21/03/2025, 6:05:09 pm`.
pub fn format_submitted_at(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y, %-I:%M:%S %P").to_string()
}

pub fn kundli_message(
    request: &KundliSubmission,
    submitted_at: NaiveDateTime,
    source_label: &str,
) -> String {
    let additional = match request.additional_requests.as_deref() {
        Some(text) if !text.is_empty() => {
            format!("💬 *Additional Requests:*\n{text}\n")
        }
        _ => String::new(),
    };

    format!(
        "🪐 *New Kundli Service Request*\n\
         \n\
         👤 *Personal Details:*\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Gender: {gender}\n\
         \n\
         🎂 *Birth Information:*\n\
         Date of Birth: {dob}\n\
         Time of Birth: {tob}\n\
         Place of Birth: {place}, {state}, {country}\n\
         \n\
         🔮 *Service Requested:*\n\
         {service}\n\
         \n\
         {additional}\n\
         ---\n\
         📅 *Submitted:* {submitted}\n\
         🌐 *Source:* {source_label}",
        name = request.name,
        email = request.email,
        phone = request.phone,
        gender = request.gender.display(),
        dob = request.date_of_birth,
        tob = request.time_of_birth,
        place = request.place_of_birth,
        state = request.state,
        country = request.country,
        service = request.service_type.label(),
        submitted = format_submitted_at(submitted_at),
    )
}

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

pub fn digits_only(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

/// Chat link with no pre-filled text.
pub fn chat_link(number: &str) -> String {
    format!("{WA_BASE}{}", digits_only(number))
}

/// Chat link carrying `message` as its pre-filled text.
pub fn deep_link(number: &str, message: &str) -> String {
    format!("{}?text={}", chat_link(number), encode_component(message))
}
