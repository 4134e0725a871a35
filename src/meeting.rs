//! Meeting detail extraction.
//!
//! Meeting-type issues carry their details as `key: value` lines inside the
//! issue body. Extraction is lenient: unknown lines are ignored, participant
//! ids resolve through the roster with the raw id as fallback, and every
//! field is optional.

use std::collections::HashMap;

/// Parsed details for one meeting issue. Every field may be absent; the
/// renderer omits missing lines entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingDetails {
    pub purpose: Option<String>,
    pub scheduled_at: Option<String>,
    pub internal_participants: Vec<String>,
    pub external_participants: Vec<String>,
    pub meeting_url: Option<String>,
}

/// Extract meeting details from an issue body.
///
/// Recognized keys (case-insensitive): `purpose`, `when` / `datetime`,
/// `internal`, `external`, `meeting link` / `link`. Participant lists are
/// comma-separated ids or names; ids found in the roster are replaced with
/// display names.
pub fn extract_meeting_details(
    body: &str,
    roster: &HashMap<String, String>,
) -> MeetingDetails {
    let mut details = MeetingDetails::default();
    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_lowercase().as_str() {
            "purpose" => details.purpose = Some(value.to_string()),
            "when" | "datetime" => details.scheduled_at = Some(value.to_string()),
            "internal" => details.internal_participants = resolve_participants(value, roster),
            "external" => details.external_participants = resolve_participants(value, roster),
            "meeting link" | "link" => details.meeting_url = Some(value.to_string()),
            _ => {}
        }
    }
    details
}

fn resolve_participants(raw: &str, roster: &HashMap<String, String>) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| roster.get(p).cloned().unwrap_or_else(|| p.to_string()))
        .collect()
}
