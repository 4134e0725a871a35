//! Core data model for the briefing pipeline.
//!
//! Everything here is an immutable input or a generated output. The pipeline
//! carries no state between invocations, so none of these types persist.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Issues
// =============================================================================

/// Display label used when an issue has no assignee.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// A work item pulled from the upstream tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub title: String,
    /// Free-text description; may be empty.
    #[serde(default)]
    pub body: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub url: String,
    pub project_key: String,
}

impl Issue {
    /// Assignee display name, with the unassigned fallback.
    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or(UNASSIGNED_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// Tracker status, normalized from the free-form state string.
///
/// Unrecognized states round-trip through `Other` so upstream tracker
/// vocabulary never causes a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
    Closed,
    Cancelled,
    Other(String),
}

impl Status {
    /// Terminal states are excluded from the "incomplete" rule.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Closed | Status::Cancelled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
            Status::Closed => "Closed",
            Status::Cancelled => "Cancelled",
            Status::Other(s) => s,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        let normalised = raw.to_lowercase().replace([' ', '-'], "_");
        match normalised.as_str() {
            "open" | "todo" | "backlog" => Status::Open,
            "in_progress" | "started" | "doing" => Status::InProgress,
            "resolved" | "done" | "completed" => Status::Resolved,
            "closed" => Status::Closed,
            "cancelled" | "canceled" => Status::Cancelled,
            _ => Status::Other(raw),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Issues bucketed under one assignee, in input order.
///
/// Produced fresh by every classification pass; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueGroup {
    pub assignee_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    pub issues: Vec<Issue>,
}

// =============================================================================
// Delay enrichment
// =============================================================================

/// Why an incomplete issue slipped. Attached by the upstream enrichment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayCause {
    SelfCaused,
    SpecificationChange,
    Interruption,
    InternalWait,
    CustomerWait,
}

impl DelayCause {
    pub fn label(&self) -> &'static str {
        match self {
            DelayCause::SelfCaused => "Self-caused",
            DelayCause::SpecificationChange => "Specification change",
            DelayCause::Interruption => "Interruption",
            DelayCause::InternalWait => "Waiting on internal team",
            DelayCause::CustomerWait => "Waiting on customer",
        }
    }
}

/// Optional delay detail for an incomplete issue.
///
/// Absence of the whole record is meaningful: the item is treated as
/// action-required with no detail captured yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DelayCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_completion: Option<NaiveDate>,
}

// =============================================================================
// Document input / output
// =============================================================================

/// Everything needed to render one project's briefing.
///
/// Group lists arrive already classified (see `classify`); the same issue may
/// legitimately appear in more than one list and renders once per section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocumentInput {
    pub project_key: String,
    pub project_name: String,
    #[serde(default)]
    pub today: Vec<IssueGroup>,
    #[serde(default)]
    pub incomplete: Vec<IssueGroup>,
    #[serde(default)]
    pub due_today: Vec<IssueGroup>,
    /// Meeting-type issues, rendered in their own section.
    #[serde(default)]
    pub meetings: Vec<Issue>,
    /// Participant id -> display name, used to resolve meeting attendees.
    #[serde(default)]
    pub roster: HashMap<String, String>,
    /// Issue key -> delay detail for overdue triage.
    #[serde(default)]
    pub delays: HashMap<String, DelayInfo>,
}

impl ProjectDocumentInput {
    /// Raw per-category counts (a duplicated issue counts once per category).
    pub fn category_counts(&self) -> CategoryCounts {
        let count = |groups: &[IssueGroup]| groups.iter().map(|g| g.issues.len()).sum();
        CategoryCounts {
            today: count(&self.today),
            incomplete: count(&self.incomplete),
            due_today: count(&self.due_today),
        }
    }
}

/// Summary-table counts, always computed from the input, never parsed back
/// out of generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub today: usize,
    pub incomplete: usize,
    pub due_today: usize,
}

/// A rendered briefing for one project. Handed to delivery collaborators;
/// has no further lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub project_key: String,
    pub project_name: String,
    pub file_name: String,
    /// Canonical markdown, consumed by every channel converter.
    pub content: String,
    /// Byte offset of the minutes section within `content`, when present.
    /// Issue bodies are pasted verbatim into the listing sections, so a
    /// heading scan over `content` cannot tell a body line apart from the
    /// real section; the renderer records the position instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_offset: Option<usize>,
}
