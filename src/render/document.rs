//! Deterministic document renderer.
//!
//! Builds the canonical markdown briefing for one project. Total function:
//! missing optional fields render with defaults and the output is
//! byte-identical for identical input and timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::meeting::extract_meeting_details;
use crate::triage::{triage_groups, TriagedIssue};
use crate::types::{Document, Issue, IssueGroup, ProjectDocumentInput};

/// Fixed placeholder for fields not yet filled in.
pub const PLACEHOLDER: &str = "(TBD)";
/// Note marker appended after meeting blocks and minutes items.
pub const NOTE_MARKER: &str = "  - Notes: (TBD)";
/// Annotation for today-items that are due today.
pub const DUE_TODAY_MARKER: &str = "**[due today]**";
/// Minutes section heading; the email body drops this section.
pub const MINUTES_HEADING: &str = "## Minutes";

const TODAY_HEADING: &str = "## Working today";
const OVERDUE_HEADING: &str = "## Overdue";
const DUE_TODAY_HEADING: &str = "## Due today";

/// Render the canonical briefing document for one project.
pub fn render_document(input: &ProjectDocumentInput, generated_at: DateTime<Tz>) -> Document {
    let date = generated_at.date_naive();
    let mut out = String::with_capacity(8_192);

    // Header
    out.push_str(&format!(
        "# Daily Report - {} - {}\n\n",
        generated_at.format("%Y-%m-%d (%a)"),
        input.project_name
    ));
    out.push_str(&format!(
        "Generated at: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M %Z")
    ));

    // Summary
    let counts = input.category_counts();
    out.push_str("## Summary\n\n");
    out.push_str("| Category | Count |\n");
    out.push_str("| --- | --- |\n");
    out.push_str(&format!("| Working today | {} |\n", counts.today));
    out.push_str(&format!("| Overdue | {} |\n", counts.incomplete));
    out.push_str(&format!("| Due today | {} |\n", counts.due_today));
    out.push('\n');

    // Listing sections, emitted only when non-empty
    push_listing_section(&mut out, TODAY_HEADING, &input.today);
    push_listing_section(&mut out, OVERDUE_HEADING, &input.incomplete);
    push_listing_section(&mut out, DUE_TODAY_HEADING, &input.due_today);

    push_meetings_section(&mut out, input);

    // The minutes section goes last. Its offset is recorded on the document
    // so the email formatter can drop it without scanning content that may
    // contain a look-alike heading inside a pasted issue body.
    let mut content = out.trim_end().to_string();
    let mut minutes_offset = None;
    if let Some(section) = minutes_section(input, date) {
        content.push_str("\n\n");
        minutes_offset = Some(content.len());
        content.push_str(section.trim_end());
    }
    content.push('\n');

    Document {
        project_key: input.project_key.clone(),
        project_name: input.project_name.clone(),
        file_name: document_file_name(&input.project_key, date),
        content,
        minutes_offset,
    }
}

/// Find the minutes heading on its own line. Used for documents whose
/// minutes position was not recorded at render time, such as service output.
pub(crate) fn find_minutes_offset(markdown: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(offset) = markdown[search..].find(MINUTES_HEADING) {
        let pos = search + offset;
        let at_line_start = pos == 0 || markdown.as_bytes()[pos - 1] == b'\n';
        let line_end = markdown[pos..]
            .find('\n')
            .map(|o| pos + o)
            .unwrap_or(markdown.len());
        if at_line_start && markdown[pos..line_end].trim() == MINUTES_HEADING {
            return Some(pos);
        }
        search = pos + MINUTES_HEADING.len();
    }
    None
}

/// `daily-report-<project key>-<date>.md`
pub fn document_file_name(project_key: &str, date: NaiveDate) -> String {
    format!("daily-report-{}-{}.md", project_key, date.format("%Y-%m-%d"))
}

// =============================================================================
// Listing sections
// =============================================================================

fn push_listing_section(out: &mut String, heading: &str, groups: &[IssueGroup]) {
    if groups.iter().all(|g| g.issues.is_empty()) {
        return;
    }
    out.push_str(heading);
    out.push_str("\n\n");
    for group in groups {
        if group.issues.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n\n", group.assignee_name));
        out.push_str("| Key | Title | Status | Start | Due | Priority | Categories | Link |\n");
        out.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for issue in &group.issues {
            out.push_str(&issue_table_row(issue));
        }
        out.push('\n');
        for issue in &group.issues {
            if !issue.body.trim().is_empty() {
                out.push_str(issue.body.trim());
                out.push_str("\n\n");
            }
        }
    }
}

fn issue_table_row(issue: &Issue) -> String {
    let date_cell = |d: Option<NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let categories = if issue.categories.is_empty() {
        "-".to_string()
    } else {
        issue.categories.join(", ")
    };
    format!(
        "| {} | {} | {} | {} | {} | {} | {} | [{}]({}) |\n",
        cell(&issue.key),
        cell(&issue.title),
        cell(issue.status.as_str()),
        date_cell(issue.start_date),
        date_cell(issue.due_date),
        cell(issue.priority.as_deref().unwrap_or("-")),
        cell(&categories),
        cell(&issue.key),
        link_url(&issue.url),
    )
}

/// Keep free-form text from breaking the pipe table.
fn cell(text: &str) -> String {
    text.replace('|', "/").replace(['\r', '\n'], " ")
}

/// Keep URLs from breaking the table or link markup that carries them.
/// A pipe is percent-encoded so the address stays usable.
fn link_url(url: &str) -> String {
    url.replace('|', "%7C").replace(['\r', '\n'], "")
}

// =============================================================================
// Meetings
// =============================================================================

fn push_meetings_section(out: &mut String, input: &ProjectDocumentInput) {
    if input.meetings.is_empty() {
        return;
    }
    out.push_str("## Meetings\n\n");
    for meeting in &input.meetings {
        let details = extract_meeting_details(&meeting.body, &input.roster);
        out.push_str(&format!("### {}\n\n", meeting.title));
        if let Some(purpose) = &details.purpose {
            out.push_str(&format!("- Purpose: {}\n", purpose));
        }
        if let Some(when) = &details.scheduled_at {
            out.push_str(&format!("- When: {}\n", when));
        }
        if !details.internal_participants.is_empty() {
            out.push_str(&format!(
                "- Internal: {}\n",
                details.internal_participants.join(", ")
            ));
        }
        if !details.external_participants.is_empty() {
            out.push_str(&format!(
                "- External: {}\n",
                details.external_participants.join(", ")
            ));
        }
        if let Some(url) = &details.meeting_url {
            out.push_str(&format!("- Meeting link: {}\n", url));
        }
        out.push_str(&format!(
            "- Issue: [{}]({})\n",
            cell(&meeting.key),
            link_url(&meeting.url)
        ));
        out.push_str(NOTE_MARKER);
        out.push_str("\n\n");
    }
}

// =============================================================================
// Minutes
// =============================================================================

#[derive(Default)]
struct AssigneeMinutes<'a> {
    action_required: Vec<&'a TriagedIssue<'a>>,
    waiting_on_other: Vec<&'a TriagedIssue<'a>>,
    today: Vec<&'a Issue>,
}

fn minutes_section(input: &ProjectDocumentInput, date: NaiveDate) -> Option<String> {
    let triaged = triage_groups(&input.incomplete, &input.delays);

    let mut per_assignee: BTreeMap<&str, AssigneeMinutes> = BTreeMap::new();
    for item in &triaged.action_required {
        per_assignee
            .entry(item.assignee_name)
            .or_default()
            .action_required
            .push(item);
    }
    for item in &triaged.waiting_on_other {
        per_assignee
            .entry(item.assignee_name)
            .or_default()
            .waiting_on_other
            .push(item);
    }
    for group in &input.today {
        for issue in &group.issues {
            per_assignee
                .entry(&group.assignee_name)
                .or_default()
                .today
                .push(issue);
        }
    }
    if per_assignee.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(1_024);
    out.push_str(MINUTES_HEADING);
    out.push_str("\n\n");
    for (assignee, minutes) in &per_assignee {
        out.push_str(&format!("### {}\n\n", assignee));
        for item in &minutes.action_required {
            out.push_str(&format!(
                "- [Action required] {}: {} ({})\n",
                cell(&item.issue.key),
                cell(&item.issue.title),
                action_required_fields(item)
            ));
            out.push_str(NOTE_MARKER);
            out.push('\n');
        }
        for item in &minutes.waiting_on_other {
            out.push_str(&format!(
                "- [Waiting] {}: {} ({})\n",
                cell(&item.issue.key),
                cell(&item.issue.title),
                waiting_fields(item)
            ));
            out.push_str(NOTE_MARKER);
            out.push('\n');
        }
        for issue in &minutes.today {
            let due_marker = if issue.due_date == Some(date) {
                format!(" {}", DUE_TODAY_MARKER)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "- [Today] {}: {}{}\n",
                cell(&issue.key),
                cell(&issue.title),
                due_marker
            ));
            out.push_str(NOTE_MARKER);
            out.push('\n');
        }
        out.push('\n');
    }
    Some(out)
}

/// Action-required items always show all four delay fields, placeholder-filled.
fn action_required_fields(item: &TriagedIssue) -> String {
    let delay = item.delay;
    let cause = delay
        .and_then(|d| d.reason)
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let holder = field_or_placeholder(delay.and_then(|d| d.ball_holder.as_deref()));
    let next = field_or_placeholder(delay.and_then(|d| d.next_action.as_deref()));
    let eta = delay
        .and_then(|d| d.expected_completion)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    format!(
        "cause: {} / holder: {} / next: {} / ETA: {}",
        cause, holder, next, eta
    )
}

/// Waiting items never show next-action or expected-completion, not even as
/// placeholders; they get a generic status slot instead.
fn waiting_fields(item: &TriagedIssue) -> String {
    let delay = item.delay;
    let cause = delay
        .and_then(|d| d.reason)
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let holder = field_or_placeholder(delay.and_then(|d| d.ball_holder.as_deref()));
    format!("cause: {} / holder: {} / status: {}", cause, holder, PLACEHOLDER)
}

fn field_or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}
