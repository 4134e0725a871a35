//! Issue classification and assignee grouping.
//!
//! Splits raw issues into the three report categories and buckets each
//! category by assignee. The rules are evaluated independently, so one issue
//! can land in more than one category; that is expected and each section
//! renders it once.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{Issue, IssueGroup};

/// The three report categories, grouped by assignee.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedIssues {
    /// start <= today <= due
    pub today: Vec<IssueGroup>,
    /// start < today and status not terminal
    pub incomplete: Vec<IssueGroup>,
    /// due == today
    pub due_today: Vec<IssueGroup>,
}

/// Classify raw issues against the organization-local calendar day.
///
/// The caller resolves `today` in the organization's timezone; classification
/// itself is a pure date comparison.
pub fn classify_issues(issues: &[Issue], today: NaiveDate) -> ClassifiedIssues {
    ClassifiedIssues {
        today: group_by_assignee(issues.iter().filter(|i| is_active_today(i, today))),
        incomplete: group_by_assignee(issues.iter().filter(|i| is_incomplete(i, today))),
        due_today: group_by_assignee(issues.iter().filter(|i| is_due_today(i, today))),
    }
}

fn is_active_today(issue: &Issue, today: NaiveDate) -> bool {
    match (issue.start_date, issue.due_date) {
        (Some(start), Some(due)) => start <= today && today <= due,
        _ => false,
    }
}

fn is_due_today(issue: &Issue, today: NaiveDate) -> bool {
    issue.due_date == Some(today)
}

fn is_incomplete(issue: &Issue, today: NaiveDate) -> bool {
    match issue.start_date {
        Some(start) => start < today && !issue.status.is_terminal(),
        None => false,
    }
}

/// Bucket issues by assignee display name, name-sorted for determinism.
/// Issues keep their input order within each bucket.
pub fn group_by_assignee<'a, I>(issues: I) -> Vec<IssueGroup>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let mut buckets: BTreeMap<String, IssueGroup> = BTreeMap::new();
    for issue in issues {
        let name = issue.assignee_name().to_string();
        let group = buckets.entry(name.clone()).or_insert_with(|| IssueGroup {
            assignee_name: name,
            assignee_id: issue.assignee.as_ref().and_then(|a| a.id.clone()),
            issues: Vec::new(),
        });
        group.issues.push(issue.clone());
    }
    buckets.into_values().collect()
}
