//! Delay triage for overdue issues.
//!
//! Sub-classifies every "incomplete" issue into action-required vs
//! waiting-on-other. Classification is a pure function of the delay cause
//! alone; a missing `DelayInfo` means "action-required, no detail yet".

use std::collections::HashMap;

use crate::types::{DelayCause, DelayInfo, Issue, IssueGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageCategory {
    ActionRequired,
    WaitingOnOther,
}

/// Classify one issue's delay detail.
pub fn triage(delay: Option<&DelayInfo>) -> TriageCategory {
    match delay.and_then(|d| d.reason) {
        None
        | Some(DelayCause::SelfCaused)
        | Some(DelayCause::SpecificationChange)
        | Some(DelayCause::Interruption) => TriageCategory::ActionRequired,
        Some(DelayCause::InternalWait) | Some(DelayCause::CustomerWait) => {
            TriageCategory::WaitingOnOther
        }
    }
}

/// An incomplete issue paired with its triage verdict and delay detail.
#[derive(Debug, Clone)]
pub struct TriagedIssue<'a> {
    pub issue: &'a Issue,
    pub assignee_name: &'a str,
    pub delay: Option<&'a DelayInfo>,
}

/// Incomplete issues split by triage category, preserving group order.
#[derive(Debug, Clone, Default)]
pub struct TriagedIssues<'a> {
    pub action_required: Vec<TriagedIssue<'a>>,
    pub waiting_on_other: Vec<TriagedIssue<'a>>,
}

/// Triage every issue in the incomplete groups, looking up delay detail by
/// issue key.
pub fn triage_groups<'a>(
    groups: &'a [IssueGroup],
    delays: &'a HashMap<String, DelayInfo>,
) -> TriagedIssues<'a> {
    let mut triaged = TriagedIssues::default();
    for group in groups {
        for issue in &group.issues {
            let delay = delays.get(&issue.key);
            let item = TriagedIssue {
                issue,
                assignee_name: &group.assignee_name,
                delay,
            };
            match triage(delay) {
                TriageCategory::ActionRequired => triaged.action_required.push(item),
                TriageCategory::WaitingOnOther => triaged.waiting_on_other.push(item),
            }
        }
    }
    triaged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Status, UNASSIGNED_LABEL};

    fn delay(reason: Option<DelayCause>) -> DelayInfo {
        DelayInfo {
            reason,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_delay_info_is_action_required() {
        assert_eq!(triage(None), TriageCategory::ActionRequired);
    }

    #[test]
    fn test_reasonless_delay_info_is_action_required() {
        assert_eq!(triage(Some(&delay(None))), TriageCategory::ActionRequired);
    }

    #[test]
    fn test_self_attributable_causes_are_action_required() {
        for cause in [
            DelayCause::SelfCaused,
            DelayCause::SpecificationChange,
            DelayCause::Interruption,
        ] {
            assert_eq!(
                triage(Some(&delay(Some(cause)))),
                TriageCategory::ActionRequired,
                "{:?}",
                cause
            );
        }
    }

    #[test]
    fn test_blocked_causes_are_waiting_on_other() {
        for cause in [DelayCause::InternalWait, DelayCause::CustomerWait] {
            assert_eq!(
                triage(Some(&delay(Some(cause)))),
                TriageCategory::WaitingOnOther,
                "{:?}",
                cause
            );
        }
    }

    #[test]
    fn test_triage_groups_splits_by_cause() {
        let issue = |key: &str| Issue {
            key: key.to_string(),
            title: key.to_string(),
            body: String::new(),
            status: Status::InProgress,
            assignee: None,
            start_date: None,
            due_date: None,
            priority: None,
            categories: vec![],
            url: String::new(),
            project_key: "PRJ".to_string(),
        };
        let groups = vec![IssueGroup {
            assignee_name: UNASSIGNED_LABEL.to_string(),
            assignee_id: None,
            issues: vec![issue("PRJ-1"), issue("PRJ-2"), issue("PRJ-3")],
        }];
        let mut delays = HashMap::new();
        delays.insert("PRJ-2".to_string(), delay(Some(DelayCause::CustomerWait)));

        let triaged = triage_groups(&groups, &delays);
        let action: Vec<_> = triaged
            .action_required
            .iter()
            .map(|t| t.issue.key.as_str())
            .collect();
        let waiting: Vec<_> = triaged
            .waiting_on_other
            .iter()
            .map(|t| t.issue.key.as_str())
            .collect();
        assert_eq!(action, vec!["PRJ-1", "PRJ-3"]);
        assert_eq!(waiting, vec!["PRJ-2"]);
    }
}
