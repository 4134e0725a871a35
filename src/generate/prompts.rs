//! Prompt construction for the AI-assisted renderer.
//!
//! The generation prompt carries a size-reduced copy of the classified input
//! (issue bodies dropped) and pins down the exact document structure. The
//! validation prompt carries the produced document plus the locally computed
//! counts and demands a one-word verdict.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::types::{CategoryCounts, ProjectDocumentInput};

/// Build the document-generation prompt.
pub fn build_generation_prompt(input: &ProjectDocumentInput, generated_at: DateTime<Tz>) -> String {
    let payload = reduced_input_json(input);
    let counts = input.category_counts();
    let mut prompt = String::with_capacity(8_192);

    prompt.push_str("You are a project assistant writing a daily status briefing in markdown.\n\n");
    prompt.push_str("# Task\n\n");
    prompt.push_str(&format!(
        "Generate the daily report for **{}** dated {}.\n\n",
        input.project_name,
        generated_at.format("%Y-%m-%d (%a)")
    ));

    prompt.push_str("# Input Data (JSON)\n\n");
    prompt.push_str(&serde_json::to_string_pretty(&payload).unwrap_or_default());
    prompt.push_str("\n\n");

    prompt.push_str("# Output Format\n\n");
    prompt.push_str(&format!(
        "- Title line: `# Daily Report - {} - {}` followed by a `Generated at: {}` line.\n",
        generated_at.format("%Y-%m-%d (%a)"),
        input.project_name,
        generated_at.format("%Y-%m-%d %H:%M %Z")
    ));
    prompt.push_str(&format!(
        "- A `## Summary` pipe table with exactly these counts: Working today = {}, Overdue = {}, Due today = {}.\n",
        counts.today, counts.incomplete, counts.due_today
    ));
    prompt.push_str(
        "- For each non-empty category, a section (`## Working today`, `## Overdue`, `## Due today`) \
with one `### <assignee>` heading per assignee and a table of key, title, status, start, due, \
priority, categories, link.\n",
    );
    prompt.push_str("- A `## Meetings` section when meeting issues exist.\n");
    prompt.push_str(
        "- A `## Minutes` section with one `### <assignee>` heading per assignee, listing their \
action-required, waiting, and today items, each followed by `  - Notes: (TBD)`.\n\n",
    );

    prompt.push_str("# Writing Rules\n\n");
    prompt.push_str("1. Respond with ONLY the markdown document. No commentary.\n");
    prompt.push_str("2. Do NOT wrap the document in markdown code fences.\n");
    prompt.push_str("3. Use the summary counts given above verbatim; do not recount.\n");
    prompt.push_str("4. Keep assignee sections sorted by name.\n");

    prompt
}

/// Build the count-validation prompt. The expected counts are computed
/// locally and never read back out of the generated text.
pub fn build_validation_prompt(document: &str, expected: &CategoryCounts) -> String {
    let mut prompt = String::with_capacity(document.len() + 512);
    prompt.push_str("Below is a markdown status report. Check ONLY its Summary table.\n\n");
    prompt.push_str(&format!(
        "The Summary table must show exactly: Working today = {}, Overdue = {}, Due today = {}.\n\n",
        expected.today, expected.incomplete, expected.due_today
    ));
    prompt.push_str("Answer with exactly one word: VALID if every count matches, INVALID otherwise.\n\n");
    prompt.push_str("# Report\n\n");
    prompt.push_str(document);
    prompt
}

/// Size-reduced copy of the input: issue bodies are dropped to keep the
/// payload small, everything else passes through.
pub(crate) fn reduced_input_json(input: &ProjectDocumentInput) -> serde_json::Value {
    let mut reduced = input.clone();
    for group in reduced
        .today
        .iter_mut()
        .chain(reduced.incomplete.iter_mut())
        .chain(reduced.due_today.iter_mut())
    {
        for issue in &mut group.issues {
            issue.body.clear();
        }
    }
    serde_json::to_value(&reduced).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Issue, IssueGroup, Status, UNASSIGNED_LABEL};
    use chrono::TimeZone;

    fn input_with_body() -> ProjectDocumentInput {
        let issue = Issue {
            key: "PRJ-1".to_string(),
            title: "Thing".to_string(),
            body: "a very long body that should not reach the prompt".to_string(),
            status: Status::Open,
            assignee: None,
            start_date: None,
            due_date: None,
            priority: None,
            categories: vec![],
            url: "https://tracker.example/PRJ-1".to_string(),
            project_key: "PRJ".to_string(),
        };
        ProjectDocumentInput {
            project_key: "PRJ".to_string(),
            project_name: "Acme Platform".to_string(),
            today: vec![IssueGroup {
                assignee_name: UNASSIGNED_LABEL.to_string(),
                assignee_id: None,
                issues: vec![issue],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_reduced_input_drops_bodies() {
        let json = reduced_input_json(&input_with_body());
        let body = json["today"][0]["issues"][0]["body"].as_str().unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_generation_prompt_embeds_counts_and_forbids_fences() {
        let at = chrono_tz::Asia::Tokyo
            .with_ymd_and_hms(2026, 8, 25, 7, 0, 0)
            .unwrap();
        let prompt = build_generation_prompt(&input_with_body(), at);
        assert!(prompt.contains("Working today = 1, Overdue = 0, Due today = 0"));
        assert!(prompt.contains("Do NOT wrap the document in markdown code fences"));
        assert!(!prompt.contains("a very long body"));
    }

    #[test]
    fn test_validation_prompt_demands_one_word_verdict() {
        let expected = CategoryCounts {
            today: 2,
            incomplete: 1,
            due_today: 0,
        };
        let prompt = build_validation_prompt("# Report body", &expected);
        assert!(prompt.contains("Working today = 2, Overdue = 1, Due today = 0"));
        assert!(prompt.contains("VALID"));
        assert!(prompt.contains("# Report body"));
    }
}
