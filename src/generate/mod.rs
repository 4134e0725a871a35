//! AI-assisted document renderer.
//!
//! Asks the generation service for the same canonical markdown the
//! deterministic renderer produces, then validates the result with a second
//! round-trip comparing the summary counts against locally computed expected
//! counts. The generate-then-validate cycle retries up to `MAX_ATTEMPTS`;
//! exhaustion or an unrecoverable error falls back to the deterministic
//! renderer. This path never returns an error to its caller.

pub mod llm;
pub mod prompts;

use chrono::DateTime;
use chrono_tz::Tz;

pub use llm::{GeminiConfig, GeminiGenerator, TextGenerator};

use crate::error::GenerateError;
use crate::render::document::{document_file_name, find_minutes_offset, render_document};
use crate::types::{CategoryCounts, Document, ProjectDocumentInput};

/// Bound on generate-then-validate cycles before falling back.
pub const MAX_ATTEMPTS: u32 = 3;

/// Why the deterministic fallback was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The service errored, returned nothing usable, or the network failed.
    ServiceError,
    /// The service produced a document that failed count validation.
    ValidationFailed,
    /// No credentials were available; generation was never attempted fully.
    MissingCredentials,
}

/// How the returned document was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated { attempts: u32 },
    Fallback { reason: FallbackReason },
}

/// Render one project's document via the generation service, falling back to
/// the deterministic renderer on exhaustion or unrecoverable error.
pub async fn generate_document(
    input: &ProjectDocumentInput,
    generated_at: DateTime<Tz>,
    generator: &dyn TextGenerator,
) -> (Document, GenerationOutcome) {
    let expected = input.category_counts();
    let mut reason = FallbackReason::ServiceError;

    for attempt in 1..=MAX_ATTEMPTS {
        match attempt_once(input, generated_at, generator, &expected).await {
            Ok(content) => {
                log::info!(
                    "project {}: document generated on attempt {}",
                    input.project_key,
                    attempt
                );
                let document = Document {
                    project_key: input.project_key.clone(),
                    project_name: input.project_name.clone(),
                    file_name: document_file_name(&input.project_key, generated_at.date_naive()),
                    minutes_offset: find_minutes_offset(&content),
                    content,
                };
                return (document, GenerationOutcome::Generated { attempts: attempt });
            }
            Err(err) if err.is_retryable() => {
                log::warn!(
                    "project {}: generation attempt {}/{} failed: {}",
                    input.project_key,
                    attempt,
                    MAX_ATTEMPTS,
                    err
                );
                reason = reason_for(&err);
            }
            Err(err) => {
                log::warn!(
                    "project {}: unrecoverable generation error: {}",
                    input.project_key,
                    err
                );
                reason = reason_for(&err);
                break;
            }
        }
    }

    log::info!(
        "project {}: falling back to deterministic renderer ({:?})",
        input.project_key,
        reason
    );
    (
        render_document(input, generated_at),
        GenerationOutcome::Fallback { reason },
    )
}

fn reason_for(err: &GenerateError) -> FallbackReason {
    match err {
        GenerateError::ValidationFailed => FallbackReason::ValidationFailed,
        GenerateError::MissingCredentials => FallbackReason::MissingCredentials,
        _ => FallbackReason::ServiceError,
    }
}

/// One generate-then-validate cycle.
async fn attempt_once(
    input: &ProjectDocumentInput,
    generated_at: DateTime<Tz>,
    generator: &dyn TextGenerator,
    expected: &CategoryCounts,
) -> Result<String, GenerateError> {
    let prompt = prompts::build_generation_prompt(input, generated_at);
    let raw = generator.generate(&prompt).await?;
    let content = strip_code_fence(&raw);
    if content.trim().is_empty() {
        return Err(GenerateError::EmptyResponse);
    }

    let verdict = generator
        .generate(&prompts::build_validation_prompt(&content, expected))
        .await?;
    if verdict.trim().eq_ignore_ascii_case("VALID") {
        Ok(content)
    } else {
        Err(GenerateError::ValidationFailed)
    }
}

/// Strip a fenced-code wrapper the service may have added around the whole
/// document. Only a response whose first line opens a fence and whose last
/// line is a bare closing fence counts as wrapped; anything else passes
/// through untouched, so a document that merely starts with its own fenced
/// block keeps that block intact.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let mut lines: Vec<&str> = trimmed.lines().collect();
    let wrapped = lines.len() >= 2
        && lines.first().is_some_and(|l| l.trim().starts_with("```"))
        && lines.last().is_some_and(|l| l.trim() == "```");
    if !wrapped {
        return trimmed.to_string();
    }
    lines.remove(0);
    lines.pop();
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Issue, IssueGroup, Status, UNASSIGNED_LABEL};
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays a scripted sequence of service responses and counts calls.
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GenerateError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, GenerateError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerateError::EmptyResponse))
        }
    }

    fn input() -> ProjectDocumentInput {
        ProjectDocumentInput {
            project_key: "PRJ".to_string(),
            project_name: "Acme Platform".to_string(),
            today: vec![IssueGroup {
                assignee_name: UNASSIGNED_LABEL.to_string(),
                assignee_id: None,
                issues: vec![Issue {
                    key: "PRJ-1".to_string(),
                    title: "Thing".to_string(),
                    body: String::new(),
                    status: Status::Open,
                    assignee: None,
                    start_date: None,
                    due_date: None,
                    priority: None,
                    categories: vec![],
                    url: "https://tracker.example/PRJ-1".to_string(),
                    project_key: "PRJ".to_string(),
                }],
            }],
            ..Default::default()
        }
    }

    fn at() -> DateTime<Tz> {
        chrono_tz::Asia::Tokyo
            .with_ymd_and_hms(2026, 8, 25, 7, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_then_valid_attempt_uses_two_generation_calls() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerateError::Network("connection reset".to_string())),
            Ok("# Daily Report".to_string()),
            Ok("VALID".to_string()),
        ]);
        let (doc, outcome) = generate_document(&input(), at(), &generator).await;
        assert_eq!(outcome, GenerationOutcome::Generated { attempts: 2 });
        assert_eq!(doc.content, "# Daily Report");
        // Two document generations plus one validation round-trip.
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_three_invalid_validations_fall_back_once() {
        let generator = ScriptedGenerator::new(vec![
            Ok("# Doc".to_string()),
            Ok("INVALID".to_string()),
            Ok("# Doc".to_string()),
            Ok("INVALID".to_string()),
            Ok("# Doc".to_string()),
            Ok("INVALID".to_string()),
        ]);
        let (doc, outcome) = generate_document(&input(), at(), &generator).await;
        assert_eq!(
            outcome,
            GenerationOutcome::Fallback {
                reason: FallbackReason::ValidationFailed
            }
        );
        // Fallback document is the deterministic rendering.
        let deterministic = render_document(&input(), at());
        assert_eq!(doc.content, deterministic.content);
        assert_eq!(generator.call_count(), 6);
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_retries() {
        let generator = ScriptedGenerator::new(vec![Err(GenerateError::MissingCredentials)]);
        let (_, outcome) = generate_document(&input(), at(), &generator).await;
        assert_eq!(
            outcome,
            GenerationOutcome::Fallback {
                reason: FallbackReason::MissingCredentials
            }
        );
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_response_is_retryable() {
        let generator = ScriptedGenerator::new(vec![
            Ok("```markdown\n\n```".to_string()),
            Ok("# Doc".to_string()),
            Ok("VALID".to_string()),
        ]);
        let (_, outcome) = generate_document(&input(), at(), &generator).await;
        assert_eq!(outcome, GenerationOutcome::Generated { attempts: 2 });
    }

    #[test]
    fn test_strip_code_fence_removes_wrapper() {
        assert_eq!(strip_code_fence("```markdown\n# Doc\n```"), "# Doc");
        assert_eq!(strip_code_fence("```\n# Doc\n```"), "# Doc");
        assert_eq!(strip_code_fence("# Doc"), "# Doc");
    }

    #[test]
    fn test_strip_code_fence_keeps_inner_fences() {
        let inner = "# Doc\n```\ncode\n```\ntail";
        assert_eq!(strip_code_fence(inner), inner);
    }

    #[test]
    fn test_strip_code_fence_leaves_leading_code_block_alone() {
        // Starts with a fence but is not wrapped; the block must survive.
        let doc = "```\nSELECT 1;\n```\n# Daily Report";
        assert_eq!(strip_code_fence(doc), doc);
    }

    #[test]
    fn test_strip_code_fence_unwraps_document_with_inner_fence() {
        let wrapped = "```markdown\n# Daily Report\n```\nSELECT 1;\n```\n```";
        assert_eq!(
            strip_code_fence(wrapped),
            "# Daily Report\n```\nSELECT 1;\n```"
        );
    }

    #[tokio::test]
    async fn test_generated_document_records_minutes_position() {
        let content = "# Daily Report\n\n## Minutes\n\n### Alice\n\n- [Today] PRJ-1: Thing";
        let generator = ScriptedGenerator::new(vec![
            Ok(content.to_string()),
            Ok("VALID".to_string()),
        ]);
        let (doc, _) = generate_document(&input(), at(), &generator).await;
        let offset = doc.minutes_offset.unwrap();
        assert!(doc.content[offset..].starts_with("## Minutes"));
    }
}
