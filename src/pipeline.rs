//! Batch entry point.
//!
//! One pipeline instance holds the injected generation handle (or none) and
//! the organization timezone. Per-project generation is pure classification
//! plus rendering, so projects run as independent tokio tasks with no shared
//! mutable state; all tasks are joined before the batch result is returned.
//! Nothing is cached between invocations.

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::PipelineError;
use crate::generate::{
    generate_document, FallbackReason, GenerationOutcome, GeminiConfig, GeminiGenerator,
    TextGenerator,
};
use crate::render::render_document;
use crate::types::{Document, ProjectDocumentInput};

/// Briefing pipeline with its injected collaborators.
#[derive(Clone)]
pub struct BriefingPipeline {
    generator: Option<Arc<dyn TextGenerator>>,
    timezone: Tz,
}

impl BriefingPipeline {
    /// Deterministic-only pipeline.
    pub fn new(timezone: Tz) -> Self {
        Self {
            generator: None,
            timezone,
        }
    }

    /// Attach a generation handle for the AI-assisted path.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build from an already-resolved API key. A missing or empty key
    /// silently selects the deterministic path; it is never an error.
    pub fn from_api_key(timezone: Tz, api_key: Option<&str>) -> Self {
        let generator = match api_key {
            Some(key) if !key.trim().is_empty() => {
                let config = GeminiConfig {
                    api_key: key.to_string(),
                    ..Default::default()
                };
                match GeminiGenerator::new(config) {
                    Ok(g) => Some(Arc::new(g) as Arc<dyn TextGenerator>),
                    Err(err) => {
                        log::warn!("generation client unavailable, using deterministic path: {}", err);
                        None
                    }
                }
            }
            _ => {
                log::debug!("no generation API key; using deterministic path");
                None
            }
        };
        Self {
            generator,
            timezone,
        }
    }

    /// The organization timezone this pipeline resolves dates in.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Render one project's document.
    pub async fn generate_for_project(
        &self,
        input: &ProjectDocumentInput,
        generated_at: DateTime<Tz>,
    ) -> (Document, GenerationOutcome) {
        match &self.generator {
            Some(generator) => generate_document(input, generated_at, generator.as_ref()).await,
            None => (
                render_document(input, generated_at),
                GenerationOutcome::Fallback {
                    reason: FallbackReason::MissingCredentials,
                },
            ),
        }
    }

    /// Render a batch of projects as independent tasks and join them.
    ///
    /// No per-project isolation: the first join failure aborts the batch.
    pub async fn generate_batch(
        &self,
        inputs: Vec<ProjectDocumentInput>,
        generated_at: DateTime<Tz>,
    ) -> Result<Vec<(Document, GenerationOutcome)>, PipelineError> {
        let mut handles = Vec::with_capacity(inputs.len());
        for input in inputs {
            let pipeline = self.clone();
            handles.push(tokio::spawn(async move {
                pipeline.generate_for_project(&input, generated_at).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await?);
        }
        log::info!("batch complete: {} document(s) generated", results.len());
        Ok(results)
    }
}
