/*!
 * Abstract requestor.
 *
 * Builds a bounded excerpt of the chapters, asks the configured text
 * generator for a single abstract paragraph and returns it trimmed.
 */

use log::{debug, info};
use std::sync::Arc;

use crate::database::Chapter;
use crate::errors::{ExportError, ProviderError};
use crate::providers::{GenerationParams, TextGenerator};

/// Characters taken from the start of each chapter
pub const EXCERPT_CHARS: usize = 800;

const PROMPT_TEMPLATE: &str = "You are an academic writing assistant. Write the abstract of the report \
whose chapter excerpts follow. Write a single paragraph of 250 to 350 words in a formal academic register. \
Summarize the problem, the method, the main findings and the conclusion. Do not add a title or headings, \
do not use Markdown or any other markup, and return only the abstract text.\n\nChapter excerpts:\n\n";

/// Excerpt of every chapter in order, at most `EXCERPT_CHARS` characters of content each
pub fn build_excerpt(chapters: &[Chapter]) -> String {
    chapters
        .iter()
        .map(|chapter| {
            let head: String = chapter.content.chars().take(EXCERPT_CHARS).collect();
            format!("Chapter {}: {}\n{}", chapter.chapter_number, chapter.title, head)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full prompt sent to the generator
pub fn build_prompt(chapters: &[Chapter]) -> String {
    format!("{}{}", PROMPT_TEMPLATE, build_excerpt(chapters))
}

/// Requests report abstracts from a text generator
#[derive(Debug, Clone)]
pub struct AbstractWriter {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
}

impl AbstractWriter {
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    /// Generate the abstract. Provider errors and empty answers are both fatal.
    pub async fn generate(&self, chapters: &[Chapter]) -> Result<String, ExportError> {
        let prompt = build_prompt(chapters);
        debug!(
            "Requesting abstract from {} ({}), prompt of {} chars",
            self.params.provider.display_name(),
            self.params.model,
            prompt.chars().count()
        );

        let generation = self.generator.generate(&prompt, &self.params).await?;
        let text = generation.content.trim();
        if text.is_empty() {
            return Err(ProviderError::ParseError("Provider returned an empty abstract".to_string()).into());
        }

        info!("Abstract generated: {} words", text.split_whitespace().count());
        Ok(text.to_string())
    }
}
