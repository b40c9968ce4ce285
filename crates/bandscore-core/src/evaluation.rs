//! Evaluation request: criteria + prompt + one model call.
//!
//! `EvaluationService` is generic over the criteria store and takes the LLM
//! provider through a `ProviderFactory`, so the HTTP server and the CLI share
//! it while tests inject in-memory doubles.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{Instrument, debug, info, info_span};

use bandscore_types::config::AppConfig;
use bandscore_types::error::EvaluationError;
use bandscore_types::llm::{CompletionRequest, Message};
use bandscore_types::secret::{GOOGLE_API_KEY, PROMPT_TEMPLATE};
use bandscore_types::session::Evaluation;
use bandscore_types::task::TaskVariant;

use crate::llm::provider::ProviderFactory;
use crate::prompt::{PromptInput, PromptTemplate};
use crate::repository::criteria::CriteriaStore;
use crate::service::secret::SecretService;
use crate::word_count::count_words;

static BAND_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)band\s+score[^0-9\n]{0,12}?([0-9](?:\.[0-9])?)\b")
        .expect("band score pattern is valid")
});

/// Pull the overall band score out of free-form feedback.
///
/// Takes the last "band score ... N" occurrence, since the final score comes
/// after the per-criterion breakdown.
pub fn extract_band_score(text: &str) -> Option<f32> {
    BAND_SCORE
        .captures_iter(text)
        .last()
        .and_then(|caps| caps[1].parse::<f32>().ok())
        .filter(|score| (0.0..=9.0).contains(score))
}

/// Model parameters and the configured template override.
#[derive(Debug, Clone)]
pub struct EvaluationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub prompt_template: Option<String>,
}

impl EvaluationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.name.clone(),
            temperature: config.model.temperature,
            max_output_tokens: config.model.max_output_tokens,
            prompt_template: config.prompt_template.clone(),
        }
    }
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct EvaluationService<C: CriteriaStore> {
    criteria: C,
    secrets: Arc<SecretService>,
    factory: Arc<dyn ProviderFactory>,
    settings: EvaluationSettings,
}

impl<C: CriteriaStore> EvaluationService<C> {
    pub fn new(
        criteria: C,
        secrets: Arc<SecretService>,
        factory: Arc<dyn ProviderFactory>,
        settings: EvaluationSettings,
    ) -> Self {
        Self {
            criteria,
            secrets,
            factory,
            settings,
        }
    }

    pub fn criteria(&self) -> &C {
        &self.criteria
    }

    /// Template to use for the next request.
    ///
    /// Priority: `PROMPT_TEMPLATE` secret, then config, then the built-in text.
    pub async fn resolve_template(&self) -> Result<PromptTemplate, EvaluationError> {
        let template = match self.secrets.get_secret(PROMPT_TEMPLATE).await? {
            Some(text) => PromptTemplate::new(text),
            None => match &self.settings.prompt_template {
                Some(text) if !text.trim().is_empty() => PromptTemplate::new(text.clone()),
                _ => PromptTemplate::default(),
            },
        };
        template
            .validate()
            .map_err(EvaluationError::InvalidTemplate)?;
        Ok(template)
    }

    /// Evaluate one response against the band descriptors for `variant`.
    ///
    /// The reply text is returned verbatim; no retry is attempted.
    pub async fn evaluate(
        &self,
        variant: TaskVariant,
        question: &str,
        response: &str,
    ) -> Result<Evaluation, EvaluationError> {
        if question.trim().is_empty() || response.trim().is_empty() {
            return Err(EvaluationError::MissingInput);
        }

        let api_key = self
            .secrets
            .get_secret(GOOGLE_API_KEY)
            .await?
            .ok_or(EvaluationError::MissingCredential(GOOGLE_API_KEY))?;

        let criteria = self.criteria.load(variant).await?;
        let template = self.resolve_template().await?;
        let word_count = count_words(response);

        let prompt = template.render(&PromptInput {
            variant,
            criteria: &criteria,
            question,
            response,
            word_count,
        });
        debug!(
            task = %variant,
            word_count,
            prompt_chars = prompt.len(),
            "Rendered examiner prompt"
        );

        let provider = self.factory.create(&api_key)?;
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.settings.max_output_tokens,
            temperature: Some(self.settings.temperature),
        };

        let span = info_span!(
            "gen_ai.complete",
            otel.name = %format!("chat {}", request.model),
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
        );
        let completion = provider.complete(&request).instrument(span).await?;

        let band_score = extract_band_score(&completion.content);
        info!(
            task = %variant,
            model = %completion.model,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            stop_reason = %completion.stop_reason,
            band_score = ?band_score,
            "Evaluation complete"
        );

        Ok(Evaluation {
            variant,
            feedback: completion.content,
            band_score,
            model: completion.model,
            word_count,
        })
    }
}
