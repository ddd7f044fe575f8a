use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Res,
    ai::{EmotionScore, GenerationParams, TextGenerator},
    config, debug,
};

const SERVICE: &str = "Hugging Face";

/// [`TextGenerator`] backed by the Hugging Face inference API.
#[derive(Clone)]
pub struct HuggingFaceClient {
    http: Client,
    api_key: String,
    generation_url: String,
    emotion_url: String,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: usize,
    temperature: f32,
    top_p: f32,
    repetition_penalty: f32,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
    options: ClassificationOptions,
}

#[derive(Serialize)]
struct ClassificationOptions {
    wait_for_model: bool,
    use_cache: bool,
}

/// Text-classification models answer `[[{label, score}]]` for a single
/// input, some deployments flatten it to `[{label, score}]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<EmotionScore>>),
    Flat(Vec<EmotionScore>),
}

impl HuggingFaceClient {
    pub fn new(
        api_key: impl Into<String>,
        generation_url: impl Into<String>,
        emotion_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            generation_url: generation_url.into(),
            emotion_url: emotion_url.into(),
        }
    }

    /// Builds a client when `HUGGINGFACE_API_KEY` is configured.
    pub fn from_config() -> Option<Self> {
        let api_key = config::huggingface_api_key()?;
        Some(Self::new(
            api_key,
            config::huggingface_generation_url(),
            config::huggingface_emotion_url(),
        ))
    }

    async fn check(response: Response) -> Res<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Error::Upstream {
            service: SERVICE,
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Res<String> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                repetition_penalty: params.repetition_penalty,
            },
        };

        debug!("POST {} ({} new tokens)", self.generation_url, params.max_new_tokens);
        let response = self
            .http
            .post(&self.generation_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let generated: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("generated text: {e}")))?;

        generated
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| Error::Parse("empty generation response".to_string()))
    }

    async fn classify_emotion(&self, text: &str) -> Res<Vec<EmotionScore>> {
        let body = ClassificationRequest {
            inputs: text,
            options: ClassificationOptions {
                wait_for_model: true,
                use_cache: true,
            },
        };

        let response = self
            .http
            .post(&self.emotion_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let scores = match response
            .json::<ClassificationResponse>()
            .await
            .map_err(|e| Error::Parse(format!("emotion scores: {e}")))?
        {
            ClassificationResponse::Nested(nested) => nested.into_iter().flatten().collect(),
            ClassificationResponse::Flat(flat) => flat,
        };
        Ok(scores)
    }
}
