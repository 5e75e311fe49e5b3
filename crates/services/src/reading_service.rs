use std::env;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ReadingError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_MIME_TYPE: &str = "audio/webm";

/// Feedback shown when no API key is configured.
pub const NOT_CONFIGURED_FEEDBACK: &str =
    "Cô giáo chưa chuẩn bị xong khóa học (Thiếu API Key). Vui lòng báo giáo viên kiểm tra nhé!";

/// Feedback shown when the assessment could not be produced.
pub const RETRY_FEEDBACK: &str =
    "Cô chưa nghe rõ, con bấm nút ghi âm và đọc lại cho cô nghe nhé!";

#[derive(Clone, Debug)]
pub struct ReadingConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ReadingConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Grade for one read-aloud attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingAssessment {
    pub transcription: String,
    pub feedback: String,
    pub accuracy: u8,
}

impl ReadingAssessment {
    fn fallback(feedback: &str) -> Self {
        Self {
            transcription: String::new(),
            feedback: feedback.to_string(),
            accuracy: 0,
        }
    }
}

/// A recording submitted for grading.
#[derive(Debug, Clone)]
pub struct ReadingAttempt<'a> {
    pub audio_base64: &'a str,
    pub expected_text: &'a str,
    pub mime_type: Option<&'a str>,
}

impl ReadingAttempt<'_> {
    /// Whether the audio payload is non-empty valid base64.
    #[must_use]
    pub fn has_valid_audio(&self) -> bool {
        let audio = self.audio_base64.trim();
        !audio.is_empty() && STANDARD.decode(audio).is_ok()
    }
}

/// Grades read-aloud recordings against the expected text with a generative model.
#[derive(Clone)]
pub struct ReadingService {
    client: Client,
    config: Option<ReadingConfig>,
}

impl ReadingService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ReadingConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ReadingConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Grades an attempt, never failing: problems become child-friendly
    /// feedback with zero accuracy.
    pub async fn analyze(&self, attempt: &ReadingAttempt<'_>) -> ReadingAssessment {
        match self.try_analyze(attempt).await {
            Ok(assessment) => {
                info!(accuracy = assessment.accuracy, "reading assessed");
                assessment
            }
            Err(ReadingError::Disabled) => ReadingAssessment::fallback(NOT_CONFIGURED_FEEDBACK),
            Err(e) => {
                warn!(error = %e, "reading assessment failed");
                ReadingAssessment::fallback(RETRY_FEEDBACK)
            }
        }
    }

    /// Grades an attempt, surfacing the failure reason.
    ///
    /// # Errors
    ///
    /// Returns `ReadingError` when the service is disabled, the request fails,
    /// or the model reply is empty or not the expected JSON.
    pub async fn try_analyze(
        &self,
        attempt: &ReadingAttempt<'_>,
    ) -> Result<ReadingAssessment, ReadingError> {
        let config = self.config.as_ref().ok_or(ReadingError::Disabled)?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: attempt.mime_type.unwrap_or(DEFAULT_MIME_TYPE).to_string(),
                            data: attempt.audio_base64.trim().to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: grading_prompt(attempt.expected_text),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReadingError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(ReadingError::EmptyResponse)?;

        parse_assessment(&text)
    }
}

fn grading_prompt(expected_text: &str) -> String {
    format!(
        "Bạn là một giáo viên lớp 1 đang chấm điểm tập đọc cho học sinh 6 tuổi.\n\
         Văn bản mong đợi: \"{expected_text}\".\n\
         \n\
         Nhiệm vụ:\n\
         1. Phiên âm đoạn âm thanh (transcription).\n\
         2. So sánh với văn bản mong đợi. Nếu học sinh đọc được đại ý hoặc gần đúng các âm cơ bản, hãy chấm điểm cao (trên 70). Chỉ chấm điểm thấp nếu hoàn toàn không có tiếng người hoặc đọc sai toàn bộ.\n\
         3. Đưa ra nhận xét (feedback) cực kỳ ngọt ngào, khen ngợi sự cố gắng của bé.\n\
         4. Trả về JSON: {{ \"transcription\": string, \"feedback\": string, \"accuracy\": number }}.\n\
         \n\
         Lưu ý: Chỉ trả về JSON nguyên bản, không dùng dấu nháy ngược code block."
    )
}

/// Parses the model reply, tolerating Markdown code fences around the JSON.
///
/// # Errors
///
/// Returns `ReadingError::Malformed` if the reply is not the expected object.
pub fn parse_assessment(text: &str) -> Result<ReadingAssessment, ReadingError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let raw: RawAssessment = serde_json::from_str(cleaned.trim())?;

    let accuracy = raw.accuracy.unwrap_or(0.0);
    let accuracy = if accuracy.is_finite() {
        accuracy.round().clamp(0.0, 100.0)
    } else {
        0.0
    };

    // Clamped to 0..=100 above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let accuracy = accuracy as u8;

    Ok(ReadingAssessment {
        transcription: raw.transcription.unwrap_or_default(),
        feedback: raw.feedback.unwrap_or_default(),
        accuracy,
    })
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    transcription: Option<String>,
    feedback: Option<String>,
    accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
