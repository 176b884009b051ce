//! Types for the speech API
//!
//! Contains OAuth scopes and tokens, the per-call request descriptor, and the
//! vendor's recognition and error payloads.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 permission domain, each requiring its own bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Speech-to-text
    Speech,
    /// Text-to-speech
    Tts,
    /// Speech-to-text with custom grammar
    Sttc,
}

impl Scope {
    /// All scopes, in the order tokens are requested
    pub const ALL: [Self; 3] = [Self::Speech, Self::Tts, Self::Sttc];

    /// Wire name sent as the `scope` grant parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Speech => "SPEECH",
            Self::Tts => "TTS",
            Self::Sttc => "STTC",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API endpoint targeted by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Speech-to-text
    SpeechToText,
    /// Text-to-speech
    TextToSpeech,
}

impl Resource {
    /// Scope whose token authorizes calls to this resource
    #[must_use]
    pub const fn scope(&self) -> Scope {
        match self {
            Self::SpeechToText => Scope::Speech,
            Self::TextToSpeech => Scope::Tts,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpeechToText => f.write_str("speech-to-text"),
            Self::TextToSpeech => f.write_str("text-to-speech"),
        }
    }
}

/// Scope-bound OAuth2 credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Bearer value sent in `Authorization`
    pub access_token: String,
    /// Refresh token (stored, never used automatically)
    pub refresh_token: String,
    /// Token type reported by the server, usually `bearer`
    pub token_type: Option<String>,
    /// Lifetime in seconds reported by the server
    pub expires_in: Option<u64>,
    /// When the token expires, computed at issue time
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Create a token issued now
    #[must_use]
    pub fn issued(
        access_token: String,
        refresh_token: String,
        token_type: Option<String>,
        expires_in: Option<u64>,
    ) -> Self {
        let expires_at = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

        Self {
            access_token,
            refresh_token,
            token_type,
            expires_in,
            expires_at,
        }
    }

    /// Whether the token's reported lifetime has elapsed
    ///
    /// Tokens without a reported lifetime never expire client-side.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Per-call request descriptor
///
/// Created through [`AttSpeechClient::new_api_request`](crate::AttSpeechClient::new_api_request),
/// which fills in resource-appropriate defaults.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Target endpoint
    pub resource: Resource,
    /// `Content-Type` of the payload
    pub content_type: Option<String>,
    /// `Accept` type of the expected response
    pub accept: String,
    /// Audio payload for speech-to-text
    pub data: Bytes,
    /// Text payload for text-to-speech
    pub text: String,
    /// `X-SpeechContext` recognition context (speech-to-text only)
    pub speech_context: Option<String>,
    /// `Content-Language` of the audio or text
    pub content_language: Option<String>,
    /// Voice appended to `X-Arg` as `VoiceName` (text-to-speech only)
    pub voice_name: Option<String>,
}

/// Recognition context used when none is given
pub const DEFAULT_SPEECH_CONTEXT: &str = "Generic";

/// Audio type requested from text-to-speech by default
pub const DEFAULT_TTS_ACCEPT: &str = "audio/x-wav";

impl ApiRequest {
    /// Create a request with the defaults for `resource`
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        match resource {
            Resource::SpeechToText => Self {
                resource,
                content_type: None,
                accept: mime::APPLICATION_JSON.to_string(),
                data: Bytes::new(),
                text: String::new(),
                speech_context: Some(DEFAULT_SPEECH_CONTEXT.to_string()),
                content_language: None,
                voice_name: None,
            },
            Resource::TextToSpeech => Self {
                resource,
                content_type: Some(mime::TEXT_PLAIN.to_string()),
                accept: DEFAULT_TTS_ACCEPT.to_string(),
                data: Bytes::new(),
                text: String::new(),
                speech_context: None,
                content_language: None,
                voice_name: None,
            },
        }
    }

    /// Set the payload content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the audio payload
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the text payload
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the content language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.content_language = Some(language.into());
        self
    }

    /// Set the synthesis voice
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice_name = Some(voice.into());
        self
    }
}

/// Parsed speech-to-text result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechResponse {
    /// Recognition payload
    #[serde(rename = "Recognition")]
    pub recognition: Recognition,
}

impl SpeechResponse {
    /// Highest ranked hypothesis, if any
    #[must_use]
    pub fn best(&self) -> Option<&NBest> {
        self.recognition.n_best.first()
    }
}

/// Recognition outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recognition {
    /// Recognition status, `OK` on success
    pub status: String,
    /// Server-assigned response id
    #[serde(default)]
    pub response_id: String,
    /// Processing metrics
    #[serde(default)]
    pub info: Option<RecognitionInfo>,
    /// Ranked hypotheses
    #[serde(rename = "NBest", default)]
    pub n_best: Vec<NBest>,
}

/// Recognition info block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionInfo {
    #[serde(default)]
    pub metrics: Option<Metrics>,
}

/// Audio processing metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Size of the submitted audio
    #[serde(default)]
    pub audio_bytes: u64,
    /// Duration of the submitted audio in seconds
    #[serde(default)]
    pub audio_time: f64,
}

/// A candidate transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NBest {
    pub confidence: f64,
    #[serde(default)]
    pub grade: String,
    /// Raw lowercase hypothesis
    #[serde(default)]
    pub hypothesis: String,
    #[serde(default)]
    pub language_id: String,
    /// Formatted transcription
    #[serde(default)]
    pub result_text: String,
    /// Per-word confidence, aligned with `words`
    #[serde(default)]
    pub word_scores: Vec<f64>,
    #[serde(default)]
    pub words: Vec<String>,
}

/// Vendor error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceException {
    pub message_id: String,
    /// Message text, may contain `%1` placeholders
    pub text: String,
    /// Value substituted for the placeholder
    #[serde(default)]
    pub variables: String,
}

impl fmt::Display for ServiceException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.message_id, self.text, self.variables)
    }
}

/// Error body envelope: `{"RequestError": {"ServiceException": {...}}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(rename = "RequestError")]
    pub request_error: RequestError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequestError {
    // Policy violations use the same shape under a different key
    #[serde(rename = "ServiceException", alias = "PolicyException")]
    pub exception: ServiceException,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_wire_names() {
        let names: Vec<&str> = Scope::ALL.iter().map(Scope::as_str).collect();
        assert_eq!(names, vec!["SPEECH", "TTS", "STTC"]);
        assert_eq!(Scope::Sttc.to_string(), "STTC");
    }

    #[test]
    fn resource_scopes() {
        assert_eq!(Resource::SpeechToText.scope(), Scope::Speech);
        assert_eq!(Resource::TextToSpeech.scope(), Scope::Tts);
    }

    #[test]
    fn tts_request_defaults() {
        let request = ApiRequest::new(Resource::TextToSpeech);
        assert_eq!(request.content_type.as_deref(), Some("text/plain"));
        assert_eq!(request.accept, "audio/x-wav");
        assert!(request.text.is_empty());
        assert!(request.speech_context.is_none());
    }

    #[test]
    fn stt_request_defaults() {
        let request = ApiRequest::new(Resource::SpeechToText);
        assert!(request.content_type.is_none());
        assert_eq!(request.accept, "application/json");
        assert!(request.data.is_empty());
        assert_eq!(request.speech_context.as_deref(), Some("Generic"));
    }

    #[test]
    fn request_builders() {
        let request = ApiRequest::new(Resource::TextToSpeech)
            .with_text("hello")
            .with_content_type("application/ssml+xml")
            .with_language("en-US")
            .with_voice("crystal");
        assert_eq!(request.text, "hello");
        assert_eq!(request.content_type.as_deref(), Some("application/ssml+xml"));
        assert_eq!(request.content_language.as_deref(), Some("en-US"));
        assert_eq!(request.voice_name.as_deref(), Some("crystal"));
    }

    #[test]
    fn token_expiry_is_computed() {
        let token = Token::issued("a".into(), "r".into(), Some("bearer".into()), Some(500));
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());

        let expired = Token::issued("a".into(), "r".into(), None, Some(0));
        assert!(expired.is_expired());

        let open = Token::issued("a".into(), "r".into(), None, None);
        assert!(open.expires_at.is_none());
        assert!(!open.is_expired());
    }

    #[test]
    fn service_exception_display() {
        let exception = ServiceException {
            message_id: "SVC0001".to_string(),
            text: "A service error has occurred".to_string(),
            variables: String::new(),
        };
        assert_eq!(exception.to_string(), "SVC0001 - A service error has occurred - ");
    }

    #[test]
    fn error_envelope_parses_policy_exception() {
        let body = r#"{"RequestError":{"PolicyException":{"MessageId":"POL0001","Text":"Too many requests","Variables":""}}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.request_error.exception.message_id, "POL0001");
    }

    #[test]
    fn recognition_parses_vendor_shape() {
        let body = serde_json::json!({
            "Recognition": {
                "Info": { "metrics": { "audioBytes": 1024, "audioTime": 1.5 } },
                "NBest": [{
                    "Confidence": 0.9,
                    "Grade": "accept",
                    "Hypothesis": "hello world",
                    "LanguageId": "en-US",
                    "ResultText": "Hello world.",
                    "WordScores": [1, 0.8],
                    "Words": ["Hello", "world."]
                }],
                "ResponseId": "abc",
                "Status": "OK"
            }
        });

        let response: SpeechResponse = serde_json::from_value(body).unwrap();

        assert_eq!(response.recognition.status, "OK");
        assert_eq!(response.recognition.response_id, "abc");
        let metrics = response.recognition.info.and_then(|i| i.metrics).unwrap();
        assert_eq!(metrics.audio_bytes, 1024);
        let best = response.recognition.n_best.first().unwrap();
        assert_eq!(best.result_text, "Hello world.");
        assert_eq!(best.word_scores, vec![1.0, 0.8]);
        assert_eq!(best.words.len(), 2);
    }
}
