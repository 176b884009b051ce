//! AT&T Speech API client
//!
//! Acquires OAuth tokens for the `SPEECH`, `TTS` and `STTC` scopes and issues
//! speech-to-text and text-to-speech calls with the vendor's headers.
//!
//! Each operation sends exactly one request. Nothing is retried and tokens are
//! never refreshed automatically; call [`AttSpeechClient::set_auth_tokens`]
//! again when they expire.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{AttSpeechError, MISSING_AUDIO_DATA, MISSING_CONTENT_TYPE, MISSING_TEXT};
use crate::headers::{ClientArgs, HeaderField, insert_header};
use crate::types::{ApiRequest, ErrorEnvelope, Resource, Scope, SpeechResponse, Token};

/// Client for the AT&T speech-to-text and text-to-speech API
///
/// Tokens are owned by the client and only replaced through
/// [`set_auth_tokens`](Self::set_auth_tokens), which takes `&mut self`.
/// Share a client across tasks only behind your own lock.
#[derive(Debug)]
pub struct AttSpeechClient {
    http: Client,
    config: ClientConfig,
    client_args: ClientArgs,
    tokens: HashMap<Scope, Token>,
}

/// OAuth client-credentials response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl AttSpeechClient {
    /// Create a client for application `id` / `secret`
    ///
    /// An empty `api_base` selects the production API.
    ///
    /// # Errors
    ///
    /// Returns `AttSpeechError::Configuration` if `api_base` is malformed or
    /// the HTTP client cannot be built.
    pub fn new(
        id: impl Into<String>,
        secret: impl Into<String>,
        api_base: &str,
    ) -> Result<Self, AttSpeechError> {
        let mut config = ClientConfig::new(id, secret);
        if !api_base.is_empty() {
            config.api_base = api_base.to_string();
        }

        Self::from_config(config)
    }

    /// Create a client from a full configuration
    ///
    /// # Errors
    ///
    /// Returns `AttSpeechError::Configuration` if the configuration is invalid.
    pub fn from_config(config: ClientConfig) -> Result<Self, AttSpeechError> {
        config.validate().map_err(AttSpeechError::Configuration)?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("att_speech/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AttSpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let client_args = ClientArgs::new(&config.client_app, &config.client_version);

        Ok(Self {
            http,
            config,
            client_args,
            tokens: HashMap::new(),
        })
    }

    /// Application id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.config.app_key
    }

    /// Application secret
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.config.app_secret
    }

    /// API base URL
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    /// Point the client at another API base URL
    ///
    /// # Errors
    ///
    /// Returns `AttSpeechError::Configuration` and keeps the current base if
    /// the new one is empty or lacks an `http://`/`https://` scheme.
    pub fn set_api_base(&mut self, api_base: impl Into<String>) -> Result<(), AttSpeechError> {
        let config = ClientConfig {
            api_base: api_base.into(),
            ..self.config.clone()
        };
        config.validate().map_err(AttSpeechError::Configuration)?;

        self.config = config;
        Ok(())
    }

    /// Speech-to-text resource path
    #[must_use]
    pub fn stt_resource(&self) -> &str {
        &self.config.stt_resource
    }

    /// Text-to-speech resource path
    #[must_use]
    pub fn tts_resource(&self) -> &str {
        &self.config.tts_resource
    }

    /// Client identification sent in `X-Arg`
    #[must_use]
    pub const fn client_args(&self) -> &ClientArgs {
        &self.client_args
    }

    /// Token stored for `scope`, if acquired
    #[must_use]
    pub fn token(&self, scope: Scope) -> Option<&Token> {
        self.tokens.get(&scope)
    }

    /// All stored tokens
    #[must_use]
    pub const fn tokens(&self) -> &HashMap<Scope, Token> {
        &self.tokens
    }

    /// Whether a token is stored for every scope
    #[must_use]
    pub fn has_all_tokens(&self) -> bool {
        Scope::ALL.iter().all(|scope| self.tokens.contains_key(scope))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn resource_path(&self, resource: Resource) -> &str {
        match resource {
            Resource::SpeechToText => &self.config.stt_resource,
            Resource::TextToSpeech => &self.config.tts_resource,
        }
    }

    /// Acquire a token for every scope
    ///
    /// Scopes are requested in the order `SPEECH`, `TTS`, `STTC`. The first
    /// failure aborts; tokens stored before it stay in place, so treat any
    /// error as "not authenticated".
    ///
    /// # Errors
    ///
    /// Returns `AttSpeechError::Authentication` for a non-200 answer, or a
    /// transport error if the token endpoint cannot be reached or parsed.
    #[instrument(skip(self), fields(api_base = %self.config.api_base))]
    pub async fn set_auth_tokens(&mut self) -> Result<(), AttSpeechError> {
        for scope in Scope::ALL {
            let token = self.request_token(scope).await?;
            self.tokens.insert(scope, token);
        }

        debug!(scopes = Scope::ALL.len(), "OAuth tokens acquired");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn request_token(&self, scope: Scope) -> Result<Token, AttSpeechError> {
        let params = [
            ("client_id", self.config.app_key.as_str()),
            ("client_secret", self.config.app_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http
            .post(self.url(&self.config.oauth_resource))
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            return Err(AttSpeechError::Authentication {
                scope,
                status: status.as_u16(),
                body,
            });
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            AttSpeechError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })?;

        debug!(expires_in = ?body.expires_in, "Token issued");

        Ok(Token::issued(
            body.access_token,
            body.refresh_token,
            body.token_type,
            body.expires_in,
        ))
    }

    /// Create a request for `resource` with its defaults
    ///
    /// Text-to-speech requests default to `text/plain`; speech-to-text
    /// requests leave the content type for the caller to set.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn new_api_request(&self, resource: Resource) -> ApiRequest {
        ApiRequest::new(resource)
    }

    /// Headers for an authenticated call to `resource`
    fn authenticated_headers(
        &self,
        resource: Resource,
        request: &ApiRequest,
        content_type: &str,
    ) -> Result<HeaderMap, AttSpeechError> {
        let access_token = self
            .tokens
            .get(&resource.scope())
            .map(|token| token.access_token.as_str())
            .unwrap_or_default();

        let voice: Vec<(&str, &str)> = request
            .voice_name
            .as_deref()
            .map(|voice| ("VoiceName", voice))
            .into_iter()
            .collect();

        let mut headers = HeaderMap::new();
        insert_header(
            &mut headers,
            HeaderField::Authorization,
            &format!("Bearer {access_token}"),
        )?;
        insert_header(&mut headers, HeaderField::Accept, &request.accept)?;
        insert_header(&mut headers, HeaderField::ContentType, content_type)?;
        insert_header(
            &mut headers,
            HeaderField::XArg,
            &self.client_args.header_value(&voice),
        )?;

        if let Some(context) = &request.speech_context {
            insert_header(&mut headers, HeaderField::XSpeechContext, context)?;
        }
        if let Some(language) = &request.content_language {
            insert_header(&mut headers, HeaderField::ContentLanguage, language)?;
        }

        Ok(headers)
    }

    /// POST `body` to `resource` and keep the response only on success
    async fn post(
        &self,
        resource: Resource,
        request: &ApiRequest,
        content_type: &str,
        body: impl Into<reqwest::Body>,
    ) -> Result<Response, AttSpeechError> {
        let headers = self.authenticated_headers(resource, request, content_type)?;

        let response = self
            .http
            .post(self.url(self.resource_path(resource)))
            .headers(headers)
            .body(body)
            .send()
            .await?;

        check_status(response).await
    }

    /// Transcribe audio
    ///
    /// The request must carry a content type and non-empty audio data.
    ///
    /// # Errors
    ///
    /// Returns `AttSpeechError::ResourceMismatch` or
    /// `AttSpeechError::MissingField` before any network call if the request
    /// was built for text-to-speech or the content type or data is missing,
    /// `AttSpeechError::Service` if the service rejects the request, or a
    /// transport error.
    #[instrument(skip(self, request), fields(audio_size = request.data.len()))]
    pub async fn speech_to_text(
        &self,
        request: ApiRequest,
    ) -> Result<SpeechResponse, AttSpeechError> {
        check_resource(&request, Resource::SpeechToText)?;
        let content_type = match request.content_type.as_deref() {
            Some(content_type) if !content_type.is_empty() => content_type,
            _ => return Err(AttSpeechError::MissingField(MISSING_CONTENT_TYPE)),
        };
        if request.data.is_empty() {
            return Err(AttSpeechError::MissingField(MISSING_AUDIO_DATA));
        }

        debug!(content_type, "Sending audio for recognition");

        let response = self
            .post(
                Resource::SpeechToText,
                &request,
                content_type,
                request.data.clone(),
            )
            .await?;

        let speech: SpeechResponse = response.json().await.map_err(|e| {
            AttSpeechError::InvalidResponse(format!("Failed to parse recognition: {e}"))
        })?;

        debug!(
            status = %speech.recognition.status,
            hypotheses = speech.recognition.n_best.len(),
            "Recognition complete"
        );

        Ok(speech)
    }

    /// Synthesize speech, returning the raw audio body
    ///
    /// # Errors
    ///
    /// Returns `AttSpeechError::ResourceMismatch` or
    /// `AttSpeechError::MissingField` before any network call if the request
    /// was built for speech-to-text or the text is empty,
    /// `AttSpeechError::Service` if the service rejects the request, or a
    /// transport error.
    #[instrument(skip(self, request), fields(text_len = request.text.len()))]
    pub async fn text_to_speech(&self, request: ApiRequest) -> Result<Bytes, AttSpeechError> {
        check_resource(&request, Resource::TextToSpeech)?;
        if request.text.is_empty() {
            return Err(AttSpeechError::MissingField(MISSING_TEXT));
        }

        // Not validated locally; the service rejects unsupported types
        let content_type = request.content_type.as_deref().unwrap_or_default();

        let response = self
            .post(
                Resource::TextToSpeech,
                &request,
                content_type,
                request.text.clone(),
            )
            .await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| AttSpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        debug!(audio_size = audio.len(), "Speech synthesis complete");

        Ok(audio)
    }
}

/// Reject a request built for a different resource than the operation serves
fn check_resource(request: &ApiRequest, expected: Resource) -> Result<(), AttSpeechError> {
    if request.resource == expected {
        return Ok(());
    }

    Err(AttSpeechError::ResourceMismatch {
        expected,
        actual: request.resource,
    })
}

/// Pass successful responses through; decode the vendor exception otherwise
async fn check_status(response: Response) -> Result<Response, AttSpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Err(AttSpeechError::Service(envelope.request_error.exception)),
        Err(_) => Err(AttSpeechError::InvalidResponse(format!(
            "HTTP {status}: {body}"
        ))),
    }
}
