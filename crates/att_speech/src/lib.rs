//! AT&T Speech - client for the AT&T Speech API
//!
//! Provides speech processing through the vendor's REST API:
//! - Speech-to-text: transcribe audio into ranked hypotheses (`NBest`)
//! - Text-to-speech: synthesize text into raw audio
//!
//! Every call is authorized with an OAuth2 client-credentials token. Tokens
//! for the `SPEECH`, `TTS` and `STTC` scopes are acquired together by
//! [`AttSpeechClient::set_auth_tokens`] and stored on the client.
//!
//! # Example
//!
//! ```ignore
//! use att_speech::{AttSpeechClient, Resource};
//!
//! let mut client = AttSpeechClient::new(app_key, app_secret, "")?;
//! client.set_auth_tokens().await?;
//!
//! // Transcribe audio
//! let request = client
//!     .new_api_request(Resource::SpeechToText)
//!     .with_content_type("audio/wav")
//!     .with_data(wav_bytes);
//! let response = client.speech_to_text(request).await?;
//! println!("Transcribed: {}", response.recognition.n_best[0].result_text);
//!
//! // Synthesize speech
//! let request = client
//!     .new_api_request(Resource::TextToSpeech)
//!     .with_text("Hello, world!");
//! let audio = client.text_to_speech(request).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod types;

pub use client::AttSpeechClient;
pub use config::{ClientConfig, DEFAULT_API_BASE, OAUTH_RESOURCE, STT_RESOURCE, TTS_RESOURCE};
pub use error::AttSpeechError;
pub use headers::{ClientArgs, HeaderField, to_dash};
pub use types::{
    ApiRequest, Metrics, NBest, Recognition, RecognitionInfo, Resource, Scope, ServiceException,
    SpeechResponse, Token,
};
