//! Speech API errors

use thiserror::Error;

use crate::types::{Resource, Scope, ServiceException};

/// Message returned when a speech-to-text request has no content type
pub const MISSING_CONTENT_TYPE: &str = "A ContentType must be provided";

/// Message returned when a speech-to-text request has no audio data
pub const MISSING_AUDIO_DATA: &str = "Data to convert to text must be provided";

/// Message returned when a text-to-speech request has no text
pub const MISSING_TEXT: &str = "Text to convert to speech must be provided";

/// Errors that can occur while talking to the speech API
#[derive(Debug, Error)]
pub enum AttSpeechError {
    /// A required request field was not set; no request was sent
    #[error("{0}")]
    MissingField(&'static str),

    /// A request field cannot be encoded as an HTTP header
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as sent on the wire
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A request built for one resource was passed to another operation
    #[error("Request targets {actual} but was passed to {expected}")]
    ResourceMismatch {
        /// Resource the called operation serves
        expected: Resource,
        /// Resource the request was built for
        actual: Resource,
    },

    /// The vendor reported a structured service exception
    #[error("{0}")]
    Service(ServiceException),

    /// The OAuth token exchange was rejected for a scope
    #[error("Token request for scope {scope} failed with HTTP {status}: {body}")]
    Authentication {
        /// Scope whose token request failed
        scope: Scope,
        /// HTTP status returned by the token endpoint
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Failed to connect to the speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the speech service failed in transit
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AttSpeechError {
    /// Returns true for local validation failures raised before any network call
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::InvalidHeader { .. } | Self::ResourceMismatch { .. }
        )
    }

    /// Returns true if the vendor answered with a service exception
    #[must_use]
    pub const fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    /// Returns true for network and body-decoding failures
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::Timeout
                | Self::InvalidResponse(_)
        )
    }

    /// The vendor exception, if this error carries one
    #[must_use]
    pub const fn service_exception(&self) -> Option<&ServiceException> {
        match self {
            Self::Service(exception) => Some(exception),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AttSpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc0002() -> ServiceException {
        ServiceException {
            message_id: "SVC0002".to_string(),
            text: "Invalid input value for message part %1".to_string(),
            variables: "Content-Type".to_string(),
        }
    }

    #[test]
    fn missing_field_displays_literal_message() {
        let err = AttSpeechError::MissingField(MISSING_CONTENT_TYPE);
        assert_eq!(err.to_string(), "A ContentType must be provided");

        let err = AttSpeechError::MissingField(MISSING_AUDIO_DATA);
        assert_eq!(err.to_string(), "Data to convert to text must be provided");

        let err = AttSpeechError::MissingField(MISSING_TEXT);
        assert_eq!(err.to_string(), "Text to convert to speech must be provided");
    }

    #[test]
    fn service_error_message() {
        let err = AttSpeechError::Service(svc0002());
        assert_eq!(
            err.to_string(),
            "SVC0002 - Invalid input value for message part %1 - Content-Type"
        );
    }

    #[test]
    fn authentication_error_names_scope() {
        let err = AttSpeechError::Authentication {
            scope: Scope::Tts,
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Token request for scope TTS failed with HTTP 401: unauthorized"
        );
    }

    #[test]
    fn resource_mismatch_is_validation() {
        let err = AttSpeechError::ResourceMismatch {
            expected: Resource::SpeechToText,
            actual: Resource::TextToSpeech,
        };
        assert_eq!(
            err.to_string(),
            "Request targets text-to-speech but was passed to speech-to-text"
        );
        assert!(err.is_validation());
        assert!(!err.is_transport());
    }

    #[test]
    fn connection_failed_error_message() {
        let err = AttSpeechError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn configuration_error_message() {
        let err = AttSpeechError::Configuration("api_base must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: api_base must not be empty"
        );
    }

    #[test]
    fn taxonomy_is_disjoint() {
        let validation = AttSpeechError::MissingField(MISSING_TEXT);
        let service = AttSpeechError::Service(svc0002());
        let transport = AttSpeechError::InvalidResponse("not json".to_string());

        assert!(validation.is_validation());
        assert!(!validation.is_service());
        assert!(!validation.is_transport());

        assert!(service.is_service());
        assert!(!service.is_validation());
        assert!(!service.is_transport());

        assert!(transport.is_transport());
        assert!(!transport.is_service());
        assert!(!transport.is_validation());
    }

    #[test]
    fn service_exception_accessor() {
        let err = AttSpeechError::Service(svc0002());
        assert_eq!(
            err.service_exception().map(|e| e.message_id.as_str()),
            Some("SVC0002")
        );
        assert!(AttSpeechError::Timeout.service_exception().is_none());
    }
}
