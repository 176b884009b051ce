//! Vendor header construction
//!
//! Header names are derived from request field names (`ContentType` becomes
//! `Content-Type`, `XArg` becomes `X-Arg`). The `X-Arg` diagnostic header
//! identifies the client to the service.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::AttSpeechError;

/// Insert a dash before the first uppercase letter after the first character.
///
/// Only one dash is ever inserted, so `FooBarBaz` becomes `Foo-BarBaz`.
#[must_use]
pub fn to_dash(name: &str) -> String {
    let mut dashed = String::with_capacity(name.len() + 1);
    let mut inserted = false;

    for (i, c) in name.char_indices() {
        if i > 0 && !inserted && c.is_ascii_uppercase() {
            dashed.push('-');
            inserted = true;
        }
        dashed.push(c);
    }

    dashed
}

/// Request fields sent as HTTP headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Accept,
    Authorization,
    ContentType,
    ContentLanguage,
    XArg,
    XSpeechContext,
}

impl HeaderField {
    /// Field name the header is derived from
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Accept => "Accept",
            Self::Authorization => "Authorization",
            Self::ContentType => "ContentType",
            Self::ContentLanguage => "ContentLanguage",
            Self::XArg => "XArg",
            Self::XSpeechContext => "XSpeechContext",
        }
    }

    /// Header name as sent on the wire
    #[must_use]
    pub fn header_name(&self) -> String {
        to_dash(self.field_name())
    }
}

/// Insert `value` under the header derived from `field`
pub(crate) fn insert_header(
    headers: &mut HeaderMap,
    field: HeaderField,
    value: &str,
) -> Result<(), AttSpeechError> {
    let name = field.header_name();
    let invalid = |reason: String| AttSpeechError::InvalidHeader {
        name: name.clone(),
        reason,
    };

    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let mut header_value =
        HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    if field == HeaderField::Authorization {
        header_value.set_sensitive(true);
    }

    headers.insert(header_name, header_value);
    Ok(())
}

/// Client identification sent in `X-Arg`
///
/// Rendered as `ClientApp=..,ClientVersion=..,DeviceType=..,DeviceOs=..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientArgs {
    pub client_app: String,
    pub client_version: String,
    /// CPU architecture of the calling device
    pub device_type: String,
    /// Operating system of the calling device
    pub device_os: String,
}

impl ClientArgs {
    /// Identify this process on the current platform
    #[must_use]
    pub fn new(client_app: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            client_app: client_app.into(),
            client_version: client_version.into(),
            device_type: std::env::consts::ARCH.to_string(),
            device_os: std::env::consts::OS.to_string(),
        }
    }

    /// Key/value pairs in their declared order
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("ClientApp", self.client_app.as_str()),
            ("ClientVersion", self.client_version.as_str()),
            ("DeviceType", self.device_type.as_str()),
            ("DeviceOs", self.device_os.as_str()),
        ]
    }

    /// Header value with `extra` pairs appended after the fixed ones
    #[must_use]
    pub fn header_value(&self, extra: &[(&str, &str)]) -> String {
        let fixed = self.pairs();
        fixed
            .iter()
            .chain(extra)
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod to_dash_tests {
        use super::*;

        #[test]
        fn leaves_single_word_undashed() {
            assert_eq!(to_dash("Foobar"), "Foobar");
        }

        #[test]
        fn dashes_two_word_name() {
            assert_eq!(to_dash("FooBar"), "Foo-Bar");
        }

        #[test]
        fn dashes_only_once() {
            assert_eq!(to_dash("FooBarBaz"), "Foo-BarBaz");
        }

        #[test]
        fn handles_single_letter_prefix() {
            assert_eq!(to_dash("XArg"), "X-Arg");
            assert_eq!(to_dash("XSpeechContext"), "X-SpeechContext");
        }

        #[test]
        fn empty_name() {
            assert_eq!(to_dash(""), "");
        }
    }

    #[test]
    fn header_field_names() {
        assert_eq!(HeaderField::Accept.header_name(), "Accept");
        assert_eq!(HeaderField::Authorization.header_name(), "Authorization");
        assert_eq!(HeaderField::ContentType.header_name(), "Content-Type");
        assert_eq!(HeaderField::ContentLanguage.header_name(), "Content-Language");
        assert_eq!(HeaderField::XArg.header_name(), "X-Arg");
        assert_eq!(HeaderField::XSpeechContext.header_name(), "X-SpeechContext");
    }

    #[test]
    fn insert_header_uses_derived_name() {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HeaderField::ContentType, "audio/wav").unwrap();

        assert_eq!(headers.get("content-type").unwrap(), "audio/wav");
    }

    #[test]
    fn insert_header_marks_authorization_sensitive() {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, HeaderField::Authorization, "Bearer 123").unwrap();

        let value = headers.get("authorization").unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value, "Bearer 123");
    }

    #[test]
    fn insert_header_rejects_control_characters() {
        let mut headers = HeaderMap::new();
        let result = insert_header(&mut headers, HeaderField::ContentType, "audio/wav\n");

        assert!(matches!(
            result,
            Err(AttSpeechError::InvalidHeader { ref name, .. }) if name == "Content-Type"
        ));
    }

    #[test]
    fn client_args_render_in_declared_order() {
        let args = ClientArgs {
            client_app: "RustLibForATTSpeech".to_string(),
            client_version: "0.1".to_string(),
            device_type: "x86_64".to_string(),
            device_os: "linux".to_string(),
        };

        assert_eq!(
            args.header_value(&[]),
            "ClientApp=RustLibForATTSpeech,ClientVersion=0.1,DeviceType=x86_64,DeviceOs=linux"
        );
    }

    #[test]
    fn client_args_append_extra_pairs() {
        let args = ClientArgs::new("App", "1.0");
        let value = args.header_value(&[("VoiceName", "crystal")]);

        assert!(value.starts_with("ClientApp=App,ClientVersion=1.0,DeviceType="));
        assert!(value.ends_with(",VoiceName=crystal"));
    }

    #[test]
    fn client_args_detect_platform() {
        let args = ClientArgs::new("App", "1.0");
        assert_eq!(args.device_type, std::env::consts::ARCH);
        assert_eq!(args.device_os, std::env::consts::OS);
    }
}
