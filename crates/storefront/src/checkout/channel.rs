//! External messaging channel.
//!
//! A handoff opens a chat at `<base>/<address>?text=<message>`. Opening is
//! best-effort and immediate: it either succeeds or reports the channel as
//! unavailable. There is no pending state and no automatic retry.

use url::Url;

/// Request to open a chat, optionally pre-filled with text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    /// International address of the chat recipient (digits only).
    pub address: String,
    /// Pre-filled message, if any.
    pub text: Option<String>,
    /// Fully built chat URL.
    pub url: Url,
}

impl ChannelRequest {
    /// Build a request against the channel's base URL.
    #[must_use]
    pub fn new(base: &Url, address: &str, text: Option<&str>) -> Self {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(address);
        }
        url.set_query(None);
        if let Some(text) = text {
            url.set_query(Some(&format!("text={}", urlencoding::encode(text))));
        }

        Self {
            address: address.to_owned(),
            text: text.map(str::to_owned),
            url,
        }
    }
}

/// Result of attempting to open a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The chat was opened.
    Opened,
    /// The environment refused to open the chat.
    Unavailable { reason: String },
}

impl ChannelOutcome {
    #[must_use]
    pub const fn is_opened(&self) -> bool {
        matches!(self, Self::Opened)
    }
}

/// Something that can open a chat.
pub trait MessageChannel {
    /// Attempt to open the chat described by `request`.
    fn open(&mut self, request: &ChannelRequest) -> ChannelOutcome;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://wa.me").unwrap()
    }

    #[test]
    fn test_url_without_text() {
        let request = ChannelRequest::new(&base(), "2349078048405", None);
        assert_eq!(request.url.as_str(), "https://wa.me/2349078048405");
        assert!(request.text.is_none());
    }

    #[test]
    fn test_url_with_encoded_text() {
        let text = "*Hi* Ada,\n₦25,000 & more?";
        let request = ChannelRequest::new(&base(), "2348012345678", Some(text));
        assert_eq!(
            request.url.as_str(),
            "https://wa.me/2348012345678?text=%2AHi%2A%20Ada%2C%0A%E2%82%A625%2C000%20%26%20more%3F"
        );
    }

    #[test]
    fn test_url_with_base_path() {
        let base = Url::parse("https://chat.example.com/send/").unwrap();
        let request = ChannelRequest::new(&base, "123", Some("x"));
        let expected = "https://chat.example.com/send/123?text=x";
        assert_eq!(request.url.as_str(), expected);
    }

    #[test]
    fn test_encoded_text_decodes_to_original() {
        let text = "1. Time velo edition\n   - Size: M\n*Total Price:* ₦50,000";
        let request = ChannelRequest::new(&base(), "1", Some(text));
        let (_, value) = request.url.query_pairs().next().unwrap();
        assert_eq!(value, text);
    }
}
