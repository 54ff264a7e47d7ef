//! One-shot messages carried across a redirect in a signed cookie.
//!
//! Cookie value: `base64url(json) "." base64url(HMAC-SHA256(secret, json))`.
//! Anything that fails verification is ignored.

use axum::http::{header::COOKIE, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::Result;

type HmacSha256 = Hmac<Sha256>;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Info,
    Error,
}

impl Category {
    /// Extra CSS class for the alert box
    pub fn css_class(&self) -> &'static str {
        match self {
            Category::Info => "",
            Category::Error => "error",
        }
    }
}

/// A message shown above the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub category: Category,
    pub text: String,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            category: Category::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            category: Category::Error,
            text: text.into(),
        }
    }
}

/// Signs and verifies flash cookies with the server's secret key
#[derive(Clone)]
pub struct FlashSigner {
    mac: HmacSha256,
}

impl FlashSigner {
    pub fn new(secret_key: &str) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid secret key: {}", e))?;
        Ok(Self { mac })
    }

    fn signature(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    /// Encode `message` into a signed cookie value
    pub fn encode(&self, message: &Message) -> Result<String> {
        let payload = serde_json::to_vec(message)?;
        let signature = self.signature(&payload);
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Decode a cookie value, returning `None` unless the signature matches
    pub fn decode(&self, value: &str) -> Option<Message> {
        let (payload, signature) = value.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(&payload);
        mac.verify_slice(&signature).ok()?;

        serde_json::from_slice(&payload).ok()
    }

    /// `Set-Cookie` value that stores `message` until the next page view
    pub fn set_cookie(&self, message: &Message) -> Result<String> {
        Ok(format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            self.encode(message)?
        ))
    }

    /// Read the flash message sent by the browser, if any and if authentic
    pub fn take(&self, headers: &HeaderMap) -> Option<Message> {
        cookie_value(headers, FLASH_COOKIE).and_then(|value| self.decode(value))
    }
}

/// `Set-Cookie` value that removes the flash cookie
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", FLASH_COOKIE)
}

/// Whether the request carries a flash cookie at all
pub fn has_cookie(headers: &HeaderMap) -> bool {
    cookie_value(headers, FLASH_COOKIE).is_some()
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn round_trips_signed_message() {
        let signer = FlashSigner::new("test-secret").unwrap();
        let message = Message::error("Invalid file type.");

        let value = signer.encode(&message).unwrap();
        assert_eq!(signer.decode(&value), Some(message));
    }

    #[test]
    fn rejects_tampered_payload() {
        let signer = FlashSigner::new("test-secret").unwrap();
        let value = signer.encode(&Message::info("hello")).unwrap();
        let (_, signature) = value.split_once('.').unwrap();

        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"category":"info","text":"pwned"}"#);
        assert_eq!(signer.decode(&format!("{}.{}", forged_payload, signature)), None);
    }

    #[test]
    fn rejects_other_keys() {
        let value = FlashSigner::new("one")
            .unwrap()
            .encode(&Message::info("hello"))
            .unwrap();
        assert_eq!(FlashSigner::new("two").unwrap().decode(&value), None);
    }

    #[test]
    fn rejects_garbage() {
        let signer = FlashSigner::new("test-secret").unwrap();
        assert_eq!(signer.decode("not-a-cookie"), None);
        assert_eq!(signer.decode("!!.??"), None);
    }

    #[test]
    fn reads_cookie_among_others() {
        let signer = FlashSigner::new("test-secret").unwrap();
        let value = signer.encode(&Message::error("nope")).unwrap();
        let headers = headers_with(&format!("theme=dark; flash={}; lang=en", value));

        assert!(has_cookie(&headers));
        assert_eq!(signer.take(&headers), Some(Message::error("nope")));
    }

    #[test]
    fn empty_cookie_is_absent() {
        let headers = headers_with("flash=");
        assert!(!has_cookie(&headers));
    }

    #[test]
    fn set_cookie_is_scoped_to_root() {
        let signer = FlashSigner::new("test-secret").unwrap();
        let header = signer.set_cookie(&Message::info("x")).unwrap();
        assert!(header.starts_with("flash="));
        assert!(header.contains("Path=/"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }
}
