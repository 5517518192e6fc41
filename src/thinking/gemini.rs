use crate::error::ThinkerError;
use crate::thinking::config::ThinkerConfig;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode everything outside the unreserved set `A-Za-z0-9-_.~`.
pub fn url_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push('%');
            encoded.push(HEX[(byte >> 4) as usize] as char);
            encoded.push(HEX[(byte & 0x0f) as usize] as char);
        }
    }
    encoded
}

pub fn generate_content_url(base_url: &str, model: &str, api_key: &str) -> String {
    format!(
        "{}/models/{}:generateContent?key={}",
        base_url.trim_end_matches('/'),
        url_encode(model),
        url_encode(api_key)
    )
}

/// Blocking client for the `generateContent` endpoint. One instance lives
/// for a single invocation and is dropped with it.
pub struct GeminiClient {
    http: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &ThinkerConfig) -> Result<Self, ThinkerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.api_base_url.clone(),
        })
    }

    /// POST `payload` and return the raw response body for any 2xx status.
    pub fn call(&self, api_key: &str, model: &str, payload: &str) -> Result<String, ThinkerError> {
        let url = generate_content_url(&self.base_url, model, api_key);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ThinkerError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn hex_value(ch: char) -> Option<u32> {
    ch.to_digit(16)
}

fn read_hex4(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = chars.peek().copied().and_then(hex_value)?;
        chars.next();
        code = (code << 4) | digit;
    }
    Some(code)
}

fn decode_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    // Bad hex yields U+FFFD and the offending characters stay in the text.
    let Some(code) = read_hex4(chars) else {
        out.push(char::REPLACEMENT_CHARACTER);
        return;
    };

    if (0xD800..0xDC00).contains(&code) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = read_hex4(&mut lookahead)
                && (0xDC00..0xE000).contains(&low)
            {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                if let Some(ch) = char::from_u32(combined) {
                    out.push(ch);
                    *chars = lookahead;
                    return;
                }
            }
        }
    }

    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
}

/// Decode a JSON string body starting just after its opening quote, stopping
/// at the first unescaped `"` or end of input.
fn unescape_json_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => break,
            '\\' => {
                let Some(esc) = chars.next() else {
                    break;
                };
                match esc {
                    'b' => out.push('\u{0008}'),
                    'f' => out.push('\u{000C}'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => decode_unicode_escape(&mut chars, &mut out),
                    // covers `\\`, `\"`, `\/` and unknown escapes
                    other => out.push(other),
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Pull the first `"text"` string value out of a response body.
///
/// This is a first-occurrence scan, not a JSON parser: a `"text"` key nested
/// anywhere earlier in the body wins.
pub fn extract_text(response: &str) -> Result<String, ThinkerError> {
    const KEY: &str = "\"text\"";

    let key_pos = response.find(KEY).ok_or_else(|| {
        ThinkerError::MalformedResponse(format!(
            "Gemini response did not contain the expected text field: {response}"
        ))
    })?;
    let after_key = &response[key_pos + KEY.len()..];
    let colon = after_key.find(':').ok_or_else(|| {
        ThinkerError::MalformedResponse(format!(
            "Gemini response contained a malformed text field: {response}"
        ))
    })?;
    let value = after_key[colon + 1..].trim_start();
    let Some(body) = value.strip_prefix('"') else {
        return Err(ThinkerError::MalformedResponse(format!(
            "Gemini response text field was not a JSON string: {response}"
        )));
    };

    Ok(unescape_json_string(body))
}

#[cfg(test)]
mod tests {
    use super::{extract_text, generate_content_url, url_encode};
    use crate::error::ThinkerError;

    #[test]
    fn url_encode_keeps_unreserved_and_escapes_the_rest() {
        assert_eq!(url_encode("gemini-2.5-flash_lite~x"), "gemini-2.5-flash_lite~x");
        assert_eq!(url_encode("my model"), "my%20model");
        assert_eq!(url_encode("a/b?c=d"), "a%2Fb%3Fc%3Dd");
        assert_eq!(url_encode("é"), "%C3%A9");
    }

    #[test]
    fn url_places_model_and_key_in_fixed_segments() {
        let url = generate_content_url("https://example.test/v1beta/", "gemini x", "k+y");
        assert_eq!(
            url,
            "https://example.test/v1beta/models/gemini%20x:generateContent?key=k%2By"
        );
    }

    #[test]
    fn extract_text_decodes_escaped_quotes() {
        let got = extract_text(r#"{"a":1,"text":"hello \"world\""}"#).expect("text");
        assert_eq!(got, "hello \"world\"");
    }

    #[test]
    fn extract_text_decodes_newline_escape() {
        let got = extract_text(r#"{"text": "line\nbreak"}"#).expect("text");
        assert_eq!(got, "line\nbreak");
        assert_eq!(got.lines().count(), 2);
    }

    #[test]
    fn extract_text_reads_gemini_candidate_shape() {
        let body = r#"{
          "candidates": [
            {"content": {"parts": [{"text": "{\"category\": \"home\"}\n"}], "role": "model"}}
          ]
        }"#;
        let got = extract_text(body).expect("text");
        assert_eq!(got, "{\"category\": \"home\"}\n");
    }

    #[test]
    fn extract_text_takes_first_occurrence() {
        let got = extract_text(r#"{"meta":{"text":"first"},"text":"second"}"#).expect("text");
        assert_eq!(got, "first");
    }

    #[test]
    fn extract_text_handles_simple_and_unicode_escapes() {
        let got = extract_text(r#"{"text":"a\/b\tc\\d \u00e9\u4E2D \u0041 \q"}"#).expect("text");
        assert_eq!(got, "a/b\tc\\d é中 A q");
    }

    #[test]
    fn extract_text_joins_surrogate_pairs() {
        let got = extract_text(r#"{"text":"\ud83d\ude00!"}"#).expect("text");
        assert_eq!(got, "\u{1F600}!");
    }

    #[test]
    fn extract_text_replaces_lone_surrogates_and_bad_hex() {
        let got = extract_text(r#"{"text":"\ud83d x \uZZ"}"#).expect("text");
        assert_eq!(got, "\u{FFFD} x \u{FFFD}ZZ");
    }

    #[test]
    fn extract_text_rejects_missing_key() {
        let err = extract_text(r#"{"candidates":[]}"#).expect_err("no text key");
        assert!(matches!(err, ThinkerError::MalformedResponse(_)));
    }

    #[test]
    fn extract_text_rejects_missing_colon_and_non_string_values() {
        let err = extract_text(r#"["text"]"#).expect_err("no colon");
        assert!(matches!(err, ThinkerError::MalformedResponse(_)));

        let err = extract_text(r#"{"text": 42}"#).expect_err("not a string");
        assert!(matches!(err, ThinkerError::MalformedResponse(_)));
    }

    #[test]
    fn extract_text_returns_partial_value_when_unterminated() {
        let got = extract_text(r#"{"text":"cut off"#).expect("text");
        assert_eq!(got, "cut off");
    }
}
