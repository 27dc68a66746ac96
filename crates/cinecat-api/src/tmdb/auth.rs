//! TMDB credential handling.
//!
//! TMDB accepts two kinds of credentials: a v4 read access token sent as
//! `Authorization: Bearer ...`, and a v3 API key sent as the `api_key`
//! query parameter. Users paste either one, so the client guesses which
//! kind it holds and falls back to the other scheme when the guess fails.

use std::fmt;

/// Prefix of a JWT (`{"alg"...` base64-encoded), which v4 tokens are.
const JWT_PREFIX: &str = "eyJ";

/// Scheme word users sometimes paste along with the token.
const BEARER_SCHEME: &str = "bearer";

/// A user-supplied TMDB credential (v3 API key or v4 bearer token).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Trimmed credential with any `Bearer ` prefix removed.
    value: String,
    /// Whether the raw input looked like a bearer token.
    bearer_style: bool,
}

impl Credential {
    /// Parses a raw credential string. Returns `None` for blank input.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(token) = strip_bearer_prefix(trimmed) {
            let token = token.trim_start();
            if token.is_empty() {
                return None;
            }
            return Some(Self {
                value: String::from(token),
                bearer_style: true,
            });
        }

        Some(Self {
            value: String::from(trimmed),
            bearer_style: trimmed.starts_with(JWT_PREFIX),
        })
    }

    /// Returns the token to send in the `Authorization` header, if the
    /// credential looks like a bearer token.
    ///
    /// This is a prefix heuristic. A v3 key that happens to start with
    /// `eyJ` is misclassified; the `api_key` fallback still covers it.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_style.then_some(self.value.as_str())
    }

    /// Returns the value to send as the `api_key` query parameter.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.value
    }

    /// Returns the credential with all but the last four characters masked.
    #[must_use]
    pub fn masked(&self) -> String {
        let visible: String = self
            .value
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let hidden = self.value.chars().count().saturating_sub(4);
        format!("{}{visible}", "*".repeat(hidden.min(12)))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("bearer_style", &self.bearer_style)
            .finish()
    }
}

/// Strips a case-insensitive `Bearer` scheme word.
///
/// The word must be followed by whitespace or end the input, so a key that
/// merely starts with the letters `bearer` is left alone.
fn strip_bearer_prefix(s: &str) -> Option<&str> {
    let head = s.get(..BEARER_SCHEME.len())?;
    if !head.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let rest = s.get(BEARER_SCHEME.len()..)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}
