//! Token lifetime strings (`"30s"`, `"15m"`, `"1h"`, `"7d"`, `"2w"`)

use std::fmt;

/// Lifetime used when a TTL string cannot be parsed
pub const FALLBACK_TTL_SECS: i64 = 86_400;

/// Longest accepted lifetime (10 years); larger values fall back
pub const MAX_TTL_SECS: i64 = 10 * 365 * 86_400;

/// Parsed token lifetime in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl(i64);

impl TokenTtl {
    /// Parse `<digits><unit>` with unit one of `s m h d w`.
    ///
    /// Anything else (including a zero amount, which would yield `exp == iat`,
    /// or a lifetime above [`MAX_TTL_SECS`]) falls back to one day and is logged.
    pub fn parse(input: &str) -> Self {
        match Self::try_parse(input) {
            Some(ttl) => ttl,
            None => {
                tracing::warn!(ttl = %input, "Unrecognized token TTL, using 1 day");
                Self(FALLBACK_TTL_SECS)
            }
        }
    }

    /// Strict parse; `None` for malformed input
    pub fn try_parse(input: &str) -> Option<Self> {
        let unit = input.chars().last()?;
        let digits = &input[..input.len() - unit.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let multiplier = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return None,
        };

        let amount: i64 = digits.parse().ok()?;
        let secs = amount.checked_mul(multiplier)?;
        (secs > 0 && secs <= MAX_TTL_SECS).then_some(Self(secs))
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TokenTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
