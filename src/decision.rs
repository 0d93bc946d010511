use std::fmt;

use crate::matcher::MatchResult;

/// Default similarity threshold. The live value comes from
/// [`crate::config::Config`].
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Final user-facing outcome of a query. An `Unknown` verdict is a
/// classification result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Recognized(String),
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Recognized(name) => write!(f, "Recognized: {name}"),
            Verdict::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Strictly greater: a score exactly at the threshold stays Unknown.
pub fn decide(result: &MatchResult, threshold: f32) -> Verdict {
    match &result.identity {
        Some(name) if result.score > threshold => Verdict::Recognized(name.clone()),
        _ => Verdict::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(identity: Option<&str>, score: f32) -> MatchResult {
        MatchResult {
            identity: identity.map(str::to_string),
            score,
        }
    }

    #[test]
    fn test_above_threshold_is_recognized() {
        let verdict = decide(&result(Some("alice"), 0.8), DEFAULT_THRESHOLD);
        assert_eq!(verdict, Verdict::Recognized("alice".to_string()));
    }

    #[test]
    fn test_exactly_at_threshold_is_unknown() {
        let verdict = decide(&result(Some("alice"), 0.5), DEFAULT_THRESHOLD);
        assert_eq!(verdict, Verdict::Unknown);
    }

    #[test]
    fn test_below_threshold_is_unknown() {
        let verdict = decide(&result(Some("alice"), 0.0), DEFAULT_THRESHOLD);
        assert_eq!(verdict, Verdict::Unknown);
    }

    #[test]
    fn test_no_identity_is_unknown() {
        let verdict = decide(&result(None, -1.0), DEFAULT_THRESHOLD);
        assert_eq!(verdict, Verdict::Unknown);
    }

    #[test]
    fn test_verdict_rendering() {
        assert_eq!(
            Verdict::Recognized("bob".to_string()).to_string(),
            "Recognized: bob"
        );
        assert_eq!(Verdict::Unknown.to_string(), "Unknown");
    }
}
