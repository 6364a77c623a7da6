//! Fixed tables of languages accepted by the translation step.
//!
//! Callers may name a language either by its English name or by its code; matching ignores case
//! and surrounding whitespace. Source selectors additionally accept automatic detection.

use thiserror::Error;

/// A supported language and the code the translation endpoint expects for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageCode {
    /// Human-facing language name.
    pub name: &'static str,
    /// Code sent to the translation endpoint.
    pub code: &'static str,
}

/// Which side of the translation a selector was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageRole {
    /// Language of the summary before translation.
    Source,
    /// Language requested by the caller.
    Target,
}

impl std::fmt::Display for LanguageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// A language selector that is not present in the supported-language table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported {role} language '{selector}'")]
pub struct UnsupportedLanguage {
    /// Side of the translation the selector was supplied for.
    pub role: LanguageRole,
    /// Selector exactly as the caller supplied it.
    pub selector: String,
}

/// Automatic source-language detection.
pub const AUTO_DETECT: LanguageCode = LanguageCode {
    name: "auto",
    code: "auto",
};

/// Languages that can be requested as a translation target.
pub const LANGUAGES: &[LanguageCode] = &[
    LanguageCode { name: "arabic", code: "ar" },
    LanguageCode { name: "bengali", code: "bn" },
    LanguageCode { name: "chinese (simplified)", code: "zh-cn" },
    LanguageCode { name: "chinese (traditional)", code: "zh-tw" },
    LanguageCode { name: "czech", code: "cs" },
    LanguageCode { name: "danish", code: "da" },
    LanguageCode { name: "dutch", code: "nl" },
    LanguageCode { name: "english", code: "en" },
    LanguageCode { name: "filipino", code: "tl" },
    LanguageCode { name: "finnish", code: "fi" },
    LanguageCode { name: "french", code: "fr" },
    LanguageCode { name: "german", code: "de" },
    LanguageCode { name: "greek", code: "el" },
    LanguageCode { name: "hebrew", code: "iw" },
    LanguageCode { name: "hindi", code: "hi" },
    LanguageCode { name: "hungarian", code: "hu" },
    LanguageCode { name: "indonesian", code: "id" },
    LanguageCode { name: "italian", code: "it" },
    LanguageCode { name: "japanese", code: "ja" },
    LanguageCode { name: "korean", code: "ko" },
    LanguageCode { name: "malay", code: "ms" },
    LanguageCode { name: "norwegian", code: "no" },
    LanguageCode { name: "persian", code: "fa" },
    LanguageCode { name: "polish", code: "pl" },
    LanguageCode { name: "portuguese", code: "pt" },
    LanguageCode { name: "romanian", code: "ro" },
    LanguageCode { name: "russian", code: "ru" },
    LanguageCode { name: "spanish", code: "es" },
    LanguageCode { name: "swahili", code: "sw" },
    LanguageCode { name: "swedish", code: "sv" },
    LanguageCode { name: "tamil", code: "ta" },
    LanguageCode { name: "thai", code: "th" },
    LanguageCode { name: "turkish", code: "tr" },
    LanguageCode { name: "ukrainian", code: "uk" },
    LanguageCode { name: "urdu", code: "ur" },
    LanguageCode { name: "vietnamese", code: "vi" },
];

/// Resolve the language the summary is written in.
pub fn resolve_source(selector: &str) -> Result<LanguageCode, UnsupportedLanguage> {
    let normalized = normalize(selector);
    if matches!(normalized.as_str(), "auto" | "detect") {
        return Ok(AUTO_DETECT);
    }
    lookup(&normalized).ok_or_else(|| UnsupportedLanguage {
        role: LanguageRole::Source,
        selector: selector.to_string(),
    })
}

/// Resolve the language the caller wants the summary translated into.
pub fn resolve_target(selector: &str) -> Result<LanguageCode, UnsupportedLanguage> {
    lookup(&normalize(selector)).ok_or_else(|| UnsupportedLanguage {
        role: LanguageRole::Target,
        selector: selector.to_string(),
    })
}

fn normalize(selector: &str) -> String {
    selector.trim().to_lowercase()
}

fn lookup(normalized: &str) -> Option<LanguageCode> {
    if normalized.is_empty() {
        return None;
    }
    LANGUAGES
        .iter()
        .find(|language| language.name == normalized || language.code == normalized)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_codes_case_insensitively() {
        assert_eq!(resolve_target("French").map(|l| l.code), Ok("fr"));
        assert_eq!(resolve_target(" de ").map(|l| l.code), Ok("de"));
        assert_eq!(resolve_source("ENGLISH").map(|l| l.code), Ok("en"));
    }

    #[test]
    fn source_accepts_auto_detection_but_target_does_not() {
        assert_eq!(resolve_source("auto"), Ok(AUTO_DETECT));
        assert_eq!(resolve_source("Detect"), Ok(AUTO_DETECT));
        let error = resolve_target("auto").expect_err("auto is not a target");
        assert_eq!(error.role, LanguageRole::Target);
    }

    #[test]
    fn unknown_selectors_are_reported_with_their_role() {
        let error = resolve_target("klingon").expect_err("unsupported");
        assert_eq!(error.selector, "klingon");
        assert_eq!(error.to_string(), "unsupported target language 'klingon'");

        let error = resolve_source("").expect_err("empty");
        assert_eq!(error.role, LanguageRole::Source);
    }

    #[test]
    fn table_codes_are_unique() {
        let mut codes: Vec<_> = LANGUAGES.iter().map(|language| language.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), LANGUAGES.len());
    }
}
