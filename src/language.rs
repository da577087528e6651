//! Supported subtitle languages and text match strategy selection.
//!
//! Tokenized full-text search is built on word boundaries, which CJK text
//! does not have, so those languages fall back to raw substring containment
//! against the cue text. The mapping is pure and has no storage dependency.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The five languages subtitle files are published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ko")]
    Ko,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "ja")]
    Ja,
}

/// How a keyword is matched against cue text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Query against a pre-tokenized index, matching on word boundaries.
    TokenizedQuery,
    /// Substring containment against the raw cue text.
    Containment,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Ko,
        Language::En,
        Language::ZhCn,
        Language::ZhTw,
        Language::Ja,
    ];

    /// Wire/filename code for this language (`ko`, `zh-CN`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
            Language::ZhCn => "zh-CN",
            Language::ZhTw => "zh-TW",
            Language::Ja => "ja",
        }
    }

    /// Pick the match strategy for this language. Tokenized indexes silently
    /// miss CJK text, so those languages use containment search instead.
    pub fn match_strategy(&self) -> MatchStrategy {
        match self {
            Language::Ko | Language::Ja | Language::ZhCn | Language::ZhTw => {
                MatchStrategy::Containment
            }
            Language::En => MatchStrategy::TokenizedQuery,
        }
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ko" => Ok(Language::Ko),
            "en" => Ok(Language::En),
            "zh-CN" => Ok(Language::ZhCn),
            "zh-TW" => Ok(Language::ZhTw),
            "ja" => Ok(Language::Ja),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_languages_use_containment() {
        for lang in [Language::Ko, Language::Ja, Language::ZhCn, Language::ZhTw] {
            assert_eq!(lang.match_strategy(), MatchStrategy::Containment);
        }
    }

    #[test]
    fn english_uses_tokenized_query() {
        assert_eq!(Language::En.match_strategy(), MatchStrategy::TokenizedQuery);
    }

    #[test]
    fn codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!("fr".parse::<Language>().is_err());
        assert!("".parse::<Language>().is_err());
    }
}
