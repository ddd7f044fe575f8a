//! Language selection and the catalog markets that represent it.
//!
//! A language maps to markets in priority order. Only the first one is used
//! to bias searches; there is no multi-market union.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Any,
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Hi,
    Ja,
    Ko,
    Zh,
    Ru,
    Ar,
    Tr,
}

impl Language {
    pub const ALL: [Language; 14] = [
        Language::Any,
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::It,
        Language::Pt,
        Language::Hi,
        Language::Ja,
        Language::Ko,
        Language::Zh,
        Language::Ru,
        Language::Ar,
        Language::Tr,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Any => "any",
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Hi => "hi",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Zh => "zh",
            Language::Ru => "ru",
            Language::Ar => "ar",
            Language::Tr => "tr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Any => "Any Language",
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::It => "Italian",
            Language::Pt => "Portuguese",
            Language::Hi => "Hindi",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Zh => "Chinese",
            Language::Ru => "Russian",
            Language::Ar => "Arabic",
            Language::Tr => "Turkish",
        }
    }

    /// Markets in priority order; empty for [`Language::Any`].
    pub fn markets(&self) -> &'static [&'static str] {
        match self {
            Language::Any => &[],
            Language::En => &["US", "GB", "CA", "AU"],
            Language::Es => &["ES", "MX", "AR", "CO"],
            Language::Fr => &["FR", "CA"],
            Language::De => &["DE", "AT", "CH"],
            Language::It => &["IT"],
            Language::Pt => &["PT", "BR"],
            Language::Hi => &["IN"],
            Language::Ja => &["JP"],
            Language::Ko => &["KR"],
            Language::Zh => &["TW", "HK", "SG"],
            Language::Ru => &["RU"],
            Language::Ar => &["EG", "SA", "AE"],
            Language::Tr => &["TR"],
        }
    }

    /// Representative market used for search and recommendation biasing.
    pub fn market(&self) -> Option<&'static str> {
        self.markets().first().copied()
    }

    pub fn is_any(&self) -> bool {
        *self == Language::Any
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.code() == needle)
            .ok_or_else(|| format!("unknown language '{s}'"))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Market code for a language code; `None` for "any" and unknown codes.
pub fn language_to_market(code: &str) -> Option<&'static str> {
    code.parse::<Language>().ok().and_then(|l| l.market())
}
