use crate::error::BuddyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Config key the dashboard stores its own UI language under.
pub const PLUGIN_LANGUAGE_KEY: &str = "pluginLanguage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::ZhCn => "zh-CN",
            Language::EnUs => "en-US",
        }
    }

    pub fn all() -> &'static [Language] {
        &[Language::ZhCn, Language::EnUs]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = BuddyError;

    /// Accepts the canonical codes case-insensitively, with `_` in place of `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-");
        Language::all()
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| BuddyError::InvalidLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes() {
        assert_eq!("zh-CN".parse::<Language>().unwrap(), Language::ZhCn);
        assert_eq!("en-us".parse::<Language>().unwrap(), Language::EnUs);
        assert_eq!("en_US".parse::<Language>().unwrap(), Language::EnUs);
    }

    #[test]
    fn rejects_unknown() {
        assert!(matches!(
            "fr-FR".parse::<Language>(),
            Err(BuddyError::InvalidLanguage(s)) if s == "fr-FR"
        ));
    }

    #[test]
    fn serde_uses_codes() {
        let yaml = serde_yaml::to_string(&Language::EnUs).unwrap();
        assert_eq!(yaml.trim(), "en-US");
        let back: Language = serde_yaml::from_str("zh-CN").unwrap();
        assert_eq!(back, Language::ZhCn);
    }
}
