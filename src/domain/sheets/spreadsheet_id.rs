use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpreadsheetIdError {
    #[error("Spreadsheet id is empty")]
    Empty,
    #[error("Published (/d/e/) spreadsheet links are read-only, use the edit link instead")]
    PublishedUrl,
    #[error("Could not find a spreadsheet id in URL {0:?}")]
    UnrecognizedUrl(String),
    #[error("Spreadsheet id contains invalid characters: {0:?}")]
    InvalidCharacters(String),
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl SpreadsheetId {
    /// Accepts a bare id or an edit link like
    /// `https://docs.google.com/spreadsheets/d/<id>/edit?usp=sharing`.
    pub fn parse(input: &str) -> Result<Self, SpreadsheetIdError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SpreadsheetIdError::Empty);
        }

        if input.contains("/d/e/") {
            return Err(SpreadsheetIdError::PublishedUrl);
        }

        let candidate = match input.split_once("/d/") {
            Some((_, rest)) => rest
                .split(|c: char| c == '/' || c == '?' || c == '#')
                .next()
                .unwrap_or_default(),
            None if input.contains("://") => {
                return Err(SpreadsheetIdError::UnrecognizedUrl(input.to_owned()))
            }
            None => input,
        };

        if candidate.is_empty() {
            return Err(SpreadsheetIdError::UnrecognizedUrl(input.to_owned()));
        }
        if !candidate.chars().all(is_id_char) {
            return Err(SpreadsheetIdError::InvalidCharacters(candidate.to_owned()));
        }

        Ok(SpreadsheetId(candidate.to_owned()))
    }
}

impl FromStr for SpreadsheetId {
    type Err = SpreadsheetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpreadsheetId::parse(s)
    }
}

impl std::fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SpreadsheetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id() {
        let id = SpreadsheetId::parse("12I3l5W2CBLvuyMpSnau9NiHBMpmIeptQTcP6vUjY-ls").unwrap();
        assert_eq!(id.as_ref(), "12I3l5W2CBLvuyMpSnau9NiHBMpmIeptQTcP6vUjY-ls");
    }

    #[test]
    fn test_edit_url() {
        let id = SpreadsheetId::parse(
            "https://docs.google.com/spreadsheets/d/12I3l5W2CBLvuyMpSnau9NiHBMpmIeptQTcP6vUjY-ls/edit?usp=sharing",
        )
        .unwrap();
        assert_eq!(id.to_string(), "12I3l5W2CBLvuyMpSnau9NiHBMpmIeptQTcP6vUjY-ls");
    }

    #[test]
    fn test_url_without_trailing_path() {
        let id = SpreadsheetId::parse("https://docs.google.com/spreadsheets/d/abc_123?x=1").unwrap();
        assert_eq!(id.as_ref(), "abc_123");
    }

    #[test]
    fn test_published_url_is_rejected() {
        let result = SpreadsheetId::parse(
            "https://docs.google.com/spreadsheets/d/e/2PACX-1vabc/pubhtml",
        );
        assert_eq!(result, Err(SpreadsheetIdError::PublishedUrl));
    }

    #[test]
    fn test_unrecognized_inputs() {
        assert_eq!(SpreadsheetId::parse("  "), Err(SpreadsheetIdError::Empty));
        assert!(matches!(
            SpreadsheetId::parse("https://example.com/sheet"),
            Err(SpreadsheetIdError::UnrecognizedUrl(_))
        ));
        assert!(matches!(
            SpreadsheetId::parse("not an id"),
            Err(SpreadsheetIdError::InvalidCharacters(_))
        ));
    }
}
