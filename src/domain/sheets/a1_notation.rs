use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

use super::column::{parse_col, Column};

/// A validated A1 range such as `B2`, `Sheet1!B2`, `'Tally sheet'!B2:B9` or `A:H`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum A1NotationParseError {
    #[error("Empty range")]
    Empty,
    #[error("Empty sheet title")]
    EmptySheetTitle,
    #[error("Invalid cell reference: {0:?}")]
    InvalidReference(String),
    #[error("Row number cannot be zero")]
    ZeroRow,
}

pub struct A1NotationParts<'a> {
    pub sheet_title: Option<String>,
    pub start: &'a str,
    pub end: Option<&'a str>,
}

impl A1Notation {
    /// Single cell, optionally qualified with a sheet title.
    pub fn cell(col: Column, row: u32, sheet_title: Option<&str>) -> Self {
        A1Notation(format!("{}{}{}", sheet_prefix(sheet_title), col, row))
    }

    pub fn parts(&self) -> A1NotationParts<'_> {
        generic_a1_notation_split(&self.0)
    }

    pub fn sheet_title(&self) -> Option<String> {
        self.parts().sheet_title
    }
}

fn sheet_prefix(sheet_title: Option<&str>) -> String {
    match sheet_title {
        Some(title) => format!("'{}'!", title.replace('\'', "''")),
        None => String::new(),
    }
}

fn generic_a1_notation_split(a1_notation: &str) -> A1NotationParts<'_> {
    let (sheet_title, local) = match a1_notation.rfind('!') {
        Some(index) => {
            let raw_title = &a1_notation[..index];
            let title = match raw_title
                .strip_prefix('\'')
                .and_then(|t| t.strip_suffix('\''))
            {
                Some(quoted) => quoted.replace("''", "'"),
                None => raw_title.to_owned(),
            };
            (Some(title), &a1_notation[index + 1..])
        }
        None => (None, a1_notation),
    };

    let (start, end) = match local.split_once(':') {
        Some((start, end)) => (start, Some(end)),
        None => (local, None),
    };

    A1NotationParts {
        sheet_title,
        start,
        end,
    }
}

fn validate_reference(reference: &str) -> Result<(), A1NotationParseError> {
    let invalid = || A1NotationParseError::InvalidReference(reference.to_owned());

    let split_at = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    let (letters, digits) = reference.split_at(split_at);

    if letters.is_empty() && digits.is_empty() {
        return Err(invalid());
    }
    if !letters.is_empty() {
        parse_col(letters).map_err(|_| invalid())?;
    }
    if !digits.is_empty() {
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(A1NotationParseError::ZeroRow);
        }
    }
    Ok(())
}

impl FromStr for A1Notation {
    type Err = A1NotationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(A1NotationParseError::Empty);
        }

        let parts = generic_a1_notation_split(s);
        if matches!(parts.sheet_title.as_deref(), Some("")) {
            return Err(A1NotationParseError::EmptySheetTitle);
        }
        validate_reference(parts.start)?;
        if let Some(end) = parts.end {
            validate_reference(end)?;
        }

        Ok(A1Notation(s.to_owned()))
    }
}

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
