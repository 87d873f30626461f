use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

/// 1-based spreadsheet column (`A` = 1).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(u32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnParseError {
    #[error("Empty column")]
    Empty,
    #[error("Non-alphabetic character in column")]
    NonAlphabeticCharacter,
    #[error("Column number cannot be zero")]
    Zero,
    #[error("Column is too large")]
    Overflow,
}

impl Column {
    pub const FIRST: Column = Column(1);

    pub fn try_new(value: u32) -> Result<Self, ColumnParseError> {
        if value == 0 {
            return Err(ColumnParseError::Zero);
        }
        Ok(Column(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_col(s)
    }
}

pub fn parse_col<T: AsRef<str>>(col_str: T) -> Result<Column, ColumnParseError> {
    let col_str = col_str.as_ref();
    if col_str.is_empty() {
        return Err(ColumnParseError::Empty);
    }
    if col_str.chars().any(|c| !c.is_ascii_alphabetic()) {
        return Err(ColumnParseError::NonAlphabeticCharacter);
    }

    let col_num = col_str
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c as u32 - 'A' as u32 + 1)
        })
        .ok_or(ColumnParseError::Overflow)?;

    Ok(Column(col_num))
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_display() {
        assert_eq!(Column(1).to_string(), "A");
        assert_eq!(Column(26).to_string(), "Z");
        assert_eq!(Column(27).to_string(), "AA");
        assert_eq!(Column(52).to_string(), "AZ");
        assert_eq!(Column(53).to_string(), "BA");
        assert_eq!(Column(26 * 26 * 26 + 26 * 26 + 1).to_string(), "ZZA");
    }

    #[test]
    fn test_parse_col_valid() {
        assert_eq!(parse_col("A").unwrap(), Column(1));
        assert_eq!(parse_col("a").unwrap(), Column(1));
        assert_eq!(parse_col("Z").unwrap(), Column(26));
        assert_eq!(parse_col("AB").unwrap(), Column(28));
        assert_eq!(parse_col("zZz").unwrap(), Column(26 * 26 * 26 + 26 * 26 + 26));
    }

    #[test]
    fn test_parse_col_invalid() {
        assert_eq!(parse_col("A1"), Err(ColumnParseError::NonAlphabeticCharacter));
        assert_eq!(parse_col("$"), Err(ColumnParseError::NonAlphabeticCharacter));
        assert_eq!(parse_col(""), Err(ColumnParseError::Empty));
        assert_eq!(parse_col("ZZZZZZZZZZ"), Err(ColumnParseError::Overflow));
    }

    #[test]
    fn test_try_new_rejects_zero() {
        assert_eq!(Column::try_new(0), Err(ColumnParseError::Zero));
        assert_eq!(Column::try_new(3).unwrap().value(), 3);
    }
}
