//! GCode Lexer
//!
//! Turns one raw line into a comment string, a cleaned line, and the
//! letter/number words found in the cleaned line.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Letter followed by an optional signed decimal number.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([GMXYZIJKRFSTPQABCUVWDEFHLN])([+-]?\d*\.?\d*)").expect("word pattern is valid")
});

/// Failure that aborts tokenization of the rest of a line
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// The numeric part of a word could not be read as a number.
    /// `missing` holds the letters seen without a value before it.
    #[error("invalid number '{text}' for {letter}")]
    InvalidNumber {
        letter: char,
        text: String,
        missing: Vec<char>,
    },
}

/// Words extracted from one cleaned line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineWords {
    /// G codes in the order they appear
    pub gcodes: Vec<i32>,
    /// M codes in the order they appear
    pub mcodes: Vec<i32>,
    /// Every other word; a repeated letter keeps its last value
    pub parameters: BTreeMap<char, f64>,
    /// Letters that appeared without a value
    pub missing_values: Vec<char>,
}

impl LineWords {
    /// True if any of X, Y, Z, A, B or C is present
    pub fn has_axis_words(&self) -> bool {
        ['X', 'Y', 'Z', 'A', 'B', 'C']
            .iter()
            .any(|axis| self.parameters.contains_key(axis))
    }
}

/// Extract the comment text of a line
///
/// The text after the first `;` comes first, followed by the content of the
/// first closed parenthesized span found before that `;`. Only that first
/// span is captured; later spans are dropped. The result is trimmed of
/// spaces and tabs.
pub fn extract_comment(line: &str) -> String {
    let (code, tail) = match line.find(';') {
        Some(idx) => (&line[..idx], Some(&line[idx + 1..])),
        None => (line, None),
    };

    let mut comment = tail.unwrap_or_default().to_string();

    if let Some(open) = code.find('(') {
        if let Some(close) = code[open..].find(')') {
            let paren = &code[open + 1..open + close];
            if !comment.is_empty() {
                comment.push(' ');
            }
            comment.push_str(paren);
        }
    }

    comment.trim_matches([' ', '\t']).to_string()
}

/// Strip comments, upper-case and drop all whitespace
///
/// An unclosed `(` removes the rest of the line.
pub fn clean_line(line: &str) -> String {
    let code = line.find(';').map_or(line, |idx| &line[..idx]);

    let mut without_comments = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(open) = rest.find('(') {
        without_comments.push_str(&rest[..open]);
        match rest[open..].find(')') {
            Some(close) => rest = &rest[open + close + 1..],
            None => rest = "",
        }
    }
    without_comments.push_str(rest);

    without_comments
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Scan a cleaned line for words
///
/// A letter with an empty value is recorded in `missing_values` and skipped.
/// A value that is present but not a number stops the scan; the error keeps
/// the letters already recorded as missing.
pub fn extract_words(cleaned: &str) -> Result<LineWords, LexError> {
    let mut words = LineWords::default();

    for caps in WORD_RE.captures_iter(cleaned) {
        let Some(letter) = caps[1].chars().next() else {
            continue;
        };
        let text = &caps[2];

        if text.is_empty() {
            words.missing_values.push(letter);
            continue;
        }

        let value = match text.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                return Err(LexError::InvalidNumber {
                    letter,
                    text: text.to_string(),
                    missing: words.missing_values,
                });
            }
        };

        match letter {
            'G' => words.gcodes.push(value.trunc() as i32),
            'M' => words.mcodes.push(value.trunc() as i32),
            _ => {
                words.parameters.insert(letter, value);
            }
        }
    }

    Ok(words)
}
