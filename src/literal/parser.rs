//! # Recursive-descent table literal parser.
//!
//! Grammar (informal):
//! ```text
//! document := <anything> '=' table | table
//! table    := '{' (key '=' value ','?)* '}'
//! key      := '[' (number | string) ']'
//! value    := table | key | string | number | 'true' | 'false' | 'nil' | <nil>
//! string   := '"' <raw chars, no escapes> '"'
//! number   := '-'? (digit | '.')*          at most one '.', read greedily
//! ```
//!
//! ## Rules
//! - `-- ` comments are stripped to end of line before parsing.
//! - Whitespace is skipped everywhere except inside strings.
//! - An unrecognised value decodes to `Nil` and consumes nothing; the next expected token
//!   then reports the error.
//! - Malformed numbers (`-`, `.`) decode to `NaN`.
//! - Strings have no escape handling.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use super::value::{DecodeOptions, Decoded, Key};
use crate::error::DecodeError;

/// Decodes `name = { ... }` (or a bare `{ ... }`) into a [`Decoded`] tree.
///
/// # Example
/// ```
/// use dcs_bridge::literal::{parse_literal, DecodeOptions, Decoded};
///
/// let opts = DecodeOptions { emit_arrays: true, ..Default::default() };
/// let v = parse_literal(r#"names = { [1] = "a", [2] = "b" }"#, opts).unwrap();
/// assert_eq!(v, Decoded::Array(vec![Decoded::String("a".into()), Decoded::String("b".into())]));
/// ```
pub fn parse_literal(text: &str, opts: DecodeOptions) -> Result<Decoded, DecodeError> {
    let stripped = strip_comments(text);
    let mut p = Parser::new(&stripped, opts);
    p.skip_assignment()?;
    p.table()
}

/// Decodes a table literal straight into `T`.
pub fn decode<T: DeserializeOwned>(text: &str, opts: DecodeOptions) -> Result<T, DecodeError> {
    let tree = parse_literal(text, opts)?;
    Ok(serde_json::from_value(tree.to_json())?)
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find("-- ") {
            Some(at) => &line[..at],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    opts: DecodeOptions,
}

impl Parser {
    fn new(text: &str, opts: DecodeOptions) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            opts,
        }
    }

    /// Next non-whitespace char, not consumed.
    fn peek(&mut self) -> Option<char> {
        while let Some(c) = self.chars.get(self.pos).copied() {
            if !c.is_whitespace() {
                return Some(c);
            }
            self.pos += 1;
        }
        None
    }

    /// Next char, skipping whitespace unless `raw`.
    fn read(&mut self, raw: bool) -> Option<char> {
        while let Some(c) = self.chars.get(self.pos).copied() {
            self.pos += 1;
            if raw || !c.is_whitespace() {
                return Some(c);
            }
        }
        None
    }

    fn starts_with(&mut self, word: &str) -> bool {
        self.peek();
        word.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn expect(&mut self, token: &str) -> Result<(), DecodeError> {
        self.peek();
        let offset = self.pos;
        let mut found = String::new();
        for _ in token.chars() {
            match self.read(false) {
                Some(c) => found.push(c),
                None => {
                    return Err(DecodeError::UnexpectedEnd {
                        expected: token.to_string(),
                    });
                }
            }
        }
        if found != token {
            return Err(DecodeError::Unexpected {
                expected: token.to_string(),
                found,
                offset,
            });
        }
        Ok(())
    }

    /// Skips `name =` unless the document starts with a table.
    fn skip_assignment(&mut self) -> Result<(), DecodeError> {
        if self.peek() == Some('{') {
            return Ok(());
        }
        loop {
            match self.read(false) {
                Some('=') => return Ok(()),
                Some(_) => continue,
                None => {
                    return Err(DecodeError::UnexpectedEnd {
                        expected: "=".to_string(),
                    });
                }
            }
        }
    }

    fn table(&mut self) -> Result<Decoded, DecodeError> {
        self.expect("{")?;
        let mut entries = BTreeMap::new();
        loop {
            match self.peek() {
                Some('}') => break,
                None => {
                    return Err(DecodeError::UnexpectedEnd {
                        expected: "}".to_string(),
                    });
                }
                Some(_) => {}
            }
            let key = self.key()?;
            self.expect("=")?;
            let value = self.value()?;
            entries.insert(key, value);
            if self.peek() == Some(',') {
                self.read(false);
            }
        }
        self.expect("}")?;
        Ok(self.shape(entries))
    }

    /// Array inference and the empty-table switch.
    ///
    /// Keys must be exactly `1..=n`. A run that starts above 1 (`{[2]=..,[3]=..}`) stays a
    /// table. This differs on purpose from a walk that starts one below the smallest key.
    fn shape(&self, entries: BTreeMap<Key, Decoded>) -> Decoded {
        if entries.is_empty() {
            return if self.opts.empty_table_absent {
                Decoded::Absent
            } else {
                Decoded::Table(entries)
            };
        }
        // BTreeMap iterates integer keys in ascending order, ahead of any string key.
        let sequential = entries
            .keys()
            .zip(1i64..)
            .all(|(k, expected)| *k == Key::Int(expected));
        if sequential && self.opts.emit_arrays {
            return Decoded::Array(entries.into_values().collect());
        }
        Decoded::Table(entries)
    }

    fn key(&mut self) -> Result<Key, DecodeError> {
        self.expect("[")?;
        let key = match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '-' => {
                let (raw, n) = self.number();
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
                    Key::Int(n as i64)
                } else {
                    Key::Str(raw)
                }
            }
            _ => Key::Str(self.string()?),
        };
        self.expect("]")?;
        Ok(key)
    }

    fn value(&mut self) -> Result<Decoded, DecodeError> {
        match self.peek() {
            Some('{') => self.table(),
            Some('[') => {
                // Bracket literal in value position keeps its number type.
                self.expect("[")?;
                let literal = match self.peek() {
                    Some(c) if c.is_ascii_digit() || c == '-' => Decoded::Number(self.number().1),
                    _ => Decoded::String(self.string()?),
                };
                self.expect("]")?;
                Ok(literal)
            }
            Some('"') => self.string().map(Decoded::String),
            Some(c) if c.is_ascii_digit() || c == '-' => Ok(Decoded::Number(self.number().1)),
            Some('f') if self.starts_with("false") => {
                self.pos += "false".len();
                Ok(Decoded::Bool(false))
            }
            Some('t') if self.starts_with("true") => {
                self.pos += "true".len();
                Ok(Decoded::Bool(true))
            }
            Some('n') if self.starts_with("nil") => {
                self.pos += "nil".len();
                Ok(Decoded::Nil)
            }
            _ => Ok(Decoded::Nil),
        }
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        self.expect("\"")?;
        let offset = self.pos.saturating_sub(1);
        let mut contents = String::new();
        loop {
            match self.read(true) {
                Some('"') => return Ok(contents),
                Some(c) => contents.push(c),
                None => return Err(DecodeError::UnterminatedString { offset }),
            }
        }
    }

    /// Greedy number read; returns the raw text and its value (`NaN` when malformed).
    fn number(&mut self) -> (String, f64) {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            let accept = c.is_ascii_digit()
                || (c == '.' && !raw.contains('.'))
                || (c == '-' && raw.is_empty());
            if !accept {
                break;
            }
            raw.push(c);
            self.pos += 1;
        }
        let n = raw.parse::<f64>().unwrap_or(f64::NAN);
        (raw, n)
    }
}
