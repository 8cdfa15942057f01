// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Minimal EDN (extensible data notation) value model, parser, and printer.
//!
//! XTDB's query language is expressed in EDN. Rather than splicing caller
//! strings into query templates, this module gives query construction a small
//! abstract syntax: parse a caller's pull expression into a [`Value`], build
//! the surrounding query as a tree, and render the whole thing back to text.
//! An ill-formed pull expression is caught here, before any request is sent.
//!
//! The subset covered is what the HTTP API traffics in: nil, booleans,
//! integers, floats, strings, keywords, symbols, lists, vectors, maps, and
//! sets. Tagged literals are not supported.

use std::fmt;

use thiserror::Error;

/// Error produced when EDN text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Byte offset into the input where parsing failed.
    pub position: usize,
}

/// An EDN value.
///
/// Maps preserve insertion order as a pair list; the HTTP API never relies on
/// map key hashing and ordered rendering keeps output deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A keyword, stored without the leading `:`.
    Keyword(String),
    Symbol(String),
    List(Vec<Value>),
    Vector(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
}

impl Value {
    /// Convenience constructor for a symbol.
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(name.to_owned())
    }

    /// Convenience constructor for a keyword (pass the name without `:`).
    pub fn keyword(name: &str) -> Self {
        Value::Keyword(name.to_owned())
    }

    /// Convert a JSON value into its natural EDN counterpart.
    ///
    /// Object keys become keywords, mirroring how XTDB documents are written
    /// in EDN. Used when a request body is sent with the `application/edn`
    /// content type.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Vector(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::Keyword(k.clone()), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write_string_literal(f, s),
            Value::Keyword(k) => write!(f, ":{k}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(items) => write_seq(f, "(", ")", items),
            Value::Vector(items) => write_seq(f, "[", "]", items),
            Value::Set(items) => write_seq(f, "#{", "}", items),
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, close: &str, items: &[Value]) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{ch}")?,
        }
    }
    write!(f, "\"")
}

/// Parse a complete EDN value from `input`.
///
/// Trailing whitespace is permitted; any other trailing content is an error.
pub fn parse(input: &str) -> Result<Value, ParseError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing content after EDN value"));
    }
    Ok(value)
}

/// Characters that terminate a symbol, keyword, or number token.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'"' | b';' | b',' | b' ' | b'\t' | b'\n' | b'\r'
    )
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_owned(),
            position: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Skip whitespace, commas (whitespace in EDN), and `;` line comments.
    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b',' => self.pos += 1,
                b';' => {
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'(') => {
                self.pos += 1;
                self.parse_seq(b')').map(Value::List)
            }
            Some(b'[') => {
                self.pos += 1;
                self.parse_seq(b']').map(Value::Vector)
            }
            Some(b'{') => {
                self.pos += 1;
                self.parse_map()
            }
            Some(b'#') => {
                if self.bytes.get(self.pos + 1) == Some(&b'{') {
                    self.pos += 2;
                    self.parse_seq(b'}').map(Value::Set)
                } else {
                    Err(self.error("tagged literals are not supported"))
                }
            }
            Some(b'"') => {
                self.pos += 1;
                self.parse_string()
            }
            Some(b':') => {
                self.pos += 1;
                let name = self.take_token();
                if name.is_empty() {
                    return Err(self.error("empty keyword"));
                }
                Ok(Value::Keyword(name))
            }
            Some(b')') | Some(b']') | Some(b'}') => Err(self.error("unbalanced closing delimiter")),
            Some(_) => self.parse_token(),
        }
    }

    fn parse_seq(&mut self, close: u8) -> Result<Vec<Value>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated collection")),
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value, ParseError> {
        let items = self.parse_seq(b'}')?;
        if items.len() % 2 != 0 {
            return Err(self.error("map literal with odd number of forms"));
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k, v));
        }
        Ok(Value::Map(pairs))
    }

    fn parse_string(&mut self) -> Result<Value, ParseError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(Value::Str(out));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| self.error("unterminated escape"))?;
                    self.pos += 1;
                    match escaped {
                        b'"' => out.push('"'),
                        b'\\' => out.push('\\'),
                        b'n' => out.push('\n'),
                        b't' => out.push('\t'),
                        b'r' => out.push('\r'),
                        _ => return Err(self.error("unsupported string escape")),
                    }
                }
                Some(_) => {
                    // Consume one whole UTF-8 character.
                    let rest = &self.bytes[self.pos..];
                    let s = std::str::from_utf8(rest).map_err(|_| self.error("invalid UTF-8"))?;
                    let ch = s.chars().next().ok_or_else(|| self.error("unterminated string"))?;
                    out.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    /// Consume a bare token (symbol, keyword body, number, nil, or boolean).
    fn take_token(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn parse_token(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let token = self.take_token();
        if token.is_empty() {
            return Err(self.error("unexpected character"));
        }
        match token.as_str() {
            "nil" => return Ok(Value::Nil),
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        let first = token.as_bytes()[0];
        let second_is_digit = token.as_bytes().get(1).is_some_and(|b| b.is_ascii_digit());
        if first.is_ascii_digit() || ((first == b'+' || first == b'-') && second_is_digit) {
            if token.contains(['.', 'e', 'E']) {
                token.parse::<f64>().map(Value::Float).map_err(|_| ParseError {
                    message: format!("invalid float literal '{token}'"),
                    position: start,
                })
            } else {
                token.parse::<i64>().map(Value::Int).map_err(|_| ParseError {
                    message: format!("invalid integer literal '{token}'"),
                    position: start,
                })
            }
        } else {
            Ok(Value::Symbol(token))
        }
    }
}
