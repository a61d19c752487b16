//! OpenStep ASCII property-list parser.
//!
//! `project.pbxproj` is written in the old NeXTSTEP plist grammar:
//!
//! ```text
//! // !$*UTF8*$!
//! {
//!     archiveVersion = 1;
//!     objects = {
//!         0123ABCD /* Example */ = { isa = PBXGroup; children = ( ... ); };
//!     };
//! }
//! ```
//!
//! Values are strings (quoted or bare), `( ... )` arrays, `{ ... }`
//! dictionaries and `< ... >` hex data. `//` and `/* */` comments may appear
//! anywhere whitespace may.

use std::collections::BTreeMap;

use thiserror::Error;

/// A property-list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Data(Vec<u8>),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Data(_) => "data",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
        }
    }
}

/// Syntax error with the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct PlistError {
    pub offset: usize,
    pub message: String,
}

/// Parse a complete property list.
pub fn parse(src: &str) -> Result<Value, PlistError> {
    let mut parser = Parser::new(src);

    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;

    if !parser.at_end() {
        return Err(parser.error("unexpected content after the top-level value"));
    }

    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn error(&self, message: impl Into<String>) -> PlistError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> PlistError {
        PlistError {
            offset,
            message: message.into(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), PlistError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected `{}`, found `{}`",
                byte as char,
                describe_byte(b)
            ))),
            None => Err(self.error(format!("expected `{}`, found end of input", byte as char))),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), PlistError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => self.pos += 1,
                (Some(b'/'), Some(b'/')) => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(self.error_at(start, "unterminated comment")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, PlistError> {
        match self.peek() {
            Some(b'{') => self.parse_dictionary(),
            Some(b'(') => self.parse_array(),
            Some(b'<') => self.parse_data(),
            Some(b'"') | Some(b'\'') => self.parse_quoted().map(Value::String),
            Some(b) if is_unquoted(b) => Ok(Value::String(self.parse_unquoted())),
            Some(b) => Err(self.error(format!("unexpected `{}`", describe_byte(b)))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dictionary(&mut self) -> Result<Value, PlistError> {
        self.expect(b'{')?;
        let mut map = BTreeMap::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Dictionary(map));
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(b'=')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            self.skip_trivia()?;
            self.expect(b';')?;

            map.insert(key, value);
        }
    }

    fn parse_key(&mut self) -> Result<String, PlistError> {
        match self.peek() {
            Some(b'"') | Some(b'\'') => self.parse_quoted(),
            Some(b) if is_unquoted(b) => Ok(self.parse_unquoted()),
            Some(b) => Err(self.error(format!(
                "expected a dictionary key, found `{}`",
                describe_byte(b)
            ))),
            None => Err(self.error("unterminated dictionary")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, PlistError> {
        self.expect(b'(')?;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b')') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.parse_value()?);
            self.skip_trivia()?;

            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {}
                Some(b) => {
                    return Err(self.error(format!(
                        "expected `,` or `)`, found `{}`",
                        describe_byte(b)
                    )))
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_data(&mut self) -> Result<Value, PlistError> {
        let start = self.pos;
        self.expect(b'<')?;
        let mut digits = Vec::new();

        loop {
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b) if b.is_ascii_hexdigit() => {
                    digits.push(hex_value(b));
                    self.pos += 1;
                }
                Some(b) => {
                    return Err(self.error(format!(
                        "invalid character `{}` in data",
                        describe_byte(b)
                    )))
                }
                None => return Err(self.error_at(start, "unterminated data")),
            }
        }

        if digits.len() % 2 != 0 {
            return Err(self.error_at(start, "data has an odd number of hex digits"));
        }

        Ok(Value::Data(
            digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect(),
        ))
    }

    fn parse_unquoted(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_unquoted(b)) {
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_quoted(&mut self) -> Result<String, PlistError> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Err(self.error("expected a quoted string"));
        };
        self.pos += 1;

        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some(b) if b == quote => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn parse_escape(&mut self, out: &mut String) -> Result<(), PlistError> {
        let escape_start = self.pos - 1;
        let Some(b) = self.peek() else {
            return Err(self.error_at(escape_start, "unterminated escape sequence"));
        };

        match b {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'a' => out.push('\u{07}'),
            b'b' => out.push('\u{08}'),
            b'f' => out.push('\u{0C}'),
            b'v' => out.push('\u{0B}'),
            b'U' | b'u' => {
                self.pos += 1;
                let hex = self
                    .src
                    .get(self.pos..self.pos + 4)
                    .filter(|h| h.bytes().all(|c| c.is_ascii_hexdigit()))
                    .ok_or_else(|| self.error_at(escape_start, "invalid unicode escape"))?;
                let code = u32::from_str_radix(hex, 16)
                    .map_err(|_| self.error_at(escape_start, "invalid unicode escape"))?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                self.pos += 4;
                return Ok(());
            }
            b'0'..=b'7' => {
                let mut code: u32 = 0;
                let mut len = 0;
                while len < 3 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            code = code * 8 + u32::from(d - b'0');
                            self.pos += 1;
                            len += 1;
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                return Ok(());
            }
            _ => {
                // `\"`, `\\`, `\'` and unknown escapes stand for the character itself
                let ch = self.src[self.pos..]
                    .chars()
                    .next()
                    .ok_or_else(|| self.error_at(escape_start, "unterminated escape sequence"))?;
                out.push(ch);
                self.pos += ch.len_utf8();
                return Ok(());
            }
        }

        self.pos += 1;
        Ok(())
    }
}

fn is_unquoted(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'+' | b'/' | b':' | b'.' | b'-')
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

fn describe_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        (b as char).to_string()
    } else {
        format!("\\x{:02x}", b)
    }
}
