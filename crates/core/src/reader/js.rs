//! Reader for the `var NAME = [...];` data files a documentation build emits.
//!
//! Only the literal subset those files use is accepted: arrays, objects with
//! identifier/string/number keys, single- or double-quoted strings, numbers,
//! `null`, `true`, `false`, and comments between tokens.

use crate::error::{DocscopeError, Result};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct JsTable {
    pub name: String,
    pub value: Value,
}

/// Parse every top-level declaration in `src`, in source order.
pub fn parse_tables(src: &str) -> Result<Vec<JsTable>> {
    let mut cursor = Cursor::new(src);
    let mut tables = Vec::new();

    loop {
        cursor.skip_trivia()?;
        if cursor.at_end() {
            break;
        }
        match cursor.ident() {
            Some("var") | Some("let") | Some("const") => {}
            _ => return Err(cursor.error("expected a variable declaration")),
        }
        cursor.skip_trivia()?;
        let name = cursor
            .ident()
            .ok_or_else(|| cursor.error("expected a variable name"))?
            .to_string();
        cursor.skip_trivia()?;
        cursor.expect('=')?;
        let value = cursor.value()?;
        cursor.skip_trivia()?;
        cursor.eat(';');
        tables.push(JsTable { name, value });
    }

    Ok(tables)
}

/// Value of the declaration called `name`.
pub fn find_table(src: &str, name: &str) -> Result<Value> {
    parse_tables(src)?
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.value)
        .ok_or_else(|| DocscopeError::Parsing(format!("no table named '{}'", name)))
}

/// Value of the first declaration, whatever its name.
pub fn first_table(src: &str) -> Result<Value> {
    parse_tables(src)?
        .into_iter()
        .next()
        .map(|t| t.value)
        .ok_or_else(|| DocscopeError::Parsing("no table declared".to_string()))
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        // Generated files are occasionally written with a BOM
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self { src, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn error(&self, msg: &str) -> DocscopeError {
        let line = self.src[..self.pos].matches('\n').count() + 1;
        DocscopeError::Parsing(format!("{} at line {}", msg, line))
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += end;
            } else if trimmed.starts_with("/*") {
                let end = trimmed[2..]
                    .find("*/")
                    .ok_or_else(|| self.error("unterminated comment"))?;
                self.pos += end + 4;
            } else {
                return Ok(());
            }
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            let ok = if i == 0 {
                c.is_alphabetic() || c == '_' || c == '$'
            } else {
                c.is_alphanumeric() || c == '_' || c == '$'
            };
            if !ok {
                break;
            }
            end = i + c.len_utf8();
        }
        if end == 0 {
            return None;
        }
        self.pos += end;
        Some(&rest[..end])
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_trivia()?;
        match self.peek() {
            Some('[') => self.array(),
            Some('{') => self.object(),
            Some(q @ ('\'' | '"')) => {
                self.bump();
                self.string(q).map(Value::String)
            }
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(_) => match self.ident() {
                Some("null") | Some("undefined") => Ok(Value::Null),
                Some("true") => Ok(Value::Bool(true)),
                Some("false") => Ok(Value::Bool(false)),
                _ => Err(self.error("unexpected token")),
            },
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn array(&mut self) -> Result<Value> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                break;
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            break;
        }
        Ok(Value::Array(items))
    }

    fn object(&mut self) -> Result<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                break;
            }
            let key = match self.peek() {
                Some(q @ ('\'' | '"')) => {
                    self.bump();
                    self.string(q)?
                }
                Some(c) if c.is_ascii_digit() => self.number_text().to_string(),
                _ => self
                    .ident()
                    .ok_or_else(|| self.error("expected an object key"))?
                    .to_string(),
            };
            self.skip_trivia()?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            break;
        }
        Ok(Value::Object(map))
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string"))?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escaped = self
                .bump()
                .ok_or_else(|| self.error("unterminated string"))?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'v' => out.push('\u{b}'),
                '0' => out.push('\0'),
                'x' => {
                    let code = self.hex_digits(2)?;
                    out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                }
                'u' => {
                    let c = self.unicode_escape()?;
                    out.push(c);
                }
                // Line continuation
                '\n' => {}
                '\r' => {
                    self.eat('\n');
                }
                other => out.push(other),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char> {
        let high = self.hex_digits(4)?;
        if (0xD800..0xDC00).contains(&high) && self.rest().starts_with("\\u") {
            self.pos += 2;
            let low = self.hex_digits(4)?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            return Ok('\u{fffd}');
        }
        Ok(char::from_u32(high).unwrap_or('\u{fffd}'))
    }

    fn hex_digits(&mut self, count: usize) -> Result<u32> {
        let rest = self.rest();
        let digits = rest
            .get(..count)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("invalid escape sequence"))?;
        self.pos += count;
        u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid escape sequence"))
    }

    fn number_text(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+')))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn number(&mut self) -> Result<Value> {
        let text = self.number_text();
        let text = text.strip_prefix('+').unwrap_or(text);
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| DocscopeError::Parsing(format!("invalid number '{}'", text)))
    }
}
