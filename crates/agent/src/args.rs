//! Recovers keyed arguments from the quasi-JSON models write after
//! `Action Input:`.
//!
//! Models rarely emit clean JSON. They wrap it in prose, use single quotes,
//! drop quotes around keys, or leave trailing commas. [`parse_arguments`]
//! tries progressively looser layers and stops at the first that yields a
//! mapping:
//!
//! 1. the whole input as JSON
//! 2. the outermost `{...}` as JSON, when it has at most one nested level
//! 3. the same substring with single quotes turned into double quotes
//! 4. everything from the first `{` as a relaxed object literal (bare or
//!    single-quoted keys and values, any nesting, trailing commas)
//! 5. a flat `key: value` scan
//!
//! Each layer is a standalone function so it can be tested on its own.

use dossier_core::tool::ParsedArguments;
use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static BALANCED_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("static regex")
});

static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?(\w+)["']?\s*:\s*["']?([^,}\n]+)["']?"#).expect("static regex")
});

/// Parse a raw tool input into a mapping, or `None` if nothing usable was
/// found. `None` is distinct from an empty mapping (`{}` parses to `Some`).
pub fn parse_arguments(raw: &str) -> Option<ParsedArguments> {
    let input = raw.trim();

    if let Some(args) = parse_json_object(input) {
        return Some(args);
    }

    // A match that starts after the first brace is an inner object: the
    // outer one nests deeper than the regex supports.
    let outer = input.find('{').map(|i| &input[i..]);
    let candidate =
        outer.and_then(|text| first_balanced_object(text).filter(|fragment| text.starts_with(fragment)));
    if let Some(fragment) = candidate {
        if let Some(args) = parse_json_object(fragment) {
            return Some(args);
        }
        if let Some(args) = parse_single_quoted(fragment) {
            return Some(args);
        }
    }

    if let Some(args) = outer.and_then(parse_relaxed_object) {
        return Some(args);
    }

    scan_key_values(input)
}

/// Layer 1: strict JSON. Only objects count.
pub fn parse_json_object(text: &str) -> Option<ParsedArguments> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Layer 2: the first `{...}` with at most one level of nesting.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    BALANCED_OBJECT_RE.find(text).map(|m| m.as_str())
}

/// Layer 3: strict JSON after swapping every `'` for `"`.
pub fn parse_single_quoted(fragment: &str) -> Option<ParsedArguments> {
    parse_json_object(&fragment.replace('\'', "\""))
}

/// Layer 4: a lenient object literal, e.g.
/// `{'template': 'briefing', content_dict: {company_name: Tesla},}`.
///
/// Trailing text after the closing brace is ignored.
pub fn parse_relaxed_object(text: &str) -> Option<ParsedArguments> {
    let mut cursor = Relaxed::new(text);
    cursor.skip_ws();
    match cursor.value()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Layer 5: flat `key: value` pairs, quotes and whitespace trimmed from
/// values. Later duplicates overwrite earlier ones.
pub fn scan_key_values(text: &str) -> Option<ParsedArguments> {
    let mut args = ParsedArguments::new();
    for caps in KEY_VALUE_RE.captures_iter(text) {
        let value = caps[2].trim().trim_matches(|c: char| c == '"' || c == '\'');
        args.insert(caps[1].to_string(), Value::String(value.to_string()));
    }
    if args.is_empty() { None } else { Some(args) }
}

struct Relaxed<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Relaxed<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
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

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            '{' => self.object(),
            '[' => self.array(),
            '"' | '\'' => self.quoted().map(Value::String),
            _ => self.bare(),
        }
    }

    fn object(&mut self) -> Option<Value> {
        self.bump();
        let mut map = serde_json::Map::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_ws();
            if !self.eat(':') {
                return None;
            }
            self.skip_ws();
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            return None;
        }
    }

    fn array(&mut self) -> Option<Value> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Some(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Some(Value::Array(items));
            }
            return None;
        }
    }

    fn key(&mut self) -> Option<String> {
        match self.peek()? {
            '"' | '\'' => self.quoted(),
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
                {
                    self.bump();
                }
                (self.pos > start).then(|| self.src[start..self.pos].to_string())
            }
        }
    }

    fn quoted(&mut self) -> Option<String> {
        let delimiter = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == delimiter => return Some(out),
                '\\' => match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(other),
                },
                c => out.push(c),
            }
        }
    }

    /// An unquoted scalar, ending at `,`, `}`, `]` or a newline.
    fn bare(&mut self) -> Option<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, ',' | '}' | ']' | '\n'))
        {
            self.bump();
        }
        let token = self.src[start..self.pos].trim();
        if token.is_empty() {
            return None;
        }
        Some(match token {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => serde_json::from_str::<serde_json::Number>(token)
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(token.to_string())),
        })
    }
}
