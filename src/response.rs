//! Tokenizes a single AGI reply line into a [`Response`], per spec §4.3.
//!
//! Grounded on the teacher's `AGIStatusGeneric::from_str`
//! (`src/agiparse.rs`), generalized from "one operational-data token" into
//! the full ordered argument bag the design notes (§9) ask for: a small
//! struct with typed accessors, not a general dynamic dictionary.
use crate::error::AgiError;

/// A single value in the argument bag: either a `key=value` string or a
/// `(flag)` presence marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Flag,
}

/// The synthetic key a bare (non `k=v`, non-parenthesized) token is stored under.
pub const VALUE_KEY: &str = "value";

/// An ordered key→(string|flag) mapping, as produced by [`ResponseParser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<(String, ArgValue)>,
}

impl Arguments {
    fn push(&mut self, key: impl Into<String>, value: ArgValue) {
        self.entries.push((key.into(), value));
    }

    /// The string value of `key`, if present and not a bare flag.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.entries.iter().rev().find_map(|(k, v)| {
            if k == key {
                match v {
                    ArgValue::Str(s) => Some(s.as_str()),
                    ArgValue::Flag => None,
                }
            } else {
                None
            }
        })
    }

    /// The integer value of `key`; `0` if absent or unparsable (spec §4.3 and
    /// the open question on missing `result=` in spec §9).
    pub fn number(&self, key: &str) -> i64 {
        self.string(key).and_then(|s| s.parse().ok()).unwrap_or(0)
    }

    /// Whether `key` is present at all (as a flag or as a `k=v` pair).
    pub fn boolean(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The ASCII value stored under `key`, read back as a single-character string.
    pub fn char(&self, key: &str) -> Option<String> {
        let n = self.number(key);
        u8::try_from(n).ok().map(|b| (b as char).to_string())
    }

    /// The most recently-seen bare (`value`) entry, used by verbs such as
    /// `GET VARIABLE` whose payload is unnamed.
    ///
    /// Asterisk encodes some unnamed payloads as a parenthesized token
    /// (`200 result=1 (bar)`) rather than a bare one; since the general
    /// tokenizer rule treats `(x)` as a presence flag, fall back to the most
    /// recent flag's name when no bare `value` entry is present.
    pub fn nokey(&self) -> Option<&str> {
        self.string(VALUE_KEY).or_else(|| {
            self.entries.iter().rev().find_map(|(k, v)| match v {
                ArgValue::Flag => Some(k.as_str()),
                ArgValue::Str(_) => None,
            })
        })
    }
}

/// A parsed AGI reply: `code`, `result`, and the rest of the line tokenized
/// into [`Arguments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub result: i64,
    pub arguments: Arguments,
}

/// What a single wire line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// An ordinary reply to an in-flight command.
    Response(Response),
    /// An unsolicited `HANGUP` notification, never a reply to anything.
    Hangup,
}

/// Stateless tokenizer for response lines.
pub struct ResponseParser;

impl ResponseParser {
    /// Parse one response line (including its trailing `\n`).
    pub fn parse(line: &str) -> Result<ParsedLine, AgiError> {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        let mut tokens = trimmed.split_whitespace();
        let Some(first) = tokens.next() else {
            return Err(AgiError::Protocol(format!("empty response line: {line:?}")));
        };
        if first == "HANGUP" {
            return Ok(ParsedLine::Hangup);
        }
        let code: u16 = first
            .parse()
            .map_err(|_| AgiError::Protocol(format!("non-numeric status code: {first:?}")))?;

        let mut arguments = Arguments::default();
        for token in tokens {
            if let Some((key, value)) = token.split_once('=') {
                arguments.push(key.trim(), ArgValue::Str(value.trim().to_owned()));
            } else if token.starts_with('(') && token.ends_with(')') && token.len() >= 2 {
                let flag_name = &token[1..token.len() - 1];
                arguments.push(flag_name, ArgValue::Flag);
            } else {
                arguments.push(VALUE_KEY, ArgValue::Str(token.to_owned()));
            }
        }
        let result = arguments.number("result");
        Ok(ParsedLine::Response(Response {
            code,
            result,
            arguments,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hangup_line_is_never_a_response() {
        assert_eq!(
            ResponseParser::parse("HANGUP\n").unwrap(),
            ParsedLine::Hangup
        );
    }

    #[test]
    fn basic_result() {
        let parsed = ResponseParser::parse("200 result=1 endpos=16000\n").unwrap();
        let ParsedLine::Response(r) = parsed else {
            panic!("expected a response")
        };
        assert_eq!(r.code, 200);
        assert_eq!(r.result, 1);
        assert_eq!(r.arguments.number("endpos"), 16000);
    }

    #[test]
    fn flag_token_parses_as_boolean_true() {
        let parsed = ResponseParser::parse("200 result=1 (timeout)\n").unwrap();
        let ParsedLine::Response(r) = parsed else {
            panic!("expected a response")
        };
        assert!(r.arguments.boolean("timeout"));
        assert_eq!(r.arguments.string("timeout"), None);
    }

    #[test]
    fn trailing_bare_token_survives_as_nokey() {
        let parsed = ResponseParser::parse("200 result=1 (bar)\n").unwrap();
        let ParsedLine::Response(r) = parsed else {
            panic!("expected a response")
        };
        assert!(r.arguments.boolean("bar"));
    }

    #[test]
    fn bare_value_token_is_stored_under_value_key() {
        let parsed = ResponseParser::parse("200 result=1 somebarevalue\n").unwrap();
        let ParsedLine::Response(r) = parsed else {
            panic!("expected a response")
        };
        assert_eq!(r.arguments.nokey(), Some("somebarevalue"));
    }

    #[test]
    fn missing_result_defaults_to_zero() {
        let parsed = ResponseParser::parse("510\n").unwrap();
        let ParsedLine::Response(r) = parsed else {
            panic!("expected a response")
        };
        assert_eq!(r.result, 0);
    }

    #[test]
    fn non_numeric_code_is_a_protocol_error() {
        assert!(ResponseParser::parse("abc result=1\n").is_err());
    }

    #[test]
    fn char_reads_ascii_value_as_single_char_string() {
        let parsed = ResponseParser::parse("200 result=49\n").unwrap();
        let ParsedLine::Response(r) = parsed else {
            panic!("expected a response")
        };
        assert_eq!(r.arguments.char("result").as_deref(), Some("1"));
    }
}
