//! Lenient parser for model responses that should contain a list literal.
//!
//! Models are asked to answer with nothing but a sorted list, yet real
//! responses come back truncated mid-element, with broken string quoting, as
//! tuples, or with a trailing `...` continuation marker. This module turns
//! such a response into a best-effort literal value plus provenance flags
//! describing every repair that was applied. Parsing never panics and never
//! returns an error: an unparseable response is `value: None`.
//!
//! Only a literal subset is understood (numbers, quoted strings, `[...]`,
//! `(...)`, `...`); no expression evaluation of any kind takes place.

use crate::value::Scalar;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Scalar(Scalar),
    Ellipsis,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    /// The elements of a list or tuple, if every element is a scalar.
    ///
    /// Nested sequences and stray ellipsis elements yield `None`; callers
    /// treat that the same way as a comparison failure.
    pub fn as_scalar_items(&self) -> Option<Vec<Scalar>> {
        let items = match self {
            Literal::List(items) | Literal::Tuple(items) => items,
            _ => return None,
        };
        items
            .iter()
            .map(|item| match item {
                Literal::Scalar(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Outcome of parsing one raw response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// Best-effort parsed value; `None` when all repair attempts failed.
    pub value: Option<Literal>,
    /// The response did not end in `]` and was cut at its last comma.
    pub cropped: bool,
    /// Spurious in-word quotes were stripped before the successful parse.
    pub quote_repaired: bool,
    /// The parsed value was syntactically a list (not a tuple or scalar).
    pub is_list: bool,
    /// The sequence ended with a `...` continuation marker (now stripped).
    pub has_ellipsis: bool,
}

/// Parse a raw model response with escalating repair attempts.
///
/// 1. Parse the trimmed response as-is.
/// 2. If it does not end with `]`, drop everything from the last comma on,
///    append `]`, and retry. A response without any comma cannot be cropped;
///    the next attempt then works on the original text.
/// 3. Strip quote characters that sit inside a word (directly after a letter
///    and not followed by a space or comma), force a closing `']`, and retry.
///
/// Afterwards, tuples that look like mis-bracketed or wrapped lists are
/// converted or unwrapped, and a trailing ellipsis element is stripped.
pub fn parse_response(raw: &str) -> ParseOutcome {
    let text = raw.trim();
    let mut cropped = false;
    let mut quote_repaired = false;

    let mut value = parse_literal(text);
    if value.is_none() {
        let cropped_text = if !text.ends_with(']') {
            match text.rfind(',') {
                Some(idx) => {
                    cropped = true;
                    let mut s = text[..idx].to_string();
                    s.push(']');
                    Some(s)
                }
                // No comma to crop at; fall through on the original text.
                None => None,
            }
        } else {
            None
        };
        let base = cropped_text.as_deref().unwrap_or(text);
        if cropped {
            value = parse_literal(base);
        }
        if value.is_none() {
            quote_repaired = true;
            value = parse_literal(&strip_spurious_quotes(base));
        }
    }

    let mut is_list = false;
    if let Some(lit) = value.as_mut() {
        let replacement = match lit {
            Literal::List(_) => {
                is_list = true;
                None
            }
            Literal::Tuple(items) => {
                if text.starts_with("('") || text.starts_with("(\"") {
                    // A list of strings written with the wrong brackets.
                    Some(Literal::List(std::mem::take(items)))
                } else if text.starts_with("([") || text.ends_with("],") {
                    // A list wrapped in a stray tuple; keep the first element.
                    items.first().cloned()
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(replacement) = replacement {
            *lit = replacement;
        }
    }

    let mut has_ellipsis = false;
    if let Some(Literal::List(items) | Literal::Tuple(items)) = value.as_mut() {
        if items.last() == Some(&Literal::Ellipsis) {
            items.pop();
            has_ellipsis = true;
        }
    }

    ParseOutcome {
        value,
        cropped,
        quote_repaired,
        is_list,
        has_ellipsis,
    }
}

/// Remove single quotes judged to be spurious in-word apostrophes.
///
/// A quote is stripped when it directly follows a letter and is not followed
/// by a space or comma (so closing delimiters before `, ` survive). The scan
/// may eat the final closing delimiter, so the result is forced to end with
/// `']`; the parser's adjacent-string concatenation absorbs the doubled
/// quote this produces on strings that were already terminated.
fn strip_spurious_quotes(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '\'' {
            let after_letter = i > 0 && chars[i - 1].is_ascii_alphabetic();
            let before_delimiter = matches!(chars.get(i + 1), Some(' ') | Some(','));
            if after_letter && !before_delimiter {
                continue;
            }
        }
        out.push(c);
    }
    out.pop();
    out.push_str("']");
    out
}

// ── literal parsing ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Ellipsis,
    Int(i64),
    Float(f64),
    Str(String),
}

fn tokenize(s: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = s.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '\'' | '"' => {
                let (tok, next) = lex_string(&chars, i)?;
                tokens.push(tok);
                i = next;
            }
            '.' => {
                if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') {
                    tokens.push(Token::Ellipsis);
                    i += 3;
                } else if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
                    let (tok, next) = lex_number(&chars, i)?;
                    tokens.push(tok);
                    i = next;
                } else {
                    return None;
                }
            }
            '-' | '+' => {
                let (tok, next) = lex_number(&chars, i)?;
                tokens.push(tok);
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (tok, next) = lex_number(&chars, i)?;
                tokens.push(tok);
                i = next;
            }
            _ => return None,
        }
    }
    Some(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Some((Token::Str(out), i + 1)),
            '\\' => {
                let escaped = chars.get(i + 1)?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    c => *c,
                });
                i += 2;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    // Unterminated string.
    None
}

fn lex_number(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut i = start;
    let mut text = String::new();
    let mut is_float = false;
    if chars[i] == '-' || chars[i] == '+' {
        text.push(chars[i]);
        i += 1;
    }
    let mut saw_digit = false;
    while i < chars.len() {
        match chars[i] {
            c if c.is_ascii_digit() => {
                saw_digit = true;
                text.push(c);
                i += 1;
            }
            '_' => i += 1,
            '.' => {
                // `1...` is a number followed by an ellipsis, not `1.` + `..`.
                if is_float || chars.get(i + 1) == Some(&'.') {
                    break;
                }
                is_float = true;
                text.push('.');
                i += 1;
            }
            'e' | 'E' => {
                is_float = true;
                text.push('e');
                i += 1;
                if let Some('-' | '+') = chars.get(i) {
                    text.push(chars[i]);
                    i += 1;
                }
            }
            _ => break,
        }
    }
    if !saw_digit {
        return None;
    }
    if is_float {
        text.parse::<f64>().ok().map(|f| (Token::Float(f), i))
    } else {
        match text.parse::<i64>() {
            Ok(n) => Some((Token::Int(n), i)),
            // Out of i64 range; degrade to float rather than failing.
            Err(_) => text.parse::<f64>().ok().map(|f| (Token::Float(f), i)),
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn literal(&mut self) -> Option<Literal> {
        match self.peek()?.clone() {
            Token::LBracket => {
                self.pos += 1;
                let (items, _) = self.sequence(&Token::RBracket)?;
                Some(Literal::List(items))
            }
            Token::LParen => {
                self.pos += 1;
                let (items, saw_comma) = self.sequence(&Token::RParen)?;
                // `(x)` is a parenthesized value, not a one-tuple.
                if items.len() == 1 && !saw_comma {
                    Some(items.into_iter().next().unwrap())
                } else {
                    Some(Literal::Tuple(items))
                }
            }
            Token::Int(n) => {
                self.pos += 1;
                Some(Literal::Scalar(Scalar::Int(n)))
            }
            Token::Float(f) => {
                self.pos += 1;
                Some(Literal::Scalar(Scalar::Float(f)))
            }
            Token::Str(_) => {
                // Adjacent string literals concatenate, as in `'ab' 'cd'`.
                let mut out = String::new();
                while let Some(Token::Str(s)) = self.peek() {
                    out.push_str(s);
                    self.pos += 1;
                }
                Some(Literal::Scalar(Scalar::Str(out)))
            }
            Token::Ellipsis => {
                self.pos += 1;
                Some(Literal::Ellipsis)
            }
            _ => None,
        }
    }

    fn sequence(&mut self, close: &Token) -> Option<(Vec<Literal>, bool)> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            if self.eat(close) {
                return Some((items, saw_comma));
            }
            items.push(self.literal()?);
            if self.eat(&Token::Comma) {
                saw_comma = true;
            } else if self.eat(close) {
                return Some((items, saw_comma));
            } else {
                return None;
            }
        }
    }
}

/// Parse a whole string as one literal. `None` on any syntax problem.
fn parse_literal(s: &str) -> Option<Literal> {
    let tokens = tokenize(s)?;
    if tokens.is_empty() {
        return None;
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let first = parser.literal()?;
    if parser.at_end() {
        return Some(first);
    }
    // A bare `a, b,` at top level is a tuple without parentheses.
    let mut items = vec![first];
    while !parser.at_end() {
        if !parser.eat(&Token::Comma) {
            return None;
        }
        if parser.at_end() {
            break;
        }
        items.push(parser.literal()?);
    }
    Some(Literal::Tuple(items))
}
