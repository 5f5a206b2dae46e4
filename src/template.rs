//! Parameter templates for external workflow commands.
//!
//! Placeholders are `$name` or `${name}` where `name` matches
//! `[A-Za-z][A-Za-z0-9_.]*`, so `$result.outcome` names a single key. `$$`
//! is a literal `$`. Substitution is safe: unknown names and malformed
//! placeholders are copied through untouched.
//!
//! Settings store placeholders in the search language's `$name$` form;
//! [`unescape_field_tokens`] turns them into `$name` first.

use std::collections::HashMap;

/// Remove every `$` that directly follows a word character in the input.
///
/// `priority=$severity$` becomes `priority=$severity`. A `$` preceded by
/// punctuation, whitespace or another `$` is kept.
pub fn unescape_field_tokens(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if !(c == '$' && prev.is_some_and(is_word_char)) {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    /// `$$`
    Dollar,
    /// `$name` or `${name}`; `raw` is the source text including the sigil.
    Placeholder { name: &'a str, raw: &'a str },
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> Template<'a> {
    pub fn parse(source: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut text_start = 0;
        let mut i = 0;

        while let Some(offset) = source[i..].find('$') {
            let start = i + offset;
            let rest = &source[start + 1..];

            let (token, len) = if rest.starts_with('$') {
                (Some(Token::Dollar), 2)
            } else if let Some(braced) = rest.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) if is_identifier(&braced[..end]) => {
                        let len = end + 3; // `$`, `{`, `}`
                        let raw = &source[start..start + len];
                        (Some(Token::Placeholder { name: &braced[..end], raw }), len)
                    }
                    _ => (None, 1),
                }
            } else {
                let name_len = identifier_len(rest);
                if name_len > 0 {
                    let raw = &source[start..start + 1 + name_len];
                    (Some(Token::Placeholder { name: &rest[..name_len], raw }), name_len + 1)
                } else {
                    (None, 1)
                }
            };

            match token {
                Some(token) => {
                    if text_start < start {
                        tokens.push(Token::Text(&source[text_start..start]));
                    }
                    tokens.push(token);
                    i = start + len;
                    text_start = i;
                }
                // Lone or invalid `$`: stays part of the surrounding text.
                None => i = start + len,
            }
        }

        if text_start < source.len() {
            tokens.push(Token::Text(&source[text_start..]));
        }

        Self { tokens }
    }

    /// Names of all placeholders, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Placeholder { name, .. } => Some(*name),
            _ => None,
        })
    }

    /// Substitute known names; leave unknown placeholders verbatim.
    pub fn safe_substitute(&self, context: &HashMap<String, String>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Dollar => out.push('$'),
                Token::Placeholder { name, raw } => match context.get(*name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !is_ident_continue(c))
        .map_or(s.len(), |(idx, _)| idx)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && identifier_len(s) == s.len()
}
