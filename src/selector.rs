//! Selector scanning.
//!
//! Finds the class and id names a selector declares together with the scope
//! (`:local` or `:global`) each one is in. Element names, attribute
//! selectors, strings and SCSS placeholders are skipped.

use serde::{Deserialize, Serialize};

/// Whether a name is rewritten by the scoping transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Class,
    Id,
}

/// A name declared by a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedName {
    pub name: String,
    pub kind: NameKind,
    pub scope: Scope,
}

/// Everything found in one selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorScan {
    pub names: Vec<ScopedName>,
    /// Names built from SCSS interpolation, which can't be known statically
    pub dynamic: Vec<String>,
}

/// Scan `selector`, starting in `default_scope`
pub fn scan_selector(selector: &str, default_scope: Scope) -> SelectorScan {
    let mut scanner = Scanner {
        chars: selector.chars().collect(),
        pos: 0,
        scan: SelectorScan::default(),
    };
    scanner.scan(default_scope, false);
    scanner.scan
}

/// The animation name declared by a `@keyframes` prelude
///
/// Returns `None` for interpolated names.
pub fn keyframes_name(prelude: &str, default_scope: Scope) -> Option<(String, Scope)> {
    let mut prelude = prelude.trim();
    if prelude.contains("#{") {
        return None;
    }

    // The outermost `:global` / `:local` decides the scope
    let mut explicit = None;
    while let Some((rest, scope)) = [(":global", Scope::Global), (":local", Scope::Local)]
        .into_iter()
        .find_map(|(prefix, scope)| prelude.strip_prefix(prefix).map(|rest| (rest.trim(), scope)))
    {
        prelude = match rest.strip_prefix('(') {
            Some(r) => r.strip_suffix(')')?.trim(),
            None => rest,
        };
        explicit.get_or_insert(scope);
    }

    let unquoted = prelude
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .or_else(|| prelude.strip_prefix('\'').and_then(|p| p.strip_suffix('\'')))
        .unwrap_or(prelude);
    if unquoted.is_empty() {
        return None;
    }
    Some((unquoted.to_string(), explicit.unwrap_or(default_scope)))
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    scan: SelectorScan,
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

impl Scanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_interpolation(&self) -> bool {
        self.peek() == Some('#') && self.peek_at(1) == Some('{')
    }

    /// True if an identifier starts at the current position
    fn at_ident(&self) -> bool {
        match self.peek() {
            Some('\\') => true,
            Some('-') => matches!(self.peek_at(1), Some(c) if is_name_start(c) || c == '-' || c == '\\'),
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    /// Scan until EOF, or until the `)` closing a functional pseudo-class
    fn scan(&mut self, initial: Scope, in_parens: bool) {
        let mut scope = initial;

        while let Some(ch) = self.peek() {
            match ch {
                ')' if in_parens => {
                    self.pos += 1;
                    return;
                }
                ',' => {
                    // A bare `:global` only lasts until the end of the list item
                    scope = initial;
                    self.pos += 1;
                }
                '"' | '\'' => self.skip_string(ch),
                '[' => self.skip_attribute(),
                '(' => {
                    self.pos += 1;
                    self.scan(scope, true);
                }
                '#' if self.peek_at(1) == Some('{') => {
                    self.skip_interpolation();
                }
                '.' | '#' => {
                    let start = self.pos;
                    self.pos += 1;
                    let kind = if ch == '.' { NameKind::Class } else { NameKind::Id };
                    if self.at_interpolation() {
                        self.skip_interpolation();
                        self.record_dynamic(start);
                    } else if self.at_ident() {
                        let name = self.read_ident();
                        if self.at_interpolation() {
                            self.skip_interpolation();
                            self.read_ident();
                            self.record_dynamic(start);
                        } else {
                            self.scan.names.push(ScopedName { name, kind, scope });
                        }
                    }
                }
                ':' => {
                    self.pos += 1;
                    if self.peek() == Some(':') {
                        self.pos += 1;
                    }
                    let pseudo = self.read_ident().to_ascii_lowercase();
                    let explicit = match pseudo.as_str() {
                        "global" => Some(Scope::Global),
                        "local" => Some(Scope::Local),
                        _ => None,
                    };
                    if self.peek() == Some('(') {
                        self.pos += 1;
                        self.scan(explicit.unwrap_or(scope), true);
                    } else if let Some(explicit) = explicit {
                        scope = explicit;
                    }
                }
                _ if self.at_ident() => {
                    // Element names, `&-suffix` and `%placeholder` tails
                    self.read_ident();
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Read an identifier, decoding CSS escapes
    fn read_ident(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                if let Some(decoded) = self.read_escape() {
                    name.push(decoded);
                }
            } else if is_name_char(ch) {
                name.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    /// Decode the escape following a backslash
    fn read_escape(&mut self) -> Option<char> {
        let first = self.peek()?;
        if first.is_ascii_hexdigit() {
            let mut value = 0u32;
            let mut digits = 0;
            while digits < 6 {
                match self.peek().and_then(|c| c.to_digit(16)) {
                    Some(d) => {
                        value = value * 16 + d;
                        digits += 1;
                        self.pos += 1;
                    }
                    None => break,
                }
            }
            if self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }
            return Some(match char::from_u32(value) {
                Some(c) if value != 0 => c,
                _ => char::REPLACEMENT_CHARACTER,
            });
        }
        self.pos += 1;
        Some(first)
    }

    fn skip_string(&mut self, quote: char) {
        self.pos += 1;
        while let Some(ch) = self.peek() {
            self.pos += 1;
            if ch == '\\' {
                self.pos += 1;
            } else if ch == quote {
                return;
            }
        }
    }

    fn skip_attribute(&mut self) {
        self.pos += 1;
        while let Some(ch) = self.peek() {
            match ch {
                ']' => {
                    self.pos += 1;
                    return;
                }
                '"' | '\'' => self.skip_string(ch),
                '\\' => self.pos += 2,
                _ => self.pos += 1,
            }
        }
    }

    /// Skip `#{ ... }`, including nested braces
    fn skip_interpolation(&mut self) {
        self.pos += 2;
        let mut depth = 1;
        while let Some(ch) = self.peek() {
            self.pos += 1;
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn record_dynamic(&mut self, start: usize) {
        let end = self.pos.min(self.chars.len());
        self.scan.dynamic.push(self.chars[start..end].iter().collect());
    }
}
