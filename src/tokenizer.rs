//! Lexical analysis for CSS and the SCSS superset.
//!
//! The tokenizer is deliberately coarse: it only needs to know enough about
//! the source to find statement boundaries, blocks, strings and comments.
//! Anything that is not punctuation, a string, a comment or whitespace ends
//! up in a [`TokenKind::Word`].

use crate::errors::ExtractorError;

/// Kind of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    /// Quoted string, quotes included in the token text
    Str,
    Word,
    /// `@name`, the `@` included in the token text
    AtKeyword,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Colon,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// `#{`, the start of an SCSS interpolation
    InterpolationStart,
}

/// A token borrowed from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column (in characters) of the first character
    pub column: usize,
}

impl<'a> Token<'a> {
    /// Whitespace and comments carry no syntax
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// A syntax error located in a source text, not yet tied to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Attach the file the error was found in
    pub fn into_error(self, path: &str) -> ExtractorError {
        ExtractorError::ParseError {
            path: path.to_string(),
            line: self.line,
            column: self.column,
            message: self.message,
        }
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

/// Characters that always end a word
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || "{}();:,[]\"'@".contains(ch)
}

/// Split `src` into tokens.
///
/// Fails on unterminated strings and block comments. Bracket balancing is
/// left to the parser.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut cursor = Cursor::new(src);
    let mut tokens: Vec<Token<'_>> = Vec::new();

    while let Some(ch) = cursor.peek() {
        let start = cursor.pos;
        let (line, column) = (cursor.line, cursor.column);

        let kind = match ch {
            c if c.is_whitespace() => {
                while cursor.peek().is_some_and(char::is_whitespace) {
                    cursor.bump();
                }
                TokenKind::Whitespace
            }
            '/' if cursor.peek_nth(1) == Some('*') => {
                cursor.bump();
                cursor.bump();
                loop {
                    match cursor.bump() {
                        Some('*') if cursor.peek() == Some('/') => {
                            cursor.bump();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(SyntaxError::new(line, column, "Unclosed comment")),
                    }
                }
                TokenKind::Comment
            }
            '/' if cursor.peek_nth(1) == Some('/') => {
                while cursor.peek().is_some_and(|c| c != '\n') {
                    cursor.bump();
                }
                TokenKind::Comment
            }
            '"' | '\'' => {
                read_string(&mut cursor, ch, line, column)?;
                TokenKind::Str
            }
            '@' => {
                cursor.bump();
                read_word(&mut cursor);
                TokenKind::AtKeyword
            }
            '#' if cursor.peek_nth(1) == Some('{') => {
                cursor.bump();
                cursor.bump();
                TokenKind::InterpolationStart
            }
            '(' => {
                cursor.bump();
                let is_url = tokens
                    .last()
                    .is_some_and(|t| t.kind == TokenKind::Word && t.text.eq_ignore_ascii_case("url"));
                tokens.push(Token {
                    kind: TokenKind::OpenParen,
                    text: &src[start..cursor.pos],
                    line,
                    column,
                });
                if is_url {
                    read_unquoted_url(&mut cursor, &mut tokens);
                }
                continue;
            }
            _ => {
                let kind = match ch {
                    '{' => Some(TokenKind::OpenBrace),
                    '}' => Some(TokenKind::CloseBrace),
                    ';' => Some(TokenKind::Semicolon),
                    ':' => Some(TokenKind::Colon),
                    ',' => Some(TokenKind::Comma),
                    ')' => Some(TokenKind::CloseParen),
                    '[' => Some(TokenKind::OpenBracket),
                    ']' => Some(TokenKind::CloseBracket),
                    _ => None,
                };
                match kind {
                    Some(kind) => {
                        cursor.bump();
                        kind
                    }
                    None => {
                        read_word(&mut cursor);
                        TokenKind::Word
                    }
                }
            }
        };

        tokens.push(Token {
            kind,
            text: &src[start..cursor.pos],
            line,
            column,
        });
    }

    Ok(tokens)
}

fn read_string(cursor: &mut Cursor<'_>, quote: char, line: usize, column: usize) -> Result<(), SyntaxError> {
    cursor.bump();
    loop {
        match cursor.bump() {
            Some('\\') => {
                // An escaped newline continues the string
                cursor.bump();
            }
            Some(c) if c == quote => return Ok(()),
            Some('\n') | None => return Err(SyntaxError::new(line, column, "Unclosed string")),
            Some(_) => {}
        }
    }
}

/// Consume word characters, keeping backslash escapes verbatim
fn read_word(cursor: &mut Cursor<'_>) {
    let start = cursor.pos;
    while let Some(ch) = cursor.peek() {
        match ch {
            '\\' => {
                cursor.bump();
                cursor.bump();
            }
            '#' if cursor.peek_nth(1) == Some('{') => break,
            '/' if matches!(cursor.peek_nth(1), Some('*') | Some('/')) && cursor.pos > start => break,
            c if is_delimiter(c) => break,
            _ => {
                cursor.bump();
            }
        }
    }
}

/// The body of `url(...)` is raw text when it is not quoted, so `//` inside
/// it must not start a comment.
fn read_unquoted_url<'a>(cursor: &mut Cursor<'a>, tokens: &mut Vec<Token<'a>>) {
    let mut lookahead = 0;
    while cursor.peek_nth(lookahead).is_some_and(char::is_whitespace) {
        lookahead += 1;
    }
    if matches!(cursor.peek_nth(lookahead), Some('"') | Some('\'') | None) {
        return;
    }

    let start = cursor.pos;
    let (line, column) = (cursor.line, cursor.column);
    while let Some(ch) = cursor.peek() {
        match ch {
            ')' => break,
            '\\' => {
                cursor.bump();
                cursor.bump();
            }
            _ => {
                cursor.bump();
            }
        }
    }
    if cursor.pos > start {
        tokens.push(Token {
            kind: TokenKind::Word,
            text: &cursor.src[start..cursor.pos],
            line,
            column,
        });
    }
}
