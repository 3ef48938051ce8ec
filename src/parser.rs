//! Builds a small stylesheet tree out of the token stream.
//!
//! The tree only distinguishes rules, at-rules and declarations. Selectors,
//! preludes and values are kept as text; later stages scan them as needed.

use crate::tokenizer::{tokenize, SyntaxError, Token, TokenKind};

/// Deepest block or bracket nesting accepted in a stylesheet
pub const MAX_NESTING_DEPTH: usize = 256;

/// Where a node starts in its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<&Token<'_>> for Position {
    fn from(token: &Token<'_>) -> Self {
        Self {
            line: token.line,
            column: token.column,
        }
    }
}

/// `selector { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub children: Vec<Node>,
    pub position: Position,
}

/// `@name prelude;` or `@name prelude { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// Name without the leading `@`
    pub name: String,
    pub prelude: String,
    /// `None` for statement at-rules such as `@import`
    pub children: Option<Vec<Node>>,
    pub position: Position,
}

/// `property: value`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
}

impl AtRule {
    /// Lowercased name with any vendor prefix removed (`-webkit-keyframes` -> `keyframes`)
    pub fn unprefixed_name(&self) -> String {
        let name = self.name.to_ascii_lowercase();
        if let Some(rest) = name.strip_prefix('-') {
            if let Some(idx) = rest.find('-') {
                return rest[idx + 1..].to_string();
            }
        }
        name
    }
}

/// A parsed stylesheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

/// Parse CSS or SCSS source text
pub fn parse(src: &str) -> Result<Stylesheet, SyntaxError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let nodes = parser.parse_nodes(None)?;
    Ok(Stylesheet { nodes })
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Blocks currently open
    depth: usize,
}

impl<'a> Parser<'a> {
    fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse nodes until the `}` closing `open`, or until EOF at the top level
    fn parse_nodes(&mut self, open: Option<Token<'a>>) -> Result<Vec<Node>, SyntaxError> {
        let mut nodes = Vec::new();
        let mut buffer: Vec<Token<'a>> = Vec::new();
        let mut brackets: Vec<Token<'a>> = Vec::new();

        while let Some(token) = self.next_token() {
            if let Some(innermost) = brackets.last().copied() {
                match (innermost.kind, token.kind) {
                    (_, TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::InterpolationStart) => {
                        if brackets.len() >= MAX_NESTING_DEPTH {
                            return Err(too_deep(&token));
                        }
                        brackets.push(token)
                    }
                    (TokenKind::OpenParen, TokenKind::CloseParen)
                    | (TokenKind::OpenBracket, TokenKind::CloseBracket)
                    | (TokenKind::InterpolationStart, TokenKind::CloseBrace) => {
                        brackets.pop();
                    }
                    (_, TokenKind::CloseBrace) => {
                        return Err(unclosed_bracket(&innermost));
                    }
                    _ => {}
                }
                buffer.push(token);
                continue;
            }

            match token.kind {
                TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::InterpolationStart => {
                    brackets.push(token);
                    buffer.push(token);
                }
                TokenKind::Semicolon => {
                    finish_statement(&mut buffer, &mut nodes)?;
                }
                TokenKind::OpenBrace => {
                    if self.depth >= MAX_NESTING_DEPTH {
                        return Err(too_deep(&token));
                    }
                    self.depth += 1;
                    let children = self.parse_nodes(Some(token))?;
                    self.depth -= 1;
                    nodes.push(block_node(&mut buffer, &token, children));
                }
                TokenKind::CloseBrace => {
                    if open.is_none() {
                        return Err(SyntaxError::new(token.line, token.column, "Unexpected }"));
                    }
                    finish_statement(&mut buffer, &mut nodes)?;
                    return Ok(nodes);
                }
                _ => buffer.push(token),
            }
        }

        if let Some(innermost) = brackets.last() {
            return Err(unclosed_bracket(innermost));
        }
        if let Some(open) = open {
            return Err(SyntaxError::new(open.line, open.column, "Unclosed block"));
        }
        finish_statement(&mut buffer, &mut nodes)?;
        Ok(nodes)
    }
}

fn too_deep(token: &Token<'_>) -> SyntaxError {
    SyntaxError::new(token.line, token.column, "Nesting too deep")
}

fn unclosed_bracket(token: &Token<'_>) -> SyntaxError {
    SyntaxError::new(token.line, token.column, "Unclosed bracket")
}

/// Drop leading and trailing whitespace and comments
fn trim_trivia<'t, 'a>(tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    let start = tokens.iter().position(|t| !t.is_trivia()).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| !t.is_trivia()).map_or(start, |i| i + 1);
    &tokens[start..end]
}

/// Source text of `tokens` without comments
fn join(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .map(|t| t.text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Index of the first `:` outside of any bracket
fn top_level_colon(tokens: &[Token<'_>]) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::InterpolationStart => depth += 1,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                depth = depth.saturating_sub(1)
            }
            TokenKind::Colon if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Turn a `;`-terminated (or block-terminated) token run into a node
fn finish_statement(buffer: &mut Vec<Token<'_>>, nodes: &mut Vec<Node>) -> Result<(), SyntaxError> {
    let tokens = trim_trivia(buffer);
    let Some(first) = tokens.first() else {
        buffer.clear();
        return Ok(());
    };
    let position = Position::from(first);

    let node = if first.kind == TokenKind::AtKeyword {
        Node::AtRule(AtRule {
            name: first.text[1..].to_string(),
            prelude: join(&tokens[1..]),
            children: None,
            position,
        })
    } else if let Some(colon) = top_level_colon(tokens) {
        Node::Declaration(Declaration {
            property: join(&tokens[..colon]),
            value: join(&tokens[colon + 1..]),
            position,
        })
    } else {
        return Err(SyntaxError::new(first.line, first.column, "Unknown word"));
    };

    nodes.push(node);
    buffer.clear();
    Ok(())
}

/// Turn the tokens before a `{` into a rule or block at-rule
fn block_node(buffer: &mut Vec<Token<'_>>, open: &Token<'_>, children: Vec<Node>) -> Node {
    let tokens = trim_trivia(buffer);
    let node = match tokens.first() {
        Some(first) if first.kind == TokenKind::AtKeyword => Node::AtRule(AtRule {
            name: first.text[1..].to_string(),
            prelude: join(&tokens[1..]),
            children: Some(children),
            position: Position::from(first),
        }),
        Some(first) => Node::Rule(Rule {
            selector: join(tokens),
            children,
            position: Position::from(first),
        }),
        None => Node::Rule(Rule {
            selector: String::new(),
            children,
            position: Position::from(open),
        }),
    };
    buffer.clear();
    node
}
