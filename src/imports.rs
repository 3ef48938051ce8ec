//! `@import` resolution.
//!
//! Imported stylesheets are parsed with the same dialect as the importing
//! file and their nodes replace the `@import` statement in place. A file that
//! is reached again while it is still being resolved is an import cycle; a
//! file reached again through a different branch has already contributed its
//! names and is skipped.

use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::{ExtractorError, Result};
use crate::parser::{AtRule, Node, Position, Rule, Stylesheet, MAX_NESTING_DEPTH};
use crate::source::SourceDocument;
use crate::tokenizer::{tokenize, TokenKind};

/// Resolves the import graph rooted at one document
#[derive(Debug, Default)]
pub struct ImportResolver {
    load_paths: Vec<PathBuf>,
    /// Files currently being resolved, outermost first
    stack: Vec<(PathBuf, String)>,
    /// Every file inlined so far
    seen: HashSet<PathBuf>,
    resolved: Vec<PathBuf>,
    /// Block depth of the node being expanded, counted across imported files
    depth: usize,
}

impl ImportResolver {
    pub fn new(load_paths: Vec<PathBuf>) -> Self {
        Self {
            load_paths,
            ..Self::default()
        }
    }

    /// Parse `document` and inline every stylesheet it imports
    pub fn resolve(&mut self, document: &SourceDocument) -> Result<Stylesheet> {
        let canonical = document.canonical_path().to_path_buf();
        self.seen.insert(canonical.clone());
        self.resolved.push(document.path().to_path_buf());
        self.stack.push((canonical, document.display_path()));

        let sheet = document.parse()?;
        let nodes = self.expand(sheet.nodes, document)?;

        self.stack.pop();
        Ok(Stylesheet { nodes })
    }

    /// Paths of every file read, in the order they were reached
    pub fn resolved_files(&self) -> &[PathBuf] {
        &self.resolved
    }

    fn expand(&mut self, nodes: Vec<Node>, document: &SourceDocument) -> Result<Vec<Node>> {
        let mut expanded = Vec::with_capacity(nodes.len());

        for node in nodes {
            match node {
                Node::AtRule(at_rule) if at_rule.children.is_none() && at_rule.name.eq_ignore_ascii_case("import") => {
                    self.inline_import(at_rule, document, &mut expanded)?;
                }
                Node::AtRule(AtRule {
                    name,
                    prelude,
                    children: Some(children),
                    position,
                }) => {
                    let children = self.expand_block(children, document, position)?;
                    expanded.push(Node::AtRule(AtRule {
                        name,
                        prelude,
                        children: Some(children),
                        position,
                    }));
                }
                Node::Rule(Rule {
                    selector,
                    children,
                    position,
                }) => {
                    let children = self.expand_block(children, document, position)?;
                    expanded.push(Node::Rule(Rule {
                        selector,
                        children,
                        position,
                    }));
                }
                other => expanded.push(other),
            }
        }

        Ok(expanded)
    }

    /// Expand the children of a block opened at `position`
    fn expand_block(&mut self, children: Vec<Node>, document: &SourceDocument, position: Position) -> Result<Vec<Node>> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ExtractorError::ParseError {
                path: document.display_path(),
                line: position.line,
                column: position.column,
                message: "Nesting too deep".to_string(),
            });
        }
        self.depth += 1;
        let children = self.expand(children, document)?;
        self.depth -= 1;
        Ok(children)
    }

    fn inline_import(&mut self, at_rule: AtRule, document: &SourceDocument, out: &mut Vec<Node>) -> Result<()> {
        let targets = import_targets(&at_rule.prelude);
        if targets.is_empty() {
            return Err(ExtractorError::ParseError {
                path: document.display_path(),
                line: at_rule.position.line,
                column: at_rule.position.column,
                message: format!("Unable to find uri in '@import {}'", at_rule.prelude),
            });
        }

        let mut keep_statement = false;
        for target in targets {
            if is_remote(&target) {
                debug!("Leaving remote import '{}' in {}", target, document.display_path());
                keep_statement = true;
                continue;
            }

            let path = self
                .locate(&target, document.directory())
                .ok_or_else(|| ExtractorError::ImportNotFound {
                    path: document.display_path(),
                    line: at_rule.position.line,
                    column: at_rule.position.column,
                    target: target.clone(),
                })?;
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());

            if let Some(start) = self.stack.iter().position(|(p, _)| *p == canonical) {
                let mut chain: Vec<String> = self.stack[start..].iter().map(|(_, name)| name.clone()).collect();
                chain.push(path.display().to_string());
                return Err(ExtractorError::ImportCycle { chain });
            }
            if self.seen.contains(&canonical) {
                debug!("Skipping already imported {}", path.display());
                continue;
            }

            debug!("Importing {} from {}", path.display(), document.display_path());
            let imported = SourceDocument::read(&path)?;
            let sheet = self.resolve(&imported)?;
            out.extend(sheet.nodes);
        }

        if keep_statement {
            out.push(Node::AtRule(at_rule));
        }
        Ok(())
    }

    /// First existing candidate for `target`, relative to `directory` then to each load path
    fn locate(&self, target: &str, directory: &Path) -> Option<PathBuf> {
        let candidates = candidate_paths(target);
        std::iter::once(directory)
            .chain(self.load_paths.iter().map(PathBuf::as_path))
            .flat_map(|root| candidates.iter().map(move |c| root.join(c)))
            .find(|p| p.is_file())
            .or_else(|| {
                if target.starts_with('~') {
                    warn!("Package imports ('{}') are not resolved; add a load path instead", target);
                }
                None
            })
    }
}

fn is_remote(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// File names tried for an import target, in order of preference
fn candidate_paths(target: &str) -> Vec<PathBuf> {
    let path = Path::new(target);
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return vec![path.to_path_buf()];
    };

    let mut candidates = vec![path.to_path_buf()];
    if has_stylesheet_extension(path) {
        candidates.push(parent.join(format!("_{}", file_name)));
        return candidates;
    }

    // `theme.module` is a stem, not a file with a `module` extension
    for ext in ["scss", "css"] {
        candidates.push(parent.join(format!("{}.{}", file_name, ext)));
    }
    for ext in ["scss", "css"] {
        candidates.push(parent.join(format!("_{}.{}", file_name, ext)));
    }
    candidates.push(path.join("index.scss"));
    candidates.push(path.join("_index.scss"));
    candidates
}

fn has_stylesheet_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ["scss", "sass", "css"].iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// The URLs named by an `@import` prelude.
///
/// Accepts quoted strings and `url(...)`, separated by commas; anything else
/// (a media query list) ends the list.
pub fn import_targets(prelude: &str) -> Vec<String> {
    let Ok(tokens) = tokenize(prelude) else {
        return Vec::new();
    };
    let mut tokens = tokens.into_iter().filter(|t| !t.is_trivia()).peekable();
    let mut targets = Vec::new();

    while let Some(token) = tokens.next() {
        match token.kind {
            TokenKind::Str => targets.push(unquote(token.text)),
            TokenKind::Word if token.text.eq_ignore_ascii_case("url") => {
                if tokens.next_if(|t| t.kind == TokenKind::OpenParen).is_none() {
                    break;
                }
                match tokens.next() {
                    Some(t) if t.kind == TokenKind::Str => targets.push(unquote(t.text)),
                    Some(t) if t.kind == TokenKind::Word => targets.push(t.text.trim().to_string()),
                    _ => break,
                }
                if tokens.next_if(|t| t.kind == TokenKind::CloseParen).is_none() {
                    break;
                }
            }
            _ => break,
        }

        if tokens.next_if(|t| t.kind == TokenKind::Comma).is_none() {
            break;
        }
    }

    targets
}

/// Strip the quotes of a string token and decode its escapes
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
