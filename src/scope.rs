//! CSS Modules scoping.
//!
//! Walks a resolved stylesheet and records, for every name the module
//! exports, the token it would be rewritten to. Local names get a generated
//! token, global names map to themselves.

use indexmap::IndexMap;
use log::warn;
use regex::{Captures, Regex};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::errors::{ExtractorError, Result};
use crate::parser::{Node, Stylesheet};
use crate::selector::{keyframes_name, scan_selector, Scope};

/// Default pattern for generated tokens
pub const DEFAULT_SCOPED_NAME: &str = "_[local]_[hash]";

const DEFAULT_HASH_LENGTH: usize = 5;

/// Mapping from exported local names to generated names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNameMapping {
    entries: IndexMap<String, String>,
}

impl ClassNameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `local -> generated`. The first mapping recorded for a name wins.
    pub fn insert(&mut self, local: impl Into<String>, generated: impl Into<String>) -> bool {
        let local = local.into();
        if self.entries.contains_key(&local) {
            return false;
        }
        self.entries.insert(local, generated.into());
        true
    }

    pub fn get(&self, local: &str) -> Option<&str> {
        self.entries.get(local).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in byte order
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in key order
    pub fn sorted(&self) -> IndexMap<String, String> {
        let mut entries = self.entries.clone();
        entries.sort_keys();
        entries
    }
}

/// Generates tokens for local names from a pattern such as `_[local]_[hash]`.
///
/// Placeholders: `[name]` (file stem), `[local]` (the local name), `[hash]`
/// and `[hash:N]` (base-62 hash of file and local name, N characters).
#[derive(Debug, Clone)]
pub struct ScopedNameGenerator {
    pattern: String,
    placeholder: Regex,
}

impl ScopedNameGenerator {
    pub fn new(pattern: &str) -> Result<Self> {
        let placeholder = Regex::new(r"\[(name|local|hash)(?::(\d+))?\]").map_err(|e| ExtractorError::ConfigError {
            message: format!("Invalid placeholder expression: {}", e),
        })?;

        if !pattern.contains("[local]") && !placeholder.captures_iter(pattern).any(|c| &c[1] == "hash") {
            return Err(ExtractorError::ConfigError {
                message: format!("Scoped name pattern '{}' needs [local] or [hash] to keep names unique", pattern),
            });
        }

        Ok(Self {
            pattern: pattern.to_string(),
            placeholder,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn generate(&self, file_name: &str, file_path: &str, local: &str) -> String {
        self.placeholder
            .replace_all(&self.pattern, |caps: &Captures| match &caps[1] {
                "name" => sanitize(file_name),
                "local" => local.to_string(),
                _ => {
                    let length = caps
                        .get(2)
                        .and_then(|m| m.as_str().parse().ok())
                        .unwrap_or(DEFAULT_HASH_LENGTH);
                    let hash = to_base62(hash_name(file_path, local));
                    hash.chars().take(length.max(1)).collect()
                }
            })
            .into_owned()
    }
}

impl Default for ScopedNameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPED_NAME).expect("default scoped name pattern is valid")
    }
}

/// File stems such as `button.module` are not valid in identifiers as-is
fn sanitize(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn hash_name(file_path: &str, local: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    file_path.hash(&mut hasher);
    local.hash(&mut hasher);
    hasher.finish()
}

/// Convert a number to a base-62 string
fn to_base62(mut num: u64) -> String {
    const CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

    if num == 0 {
        return "0".to_string();
    }

    let mut result = Vec::new();
    while num > 0 {
        result.push(CHARS[(num % 62) as usize] as char);
        num /= 62;
    }

    result.iter().rev().collect()
}

/// Applies the scoping transform to one resolved stylesheet
pub struct ModuleScoper<'g> {
    generator: &'g ScopedNameGenerator,
    default_scope: Scope,
    file_name: String,
    file_path: String,
    mapping: ClassNameMapping,
    dynamic: Vec<String>,
}

impl<'g> ModuleScoper<'g> {
    /// `file_name` and `file_path` describe the entry file; imported rules
    /// are scoped as part of it.
    pub fn new(generator: &'g ScopedNameGenerator, default_scope: Scope, file_name: &str, file_path: &str) -> Self {
        Self {
            generator,
            default_scope,
            file_name: file_name.to_string(),
            file_path: file_path.to_string(),
            mapping: ClassNameMapping::new(),
            dynamic: Vec::new(),
        }
    }

    /// Walk `sheet` and return the mapping of every exported name
    pub fn scope(mut self, sheet: &Stylesheet) -> ScopeResult {
        self.walk(&sheet.nodes);
        ScopeResult {
            mapping: self.mapping,
            dynamic_selectors: self.dynamic,
        }
    }

    fn export(&mut self, name: String, scope: Scope) {
        let generated = match scope {
            Scope::Local => self.generator.generate(&self.file_name, &self.file_path, &name),
            Scope::Global => name.clone(),
        };
        self.mapping.insert(name, generated);
    }

    fn walk(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Rule(rule) => {
                    let selector = rule.selector.trim();
                    if selector == ":export" {
                        for child in &rule.children {
                            if let Node::Declaration(decl) = child {
                                self.mapping.insert(decl.property.clone(), decl.value.clone());
                            }
                        }
                        continue;
                    }
                    if selector.starts_with(":import") {
                        continue;
                    }

                    let scan = scan_selector(selector, self.default_scope);
                    for found in scan.names {
                        self.export(found.name, found.scope);
                    }
                    for dynamic in scan.dynamic {
                        warn!(
                            "Skipping interpolated selector '{}' at line {}: its name is only known after compilation",
                            dynamic, rule.position.line
                        );
                        self.dynamic.push(dynamic);
                    }

                    self.walk(&rule.children);
                }
                Node::AtRule(at_rule) => {
                    if at_rule.unprefixed_name() == "keyframes" {
                        match keyframes_name(&at_rule.prelude, self.default_scope) {
                            Some((name, scope)) => self.export(name, scope),
                            None => warn!(
                                "Skipping keyframes '{}' at line {}: its name is only known after compilation",
                                at_rule.prelude, at_rule.position.line
                            ),
                        }
                        // Keyframe selectors are offsets, not names
                        continue;
                    }
                    if let Some(children) = &at_rule.children {
                        self.walk(children);
                    }
                }
                Node::Declaration(_) => {}
            }
        }
    }
}

/// Output of the scoping transform
#[derive(Debug, Clone, Default)]
pub struct ScopeResult {
    pub mapping: ClassNameMapping,
    /// Selectors skipped because they use SCSS interpolation
    pub dynamic_selectors: Vec<String>,
}
