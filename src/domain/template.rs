//! Template evaluation: `{{ name }}` references resolved against a [`Scope`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("reference pattern compiles")
});

/// A single value a template can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Integer(i64),
    Text(String),
    Null,
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Integer(n) => write!(f, "{n}"),
            ContextValue::Text(s) => f.write_str(s),
            ContextValue::Null => Ok(()),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Integer(i64::from(value))
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(ContextValue::Integer)
            .unwrap_or_else(|_| ContextValue::Text(value.to_string()))
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ContextValue::Null)
    }
}

/// Flat mapping of variable names to values.
///
/// Absence of a key means "not applicable"; it is never filled with a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(BTreeMap<String, ContextValue>);

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.0.iter()
    }

    /// Copy of `self` with every entry of `overlay` applied on top.
    pub fn merged(&self, overlay: &Scope) -> Scope {
        let mut merged = self.clone();
        for (key, value) in overlay.iter() {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Evaluate `template` against `scope`.
///
/// Text outside well-formed references is copied verbatim, so a template
/// without references renders to itself. Every reference must resolve.
pub fn render(template: &str, scope: &Scope) -> DomainResult<String> {
    if !template.contains("{{") {
        return Ok(template.to_string());
    }

    let mut missing: Option<String> = None;
    let rendered = REFERENCE.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match scope.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(DomainError::UnresolvedVariable { name }),
        None => Ok(rendered.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::new()
            .with("city", "Amsterdam")
            .with("termDurationAmount", 2_i64)
            .with("representative", ContextValue::Null)
    }

    #[test]
    fn test_render_without_markers_is_identity() {
        let text = "This Agreement is governed by law. {not a marker} { {x} }";
        assert_eq!(render(text, &Scope::new()).unwrap(), text);
    }

    #[test]
    fn test_render_substitutes_text_and_integers() {
        let out = render("Courts of {{city}} for {{ termDurationAmount }} years", &scope()).unwrap();
        assert_eq!(out, "Courts of Amsterdam for 2 years");
    }

    #[test]
    fn test_render_null_is_empty() {
        assert_eq!(render("[{{representative}}]", &scope()).unwrap(), "[]");
    }

    #[test]
    fn test_render_missing_variable_fails() {
        let err = render("{{ city }} and {{ purpose }}", &scope()).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnresolvedVariable {
                name: "purpose".into()
            }
        );
    }

    #[test]
    fn test_malformed_reference_is_literal() {
        assert_eq!(render("{{ 1abc }}", &Scope::new()).unwrap(), "{{ 1abc }}");
    }

    #[test]
    fn test_merged_overlay_wins() {
        let base = Scope::new().with("a", "1").with("b", "2");
        let merged = base.merged(&Scope::new().with("b", "3"));
        assert_eq!(merged.get("b"), Some(&ContextValue::from("3")));
        assert_eq!(merged.get("a"), Some(&ContextValue::from("1")));
    }
}
