//! Fragment keys and the layout that maps a variant to them.

use std::fmt;

use serde::Deserialize;

use crate::domain::document::{TextBlock, TextNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::request::NdaVariant;

/// Path-like fragment identifier, e.g. `general/sections/parties`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FragmentKey(String);

impl FragmentKey {
    /// Build a key from `/`-separated segments.
    ///
    /// Empty, `.` and `..` segments are rejected so a key never escapes the
    /// repository root.
    pub fn new(key: impl Into<String>) -> DomainResult<Self> {
        let key = key.into();
        let valid = !key.is_empty()
            && key
                .split('/')
                .all(|seg| !seg.is_empty() && seg != "." && seg != ".." && !seg.contains('\\'));
        if !valid {
            return Err(DomainError::FragmentNotFound { key });
        }
        Ok(Self(key))
    }

    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> DomainResult<Self> {
        Self::new(segments.into_iter().collect::<Vec<_>>().join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Section header fragment: a title and an optional closing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionFragment {
    pub title: String,
    #[serde(default)]
    pub closing: Option<TextNode>,
}

/// Ordered text entries of a considerations fragment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParagraphsFragment {
    #[serde(default)]
    pub paragraphs: Vec<TextBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Limited,
    Unlimited,
}

impl TermKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermKind::Limited => "limited",
            TermKind::Unlimited => "unlimited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementKind {
    Penalties,
    Remedies,
}

impl EnforcementKind {
    /// Clause fragment name.
    pub fn clause_name(&self) -> &'static str {
        match self {
            EnforcementKind::Penalties => "enforcement_and_penalties",
            EnforcementKind::Remedies => "enforcement_and_remedies",
        }
    }
}

pub const RECEIVING_PARTY_CLAUSE: &str = "information_receiving_party";

/// Where the fragments of one contract type live.
///
/// Variant-scoped fragments resolve to a list of candidates: the variant
/// directory first, then the contract's `general` directory.
#[derive(Debug, Clone)]
pub struct FragmentLayout {
    contract_type: String,
    variant: NdaVariant,
}

impl FragmentLayout {
    pub fn new(contract_type: impl Into<String>, variant: NdaVariant) -> Self {
        Self {
            contract_type: contract_type.into(),
            variant,
        }
    }

    pub fn variant(&self) -> NdaVariant {
        self.variant
    }

    /// `general/sections/<name>`
    pub fn section(&self, name: &str) -> DomainResult<FragmentKey> {
        FragmentKey::from_segments(["general", "sections", name])
    }

    /// `general/parties/<legal_entity|natural_person>`
    pub fn party(&self, kind: &str) -> DomainResult<FragmentKey> {
        FragmentKey::from_segments(["general", "parties", kind])
    }

    pub fn parties_closing(&self) -> DomainResult<Vec<FragmentKey>> {
        self.variant_candidates(&["parties", "closing"])
    }

    pub fn considerations(&self) -> DomainResult<Vec<FragmentKey>> {
        self.variant_candidates(&["considerations", "considerations"])
    }

    pub fn clause(&self, name: &str) -> DomainResult<Vec<FragmentKey>> {
        self.variant_candidates(&["agreements", "clauses", name])
    }

    pub fn term(&self, kind: TermKind) -> DomainResult<Vec<FragmentKey>> {
        self.variant_candidates(&["agreements", "term", kind.as_str()])
    }

    fn variant_candidates(&self, rest: &[&str]) -> DomainResult<Vec<FragmentKey>> {
        let direction = self.variant.direction();
        let cardinality = self.variant.cardinality();
        let specific = [
            self.contract_type.as_str(),
            direction.as_str(),
            cardinality.as_str(),
        ];
        let general = [self.contract_type.as_str(), "general"];

        Ok(vec![
            FragmentKey::from_segments(specific.iter().chain(rest).copied())?,
            FragmentKey::from_segments(general.iter().chain(rest).copied())?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rejects_traversal() {
        assert!(FragmentKey::new("general/../secret").is_err());
        assert!(FragmentKey::new("").is_err());
        assert!(FragmentKey::new("a//b").is_err());
        assert!(FragmentKey::new("general/sections/parties").is_ok());
    }

    #[test]
    fn test_variant_candidates_fall_back_to_general() {
        let layout = FragmentLayout::new("nondisclosure", NdaVariant::MutualMulti);
        let keys: Vec<String> = layout
            .clause("no_warranty")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            keys,
            vec![
                "nondisclosure/mutual/multi/agreements/clauses/no_warranty",
                "nondisclosure/general/agreements/clauses/no_warranty",
            ]
        );
    }

    #[test]
    fn test_term_keys() {
        let layout = FragmentLayout::new("nondisclosure", NdaVariant::UnilateralStandard);
        let keys = layout.term(TermKind::Limited).unwrap();
        assert_eq!(
            keys[0].as_str(),
            "nondisclosure/unilateral/standard/agreements/term/limited"
        );
    }
}
