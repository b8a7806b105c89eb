//! Document tree model and its rendering.
//!
//! Raw trees are built by the section assembler from fragments. Rendering never
//! mutates a node: every `render` call returns a new node of the same shape with
//! each template string evaluated.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::context::PartyContext;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::template::{self, Scope};

/// Leaf text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    pub content: String,
}

impl TextNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn render(&self, scope: &Scope) -> DomainResult<TextNode> {
        Ok(TextNode {
            content: template::render(&self.content, scope)?,
        })
    }
}

/// Text with an optional heading and nested subparagraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Always serialized: an empty list keeps a bare paragraph apart from text.
    #[serde(default)]
    pub subparagraphs: Vec<TextNode>,
}

impl Paragraph {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            heading: None,
            subparagraphs: Vec::new(),
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn with_subparagraph(mut self, content: impl Into<String>) -> Self {
        self.subparagraphs.push(TextNode::new(content));
        self
    }

    /// Subparagraphs always share the parent's scope.
    pub fn render(&self, scope: &Scope) -> DomainResult<Paragraph> {
        Ok(Paragraph {
            content: template::render(&self.content, scope)?,
            heading: self
                .heading
                .as_deref()
                .map(|h| template::render(h, scope))
                .transpose()?,
            subparagraphs: self
                .subparagraphs
                .iter()
                .map(|sub| sub.render(scope))
                .collect::<DomainResult<_>>()?,
        })
    }
}

/// Raw shape of a text entry inside a fragment.
#[derive(Deserialize)]
struct RawTextBlock {
    content: String,
    heading: Option<String>,
    subparagraphs: Option<Vec<TextNode>>,
}

/// Entry of a text section: plain text or a paragraph.
///
/// A fragment entry carrying a `heading` or `subparagraphs` field is a
/// paragraph, anything else is plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawTextBlock")]
pub enum TextBlock {
    Paragraph(Paragraph),
    Text(TextNode),
}

impl From<RawTextBlock> for TextBlock {
    fn from(raw: RawTextBlock) -> Self {
        if raw.heading.is_some() || raw.subparagraphs.is_some() {
            TextBlock::Paragraph(Paragraph {
                content: raw.content,
                heading: raw.heading,
                subparagraphs: raw.subparagraphs.unwrap_or_default(),
            })
        } else {
            TextBlock::Text(TextNode {
                content: raw.content,
            })
        }
    }
}

impl TextBlock {
    pub fn render(&self, scope: &Scope) -> DomainResult<TextBlock> {
        Ok(match self {
            TextBlock::Paragraph(p) => TextBlock::Paragraph(p.render(scope)?),
            TextBlock::Text(t) => TextBlock::Text(t.render(scope)?),
        })
    }
}

/// A titled clause. All of its text lives in its paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

impl Clause {
    pub fn new(title: impl Into<String>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            title: title.into(),
            paragraphs,
        }
    }

    /// Case-insensitive title prefix test.
    pub fn title_starts_with(&self, prefix: &str) -> bool {
        self.title
            .to_lowercase()
            .starts_with(&prefix.to_lowercase())
    }

    pub fn render(&self, scope: &Scope) -> DomainResult<Clause> {
        Ok(Clause {
            title: template::render(&self.title, scope)?,
            paragraphs: self
                .paragraphs
                .iter()
                .map(|p| p.render(scope))
                .collect::<DomainResult<_>>()?,
        })
    }
}

/// Index of the single clause whose title starts with `prefix`.
pub fn anchor_index(clauses: &[Clause], prefix: &str) -> DomainResult<usize> {
    let matches: Vec<usize> = clauses
        .iter()
        .positions(|c| c.title_starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [index] => Ok(*index),
        _ => Err(DomainError::MissingAnchorClause {
            prefix: prefix.to_string(),
            found: matches.len(),
        }),
    }
}

/// Text block bound to the party whose scope renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyEntry {
    pub party_key: String,
    pub block: TextBlock,
}

/// Section body. The kind fixes which node type a section may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "subsections", rename_all = "snake_case")]
pub enum SectionBody {
    Text(Vec<TextBlock>),
    Clauses(Vec<Clause>),
    Parties(Vec<PartyEntry>),
}

impl SectionBody {
    pub fn len(&self) -> usize {
        match self {
            SectionBody::Text(blocks) => blocks.len(),
            SectionBody::Clauses(clauses) => clauses.len(),
            SectionBody::Parties(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Data available while rendering a section.
#[derive(Debug, Clone, Copy)]
pub struct RenderScope<'a> {
    pub shared: &'a Scope,
    pub parties: Option<&'a PartyContext>,
}

impl<'a> RenderScope<'a> {
    pub fn shared(shared: &'a Scope) -> Self {
        Self {
            shared,
            parties: None,
        }
    }

    pub fn with_parties(shared: &'a Scope, parties: &'a PartyContext) -> Self {
        Self {
            shared,
            parties: Some(parties),
        }
    }

    /// Shared scope plus `partyCount` and `variantTag` when parties are known.
    fn closing_scope(&self) -> Scope {
        match self.parties {
            Some(parties) => self.shared.merged(&parties.global().to_scope()),
            None => self.shared.clone(),
        }
    }
}

/// Titled section of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(flatten)]
    pub body: SectionBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<TextNode>,
}

impl Section {
    pub fn text(title: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Text(blocks),
            closing: None,
        }
    }

    pub fn clauses(title: impl Into<String>, clauses: Vec<Clause>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Clauses(clauses),
            closing: None,
        }
    }

    pub fn parties(title: impl Into<String>, entries: Vec<PartyEntry>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Parties(entries),
            closing: None,
        }
    }

    pub fn with_closing(mut self, closing: Option<TextNode>) -> Self {
        self.closing = closing;
        self
    }

    /// Clauses of a clause section, empty for any other kind.
    pub fn clause_list(&self) -> &[Clause] {
        match &self.body {
            SectionBody::Clauses(clauses) => clauses,
            _ => &[],
        }
    }

    pub fn render(&self, scope: &RenderScope<'_>) -> DomainResult<Section> {
        let body = match &self.body {
            SectionBody::Text(blocks) => SectionBody::Text(
                blocks
                    .iter()
                    .map(|b| b.render(scope.shared))
                    .collect::<DomainResult<_>>()?,
            ),
            SectionBody::Clauses(clauses) => SectionBody::Clauses(
                clauses
                    .iter()
                    .map(|c| c.render(scope.shared))
                    .collect::<DomainResult<_>>()?,
            ),
            SectionBody::Parties(entries) => {
                SectionBody::Parties(render_party_entries(entries, scope.parties)?)
            }
        };

        let closing = match &self.closing {
            Some(node) => Some(node.render(&scope.closing_scope())?),
            None => None,
        };

        Ok(Section {
            title: template::render(&self.title, scope.shared)?,
            body,
            closing,
        })
    }
}

/// Each entry renders against the scope of the party it names.
fn render_party_entries(
    entries: &[PartyEntry],
    parties: Option<&PartyContext>,
) -> DomainResult<Vec<PartyEntry>> {
    let parties = parties.ok_or_else(|| {
        DomainError::PartyScopeMismatch("party section rendered without a party context".into())
    })?;

    if entries.len() != parties.len() {
        return Err(DomainError::PartyScopeMismatch(format!(
            "{} party entries for {} parties in context",
            entries.len(),
            parties.len()
        )));
    }

    entries
        .iter()
        .map(|entry| -> DomainResult<PartyEntry> {
            let scope = parties.party(&entry.party_key).ok_or_else(|| {
                DomainError::PartyScopeMismatch(format!(
                    "no context for party '{}'",
                    entry.party_key
                ))
            })?;
            Ok(PartyEntry {
                party_key: entry.party_key.clone(),
                block: entry.block.render(scope)?,
            })
        })
        .collect()
}

/// The four sections handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub parties: Section,
    pub considerations: Section,
    pub agreements: Section,
    pub signatures: Section,
}

impl Contract {
    pub fn sections(&self) -> [&Section; 4] {
        [
            &self.parties,
            &self.considerations,
            &self.agreements,
            &self.signatures,
        ]
    }

    /// Section and clause titles as a tree.
    pub fn outline(&self) -> termtree::Tree<String> {
        let mut root = termtree::Tree::new("Contract".to_string());
        for section in self.sections() {
            let mut node = termtree::Tree::new(format!("{} ({})", section.title, section.body.len()));
            for clause in section.clause_list() {
                node.push(termtree::Tree::new(clause.title.clone()));
            }
            root.push(node);
        }
        root
    }
}

impl fmt::Display for TextNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .heading
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.content.as_str()))
            .chain(self.subparagraphs.iter().map(|s| s.content.as_str()));
        write!(f, "{}", parts.format("\n\n"))
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextBlock::Paragraph(p) => p.fmt(f),
            TextBlock::Text(t) => t.fmt(f),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        for paragraph in &self.paragraphs {
            write!(f, "\n\n{paragraph}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        match &self.body {
            SectionBody::Text(blocks) => {
                for block in blocks {
                    write!(f, "\n\n{block}")?;
                }
            }
            SectionBody::Clauses(clauses) => {
                for clause in clauses {
                    write!(f, "\n\n{clause}")?;
                }
            }
            SectionBody::Parties(entries) => {
                for entry in entries {
                    write!(f, "\n\n{}", entry.block)?;
                }
            }
        }
        if let Some(closing) = &self.closing {
            write!(f, "\n\n{closing}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sections().iter().format("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::GlobalContext;
    use crate::domain::request::NdaVariant;

    fn clause(title: &str) -> Clause {
        Clause::new(title, vec![Paragraph::new(format!("{title} body"))])
    }

    #[test]
    fn test_text_block_classification() {
        let plain: TextBlock = serde_json::from_str(r#"{"content": "x"}"#).unwrap();
        assert!(matches!(plain, TextBlock::Text(_)));

        let headed: TextBlock =
            serde_json::from_str(r#"{"content": "x", "heading": "H"}"#).unwrap();
        assert!(matches!(headed, TextBlock::Paragraph(_)));

        let nested: TextBlock =
            serde_json::from_str(r#"{"content": "x", "subparagraphs": [{"content": "a"}]}"#)
                .unwrap();
        match nested {
            TextBlock::Paragraph(p) => assert_eq!(p.subparagraphs.len(), 1),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_clause_without_paragraphs_is_rejected() {
        let result: Result<Clause, _> = serde_json::from_str(r#"{"title": "T"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_anchor_index_is_case_insensitive() {
        let clauses = vec![clause("Definitions"), clause("NO WARRANTY"), clause("Misc")];
        assert_eq!(anchor_index(&clauses, "no warranty").unwrap(), 1);
    }

    #[test]
    fn test_anchor_index_rejects_zero_and_many() {
        let none = vec![clause("Definitions")];
        assert_eq!(
            anchor_index(&none, "no warranty").unwrap_err(),
            DomainError::MissingAnchorClause {
                prefix: "no warranty".into(),
                found: 0
            }
        );
        let two = vec![clause("No Warranty"), clause("No warranty, again")];
        assert!(matches!(
            anchor_index(&two, "no warranty"),
            Err(DomainError::MissingAnchorClause { found: 2, .. })
        ));
    }

    #[test]
    fn test_paragraph_render_keeps_shape() {
        let scope = Scope::new().with("purpose", "evaluation");
        let p = Paragraph::new("For {{ purpose }}.")
            .with_heading("Purpose")
            .with_subparagraph("(a) {{purpose}}");
        let rendered = p.render(&scope).unwrap();
        assert_eq!(rendered.content, "For evaluation.");
        assert_eq!(rendered.heading.as_deref(), Some("Purpose"));
        assert_eq!(rendered.subparagraphs[0].content, "(a) evaluation");
        // input untouched
        assert_eq!(p.content, "For {{ purpose }}.");
    }

    #[test]
    fn test_display_orders_heading_body_subparagraphs() {
        let c = Clause::new(
            "1. Term",
            vec![Paragraph::new("Body").with_heading("Head").with_subparagraph("Sub")],
        );
        assert_eq!(c.to_string(), "1. Term\n\nHead\n\nBody\n\nSub");
    }

    fn party_entry(key: &str) -> PartyEntry {
        PartyEntry {
            party_key: key.into(),
            block: TextBlock::Text(TextNode::new("{{ name }}")),
        }
    }

    fn party_context(names: &[(&str, &str)]) -> PartyContext {
        let mut parties = PartyContext::new(GlobalContext::new(
            names.len(),
            NdaVariant::MutualStandard,
        ));
        for (key, name) in names {
            parties.push(*key, Scope::new().with("name", *name));
        }
        parties
    }

    #[test]
    fn test_bare_paragraph_survives_json_round_trip() {
        let block = TextBlock::Paragraph(Paragraph::new("Body"));
        let json = serde_json::to_string(&block).unwrap();
        let back: TextBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_party_entries_render_by_key_not_position() {
        let section = Section::parties("Parties", vec![party_entry("b"), party_entry("a")]);
        let parties = party_context(&[("a", "Acme"), ("b", "Beta")]);
        let shared = Scope::new();

        let rendered = section
            .render(&RenderScope::with_parties(&shared, &parties))
            .unwrap();

        let SectionBody::Parties(entries) = rendered.body else {
            panic!("expected party entries");
        };
        assert_eq!(entries[0].block, TextBlock::Text(TextNode::new("Beta")));
        assert_eq!(entries[1].block, TextBlock::Text(TextNode::new("Acme")));
    }

    #[test]
    fn test_party_entry_with_unknown_key_fails() {
        let section = Section::parties("Parties", vec![party_entry("ghost")]);
        let parties = party_context(&[("acme", "Acme")]);
        let shared = Scope::new();

        let err = section
            .render(&RenderScope::with_parties(&shared, &parties))
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::PartyScopeMismatch("no context for party 'ghost'".into())
        );
    }

    #[test]
    fn test_context_party_without_entry_fails() {
        let section = Section::parties("Parties", vec![]);
        let parties = party_context(&[("acme", "Acme")]);
        let shared = Scope::new();

        let err = section
            .render(&RenderScope::with_parties(&shared, &parties))
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::PartyScopeMismatch("0 party entries for 1 parties in context".into())
        );
    }

    #[test]
    fn test_party_section_without_party_context_fails() {
        let section = Section::parties(
            "Parties",
            vec![PartyEntry {
                party_key: "party_1".into(),
                block: TextBlock::Text(TextNode::new("{{ name }}")),
            }],
        );
        let shared = Scope::new();
        let err = section.render(&RenderScope::shared(&shared)).unwrap_err();
        assert!(matches!(err, DomainError::PartyScopeMismatch(_)));
    }
}
