//! Section assembler
//!
//! Loads fragments for one request and arranges them into an unrendered
//! document tree. The shape of that tree is the variant decision: which
//! clauses are present, in which order, and how many party entries exist.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use crate::config::NondisclosureConfig;
use crate::domain::fragment::{
    ParagraphsFragment, SectionFragment, RECEIVING_PARTY_CLAUSE,
};
use crate::domain::{
    anchor_index, Clause, DomainError, DomainResult, EnforcementKind, FragmentKey,
    FragmentLayout, NondisclosureRequest, Party, PartyEntry, Section, TermKind, TextBlock,
    TextNode,
};
use crate::infrastructure::traits::FragmentRepository;

/// The four raw sections of one agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContract {
    pub parties: Section,
    pub considerations: Section,
    pub agreements: Section,
    pub signatures: Section,
}

/// Builds unrendered sections from fragments.
pub struct SectionAssembler<'a> {
    fragments: &'a dyn FragmentRepository,
    config: &'a NondisclosureConfig,
    layout: FragmentLayout,
}

impl<'a> SectionAssembler<'a> {
    pub fn new(
        fragments: &'a dyn FragmentRepository,
        config: &'a NondisclosureConfig,
        layout: FragmentLayout,
    ) -> Self {
        Self {
            fragments,
            config,
            layout,
        }
    }

    /// Assemble all four sections. Fails before any rendering happens.
    #[instrument(skip_all, fields(variant = %self.layout.variant()))]
    pub fn assemble(&self, request: &NondisclosureRequest) -> DomainResult<RawContract> {
        Ok(RawContract {
            parties: self.parties(request)?,
            considerations: self.considerations()?,
            agreements: self.agreements(request)?,
            signatures: self.signatures()?,
        })
    }

    /// One entry per party in request order, plus the variant closing.
    pub fn parties(&self, request: &NondisclosureRequest) -> DomainResult<Section> {
        let header: SectionFragment = self.load(&self.layout.section("parties")?)?;

        let entries = request
            .parties
            .iter()
            .map(|(key, party)| -> DomainResult<PartyEntry> {
                let kind = match party {
                    Party::LegalEntity(_) => "legal_entity",
                    Party::NaturalPerson(_) => "natural_person",
                };
                Ok(PartyEntry {
                    party_key: key.to_string(),
                    block: self.load(&self.layout.party(kind)?)?,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let closing: TextNode = self.load_first(&self.layout.parties_closing()?)?;
        Ok(Section::parties(header.title, entries).with_closing(Some(closing)))
    }

    pub fn considerations(&self) -> DomainResult<Section> {
        let header: SectionFragment = self.load(&self.layout.section("considerations")?)?;
        let body: ParagraphsFragment = self.load_first(&self.layout.considerations()?)?;
        Ok(Section::text(header.title, body.paragraphs).with_closing(header.closing))
    }

    /// Baseline clauses with term, enforcement and, for unilateral variants,
    /// the receiving party clause inserted before the anchor clause.
    pub fn agreements(&self, request: &NondisclosureRequest) -> DomainResult<Section> {
        let header: SectionFragment = self.load(&self.layout.section("agreements")?)?;

        let mut clauses = self
            .config
            .baseline_clauses
            .iter()
            .map(|name| self.clause(name))
            .collect::<DomainResult<Vec<_>>>()?;

        let term_kind = if request.limited_term.is_some() {
            TermKind::Limited
        } else {
            TermKind::Unlimited
        };
        let term: Clause = self.load_first(&self.layout.term(term_kind)?)?;

        let enforcement_kind = if request.penalty_clause.is_some() {
            EnforcementKind::Penalties
        } else {
            EnforcementKind::Remedies
        };
        let enforcement = self.clause(enforcement_kind.clause_name())?;

        let anchor = anchor_index(&clauses, &self.config.anchor_prefix)?;
        debug!(
            "agreements: anchor at {}, term={}, enforcement={}",
            anchor,
            term_kind.as_str(),
            enforcement_kind.clause_name()
        );
        clauses.insert(anchor, enforcement);
        clauses.insert(anchor, term);

        if request.contract_variant.is_unilateral() {
            clauses.insert(anchor + 2, self.clause(RECEIVING_PARTY_CLAUSE)?);
        }

        Ok(Section::clauses(header.title, clauses).with_closing(header.closing))
    }

    /// Structure only: title and optional closing, no subsections.
    pub fn signatures(&self) -> DomainResult<Section> {
        let header: SectionFragment = self.load(&self.layout.section("signatures")?)?;
        Ok(Section::text(header.title, Vec::<TextBlock>::new()).with_closing(header.closing))
    }

    fn clause(&self, name: &str) -> DomainResult<Clause> {
        self.load_first(&self.layout.clause(name)?)
    }

    /// Load `key` and parse it into `T`.
    fn load<T: DeserializeOwned>(&self, key: &FragmentKey) -> DomainResult<T> {
        let value = self.fragments.load(key)?;
        serde_json::from_value(value).map_err(|e| DomainError::FragmentMalformed {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// First candidate that resolves. Only a missing fragment moves on to
    /// the next candidate.
    fn load_first<T: DeserializeOwned>(&self, candidates: &[FragmentKey]) -> DomainResult<T> {
        for key in candidates {
            match self.load(key) {
                Err(DomainError::FragmentNotFound { .. }) => {
                    trace!("load_first: {} not found, trying next", key);
                }
                other => return other,
            }
        }
        Err(DomainError::FragmentNotFound {
            key: candidates
                .first()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
    }
}
