//! Domain layer: document model, requests, contexts and template evaluation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod context;
pub mod document;
pub mod error;
pub mod fragment;
pub mod party;
pub mod request;
pub mod template;

pub use context::{GlobalContext, PartyContext, RequestContext, GLOBAL_KEY};
pub use document::{
    anchor_index, Clause, Contract, Paragraph, PartyEntry, RenderScope, Section, SectionBody,
    TextBlock, TextNode,
};
pub use error::{DomainError, DomainResult};
pub use fragment::{EnforcementKind, FragmentKey, FragmentLayout, TermKind};
pub use party::{Address, CompanyType, InformationRole, LegalEntity, NaturalPerson, Parties, Party};
pub use request::{
    Cardinality, Direction, DurationUnit, NdaVariant, NondisclosureRequest, Penalty, Term,
};
pub use template::{ContextValue, Scope};
