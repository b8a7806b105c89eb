//! Non-disclosure agreement generation
//!
//! `generate` is a pure function of the request and the fragment repository:
//! validate, build contexts, assemble the raw tree, render it.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::services::assembler::{RawContract, SectionAssembler};
use crate::application::services::context::ContextService;
use crate::application::ApplicationResult;
use crate::config::{NondisclosureConfig, NONDISCLOSURE};
use crate::domain::{
    Contract, DomainResult, FragmentLayout, NondisclosureRequest, RenderScope, RequestContext,
};
use crate::infrastructure::traits::FragmentRepository;

/// Generates non-disclosure agreements from a fragment repository.
pub struct NondisclosureService {
    fragments: Arc<dyn FragmentRepository>,
    config: NondisclosureConfig,
    contexts: ContextService,
}

impl NondisclosureService {
    /// Create a new service over `fragments` with an explicit clause configuration.
    pub fn new(fragments: Arc<dyn FragmentRepository>, config: NondisclosureConfig) -> Self {
        Self {
            fragments,
            config,
            contexts: ContextService::new(),
        }
    }

    pub fn config(&self) -> &NondisclosureConfig {
        &self.config
    }

    /// Generate one complete, rendered agreement.
    #[instrument(skip_all, fields(variant = %request.contract_variant, parties = request.parties.len()))]
    pub fn generate(&self, request: &NondisclosureRequest) -> ApplicationResult<Contract> {
        request.validate()?;

        let context = self.contexts.build(request)?;
        let raw = self.assemble(request)?;
        let contract = render(&raw, &context)?;

        info!(
            "generated {} agreement with {} clauses",
            request.contract_variant,
            contract.agreements.body.len()
        );
        Ok(contract)
    }

    /// Generate independent requests in parallel. Results keep input order.
    pub fn generate_batch(
        &self,
        requests: &[NondisclosureRequest],
    ) -> Vec<ApplicationResult<Contract>> {
        debug!("generate_batch: {} requests", requests.len());
        requests.par_iter().map(|r| self.generate(r)).collect()
    }

    /// Build the contexts of a validated request without assembling anything.
    pub fn context(&self, request: &NondisclosureRequest) -> ApplicationResult<RequestContext> {
        request.validate()?;
        Ok(self.contexts.build(request)?)
    }

    /// The unrendered tree for a request.
    pub fn assemble(&self, request: &NondisclosureRequest) -> ApplicationResult<RawContract> {
        let layout = FragmentLayout::new(NONDISCLOSURE, request.contract_variant);
        let assembler = SectionAssembler::new(self.fragments.as_ref(), &self.config, layout);
        Ok(assembler.assemble(request)?)
    }
}

/// Parties render with the party context, every other section with the
/// shared scope.
fn render(raw: &RawContract, context: &RequestContext) -> DomainResult<Contract> {
    let shared = RenderScope::shared(&context.shared);
    let parties = RenderScope::with_parties(&context.shared, &context.parties);

    Ok(Contract {
        parties: raw.parties.render(&parties)?,
        considerations: raw.considerations.render(&shared)?,
        agreements: raw.agreements.render(&shared)?,
        signatures: raw.signatures.render(&shared)?,
    })
}
