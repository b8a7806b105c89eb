//! Context builder
//!
//! Turns a validated request into the shared scope and the per-party context.

use tracing::debug;

use crate::domain::request::disclosing_count;
use crate::domain::{
    DomainError, DomainResult, GlobalContext, InformationRole, NondisclosureRequest, Party,
    PartyContext, RequestContext, Scope,
};

pub const DISCLOSING_PARTY: &str = "the Disclosing Party";
pub const RECEIVING_PARTY: &str = "the Receiving Party";

/// Builds rendering contexts from requests. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextService;

impl ContextService {
    pub fn new() -> Self {
        Self
    }

    /// Build both scopes for one request.
    pub fn build(&self, request: &NondisclosureRequest) -> DomainResult<RequestContext> {
        Ok(RequestContext {
            shared: self.shared_scope(request),
            parties: self.party_context(request)?,
        })
    }

    /// One scope per party plus the `_global` entry.
    pub fn party_context(&self, request: &NondisclosureRequest) -> DomainResult<PartyContext> {
        self.check_roles(request)?;

        let total = request.parties.len();
        let mut context = PartyContext::new(GlobalContext::new(total, request.contract_variant));

        for (key, party) in request.parties.iter() {
            let role = role_label(party, total)?;
            let scope = match party {
                Party::LegalEntity(entity) => Scope::new()
                    .with("type", party.kind())
                    .with("name", entity.name.as_str())
                    .with("companyType", entity.company_type.as_str())
                    .with("country", entity.country_of_incorporation.as_str())
                    .with("address", entity.registered_address.formatted())
                    .with("registrationNumber", entity.registration_number.as_str())
                    .with("representative", entity.signatory_name.as_str())
                    .with("role", role),
                Party::NaturalPerson(person) => Scope::new()
                    .with("type", party.kind())
                    .with("name", person.full_name.as_str())
                    .with("dateOfBirth", person.date_of_birth.as_str())
                    .with("placeOfBirth", person.place_of_birth.as_str())
                    .with("address", person.address.formatted())
                    .with("role", role),
            };
            context.push(key, scope);
        }

        debug!(
            "party_context: {} parties, variant={}",
            context.len(),
            context.global().variant_tag
        );
        Ok(context)
    }

    /// Jurisdiction, purpose and the optional term and penalty values.
    ///
    /// Term and penalty keys are only present when requested.
    pub fn shared_scope(&self, request: &NondisclosureRequest) -> Scope {
        let mut scope = Scope::new()
            .with("city", request.place_of_jurisdiction.as_str())
            .with("country", request.applicable_law.as_str())
            .with("purpose", request.contract_purpose.as_str());

        if let Some(term) = &request.limited_term {
            scope.insert("termDurationAmount", term.duration_amount);
            scope.insert("termDurationUnit", term.duration_unit.as_str());
        }

        if let Some(penalty) = &request.penalty_clause {
            scope.insert("penaltyInitialAmount", penalty.initial_amount);
            scope.insert("penaltySubsequentAmount", penalty.subsequent_amount);
        }

        scope
    }

    /// Re-check of the information role rules validation already enforces.
    fn check_roles(&self, request: &NondisclosureRequest) -> DomainResult<()> {
        if let Some((key, _)) = request
            .parties
            .iter()
            .find(|(_, p)| p.information_role().is_none())
        {
            return Err(DomainError::InvalidRoleConfiguration(format!(
                "party '{key}' has no information role"
            )));
        }

        if request.contract_variant.is_unilateral() {
            let disclosing = disclosing_count(&request.parties);
            if disclosing != 1 {
                return Err(DomainError::InvalidRoleConfiguration(format!(
                    "{} requires exactly one disclosing party, found {disclosing}",
                    request.contract_variant
                )));
            }
        }
        Ok(())
    }
}

/// Role phrase for two-party agreements, the party's own name otherwise.
fn role_label(party: &Party, total: usize) -> DomainResult<String> {
    if total != 2 {
        return Ok(party.display_name().to_string());
    }
    match party.information_role() {
        Some(InformationRole::Disclosing) => Ok(DISCLOSING_PARTY.to_string()),
        Some(InformationRole::Receiving | InformationRole::Mutual) => {
            Ok(RECEIVING_PARTY.to_string())
        }
        None => Err(DomainError::InvalidRoleConfiguration(format!(
            "'{}' has no information role",
            party.display_name()
        ))),
    }
}
