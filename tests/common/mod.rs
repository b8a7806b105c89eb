//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use draftwork::application::services::NondisclosureService;
use draftwork::config::NondisclosureConfig;
use draftwork::domain::{
    Address, CompanyType, InformationRole, LegalEntity, NaturalPerson, NdaVariant,
    NondisclosureRequest, Party,
};
use draftwork::infrastructure::traits::{FragmentRepository, RealFileSystem};
use draftwork::infrastructure::FsFragmentRepository;

/// The fragment library shipped with the crate.
pub fn fragments_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fragments")
}

pub fn shipped_fragments() -> Arc<dyn FragmentRepository> {
    Arc::new(FsFragmentRepository::new(
        fragments_root(),
        Arc::new(RealFileSystem),
    ))
}

pub fn service() -> NondisclosureService {
    NondisclosureService::new(shipped_fragments(), NondisclosureConfig::default())
}

pub fn address(city: &str) -> Address {
    Address {
        street_name: "Herengracht".into(),
        house_nr: "1".into(),
        city: city.into(),
        postcode: "1015 BA".into(),
        suffix: None,
    }
}

pub fn entity(name: &str, role: InformationRole) -> Party {
    Party::LegalEntity(LegalEntity {
        company_type: CompanyType::Bv,
        name: name.into(),
        registered_address: address("Amsterdam"),
        country_of_incorporation: "the Netherlands".into(),
        registration_number: "12345678".into(),
        signatory_name: "J. de Vries".into(),
        information_role: Some(role),
    })
}

pub fn person(name: &str, role: InformationRole) -> Party {
    Party::NaturalPerson(NaturalPerson {
        full_name: name.into(),
        address: address("Utrecht"),
        date_of_birth: "1984-03-12".into(),
        place_of_birth: "Utrecht".into(),
        country_of_birth: "the Netherlands".into(),
        information_role: Some(role),
    })
}

pub fn request(variant: NdaVariant, parties: Vec<(&str, Party)>) -> NondisclosureRequest {
    NondisclosureRequest {
        contract_variant: variant,
        contract_purpose: "evaluating a joint venture".into(),
        parties: parties
            .into_iter()
            .map(|(key, party)| (key.to_string(), party))
            .collect(),
        applicable_law: "the Netherlands".into(),
        place_of_jurisdiction: "Amsterdam".into(),
        penalty_clause: None,
        limited_term: None,
    }
}

/// Parties matching the role rules of `variant`: one discloser for
/// unilateral variants, mutual roles otherwise; two or three parties.
pub fn request_for(variant: NdaVariant) -> NondisclosureRequest {
    let multi = matches!(variant, NdaVariant::UnilateralMulti | NdaVariant::MutualMulti);
    let (first, rest) = if variant.is_unilateral() {
        (InformationRole::Disclosing, InformationRole::Receiving)
    } else {
        (InformationRole::Mutual, InformationRole::Mutual)
    };

    let mut parties = vec![
        ("acme", entity("Acme Offshore", first)),
        ("jansen", person("Pieter Jansen", rest)),
    ];
    if multi {
        parties.push(("delta", entity("Delta Research", rest)));
    }
    request(variant, parties)
}
