//! Tests for request parsing and validation

mod common;

use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use draftwork::domain::{
    DomainError, DurationUnit, InformationRole, NdaVariant, NondisclosureRequest, Party, Penalty,
    Term,
};
use draftwork::infrastructure::traits::RealFileSystem;
use draftwork::infrastructure::{load_request, InfraError};

use common::{entity, person, request, request_for};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("requests")
        .join(name)
}

fn validation_message(req: &NondisclosureRequest) -> String {
    match req.validate() {
        Err(DomainError::Validation(msg)) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================
// Parsing
// ============================================================

#[test]
fn given_json_demo_request_when_loading_then_parties_keep_document_order() {
    // Act
    let req = load_request(&RealFileSystem, &demo("unilateral_standard.json")).unwrap();

    // Assert
    assert_eq!(req.contract_variant, NdaVariant::UnilateralStandard);
    assert_eq!(req.parties.keys().collect::<Vec<_>>(), vec!["acme", "jansen"]);
    assert!(matches!(req.parties.get("acme"), Some(Party::LegalEntity(_))));
    assert_eq!(
        req.penalty_clause,
        Some(Penalty {
            initial_amount: 25000,
            subsequent_amount: 1000
        })
    );
    assert!(req.validate().is_ok());
}

#[test]
fn given_toml_demo_request_when_loading_then_parties_keep_document_order() {
    // Act
    let req = load_request(&RealFileSystem, &demo("mutual_multi.toml")).unwrap();

    // Assert
    assert_eq!(req.contract_variant, NdaVariant::MutualMulti);
    assert_eq!(
        req.parties.keys().collect::<Vec<_>>(),
        vec!["northwind", "delta", "alders"]
    );
    assert!(req.limited_term.is_none());
    assert!(req.validate().is_ok());
}

#[test]
fn given_request_without_variant_when_parsing_then_defaults_to_unilateral_standard() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("req.json");
    let mut value = serde_json::to_value(request_for(NdaVariant::MutualStandard)).unwrap();
    value.as_object_mut().unwrap().remove("contract_variant");
    fs::write(&path, value.to_string()).unwrap();

    // Act
    let req = load_request(&RealFileSystem, &path).unwrap();

    // Assert
    assert_eq!(req.contract_variant, NdaVariant::UnilateralStandard);
}

#[test]
fn given_duplicate_party_key_when_parsing_then_fails() {
    // Arrange
    let json = r#"{
        "contract_purpose": "p", "applicable_law": "l", "place_of_jurisdiction": "c",
        "parties": {
            "a": {"party_type": "natural_person", "full_name": "A",
                  "address": {"street_name": "s", "house_nr": "1", "city": "c", "postcode": "1234AB"},
                  "date_of_birth": "d", "place_of_birth": "p", "country_of_birth": "c"},
            "a": {"party_type": "natural_person", "full_name": "B",
                  "address": {"street_name": "s", "house_nr": "1", "city": "c", "postcode": "1234AB"},
                  "date_of_birth": "d", "place_of_birth": "p", "country_of_birth": "c"}
        }
    }"#;

    // Act
    let result: Result<NondisclosureRequest, _> = serde_json::from_str(json);

    // Assert
    let err = result.unwrap_err().to_string();
    assert!(err.contains("duplicate party key 'a'"), "got {err}");
}

#[test]
fn given_unparseable_file_when_loading_then_fails_with_parse_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "contract_variant = ").unwrap();

    // Act
    let err = load_request(&RealFileSystem, &path).unwrap_err();

    // Assert
    assert!(matches!(err, InfraError::Parse { ref path, .. } if path.ends_with("broken.toml")));
}

#[test]
fn given_missing_file_when_loading_then_fails_with_io_error() {
    // Arrange
    let temp = TempDir::new().unwrap();

    // Act
    let err = load_request(&RealFileSystem, &temp.path().join("absent.json")).unwrap_err();

    // Assert
    assert!(matches!(err, InfraError::Io { .. }));
}

// ============================================================
// Validation
// ============================================================

#[test]
fn given_no_parties_when_validating_then_fails() {
    let req = request(NdaVariant::MutualStandard, vec![]);
    assert!(validation_message(&req).contains("at least one party"));
}

#[test]
fn given_reserved_party_key_when_validating_then_fails() {
    let req = request(
        NdaVariant::MutualStandard,
        vec![
            ("_global", entity("Acme Offshore", InformationRole::Mutual)),
            ("b", person("Pieter Jansen", InformationRole::Mutual)),
        ],
    );
    assert!(validation_message(&req).contains("reserved"));
}

#[test]
fn given_party_without_role_when_validating_then_fails() {
    // Arrange
    let mut party = person("Pieter Jansen", InformationRole::Mutual);
    if let Party::NaturalPerson(p) = &mut party {
        p.information_role = None;
    }
    let req = request(
        NdaVariant::MutualStandard,
        vec![("a", entity("Acme Offshore", InformationRole::Mutual)), ("b", party)],
    );

    // Act & Assert
    assert!(validation_message(&req).contains("information role must be set for party 'b'"));
}

#[rstest]
#[case(0)]
#[case(2)]
fn given_unilateral_variant_without_single_discloser_when_validating_then_fails(
    #[case] disclosers: usize,
) {
    // Arrange
    let role = |i: usize| {
        if i < disclosers {
            InformationRole::Disclosing
        } else {
            InformationRole::Receiving
        }
    };
    let req = request(
        NdaVariant::UnilateralMulti,
        vec![
            ("a", entity("Acme Offshore", role(0))),
            ("b", entity("Beta Holding", role(1))),
            ("c", person("Pieter Jansen", role(2))),
        ],
    );

    // Act & Assert
    assert!(validation_message(&req).contains(&format!("found {disclosers}")));
}

#[rstest]
#[case("1015BA", true)]
#[case("1015 BA", true)]
#[case("1015  BA", false)]
#[case("1015 ba", false)]
#[case("101 BA", false)]
fn given_postcode_when_validating_then_only_dutch_format_passes(
    #[case] postcode: &str,
    #[case] valid: bool,
) {
    // Arrange
    let mut req = request_for(NdaVariant::MutualStandard);
    let mut party = entity("Acme Offshore", InformationRole::Mutual);
    if let Party::LegalEntity(e) = &mut party {
        e.registered_address.postcode = postcode.to_string();
    }
    req.parties = vec![
        ("acme".to_string(), party),
        ("jansen".to_string(), person("Pieter Jansen", InformationRole::Mutual)),
    ]
    .into_iter()
    .collect();

    // Act
    let result = req.validate();

    // Assert
    assert_eq!(result.is_ok(), valid, "postcode {postcode:?}");
}

#[test]
fn given_zero_amounts_when_validating_then_fails() {
    // Arrange
    let mut with_penalty = request_for(NdaVariant::MutualStandard);
    with_penalty.penalty_clause = Some(Penalty {
        initial_amount: 0,
        subsequent_amount: 100,
    });
    let mut with_term = request_for(NdaVariant::MutualStandard);
    with_term.limited_term = Some(Term {
        duration_amount: 0,
        duration_unit: DurationUnit::Years,
    });

    // Act & Assert
    assert!(validation_message(&with_penalty).contains("penalty"));
    assert!(validation_message(&with_term).contains("term duration"));
}

#[rstest]
#[case("contract_purpose")]
#[case("applicable_law")]
#[case("place_of_jurisdiction")]
fn given_blank_text_field_when_validating_then_names_the_field(#[case] field: &str) {
    // Arrange
    let mut req = request_for(NdaVariant::MutualStandard);
    match field {
        "contract_purpose" => req.contract_purpose = " ".into(),
        "applicable_law" => req.applicable_law = String::new(),
        _ => req.place_of_jurisdiction = "\t".into(),
    }

    // Act & Assert
    assert_eq!(validation_message(&req), format!("{field} must not be blank"));
}
