//! Non-disclosure agreement requests and their validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::context::GLOBAL_KEY;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::party::{InformationRole, Parties, Party};

static POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4} ?[A-Z]{2}$").expect("postcode pattern compiles"));

/// Direction of the confidentiality obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Unilateral,
    Mutual,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Unilateral => "unilateral",
            Direction::Mutual => "mutual",
        }
    }
}

/// Two-party ("standard") or multi-party agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Standard,
    Multi,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Standard => "standard",
            Cardinality::Multi => "multi",
        }
    }
}

/// NDA variant, serialized as `"<direction>/<cardinality>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NdaVariant {
    #[default]
    #[serde(rename = "unilateral/standard")]
    UnilateralStandard,
    #[serde(rename = "unilateral/multi")]
    UnilateralMulti,
    #[serde(rename = "mutual/standard")]
    MutualStandard,
    #[serde(rename = "mutual/multi")]
    MutualMulti,
}

impl NdaVariant {
    pub const ALL: [NdaVariant; 4] = [
        NdaVariant::UnilateralStandard,
        NdaVariant::UnilateralMulti,
        NdaVariant::MutualStandard,
        NdaVariant::MutualMulti,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            NdaVariant::UnilateralStandard | NdaVariant::UnilateralMulti => Direction::Unilateral,
            NdaVariant::MutualStandard | NdaVariant::MutualMulti => Direction::Mutual,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            NdaVariant::UnilateralStandard | NdaVariant::MutualStandard => Cardinality::Standard,
            NdaVariant::UnilateralMulti | NdaVariant::MutualMulti => Cardinality::Multi,
        }
    }

    pub fn is_unilateral(&self) -> bool {
        self.direction() == Direction::Unilateral
    }

    /// The variant tag, e.g. `"mutual/multi"`.
    pub fn tag(&self) -> String {
        format!("{}/{}", self.direction().as_str(), self.cardinality().as_str())
    }
}

impl fmt::Display for NdaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Years,
    Months,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Years => "years",
            DurationUnit::Months => "months",
        }
    }
}

/// Bounded confidentiality term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub duration_amount: u32,
    pub duration_unit: DurationUnit,
}

/// Contractual penalty for the first and each subsequent breach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub initial_amount: u32,
    pub subsequent_amount: u32,
}

/// A request for a non-disclosure agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NondisclosureRequest {
    #[serde(default)]
    pub contract_variant: NdaVariant,
    pub contract_purpose: String,
    pub parties: Parties,
    pub applicable_law: String,
    pub place_of_jurisdiction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_clause: Option<Penalty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limited_term: Option<Term>,
}

impl NondisclosureRequest {
    /// Check the request before any fragment is loaded.
    pub fn validate(&self) -> DomainResult<()> {
        require_text("contract_purpose", &self.contract_purpose)?;
        require_text("applicable_law", &self.applicable_law)?;
        require_text("place_of_jurisdiction", &self.place_of_jurisdiction)?;

        if self.parties.is_empty() {
            return Err(DomainError::Validation(
                "at least one party must be provided".into(),
            ));
        }

        for (key, party) in self.parties.iter() {
            if key.trim().is_empty() {
                return Err(DomainError::Validation("party key must not be empty".into()));
            }
            if key == GLOBAL_KEY {
                return Err(DomainError::Validation(format!(
                    "party key '{GLOBAL_KEY}' is reserved"
                )));
            }
            if party.information_role().is_none() {
                return Err(DomainError::Validation(format!(
                    "information role must be set for party '{key}'"
                )));
            }
            validate_postcode(key, party)?;
        }

        if self.contract_variant.is_unilateral() {
            let disclosing = disclosing_count(&self.parties);
            if disclosing != 1 {
                return Err(DomainError::Validation(format!(
                    "unilateral agreements need exactly one disclosing party, found {disclosing}"
                )));
            }
        }

        if let Some(penalty) = &self.penalty_clause {
            if penalty.initial_amount == 0 || penalty.subsequent_amount == 0 {
                return Err(DomainError::Validation(
                    "penalty amounts must be greater than zero".into(),
                ));
            }
        }

        if let Some(term) = &self.limited_term {
            if term.duration_amount == 0 {
                return Err(DomainError::Validation(
                    "term duration must be greater than zero".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Number of parties with the disclosing role.
pub fn disclosing_count(parties: &Parties) -> usize {
    parties
        .iter()
        .filter(|(_, p)| p.information_role() == Some(InformationRole::Disclosing))
        .count()
}

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn validate_postcode(key: &str, party: &Party) -> DomainResult<()> {
    let postcode = &party.address().postcode;
    if !POSTCODE.is_match(postcode) {
        return Err(DomainError::Validation(format!(
            "party '{key}': postcode '{postcode}' must be 4 digits followed by 2 capital letters"
        )));
    }
    Ok(())
}
