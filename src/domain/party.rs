//! Contract parties: natural persons and legal entities.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role of a party regarding confidential information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InformationRole {
    Disclosing,
    Receiving,
    Mutual,
}

/// Legal form of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyType {
    #[serde(rename = "LLC")]
    Llc,
    #[serde(rename = "Foundation")]
    Foundation,
    #[serde(rename = "B.V.")]
    Bv,
    #[serde(rename = "N.V.")]
    Nv,
}

impl CompanyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::Llc => "LLC",
            CompanyType::Foundation => "Foundation",
            CompanyType::Bv => "B.V.",
            CompanyType::Nv => "N.V.",
        }
    }
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_name: String,
    pub house_nr: String,
    pub city: String,
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Address {
    /// `"<street> <nr>[ <suffix>], <postcode> <city>"`
    pub fn formatted(&self) -> String {
        let mut out = format!("{} {}", self.street_name, self.house_nr);
        if let Some(suffix) = &self.suffix {
            out.push(' ');
            out.push_str(suffix);
        }
        out.push_str(&format!(", {} {}", self.postcode, self.city));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalPerson {
    pub full_name: String,
    pub address: Address,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub country_of_birth: String,
    #[serde(default)]
    pub information_role: Option<InformationRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalEntity {
    pub company_type: CompanyType,
    pub name: String,
    pub registered_address: Address,
    pub country_of_incorporation: String,
    /// Chamber of commerce registration number.
    #[serde(alias = "kvk_nr")]
    pub registration_number: String,
    pub signatory_name: String,
    #[serde(default)]
    pub information_role: Option<InformationRole>,
}

/// A contract party, discriminated by `party_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "party_type", rename_all = "snake_case")]
pub enum Party {
    NaturalPerson(NaturalPerson),
    LegalEntity(LegalEntity),
}

impl Party {
    /// Name used in running text.
    pub fn display_name(&self) -> &str {
        match self {
            Party::NaturalPerson(p) => &p.full_name,
            Party::LegalEntity(e) => &e.name,
        }
    }

    pub fn information_role(&self) -> Option<InformationRole> {
        match self {
            Party::NaturalPerson(p) => p.information_role,
            Party::LegalEntity(e) => e.information_role,
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            Party::NaturalPerson(p) => &p.address,
            Party::LegalEntity(e) => &e.registered_address,
        }
    }

    /// Value of the `type` context field.
    pub fn kind(&self) -> &'static str {
        match self {
            Party::NaturalPerson(_) => "natural_person",
            Party::LegalEntity(_) => "legal_entity",
        }
    }
}

/// Parties keyed by party key, in the order of the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parties(Vec<(String, Party)>);

impl Parties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a party. Like a map insert, a repeated key replaces the
    /// earlier party in place and hands it back. Only deserialization
    /// treats a repeated key as an error.
    pub fn insert(&mut self, key: impl Into<String>, party: Party) -> Option<Party> {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, party)),
            None => {
                self.0.push((key, party));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Party> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Party)> {
        self.0.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

/// Collecting follows [`Parties::insert`]: the last party for a key wins.
impl FromIterator<(String, Party)> for Parties {
    fn from_iter<I: IntoIterator<Item = (String, Party)>>(iter: I) -> Self {
        let mut parties = Parties::new();
        for (key, party) in iter {
            parties.insert(key, party);
        }
        parties
    }
}

impl Serialize for Parties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, party) in &self.0 {
            map.serialize_entry(key, party)?;
        }
        map.end()
    }
}

struct PartiesVisitor;

impl<'de> Visitor<'de> for PartiesVisitor {
    type Value = Parties;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of party keys to parties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Parties, A::Error> {
        let mut parties = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, party)) = access.next_entry::<String, Party>()? {
            if parties.iter().any(|(k, _): &(String, Party)| *k == key) {
                return Err(serde::de::Error::custom(format!("duplicate party key '{key}'")));
            }
            parties.push((key, party));
        }
        Ok(Parties(parties))
    }
}

impl<'de> Deserialize<'de> for Parties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PartiesVisitor)
    }
}
