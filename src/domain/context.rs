//! Rendering contexts: per-party scopes plus section-level globals.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::request::NdaVariant;
use crate::domain::template::Scope;

/// Reserved party-context key carrying section-level values.
pub const GLOBAL_KEY: &str = "_global";

/// Section-level values shared by all parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalContext {
    pub party_count: usize,
    pub variant_tag: String,
}

impl GlobalContext {
    pub fn new(party_count: usize, variant: NdaVariant) -> Self {
        Self {
            party_count,
            variant_tag: variant.tag(),
        }
    }

    pub fn to_scope(&self) -> Scope {
        Scope::new()
            .with("partyCount", self.party_count)
            .with("variantTag", self.variant_tag.as_str())
    }
}

/// Party key to party scope, in request order, plus the `_global` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyContext {
    global: GlobalContext,
    parties: Vec<(String, Scope)>,
}

impl PartyContext {
    pub fn new(global: GlobalContext) -> Self {
        Self {
            global,
            parties: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, scope: Scope) {
        self.parties.push((key.into(), scope));
    }

    pub fn global(&self) -> &GlobalContext {
        &self.global
    }

    pub fn party(&self, key: &str) -> Option<&Scope> {
        self.parties.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parties.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scope)> {
        self.parties.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Number of parties, not counting `_global`.
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

impl Serialize for PartyContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.parties.len() + 1))?;
        map.serialize_entry(GLOBAL_KEY, &self.global)?;
        for (key, scope) in &self.parties {
            map.serialize_entry(key, scope)?;
        }
        map.end()
    }
}

/// Both scopes built from one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    pub shared: Scope,
    pub parties: PartyContext,
}
