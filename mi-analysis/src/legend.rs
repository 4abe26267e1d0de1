//! Legends and the API name set.
//!
//! A legend is the ordered list of names the host registers once at startup. Token types and
//! modifiers are sent over the wire as indices into those lists, so the order here is part of
//! the protocol contract and must never change between registration and encoding.

use std::collections::{HashMap, HashSet};

/// Token type names registered with the host, in index order.
pub const TOKEN_TYPES: &[&str] = &["keyword", "variable"];

/// Token modifier names registered with the host, in index order.
pub const TOKEN_MODIFIERS: &[&str] = &[];

/// Script operations highlighted as keywords when they appear as a bracket token type.
pub const API_NAMES: &[&str] = &[
    "showBg",
    "leaveCh",
    "showCh",
    "playBgm",
    "pauseBgm",
    "resumeBgm",
    "removeBg",
    "showCg",
    "removeCg",
    "showChoose",
    "showInput",
    "showEffect",
    "removeEffect",
    "showSoundEffect",
];

/// An ordered name list with constant-time name to index lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendTable {
    names: Vec<String>,
    indices: HashMap<String, u32>,
}

impl LegendTable {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let indices = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index as u32))
            .collect();
        Self { names, indices }
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Number of distinct entries.
    pub fn len(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// The pair of legends declared to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub token_types: LegendTable,
    pub token_modifiers: LegendTable,
}

impl Legend {
    pub fn new(token_types: LegendTable, token_modifiers: LegendTable) -> Self {
        Self {
            token_types,
            token_modifiers,
        }
    }

    /// The legend registered for mi documents.
    pub fn standard() -> Self {
        Self::new(
            LegendTable::new(TOKEN_TYPES.iter().copied()),
            LegendTable::new(TOKEN_MODIFIERS.iter().copied()),
        )
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::standard()
    }
}

/// Membership set of recognized script operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiNames {
    names: HashSet<String>,
}

impl ApiNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(API_NAMES.iter().copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ApiNames {
    fn default() -> Self {
        Self::standard()
    }
}
