//! Classification of parsed tokens into legend indices.

use std::sync::Arc;

use crate::legend::{ApiNames, Legend};
use crate::scanning::{ParsedToken, VARIABLE_TOKEN_TYPE};

/// Legend entry used for recognized script operations.
pub const KEYWORD_TYPE: &str = "keyword";
/// Legend entry used for `${...}` tokens.
pub const VARIABLE_TYPE: &str = "variable";
/// Modifier that is honored even though it is absent from the modifier legend.
pub const NOT_IN_LEGEND_MODIFIER: &str = "notInLegend";

/// A token as handed to the host: position plus integer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedToken {
    pub line: u32,
    pub start_character: u32,
    pub length: u32,
    pub token_type: u32,
    pub token_modifiers: u32,
}

/// Maps token type and modifier names onto the host legend.
///
/// Unrecognized names never fail: unknown types map to a sentinel index two past the end of the
/// type legend, and unknown modifiers simply contribute no bits.
#[derive(Debug, Clone)]
pub struct Classifier {
    legend: Arc<Legend>,
    api_names: Arc<ApiNames>,
}

impl Classifier {
    pub fn new(legend: Arc<Legend>, api_names: Arc<ApiNames>) -> Self {
        Self { legend, api_names }
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn api_names(&self) -> &ApiNames {
        &self.api_names
    }

    /// Index returned for types that have no classification.
    pub fn unknown_type(&self) -> u32 {
        self.legend.token_types.len() + 2
    }

    pub fn encode_token_type(&self, token_type: &str) -> u32 {
        let legend_entry = if self.api_names.contains(token_type) {
            KEYWORD_TYPE
        } else if token_type == VARIABLE_TOKEN_TYPE {
            VARIABLE_TYPE
        } else {
            return self.unknown_type();
        };
        self.legend
            .token_types
            .index_of(legend_entry)
            .unwrap_or_else(|| self.unknown_type())
    }

    pub fn encode_token_modifiers<S: AsRef<str>>(&self, token_modifiers: &[S]) -> u32 {
        let modifiers = &self.legend.token_modifiers;
        token_modifiers.iter().fold(0, |bits, modifier| {
            let modifier = modifier.as_ref();
            let bit = if let Some(index) = modifiers.index_of(modifier) {
                Some(index)
            } else if modifier == NOT_IN_LEGEND_MODIFIER {
                Some(modifiers.len() + 2)
            } else {
                None
            };
            bits | bit.and_then(|bit| 1u32.checked_shl(bit)).unwrap_or(0)
        })
    }

    pub fn encode(&self, token: &ParsedToken) -> EncodedToken {
        EncodedToken {
            line: token.line,
            start_character: token.start_character,
            length: token.length,
            token_type: self.encode_token_type(&token.token_type),
            token_modifiers: self.encode_token_modifiers(&token.token_modifiers),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(Legend::standard()), Arc::new(ApiNames::standard()))
    }
}
