//! Semantic highlighting core for mi scripts.
//!
//!     mi scripts mark script operations with bracket tokens and interpolate values with
//!     variable tokens:
//!
//!         [showBg:forest] The wind picks up.
//!         ${hero:notInLegend} walks in. [showCh:left]
//!
//!     This crate turns document text into classified spans for an editor's highlighting layer.
//!     It has no I/O and no async code; the language server in mi-lsp is a thin adapter over it.
//!
//! Layout
//!
//!     scanning    line scanner producing ParsedToken records in document order
//!     legend      type/modifier legends and the set of recognized script operations
//!     encoding    maps ParsedToken names onto legend indices and modifier bitsets
//!     provider    scan-and-encode entry point with the TokenSink and CancelSignal capabilities
//!
//!     Legends and the API name set are built once at startup and shared read-only, so a single
//!     provider can serve concurrent requests for independent documents.

pub mod encoding;
pub mod legend;
pub mod provider;
pub mod scanning;

pub use encoding::{Classifier, EncodedToken};
pub use legend::{ApiNames, Legend, LegendTable};
pub use provider::{
    CancelSignal, NeverCancelled, ProvideOutcome, SemanticTokensProvider, TokenSink,
};
pub use scanning::{scan, ParsedToken};
