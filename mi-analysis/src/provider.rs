//! Scan-and-encode entry point used by hosts.
//!
//!     The provider is the only piece a host talks to. It is built once with the legend and API
//!     name set, shared by reference across requests, and holds no per-request state. Hosts plug
//!     in two capabilities:
//!
//!         TokenSink       receives encoded tokens in emission order (the host's builder)
//!         CancelSignal    lets the host abandon a request; checked once per line
//!
//!     Any failure raised by a host sink is the host's to handle; the provider itself has no
//!     error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::encoding::{Classifier, EncodedToken};
use crate::legend::{ApiNames, Legend};
use crate::scanning::{scan_line, split_lines};

/// Destination for encoded tokens.
pub trait TokenSink {
    fn push(
        &mut self,
        line: u32,
        start_character: u32,
        length: u32,
        token_type: u32,
        token_modifiers: u32,
    );
}

impl TokenSink for Vec<EncodedToken> {
    fn push(
        &mut self,
        line: u32,
        start_character: u32,
        length: u32,
        token_type: u32,
        token_modifiers: u32,
    ) {
        Vec::push(
            self,
            EncodedToken {
                line,
                start_character,
                length,
                token_type,
                token_modifiers,
            },
        );
    }
}

/// Host-side request cancellation.
pub trait CancelSignal {
    fn is_cancelled(&self) -> bool;
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancelSignal for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// How a provide call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvideOutcome {
    /// Every line was scanned; carries the number of tokens pushed.
    Completed(usize),
    /// The signal fired before the last line was scanned.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct SemanticTokensProvider {
    classifier: Classifier,
}

impl SemanticTokensProvider {
    pub fn new(legend: Arc<Legend>, api_names: Arc<ApiNames>) -> Self {
        Self::with_classifier(Classifier::new(legend, api_names))
    }

    pub fn with_classifier(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// The legend to declare to the host at registration time.
    pub fn legend(&self) -> &Legend {
        self.classifier.legend()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Scan `text` and push every encoded token into `sink`.
    pub fn provide<S, C>(&self, text: &str, sink: &mut S, cancel: &C) -> ProvideOutcome
    where
        S: TokenSink + ?Sized,
        C: CancelSignal + ?Sized,
    {
        let mut parsed = Vec::new();
        let mut pushed = 0;
        for (index, line) in split_lines(text).enumerate() {
            if cancel.is_cancelled() {
                tracing::trace!(line = index, pushed, "semantic token scan cancelled");
                return ProvideOutcome::Cancelled;
            }
            scan_line(index as u32, line, &mut parsed);
            for token in parsed.drain(..) {
                let encoded = self.classifier.encode(&token);
                sink.push(
                    encoded.line,
                    encoded.start_character,
                    encoded.length,
                    encoded.token_type,
                    encoded.token_modifiers,
                );
                pushed += 1;
            }
        }
        ProvideOutcome::Completed(pushed)
    }

    /// Convenience wrapper collecting every token of `text`.
    pub fn encode_document(&self, text: &str) -> Vec<EncodedToken> {
        let mut tokens = Vec::new();
        self.provide(text, &mut tokens, &NeverCancelled);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::scan;
    use std::cell::Cell;

    const SCRIPT: &str = "[showBg:forest]\n${hero:notInLegend} enters [showCh:left]\r\n[say] hello";

    /// Fires after a fixed number of checks.
    struct CancelAfter {
        remaining: Cell<usize>,
    }

    impl CancelSignal for CancelAfter {
        fn is_cancelled(&self) -> bool {
            let remaining = self.remaining.get();
            if remaining == 0 {
                return true;
            }
            self.remaining.set(remaining - 1);
            false
        }
    }

    #[test]
    fn provides_tokens_in_emission_order() {
        let provider = SemanticTokensProvider::default();
        let tokens = provider.encode_document(SCRIPT);
        let tuples: Vec<(u32, u32, u32, u32, u32)> = tokens
            .iter()
            .map(|t| {
                (
                    t.line,
                    t.start_character,
                    t.length,
                    t.token_type,
                    t.token_modifiers,
                )
            })
            .collect();
        assert_eq!(
            tuples,
            vec![
                (0, 1, 13, 0, 0),
                (1, 28, 11, 0, 0),
                (1, 0, 19, 1, 4),
                (2, 1, 3, 4, 0),
            ]
        );
    }

    #[test]
    fn provide_matches_scan_then_encode() {
        let provider = SemanticTokensProvider::default();
        let expected: Vec<EncodedToken> = scan(SCRIPT)
            .iter()
            .map(|token| provider.classifier().encode(token))
            .collect();
        let mut sink = Vec::new();
        let outcome = provider.provide(SCRIPT, &mut sink, &NeverCancelled);
        assert_eq!(outcome, ProvideOutcome::Completed(expected.len()));
        assert_eq!(sink, expected);
    }

    #[test]
    fn repeated_requests_are_identical() {
        let provider = SemanticTokensProvider::default();
        assert_eq!(
            provider.encode_document(SCRIPT),
            provider.encode_document(SCRIPT)
        );
    }

    #[test]
    fn cancelled_signal_stops_before_scanning() {
        let provider = SemanticTokensProvider::default();
        let cancelled = AtomicBool::new(true);
        let mut sink = Vec::new();
        assert_eq!(
            provider.provide(SCRIPT, &mut sink, &cancelled),
            ProvideOutcome::Cancelled
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn cancellation_is_checked_per_line() {
        let provider = SemanticTokensProvider::default();
        let cancel = CancelAfter {
            remaining: Cell::new(1),
        };
        let mut sink = Vec::new();
        assert_eq!(
            provider.provide(SCRIPT, &mut sink, &cancel),
            ProvideOutcome::Cancelled
        );
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].line, 0);
    }

    #[test]
    fn shared_signal_through_arc() {
        let provider = SemanticTokensProvider::default();
        let signal = Arc::new(AtomicBool::new(false));
        let mut sink = Vec::new();
        assert_eq!(
            provider.provide("[showCg]", &mut sink, &signal),
            ProvideOutcome::Completed(1)
        );
    }

    #[test]
    fn exposes_registration_legend() {
        let provider = SemanticTokensProvider::default();
        assert_eq!(provider.legend().token_types.names(), &["keyword", "variable"]);
        assert!(provider.legend().token_modifiers.names().is_empty());
    }
}
