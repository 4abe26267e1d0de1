use mi_analysis::{EncodedToken, Legend, NeverCancelled, SemanticTokensProvider, TokenSink};
use tower_lsp::lsp_types::{
    Range, SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend,
};

/// Collects encoded tokens and turns them into the LSP relative wire format.
///
/// Tokens may arrive out of order (a line's bracket tokens are reported before its variable
/// tokens), while the wire format requires non-negative deltas, so everything is sorted by
/// position before encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticTokensBuilder {
    tokens: Vec<EncodedToken>,
}

impl SemanticTokensBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn build(self) -> Vec<SemanticToken> {
        encode_relative(self.sorted())
    }

    /// Like [`build`](Self::build), keeping only tokens that overlap `range`.
    pub fn build_in_range(self, range: &Range) -> Vec<SemanticToken> {
        encode_relative(
            self.sorted()
                .into_iter()
                .filter(|token| overlaps(token, range))
                .collect(),
        )
    }

    fn sorted(mut self) -> Vec<EncodedToken> {
        self.tokens
            .sort_by_key(|token| (token.line, token.start_character));
        self.tokens
    }
}

impl TokenSink for SemanticTokensBuilder {
    fn push(
        &mut self,
        line: u32,
        start_character: u32,
        length: u32,
        token_type: u32,
        token_modifiers: u32,
    ) {
        self.tokens.push(EncodedToken {
            line,
            start_character,
            length,
            token_type,
            token_modifiers,
        });
    }
}

/// Scan and encode a document into a fresh builder.
pub fn collect_semantic_tokens(provider: &SemanticTokensProvider, text: &str) -> SemanticTokensBuilder {
    let mut builder = SemanticTokensBuilder::new();
    // tower-lsp drops the request future on $/cancelRequest; a synchronous scan has nothing to poll.
    provider.provide(text, &mut builder, &NeverCancelled);
    builder
}

pub fn semantic_tokens_legend(legend: &Legend) -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: legend
            .token_types
            .names()
            .iter()
            .map(|name| SemanticTokenType::from(name.clone()))
            .collect(),
        token_modifiers: legend
            .token_modifiers
            .names()
            .iter()
            .map(|name| SemanticTokenModifier::from(name.clone()))
            .collect(),
    }
}

fn overlaps(token: &EncodedToken, range: &Range) -> bool {
    let start = (token.line, token.start_character);
    let end = (token.line, token.start_character + token.length);
    end > (range.start.line, range.start.character) && start < (range.end.line, range.end.character)
}

/// Delta-encode position-sorted tokens. Zero-length tokens cannot be rendered and are dropped.
fn encode_relative(tokens: Vec<EncodedToken>) -> Vec<SemanticToken> {
    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in tokens {
        if token.length == 0 {
            continue;
        }
        let delta_line = token.line.saturating_sub(prev_line);
        let delta_start = if delta_line == 0 {
            token.start_character.saturating_sub(prev_start)
        } else {
            token.start_character
        };
        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.token_type,
            token_modifiers_bitset: token.token_modifiers,
        });
        prev_line = token.line;
        prev_start = token.start_character;
    }

    data
}
