use tower_lsp::lsp_types::Url;

pub(crate) const SAMPLE: &str = "[showBg:forest]
${hero:notInLegend} enters [showCh:left]
[whisper:x] The wind picks up.
${town} fade [showEffect:rain]";

pub(crate) fn sample_uri() -> Url {
    Url::parse("file:///chapter1.mi").expect("valid sample uri")
}
