/// A parsed markup document.
///
/// The bridge never embeds a markup engine; hosts supply their own parser
/// through [`MarkupParser`] and this type only carries the parsed paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    pub paragraphs: Vec<String>,
}

impl MarkupDocument {
    pub fn plain_text(&self) -> String {
        self.paragraphs.join("\n\n")
    }
}

/// The seam through which the host's markup engine is consumed.
pub trait MarkupParser {
    fn parse(&self, source: &str) -> MarkupDocument;
}

/// Minimal parser splitting on blank lines; the default when a host does not
/// provide its own engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextMarkupParser;

impl MarkupParser for PlainTextMarkupParser {
    fn parse(&self, source: &str) -> MarkupDocument {
        let paragraphs = source
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(str::to_string)
            .collect();
        MarkupDocument { paragraphs }
    }
}
