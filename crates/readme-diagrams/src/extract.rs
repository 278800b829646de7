use crate::error::{Error, Result};
use regex::Regex;

/// A fenced diagram block found in a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// 1-based position in document order.
    pub index: usize,
    /// Byte offset of the opening fence.
    pub start: usize,
    /// Byte offset just past the closing fence.
    pub end: usize,
    /// The whole fence, backticks included.
    pub full: String,
    /// The text between the opening line and the closing fence.
    pub body: String,
}

/// Finds `` ```<language> `` fences in markdown text.
///
/// The opening line may carry trailing whitespace but no other words, so a fence tagged
/// `mermaidjs` or `mermaid-example` is not picked up for `mermaid`. Bodies are matched lazily:
/// two adjacent fences never merge into one block.
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    language: String,
    pattern: Regex,
}

impl BlockExtractor {
    pub fn new(language: &str) -> Result<Self> {
        let language = language.trim();
        if language.is_empty() {
            return Err(Error::EmptyLanguage);
        }
        let pattern = Regex::new(&format!(
            r"```{}[ \t\r]*\n([\s\S]*?)\n```",
            regex::escape(language)
        ))?;
        Ok(Self {
            language: language.to_string(),
            pattern,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn extract(&self, text: &str) -> Vec<DiagramBlock> {
        self.pattern
            .captures_iter(text)
            .enumerate()
            .filter_map(|(i, caps)| {
                let full = caps.get(0)?;
                let body = caps.get(1)?;
                Some(DiagramBlock {
                    index: i + 1,
                    start: full.start(),
                    end: full.end(),
                    full: full.as_str().to_string(),
                    body: body.as_str().to_string(),
                })
            })
            .collect()
    }
}
