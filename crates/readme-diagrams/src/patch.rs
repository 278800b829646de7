use crate::plan::PlannedDiagram;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchAction {
    /// The exact reference already sat above the block.
    Unchanged,
    /// A reference line was added above the block.
    Inserted,
    /// An outdated generated reference above the block was swapped for the current one.
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    /// One entry per diagram, in document order.
    pub actions: Vec<PatchAction>,
}

impl Patched {
    pub fn changed(&self) -> bool {
        self.actions.iter().any(|a| *a != PatchAction::Unchanged)
    }
}

fn reference_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^!\[Diagram \d+\]\(([^()\s]+)\)$").expect("reference line regex")
    })
}

/// Byte length of a generated reference (plus its blank line) that `before` ends with, if the
/// reference links below `link_prefix`.
fn trailing_generated_reference(before: &str, link_prefix: &str) -> Option<usize> {
    let head = before.strip_suffix("\n\n")?;
    let line = match head.rfind('\n') {
        Some(i) => &head[i + 1..],
        None => head,
    };
    let caps = reference_line_re().captures(line)?;
    let link = caps.get(1)?.as_str();
    if !link.starts_with(link_prefix) {
        return None;
    }
    Some(line.len() + 2)
}

/// Places each diagram's reference line, followed by a blank line, directly above its fence.
///
/// Diagrams must come from the same `text` and be in document order. Patching is positional:
/// identical blocks at different positions each receive their own reference. Running the patch
/// on its own output changes nothing.
pub fn patch(text: &str, diagrams: &[PlannedDiagram], link_prefix: &str) -> Patched {
    let mut out = String::with_capacity(text.len() + diagrams.len() * 64);
    let mut actions = Vec::with_capacity(diagrams.len());
    let mut cursor = 0usize;

    for d in diagrams {
        let start = d.block.start;
        if start < cursor || start > text.len() {
            continue;
        }
        out.push_str(&text[cursor..start]);
        cursor = start;

        let expected = format!("{}\n\n", d.reference_line());
        let action = if out.ends_with(&expected) {
            PatchAction::Unchanged
        } else if let Some(stale_len) = trailing_generated_reference(&out, link_prefix) {
            out.truncate(out.len() - stale_len);
            out.push_str(&expected);
            PatchAction::Replaced
        } else {
            out.push_str(&expected);
            PatchAction::Inserted
        };
        tracing::debug!(index = d.block.index, ?action, "patched diagram reference");
        actions.push(action);
    }

    out.push_str(&text[cursor..]);
    Patched { text: out, actions }
}
