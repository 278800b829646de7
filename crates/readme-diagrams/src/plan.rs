use crate::config::{Settings, posix_path};
use crate::extract::DiagramBlock;
use crate::hash::content_hash;
use std::path::PathBuf;

/// A diagram block together with the names derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDiagram {
    pub block: DiagramBlock,
    pub hash: String,
    /// `{prefix}-{index}-{hash}`, shared by the source and image files.
    pub base_name: String,
    /// Renderer input, relative to the run root.
    pub source_path: PathBuf,
    /// Renderer output, relative to the run root.
    pub image_path: PathBuf,
    /// `image_path` with `/` separators, as referenced from the readme.
    pub link: String,
}

impl PlannedDiagram {
    pub fn reference_line(&self) -> String {
        reference_line(self.block.index, &self.link)
    }

    /// Renderer input text: the trimmed body plus a trailing newline.
    pub fn source_text(&self) -> String {
        format!("{}\n", self.block.body.trim())
    }
}

pub fn reference_line(index: usize, link: &str) -> String {
    format!("![Diagram {index}]({link})")
}

pub fn base_name(prefix: &str, index: usize, index_width: usize, hash: &str) -> String {
    format!("{prefix}-{index:0index_width$}-{hash}")
}

/// Link prefix shared by every image this configuration can produce. References starting with
/// it are considered ours when refreshing stale fallbacks.
pub fn generated_link_prefix(settings: &Settings) -> String {
    let dir = posix_path(&settings.out_dir);
    if dir.is_empty() {
        format!("{}-", settings.name_prefix)
    } else {
        format!("{dir}/{}-", settings.name_prefix)
    }
}

pub fn plan_diagrams(blocks: &[DiagramBlock], settings: &Settings) -> Vec<PlannedDiagram> {
    let ext = settings.format.extension();
    blocks
        .iter()
        .map(|block| {
            let hash = content_hash(&block.body);
            let base_name = base_name(
                &settings.name_prefix,
                block.index,
                settings.index_width,
                &hash,
            );
            let source_path = settings.tmp_dir.join(format!("{base_name}.mmd"));
            let image_path = settings.out_dir.join(format!("{base_name}.{ext}"));
            let link = posix_path(&image_path);
            PlannedDiagram {
                block: block.clone(),
                hash,
                base_name,
                source_path,
                image_path,
                link,
            }
        })
        .collect()
}
