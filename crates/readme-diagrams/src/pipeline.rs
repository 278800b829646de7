use crate::config::{Settings, check_renderer_config, posix_path};
use crate::error::{Error, Result};
use crate::extract::BlockExtractor;
use crate::patch::{PatchAction, patch};
use crate::plan::{PlannedDiagram, generated_link_prefix, plan_diagrams};
use crate::render::{RenderRequest, Renderer};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Rendered,
    /// The content-addressed image already existed and was kept.
    Cached,
    /// Dry run: nothing was rendered.
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramReport {
    pub index: usize,
    pub hash: String,
    pub base_name: String,
    pub image: String,
    pub render: RenderStatus,
    pub patch: PatchAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub readme: String,
    pub out_dir: String,
    pub diagrams: Vec<DiagramReport>,
    /// Whether the readme content changed (in a dry run: would change).
    pub readme_changed: bool,
    pub dry_run: bool,
}

impl Report {
    pub fn rendered_count(&self) -> usize {
        self.diagrams
            .iter()
            .filter(|d| d.render != RenderStatus::Planned)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The readme holds no diagram blocks; nothing was written.
    NoDiagrams { readme: String },
    Processed(Report),
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.display().to_string(),
        source,
    })
}

fn render_one(
    root: &Path,
    settings: &Settings,
    config: Option<&Path>,
    renderer: &dyn Renderer,
    d: &PlannedDiagram,
) -> Result<RenderStatus> {
    let source = resolve(root, &d.source_path);
    let image = resolve(root, &d.image_path);

    if settings.skip_existing && image.is_file() {
        tracing::info!(index = d.block.index, image = %d.link, "reusing existing image");
        return Ok(RenderStatus::Cached);
    }

    fs::write(&source, d.source_text()).map_err(|source_err| Error::WriteFile {
        path: source.display().to_string(),
        source: source_err,
    })?;

    tracing::info!(index = d.block.index, image = %d.link, "rendering diagram");
    renderer.render(&RenderRequest {
        input: &source,
        output: &image,
        config,
        background: &settings.background,
    })?;
    Ok(RenderStatus::Rendered)
}

/// Extracts, renders and patches the readme under `root`.
///
/// Required inputs are checked before anything is written. Rendering is sequential and the
/// first failure aborts the run with the readme untouched.
pub fn run(root: &Path, settings: &Settings, renderer: &dyn Renderer) -> Result<Outcome> {
    let readme_path = resolve(root, &settings.readme);
    let readme_label = posix_path(&settings.readme);
    if !readme_path.is_file() {
        return Err(Error::MissingReadme {
            path: readme_label,
        });
    }
    let config = settings
        .renderer_config
        .as_deref()
        .map(|p| resolve(root, p));
    if let Some(config) = config.as_deref() {
        check_renderer_config(config)?;
    }

    let extractor = BlockExtractor::new(&settings.language)?;
    let text = fs::read_to_string(&readme_path).map_err(|source| Error::ReadFile {
        path: readme_path.display().to_string(),
        source,
    })?;

    let blocks = extractor.extract(&text);
    tracing::debug!(count = blocks.len(), language = extractor.language(), "extracted blocks");
    if blocks.is_empty() {
        return Ok(Outcome::NoDiagrams {
            readme: readme_label,
        });
    }

    let planned = plan_diagrams(&blocks, settings);

    let mut statuses = Vec::with_capacity(planned.len());
    if settings.dry_run {
        statuses.resize(planned.len(), RenderStatus::Planned);
    } else {
        create_dir(&resolve(root, &settings.out_dir))?;
        create_dir(&resolve(root, &settings.tmp_dir))?;
        for d in &planned {
            statuses.push(render_one(root, settings, config.as_deref(), renderer, d)?);
        }
    }

    let patched = patch(&text, &planned, &generated_link_prefix(settings));
    let readme_changed = patched.changed();
    if readme_changed && !settings.dry_run {
        fs::write(&readme_path, &patched.text).map_err(|source| Error::WriteFile {
            path: readme_path.display().to_string(),
            source,
        })?;
    }

    let diagrams = planned
        .iter()
        .zip(statuses)
        .zip(patched.actions)
        .map(|((d, render), patch)| DiagramReport {
            index: d.block.index,
            hash: d.hash.clone(),
            base_name: d.base_name.clone(),
            image: d.link.clone(),
            render,
            patch,
        })
        .collect();

    Ok(Outcome::Processed(Report {
        readme: readme_label,
        out_dir: posix_path(&settings.out_dir),
        diagrams,
        readme_changed,
        dry_run: settings.dry_run,
    }))
}
