use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_README: &str = "README.md";
pub const DEFAULT_OUT_DIR: &str = "docs/diagrams";
pub const DEFAULT_TMP_DIR: &str = ".mermaid-tmp";
pub const DEFAULT_RENDERER_CONFIG: &str = "scripts/puppeteer-config.json";
pub const DEFAULT_LANGUAGE: &str = "mermaid";
pub const DEFAULT_NAME_PREFIX: &str = "readme-diagram";
pub const DEFAULT_BACKGROUND: &str = "transparent";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
    Pdf,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
            Self::Pdf => "PDF",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

/// Run settings. Relative paths are resolved against the run root; links written into the
/// readme use `out_dir` exactly as given.
#[derive(Debug, Clone)]
pub struct Settings {
    pub readme: PathBuf,
    pub out_dir: PathBuf,
    pub tmp_dir: PathBuf,
    /// Puppeteer config handed to the renderer. `None` skips both the existence check and the
    /// `-p` flag.
    pub renderer_config: Option<PathBuf>,
    pub language: String,
    pub name_prefix: String,
    /// Zero-pad sequence numbers in file names to this many digits (0 disables padding).
    pub index_width: usize,
    pub format: ImageFormat,
    pub background: String,
    /// Reuse an image that already exists under its content-addressed name.
    pub skip_existing: bool,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            readme: PathBuf::from(DEFAULT_README),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            renderer_config: Some(PathBuf::from(DEFAULT_RENDERER_CONFIG)),
            language: DEFAULT_LANGUAGE.to_string(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            index_width: 2,
            format: ImageFormat::Png,
            background: DEFAULT_BACKGROUND.to_string(),
            skip_existing: false,
            dry_run: false,
        }
    }
}

/// Checks that the renderer config exists and holds a JSON object.
pub fn check_renderer_config(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::MissingRendererConfig {
            path: path.display().to_string(),
        });
    }
    let raw = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|err| Error::InvalidRendererConfig {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
    if !value.is_object() {
        return Err(Error::InvalidRendererConfig {
            path: path.display().to_string(),
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(())
}

/// Renders a relative path with `/` separators, as markdown links expect.
pub fn posix_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    let s = s.strip_prefix("./").unwrap_or(&s);
    s.trim_end_matches('/').to_string()
}
