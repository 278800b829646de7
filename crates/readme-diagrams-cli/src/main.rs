use readme_diagrams::{ImageFormat, MermaidCli, Outcome, Report, Settings};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Run(readme_diagrams::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Run(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<readme_diagrams::Error> for CliError {
    fn from(value: readme_diagrams::Error) -> Self {
        Self::Run(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug)]
struct Args {
    root: PathBuf,
    settings: Settings,
    renderer: Option<PathBuf>,
    json: bool,
    pretty: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            settings: Settings::default(),
            renderer: None,
            json: false,
            pretty: false,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum OutcomeOut<'a> {
    NoDiagrams { readme: &'a str },
    Processed(&'a Report),
}

fn usage() -> &'static str {
    "readme-diagrams\n\
\n\
Render ```mermaid blocks in a readme to images and insert image fallbacks above them.\n\
\n\
USAGE:\n\
  readme-diagrams [--root <dir>] [--readme <path>] [--out-dir <dir>] [--tmp-dir <dir>]\n\
                  [--config <path> | --no-config] [--language <tag>]\n\
                  [--format png|svg|pdf] [--background <color>] [--renderer <program>]\n\
                  [--index-width <n>] [--skip-existing] [--dry-run] [--json] [--pretty]\n\
\n\
DEFAULTS:\n\
  --readme README.md  --out-dir docs/diagrams  --tmp-dir .mermaid-tmp\n\
  --config scripts/puppeteer-config.json  --language mermaid  --format png\n\
  --background transparent  --index-width 2\n\
\n\
NOTES:\n\
  - Paths are relative to --root (default: the current directory).\n\
  - Without --renderer, diagrams are rendered via `npx -y @mermaid-js/mermaid-cli`.\n\
  - --renderer takes any mmdc-compatible program (e.g. node_modules/.bin/mmdc).\n\
  - Set RUST_LOG=readme_diagrams=debug for per-block logging.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let mut value = || it.next().ok_or(CliError::Usage(usage()));
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--root" => args.root = PathBuf::from(value()?),
            "--readme" => args.settings.readme = PathBuf::from(value()?),
            "--out-dir" => args.settings.out_dir = PathBuf::from(value()?),
            "--tmp-dir" => args.settings.tmp_dir = PathBuf::from(value()?),
            "--config" => args.settings.renderer_config = Some(PathBuf::from(value()?)),
            "--no-config" => args.settings.renderer_config = None,
            "--language" => {
                let lang = value()?.trim();
                if lang.is_empty() {
                    return Err(CliError::Usage(usage()));
                }
                args.settings.language = lang.to_string();
            }
            "--format" => {
                args.settings.format = value()?
                    .parse::<ImageFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--background" => {
                let bg = value()?.trim();
                if bg.is_empty() {
                    return Err(CliError::Usage(usage()));
                }
                args.settings.background = bg.to_string();
            }
            "--renderer" => args.renderer = Some(PathBuf::from(value()?)),
            "--index-width" => {
                args.settings.index_width = value()?
                    .parse::<usize>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--skip-existing" => args.settings.skip_existing = true,
            "--dry-run" => args.settings.dry_run = true,
            "--json" => args.json = true,
            "--pretty" => {
                args.json = true;
                args.pretty = true;
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    Ok(args)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn print_summary(report: &Report, settings: &Settings) {
    let kind = settings.format.label();
    if report.dry_run {
        for d in &report.diagrams {
            println!("would render diagram {} -> {}", d.index, d.image);
        }
        if report.readme_changed {
            println!("{} would be patched with {kind} fallbacks", report.readme);
        } else {
            println!(
                "{} already contains {kind} fallbacks for detected blocks",
                report.readme
            );
        }
        return;
    }

    if report.readme_changed {
        println!("Patched {} with {kind} fallbacks", report.readme);
    } else {
        println!(
            "{} already contains {kind} fallbacks for detected blocks",
            report.readme
        );
    }
    println!(
        "Rendered {} diagram(s) into {}",
        report.rendered_count(),
        report.out_dir
    );
}

fn run(args: Args) -> Result<(), CliError> {
    let renderer = match &args.renderer {
        Some(program) => MermaidCli::program(program),
        None => MermaidCli::npx(),
    };

    let outcome = readme_diagrams::run(&args.root, &args.settings, &renderer)?;

    if args.json {
        let out = match &outcome {
            Outcome::NoDiagrams { readme } => OutcomeOut::NoDiagrams { readme },
            Outcome::Processed(report) => OutcomeOut::Processed(report),
        };
        return write_json(&out, args.pretty);
    }

    match &outcome {
        Outcome::NoDiagrams { readme } => {
            println!(
                "No {} blocks found in {readme}. Nothing to do.",
                args.settings.language
            );
        }
        Outcome::Processed(report) => print_summary(report, &args.settings),
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("readme_diagrams=warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
