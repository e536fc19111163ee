//! CLI binary for note2post.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints a success or failure banner.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use note2post::templates::CHECKLIST;
use note2post::{convert_note, ConversionConfig, PostFile};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a note dated today into ./_posts, images into ./img
  note2post notes/attention.md "Attention Is All You Need"

  # Explicit date and site root
  note2post --date 2025-04-28 --root ~/blog notes/paper.md "Paper Title"

  # Keep relative links untouched, do not copy images
  note2post --image-base-url "" --no-copy-images notes/paper.md "Paper Title"

  # No network: trust the arXiv id written in the note
  note2post --offline notes/paper.md "Paper Title"

IMAGE GROUPING:
  If the note mentions an arXiv id (arXiv:2504.18829, "ArXiv id: arXiv:…",
  or https://arxiv.org/abs/…), and the abstract page exists, images are
  copied to <images-output-dir>/arxiv-<id>/ and linked as
  <image-base-url>/arxiv-<id>/<file>.

ENVIRONMENT VARIABLES:
  NOTE2POST_ROOT            Site root (default: current directory)
  NOTE2POST_OUTPUT_DIR      Posts directory (default: <root>/_posts)
  NOTE2POST_IMAGE_BASE_URL  Image link prefix (default: /img)
  NOTE2POST_IMAGES_DIR      Image copy directory (default: <root>/img)
  RUST_LOG                  Log filter, overrides --verbose/--quiet
"#;

/// Convert a raw Markdown paper note into a Jekyll blog post.
#[derive(Parser, Debug)]
#[command(
    name = "note2post",
    version,
    about = "Convert a raw Markdown paper note into a Jekyll blog post",
    long_about = "Convert a raw Markdown paper note into a Jekyll blog post: prepend front matter, \
rewrite and renumber image references, and copy local images into a directory grouped by the \
paper's arXiv id.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path of the Markdown note.
    input_file: PathBuf,

    /// Post title.
    title: String,

    /// Publication date (YYYY-MM-DD). Default: today.
    #[arg(long, env = "NOTE2POST_DATE")]
    date: Option<String>,

    /// Site root; default base for --output-dir and --images-output-dir.
    #[arg(long, env = "NOTE2POST_ROOT", default_value = ".")]
    root: PathBuf,

    /// Directory the post is written to. Default: <root>/_posts.
    #[arg(long, env = "NOTE2POST_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Prefix for rewritten relative image links; empty disables rewriting.
    #[arg(long, env = "NOTE2POST_IMAGE_BASE_URL", default_value = "/img")]
    image_base_url: String,

    /// Directory relative images are copied into. Default: <root>/img.
    #[arg(long, env = "NOTE2POST_IMAGES_DIR")]
    images_output_dir: Option<PathBuf>,

    /// Do not copy images.
    #[arg(long, env = "NOTE2POST_NO_COPY_IMAGES")]
    no_copy_images: bool,

    /// Skip the arXiv existence check and trust the id in the note.
    #[arg(long, env = "NOTE2POST_OFFLINE")]
    offline: bool,

    /// arXiv existence-check timeout in seconds.
    #[arg(long, env = "NOTE2POST_LOOKUP_TIMEOUT", default_value_t = 5)]
    lookup_timeout: u64,

    /// Print the conversion report as JSON instead of the banner.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "NOTE2POST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NOTE2POST_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors and the final banner.
    #[arg(short, long, env = "NOTE2POST_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose;
    let spinner = show_progress.then(spinner);

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let log_bar = spinner.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(move || LogWriter {
            bar: log_bar.clone(),
        })
        .init();

    let result = run(&cli).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    match result {
        Ok(post) => {
            if cli.json {
                match serde_json::to_string_pretty(&post) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        print_failure(&anyhow::Error::new(e).context("Failed to serialise report"));
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_success(&post, cli.quiet);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<PostFile> {
    let config = build_config(cli)?;
    convert_note(&cli.input_file, &cli.title, &config)
        .await
        .context("Conversion failed")
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .project_root(&cli.root)
        .image_base_url(&cli.image_base_url)
        .copy_images(!cli.no_copy_images)
        .verify_arxiv(!cli.offline)
        .lookup_timeout_secs(cli.lookup_timeout);

    if let Some(ref date) = cli.date {
        builder = builder.date(date);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref dir) = cli.images_output_dir {
        builder = builder.images_output_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

/// Stderr writer that hides the spinner while a log line is printed.
struct LogWriter {
    bar: Option<ProgressBar>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.bar {
            Some(bar) => bar.suspend(|| io::stderr().write(buf)),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message("checking arXiv, rewriting images…");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_success(post: &PostFile, quiet: bool) {
    let out = &post.output;
    println!();
    println!("{} {}", green("✔"), bold("Note converted"));
    println!("  {}", bold(&post.path.display().to_string()));
    if quiet {
        return;
    }

    println!(
        "  {}",
        dim(&format!(
            "{} images, {} rewritten, {} copied",
            out.stats.figures, out.stats.rewritten, out.stats.copied
        ))
    );
    if let Some(w) = out.key_resolution.warning() {
        println!("  {} {}", yellow("⚠"), w);
    }
    for e in &out.asset_errors {
        println!("  {} {}", yellow("⚠"), dim(&e.to_string()));
    }

    println!();
    println!("{}", bold("Next steps:"));
    for (i, item) in CHECKLIST.iter().enumerate() {
        println!("  {}. {}", i + 1, item);
    }
    if let Some(ref key) = out.image_key {
        println!("  {}. Images are grouped under {}", CHECKLIST.len() + 1, bold(key));
    }
}

fn print_failure(e: &anyhow::Error) {
    println!();
    println!("{} {}", red("✘"), bold("Conversion failed"));
    for cause in e.chain() {
        println!("  {}", red(&cause.to_string()));
    }
}
