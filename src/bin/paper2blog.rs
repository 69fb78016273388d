//! CLI binary for paper2blog.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, feeds in a text file (or stdin), and prints or
//! writes the resulting artifact.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paper2blog::{
    publish, Document, PipelineConfig, PipelineError, RunProgressCallback, Stage,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar across the four stages with a per-stage
/// log line as each completes.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos}/{len} stages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Publishing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_stages: usize) {
        self.bar.set_length(total_stages as u64);
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(stage.to_string());
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.bar
            .println(format!("  {} {}", green("✓"), stage));
        self.bar.inc(1);
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 100 {
            format!("{}\u{2026}", &error[..99])
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {}  {}", red("✗"), stage, red(&msg)));
    }

    fn on_run_complete(&self) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Paste-ready Markdown on stdout
  paper2blog paper.txt

  # Read the paper text from stdin
  pdftotext paper.pdf - | paper2blog -

  # Write the artifact JSON and a Markdown rendering
  paper2blog paper.txt -o artifact.json --markdown post.md

  # Tune audience, tone, and SEO keywords
  paper2blog --audience "Developers" --tone "Conversational" \
             --keywords "rust, llm, pipelines" paper.txt

  # Use a specific Gemini model
  paper2blog --model gemini-2.5-pro paper.txt

STAGES:
  Analyzing    extract findings, methodology, topics
  Simplifying  rewrite for the target audience
  Visualizing  hero image, diagrams, infographic specs
  Optimizing   SEO metadata, social snippets, timestamps

A failed stage aborts the whole run; nothing partial is written. Rate
limits (HTTP 429) are reported as retryable — re-run the command.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY    Google Gemini API key (GOOGLE_API_KEY also accepted)
  PAPER2BLOG_MODEL  Override the model ID
  RUST_LOG          Log filter, e.g. RUST_LOG=paper2blog=debug
"#;

/// Turn research papers into SEO-ready blog posts using an LLM pipeline.
#[derive(Parser, Debug)]
#[command(
    name = "paper2blog",
    version,
    about = "Turn research papers into SEO-ready blog posts using an LLM pipeline",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Paper text file, or '-' to read from stdin
    input: String,

    /// Write the artifact JSON to this file (atomic write)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a Markdown rendering of the post to this file
    #[arg(long, value_name = "FILE")]
    markdown: Option<PathBuf>,

    /// Print the artifact JSON to stdout instead of Markdown
    #[arg(long)]
    json: bool,

    /// Target audience for the simplified content
    #[arg(short, long, default_value = "General public")]
    audience: String,

    /// Writing tone for the simplified content
    #[arg(short, long, default_value = "Engaging")]
    tone: String,

    /// Comma-separated SEO keyword hints (defaults to research, science, innovation)
    #[arg(short, long)]
    keywords: Option<String>,

    /// Gemini model ID
    #[arg(long, env = "PAPER2BLOG_MODEL")]
    model: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let text = read_input(&cli.input)?;
    let document = Document::from_text(text).map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut builder = PipelineConfig::builder()
        .target_audience(cli.audience.as_str())
        .tone(cli.tone.as_str())
        .api_timeout_secs(cli.timeout);
    if let Some(ref keywords) = cli.keywords {
        builder = builder.keywords(keywords.as_str());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if !cli.quiet {
        builder = builder.progress_callback(CliProgressCallback::new());
    }
    let config = builder.build().map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!(
        "{} {}",
        cyan("◆"),
        bold(&format!(
            "Publishing for \"{}\" in a {} tone…",
            cli.audience,
            cli.tone.to_lowercase()
        ))
    );

    let artifact = match publish(document, &config).await {
        Ok(artifact) => artifact,
        Err(e) => {
            report_failure(&e);
            std::process::exit(1);
        }
    };

    if let Some(ref path) = cli.output {
        let json = serde_json::to_string_pretty(&artifact)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing artifact to {}", path.display()))?;
        eprintln!("{} Artifact written to {}", green("✔"), path.display());
    }

    if let Some(ref path) = cli.markdown {
        std::fs::write(path, paper2blog::render_markdown(&artifact))
            .with_context(|| format!("writing markdown to {}", path.display()))?;
        eprintln!("{} Markdown written to {}", green("✔"), path.display());
    }

    if cli.output.is_none() && cli.markdown.is_none() {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        } else {
            println!("{}", paper2blog::render_markdown(&artifact));
        }
    }

    eprintln!(
        "{} {}  {}",
        green("✔"),
        bold(&artifact.seo.title),
        dim(&format!(
            "/{} · {} · keywords: {}",
            artifact.seo.slug,
            artifact.content.reading_time,
            artifact.seo.keywords.join(", ")
        ))
    );

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading paper text from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading paper text from '{input}'"))
    }
}

fn report_failure(error: &PipelineError) {
    match error.stage() {
        Some(stage) => eprintln!(
            "{} Run failed during {}: {}",
            red("✘"),
            bold(&stage.to_string()),
            error
        ),
        None => eprintln!("{} {}", red("✘"), error),
    }
    if error.is_retryable() {
        eprintln!(
            "  {}",
            dim("The backend was unavailable — re-running the same command may succeed.")
        );
    }
}
