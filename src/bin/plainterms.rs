//! CLI binary for plainterms.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SimplifyConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use plainterms::analysis::{analyze, analyze_with_summary, RiskReport, SafetyStatus};
use plainterms::audio::{pcm_sample_rate, wav_from_base64_pcm};
use plainterms::{
    extract_text, narrate_last_run, summarize_file, summarize_image, summarize_text,
    EmphasisStyle, PlainTermsError, PresentationCallback, RuleSet, SimplificationResult, SimplifiedSection,
    Simplifier, SimplifyConfig, SummaryOutput, UnavailableNarrator,
};
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Apply `paint` only when `color` is on.
fn tint(color: bool, paint: fn(&str) -> String, s: &str) -> String {
    if color {
        paint(s)
    } else {
        s.to_string()
    }
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI presentation using indicatif ─────────────────────────────────────────

/// Terminal presentation: a live progress bar plus one log line per section.
struct CliPresentation {
    bar: ProgressBar,
    started: Instant,
}

impl CliPresentation {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            started: Instant::now(),
        })
    }
}

impl PresentationCallback for CliPresentation {
    fn on_run_start(&self, total_sections: usize, language: &str) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} sections  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        self.bar.set_length(total_sections as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Simplifying");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Simplifying {total_sections} sections ({language})…"))
        ));
    }

    fn on_section_start(&self, index: usize, _total: usize) {
        self.bar.set_message(format!("section {index}"));
    }

    fn on_section_ready(&self, section: &SimplifiedSection, total: usize) {
        let mark = if section.has_emphasis() {
            yellow("!")
        } else {
            green("✓")
        };
        self.bar.println(format!(
            "  {} Section {:>3}/{:<3}  {}",
            mark,
            section.index,
            total,
            dim(&format!("{:>5} → {:>5} chars", section.original.len(), section.plain_text().len())),
        ));
        self.bar.inc(1);
    }

    fn on_summary_ready(&self, result: &SimplificationResult) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} sections simplified, {} highlighted  {}",
            green("✔"),
            bold(&result.stats.total_sections.to_string()),
            result.stats.emphasized_sections,
            dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64())),
        );
    }

    fn on_run_error(&self, error: &PlainTermsError) {
        self.bar.abandon();
        eprintln!("{} {}", red("✘"), error);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Simplify a document section by section
  plainterms simplify terms.txt

  # From stdin, HTML output, no pacing
  cat terms.txt | plainterms --pacing-ms 0 simplify --format html > out.html

  # Remote summary in Spanish
  plainterms --language Spanish summarize terms.txt

  # Summarize a screenshot
  plainterms summarize --image screenshot.png

  # Transcribe a photo of the terms, then simplify it offline
  plainterms simplify --image photo.jpg

  # Keep HTML highlight markers in a plain-text pipe
  plainterms simplify --emphasis html terms.txt | less

  # Risk report as JSON
  plainterms analyze --json terms.txt

  # Convert a base64 PCM16 payload to WAV
  plainterms wav --pcm-base64 speech.b64 --sample-rate 24000 -o speech.wav

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        Google Gemini API key
  OPENAI_API_KEY        OpenAI API key
  ANTHROPIC_API_KEY     Anthropic API key
  OLLAMA_HOST           Ollama server URL
  PLAINTERMS_PROVIDER   Override provider (gemini, openai, anthropic, ollama)
  PLAINTERMS_MODEL      Override model ID
  PLAINTERMS_LANGUAGE   Target language (default: English)
  RUST_LOG              Log filter, e.g. plainterms=debug
"#;

/// Turn Terms-of-Service documents into plain language.
#[derive(Parser, Debug)]
#[command(
    name = "plainterms",
    version,
    about = "Turn Terms-of-Service documents into plain language",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Target language for summaries and narration.
    #[arg(long, global = true, env = "PLAINTERMS_LANGUAGE", default_value = "English")]
    language: String,

    /// Summarizer provider: gemini, openai, anthropic, ollama.
    #[arg(long, global = true, env = "PLAINTERMS_PROVIDER")]
    provider: Option<String>,

    /// Summarizer model ID.
    #[arg(long, global = true, env = "PLAINTERMS_MODEL")]
    model: Option<String>,

    /// Path to a text file containing a custom system instruction.
    #[arg(long, global = true, env = "PLAINTERMS_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Path to a JSON rule set replacing the built-in rules.
    #[arg(long, global = true, env = "PLAINTERMS_RULES")]
    rules: Option<PathBuf>,

    /// Delay before each section, in milliseconds.
    #[arg(long, global = true, env = "PLAINTERMS_PACING_MS", default_value_t = 500)]
    pacing_ms: u64,

    /// Max summarizer output tokens.
    #[arg(long, global = true, env = "PLAINTERMS_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Summarizer temperature (0.0–2.0).
    #[arg(long, global = true, env = "PLAINTERMS_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries on transient summarizer failures.
    #[arg(long, global = true, env = "PLAINTERMS_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Summarizer call timeout in seconds.
    #[arg(long, global = true, env = "PLAINTERMS_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Disable progress display.
    #[arg(long, global = true, env = "PLAINTERMS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PLAINTERMS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PLAINTERMS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite a document section by section with the rule set (offline).
    Simplify {
        /// Text file to read; `-` or absent reads stdin.
        input: Option<PathBuf>,

        /// Transcribe this image with the summarizer, then simplify the text.
        #[arg(long, conflicts_with = "input")]
        image: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// How highlighted phrases are marked. Defaults to the format's
        /// natural markers: ANSI on a terminal, Markdown otherwise.
        #[arg(long, value_enum)]
        emphasis: Option<EmphasisArg>,

        /// Request narration of the result afterwards.
        #[arg(long)]
        narrate: bool,

        /// Where to write narrated audio.
        #[arg(long, requires = "narrate")]
        audio_out: Option<PathBuf>,
    },

    /// Summarize text or an image with a remote summarizer.
    Summarize {
        /// Text (or image) file to read; `-` or absent reads stdin.
        input: Option<PathBuf>,

        /// Summarize this image instead of text.
        #[arg(long, conflicts_with = "input")]
        image: Option<PathBuf>,

        /// Output structured JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a heuristic risk report.
    Analyze {
        /// Text file to read; `-` or absent reads stdin.
        input: Option<PathBuf>,

        /// Transcribe this image with the summarizer, then analyze the text.
        #[arg(long, conflicts_with = "input")]
        image: Option<PathBuf>,

        /// Also fetch a remote summary.
        #[arg(long)]
        with_summary: bool,

        /// Output structured JSON.
        #[arg(long)]
        json: bool,
    },

    /// Convert a base64 PCM16 payload into a WAV file.
    Wav {
        /// File holding the base64 payload.
        #[arg(long)]
        pcm_base64: PathBuf,

        /// Sample rate in Hz.
        #[arg(long, default_value_t = 24_000, conflicts_with = "mime_type")]
        sample_rate: u32,

        /// Read the sample rate from a MIME type such as `audio/L16;rate=24000`.
        #[arg(long)]
        mime_type: Option<String>,

        /// Output WAV path.
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Plain text, colour when stdout is a terminal.
    Text,
    Markdown,
    Html,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EmphasisArg {
    /// `**bold**`
    Markdown,
    /// `<span class="text-red-500">`
    Html,
    /// Bold red escape codes.
    Ansi,
    /// No markers; highlights are lost.
    Plain,
}

impl From<EmphasisArg> for EmphasisStyle {
    fn from(arg: EmphasisArg) -> Self {
        match arg {
            EmphasisArg::Markdown => EmphasisStyle::Markdown,
            EmphasisArg::Html => EmphasisStyle::Html,
            EmphasisArg::Ansi => EmphasisStyle::Ansi,
            EmphasisArg::Plain => EmphasisStyle::Plain,
        }
    }
}

/// Resolve the emphasis style for `simplify` output.
///
/// An explicit choice always wins. Text output to a pipe keeps Markdown
/// markers so highlighted phrases stay distinguishable.
fn pick_emphasis(format: OutputFormat, explicit: Option<EmphasisArg>, stdout_tty: bool) -> EmphasisStyle {
    if let Some(arg) = explicit {
        return arg.into();
    }
    match format {
        OutputFormat::Html => EmphasisStyle::Html,
        OutputFormat::Text if stdout_tty => EmphasisStyle::Ansi,
        OutputFormat::Text | OutputFormat::Markdown | OutputFormat::Json => EmphasisStyle::Markdown,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = &cli.common;

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress display is active.
    let show_progress = !common.quiet && !common.no_progress && io::stderr().is_terminal();
    let filter = if common.verbose {
        "debug"
    } else if common.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Simplify {
            input,
            image,
            format,
            emphasis,
            narrate,
            audio_out,
        } => {
            let emphasis = pick_emphasis(*format, *emphasis, io::stdout().is_terminal());
            let source = Source::new(input.as_deref(), image.as_deref());
            run_simplify(common, source, *format, emphasis, *narrate, audio_out.as_deref(), show_progress)
                .await
        }
        Command::Summarize { input, image, json } => {
            run_summarize(common, input.as_deref(), image.as_deref(), *json, show_progress).await
        }
        Command::Analyze {
            input,
            image,
            with_summary,
            json,
        } => {
            let source = Source::new(input.as_deref(), image.as_deref());
            run_analyze(common, source, *with_summary, *json, show_progress).await
        }
        Command::Wav {
            pcm_base64,
            sample_rate,
            mime_type,
            output,
        } => run_wav(common, pcm_base64, *sample_rate, mime_type.as_deref(), output).await,
    }
}

/// Where a document comes from: a text file / stdin, or an image to transcribe.
#[derive(Clone, Copy)]
enum Source<'a> {
    Text(Option<&'a Path>),
    Image(&'a Path),
}

impl<'a> Source<'a> {
    fn new(input: Option<&'a Path>, image: Option<&'a Path>) -> Self {
        match image {
            Some(path) => Source::Image(path),
            None => Source::Text(input),
        }
    }

    /// Read the document text, transcribing images with the configured summarizer.
    async fn load(self, config: &SimplifyConfig, show_progress: bool) -> Result<String> {
        match self {
            Source::Text(path) => read_text(path).await,
            Source::Image(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read image {}", path.display()))?;
                let bar = show_progress.then(|| spinner("Transcribing image…"));
                let outcome = extract_text(bytes, config).await;
                if let Some(bar) = bar {
                    bar.finish_and_clear();
                }
                outcome.context("Text extraction failed")
            }
        }
    }
}

async fn run_simplify(
    common: &CommonArgs,
    source: Source<'_>,
    format: OutputFormat,
    emphasis: EmphasisStyle,
    narrate: bool,
    audio_out: Option<&Path>,
    show_progress: bool,
) -> Result<()> {
    let mut config = build_config(common).await?;
    config.emphasis = emphasis;
    let text = source.load(&config, show_progress).await?;
    if show_progress && !matches!(format, OutputFormat::Json) {
        config.presentation = Some(CliPresentation::new());
    }
    let narration_delay = Duration::from_millis(config.narration_delay_ms);

    let simplifier = Arc::new(Simplifier::new(config));

    // Ctrl-C stops the run at its next section boundary.
    let canceller = Arc::clone(&simplifier);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let outcome = simplifier.run(&text).await;
    // A later Ctrl-C must not cancel a narration-only phase.
    ctrl_c.abort();
    let result = outcome.context("Simplification failed")?;

    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result).context("Failed to serialise output")? + "\n"
        }
        _ => simplifier.config().render_report(&result),
    };
    write_stdout(&rendered)?;

    if narrate {
        let narrator = UnavailableNarrator::new(narration_delay);
        let bar = (!common.quiet).then(|| spinner("Generating audio…"));
        let outcome = narrate_last_run(simplifier.last_run(), &narrator).await;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        match outcome {
            Ok(audio) => {
                let path = audio_out.unwrap_or_else(|| Path::new("narration.wav"));
                tokio::fs::write(path, &audio.bytes)
                    .await
                    .with_context(|| format!("Failed to write audio to {}", path.display()))?;
                if !common.quiet {
                    eprintln!("{} audio → {}", green("✔"), bold(&path.display().to_string()));
                }
            }
            // Narration is best-effort; the simplified text is already out.
            Err(e) => eprintln!("{} {}", yellow("⚠"), e),
        }
    }

    Ok(())
}

async fn run_summarize(
    common: &CommonArgs,
    input: Option<&Path>,
    image: Option<&Path>,
    json: bool,
    show_progress: bool,
) -> Result<()> {
    let config = build_config(common).await?;
    let bar = show_progress.then(|| spinner("Summarizing…"));

    let outcome = match (image, input) {
        (Some(path), _) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            summarize_image(bytes, &config).await
        }
        (None, Some(path)) if path != Path::new("-") => summarize_file(path, &config).await,
        (None, _) => summarize_text(read_text(None).await?, &config).await,
    };
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let output = outcome.context("Summarization failed")?;

    if json {
        write_stdout(&(serde_json::to_string_pretty(&output).context("Failed to serialise output")? + "\n"))?;
    } else {
        write_stdout(&format!("{}\n", output.summary))?;
        if !common.quiet {
            print_summary_stats(&output);
        }
    }
    Ok(())
}

async fn run_analyze(
    common: &CommonArgs,
    source: Source<'_>,
    with_summary: bool,
    json: bool,
    show_progress: bool,
) -> Result<()> {
    // Offline analysis of text needs no summarizer config.
    let (text, config) = match source {
        Source::Text(path) => {
            let text = read_text(path).await?;
            let config = if with_summary {
                Some(build_config(common).await?)
            } else {
                None
            };
            (text, config)
        }
        Source::Image(_) => {
            let config = build_config(common).await?;
            (source.load(&config, show_progress).await?, Some(config))
        }
    };

    let report = match config {
        Some(ref config) if with_summary => {
            let bar = show_progress.then(|| spinner("Analyzing…"));
            let outcome = analyze_with_summary(&text, config).await;
            if let Some(bar) = bar {
                bar.finish_and_clear();
            }
            outcome
        }
        _ => analyze(&text),
    }
    .context("Analysis failed")?;

    if json {
        write_stdout(&(serde_json::to_string_pretty(&report).context("Failed to serialise report")? + "\n"))
    } else {
        write_stdout(&format_report(&report, io::stdout().is_terminal()))
    }
}

async fn run_wav(
    common: &CommonArgs,
    payload: &Path,
    sample_rate: u32,
    mime_type: Option<&str>,
    output: &Path,
) -> Result<()> {
    let rate = match mime_type {
        Some(m) => pcm_sample_rate(m).with_context(|| format!("No rate= parameter in '{m}'"))?,
        None => sample_rate,
    };
    let b64 = tokio::fs::read_to_string(payload)
        .await
        .with_context(|| format!("Failed to read {}", payload.display()))?;
    let audio = wav_from_base64_pcm(&b64, rate).context("Payload is not valid base64")?;
    tokio::fs::write(output, &audio.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if !common.quiet {
        eprintln!(
            "{} {} bytes @ {} Hz → {}",
            green("✔"),
            audio.bytes.len(),
            rate,
            bold(&output.display().to_string())
        );
    }
    Ok(())
}

/// Map CLI args to `SimplifyConfig`.
async fn build_config(common: &CommonArgs) -> Result<SimplifyConfig> {
    let mut builder = SimplifyConfig::builder()
        .language(&common.language)
        .pacing_ms(common.pacing_ms)
        .max_tokens(common.max_tokens)
        .temperature(common.temperature)
        .max_retries(common.max_retries)
        .api_timeout_secs(common.api_timeout);

    if let Some(ref path) = common.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref path) = common.rules {
        builder = builder.rules(RuleSet::from_path(path).context("Failed to load rule set")?);
    }
    if let Some(ref p) = common.provider {
        builder = builder.provider_name(p);
    }
    if let Some(ref m) = common.model {
        builder = builder.model(m);
    }

    builder.build().context("Invalid configuration")
}

/// Read a text document from `path`, or stdin for `None` / `-`.
async fn read_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_stdout(s: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(s.as_bytes())
        .context("Failed to write to stdout")
}

fn print_summary_stats(output: &SummaryOutput) {
    let tokens = match (output.input_tokens, output.output_tokens) {
        (Some(i), Some(o)) => format!("{i} tokens in  /  {o} tokens out  —  "),
        _ => String::new(),
    };
    eprintln!(
        "   {}{}ms  {}",
        dim(&tokens),
        output.duration_ms,
        dim(&format!("{}/{}", output.provider, output.model)),
    );
}

/// Human-readable risk report; ANSI colour only when `color` is set.
fn format_report(report: &RiskReport, color: bool) -> String {
    let mut out = String::new();
    if let Some(ref summary) = report.summary {
        out.push_str(&format!("Summary\n  {summary}\n\n"));
    }

    let status = report.safety.status.to_string();
    let paint: fn(&str) -> String = match report.safety.status {
        SafetyStatus::Safe => green,
        SafetyStatus::PotentiallyUnsafe => yellow,
        SafetyStatus::Unsafe => red,
    };
    out.push_str(&format!(
        "Overall Safety Score: {}%  {}\n\n",
        report.safety.percentage,
        tint(color, paint, &status)
    ));

    out.push_str("Risk Scores\n");
    for risk in &report.risk_scores {
        out.push_str(&format!(
            "  {:<14} {}{}  {}\n",
            risk.name,
            "█".repeat(risk.score as usize),
            "░".repeat(5usize.saturating_sub(risk.score as usize)),
            tint(color, dim, &risk.description)
        ));
    }

    out.push_str("\nAggressive Language\n");
    if report.aggressive_language.is_empty() {
        out.push_str(&format!("  {}\n", tint(color, dim, "none found")));
    }
    for phrase in &report.aggressive_language {
        out.push_str(&format!("  {} {}\n", tint(color, red, "•"), phrase));
    }

    out.push_str("\nSuspicious Clauses\n");
    if report.suspicious_clauses.is_empty() {
        out.push_str(&format!("  {}\n", tint(color, dim, "none found")));
    }
    for clause in &report.suspicious_clauses {
        out.push_str(&format!(
            "  {} {}: {}\n",
            tint(color, yellow, "•"),
            tint(color, bold, &clause.name),
            clause.text
        ));
    }
    out
}
