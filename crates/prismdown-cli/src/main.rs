#![forbid(unsafe_code)]

//! Headless front end for the prismdown pipeline.
//!
//! `preview` and `export` are one-shot renders; `watch` drives the full
//! coordinator loop, keeping a rendered HTML file in sync with the markdown
//! file as either the buffer (stdin is not wired here, so in practice the
//! file) changes on disk.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use prismdown_core::{
    bridge::RenderSurface,
    config::Config,
    coordinator::{AlwaysDiscard, Coordinator},
    document,
    error::RenderError,
    markdown, template,
    watch::NotifyWatcher,
};

#[derive(Parser)]
#[command(name = "prismdown", about = "Live-preview markdown from the CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render markdown to an HTML fragment and print to stdout.
    Preview {
        /// Path to a markdown file. Use `-` to read from stdin.
        path: PathBuf,
    },
    /// Render a self-contained preview page once, with no further updates.
    Export {
        /// Path to a markdown file.
        path: PathBuf,
        /// Where to write the HTML page.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Keep a rendered preview page up to date while the file changes.
    Watch {
        /// Path to a markdown file.
        path: PathBuf,
        /// Where to write (and rewrite) the HTML page.
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Render surface that materializes every push as a rewritten HTML page.
struct PageFileSurface {
    template: String,
    output: PathBuf,
}

impl RenderSurface for PageFileSurface {
    fn invoke(&mut self, script: &str) -> Result<(), RenderError> {
        let mut page = String::with_capacity(self.template.len() + script.len() + 64);
        let tail = format!("<script>window.addEventListener(\"load\", () => {{ {script} }});</script>\n");
        match self.template.rfind("</body>") {
            Some(idx) => {
                page.push_str(&self.template[..idx]);
                page.push_str(&tail);
                page.push_str(&self.template[idx..]);
            }
            None => {
                page.push_str(&self.template);
                page.push_str(&tail);
            }
        }

        document::write_text(&self.output, &page)
            .map_err(|err| RenderError::new(format!("{}: {err}", self.output.display())))?;
        tracing::info!("preview updated: {}", self.output.display());
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Command::Preview { path } => {
            let source = read_source(&path)?;
            print!("{}", markdown::to_html(&source));
            Ok(())
        }
        Command::Export { path, output } => {
            let doc = document::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let page = template::standalone_page(
                &template::load(config.template_path.as_deref()),
                &doc.text,
            );
            fs::write(&output, page)
                .with_context(|| format!("failed to write {}", output.display()))?;
            Ok(())
        }
        Command::Watch { path, output } => watch_loop(&path, &output, &config),
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        use std::io::Read as _;

        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read markdown from stdin")?;
        return Ok(buf);
    }

    let doc =
        document::load(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(doc.text)
}

fn watch_loop(path: &Path, output: &Path, config: &Config) -> anyhow::Result<()> {
    let surface = PageFileSurface {
        template: template::load(config.template_path.as_deref()),
        output: output.to_owned(),
    };
    let mut coordinator = Coordinator::new(
        Box::new(NotifyWatcher::new()),
        Box::new(surface),
        config,
    );

    // A file surface needs no asynchronous load: it is ready immediately,
    // which flushes the queued welcome content and then the opened document.
    coordinator.surface_ready();
    coordinator.open(path, &mut AlwaysDiscard);
    if coordinator.source_path().is_none() {
        // The load failure is already the buffer content; fail fast instead
        // of watching nothing.
        anyhow::bail!("{}", coordinator.buffer());
    }

    tracing::info!(
        "watching {} -> {} (ctrl-c to stop)",
        path.display(),
        output.display()
    );

    loop {
        let now = Instant::now();
        coordinator.poll(now);
        let sleep = coordinator
            .next_deadline()
            .map_or(Duration::from_millis(100), |deadline| {
                deadline.saturating_duration_since(now).min(Duration::from_millis(100))
            });
        std::thread::sleep(sleep);
    }
}
