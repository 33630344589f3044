use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};

mod terminal;

use anyhow::Context;
use clap::ArgAction;
use coherence::{
    AnalysisOptions, Config, Corpus, Issue, Report, Severity, analyze,
    report::{self, JsonReport},
};
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Root of the source tree to scan for test annotations
    #[arg(long, value_name = "PATH")]
    src_dir: PathBuf,

    /// Root of the documentation tree to scan for requirements
    #[arg(long, value_name = "PATH")]
    req_dir: PathBuf,

    /// Show the requirement and the test narrative after each alignment
    /// warning (-v). Repeat to increase log verbosity (-vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minimum number of terms a test narrative must share with a requirement
    /// it checks (overrides the configuration file)
    #[arg(long, value_name = "N")]
    min_matching_terms: Option<NonZeroUsize>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Summary lines followed by one line per issue
    #[default]
    Text,
    /// A single JSON document
    Json,
}

impl Cli {
    /// Runs the check, returning a failure exit code if any issue was found.
    pub fn run(self) -> anyhow::Result<ExitCode> {
        Self::setup_logging(self.verbose);
        self.execute()
    }

    fn execute(&self) -> anyhow::Result<ExitCode> {
        let config = self.config()?;
        let report = self.check(&config)?;

        Ok(if report.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(min_matching_terms) = self.min_matching_terms {
            config.set_min_matching_terms(min_matching_terms);
        }

        Ok(config)
    }

    const fn options(&self, config: &Config) -> AnalysisOptions {
        AnalysisOptions {
            verbose: self.verbose > 0,
            min_matching_terms: config.min_matching_terms(),
        }
    }

    #[instrument(level = "debug", skip(self, config))]
    fn check(&self, config: &Config) -> anyhow::Result<Report> {
        let corpus = Corpus::load(&self.src_dir, &self.req_dir, config);
        let report = analyze(corpus.tests(), corpus.requirements(), &self.options(config));

        match self.output {
            OutputFormat::Text => print_text(&corpus, &report),
            OutputFormat::Json => {
                let json = JsonReport::new(&corpus, &report);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }

        Ok(report)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        // A single -v only adds detail to the report.
        let level = match verbosity {
            0 | 1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            3 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn print_text(corpus: &Corpus, report: &Report) {
    for line in report::summary(corpus, report) {
        println!("{line}");
    }

    for issue in report.issues() {
        println!("{}", colorize(issue));
    }
}

fn colorize(issue: &Issue) -> String {
    let severity = issue.severity();
    match severity.label() {
        Some(label) => {
            let label = match severity {
                Severity::Error => label.error(),
                _ => label.warning(),
            };
            format!("{label}: {}", issue.message())
        }
        None => issue.message(),
    }
}
