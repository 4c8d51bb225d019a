#![warn(missing_docs)]
//! # feedback-form binary
//!
//! Terminal front end for the feedback form.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedback_app::{
    APP_VERSION, AppConfig, CaptureOutcome, FormController, FormEvents, SubmitOutcome,
    build_controller, capture_backend,
};
use feedback_core::{FeedbackType, feedback_type_info};
use feedback_ui::{FormView, render_text};
use feedback_upload::is_https_endpoint;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "feedback-form", version = APP_VERSION, about = "Send feedback from the terminal")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for feedback crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one feedback and exit
    Send {
        /// Feedback type: bug, idea or other
        #[arg(long = "type")]
        kind: FeedbackType,

        /// Comment text
        #[arg(long, default_value = "")]
        comment: String,

        /// Image file to attach as the screenshot
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    /// Fill in the form line by line
    Interactive {
        /// Feedback type: bug, idea or other
        #[arg(long = "type")]
        kind: FeedbackType,

        /// Image file `:shot` attaches (default: capture the screen)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// List feedback types
    Types,
}

/// Records parent-side notifications for the terminal session.
#[derive(Default)]
struct TerminalEvents {
    sent: AtomicBool,
}

impl FormEvents for TerminalEvents {
    fn on_feedback_canceled(&self) {
        println!("Feedback canceled.");
    }

    fn on_feedback_sent(&self) {
        self.sent.store(true, Ordering::SeqCst);
        println!("Thanks! Your feedback was sent.");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    feedback_app::logging::init(&config.logging.level, cli.verbose)
        .context("failed to install logging")?;

    if !is_https_endpoint(&config.api.base_url) {
        tracing::warn!(url = %config.api.base_url, "feedback API is not using https");
    }

    match cli.command {
        Commands::Send {
            kind,
            comment,
            attach,
        } => send_once(&config, kind, comment, attach).await,
        Commands::Interactive { kind, source } => run_interactive(&config, kind, source).await,
        Commands::Types => {
            for kind in FeedbackType::ALL {
                let info = feedback_type_info(kind);
                println!("{:<6} {:<8} {}", kind.as_tag(), info.title, info.image);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn send_once(
    config: &AppConfig,
    kind: FeedbackType,
    comment: String,
    attach: Option<PathBuf>,
) -> Result<ExitCode> {
    let events = Arc::new(TerminalEvents::default());
    let has_attachment = attach.is_some();
    let controller = build_controller(
        config,
        kind,
        capture_backend(attach, config),
        events.clone(),
    )?;

    controller.set_comment(comment);
    if has_attachment && controller.capture_screenshot().await != CaptureOutcome::Stored {
        eprintln!("Screenshot could not be attached; sending without it.");
    }

    match controller.submit().await {
        SubmitOutcome::Sent => Ok(ExitCode::SUCCESS),
        SubmitOutcome::Failed | SubmitOutcome::AlreadySubmitting => {
            eprintln!("Feedback could not be sent. Run with -v for details.");
            Ok(ExitCode::FAILURE)
        }
    }
}

const HELP: &str = "Type text to add to the comment. Commands: \
:shot  :rm  :send  :cancel  :show  :clear  :help";

async fn run_interactive(
    config: &AppConfig,
    kind: FeedbackType,
    source: Option<PathBuf>,
) -> Result<ExitCode> {
    let events = Arc::new(TerminalEvents::default());
    let controller = build_controller(
        config,
        kind,
        capture_backend(source, config),
        events.clone(),
    )?;

    show(&controller);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match line.trim() {
            ":shot" => {
                if controller.capture_screenshot().await == CaptureOutcome::Failed {
                    println!("Screenshot failed.");
                }
                show(&controller);
            }
            ":rm" => {
                controller.remove_screenshot();
                show(&controller);
            }
            ":send" => {
                controller.submit().await;
                if events.sent.load(Ordering::SeqCst) {
                    return Ok(ExitCode::SUCCESS);
                }
                show(&controller);
            }
            ":cancel" => {
                controller.cancel();
                return Ok(ExitCode::SUCCESS);
            }
            ":show" => show(&controller),
            ":clear" => {
                controller.set_comment("");
                show(&controller);
            }
            ":help" => println!("{HELP}"),
            _ => {
                let mut comment = controller.snapshot().comment;
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(&line);
                controller.set_comment(comment);
            }
        }
    }

    // stdin closed without :send or :cancel
    controller.cancel();
    Ok(ExitCode::SUCCESS)
}

fn show(controller: &FormController) {
    for line in render_text(&FormView::project(&controller.snapshot())) {
        println!("{line}");
    }
}
