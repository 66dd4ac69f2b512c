use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use review_client::{
    load_settings, ClientSettings, HttpReviewApi, Locale, NavigationTarget, ReviewSession,
    SessionContext,
};
use shared::domain::InstanceIndex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

use commands::ReviewCommand;

#[derive(Parser, Debug)]
#[command(about = "Compare paired model completions and record judgments")]
struct Args {
    /// TOML settings file (defaults to ./reviewer.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    evaluator: Option<String>,
    /// Instance to open first
    #[arg(long)]
    index: Option<u64>,
    #[arg(long)]
    locale: Option<Locale>,
    /// Cookie header value of an existing login session
    #[arg(long)]
    session_cookie: Option<String>,
}

impl Args {
    fn apply(self, settings: &mut ClientSettings) {
        if let Some(v) = self.server_url {
            settings.server_url = v;
        }
        if let Some(v) = self.evaluator {
            settings.evaluator = v;
        }
        if let Some(v) = self.index {
            settings.start_index = v;
        }
        if let Some(v) = self.locale {
            settings.locale = v;
        }
        if let Some(v) = self.session_cookie {
            settings.session_cookie = Some(v);
        }
    }
}

enum PageExit {
    Navigate(InstanceIndex),
    Quit,
}

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    let api = Arc::new(HttpReviewApi::from_settings(&settings)?);
    info!(server_url = %api.base_url(), evaluator = %settings.evaluator, "review: connecting");
    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut index = InstanceIndex(settings.start_index);
    loop {
        // Every explicit navigation starts a fresh page with its own session.
        let session = ReviewSession::new(
            api.clone(),
            SessionContext {
                start_index: index,
                evaluator: settings.evaluator.clone(),
            },
            settings.session_options(),
        );
        // Load failures are shown as notices on the page.
        let _ = session.start().await;

        match run_page(&session, &api, &mut lines).await? {
            PageExit::Navigate(next) => index = next,
            PageExit::Quit => break,
        }
    }
    Ok(())
}

async fn run_page(
    session: &ReviewSession,
    api: &HttpReviewApi,
    lines: &mut InputLines,
) -> Result<PageExit> {
    repaint(session).await;
    while let Some(line) = lines.next_line().await.context("failed to read from stdin")? {
        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match command {
            ReviewCommand::Accept(panel, value) => {
                session
                    .edit_form(|form| form.set_acceptability(panel, value))
                    .await;
            }
            ReviewCommand::Prefer(preference) => {
                session
                    .edit_form(|form| form.preference = Some(preference))
                    .await;
            }
            ReviewCommand::Quality(quality) => {
                session
                    .edit_form(|form| form.instance_quality = quality)
                    .await;
            }
            ReviewCommand::Comment(text) => {
                session.edit_form(|form| form.comment = text).await;
            }
            ReviewCommand::SubmitEvaluation => {
                let _ = session.submit_evaluation().await;
            }
            ReviewCommand::SubmitFeedback => {
                let _ = session.submit_feedback().await;
            }
            ReviewCommand::Navigate(intent) => {
                if let Some(target) = session.navigate(intent).await {
                    match target {
                        NavigationTarget::Instance(index) => return Ok(PageExit::Navigate(index)),
                        NavigationTarget::LeftInstances => open_side_view(api, &target)?,
                        NavigationTarget::Logout => {
                            let status = api
                                .follow(&target)
                                .await
                                .context("failed to reach logout endpoint")?;
                            info!(status = status.as_u16(), "review: logged out");
                            return Ok(PageExit::Quit);
                        }
                    }
                }
            }
            ReviewCommand::Show => {}
            ReviewCommand::Help => {
                println!("{}", commands::HELP);
                continue;
            }
            ReviewCommand::Quit => return Ok(PageExit::Quit),
        }
        repaint(session).await;
    }
    Ok(PageExit::Quit)
}

async fn repaint(session: &ReviewSession) {
    session.expire_notices(Instant::now()).await;
    let view = session.view().await;
    println!("{}", terminal::paint(&view, session.options().locale));
}

fn open_side_view(api: &HttpReviewApi, target: &NavigationTarget) -> Result<()> {
    let url = target.url(api.base_url())?;
    if let Err(err) = open::that(url.as_str()) {
        warn!(%url, error = %err, "review: could not launch a browser");
        println!("open {url} in a browser");
    }
    Ok(())
}
