//! The `ask` command: one-shot questions and the interactive session.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use docanalyzer_core::{
    AnswerService, AskOutcome, AskSession, AskStart, AskTicket, Document, SAMPLE_QUESTIONS,
};
use docanalyzer_provider::{AnalyzeApiClient, OpenRouterClient};
use docanalyzer_render::{Renderer, blocks_to_text};
use docanalyzer_shared::{ProviderSettings, load_config, validate_api_key};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};
use url::Url;

const NO_RESULT_TEXT: &str = "No result was returned. Please try asking a different question.";

/// How answers are printed.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Plain text for the terminal.
    Text,
    /// The HTML fragment a browser front end would insert.
    Html,
}

pub(crate) struct AskArgs {
    pub question: Option<String>,
    pub server: Option<Url>,
    pub format: OutputFormat,
    pub document: Option<PathBuf>,
}

/// Where answers come from.
enum Backend {
    /// Call the provider from this process.
    Direct(OpenRouterClient),
    /// Go through a running analyze server.
    Remote(AnalyzeApiClient),
}

impl AnswerService for Backend {
    async fn answer(&self, document: &str, question: &str) -> docanalyzer_shared::Result<String> {
        match self {
            Self::Direct(client) => client.complete(document, question).await,
            Self::Remote(client) => client.analyze(document, question).await,
        }
    }
}

type Fetched = (AskTicket, docanalyzer_shared::Result<String>);

pub(crate) async fn run(args: AskArgs) -> Result<()> {
    let mut config = load_config()?;
    if let Some(path) = args.document {
        config.document.path = Some(path);
    }

    let document = Document::load(&config.document)?;
    let renderer = Renderer::new(&config.render)?;

    let backend = match &args.server {
        Some(url) => {
            info!(server = %url, "using analyze server");
            Backend::Remote(AnalyzeApiClient::new(
                url,
                Duration::from_secs(config.provider.timeout_secs),
            )?)
        }
        None => {
            validate_api_key(&config)?;
            Backend::Direct(OpenRouterClient::new(ProviderSettings::from_config(&config)?)?)
        }
    };

    let session = AskSession::new(document, renderer, &config.cache);

    match args.question {
        Some(question) => ask_once(session, &backend, &question, args.format).await,
        None => interactive(session, Arc::new(backend), args.format).await,
    }
}

async fn ask_once(
    mut session: AskSession,
    backend: &Backend,
    question: &str,
    format: OutputFormat,
) -> Result<()> {
    let spinner = spinner();
    let outcome = session.ask(backend, question).await;
    spinner.finish_and_clear();

    match outcome {
        None => Err(eyre!("question must not be blank")),
        Some(AskOutcome::Failed { message }) => Err(eyre!(message)),
        Some(outcome) => {
            print_outcome(&outcome, format);
            Ok(())
        }
    }
}

/// Read questions from stdin. A new question supersedes the one in flight;
/// Ctrl-C cancels the pending request, or exits when idle. The answer still
/// pending at end of input is waited for and shown.
async fn interactive(
    mut session: AskSession,
    backend: Arc<Backend>,
    format: OutputFormat,
) -> Result<()> {
    print_intro();
    prompt();

    let stdin = BufReader::new(tokio::io::stdin());
    drive(&mut session, stdin, backend, |outcome| {
        print_outcome(outcome, format);
        prompt();
    })
    .await?;

    println!();
    Ok(())
}

/// Feed questions from `input` through `session`, passing every outcome that
/// should be displayed to `show`. Returns once input is exhausted and no
/// request is pending.
async fn drive<R, S>(
    session: &mut AskSession,
    input: R,
    service: Arc<S>,
    mut show: impl FnMut(&AskOutcome),
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    S: AnswerService + 'static,
{
    let mut lines = input.lines();
    let mut inflight: Option<JoinHandle<Fetched>> = None;
    let mut busy: Option<ProgressBar> = None;
    let mut input_done = false;

    while !input_done || inflight.is_some() {
        tokio::select! {
            line = lines.next_line(), if !input_done => match line? {
                None => input_done = true,
                Some(line) => match session.begin(expand_sample(&line)) {
                    AskStart::Ignored => prompt(),
                    AskStart::Cached(outcome) => {
                        clear(&mut busy);
                        show(&outcome);
                    }
                    AskStart::Fetch(ticket) => {
                        debug!(
                            request_id = %ticket.id(),
                            question = %ticket.question(),
                            "request started"
                        );
                        busy.get_or_insert_with(spinner);
                        let service = Arc::clone(&service);
                        // Replacing the handle detaches the superseded task; it
                        // resolves as cancelled on its own.
                        inflight = Some(tokio::spawn(async move {
                            let answer = ticket.fetch(service.as_ref()).await;
                            (ticket, answer)
                        }));
                    }
                },
            },
            joined = next_fetched(&mut inflight), if inflight.is_some() => {
                inflight = None;
                let (ticket, answer) = joined.map_err(|e| eyre!("request task failed: {e}"))?;
                if let Some(outcome) = session.finish(ticket, answer) {
                    clear(&mut busy);
                    show(&outcome);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if busy.is_none() {
                    break;
                }
                session.cancel_current();
                clear(&mut busy);
                println!("Cancelled.");
                prompt();
            }
        }
    }

    Ok(())
}

async fn next_fetched(inflight: &mut Option<JoinHandle<Fetched>>) -> Result<Fetched, JoinError> {
    match inflight {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// `1`..`4` pick a sample question.
fn expand_sample(line: &str) -> &str {
    line.trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| SAMPLE_QUESTIONS.get(i).copied())
        .unwrap_or(line)
}

fn print_intro() {
    println!("Ask a question about the document. Try one of these (type its number):");
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        println!("  {}. {question}", i + 1);
    }
    println!();
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message("Analyzing document...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn clear(busy: &mut Option<ProgressBar>) {
    if let Some(spinner) = busy.take() {
        spinner.finish_and_clear();
    }
}

fn print_outcome(outcome: &AskOutcome, format: OutputFormat) {
    match (outcome, format) {
        (AskOutcome::Answer(markup), OutputFormat::Text) => {
            println!("{}", blocks_to_text(&markup.blocks).trim_end());
        }
        (AskOutcome::Answer(markup), OutputFormat::Html) => println!("{}", markup.html),
        (AskOutcome::ContactForm, _) => print_contact_prompt(),
        (AskOutcome::NoAnswer, _) => println!("{NO_RESULT_TEXT}"),
        (AskOutcome::Failed { message }, OutputFormat::Text) => eprintln!("Error: {message}"),
        (failed @ AskOutcome::Failed { .. }, OutputFormat::Html) => {
            if let Some(html) = failed.html() {
                println!("{html}");
            }
        }
    }
}

fn print_contact_prompt() {
    println!("The document doesn't cover that. Send us a message instead:");
    println!();
    println!("  docanalyzer contact --name <NAME> --email <EMAIL> --message <MESSAGE>");
    println!();
}
