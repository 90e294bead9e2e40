/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`: Interactive console
- `ask`: Send a single query
- `ingest`: Upload a single document
- `health`: Probe the backend

The handlers are thin: all conversation state lives in
[`crate::session::Session`], and rendering lives in [`view`].
*/

use crate::backend::{create_backend, RagBackend};
use crate::config::Config;
use crate::error::{RagConsoleError, Result};
use crate::session::{AutoScroll, Session};
use std::sync::Arc;

// Special commands parser for the console
pub mod special_commands;

// Terminal rendering
pub mod view;

use view::{ConsoleWriter, TerminalViewport};

/// Session whose transcript is written to `out` as it grows
fn terminal_session(out: ConsoleWriter) -> Session {
    let mut session = Session::new();
    session.subscribe(Box::new(AutoScroll::new(TerminalViewport::new(out))));
    session
}

/// Line reporting a healthy backend, for `/health` and `ragconsole health`
async fn health_line(backend: &dyn RagBackend, base_url: &str) -> Result<String> {
    use colored::Colorize;

    let health = backend.health().await?;
    if health.is_healthy() {
        Ok(format!("{} backend at {} is healthy", "✓".green(), base_url))
    } else {
        Err(RagConsoleError::Backend(format!(
            "backend at {} reported status '{}'",
            base_url, health.status
        ))
        .into())
    }
}

// Interactive console handler
pub mod chat {
    //! Interactive console handler.
    //!
    //! The line editor blocks, so it runs on its own thread and hands lines
    //! to the console task over a channel. The console task owns the
    //! [`Session`] and multiplexes two event sources: new input lines and
    //! settling requests. Requests run on their own tasks, so the prompt
    //! comes back immediately after a query or upload is dispatched.
    //!
    //! Anything printed while a prompt may be active goes through the
    //! editor's external printer, handed back by the reader thread at
    //! startup. The prompt's busy flags are computed when it is shown.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::commands::view::{
        indicator_text, print_status_display, print_welcome_banner, prompt_for,
    };
    use crate::session::{Settlement, UiState};
    use colored::Colorize;
    use futures::future::BoxFuture;
    use futures::stream::FuturesUnordered;
    use futures::StreamExt;
    use rustyline::error::ReadlineError;
    use rustyline::{DefaultEditor, ExternalPrinter};
    use std::sync::mpsc as std_mpsc;
    use tokio::sync::{mpsc, oneshot};

    type BoxedPrinter = Box<dyn ExternalPrinter + Send>;

    /// What the line-editor thread reports
    #[derive(Debug)]
    enum InputEvent {
        Line(String),
        Interrupted,
        Eof,
        Failed(ReadlineError),
    }

    /// Handles on the line-editor thread
    struct LineReader {
        /// Next prompt to show; dropping it stops the thread
        ready: std_mpsc::Sender<String>,
        lines: mpsc::UnboundedReceiver<InputEvent>,
        /// The editor's external printer, when the terminal supports one
        printer: oneshot::Receiver<Option<BoxedPrinter>>,
    }

    /// Console state driven by the event loop
    ///
    /// Kept separate from the terminal so it can be driven directly in
    /// tests.
    pub struct Console {
        session: Session,
        backend: Arc<dyn RagBackend>,
        base_url: String,
        out: ConsoleWriter,
        in_flight: FuturesUnordered<BoxFuture<'static, Settlement>>,
        shown: UiState,
    }

    impl Console {
        /// Creates a console over `session`
        ///
        /// Notices and indicator lines are written to `out`; the session's
        /// own viewport should share it.
        pub fn new(
            session: Session,
            backend: Arc<dyn RagBackend>,
            base_url: String,
            out: ConsoleWriter,
        ) -> Self {
            let shown = session.ui_state();
            Self {
                session,
                backend,
                base_url,
                out,
                in_flight: FuturesUnordered::new(),
                shown,
            }
        }

        /// The console's session
        pub fn session(&self) -> &Session {
            &self.session
        }

        /// Handles one input line
        ///
        /// Returns `false` when the user asked to leave.
        pub fn handle_line(&mut self, line: &str) -> bool {
            if line.trim().is_empty() {
                return true;
            }

            match parse_special_command(line) {
                Ok(SpecialCommand::Exit) => return false,
                Ok(SpecialCommand::Help) => print_help(),
                Ok(SpecialCommand::ShowStatus) => {
                    print_status_display(&self.session, &self.base_url)
                }
                Ok(SpecialCommand::Health) => {
                    let backend = self.backend.clone();
                    let base_url = self.base_url.clone();
                    let out = self.out.clone();
                    tokio::spawn(async move {
                        match health_line(backend.as_ref(), &base_url).await {
                            Ok(line) => out.line(line),
                            Err(e) => out.line(format!("Health check failed: {}", e).red()),
                        }
                    });
                }
                Ok(SpecialCommand::Upload(path)) => self.upload(path.as_deref()),
                Ok(SpecialCommand::None) => {
                    self.session.set_draft(line);
                    if let Some(request) = self.session.submit_draft() {
                        self.in_flight.push(request.spawn(self.backend.clone()));
                    }
                }
                Err(e) => self.out.line(e.to_string().red()),
            }

            self.show_indicator_changes();
            true
        }

        fn upload(&mut self, path: Option<&std::path::Path>) {
            if !self.session.ui_state().upload_enabled() {
                self.out.line("An upload is already in progress.".yellow());
                return;
            }
            if path.is_none() {
                self.out.line("Usage: /upload <path>");
            }
            if let Some(request) = self.session.dispatch_upload(path) {
                self.in_flight.push(request.spawn(self.backend.clone()));
            }
        }

        /// Whether any request is still in flight
        pub fn has_pending(&self) -> bool {
            !self.in_flight.is_empty()
        }

        /// Waits for the next request to settle and folds it in
        ///
        /// Returns `false` when nothing was in flight.
        pub async fn settle_next(&mut self) -> bool {
            match self.in_flight.next().await {
                Some(settlement) => {
                    self.session.settle(settlement);
                    self.show_indicator_changes();
                    true
                }
                None => false,
            }
        }

        /// Settles every in-flight request
        pub async fn drain(&mut self) {
            while self.settle_next().await {}
        }

        fn show_indicator_changes(&mut self) {
            let current = self.session.ui_state();
            for change in current.changes_since(&self.shown) {
                if let Some(text) = indicator_text(change) {
                    self.out.line(text);
                }
            }
            self.shown = current;
        }
    }

    /// Start the interactive console
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `show_banner` - Print the welcome banner before the first prompt
    pub async fn run_chat(config: Config, show_banner: bool) -> Result<()> {
        tracing::info!("Starting interactive console");

        let backend = create_backend(&config.backend)?;
        let base_url = config.backend.base_url;

        // Nothing else writes to the terminal until the first prompt.
        if show_banner {
            print_welcome_banner(&base_url);
        }

        let mut reader = spawn_line_reader(config.console.history_size);
        let out = match reader.printer.await {
            Ok(Some(printer)) => ConsoleWriter::line_editor(printer),
            _ => {
                tracing::debug!("No external printer; console output goes to stdout");
                ConsoleWriter::stdout()
            }
        };
        let mut console = Console::new(terminal_session(out.clone()), backend, base_url, out);

        if reader.ready.send(prompt_for(console.session())).is_err() {
            return Ok(());
        }

        loop {
            tokio::select! {
                true = console.settle_next(), if console.has_pending() => {}
                event = reader.lines.recv() => {
                    match event {
                        Some(InputEvent::Line(line)) => {
                            if !console.handle_line(&line) {
                                break;
                            }
                            if reader.ready.send(prompt_for(console.session())).is_err() {
                                break;
                            }
                        }
                        Some(InputEvent::Interrupted) => {
                            println!("CTRL-C");
                            break;
                        }
                        Some(InputEvent::Eof) => {
                            println!("CTRL-D");
                            break;
                        }
                        Some(InputEvent::Failed(e)) => {
                            return Err(RagConsoleError::Readline(e).into());
                        }
                        None => break,
                    }
                }
            }
        }

        if console.has_pending() {
            tracing::debug!(
                "Leaving with {} request(s) unsettled",
                console.session().pending_requests()
            );
        }
        println!("Goodbye!");
        Ok(())
    }

    /// Runs the line editor on its own thread
    ///
    /// The thread first hands back the editor's external printer, then
    /// reads one line per prompt received on `ready` and stops when that
    /// sender is dropped.
    fn spawn_line_reader(history_size: usize) -> LineReader {
        let (ready_tx, ready_rx) = std_mpsc::channel::<String>();
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let (printer_tx, printer_rx) = oneshot::channel();

        std::thread::spawn(move || {
            if let Err(e) = read_lines(history_size, printer_tx, &ready_rx, &line_tx) {
                let _ = line_tx.send(InputEvent::Failed(e));
            }
        });

        LineReader {
            ready: ready_tx,
            lines: line_rx,
            printer: printer_rx,
        }
    }

    fn read_lines(
        history_size: usize,
        printer_tx: oneshot::Sender<Option<BoxedPrinter>>,
        ready_rx: &std_mpsc::Receiver<String>,
        line_tx: &mpsc::UnboundedSender<InputEvent>,
    ) -> rustyline::Result<()> {
        let config = rustyline::Config::builder()
            .max_history_size(history_size)?
            .build();
        let mut rl = DefaultEditor::with_config(config)?;

        let printer = match rl.create_external_printer() {
            Ok(printer) => Some(Box::new(printer) as BoxedPrinter),
            Err(e) => {
                tracing::debug!("External printer unavailable: {}", e);
                None
            }
        };
        if printer_tx.send(printer).is_err() {
            return Ok(());
        }

        while let Ok(prompt) = ready_rx.recv() {
            let event = match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    InputEvent::Line(line)
                }
                Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
                Err(ReadlineError::Eof) => InputEvent::Eof,
                Err(e) => return Err(e),
            };
            let last = !matches!(event, InputEvent::Line(_));
            if line_tx.send(event).is_err() || last {
                break;
            }
        }
        Ok(())
    }

}

// One-shot query handler
pub mod ask {
    //! Sends one query, prints the exchange, and exits.

    use super::*;

    /// Send `query` and print the reply
    ///
    /// Blank queries are ignored, as in the console.
    ///
    /// # Errors
    ///
    /// Returns error if the backend client cannot be created or the query
    /// failed (the failure notice has already been printed)
    pub async fn run_ask(config: Config, query: String) -> Result<()> {
        let backend = create_backend(&config.backend)?;
        let mut session = terminal_session(ConsoleWriter::stdout());

        match session.send_query(backend.as_ref(), &query).await {
            Some(settled) if !settled.succeeded() => {
                Err(RagConsoleError::Backend("query failed".to_string()).into())
            }
            Some(_) => Ok(()),
            None => {
                tracing::warn!("Query is empty; nothing sent");
                Ok(())
            }
        }
    }
}

// One-shot ingest handler
pub mod ingest {
    //! Uploads one document, prints the outcome, and exits.

    use super::*;
    use std::path::PathBuf;

    /// Upload `file` for indexing
    ///
    /// # Errors
    ///
    /// Returns error if the backend client cannot be created or the upload
    /// failed (the failure notice has already been printed)
    pub async fn run_ingest(config: Config, file: PathBuf) -> Result<()> {
        let backend = create_backend(&config.backend)?;
        let mut session = terminal_session(ConsoleWriter::stdout());

        match session
            .upload_document(backend.as_ref(), Some(file.as_path()))
            .await
        {
            Some(settled) if settled.succeeded() => Ok(()),
            _ => Err(
                RagConsoleError::Ingest(format!("upload of {} failed", file.display())).into(),
            ),
        }
    }
}

// Backend health handler
pub mod health {
    //! Probes `GET /health`.

    use super::*;

    /// Check that the configured backend is up
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or not healthy
    pub async fn run_health(config: Config) -> Result<()> {
        let backend = create_backend(&config.backend)?;
        println!("{}", health_line(backend.as_ref(), &config.backend.base_url).await?);
        Ok(())
    }
}
