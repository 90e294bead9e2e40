//! Terminal rendering for the console
//!
//! The terminal has no scrollback control, so "scrolling to the newest
//! entry" means printing every entry up to it that has not been printed yet.
//! [`TerminalViewport`] remembers how far it has printed; the auto-scroll
//! controller decides when.
//!
//! While the line editor owns the terminal, output must not be written to
//! stdout directly: it would land on top of the prompt and the partly typed
//! input. [`ConsoleWriter::line_editor`] routes it through the editor's
//! external printer instead, which prints above the prompt and redraws it.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use colored::Colorize;
use rustyline::ExternalPrinter;

use crate::conversation::{Role, Transcript};
use crate::session::{IndicatorChange, Session, Viewport};

/// Longest quoted query shown next to an out-of-order reply
const REPLY_EXCERPT_CHARS: usize = 60;

/// Viewport that prints transcript entries to a writer
#[derive(Debug)]
pub struct TerminalViewport<W> {
    out: W,
    rendered: usize,
}

impl<W: Write + Send> TerminalViewport<W> {
    /// Viewport over `out` with nothing printed yet
    pub fn new(out: W) -> Self {
        Self { out, rendered: 0 }
    }
}

impl<W: Write + Send> Viewport for TerminalViewport<W> {
    fn scroll_to(&mut self, transcript: &Transcript, index: usize) {
        while self.rendered <= index {
            let Some(text) = render_entry(transcript, self.rendered) else {
                break;
            };
            if let Err(e) = writeln!(self.out, "{}\n", text) {
                tracing::debug!("Failed to render transcript entry: {}", e);
            }
            self.rendered += 1;
        }
        if let Err(e) = self.out.flush() {
            tracing::debug!("Failed to flush transcript output: {}", e);
        }
    }
}

/// Cloneable handle on console output
///
/// Shared by the transcript viewport, the indicator lines and background
/// tasks such as `/health`. Each flush is one message to the sink.
#[derive(Clone)]
pub struct ConsoleWriter {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ConsoleWriter {
    /// Writer over an arbitrary sink
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Writer over standard output, for use while no prompt is active
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Writer that prints above the line editor's prompt
    pub fn line_editor(printer: Box<dyn ExternalPrinter + Send>) -> Self {
        Self::new(PrinterSink {
            printer,
            pending: Vec::new(),
        })
    }

    /// Writes `text` as one line
    pub fn line(&self, text: impl fmt::Display) {
        let mut sink = self.lock();
        if let Err(e) = writeln!(sink, "{}", text).and_then(|()| sink.flush()) {
            tracing::debug!("Failed to write console line: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ConsoleWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleWriter").finish_non_exhaustive()
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// Buffers writes and hands each flushed chunk to the external printer
struct PrinterSink {
    printer: Box<dyn ExternalPrinter + Send>,
    pending: Vec<u8>,
}

impl Write for PrinterSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        self.printer
            .print(text)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

/// Renders the entry at `index` for the terminal
///
/// Replies that do not directly follow the query they answer carry a
/// short quote of that query.
pub fn render_entry(transcript: &Transcript, index: usize) -> Option<String> {
    let entry = transcript.get(index)?;
    let label = match entry.role() {
        Role::User => "you".cyan().bold(),
        Role::Assistant => "agent".green().bold(),
        Role::System => "system".magenta().bold(),
    };
    let body = match entry.role() {
        Role::System => entry.content().magenta().to_string(),
        _ => entry.content().to_string(),
    };

    let mut text = format!("{} ▸ {}", label, body);
    if let Some(reply_to) = entry.reply_to() {
        if reply_to + 1 != index {
            let question = transcript.get(reply_to).map(|e| e.content()).unwrap_or("");
            let note = format!("↳ in reply to: \"{}\"", excerpt(question, REPLY_EXCERPT_CHARS));
            text.push_str(&format!("\n  {}", note.dimmed()));
        }
    }
    Some(text)
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Console line for an indicator change, if it is shown at all
pub fn indicator_text(change: IndicatorChange) -> Option<String> {
    match change {
        IndicatorChange::TypingStarted => Some("agent is typing…".dimmed().to_string()),
        IndicatorChange::UploadStarted => Some("uploading…".dimmed().to_string()),
        IndicatorChange::TypingStopped | IndicatorChange::UploadFinished => None,
    }
}

/// Prompt shown by the line editor
pub fn prompt_for(session: &Session) -> String {
    let state = session.ui_state();
    let mut prompt = String::new();
    if state.typing {
        prompt.push_str("[typing] ");
    }
    if state.uploading {
        prompt.push_str("[uploading] ");
    }
    prompt.push_str("› ");
    prompt
}

/// Display welcome banner at the start of the console
///
/// Shown while the transcript is still empty.
pub fn print_welcome_banner(base_url: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              RAG Agent Console - Awaiting Queries            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Backend: {}", base_url.cyan());
    println!("Ask a question, or upload documents with '/upload <path>'.");
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Display session status for `/status`
pub fn print_status_display(session: &Session, base_url: &str) {
    let transcript = session.transcript();
    let state = session.ui_state();
    let flag = |on: bool| if on { "yes".yellow() } else { "no".green() };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    RAG Console Session Status                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Backend:           {}", base_url);
    println!(
        "Transcript:        {} entries ({} queries, {} replies, {} notices)",
        transcript.len(),
        transcript.count_role(Role::User),
        transcript.count_role(Role::Assistant),
        transcript.count_role(Role::System)
    );
    println!("Pending Requests:  {}", session.pending_requests());
    println!("Typing:            {}", flag(state.typing));
    println!("Uploading:         {}", flag(state.uploading));
    println!();
}
