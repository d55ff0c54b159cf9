//! Line-oriented chat loop: prompts, slash commands, and live reply rendering.

use std::io::{self, BufRead, Write};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use generation_provider::CancelSignal;
use million_chat::{Line, RenderOptions, Span};
use session_store::{Attachment, ConversationSummary};

use crate::attachments::{attach_paths, read_attachments};
use crate::auth::AuthGate;
use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::controller::{ConversationController, TurnUpdate};
use crate::view::{encode_lines, message_lines, reply_lines, summary_line, LiveView};

/// Whether the loop keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal geometry and styling switches for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplSettings {
    pub columns: usize,
    pub rows: usize,
    pub color: bool,
}

pub struct Repl<W: Write> {
    controller: ConversationController,
    staged: Vec<Attachment>,
    settings: ReplSettings,
    interrupt: CancelSignal,
    out: W,
}

impl<W: Write> Repl<W> {
    /// `interrupt` is raised by Ctrl-C and doubles as the cancel signal of each turn.
    pub fn new(
        controller: ConversationController,
        settings: ReplSettings,
        interrupt: CancelSignal,
        out: W,
    ) -> Self {
        Self {
            controller,
            staged: Vec::new(),
            settings,
            interrupt,
            out,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    #[must_use]
    pub fn staged_attachments(&self) -> &[Attachment] {
        &self.staged
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Prints the open conversation, or the persona greeting when it is empty.
    pub fn print_conversation(&mut self) -> io::Result<()> {
        let options = self.render_options();
        let conversation = self.controller.conversation();

        let mut lines = vec![Line::new(vec![Span::new(
            format!("── {} ", conversation.display_title()),
            options.palette.heading,
        )])];
        if conversation.messages.is_empty() {
            lines.push(Line::new(vec![Span::new(
                self.controller.persona().greeting(),
                options.palette.muted,
            )]));
        }
        for message in &conversation.messages {
            lines.extend(message_lines(message, &options));
            lines.push(Line::blank());
        }

        self.write_lines(&lines)
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        if self.staged.is_empty() {
            write!(self.out, "> ")?;
        } else {
            write!(self.out, "[{} attached] > ", self.staged.len())?;
        }
        self.out.flush()
    }

    /// Handles one line of input: a slash command or a prompt to send.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let Some(command) = parse_slash_command(line) else {
            if line.trim().is_empty() && self.staged.is_empty() {
                return Ok(Flow::Continue);
            }
            self.send(line)?;
            return Ok(Flow::Continue);
        };

        match command {
            SlashCommand::Help => self.notice(HELP_TEXT)?,
            SlashCommand::New => {
                self.controller.new_conversation();
                self.staged.clear();
                self.print_conversation()?;
            }
            SlashCommand::List => {
                let summaries = self.controller.list();
                self.print_summaries(&summaries, "No conversations yet.")?;
            }
            SlashCommand::Search(query) => {
                let summaries = self.controller.search(&query);
                self.print_summaries(&summaries, "No matching conversations.")?;
            }
            SlashCommand::Open(query) if query.is_empty() => self.notice("Usage: /open <id>")?,
            SlashCommand::Open(query) => match self.controller.open_conversation(&query) {
                Ok(_) => {
                    self.staged.clear();
                    self.print_conversation()?;
                }
                Err(error) => self.error(&error.to_string())?,
            },
            SlashCommand::Delete(query) if query.is_empty() => {
                self.notice("Usage: /delete <id>")?
            }
            SlashCommand::Delete(query) => match self.controller.delete_conversation(&query) {
                Ok(summary) => self.notice(&format!("Deleted \"{}\"", summary.title))?,
                Err(error) => self.error(&error.to_string())?,
            },
            SlashCommand::Attach(arguments) if arguments.is_empty() => {
                self.notice("Usage: /attach <path>...")?
            }
            SlashCommand::Attach(arguments) => self.attach(&arguments)?,
            SlashCommand::Detach => {
                self.staged.clear();
                self.notice("Attachments cleared")?;
            }
            SlashCommand::Persona => {
                let persona = self.controller.persona().toggled();
                self.controller.set_persona(persona);
                self.notice(&format!("Persona: {}", persona.id()))?;
            }
            SlashCommand::Quit => return Ok(Flow::Quit),
            SlashCommand::Unknown(command) => {
                self.error(&format!("Unknown command: {command}"))?
            }
        }

        Ok(Flow::Continue)
    }

    fn send(&mut self, text: &str) -> io::Result<()> {
        let attachments = std::mem::take(&mut self.staged);
        self.interrupt.store(false, Ordering::SeqCst);

        let options = self.render_options();
        let color = self.settings.color;
        let mut view = LiveView::new(self.settings.rows);
        let out = &mut self.out;
        let mut write_error: Option<io::Error> = None;

        let result = self.controller.submit(
            text,
            attachments,
            Arc::clone(&self.interrupt),
            &mut |update: &TurnUpdate, controller: &ConversationController| {
                let lines = match update {
                    TurnUpdate::Ignored => return,
                    TurnUpdate::Started | TurnUpdate::Streaming => {
                        reply_lines(controller.live_blocks(), false, &options)
                    }
                    TurnUpdate::Finished | TurnUpdate::Failed { .. } => controller
                        .conversation()
                        .messages
                        .last()
                        .map(|message| message_lines(message, &options))
                        .unwrap_or_default(),
                };
                let frame = view.update(&encode_lines(&lines, color));
                if let Err(error) = out.write_all(frame.as_bytes()).and_then(|()| out.flush()) {
                    write_error.get_or_insert(error);
                }
            },
        );

        if let Some(error) = write_error {
            return Err(error);
        }
        match result {
            Ok(()) => writeln!(self.out),
            Err(error) => self.error(&error.to_string()),
        }
    }

    fn attach(&mut self, arguments: &str) -> io::Result<()> {
        let batch = read_attachments(attach_paths(arguments));
        for attachment in &batch.attachments {
            self.notice(&format!(
                "+ {} ({})",
                attachment.name,
                attachment.kind.label()
            ))?;
        }
        for rejected in &batch.rejected {
            self.error(&rejected.to_string())?;
        }
        self.staged.extend(batch.attachments);
        Ok(())
    }

    fn print_summaries(&mut self, summaries: &[ConversationSummary], empty: &str) -> io::Result<()> {
        if summaries.is_empty() {
            return self.notice(empty);
        }

        let options = self.render_options();
        let current = self.controller.conversation().id.clone();
        let lines: Vec<Line> = summaries
            .iter()
            .map(|summary| summary_line(summary, summary.id == current, &options))
            .collect();
        self.write_lines(&lines)
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        let style = self.render_options().palette.muted;
        self.write_lines(&[Line::new(vec![Span::new(text, style)])])
    }

    fn error(&mut self, text: &str) -> io::Result<()> {
        let style = self.render_options().palette.error;
        self.write_lines(&[Line::new(vec![Span::new(text, style)])])
    }

    fn write_lines(&mut self, lines: &[Line]) -> io::Result<()> {
        for line in encode_lines(lines, self.settings.color) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.settings.columns,
            palette: self.controller.persona().palette(),
        }
    }
}

/// Asks for the access secret until the gate opens. Returns `false` on end of input.
pub fn unlock<R: BufRead, W: Write>(gate: &AuthGate, input: &mut R, out: &mut W) -> io::Result<bool> {
    while !gate.is_authenticated() {
        write!(out, "ACCESS KEY: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        let candidate = line.trim_end_matches(['\r', '\n']);
        if gate.try_unlock(candidate).map_err(io::Error::other)? {
            break;
        }
        writeln!(out, "ACCESS DENIED")?;
    }
    Ok(true)
}
