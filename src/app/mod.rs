//! Application state and event handling

pub mod command;
pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::llm::{LlmError, ModelGateway};
use crate::quiz::QuestionKind;
use crate::theme::Theme;
use crate::tutor::{GenerationRequest, Phase, Tutor, TutorError};
use crate::ui;
use command::{Command, ParseResult, parse_command};
use input::{Action, key_to_action};
use state::{AppState, ConfigureField, ConfigureState, Screen};

/// How long quitting waits for queued store writes
const FLUSH_ON_EXIT: Duration = Duration::from_secs(2);

/// What a finished gateway request was for
#[derive(Debug, Clone, Copy)]
enum ReplyTarget {
    Story,
    Questions(QuestionKind),
}

/// A gateway reply handed back from the request task
struct Reply {
    target: ReplyTarget,
    result: Result<String, LlmError>,
}

/// The main application
pub struct App {
    /// Application configuration
    config: Config,

    theme: Theme,

    /// UI state outside the tutor
    state: AppState,

    tutor: Tutor,

    /// Configured gateway, or why it could not be built
    gateway: Result<Arc<dyn ModelGateway>, String>,

    replies_tx: mpsc::Sender<Reply>,
    replies_rx: mpsc::Receiver<Reply>,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(
        config: Config,
        tutor: Tutor,
        gateway: Result<Arc<dyn ModelGateway>, String>,
    ) -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        let (replies_tx, replies_rx) = mpsc::channel(4);
        let theme = config.active_theme();

        let mut state = AppState::default();
        if let Some(story) = tutor.story() {
            state.command_line.set_message(format!("Restored \"{}\"", story.title));
        }
        if let Err(reason) = &gateway {
            state.command_line.set_error(reason.clone());
        }

        Ok(Self { config, theme, state, tutor, gateway, replies_tx, replies_rx, terminal })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        loop {
            self.terminal.draw(|frame| {
                ui::draw(frame, &mut self.state, &self.tutor, &self.theme);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break;
                    }
                }
            }

            while let Ok(reply) = self.replies_rx.try_recv() {
                self.handle_reply(reply);
            }

            self.state.tick = self.state.tick.wrapping_add(1);
        }

        self.restore_terminal()?;
        if tokio::time::timeout(FLUSH_ON_EXIT, self.tutor.flush()).await.is_err() {
            tracing::warn!("Store still busy at exit; latest progress may not be saved");
        }
        Ok(())
    }

    /// Handle a key press, returns true if should exit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.state.command_line.is_input_mode() {
            return self.handle_command_key(key.code);
        }

        let Some(action) = key_to_action(key.code, key.modifiers, self.config.vim_mode) else {
            return false;
        };

        if self.state.show_help {
            self.state.show_help = false;
            return action == Action::Quit;
        }

        let outcome = match action {
            Action::Quit => return true,
            Action::Command => {
                self.state.command_line.enter_command_mode();
                Ok(())
            }
            Action::Help => {
                self.state.show_help = true;
                Ok(())
            }
            _ => self.handle_screen_action(action),
        };

        if let Err(e) = outcome {
            tracing::debug!("Action {:?} refused: {}", action, e);
            self.state.command_line.set_error(e.to_string());
        }
        false
    }

    fn handle_screen_action(&mut self, action: Action) -> Result<(), TutorError> {
        match Screen::for_phase(self.tutor.phase()) {
            Screen::Configure => self.handle_configure_action(action),
            Screen::Story => self.handle_story_action(action),
            Screen::Quiz => self.handle_quiz_action(action),
            Screen::Results => self.handle_results_action(action),
        }
    }

    fn handle_configure_action(&mut self, action: Action) -> Result<(), TutorError> {
        let focus = &mut self.state.configure.focus;
        match action {
            Action::Up => *focus = focus.prev(),
            Action::Down => *focus = focus.next(),
            Action::Left | Action::Right => self.cycle_focused(action == Action::Right)?,
            Action::Select => self.start_story()?,
            Action::Back => self.tutor.show_story()?,
            Action::Comprehension => self.start_questions(QuestionKind::Comprehension)?,
            Action::Grammar => self.start_questions(QuestionKind::Grammar)?,
            _ => {}
        }
        Ok(())
    }

    fn cycle_focused(&mut self, forward: bool) -> Result<(), TutorError> {
        let selections = self.tutor.selections();
        match self.state.configure.focus {
            ConfigureField::Level => {
                let level = ConfigureState::next_level(selections, forward);
                self.tutor.select_level(level)
            }
            ConfigureField::Theme => {
                let theme = ConfigureState::next_theme(selections, forward);
                self.tutor.select_theme(theme)
            }
            ConfigureField::Length => {
                let length = ConfigureState::next_length(selections, forward);
                self.tutor.select_length(length)
            }
        }
    }

    fn handle_story_action(&mut self, action: Action) -> Result<(), TutorError> {
        let view = &mut self.state.story_view;
        let page = view.page();
        match action {
            Action::Up => view.scroll_by(-1),
            Action::Down => view.scroll_by(1),
            Action::PageUp => view.scroll_by(-page),
            Action::PageDown => view.scroll_by(page),
            Action::Top => view.scroll_offset = 0,
            Action::Bottom => view.scroll_offset = view.max_scroll(),
            Action::Comprehension => self.start_questions(QuestionKind::Comprehension)?,
            Action::Grammar => self.start_questions(QuestionKind::Grammar)?,
            Action::NewStory | Action::Reset | Action::Back => self.tutor.reset()?,
            Action::CopyStory => self.copy_story(),
            _ => {}
        }
        Ok(())
    }

    fn handle_quiz_action(&mut self, action: Action) -> Result<(), TutorError> {
        match self.tutor.phase() {
            Phase::Answering => match action {
                Action::Up | Action::Down => {
                    let quiz = self.tutor.quiz();
                    let count = quiz.current().map(|q| q.options.len()).unwrap_or(0);
                    let next = state::cycle(count, quiz.selected(), action == Action::Down);
                    self.tutor.select_option(next)?;
                }
                Action::Pick(i) => self.tutor.select_option(i)?,
                Action::Select => {
                    let record = self.tutor.submit_answer()?;
                    if record.is_correct {
                        self.state.command_line.set_message("Correct!");
                    } else {
                        self.state.command_line.set_error("Incorrect");
                    }
                }
                Action::Back | Action::Reset => self.tutor.reset()?,
                _ => {}
            },
            Phase::Feedback => match action {
                Action::Select | Action::Right => {
                    self.state.command_line.clear_message();
                    self.tutor.next_question()?;
                }
                Action::Back | Action::Reset => self.tutor.reset()?,
                Action::Comprehension => self.start_questions(QuestionKind::Comprehension)?,
                Action::Grammar => self.start_questions(QuestionKind::Grammar)?,
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn handle_results_action(&mut self, action: Action) -> Result<(), TutorError> {
        match action {
            Action::TryAgain => {
                let kind = self.tutor.quiz().kind().unwrap_or(QuestionKind::Comprehension);
                self.ensure_gateway()?;
                let request = self.tutor.try_again()?;
                self.dispatch(ReplyTarget::Questions(kind), request);
            }
            Action::Reset | Action::Back | Action::Select => self.tutor.reset()?,
            Action::NewStory => self.start_story()?,
            _ => {}
        }
        Ok(())
    }

    /// Handle a key while typing a : command
    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        let cmd = &mut self.state.command_line;
        match key {
            KeyCode::Esc => cmd.exit_input_mode(),
            KeyCode::Enter => {
                let input = cmd.input.clone();
                cmd.add_to_history(input.clone());
                cmd.exit_input_mode();
                return self.run_command(&input);
            }
            KeyCode::Backspace if cmd.input.is_empty() => cmd.exit_input_mode(),
            KeyCode::Backspace => cmd.delete_char(),
            KeyCode::Left => cmd.move_left(),
            KeyCode::Right => cmd.move_right(),
            KeyCode::Up => cmd.history_up(),
            KeyCode::Down => cmd.history_down(),
            KeyCode::Char(c) => cmd.insert_char(c),
            _ => {}
        }
        false
    }

    /// Execute a : command, returns true if should exit
    fn run_command(&mut self, input: &str) -> bool {
        let command = match parse_command(input) {
            ParseResult::Ok(command) => command,
            ParseResult::UnknownCommand(name) => {
                self.state.command_line.set_error(format!("Unknown command: {}", name));
                return false;
            }
            ParseResult::MissingArgument(name) => {
                self.state.command_line.set_error(format!(":{} needs an argument", name));
                return false;
            }
            ParseResult::InvalidArgument { command, message } => {
                self.state.command_line.set_error(format!(":{}: {}", command, message));
                return false;
            }
        };

        let outcome = match command {
            Command::Quit => return true,
            Command::Nop => {
                self.state.command_line.clear_message();
                Ok(())
            }
            Command::Help => {
                self.state.show_help = true;
                Ok(())
            }
            Command::Level(level) => self.tutor.select_level(level),
            Command::Theme(theme) => self.tutor.select_theme(theme),
            Command::Length(length) => self.tutor.select_length(length),
            Command::Generate => self.start_story(),
            Command::Quiz(kind) => self.start_questions(kind),
            Command::Reset => self.tutor.reset(),
            Command::Clear => self.tutor.clear_story().map(|()| {
                self.state.command_line.set_message("Story and answers cleared");
            }),
            Command::Copy => {
                self.copy_story();
                Ok(())
            }
        };

        if let Err(e) = outcome {
            self.state.command_line.set_error(e.to_string());
        }
        false
    }

    fn ensure_gateway(&self) -> Result<(), TutorError> {
        match &self.gateway {
            Ok(_) => Ok(()),
            Err(reason) => Err(TutorError::Validation(reason.clone())),
        }
    }

    fn start_story(&mut self) -> Result<(), TutorError> {
        self.ensure_gateway()?;
        let request = self.tutor.begin_story_generation()?;
        self.state.command_line.set_message("Generating story...");
        self.dispatch(ReplyTarget::Story, request);
        Ok(())
    }

    fn start_questions(&mut self, kind: QuestionKind) -> Result<(), TutorError> {
        self.ensure_gateway()?;
        let request = self.tutor.begin_question_generation(kind)?;
        self.state.command_line.set_message(format!("Generating {} questions...", kind));
        self.dispatch(ReplyTarget::Questions(kind), request);
        Ok(())
    }

    /// Run a gateway request on a background task
    fn dispatch(&self, target: ReplyTarget, request: GenerationRequest) {
        let gateway = match &self.gateway {
            Ok(gateway) => Arc::clone(gateway),
            Err(reason) => {
                tracing::error!("Dispatch without a gateway: {}", reason);
                return;
            }
        };
        let tx = self.replies_tx.clone();

        tokio::spawn(async move {
            let result = request.send(gateway.as_ref()).await;
            if tx.send(Reply { target, result }).await.is_err() {
                tracing::debug!("Reply dropped; app is shutting down");
            }
        });
    }

    fn handle_reply(&mut self, reply: Reply) {
        let follow_up = reply.result.as_ref().err().map(failure_hint);
        let cmd = &mut self.state.command_line;
        let failure = match reply.target {
            ReplyTarget::Story => match self.tutor.finish_story_generation(reply.result) {
                Ok(story) => {
                    cmd.set_message(format!("Story ready: {}", story.title));
                    self.state.story_view.scroll_offset = 0;
                    return;
                }
                Err(e) => e.to_string(),
            },
            ReplyTarget::Questions(kind) => match self.tutor.finish_question_generation(reply.result) {
                Ok(count) => {
                    cmd.set_message(format!("{} {} questions ready", count, kind));
                    return;
                }
                Err(e) => format!("Failed to generate {} questions: {}", kind, e),
            },
        };
        match follow_up.flatten() {
            Some(hint) => cmd.set_error(format!("{}. {}", failure, hint)),
            None => cmd.set_error(failure),
        }
    }

    fn copy_story(&mut self) {
        let Some(story) = self.tutor.story() else {
            self.state.command_line.set_error("No story to copy");
            return;
        };
        let text = format!("{}\n\n{}", story.title, story.content);

        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.state.command_line.set_message("Story copied to clipboard"),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                self.state.command_line.set_error(format!("Could not copy: {}", e));
            }
        }
    }
}

/// What the learner can do about a failed gateway call
fn failure_hint(error: &LlmError) -> Option<&'static str> {
    if error.requires_reauth() {
        Some("Run `skazka key set` to store a new API key")
    } else if error.is_recoverable() {
        Some("Try again in a moment")
    } else {
        None
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
