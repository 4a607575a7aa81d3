use crate::dialog::{handle_confirm_input, handle_dialog_input, DialogAction};
use crate::events::{Event, EventHandler};
use crate::input::InputState;
use crate::selection::SelectionState;
use crate::ui;
use branchy_core::{ActivityLog, BranchyResult};
use branchy_domain::{Branch, Project};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::future::Future;
use std::io;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    CreateBranch,
    RenameBranch { from: String },
    ConfirmDelete { name: String, force: bool },
}

/// Result of a queued operation, reported back to the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Refreshed,
    Done(String),
    /// An identical request was already queued
    Skipped(String),
    Canceled(String),
    Failed(String),
}

pub struct App {
    pub project: Project,
    pub repo_label: String,
    pub should_quit: bool,
    pub mode: AppMode,
    pub input: InputState,
    pub selection: SelectionState,
    pub activity: ActivityLog,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(project: Project, repo_label: impl Into<String>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            project,
            repo_label: repo_label.into(),
            should_quit: false,
            mode: AppMode::Normal,
            input: InputState::new(),
            selection: SelectionState::new(),
            activity: ActivityLog::default(),
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.project.branches()
    }

    pub fn selected_branch(&self) -> Option<Branch> {
        self.selection
            .get()
            .and_then(|idx| self.project.branches().into_iter().nth(idx))
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.mode.clone() {
            AppMode::Normal => self.handle_normal_key(key.code),
            AppMode::CreateBranch => {
                match handle_dialog_input(&mut self.input, key.code) {
                    DialogAction::Confirm => {
                        let name = self.input.as_str().trim().to_string();
                        self.mode = AppMode::Normal;
                        self.create_branch(name);
                    }
                    DialogAction::Cancel => self.mode = AppMode::Normal,
                    DialogAction::None => {}
                }
            }
            AppMode::RenameBranch { from } => {
                match handle_dialog_input(&mut self.input, key.code) {
                    DialogAction::Confirm => {
                        let to = self.input.as_str().trim().to_string();
                        self.mode = AppMode::Normal;
                        if to != from {
                            self.rename_branch(from, to);
                        }
                    }
                    DialogAction::Cancel => self.mode = AppMode::Normal,
                    DialogAction::None => {}
                }
            }
            AppMode::ConfirmDelete { name, force } => match handle_confirm_input(key.code) {
                DialogAction::Confirm => {
                    self.mode = AppMode::Normal;
                    self.delete_branch(name, force);
                }
                DialogAction::Cancel => self.mode = AppMode::Normal,
                DialogAction::None => {}
            },
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        let len = self.project.branches().len();
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Char('j') | KeyCode::Down => self.selection.next(len),
            KeyCode::Char('k') | KeyCode::Up => self.selection.prev(),
            KeyCode::Char('g') | KeyCode::Home => self.selection.jump_to_first(len),
            KeyCode::Char('G') | KeyCode::End => self.selection.jump_to_last(len),
            KeyCode::Enter | KeyCode::Char('c') => {
                if let Some(branch) = self.selected_branch() {
                    if branch.is_head {
                        self.activity
                            .info(format!("Already on '{}'", branch.name));
                    } else {
                        self.checkout_branch(branch.name);
                    }
                }
            }
            KeyCode::Char('n') => {
                self.input.clear();
                self.mode = AppMode::CreateBranch;
            }
            KeyCode::Char('r') => {
                if let Some(branch) = self.selected_branch() {
                    self.input.set(branch.name.clone());
                    self.mode = AppMode::RenameBranch { from: branch.name };
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                if let Some(branch) = self.selected_branch() {
                    self.mode = AppMode::ConfirmDelete {
                        name: branch.name,
                        force: code == KeyCode::Char('D'),
                    };
                }
            }
            KeyCode::Char('R') | KeyCode::F(5) => self.refresh(),
            KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Char('x') => {
                let canceled = self.project.queue().cancel_all();
                self.activity
                    .info(format!("Canceled {} queued operation(s)", canceled));
            }
            _ => {}
        }
    }

    pub fn toggle_pause(&mut self) {
        let queue = self.project.queue();
        if queue.is_paused() {
            queue.resume();
            self.activity.info("Queue resumed");
        } else {
            queue.pause();
            self.activity.info("Queue paused");
        }
    }

    pub fn refresh(&self) {
        let project = self.project.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = match project.refresh().await {
                Ok(Some(_)) => Outcome::Refreshed,
                Ok(None) => Outcome::Skipped("Refresh branches".to_string()),
                Err(e) if e.is_canceled() => Outcome::Canceled("Refresh branches".to_string()),
                Err(e) => Outcome::Failed(e.to_string()),
            };
            let _ = tx.send(outcome);
        });
    }

    fn checkout_branch(&self, name: String) {
        let project = self.project.clone();
        self.spawn_operation(format!("Checkout '{}'", name), async move {
            project.checkout_branch(&name).await
        });
    }

    fn create_branch(&self, name: String) {
        let project = self.project.clone();
        self.spawn_operation(format!("Create '{}'", name), async move {
            project.create_branch(&name, None).await
        });
    }

    fn rename_branch(&self, from: String, to: String) {
        let project = self.project.clone();
        self.spawn_operation(format!("Rename '{}' to '{}'", from, to), async move {
            project.rename_branch(&from, &to).await
        });
    }

    fn delete_branch(&self, name: String, force: bool) {
        let project = self.project.clone();
        self.spawn_operation(format!("Delete '{}'", name), async move {
            project.delete_branch(&name, force).await
        });
    }

    fn spawn_operation<F>(&self, label: String, operation: F)
    where
        F: Future<Output = BranchyResult<Option<()>>> + Send + 'static,
    {
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = match operation.await {
                Ok(Some(())) => Outcome::Done(label),
                Ok(None) => Outcome::Skipped(label),
                Err(e) if e.is_canceled() => Outcome::Canceled(label),
                Err(e) => Outcome::Failed(e.to_string()),
            };
            let _ = tx.send(outcome);
        });
    }

    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        self.outcome_rx.recv().await
    }

    pub fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Refreshed => {}
            Outcome::Done(label) => self.activity.info(label),
            Outcome::Skipped(label) => self.activity.info(format!("{} already queued", label)),
            Outcome::Canceled(label) => self.activity.info(format!("{} canceled", label)),
            Outcome::Failed(message) => {
                tracing::error!("{}", message);
                self.activity.error(message);
            }
        }
        self.selection.clamp(self.project.branches().len());
    }

    pub async fn run(&mut self) -> BranchyResult<()> {
        let mut terminal = setup_terminal()?;
        let mut events = EventHandler::new();
        self.refresh();

        let result = self.event_loop(&mut terminal, &mut events).await;
        events.stop();
        let restored = restore_terminal(&mut terminal);
        self.finish(result, restored).await
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        events: &mut EventHandler,
    ) -> BranchyResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(self, frame))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Event::Key(key)) => self.handle_key_event(key),
                    Some(Event::Resize) | Some(Event::Tick) => {}
                    None => self.quit(),
                },
                Some(outcome) = self.outcome_rx.recv() => self.apply_outcome(outcome),
            }
        }
        Ok(())
    }

    /// Dispose the queue however the loop ended. A loop error wins over a
    /// failure to restore the terminal.
    async fn finish(&self, result: BranchyResult<()>, restored: io::Result<()>) -> BranchyResult<()> {
        self.project.shutdown().await;
        result?;
        restored?;
        Ok(())
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
