use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use crate::profile::{EnvKey, Profile};
use crate::store::{ProfileStore, validate_profile_name};
use crate::switch::Switcher;

const MESSAGE_TTL: Duration = Duration::from_secs(2);

/// Types of popups that can be displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupType {
    ConfirmSwitch(String),
    ConfirmDelete(String),
    RenameProfile(String),
    AddName,
    /// Collecting the value for `EnvKey::ALL[index]` of a new profile
    AddValue {
        name: String,
        profile: Profile,
        index: usize,
    },
}

/// Work the event loop performs against the profile store and Claude's
/// settings before reading the next key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Switch(String),
    Remove(String),
    Rename { from: String, to: String },
    Add { name: String, profile: Profile },
}

/// Application state for the TUI
pub struct App {
    pub store: ProfileStore,
    pub profiles: Vec<String>,
    pub selected_profile: usize,
    pub should_quit: bool,
    pub show_popup: Option<PopupType>,
    pub input_buffer: String,
    pub message: Option<String>,
    pub message_timeout: Option<Instant>,
    pub popup_selection: bool, // true for Yes, false for No
}

impl App {
    pub fn new(store: ProfileStore) -> Self {
        let mut app = Self {
            profiles: Vec::new(),
            store,
            selected_profile: 0,
            should_quit: false,
            show_popup: None,
            input_buffer: String::new(),
            message: None,
            message_timeout: None,
            popup_selection: true,
        };
        app.refresh_profiles();
        if let Some(current) = app.current_profile().map(str::to_string) {
            app.select_name(&current);
        }
        app
    }

    /// Re-read the profile list from the store and keep the selection in range
    pub fn refresh_profiles(&mut self) {
        self.profiles = self.store.profile_names();
        if !self.profiles.is_empty() && self.selected_profile >= self.profiles.len() {
            self.selected_profile = self.profiles.len() - 1;
        }
    }

    pub fn current_profile(&self) -> Option<&str> {
        self.store.current()
    }

    pub fn select_name(&mut self, name: &str) {
        if let Some(i) = self.profiles.iter().position(|p| p == name) {
            self.selected_profile = i;
        }
    }

    pub fn select_next(&mut self) {
        if !self.profiles.is_empty() {
            self.selected_profile = (self.selected_profile + 1) % self.profiles.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.profiles.is_empty() {
            self.selected_profile = if self.selected_profile == 0 {
                self.profiles.len() - 1
            } else {
                self.selected_profile - 1
            };
        }
    }

    pub fn get_selected_profile_name(&self) -> Option<&str> {
        self.profiles.get(self.selected_profile).map(|s| s.as_str())
    }

    pub fn show_message(&mut self, msg: String) {
        self.message = Some(msg);
        self.message_timeout = Some(Instant::now());
    }

    pub fn update_message_timeout(&mut self) {
        if let Some(timeout) = self.message_timeout
            && timeout.elapsed() >= MESSAGE_TTL
        {
            self.message = None;
            self.message_timeout = None;
        }
    }

    fn close_popup(&mut self) {
        self.show_popup = None;
        self.input_buffer.clear();
        self.popup_selection = true;
    }

    /// Apply one key press to the UI state.
    ///
    /// Only UI state changes here; anything touching files comes back as an
    /// [`Effect`] for the caller to run.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match self.show_popup.take() {
            Some(popup) => self.handle_popup_input(key, popup),
            None => self.handle_main_input(key),
        }
    }

    fn handle_main_input(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Enter => {
                let selected = self.get_selected_profile_name().map(str::to_string);
                if let Some(name) = selected {
                    if self.current_profile() == Some(name.as_str()) {
                        self.show_message(format!("Already using profile '{}'", name));
                    } else {
                        self.popup_selection = true;
                        self.show_popup = Some(PopupType::ConfirmSwitch(name));
                    }
                }
            }
            KeyCode::Char('a') => {
                self.input_buffer.clear();
                self.show_popup = Some(PopupType::AddName);
            }
            KeyCode::Char('d') => {
                if let Some(name) = self.get_selected_profile_name() {
                    self.show_popup = Some(PopupType::ConfirmDelete(name.to_string()));
                }
            }
            KeyCode::Char('r') => {
                if let Some(name) = self.get_selected_profile_name() {
                    self.show_popup = Some(PopupType::RenameProfile(name.to_string()));
                    self.input_buffer.clear();
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        None
    }

    fn handle_popup_input(&mut self, key: KeyEvent, popup: PopupType) -> Option<Effect> {
        match popup {
            PopupType::ConfirmSwitch(name) => match key.code {
                KeyCode::Left => {
                    self.popup_selection = true;
                    self.show_popup = Some(PopupType::ConfirmSwitch(name));
                }
                KeyCode::Right => {
                    self.popup_selection = false;
                    self.show_popup = Some(PopupType::ConfirmSwitch(name));
                }
                KeyCode::Tab => {
                    self.popup_selection = !self.popup_selection;
                    self.show_popup = Some(PopupType::ConfirmSwitch(name));
                }
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.close_popup();
                    return Some(Effect::Switch(name));
                }
                KeyCode::Enter => {
                    let confirmed = self.popup_selection;
                    self.close_popup();
                    if confirmed {
                        return Some(Effect::Switch(name));
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.close_popup(),
                _ => self.show_popup = Some(PopupType::ConfirmSwitch(name)),
            },
            PopupType::ConfirmDelete(name) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.close_popup();
                    return Some(Effect::Remove(name));
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.close_popup(),
                _ => self.show_popup = Some(PopupType::ConfirmDelete(name)),
            },
            PopupType::RenameProfile(from) => match key.code {
                KeyCode::Enter if !self.input_buffer.trim().is_empty() => {
                    let to = self.input_buffer.trim().to_string();
                    self.close_popup();
                    return Some(Effect::Rename { from, to });
                }
                KeyCode::Esc => self.close_popup(),
                code => {
                    self.edit_input(code);
                    self.show_popup = Some(PopupType::RenameProfile(from));
                }
            },
            PopupType::AddName => match key.code {
                KeyCode::Enter => {
                    let name = self.input_buffer.trim().to_string();
                    if let Err(e) = validate_profile_name(&name) {
                        self.show_message(e.to_string());
                        self.show_popup = Some(PopupType::AddName);
                    } else if self.store.contains(&name) {
                        self.show_message(format!("Profile '{}' already exists", name));
                        self.show_popup = Some(PopupType::AddName);
                    } else {
                        self.input_buffer.clear();
                        self.show_popup = Some(PopupType::AddValue {
                            name,
                            profile: Profile::new(),
                            index: 0,
                        });
                    }
                }
                KeyCode::Esc => self.close_popup(),
                code => {
                    self.edit_input(code);
                    self.show_popup = Some(PopupType::AddName);
                }
            },
            PopupType::AddValue {
                name,
                mut profile,
                index,
            } => match key.code {
                KeyCode::Enter => {
                    let value = self.input_buffer.trim().to_string();
                    if !value.is_empty() {
                        profile.set_env(EnvKey::ALL[index], value);
                    }
                    self.input_buffer.clear();

                    if index + 1 < EnvKey::ALL.len() {
                        self.show_popup = Some(PopupType::AddValue {
                            name,
                            profile,
                            index: index + 1,
                        });
                    } else if profile.is_empty() {
                        self.close_popup();
                        self.show_message(
                            "Profile cannot be empty. Provide at least one value.".to_string(),
                        );
                    } else {
                        self.close_popup();
                        return Some(Effect::Add { name, profile });
                    }
                }
                KeyCode::Esc => self.close_popup(),
                code => {
                    self.edit_input(code);
                    self.show_popup = Some(PopupType::AddValue {
                        name,
                        profile,
                        index,
                    });
                }
            },
        }
        None
    }

    fn edit_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }
}

/// TUI rendering and event handling
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    switcher: Switcher,
}

impl TuiApp {
    pub fn new(switcher: Switcher) -> Result<Self> {
        let store = switcher.load_store()?;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            app: App::new(store),
            switcher,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        while !self.app.should_quit {
            {
                let app = &self.app;
                self.terminal.draw(|f| {
                    Self::render_ui_static(app, f);
                })?;
            }

            self.handle_events()?;
            self.app.update_message_timeout();
        }

        Ok(())
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(effect) = self.app.handle_key(key)
        {
            run_effect(&self.switcher, &mut self.app, effect);
        }
        Ok(())
    }

    fn render_ui_static(app: &App, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Main content
                Constraint::Length(3), // Footer
            ])
            .split(f.area());

        Self::render_header(f, chunks[0]);
        Self::render_main_content(app, f, chunks[1]);
        Self::render_footer(f, chunks[2]);

        if let Some(ref popup) = app.show_popup {
            Self::render_popup(app, f, popup);
        }

        if let Some(ref message) = app.message {
            Self::render_message(f, message);
        }
    }

    fn render_header(f: &mut Frame, area: Rect) {
        let header_text = vec![Line::from(vec![
            Span::styled(
                "CCS",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                "Claude Code Switcher",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ])];

        let header = Paragraph::new(header_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);

        f.render_widget(header, area);
    }

    fn render_main_content(app: &App, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        Self::render_profile_list(app, f, chunks[0]);
        Self::render_profile_details(app, f, chunks[1]);
    }

    fn render_profile_list(app: &App, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = app
            .profiles
            .iter()
            .map(|name| {
                let is_current = app.current_profile() == Some(name.as_str());
                let style = if is_current {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let content = if is_current {
                    format!("● {} (active)", name)
                } else {
                    format!("  {}", name)
                };
                ListItem::new(content).style(style)
            })
            .collect();

        let empty = items.is_empty();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(" Profiles ")
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Rgb(50, 50, 100))
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::White),
            );

        let mut list_state = ListState::default();
        if !empty {
            list_state.select(Some(app.selected_profile));
        }

        f.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_profile_details(app: &App, f: &mut Frame, area: Rect) {
        let selected = app
            .get_selected_profile_name()
            .and_then(|name| app.store.get_profile(name).ok().map(|p| (name, p)));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Blue));

        let paragraph = match selected {
            Some((name, profile)) => Paragraph::new(profile_detail_lines(profile))
                .block(block.title(format!(" Details: {} ", name)))
                .wrap(Wrap { trim: false }),
            None => Paragraph::new("No profile selected. Press 'a' to add one.")
                .block(block.title(" Details "))
                .style(Style::default().fg(Color::DarkGray)),
        };

        f.render_widget(paragraph, area);
    }

    fn render_footer(f: &mut Frame, area: Rect) {
        let key = |k: &'static str| {
            Span::styled(
                k,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let desc = |d: &'static str| Span::styled(d, Style::default().fg(Color::Gray));

        let help_text = vec![Line::from(vec![
            key("↑/↓"),
            desc(": Navigate "),
            key("Enter"),
            desc(": Switch "),
            key("a"),
            desc(": Add "),
            key("d"),
            desc(": Delete "),
            key("r"),
            desc(": Rename "),
            Span::styled(
                "q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            desc(": Quit"),
        ])];

        let footer = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .alignment(Alignment::Center);

        f.render_widget(footer, area);
    }

    fn render_popup(app: &App, f: &mut Frame, popup_type: &PopupType) {
        let popup_area = Self::centered_rect(60, 40, f.area());
        f.render_widget(Clear, popup_area);

        match popup_type {
            PopupType::ConfirmSwitch(name) => {
                Self::render_confirm_switch_popup(app, f, popup_area, name);
            }
            PopupType::ConfirmDelete(name) => {
                let content = vec![
                    Line::from(""),
                    Line::from(format!("Delete profile '{}'?", name)),
                    Line::from(""),
                    Line::from("y: Yes  n: No  Esc: Cancel"),
                ];
                Self::render_text_popup(f, popup_area, " Confirm Delete ", Color::Red, content);
            }
            PopupType::RenameProfile(name) => {
                let content = vec![
                    Line::from(""),
                    Line::from(format!("From: {}", name)),
                    Line::from(format!("To: {}", app.input_buffer)),
                    Line::from(""),
                    Line::from("Enter new name, then press Enter to confirm"),
                    Line::from("Press Esc to cancel"),
                ];
                Self::render_text_popup(f, popup_area, " Rename Profile ", Color::Cyan, content);
            }
            PopupType::AddName => {
                let content = vec![
                    Line::from(""),
                    Line::from(format!("Profile name: {}", app.input_buffer)),
                    Line::from(""),
                    Line::from("Letters, numbers, '-' and '_' only"),
                    Line::from("Press Enter to continue, Esc to cancel"),
                ];
                Self::render_text_popup(f, popup_area, " Add Profile ", Color::Yellow, content);
            }
            PopupType::AddValue { name, index, .. } => {
                let key = EnvKey::ALL[*index];
                let shown = if key.is_secret() {
                    "*".repeat(app.input_buffer.chars().count())
                } else {
                    app.input_buffer.clone()
                };
                let content = vec![
                    Line::from(format!(
                        "Profile '{}' ({}/{})",
                        name,
                        index + 1,
                        EnvKey::ALL.len()
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        key.as_str(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(format!("{}: {}", key.label(), shown)),
                    Line::from(""),
                    Line::from("Enter to accept (empty skips), Esc to cancel"),
                ];
                Self::render_text_popup(f, popup_area, " Add Profile ", Color::Yellow, content);
            }
        }
    }

    fn render_text_popup(
        f: &mut Frame,
        area: Rect,
        title: &'static str,
        color: Color,
        content: Vec<Line<'static>>,
    ) {
        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(title)
                    .border_style(Style::default().fg(color)),
            )
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_confirm_switch_popup(app: &App, f: &mut Frame, area: Rect, name: &str) {
        let popup_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Confirm Switch ")
            .border_style(Style::default().fg(Color::Yellow));
        f.render_widget(popup_block, area);

        let inner = area.inner(Margin::new(1, 1));
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(inner);

        let content = vec![
            Line::from(""),
            Line::from(format!("Switch to profile '{}'?", name)),
        ];
        let paragraph = Paragraph::new(content)
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, layout[0]);

        let buttons_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(8), // Yes
                Constraint::Length(4),
                Constraint::Length(8), // No
                Constraint::Min(0),
            ])
            .split(layout[1]);

        let button_style = |active: bool| {
            if active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Rgb(220, 220, 220))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).bg(Color::Rgb(100, 100, 100))
            }
        };
        let button = |label: &'static str, active: bool| {
            Paragraph::new(label)
                .style(button_style(active))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Gray)),
                )
                .alignment(Alignment::Center)
        };

        f.render_widget(button("Yes", app.popup_selection), buttons_row[1]);
        f.render_widget(button("No", !app.popup_selection), buttons_row[3]);
    }

    fn render_message(f: &mut Frame, message: &str) {
        let message_area = Self::centered_rect(50, 20, f.area());
        f.render_widget(Clear, message_area);

        let paragraph = Paragraph::new(message)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .style(Style::default().fg(Color::Green)),
            )
            .style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, message_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

/// Masked `label  value` lines for the preview pane
fn profile_detail_lines(profile: &Profile) -> Vec<Line<'static>> {
    EnvKey::ALL
        .into_iter()
        .filter_map(|key| {
            let value = profile.display_value(key)?;
            let value_style = if key.is_secret() {
                Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
            } else if value.starts_with("http") {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Magenta)
            };
            Some(Line::from(vec![
                Span::styled(
                    format!("{:<15}", key.label()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(value, value_style),
            ]))
        })
        .collect()
}

/// Run one effect against the store and Claude's settings, reporting the
/// result as a message. Failures never end the session.
pub fn run_effect(switcher: &Switcher, app: &mut App, effect: Effect) {
    let message = match effect {
        Effect::Switch(name) => match switcher.switch_to(&mut app.store, &name) {
            Ok(outcome) => match outcome.clear_error {
                Some(e) => format!(
                    "Switched to profile '{}' (could not clear previous: {})",
                    name, e
                ),
                None => format!("Switched to profile '{}'", name),
            },
            Err(e) => format!("Failed to switch profile: {}", e),
        },
        Effect::Remove(name) => match switcher.remove(&mut app.store, &name) {
            Ok(outcome) => match (outcome.new_current, outcome.apply_error) {
                (Some(current), Some(e)) => format!(
                    "Profile '{}' deleted, active: '{}' (settings not updated: {})",
                    name, current, e
                ),
                (Some(current), None) => {
                    format!("Profile '{}' deleted, active: '{}'", name, current)
                }
                (None, _) => format!("Profile '{}' deleted", name),
            },
            Err(e) => format!("Failed to delete profile: {}", e),
        },
        Effect::Rename { from, to } => match switcher.rename(&mut app.store, &from, &to) {
            Ok(()) => {
                app.refresh_profiles();
                app.select_name(&to);
                format!("Profile renamed to '{}'", to)
            }
            Err(e) => format!("Failed to rename profile: {}", e),
        },
        Effect::Add { name, profile } => match switcher.add(&mut app.store, &name, profile) {
            Ok(()) => {
                app.refresh_profiles();
                app.select_name(&name);
                format!("Profile '{}' added successfully", name)
            }
            Err(e) => format!("Failed to add profile: {}", e),
        },
    };

    app.refresh_profiles();
    app.show_message(message);
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Public function to launch the TUI
pub fn launch_tui(switcher: Switcher) -> Result<()> {
    if !io::stderr().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("TUI mode requires a terminal. Please run in a proper terminal environment.");
    }

    if let Ok((width, height)) = crossterm::terminal::size()
        && (width < 80 || height < 24)
    {
        eprintln!(
            "Warning: Terminal size ({}x{}) is smaller than recommended (80x24)",
            width, height
        );
    }

    let _ = color_eyre::install();

    let mut tui_app = TuiApp::new(switcher)
        .map_err(|e| anyhow::anyhow!("Failed to initialize TUI: {}", e))?;
    tui_app.run().map_err(|e| anyhow::anyhow!("TUI error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c))), None);
        }
    }

    fn store_with(names: &[&str]) -> ProfileStore {
        let mut store = ProfileStore::new();
        for name in names {
            let mut profile = Profile::new();
            profile.set_auth_token(format!("tok-{}", name));
            store.add_profile(name, profile).unwrap();
        }
        store
    }

    #[test]
    fn starts_on_current_profile_and_wraps() {
        let mut store = store_with(&["alpha", "beta", "gamma"]);
        store.set_current("beta").unwrap();
        let mut app = App::new(store);

        assert_eq!(app.get_selected_profile_name(), Some("beta"));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.get_selected_profile_name(), Some("alpha"));
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.get_selected_profile_name(), Some("gamma"));
    }

    #[test]
    fn enter_on_active_profile_only_shows_message() {
        let mut app = App::new(store_with(&["alpha"]));

        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert!(app.show_popup.is_none());
        assert!(app.message.as_deref().unwrap().contains("Already using"));
    }

    #[test]
    fn confirm_switch_respects_selected_button() {
        let mut app = App::new(store_with(&["alpha", "beta"]));
        app.handle_key(key(KeyCode::Down));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.show_popup,
            Some(PopupType::ConfirmSwitch("beta".to_string()))
        );
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert!(app.show_popup.is_none());

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Effect::Switch("beta".to_string()))
        );
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = App::new(store_with(&["alpha"]));

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.handle_key(key(KeyCode::Char('x'))), None);
        assert!(app.show_popup.is_some());
        assert_eq!(
            app.handle_key(key(KeyCode::Char('y'))),
            Some(Effect::Remove("alpha".to_string()))
        );
    }

    #[test]
    fn rename_collects_new_name() {
        let mut app = App::new(store_with(&["alpha"]));

        app.handle_key(key(KeyCode::Char('r')));
        type_text(&mut app, "betx");
        app.handle_key(key(KeyCode::Backspace));
        type_text(&mut app, "a");
        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Effect::Rename {
                from: "alpha".to_string(),
                to: "beta".to_string()
            })
        );
    }

    #[test]
    fn add_form_walks_every_key() {
        let mut app = App::new(ProfileStore::new());

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "work");
        app.handle_key(key(KeyCode::Enter));

        type_text(&mut app, "sk-123");
        let mut effect = app.handle_key(key(KeyCode::Enter));
        for _ in 1..EnvKey::ALL.len() {
            assert_eq!(effect, None);
            effect = app.handle_key(key(KeyCode::Enter));
        }

        let mut expected = Profile::new();
        expected.set_auth_token("sk-123");
        assert_eq!(
            effect,
            Some(Effect::Add {
                name: "work".to_string(),
                profile: expected
            })
        );
    }

    #[test]
    fn add_form_rejects_bad_names_and_empty_profiles() {
        let mut app = App::new(store_with(&["work"]));

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "has space");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.show_popup, Some(PopupType::AddName));

        app.input_buffer.clear();
        type_text(&mut app, "work");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.show_popup, Some(PopupType::AddName));
        assert!(app.message.as_deref().unwrap().contains("already exists"));

        app.input_buffer.clear();
        type_text(&mut app, "fresh");
        app.handle_key(key(KeyCode::Enter));
        for _ in 0..EnvKey::ALL.len() {
            assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        }
        assert!(app.show_popup.is_none());
        assert!(app.message.as_deref().unwrap().contains("cannot be empty"));
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new(ProfileStore::new());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn effects_update_store_and_messages() {
        let tmp = tempfile::tempdir().unwrap();
        let switcher = Switcher::new(&Paths::with_root(tmp.path()));
        let mut app = App::new(store_with(&["alpha", "beta"]));

        run_effect(&switcher, &mut app, Effect::Switch("beta".to_string()));
        assert_eq!(app.current_profile(), Some("beta"));
        assert!(app.message.as_deref().unwrap().starts_with("Switched"));

        run_effect(
            &switcher,
            &mut app,
            Effect::Rename {
                from: "beta".to_string(),
                to: "gamma".to_string(),
            },
        );
        assert_eq!(app.profiles, vec!["alpha", "gamma"]);
        assert_eq!(app.get_selected_profile_name(), Some("gamma"));

        run_effect(&switcher, &mut app, Effect::Remove("gamma".to_string()));
        assert_eq!(app.current_profile(), Some("alpha"));
        assert_eq!(app.profiles, vec!["alpha"]);

        run_effect(&switcher, &mut app, Effect::Switch("missing".to_string()));
        assert!(app.message.as_deref().unwrap().starts_with("Failed"));
    }
}
