use crate::actions::{self, Notice, NoticeKind, TaskForm};
use crate::store::TaskStore;
use crate::task::{task_rows, Task};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Title,
    Category,
    Due,
    Priority,
    List,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Title => Focus::Category,
            Focus::Category => Focus::Due,
            Focus::Due => Focus::Priority,
            Focus::Priority => Focus::List,
            Focus::List => Focus::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Title => Focus::List,
            Focus::Category => Focus::Title,
            Focus::Due => Focus::Category,
            Focus::Priority => Focus::Due,
            Focus::List => Focus::Priority,
        }
    }
}

pub struct App {
    store: TaskStore,
    tasks: Vec<Task>,
    form: TaskForm,
    focus: Focus,
    selected: usize,
    notice: Option<Notice>,
    should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let tasks = store.load();
        App {
            store,
            tasks,
            form: TaskForm::default(),
            focus: Focus::Title,
            selected: 0,
            notice: None,
            should_quit: false,
        }
    }

    // Full clear-and-rebuild from the file; the selection is clamped so it
    // stays a valid positional index for the next render.
    fn refresh(&mut self) {
        self.tasks = self.store.load();
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // A visible notice is modal: nothing else runs until it is
        // acknowledged.
        if self.notice.is_some() {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')
            ) {
                self.notice = None;
            }
            return;
        }
        match self.focus {
            Focus::List => self.handle_list_key(key),
            _ => self.handle_form_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('a') => self.focus = Focus::Title,
            KeyCode::BackTab => self.focus = Focus::Priority,
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                self.run_action(actions::complete_task(&self.store, self.selected));
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.run_action(actions::delete_task(&self.store, self.selected));
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('x') => {
                self.run_action(actions::export_tasks(&self.store));
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Enter => self.submit_add(),
            KeyCode::Backspace => {
                self.active_field_mut().pop();
            }
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.active_field_mut().push(c);
                }
            }
            _ => {}
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Title | Focus::List => &mut self.form.title,
            Focus::Category => &mut self.form.category,
            Focus::Due => &mut self.form.due_date,
            Focus::Priority => &mut self.form.priority,
        }
    }

    fn submit_add(&mut self) {
        match actions::add_task(&self.store, &self.form) {
            Ok(notice) => {
                self.form = TaskForm::default();
                self.focus = Focus::Title;
                self.notice = notice;
            }
            Err(notice) => self.notice = Some(notice),
        }
        self.refresh();
    }

    fn run_action(&mut self, result: actions::ActionResult) {
        self.notice = match result {
            Ok(notice) => notice,
            Err(notice) => Some(notice),
        };
        self.refresh();
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(2),
            ])
            .split(f.area());

        self.draw_form(f, chunks[0], chunks[1]);
        self.draw_list(f, chunks[2]);
        self.draw_footer(f, chunks[3]);

        if let Some(notice) = &self.notice {
            self.draw_notice(f, notice);
        }
    }

    fn draw_form(&self, f: &mut Frame, top: Rect, bottom: Rect) {
        let top_cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(top);
        let bottom_cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(bottom);

        self.draw_input(f, top_cells[0], "Title", &self.form.title, Focus::Title);
        self.draw_input(
            f,
            top_cells[1],
            "Category",
            &self.form.category,
            Focus::Category,
        );
        self.draw_input(
            f,
            bottom_cells[0],
            "Due YYYY-MM-DD (optional)",
            &self.form.due_date,
            Focus::Due,
        );
        self.draw_input(
            f,
            bottom_cells[1],
            "Priority (High/Medium/Low)",
            &self.form.priority,
            Focus::Priority,
        );
    }

    fn draw_input(&self, f: &mut Frame, area: Rect, title: &str, value: &str, field: Focus) {
        let focused = self.focus == field;
        let text = if focused {
            format!("{value}▌")
        } else {
            value.to_string()
        };
        let input = Paragraph::new(text).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        );
        f.render_widget(input, area);
    }

    fn draw_list(&self, f: &mut Frame, area: Rect) {
        let rows = task_rows(&self.tasks);
        let items: Vec<ListItem> = if rows.is_empty() {
            vec![ListItem::new(Span::styled(
                "No tasks yet.",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            rows.iter()
                .map(|row| {
                    let marker_style = if row.completed {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::Yellow)
                    };
                    let title_style = if row.completed {
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{}. ", row.display_index)),
                        Span::styled(row.marker, marker_style),
                        Span::styled(format!(" {}", row.title), title_style),
                        Span::raw(format!(" ({})", row.category)),
                        Span::styled(
                            format!("  Due: {}  {}", row.due, row.priority),
                            Style::default().fg(Color::Gray),
                        ),
                    ]))
                })
                .collect()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Tasks")
                    .borders(Borders::ALL)
                    .border_style(if self.focus == Focus::List {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if self.focus == Focus::List && !self.tasks.is_empty() {
            state.select(Some(self.selected));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let line = match self.focus {
            Focus::List => Line::from(vec![
                Span::styled("↑↓", Style::default().fg(Color::LightCyan)),
                Span::raw(" select  "),
                Span::styled("c", Style::default().fg(Color::LightGreen)),
                Span::raw(" complete  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
                Span::styled("r", Style::default().fg(Color::LightCyan)),
                Span::raw(" refresh  "),
                Span::styled("x", Style::default().fg(Color::LightYellow)),
                Span::raw(" export  "),
                Span::styled("a", Style::default().fg(Color::LightMagenta)),
                Span::raw(" add  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
            _ => Line::from(vec![
                Span::styled("Tab", Style::default().fg(Color::LightCyan)),
                Span::raw(" next field  "),
                Span::styled("Enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" add task  "),
                Span::styled("Esc", Style::default().fg(Color::LightRed)),
                Span::raw(" back to list"),
            ]),
        };
        let help = Paragraph::new(line).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help, area);
    }

    fn draw_notice(&self, f: &mut Frame, notice: &Notice) {
        let accent = match notice.kind {
            NoticeKind::Info => Color::Cyan,
            NoticeKind::Error => Color::LightRed,
        };
        let area = centered_rect(60, 30, f.area());
        let body = vec![
            Line::from(notice.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to dismiss",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        notice.title.clone(),
                        Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> App {
        let store = TaskStore::new(dir.path().join("tasks.json"));
        store.ensure_exists().unwrap();
        App::new(store)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn focus_cycles_through_fields_and_list() {
        assert_eq!(Focus::Title.next(), Focus::Category);
        assert_eq!(Focus::Priority.next(), Focus::List);
        assert_eq!(Focus::List.next(), Focus::Title);
        assert_eq!(Focus::Title.prev(), Focus::List);
        assert_eq!(Focus::List.prev(), Focus::Priority);
    }

    #[test]
    fn typing_enter_appends_and_clears_the_form() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].title, "Buy milk");
        assert!(app.form.title.is_empty());
        assert!(app.notice.is_none());
    }

    #[test]
    fn empty_title_submit_raises_a_modal_notice() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        press(&mut app, KeyCode::Enter);
        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.message, "Title cannot be empty.");
        assert!(app.tasks.is_empty());

        // Modal: an unrelated key changes nothing, Enter dismisses.
        press(&mut app, KeyCode::Char('z'));
        assert!(app.notice.is_some());
        press(&mut app, KeyCode::Enter);
        assert!(app.notice.is_none());
        assert!(app.form.title.is_empty());
    }

    #[test]
    fn list_keys_complete_and_delete_the_selected_row() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        type_text(&mut app, "first");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "second");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::List);

        press(&mut app, KeyCode::Char('c'));
        assert!(app.tasks[0].completed);
        assert!(!app.tasks[1].completed);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].title, "second");
        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.message, "Removed: first");
    }

    #[test]
    fn selection_is_clamped_after_deletes() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        type_text(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "b");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected, 1);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter); // dismiss the confirmation
        assert_eq!(app.selected, 0);
        assert_eq!(app.tasks.len(), 1);
    }

    #[test]
    fn delete_on_an_empty_list_reports_invalid_index() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('d'));
        let notice = app.notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Invalid task index.");
    }
}
