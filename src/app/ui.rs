use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::warn;

use crate::app::api::Remote;
use crate::app::auth::{get_login_ui, get_signup_ui, LoginScreen, SignupScreen};
use crate::app::models::{Priority, Status};
use crate::app::store::TaskStore;
use crate::app::task_form::{get_task_form_ui, TaskForm};
use crate::app::task_list::{
    get_instructions_ui, get_list_items_ui, get_statistics_ui, TaskListView, EMPTY_LIST_MESSAGE,
};

// The screens of the app. Dashboard is the only one that needs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFocus {
    Form,
    List,
}

// Everything the dashboard screen owns. Built on entry, dropped on leave, so a
// fresh visit always starts from a fresh fetch.
pub struct Dashboard<'a> {
    pub store: TaskStore<'a>,
    pub form: TaskForm,
    pub list: TaskListView,
    pub focus: DashboardFocus,
}

pub struct App<'a> {
    pub route: Route,
    pub remote: &'a dyn Remote,
    pub login: LoginScreen,
    pub signup: SignupScreen,
    pub dashboard: Option<Dashboard<'a>>,
}

enum DashboardAction {
    None,
    Quit,
    LogOut,
}

impl<'a> App<'a> {
    pub fn new(remote: &'a dyn Remote) -> App<'a> {
        App {
            route: Route::Home,
            remote,
            login: LoginScreen::new(),
            signup: SignupScreen::new(),
            dashboard: None,
        }
    }

    // The authentication gate. Entering the dashboard resolves the session
    // first; without one the user lands on the login screen and no task data
    // is requested. The owner identifier from the session gates the fetch.
    pub fn enter_dashboard(&mut self) {
        match self.remote.get_session() {
            Some(session) => {
                let mut store = TaskStore::new(self.remote, session.user_id);
                store.load();
                self.dashboard = Some(Dashboard {
                    store,
                    form: TaskForm::default(),
                    list: TaskListView::new(),
                    focus: DashboardFocus::Form,
                });
                self.route = Route::Dashboard;
            }
            None => {
                self.dashboard = None;
                self.route = Route::Login;
            }
        }
    }

    pub fn log_out(&mut self) {
        if let Err(e) = self.remote.sign_out() {
            warn!("sign-out failed: {e}");
        }
        self.dashboard = None;
        self.route = Route::Home;
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.route {
                        Route::Home => match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                            KeyCode::Char('l') => app.route = Route::Login,
                            KeyCode::Char('s') => app.route = Route::Signup,
                            KeyCode::Char('d') => {
                                draw_loading(terminal)?;
                                app.enter_dashboard();
                            }
                            _ => {}
                        },
                        Route::Login => match key.code {
                            KeyCode::Esc => app.route = Route::Home,
                            KeyCode::Tab | KeyCode::Down => app.login.next_field(),
                            KeyCode::Up => app.login.previous_field(),
                            KeyCode::Backspace => app.login.backspace(),
                            KeyCode::Enter => {
                                if app.login.submit(app.remote) {
                                    draw_loading(terminal)?;
                                    app.enter_dashboard();
                                }
                            }
                            KeyCode::Char(c) => app.login.input(c),
                            _ => {}
                        },
                        Route::Signup => match key.code {
                            KeyCode::Esc => app.route = Route::Home,
                            KeyCode::Tab | KeyCode::Down => app.signup.next_field(),
                            KeyCode::Up => app.signup.previous_field(),
                            KeyCode::Backspace => app.signup.backspace(),
                            KeyCode::Enter => {
                                if app.signup.submit(app.remote) {
                                    // Head straight for the dashboard; the gate
                                    // bounces to login when signup produced no
                                    // session.
                                    draw_loading(terminal)?;
                                    app.enter_dashboard();
                                }
                            }
                            KeyCode::Char(c) => app.signup.input(c),
                            _ => {}
                        },
                        Route::Dashboard => match handle_dashboard_key(&mut app, key.code) {
                            DashboardAction::Quit => return Ok(()),
                            DashboardAction::LogOut => app.log_out(),
                            DashboardAction::None => {}
                        },
                    }
                }
            }
        }
    }
}

// Key dispatch for the dashboard, split by which pane has focus. Actions that
// outlive the dashboard borrow are returned to the caller.
fn handle_dashboard_key(app: &mut App, code: KeyCode) -> DashboardAction {
    let Some(dash) = app.dashboard.as_mut() else {
        return DashboardAction::None;
    };
    match dash.focus {
        DashboardFocus::Form => match code {
            KeyCode::Tab | KeyCode::Esc => dash.focus = DashboardFocus::List,
            KeyCode::Enter => dash.form.submit(&mut dash.store),
            KeyCode::Left => dash.form.previous_priority(),
            KeyCode::Right => dash.form.next_priority(),
            KeyCode::Backspace => dash.form.backspace(),
            KeyCode::Char(c) => dash.form.input(c),
            _ => {}
        },
        DashboardFocus::List => match code {
            KeyCode::Char('q') => return DashboardAction::Quit,
            KeyCode::Char('o') => return DashboardAction::LogOut,
            KeyCode::Tab => dash.focus = DashboardFocus::Form,
            KeyCode::Down => dash.list.next(dash.store.tasks.len()),
            KeyCode::Up => dash.list.previous(dash.store.tasks.len()),
            KeyCode::Left => dash.list.unselect(),
            KeyCode::Char('x') => dash.list.delete_selected(&mut dash.store),
            KeyCode::Char('r') => dash.store.load(),
            KeyCode::Char('1') => dash.list.set_priority_selected(&mut dash.store, Priority::Low),
            KeyCode::Char('2') => {
                dash.list.set_priority_selected(&mut dash.store, Priority::Medium)
            }
            KeyCode::Char('3') => dash.list.set_priority_selected(&mut dash.store, Priority::High),
            KeyCode::Char('p') => dash.list.set_status_selected(&mut dash.store, Status::Pending),
            KeyCode::Char('i') => {
                dash.list.set_status_selected(&mut dash.store, Status::InProgress)
            }
            KeyCode::Char('c') => dash.list.set_status_selected(&mut dash.store, Status::Done),
            _ => {}
        },
    }
    DashboardAction::None
}

// One static frame shown while the session check and initial fetch run.
fn draw_loading<B: Backend>(terminal: &mut Terminal<B>) -> io::Result<()> {
    terminal.draw(|f| {
        let loading = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("taskdeck"));
        f.render_widget(loading, f.size());
    })?;
    Ok(())
}

// Draws the whole user interface for the current route
fn draw_ui(f: &mut Frame, app: &mut App) {
    match app.route {
        Route::Home => draw_home(f),
        Route::Login => draw_form_screen(f, "Login", get_login_ui(&app.login)),
        Route::Signup => draw_form_screen(f, "Create Account", get_signup_ui(&app.signup)),
        Route::Dashboard => draw_dashboard(f, app),
    }
}

fn draw_home(f: &mut Frame) {
    let lines = vec![
        Line::from("Welcome to taskdeck"),
        Line::raw("\n"),
        Line::from("l - log in"),
        Line::from("s - sign up"),
        Line::from("d - go to dashboard"),
        Line::from("q - quit"),
    ];
    let menu = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("taskdeck"));
    f.render_widget(menu, centered_rect(50, 50, f.size()));
}

fn draw_form_screen(f: &mut Frame, title: &str, lines: Vec<Line<'static>>) {
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::new().white());
    f.render_widget(form, centered_rect(60, 50, f.size()));
}

fn draw_dashboard(f: &mut Frame, app: &mut App) {
    let Some(dash) = app.dashboard.as_mut() else {
        return;
    };

    // Two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(f.size());

    // DRAW LEFT PART: the task rows, or the empty-state message
    if dash.store.tasks.is_empty() {
        let empty = Paragraph::new(EMPTY_LIST_MESSAGE)
            .block(Block::default().borders(Borders::ALL).title("Your Tasks"))
            .style(Style::new().white());
        f.render_widget(empty, chunks[0]);
    } else {
        let task_list = List::new(get_list_items_ui(dash.store.tasks.as_slice()))
            .block(Block::default().borders(Borders::ALL).title("Your Tasks"))
            .highlight_style(
                Style::default()
                    .bg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");
        f.render_stateful_widget(task_list, chunks[0], &mut dash.list.state);
    }

    // DRAW RIGHT PART: new-task input on top, statistics and commands below
    let right_side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(10),
        ])
        .split(chunks[1]);

    let form_focused = dash.focus == DashboardFocus::Form;
    let form_block = Block::new().title("New Task").borders(Borders::ALL).border_style(
        if form_focused {
            Style::new().fg(Color::LightGreen)
        } else {
            Style::new().white()
        },
    );
    let new_task = Paragraph::new(get_task_form_ui(&dash.form, form_focused))
        .block(form_block)
        .style(Style::new().white());
    f.render_widget(new_task, right_side[0]);

    let statistics = Paragraph::new(get_statistics_ui(&dash.store))
        .block(Block::new().title("Statistics").borders(Borders::ALL))
        .style(Style::new().white());
    f.render_widget(statistics, right_side[1]);

    let instructions = Paragraph::new(get_instructions_ui())
        .block(Block::new().title("Commands").borders(Borders::ALL))
        .style(Style::new().white());
    f.render_widget(instructions, right_side[2]);
}

// A centered sub-rectangle, percent_x by percent_y of the given area
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
