use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::api::Remote;

// Login and signup screens. Both are small vertical forms: a focus index walks
// the fields, typed characters append to the focused one, and submit hands the
// values to the backend. Error messages come back verbatim on an inline line.

pub struct LoginScreen {
    pub email: String,
    pub password: String,
    pub focus: usize,
    pub error: Option<String>,
}

impl LoginScreen {
    pub fn new() -> LoginScreen {
        LoginScreen {
            email: String::new(),
            password: String::new(),
            focus: 0,
            error: None,
        }
    }

    pub fn input(&mut self, c: char) {
        match self.focus {
            0 => self.email.push(c),
            _ => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            0 => self.email.pop(),
            _ => self.password.pop(),
        };
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % 2;
    }

    pub fn previous_field(&mut self) {
        self.focus = (self.focus + 1) % 2;
    }

    // Returns true when a session was established.
    pub fn submit(&mut self, remote: &dyn Remote) -> bool {
        match remote.sign_in(self.email.trim(), &self.password) {
            Ok(()) => {
                self.error = None;
                self.password.clear();
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

pub struct SignupScreen {
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus: usize,
    pub error: Option<String>,
}

impl SignupScreen {
    pub fn new() -> SignupScreen {
        SignupScreen {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: 0,
            error: None,
        }
    }

    pub fn input(&mut self, c: char) {
        match self.focus {
            0 => self.name.push(c),
            1 => self.email.push(c),
            _ => self.password.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            0 => self.name.pop(),
            1 => self.email.pop(),
            _ => self.password.pop(),
        };
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % 3;
    }

    pub fn previous_field(&mut self) {
        self.focus = (self.focus + 2) % 3;
    }

    // Returns true when the account was created. Whether a session exists
    // afterwards is the gate's business, not the form's.
    pub fn submit(&mut self, remote: &dyn Remote) -> bool {
        match remote.sign_up(self.email.trim(), &self.password, self.name.trim()) {
            Ok(()) => {
                self.error = None;
                self.password.clear();
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

struct FieldLine {
    prefix: &'static str,
    placeholder: &'static str,
    value: String,
}

// Shared renderer for the credential forms. The focused field gets a cursor
// block; empty fields show their placeholder in gray.
fn get_fields_ui(fields: Vec<FieldLine>, focus: usize, error: &Option<String>) -> Vec<Line<'static>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

    let mut text = Vec::new();

    for (i, field) in fields.into_iter().enumerate() {
        let mut spans = vec![Span::styled(field.prefix, WHITE_TEXT)];

        if field.value.is_empty() {
            spans.push(Span::styled(field.placeholder, GRAY_TEXT));
        } else {
            spans.push(Span::styled(field.value, WHITE_TEXT));
        }
        if focus == i {
            spans.push(Span::styled(" ", BLACK_ON_WHITE));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw("\n"));
    if let Some(message) = error {
        text.push(Line::from(Span::styled(
            message.clone(),
            Style::new().fg(Color::Red),
        )));
        text.push(Line::raw("\n"));
    }
    text.push(Line::from(Span::styled(
        "Enter - submit, Tab - next field, Esc - back",
        WHITE_TEXT,
    )));

    text
}

fn masked(password: &str) -> String {
    "\u{2022}".repeat(password.chars().count())
}

// Build the UI (lines) for the login form
pub fn get_login_ui(screen: &LoginScreen) -> Vec<Line<'static>> {
    get_fields_ui(
        vec![
            FieldLine {
                prefix: "Email:    ",
                placeholder: "Enter your email",
                value: screen.email.clone(),
            },
            FieldLine {
                prefix: "Password: ",
                placeholder: "Enter your password",
                value: masked(&screen.password),
            },
        ],
        screen.focus,
        &screen.error,
    )
}

// Build the UI (lines) for the signup form
pub fn get_signup_ui(screen: &SignupScreen) -> Vec<Line<'static>> {
    get_fields_ui(
        vec![
            FieldLine {
                prefix: "Name:     ",
                placeholder: "Enter your full name",
                value: screen.name.clone(),
            },
            FieldLine {
                prefix: "Email:    ",
                placeholder: "Enter your email",
                value: screen.email.clone(),
            },
            FieldLine {
                prefix: "Password: ",
                placeholder: "Enter your password",
                value: masked(&screen.password),
            },
        ],
        screen.focus,
        &screen.error,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::api::testing::FakeRemote;

    #[test]
    fn signup_error_is_surfaced_verbatim() {
        let remote = FakeRemote::new();
        *remote.auth_error.borrow_mut() = Some("User already registered".to_string());
        let mut screen = SignupScreen::new();
        screen.focus = 1;
        for c in "ana@example.com".chars() {
            screen.input(c);
        }

        assert!(!screen.submit(&remote));
        assert_eq!(screen.error.as_deref(), Some("User already registered"));
        assert!(remote.get_session().is_none());
    }

    #[test]
    fn successful_signup_establishes_a_session() {
        let remote = FakeRemote::new();
        let mut screen = SignupScreen::new();
        screen.focus = 1;
        for c in "ana@example.com".chars() {
            screen.input(c);
        }

        assert!(screen.submit(&remote));
        assert!(screen.error.is_none());
        assert!(remote.get_session().is_some());
    }

    #[test]
    fn successful_login_establishes_a_session() {
        let remote = FakeRemote::new();
        let mut screen = LoginScreen::new();
        for c in "ana@example.com".chars() {
            screen.input(c);
        }
        screen.next_field();
        for c in "hunter2".chars() {
            screen.input(c);
        }

        assert!(screen.submit(&remote));
        assert_eq!(
            remote.get_session().unwrap().user_id,
            "user-ana@example.com"
        );
    }

    #[test]
    fn failed_login_keeps_the_message_inline() {
        let remote = FakeRemote::new();
        *remote.auth_error.borrow_mut() = Some("Invalid login credentials".to_string());
        let mut screen = LoginScreen::new();

        assert!(!screen.submit(&remote));
        assert_eq!(screen.error.as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn signup_focus_walks_all_three_fields() {
        let mut screen = SignupScreen::new();
        screen.input('a');
        screen.next_field();
        screen.input('b');
        screen.next_field();
        screen.input('c');
        screen.previous_field();
        screen.backspace();

        assert_eq!(screen.name, "a");
        assert_eq!(screen.email, "");
        assert_eq!(screen.password, "c");
    }

    #[test]
    fn passwords_render_masked() {
        assert_eq!(masked("abc"), "\u{2022}\u{2022}\u{2022}");
        assert_eq!(masked(""), "");
    }
}
