use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::Priority;
use crate::app::store::TaskStore;

// State for the new-task input: pending title text and pending priority.
#[derive(Default)]
pub struct TaskForm {
    pub title: String,
    pub priority: Priority,
}

impl TaskForm {
    pub fn input(&mut self, c: char) {
        self.title.push(c);
    }

    pub fn backspace(&mut self) {
        self.title.pop();
    }

    pub fn next_priority(&mut self) {
        self.priority = self.priority.next();
    }

    pub fn previous_priority(&mut self) {
        self.priority = self.priority.previous();
    }

    // Hand the pending input to the store. The fields reset only once the
    // backend has confirmed the new row; on failure the typed input stays put,
    // and an empty title never leaves the form at all.
    pub fn submit(&mut self, store: &mut TaskStore) {
        if self.title.trim().is_empty() {
            return;
        }
        if store.create(&self.title, self.priority) {
            self.title.clear();
            self.priority = Priority::default();
        }
    }
}

// Build the UI (lines) for the new-task input box
pub fn get_task_form_ui(form: &TaskForm, focused: bool) -> Vec<Line<'static>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

    let mut title_spans = vec![Span::from("Title:    ")];
    if form.title.is_empty() {
        title_spans.push(Span::styled("Enter a new task", GRAY_TEXT));
    } else {
        title_spans.push(Span::from(form.title.clone()));
    }
    if focused {
        title_spans.push(Span::styled(" ", BLACK_ON_WHITE));
    }

    vec![
        Line::from(title_spans),
        Line::from(format!("Priority: < {} >", form.priority)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::api::testing::FakeRemote;
    use crate::app::models::Status;

    fn store_for(remote: &FakeRemote) -> TaskStore<'_> {
        TaskStore::new(remote, "owner-a".to_string())
    }

    #[test]
    fn successful_submit_clears_the_form() {
        let remote = FakeRemote::new();
        let mut store = store_for(&remote);
        let mut form = TaskForm::default();
        for c in "Call Aai".chars() {
            form.input(c);
        }
        form.next_priority();
        assert_eq!(form.priority, Priority::High);

        form.submit(&mut store);

        assert_eq!(form.title, "");
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(store.tasks[0].title, "Call Aai");
        assert_eq!(store.tasks[0].priority, Priority::High);
        assert_eq!(store.tasks[0].status, Status::Pending);
    }

    #[test]
    fn whitespace_submit_is_a_no_op() {
        let remote = FakeRemote::new();
        let mut store = store_for(&remote);
        let mut form = TaskForm::default();
        form.input(' ');
        form.input(' ');

        form.submit(&mut store);

        assert_eq!(form.title, "  ");
        assert!(store.tasks.is_empty());
        assert_eq!(remote.remote_calls.get(), 0);
    }

    #[test]
    fn failed_submit_keeps_the_typed_input() {
        let remote = FakeRemote::new();
        remote.fail_requests.set(true);
        let mut store = store_for(&remote);
        let mut form = TaskForm::default();
        for c in "Buy milk".chars() {
            form.input(c);
        }
        form.previous_priority();

        form.submit(&mut store);

        assert_eq!(form.title, "Buy milk");
        assert_eq!(form.priority, Priority::Low);
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn backspace_edits_the_title() {
        let mut form = TaskForm::default();
        form.input('h');
        form.input('i');
        form.backspace();
        assert_eq!(form.title, "h");
    }
}
