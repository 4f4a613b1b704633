use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::{Priority, Status, Task, TaskId};
use crate::app::store::TaskStore;

pub const EMPTY_LIST_MESSAGE: &str = "No tasks yet. Add one below.";

// Selection state over the task rows. The rows themselves live in the store;
// this only tracks which one the cursor is on.
pub struct TaskListView {
    pub state: ListState,
}

impl TaskListView {
    pub fn new() -> TaskListView {
        TaskListView {
            state: ListState::default(),
        }
    }

    // Move the selection to the next item
    pub fn next(&mut self, len: usize) {
        let i = match self.state.selected() {
            Some(i) => {
                if len == 0 || i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item
    pub fn previous(&mut self, len: usize) {
        let i = match self.state.selected() {
            Some(i) => {
                if len == 0 {
                    0
                } else if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn selected_id(&self, tasks: &[Task]) -> Option<TaskId> {
        self.state
            .selected()
            .and_then(|i| tasks.get(i))
            .map(|task| task.id)
    }

    // Set the status of the selected task. Any value is directly settable from
    // any other; there is no enforced progression.
    pub fn set_status_selected(&self, store: &mut TaskStore, status: Status) {
        if let Some(id) = self.selected_id(&store.tasks) {
            store.update_status(id, status);
        }
    }

    pub fn set_priority_selected(&self, store: &mut TaskStore, priority: Priority) {
        if let Some(id) = self.selected_id(&store.tasks) {
            store.update_priority(id, priority);
        }
    }

    // Delete the selected task, then keep the cursor on a valid row.
    pub fn delete_selected(&mut self, store: &mut TaskStore) {
        if let Some(id) = self.selected_id(&store.tasks) {
            store.delete(id);
        }
        match self.state.selected() {
            Some(_) if store.tasks.is_empty() => self.state.select(None),
            Some(i) if i >= store.tasks.len() => self.state.select(Some(store.tasks.len() - 1)),
            _ => {}
        }
    }
}

// Color coding is a pure function of the enumerated value.
pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::White,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => Color::DarkGray,
        Status::InProgress => Color::Cyan,
        Status::Done => Color::Green,
    }
}

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Pending => "[ ] ",
        Status::InProgress => "[~] ",
        Status::Done => "[x] ",
    }
}

// Build the UI (list) for the task rows, newest first as the store keeps them
pub fn get_list_items_ui(tasks: &[Task]) -> Vec<ListItem<'_>> {
    tasks
        .iter()
        .map(|task| {
            let mut lines = Vec::new();

            lines.push(Line::from(vec![
                Span::from(status_marker(task.status)),
                Span::from(task.title.as_str()).fg(priority_color(task.priority)),
            ]));

            lines.push(Line::from(vec![
                Span::styled(
                    format!("    {}", task.status),
                    Style::default().fg(status_color(task.status)),
                ),
                Span::from(format!("  priority: {}", task.priority)),
                Span::from(format!("  added {}", task.created_at.format("%d.%m.%Y"))),
            ]));

            ListItem::new(lines).style(Style::default().fg(Color::White))
        })
        .collect()
}

// Build the UI (lines) for the statistics infobox. Plain counts over the local
// list, nothing is fetched for this.
pub fn get_statistics_ui(store: &TaskStore) -> Vec<Line<'static>> {
    vec![
        Line::from(format!("Total tasks: {}", store.tasks.len())),
        Line::from(format!(
            "Pending: {}",
            store.count_with_status(Status::Pending)
        )),
        Line::from(format!(
            "In progress: {}",
            store.count_with_status(Status::InProgress)
        )),
        Line::from(format!("Done: {}", store.count_with_status(Status::Done))),
    ]
}

// Build the UI (lines) for the commands infobox
pub fn get_instructions_ui() -> Vec<Line<'static>> {
    vec![
        "Up/Down - select a task".into(),
        "1/2/3 - priority low/medium/high".into(),
        "p/i/c - pending/in progress/done".into(),
        "x - delete the selected task".into(),
        "r - reload from the server".into(),
        "Tab - switch list/input".into(),
        "o - log out".into(),
        "q - quit".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::api::testing::FakeRemote;

    fn seeded_store<'a>(remote: &'a FakeRemote, titles: &[&str]) -> TaskStore<'a> {
        let mut store = TaskStore::new(remote, "owner-a".to_string());
        for title in titles {
            store.create(title, Priority::Medium);
        }
        store
    }

    #[test]
    fn selection_wraps_around_both_ways() {
        let mut view = TaskListView::new();
        view.next(3);
        assert_eq!(view.state.selected(), Some(0));
        view.previous(3);
        assert_eq!(view.state.selected(), Some(2));
        view.next(3);
        assert_eq!(view.state.selected(), Some(0));
        view.unselect();
        assert_eq!(view.state.selected(), None);
    }

    #[test]
    fn row_controls_target_the_selected_task_only() {
        let remote = FakeRemote::new();
        let mut store = seeded_store(&remote, &["one", "two", "three"]);
        let mut view = TaskListView::new();
        view.next(store.tasks.len());
        view.next(store.tasks.len());

        view.set_status_selected(&mut store, Status::Done);
        view.set_priority_selected(&mut store, Priority::High);

        assert_eq!(store.tasks[1].status, Status::Done);
        assert_eq!(store.tasks[1].priority, Priority::High);
        assert_eq!(store.tasks[0].status, Status::Pending);
        assert_eq!(store.tasks[2].status, Status::Pending);
    }

    #[test]
    fn row_controls_without_a_selection_do_nothing() {
        let remote = FakeRemote::new();
        let mut store = seeded_store(&remote, &["one"]);
        let calls_before = remote.remote_calls.get();
        let view = TaskListView::new();

        view.set_status_selected(&mut store, Status::Done);
        view.set_priority_selected(&mut store, Priority::Low);

        assert_eq!(remote.remote_calls.get(), calls_before);
        assert_eq!(store.tasks[0].status, Status::Pending);
    }

    #[test]
    fn deleting_the_last_row_moves_the_cursor_up() {
        let remote = FakeRemote::new();
        let mut store = seeded_store(&remote, &["one", "two"]);
        let mut view = TaskListView::new();
        view.next(store.tasks.len());
        view.previous(store.tasks.len());
        assert_eq!(view.state.selected(), Some(1));

        view.delete_selected(&mut store);
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(view.state.selected(), Some(0));

        view.delete_selected(&mut store);
        assert!(store.tasks.is_empty());
        assert_eq!(view.state.selected(), None);
    }

    #[test]
    fn empty_list_builds_no_rows() {
        assert!(get_list_items_ui(&[]).is_empty());
    }
}
