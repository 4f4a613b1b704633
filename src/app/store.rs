use tracing::warn;

use crate::app::api::Remote;
use crate::app::models::{NewTask, Priority, Status, Task, TaskId, TaskPatch};

// Owns the task rows shown on the dashboard and keeps them in line with the
// backend. Local state changes only after the backend confirms a mutation, so
// a failed call leaves the last known-good list in place; failures are logged
// and never surfaced.
pub struct TaskStore<'a> {
    remote: &'a dyn Remote,
    owner_id: String,
    pub tasks: Vec<Task>,
}

impl<'a> TaskStore<'a> {
    pub fn new(remote: &'a dyn Remote, owner_id: String) -> TaskStore<'a> {
        TaskStore {
            remote,
            owner_id,
            tasks: Vec::new(),
        }
    }

    // Fetch everything the owner has, newest first, replacing the local list.
    pub fn load(&mut self) {
        match self.remote.list_tasks(&self.owner_id) {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => warn!("failed to load tasks: {e}"),
        }
    }

    // Create a task with the given title and priority. Whitespace-only titles
    // are dropped before any request goes out. Returns whether the list changed,
    // which is what the form uses to decide whether to clear its input.
    pub fn create(&mut self, title: &str, priority: Priority) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let new_task = NewTask {
            owner_id: self.owner_id.clone(),
            title: title.to_string(),
            priority,
            status: Status::Pending,
        };
        match self.remote.insert_task(&new_task) {
            Ok(task) => {
                // Prepend to keep newest-first without another fetch.
                self.tasks.insert(0, task);
                true
            }
            Err(e) => {
                warn!("failed to create task: {e}");
                false
            }
        }
    }

    pub fn delete(&mut self, id: TaskId) {
        match self.remote.delete_task(id) {
            Ok(()) => self.tasks.retain(|task| task.id != id),
            Err(e) => warn!(task = id, "failed to delete task: {e}"),
        }
    }

    pub fn update_status(&mut self, id: TaskId, status: Status) {
        match self.remote.update_task(id, &TaskPatch::status(status)) {
            Ok(()) => self.patch_local(id, |task| task.status = status),
            Err(e) => warn!(task = id, "failed to update status: {e}"),
        }
    }

    pub fn update_priority(&mut self, id: TaskId, priority: Priority) {
        match self.remote.update_task(id, &TaskPatch::priority(priority)) {
            Ok(()) => self.patch_local(id, |task| task.priority = priority),
            Err(e) => warn!(task = id, "failed to update priority: {e}"),
        }
    }

    fn patch_local(&mut self, id: TaskId, apply: impl FnOnce(&mut Task)) {
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            apply(task);
        }
    }

    pub fn count_with_status(&self, status: Status) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .count()
    }
}
