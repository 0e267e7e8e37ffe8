// Bridges user actions to the store and keeps the presented list in sync

use crate::store::TaskStore;
use crate::task::{AddOutcome, DeleteOutcome, InsertOutcome, TaskStatus, TaskView, ToggleOutcome};
use eyre::Result;
use tracing::{debug, warn};

/// Presentation layer driven by the controller
pub trait Presenter {
    /// Clear the text input the last task was typed into
    fn clear_input(&mut self);

    /// Replace the displayed list with `tasks`
    fn show(&mut self, tasks: &[TaskView]) -> Result<()>;
}

/// Validates input, calls the store, and republishes the full list after
/// every mutation
pub struct TaskListController<'s, P: Presenter> {
    store: &'s mut TaskStore,
    presenter: P,
}

impl<'s, P: Presenter> TaskListController<'s, P> {
    pub fn new(store: &'s mut TaskStore, presenter: P) -> Self {
        Self { store, presenter }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Add a task from raw user input
    ///
    /// Blank input is rejected without touching the store or refreshing.
    /// Anything else is stored exactly as typed.
    pub fn add(&mut self, text: &str) -> Result<AddOutcome> {
        if text.trim().is_empty() {
            warn!("Task cannot be empty");
            return Ok(AddOutcome::Rejected);
        }

        let outcome = match self.store.insert(text, TaskStatus::Incomplete)? {
            InsertOutcome::Inserted => AddOutcome::Added,
            InsertOutcome::Duplicate => AddOutcome::Duplicate,
        };

        self.presenter.clear_input();
        self.refresh()?;

        Ok(outcome)
    }

    pub fn toggle(&mut self, id: i64) -> Result<ToggleOutcome> {
        let outcome = self.store.toggle_status(id)?;
        self.refresh()?;
        Ok(outcome)
    }

    /// Delete a task; the list is refreshed whether or not it existed
    pub fn remove(&mut self, id: i64) -> Result<DeleteOutcome> {
        let outcome = self.store.delete(id)?;
        self.refresh()?;
        Ok(outcome)
    }

    /// Re-read every task and hand the whole list to the presenter
    pub fn refresh(&mut self) -> Result<()> {
        let views: Vec<TaskView> = self.store.list_all()?.into_iter().map(TaskView::from).collect();
        debug!(count = views.len(), "Refreshing task list");
        self.presenter.show(&views)
    }
}
