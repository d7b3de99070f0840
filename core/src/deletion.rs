//! Optimistic deletion state for the todo list.
//!
//! # Design
//! Each todo moves through `Idle -> Deleting -> Removed | Failed`. The list
//! that gets rendered is always reduced from the last server page plus these
//! markers; nothing edits the server page in place. A `Removed` marker only
//! lives until the next re-fetch, at which point the fresh page is the source
//! of truth again.

use std::collections::HashMap;

use thiserror::Error;

use crate::pagination::PaginationState;
use crate::types::{PaginatedTodos, Todo, TodoId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeletionState {
    #[default]
    Idle,
    Deleting,
    Removed,
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeletionError {
    #[error("todo {0} is already being deleted")]
    AlreadyInFlight(TodoId),
    #[error("todo {0} has no deletion in flight")]
    NotInFlight(TodoId),
}

/// Deletion markers keyed by todo id. Absent ids are `Idle`.
#[derive(Debug, Clone, Default)]
pub struct DeletionTracker {
    states: HashMap<TodoId, DeletionState>,
}

impl DeletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: TodoId) -> DeletionState {
        self.states.get(&id).cloned().unwrap_or_default()
    }

    pub fn begin(&mut self, id: TodoId) -> Result<(), DeletionError> {
        match self.states.get(&id) {
            Some(DeletionState::Deleting) => Err(DeletionError::AlreadyInFlight(id)),
            _ => {
                self.states.insert(id, DeletionState::Deleting);
                Ok(())
            }
        }
    }

    pub fn settle(&mut self, id: TodoId, outcome: Result<(), String>) -> Result<(), DeletionError> {
        match self.states.get_mut(&id) {
            Some(state) if *state == DeletionState::Deleting => {
                *state = match outcome {
                    Ok(()) => DeletionState::Removed,
                    Err(reason) => DeletionState::Failed { reason },
                };
                Ok(())
            }
            _ => Err(DeletionError::NotInFlight(id)),
        }
    }

    /// Drop every failure marker once it has been shown.
    pub fn acknowledge_failures(&mut self) {
        self.states
            .retain(|_, state| !matches!(state, DeletionState::Failed { .. }));
    }

    /// Apply a freshly fetched page.
    pub fn reconcile(&mut self, page: &PaginatedTodos) {
        self.states.retain(|id, state| match state {
            DeletionState::Removed | DeletionState::Idle => false,
            DeletionState::Failed { .. } => page.contains(*id),
            DeletionState::Deleting => true,
        });
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus<'a> {
    Ready,
    Deleting,
    Failed(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoRow<'a> {
    pub todo: &'a Todo,
    pub status: RowStatus<'a>,
}

/// What the list component renders: server rows minus local removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListView<'a> {
    pub rows: Vec<TodoRow<'a>>,
    pub pagination: PaginationState,
}

impl<'a> TodoListView<'a> {
    pub fn reduce(page: &'a PaginatedTodos, tracker: &'a DeletionTracker) -> Self {
        let rows = page
            .data
            .iter()
            .filter_map(|todo| {
                let status = match tracker.states.get(&todo.id) {
                    Some(DeletionState::Removed) => return None,
                    Some(DeletionState::Deleting) => RowStatus::Deleting,
                    Some(DeletionState::Failed { reason }) => RowStatus::Failed(reason),
                    Some(DeletionState::Idle) | None => RowStatus::Ready,
                };
                Some(TodoRow { todo, status })
            })
            .collect();
        Self {
            rows,
            pagination: page.pagination(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: TodoId) -> Todo {
        Todo {
            id,
            title: format!("todo {id}"),
            description: None,
            file_path: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn page(ids: &[TodoId]) -> PaginatedTodos {
        let mut page = PaginatedTodos::empty(10);
        page.data = ids.iter().copied().map(todo).collect();
        page.total = ids.len() as u64;
        page.from = Some(1);
        page.to = Some(ids.len() as u64);
        page
    }

    #[test]
    fn successful_deletion_hides_the_row() {
        let page = page(&[1, 2, 3]);
        let mut tracker = DeletionTracker::new();
        tracker.begin(2).unwrap();
        assert_eq!(tracker.state(2), DeletionState::Deleting);

        let view = TodoListView::reduce(&page, &tracker);
        assert_eq!(view.rows[1].status, RowStatus::Deleting);

        tracker.settle(2, Ok(())).unwrap();
        let view = TodoListView::reduce(&page, &tracker);
        let ids: Vec<_> = view.rows.iter().map(|row| row.todo.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn failed_deletion_keeps_the_row_with_a_reason() {
        let page = page(&[1, 2]);
        let mut tracker = DeletionTracker::new();
        tracker.begin(1).unwrap();
        tracker.settle(1, Err("Failed to delete todo".to_string())).unwrap();

        let view = TodoListView::reduce(&page, &tracker);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].status, RowStatus::Failed("Failed to delete todo"));
        assert!(matches!(tracker.state(1), DeletionState::Failed { .. }));
    }

    #[test]
    fn double_begin_is_rejected() {
        let mut tracker = DeletionTracker::new();
        tracker.begin(5).unwrap();
        assert_eq!(tracker.begin(5), Err(DeletionError::AlreadyInFlight(5)));
    }

    #[test]
    fn settling_without_begin_is_rejected() {
        let mut tracker = DeletionTracker::new();
        assert_eq!(tracker.settle(9, Ok(())), Err(DeletionError::NotInFlight(9)));
        tracker.begin(9).unwrap();
        tracker.settle(9, Ok(())).unwrap();
        assert_eq!(tracker.settle(9, Ok(())), Err(DeletionError::NotInFlight(9)));
    }

    #[test]
    fn failed_deletion_can_be_retried() {
        let mut tracker = DeletionTracker::new();
        tracker.begin(3).unwrap();
        tracker.settle(3, Err("offline".to_string())).unwrap();
        tracker.begin(3).unwrap();
        assert_eq!(tracker.state(3), DeletionState::Deleting);
    }

    #[test]
    fn reconcile_trusts_the_fresh_page() {
        let mut tracker = DeletionTracker::new();
        tracker.begin(1).unwrap();
        tracker.settle(1, Ok(())).unwrap();
        tracker.begin(2).unwrap();
        tracker.settle(2, Err("nope".to_string())).unwrap();
        tracker.begin(3).unwrap();
        tracker.settle(3, Err("gone".to_string())).unwrap();
        tracker.begin(4).unwrap();

        // Todo 1 is still on the server: the removal marker must not hide it.
        let fresh = page(&[1, 2, 4]);
        tracker.reconcile(&fresh);

        assert_eq!(tracker.state(1), DeletionState::Idle);
        assert!(matches!(tracker.state(2), DeletionState::Failed { .. }));
        assert_eq!(tracker.state(3), DeletionState::Idle);
        assert_eq!(tracker.state(4), DeletionState::Deleting);

        let view = TodoListView::reduce(&fresh, &tracker);
        assert_eq!(view.rows.len(), 3);
    }

    #[test]
    fn acknowledging_clears_only_failures() {
        let mut tracker = DeletionTracker::new();
        for id in [1, 2] {
            tracker.begin(id).unwrap();
            tracker.settle(id, Err("x".to_string())).unwrap();
        }
        tracker.begin(3).unwrap();
        tracker.acknowledge_failures();
        assert_eq!(tracker.state(1), DeletionState::Idle);
        assert_eq!(tracker.state(2), DeletionState::Idle);
        assert_eq!(tracker.state(3), DeletionState::Deleting);
    }
}
