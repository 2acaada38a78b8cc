//! Approval Queue (§4.5): a thin projection over the task collection. Both
//! operations are the sole legal writers into the `awaiting_approval` →
//! {building, failed} transitions for externally-blocked tasks.

use crate::domain::{Task, TaskState};
use crate::errors::PreconditionError;
use crate::store::Store;

pub async fn list_awaiting_approval(store: &dyn Store) -> Vec<Task> {
    store
        .list_tasks()
        .await
        .into_iter()
        .filter(|t| t.state == TaskState::AwaitingApproval)
        .collect()
}

pub async fn approve(store: &dyn Store, task_id: &str) -> Result<Task, PreconditionError> {
    let mut task = store
        .get_task(task_id)
        .await
        .filter(|t| t.state == TaskState::AwaitingApproval)
        .ok_or(PreconditionError::NotAwaitingApproval)?;
    task.transition(TaskState::Building);
    store.save_task(&task).await;
    Ok(task)
}

pub async fn reject(
    store: &dyn Store,
    task_id: &str,
    reason: Option<String>,
) -> Result<Task, PreconditionError> {
    let mut task = store
        .get_task(task_id)
        .await
        .filter(|t| t.state == TaskState::AwaitingApproval)
        .ok_or(PreconditionError::NotAwaitingApproval)?;
    task.transition(TaskState::Failed);
    task.error = reason.or_else(|| Some("rejected".to_string()));
    store.save_task(&task).await;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AutonomyTier;
    use crate::store::MemoryStore;

    fn awaiting_task() -> Task {
        Task::new(
            "o1",
            "c1",
            "Deploy to production",
            "desc",
            AutonomyTier::T2,
            5.0,
            TaskState::AwaitingApproval,
        )
    }

    #[tokio::test]
    async fn approve_moves_task_to_building() {
        let store = MemoryStore::default();
        let task = awaiting_task();
        store.save_task(&task).await;

        let approved = approve(&store, &task.id).await.unwrap();
        assert_eq!(approved.state, TaskState::Building);
    }

    #[tokio::test]
    async fn reject_moves_task_to_failed_with_reason() {
        let store = MemoryStore::default();
        let task = awaiting_task();
        store.save_task(&task).await;

        let rejected = reject(&store, &task.id, Some("too risky".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.state, TaskState::Failed);
        assert_eq!(rejected.error.as_deref(), Some("too risky"));
    }

    #[tokio::test]
    async fn approve_fails_when_task_not_awaiting_approval() {
        let store = MemoryStore::default();
        let mut task = awaiting_task();
        task.transition(TaskState::Building);
        store.save_task(&task).await;

        let err = approve(&store, &task.id).await.unwrap_err();
        assert!(matches!(err, PreconditionError::NotAwaitingApproval));
    }

    #[tokio::test]
    async fn list_awaiting_approval_filters_other_states() {
        let store = MemoryStore::default();
        store.save_task(&awaiting_task()).await;
        let mut building = awaiting_task();
        building.id = crate::domain::new_id();
        building.transition(TaskState::Building);
        store.save_task(&building).await;

        let pending = list_awaiting_approval(&store).await;
        assert_eq!(pending.len(), 1);
    }
}
