//! Activities written by task commands, read back through the query
//! service.

use crate::in_memory::helpers::{Trail, actions, as_user, trail};
use rstest::rstest;
use serde_json::json;
use tasktrail::activity::{domain::ActivityAction, services::ActivityQueryError};
use tasktrail::context::ActorContext;
use tasktrail::pagination::PageRequest;
use tasktrail::task::services::UpdateTaskRequest;
use tasktrail::user::domain::Role;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn saving_unchanged_fields_records_nothing(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let task = trail.task(&admin, "Tidy backlog", &[]).await?;

    trail
        .state
        .tasks
        .update(&as_user(&admin), task.id(), UpdateTaskRequest::new())
        .await?;
    trail
        .state
        .tasks
        .update(
            &as_user(&admin),
            task.id(),
            UpdateTaskRequest::new()
                .with_title("Tidy backlog")
                .with_priority("medium"),
        )
        .await?;

    let history = trail.history(&admin, task.id()).await?;
    assert_eq!(actions(&history), vec![ActivityAction::Created]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_records_old_and_new_values(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let task = trail.task(&admin, "Ship release", &[]).await?;

    trail
        .state
        .tasks
        .update_status(&as_user(&admin), task.id(), "in_progress")
        .await?;

    let history = trail.history(&admin, task.id()).await?;
    let latest = history
        .first()
        .ok_or_else(|| eyre::eyre!("expected a recorded activity"))?;
    let activity = &latest.entry.activity;
    assert_eq!(activity.action(), ActivityAction::StatusChanged);
    assert_eq!(
        activity.description(),
        "Task \"Ship release\": Status changed from 'pending' to 'in_progress'"
    );
    let changes = activity
        .changes()
        .ok_or_else(|| eyre::eyre!("status change carries changes"))?;
    assert_eq!(
        changes.get("status"),
        Some(&json!({ "old": "pending", "new": "in_progress" }))
    );
    assert_eq!(latest.actor.as_ref().map(|user| user.id()), Some(admin.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edits_to_other_fields_record_an_update(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let task = trail.task(&admin, "Draft plan", &[]).await?;

    trail
        .state
        .tasks
        .update(
            &as_user(&admin),
            task.id(),
            UpdateTaskRequest::new()
                .with_priority("high")
                .with_description("Cover Q3 goals"),
        )
        .await?;

    let history = trail.history(&admin, task.id()).await?;
    let latest = history
        .first()
        .ok_or_else(|| eyre::eyre!("expected a recorded activity"))?;
    let activity = &latest.entry.activity;
    assert_eq!(activity.action(), ActivityAction::Updated);
    assert_eq!(
        activity.description(),
        "Task \"Draft plan\": Priority changed from 'medium' to 'high', Description updated"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletion_keeps_snapshot_after_task_is_gone(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let task = trail.task(&admin, "Archive logs", &[]).await?;

    trail.state.tasks.delete(&as_user(&admin), task.id()).await?;

    let history = trail.history(&admin, task.id()).await?;
    assert_eq!(
        actions(&history),
        vec![ActivityAction::Deleted, ActivityAction::Created]
    );
    for view in &history {
        let activity = &view.entry.activity;
        assert_eq!(activity.task(), None, "task reference is nulled");
        assert_eq!(activity.snapshot().task_id, task.id());
        assert_eq!(activity.snapshot().task_title, "Archive logs");
        assert!(view.entry.task_info.deleted);
        assert_eq!(view.entry.task_info.title, "Archive logs");
    }
    let deleted = history
        .first()
        .ok_or_else(|| eyre::eyre!("expected the deletion activity"))?;
    assert_eq!(deleted.entry.activity.description(), "Task \"Archive logs\" was deleted");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignment_changes_are_recorded(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let alice = trail.account("alice", Role::Staff).await?;
    let task = trail.task(&admin, "Review budget", &[]).await?;

    trail
        .state
        .tasks
        .assign(&as_user(&admin), task.id(), &[alice.id()])
        .await?;
    trail
        .state
        .tasks
        .assign(&as_user(&admin), task.id(), &[alice.id()])
        .await?;
    trail
        .state
        .tasks
        .unassign(&as_user(&admin), task.id(), &[alice.id()])
        .await?;

    let history = trail.history(&admin, task.id()).await?;
    assert_eq!(
        actions(&history),
        vec![
            ActivityAction::Unassigned,
            ActivityAction::Assigned,
            ActivityAction::Created,
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_count_each_action(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let first = trail.task(&admin, "First", &[]).await?;
    trail.task(&admin, "Second", &[]).await?;
    trail
        .state
        .tasks
        .update_status(&as_user(&admin), first.id(), "completed")
        .await?;

    let stats = trail.state.activities.stats(&as_user(&admin)).await?;

    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_action.get(&ActivityAction::Created), Some(&2));
    assert_eq!(stats.by_action.get(&ActivityAction::StatusChanged), Some(&1));
    assert_eq!(stats.by_action.get(&ActivityAction::Deleted), None);
    assert_eq!(stats.recent.len(), 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activities_cannot_be_mutated_directly(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let task = trail.task(&admin, "Immutable", &[]).await?;
    let history = trail.history(&admin, task.id()).await?;
    let created = history
        .first()
        .ok_or_else(|| eyre::eyre!("expected the creation activity"))?;
    let id = created.entry.activity.id();
    let context = as_user(&admin);

    assert!(matches!(
        trail.state.activities.create(&context),
        Err(ActivityQueryError::RecordImmutable)
    ));
    assert!(matches!(
        trail.state.activities.update(&context, id),
        Err(ActivityQueryError::RecordImmutable)
    ));
    assert!(matches!(
        trail.state.activities.delete(&context, id),
        Err(ActivityQueryError::RecordImmutable)
    ));
    assert_eq!(trail.history(&admin, task.id()).await?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_readers_are_rejected(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    trail.task(&admin, "Hidden", &[]).await?;

    let result = trail
        .state
        .activities
        .recent(&ActorContext::empty())
        .await;

    assert!(matches!(result, Err(ActivityQueryError::Unauthenticated(_))));
    let listed = trail
        .state
        .activities
        .by_user(&as_user(&admin), admin.id(), PageRequest::first())
        .await?;
    assert_eq!(listed.count, 1);
    Ok(())
}
