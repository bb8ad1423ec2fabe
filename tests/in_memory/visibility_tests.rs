//! Role-based visibility of the audit trail, including after deletion.

use crate::in_memory::helpers::{Trail, actions, as_user, trail};
use rstest::rstest;
use tasktrail::activity::{domain::ActivityAction, services::ActivityQueryError};
use tasktrail::user::domain::Role;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn write_report_history_follows_the_assignee(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let alice = trail.account("alice", Role::Staff).await?;
    let bob = trail.account("bob", Role::Staff).await?;
    let task = trail.task(&admin, "Write report", &[&alice]).await?;

    trail
        .state
        .tasks
        .update_status(&as_user(&alice), task.id(), "in_progress")
        .await?;
    trail.state.tasks.delete(&as_user(&admin), task.id()).await?;

    let expected = vec![
        ActivityAction::Deleted,
        ActivityAction::StatusChanged,
        ActivityAction::Created,
    ];
    assert_eq!(actions(&trail.history(&admin, task.id()).await?), expected);
    assert_eq!(actions(&trail.history(&alice, task.id()).await?), expected);
    assert!(trail.history(&bob, task.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletion_is_visible_only_to_former_assignees(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let alice = trail.account("alice", Role::Staff).await?;
    let bob = trail.account("bob", Role::Staff).await?;
    let task = trail.task(&admin, "Close quarter", &[&alice]).await?;
    trail.state.tasks.delete(&as_user(&admin), task.id()).await?;

    assert_eq!(trail.count_visible(&alice, ActivityAction::Deleted).await?, 1);
    assert_eq!(trail.count_visible(&bob, ActivityAction::Deleted).await?, 0);
    assert_eq!(trail.count_visible(&admin, ActivityAction::Deleted).await?, 1);

    let history = trail.history(&admin, task.id()).await?;
    let deleted = history
        .first()
        .ok_or_else(|| eyre::eyre!("expected the deletion activity"))?;
    let id = deleted.entry.activity.id();
    assert!(trail.state.activities.get(&as_user(&alice), id).await.is_ok());
    assert!(matches!(
        trail.state.activities.get(&as_user(&bob), id).await,
        Err(ActivityQueryError::NotFound(missing)) if missing == id
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn live_assignment_reveals_earlier_history(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let bob = trail.account("bob", Role::Staff).await?;
    let task = trail.task(&admin, "Plan offsite", &[]).await?;

    assert!(trail.history(&bob, task.id()).await?.is_empty());

    trail
        .state
        .tasks
        .assign(&as_user(&admin), task.id(), &[bob.id()])
        .await?;

    assert_eq!(
        actions(&trail.history(&bob, task.id()).await?),
        vec![ActivityAction::Assigned, ActivityAction::Created]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn staff_see_their_own_actions(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    let alice = trail.account("alice", Role::Staff).await?;
    let task = trail.task(&admin, "Refresh docs", &[&alice]).await?;
    trail
        .state
        .tasks
        .update_status(&as_user(&alice), task.id(), "completed")
        .await?;
    trail
        .state
        .tasks
        .unassign(&as_user(&admin), task.id(), &[alice.id()])
        .await?;

    let history = trail.history(&alice, task.id()).await?;

    assert_eq!(
        actions(&history),
        vec![
            ActivityAction::Unassigned,
            ActivityAction::StatusChanged,
            ActivityAction::Created
        ]
    );
    let recent = trail.state.activities.recent(&as_user(&alice)).await?;
    assert!(
        recent
            .iter()
            .any(|view| view.entry.activity.user() == Some(alice.id()))
    );
    Ok(())
}
