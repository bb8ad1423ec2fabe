//! Role-based visibility evaluated by the `PostgreSQL` query.

use crate::postgres::helpers::{Trail, actions, as_user, trail};
use rstest::rstest;
use tasktrail::activity::{domain::ActivityAction, services::ActivityQueryError};
use tasktrail::user::domain::Role;

#[rstest]
fn history_of_a_deleted_task_stays_with_its_assignee(
    trail: eyre::Result<Trail>,
) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
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
        for reader in [&admin, &alice] {
            let history = trail.history(reader, task.id()).await?;
            assert_eq!(actions(&history), expected);
            assert!(
                history
                    .iter()
                    .all(|view| view.entry.activity.task().is_none() && view.entry.task_info.deleted)
            );
        }
        assert!(trail.history(&bob, task.id()).await?.is_empty());
        assert_eq!(trail.count_visible(&bob, ActivityAction::Deleted).await?, 0);
        Ok(())
    })
}

#[rstest]
fn every_former_assignee_matches_the_snapshot(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
        let admin = trail.account("admin", Role::Admin).await?;
        let alice = trail.account("alice", Role::Staff).await?;
        let bob = trail.account("bob", Role::Staff).await?;
        let carol = trail.account("carol", Role::Staff).await?;
        let task = trail.task(&admin, "Close quarter", &[&alice, &bob]).await?;
        trail.state.tasks.delete(&as_user(&admin), task.id()).await?;

        // Only one of the two is the primary assignee; the other is found
        // through the snapshot's assignee array.
        assert_eq!(trail.count_visible(&alice, ActivityAction::Deleted).await?, 1);
        assert_eq!(trail.count_visible(&bob, ActivityAction::Deleted).await?, 1);
        assert_eq!(trail.count_visible(&carol, ActivityAction::Deleted).await?, 0);

        let history = trail.history(&admin, task.id()).await?;
        let deleted = history
            .first()
            .ok_or_else(|| eyre::eyre!("expected the deletion activity"))?;
        let id = deleted.entry.activity.id();
        assert!(trail.state.activities.get(&as_user(&bob), id).await.is_ok());
        assert!(matches!(
            trail.state.activities.get(&as_user(&carol), id).await,
            Err(ActivityQueryError::NotFound(missing)) if missing == id
        ));
        Ok(())
    })
}

#[rstest]
fn live_assignment_reveals_earlier_history(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
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
    })
}

#[rstest]
fn removed_assignee_keeps_their_own_records(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
        let admin = trail.account("admin", Role::Admin).await?;
        let alice = trail.account("alice", Role::Staff).await?;
        let bob = trail.account("bob", Role::Staff).await?;
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
        trail
            .state
            .tasks
            .assign(&as_user(&admin), task.id(), &[bob.id()])
            .await?;

        assert_eq!(
            actions(&trail.history(&alice, task.id()).await?),
            vec![
                ActivityAction::Unassigned,
                ActivityAction::StatusChanged,
                ActivityAction::Created
            ]
        );
        assert_eq!(
            actions(&trail.history(&bob, task.id()).await?),
            vec![
                ActivityAction::Assigned,
                ActivityAction::Unassigned,
                ActivityAction::StatusChanged,
                ActivityAction::Created
            ]
        );
        Ok(())
    })
}
