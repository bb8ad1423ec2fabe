//! Page clamping, search and ordering in the `PostgreSQL` query.

use crate::postgres::helpers::{Trail, as_user, trail};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;
use tasktrail::activity::{
    domain::{Activity, ActivityAction, NewActivity, TaskSnapshot},
    ports::ActivityFilter,
};
use tasktrail::pagination::PageRequest;
use tasktrail::task::ports::TaskStore;
use tasktrail::user::domain::Role;

const TASKS: u64 = 105;

/// Clock pinned to one instant later than any real activity.
struct Frozen;

impl Clock for Frozen {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

#[rstest]
fn pages_are_clamped_and_bounded(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
        let admin = trail.account("admin", Role::Admin).await?;
        for index in 0..TASKS {
            trail.task(&admin, &format!("Task {index:03}"), &[]).await?;
        }
        let context = as_user(&admin);
        let everything = ActivityFilter::default();

        let oversized = trail
            .state
            .activities
            .list(&context, &everything, PageRequest::new(Some(1), Some(150)))
            .await?;
        assert_eq!(oversized.page_size, 100);
        assert_eq!(oversized.results.len(), 100);
        assert_eq!(oversized.count, TASKS);
        assert_eq!(oversized.total_pages, 2);
        assert!(oversized.next);
        assert!(!oversized.previous);

        let last = trail
            .state
            .activities
            .list(&context, &everything, PageRequest::new(Some(2), Some(100)))
            .await?;
        assert_eq!(last.results.len(), 5);
        assert!(!last.next);
        let oldest = last
            .results
            .last()
            .ok_or_else(|| eyre::eyre!("expected the oldest activity"))?;
        assert_eq!(oldest.entry.task_info.title, "Task 000");

        for beyond in [9, 999] {
            let empty = trail
                .state
                .activities
                .list(&context, &everything, PageRequest::new(Some(beyond), Some(50)))
                .await?;
            assert!(empty.results.is_empty());
            assert_eq!(empty.count, TASKS);
            assert!(!empty.next);
            assert!(empty.previous);
        }
        Ok(())
    })
}

#[rstest]
fn search_treats_wildcards_literally(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
        let admin = trail.account("admin", Role::Admin).await?;
        trail.task(&admin, "Reach 100% coverage", &[]).await?;
        trail.task(&admin, "Onboard 1000 users", &[]).await?;
        trail.task(&admin, "Quarterly REPORT", &[]).await?;

        let matches = |term: &str| ActivityFilter::default().with_search(term);
        assert_eq!(trail.count(&admin, &matches("100%")).await?, 1);
        assert_eq!(trail.count(&admin, &matches("1_0")).await?, 0);
        assert_eq!(trail.count(&admin, &matches("100")).await?, 2);
        assert_eq!(trail.count(&admin, &matches("report")).await?, 1);
        Ok(())
    })
}

#[rstest]
fn equal_timestamps_fall_back_to_insertion_order(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
        let admin = trail.account("admin", Role::Admin).await?;
        let task = trail.task(&admin, "Tied", &[]).await?;
        let tied: Vec<Activity> = [
            ActivityAction::Updated,
            ActivityAction::StatusChanged,
            ActivityAction::Updated,
        ]
        .into_iter()
        .map(|action| Activity::new(NewActivity::new(action, TaskSnapshot::of(&task)), &Frozen))
        .collect();
        let inserted = tied.clone();
        trail
            .store
            .transact(move |transaction| {
                inserted
                    .iter()
                    .try_for_each(|activity| transaction.insert_activity(activity))
            })
            .await?;

        let page = trail
            .state
            .activities
            .by_task(&as_user(&admin), task.id(), PageRequest::first())
            .await?;

        let listed: Vec<_> = page
            .results
            .iter()
            .map(|view| view.entry.activity.id())
            .take(tied.len())
            .collect();
        let newest_first: Vec<_> = tied.iter().rev().map(Activity::id).collect();
        assert_eq!(listed, newest_first);
        assert_eq!(
            page.results.last().map(|view| view.entry.activity.action()),
            Some(ActivityAction::Created)
        );
        assert_eq!(page.count, 4);
        Ok(())
    })
}
