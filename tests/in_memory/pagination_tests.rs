//! Page clamping and out-of-range pages over the audit trail.

use crate::in_memory::helpers::{Trail, as_user, trail};
use rstest::rstest;
use tasktrail::activity::ports::ActivityFilter;
use tasktrail::pagination::PageRequest;
use tasktrail::user::domain::Role;

const TASKS: u64 = 105;

async fn seeded() -> eyre::Result<(Trail, tasktrail::user::domain::User)> {
    let seeded_trail = Trail::new();
    let admin = seeded_trail.account("admin", Role::Admin).await?;
    for index in 0..TASKS {
        seeded_trail
            .task(&admin, &format!("Task {index:03}"), &[])
            .await?;
    }
    Ok((seeded_trail, admin))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_pages_are_clamped() -> eyre::Result<()> {
    let (populated, admin) = seeded().await?;

    let page = populated
        .state
        .activities
        .list(
            &as_user(&admin),
            &ActivityFilter::default(),
            PageRequest::new(Some(1), Some(150)),
        )
        .await?;

    assert_eq!(page.page_size, 100);
    assert_eq!(page.results.len(), 100);
    assert_eq!(page.count, TASKS);
    assert_eq!(page.total_pages, 2);
    assert!(page.next);
    assert!(!page.previous);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn page_beyond_the_last_is_empty() -> eyre::Result<()> {
    let (populated, admin) = seeded().await?;

    let page = populated
        .state
        .activities
        .list(
            &as_user(&admin),
            &ActivityFilter::default(),
            PageRequest::new(Some(9), Some(50)),
        )
        .await?;

    assert!(page.results.is_empty());
    assert_eq!(page.current_page, 9);
    assert_eq!(page.total_pages, 3);
    assert!(!page.next);
    assert!(page.previous);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_narrows_by_task_title(trail: Trail) -> eyre::Result<()> {
    let admin = trail.account("admin", Role::Admin).await?;
    trail.task(&admin, "Quarterly REPORT", &[]).await?;
    trail.task(&admin, "Team lunch", &[]).await?;

    let page = trail
        .state
        .activities
        .list(
            &as_user(&admin),
            &ActivityFilter::default().with_search("report"),
            PageRequest::first(),
        )
        .await?;

    assert_eq!(page.count, 1);
    let only = page
        .results
        .first()
        .ok_or_else(|| eyre::eyre!("expected one match"))?;
    assert_eq!(only.entry.task_info.title, "Quarterly REPORT");
    Ok(())
}
