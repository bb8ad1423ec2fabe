//! Pre-images captured under `SELECT ... FOR UPDATE` by concurrent writers.

use crate::postgres::helpers::{Trail, as_user, trail};
use rstest::rstest;
use serde_json::Value;
use tasktrail::activity::domain::ActivityAction;
use tasktrail::task::services::UpdateTaskRequest;
use tasktrail::user::domain::Role;

const WRITERS: usize = 4;
const ROUNDS: usize = 5;

#[rstest]
fn concurrent_edits_form_an_unbroken_chain(trail: eyre::Result<Trail>) -> eyre::Result<()> {
    let trail = trail?;
    trail.block_on(async {
        let admin = trail.account("admin", Role::Admin).await?;
        let task = trail.task(&admin, "Contended", &[]).await?;

        let mut handles = Vec::new();
        for writer in 0..WRITERS {
            let tasks = trail.state.tasks.clone();
            let context = as_user(&admin);
            let task_id = task.id();
            handles.push(tokio::spawn(async move {
                for round in 0..ROUNDS {
                    let request = UpdateTaskRequest::new()
                        .with_description(format!("writer {writer} round {round}"));
                    tasks.update(&context, task_id, request).await?;
                }
                Ok::<_, eyre::Report>(())
            }));
        }
        for handle in handles {
            handle.await??;
        }

        let history = trail.history(&admin, task.id()).await?;
        let descriptions: Vec<(Value, Value)> = history
            .iter()
            .filter(|view| view.entry.activity.action() == ActivityAction::Updated)
            .map(|view| -> eyre::Result<(Value, Value)> {
                let change = view
                    .entry
                    .activity
                    .changes()
                    .and_then(|changes| changes.get("description"))
                    .ok_or_else(|| eyre::eyre!("update carries a description change"))?;
                let old = change.get("old").cloned().unwrap_or(Value::Null);
                let new = change.get("new").cloned().unwrap_or(Value::Null);
                Ok((old, new))
            })
            .collect::<eyre::Result<_>>()?;

        assert_eq!(descriptions.len(), WRITERS * ROUNDS);
        // Newest first: each edit starts from the value the previous one wrote.
        for pair in descriptions.windows(2) {
            let [(newer_old, _), (_, older_new)] = pair else {
                continue;
            };
            assert_eq!(newer_old, older_new);
        }
        let oldest = descriptions
            .last()
            .ok_or_else(|| eyre::eyre!("expected at least one update"))?;
        assert_eq!(oldest.0, Value::from(""));
        Ok(())
    })
}
