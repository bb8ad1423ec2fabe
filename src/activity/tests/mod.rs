//! Unit tests for the activity context.


use crate::task::domain::{NewTask, Task, TaskTitle};
use crate::task::tests::StepClock;
use crate::user::domain::{Email, PasswordHash, Role, User, UserId, Username};

pub(super) fn task_titled(title: &str, assignees: &[UserId]) -> Task {
    Task::new(
        NewTask::new(TaskTitle::new(title).expect("valid title"))
            .with_assignees(assignees.iter().copied()),
        &StepClock::new(),
    )
}

pub(super) fn account(name: &str, role: Role) -> User {
    User::new(
        Email::new(format!("{name}@example.com")).expect("valid email"),
        Username::new(name).expect("valid username"),
        role,
        PasswordHash::from_persisted("unused".to_owned()),
        &StepClock::new(),
    )
}
