//! Given steps for activity audit trail BDD scenarios.

use super::world::{AuditWorld, run_async};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use tasktrail::task::services::CreateTaskRequest;
use tasktrail::user::{
    domain::{Email, PasswordHash, Role, User, Username},
    ports::UserRepository,
};

fn register(world: &mut AuditWorld, name: String, role: Role) -> Result<(), eyre::Report> {
    let user = User::new(
        Email::new(format!("{name}@example.com"))?,
        Username::new(name.as_str())?,
        role,
        PasswordHash::from_persisted("unused".to_owned()),
        &DefaultClock,
    );
    run_async(world.users.store(&user)).wrap_err("store scenario account")?;
    world.accounts.insert(name, user);
    Ok(())
}

#[given(r#"an admin named "{name}""#)]
fn an_admin(world: &mut AuditWorld, name: String) -> Result<(), eyre::Report> {
    register(world, name, Role::Admin)
}

#[given(r#"a staff member named "{name}""#)]
fn a_staff_member(world: &mut AuditWorld, name: String) -> Result<(), eyre::Report> {
    register(world, name, Role::Staff)
}

#[given(r#""{creator}" creates the task "{title}" for "{assignee}""#)]
fn creates_assigned_task(
    world: &mut AuditWorld,
    creator: String,
    title: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let assignee_id = world.account(&assignee)?.id();
    let request = CreateTaskRequest::new(title).with_assignees([assignee_id]);
    let context = world.acting_as(&creator)?;
    let task = run_async(world.state.tasks.create(&context, request))
        .wrap_err("create assigned task for scenario")?;
    world.task = Some(task.id());
    Ok(())
}

#[given(r#""{creator}" creates the unassigned task "{title}""#)]
fn creates_unassigned_task(
    world: &mut AuditWorld,
    creator: String,
    title: String,
) -> Result<(), eyre::Report> {
    let context = world.acting_as(&creator)?;
    let task = run_async(world.state.tasks.create(&context, CreateTaskRequest::new(title)))
        .wrap_err("create unassigned task for scenario")?;
    world.task = Some(task.id());
    Ok(())
}
