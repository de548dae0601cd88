//! Then steps for repair job lifecycle scenarios.

use super::world::{JobLifecycleWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use shopfloor::workshop::{
    domain::{AppointmentStatus, Cost, Odometer, RepairStatus},
    services::{JobFailureKind, Promotion, WorkshopHandoff},
};

fn parse_repair_status(raw: &str) -> Result<RepairStatus, eyre::Report> {
    RepairStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid repair status: {err}"))
}

#[then(r#"a new repair is opened with status "{status}""#)]
fn new_repair_opened(world: &JobLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_repair_status(&status)?;
    let promotion = world
        .last_promotion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing promotion result"))?;
    if !promotion.is_new() {
        return Err(eyre::eyre!("expected a new repair, got {promotion:?}"));
    }
    if promotion.repair().status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            promotion.repair().status()
        ));
    }
    Ok(())
}

#[then("the repair intake odometer is {kilometres:u32} km")]
fn intake_odometer_is(world: &JobLifecycleWorld, kilometres: u32) -> Result<(), eyre::Report> {
    let recorded = world.repair()?.intake_odometer();
    if recorded != Odometer::new(kilometres) {
        return Err(eyre::eyre!(
            "expected intake odometer {kilometres}, found {}",
            recorded.kilometres()
        ));
    }
    Ok(())
}

#[then(r#"the appointment status is "{status}""#)]
fn appointment_status_is(world: &JobLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = AppointmentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid appointment status: {err}"))?;
    let appointment_id = world.appointment()?.id();
    let stored = run_async(world.scheduling.get(appointment_id)).wrap_err("reload appointment")?;
    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected appointment status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("the existing repair is returned")]
fn existing_repair_returned(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let original = world.repair()?;
    match world.last_promotion.as_ref() {
        Some(Promotion::AlreadyExisted(repair)) if repair.id() == original.id() => Ok(()),
        other => Err(eyre::eyre!(
            "expected the existing repair {}, got {other:?}",
            original.id()
        )),
    }
}

#[then("the vehicle repair history holds {count:usize} entries")]
fn history_holds(world: &JobLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let vehicle_id = world.vehicle()?.id();
    let history =
        run_async(world.lifecycle.vehicle_history(vehicle_id)).wrap_err("load history")?;
    if history.len() != count {
        return Err(eyre::eyre!(
            "expected {count} repairs on record, found {}",
            history.len()
        ));
    }
    Ok(())
}

#[then("the hand-off is skipped")]
fn handoff_skipped(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    match world.last_handoff.as_ref() {
        Some(WorkshopHandoff::Skipped { .. }) => Ok(()),
        other => Err(eyre::eyre!("expected a skipped hand-off, got {other:?}")),
    }
}

#[then("the update fails with an invalid input error")]
fn update_fails_with_invalid_input(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_update
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result"))?;
    match result {
        Err(err) if err.kind() == JobFailureKind::InvalidInput => Ok(()),
        other => Err(eyre::eyre!("expected an invalid input error, got {other:?}")),
    }
}

#[then(r#"the stored repair status is "{status}""#)]
fn stored_repair_status_is(world: &JobLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_repair_status(&status)?;
    let repair_id = world.repair()?.id();
    let stored = run_async(world.lifecycle.get_repair(repair_id)).wrap_err("reload repair")?;
    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected repair status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("the repair costs are zero")]
fn costs_are_zero(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let repair = world.repair()?;
    if repair.labor_cost() != Some(Cost::ZERO) || repair.total_cost() != Some(Cost::ZERO) {
        return Err(eyre::eyre!(
            "expected zero costs, found labor {:?} and total {:?}",
            repair.labor_cost(),
            repair.total_cost()
        ));
    }
    if repair.exit_date().is_none() {
        return Err(eyre::eyre!("expected an exit date on the finalized repair"));
    }
    Ok(())
}

#[then("no vehicle is in the shop")]
fn shop_is_empty(world: &JobLifecycleWorld) -> Result<(), eyre::Report> {
    let in_shop = run_async(world.lifecycle.vehicles_in_shop()).wrap_err("load shop floor")?;
    if !in_shop.is_empty() {
        return Err(eyre::eyre!("expected an empty shop, found {} jobs", in_shop.len()));
    }
    Ok(())
}
