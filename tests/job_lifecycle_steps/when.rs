//! When steps for repair job lifecycle scenarios.

use super::world::{JobLifecycleWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use shopfloor::workshop::{
    domain::RepairStatus,
    services::{RepairUpdateRequest, WorkshopHandoff},
};

#[when("the appointment is sent to the workshop")]
fn send_to_workshop(world: &mut JobLifecycleWorld) -> Result<(), eyre::Report> {
    let appointment_id = world.appointment()?.id();
    let handoff = run_async(world.scheduling.send_to_workshop(appointment_id))
        .wrap_err("send appointment to workshop")?;
    if let WorkshopHandoff::Promoted(ref promotion) = handoff {
        world.repair = Some(promotion.repair().clone());
        world.last_promotion = Some(promotion.clone());
    }
    world.last_handoff = Some(handoff);
    Ok(())
}

#[when("the appointment is promoted again")]
fn promote_again(world: &mut JobLifecycleWorld) -> Result<(), eyre::Report> {
    let appointment_id = world.appointment()?.id();
    let promotion = run_async(world.lifecycle.promote_appointment_to_repair(appointment_id))
        .wrap_err("promote appointment again")?;
    world.last_promotion = Some(promotion);
    Ok(())
}

#[when(r#"the repair is updated to "{status}" with labor cost "{labor_cost}""#)]
fn update_with_labor_cost(
    world: &mut JobLifecycleWorld,
    status: String,
    labor_cost: String,
) -> Result<(), eyre::Report> {
    let target = RepairStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid repair status in scenario: {err}"))?;
    let repair_id = world.repair()?.id();
    let request = RepairUpdateRequest::new(repair_id, target).with_labor_cost(labor_cost);
    world.last_update = Some(run_async(world.lifecycle.update_repair_status(request)));
    Ok(())
}

#[when("the repair is finalized")]
fn finalize(world: &mut JobLifecycleWorld) -> Result<(), eyre::Report> {
    let repair_id = world.repair()?.id();
    let finalized =
        run_async(world.lifecycle.finalize_repair(repair_id)).wrap_err("finalize repair")?;
    world.repair = Some(finalized);
    Ok(())
}
