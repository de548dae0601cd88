//! Given steps for repair job lifecycle scenarios.

use super::world::{JobLifecycleWorld, run_async};
use chrono::{NaiveDate, NaiveTime};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use shopfloor::workshop::{
    domain::{AppointmentStatus, Slot},
    services::{PersonRequest, RescheduleRequest, ScheduleAppointmentRequest, VehicleRequest},
};

fn booking_slot() -> Result<Slot, eyre::Report> {
    let date = NaiveDate::from_ymd_opt(2026, 10, 12).ok_or_else(|| eyre::eyre!("bad date"))?;
    let time = NaiveTime::from_hms_opt(9, 30, 0).ok_or_else(|| eyre::eyre!("bad time"))?;
    Ok(Slot::new(date, time))
}

#[given(r#"a registered vehicle "{plate}" with a baseline odometer of {kilometres:u32} km"#)]
fn registered_vehicle(
    world: &mut JobLifecycleWorld,
    plate: String,
    kilometres: u32,
) -> Result<(), eyre::Report> {
    let client = run_async(
        world
            .registry
            .register_client(PersonRequest::new("Elena", "Castro").with_phone("555-0177")),
    )
    .wrap_err("register client for scenario")?;
    let vehicle = run_async(world.registry.register_vehicle(
        client.id(),
        VehicleRequest::new(plate, "Peugeot", "208").with_baseline_odometer(kilometres.to_string()),
    ))
    .wrap_err("register vehicle for scenario")?;
    world.vehicle = Some(vehicle);
    Ok(())
}

#[given("a scheduled appointment for the vehicle")]
fn scheduled_appointment(world: &mut JobLifecycleWorld) -> Result<(), eyre::Report> {
    let vehicle = world.vehicle()?;
    let request = ScheduleAppointmentRequest::new(
        vehicle.owner(),
        vehicle.id(),
        booking_slot()?,
        "engine warning light",
    );
    let appointment =
        run_async(world.scheduling.schedule(request)).wrap_err("schedule appointment")?;
    world.appointment = Some(appointment);
    Ok(())
}

#[given("the appointment has been promoted to a repair")]
fn appointment_promoted(world: &mut JobLifecycleWorld) -> Result<(), eyre::Report> {
    let appointment_id = world.appointment()?.id();
    let promotion = run_async(world.lifecycle.promote_appointment_to_repair(appointment_id))
        .wrap_err("promote appointment in scenario setup")?;
    world.repair = Some(promotion.into_repair());
    Ok(())
}

#[given(r#"the appointment is rescheduled with status "{status}""#)]
fn appointment_rescheduled(
    world: &mut JobLifecycleWorld,
    status: String,
) -> Result<(), eyre::Report> {
    let target = AppointmentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid appointment status in scenario: {err}"))?;
    let appointment = world.appointment()?;
    let request = RescheduleRequest::new(
        appointment.id(),
        appointment.slot(),
        appointment.problem(),
        target,
    );
    let outcome =
        run_async(world.scheduling.reschedule(request)).wrap_err("reschedule appointment")?;
    world.appointment = Some(outcome.appointment);
    Ok(())
}
