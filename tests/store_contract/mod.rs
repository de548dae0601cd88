//! Behaviour every workshop store must share, run against each backend.
//!
//! Each check takes a freshly created, empty store.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use mockable::DefaultClock;
use shopfloor::workshop::{
    domain::{
        Appointment, AppointmentStatus, Client, ContactDetails, Cost, DirectIntake, LicensePlate,
        Mechanic, Odometer, PersonName, Repair, RepairChanges, RepairId, RepairStatus, Slot,
        Vehicle, VehicleDetails, VehicleId,
    },
    ports::{WorkshopRepositoryError, WorkshopStore},
    services::{JobLifecycleService, Promotion},
};

/// Tasks racing to promote the same appointment.
const PROMOTION_RACERS: usize = 8;

/// Rounds of paired concurrent updates on one repair.
const UPDATE_ROUNDS: u32 = 25;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn slot(year: i32, month: u32, day: u32, hour: u32) -> Slot {
    Slot::new(
        date(year, month, day),
        NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"),
    )
}

fn client(last_name: &str, national_id: Option<&str>) -> Client {
    Client::new(
        PersonName::new("Julia", last_name).expect("valid name"),
        ContactDetails::new(Some("555-0142".to_owned()), Some("julia@example.com".to_owned())),
        national_id.map(str::to_owned),
    )
}

fn mechanic(last_name: &str) -> Mechanic {
    Mechanic::new(
        PersonName::new("Tomas", last_name).expect("valid name"),
        ContactDetails::default(),
    )
}

fn vehicle(owner: &Client, plate: &str) -> Vehicle {
    let details = VehicleDetails::new(plate, "Toyota", "Corolla")
        .expect("valid details")
        .with_year(2018)
        .with_baseline_odometer(Odometer::new(64_000));
    Vehicle::new(owner.id(), details)
}

fn appointment(vehicle: &Vehicle, mechanic: Option<&Mechanic>, booked: Slot) -> Appointment {
    Appointment::schedule(
        vehicle.owner(),
        vehicle.id(),
        mechanic.map(Mechanic::id),
        booked,
        "steering pulls left",
    )
    .expect("valid appointment")
}

fn direct_repair(vehicle: VehicleId, intake: NaiveDate, status: RepairStatus) -> Repair {
    let mut repair = Repair::open_direct(
        DirectIntake {
            vehicle,
            mechanic: None,
            intake_date: intake,
            intake_odometer: Odometer::new(70_000),
            problem: "oil leak".to_owned(),
        },
        &DefaultClock,
    )
    .expect("valid intake");
    repair.apply(&RepairChanges::status_only(status));
    repair
}

async fn seed_owner_and_vehicle<S: WorkshopStore>(store: &S, plate: &str) -> (Client, Vehicle) {
    let owner = client("Navarro", None);
    store.store_client(&owner).await.expect("client stored");
    let car = vehicle(&owner, plate);
    store.store_vehicle(&car).await.expect("vehicle stored");
    (owner, car)
}

fn ids(repairs: &[Repair]) -> Vec<RepairId> {
    repairs.iter().map(Repair::id).collect()
}

/// Stored reference data reads back unchanged.
pub async fn reference_data_round_trips<S: WorkshopStore>(store: S) {
    let owner = client("Navarro", Some("27444555"));
    store.store_client(&owner).await.expect("client stored");
    let car = vehicle(&owner, "AC456DE");
    store.store_vehicle(&car).await.expect("vehicle stored");
    let tech = mechanic("Rios");
    store.store_mechanic(&tech).await.expect("mechanic stored");

    assert_eq!(store.find_client(owner.id()).await.expect("find"), Some(owner.clone()));
    assert_eq!(store.find_vehicle(car.id()).await.expect("find"), Some(car.clone()));
    assert_eq!(store.find_mechanic(tech.id()).await.expect("find"), Some(tech));
    assert_eq!(
        store
            .list_vehicles_for_client(owner.id())
            .await
            .expect("list"),
        vec![car]
    );
}

/// National IDs and plates are unique on insert and on update.
pub async fn natural_keys_are_unique<S: WorkshopStore>(store: S) {
    let first = client("Navarro", Some("27444555"));
    store.store_client(&first).await.expect("client stored");
    let clash = client("Ortiz", Some("27444555"));
    assert!(matches!(
        store.store_client(&clash).await,
        Err(WorkshopRepositoryError::DuplicateNationalId(id)) if id == "27444555"
    ));

    let mut second = client("Ortiz", Some("30999000"));
    store.store_client(&second).await.expect("client stored");
    second.revise(second.name().clone(), second.contact().clone(), Some("27444555".to_owned()));
    assert!(matches!(
        store.update_client(&second).await,
        Err(WorkshopRepositoryError::DuplicateNationalId(_))
    ));

    let car = vehicle(&first, "AC456DE");
    store.store_vehicle(&car).await.expect("vehicle stored");
    let same_plate = vehicle(&second, "ac456de");
    let expected = LicensePlate::new("AC456DE").expect("valid plate");
    assert!(matches!(
        store.store_vehicle(&same_plate).await,
        Err(WorkshopRepositoryError::DuplicateLicensePlate(plate)) if plate == expected
    ));

    let mut other = vehicle(&second, "ZZ000ZZ");
    store.store_vehicle(&other).await.expect("vehicle stored");
    other.revise(
        VehicleDetails::new("AC456DE", "Toyota", "Corolla").expect("valid details"),
    );
    assert!(matches!(
        store.update_vehicle(&other).await,
        Err(WorkshopRepositoryError::DuplicateLicensePlate(_))
    ));
}

/// Vehicles cannot be registered to unknown clients.
pub async fn vehicle_requires_owner<S: WorkshopStore>(store: S) {
    let ghost = client("Navarro", None);
    let car = vehicle(&ghost, "AC456DE");
    assert!(matches!(
        store.store_vehicle(&car).await,
        Err(WorkshopRepositoryError::ClientNotFound(id)) if id == ghost.id()
    ));
}

/// Promotion stores the repair and completes its appointment together.
pub async fn promotion_completes_appointment<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let booking = appointment(&car, None, slot(2026, 5, 4, 9));
    store.store_appointment(&booking).await.expect("appointment stored");

    let repair = Repair::from_appointment(&booking, car.intake_baseline(), &DefaultClock);
    store.store_promoted(&repair).await.expect("promotion stored");

    let stored = store
        .find_appointment(booking.id())
        .await
        .expect("find")
        .expect("appointment present");
    assert_eq!(stored.status(), AppointmentStatus::Completed);
    let by_origin = store
        .find_repair_by_origin(booking.id())
        .await
        .expect("find")
        .expect("repair present");
    assert_eq!(by_origin.id(), repair.id());
    assert_eq!(by_origin.intake_odometer(), Odometer::new(64_000));
    assert!(store.list_active_appointments().await.expect("list").is_empty());
}

/// A second repair for the same appointment is refused and changes nothing.
pub async fn second_promotion_is_refused<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let booking = appointment(&car, None, slot(2026, 5, 4, 9));
    store.store_appointment(&booking).await.expect("appointment stored");
    let first = Repair::from_appointment(&booking, Odometer::default(), &DefaultClock);
    store.store_promoted(&first).await.expect("first promotion");

    let second = Repair::from_appointment(&booking, Odometer::default(), &DefaultClock);
    assert!(matches!(
        store.store_promoted(&second).await,
        Err(WorkshopRepositoryError::DuplicateAppointmentOrigin(origin)) if origin == booking.id()
    ));
    assert_eq!(
        ids(&store.list_repairs_for_vehicle(car.id()).await.expect("list")),
        vec![first.id()]
    );
}

/// Promoting a missing appointment stores nothing.
pub async fn promotion_requires_appointment<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let unsaved = appointment(&car, None, slot(2026, 5, 4, 9));
    let repair = Repair::from_appointment(&unsaved, Odometer::default(), &DefaultClock);

    assert!(matches!(
        store.store_promoted(&repair).await,
        Err(WorkshopRepositoryError::AppointmentNotFound(id)) if id == unsaved.id()
    ));
    assert_eq!(store.find_repair(repair.id()).await.expect("find"), None);
}

/// Every repair field survives an update and a reload.
pub async fn repair_fields_round_trip<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let tech = mechanic("Rios");
    store.store_mechanic(&tech).await.expect("mechanic stored");
    let repair = direct_repair(car.id(), date(2026, 5, 2), RepairStatus::InProgress);
    store.store_repair(&repair).await.expect("repair stored");

    let changes = RepairChanges {
        work_performed: Some("replaced gasket".to_owned()),
        parts_used: Some("gasket kit".to_owned()),
        labor_cost: Some(Cost::new(120.5)),
        total_cost: Some(Cost::new(310.25)),
        exit_date: Some(date(2026, 5, 6)),
        exit_odometer: Some(Odometer::new(70_012)),
        ..RepairChanges::status_only(RepairStatus::Completed)
    };
    let returned = store
        .update_repair(repair.id(), &changes)
        .await
        .expect("repair updated");

    let stored = store
        .find_repair(repair.id())
        .await
        .expect("find")
        .expect("repair present");
    assert_eq!(returned, stored);
    assert_eq!(stored.status(), RepairStatus::Completed);
    assert_eq!(stored.intake_date(), date(2026, 5, 2));
    assert_eq!(stored.exit_date(), Some(date(2026, 5, 6)));
    assert_eq!(stored.intake_odometer(), Odometer::new(70_000));
    assert_eq!(stored.exit_odometer(), Some(Odometer::new(70_012)));
    assert_eq!(stored.problem(), "oil leak");
    assert_eq!(stored.work_performed(), Some("replaced gasket"));
    assert_eq!(stored.parts_used(), Some("gasket kit"));
    assert_eq!(stored.labor_cost(), Some(Cost::new(120.5)));
    assert_eq!(stored.total_cost(), Some(Cost::new(310.25)));
    assert_eq!(stored.origin(), None);
}

/// Updates, closures and deletes of unknown records report the missing
/// record.
pub async fn missing_records_are_reported<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let repair = direct_repair(car.id(), date(2026, 5, 2), RepairStatus::Pending);
    assert!(matches!(
        store
            .update_repair(repair.id(), &RepairChanges::status_only(RepairStatus::Completed))
            .await,
        Err(WorkshopRepositoryError::RepairNotFound(id)) if id == repair.id()
    ));
    assert!(matches!(
        store.finalize_repair(repair.id(), date(2026, 5, 9)).await,
        Err(WorkshopRepositoryError::RepairNotFound(id)) if id == repair.id()
    ));
    let booking = appointment(&car, None, slot(2026, 5, 4, 9));
    assert!(matches!(
        store.delete_appointment(booking.id()).await,
        Err(WorkshopRepositoryError::AppointmentNotFound(_))
    ));
    let tech = mechanic("Rios");
    assert!(matches!(
        store.update_mechanic(&tech).await,
        Err(WorkshopRepositoryError::MechanicNotFound(_))
    ));
}

/// Listings come back in the order the shop expects.
pub async fn listings_are_ordered<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    for last_name in ["Vega", "Alvarez"] {
        store
            .store_client(&client(last_name, None))
            .await
            .expect("client stored");
    }
    let clients: Vec<String> = store
        .list_clients()
        .await
        .expect("list")
        .iter()
        .map(|stored| stored.name().last().to_owned())
        .collect();
    assert_eq!(clients, vec!["Alvarez", "Navarro", "Vega"]);

    let early = appointment(&car, None, slot(2026, 5, 4, 9));
    let later_same_day = appointment(&car, None, slot(2026, 5, 4, 15));
    let next_day = appointment(&car, None, slot(2026, 5, 5, 8));
    for booking in [&early, &next_day, &later_same_day] {
        store.store_appointment(booking).await.expect("appointment stored");
    }
    let listed: Vec<_> = store
        .list_active_appointments()
        .await
        .expect("list")
        .iter()
        .map(Appointment::id)
        .collect();
    assert_eq!(listed, vec![next_day.id(), later_same_day.id(), early.id()]);

    let old_pending = direct_repair(car.id(), date(2026, 4, 1), RepairStatus::Pending);
    let new_pending = direct_repair(car.id(), date(2026, 4, 20), RepairStatus::Pending);
    let waiting = direct_repair(car.id(), date(2026, 4, 25), RepairStatus::AwaitingParts);
    let working = direct_repair(car.id(), date(2026, 3, 1), RepairStatus::InProgress);
    let done = direct_repair(car.id(), date(2026, 4, 30), RepairStatus::Completed);
    for repair in [&old_pending, &new_pending, &waiting, &working, &done] {
        store.store_repair(repair).await.expect("repair stored");
    }

    assert_eq!(
        ids(&store.list_active_repairs().await.expect("list")),
        vec![working.id(), new_pending.id(), old_pending.id(), waiting.id()]
    );
    assert_eq!(
        ids(&store.list_repairs_for_vehicle(car.id()).await.expect("list")),
        vec![
            done.id(),
            waiting.id(),
            new_pending.id(),
            old_pending.id(),
            working.id()
        ]
    );
}

/// Deleting a client removes its vehicles, bookings and repairs.
pub async fn client_delete_cascades<S: WorkshopStore>(store: S) {
    let (owner, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let booking = appointment(&car, None, slot(2026, 5, 4, 9));
    store.store_appointment(&booking).await.expect("appointment stored");
    let repair = Repair::from_appointment(&booking, Odometer::default(), &DefaultClock);
    store.store_promoted(&repair).await.expect("promotion stored");

    store.delete_client(owner.id()).await.expect("client deleted");

    assert_eq!(store.find_vehicle(car.id()).await.expect("find"), None);
    assert_eq!(store.find_appointment(booking.id()).await.expect("find"), None);
    assert_eq!(store.find_repair(repair.id()).await.expect("find"), None);
    assert!(matches!(
        store.delete_client(owner.id()).await,
        Err(WorkshopRepositoryError::ClientNotFound(_))
    ));
}

/// Removing an appointment or mechanic keeps the repair and clears the link.
pub async fn detached_links_keep_repairs<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let tech = mechanic("Rios");
    store.store_mechanic(&tech).await.expect("mechanic stored");
    let booking = appointment(&car, Some(&tech), slot(2026, 5, 4, 9));
    store.store_appointment(&booking).await.expect("appointment stored");
    let repair = Repair::from_appointment(&booking, Odometer::default(), &DefaultClock);
    store.store_promoted(&repair).await.expect("promotion stored");

    store.delete_appointment(booking.id()).await.expect("appointment deleted");
    store.delete_mechanic(tech.id()).await.expect("mechanic deleted");

    let stored = store
        .find_repair(repair.id())
        .await
        .expect("find")
        .expect("repair kept");
    assert_eq!(stored.origin(), None);
    assert_eq!(stored.mechanic(), None);
    assert_eq!(store.find_repair_by_origin(booking.id()).await.expect("find"), None);
}

/// A partial update writes the supplied fields and nothing else.
pub async fn partial_update_keeps_omitted_fields<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let repair = direct_repair(car.id(), date(2026, 5, 2), RepairStatus::InProgress);
    store.store_repair(&repair).await.expect("repair stored");
    store
        .update_repair(
            repair.id(),
            &RepairChanges {
                work_performed: Some("replaced gasket".to_owned()),
                parts_used: Some("gasket kit".to_owned()),
                labor_cost: Some(Cost::new(95.0)),
                ..RepairChanges::status_only(RepairStatus::InProgress)
            },
        )
        .await
        .expect("first update");

    let updated = store
        .update_repair(
            repair.id(),
            &RepairChanges {
                work_performed: Some("   ".to_owned()),
                total_cost: Some(Cost::new(240.0)),
                ..RepairChanges::status_only(RepairStatus::AwaitingParts)
            },
        )
        .await
        .expect("second update");

    assert_eq!(updated.status(), RepairStatus::AwaitingParts);
    assert_eq!(updated.work_performed(), None);
    assert_eq!(updated.parts_used(), Some("gasket kit"));
    assert_eq!(updated.labor_cost(), Some(Cost::new(95.0)));
    assert_eq!(updated.total_cost(), Some(Cost::new(240.0)));
    assert_eq!(updated.problem(), "oil leak");
}

/// Closing a repair zeroes only the costs that were never recorded.
pub async fn finalize_zeroes_unset_costs<S: WorkshopStore>(store: S) {
    let (_, car) = seed_owner_and_vehicle(&store, "AC456DE").await;
    let repair = direct_repair(car.id(), date(2026, 5, 2), RepairStatus::InProgress);
    store.store_repair(&repair).await.expect("repair stored");
    store
        .update_repair(
            repair.id(),
            &RepairChanges {
                parts_used: Some("gasket kit".to_owned()),
                labor_cost: Some(Cost::new(60.0)),
                exit_odometer: Some(Odometer::new(70_020)),
                ..RepairChanges::status_only(RepairStatus::Pending)
            },
        )
        .await
        .expect("repair updated");

    let closed = store
        .finalize_repair(repair.id(), date(2026, 5, 9))
        .await
        .expect("repair finalized");

    assert_eq!(closed.status(), RepairStatus::Completed);
    assert_eq!(closed.exit_date(), Some(date(2026, 5, 9)));
    assert_eq!(closed.labor_cost(), Some(Cost::new(60.0)));
    assert_eq!(closed.total_cost(), Some(Cost::ZERO));
    assert_eq!(closed.parts_used(), Some("gasket kit"));
    assert_eq!(closed.exit_odometer(), Some(Odometer::new(70_020)));
    assert_eq!(
        store.find_repair(repair.id()).await.expect("find"),
        Some(closed)
    );
}

/// Concurrent updates of different fields on one repair all survive.
pub async fn concurrent_updates_keep_every_field<S: WorkshopStore + 'static>(store: S) {
    let shared = Arc::new(store);
    let (_, car) = seed_owner_and_vehicle(shared.as_ref(), "AC456DE").await;
    let repair = direct_repair(car.id(), date(2026, 5, 2), RepairStatus::InProgress);
    shared.store_repair(&repair).await.expect("repair stored");
    let repair_id = repair.id();

    for round in 0..UPDATE_ROUNDS {
        let labor = RepairChanges {
            labor_cost: Some(Cost::new(f64::from(round))),
            ..RepairChanges::status_only(RepairStatus::InProgress)
        };
        let total = RepairChanges {
            total_cost: Some(Cost::new(f64::from(round + 1_000))),
            ..RepairChanges::status_only(RepairStatus::InProgress)
        };
        let labor_store = Arc::clone(&shared);
        let total_store = Arc::clone(&shared);
        let labor_task =
            tokio::spawn(async move { labor_store.update_repair(repair_id, &labor).await });
        let total_task =
            tokio::spawn(async move { total_store.update_repair(repair_id, &total).await });
        labor_task
            .await
            .expect("labor task joined")
            .expect("labor update");
        total_task
            .await
            .expect("total task joined")
            .expect("total update");

        let stored = shared
            .find_repair(repair_id)
            .await
            .expect("find")
            .expect("repair present");
        assert_eq!(stored.labor_cost(), Some(Cost::new(f64::from(round))));
        assert_eq!(
            stored.total_cost(),
            Some(Cost::new(f64::from(round + 1_000)))
        );
    }
}

/// Concurrent promotions of one appointment open exactly one repair.
pub async fn concurrent_promotions_open_one_repair<S: WorkshopStore + 'static>(store: S) {
    let shared = Arc::new(store);
    let (_, car) = seed_owner_and_vehicle(shared.as_ref(), "AC456DE").await;
    let booking = appointment(&car, None, slot(2026, 5, 4, 9));
    shared
        .store_appointment(&booking)
        .await
        .expect("appointment stored");
    let service = Arc::new(JobLifecycleService::new(
        Arc::clone(&shared),
        Arc::new(DefaultClock),
    ));

    let racers: Vec<_> = (0..PROMOTION_RACERS)
        .map(|_| {
            let racer = Arc::clone(&service);
            let appointment_id = booking.id();
            tokio::spawn(async move { racer.promote_appointment_to_repair(appointment_id).await })
        })
        .collect();

    let mut created = Vec::new();
    let mut existing = Vec::new();
    for racer in racers {
        match racer
            .await
            .expect("promotion task joined")
            .expect("promotion should succeed")
        {
            Promotion::Created(repair) => created.push(repair.id()),
            Promotion::AlreadyExisted(repair) => existing.push(repair.id()),
        }
    }

    assert_eq!(created.len(), 1);
    assert_eq!(existing.len(), PROMOTION_RACERS - 1);
    assert!(existing.iter().all(|id| created.contains(id)));
    assert_eq!(
        ids(&shared.list_repairs_for_vehicle(car.id()).await.expect("list")),
        created
    );
}
