//! Seeding helpers shared by the workshop unit tests.

use crate::workshop::{
    adapters::memory::InMemoryWorkshopStore,
    domain::{
        Appointment, Client, ContactDetails, Mechanic, Odometer, PersonName, Slot, Vehicle,
        VehicleDetails,
    },
    ports::{AppointmentRepository, ClientRepository, MechanicRepository, VehicleRepository},
};
use chrono::{NaiveDate, NaiveTime};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn slot(year: i32, month: u32, day: u32, hour: u32) -> Slot {
    Slot::new(
        date(year, month, day),
        NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"),
    )
}

pub(super) async fn seed_client(store: &InMemoryWorkshopStore, last_name: &str) -> Client {
    let client = Client::new(
        PersonName::new("Ana", last_name).expect("valid name"),
        ContactDetails::new(Some("555-0101".to_owned()), None),
        None,
    );
    store.store_client(&client).await.expect("client stored");
    client
}

pub(super) async fn seed_vehicle(
    store: &InMemoryWorkshopStore,
    owner: &Client,
    plate: &str,
    baseline: Option<u32>,
) -> Vehicle {
    let mut details = VehicleDetails::new(plate, "Ford", "Focus").expect("valid details");
    if let Some(kilometres) = baseline {
        details = details.with_baseline_odometer(Odometer::new(kilometres));
    }
    let vehicle = Vehicle::new(owner.id(), details);
    store.store_vehicle(&vehicle).await.expect("vehicle stored");
    vehicle
}

pub(super) async fn seed_mechanic(store: &InMemoryWorkshopStore) -> Mechanic {
    let mechanic = Mechanic::new(
        PersonName::new("Luis", "Pereyra").expect("valid name"),
        ContactDetails::default(),
    );
    store.store_mechanic(&mechanic).await.expect("mechanic stored");
    mechanic
}

pub(super) async fn seed_appointment(
    store: &InMemoryWorkshopStore,
    vehicle: &Vehicle,
    mechanic: Option<&Mechanic>,
    booked: Slot,
) -> Appointment {
    let appointment = Appointment::schedule(
        vehicle.owner(),
        vehicle.id(),
        mechanic.map(Mechanic::id),
        booked,
        "brake noise",
    )
    .expect("valid appointment");
    store
        .store_appointment(&appointment)
        .await
        .expect("appointment stored");
    appointment
}
