//! Diesel schema for workshop persistence.
//!
//! Column types are chosen to map identically on `PostgreSQL` and SQLite.

diesel::table! {
    /// Vehicle owners.
    clients (id) {
        /// Client identifier (UUID text).
        id -> Text,
        /// First name.
        first_name -> Text,
        /// Last name.
        last_name -> Text,
        /// Optional phone number.
        phone -> Nullable<Text>,
        /// Optional email address.
        email -> Nullable<Text>,
        /// Optional national ID, unique when present.
        national_id -> Nullable<Text>,
    }
}

diesel::table! {
    /// Vehicles registered to clients.
    vehicles (id) {
        /// Vehicle identifier (UUID text).
        id -> Text,
        /// Owning client.
        client_id -> Text,
        /// Normalized license plate, unique.
        plate -> Text,
        /// Make.
        make -> Text,
        /// Model.
        model -> Text,
        /// Optional model year.
        model_year -> Nullable<Integer>,
        /// Optional odometer reading at registration.
        baseline_odometer -> Nullable<BigInt>,
    }
}

diesel::table! {
    /// Shop mechanics.
    mechanics (id) {
        /// Mechanic identifier (UUID text).
        id -> Text,
        /// First name.
        first_name -> Text,
        /// Last name.
        last_name -> Text,
        /// Optional phone number.
        phone -> Nullable<Text>,
        /// Optional email address.
        email -> Nullable<Text>,
    }
}

diesel::table! {
    /// Booked workshop visits.
    appointments (id) {
        /// Appointment identifier (UUID text).
        id -> Text,
        /// Client who booked the visit.
        client_id -> Text,
        /// Vehicle to be inspected.
        vehicle_id -> Text,
        /// Optional assigned mechanic.
        mechanic_id -> Nullable<Text>,
        /// Scheduled date.
        scheduled_date -> Date,
        /// Scheduled time of day.
        scheduled_time -> Time,
        /// Reported problem.
        problem -> Text,
        /// Appointment status.
        status -> Text,
    }
}

diesel::table! {
    /// Workshop jobs.
    repairs (id) {
        /// Repair identifier (UUID text).
        id -> Text,
        /// Vehicle under repair.
        vehicle_id -> Text,
        /// Optional assigned mechanic.
        mechanic_id -> Nullable<Text>,
        /// Intake date.
        intake_date -> Date,
        /// Exit date.
        exit_date -> Nullable<Date>,
        /// Intake odometer reading.
        intake_odometer -> BigInt,
        /// Exit odometer reading.
        exit_odometer -> Nullable<BigInt>,
        /// Reported problem.
        problem -> Text,
        /// Work performed.
        work_performed -> Nullable<Text>,
        /// Parts used.
        parts_used -> Nullable<Text>,
        /// Labor cost.
        labor_cost -> Nullable<Double>,
        /// Total cost.
        total_cost -> Nullable<Double>,
        /// Repair status.
        status -> Text,
        /// Appointment the repair was promoted from, unique when present.
        origin_appointment_id -> Nullable<Text>,
        /// Creation timestamp (UTC).
        created_at -> Timestamp,
    }
}

diesel::joinable!(vehicles -> clients (client_id));
diesel::joinable!(repairs -> vehicles (vehicle_id));

diesel::allow_tables_to_appear_in_same_query!(clients, vehicles, mechanics, appointments, repairs);
