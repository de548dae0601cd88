//! Listing orders shared by every adapter.

use crate::workshop::domain::{Appointment, Client, Mechanic, Repair};
use std::cmp::Reverse;

/// Orders clients by last name, then first name.
pub(crate) fn sort_clients(clients: &mut [Client]) {
    clients.sort_by(|a, b| {
        (a.name().last(), a.name().first()).cmp(&(b.name().last(), b.name().first()))
    });
}

/// Orders mechanics by last name, then first name.
pub(crate) fn sort_mechanics(mechanics: &mut [Mechanic]) {
    mechanics.sort_by(|a, b| {
        (a.name().last(), a.name().first()).cmp(&(b.name().last(), b.name().first()))
    });
}

/// Orders appointments newest slot first.
pub(crate) fn sort_appointments(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|appointment| Reverse(appointment.slot()));
}

/// Orders a vehicle history by intake date, then creation time, newest
/// first.
pub(crate) fn sort_history(repairs: &mut [Repair]) {
    repairs.sort_by_key(|repair| Reverse((repair.intake_date(), repair.created_at())));
}

/// Orders active repairs by status precedence, then newest intake first.
pub(crate) fn sort_shop_floor(repairs: &mut [Repair]) {
    repairs.sort_by_key(|repair| {
        (
            repair.status().shop_precedence(),
            Reverse(repair.intake_date()),
        )
    });
}
