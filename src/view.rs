use chrono::NaiveDate;
use maud::html;
use serde::Serialize;

use crate::session::SessionState;
use crate::storage::StorageBackend;
use crate::store::Appointment;

pub const EMPTY_LIST_MESSAGE: &str = "You have no appointments booked.";

/// One rendered appointment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentRow {
    pub index: usize,
    pub name: String,
    pub doctor: String,
    pub date: String,
    /// Index the delete button acts on; only present for admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentListView {
    pub rows: Vec<AppointmentRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavbarState {
    pub show_login: bool,
    pub show_logout: bool,
}

/// Settings handed to the date-picker widget on the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatePickerSettings {
    pub locale: String,
    pub min_date: String,
    pub date_format: &'static str,
}

/// Projects the list and session into a view; regenerated in full on every change.
pub fn render_list<B: StorageBackend>(
    appointments: &[Appointment],
    session: &SessionState<B>,
) -> AppointmentListView {
    let is_admin = session.is_admin();
    let rows: Vec<AppointmentRow> = appointments
        .iter()
        .enumerate()
        .map(|(index, appt)| AppointmentRow {
            index,
            name: appt.patient_name.clone(),
            doctor: appt.doctor.clone(),
            date: appt.date.clone(),
            delete_index: is_admin.then_some(index),
        })
        .collect();

    let empty_message = rows.is_empty().then_some(EMPTY_LIST_MESSAGE);
    AppointmentListView { rows, empty_message }
}

pub fn navbar_state<B: StorageBackend>(session: &SessionState<B>) -> NavbarState {
    let logged_in = session.is_logged_in();
    NavbarState {
        show_login: !logged_in,
        show_logout: logged_in,
    }
}

/// Renders the list view as the markup the "my appointments" container expects.
pub fn render_list_html(view: &AppointmentListView) -> String {
    let markup = match view.empty_message {
        Some(message) => html! {
            p class="text-muted" { (message) }
        },
        None => html! {
            ul class="list-group" {
                @for row in &view.rows {
                    li class="list-group-item d-flex justify-content-between align-items-center" {
                        (row.name) " - " (row.doctor) " - " (row.date)
                        @if let Some(index) = row.delete_index {
                            button class="btn btn-danger btn-sm" data-delete-index=(index) { "Delete" }
                        }
                    }
                }
            }
        },
    };

    markup.into_string()
}

/// Earliest selectable date is `today`.
pub fn date_picker_settings(locale: &str, today: NaiveDate) -> DatePickerSettings {
    DatePickerSettings {
        locale: locale.to_string(),
        min_date: today.format("%Y-%m-%d").to_string(),
        date_format: "Y-m-d",
    }
}

pub fn confirmation_message(appointment: &Appointment) -> String {
    format!(
        "Appointment requested: {}, with {} on {}.",
        appointment.patient_name, appointment.doctor, appointment.date
    )
}

pub fn welcome_message(username: &str) -> String {
    format!("Welcome, {}!", username)
}
