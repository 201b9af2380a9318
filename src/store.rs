use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::storage::StorageBackend;

/// Storage slot holding the serialized appointment list.
pub const APPOINTMENTS_KEY: &str = "turnos";

/// A single booking request.
///
/// The serialized field names match the data already stored by the booking pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "nombre")]
    pub patient_name: String,
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "fecha")]
    pub date: String,
}

impl Appointment {
    pub fn new(
        patient_name: impl Into<String>,
        doctor: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            patient_name: patient_name.into(),
            doctor: doctor.into(),
            date: date.into(),
        }
    }

    /// Exact (name, doctor, date) equality, the duplicate rule.
    pub fn same_booking(&self, patient_name: &str, doctor: &str, date: &str) -> bool {
        self.patient_name == patient_name && self.doctor == doctor && self.date == date
    }
}

/// Owner of the persisted, insertion-ordered appointment list.
///
/// Every operation reads the full list; mutators rewrite it in full. An index
/// taken from `load` is only meaningful until the next mutation.
///
/// Mutators hold `write_lock` from the read to the rewrite, so writers sharing
/// one store never overwrite each other's changes.
pub struct AppointmentStore<B> {
    backend: B,
    write_lock: Mutex<()>,
}

impl<B: StorageBackend> AppointmentStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the stored list, or an empty one if nothing is stored or it fails to parse.
    pub fn load(&self) -> Vec<Appointment> {
        let Some(raw) = self.backend.get_item(APPOINTMENTS_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Option<Vec<Appointment>>>(&raw) {
            Ok(list) => list.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "stored appointment list is unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn append(&self, appointment: Appointment) -> Result<(), StorageError> {
        let _guard = self.lock();
        let mut appointments = self.load();
        self.push_and_save(&mut appointments, appointment)
    }

    /// Appends unless an entry with the same (name, doctor, date) is already stored.
    /// Returns `Ok(false)` without writing when it is.
    pub fn append_unique(&self, appointment: Appointment) -> Result<bool, StorageError> {
        let _guard = self.lock();
        let mut appointments = self.load();
        if appointments.iter().any(|existing| {
            existing.same_booking(&appointment.patient_name, &appointment.doctor, &appointment.date)
        }) {
            return Ok(false);
        }
        self.push_and_save(&mut appointments, appointment)?;
        Ok(true)
    }

    /// Removes the entry at `index`. An index outside the current list is a no-op
    /// and yields `Ok(None)`.
    pub fn remove_at(&self, index: usize) -> Result<Option<Appointment>, StorageError> {
        let _guard = self.lock();
        let mut appointments = self.load();
        if index >= appointments.len() {
            debug!(index, len = appointments.len(), "delete index out of range, ignoring");
            return Ok(None);
        }

        let removed = appointments.remove(index);
        self.save(&appointments)?;
        info!(index, remaining = appointments.len(), "appointment removed");
        Ok(Some(removed))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_and_save(
        &self,
        appointments: &mut Vec<Appointment>,
        appointment: Appointment,
    ) -> Result<(), StorageError> {
        appointments.push(appointment);
        self.save(appointments)?;
        info!(count = appointments.len(), "appointment stored");
        Ok(())
    }

    fn save(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        let json = serde_json::to_string(appointments)?;
        self.backend.set_item(APPOINTMENTS_KEY, &json)
    }
}
