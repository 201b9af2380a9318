use std::sync::{Arc, Barrier};
use std::thread;

use clinic_booking::guard::LOGIN_PAGE;
use clinic_booking::view::{navbar_state, render_list};
use clinic_booking::{
    authenticate, create_appointment, AccessGuard, Appointment, AppointmentStore, CredentialList,
    FileStorage, GuardAction, MemoryStorage, SessionState, ValidationError,
};

#[test]
fn patient_books_and_admin_deletes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = AppointmentStore::new(FileStorage::new(dir.path().join("local.json")));
    let credentials = CredentialList::default();
    let guard = AccessGuard::default();

    let patient = SessionState::new(MemoryStorage::new());
    assert!(matches!(
        guard.enforce("turnos.html", &patient),
        GuardAction::Redirect { target, .. } if target == LOGIN_PAGE
    ));

    authenticate(&credentials, &patient, "paciente", "5678")?;
    assert_eq!(guard.enforce("turnos.html", &patient), GuardAction::Allow);

    create_appointment(&store, "Ana", "Dr. Perez", "2030-01-10")?;
    create_appointment(&store, "Luis", "Dra. Gomez", "2030-01-11")?;
    let err = create_appointment(&store, "Ana", "Dr. Perez", "2030-01-10").unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateAppointment));

    let view = render_list(&store.load(), &patient);
    assert_eq!(view.rows.len(), 2);
    assert!(view.rows.iter().all(|row| row.delete_index.is_none()));

    let admin = SessionState::new(MemoryStorage::new());
    authenticate(&credentials, &admin, "admin", "1234")?;
    let view = render_list(&store.load(), &admin);
    let target = view.rows[0].delete_index.expect("admin sees delete");
    store.remove_at(target)?;

    assert_eq!(
        store.load(),
        vec![Appointment::new("Luis", "Dra. Gomez", "2030-01-11")]
    );

    patient.logout();
    assert!(!patient.is_logged_in());
    assert_eq!(patient.current_identity(), None);
    assert!(navbar_state(&patient).show_login);
    Ok(())
}

#[test]
fn stored_list_survives_reopening_storage() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("local.json");

    create_appointment(
        &AppointmentStore::new(FileStorage::new(&path)),
        "Ana",
        "Dr. Perez",
        "2030-01-10",
    )?;

    let reopened = AppointmentStore::new(FileStorage::new(&path));
    assert_eq!(
        reopened.load(),
        vec![Appointment::new("Ana", "Dr. Perez", "2030-01-10")]
    );
    assert!(matches!(
        create_appointment(&reopened, "Ana", "Dr. Perez", "2030-01-10"),
        Err(ValidationError::DuplicateAppointment)
    ));
    Ok(())
}

#[test]
fn reads_list_written_in_stored_format() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("local.json");
    std::fs::write(
        &path,
        r#"{"turnos":"[{\"nombre\":\"Eva\",\"medico\":\"Dr. Perez\",\"fecha\":\"2030-02-01\"}]"}"#,
    )?;

    let store = AppointmentStore::new(FileStorage::new(&path));
    assert_eq!(
        store.load(),
        vec![Appointment::new("Eva", "Dr. Perez", "2030-02-01")]
    );
    Ok(())
}

#[test]
fn concurrent_bookings_are_all_kept() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(AppointmentStore::new(FileStorage::new(dir.path().join("local.json"))));
    let workers = 16;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                create_appointment(store.as_ref(), &format!("P{i}"), "Dr. Perez", "2030-01-10").is_ok()
            })
        })
        .collect();

    let succeeded = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .filter(|ok| *ok)
        .count();

    assert_eq!(succeeded, workers);
    let stored = store.load();
    assert_eq!(stored.len(), workers);
    for i in 0..workers {
        let name = format!("P{i}");
        assert!(stored.iter().any(|a| a.patient_name == name), "{name} missing");
    }
    Ok(())
}

#[test]
fn concurrent_identical_bookings_store_one() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(AppointmentStore::new(FileStorage::new(dir.path().join("local.json"))));
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                create_appointment(store.as_ref(), "Ana", "Dr. Perez", "2030-01-10")
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| matches!(err, ValidationError::DuplicateAppointment)));
    assert_eq!(store.load().len(), 1);
    Ok(())
}

#[test]
fn concurrent_deletes_remove_distinct_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(AppointmentStore::new(FileStorage::new(dir.path().join("local.json"))));
    for i in 0..10 {
        store.append(Appointment::new(format!("P{i}"), "Dr. Perez", "2030-01-10"))?;
    }
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.remove_at(0)
            })
        })
        .collect();

    let mut removed = Vec::new();
    for handle in handles {
        let appointment = handle.join().expect("worker panicked")?.expect("row removed");
        removed.push(appointment.patient_name);
    }
    removed.sort();

    assert_eq!(removed, vec!["P0", "P1", "P2", "P3"]);
    assert_eq!(store.load().len(), 6);
    Ok(())
}
