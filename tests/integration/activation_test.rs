use studiofit::models::common::LessonKind;
use studiofit::services::{AttendanceRecorder, CreditLedger, PackageActivator};
use time::macros::date;

use crate::support::{
    attendance_request, create_test_lesson, create_test_member, reload_member, reload_packages,
    setup_test_db,
};

/// Drain a member's balance via attended included lessons
async fn drain(
    recorder: &AttendanceRecorder,
    member_id: i32,
    lesson_id: i32,
    start: time::Date,
    count: i64,
) {
    for i in 0..count {
        recorder
            .record_attendance(attendance_request(
                member_id,
                lesson_id,
                start + time::Duration::days(i),
                true,
                LessonKind::Included,
            ))
            .await
            .expect("Failed to record attendance");
    }
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_waiting_packages_activate_in_purchase_order() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup2", 2)
        .await
        .expect("Failed to purchase package");
    let first_queued = ledger
        .queue_package(member.id, "Grup3", 3)
        .await
        .expect("Failed to queue first package");
    let second_queued = ledger
        .queue_package(member.id, "Grup4", 4)
        .await
        .expect("Failed to queue second package");
    assert!(first_queued.id < second_queued.id);

    // Exhausting the active package activates the oldest waiting one
    drain(&recorder, member.id, lesson.id, date!(2025 - 04 - 01), 2).await;
    let m = reload_member(&db, member.id).await;
    assert_eq!(m.membership_type, "Grup3");
    assert_eq!(m.total_lessons, 5);
    assert_eq!(m.remaining_lessons, 3);

    // And the next exhaustion promotes the remaining one
    drain(&recorder, member.id, lesson.id, date!(2025 - 04 - 10), 3).await;
    let m = reload_member(&db, member.id).await;
    assert_eq!(m.membership_type, "Grup4");
    assert_eq!(m.total_lessons, 9);
    assert_eq!(m.remaining_lessons, 4);

    let packages = reload_packages(&db, member.id).await;
    let active: Vec<_> = packages.iter().filter(|p| p.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].package_name, "Grup4");
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_activate_waiting_is_a_noop_when_not_exhausted() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let activator = PackageActivator::new(db.clone());

    let member = create_test_member(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");
    ledger
        .queue_package(member.id, "Grup12", 12)
        .await
        .expect("Failed to queue package");

    let before = reload_member(&db, member.id).await;
    let activated = activator
        .activate_waiting(member.id)
        .await
        .expect("activate_waiting failed");

    assert!(activated.is_none());
    let after = reload_member(&db, member.id).await;
    assert_eq!(before, after);

    let packages = reload_packages(&db, member.id).await;
    assert!(!packages[1].is_active);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_activate_waiting_is_a_noop_without_candidates() {
    let db = setup_test_db().await;
    let activator = PackageActivator::new(db.clone());

    // A fresh member has nothing to activate
    let member = create_test_member(&db).await;
    let activated = activator
        .activate_waiting(member.id)
        .await
        .expect("activate_waiting failed");
    assert!(activated.is_none());
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_exhausted_member_stays_exhausted_without_waiting_package() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());
    let activator = PackageActivator::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup2", 2)
        .await
        .expect("Failed to purchase package");
    drain(&recorder, member.id, lesson.id, date!(2025 - 04 - 01), 2).await;

    let activated = activator
        .activate_waiting(member.id)
        .await
        .expect("activate_waiting failed");
    assert!(activated.is_none());

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.remaining_lessons, 0);
    assert_eq!(m.membership_type, "Grup2");
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_queueing_onto_exhausted_member_activates_immediately() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup2", 2)
        .await
        .expect("Failed to purchase package");
    drain(&recorder, member.id, lesson.id, date!(2025 - 04 - 01), 2).await;

    let queued = ledger
        .queue_package(member.id, "Grup3", 3)
        .await
        .expect("Failed to queue package");
    assert!(queued.is_active);

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.total_lessons, 5);
    assert_eq!(m.remaining_lessons, 3);
    assert_eq!(m.membership_type, "Grup3");
}
