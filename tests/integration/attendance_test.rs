use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use studiofit::models::attendance::UpdateAttendanceRequest;
use studiofit::models::common::LessonKind;
use studiofit::services::{AttendanceRecorder, CreditLedger};
use studiofit::ApiError;
use time::macros::date;

use crate::support::{
    attendance_request, create_test_lesson, create_test_member, reload_member, reload_packages,
    setup_test_db,
};

fn update_request() -> UpdateAttendanceRequest {
    UpdateAttendanceRequest {
        attended: None,
        kind: None,
        lesson_date: None,
        notes: None,
    }
}

async fn checkin_count(db: &sea_orm::DatabaseConnection, member_id: i32) -> usize {
    entity::attendance::Entity::find()
        .filter(entity::attendance::Column::MemberId.eq(member_id))
        .all(db)
        .await
        .expect("Failed to load check-ins")
        .len()
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_duplicate_tuple_conflicts() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");

    recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 14),
            true,
            LessonKind::Included,
        ))
        .await
        .expect("Failed to record attendance");

    let duplicate = recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 14),
            false,
            LessonKind::Included,
        ))
        .await;

    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));

    // The failed duplicate must not have moved any counter
    let member = reload_member(&db, member.id).await;
    assert_eq!(member.attended_count, 1);
    assert_eq!(member.remaining_lessons, 7);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_record_rejects_unknown_references() {
    let db = setup_test_db().await;
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    let missing_member = recorder
        .record_attendance(attendance_request(
            member.id + 1_000_000,
            lesson.id,
            date!(2025 - 03 - 14),
            false,
            LessonKind::Extra,
        ))
        .await;
    assert!(matches!(missing_member, Err(ApiError::NotFound(_))));

    let missing_lesson = recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id + 1_000_000,
            date!(2025 - 03 - 14),
            false,
            LessonKind::Extra,
        ))
        .await;
    assert!(matches!(missing_lesson, Err(ApiError::NotFound(_))));
}

/// Round-trip: recording an attended included lesson and then marking it
/// absent restores the attended count and the funding package's balance
/// exactly.
#[tokio::test]
#[ignore] // Run only when database is available
async fn test_update_to_absent_round_trips() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");

    let row = recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 14),
            true,
            LessonKind::Included,
        ))
        .await
        .expect("Failed to record attendance");

    assert_eq!(row.package_name.as_deref(), Some("Grup8"));
    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 1);
    assert_eq!(m.remaining_lessons, 7);
    assert_eq!(reload_packages(&db, member.id).await[0].remaining_lessons, 7);

    recorder
        .update_attendance(
            row.id,
            UpdateAttendanceRequest {
                attended: Some(false),
                ..update_request()
            },
        )
        .await
        .expect("Failed to update attendance");

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 0);
    assert_eq!(m.absent_count, 1);
    assert_eq!(m.remaining_lessons, 8);
    assert_eq!(reload_packages(&db, member.id).await[0].remaining_lessons, 8);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_update_between_included_and_extra() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");

    let row = recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 14),
            true,
            LessonKind::Included,
        ))
        .await
        .expect("Failed to record attendance");

    // included -> extra frees the credit and books an extra lesson
    recorder
        .update_attendance(
            row.id,
            UpdateAttendanceRequest {
                kind: Some(LessonKind::Extra),
                ..update_request()
            },
        )
        .await
        .expect("Failed to update to extra");

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 0);
    assert_eq!(m.extra_count, 1);
    assert_eq!(m.remaining_lessons, 8);
    assert_eq!(reload_packages(&db, member.id).await[0].remaining_lessons, 8);

    // and back again
    recorder
        .update_attendance(
            row.id,
            UpdateAttendanceRequest {
                kind: Some(LessonKind::Included),
                ..update_request()
            },
        )
        .await
        .expect("Failed to update to included");

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 1);
    assert_eq!(m.extra_count, 0);
    assert_eq!(m.remaining_lessons, 7);
    assert_eq!(reload_packages(&db, member.id).await[0].remaining_lessons, 7);

    let row = entity::lesson_attendance::Entity::find_by_id(row.id)
        .one(&db)
        .await
        .expect("Failed to reload row")
        .expect("Row disappeared");
    assert_eq!(row.kind, "included");
    assert_eq!(row.package_name.as_deref(), Some("Grup8"));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_delete_attendance_reverses_the_credit() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");

    let row = recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 14),
            true,
            LessonKind::Included,
        ))
        .await
        .expect("Failed to record attendance");

    recorder
        .delete_attendance(row.id)
        .await
        .expect("Failed to delete attendance");

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 0);
    assert_eq!(m.remaining_lessons, 8);
    assert_eq!(reload_packages(&db, member.id).await[0].remaining_lessons, 8);

    let gone = entity::lesson_attendance::Entity::find_by_id(row.id)
        .one(&db)
        .await
        .expect("Failed to query row");
    assert!(gone.is_none());

    // The check-in trail is history and stays
    assert_eq!(checkin_count(&db, member.id).await, 1);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_checkin_trail_written_only_for_attended_events() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = AttendanceRecorder::new(db.clone());

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");

    recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 14),
            true,
            LessonKind::Included,
        ))
        .await
        .expect("Failed to record attended event");

    recorder
        .record_attendance(attendance_request(
            member.id,
            lesson.id,
            date!(2025 - 03 - 15),
            false,
            LessonKind::Included,
        ))
        .await
        .expect("Failed to record absent event");

    assert_eq!(checkin_count(&db, member.id).await, 1);

    // The absence was free but tallied
    let m = reload_member(&db, member.id).await;
    assert_eq!(m.absent_count, 1);
    assert_eq!(m.remaining_lessons, 7);
}
