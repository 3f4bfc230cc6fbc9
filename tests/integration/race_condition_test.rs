//! Concurrency behavior of the ledger: every mutation for one member
//! runs under that member's row lock, so parallel check-ins must never
//! lose an update or consume more credits than the member owns.

use std::sync::Arc;
use studiofit::models::common::LessonKind;
use studiofit::services::{AttendanceRecorder, CreditLedger};
use studiofit::ApiError;
use time::macros::date;
use tokio::task::JoinSet;

use crate::support::{
    attendance_request, create_test_lesson, create_test_member, reload_member, reload_packages,
    setup_test_db,
};

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_concurrent_checkins_never_overconsume() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = Arc::new(AttendanceRecorder::new(db.clone()));

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup5", 5)
        .await
        .expect("Failed to purchase package");

    // Ten parallel check-ins race for five credits
    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let recorder = recorder.clone();
        let member_id = member.id;
        let lesson_id = lesson.id;

        tasks.spawn(async move {
            recorder
                .record_attendance(attendance_request(
                    member_id,
                    lesson_id,
                    date!(2025 - 05 - 01) + time::Duration::days(i),
                    true,
                    LessonKind::Included,
                ))
                .await
        });
    }

    let mut success_count = 0;
    let mut exhausted_count = 0;
    let mut other_error_count = 0;

    while let Some(result) = tasks.join_next().await {
        match result.expect("Task panicked") {
            Ok(_) => success_count += 1,
            Err(ApiError::InsufficientBalance(_)) => exhausted_count += 1,
            Err(e) => {
                println!("Unexpected error: {}", e);
                other_error_count += 1;
            }
        }
    }

    // Exactly the purchased credits were consumed, the rest refused
    assert_eq!(success_count, 5, "Expected exactly 5 successful check-ins");
    assert_eq!(
        exhausted_count, 5,
        "Expected 5 insufficient-balance refusals"
    );
    assert_eq!(other_error_count, 0, "Expected no other errors");

    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 5);
    assert_eq!(m.remaining_lessons, 0);
    assert_eq!(
        m.remaining_lessons,
        (m.total_lessons - m.attended_count).max(0)
    );

    let packages = reload_packages(&db, member.id).await;
    assert_eq!(packages[0].remaining_lessons, 0);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn test_concurrent_duplicate_tuples_yield_one_row() {
    let db = setup_test_db().await;
    let ledger = CreditLedger::new(db.clone());
    let recorder = Arc::new(AttendanceRecorder::new(db.clone()));

    let member = create_test_member(&db).await;
    let lesson = create_test_lesson(&db).await;

    ledger
        .purchase(member.id, "Grup8", 8)
        .await
        .expect("Failed to purchase package");

    // Five identical events race; the tuple is unique
    let mut tasks = JoinSet::new();
    for _ in 0..5 {
        let recorder = recorder.clone();
        let member_id = member.id;
        let lesson_id = lesson.id;

        tasks.spawn(async move {
            recorder
                .record_attendance(attendance_request(
                    member_id,
                    lesson_id,
                    date!(2025 - 05 - 01),
                    true,
                    LessonKind::Included,
                ))
                .await
        });
    }

    let mut success_count = 0;
    let mut conflict_count = 0;

    while let Some(result) = tasks.join_next().await {
        match result.expect("Task panicked") {
            Ok(_) => success_count += 1,
            Err(ApiError::Conflict(_)) => conflict_count += 1,
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    assert_eq!(success_count, 1, "Expected exactly 1 recorded event");
    assert_eq!(conflict_count, 4, "Expected 4 Conflict responses");

    // Exactly one credit left the ledger
    let m = reload_member(&db, member.id).await;
    assert_eq!(m.attended_count, 1);
    assert_eq!(m.remaining_lessons, 7);
}
