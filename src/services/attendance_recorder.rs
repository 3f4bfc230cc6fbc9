use crate::{
    error::{ApiError, Result},
    models::{
        attendance::{RecordAttendanceRequest, UpdateAttendanceRequest},
        common::LessonKind,
    },
    services::credit_ledger::{CreditLedger, Effect},
};
use anyhow::anyhow;
use sea_orm::{
    entity::*, query::*, DatabaseConnection, PaginatorTrait, TransactionTrait,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

/// Records lesson attendance and keeps the ledger in step. Edits follow a
/// strict revert-then-reapply protocol: the stored effect is refunded
/// before the merged effect is consumed.
pub struct AttendanceRecorder {
    db: DatabaseConnection,
    ledger: CreditLedger,
}

impl AttendanceRecorder {
    pub fn new(db: DatabaseConnection) -> Self {
        let ledger = CreditLedger::new(db.clone());
        Self { db, ledger }
    }

    /// Record one attendance event and consume its effect
    #[instrument(skip(self, request))]
    pub async fn record_attendance(
        &self,
        request: RecordAttendanceRequest,
    ) -> Result<entity::lesson_attendance::Model> {
        let txn = self.db.begin().await?;

        let member = self
            .ledger
            .find_and_lock_member(request.member_id, &txn)
            .await?;

        let lesson = entity::lessons::Entity::find_by_id(request.lesson_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Lesson {} not found", request.lesson_id)))?;

        // One event per member, lesson and date
        let existing = entity::lesson_attendance::Entity::find()
            .filter(entity::lesson_attendance::Column::MemberId.eq(request.member_id))
            .filter(entity::lesson_attendance::Column::LessonId.eq(request.lesson_id))
            .filter(entity::lesson_attendance::Column::LessonDate.eq(request.lesson_date))
            .count(&txn)
            .await?;

        if existing > 0 {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Attendance for member {} at lesson {} on {} already recorded",
                request.member_id, request.lesson_id, request.lesson_date
            )));
        }

        let effect = Effect::new(request.kind, request.attended);

        // Snapshot the package that will fund the lesson before consuming
        let funding = if effect.delta().package_credits > 0 {
            let package = self
                .ledger
                .oldest_package_with_balance(member.id, &txn)
                .await?
                .ok_or_else(|| {
                    ApiError::InsufficientBalance(format!(
                        "Member {} has no remaining lesson credits",
                        member.id
                    ))
                })?;
            Some(package)
        } else {
            None
        };

        let row = entity::lesson_attendance::ActiveModel {
            member_id: Set(request.member_id),
            lesson_id: Set(request.lesson_id),
            lesson_date: Set(request.lesson_date),
            attended: Set(request.attended),
            kind: Set(request.kind.as_str().to_string()),
            package_id: Set(funding.as_ref().map(|p| p.id)),
            package_name: Set(funding.as_ref().map(|p| p.package_name.clone())),
            notes: Set(request.notes.clone()),
            created_at: Set(OffsetDateTime::now_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        self.ledger.consume_in_txn(member, effect, &txn).await?;

        // Attended events also land in the generic check-in trail
        if request.attended {
            entity::attendance::ActiveModel {
                member_id: Set(request.member_id),
                check_in_time: Set(OffsetDateTime::now_utc()),
                check_out_time: Set(None),
                notes: Set(Some(lesson.name.clone())),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(
            "Recorded attendance: member={}, lesson={}, date={}, attended={}, kind={}",
            request.member_id,
            request.lesson_id,
            request.lesson_date,
            request.attended,
            request.kind.as_str()
        );

        Ok(row)
    }

    /// Edit a recorded event. The stored effect is refunded first, then
    /// the merged effect is consumed and the funding snapshot refreshed.
    #[instrument(skip(self, request))]
    pub async fn update_attendance(
        &self,
        id: i32,
        request: UpdateAttendanceRequest,
    ) -> Result<entity::lesson_attendance::Model> {
        let txn = self.db.begin().await?;

        // Resolve the owner first, then take the member lock before
        // re-reading the row under it
        let row = entity::lesson_attendance::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Attendance {} not found", id)))?;

        let member = self.ledger.find_and_lock_member(row.member_id, &txn).await?;

        let row = entity::lesson_attendance::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Attendance {} not found", id)))?;

        let old_kind = LessonKind::from_str(&row.kind)
            .ok_or_else(|| ApiError::Internal(anyhow!("Unknown lesson kind: {}", row.kind)))?;
        let old_effect = Effect::new(old_kind, row.attended);

        let new_attended = request.attended.unwrap_or(row.attended);
        let new_kind = request.kind.unwrap_or(old_kind);
        let new_date = request.lesson_date.unwrap_or(row.lesson_date);
        let new_effect = Effect::new(new_kind, new_attended);

        // Moving to another date must not collide with an existing event
        if new_date != row.lesson_date {
            let duplicate = entity::lesson_attendance::Entity::find()
                .filter(entity::lesson_attendance::Column::MemberId.eq(row.member_id))
                .filter(entity::lesson_attendance::Column::LessonId.eq(row.lesson_id))
                .filter(entity::lesson_attendance::Column::LessonDate.eq(new_date))
                .filter(entity::lesson_attendance::Column::Id.ne(row.id))
                .count(&txn)
                .await?;

            if duplicate > 0 {
                txn.rollback().await?;
                return Err(ApiError::Conflict(format!(
                    "Attendance for member {} at lesson {} on {} already recorded",
                    row.member_id, row.lesson_id, new_date
                )));
            }
        }

        // Revert the stored effect, then apply the new one
        let member = self
            .ledger
            .refund_in_txn(member, old_effect, row.package_id, &txn)
            .await?;
        let outcome = self.ledger.consume_in_txn(member, new_effect, &txn).await?;

        let mut row_active: entity::lesson_attendance::ActiveModel = row.into();
        row_active.attended = Set(new_attended);
        row_active.kind = Set(new_kind.as_str().to_string());
        row_active.lesson_date = Set(new_date);
        if let Some(notes) = request.notes {
            row_active.notes = Set(Some(notes));
        }
        row_active.package_id = Set(outcome.funding_package.as_ref().map(|p| p.id));
        row_active.package_name = Set(outcome
            .funding_package
            .as_ref()
            .map(|p| p.package_name.clone()));
        let row = row_active.update(&txn).await?;

        txn.commit().await?;

        info!("Updated attendance {}", id);

        Ok(row)
    }

    /// Remove an event, reversing the credit it consumed first
    #[instrument(skip(self))]
    pub async fn delete_attendance(&self, id: i32) -> Result<()> {
        let txn = self.db.begin().await?;

        let row = entity::lesson_attendance::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Attendance {} not found", id)))?;

        let member = self.ledger.find_and_lock_member(row.member_id, &txn).await?;

        let row = entity::lesson_attendance::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Attendance {} not found", id)))?;

        let kind = LessonKind::from_str(&row.kind)
            .ok_or_else(|| ApiError::Internal(anyhow!("Unknown lesson kind: {}", row.kind)))?;
        let effect = Effect::new(kind, row.attended);

        self.ledger
            .refund_in_txn(member, effect, row.package_id, &txn)
            .await?;

        entity::lesson_attendance::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Deleted attendance {}", id);

        Ok(())
    }

    /// Lesson history for a member, newest first
    #[instrument(skip(self))]
    pub async fn list_for_member(
        &self,
        member_id: i32,
    ) -> Result<Vec<entity::lesson_attendance::Model>> {
        self.require_member(member_id).await?;

        let rows = entity::lesson_attendance::Entity::find()
            .filter(entity::lesson_attendance::Column::MemberId.eq(member_id))
            .order_by_desc(entity::lesson_attendance::Column::LessonDate)
            .order_by_desc(entity::lesson_attendance::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Check-in trail for a member, newest first
    #[instrument(skip(self))]
    pub async fn checkins_for_member(
        &self,
        member_id: i32,
    ) -> Result<Vec<entity::attendance::Model>> {
        self.require_member(member_id).await?;

        let rows = entity::attendance::Entity::find()
            .filter(entity::attendance::Column::MemberId.eq(member_id))
            .order_by_desc(entity::attendance::Column::CheckInTime)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    async fn require_member(&self, member_id: i32) -> Result<()> {
        entity::members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        Ok(())
    }
}
