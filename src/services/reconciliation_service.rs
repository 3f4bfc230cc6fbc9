use crate::{
    error::{ApiError, Result},
    services::credit_ledger::NO_PACKAGE_LABEL,
};
use sea_orm::{
    entity::*, query::*, DatabaseConnection, PaginatorTrait, TransactionTrait,
};
use std::collections::HashSet;
use time::OffsetDateTime;
use tracing::{info, instrument};

/// Batch repair routines over already-stored aggregates. Both jobs are
/// idempotent and safe to re-run.
pub struct ReconciliationService {
    db: DatabaseConnection,
}

impl ReconciliationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Remove duplicate package rows. Per member and package name only the
    /// most recent row (highest id) survives; surviving balances are
    /// assumed to already reflect reality.
    #[instrument(skip(self))]
    pub async fn cleanup_duplicate_packages(&self) -> Result<u64> {
        // Candidate members first, without holding any lock
        let packages = entity::member_packages::Entity::find()
            .order_by_asc(entity::member_packages::Column::MemberId)
            .all(&self.db)
            .await?;

        let mut member_ids: Vec<i32> = packages.iter().map(|p| p.member_id).collect();
        member_ids.dedup();

        let mut removed = 0u64;
        for member_id in member_ids {
            removed += self.cleanup_member(member_id).await?;
        }

        info!("Duplicate package cleanup removed {} rows", removed);

        Ok(removed)
    }

    async fn cleanup_member(&self, member_id: i32) -> Result<u64> {
        let txn = self.db.begin().await?;

        // Member lock first, matching the ledger's lock order
        let member = entity::members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        if member.is_none() {
            txn.rollback().await?;
            return Ok(0);
        }

        let packages = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .order_by_asc(entity::member_packages::Column::PackageName)
            .order_by_desc(entity::member_packages::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut doomed: Vec<i32> = Vec::new();
        for package in &packages {
            if !seen.insert(package.package_name.clone()) {
                doomed.push(package.id);
            }
        }

        if doomed.is_empty() {
            txn.rollback().await?;
            return Ok(0);
        }

        let result = entity::member_packages::Entity::delete_many()
            .filter(entity::member_packages::Column::Id.is_in(doomed))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(result.rows_affected)
    }

    /// One-time repair for pre-package data: a member with purchased
    /// totals but no package rows gets one retroactive package matching
    /// the current counters.
    #[instrument(skip(self))]
    pub async fn backfill_package(
        &self,
        member_id: i32,
    ) -> Result<Option<entity::member_packages::Model>> {
        let txn = self.db.begin().await?;

        let member = entity::members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        let owned = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .count(&txn)
            .await?;

        if owned > 0 || (member.total_lessons <= 0 && member.remaining_lessons <= 0) {
            txn.rollback().await?;
            return Ok(None);
        }

        let package_name = if member.membership_type.is_empty()
            || member.membership_type == NO_PACKAGE_LABEL
        {
            "Legacy".to_string()
        } else {
            member.membership_type.clone()
        };

        let lesson_count = if member.total_lessons > 0 {
            member.total_lessons
        } else {
            member.remaining_lessons
        };

        let package = entity::member_packages::ActiveModel {
            member_id: Set(member_id),
            package_name: Set(package_name.clone()),
            lesson_count: Set(lesson_count),
            remaining_lessons: Set(member.remaining_lessons),
            is_active: Set(true),
            purchased_at: Set(OffsetDateTime::now_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "Backfilled package {} ({} lessons, {} remaining) for member {}",
            package_name, lesson_count, package.remaining_lessons, member_id
        );

        Ok(Some(package))
    }
}
