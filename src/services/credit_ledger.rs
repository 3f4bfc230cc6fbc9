use crate::{
    error::{ApiError, Result},
    models::common::LessonKind,
    services::package_activator::PackageActivator,
};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, DatabaseConnection, DatabaseTransaction, PaginatorTrait,
    TransactionTrait,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

/// Membership label for members without any package
pub const NO_PACKAGE_LABEL: &str = "Paketsiz";

/// One attendance event as the ledger sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub kind: LessonKind,
    pub attended: bool,
}

/// Counter movement caused by a single effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDelta {
    pub attended: i32,
    pub absent: i32,
    pub extra: i32,
    pub package_credits: i32,
}

impl Effect {
    pub fn new(kind: LessonKind, attended: bool) -> Self {
        Self { kind, attended }
    }

    /// Counter movement of this effect. Consume applies the delta, refund
    /// applies its negation; only an attended included lesson draws a
    /// package credit.
    pub fn delta(&self) -> CounterDelta {
        match (self.kind, self.attended) {
            (LessonKind::Included, true) => CounterDelta {
                attended: 1,
                package_credits: 1,
                ..Default::default()
            },
            (LessonKind::Included, false) => CounterDelta {
                absent: 1,
                ..Default::default()
            },
            (LessonKind::Extra, true) => CounterDelta {
                extra: 1,
                ..Default::default()
            },
            (LessonKind::Extra, false) => CounterDelta {
                extra: 1,
                absent: 1,
                ..Default::default()
            },
        }
    }
}

/// The only formula for a member's remaining balance
pub fn derive_remaining(total_lessons: i32, attended_count: i32) -> i32 {
    (total_lessons - attended_count).max(0)
}

/// A member whose purchased credits are fully used up
pub fn is_exhausted(member: &entity::members::Model) -> bool {
    member.total_lessons > 0 && member.remaining_lessons == 0
}

/// Result of a consume: the updated member plus the package that funded it
pub struct ConsumeOutcome {
    pub member: entity::members::Model,
    pub funding_package: Option<entity::member_packages::Model>,
}

/// The single writer for member counters and package balances. Every
/// mutation runs in a transaction holding the member row lock, so
/// concurrent requests for one member serialize.
pub struct CreditLedger {
    db: DatabaseConnection,
    activator: PackageActivator,
}

impl CreditLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        let activator = PackageActivator::new(db.clone());
        Self { db, activator }
    }

    /// Lock the member row for the duration of a ledger transaction
    pub(crate) async fn find_and_lock_member(
        &self,
        member_id: i32,
        txn: &DatabaseTransaction,
    ) -> Result<entity::members::Model> {
        entity::members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))
    }

    /// Oldest package that still has balance, locked for update
    pub(crate) async fn oldest_package_with_balance(
        &self,
        member_id: i32,
        txn: &DatabaseTransaction,
    ) -> Result<Option<entity::member_packages::Model>> {
        let package = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .filter(entity::member_packages::Column::RemainingLessons.gt(0))
            .order_by_asc(entity::member_packages::Column::Id)
            .lock_exclusive()
            .one(txn)
            .await?;

        Ok(package)
    }

    /// Record a package purchase for a member who owns none
    #[instrument(skip(self))]
    pub async fn purchase(
        &self,
        member_id: i32,
        package_name: &str,
        lesson_count: i32,
    ) -> Result<entity::member_packages::Model> {
        let txn = self.db.begin().await?;
        let member = self.find_and_lock_member(member_id, &txn).await?;

        // Single-package business rule: any owned row conflicts, waiting
        // or drained alike
        let owned = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .count(&txn)
            .await?;

        if owned > 0 {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Member {} already owns a package",
                member_id
            )));
        }

        let package = self
            .start_package(member, package_name, lesson_count, &txn)
            .await?;

        txn.commit().await?;

        info!(
            "Purchased package {} ({} lessons) for member {}",
            package_name, lesson_count, member_id
        );

        Ok(package)
    }

    /// Queue an additional package; it waits until the current balance is
    /// exhausted. For a member without any package this is a purchase.
    #[instrument(skip(self))]
    pub async fn queue_package(
        &self,
        member_id: i32,
        package_name: &str,
        lesson_count: i32,
    ) -> Result<entity::member_packages::Model> {
        let txn = self.db.begin().await?;
        let member = self.find_and_lock_member(member_id, &txn).await?;

        let owned = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .count(&txn)
            .await?;

        if owned == 0 {
            let package = self
                .start_package(member, package_name, lesson_count, &txn)
                .await?;
            txn.commit().await?;

            info!(
                "Queued package {} for packageless member {}; started immediately",
                package_name, member_id
            );

            return Ok(package);
        }

        // Duplicate assignment guard: one row per package name and member;
        // same-name duplicates are what the cleanup job exists to repair
        let duplicate = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .filter(entity::member_packages::Column::PackageName.eq(package_name))
            .count(&txn)
            .await?;

        if duplicate > 0 {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Member {} already owns a package named {}",
                member_id, package_name
            )));
        }

        let mut package = self
            .insert_package(member_id, package_name, lesson_count, false, &txn)
            .await?;

        // Queueing onto an exhausted member activates right away
        if is_exhausted(&member) {
            let (_, activated) = self.activator.promote_next(member, &txn).await?;
            if let Some(activated) = activated {
                if activated.id == package.id {
                    package = activated;
                }
            }
        }

        txn.commit().await?;

        info!(
            "Queued package {} ({} lessons) for member {}",
            package_name, lesson_count, member_id
        );

        Ok(package)
    }

    /// Apply one attendance effect to a locked member. Fires package
    /// activation when the consume drains the balance.
    pub(crate) async fn consume_in_txn(
        &self,
        member: entity::members::Model,
        effect: Effect,
        txn: &DatabaseTransaction,
    ) -> Result<ConsumeOutcome> {
        let delta = effect.delta();

        let mut member = member;
        let funding_package = if delta.package_credits > 0 {
            // A stale exhausted state with a queued package heals here
            // before the credit is drawn
            if is_exhausted(&member) {
                let (promoted, _) = self.activator.promote_next(member, txn).await?;
                member = promoted;
            }

            let package = self
                .oldest_package_with_balance(member.id, txn)
                .await?
                .ok_or_else(|| {
                    ApiError::InsufficientBalance(format!(
                        "Member {} has no remaining lesson credits",
                        member.id
                    ))
                })?;

            let remaining = package.remaining_lessons - delta.package_credits;
            let mut package_active: entity::member_packages::ActiveModel = package.into();
            package_active.remaining_lessons = Set(remaining);
            Some(package_active.update(txn).await?)
        } else {
            None
        };

        let total = member.total_lessons;
        let attended = member.attended_count + delta.attended;
        let absent = member.absent_count + delta.absent;
        let extra = member.extra_count + delta.extra;

        let mut member_active: entity::members::ActiveModel = member.into();
        member_active.attended_count = Set(attended);
        member_active.absent_count = Set(absent);
        member_active.extra_count = Set(extra);
        member_active.remaining_lessons = Set(derive_remaining(total, attended));
        let mut member = member_active.update(txn).await?;

        // Draining the last credit promotes the next waiting package
        if delta.package_credits > 0 && is_exhausted(&member) {
            let (promoted, _) = self.activator.promote_next(member, txn).await?;
            member = promoted;
        }

        Ok(ConsumeOutcome {
            member,
            funding_package,
        })
    }

    /// Exact inverse of consume. The credit returns to the snapshot
    /// package when it still exists, otherwise to the most recently
    /// drained one; counters saturate at zero.
    pub(crate) async fn refund_in_txn(
        &self,
        member: entity::members::Model,
        effect: Effect,
        funding_package_id: Option<i32>,
        txn: &DatabaseTransaction,
    ) -> Result<entity::members::Model> {
        let delta = effect.delta();

        if delta.package_credits > 0 {
            let snapshot = match funding_package_id {
                Some(id) => {
                    entity::member_packages::Entity::find_by_id(id)
                        .filter(entity::member_packages::Column::MemberId.eq(member.id))
                        .lock_exclusive()
                        .one(txn)
                        .await?
                }
                None => None,
            };

            let target = match snapshot {
                Some(package) => Some(package),
                None => {
                    entity::member_packages::Entity::find()
                        .filter(entity::member_packages::Column::MemberId.eq(member.id))
                        .filter(
                            Expr::col(entity::member_packages::Column::RemainingLessons)
                                .lt(Expr::col(entity::member_packages::Column::LessonCount)),
                        )
                        .order_by_desc(entity::member_packages::Column::Id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                }
            };

            // With every package gone there is nothing to credit; the
            // counter reversal below still applies
            if let Some(package) = target {
                let restored =
                    (package.remaining_lessons + delta.package_credits).min(package.lesson_count);
                let mut package_active: entity::member_packages::ActiveModel = package.into();
                package_active.remaining_lessons = Set(restored);
                package_active.update(txn).await?;
            }
        }

        let total = member.total_lessons;
        let attended = (member.attended_count - delta.attended).max(0);
        let absent = (member.absent_count - delta.absent).max(0);
        let extra = (member.extra_count - delta.extra).max(0);

        let mut member_active: entity::members::ActiveModel = member.into();
        member_active.attended_count = Set(attended);
        member_active.absent_count = Set(absent);
        member_active.extra_count = Set(extra);
        member_active.remaining_lessons = Set(derive_remaining(total, attended));
        let member = member_active.update(txn).await?;

        Ok(member)
    }

    /// Remove a package outright. The member's aggregates are zeroed; if
    /// the deleted package was the active one, the next waiting package is
    /// promoted on top of the zeroed state.
    #[instrument(skip(self))]
    pub async fn delete_package(&self, package_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;

        let package = entity::member_packages::Entity::find_by_id(package_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Package {} not found", package_id)))?;

        let was_active = package.is_active;
        let member_id = package.member_id;

        // Member lock comes first, matching every other ledger path
        let member = entity::members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        entity::member_packages::Entity::delete_by_id(package_id)
            .exec(&txn)
            .await?;

        // The member may be mid-deletion elsewhere; removing the package
        // row alone is still correct
        if let Some(member) = member {
            let mut member_active: entity::members::ActiveModel = member.into();
            member_active.total_lessons = Set(0);
            member_active.attended_count = Set(0);
            member_active.absent_count = Set(0);
            member_active.extra_count = Set(0);
            member_active.remaining_lessons = Set(0);
            member_active.membership_type = Set(NO_PACKAGE_LABEL.to_string());
            let member = member_active.update(&txn).await?;

            if was_active {
                self.activator.promote_next(member, &txn).await?;
            }
        }

        txn.commit().await?;

        info!("Deleted package {} of member {}", package_id, member_id);

        Ok(())
    }

    /// Packages of a member, oldest first
    #[instrument(skip(self))]
    pub async fn list_packages(
        &self,
        member_id: i32,
    ) -> Result<Vec<entity::member_packages::Model>> {
        entity::members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        let packages = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .order_by_asc(entity::member_packages::Column::Id)
            .all(&self.db)
            .await?;

        Ok(packages)
    }

    /// First package for a member: created active with the member's
    /// aggregates reset to its totals
    async fn start_package(
        &self,
        member: entity::members::Model,
        package_name: &str,
        lesson_count: i32,
        txn: &DatabaseTransaction,
    ) -> Result<entity::member_packages::Model> {
        let package = self
            .insert_package(member.id, package_name, lesson_count, true, txn)
            .await?;

        let mut member_active: entity::members::ActiveModel = member.into();
        member_active.total_lessons = Set(lesson_count);
        member_active.attended_count = Set(0);
        member_active.absent_count = Set(0);
        member_active.extra_count = Set(0);
        member_active.remaining_lessons = Set(lesson_count);
        member_active.membership_type = Set(package_name.to_string());
        member_active.update(txn).await?;

        Ok(package)
    }

    async fn insert_package(
        &self,
        member_id: i32,
        package_name: &str,
        lesson_count: i32,
        is_active: bool,
        txn: &DatabaseTransaction,
    ) -> Result<entity::member_packages::Model> {
        let package = entity::member_packages::ActiveModel {
            member_id: Set(member_id),
            package_name: Set(package_name.to_string()),
            lesson_count: Set(lesson_count),
            remaining_lessons: Set(lesson_count),
            is_active: Set(is_active),
            purchased_at: Set(OffsetDateTime::now_utc()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(package)
    }
}
