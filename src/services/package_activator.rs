use crate::{
    error::{ApiError, Result},
    services::credit_ledger::{derive_remaining, is_exhausted},
};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use tracing::{info, instrument};

/// Promotes waiting packages once the active balance is used up.
/// Packages move Waiting -> Active -> Exhausted; the exhausted state is
/// implicit in the member counters, there is no separate flag.
pub struct PackageActivator {
    db: DatabaseConnection,
}

impl PackageActivator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Activate the oldest waiting package, if any. Retires whatever is
    /// currently flagged active, adds the promoted package's credits to
    /// the member totals and mirrors its name as the membership label.
    ///
    /// The member row must already be locked by the caller's transaction.
    pub(crate) async fn promote_next(
        &self,
        member: entity::members::Model,
        txn: &DatabaseTransaction,
    ) -> Result<(
        entity::members::Model,
        Option<entity::member_packages::Model>,
    )> {
        let waiting = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member.id))
            .filter(entity::member_packages::Column::IsActive.eq(false))
            .order_by_asc(entity::member_packages::Column::Id)
            .lock_exclusive()
            .one(txn)
            .await?;

        let Some(package) = waiting else {
            return Ok((member, None));
        };

        // Retire the drained active package before promoting
        entity::member_packages::Entity::update_many()
            .col_expr(
                entity::member_packages::Column::IsActive,
                Expr::value(false),
            )
            .filter(entity::member_packages::Column::MemberId.eq(member.id))
            .filter(entity::member_packages::Column::IsActive.eq(true))
            .exec(txn)
            .await?;

        let lesson_count = package.lesson_count;
        let package_name = package.package_name.clone();

        let mut package_active: entity::member_packages::ActiveModel = package.into();
        package_active.is_active = Set(true);
        package_active.remaining_lessons = Set(lesson_count);
        let package = package_active.update(txn).await?;

        let total = member.total_lessons + lesson_count;
        let attended = member.attended_count;

        let mut member_active: entity::members::ActiveModel = member.into();
        member_active.total_lessons = Set(total);
        member_active.remaining_lessons = Set(derive_remaining(total, attended));
        member_active.membership_type = Set(package_name.clone());
        let member = member_active.update(txn).await?;

        info!(
            "Activated package {} ({} lessons) for member {}",
            package_name, lesson_count, member.id
        );

        Ok((member, Some(package)))
    }

    /// Administrative activation. Promotes only when the member is
    /// exhausted; anything else is a no-op, not an error, so the call is
    /// safe to repeat.
    #[instrument(skip(self))]
    pub async fn activate_waiting(
        &self,
        member_id: i32,
    ) -> Result<Option<entity::member_packages::Model>> {
        let txn = self.db.begin().await?;

        let member = entity::members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        if !is_exhausted(&member) {
            txn.rollback().await?;
            return Ok(None);
        }

        let (_, activated) = self.promote_next(member, &txn).await?;
        txn.commit().await?;

        Ok(activated)
    }
}
