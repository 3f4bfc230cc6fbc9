use crate::{
    error::{ApiError, Result},
    models::members::{CreateMemberRequest, MemberDetailResponse, UpdateMemberRequest},
    services::credit_ledger::NO_PACKAGE_LABEL,
};
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use time::OffsetDateTime;
use tracing::{info, instrument};

pub struct MemberService {
    db: DatabaseConnection,
}

impl MemberService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a member. Counters start at zero; the ledger owns them
    /// from here on.
    #[instrument(skip(self, request))]
    pub async fn create_member(
        &self,
        request: CreateMemberRequest,
    ) -> Result<entity::members::Model> {
        let now = OffsetDateTime::now_utc();

        let member = entity::members::ActiveModel {
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            phone: Set(request.phone),
            email: Set(request.email),
            total_lessons: Set(0),
            attended_count: Set(0),
            absent_count: Set(0),
            extra_count: Set(0),
            remaining_lessons: Set(0),
            membership_type: Set(NO_PACKAGE_LABEL.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            "Created member {} ({} {})",
            member.id, member.first_name, member.last_name
        );

        Ok(member)
    }

    #[instrument(skip(self))]
    pub async fn list_members(&self, active: Option<bool>) -> Result<Vec<entity::members::Model>> {
        let mut query = entity::members::Entity::find();

        if let Some(active) = active {
            query = query.filter(entity::members::Column::IsActive.eq(active));
        }

        let members = query
            .order_by_asc(entity::members::Column::LastName)
            .order_by_asc(entity::members::Column::FirstName)
            .all(&self.db)
            .await?;

        Ok(members)
    }

    /// Member profile plus packages and recent lesson history
    #[instrument(skip(self))]
    pub async fn get_member(&self, member_id: i32) -> Result<MemberDetailResponse> {
        let member = entity::members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        let packages = entity::member_packages::Entity::find()
            .filter(entity::member_packages::Column::MemberId.eq(member_id))
            .order_by_asc(entity::member_packages::Column::Id)
            .all(&self.db)
            .await?;

        let recent_attendance = entity::lesson_attendance::Entity::find()
            .filter(entity::lesson_attendance::Column::MemberId.eq(member_id))
            .order_by_desc(entity::lesson_attendance::Column::LessonDate)
            .order_by_desc(entity::lesson_attendance::Column::Id)
            .limit(20)
            .all(&self.db)
            .await?;

        Ok(MemberDetailResponse {
            member,
            packages,
            recent_attendance,
        })
    }

    /// Update profile fields; ledger counters are not reachable from here
    #[instrument(skip(self, request))]
    pub async fn update_member(
        &self,
        member_id: i32,
        request: UpdateMemberRequest,
    ) -> Result<entity::members::Model> {
        let member = entity::members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        let mut member_active: entity::members::ActiveModel = member.into();

        if let Some(first_name) = request.first_name {
            member_active.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            member_active.last_name = Set(last_name);
        }
        if let Some(phone) = request.phone {
            member_active.phone = Set(Some(phone));
        }
        if let Some(email) = request.email {
            member_active.email = Set(Some(email));
        }
        if let Some(is_active) = request.is_active {
            member_active.is_active = Set(is_active);
        }
        member_active.updated_at = Set(OffsetDateTime::now_utc());

        let member = member_active.update(&self.db).await?;

        Ok(member)
    }

    /// Remove a member; packages, lesson history and check-ins go with
    /// them via the FK cascades
    #[instrument(skip(self))]
    pub async fn delete_member(&self, member_id: i32) -> Result<()> {
        let txn = self.db.begin().await?;

        entity::members::Entity::find_by_id(member_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Member {} not found", member_id)))?;

        entity::members::Entity::delete_by_id(member_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Deleted member {}", member_id);

        Ok(())
    }
}
