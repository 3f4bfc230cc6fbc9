use crate::{
    error::{ApiError, Result},
    models::lessons::{CreateLessonRequest, UpdateLessonRequest},
};
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};
use time::OffsetDateTime;
use tracing::{info, instrument};

pub struct LessonService {
    db: DatabaseConnection,
}

impl LessonService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Schedule a lesson; the same name at the same start time conflicts
    #[instrument(skip(self, request))]
    pub async fn create_lesson(
        &self,
        request: CreateLessonRequest,
    ) -> Result<entity::lessons::Model> {
        let existing = entity::lessons::Entity::find()
            .filter(entity::lessons::Column::Name.eq(&request.name))
            .filter(entity::lessons::Column::StartsAt.eq(request.starts_at))
            .count(&self.db)
            .await?;

        if existing > 0 {
            return Err(ApiError::Conflict(format!(
                "Lesson {} at {} already scheduled",
                request.name, request.starts_at
            )));
        }

        let lesson = entity::lessons::ActiveModel {
            name: Set(request.name),
            starts_at: Set(request.starts_at),
            capacity: Set(request.capacity),
            instructor: Set(request.instructor),
            is_active: Set(true),
            created_at: Set(OffsetDateTime::now_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Created lesson {} ({})", lesson.id, lesson.name);

        Ok(lesson)
    }

    #[instrument(skip(self))]
    pub async fn list_lessons(&self) -> Result<Vec<entity::lessons::Model>> {
        let lessons = entity::lessons::Entity::find()
            .order_by_desc(entity::lessons::Column::StartsAt)
            .all(&self.db)
            .await?;

        Ok(lessons)
    }

    #[instrument(skip(self, request))]
    pub async fn update_lesson(
        &self,
        lesson_id: i32,
        request: UpdateLessonRequest,
    ) -> Result<entity::lessons::Model> {
        let lesson = entity::lessons::Entity::find_by_id(lesson_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Lesson {} not found", lesson_id)))?;

        let mut lesson_active: entity::lessons::ActiveModel = lesson.into();

        if let Some(name) = request.name {
            lesson_active.name = Set(name);
        }
        if let Some(starts_at) = request.starts_at {
            lesson_active.starts_at = Set(starts_at);
        }
        if let Some(capacity) = request.capacity {
            lesson_active.capacity = Set(capacity);
        }
        if let Some(instructor) = request.instructor {
            lesson_active.instructor = Set(Some(instructor));
        }
        if let Some(is_active) = request.is_active {
            lesson_active.is_active = Set(is_active);
        }

        let lesson = lesson_active.update(&self.db).await?;

        Ok(lesson)
    }

    #[instrument(skip(self))]
    pub async fn delete_lesson(&self, lesson_id: i32) -> Result<()> {
        entity::lessons::Entity::find_by_id(lesson_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Lesson {} not found", lesson_id)))?;

        entity::lessons::Entity::delete_by_id(lesson_id)
            .exec(&self.db)
            .await?;

        info!("Deleted lesson {}", lesson_id);

        Ok(())
    }
}
