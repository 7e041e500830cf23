use super::Db;
use crate::error::AppError;
use crate::models::{Category, CategoryInput};
use crate::validate::{self, MAX_CATEGORY_DESC_LEN, MAX_CATEGORY_NAME_LEN};

impl Db {
    pub async fn get_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_category_by_id(&self, category_id: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// The category id doubles as its slug, derived from the name. A name
    /// that slugifies to nothing is invalid; a duplicate slug conflicts.
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, AppError> {
        let name = validate::require_text(&input.name, "Category name", MAX_CATEGORY_NAME_LEN)?;
        let description = validate::optional_text(input.description.as_deref(), MAX_CATEGORY_DESC_LEN)?
            .unwrap_or_default();
        let slug = validate::slugify(&name);
        if slug.is_empty() {
            return Err(AppError::validation("Category name is invalid."));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, slug, description)
            VALUES ($1, $2, $1, $3)
            RETURNING id, name, slug, description
            "#,
        )
        .bind(&slug)
        .bind(&name)
        .bind(&description)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| AppError::conflict_on_unique(err, "Category already exists."))?;

        tracing::info!(slug = %category.slug, "category created");
        Ok(category)
    }

    /// A category stays deletable only while no quiz of any status
    /// references it.
    pub async fn delete_category(&self, category_id: &str) -> Result<(), AppError> {
        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quizzes WHERE category_id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        if in_use {
            return Err(AppError::conflict("Category is in use."));
        }

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Category not found."));
        }

        tracing::info!(%category_id, "category deleted");
        Ok(())
    }
}
