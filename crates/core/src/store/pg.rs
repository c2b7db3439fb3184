use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ActivityImageStore, ContentStore, StoreError};
use crate::activity::{ActivityImage, ActivityImageUpdate, NewActivityImage};
use crate::content::{ContentRow, ContentType, LinkType};

/// PostgreSQL-backed store over the `page_content` and `activity_images`
/// tables.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Database row representation of a content row.
#[derive(Debug, sqlx::FromRow)]
struct PageContentRecord {
    page: String,
    section: String,
    content_key: String,
    content_value: String,
    content_type: String,
    link_type: Option<String>,
    display_order: i32,
}

impl From<PageContentRecord> for ContentRow {
    fn from(record: PageContentRecord) -> Self {
        let content_type = record
            .content_type
            .parse::<ContentType>()
            .unwrap_or_default();
        Self {
            page: record.page,
            section: record.section,
            content_key: record.content_key,
            content_value: record.content_value,
            content_type,
            link_type: record.link_type.as_deref().and_then(LinkType::parse),
            display_order: record.display_order,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn fetch_rows(
        &self,
        page: &str,
        section: Option<&str>,
    ) -> Result<Vec<ContentRow>, StoreError> {
        let records = sqlx::query_as::<_, PageContentRecord>(
            r#"
            SELECT page, section, content_key, content_value, content_type, link_type, display_order
            FROM page_content
            WHERE page = $1 AND ($2::text IS NULL OR section = $2)
            ORDER BY display_order, id
            "#,
        )
        .bind(page)
        .bind(section)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(ContentRow::from).collect())
    }

    async fn delete_page(&self, page: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM page_content WHERE page = $1")
            .bind(page)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_rows(&self, rows: &[ContentRow]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO page_content \
             (page, section, content_key, content_value, content_type, link_type, display_order) ",
        );
        builder.push_values(rows, |mut b, row| {
            b.push_bind(&row.page)
                .push_bind(&row.section)
                .push_bind(&row.content_key)
                .push_bind(&row.content_value)
                .push_bind(row.content_type.as_str())
                .push_bind(row.link_type.map(|l| l.as_str()))
                .push_bind(row.display_order);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn page_counts(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT page, COUNT(*) FROM page_content GROUP BY page ORDER BY page",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityImageStore for PgStore {
    async fn list_images(&self, category: Option<&str>) -> Result<Vec<ActivityImage>, StoreError> {
        let images = sqlx::query_as::<_, ActivityImage>(
            r#"
            SELECT id, key, image_url, title, description, learn_more, category, display_order
            FROM activity_images
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY display_order, title
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    async fn create_image(&self, new: NewActivityImage) -> Result<ActivityImage, StoreError> {
        let next_order: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM activity_images WHERE category = $1",
        )
        .bind(&new.category)
        .fetch_one(&self.pool)
        .await?;

        let image = ActivityImage::from_new(new, next_order);

        let inserted = sqlx::query_as::<_, ActivityImage>(
            r#"
            INSERT INTO activity_images
                (id, key, image_url, title, description, learn_more, category, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (key) DO NOTHING
            RETURNING id, key, image_url, title, description, learn_more, category, display_order
            "#,
        )
        .bind(image.id)
        .bind(&image.key)
        .bind(&image.image_url)
        .bind(&image.title)
        .bind(&image.description)
        .bind(&image.learn_more)
        .bind(&image.category)
        .bind(image.display_order)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| StoreError::Conflict(format!("image key '{}' exists", image.key)))
    }

    async fn update_image(
        &self,
        id: Uuid,
        update: ActivityImageUpdate,
    ) -> Result<ActivityImage, StoreError> {
        let updated = sqlx::query_as::<_, ActivityImage>(
            r#"
            UPDATE activity_images SET
                key = COALESCE($2, key),
                image_url = COALESCE($3, image_url),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                learn_more = COALESCE($6, learn_more),
                category = COALESCE($7, category),
                display_order = COALESCE($8, display_order)
            WHERE id = $1
            RETURNING id, key, image_url, title, description, learn_more, category, display_order
            "#,
        )
        .bind(id)
        .bind(update.key)
        .bind(update.image_url)
        .bind(update.title)
        .bind(update.description)
        .bind(update.learn_more)
        .bind(update.category)
        .bind(update.display_order)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| StoreError::NotFound(format!("activity image {id}")))
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM activity_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_images(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for (order, id) in ids.iter().enumerate() {
            sqlx::query("UPDATE activity_images SET display_order = $2 WHERE id = $1")
                .bind(id)
                .bind(order as i32)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
