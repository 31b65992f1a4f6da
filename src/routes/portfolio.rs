/**
 * Portfolio Routes
 * Polymorphic content items (videos, blogs, case studies, images) with
 * type-conditional validation and the read filters the marketing site uses
 */
use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::PortfolioItem;
use crate::error::AppError;
use crate::routes::{AppJson, auth::AuthUser, clamp_limit, created, ok, pool};

// ============================================================================
// Request/Response Types
// ============================================================================

/// The item types the store accepts.
pub const VALID_TYPES: &[&str] = &["video", "blog", "case-study", "image"];

/// Column list shared by every portfolio query.
const ITEM_COLUMNS: &str = "id, item_type, title, description, category, industry, client_name, \
     image_url, featured, video_url, duration, author, read_time, publish_date, \
     content, blog_url, excerpt, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct PortfolioListQuery {
    pub limit: Option<i64>,
    pub featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// Request body for POST /api/portfolio. `type` may be omitted when the
/// payload is recognizably a video; `date` is the legacy alias the old
/// frontend sent for `publishDate`. Dates arrive as strings because the
/// admin UI has historically sent both full timestamps and bare days.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub client_name: Option<String>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub video_url: Option<String>,
    pub duration: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
    pub publish_date: Option<String>,
    pub content: Option<String>,
    pub blog_url: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
}

/// Request body for PUT/PATCH /api/portfolio/{id}.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub client_name: Option<String>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub video_url: Option<String>,
    pub duration: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
    pub publish_date: Option<String>,
    pub content: Option<String>,
    pub blog_url: Option<String>,
    pub excerpt: Option<String>,
}

/// Wire shape of a portfolio item. Keeps the legacy virtuals the frontend
/// still reads: `type` for the discriminator and `date` for the publish
/// date, falling back to the creation time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItemResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub industry: Option<String>,
    pub client_name: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub video_url: Option<String>,
    pub duration: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub content: Option<String>,
    pub blog_url: Option<String>,
    pub excerpt: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PortfolioItem> for PortfolioItemResponse {
    fn from(item: PortfolioItem) -> Self {
        PortfolioItemResponse {
            id: item.id,
            item_type: item.item_type,
            title: item.title,
            description: item.description,
            category: item.category,
            industry: item.industry,
            client_name: item.client_name,
            image_url: item.image_url,
            featured: item.featured,
            video_url: item.video_url,
            duration: item.duration,
            author: item.author,
            read_time: item.read_time,
            publish_date: item.publish_date,
            content: item.content,
            blog_url: item.blog_url,
            excerpt: item.excerpt,
            date: item.publish_date.unwrap_or(item.created_at),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total: i64,
    pub by_type: HashMap<String, i64>,
    pub featured: i64,
}

/// Videos longest-first with the combined runtime.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosByDuration {
    pub videos: Vec<PortfolioItemResponse>,
    pub total_seconds: i64,
}

// ============================================================================
// Validation & Normalization
// ============================================================================

fn is_valid_type(item_type: &str) -> bool {
    VALID_TYPES.contains(&item_type)
}

fn invalid_type_error() -> AppError {
    AppError::Validation(format!("Type must be one of: {}", VALID_TYPES.join(", ")))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Parse a display duration like "3:45" or "1:02:30" into seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<i64> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let mut values = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        values.push(part.parse::<i64>().ok()?);
    }

    match values.as_slice() {
        [minutes, seconds] if *seconds < 60 => Some(minutes * 60 + seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => {
            Some(hours * 3600 + minutes * 60 + seconds)
        }
        _ => None,
    }
}

/// Accept RFC 3339 timestamps or bare `YYYY-MM-DD` days, both of which the
/// admin frontend has sent over the years.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(parsed.and_time(NaiveTime::MIN).and_utc());
    }
    Err(AppError::Validation(format!("Invalid date: {}", raw)))
}

/// Escape LIKE wildcards so a search for "100%" matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// The resolved column values an insert or update will write. Creates and
/// updates both funnel through `validate`, so the type-conditional rules
/// hold no matter how an item got its shape.
#[derive(Debug)]
struct ItemDraft {
    item_type: String,
    title: String,
    description: Option<String>,
    category: Option<String>,
    industry: Option<String>,
    client_name: Option<String>,
    image_url: Option<String>,
    featured: bool,
    video_url: Option<String>,
    duration: Option<String>,
    author: Option<String>,
    read_time: Option<String>,
    publish_date: Option<DateTime<Utc>>,
    content: Option<String>,
    blog_url: Option<String>,
    excerpt: Option<String>,
}

impl ItemDraft {
    /// Normalizes a create payload the way the legacy store hook did: a
    /// payload carrying `videoUrl` + `duration` but no `type` becomes a
    /// video, and the old `date` field stands in for a missing
    /// `publishDate`. Rich-text content is sanitized before it is stored.
    fn from_create(payload: CreatePortfolioRequest) -> Result<Self, AppError> {
        let item_type = match payload.item_type {
            Some(t) => t,
            None if payload.video_url.is_some() && payload.duration.is_some() => {
                "video".to_string()
            }
            None => return Err(AppError::Validation("Type is required".to_string())),
        };

        let publish_date = match payload.publish_date.or(payload.date) {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };

        let draft = ItemDraft {
            item_type,
            title: payload.title.trim().to_string(),
            description: payload.description,
            category: payload.category,
            industry: payload.industry,
            client_name: payload.client_name,
            image_url: payload.image_url,
            featured: payload.featured.unwrap_or(false),
            video_url: payload.video_url,
            duration: payload.duration,
            author: payload.author,
            read_time: payload.read_time,
            publish_date,
            content: payload.content.map(|c| ammonia::clean(&c)),
            blog_url: payload.blog_url,
            excerpt: payload.excerpt,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Merges a partial update onto the stored row. The merged result goes
    /// back through `validate`, so an update cannot strand an item without
    /// its type's required fields.
    fn from_update(
        existing: PortfolioItem,
        payload: UpdatePortfolioRequest,
    ) -> Result<Self, AppError> {
        let publish_date = match payload.publish_date {
            Some(raw) => Some(parse_date(&raw)?),
            None => existing.publish_date,
        };

        let draft = ItemDraft {
            item_type: payload.item_type.unwrap_or(existing.item_type),
            title: payload.title.unwrap_or(existing.title),
            description: payload.description.or(existing.description),
            category: payload.category.or(existing.category),
            industry: payload.industry.or(existing.industry),
            client_name: payload.client_name.or(existing.client_name),
            image_url: payload.image_url.or(existing.image_url),
            featured: payload.featured.unwrap_or(existing.featured),
            video_url: payload.video_url.or(existing.video_url),
            duration: payload.duration.or(existing.duration),
            author: payload.author.or(existing.author),
            read_time: payload.read_time.or(existing.read_time),
            publish_date,
            content: payload
                .content
                .map(|c| ammonia::clean(&c))
                .or(existing.content),
            blog_url: payload.blog_url.or(existing.blog_url),
            excerpt: payload.excerpt.or(existing.excerpt),
        };
        draft.validate()?;
        Ok(draft)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        match self.item_type.as_str() {
            "video" => {
                if is_blank(&self.video_url) {
                    return Err(AppError::Validation(
                        "Video items require a videoUrl".to_string(),
                    ));
                }
                match self.duration.as_deref() {
                    Some(d) if parse_duration_seconds(d).is_some() => {}
                    Some(d) => {
                        return Err(AppError::Validation(format!(
                            "Invalid duration format: {} (expected m:ss or h:mm:ss)",
                            d
                        )));
                    }
                    None => {
                        return Err(AppError::Validation(
                            "Video items require a duration".to_string(),
                        ));
                    }
                }
            }
            "blog" => {
                for (name, value) in [
                    ("author", &self.author),
                    ("readTime", &self.read_time),
                    ("content", &self.content),
                    ("blogUrl", &self.blog_url),
                    ("excerpt", &self.excerpt),
                ] {
                    if is_blank(value) {
                        return Err(AppError::Validation(format!(
                            "Blog items require {}",
                            name
                        )));
                    }
                }
                if self.publish_date.is_none() {
                    return Err(AppError::Validation(
                        "Blog items require a publishDate".to_string(),
                    ));
                }
            }
            "case-study" => {
                if is_blank(&self.client_name) {
                    return Err(AppError::Validation(
                        "Case studies require a clientName".to_string(),
                    ));
                }
                if is_blank(&self.content) {
                    return Err(AppError::Validation(
                        "Case studies require content".to_string(),
                    ));
                }
            }
            "image" => {
                if is_blank(&self.image_url) {
                    return Err(AppError::Validation(
                        "Image items require an imageUrl".to_string(),
                    ));
                }
            }
            _ => return Err(invalid_type_error()),
        }

        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_item_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid id".to_string()))
}

fn to_responses(items: Vec<PortfolioItem>) -> Vec<PortfolioItemResponse> {
    items.into_iter().map(Into::into).collect()
}

async fn fetch_by_column(
    column: &str,
    value: &str,
    limit: i64,
) -> Result<Vec<PortfolioItem>, AppError> {
    let pool = pool()?;
    // `column` is always a literal from the route table, never client input.
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE {column} = $1 \
         ORDER BY created_at DESC LIMIT $2"
    );
    let items = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(value)
        .bind(limit)
        .fetch_all(pool.as_ref())
        .await?;
    Ok(items)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/portfolio - List items, newest first
pub async fn list_items(
    Query(query): Query<PortfolioListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;
    let limit = clamp_limit(query.limit, 100);

    let items = match query.featured {
        Some(featured) => {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE featured = $1 \
                 ORDER BY created_at DESC LIMIT $2"
            );
            sqlx::query_as::<_, PortfolioItem>(&sql)
                .bind(featured)
                .bind(limit)
                .fetch_all(pool.as_ref())
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM portfolio_items ORDER BY created_at DESC LIMIT $1"
            );
            sqlx::query_as::<_, PortfolioItem>(&sql)
                .bind(limit)
                .fetch_all(pool.as_ref())
                .await?
        }
    };

    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/featured - Items picked for the home page
pub async fn featured_items(
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;
    let limit = clamp_limit(query.limit, 100);

    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE featured = true \
         ORDER BY created_at DESC LIMIT $1"
    );
    let items = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(limit)
        .fetch_all(pool.as_ref())
        .await?;

    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/latest - Newest items (default 6)
pub async fn latest_items(Query(query): Query<LimitQuery>) -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;
    let limit = clamp_limit(query.limit, 6);

    let sql =
        format!("SELECT {ITEM_COLUMNS} FROM portfolio_items ORDER BY created_at DESC LIMIT $1");
    let items = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(limit)
        .fetch_all(pool.as_ref())
        .await?;

    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/stats - Total, per-type, and featured counts
pub async fn portfolio_stats() -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;

    let type_counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT item_type, COUNT(*) FROM portfolio_items GROUP BY item_type")
            .fetch_all(pool.as_ref())
            .await?;

    let featured: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM portfolio_items WHERE featured = true")
            .fetch_one(pool.as_ref())
            .await?;

    let total: i64 = type_counts.iter().map(|(_, n)| n).sum();

    // Zero-seed the known types so the dashboard always sees all four keys.
    let mut by_type: HashMap<String, i64> =
        VALID_TYPES.iter().map(|t| (t.to_string(), 0)).collect();
    for (item_type, count) in type_counts {
        by_type.insert(item_type, count);
    }

    Ok(ok(PortfolioStats {
        total,
        by_type,
        featured: featured.0,
    }))
}

/// GET /api/portfolio/search?q= - Substring search over the text fields
pub async fn search_items(Query(query): Query<SearchQuery>) -> Result<impl IntoResponse, AppError> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::Validation(
            "Query parameter q is required".to_string(),
        ));
    }

    let pool = pool()?;
    let limit = clamp_limit(query.limit, 50);
    let pattern = format!("%{}%", escape_like(term));

    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM portfolio_items \
         WHERE title ILIKE $1 OR description ILIKE $1 OR excerpt ILIKE $1 OR content ILIKE $1 \
         ORDER BY created_at DESC LIMIT $2"
    );
    let items = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(pool.as_ref())
        .await?;

    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/type/{type} - Items of one type
pub async fn items_by_type(
    Path(item_type): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_type(&item_type) {
        return Err(invalid_type_error());
    }

    let limit = clamp_limit(query.limit, 100);
    let items = fetch_by_column("item_type", &item_type, limit).await?;
    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/category/{category} - Items in a category
pub async fn items_by_category(
    Path(category): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(query.limit, 100);
    let items = fetch_by_column("category", &category, limit).await?;
    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/industry/{industry} - Items for an industry
pub async fn items_by_industry(
    Path(industry): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(query.limit, 100);
    let items = fetch_by_column("industry", &industry, limit).await?;
    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/blogs - All blog items
pub async fn list_blogs(Query(query): Query<LimitQuery>) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(query.limit, 100);
    let items = fetch_by_column("item_type", "blog", limit).await?;
    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/blog/{id} - One blog item
pub async fn get_blog(Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_item_id(&id)?;
    let pool = pool()?;

    let sql =
        format!("SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE id = $1 AND item_type = 'blog'");
    let item = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;

    Ok(ok(PortfolioItemResponse::from(item)))
}

/// GET /api/portfolio/blog/{id}/related - Blogs sharing category or industry
pub async fn related_blogs(Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_item_id(&id)?;
    let pool = pool()?;

    let sql =
        format!("SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE id = $1 AND item_type = 'blog'");
    let blog = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;

    // A NULL category or industry never matches, so a post with neither set
    // simply has no related posts.
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM portfolio_items \
         WHERE item_type = 'blog' AND id <> $1 AND (category = $2 OR industry = $3) \
         ORDER BY created_at DESC LIMIT 3"
    );
    let related = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(blog.id)
        .bind(&blog.category)
        .bind(&blog.industry)
        .fetch_all(pool.as_ref())
        .await?;

    Ok(ok(to_responses(related)))
}

/// GET /api/portfolio/videos - All video items
pub async fn list_videos(Query(query): Query<LimitQuery>) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(query.limit, 100);
    let items = fetch_by_column("item_type", "video", limit).await?;
    Ok(ok(to_responses(items)))
}

/// GET /api/portfolio/videos/duration - Videos longest-first plus the
/// combined runtime in seconds
pub async fn videos_by_duration() -> Result<impl IntoResponse, AppError> {
    let pool = pool()?;

    let sql = format!("SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE item_type = 'video'");
    let videos = sqlx::query_as::<_, PortfolioItem>(&sql)
        .fetch_all(pool.as_ref())
        .await?;

    // Durations are stored as display strings; parse to order and total.
    let mut with_seconds: Vec<(i64, PortfolioItem)> = videos
        .into_iter()
        .map(|v| {
            let seconds = v
                .duration
                .as_deref()
                .and_then(parse_duration_seconds)
                .unwrap_or(0);
            (seconds, v)
        })
        .collect();
    with_seconds.sort_by(|a, b| b.0.cmp(&a.0));

    let total_seconds: i64 = with_seconds.iter().map(|(s, _)| *s).sum();
    let videos = with_seconds.into_iter().map(|(_, v)| v.into()).collect();

    Ok(ok(VideosByDuration {
        videos,
        total_seconds,
    }))
}

/// GET /api/portfolio/{id} - One item by id
pub async fn get_item(Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_item_id(&id)?;
    let pool = pool()?;

    let sql = format!("SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE id = $1");
    let item = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio item not found".to_string()))?;

    Ok(ok(PortfolioItemResponse::from(item)))
}

/// POST /api/portfolio - Create an item (admin)
pub async fn create_item(
    user: AuthUser,
    AppJson(payload): AppJson<CreatePortfolioRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let draft = ItemDraft::from_create(payload)?;

    let pool = pool()?;

    let sql = format!(
        "INSERT INTO portfolio_items (item_type, title, description, category, industry, \
         client_name, image_url, featured, video_url, duration, author, read_time, \
         publish_date, content, blog_url, excerpt) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {ITEM_COLUMNS}"
    );
    let item = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(&draft.item_type)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(&draft.industry)
        .bind(&draft.client_name)
        .bind(&draft.image_url)
        .bind(draft.featured)
        .bind(&draft.video_url)
        .bind(&draft.duration)
        .bind(&draft.author)
        .bind(&draft.read_time)
        .bind(draft.publish_date)
        .bind(&draft.content)
        .bind(&draft.blog_url)
        .bind(&draft.excerpt)
        .fetch_one(pool.as_ref())
        .await?;

    tracing::info!(item_id = %item.id, item_type = %item.item_type, "portfolio item created");

    Ok(created(PortfolioItemResponse::from(item)))
}

/// PUT/PATCH /api/portfolio/{id} - Partial update, re-validated (admin)
pub async fn update_item(
    user: AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdatePortfolioRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = parse_item_id(&id)?;
    let pool = pool()?;

    let sql = format!("SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE id = $1");
    let existing = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Portfolio item not found".to_string()))?;

    let draft = ItemDraft::from_update(existing, payload)?;

    let sql = format!(
        "UPDATE portfolio_items SET item_type = $1, title = $2, description = $3, \
         category = $4, industry = $5, client_name = $6, image_url = $7, featured = $8, \
         video_url = $9, duration = $10, author = $11, read_time = $12, publish_date = $13, \
         content = $14, blog_url = $15, excerpt = $16, updated_at = now() \
         WHERE id = $17 \
         RETURNING {ITEM_COLUMNS}"
    );
    let item = sqlx::query_as::<_, PortfolioItem>(&sql)
        .bind(&draft.item_type)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(&draft.industry)
        .bind(&draft.client_name)
        .bind(&draft.image_url)
        .bind(draft.featured)
        .bind(&draft.video_url)
        .bind(&draft.duration)
        .bind(&draft.author)
        .bind(&draft.read_time)
        .bind(draft.publish_date)
        .bind(&draft.content)
        .bind(&draft.blog_url)
        .bind(&draft.excerpt)
        .bind(id)
        .fetch_one(pool.as_ref())
        .await?;

    Ok(ok(PortfolioItemResponse::from(item)))
}

/// DELETE /api/portfolio/{id} - Hard delete (admin)
pub async fn delete_item(
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let id = parse_item_id(&id)?;
    let pool = pool()?;

    let result = sqlx::query("DELETE FROM portfolio_items WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Portfolio item not found".to_string()));
    }

    Ok(ok(serde_json::Value::Null))
}
