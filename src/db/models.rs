//! Database models - row structs mapped by sqlx.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Client logo shown on the marketing pages. The wire name for the logo URL
/// is plain `logo`, matching what the frontend sends and renders.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "logo")]
    pub logo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service offering. `slug` is the business key the frontend routes on and
/// is what the API exposes as `id`; the UUID stays internal.
#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub full_description: Option<String>,
    pub benefits: Vec<String>,
    pub process_steps: Vec<String>,
    pub image_src: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Portfolio item, discriminated by `item_type` (video, blog, case-study,
/// image). Which optional columns must be present depends on the type; that
/// rule lives in `routes::portfolio`, not the schema.
#[derive(Debug, Clone, FromRow)]
pub struct PortfolioItem {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Testimonial quote. Deleting one only flips `is_active`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: Uuid,
    pub content: String,
    pub client_name: String,
    pub client_position: Option<String>,
    pub client_company: Option<String>,
    pub rating: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact-form submission.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub service_of_interest: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Account used to mint admin tokens. Never serialized directly; the hash
/// must not leave the process.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Newsletter signup.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}
