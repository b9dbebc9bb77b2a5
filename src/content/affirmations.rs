use crate::entity::affirmations;
use crate::error::{MaternaError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

pub const MAX_TEXT_LEN: usize = 500;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AffirmationCategory {
    #[default]
    Confidence,
    Strength,
    Love,
    Peace,
}

impl AffirmationCategory {
    pub const ALL: [AffirmationCategory; 4] =
        [Self::Confidence, Self::Strength, Self::Love, Self::Peace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confidence => "confidence",
            Self::Strength => "strength",
            Self::Love => "love",
            Self::Peace => "peace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for AffirmationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affirmation {
    pub id: String,
    pub text: String,
    pub category: AffirmationCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<affirmations::Model> for Affirmation {
    fn from(m: affirmations::Model) -> Self {
        Self {
            id: m.id,
            text: m.text,
            category: AffirmationCategory::parse(&m.category).unwrap_or_default(),
            is_active: m.is_active,
            created_at: DateTime::from_timestamp_micros(m.created_at_us).unwrap_or_default(),
            updated_at: DateTime::from_timestamp_micros(m.updated_at_us).unwrap_or_default(),
        }
    }
}

fn validate_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MaternaError::Validation(
            "Affirmation text is required".to_string(),
        ));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(MaternaError::Validation(format!(
            "Affirmation text cannot exceed {} characters",
            MAX_TEXT_LEN
        )));
    }
    Ok(text.to_string())
}

fn new_record(text: String, category: AffirmationCategory, now: i64) -> affirmations::ActiveModel {
    affirmations::ActiveModel {
        rowid: NotSet,
        id: Set(uuid::Uuid::new_v4().to_string()),
        text: Set(text),
        category: Set(category.as_str().to_string()),
        is_active: Set(true),
        created_at_us: Set(now),
        updated_at_us: Set(now),
    }
}

fn active_query(category: Option<AffirmationCategory>) -> Select<affirmations::Entity> {
    let mut query = affirmations::Entity::find().filter(affirmations::Column::IsActive.eq(true));
    if let Some(category) = category {
        query = query.filter(affirmations::Column::Category.eq(category.as_str()));
    }
    query
}

/// Affirmations stored in SQLite. Every call opens its own connection on the
/// blocking pool.
pub struct AffirmationRepository {
    db_url: String,
}

impl AffirmationRepository {
    pub async fn open(database_url: &str) -> Result<Self> {
        let db_url = database_url.to_string();

        tokio::task::spawn_blocking({
            let db_url = db_url.clone();
            move || -> Result<()> {
                let db = Database::connect(&db_url)?;
                db.get_schema_builder()
                    .register(affirmations::Entity)
                    .apply(&db)?;
                Ok(())
            }
        })
        .await??;

        info!("Affirmation store ready");
        Ok(Self { db_url })
    }

    /// Total rows, active or not.
    pub async fn count(&self) -> Result<u64> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<u64> {
            let db = Database::connect(&db_url)?;
            Ok(affirmations::Entity::find().count(&db)?)
        })
        .await?
    }

    /// Active affirmations, newest first.
    pub async fn list(&self, category: Option<AffirmationCategory>) -> Result<Vec<Affirmation>> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<Affirmation>> {
            let db = Database::connect(&db_url)?;
            let rows = active_query(category)
                .order_by_desc(affirmations::Column::CreatedAtUs)
                .order_by_desc(affirmations::Column::Rowid)
                .all(&db)?;
            Ok(rows.into_iter().map(Affirmation::from).collect())
        })
        .await?
    }

    pub async fn random(&self, category: Option<AffirmationCategory>) -> Result<Option<Affirmation>> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<Affirmation>> {
            let db = Database::connect(&db_url)?;
            let count = active_query(category).count(&db)?;
            if count == 0 {
                return Ok(None);
            }
            let skip = rand::thread_rng().gen_range(0..count);
            let row = active_query(category)
                .order_by_asc(affirmations::Column::Rowid)
                .offset(skip)
                .one(&db)?;
            Ok(row.map(Affirmation::from))
        })
        .await?
    }

    pub async fn create(&self, text: &str, category: AffirmationCategory) -> Result<Affirmation> {
        let text = validate_text(text)?;
        let record = new_record(text, category, Utc::now().timestamp_micros());

        let db_url = self.db_url.clone();
        let created = tokio::task::spawn_blocking(move || -> Result<Affirmation> {
            let db = Database::connect(&db_url)?;
            let model = record.insert(&db)?;
            Ok(model.into())
        })
        .await??;

        info!("Created {} affirmation {}", created.category, created.id);
        Ok(created)
    }

    /// Validates every entry first so that nothing is written on bad input.
    pub async fn insert_many(&self, entries: &[(&str, AffirmationCategory)]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().timestamp_micros();
        let records = entries
            .iter()
            .map(|(text, category)| Ok(new_record(validate_text(text)?, *category, now)))
            .collect::<Result<Vec<_>>>()?;
        let n = records.len();

        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let db = Database::connect(&db_url)?;
            affirmations::Entity::insert_many(records).exec(&db)?;
            Ok(())
        })
        .await??;

        Ok(n)
    }

    /// Active affirmations per category. Categories without rows are omitted.
    pub async fn category_counts(&self) -> Result<BTreeMap<AffirmationCategory, u64>> {
        let db_url = self.db_url.clone();
        tokio::task::spawn_blocking(move || -> Result<BTreeMap<AffirmationCategory, u64>> {
            let db = Database::connect(&db_url)?;
            let mut counts = BTreeMap::new();
            for category in AffirmationCategory::ALL {
                let n = active_query(Some(category)).count(&db)?;
                if n > 0 {
                    counts.insert(category, n);
                }
            }
            Ok(counts)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(validate_text("  hi  ").unwrap(), "hi");
        assert!(validate_text("   ").is_err());
        assert!(validate_text(&"a".repeat(MAX_TEXT_LEN)).is_ok());
        let err = validate_text(&"a".repeat(MAX_TEXT_LEN + 1)).unwrap_err();
        assert_eq!(err.to_string(), "Affirmation text cannot exceed 500 characters");
    }

    #[test]
    fn categories_parse_from_stored_names() {
        assert_eq!(AffirmationCategory::parse("peace"), Some(AffirmationCategory::Peace));
        assert_eq!(AffirmationCategory::parse("Peace"), None);
        assert_eq!(AffirmationCategory::Love.to_string(), "love");
    }
}
