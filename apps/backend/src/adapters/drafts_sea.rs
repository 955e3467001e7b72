//! SeaORM-backed `DraftStore`: one `drafts` row per draft holding the JSON
//! document and its version.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use time::OffsetDateTime;
use tracing::{debug, error};

use crate::domain::state::Draft;
use crate::entities::drafts;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::infra::db_errors::map_db_err;
use crate::repos::drafts::DraftStore;

#[derive(Debug, Clone)]
pub struct SeaDraftStore {
    db: DatabaseConnection,
}

impl SeaDraftStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl DraftStore for SeaDraftStore {
    async fn load(&self, draft_id: &str) -> Result<Option<Draft>, DomainError> {
        let row = drafts::Entity::find_by_id(draft_id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let draft: Draft = serde_json::from_str(&row.document).map_err(|e| {
            error!(draft_id, error = %e, "stored draft document is unreadable");
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("draft {draft_id} could not be decoded"),
            )
        })?;
        Ok(Some(draft))
    }

    async fn save(&self, draft_id: &str, draft: &Draft) -> Result<(), DomainError> {
        let document = serde_json::to_string(draft).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::Other("Serialize".into()),
                format!("draft {draft_id} could not be encoded: {e}"),
            )
        })?;
        let row = drafts::ActiveModel {
            id: Set(draft_id.to_string()),
            version: Set(draft.version as i64),
            document: Set(document),
            updated_at: Set(OffsetDateTime::now_utc()),
        };
        drafts::Entity::insert(row)
            .on_conflict(
                OnConflict::column(drafts::Column::Id)
                    .update_columns([
                        drafts::Column::Version,
                        drafts::Column::Document,
                        drafts::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;
        debug!(draft_id, version = draft.version, "draft saved");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "sql"
    }
}
