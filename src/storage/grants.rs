//! Access grants between users and priced models

use tracing::info;

use super::catalog::MODEL_COLUMNS;
use super::Database;
use crate::models::errors::AppResult;
use crate::models::types::{PricedModel, User};

impl Database {
    /// Models granted to `user`, ordered by name
    pub async fn assigned_models(&self, user: &User) -> AppResult<Vec<PricedModel>> {
        let columns = MODEL_COLUMNS
            .split(", ")
            .map(|c| format!("m.{}", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {} FROM openai_models m
            JOIN model_assignments a ON a.model_id = m.id
            WHERE a.user_id = $1
            ORDER BY m.name
            "#,
            columns
        );
        let models = sqlx::query_as::<_, PricedModel>(&sql)
            .bind(user.id)
            .fetch_all(&self.pool)
            .await?;
        Ok(models)
    }

    /// Whether `user` holds a grant for the model called `model_name`
    pub async fn user_has_model(&self, user: &User, model_name: &str) -> AppResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM model_assignments a
            JOIN openai_models m ON m.id = a.model_id
            WHERE a.user_id = $1 AND m.name = $2
            "#,
        )
        .bind(user.id)
        .bind(model_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(found > 0)
    }

    /// Grant `models` to `user`. Existing grants are left alone.
    /// Returns how many new grants were written.
    pub async fn assign_models(&self, user: &User, models: &[PricedModel]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut added = 0;
        for model in models {
            added += sqlx::query(
                "INSERT OR IGNORE INTO model_assignments (user_id, model_id) VALUES ($1, $2)",
            )
            .bind(user.id)
            .bind(model.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;

        info!(user = %user.username, added, "Model grants assigned");
        Ok(added)
    }

    /// Revoke `models` from `user`. Returns how many grants were removed.
    pub async fn unassign_models(&self, user: &User, models: &[PricedModel]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for model in models {
            removed += sqlx::query(
                "DELETE FROM model_assignments WHERE user_id = $1 AND model_id = $2",
            )
            .bind(user.id)
            .bind(model.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;

        info!(user = %user.username, removed, "Model grants removed");
        Ok(removed)
    }
}
