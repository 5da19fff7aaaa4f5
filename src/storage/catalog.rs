//! Priced model catalog

use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::Database;
use crate::models::errors::AppResult;
use crate::models::types::{ModelCosts, PricedModel};

pub(super) const MODEL_COLUMNS: &str = "id, name, input_cost, cached_input_cost, output_cost";

impl Database {
    /// Return the model called `name`, inserting it with `costs` when absent.
    /// Existing rows are never updated. The flag is true when a row was created.
    pub async fn get_or_create_model(
        &self,
        name: &str,
        costs: &ModelCosts,
    ) -> AppResult<(PricedModel, bool)> {
        let result = sqlx::query(
            r#"
            INSERT INTO openai_models (name, input_cost, cached_input_cost, output_cost)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(costs.input)
        .bind(costs.cached_input)
        .bind(costs.output)
        .execute(&self.pool)
        .await?;
        let inserted = result.rows_affected() > 0;

        let sql = format!("SELECT {} FROM openai_models WHERE name = $1", MODEL_COLUMNS);
        let model = sqlx::query_as::<_, PricedModel>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        debug!(model = %name, created = inserted, "get_or_create model");
        Ok((model, inserted))
    }

    /// All models ordered by name
    pub async fn list_models(&self) -> AppResult<Vec<PricedModel>> {
        let sql = format!("SELECT {} FROM openai_models ORDER BY name", MODEL_COLUMNS);
        let models = sqlx::query_as::<_, PricedModel>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(models)
    }

    /// Models whose name is in `names`; unknown names are ignored
    pub async fn find_models_by_names(&self, names: &[String]) -> AppResult<Vec<PricedModel>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM openai_models WHERE name IN (",
            MODEL_COLUMNS
        ));
        let mut separated = qb.separated(", ");
        for name in names {
            separated.push_bind(name);
        }
        separated.push_unseparated(") ORDER BY name");

        let models = qb
            .build_query_as::<PricedModel>()
            .fetch_all(&self.pool)
            .await?;
        Ok(models)
    }

    /// First model by name, if any exist
    pub async fn first_model(&self) -> AppResult<Option<PricedModel>> {
        let sql = format!(
            "SELECT {} FROM openai_models ORDER BY name LIMIT 1",
            MODEL_COLUMNS
        );
        let model = sqlx::query_as::<_, PricedModel>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(model)
    }

    pub async fn count_models(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM openai_models")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::Cost;

    fn costs(input: &str) -> ModelCosts {
        ModelCosts {
            input: input.parse().unwrap(),
            cached_input: None,
            output: Some("1.00".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn test_get_or_create_never_overwrites() {
        let db = Database::in_memory().await.unwrap();

        let (first, created) = db.get_or_create_model("gpt-4o", &costs("2.50")).await.unwrap();
        assert!(created);
        assert_eq!(first.input_cost, Cost::from_micros(2_500_000));
        assert_eq!(first.cached_input_cost, None);

        let (again, created) = db.get_or_create_model("gpt-4o", &costs("9.99")).await.unwrap();
        assert!(!created);
        assert_eq!(again, first);
        assert_eq!(db.count_models().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_and_lookup_ordered_by_name() {
        let db = Database::in_memory().await.unwrap();
        for name in ["o3", "gpt-4o", "gpt-4.1"] {
            db.get_or_create_model(name, &costs("1")).await.unwrap();
        }

        let names: Vec<_> = db
            .list_models()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["gpt-4.1", "gpt-4o", "o3"]);

        let found = db
            .find_models_by_names(&["o3".to_string(), "missing".to_string(), "gpt-4o".to_string()])
            .await
            .unwrap();
        let found: Vec<_> = found.into_iter().map(|m| m.name).collect();
        assert_eq!(found, vec!["gpt-4o", "o3"]);

        assert!(db.find_models_by_names(&[]).await.unwrap().is_empty());
        assert_eq!(db.first_model().await.unwrap().unwrap().name, "gpt-4.1");
    }

    #[tokio::test]
    async fn test_first_model_on_empty_catalog() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.first_model().await.unwrap().is_none());
    }
}
