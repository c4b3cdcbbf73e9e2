/**
 * Database Operations for the Project and its Points
 *
 * This module provides the repository the handlers talk to. Reads return the
 * whole project with its points rendered as a feature collection. Writes are
 * single statements, except plan replacement and import which run inside a
 * transaction so that no partial state is ever visible.
 *
 * A transaction that is dropped without `commit()` is rolled back by sqlx,
 * which is what every early `?` return below relies on.
 */

use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::shared::project::{
    Feature, FeatureCollection, ImportProject, PointRecord, Project, ProjectSnapshot,
    PropertyMap, SettingsPatch, DEFAULT_OPACITY, DEFAULT_PROJECT_ID,
};
use crate::shared::SharedError;

/// Errors raised by [`ProjectRepository`]
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store rejected a statement or was unreachable
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An imported feature was malformed; the import was rolled back
    #[error("Invalid feature at index {index}: {source}")]
    InvalidFeature {
        index: usize,
        #[source]
        source: SharedError,
    },

    /// Imported project fields were malformed; nothing was written
    #[error("Invalid project: {0}")]
    InvalidProject(#[source] SharedError),

    /// A settings update named none of the recognized fields
    #[error("No valid fields to update")]
    EmptySettings,
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    plan_data_url: Option<String>,
    plan_width: Option<f64>,
    plan_height: Option<f64>,
    plan_corners: Option<String>,
    point_schema: Option<String>,
    opacity: Option<f64>,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project, RepositoryError> {
        let plan_corners: Option<Value> = self
            .plan_corners
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let point_schema = match self.point_schema.as_deref() {
            Some(schema) => serde_json::from_str(schema)?,
            None => Value::Array(Vec::new()),
        };

        Ok(Project {
            id: self.id,
            plan_data_url: self.plan_data_url,
            plan_width: self.plan_width,
            plan_height: self.plan_height,
            plan_corners,
            point_schema,
            opacity: self.opacity.unwrap_or(DEFAULT_OPACITY),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PointRow {
    id: String,
    properties: String,
    geometry: String,
}

impl PointRow {
    fn into_feature(self) -> Result<Feature, RepositoryError> {
        let properties: PropertyMap = serde_json::from_str(&self.properties)?;
        let geometry: Value = serde_json::from_str(&self.geometry)?;
        Ok(PointRecord::new(self.id, properties, geometry).into_feature())
    }
}

/// Numeric columns are cast so rows written by older layouts, where they
/// were INTEGER, still decode as floats.
const SELECT_PROJECT: &str = r#"
    SELECT id,
           plan_data_url,
           CAST(plan_width AS REAL) AS plan_width,
           CAST(plan_height AS REAL) AS plan_height,
           plan_corners,
           point_schema,
           CAST(opacity AS REAL) AS opacity
    FROM projects
    WHERE id = ?
"#;

const SELECT_POINTS: &str = r#"
    SELECT id, properties, geometry
    FROM points
    WHERE project_id = ?
    ORDER BY rowid
"#;

const INSERT_POINT: &str = r#"
    INSERT INTO points (id, project_id, properties, geometry)
    VALUES (?, ?, ?, ?)
"#;

const UPSERT_POINT: &str = r#"
    INSERT INTO points (id, project_id, properties, geometry)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        project_id = excluded.project_id,
        properties = excluded.properties,
        geometry = excluded.geometry
"#;

/// Data access for the single project and its points
///
/// Owns a handle to the shared connection pool; cloning is cheap and every
/// clone talks to the same pool.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Create a repository over an already migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial statement to check the store is reachable
    pub async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Load the project and all its points
    ///
    /// A missing project row yields a default-shaped project rather than an
    /// error.
    pub async fn fetch_snapshot(&self) -> Result<ProjectSnapshot, RepositoryError> {
        let project = sqlx::query_as::<_, ProjectRow>(SELECT_PROJECT)
            .bind(DEFAULT_PROJECT_ID)
            .fetch_optional(&self.pool)
            .await?;
        let project = match project {
            Some(row) => row.into_project()?,
            None => {
                tracing::warn!("[Project] Project row missing, returning defaults");
                Project::default()
            }
        };

        let rows = sqlx::query_as::<_, PointRow>(SELECT_POINTS)
            .bind(DEFAULT_PROJECT_ID)
            .fetch_all(&self.pool)
            .await?;
        let features = rows
            .into_iter()
            .map(PointRow::into_feature)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProjectSnapshot {
            project,
            geojson_data: FeatureCollection { features },
        })
    }

    /// Store a new plan image and drop everything anchored to the old one
    ///
    /// Clears `plan_corners` and deletes every point in the same transaction.
    /// Returns the number of points removed.
    pub async fn replace_plan(
        &self,
        plan_data_url: &str,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM points WHERE project_id = ?")
            .bind(DEFAULT_PROJECT_ID)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(
            r#"
            INSERT INTO projects (id, plan_data_url, plan_width, plan_height, plan_corners)
            VALUES (?, ?, ?, ?, NULL)
            ON CONFLICT(id) DO UPDATE SET
                plan_data_url = excluded.plan_data_url,
                plan_width = excluded.plan_width,
                plan_height = excluded.plan_height,
                plan_corners = NULL
            "#,
        )
        .bind(DEFAULT_PROJECT_ID)
        .bind(plan_data_url)
        .bind(width)
        .bind(height)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("[Project] Plan replaced, {} points removed", removed);
        Ok(removed)
    }

    /// Update exactly the settings present in `patch`
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<(), RepositoryError> {
        if patch.is_empty() {
            return Err(RepositoryError::EmptySettings);
        }

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE projects SET ");
        let mut fields = builder.separated(", ");
        if let Some(schema) = &patch.point_schema {
            fields
                .push("point_schema = ")
                .push_bind_unseparated(serde_json::to_string(schema)?);
        }
        if let Some(corners) = &patch.plan_corners {
            let corners = corners.as_ref().map(serde_json::to_string).transpose()?;
            fields
                .push("plan_corners = ")
                .push_bind_unseparated(corners);
        }
        if let Some(opacity) = patch.opacity {
            fields.push("opacity = ").push_bind_unseparated(opacity);
        }
        builder.push(" WHERE id = ").push_bind(DEFAULT_PROJECT_ID);

        builder.build().execute(&self.pool).await?;

        tracing::debug!("[Project] Settings updated: {}", patch.to_payload());
        Ok(())
    }

    /// Insert a point or replace the properties and geometry of an existing one
    pub async fn upsert_point(&self, point: &PointRecord) -> Result<(), RepositoryError> {
        let mut properties = point.properties.clone();
        properties.remove("id");

        sqlx::query(UPSERT_POINT)
            .bind(&point.id)
            .bind(DEFAULT_PROJECT_ID)
            .bind(serde_json::to_string(&properties)?)
            .bind(serde_json::to_string(&point.geometry)?)
            .execute(&self.pool)
            .await?;

        tracing::debug!("[Project] Point {} upserted", point.id);
        Ok(())
    }

    /// Delete a point by id
    ///
    /// Deleting an unknown id is not an error. Returns whether a row went away.
    pub async fn delete_point(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM points WHERE id = ? AND project_id = ?")
            .bind(id)
            .bind(DEFAULT_PROJECT_ID)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the project fields and the whole point set
    ///
    /// `opacity` is only overwritten when the import carries one. Each
    /// feature is validated inside the transaction; the first malformed
    /// feature or failed insert rolls back the plan update and every insert
    /// before it. Returns the number of points imported.
    pub async fn import_project(
        &self,
        project: &ImportProject,
        features: &[Value],
    ) -> Result<usize, RepositoryError> {
        project.validate().map_err(RepositoryError::InvalidProject)?;

        let plan_corners = match &project.plan_corners {
            None | Some(Value::Null) => None,
            Some(corners) => Some(serde_json::to_string(corners)?),
        };
        let point_schema = match &project.point_schema {
            None | Some(Value::Null) => "[]".to_string(),
            Some(schema) => serde_json::to_string(schema)?,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, plan_data_url, plan_width, plan_height, plan_corners, point_schema, opacity)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, 0.7))
            ON CONFLICT(id) DO UPDATE SET
                plan_data_url = excluded.plan_data_url,
                plan_width = excluded.plan_width,
                plan_height = excluded.plan_height,
                plan_corners = excluded.plan_corners,
                point_schema = excluded.point_schema,
                opacity = COALESCE(?7, projects.opacity)
            "#,
        )
        .bind(DEFAULT_PROJECT_ID)
        .bind(project.plan_data_url.as_deref())
        .bind(project.plan_width)
        .bind(project.plan_height)
        .bind(plan_corners)
        .bind(point_schema)
        .bind(project.opacity)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM points WHERE project_id = ?")
            .bind(DEFAULT_PROJECT_ID)
            .execute(&mut *tx)
            .await?;

        for (index, value) in features.iter().enumerate() {
            let point = PointRecord::from_feature_value(value)
                .map_err(|source| RepositoryError::InvalidFeature { index, source })?;

            sqlx::query(INSERT_POINT)
                .bind(&point.id)
                .bind(DEFAULT_PROJECT_ID)
                .bind(serde_json::to_string(&point.properties)?)
                .bind(serde_json::to_string(&point.geometry)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("[Project] Imported project with {} points", features.len());
        Ok(features.len())
    }
}
