/**
 * Schema Management
 *
 * Brings the store up to the current table layout on every start. Tables are
 * created when missing and columns introduced after the first deployments
 * are added in place, so an existing database upgrades without losing rows.
 *
 * SQLite has no `ADD COLUMN IF NOT EXISTS`, so each column is looked up in
 * `pragma_table_info` before it is added.
 */

use sqlx::SqlitePool;

use crate::shared::project::DEFAULT_PROJECT_ID;

const CREATE_PROJECTS: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        plan_data_url TEXT,
        plan_width REAL,
        plan_height REAL,
        plan_corners TEXT,
        point_schema TEXT NOT NULL DEFAULT '[]',
        opacity REAL NOT NULL DEFAULT 0.7
    )
"#;

const CREATE_POINTS: &str = r#"
    CREATE TABLE IF NOT EXISTS points (
        id TEXT PRIMARY KEY,
        project_id TEXT REFERENCES projects(id) ON DELETE CASCADE,
        properties TEXT NOT NULL DEFAULT '{}',
        geometry TEXT NOT NULL
    )
"#;

/// A column that older databases may lack
#[derive(Debug, Clone, Copy)]
pub struct ColumnUpgrade {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: &'static str,
}

/// Columns added after the first table layout, in the order they appeared
///
/// `project_id` carries a REFERENCES clause, so its default must stay NULL
/// for SQLite to accept the ALTER.
pub const COLUMN_UPGRADES: &[ColumnUpgrade] = &[
    ColumnUpgrade {
        table: "projects",
        column: "plan_width",
        definition: "REAL",
    },
    ColumnUpgrade {
        table: "projects",
        column: "plan_height",
        definition: "REAL",
    },
    ColumnUpgrade {
        table: "points",
        column: "project_id",
        definition: "TEXT REFERENCES projects(id) ON DELETE CASCADE",
    },
    ColumnUpgrade {
        table: "projects",
        column: "opacity",
        definition: "REAL NOT NULL DEFAULT 0.7",
    },
    ColumnUpgrade {
        table: "projects",
        column: "point_schema",
        definition: "TEXT NOT NULL DEFAULT '[]'",
    },
    ColumnUpgrade {
        table: "projects",
        column: "plan_corners",
        definition: "TEXT",
    },
];

/// What a migration run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// `table.column` for every column that was added
    pub added_columns: Vec<String>,
    /// True when the default project row had to be created
    pub seeded_project: bool,
    /// Points that had no project and were attached to the default one
    pub backfilled_points: u64,
}

/// Ensure tables, columns and the default project row exist
///
/// Safe to run on every start. Everything happens in one transaction: if any
/// step fails nothing is applied and the error is returned to the caller,
/// which must not start serving.
pub async fn migrate(pool: &SqlitePool) -> Result<MigrationReport, sqlx::Error> {
    let mut report = MigrationReport::default();
    let mut tx = pool.begin().await?;

    sqlx::query(CREATE_PROJECTS).execute(&mut *tx).await?;
    sqlx::query(CREATE_POINTS).execute(&mut *tx).await?;

    for upgrade in COLUMN_UPGRADES {
        let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
            .bind(upgrade.table)
            .fetch_all(&mut *tx)
            .await?;

        if columns.iter().any(|name| name == upgrade.column) {
            continue;
        }

        let statement = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            upgrade.table, upgrade.column, upgrade.definition
        );
        sqlx::query(&statement).execute(&mut *tx).await?;
        tracing::info!("[Schema] Added column {}.{}", upgrade.table, upgrade.column);
        report
            .added_columns
            .push(format!("{}.{}", upgrade.table, upgrade.column));
    }

    let seeded = sqlx::query("INSERT OR IGNORE INTO projects (id) VALUES (?)")
        .bind(DEFAULT_PROJECT_ID)
        .execute(&mut *tx)
        .await?;
    report.seeded_project = seeded.rows_affected() > 0;

    let backfilled = sqlx::query("UPDATE points SET project_id = ? WHERE project_id IS NULL")
        .bind(DEFAULT_PROJECT_ID)
        .execute(&mut *tx)
        .await?;
    report.backfilled_points = backfilled.rows_affected();

    tx.commit().await?;

    tracing::info!(
        added = report.added_columns.len(),
        seeded = report.seeded_project,
        backfilled = report.backfilled_points,
        "[Schema] Migration complete"
    );

    Ok(report)
}
