//! Database repository for plant guides and reminders.
//!
//! Plant writes touch two tables and run in a transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{mint_id, CareStep, CreateReminderRequest, Plant, Reminder, TaskKind};
use crate::reminders::next_due_date;
use crate::resolver::HostedPlants;

const PLANT_COLUMNS: &str = "id, name, image, difficulty, light, water, temperature, \
     grow_time, description, edible, edible_parts, is_external";

const REMINDER_COLUMNS: &str =
    "id, plant_id, plant_name, task, frequency, enabled, next_due, notes, created_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== PLANT OPERATIONS ====================

    /// List all plants ordered by name.
    pub async fn list_plants(&self) -> Result<Vec<Plant>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM plants ORDER BY name",
            PLANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut plants: Vec<Plant> = rows.iter().map(plant_from_row).collect();
        self.attach_steps(&mut plants).await?;
        Ok(plants)
    }

    /// Plants whose name contains `query`, or is contained in it, ignoring case.
    pub async fn search_plants(&self, query: &str) -> Result<Vec<Plant>, AppError> {
        let query = name_key(query);
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM plants
               WHERE name_key <> ''
                 AND (instr(name_key, ?) > 0 OR instr(?, name_key) > 0)
               ORDER BY name"#,
            PLANT_COLUMNS
        ))
        .bind(&query)
        .bind(&query)
        .fetch_all(&self.pool)
        .await?;

        let mut plants: Vec<Plant> = rows.iter().map(plant_from_row).collect();
        self.attach_steps(&mut plants).await?;
        Ok(plants)
    }

    /// Get a plant by ID.
    pub async fn get_plant(&self, id: i64) -> Result<Option<Plant>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM plants WHERE id = ?", PLANT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut plants = vec![plant_from_row(&row)];
        self.attach_steps(&mut plants).await?;
        Ok(plants.pop())
    }

    /// Get the plant whose name equals `name`, ignoring case.
    pub async fn find_plant_by_name(&self, name: &str) -> Result<Option<Plant>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM plants WHERE name_key = ? ORDER BY id LIMIT 1",
            PLANT_COLUMNS
        ))
        .bind(name_key(name))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut plants = vec![plant_from_row(&row)];
        self.attach_steps(&mut plants).await?;
        Ok(plants.pop())
    }

    /// Store `plant`, replacing the row with the same name (ignoring case).
    ///
    /// A replaced row keeps its ID; a new row gets one from SQLite. Care steps
    /// are replaced wholesale. Returns the plant as stored.
    pub async fn upsert_plant_by_name(&self, plant: &Plant) -> Result<Plant, AppError> {
        let now = Utc::now().to_rfc3339();
        let key = name_key(&plant.name);
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM plants WHERE name_key = ? ORDER BY id LIMIT 1",
        )
        .bind(&key)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    r#"UPDATE plants SET
                        name = ?, name_key = ?, image = ?, difficulty = ?, light = ?, water = ?, temperature = ?,
                        grow_time = ?, description = ?, edible = ?, edible_parts = ?,
                        is_external = ?, updated_at = ?
                    WHERE id = ?"#,
                )
                .bind(&plant.name)
                .bind(&key)
                .bind(&plant.image)
                .bind(&plant.difficulty)
                .bind(&plant.light)
                .bind(&plant.water)
                .bind(&plant.temperature)
                .bind(&plant.grow_time)
                .bind(&plant.description)
                .bind(plant.edible.map(|b| b as i32))
                .bind(&plant.edible_parts)
                .bind(plant.is_external as i32)
                .bind(&now)
                .bind(id)
                .execute(&mut *tx)
                .await?;

                sqlx::query("DELETE FROM care_steps WHERE plant_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                id
            }
            None => sqlx::query(
                r#"INSERT INTO plants (
                    name, name_key, image, difficulty, light, water, temperature,
                    grow_time, description, edible, edible_parts, is_external, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&plant.name)
            .bind(&key)
            .bind(&plant.image)
            .bind(&plant.difficulty)
            .bind(&plant.light)
            .bind(&plant.water)
            .bind(&plant.temperature)
            .bind(&plant.grow_time)
            .bind(&plant.description)
            .bind(plant.edible.map(|b| b as i32))
            .bind(&plant.edible_parts)
            .bind(plant.is_external as i32)
            .bind(&now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid(),
        };

        for (position, step) in plant.steps.iter().enumerate() {
            sqlx::query(
                "INSERT INTO care_steps (plant_id, position, title, description) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(&step.title)
            .bind(&step.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Plant {
            id,
            ..plant.clone()
        })
    }

    /// Delete every plant named `name`, ignoring case. Returns whether any row went.
    pub async fn delete_plant_by_name(&self, name: &str) -> Result<bool, AppError> {
        let key = name_key(name);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM care_steps WHERE plant_id IN (SELECT id FROM plants WHERE name_key = ?)",
        )
        .bind(&key)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM plants WHERE name_key = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fill in each plant's care steps, in position order.
    async fn attach_steps(&self, plants: &mut [Plant]) -> Result<(), AppError> {
        if plants.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT plant_id, title, description FROM care_steps WHERE plant_id IN (",
        );
        let mut ids = builder.separated(", ");
        for plant in plants.iter() {
            ids.push_bind(plant.id);
        }
        builder.push(") ORDER BY plant_id, position");

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut steps: HashMap<i64, Vec<CareStep>> = HashMap::new();
        for row in rows {
            steps.entry(row.get("plant_id")).or_default().push(CareStep {
                title: row.get("title"),
                description: row.get("description"),
            });
        }

        for plant in plants.iter_mut() {
            plant.steps = steps.remove(&plant.id).unwrap_or_default();
        }
        Ok(())
    }

    // ==================== REMINDER OPERATIONS ====================

    /// List reminders by due date, optionally for one plant.
    pub async fn list_reminders(&self, plant_id: Option<i64>) -> Result<Vec<Reminder>, AppError> {
        let rows = match plant_id {
            Some(plant_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM reminders WHERE plant_id = ? ORDER BY next_due, id",
                    REMINDER_COLUMNS
                ))
                .bind(plant_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM reminders ORDER BY next_due, id",
                    REMINDER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(reminder_from_row).collect()
    }

    /// Get a reminder by ID.
    pub async fn get_reminder(&self, id: &str) -> Result<Option<Reminder>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reminders WHERE id = ?",
            REMINDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(reminder_from_row).transpose()
    }

    /// Create a reminder due one period after `now`.
    pub async fn create_reminder(
        &self,
        request: &CreateReminderRequest,
        now: DateTime<Utc>,
    ) -> Result<Reminder, AppError> {
        let reminder = Reminder {
            id: mint_id().to_string(),
            plant_id: request.plant_id,
            plant_name: request.plant_name.trim().to_string(),
            task: request.task,
            frequency: request.frequency.clone(),
            enabled: request.enabled,
            next_due: next_due_date(&request.frequency, now),
            notes: request.notes.clone(),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO reminders (id, plant_id, plant_name, task, frequency, enabled, next_due, notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&reminder.id)
        .bind(reminder.plant_id)
        .bind(&reminder.plant_name)
        .bind(reminder.task.as_str())
        .bind(&reminder.frequency)
        .bind(reminder.enabled as i32)
        .bind(reminder.next_due.to_rfc3339())
        .bind(&reminder.notes)
        .bind(reminder.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(reminder)
    }

    /// Flip a reminder between enabled and disabled.
    pub async fn toggle_reminder(&self, id: &str) -> Result<Reminder, AppError> {
        let result = sqlx::query("UPDATE reminders SET enabled = 1 - enabled WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reminder {} not found", id)));
        }

        self.get_reminder(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reminder {} not found", id)))
    }

    /// Delete a reminder.
    pub async fn delete_reminder(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reminder {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl HostedPlants for Repository {
    async fn search(&self, query: &str) -> Result<Vec<Plant>, AppError> {
        self.search_plants(query).await
    }

    async fn list_all(&self) -> Result<Vec<Plant>, AppError> {
        self.list_plants().await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Plant>, AppError> {
        self.find_plant_by_name(name).await
    }

    async fn save(&self, plant: &Plant) -> Result<Plant, AppError> {
        self.upsert_plant_by_name(plant).await
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, AppError> {
        self.delete_plant_by_name(name).await
    }
}

// Helper functions for row conversion

/// Case-folded name used for every name comparison in SQL.
fn name_key(name: &str) -> String {
    name.to_lowercase()
}

fn plant_from_row(row: &sqlx::sqlite::SqliteRow) -> Plant {
    let edible: Option<i32> = row.get("edible");
    let is_external: i32 = row.get("is_external");
    Plant {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        difficulty: row.get("difficulty"),
        light: row.get("light"),
        water: row.get("water"),
        temperature: row.get("temperature"),
        description: row.get("description"),
        steps: Vec::new(),
        edible: edible.map(|v| v != 0),
        edible_parts: row.get("edible_parts"),
        grow_time: row.get("grow_time"),
        is_external: is_external != 0,
    }
}

fn reminder_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Reminder, AppError> {
    let task: String = row.get("task");
    let enabled: i32 = row.get("enabled");
    let next_due: String = row.get("next_due");
    let created_at: String = row.get("created_at");

    Ok(Reminder {
        id: row.get("id"),
        plant_id: row.get("plant_id"),
        plant_name: row.get("plant_name"),
        task: TaskKind::parse(&task)
            .ok_or_else(|| AppError::Database(format!("Unknown reminder task '{}'", task)))?,
        frequency: row.get("frequency"),
        enabled: enabled != 0,
        next_due: parse_timestamp(&next_due)?,
        notes: row.get("notes"),
        created_at: parse_timestamp(&created_at)?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid timestamp '{}': {}", s, e)))
}
