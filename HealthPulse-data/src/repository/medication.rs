use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{
    now_timestamp, CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationLog,
};
use super::errors::RepositoryError;
use super::in_memory::InMemoryTable;
use super::storage::{encode_list, list_column, sql_limit, take_limit, StorageBackend};

/// Repository trait for medications and their dose logs
#[async_trait]
pub trait MedicationRepositoryTrait {
    /// Store a new, active medication
    async fn create(&self, request: CreateMedicationRequest) -> Result<Medication, RepositoryError>;

    /// A user's medications, newest first, optionally filtered by active flag
    async fn list_for_user(
        &self,
        user_id: &str,
        active: Option<bool>,
        limit: Option<usize>,
    ) -> Result<Vec<Medication>, RepositoryError>;

    /// Get one of a user's medications by id
    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<Medication>, RepositoryError>;

    /// Switch a medication on or off. Returns None when nothing matched.
    async fn set_active(&self, user_id: &str, id: &str, is_active: bool) -> Result<Option<Medication>, RepositoryError>;

    /// Delete a medication together with its logs. Returns false when nothing matched.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError>;

    /// Record a dose against a medication
    async fn create_log(&self, request: CreateMedicationLogRequest) -> Result<MedicationLog, RepositoryError>;

    /// Logs for one medication, newest `scheduled_time` first
    async fn list_logs(
        &self,
        user_id: &str,
        medication_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MedicationLog>, RepositoryError>;
}

/// Repository for medications
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    backend: StorageBackend<Medication>,
    /// Logs live beside the medications when running in memory
    logs: InMemoryTable<MedicationLog>,
}

impl Default for MedicationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationRepository {
    pub fn new() -> Self {
        Self { backend: StorageBackend::detect("medications"), logs: InMemoryTable::new() }
    }

    pub fn in_memory() -> Self {
        Self { backend: StorageBackend::memory(), logs: InMemoryTable::new() }
    }

    pub fn with_pool(pool: DatabasePool) -> Self {
        Self { backend: StorageBackend::Database(pool), logs: InMemoryTable::new() }
    }
}

const SELECT_MEDICATIONS: &str =
    "SELECT id, user_id, name, dosage, frequency, time_of_day, start_date, end_date,
            instructions, prescribing_doctor, is_active, created_at, updated_at
     FROM medications";

const SELECT_LOGS: &str =
    "SELECT id, user_id, medication_id, scheduled_time, taken_at, status, notes, created_at
     FROM medication_logs";

fn map_medication(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        time_of_day: list_column(row, 5)?.unwrap_or_default(),
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        instructions: row.get(8)?,
        prescribing_doctor: row.get(9)?,
        is_active: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn map_log(row: &Row<'_>) -> rusqlite::Result<MedicationLog> {
    Ok(MedicationLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        medication_id: row.get(2)?,
        scheduled_time: row.get(3)?,
        taken_at: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[async_trait]
impl MedicationRepositoryTrait for MedicationRepository {
    async fn create(&self, request: CreateMedicationRequest) -> Result<Medication, RepositoryError> {
        let now = now_timestamp();
        let medication = Medication {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            name: request.name,
            dosage: request.dosage,
            frequency: request.frequency,
            time_of_day: request.time_of_day,
            start_date: request.start_date,
            end_date: request.end_date,
            instructions: request.instructions,
            prescribing_doctor: request.prescribing_doctor,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        match &self.backend {
            StorageBackend::Database(pool) => {
                debug!("Storing medication in database: {}", medication.id);
                let time_of_day = encode_list(&medication.time_of_day)?;
                let conn = pool.connection()?;
                conn.execute(
                    "INSERT INTO medications
                     (id, user_id, name, dosage, frequency, time_of_day, start_date, end_date,
                      instructions, prescribing_doctor, is_active, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    params![
                        medication.id,
                        medication.user_id,
                        medication.name,
                        medication.dosage,
                        medication.frequency,
                        time_of_day,
                        medication.start_date,
                        medication.end_date,
                        medication.instructions,
                        medication.prescribing_doctor,
                        medication.is_active,
                        medication.created_at,
                        medication.updated_at,
                    ],
                )?;
                Ok(medication)
            }
            StorageBackend::Memory(table) => table.insert(&medication.id.clone(), medication),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        active: Option<bool>,
        limit: Option<usize>,
    ) -> Result<Vec<Medication>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ?1 AND (?2 IS NULL OR is_active = ?2)
                     ORDER BY created_at DESC LIMIT ?3",
                    SELECT_MEDICATIONS
                ))?;
                let rows = stmt.query_map(params![user_id, active, sql_limit(limit)], map_medication)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            StorageBackend::Memory(table) => {
                let mut medications = table.select(|m| {
                    m.user_id == user_id && active.map_or(true, |a| m.is_active == a)
                })?;
                medications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(take_limit(medications, limit))
            }
        }
    }

    async fn get_by_id(&self, user_id: &str, id: &str) -> Result<Option<Medication>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let medication = conn.query_row(
                    &format!("{} WHERE id = ?1 AND user_id = ?2", SELECT_MEDICATIONS),
                    params![id, user_id],
                    map_medication,
                ).optional()?;
                Ok(medication)
            }
            StorageBackend::Memory(table) => Ok(table.get(id)?.filter(|m| m.user_id == user_id)),
        }
    }

    async fn set_active(&self, user_id: &str, id: &str, is_active: bool) -> Result<Option<Medication>, RepositoryError> {
        let now = now_timestamp();
        match &self.backend {
            StorageBackend::Database(pool) => {
                let changed = {
                    let conn = pool.connection()?;
                    conn.execute(
                        "UPDATE medications SET is_active = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
                        params![is_active, now, id, user_id],
                    )?
                };
                if changed == 0 {
                    return Ok(None);
                }
                self.get_by_id(user_id, id).await
            }
            StorageBackend::Memory(table) => table.update(
                id,
                |m| m.user_id == user_id,
                |m| {
                    m.is_active = is_active;
                    m.updated_at = now;
                },
            ),
        }
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let mut conn = pool.connection()?;
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM medication_logs WHERE medication_id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                let removed = tx.execute(
                    "DELETE FROM medications WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
                tx.commit()?;
                Ok(removed > 0)
            }
            StorageBackend::Memory(table) => {
                let removed = table.delete_where(|m| m.id == id && m.user_id == user_id)?;
                if removed > 0 {
                    self.logs.delete_where(|log| log.medication_id == id)?;
                }
                Ok(removed > 0)
            }
        }
    }

    async fn create_log(&self, request: CreateMedicationLogRequest) -> Result<MedicationLog, RepositoryError> {
        let log = MedicationLog {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            medication_id: request.medication_id,
            scheduled_time: request.scheduled_time,
            taken_at: request.taken_at,
            status: request.status,
            notes: request.notes,
            created_at: now_timestamp(),
        };

        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                conn.execute(
                    "INSERT INTO medication_logs
                     (id, user_id, medication_id, scheduled_time, taken_at, status, notes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        log.id,
                        log.user_id,
                        log.medication_id,
                        log.scheduled_time,
                        log.taken_at,
                        log.status,
                        log.notes,
                        log.created_at,
                    ],
                )?;
                Ok(log)
            }
            StorageBackend::Memory(_) => self.logs.insert(&log.id.clone(), log),
        }
    }

    async fn list_logs(
        &self,
        user_id: &str,
        medication_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MedicationLog>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ?1 AND medication_id = ?2
                     ORDER BY scheduled_time DESC LIMIT ?3",
                    SELECT_LOGS
                ))?;
                let rows = stmt.query_map(params![user_id, medication_id, sql_limit(limit)], map_log)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            }
            StorageBackend::Memory(_) => {
                let mut logs = self.logs.select(|log| {
                    log.user_id == user_id && log.medication_id == medication_id
                })?;
                logs.sort_by(|a, b| b.scheduled_time.cmp(&a.scheduled_time));
                Ok(take_limit(logs, limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn request(user_id: &str, name: &str) -> CreateMedicationRequest {
        CreateMedicationRequest {
            user_id: user_id.to_string(),
            name: name.to_string(),
            dosage: "10mg".to_string(),
            frequency: "daily".to_string(),
            time_of_day: vec!["08:00".to_string(), "20:00".to_string()],
            start_date: "2024-01-01".to_string(),
            end_date: None,
            instructions: None,
            prescribing_doctor: None,
        }
    }

    fn log_request(user_id: &str, medication_id: &str, scheduled: &str) -> CreateMedicationLogRequest {
        CreateMedicationLogRequest {
            user_id: user_id.to_string(),
            medication_id: medication_id.to_string(),
            scheduled_time: scheduled.to_string(),
            taken_at: None,
            status: "pending".to_string(),
            notes: None,
        }
    }

    async fn exercise_repository(repo: MedicationRepository) {
        let first = repo.create(request("u1", "Lisinopril")).await.unwrap();
        assert!(first.is_active);
        assert_eq!(first.time_of_day.len(), 2);

        let second = repo.create(request("u1", "Metformin")).await.unwrap();
        repo.set_active("u1", &second.id, false).await.unwrap().unwrap();

        let active = repo.list_for_user("u1", Some(true), None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Lisinopril");

        let all = repo.list_for_user("u1", None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        // Ownership is enforced on updates
        assert!(repo.set_active("u2", &first.id, false).await.unwrap().is_none());

        repo.create_log(log_request("u1", &first.id, "2024-01-01T08:00:00.000000Z")).await.unwrap();
        repo.create_log(log_request("u1", &first.id, "2024-01-02T08:00:00.000000Z")).await.unwrap();
        let logs = repo.list_logs("u1", &first.id, None).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].scheduled_time, "2024-01-02T08:00:00.000000Z");

        assert!(repo.delete("u1", &first.id).await.unwrap());
        assert!(repo.list_logs("u1", &first.id, None).await.unwrap().is_empty());
        assert!(!repo.delete("u1", &first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        exercise_repository(MedicationRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_repository() {
        let pool = create_in_memory_pool().unwrap();
        exercise_repository(MedicationRepository::with_pool(pool)).await;
    }
}
