use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{now_timestamp, Profile, UpsertProfileRequest};
use super::errors::RepositoryError;
use super::storage::{encode_list, list_column, StorageBackend};

/// Repository trait for user profiles
#[async_trait]
pub trait ProfileRepositoryTrait {
    /// Get the profile for a user
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>, RepositoryError>;

    /// Create the profile or replace its editable fields, keeping `created_at`
    async fn upsert(&self, request: UpsertProfileRequest) -> Result<Profile, RepositoryError>;
}

/// Repository for user profiles
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    backend: StorageBackend<Profile>,
}

impl Default for ProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRepository {
    pub fn new() -> Self {
        Self { backend: StorageBackend::detect("profiles") }
    }

    pub fn in_memory() -> Self {
        Self { backend: StorageBackend::memory() }
    }

    pub fn with_pool(pool: DatabasePool) -> Self {
        Self { backend: StorageBackend::Database(pool) }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        date_of_birth: row.get(2)?,
        gender: row.get(3)?,
        phone_number: row.get(4)?,
        emergency_contact_name: row.get(5)?,
        emergency_contact_phone: row.get(6)?,
        blood_type: row.get(7)?,
        allergies: list_column(row, 8)?,
        chronic_conditions: list_column(row, 9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Profile>, RepositoryError> {
        match &self.backend {
            StorageBackend::Database(pool) => {
                let conn = pool.connection()?;
                let profile = conn.query_row(
                    "SELECT id, full_name, date_of_birth, gender, phone_number,
                            emergency_contact_name, emergency_contact_phone, blood_type,
                            allergies, chronic_conditions, created_at, updated_at
                     FROM profiles WHERE id = ?1",
                    params![id],
                    map_row,
                ).optional()?;
                Ok(profile)
            }
            StorageBackend::Memory(table) => table.get(id),
        }
    }

    async fn upsert(&self, request: UpsertProfileRequest) -> Result<Profile, RepositoryError> {
        let now = now_timestamp();
        let created_at = self.get_by_id(&request.id).await?
            .map(|existing| existing.created_at)
            .unwrap_or_else(|| now.clone());

        let profile = Profile {
            id: request.id,
            full_name: request.full_name,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            phone_number: request.phone_number,
            emergency_contact_name: request.emergency_contact_name,
            emergency_contact_phone: request.emergency_contact_phone,
            blood_type: request.blood_type,
            allergies: request.allergies,
            chronic_conditions: request.chronic_conditions,
            created_at,
            updated_at: now,
        };

        match &self.backend {
            StorageBackend::Database(pool) => {
                debug!("Upserting profile in database: {}", profile.id);
                let allergies = profile.allergies.as_deref().map(encode_list).transpose()?;
                let conditions = profile.chronic_conditions.as_deref().map(encode_list).transpose()?;

                let conn = pool.connection()?;
                conn.execute(
                    "INSERT INTO profiles
                     (id, full_name, date_of_birth, gender, phone_number, emergency_contact_name,
                      emergency_contact_phone, blood_type, allergies, chronic_conditions, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                     ON CONFLICT(id) DO UPDATE SET
                        full_name = excluded.full_name,
                        date_of_birth = excluded.date_of_birth,
                        gender = excluded.gender,
                        phone_number = excluded.phone_number,
                        emergency_contact_name = excluded.emergency_contact_name,
                        emergency_contact_phone = excluded.emergency_contact_phone,
                        blood_type = excluded.blood_type,
                        allergies = excluded.allergies,
                        chronic_conditions = excluded.chronic_conditions,
                        updated_at = excluded.updated_at",
                    params![
                        profile.id,
                        profile.full_name,
                        profile.date_of_birth,
                        profile.gender,
                        profile.phone_number,
                        profile.emergency_contact_name,
                        profile.emergency_contact_phone,
                        profile.blood_type,
                        allergies,
                        conditions,
                        profile.created_at,
                        profile.updated_at,
                    ],
                )?;
                Ok(profile)
            }
            StorageBackend::Memory(table) => table.insert(&profile.id.clone(), profile),
        }
    }
}
