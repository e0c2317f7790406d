use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_profiles_table(conn)?;
    create_health_metrics_table(conn)?;
    create_medications_table(conn)?;
    create_medication_logs_table(conn)?;
    create_health_alerts_table(conn)?;
    create_ai_insights_table(conn)?;
    create_indexes(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the profiles table. The profile id is the user id.
fn create_profiles_table(conn: &Connection) -> Result<(), String> {
    info!("Creating profiles table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            full_name TEXT,
            date_of_birth TEXT,
            gender TEXT,
            phone_number TEXT,
            emergency_contact_name TEXT,
            emergency_contact_phone TEXT,
            blood_type TEXT,
            allergies TEXT,
            chronic_conditions TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_health_metrics_table(conn: &Connection) -> Result<(), String> {
    info!("Creating health_metrics table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_metrics (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            metric_type TEXT NOT NULL,
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            systolic REAL,
            diastolic REAL,
            notes TEXT,
            recorded_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_medications_table(conn: &Connection) -> Result<(), String> {
    info!("Creating medications table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS medications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            dosage TEXT NOT NULL,
            frequency TEXT NOT NULL,
            time_of_day TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            instructions TEXT,
            prescribing_doctor TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_medication_logs_table(conn: &Connection) -> Result<(), String> {
    info!("Creating medication_logs table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS medication_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            medication_id TEXT NOT NULL,
            scheduled_time TEXT NOT NULL,
            taken_at TEXT,
            status TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_health_alerts_table(conn: &Connection) -> Result<(), String> {
    info!("Creating health_alerts table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_alerts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            alert_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            related_metric_id TEXT,
            related_medication_id TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            is_resolved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            resolved_at TEXT
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_ai_insights_table(conn: &Connection) -> Result<(), String> {
    info!("Creating ai_insights table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ai_insights (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            insight_type TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            recommendations TEXT NOT NULL,
            confidence_score REAL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Per-user indexes matching the list orderings
fn create_indexes(conn: &Connection) -> Result<(), String> {
    info!("Creating per-user indexes");

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_health_metrics_user_recorded
            ON health_metrics (user_id, recorded_at DESC);
         CREATE INDEX IF NOT EXISTS idx_health_metrics_user_type
            ON health_metrics (user_id, metric_type, recorded_at DESC);
         CREATE INDEX IF NOT EXISTS idx_medications_user_created
            ON medications (user_id, created_at DESC);
         CREATE INDEX IF NOT EXISTS idx_medication_logs_medication
            ON medication_logs (medication_id, scheduled_time DESC);
         CREATE INDEX IF NOT EXISTS idx_health_alerts_user_created
            ON health_alerts (user_id, created_at DESC);
         CREATE INDEX IF NOT EXISTS idx_ai_insights_user_created
            ON ai_insights (user_id, created_at DESC);"
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}
