//! Database schema management.
//!
//! Ensures the hierarchy tables, device tables and their indexes exist before
//! serving requests. Applied once on startup from `main.rs`.
//!
//! Constraint names are spelled out where request errors are derived from
//! them (see `error::constraint_errors`).

use anyhow::Result;
use sqlx::PgPool;

// ---

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS residence (
        rfid VARCHAR(100) NOT NULL,
        CONSTRAINT residence_pkey PRIMARY KEY (rfid)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS app_user (
        imei           VARCHAR(100) NOT NULL,
        name           VARCHAR(100) NOT NULL,
        residence_rfid VARCHAR(100) NOT NULL
            REFERENCES residence (rfid) ON UPDATE CASCADE ON DELETE CASCADE,
        CONSTRAINT app_user_pkey PRIMARY KEY (imei)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS room (
        id             SERIAL PRIMARY KEY,
        name           VARCHAR(100) NOT NULL,
        residence_rfid VARCHAR(100) NOT NULL
            REFERENCES residence (rfid) ON UPDATE CASCADE ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS thermostat (
        rfid    VARCHAR(100) NOT NULL,
        name    VARCHAR(100) NOT NULL,
        room_id INTEGER      NOT NULL
            REFERENCES room (id) ON UPDATE CASCADE ON DELETE CASCADE,
        CONSTRAINT thermostat_pkey PRIMARY KEY (rfid)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS temperature (
        datetime        TIMESTAMPTZ      NOT NULL,
        value           DOUBLE PRECISION NOT NULL,
        thermostat_rfid VARCHAR(100)     NOT NULL
            REFERENCES thermostat (rfid) ON UPDATE CASCADE ON DELETE CASCADE,
        CONSTRAINT temperature_pkey PRIMARY KEY (datetime)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS thermostat_meta_entry (
        id              SERIAL PRIMARY KEY,
        datetime        TIMESTAMPTZ  NOT NULL,
        rssi            INTEGER,
        uptime          INTEGER,
        battery         INTEGER,
        thermostat_rfid VARCHAR(100) NOT NULL
            REFERENCES thermostat (rfid) ON UPDATE CASCADE ON DELETE CASCADE,
        CONSTRAINT thermostat_meta_entry_thermostat_rfid_datetime_key
            UNIQUE (thermostat_rfid, datetime)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS heating_table_entry (
        id              SERIAL PRIMARY KEY,
        day             SMALLINT         NOT NULL CHECK (day BETWEEN 0 AND 6),
        time            TIME             NOT NULL,
        temperature     DOUBLE PRECISION NOT NULL,
        thermostat_rfid VARCHAR(100)     NOT NULL
            REFERENCES thermostat (rfid) ON UPDATE CASCADE ON DELETE CASCADE,
        CONSTRAINT heating_table_entry_day_time_thermostat_rfid_key
            UNIQUE (day, time, thermostat_rfid)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS raspberry_device (
        rfid VARCHAR(100) NOT NULL,
        mac  VARCHAR(17)  NOT NULL,
        CONSTRAINT raspberry_device_pkey PRIMARY KEY (rfid),
        CONSTRAINT raspberry_device_mac_key UNIQUE (mac)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS thermostat_device (
        rfid VARCHAR(100) NOT NULL,
        mac  VARCHAR(17)  NOT NULL,
        CONSTRAINT thermostat_device_pkey PRIMARY KEY (rfid),
        CONSTRAINT thermostat_device_mac_key UNIQUE (mac)
    );
    "#,
];

// Foreign-key lookups used by the hierarchy resolvers and list queries
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_app_user_residence_rfid ON app_user (residence_rfid);",
    "CREATE INDEX IF NOT EXISTS idx_room_residence_rfid ON room (residence_rfid);",
    "CREATE INDEX IF NOT EXISTS idx_thermostat_room_id ON thermostat (room_id);",
    "CREATE INDEX IF NOT EXISTS idx_temperature_thermostat_datetime \
        ON temperature (thermostat_rfid, datetime);",
];

/// Create the database schema (idempotent).
///
/// Tables are created parent-first so every foreign key target exists. Safe
/// to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    for statement in TABLES.iter().chain(INDEXES) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::info!("Schema ready ({} tables)", TABLES.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_parents_created_first() {
        // ---
        let position = |table: &str| {
            TABLES
                .iter()
                .position(|sql| sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")))
                .unwrap()
        };

        assert!(position("residence") < position("room"));
        assert!(position("room") < position("thermostat"));
        assert!(position("thermostat") < position("temperature"));
        assert!(position("thermostat") < position("heating_table_entry"));
    }

    #[test]
    fn test_statements_are_idempotent() {
        // ---
        assert!(TABLES.iter().all(|sql| sql.contains("IF NOT EXISTS")));
        assert!(INDEXES.iter().all(|sql| sql.contains("IF NOT EXISTS")));
    }
}
