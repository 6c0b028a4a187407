// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection setup: pragmas, migrations, checkpoint on close.
//!
//! All statements run on tokio-rusqlite's single background thread, so the
//! one [`Database`] handle serializes writes.

use std::path::Path;
use std::sync::Arc;

use hangar_config::model::StorageConfig;
use hangar_core::HangarError;
use tokio_rusqlite::Connection;

use crate::migrations::run_migrations;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
}

pub(crate) fn map_tr_err<E: std::fmt::Display>(e: tokio_rusqlite::Error<E>) -> HangarError {
    HangarError::Storage(e.to_string())
}

impl Database {
    pub async fn open_with(config: &StorageConfig) -> Result<Self, HangarError> {
        Self::open(&config.database_path, config.wal_mode).await
    }

    /// Open (creating parent directories) and migrate the database at `path`.
    pub async fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, HangarError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                HangarError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)
            .await
            .map_err(|e| HangarError::Storage(format!("failed to open {}: {e}", path.display())))?;
        let db = Self { conn: Arc::new(conn) };
        db.prepare(wal_mode).await?;
        tracing::debug!(path = %path.display(), wal_mode, "database opened");
        Ok(db)
    }

    pub async fn open_in_memory() -> Result<Self, HangarError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| HangarError::Storage(format!("failed to open in-memory database: {e}")))?;
        let db = Self { conn: Arc::new(conn) };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), HangarError> {
        self.conn
            .call(move |conn| -> Result<(), HangarError> {
                let pragmas = if wal_mode {
                    "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;"
                } else {
                    "PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;"
                };
                conn.execute_batch(pragmas)
                    .map_err(|e| HangarError::Storage(format!("failed to apply pragmas: {e}")))?;
                run_migrations(conn)
            })
            .await
            .map_err(map_tr_err)
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    /// Checkpoint the WAL so the main file is self-contained.
    pub async fn close(&self) -> Result<(), HangarError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        tracing::debug!("WAL checkpoint complete");
        Ok(())
    }
}
