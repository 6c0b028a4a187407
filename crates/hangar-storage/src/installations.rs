// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hangar_core::types::SignatureStatus;
use hangar_core::{HangarError, InstallationStore, PluginInstallation};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, category, plugin_id, instance_id, enabled, signature_status, \
                       config_cipher, created_at, updated_at";

/// SQLite-backed [`InstallationStore`] and [`hangar_core::SettingsStore`].
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

pub(crate) fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

fn row_to_installation(row: &Row<'_>) -> rusqlite::Result<PluginInstallation> {
    let status: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    Ok(PluginInstallation {
        id: row.get(0)?,
        category: row.get(1)?,
        plugin_id: row.get(2)?,
        instance_id: row.get(3)?,
        enabled: row.get(4)?,
        signature_status: SignatureStatus::from_str(&status).unwrap_or(SignatureStatus::Unsigned),
        config_cipher: row.get(6)?,
        created_at: parse_time(&created_at)?,
        updated_at: parse_time(&updated_at)?,
    })
}

#[async_trait]
impl InstallationStore for SqliteStore {
    async fn list_installations(&self) -> Result<Vec<PluginInstallation>, HangarError> {
        self.db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM plugin_installations ORDER BY category, plugin_id"
                ))?;
                let rows = stmt
                    .query_map([], row_to_installation)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| map_tr_err(e))
    }

    async fn get_installation(
        &self,
        category: &str,
        plugin_id: &str,
    ) -> Result<Option<PluginInstallation>, HangarError> {
        let (category, plugin_id) = (category.to_string(), plugin_id.to_string());
        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM plugin_installations WHERE category = ?1 AND plugin_id = ?2"),
                    params![category, plugin_id],
                    row_to_installation,
                )
                .optional()
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| map_tr_err(e))
    }

    async fn find_by_instance_id(&self, instance_id: &str) -> Result<Option<PluginInstallation>, HangarError> {
        let instance_id = instance_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM plugin_installations WHERE instance_id = ?1"),
                    params![instance_id],
                    row_to_installation,
                )
                .optional()
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| map_tr_err(e))
    }

    async fn upsert_installation(&self, installation: &PluginInstallation) -> Result<(), HangarError> {
        let inst = installation.clone();
        let now = Utc::now().to_rfc3339();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO plugin_installations \
                     (category, plugin_id, instance_id, enabled, signature_status, config_cipher, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
                     ON CONFLICT (category, plugin_id) DO UPDATE SET \
                         enabled = excluded.enabled, \
                         signature_status = excluded.signature_status, \
                         config_cipher = excluded.config_cipher, \
                         updated_at = excluded.updated_at",
                    params![
                        inst.category,
                        inst.plugin_id,
                        inst.instance_id,
                        inst.enabled,
                        inst.signature_status.as_ref(),
                        inst.config_cipher,
                        now,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| map_tr_err(e))
    }
}
