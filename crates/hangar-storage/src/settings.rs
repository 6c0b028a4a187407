// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use hangar_core::{HangarError, Setting, SettingsStore};
use rusqlite::{OptionalExtension, params};

use crate::database::map_tr_err;
use crate::installations::{SqliteStore, parse_time};

#[async_trait]
impl SettingsStore for SqliteStore {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, HangarError> {
        let key = key.to_string();
        self.database()
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT key, value_json, updated_at FROM settings WHERE key = ?1",
                    params![key],
                    |row| {
                        let updated_at: String = row.get(2)?;
                        Ok(Setting {
                            key: row.get(0)?,
                            value_json: row.get(1)?,
                            updated_at: parse_time(&updated_at)?,
                        })
                    },
                )
                .optional()
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| map_tr_err(e))
    }

    async fn upsert_setting(&self, setting: &Setting) -> Result<(), HangarError> {
        let (key, value) = (setting.key.clone(), setting.value_json.clone());
        let now = Utc::now().to_rfc3339();
        self.database()
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO settings (key, value_json, updated_at) VALUES (?1, ?2, ?3) \
                     ON CONFLICT (key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
                    params![key, value, now],
                )?;
                Ok(())
            })
            .await
            .map_err(|e: tokio_rusqlite::Error<rusqlite::Error>| map_tr_err(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn settings_round_trip_and_overwrite() {
        let store = SqliteStore::new(Database::open_in_memory().await.unwrap());
        assert!(store.get_setting("plugins_bootstrapped").await.unwrap().is_none());

        store.upsert_setting(&Setting::new("plugins_bootstrapped", "false")).await.unwrap();
        store.upsert_setting(&Setting::new("plugins_bootstrapped", "true")).await.unwrap();

        let got = store.get_setting("plugins_bootstrapped").await.unwrap().unwrap();
        assert_eq!(got.value_json, "true");
    }
}
