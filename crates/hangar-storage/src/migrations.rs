// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations, applied on every open.

use hangar_core::HangarError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applied versions are tracked in refinery's `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), HangarError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| HangarError::Storage(format!("migration failed: {e}")))?;
    for migration in report.applied_migrations() {
        tracing::debug!(version = migration.version(), name = migration.name(), "applied migration");
    }
    Ok(())
}
