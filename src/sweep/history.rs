//! Durable record of completed sweeps. Best-effort by design: history
//! failures are logged and never interrupt an in-flight sweep.

use alloy::primitives::TxHash;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::warn;

use crate::account::AccountVersion;

/// Retained entries per store, oldest evicted first.
pub const HISTORY_CAPACITY: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepHistoryEntry {
    pub hash: TxHash,
    pub timestamp: DateTime<Utc>,
    pub token_count: usize,
    pub account_version: AccountVersion,
}

pub struct SweepHistoryStore {
    pool: SqlitePool,
}

impl SweepHistoryStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sweep_history (
                hash TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                token_count INTEGER NOT NULL,
                account_version TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    /// Records a completed sweep. Re-appending a known hash is a no-op;
    /// beyond capacity, the oldest entries are evicted in the same
    /// transaction. Failures are swallowed with a warning.
    pub async fn append(&self, entry: &SweepHistoryEntry) {
        if let Err(error) = self.try_append(entry).await {
            warn!(hash = %entry.hash, %error, "Failed to record sweep history");
        }
    }

    async fn try_append(&self, entry: &SweepHistoryEntry) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT OR IGNORE INTO sweep_history
                (hash, timestamp, token_count, account_version)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(entry.hash.to_string())
        .bind(entry.timestamp.to_rfc3339())
        .bind(i64::try_from(entry.token_count).unwrap_or(i64::MAX))
        .bind(entry.account_version.as_str())
        .execute(&mut *tx)
        .await?;

        // rowid reflects insertion order, so eviction stays FIFO even
        // under equal timestamps or clock regression.
        sqlx::query(
            "DELETE FROM sweep_history WHERE rowid NOT IN (
                SELECT rowid FROM sweep_history
                ORDER BY rowid DESC
                LIMIT ?1
            )",
        )
        .bind(HISTORY_CAPACITY)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// All retained entries, most recently appended first. Rows that fail
    /// to decode are skipped with a warning rather than poisoning the
    /// whole load.
    pub async fn load(&self) -> Vec<SweepHistoryEntry> {
        let rows: Vec<(String, String, i64, String)> = match sqlx::query_as(
            "SELECT hash, timestamp, token_count, account_version
             FROM sweep_history
             ORDER BY rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows,
            Err(error) => {
                warn!(%error, "Failed to load sweep history");
                return Vec::new();
            }
        };

        rows.into_iter()
            .filter_map(|(hash, timestamp, token_count, version)| {
                let entry = SweepHistoryEntry {
                    hash: TxHash::from_str(&hash).ok()?,
                    timestamp: DateTime::parse_from_rfc3339(&timestamp)
                        .ok()?
                        .with_timezone(&Utc),
                    token_count: usize::try_from(token_count).ok()?,
                    account_version: version.parse().ok()?,
                };
                Some(entry)
            })
            .collect()
    }
}
