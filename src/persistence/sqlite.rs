//! SQLite-backed implementation of the persistence out-port (C11), the shipped
//! `Persistence` used in production composition. Every query is parameterized
//! (`rusqlite::params!`); no user-supplied value is ever interpolated into a
//! query string (§4.7, §7 PersistenceError, P14).

use super::models::{PreferencesRow, TradeOutcome, TradeRow, WalletRow};
use super::{PreferencesRepository, TradeRepository, WalletRepository};
use crate::core::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

pub struct SqlitePersistence {
    conn: Mutex<Connection>,
}

unsafe impl Send for SqlitePersistence {}
unsafe impl Sync for SqlitePersistence {}

impl SqlitePersistence {
    pub fn open(path: &str) -> CoreResult<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::Fatal(format!("failed to create {parent:?}: {e}")))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Fatal(format!("failed to open database {path}: {e}")))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_tables()?;
        Ok(store)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> CoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_tables()?;
        Ok(store)
    }

    fn initialize_tables(&self) -> CoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS secure_wallets (
                wallet_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL UNIQUE,
                public_key TEXT NOT NULL UNIQUE,
                derivation_path TEXT NOT NULL,
                mnemonic_word_count INTEGER NOT NULL,
                kdf_method TEXT NOT NULL,
                encryption_method TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_unlocked TEXT,
                blob_path TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_secure_wallets_user_id ON secure_wallets(user_id);

            CREATE TABLE IF NOT EXISTS trades (
                trade_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                strategy_name TEXT NOT NULL,
                action TEXT NOT NULL,
                amount INTEGER NOT NULL,
                profit REAL NOT NULL,
                tx_signature TEXT,
                outcome TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                details TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_user_id ON trades(user_id);

            CREATE TABLE IF NOT EXISTS user_preferences (
                user_id TEXT PRIMARY KEY,
                enabled_strategies TEXT NOT NULL,
                notifications_enabled INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    fn parse_ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap())
    }
}

fn row_to_wallet(row: &rusqlite::Row) -> rusqlite::Result<WalletRow> {
    let created_at: String = row.get(7)?;
    let last_unlocked: Option<String> = row.get(8)?;
    Ok(WalletRow {
        wallet_id: row.get(0)?,
        user_id: row.get(1)?,
        public_key: row.get(2)?,
        derivation_path: row.get(3)?,
        mnemonic_word_count: row.get(4)?,
        kdf_method: row.get(5)?,
        encryption_method: row.get(6)?,
        created_at: SqlitePersistence::parse_ts(&created_at),
        last_unlocked: last_unlocked.map(|s| SqlitePersistence::parse_ts(&s)),
        blob_path: row.get(9)?,
    })
}

#[async_trait]
impl WalletRepository for SqlitePersistence {
    async fn insert_wallet(&self, row: &WalletRow) -> CoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO secure_wallets
                (user_id, public_key, derivation_path, mnemonic_word_count,
                 kdf_method, encryption_method, created_at, last_unlocked, blob_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.user_id,
                row.public_key,
                row.derivation_path,
                row.mnemonic_word_count,
                row.kdf_method,
                row.encryption_method,
                row.created_at.to_rfc3339(),
                row.last_unlocked.map(|t| t.to_rfc3339()),
                row.blob_path,
            ],
        )
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    async fn get_wallet_by_user(&self, user_id: &str) -> CoreResult<Option<WalletRow>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT wallet_id, user_id, public_key, derivation_path, mnemonic_word_count,
                    kdf_method, encryption_method, created_at, last_unlocked, blob_path
             FROM secure_wallets WHERE user_id = ?1",
            params![user_id],
            row_to_wallet,
        )
        .optional()
        .map_err(|e| CoreError::PersistenceError(e.to_string()))
    }

    async fn list_user_ids(&self) -> CoreResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT user_id FROM secure_wallets")
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| CoreError::PersistenceError(e.to_string()))?);
        }
        Ok(out)
    }

    async fn touch_last_unlocked(&self, user_id: &str) -> CoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE secure_wallets SET last_unlocked = ?1 WHERE user_id = ?2",
            params![Utc::now().to_rfc3339(), user_id],
        )
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    async fn delete_wallet(&self, user_id: &str) -> CoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM secure_wallets WHERE user_id = ?1",
            params![user_id],
        )
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TradeRepository for SqlitePersistence {
    async fn append_trade(&self, row: &TradeRow) -> CoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO trades
                (user_id, strategy_name, action, amount, profit, tx_signature,
                 outcome, timestamp, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.user_id,
                row.strategy_name,
                row.action,
                row.amount,
                row.profit,
                row.tx_signature,
                row.outcome.as_str(),
                row.timestamp.to_rfc3339(),
                row.details.to_string(),
            ],
        )
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    async fn trades_for_user(&self, user_id: &str) -> CoreResult<Vec<TradeRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT trade_id, user_id, strategy_name, action, amount, profit,
                        tx_signature, outcome, timestamp, details
                 FROM trades WHERE user_id = ?1 ORDER BY trade_id ASC",
            )
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                let outcome: String = row.get(7)?;
                let timestamp: String = row.get(8)?;
                let details: String = row.get(9)?;
                Ok(TradeRow {
                    trade_id: row.get(0)?,
                    user_id: row.get(1)?,
                    strategy_name: row.get(2)?,
                    action: row.get(3)?,
                    amount: row.get(4)?,
                    profit: row.get(5)?,
                    tx_signature: row.get(6)?,
                    outcome: TradeOutcome::from_str(&outcome)
                        .unwrap_or(TradeOutcome::Failed),
                    timestamp: SqlitePersistence::parse_ts(&timestamp),
                    details: serde_json::from_str(&details).unwrap_or(serde_json::Value::Null),
                })
            })
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| CoreError::PersistenceError(e.to_string()))?);
        }
        Ok(out)
    }

    async fn leaderboard(&self, limit: usize) -> CoreResult<Vec<(String, f64, u64, u64)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT user_id, SUM(profit) AS total_profit, COUNT(*) AS trade_count,
                        SUM(CASE WHEN profit > 0 THEN 1 ELSE 0 END) AS wins
                 FROM trades
                 GROUP BY user_id
                 ORDER BY total_profit DESC
                 LIMIT ?1",
            )
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)? as u64,
                    row.get::<_, i64>(3)? as u64,
                ))
            })
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| CoreError::PersistenceError(e.to_string()))?);
        }
        Ok(out)
    }
}

#[async_trait]
impl PreferencesRepository for SqlitePersistence {
    async fn get_preferences(&self, user_id: &str) -> CoreResult<Option<PreferencesRow>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT user_id, enabled_strategies, notifications_enabled, created_at, updated_at
             FROM user_preferences WHERE user_id = ?1",
            params![user_id],
            |row| {
                let enabled_strategies: String = row.get(1)?;
                let created_at: String = row.get(3)?;
                let updated_at: String = row.get(4)?;
                Ok(PreferencesRow {
                    user_id: row.get(0)?,
                    enabled_strategies: serde_json::from_str(&enabled_strategies)
                        .unwrap_or_default(),
                    notifications_enabled: row.get(2)?,
                    created_at: SqlitePersistence::parse_ts(&created_at),
                    updated_at: SqlitePersistence::parse_ts(&updated_at),
                })
            },
        )
        .optional()
        .map_err(|e| CoreError::PersistenceError(e.to_string()))
    }

    async fn upsert_preferences(&self, row: &PreferencesRow) -> CoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let strategies_json = serde_json::to_string(&row.enabled_strategies)
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        conn.execute(
            "INSERT INTO user_preferences
                (user_id, enabled_strategies, notifications_enabled, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                enabled_strategies = excluded.enabled_strategies,
                notifications_enabled = excluded.notifications_enabled,
                updated_at = excluded.updated_at",
            params![
                row.user_id,
                strategies_json,
                row.notifications_enabled,
                row.created_at.to_rfc3339(),
                row.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wallet(user_id: &str) -> WalletRow {
        WalletRow {
            wallet_id: 0,
            user_id: user_id.to_string(),
            public_key: format!("pk-{user_id}"),
            derivation_path: "m/44'/501'/0'/0'".to_string(),
            mnemonic_word_count: 12,
            kdf_method: "argon2id".to_string(),
            encryption_method: "aes-256-gcm".to_string(),
            created_at: Utc::now(),
            last_unlocked: None,
            blob_path: format!("{user_id}.blob"),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_wallet_round_trips() {
        let db = SqlitePersistence::open_in_memory().unwrap();
        db.insert_wallet(&sample_wallet("U1")).await.unwrap();
        let got = db.get_wallet_by_user("U1").await.unwrap().unwrap();
        assert_eq!(got.public_key, "pk-U1");
        assert_eq!(db.list_user_ids().await.unwrap(), vec!["U1".to_string()]);
    }

    #[tokio::test]
    async fn trades_are_isolated_by_user_id() {
        let db = SqlitePersistence::open_in_memory().unwrap();
        for (user, profit) in [("U1", 1.0), ("U1", 2.0), ("U2", 100.0)] {
            let row = TradeRow {
                trade_id: 0,
                user_id: user.to_string(),
                strategy_name: "stub".to_string(),
                action: "swap".to_string(),
                amount: 1000,
                profit,
                tx_signature: Some("sig".to_string()),
                outcome: TradeOutcome::Success,
                timestamp: Utc::now(),
                details: serde_json::json!({}),
            };
            db.append_trade(&row).await.unwrap();
        }

        let u1_trades = db.trades_for_user("U1").await.unwrap();
        assert_eq!(u1_trades.len(), 2);
        assert!(u1_trades.iter().all(|t| t.user_id == "U1"));
    }

    #[tokio::test]
    async fn leaderboard_aggregates_without_leaking_user_id_format() {
        let db = SqlitePersistence::open_in_memory().unwrap();
        for (user, profit) in [("U1", 5.0), ("U2", 10.0), ("U3", 1.0)] {
            let row = TradeRow {
                trade_id: 0,
                user_id: user.to_string(),
                strategy_name: "stub".to_string(),
                action: "swap".to_string(),
                amount: 1000,
                profit,
                tx_signature: None,
                outcome: TradeOutcome::Success,
                timestamp: Utc::now(),
                details: serde_json::json!({}),
            };
            db.append_trade(&row).await.unwrap();
        }
        let board = db.leaderboard(2).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].0, "U2");
        assert_eq!(board[1].0, "U1");
    }

    #[tokio::test]
    async fn sql_metacharacters_in_user_id_are_inert() {
        let db = SqlitePersistence::open_in_memory().unwrap();
        let malicious = "U1'; DROP TABLE trades; --";
        let mut wallet = sample_wallet(malicious);
        wallet.user_id = malicious.to_string();
        db.insert_wallet(&wallet).await.unwrap();

        let got = db.get_wallet_by_user(malicious).await.unwrap();
        assert!(got.is_some());
        // The trades table must still exist and be queryable.
        assert!(db.trades_for_user(malicious).await.unwrap().is_empty());
    }
}
