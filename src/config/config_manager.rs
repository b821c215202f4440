// ==========================================
// 器具移动导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 规则: 键不存在 → 默认值；值无法解析或越界 → ConfigValueError
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_BATCH_TIMEOUT_SECS, DEFAULT_PERSIST_CONCURRENCY,
};
use crate::db::open_sqlite_connection;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::matcher::DEFAULT_MATCH_THRESHOLD;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const IMPORT_MATCH_THRESHOLD: &str = "import_match_threshold";
    pub const IMPORT_BATCH_TIMEOUT_SECS: &str = "import_batch_timeout_secs";
    pub const IMPORT_PERSIST_CONCURRENCY: &str = "import_persist_concurrency";
}

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::InternalError(format!("open config db failed: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("lock failed: {}", e),
        })?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("lock failed: {}", e),
        })?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 所有 global 配置（按键排序）
    pub fn get_config_snapshot(&self) -> ImportResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: format!("lock failed: {}", e),
        })?;

        let read_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")
            .map_err(read_err)?;
        let rows = stmt
            .query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(read_err)?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row.map_err(read_err)?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析配置；不存在时返回默认值
    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> ImportResult<(T, Option<String>)> {
        match self.get_global_config_value(key)? {
            None => Ok((default, None)),
            Some(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<T>()
                    .map_err(|_| invalid_value(key, &raw, "not a number"))?;
                Ok((parsed, Some(raw)))
            }
        }
    }
}

fn invalid_value(key: &str, value: &str, message: &str) -> ImportError {
    ImportError::ConfigValueError {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_match_threshold(&self) -> ImportResult<f64> {
        let key = config_keys::IMPORT_MATCH_THRESHOLD;
        let (value, raw) = self.get_parsed(key, DEFAULT_MATCH_THRESHOLD)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid_value(
                key,
                raw.as_deref().unwrap_or_default(),
                "must be within [0, 1]",
            ));
        }
        Ok(value)
    }

    async fn get_batch_timeout_secs(&self) -> ImportResult<u64> {
        let key = config_keys::IMPORT_BATCH_TIMEOUT_SECS;
        let (value, raw) = self.get_parsed(key, DEFAULT_BATCH_TIMEOUT_SECS)?;
        if value == 0 {
            return Err(invalid_value(
                key,
                raw.as_deref().unwrap_or_default(),
                "must be greater than 0",
            ));
        }
        Ok(value)
    }

    async fn get_persist_concurrency(&self) -> ImportResult<usize> {
        let key = config_keys::IMPORT_PERSIST_CONCURRENCY;
        let (value, raw) = self.get_parsed(key, DEFAULT_PERSIST_CONCURRENCY)?;
        if value == 0 {
            return Err(invalid_value(
                key,
                raw.as_deref().unwrap_or_default(),
                "must be at least 1",
            ));
        }
        Ok(value)
    }
}
