// ==========================================
// 器具移动导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::matcher::DEFAULT_MATCH_THRESHOLD;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PERSIST_CONCURRENCY: usize = 4;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（固定值）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 地点匹配最低置信度
    ///
    /// # 默认值
    /// - 0.7（取值范围 [0, 1]）
    async fn get_match_threshold(&self) -> ImportResult<f64>;

    /// 落库阶段整批截止时间（秒）
    ///
    /// # 默认值
    /// - 120
    async fn get_batch_timeout_secs(&self) -> ImportResult<u64>;

    /// 并发落库的行数上限
    ///
    /// # 默认值
    /// - 4
    async fn get_persist_concurrency(&self) -> ImportResult<usize>;
}

// ==========================================
// ImportSettings - 一次导入使用的配置快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub match_threshold: f64,
    pub batch_timeout_secs: u64,
    pub persist_concurrency: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            batch_timeout_secs: DEFAULT_BATCH_TIMEOUT_SECS,
            persist_concurrency: DEFAULT_PERSIST_CONCURRENCY,
        }
    }
}

impl ImportSettings {
    /// 导入开始时读取一次，整批内不再变化
    pub async fn load(reader: &dyn ImportConfigReader) -> ImportResult<Self> {
        Ok(Self {
            match_threshold: reader.get_match_threshold().await?,
            batch_timeout_secs: reader.get_batch_timeout_secs().await?,
            persist_concurrency: reader.get_persist_concurrency().await?,
        })
    }
}

#[async_trait]
impl ImportConfigReader for ImportSettings {
    async fn get_match_threshold(&self) -> ImportResult<f64> {
        Ok(self.match_threshold)
    }

    async fn get_batch_timeout_secs(&self) -> ImportResult<u64> {
        Ok(self.batch_timeout_secs)
    }

    async fn get_persist_concurrency(&self) -> ImportResult<usize> {
        Ok(self.persist_concurrency)
    }
}
