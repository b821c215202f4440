// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use asset_movement_import::config::ImportConfigReader;
use asset_movement_import::importer::ImportResult;
use async_trait::async_trait;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub match_threshold: f64,
    pub batch_timeout_secs: u64,
    pub persist_concurrency: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            batch_timeout_secs: 30,
            persist_concurrency: 4,
        }
    }
}

impl MockConfig {
    /// 串行落库（便于断言写入顺序）
    pub fn sequential() -> Self {
        Self {
            persist_concurrency: 1,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
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
