// ==========================================
// 选矿厂运营系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新、快照管理
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, ConfigManager};
use crate::engine::duration::DurationTable;

/// 配置项（生效值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
    pub overridden: bool, // false 表示使用默认值
}

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询全部配置: 已知键按生效值列出，其余已写入的键原样附后
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let stored = self.config_manager.list_all()?;
        let table = self.config_manager.get_duration_table()?;

        let effective = [
            (config_keys::DURATION_A100, table.a100_minutes.to_string()),
            (config_keys::DURATION_A60, table.a60_minutes.to_string()),
            (config_keys::DURATION_B120, table.b120_minutes.to_string()),
            (config_keys::DURATION_B150, table.b150_minutes.to_string()),
            (config_keys::MAX_MILLS, self.config_manager.get_max_mills()?.to_string()),
            (
                config_keys::DEFAULT_PAGE_SIZE,
                self.config_manager.get_default_page_size()?.to_string(),
            ),
            (config_keys::UI_LOCALE, self.config_manager.get_locale()?),
        ];

        let mut items: Vec<ConfigItem> = effective
            .iter()
            .map(|(key, value)| ConfigItem {
                key: key.to_string(),
                value: value.clone(),
                overridden: stored.contains_key(*key),
            })
            .collect();

        items.extend(
            stored
                .into_iter()
                .filter(|(key, _)| !effective.iter().any(|(k, _)| k == key))
                .map(|(key, value)| ConfigItem {
                    key,
                    value,
                    overridden: true,
                }),
        );
        Ok(items)
    }

    /// 查询单个配置（原始存储值）
    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        Ok(self.config_manager.get_global_config_value(key.trim())?)
    }

    /// 更新配置；ui.locale 立即生效
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        self.config_manager.set_value(key, value)?;
        if key.trim() == config_keys::UI_LOCALE {
            crate::i18n::set_locale(value);
        }
        info!(key = key, "配置更新完成");
        Ok(())
    }

    pub fn get_duration_table(&self) -> ApiResult<DurationTable> {
        Ok(self.config_manager.get_duration_table()?)
    }

    pub fn get_default_page_size(&self) -> ApiResult<u32> {
        Ok(self.config_manager.get_default_page_size()?)
    }

    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        Ok(self.config_manager.get_config_snapshot()?)
    }

    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ApiResult<usize> {
        if snapshot_json.trim().is_empty() {
            return Err(ApiError::InvalidInput("配置快照不能为空".to_string()));
        }
        let count = self.config_manager.restore_config_from_snapshot(snapshot_json)?;
        crate::i18n::set_locale(&self.config_manager.get_locale()?);
        info!(count = count, "配置快照已恢复");
        Ok(count)
    }
}
