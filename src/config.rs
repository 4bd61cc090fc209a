use serde::{Deserialize, Serialize};
use std::path::Path;

/// 数据集诊断配置
///
/// ```toml
/// warn_on_empty = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSetConfig {
    /// 空结果（范围查询无数据、无 key）时是否输出 warn 级诊断。
    /// 优化器内层循环中频繁查询时可关闭。
    pub warn_on_empty: bool,
}

impl Default for DataSetConfig {
    fn default() -> Self {
        Self {
            warn_on_empty: true,
        }
    }
}

impl DataSetConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {:?}: {}", path, e))?;
        let cfg = Self::from_toml_str(&data)?;
        tracing::debug!("Loaded dataset config from {:?}: {:?}", path, cfg);
        Ok(cfg)
    }

    /// 关闭空结果诊断
    pub fn quiet() -> Self {
        Self {
            warn_on_empty: false,
        }
    }
}
