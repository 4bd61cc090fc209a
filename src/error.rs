use std::fmt::Debug;

/// 数据集错误：全部是局部、可恢复的情况（不会 panic，也没有哨兵默认对象）
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataSetError {
    #[error("key does not exist: {0}")]
    KeyNotFound(String),

    #[error("element does not exist at {timestamp} of {key}, ordinal {ordinal}")]
    ElementNotFound {
        key: String,
        timestamp: f64,
        ordinal: usize,
    },

    #[error("empty collection: {0}")]
    EmptyCollection(&'static str),

    #[error("invalid range for {key}: start {start} is greater than end {end}")]
    InvalidRange { key: String, start: f64, end: f64 },
}

impl DataSetError {
    pub(crate) fn key_not_found<K: Debug>(key: &K) -> Self {
        DataSetError::KeyNotFound(format!("{:?}", key))
    }

    pub(crate) fn element_not_found<K: Debug>(key: &K, timestamp: f64, ordinal: usize) -> Self {
        DataSetError::ElementNotFound {
            key: format!("{:?}", key),
            timestamp,
            ordinal,
        }
    }

    pub(crate) fn invalid_range<K: Debug>(key: &K, start: f64, end: f64) -> Self {
        DataSetError::InvalidRange {
            key: format!("{:?}", key),
            start,
            end,
        }
    }

    /// 是否为“不存在”类错误（key 或元素）
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataSetError::KeyNotFound(_) | DataSetError::ElementNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DataSetError>;
