//! 多值、按时间索引的 key-value 存储，供传感器融合流程保存观测与状态估计。
//!
//! - 每个 key（如 `"GPS-pseudorange"`、`"position"`）对应一条按时间排序的序列。
//! - 同一时刻允许多条记录，以插入顺序的序号区分，见 [`UniqueId`]。
//! - 查询分三类：点访问（`get_element`）、边界查询（`get_time_*`）、范围查询
//!   （`get_elements_between` / `get_times_between`）。
//!
//! ```
//! use temporal_dataset::DataSet;
//!
//! let mut ds: DataSet<&str, f64> = DataSet::new();
//! ds.add_element("pseudorange", 1.0, 2.1e7);
//! ds.add_element("pseudorange", 1.0, 2.3e7);
//! ds.add_element("pseudorange", 2.0, 2.2e7);
//!
//! assert_eq!(ds.count_element(&"pseudorange", 1.0), 2);
//! assert_eq!(ds.get_time_next(&"pseudorange", 1.0), Some(2.0));
//! assert_eq!(ds.get_elements_between(&"pseudorange", 0.0, 1.5).len(), 2);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod index;
pub mod stats;

pub use crate::config::DataSetConfig;
pub use crate::core::{DataStream, Timestamped, UniqueId};
pub use crate::error::{DataSetError, Result};
pub use crate::index::DataSet;
pub use crate::stats::{DataSetStats, StreamStats};
