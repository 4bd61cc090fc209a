use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::config::DataSetConfig;
use crate::core::{DataStream, Timestamped, UniqueId};
use crate::error::{DataSetError, Result};

/// 按 key 组织的多值时间序列存储
///
/// 每个 key 拥有一条独立的 [`DataStream`]；同一 (key, 时间戳) 下可以有多条记录，
/// 以插入顺序的序号（ordinal）区分。
///
/// ## 不变量
/// - 出现在 `streams` 中的 key，其序列一定非空；删除最后一条记录时 key 一并移除。
///
/// ## 并发
/// 无内部锁。多线程共享时由调用方串行化所有写操作；读操作返回的引用/迭代器
/// 只在下一次修改前有效（借用检查器会强制这一点）。
#[derive(Clone, Debug, PartialEq)]
pub struct DataSet<K, T> {
    streams: BTreeMap<K, DataStream<T>>,
    config: DataSetConfig,
}

impl<K, T> Default for DataSet<K, T> {
    fn default() -> Self {
        Self {
            streams: BTreeMap::new(),
            config: DataSetConfig::default(),
        }
    }
}

impl<K: Ord + Debug, T> DataSet<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DataSetConfig) -> Self {
        Self {
            streams: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &DataSetConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DataSetConfig) {
        self.config = config;
    }

    pub(crate) fn stream(&self, key: &K) -> Option<&DataStream<T>> {
        self.streams.get(key)
    }

    /// 查找 key 的序列；不存在时输出 error 诊断
    pub(crate) fn stream_or_report(&self, key: &K) -> Option<&DataStream<T>> {
        let stream = self.streams.get(key);
        if stream.is_none() {
            tracing::error!("Key does not exist: {:?}", key);
        }
        stream
    }

    pub(crate) fn report_empty(&self, what: std::fmt::Arguments<'_>) {
        if self.config.warn_on_empty {
            tracing::warn!("{}", what);
        }
    }

    // ---------------------------------------------------------------------
    // 索引维护
    // ---------------------------------------------------------------------

    /// 追加一条记录；key 不存在时惰性创建序列。永不失败。
    pub fn add_element(&mut self, key: K, timestamp: f64, record: T) {
        match self.streams.entry(key) {
            btree_map::Entry::Occupied(mut e) => e.get_mut().push(timestamp, record),
            btree_map::Entry::Vacant(e) => {
                tracing::debug!("Creating stream for {:?}", e.key());
                e.insert(DataStream::new()).push(timestamp, record);
            }
        }
    }

    /// 追加一条自带 key/时间戳的记录
    pub fn add_record(&mut self, record: T)
    where
        T: Timestamped<Key = K>,
    {
        let key = record.key();
        let timestamp = record.timestamp();
        self.add_element(key, timestamp, record);
    }

    pub fn check_id(&self, key: &K) -> bool {
        self.streams.contains_key(key)
    }

    /// 该 (key, 时间戳) 下的记录数是否大于 `ordinal`
    pub fn check_element(&self, key: &K, timestamp: f64, ordinal: usize) -> bool {
        self.count_element(key, timestamp) > ordinal
    }

    pub fn clear(&mut self) {
        tracing::debug!("Clearing dataset with {} keys", self.streams.len());
        self.streams.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    // ---------------------------------------------------------------------
    // 元素寻址
    // ---------------------------------------------------------------------

    pub fn get_element(&self, key: &K, timestamp: f64, ordinal: usize) -> Result<&T> {
        match self.streams.get(key).and_then(|s| s.get(timestamp, ordinal)) {
            Some(record) => Ok(record),
            None => {
                tracing::error!(
                    "Element doesn't exist at: {} Type: {:?} Number: {}",
                    timestamp,
                    key,
                    ordinal
                );
                Err(DataSetError::element_not_found(key, timestamp, ordinal))
            }
        }
    }

    /// 原地修改；返回的可变引用在下一次修改前有效
    pub fn get_element_mut(&mut self, key: &K, timestamp: f64, ordinal: usize) -> Result<&mut T> {
        match self
            .streams
            .get_mut(key)
            .and_then(|s| s.get_mut(timestamp, ordinal))
        {
            Some(record) => Ok(record),
            None => {
                tracing::error!(
                    "Element doesn't exist at: {} Type: {:?} Number: {}",
                    timestamp,
                    key,
                    ordinal
                );
                Err(DataSetError::element_not_found(key, timestamp, ordinal))
            }
        }
    }

    /// 原地替换，返回被替换的旧记录
    pub fn set_element(&mut self, key: &K, timestamp: f64, ordinal: usize, record: T) -> Result<T> {
        let slot = self.get_element_mut(key, timestamp, ordinal)?;
        Ok(std::mem::replace(slot, record))
    }

    /// 删除该时刻第 `ordinal` 条记录（同一时刻其后的记录序号前移）。
    /// 序列删空时 key 一并移除。
    pub fn remove_element(&mut self, key: &K, timestamp: f64, ordinal: usize) -> Result<T> {
        let removed = self
            .streams
            .get_mut(key)
            .and_then(|s| s.remove(timestamp, ordinal));

        match removed {
            Some(record) => {
                self.drop_if_empty(key);
                Ok(record)
            }
            None => {
                tracing::error!(
                    "Element doesn't exist at: {} Type: {:?} Number: {}",
                    timestamp,
                    key,
                    ordinal
                );
                Err(DataSetError::element_not_found(key, timestamp, ordinal))
            }
        }
    }

    /// 删除该时刻的全部记录（按插入顺序返回）。
    ///
    /// 只有一条记录时即“删除这一条”；存在重复时会全部删除，需要精确删除请用
    /// [`remove_element`](Self::remove_element) 指定序号。
    pub fn remove_elements(&mut self, key: &K, timestamp: f64) -> Result<Vec<T>> {
        let removed = self
            .streams
            .get_mut(key)
            .and_then(|s| s.remove_all(timestamp));

        match removed {
            Some(records) => {
                self.drop_if_empty(key);
                Ok(records)
            }
            None => {
                tracing::error!("Element doesn't exist at: {} Type: {:?}", timestamp, key);
                Err(DataSetError::element_not_found(key, timestamp, 0))
            }
        }
    }

    fn drop_if_empty(&mut self, key: &K) {
        if self.streams.get(key).is_some_and(|s| s.is_empty()) {
            self.streams.remove(key);
            tracing::debug!("Dropped empty stream {:?}", key);
        }
    }

    /// key 下当前所有记录的 [`UniqueId`]（按时间、再按序号；惰性迭代）
    pub fn get_unique_ids(&self, key: &K) -> Result<impl Iterator<Item = UniqueId<K>> + '_>
    where
        K: Clone,
    {
        let Some(stream) = self.streams.get(key) else {
            tracing::error!("There is no ID: {:?}", key);
            return Err(DataSetError::key_not_found(key));
        };
        let key = key.clone();
        Ok(stream
            .iter_indexed()
            .map(move |(t, n, _)| UniqueId::new(key.clone(), t, n)))
    }

    pub fn count_element(&self, key: &K, timestamp: f64) -> usize {
        self.streams
            .get(key)
            .map(|s| s.count_at(timestamp))
            .unwrap_or(0)
    }

    pub fn count_elements(&self, key: &K) -> usize {
        self.streams.get(key).map(|s| s.len()).unwrap_or(0)
    }

    /// 不重复时间戳的数量（同一时刻的多条记录只算一次）。
    ///
    /// 需要记录总数时用 [`count_elements`](Self::count_elements)：
    /// 两条记录都在 t=1.0 时 `count_times == 1`，`count_elements == 2`。
    pub fn count_times(&self, key: &K) -> usize {
        self.streams.get(key).map(|s| s.count_times()).unwrap_or(0)
    }

    // ---------------------------------------------------------------------
    // 合并与遍历
    // ---------------------------------------------------------------------

    /// 并集合并：`other` 的每条记录都以 `add_element` 追加进来（不去重），
    /// `other` 保持不变。
    pub fn merge(&mut self, other: &DataSet<K, T>)
    where
        K: Clone,
        T: Clone,
    {
        let mut merged = 0usize;
        for (key, stream) in other.iter() {
            for (t, record) in stream.iter() {
                self.add_element(key.clone(), t, record.clone());
                merged += 1;
            }
        }
        tracing::debug!("Merged {} records from {} keys", merged, other.streams.len());
    }

    /// 按 key 顺序遍历 (key, 序列)
    pub fn iter(&self) -> btree_map::Iter<'_, K, DataStream<T>> {
        self.streams.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.streams.keys()
    }
}

impl<'a, K, T> IntoIterator for &'a DataSet<K, T> {
    type Item = (&'a K, &'a DataStream<T>);
    type IntoIter = btree_map::Iter<'a, K, DataStream<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.iter()
    }
}

impl<K: Ord + Debug, T> Extend<(K, f64, T)> for DataSet<K, T> {
    fn extend<I: IntoIterator<Item = (K, f64, T)>>(&mut self, iter: I) {
        for (key, timestamp, record) in iter {
            self.add_element(key, timestamp, record);
        }
    }
}

impl<K: Ord + Debug, T> FromIterator<(K, f64, T)> for DataSet<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, f64, T)>>(iter: I) -> Self {
        let mut set = DataSet::new();
        set.extend(iter);
        set
    }
}
