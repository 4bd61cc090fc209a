use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::ops::Bound;

pub(crate) type Time = OrderedFloat<f64>;

/// 单个 key 下的时间序列（按时间排序，同一时刻允许多条记录）
///
/// - 外层 `BTreeMap` 的 key 即“不重复的时间戳”，所有边界查询都在它上面做 O(log n) 的
///   lower/upper bound。
/// - 同一时刻的记录按插入顺序放在 `Vec` 中；下标就是序号（ordinal）。
/// - 不变量：map 中不存在空 `Vec`；`len` 始终等于所有 `Vec` 长度之和。
#[derive(Clone, Debug, PartialEq)]
pub struct DataStream<T> {
    entries: BTreeMap<Time, Vec<T>>,
    len: usize,
}

impl<T> Default for DataStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataStream<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            len: 0,
        }
    }

    /// 记录总数（重复时刻逐条计数）
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 不重复时间戳的数量
    pub fn count_times(&self) -> usize {
        self.entries.len()
    }

    pub fn count_at(&self, timestamp: f64) -> usize {
        self.entries
            .get(&OrderedFloat(timestamp))
            .map(|v| v.len())
            .unwrap_or(0)
    }

    pub fn contains_time(&self, timestamp: f64) -> bool {
        self.entries.contains_key(&OrderedFloat(timestamp))
    }

    /// 追加（不替换）：同一时刻已有记录时排在其后
    pub fn push(&mut self, timestamp: f64, record: T) {
        self.entries
            .entry(OrderedFloat(timestamp))
            .or_default()
            .push(record);
        self.len += 1;
    }

    pub fn get(&self, timestamp: f64, ordinal: usize) -> Option<&T> {
        self.entries.get(&OrderedFloat(timestamp))?.get(ordinal)
    }

    pub fn get_mut(&mut self, timestamp: f64, ordinal: usize) -> Option<&mut T> {
        self.entries.get_mut(&OrderedFloat(timestamp))?.get_mut(ordinal)
    }

    /// 删除该时刻第 `ordinal` 条记录；其后的记录序号依次前移。
    pub fn remove(&mut self, timestamp: f64, ordinal: usize) -> Option<T> {
        let key = OrderedFloat(timestamp);
        let records = self.entries.get_mut(&key)?;
        if ordinal >= records.len() {
            return None;
        }
        let removed = records.remove(ordinal);
        if records.is_empty() {
            self.entries.remove(&key);
        }
        self.len -= 1;
        Some(removed)
    }

    /// 删除该时刻全部记录
    pub fn remove_all(&mut self, timestamp: f64) -> Option<Vec<T>> {
        let removed = self.entries.remove(&OrderedFloat(timestamp))?;
        self.len -= removed.len();
        Some(removed)
    }

    /// 该时刻的全部记录（按插入顺序）；不存在时为空切片
    pub fn at(&self, timestamp: f64) -> &[T] {
        self.entries
            .get(&OrderedFloat(timestamp))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_time(&self) -> Option<f64> {
        self.entries.keys().next().map(|t| t.0)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.entries.keys().next_back().map(|t| t.0)
    }

    /// 最小的 >= `timestamp` 的时间戳
    pub fn lower_bound(&self, timestamp: f64) -> Option<f64> {
        self.entries
            .range(OrderedFloat(timestamp)..)
            .next()
            .map(|(t, _)| t.0)
    }

    /// 最小的 > `timestamp` 的时间戳
    pub fn upper_bound(&self, timestamp: f64) -> Option<f64> {
        self.entries
            .range((Bound::Excluded(OrderedFloat(timestamp)), Bound::Unbounded))
            .next()
            .map(|(t, _)| t.0)
    }

    /// 最大的 < `timestamp` 的时间戳
    pub fn below(&self, timestamp: f64) -> Option<f64> {
        self.entries
            .range(..OrderedFloat(timestamp))
            .next_back()
            .map(|(t, _)| t.0)
    }

    /// 按时间升序的不重复时间戳
    pub fn times(&self) -> impl DoubleEndedIterator<Item = f64> + '_ {
        self.entries.keys().map(|t| t.0)
    }

    /// 闭区间 [start, end] 内的（时间戳, 该时刻记录）。
    /// 按 map 自身的全序比较边界（NaN 排在最后）；start 在 end 之后时为空。
    pub(crate) fn slots_between(
        &self,
        start: f64,
        end: f64,
    ) -> impl Iterator<Item = (f64, &[T])> + '_ {
        let (start, end) = (OrderedFloat(start), OrderedFloat(end));
        let range = (start <= end).then(|| self.entries.range(start..=end));
        range
            .into_iter()
            .flatten()
            .map(|(t, v)| (t.0, v.as_slice()))
    }

    /// 按时间升序、同一时刻按序号的 (时间戳, 记录)
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.entries
            .iter()
            .flat_map(|(t, v)| v.iter().map(move |r| (t.0, r)))
    }

    /// 按时间升序的 (时间戳, 序号, 记录)
    pub fn iter_indexed(&self) -> impl Iterator<Item = (f64, usize, &T)> + '_ {
        self.entries
            .iter()
            .flat_map(|(t, v)| v.iter().enumerate().map(move |(n, r)| (t.0, n, r)))
    }
}
