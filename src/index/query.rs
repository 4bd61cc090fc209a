//! 时间查询：全部边界查询都作用于序列的**不重复时间戳**，
//! 基于有序 map 的 lower/upper bound，浮点相等只用于“是否为已存储的时间戳”。

use ordered_float::OrderedFloat;
use std::fmt::Debug;

use crate::error::{DataSetError, Result};
use crate::index::DataSet;

impl<K: Ord + Debug, T> DataSet<K, T> {
    pub fn get_time_first(&self, key: &K) -> Result<f64> {
        self.stream(key)
            .and_then(|s| s.first_time())
            .ok_or_else(|| DataSetError::key_not_found(key))
    }

    pub fn get_time_last(&self, key: &K) -> Result<f64> {
        self.stream(key)
            .and_then(|s| s.last_time())
            .ok_or_else(|| DataSetError::key_not_found(key))
    }

    /// 所有 key 中最早的时间戳；空数据集报 `EmptyCollection`（不返回 0）
    pub fn get_time_first_overall(&self) -> Result<f64> {
        let first = self
            .iter()
            .filter_map(|(_, s)| s.first_time())
            .min_by(|a, b| a.total_cmp(b));

        match first {
            Some(t) => Ok(t),
            None => {
                tracing::error!("Empty list!");
                Err(DataSetError::EmptyCollection("dataset has no elements"))
            }
        }
    }

    /// 严格大于 `timestamp` 的下一个时间戳；`timestamp` 本身必须存在
    pub fn get_time_next(&self, key: &K, timestamp: f64) -> Option<f64> {
        let stream = self.stream_or_report(key)?;
        if !stream.contains_time(timestamp) {
            tracing::error!("Timestamp {} does not exist for {:?}", timestamp, key);
            return None;
        }
        stream.upper_bound(timestamp)
    }

    /// 严格小于 `timestamp` 的上一个时间戳（与该时刻重复记录数无关）；
    /// `timestamp` 本身必须存在
    pub fn get_time_prev(&self, key: &K, timestamp: f64) -> Option<f64> {
        let stream = self.stream_or_report(key)?;
        if !stream.contains_time(timestamp) {
            tracing::error!("Timestamp {} does not exist for {:?}", timestamp, key);
            return None;
        }
        stream.below(timestamp)
    }

    /// 最小的 >= `timestamp` 的时间戳
    pub fn get_time_above_or_equal(&self, key: &K, timestamp: f64) -> Option<f64> {
        self.stream_or_report(key)?.lower_bound(timestamp)
    }

    /// 最小的 > `timestamp` 的时间戳
    pub fn get_time_above(&self, key: &K, timestamp: f64) -> Option<f64> {
        self.stream_or_report(key)?.upper_bound(timestamp)
    }

    /// 最大的 < `timestamp` 的时间戳
    pub fn get_time_below(&self, key: &K, timestamp: f64) -> Option<f64> {
        self.stream_or_report(key)?.below(timestamp)
    }

    /// `timestamp` 存在则返回它本身，否则返回最大的 < `timestamp` 的时间戳
    pub fn get_time_below_or_equal(&self, key: &K, timestamp: f64) -> Option<f64> {
        let stream = self.stream_or_report(key)?;
        if stream.contains_time(timestamp) {
            return Some(timestamp);
        }
        let below = stream.below(timestamp);
        if below.is_none() {
            self.report_empty(format_args!(
                "Key {:?} does not have any element below {}!",
                key, timestamp
            ));
        }
        below
    }

    /// 距离 `timestamp` 最近的时间戳；上下等距时取上方
    pub fn get_time_close_to(&self, key: &K, timestamp: f64) -> Option<f64> {
        let stream = self.stream_or_report(key)?;
        let above = stream.lower_bound(timestamp);
        if above == Some(timestamp) {
            return above;
        }

        match (stream.below(timestamp), above) {
            (Some(below), Some(above)) => {
                if (above - timestamp) <= (timestamp - below) {
                    Some(above)
                } else {
                    Some(below)
                }
            }
            (below, above) => above.or(below),
        }
    }

    // ---------------------------------------------------------------------
    // 范围查询
    // ---------------------------------------------------------------------

    /// 恰好在 `timestamp` 的全部记录（含重复，按序号）
    pub fn get_elements(&self, key: &K, timestamp: f64) -> Vec<&T> {
        let records: Vec<&T> = self
            .stream(key)
            .map(|s| s.at(timestamp).iter().collect())
            .unwrap_or_default();

        if records.is_empty() {
            self.report_empty(format_args!(
                "No element of {:?} at {}, returned empty vector!",
                key, timestamp
            ));
        }
        records
    }

    /// key 下全部记录，按时间顺序
    pub fn get_elements_of_id(&self, key: &K) -> Vec<&T> {
        let records: Vec<&T> = self
            .stream(key)
            .map(|s| s.iter().map(|(_, r)| r).collect())
            .unwrap_or_default();

        if records.is_empty() {
            self.report_empty(format_args!("No element of {:?}, returned empty vector!", key));
        }
        records
    }

    /// 闭区间 [start, end] 内的全部记录（含重复）。
    ///
    /// `start == end` 时等价于 [`get_elements`](Self::get_elements)；
    /// 边界先解析为真实存在的时间戳，解析后下界大于上界时返回空。
    pub fn get_elements_between(&self, key: &K, start: f64, end: f64) -> Vec<&T> {
        if start == end {
            return self.get_elements(key, start);
        }

        let Some(stream) = self.stream_or_report(key) else {
            return Vec::new();
        };

        // get_time_below_or_equal 已输出诊断
        let Some(last) = self.get_time_below_or_equal(key, end) else {
            return Vec::new();
        };
        let Some(first) = stream.lower_bound(start) else {
            self.report_empty(format_args!(
                "Did not find lower bound of {:?} at {}",
                key, start
            ));
            return Vec::new();
        };

        if OrderedFloat(first) > OrderedFloat(last) {
            self.report_empty(format_args!(
                "There is no object between {}s and {}s of type {:?}",
                start, end, key
            ));
            return Vec::new();
        }

        stream
            .slots_between(first, last)
            .flat_map(|(_, records)| records.iter())
            .collect()
    }

    /// key 下全部不重复时间戳
    pub fn get_times_of_id(&self, key: &K) -> Result<Vec<f64>> {
        match self.stream(key) {
            Some(stream) => Ok(stream.times().collect()),
            None => {
                tracing::error!("There is no ID: {:?}", key);
                Err(DataSetError::key_not_found(key))
            }
        }
    }

    /// 闭区间 [start, end] 内的不重复时间戳
    pub fn get_times_between(&self, key: &K, start: f64, end: f64) -> Result<Vec<f64>> {
        let (first, last) = self.borders_inclusive(key, start, end)?;
        Ok(self.collect_times(key, first, last))
    }

    /// 开区间 (start, end) 内的不重复时间戳
    pub fn get_times_strictly_between(&self, key: &K, start: f64, end: f64) -> Result<Vec<f64>> {
        let (first, last) = self.borders_exclusive(key, start, end)?;
        Ok(self.collect_times(key, first, last))
    }

    /// 从第一个时间戳到 `end`（含）的不重复时间戳
    pub fn get_times_below_or_equal(&self, key: &K, end: f64) -> Result<Vec<f64>> {
        let first = self.get_time_first(key).map_err(|e| {
            tracing::error!("There is no ID: {:?}", key);
            e
        })?;
        let last = self.get_time_below_or_equal(key, end).ok_or_else(|| {
            self.report_empty(format_args!(
                "Could not find timestamps before {} for {:?}",
                end, key
            ));
            DataSetError::EmptyCollection("no timestamp below or equal to the requested end")
        })?;
        Ok(self.collect_times(key, first, last))
    }

    fn collect_times(&self, key: &K, first: f64, last: f64) -> Vec<f64> {
        if OrderedFloat(first) > OrderedFloat(last) {
            return Vec::new();
        }
        self.stream(key)
            .map(|s| s.slots_between(first, last).map(|(t, _)| t).collect())
            .unwrap_or_default()
    }

    /// 把 [start, end] 解析为真实存在的边界时间戳（>= start, <= end）
    fn borders_inclusive(&self, key: &K, start: f64, end: f64) -> Result<(f64, f64)> {
        self.resolve_borders(key, start, end, |s, t| s.lower_bound(t), |s, t| {
            if s.contains_time(t) {
                Some(t)
            } else {
                s.below(t)
            }
        })
    }

    /// 把 (start, end) 解析为真实存在的边界时间戳（> start, < end）
    fn borders_exclusive(&self, key: &K, start: f64, end: f64) -> Result<(f64, f64)> {
        self.resolve_borders(key, start, end, |s, t| s.upper_bound(t), |s, t| s.below(t))
    }

    fn resolve_borders(
        &self,
        key: &K,
        start: f64,
        end: f64,
        lower: impl Fn(&crate::core::DataStream<T>, f64) -> Option<f64>,
        upper: impl Fn(&crate::core::DataStream<T>, f64) -> Option<f64>,
    ) -> Result<(f64, f64)> {
        let Some(stream) = self.stream(key) else {
            tracing::error!("There is no ID: {:?}", key);
            return Err(DataSetError::key_not_found(key));
        };

        if start > end {
            tracing::error!("Start: {} is greater than End: {}", start, end);
            return Err(DataSetError::invalid_range(key, start, end));
        }

        let Some(first) = lower(stream, start) else {
            self.report_empty(format_args!("There is no object above: {}", start));
            return Err(DataSetError::EmptyCollection("no timestamp above range start"));
        };
        let Some(last) = upper(stream, end) else {
            self.report_empty(format_args!("There is no object below: {}", end));
            return Err(DataSetError::EmptyCollection("no timestamp below range end"));
        };

        Ok((first, last))
    }

    // ---------------------------------------------------------------------
    // 跨 key 查询
    // ---------------------------------------------------------------------

    pub fn get_keys_all(&self) -> Vec<K>
    where
        K: Clone,
    {
        let keys: Vec<K> = self.keys().cloned().collect();
        if keys.is_empty() {
            self.report_empty(format_args!("Returned empty key list!"));
        }
        keys
    }

    /// 在 `timestamp` 处至少有一条记录的 key
    pub fn get_keys_at_time(&self, timestamp: f64) -> Vec<K>
    where
        K: Clone,
    {
        let keys: Vec<K> = self
            .iter()
            .filter(|(_, s)| s.contains_time(timestamp))
            .map(|(k, _)| k.clone())
            .collect();
        if keys.is_empty() {
            self.report_empty(format_args!("No key has an element at {}!", timestamp));
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DataSetError;
    use crate::index::DataSet;

    fn series(times: &[f64]) -> DataSet<&'static str, f64> {
        let mut ds = DataSet::new();
        for t in times {
            ds.add_element("k", *t, *t * 10.0);
        }
        ds
    }

    #[test]
    fn next_and_prev_need_an_existing_timestamp() {
        let ds = series(&[1.0, 2.0, 2.0, 2.0, 3.0]);
        assert_eq!(ds.get_time_next(&"k", 1.0), Some(2.0));
        assert_eq!(ds.get_time_next(&"k", 2.0), Some(3.0));
        assert_eq!(ds.get_time_next(&"k", 3.0), None);
        assert_eq!(ds.get_time_next(&"k", 1.5), None);

        assert_eq!(ds.get_time_prev(&"k", 3.0), Some(2.0));
        assert_eq!(ds.get_time_prev(&"k", 2.0), Some(1.0));
        assert_eq!(ds.get_time_prev(&"k", 1.0), None);
        assert_eq!(ds.get_time_prev(&"k", 2.5), None);
        assert_eq!(ds.get_time_prev(&"other", 2.0), None);
    }

    #[test]
    fn bound_queries() {
        let ds = series(&[1.0, 3.0, 5.0]);
        assert_eq!(ds.get_time_above_or_equal(&"k", 3.0), Some(3.0));
        assert_eq!(ds.get_time_above_or_equal(&"k", 3.5), Some(5.0));
        assert_eq!(ds.get_time_above_or_equal(&"k", 6.0), None);
        assert_eq!(ds.get_time_above(&"k", 3.0), Some(5.0));
        assert_eq!(ds.get_time_above(&"k", 5.0), None);
        assert_eq!(ds.get_time_below(&"k", 3.0), Some(1.0));
        assert_eq!(ds.get_time_below(&"k", 1.0), None);
        assert_eq!(ds.get_time_below_or_equal(&"k", 3.0), Some(3.0));
        assert_eq!(ds.get_time_below_or_equal(&"k", 4.0), Some(3.0));
        assert_eq!(ds.get_time_below_or_equal(&"k", 0.5), None);
        assert_eq!(ds.get_time_above(&"missing", 0.0), None);
    }

    #[test]
    fn close_to_prefers_upper_on_ties() {
        let ds = series(&[10.0, 20.0]);
        assert_eq!(ds.get_time_close_to(&"k", 15.0), Some(20.0));
        assert_eq!(ds.get_time_close_to(&"k", 14.0), Some(10.0));
        assert_eq!(ds.get_time_close_to(&"k", 16.0), Some(20.0));
        assert_eq!(ds.get_time_close_to(&"k", 10.0), Some(10.0));
        assert_eq!(ds.get_time_close_to(&"k", -5.0), Some(10.0));
        assert_eq!(ds.get_time_close_to(&"k", 99.0), Some(20.0));
        assert_eq!(ds.get_time_close_to(&"missing", 1.0), None);
    }

    #[test]
    fn first_last_and_overall() {
        let mut ds = series(&[4.0, 2.0, 8.0]);
        assert_eq!(ds.get_time_first(&"k"), Ok(2.0));
        assert_eq!(ds.get_time_last(&"k"), Ok(8.0));
        assert!(ds.get_time_first(&"missing").is_err());

        ds.add_element("j", 1.5, 0.0);
        assert_eq!(ds.get_time_first_overall(), Ok(1.5));

        ds.clear();
        assert!(matches!(
            ds.get_time_first_overall(),
            Err(DataSetError::EmptyCollection(_))
        ));
    }

    #[test]
    fn elements_between_is_inclusive_and_keeps_duplicates() {
        let mut ds = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        ds.add_element("k", 3.0, 31.0);

        assert_eq!(
            ds.get_elements_between(&"k", 2.0, 4.0),
            vec![&20.0, &30.0, &31.0, &40.0]
        );
        assert_eq!(
            ds.get_elements_between(&"k", 1.5, 2.5),
            vec![&20.0]
        );
        assert!(ds.get_elements_between(&"k", 2.2, 2.8).is_empty());
        assert!(ds.get_elements_between(&"k", 6.0, 9.0).is_empty());
        assert!(ds.get_elements_between(&"k", -3.0, 0.0).is_empty());
        assert!(ds.get_elements_between(&"missing", 0.0, 9.0).is_empty());
        assert_eq!(
            ds.get_elements_between(&"k", 3.0, 3.0),
            ds.get_elements(&"k", 3.0)
        );
    }

    #[test]
    fn times_between_and_below() {
        let mut ds = series(&[1.0, 2.0, 3.0, 4.0]);
        ds.add_element("k", 2.0, 0.0);

        assert_eq!(ds.get_times_between(&"k", 1.5, 4.0), Ok(vec![2.0, 3.0, 4.0]));
        assert_eq!(ds.get_times_between(&"k", 2.2, 2.8), Ok(vec![]));
        assert!(matches!(
            ds.get_times_between(&"k", 4.0, 1.0),
            Err(DataSetError::InvalidRange { .. })
        ));
        assert!(ds.get_times_between(&"k", 5.0, 6.0).is_err());
        assert!(ds.get_times_between(&"missing", 0.0, 1.0).unwrap_err().is_not_found());

        assert_eq!(ds.get_times_strictly_between(&"k", 1.0, 4.0), Ok(vec![2.0, 3.0]));

        assert_eq!(ds.get_times_below_or_equal(&"k", 2.5), Ok(vec![1.0, 2.0]));
        assert_eq!(ds.get_times_below_or_equal(&"k", 9.0), Ok(vec![1.0, 2.0, 3.0, 4.0]));
        assert!(ds.get_times_below_or_equal(&"k", 0.0).is_err());

        assert_eq!(ds.get_times_of_id(&"k"), Ok(vec![1.0, 2.0, 3.0, 4.0]));
        assert_eq!(ds.get_elements_of_id(&"k").len(), 5);
    }

    #[test]
    fn nan_timestamp_does_not_break_range_queries() {
        let mut ds: DataSet<&str, f64> = DataSet::new();
        ds.add_element("k", 1.0, 1.0);
        ds.add_element("k", f64::NAN, 2.0);

        // 下界解析为 NaN（排在最后），上界解析为 1.0：区间为空
        assert!(ds.get_elements_between(&"k", 5.0, 20.0).is_empty());
        assert_eq!(ds.get_times_between(&"k", 5.0, 20.0), Ok(vec![]));

        assert_eq!(ds.get_elements_between(&"k", 0.0, 20.0), vec![&1.0]);
        assert_eq!(ds.get_times_between(&"k", 0.0, 20.0), Ok(vec![1.0]));
        assert_eq!(ds.get_times_below_or_equal(&"k", 20.0), Ok(vec![1.0]));
    }

    #[test]
    fn keys_all_and_at_time() {
        let mut ds: DataSet<&str, i32> = DataSet::new();
        assert!(ds.get_keys_all().is_empty());
        ds.add_element("gnss", 1.0, 0);
        ds.add_element("odom", 1.0, 0);
        ds.add_element("odom", 2.0, 0);

        assert_eq!(ds.get_keys_all(), vec!["gnss", "odom"]);
        assert_eq!(ds.get_keys_at_time(1.0), vec!["gnss", "odom"]);
        assert_eq!(ds.get_keys_at_time(2.0), vec!["odom"]);
        assert!(ds.get_keys_at_time(3.0).is_empty());
    }
}
