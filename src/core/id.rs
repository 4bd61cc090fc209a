use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 唯一定位一条记录：(key, 时间戳, 序号)
///
/// ## 契约（重要）
/// 序号是同一 (key, 时间戳) 下按插入顺序的**位置**，不是持久句柄：
/// 删除序号 0 的记录后，原序号 1 的记录会变成序号 0。
/// 需要逐条删除时，每次删除前重新调用 `get_unique_ids`。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniqueId<K> {
    pub key: K,
    pub timestamp: f64,
    pub ordinal: usize,
}

impl<K> UniqueId<K> {
    pub fn new(key: K, timestamp: f64, ordinal: usize) -> Self {
        Self {
            key,
            timestamp,
            ordinal,
        }
    }
}

impl<K: PartialEq> PartialEq for UniqueId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.timestamp.total_cmp(&other.timestamp) == Ordering::Equal
            && self.ordinal == other.ordinal
    }
}

impl<K: Eq> Eq for UniqueId<K> {}

impl<K: Ord> PartialOrd for UniqueId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for UniqueId<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.timestamp.total_cmp(&other.timestamp))
            .then_with(|| self.ordinal.cmp(&other.ordinal))
    }
}

impl<K: fmt::Display> fmt::Display for UniqueId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.timestamp, self.ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_needs_all_three_fields() {
        let a = UniqueId::new("position", 1.5, 0);
        assert_eq!(a, UniqueId::new("position", 1.5, 0));
        assert_ne!(a, UniqueId::new("position", 1.5, 1));
        assert_ne!(a, UniqueId::new("position", 2.5, 0));
        assert_ne!(a, UniqueId::new("velocity", 1.5, 0));
    }

    #[test]
    fn orders_by_key_then_time_then_ordinal() {
        let mut ids = vec![
            UniqueId::new("b", 0.0, 0),
            UniqueId::new("a", 2.0, 0),
            UniqueId::new("a", 1.0, 1),
            UniqueId::new("a", 1.0, 0),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                UniqueId::new("a", 1.0, 0),
                UniqueId::new("a", 1.0, 1),
                UniqueId::new("a", 2.0, 0),
                UniqueId::new("b", 0.0, 0),
            ]
        );
    }

    #[test]
    fn display_and_json() {
        let id = UniqueId::new("pseudorange", 12.25, 3);
        assert_eq!(id.to_string(), "pseudorange 12.25 3");

        let json = serde_json::to_string(&id).unwrap();
        let back: UniqueId<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UniqueId::new("pseudorange".to_string(), 12.25, 3));
    }
}
