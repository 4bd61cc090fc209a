use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;

use crate::index::DataSet;

/// 数据集概况
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSetStats {
    /// key 数量
    pub key_count: usize,
    /// 记录总数（重复时刻逐条计数）
    pub element_count: usize,
    /// 各 key 不重复时间戳数量之和
    pub time_count: usize,
    /// 全部 key 中最早 / 最晚的时间戳
    pub time_first: Option<f64>,
    pub time_last: Option<f64>,
    /// 按 key 顺序的逐条统计
    pub streams: Vec<StreamStats>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamStats {
    /// key 的 Debug 表示
    pub key: String,
    pub element_count: usize,
    pub time_count: usize,
    pub time_first: f64,
    pub time_last: f64,
    /// 单个时刻上的最大记录数（> 1 表示存在重复）
    pub max_per_time: usize,
}

impl<K: Ord + Debug, T> DataSet<K, T> {
    pub fn stats(&self) -> DataSetStats {
        let mut report = DataSetStats::default();

        for (key, stream) in self.iter() {
            let (Some(first), Some(last)) = (stream.first_time(), stream.last_time()) else {
                continue;
            };
            let max_per_time = stream
                .times()
                .map(|t| stream.count_at(t))
                .max()
                .unwrap_or(0);

            report.key_count += 1;
            report.element_count += stream.len();
            report.time_count += stream.count_times();
            report.time_first = Some(report.time_first.map_or(first, |t| t.min(first)));
            report.time_last = Some(report.time_last.map_or(last, |t| t.max(last)));
            report.streams.push(StreamStats {
                key: format!("{:?}", key),
                element_count: stream.len(),
                time_count: stream.count_times(),
                time_first: first,
                time_last: last,
                max_per_time,
            });
        }

        report
    }
}

fn fmt_time(t: Option<f64>) -> String {
    match t {
        Some(t) => format!("{:.3}", t),
        None => "-".to_string(),
    }
}

impl fmt::Display for DataSetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           DataSet Report                         ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║   keys:         {:>10}                       ║", self.key_count)?;
        writeln!(f, "║   elements:     {:>10}                       ║", self.element_count)?;
        writeln!(f, "║   timestamps:   {:>10}                       ║", self.time_count)?;
        writeln!(
            f,
            "║   span:         {:>14} .. {:<14}   ║",
            fmt_time(self.time_first),
            fmt_time(self.time_last)
        )?;
        for s in &self.streams {
            writeln!(f, "╠──────────────────────────────────────────────────╣")?;
            writeln!(f, "║ {:<48} ║", s.key)?;
            writeln!(
                f,
                "║   elements:     {:>10}  (max/time {:>4})     ║",
                s.element_count, s.max_per_time
            )?;
            writeln!(f, "║   timestamps:   {:>10}                       ║", s.time_count)?;
            writeln!(
                f,
                "║   span:         {:>14} .. {:<14}   ║",
                fmt_time(Some(s.time_first)),
                fmt_time(Some(s.time_last))
            )?;
        }
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}
