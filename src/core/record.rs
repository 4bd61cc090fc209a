/// 自带 key 与时间戳的记录（例如状态估计：名称 + 时刻）
///
/// 实现后可直接 `DataSet::add_record(record)`，无需调用方重复传入 key/时间戳。
pub trait Timestamped {
    type Key;

    fn key(&self) -> Self::Key;
    fn timestamp(&self) -> f64;
}
