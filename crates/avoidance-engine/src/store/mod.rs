//! 持久化层
//!
//! 标签分析记录和避免计划分别存放，计划通过 analysis_id 关联分析记录。
//! 内存实现使用 DashMap，按用户分片保存，适合单进程部署和测试。
//! 所有读取和删除都按用户隔离：其他用户的记录 ID 查询结果为 None。

mod analysis_repo;
mod plan_repo;

pub use analysis_repo::{AnalysisRecord, AnalysisRepository, InMemoryAnalysisRepository, NewAnalysis};
pub use plan_repo::{InMemoryPlanRepository, PlanRecord, PlanRepository};

#[cfg(test)]
pub use analysis_repo::MockAnalysisRepository;
#[cfg(test)]
pub use plan_repo::MockPlanRepository;
