//! 避免计划存储
//!
//! 计划以 JSON 文本（plan_text）持久化，读取时原样返回。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nutrlens_shared::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 持久化的计划记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: Uuid,
    pub user_id: String,
    /// 生成计划所依据的标签分析记录
    pub analysis_id: Uuid,
    pub plan_text: String,
    pub created_at: DateTime<Utc>,
}

/// 计划仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn create(&self, user_id: &str, analysis_id: Uuid, plan_text: &str)
    -> Result<PlanRecord>;
    async fn get(&self, user_id: &str, plan_id: Uuid) -> Result<Option<PlanRecord>>;
    async fn latest(&self, user_id: &str) -> Result<Option<PlanRecord>>;
    /// 最新的在前
    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<PlanRecord>>;
    /// 删除成功返回 true，记录不存在或属于其他用户时返回 false
    async fn delete(&self, user_id: &str, plan_id: Uuid) -> Result<bool>;
}

/// 内存计划仓储
#[derive(Clone, Default)]
pub struct InMemoryPlanRepository {
    /// user_id -> 按创建顺序排列的计划
    plans: Arc<DashMap<String, Vec<PlanRecord>>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有用户的计划总数
    pub fn len(&self) -> usize {
        self.plans.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    #[instrument(skip(self, plan_text))]
    async fn create(
        &self,
        user_id: &str,
        analysis_id: Uuid,
        plan_text: &str,
    ) -> Result<PlanRecord> {
        let record = PlanRecord {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            analysis_id,
            plan_text: plan_text.to_string(),
            created_at: Utc::now(),
        };

        self.plans
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());

        info!(plan_id = %record.id, "避免计划已保存");
        Ok(record)
    }

    async fn get(&self, user_id: &str, plan_id: Uuid) -> Result<Option<PlanRecord>> {
        Ok(self
            .plans
            .get(user_id)
            .and_then(|plans| plans.iter().find(|p| p.id == plan_id).cloned()))
    }

    async fn latest(&self, user_id: &str) -> Result<Option<PlanRecord>> {
        Ok(self
            .plans
            .get(user_id)
            .and_then(|plans| plans.last().cloned()))
    }

    #[instrument(skip(self))]
    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<PlanRecord>> {
        let history: Vec<PlanRecord> = self
            .plans
            .get(user_id)
            .map(|plans| plans.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();

        debug!(count = history.len(), "读取计划历史");
        Ok(history)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str, plan_id: Uuid) -> Result<bool> {
        let Some(mut plans) = self.plans.get_mut(user_id) else {
            return Ok(false);
        };
        let before = plans.len();
        plans.retain(|p| p.id != plan_id);
        let deleted = plans.len() < before;

        if deleted {
            info!("避免计划已删除");
        }
        Ok(deleted)
    }
}
