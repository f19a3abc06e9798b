//! 标签分析记录存储
//!
//! 一条分析记录保存一次标签识别的成分列表、有害标记和营养数据，
//! 计划生成时由它构造引擎输入。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nutrlens_shared::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::label::NutritionFacts;
use crate::models::IngredientObservation;

/// 待保存的分析内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAnalysis {
    pub ingredients: Vec<String>,
    pub harmful_flags: HashMap<String, bool>,
    pub nutrition: NutritionFacts,
}

/// 持久化的分析记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: String,
    pub ingredients: Vec<String>,
    pub harmful_flags: HashMap<String, bool>,
    pub nutrition: NutritionFacts,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// 转成规则引擎的成分观测
    pub fn observation(&self) -> IngredientObservation {
        IngredientObservation {
            ingredients: self.ingredients.clone(),
            harmful_flags: self.harmful_flags.clone(),
        }
    }

    /// 任一成分包含查询词（大小写不敏感）
    fn mentions(&self, query_lower: &str) -> bool {
        self.ingredients
            .iter()
            .any(|i| i.to_lowercase().contains(query_lower))
    }
}

/// 分析记录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    async fn create(&self, user_id: &str, analysis: NewAnalysis) -> Result<AnalysisRecord>;
    async fn get(&self, user_id: &str, analysis_id: Uuid) -> Result<Option<AnalysisRecord>>;
    async fn latest(&self, user_id: &str) -> Result<Option<AnalysisRecord>>;
    /// 最新的在前
    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<AnalysisRecord>>;
    /// 按成分文本搜索，最新的在前
    async fn search(&self, user_id: &str, query: &str, limit: usize)
    -> Result<Vec<AnalysisRecord>>;
    /// 删除成功返回 true，记录不存在或属于其他用户时返回 false
    async fn delete(&self, user_id: &str, analysis_id: Uuid) -> Result<bool>;
}

/// 内存分析记录仓储
#[derive(Clone, Default)]
pub struct InMemoryAnalysisRepository {
    /// user_id -> 按创建顺序排列的分析记录
    analyses: Arc<DashMap<String, Vec<AnalysisRecord>>>,
}

impl InMemoryAnalysisRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.analyses.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnalysisRepository for InMemoryAnalysisRepository {
    #[instrument(skip(self, analysis), fields(ingredients = analysis.ingredients.len()))]
    async fn create(&self, user_id: &str, analysis: NewAnalysis) -> Result<AnalysisRecord> {
        let record = AnalysisRecord {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            ingredients: analysis.ingredients,
            harmful_flags: analysis.harmful_flags,
            nutrition: analysis.nutrition,
            created_at: Utc::now(),
        };

        self.analyses
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());

        info!(analysis_id = %record.id, "标签分析已保存");
        Ok(record)
    }

    async fn get(&self, user_id: &str, analysis_id: Uuid) -> Result<Option<AnalysisRecord>> {
        Ok(self
            .analyses
            .get(user_id)
            .and_then(|records| records.iter().find(|r| r.id == analysis_id).cloned()))
    }

    async fn latest(&self, user_id: &str) -> Result<Option<AnalysisRecord>> {
        Ok(self
            .analyses
            .get(user_id)
            .and_then(|records| records.last().cloned()))
    }

    #[instrument(skip(self))]
    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let history: Vec<AnalysisRecord> = self
            .analyses
            .get(user_id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();

        debug!(count = history.len(), "读取分析历史");
        Ok(history)
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>> {
        let query_lower = query.to_lowercase();
        let found: Vec<AnalysisRecord> = self
            .analyses
            .get(user_id)
            .map(|records| {
                records
                    .iter()
                    .rev()
                    .filter(|r| r.mentions(&query_lower))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(count = found.len(), "搜索分析记录");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &str, analysis_id: Uuid) -> Result<bool> {
        let Some(mut records) = self.analyses.get_mut(user_id) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|r| r.id != analysis_id);
        let deleted = records.len() < before;

        if deleted {
            info!("标签分析已删除");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(ingredients: &[&str]) -> NewAnalysis {
        NewAnalysis {
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
            harmful_flags: HashMap::from([(ingredients[0].to_string(), true)]),
            nutrition: NutritionFacts {
                calories: Some(120),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryAnalysisRepository::new();

        let record = repo
            .create("user-1", analysis(&["Sugar", "Oats"]))
            .await
            .unwrap();
        assert_eq!(record.ingredients, vec!["Sugar", "Oats"]);
        assert_eq!(record.nutrition.calories, Some(120));

        let fetched = repo.get("user-1", record.id).await.unwrap();
        assert_eq!(fetched, Some(record.clone()));
        assert!(repo.get("user-2", record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_observation_carries_flags() {
        let repo = InMemoryAnalysisRepository::new();
        let record = repo
            .create("user-1", analysis(&["Salt", "Water"]))
            .await
            .unwrap();

        let observation = record.observation();
        assert_eq!(observation.ingredients, vec!["Salt", "Water"]);
        assert!(observation.is_flagged("Salt"));
        assert!(!observation.is_flagged("Water"));
    }

    #[tokio::test]
    async fn test_latest_and_history_order() {
        let repo = InMemoryAnalysisRepository::new();
        for name in ["Sugar", "Honey", "Oats"] {
            repo.create("user-1", analysis(&[name])).await.unwrap();
        }

        let latest = repo.latest("user-1").await.unwrap().unwrap();
        assert_eq!(latest.ingredients, vec!["Oats"]);

        let history = repo.history("user-1", 2).await.unwrap();
        let first: Vec<_> = history.iter().map(|r| r.ingredients[0].as_str()).collect();
        assert_eq!(first, vec!["Oats", "Honey"]);
        assert!(repo.history("user-2", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_ingredient_text() {
        let repo = InMemoryAnalysisRepository::new();
        repo.create("user-1", analysis(&["High Fructose Corn Syrup", "Water"]))
            .await
            .unwrap();
        repo.create("user-1", analysis(&["Rolled oats"])).await.unwrap();
        repo.create("user-1", analysis(&["Corn starch"])).await.unwrap();
        repo.create("user-2", analysis(&["Corn flakes"])).await.unwrap();

        let found = repo.search("user-1", "CORN", 10).await.unwrap();
        let first: Vec<_> = found.iter().map(|r| r.ingredients[0].as_str()).collect();
        assert_eq!(first, vec!["Corn starch", "High Fructose Corn Syrup"]);

        assert_eq!(repo.search("user-1", "corn", 1).await.unwrap().len(), 1);
        assert!(repo.search("user-1", "peanut", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_scoped_by_user() {
        let repo = InMemoryAnalysisRepository::new();
        let record = repo.create("user-1", analysis(&["Sugar"])).await.unwrap();

        assert!(!repo.delete("user-2", record.id).await.unwrap());
        assert!(repo.delete("user-1", record.id).await.unwrap());
        assert!(!repo.delete("user-1", record.id).await.unwrap());
        assert!(repo.is_empty());
        assert!(repo.latest("user-1").await.unwrap().is_none());
    }
}
