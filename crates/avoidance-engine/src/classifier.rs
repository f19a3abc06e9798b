//! 成分分类接口
//!
//! 外部分类服务（模型或远程 API）通过该接口给出每个成分的有害标记，
//! 规则引擎只消费分类结果，不关心来源。

use async_trait::async_trait;
use nutrlens_shared::Result;

use crate::label::{IngredientClassification, KeywordClassifier};

/// 成分分类器
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientClassifier: Send + Sync {
    async fn classify(&self, ingredient: &str) -> Result<IngredientClassification>;
}

#[async_trait]
impl IngredientClassifier for KeywordClassifier {
    async fn classify(&self, ingredient: &str) -> Result<IngredientClassification> {
        Ok(self.classify_offline(ingredient))
    }
}
