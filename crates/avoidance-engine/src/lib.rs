//! 成分避免计划引擎
//!
//! 根据用户的健康状况和过敏原评估食品标签中的成分，支持：
//! - 内置或 JSON 加载的规则目录
//! - 大小写不敏感的子串匹配和风险等级升级
//! - 避免计划生成与健康档案校验
//! - 标签文本启发式解析
//! - 成分分类、分析记录和计划存储接口

pub mod advice;
pub mod catalogue;
pub mod classifier;
pub mod cli;
pub mod engine;
pub mod error;
pub mod label;
pub mod matcher;
pub mod models;
pub mod service;
pub mod severity;
pub mod store;

pub use catalogue::{CatalogueStats, RuleCatalogue};
pub use classifier::IngredientClassifier;
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use label::{IngredientClassification, KeywordClassifier, NutritionFacts};
pub use matcher::IngredientMatcher;
pub use models::{
    AllergyRule, AvoidancePlan, HealthRule, IngredientObservation, ProfileValidation,
    UserProfile,
};
pub use service::{PlanService, PlanWithAnalysis, StoredPlan};
pub use severity::{AllergySeverity, ConditionSeverity, RiskLevel};
pub use store::{
    AnalysisRecord, AnalysisRepository, InMemoryAnalysisRepository, InMemoryPlanRepository,
    NewAnalysis, PlanRecord, PlanRepository,
};
