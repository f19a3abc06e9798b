//! 规则引擎领域模型

use crate::severity::{AllergySeverity, ConditionSeverity, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 健康状况规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRule {
    /// 规范名称（小写）
    pub condition: String,
    /// 有害成分标记，按子串匹配
    pub harmful_ingredients: Vec<String>,
    pub recommendations: Vec<String>,
    pub severity: ConditionSeverity,
}

impl HealthRule {
    pub fn new(
        condition: impl Into<String>,
        harmful_ingredients: &[&str],
        recommendations: &[&str],
        severity: ConditionSeverity,
    ) -> Self {
        Self {
            condition: condition.into(),
            harmful_ingredients: harmful_ingredients.iter().map(|s| s.to_string()).collect(),
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
            severity,
        }
    }
}

/// 过敏原规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyRule {
    pub allergen: String,
    /// 过敏原的常见别名，按子串匹配
    pub common_names: Vec<String>,
    pub symptoms: Vec<String>,
    pub severity: AllergySeverity,
}

impl AllergyRule {
    pub fn new(
        allergen: impl Into<String>,
        common_names: &[&str],
        symptoms: &[&str],
        severity: AllergySeverity,
    ) -> Self {
        Self {
            allergen: allergen.into(),
            common_names: common_names.iter().map(|s| s.to_string()).collect(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            severity,
        }
    }

    /// 命中该过敏原时生成的警告
    pub fn avoid_message(&self) -> String {
        format!(
            "AVOID: Contains {}. Symptoms may include: {}",
            self.allergen,
            self.symptoms.join(", ")
        )
    }
}

/// 用户健康档案
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "healthConditions")]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl UserProfile {
    pub fn new<C, A>(conditions: &[C], allergies: &[A]) -> Self
    where
        C: AsRef<str>,
        A: AsRef<str>,
    {
        Self {
            conditions: conditions.iter().map(|c| c.as_ref().to_string()).collect(),
            allergies: allergies.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }
}

/// 标签识别结果：成分列表和外部分类器给出的有害标记
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientObservation {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub harmful_flags: HashMap<String, bool>,
}

impl IngredientObservation {
    pub fn new<I: AsRef<str>>(ingredients: &[I]) -> Self {
        Self {
            ingredients: ingredients.iter().map(|i| i.as_ref().to_string()).collect(),
            harmful_flags: HashMap::new(),
        }
    }

    /// 标记某个成分为有害
    pub fn with_flag(mut self, ingredient: impl Into<String>, flagged: bool) -> Self {
        self.harmful_flags.insert(ingredient.into(), flagged);
        self
    }

    /// 某个成分是否被外部分类器标记
    pub fn is_flagged(&self, ingredient: &str) -> bool {
        self.harmful_flags.get(ingredient).copied().unwrap_or(false)
    }
}

/// 避免计划
///
/// JSON 形态与持久化的 plan_text 一致（camelCase 字段，小写风险等级）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvoidancePlan {
    pub summary: String,
    pub harmful_ingredients: Vec<String>,
    pub recommendations: Vec<String>,
    pub alternatives: Vec<String>,
    pub risk_level: RiskLevel,
}

impl AvoidancePlan {
    /// 是否检测到有害成分
    pub fn has_findings(&self) -> bool {
        !self.harmful_ingredients.is_empty()
    }
}

/// 健康档案校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ProfileValidation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
