//! 规则引擎
//!
//! 根据用户的健康状况和过敏原评估成分列表，生成避免计划。
//! 评估是纯函数：不做 I/O，不修改规则目录，多个线程可以共享同一个引擎。

use crate::advice::{dedup_first_seen, generate_alternatives, generate_summary};
use crate::catalogue::RuleCatalogue;
use crate::matcher::LoweredIngredients;
use crate::models::{AvoidancePlan, IngredientObservation, ProfileValidation, UserProfile};
use crate::severity::RiskLevel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 规则引擎
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    catalogue: Arc<RuleCatalogue>,
}

impl RuleEngine {
    pub fn new(catalogue: RuleCatalogue) -> Self {
        Self {
            catalogue: Arc::new(catalogue),
        }
    }

    /// 与其他组件共享同一份规则目录
    pub fn with_shared_catalogue(catalogue: Arc<RuleCatalogue>) -> Self {
        Self { catalogue }
    }

    pub fn catalogue(&self) -> &RuleCatalogue {
        &self.catalogue
    }

    /// 生成避免计划
    ///
    /// 未知的健康状况或过敏原会被忽略；需要拒绝未知值时先调用 [`Self::validate_user_profile`]。
    /// 外部分类器的标记只会加入有害成分列表，不影响风险等级。
    #[instrument(
        skip_all,
        fields(
            conditions = conditions.len(),
            allergies = allergies.len(),
            ingredients = ingredients.len()
        )
    )]
    pub fn generate_avoidance_plan<C, A, I>(
        &self,
        conditions: &[C],
        allergies: &[A],
        ingredients: &[I],
        harmful_flags: &HashMap<String, bool>,
    ) -> AvoidancePlan
    where
        C: AsRef<str>,
        A: AsRef<str>,
        I: AsRef<str>,
    {
        let lowered = LoweredIngredients::new(ingredients);
        let mut harmful: Vec<String> = Vec::new();
        let mut recommendations: Vec<String> = Vec::new();
        let mut risk_level = RiskLevel::Low;

        for condition in conditions {
            let Some(rule) = self.catalogue.health_rule(condition.as_ref()) else {
                continue;
            };

            let matched = lowered.matching(&rule.harmful_ingredients);
            if matched.is_empty() {
                continue;
            }

            debug!(
                condition = %rule.condition,
                severity = %rule.severity,
                matched = ?matched,
                "健康状况规则命中"
            );

            harmful.extend(matched.into_iter().map(String::from));
            recommendations.extend(rule.recommendations.iter().cloned());
            risk_level = risk_level.escalate(rule.severity.risk());
        }

        for allergy in allergies {
            let Some(rule) = self.catalogue.allergy_rule(allergy.as_ref()) else {
                continue;
            };

            let matched = lowered.matching(&rule.common_names);
            if matched.is_empty() {
                continue;
            }

            debug!(
                allergen = %rule.allergen,
                severity = %rule.severity,
                matched = ?matched,
                "过敏原规则命中"
            );

            harmful.extend(matched.into_iter().map(String::from));
            recommendations.push(rule.avoid_message());
            risk_level = risk_level.escalate(rule.severity.risk());
        }

        // 外部分类器标记
        harmful.extend(
            ingredients
                .iter()
                .map(AsRef::as_ref)
                .filter(|i| harmful_flags.get(*i).copied().unwrap_or(false))
                .map(String::from),
        );

        let harmful_ingredients = dedup_first_seen(harmful);
        let recommendations = dedup_first_seen(recommendations);
        let alternatives = generate_alternatives(conditions, allergies);
        let summary = generate_summary(&harmful_ingredients, risk_level, conditions, allergies);

        debug!(
            harmful = harmful_ingredients.len(),
            risk_level = %risk_level,
            "避免计划已生成"
        );

        AvoidancePlan {
            summary,
            harmful_ingredients,
            recommendations,
            alternatives,
            risk_level,
        }
    }

    /// 以档案和识别结果为输入生成避免计划
    pub fn evaluate(
        &self,
        profile: &UserProfile,
        observation: &IngredientObservation,
    ) -> AvoidancePlan {
        self.generate_avoidance_plan(
            &profile.conditions,
            &profile.allergies,
            &observation.ingredients,
            &observation.harmful_flags,
        )
    }

    /// 校验用户声明的健康状况和过敏原是否都在规则目录中
    ///
    /// 一次性报告所有未知值，错误信息保留用户输入的原始大小写。
    pub fn validate_user_profile<C, A>(&self, conditions: &[C], allergies: &[A]) -> ProfileValidation
    where
        C: AsRef<str>,
        A: AsRef<str>,
    {
        let mut errors = Vec::new();

        for condition in conditions {
            let condition = condition.as_ref();
            if self.catalogue.health_rule(condition).is_none() {
                errors.push(format!("Unknown health condition: {}", condition));
            }
        }

        for allergy in allergies {
            let allergy = allergy.as_ref();
            if self.catalogue.allergy_rule(allergy).is_none() {
                errors.push(format!("Unknown allergy: {}", allergy));
            }
        }

        ProfileValidation::from_errors(errors)
    }

    /// 所有可选的健康状况
    pub fn available_health_conditions(&self) -> Vec<&str> {
        self.catalogue.available_health_conditions()
    }

    /// 所有可选的过敏原
    pub fn available_allergies(&self) -> Vec<&str> {
        self.catalogue.available_allergies()
    }
}
