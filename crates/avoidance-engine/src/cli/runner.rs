//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑，返回可序列化的结果，由 main 负责输出。

use std::collections::HashMap;
use std::fs;
use std::io::Read as _;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalogue::CatalogueStats;
use crate::engine::RuleEngine;
use crate::label::{self, KeywordClassifier, NutritionFacts};
use crate::models::{AvoidancePlan, IngredientObservation, ProfileValidation, UserProfile};
use crate::service::{DEFAULT_HISTORY_LIMIT, PlanService, PlanWithAnalysis, StoredPlan};
use crate::store::{AnalysisRecord, InMemoryAnalysisRepository, InMemoryPlanRepository};

/// plan 命令的输入
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default, alias = "healthConditions")]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub harmful_flags: HashMap<String, bool>,
}

fn default_user_id() -> String {
    "cli".to_string()
}

/// session 命令的输入
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default, alias = "healthConditions")]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    /// 按分析顺序排列的标签文本
    pub labels: Vec<String>,
}

/// session 命令的输出
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub latest: Option<PlanWithAnalysis>,
    pub plans: Vec<StoredPlan>,
    pub analyses: Vec<AnalysisRecord>,
}

/// catalogue 命令的输出
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueOverview {
    pub health_conditions: Vec<String>,
    pub allergies: Vec<String>,
    pub stats: CatalogueStats,
}

/// label 命令的输出
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelReport {
    pub ingredients: Vec<String>,
    pub harmful_flags: HashMap<String, bool>,
    pub nutrition: NutritionFacts,
}

/// 读取输入，"-" 表示 stdin
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("读取 stdin 失败")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("读取输入文件失败: {}", input))
    }
}

/// 命令执行器
pub struct CommandRunner {
    engine: RuleEngine,
    history_limit: usize,
}

impl CommandRunner {
    pub fn new(engine: RuleEngine) -> Self {
        Self {
            engine,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// 执行 plan 命令
    pub fn run_plan(
        &self,
        request: PlanRequest,
        classify: bool,
        strict: bool,
    ) -> Result<AvoidancePlan> {
        if strict {
            let validation = self
                .engine
                .validate_user_profile(&request.conditions, &request.allergies);
            if !validation.valid {
                bail!("健康档案校验未通过: {}", validation.errors.join("; "));
            }
        }

        let mut harmful_flags = if classify {
            let classifier = KeywordClassifier::new();
            let classifications: Vec<_> = request
                .ingredients
                .iter()
                .map(|i| classifier.classify_offline(i))
                .collect();
            label::harmful_flags(&classifications)
        } else {
            HashMap::new()
        };
        harmful_flags.extend(request.harmful_flags);

        let profile = UserProfile {
            conditions: request.conditions,
            allergies: request.allergies,
        };
        let observation = IngredientObservation {
            ingredients: request.ingredients,
            harmful_flags,
        };
        let plan = self.engine.evaluate(&profile, &observation);

        info!(
            harmful = plan.harmful_ingredients.len(),
            risk_level = %plan.risk_level,
            "plan 命令完成"
        );
        Ok(plan)
    }

    /// 执行 plan 命令（从 JSON 文本）
    pub fn run_plan_json(&self, json: &str, classify: bool, strict: bool) -> Result<AvoidancePlan> {
        let request: PlanRequest = serde_json::from_str(json).context("解析计划请求失败")?;
        self.run_plan(request, classify, strict)
    }

    /// 执行 session 命令
    ///
    /// 每个标签先保存为分析记录，再依据最新的分析记录生成计划。
    pub async fn run_session(
        &self,
        request: SessionRequest,
        limit: Option<usize>,
    ) -> Result<SessionReport> {
        if request.labels.is_empty() {
            bail!("标签列表为空");
        }

        let service = PlanService::new(
            self.engine.clone(),
            KeywordClassifier::new(),
            InMemoryPlanRepository::new(),
            InMemoryAnalysisRepository::new(),
        )
        .with_history_limit(self.history_limit);
        let profile = UserProfile {
            conditions: request.conditions,
            allergies: request.allergies,
        };
        let user_id = request.user_id.as_str();

        for (index, text) in request.labels.iter().enumerate() {
            service
                .record_label(user_id, text)
                .await
                .with_context(|| format!("第 {} 个标签分析失败", index + 1))?;
            service
                .generate_from_latest_analysis(user_id, &profile)
                .await?;
        }

        let report = SessionReport {
            latest: service.latest_plan_with_analysis(user_id).await?,
            plans: service.plan_history(user_id, limit).await?,
            analyses: service.analysis_history(user_id, limit).await?,
        };
        info!(
            labels = request.labels.len(),
            plans = report.plans.len(),
            "session 命令完成"
        );
        Ok(report)
    }

    /// 执行 session 命令（从 JSON 文本）
    pub async fn run_session_json(&self, json: &str, limit: Option<usize>) -> Result<SessionReport> {
        let request: SessionRequest = serde_json::from_str(json).context("解析会话请求失败")?;
        self.run_session(request, limit).await
    }

    /// 执行 validate 命令
    pub fn run_validate(&self, conditions: &[String], allergies: &[String]) -> ProfileValidation {
        self.engine.validate_user_profile(conditions, allergies)
    }

    /// 执行 catalogue 命令
    pub fn run_catalogue(&self) -> CatalogueOverview {
        CatalogueOverview {
            health_conditions: to_owned(self.engine.available_health_conditions()),
            allergies: to_owned(self.engine.available_allergies()),
            stats: self.engine.catalogue().stats(),
        }
    }

    /// 执行 label 命令
    pub fn run_label(&self, text: &str) -> Result<LabelReport> {
        if text.trim().is_empty() {
            bail!("标签文本为空");
        }

        let ingredients = label::parse_ingredients(text);
        let classifier = KeywordClassifier::new();
        let classifications: Vec<_> = ingredients
            .iter()
            .map(|i| classifier.classify_offline(i))
            .collect();

        Ok(LabelReport {
            harmful_flags: label::harmful_flags(&classifications),
            nutrition: label::extract_nutrition(text),
            ingredients,
        })
    }
}

fn to_owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(String::from).collect()
}
