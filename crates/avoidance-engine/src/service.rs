//! 避免计划服务
//!
//! 串联成分分类、规则引擎和两个仓储：
//! 分类结果转成有害标记，连同成分和营养数据保存为分析记录；
//! 引擎依据分析记录生成计划，再以 JSON 文本保存并关联该记录。

use nutrlens_shared::{NutrlensError, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::classifier::IngredientClassifier;
use crate::engine::RuleEngine;
use crate::label::{self, IngredientClassification, NutritionFacts, harmful_flags};
use crate::models::{AvoidancePlan, IngredientObservation, UserProfile};
use crate::store::{AnalysisRecord, AnalysisRepository, NewAnalysis, PlanRecord, PlanRepository};

/// 历史查询的默认条数
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

const PLAN_ENTITY: &str = "avoidance_plan";
const ANALYSIS_ENTITY: &str = "nutrition_analysis";

/// 已保存的计划：存储记录和解析后的计划
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPlan {
    pub record: PlanRecord,
    pub plan: AvoidancePlan,
}

impl StoredPlan {
    fn from_record(record: PlanRecord) -> Result<Self> {
        let plan = serde_json::from_str(&record.plan_text)?;
        Ok(Self { record, plan })
    }
}

/// 计划及其依据的分析记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanWithAnalysis {
    pub plan: StoredPlan,
    pub analysis: AnalysisRecord,
}

fn not_found(entity: &str, id: Uuid) -> NutrlensError {
    NutrlensError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

/// 避免计划服务
pub struct PlanService<C, R, A> {
    engine: RuleEngine,
    classifier: C,
    plans: R,
    analyses: A,
    history_limit: usize,
}

impl<C, R, A> PlanService<C, R, A>
where
    C: IngredientClassifier,
    R: PlanRepository,
    A: AnalysisRepository,
{
    pub fn new(engine: RuleEngine, classifier: C, plans: R, analyses: A) -> Self {
        Self {
            engine,
            classifier,
            plans,
            analyses,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// 未指定或为 0 时使用配置的默认条数
    fn resolve_limit(&self, limit: Option<usize>) -> usize {
        limit.filter(|&n| n > 0).unwrap_or(self.history_limit)
    }

    /// 逐个分类成分；任何一个失败都直接返回该错误，不重试
    #[instrument(skip_all, fields(ingredients = ingredients.len()))]
    pub async fn analyze<I: AsRef<str>>(
        &self,
        ingredients: &[I],
    ) -> Result<Vec<IngredientClassification>> {
        let mut classifications = Vec::with_capacity(ingredients.len());
        for ingredient in ingredients {
            let ingredient = ingredient.as_ref();
            let classification = self.classifier.classify(ingredient).await.map_err(|e| {
                warn!(ingredient, error = %e, "成分分类失败");
                e
            })?;
            classifications.push(classification);
        }
        Ok(classifications)
    }

    async fn observe<I: AsRef<str>>(&self, ingredients: &[I]) -> Result<IngredientObservation> {
        let classifications = self.analyze(ingredients).await?;
        Ok(IngredientObservation {
            ingredients: ingredients.iter().map(|i| i.as_ref().to_string()).collect(),
            harmful_flags: harmful_flags(&classifications),
        })
    }

    /// 分类后生成计划（不保存）
    pub async fn analyze_and_plan<I: AsRef<str>>(
        &self,
        profile: &UserProfile,
        ingredients: &[I],
    ) -> Result<AvoidancePlan> {
        let observation = self.observe(ingredients).await?;
        Ok(self.engine.evaluate(profile, &observation))
    }

    /// 档案中有未知的健康状况或过敏原时返回 Validation 错误
    pub fn ensure_valid_profile(&self, profile: &UserProfile) -> Result<()> {
        let validation = self
            .engine
            .validate_user_profile(&profile.conditions, &profile.allergies);
        if validation.valid {
            Ok(())
        } else {
            Err(NutrlensError::Validation(validation.errors.join("; ")))
        }
    }

    async fn store_analysis<I: AsRef<str>>(
        &self,
        user_id: &str,
        ingredients: &[I],
        nutrition: NutritionFacts,
    ) -> Result<AnalysisRecord> {
        if ingredients.is_empty() {
            return Err(NutrlensError::InvalidArgument {
                field: "ingredients".to_string(),
                message: "未识别到任何成分".to_string(),
            });
        }

        let observation = self.observe(ingredients).await?;
        self.analyses
            .create(
                user_id,
                NewAnalysis {
                    ingredients: observation.ingredients,
                    harmful_flags: observation.harmful_flags,
                    nutrition,
                },
            )
            .await
    }

    /// 分类成分列表并保存分析记录；营养数据从成分文本中提取
    #[instrument(skip_all, fields(user_id = %user_id, ingredients = ingredients.len()))]
    pub async fn record_analysis<I: AsRef<str>>(
        &self,
        user_id: &str,
        ingredients: &[I],
    ) -> Result<AnalysisRecord> {
        let joined = ingredients
            .iter()
            .map(|i| i.as_ref())
            .collect::<Vec<_>>()
            .join(", ");
        let nutrition = label::extract_nutrition(&joined);
        self.store_analysis(user_id, ingredients, nutrition).await
    }

    /// 解析完整的标签文本并保存分析记录
    #[instrument(skip(self, text))]
    pub async fn record_label(&self, user_id: &str, text: &str) -> Result<AnalysisRecord> {
        let ingredients = label::parse_ingredients(text);
        self.store_analysis(user_id, &ingredients, label::extract_nutrition(text))
            .await
    }

    /// 按 ID 读取分析记录（只能读取自己的记录）
    pub async fn analysis(&self, user_id: &str, analysis_id: Uuid) -> Result<AnalysisRecord> {
        self.analyses
            .get(user_id, analysis_id)
            .await?
            .ok_or_else(|| not_found(ANALYSIS_ENTITY, analysis_id))
    }

    /// 分析历史，最新的在前
    pub async fn analysis_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AnalysisRecord>> {
        self.analyses
            .history(user_id, self.resolve_limit(limit))
            .await
    }

    /// 按成分文本搜索分析记录
    pub async fn search_analyses(
        &self,
        user_id: &str,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AnalysisRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NutrlensError::InvalidArgument {
                field: "query".to_string(),
                message: "搜索词不能为空".to_string(),
            });
        }
        self.analyses
            .search(user_id, query, self.resolve_limit(limit))
            .await
    }

    /// 删除分析记录；已生成的计划保留
    pub async fn delete_analysis(&self, user_id: &str, analysis_id: Uuid) -> Result<()> {
        if self.analyses.delete(user_id, analysis_id).await? {
            Ok(())
        } else {
            Err(not_found(ANALYSIS_ENTITY, analysis_id))
        }
    }

    /// 生成计划并保存
    #[instrument(skip(self, profile, observation))]
    pub async fn generate_and_store(
        &self,
        user_id: &str,
        analysis_id: Uuid,
        profile: &UserProfile,
        observation: &IngredientObservation,
    ) -> Result<StoredPlan> {
        let plan = self.engine.evaluate(profile, observation);
        let plan_text = serde_json::to_string(&plan)?;
        let record = self.plans.create(user_id, analysis_id, &plan_text).await?;

        info!(plan_id = %record.id, risk_level = %plan.risk_level, "避免计划已生成");
        Ok(StoredPlan { record, plan })
    }

    /// 依据指定的分析记录生成计划
    pub async fn generate_for_analysis(
        &self,
        user_id: &str,
        analysis_id: Uuid,
        profile: &UserProfile,
    ) -> Result<StoredPlan> {
        let analysis = self.analysis(user_id, analysis_id).await?;
        self.generate_and_store(user_id, analysis.id, profile, &analysis.observation())
            .await
    }

    /// 依据用户最新的分析记录生成计划；没有分析记录时返回 Validation 错误
    pub async fn generate_from_latest_analysis(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<StoredPlan> {
        let analysis = self.analyses.latest(user_id).await?.ok_or_else(|| {
            NutrlensError::Validation("尚无标签分析记录，请先分析成分列表".to_string())
        })?;
        self.generate_and_store(user_id, analysis.id, profile, &analysis.observation())
            .await
    }

    /// 分类、保存分析记录、生成并保存计划；分类失败时不写入任何记录
    pub async fn analyze_and_store<I: AsRef<str>>(
        &self,
        user_id: &str,
        profile: &UserProfile,
        ingredients: &[I],
    ) -> Result<StoredPlan> {
        let analysis = self.record_analysis(user_id, ingredients).await?;
        self.generate_and_store(user_id, analysis.id, profile, &analysis.observation())
            .await
    }

    /// 用户最新的计划
    pub async fn latest_plan(&self, user_id: &str) -> Result<Option<StoredPlan>> {
        self.plans
            .latest(user_id)
            .await?
            .map(StoredPlan::from_record)
            .transpose()
    }

    /// 按 ID 读取计划（只能读取自己的计划）
    pub async fn plan(&self, user_id: &str, plan_id: Uuid) -> Result<StoredPlan> {
        let record = self
            .plans
            .get(user_id, plan_id)
            .await?
            .ok_or_else(|| not_found(PLAN_ENTITY, plan_id))?;
        StoredPlan::from_record(record)
    }

    async fn attach_analysis(&self, user_id: &str, plan: StoredPlan) -> Result<PlanWithAnalysis> {
        let analysis = self.analysis(user_id, plan.record.analysis_id).await?;
        Ok(PlanWithAnalysis { plan, analysis })
    }

    /// 读取计划及其分析记录；分析记录已删除时返回 NotFound
    pub async fn plan_with_analysis(
        &self,
        user_id: &str,
        plan_id: Uuid,
    ) -> Result<PlanWithAnalysis> {
        let plan = self.plan(user_id, plan_id).await?;
        self.attach_analysis(user_id, plan).await
    }

    /// 用户最新的计划及其分析记录
    pub async fn latest_plan_with_analysis(
        &self,
        user_id: &str,
    ) -> Result<Option<PlanWithAnalysis>> {
        match self.latest_plan(user_id).await? {
            Some(plan) => self.attach_analysis(user_id, plan).await.map(Some),
            None => Ok(None),
        }
    }

    /// 计划历史，最新的在前
    pub async fn plan_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredPlan>> {
        self.plans
            .history(user_id, self.resolve_limit(limit))
            .await?
            .into_iter()
            .map(StoredPlan::from_record)
            .collect()
    }

    /// 删除计划
    pub async fn delete_plan(&self, user_id: &str, plan_id: Uuid) -> Result<()> {
        if self.plans.delete(user_id, plan_id).await? {
            Ok(())
        } else {
            Err(not_found(PLAN_ENTITY, plan_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MockIngredientClassifier;
    use crate::label::UNKNOWN_CATEGORY;
    use crate::severity::RiskLevel;
    use crate::store::{MockAnalysisRepository, MockPlanRepository};
    use chrono::Utc;
    use std::collections::HashMap;

    type TestService = PlanService<MockIngredientClassifier, MockPlanRepository, MockAnalysisRepository>;

    fn service(
        classifier: MockIngredientClassifier,
        plans: MockPlanRepository,
        analyses: MockAnalysisRepository,
    ) -> TestService {
        PlanService::new(RuleEngine::default(), classifier, plans, analyses)
    }

    fn plans_only(plans: MockPlanRepository) -> TestService {
        service(MockIngredientClassifier::new(), plans, MockAnalysisRepository::new())
    }

    fn analyses_only(analyses: MockAnalysisRepository) -> TestService {
        service(MockIngredientClassifier::new(), MockPlanRepository::new(), analyses)
    }

    fn classification(ingredient: &str, flagged: bool) -> IngredientClassification {
        IngredientClassification {
            ingredient: ingredient.to_string(),
            category: UNKNOWN_CATEGORY.to_string(),
            flagged,
            confidence: 0.9,
        }
    }

    fn plan_record(user_id: &str, analysis_id: Uuid, plan_text: &str) -> PlanRecord {
        PlanRecord {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            analysis_id,
            plan_text: plan_text.to_string(),
            created_at: Utc::now(),
        }
    }

    fn analysis_record(user_id: &str, ingredients: &[&str], flagged: &[&str]) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
            harmful_flags: flagged.iter().map(|i| (i.to_string(), true)).collect(),
            nutrition: NutritionFacts::default(),
            created_at: Utc::now(),
        }
    }

    fn stored_analysis(user_id: &str, analysis: NewAnalysis) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            ingredients: analysis.ingredients,
            harmful_flags: analysis.harmful_flags,
            nutrition: analysis.nutrition,
            created_at: Utc::now(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile::new(&["diabetes"], &["dairy"])
    }

    fn plan_text(ingredients: &[&str]) -> String {
        let plan = RuleEngine::default().evaluate(&profile(), &IngredientObservation::new(ingredients));
        serde_json::to_string(&plan).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_and_plan_uses_classifier_flags() {
        let mut classifier = MockIngredientClassifier::new();
        classifier
            .expect_classify()
            .times(3)
            .returning(|ingredient| Ok(classification(ingredient, ingredient == "Salt")));

        let service = service(classifier, MockPlanRepository::new(), MockAnalysisRepository::new());
        let plan = service
            .analyze_and_plan(&profile(), &["Milk", "Sugar", "Salt"])
            .await
            .unwrap();

        assert_eq!(plan.harmful_ingredients, vec!["Sugar", "Milk", "Salt"]);
        assert_eq!(plan.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_classifier_failure_is_not_retried_or_stored() {
        let mut classifier = MockIngredientClassifier::new();
        classifier.expect_classify().times(1).returning(|_| {
            Err(NutrlensError::ExternalServiceTimeout {
                service: "classifier".to_string(),
            })
        });
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_create().never();
        let mut plans = MockPlanRepository::new();
        plans.expect_create().never();

        let service = service(classifier, plans, analyses);
        let err = service
            .analyze_and_store("user-1", &profile(), &["Milk", "Sugar"])
            .await
            .unwrap_err();

        assert_eq!(err.code(), "EXTERNAL_SERVICE_TIMEOUT");
    }

    #[tokio::test]
    async fn test_analyze_and_store_links_plan_to_analysis() {
        let mut classifier = MockIngredientClassifier::new();
        classifier
            .expect_classify()
            .times(2)
            .returning(|ingredient| Ok(classification(ingredient, false)));

        let analysis = analysis_record("user-1", &["Milk", "Sugar"], &[]);
        let analysis_id = analysis.id;
        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_create()
            .times(1)
            .returning(move |_, _| Ok(analysis.clone()));

        let mut plans = MockPlanRepository::new();
        plans
            .expect_create()
            .withf(move |_, id, _| *id == analysis_id)
            .times(1)
            .returning(|user_id, analysis_id, plan_text| {
                Ok(plan_record(user_id, analysis_id, plan_text))
            });

        let stored = service(classifier, plans, analyses)
            .analyze_and_store("user-1", &profile(), &["Milk", "Sugar"])
            .await
            .unwrap();

        assert_eq!(stored.record.analysis_id, analysis_id);
        assert_eq!(stored.plan.harmful_ingredients, vec!["Sugar", "Milk"]);
    }

    #[tokio::test]
    async fn test_generate_and_store_persists_plan_json() {
        let analysis_id = Uuid::now_v7();
        let mut plans = MockPlanRepository::new();
        plans
            .expect_create()
            .withf(move |user_id, id, plan_text| {
                user_id == "user-1"
                    && *id == analysis_id
                    && plan_text.contains("\"riskLevel\":\"high\"")
            })
            .times(1)
            .returning(|user_id, analysis_id, plan_text| {
                Ok(plan_record(user_id, analysis_id, plan_text))
            });

        let observation = IngredientObservation::new(&["Milk", "Sugar"]);
        let stored = plans_only(plans)
            .generate_and_store("user-1", analysis_id, &profile(), &observation)
            .await
            .unwrap();

        assert_eq!(stored.record.user_id, "user-1");
        assert_eq!(stored.plan.harmful_ingredients, vec!["Sugar", "Milk"]);
    }

    #[tokio::test]
    async fn test_record_analysis_stores_classifier_flags() {
        let mut classifier = MockIngredientClassifier::new();
        classifier
            .expect_classify()
            .times(2)
            .returning(|ingredient| Ok(classification(ingredient, ingredient == "Salt")));

        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_create()
            .withf(|user_id, analysis: &NewAnalysis| {
                user_id == "user-1"
                    && analysis.ingredients == vec!["Salt", "Water"]
                    && analysis.harmful_flags
                        == HashMap::from([("Salt".to_string(), true), ("Water".to_string(), false)])
            })
            .times(1)
            .returning(|user_id, analysis| Ok(stored_analysis(user_id, analysis)));

        let record = service(classifier, MockPlanRepository::new(), analyses)
            .record_analysis("user-1", &["Salt", "Water"])
            .await
            .unwrap();

        assert!(record.observation().is_flagged("Salt"));
        assert!(record.nutrition.is_empty());
    }

    #[tokio::test]
    async fn test_record_label_extracts_nutrition() {
        let mut classifier = MockIngredientClassifier::new();
        classifier
            .expect_classify()
            .times(3)
            .returning(|ingredient| Ok(classification(ingredient, false)));

        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_create()
            .times(1)
            .returning(|user_id, analysis| Ok(stored_analysis(user_id, analysis)));

        let record = service(classifier, MockPlanRepository::new(), analyses)
            .record_label("user-1", "Ingredients: Oats, Sucralose, Salt\n150 kcal")
            .await
            .unwrap();

        assert_eq!(record.ingredients, vec!["Oats", "Sucralose", "Salt"]);
        assert_eq!(record.nutrition.calories, Some(150));
    }

    #[tokio::test]
    async fn test_record_analysis_rejects_empty_ingredients() {
        let mut classifier = MockIngredientClassifier::new();
        classifier.expect_classify().never();
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_create().never();

        let err = service(classifier, MockPlanRepository::new(), analyses)
            .record_analysis("user-1", &[] as &[&str])
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_generate_from_latest_analysis_uses_stored_flags() {
        let analysis = analysis_record("user-1", &["Milk", "Sugar", "Salt"], &["Salt"]);
        let analysis_id = analysis.id;
        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_latest()
            .withf(|user_id| user_id == "user-1")
            .returning(move |_| Ok(Some(analysis.clone())));

        let mut plans = MockPlanRepository::new();
        plans
            .expect_create()
            .withf(move |_, id, _| *id == analysis_id)
            .times(1)
            .returning(|user_id, analysis_id, plan_text| {
                Ok(plan_record(user_id, analysis_id, plan_text))
            });

        // 分类结果已在分析记录中，不再调用分类器
        let stored = service(MockIngredientClassifier::new(), plans, analyses)
            .generate_from_latest_analysis("user-1", &profile())
            .await
            .unwrap();

        assert_eq!(stored.plan.harmful_ingredients, vec!["Sugar", "Milk", "Salt"]);
        assert_eq!(stored.record.analysis_id, analysis_id);
    }

    #[tokio::test]
    async fn test_generate_from_latest_analysis_requires_analysis() {
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_latest().returning(|_| Ok(None));
        let mut plans = MockPlanRepository::new();
        plans.expect_create().never();

        let err = service(MockIngredientClassifier::new(), plans, analyses)
            .generate_from_latest_analysis("user-1", &profile())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_for_analysis() {
        let analysis = analysis_record("user-1", &["Whey", "Oats"], &[]);
        let analysis_id = analysis.id;
        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_get()
            .withf(move |user_id, id| user_id == "user-1" && *id == analysis_id)
            .returning(move |_, _| Ok(Some(analysis.clone())));

        let mut plans = MockPlanRepository::new();
        plans
            .expect_create()
            .times(1)
            .returning(|user_id, analysis_id, plan_text| {
                Ok(plan_record(user_id, analysis_id, plan_text))
            });

        let stored = service(MockIngredientClassifier::new(), plans, analyses)
            .generate_for_analysis("user-1", analysis_id, &profile())
            .await
            .unwrap();

        assert_eq!(stored.plan.harmful_ingredients, vec!["Whey"]);
        assert_eq!(stored.plan.risk_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_generate_for_foreign_analysis_is_not_found() {
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_get().returning(|_, _| Ok(None));
        let mut plans = MockPlanRepository::new();
        plans.expect_create().never();

        let err = service(MockIngredientClassifier::new(), plans, analyses)
            .generate_for_analysis("user-2", Uuid::now_v7(), &profile())
            .await
            .unwrap_err();

        assert!(matches!(err, NutrlensError::NotFound { ref entity, .. } if entity == "nutrition_analysis"));
    }

    #[tokio::test]
    async fn test_plan_with_analysis() {
        let analysis = analysis_record("user-1", &["Milk"], &[]);
        let analysis_id = analysis.id;
        let record = plan_record("user-1", analysis_id, &plan_text(&["Milk"]));
        let plan_id = record.id;

        let mut plans = MockPlanRepository::new();
        plans
            .expect_get()
            .withf(move |_, id| *id == plan_id)
            .returning(move |_, _| Ok(Some(record.clone())));
        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_get()
            .withf(move |_, id| *id == analysis_id)
            .returning(move |_, _| Ok(Some(analysis.clone())));

        let joined = service(MockIngredientClassifier::new(), plans, analyses)
            .plan_with_analysis("user-1", plan_id)
            .await
            .unwrap();

        assert_eq!(joined.plan.record.id, plan_id);
        assert_eq!(joined.analysis.id, analysis_id);
        assert_eq!(joined.plan.plan.harmful_ingredients, vec!["Milk"]);
    }

    #[tokio::test]
    async fn test_plan_with_deleted_analysis_is_not_found() {
        let mut plans = MockPlanRepository::new();
        plans
            .expect_latest()
            .returning(|user_id| Ok(Some(plan_record(user_id, Uuid::now_v7(), &plan_text(&["Milk"])))));
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_get().returning(|_, _| Ok(None));

        let err = service(MockIngredientClassifier::new(), plans, analyses)
            .latest_plan_with_analysis("user-1")
            .await
            .unwrap_err();

        assert!(matches!(err, NutrlensError::NotFound { ref entity, .. } if entity == "nutrition_analysis"));
    }

    #[tokio::test]
    async fn test_latest_plan_with_analysis_empty() {
        let mut plans = MockPlanRepository::new();
        plans.expect_latest().returning(|_| Ok(None));
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_get().never();

        let latest = service(MockIngredientClassifier::new(), plans, analyses)
            .latest_plan_with_analysis("user-1")
            .await
            .unwrap();

        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn test_latest_plan_round_trips_stored_text() {
        let text = plan_text(&["Milk"]);
        let expected: AvoidancePlan = serde_json::from_str(&text).unwrap();

        let mut plans = MockPlanRepository::new();
        plans
            .expect_latest()
            .returning(move |user_id| Ok(Some(plan_record(user_id, Uuid::now_v7(), &text))));

        let stored = plans_only(plans).latest_plan("user-1").await.unwrap().unwrap();

        assert_eq!(stored.plan, expected);
    }

    #[tokio::test]
    async fn test_corrupt_plan_text_is_serialization_error() {
        let mut plans = MockPlanRepository::new();
        plans
            .expect_latest()
            .returning(|user_id| Ok(Some(plan_record(user_id, Uuid::now_v7(), "not json"))));

        let err = plans_only(plans).latest_plan("user-1").await.unwrap_err();

        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }

    #[tokio::test]
    async fn test_plan_not_found() {
        let mut plans = MockPlanRepository::new();
        plans.expect_get().returning(|_, _| Ok(None));

        let err = plans_only(plans).plan("user-1", Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, NutrlensError::NotFound { ref entity, .. } if entity == "avoidance_plan"));
    }

    #[tokio::test]
    async fn test_history_uses_default_limit() {
        let mut plans = MockPlanRepository::new();
        plans
            .expect_history()
            .withf(|_, limit| *limit == 4)
            .times(2)
            .returning(|_, _| Ok(vec![]));

        let service = plans_only(plans).with_history_limit(4);

        assert!(service.plan_history("user-1", None).await.unwrap().is_empty());
        // 0 和未指定一样使用默认条数
        assert!(service.plan_history("user-1", Some(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_explicit_limit() {
        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_history()
            .withf(|user_id, limit| user_id == "user-1" && *limit == 3)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        analyses
            .expect_history()
            .withf(|_, limit| *limit == DEFAULT_HISTORY_LIMIT)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let service = analyses_only(analyses);

        assert!(service.analysis_history("user-1", Some(3)).await.unwrap().is_empty());
        assert!(service.analysis_history("user-1", Some(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_analyses() {
        let mut analyses = MockAnalysisRepository::new();
        analyses
            .expect_search()
            .withf(|_, query, limit| query == "corn syrup" && *limit == DEFAULT_HISTORY_LIMIT)
            .times(1)
            .returning(|user_id, _, _| {
                Ok(vec![analysis_record(user_id, &["Corn syrup"], &[])])
            });

        let service = analyses_only(analyses);

        let found = service
            .search_analyses("user-1", "  corn syrup ", None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let err = service.search_analyses("user-1", "   ", None).await.unwrap_err();
        assert!(matches!(err, NutrlensError::InvalidArgument { ref field, .. } if field == "query"));
    }

    #[tokio::test]
    async fn test_delete_plan() {
        let plan_id = Uuid::now_v7();
        let mut plans = MockPlanRepository::new();
        plans
            .expect_delete()
            .withf(move |user_id, id| user_id == "user-1" && *id == plan_id)
            .returning(|_, _| Ok(true));
        plans
            .expect_delete()
            .withf(|user_id, _| user_id == "user-2")
            .returning(|_, _| Ok(false));

        let service = plans_only(plans);

        assert!(service.delete_plan("user-1", plan_id).await.is_ok());
        let err = service.delete_plan("user-2", plan_id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_analysis() {
        let mut analyses = MockAnalysisRepository::new();
        analyses.expect_delete().times(1).returning(|_, _| Ok(false));

        let err = analyses_only(analyses)
            .delete_analysis("user-1", Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, NutrlensError::NotFound { ref entity, .. } if entity == "nutrition_analysis"));
    }

    #[test]
    fn test_ensure_valid_profile() {
        let service = plans_only(MockPlanRepository::new());

        assert!(service.ensure_valid_profile(&profile()).is_ok());

        let err = service
            .ensure_valid_profile(&UserProfile::new(&["madeupdisease"], &["Pollen"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "参数验证失败: Unknown health condition: madeupdisease; Unknown allergy: Pollen"
        );
    }
}
