//! 规则目录
//!
//! 健康状况规则和过敏原规则的只读索引表，启动时构建一次，之后不再修改。
//! 引擎通过构造参数注入目录，测试可以替换为自定义规则集。

mod builtin;
mod loader;

use crate::error::Result;
use crate::models::{AllergyRule, HealthRule};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// 规则目录
#[derive(Debug, Clone)]
pub struct RuleCatalogue {
    health_rules: Vec<HealthRule>,
    allergy_rules: Vec<AllergyRule>,
    /// 小写规范名 -> health_rules 下标
    condition_index: HashMap<String, usize>,
    /// 小写规范名 -> allergy_rules 下标
    allergy_index: HashMap<String, usize>,
}

impl RuleCatalogue {
    /// 内置规则目录：5 种健康状况，6 类过敏原
    pub fn builtin() -> Self {
        Self::build(builtin::health_rules(), builtin::allergy_rules())
    }

    /// 从规则列表创建目录（会做结构校验）
    pub fn new(health_rules: Vec<HealthRule>, allergy_rules: Vec<AllergyRule>) -> Result<Self> {
        loader::compile(health_rules, allergy_rules)
    }

    /// 从 JSON 字符串加载目录
    pub fn from_json(json: &str) -> Result<Self> {
        loader::from_json(json)
    }

    /// 从 JSON 文件加载目录
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        loader::from_file(path.as_ref())
    }

    /// 建立索引；重名时保留先出现的规则
    pub(crate) fn build(health_rules: Vec<HealthRule>, allergy_rules: Vec<AllergyRule>) -> Self {
        let mut condition_index = HashMap::with_capacity(health_rules.len());
        for (i, rule) in health_rules.iter().enumerate() {
            condition_index.entry(rule.condition.to_lowercase()).or_insert(i);
        }

        let mut allergy_index = HashMap::with_capacity(allergy_rules.len());
        for (i, rule) in allergy_rules.iter().enumerate() {
            allergy_index.entry(rule.allergen.to_lowercase()).or_insert(i);
        }

        Self {
            health_rules,
            allergy_rules,
            condition_index,
            allergy_index,
        }
    }

    /// 按名称查找健康状况规则（大小写不敏感，精确匹配）
    pub fn health_rule(&self, condition: &str) -> Option<&HealthRule> {
        self.condition_index
            .get(&condition.to_lowercase())
            .map(|&i| &self.health_rules[i])
    }

    /// 按名称查找过敏原规则（大小写不敏感，精确匹配）
    pub fn allergy_rule(&self, allergen: &str) -> Option<&AllergyRule> {
        self.allergy_index
            .get(&allergen.to_lowercase())
            .map(|&i| &self.allergy_rules[i])
    }

    pub fn health_rules(&self) -> &[HealthRule] {
        &self.health_rules
    }

    pub fn allergy_rules(&self) -> &[AllergyRule] {
        &self.allergy_rules
    }

    /// 所有可选的健康状况（声明顺序）
    pub fn available_health_conditions(&self) -> Vec<&str> {
        self.health_rules.iter().map(|r| r.condition.as_str()).collect()
    }

    /// 所有可选的过敏原（声明顺序）
    pub fn available_allergies(&self) -> Vec<&str> {
        self.allergy_rules.iter().map(|r| r.allergen.as_str()).collect()
    }

    /// 获取目录统计信息
    pub fn stats(&self) -> CatalogueStats {
        CatalogueStats {
            health_rules: self.health_rules.len(),
            allergy_rules: self.allergy_rules.len(),
            total_markers: self
                .health_rules
                .iter()
                .map(|r| r.harmful_ingredients.len())
                .chain(self.allergy_rules.iter().map(|r| r.common_names.len()))
                .sum(),
        }
    }
}

impl Default for RuleCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 规则目录统计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueStats {
    pub health_rules: usize,
    pub allergy_rules: usize,
    /// 所有规则的成分标记总数
    pub total_markers: usize,
}
