//! 规则目录加载器
//!
//! 从 JSON 解析规则目录并校验结构，校验通过后才会建立索引。

use crate::catalogue::RuleCatalogue;
use crate::error::{Result, RuleError};
use crate::models::{AllergyRule, HealthRule};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument};

/// 规则目录的 JSON 文档形态
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogueDocument {
    #[serde(default)]
    health_rules: Vec<HealthRule>,
    #[serde(default)]
    allergy_rules: Vec<AllergyRule>,
}

/// 从 JSON 字符串加载
pub(crate) fn from_json(json: &str) -> Result<RuleCatalogue> {
    let document: CatalogueDocument = serde_json::from_str(json)?;
    compile(document.health_rules, document.allergy_rules)
}

/// 从文件加载
#[instrument]
pub(crate) fn from_file(path: &Path) -> Result<RuleCatalogue> {
    let json = std::fs::read_to_string(path)?;
    let catalogue = from_json(&json)?;

    info!(
        health_rules = catalogue.health_rules().len(),
        allergy_rules = catalogue.allergy_rules().len(),
        "规则目录已加载"
    );
    Ok(catalogue)
}

/// 校验并建立索引
pub(crate) fn compile(
    health_rules: Vec<HealthRule>,
    allergy_rules: Vec<AllergyRule>,
) -> Result<RuleCatalogue> {
    let mut seen = HashSet::new();
    for (i, rule) in health_rules.iter().enumerate() {
        let path = format!("healthRules[{}]", i);
        validate_name(&rule.condition, &path)?;
        validate_markers(&rule.harmful_ingredients, &path)?;

        if !seen.insert(rule.condition.to_lowercase()) {
            return Err(RuleError::DuplicateRule {
                kind: "health condition",
                name: rule.condition.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for (i, rule) in allergy_rules.iter().enumerate() {
        let path = format!("allergyRules[{}]", i);
        validate_name(&rule.allergen, &path)?;
        validate_markers(&rule.common_names, &path)?;

        if !seen.insert(rule.allergen.to_lowercase()) {
            return Err(RuleError::DuplicateRule {
                kind: "allergy",
                name: rule.allergen.clone(),
            });
        }
    }

    Ok(RuleCatalogue::build(health_rules, allergy_rules))
}

fn validate_name(name: &str, path: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RuleError::InvalidCatalogue(format!(
            "规则 '{}' 的名称不能为空",
            path
        )));
    }
    Ok(())
}

fn validate_markers(markers: &[String], path: &str) -> Result<()> {
    if markers.is_empty() {
        return Err(RuleError::InvalidCatalogue(format!(
            "规则 '{}' 至少需要一个成分标记",
            path
        )));
    }

    // 空标记会匹配所有成分
    if let Some(i) = markers.iter().position(|m| m.trim().is_empty()) {
        return Err(RuleError::InvalidCatalogue(format!(
            "规则 '{}' 的第 {} 个成分标记为空",
            path, i
        )));
    }
    Ok(())
}
