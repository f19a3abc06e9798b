//! 替代品建议和摘要生成

use crate::severity::RiskLevel;
use std::collections::HashSet;

const DIABETES_ALTERNATIVES: &[&str] = &["Stevia", "Erythritol", "Monk fruit sweetener", "Xylitol"];

const HYPERTENSION_ALTERNATIVES: &[&str] = &[
    "Herbs and spices",
    "Lemon juice",
    "Vinegar",
    "Low-sodium soy sauce",
];

const GLUTEN_FREE_ALTERNATIVES: &[&str] = &[
    "Rice",
    "Quinoa",
    "Buckwheat",
    "Amaranth",
    "Certified gluten-free oats",
];

const DAIRY_FREE_ALTERNATIVES: &[&str] = &[
    "Almond milk",
    "Soy milk",
    "Oat milk",
    "Coconut milk",
    "Cashew milk",
];

const GENERAL_ALTERNATIVES: &[&str] = &[
    "Fresh fruits and vegetables",
    "Lean proteins",
    "Whole grains",
    "Nuts and seeds (if not allergic)",
    "Herbs and spices instead of artificial flavors",
];

pub const NO_FINDINGS_SUMMARY: &str =
    "Great news! No harmful ingredients detected for your health conditions and allergies.";

/// 字面匹配（区分大小写），替代品按用户填写的原始名称触发，而不是按规则命中
fn declares<S: AsRef<str>>(declared: &[S], name: &str) -> bool {
    declared.iter().any(|d| d.as_ref() == name)
}

/// 按首次出现顺序去重
pub fn dedup_first_seen(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// 生成替代品建议
pub fn generate_alternatives<C, A>(conditions: &[C], allergies: &[A]) -> Vec<String>
where
    C: AsRef<str>,
    A: AsRef<str>,
{
    let mut alternatives: Vec<&str> = Vec::new();

    if declares(conditions, "diabetes") {
        alternatives.extend(DIABETES_ALTERNATIVES);
    }
    if declares(conditions, "hypertension") {
        alternatives.extend(HYPERTENSION_ALTERNATIVES);
    }
    if declares(conditions, "celiac disease") {
        alternatives.extend(GLUTEN_FREE_ALTERNATIVES);
    }
    if declares(allergies, "dairy") || declares(conditions, "lactose intolerance") {
        alternatives.extend(DAIRY_FREE_ALTERNATIVES);
    }
    alternatives.extend(GENERAL_ALTERNATIVES);

    dedup_first_seen(alternatives.into_iter().map(String::from).collect())
}

/// 生成计划摘要
///
/// `harmful_ingredients` 需要是已去重的列表，摘要中的数量就是它的长度。
pub fn generate_summary<C, A>(
    harmful_ingredients: &[String],
    risk_level: RiskLevel,
    conditions: &[C],
    allergies: &[A],
) -> String
where
    C: AsRef<str>,
    A: AsRef<str>,
{
    if harmful_ingredients.is_empty() {
        return NO_FINDINGS_SUMMARY.to_string();
    }

    let mut concerns = Vec::with_capacity(2);
    if !conditions.is_empty() {
        concerns.push(format!("health conditions ({})", join(conditions)));
    }
    if !allergies.is_empty() {
        concerns.push(format!("allergies ({})", join(allergies)));
    }

    format!(
        "This product contains {} ingredients that may be harmful for your {}. {}. Please review the detailed recommendations below.",
        harmful_ingredients.len(),
        concerns.join(" and "),
        risk_level.advice_text()
    )
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
