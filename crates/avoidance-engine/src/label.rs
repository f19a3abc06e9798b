//! 标签文本启发式
//!
//! 处理 OCR 之后的标签文本：拆分成分列表、按关键词/类别标记可疑成分、提取营养成分。
//! 这些结果就是规则引擎的输入，OCR 和模型调用不在这里。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// 无法从显式列表中解析时，最多保留的成分数
pub const MAX_FALLBACK_INGREDIENTS: usize = 50;

static INGREDIENTS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ingredients?[:\s]+([^\n]*)").expect("valid regex"));

static CONTAINS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)contains?[:\s]+([^\n]*)").expect("valid regex"));

static CALORIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:calories?|kcal)").expect("valid regex"));

static FAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:g|grams?)\s*(?:total\s+)?fat").expect("valid regex")
});

static SUGAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:g|grams?)\s*(?:total\s+)?sugars?").expect("valid regex")
});

static PROTEIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:g|grams?)\s*protein").expect("valid regex")
});

static CARBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:g|grams?)\s*(?:total\s+)?carbohydrates?")
        .expect("valid regex")
});

static SODIUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:mg|milligrams?)\s*sodium").expect("valid regex")
});

const HARMFUL_KEYWORDS: &[&str] = &[
    "artificial",
    "preservative",
    "color",
    "dye",
    "sweetener",
    "hydrogenated",
    "trans fat",
    "high fructose",
    "corn syrup",
    "monosodium glutamate",
    "msg",
    "bha",
    "bht",
    "sulfite",
    "nitrate",
    "nitrite",
    "aspartame",
    "saccharin",
    "acesulfame",
    "sucralose",
    "xylitol",
    "sorbitol",
    "maltitol",
    "erythritol",
    "propylene glycol",
    "carrageenan",
    "xanthan gum",
    "guar gum",
    "cellulose",
    "modified starch",
    "dextrose",
    "maltodextrin",
    "partially hydrogenated",
    "interesterified",
    "fractionated",
    "bleached",
    "enriched",
    "fortified",
    "natural flavor",
    "artificial flavor",
    "spice",
    "seasoning",
    "extract",
];

const HARMFUL_CATEGORIES: &[&str] = &[
    "artificial_sweetener",
    "preservative",
    "artificial_color",
    "thickener",
    "emulsifier",
    "stabilizer",
    "anti_caking_agent",
];

/// 分类器无法给出类别时使用的类别名
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// 单个成分的分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientClassification {
    pub ingredient: String,
    pub category: String,
    pub flagged: bool,
    pub confidence: f64,
}

/// 营养成分（只包含在文本中找到的项）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl NutritionFacts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 从标签文本中解析成分列表
///
/// 优先使用 "Ingredients:" 行，其次 "Contains:" 行；找到标题行即使内容为空也不会再尝试下一个。
/// 都没有时按分隔符拆分全文，过滤掉过短和纯数字的片段。
pub fn parse_ingredients(text: &str) -> Vec<String> {
    for pattern in [&*INGREDIENTS_LINE, &*CONTAINS_LINE] {
        if let Some(caps) = pattern.captures(text) {
            let listed = caps
                .get(1)
                .map(|m| split_list(m.as_str()))
                .unwrap_or_default();
            if !listed.is_empty() {
                return listed;
            }
            break;
        }
    }

    text.split([',', ';', '.', '\n'])
        .map(str::trim)
        .filter(|item| item.chars().count() > 2 && !item.chars().all(|c| c.is_ascii_digit()))
        .take(MAX_FALLBACK_INGREDIENTS)
        .map(String::from)
        .collect()
}

fn split_list(list: &str) -> Vec<String> {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// 从标签文本中提取营养成分
pub fn extract_nutrition(text: &str) -> NutritionFacts {
    NutritionFacts {
        calories: first_capture(&CALORIES, text).and_then(|v| v.parse().ok()),
        fat: first_capture(&FAT, text).and_then(|v| v.parse().ok()),
        sugar: first_capture(&SUGAR, text).and_then(|v| v.parse().ok()),
        protein: first_capture(&PROTEIN, text).and_then(|v| v.parse().ok()),
        carbs: first_capture(&CARBS, text).and_then(|v| v.parse().ok()),
        sodium: first_capture(&SODIUM, text).and_then(|v| v.parse().ok()),
    }
}

fn first_capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// 基于关键词和类别的有害成分判定
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 成分名包含有害关键词，或类别属于有害类别
    pub fn is_harmful(&self, ingredient: &str, category: &str) -> bool {
        let ingredient = ingredient.to_lowercase();
        let category = category.to_lowercase();

        HARMFUL_KEYWORDS.iter().any(|k| ingredient.contains(k))
            || HARMFUL_CATEGORIES.iter().any(|c| category.contains(c))
    }

    /// 离线分类：没有模型给出的类别，置信度固定为 0.5
    pub fn classify_offline(&self, ingredient: &str) -> IngredientClassification {
        IngredientClassification {
            ingredient: ingredient.to_string(),
            category: UNKNOWN_CATEGORY.to_string(),
            flagged: self.is_harmful(ingredient, UNKNOWN_CATEGORY),
            confidence: 0.5,
        }
    }
}

/// 分类结果 -> 引擎使用的有害标记表
pub fn harmful_flags(classifications: &[IngredientClassification]) -> HashMap<String, bool> {
    classifications
        .iter()
        .map(|c| (c.ingredient.clone(), c.flagged))
        .collect()
}
