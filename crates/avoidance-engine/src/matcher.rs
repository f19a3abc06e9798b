//! 成分匹配器
//!
//! 规则命中的判定是大小写不敏感的子串包含：成分文本包含任意一个标记即命中。
//! 子串匹配会产生误报（例如 "soy" 会命中任何包含它的单词），这是已知的精度取舍，保持原样。

/// 已经转成小写的成分列表，一次评估内复用
pub struct LoweredIngredients<'a> {
    entries: Vec<(&'a str, String)>,
}

impl<'a> LoweredIngredients<'a> {
    pub fn new<S: AsRef<str>>(ingredients: &'a [S]) -> Self {
        Self {
            entries: ingredients
                .iter()
                .map(|i| (i.as_ref(), i.as_ref().to_lowercase()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 返回命中任意标记的原始成分，保持输入顺序
    pub fn matching<M: AsRef<str>>(&self, markers: &[M]) -> Vec<&'a str> {
        let lowered: Vec<String> = markers.iter().map(|m| m.as_ref().to_lowercase()).collect();

        self.entries
            .iter()
            .filter(|(_, lower)| lowered.iter().any(|m| lower.contains(m.as_str())))
            .map(|(original, _)| *original)
            .collect()
    }
}

/// 成分匹配器
pub struct IngredientMatcher;

impl IngredientMatcher {
    /// 单个成分是否命中任意标记
    pub fn matches<M: AsRef<str>>(ingredient: &str, markers: &[M]) -> bool {
        let ingredient = ingredient.to_lowercase();
        markers
            .iter()
            .any(|m| ingredient.contains(&m.as_ref().to_lowercase()))
    }

    /// 返回命中任意标记的成分，保持输入顺序
    pub fn matching<'a, S, M>(ingredients: &'a [S], markers: &[M]) -> Vec<&'a str>
    where
        S: AsRef<str>,
        M: AsRef<str>,
    {
        LoweredIngredients::new(ingredients).matching(markers)
    }
}
