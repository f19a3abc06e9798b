//! 规则引擎错误类型
//!
//! 只有加载规则目录会出错，计划生成和档案校验都是全函数。

use nutrlens_shared::NutrlensError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则目录无效: {0}")]
    InvalidCatalogue(String),

    #[error("规则重复定义: {kind} '{name}'")]
    DuplicateRule { kind: &'static str, name: String },

    #[error("读取规则目录失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;

impl From<RuleError> for NutrlensError {
    fn from(err: RuleError) -> Self {
        NutrlensError::RuleEngine(err.to_string())
    }
}
