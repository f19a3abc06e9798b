//! 统一错误处理模块
//!
//! 定义规则引擎外围各层共享的错误类型，使用 thiserror 提供良好的错误信息。
//! 规则引擎本身的评估接口不会返回错误，这里只覆盖分类服务、存储和请求参数等边界。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum NutrlensError {
    // ==================== 存储错误 ====================
    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: String, id: String },

    // ==================== 序列化错误 ====================
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    // ==================== 规则引擎错误 ====================
    #[error("规则引擎错误: {0}")]
    RuleEngine(String),

    // ==================== 验证错误 ====================
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("无效的参数: {field} - {message}")]
    InvalidArgument { field: String, message: String },

    // ==================== 外部服务错误 ====================
    #[error("外部服务超时: {service}")]
    ExternalServiceTimeout { service: String },
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, NutrlensError>;

impl NutrlensError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::RuleEngine(_) => "RULE_ENGINE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::ExternalServiceTimeout { .. } => "EXTERNAL_SERVICE_TIMEOUT",
        }
    }

    /// 是否为可重试错误
    ///
    /// 只是给调用方的提示，引擎和服务层自身从不重试。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalServiceTimeout { .. })
    }
}
