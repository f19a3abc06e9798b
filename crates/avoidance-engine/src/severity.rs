//! 严重程度与风险等级定义
//!
//! 三个枚举都有全序关系，风险升级只通过 `max` 完成，避免字符串比较。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 避免计划的整体风险等级
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// 升级风险等级，只升不降
    pub fn escalate(self, candidate: RiskLevel) -> RiskLevel {
        self.max(candidate)
    }

    /// 摘要中使用的风险提示
    pub fn advice_text(self) -> &'static str {
        match self {
            Self::High => "HIGH RISK - Avoid this product",
            Self::Medium => "MODERATE RISK - Consume with caution",
            Self::Low => "LOW RISK - Monitor your response",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// 健康状况规则的严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionSeverity {
    Low,
    Medium,
    High,
}

impl ConditionSeverity {
    /// 命中该规则时对计划风险的贡献（Low 不会升级）
    pub fn risk(self) -> RiskLevel {
        match self {
            Self::Low => RiskLevel::Low,
            Self::Medium => RiskLevel::Medium,
            Self::High => RiskLevel::High,
        }
    }
}

impl fmt::Display for ConditionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.risk().fmt(f)
    }
}

/// 过敏规则的严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergySeverity {
    Mild,
    Moderate,
    Severe,
}

impl AllergySeverity {
    /// 命中该规则时对计划风险的贡献（Mild 不会升级）
    pub fn risk(self) -> RiskLevel {
        match self {
            Self::Mild => RiskLevel::Low,
            Self::Moderate => RiskLevel::Medium,
            Self::Severe => RiskLevel::High,
        }
    }
}

impl fmt::Display for AllergySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        };
        write!(f, "{}", s)
    }
}
