//! CLI 模块
//!
//! - `plan` - 根据档案和成分生成避免计划
//! - `validate` - 校验健康档案
//! - `catalogue` - 列出规则目录
//! - `label` - 解析标签文本
//! - `session` - 批量分析标签并生成计划历史
//!
//! # 使用示例
//!
//! ```bash
//! # 生成计划
//! avoidance-engine plan -i request.json --classify
//!
//! # 校验档案
//! avoidance-engine validate -c diabetes -a peanuts
//!
//! # 解析标签
//! cat label.txt | avoidance-engine label
//!
//! # 批量分析，只保留最近 3 条历史
//! avoidance-engine session -i labels.json --limit 3
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandRunner, read_input};
