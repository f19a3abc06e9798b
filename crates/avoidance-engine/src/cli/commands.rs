//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand};

/// 成分避免计划命令行工具
///
/// 计划、校验、标签解析的结果以 JSON 输出到 stdout，日志输出到 stderr。
#[derive(Parser, Debug)]
#[command(name = "avoidance-engine")]
#[command(version, about = "成分避免计划引擎")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 生成避免计划
    ///
    /// 输入 JSON：{ "conditions", "allergies", "ingredients", "harmfulFlags" }
    Plan {
        /// 输入文件，"-" 表示 stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// 先用关键词分类器标记成分（输入中的 harmfulFlags 优先）
        #[arg(long)]
        classify: bool,

        /// 未知的健康状况或过敏原直接报错
        #[arg(long)]
        strict: bool,
    },

    /// 校验健康档案
    ///
    /// 存在未知值时退出码为 1。
    Validate {
        /// 健康状况（可重复）
        #[arg(short, long = "condition")]
        conditions: Vec<String>,

        /// 过敏原（可重复）
        #[arg(short, long = "allergy")]
        allergies: Vec<String>,
    },

    /// 列出可选的健康状况和过敏原
    Catalogue,

    /// 解析标签文本：成分、有害标记、营养成分
    Label {
        /// 输入文件，"-" 表示 stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// 按顺序分析一组标签并逐个生成计划，输出最新计划和历史
    ///
    /// 输入 JSON：{ "userId", "conditions", "allergies", "labels" }
    Session {
        /// 输入文件，"-" 表示 stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// 历史条数，默认使用配置中的 engine.history_limit
        #[arg(long)]
        limit: Option<usize>,
    },
}

// ============================================================================
// 单元测试
// ============================================================================
