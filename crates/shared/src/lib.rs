//! 共享库
//!
//! 包含规则引擎和外围服务共用的配置、错误处理、日志初始化代码。

pub mod config;
pub mod error;
pub mod observability;

pub use error::{NutrlensError, Result};
