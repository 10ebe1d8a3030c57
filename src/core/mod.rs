//! 核心功能模块
//!
//! 提供加载器的基础设施：日志系统、配置管理、错误处理和诊断信息收集。
//! 这些模块与具体的文件格式无关。
//!
//! # 模块组织
//!
//! - `log`：日志系统，基于 tracing 的结构化日志
//! - `config`：配置管理，支持从 TOML 文件加载
//! - `error`：错误处理，定义统一的错误类型
//! - `diagnostics`：解析过程中可恢复问题的收集器

pub mod log;
pub mod config;
pub mod error;
pub mod diagnostics;

// 重新导出常用类型，方便使用
pub use config::{Config, DedupStrategy};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity, SourceLocation};
pub use error::{DistObjError, FaceError, ParseError, Result};
