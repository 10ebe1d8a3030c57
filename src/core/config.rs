//! 配置管理模块
//!
//! 提供加载器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (dist_obj.toml)
//!
//! ```toml
//! [loader]
//! strict = false          # 出现错误级诊断时是否视为失败
//! load_materials = true   # 是否同时加载 mtllib 引用的材质库
//!
//! [assembly]
//! dedup = "spatial"       # 或 "linear"
//! orthonormalize_tangents = false
//!
//! [logging]
//! level = "info"          # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 加载器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 解析配置
    #[serde(default)]
    pub loader: LoaderConfig,

    /// 网格组装配置
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 解析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// 严格模式
    ///
    /// 开启后，只要诊断信息中出现错误级条目，解析就返回
    /// `ParseError::Strict`。默认关闭，与宽松的逐记号策略一致。
    #[serde(default = "default_strict")]
    pub strict: bool,

    /// 是否加载 `mtllib` 引用的材质库
    #[serde(default = "default_load_materials")]
    pub load_materials: bool,
}

/// 网格组装配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// 顶点去重策略
    #[serde(default = "default_dedup")]
    pub dedup: DedupStrategy,

    /// 导出 GPU 顶点时是否对切线做 Gram-Schmidt 正交化并归一化
    ///
    /// 只影响 `MeshData::gpu_vertices`，浮点导出始终保持累加值。
    #[serde(default = "default_orthonormalize")]
    pub orthonormalize_tangents: bool,
}

/// 顶点去重策略
///
/// 两种策略的匹配语义完全相同（逐分量 epsilon 比较，取最小索引），
/// 只是查找代价不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// 线性扫描所有已接受的唯一顶点（O(n²)）
    Linear,
    /// 按量化位置建立空间哈希，只在相邻格子中比较
    Spatial,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_strict() -> bool { false }
fn default_load_materials() -> bool { true }
fn default_dedup() -> DedupStrategy { DedupStrategy::Spatial }
fn default_orthonormalize() -> bool { false }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "dist_obj.log".to_string() }

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            load_materials: default_load_materials(),
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            dedup: default_dedup(),
            orthonormalize_tangents: default_orthonormalize(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use dist_obj::core::Config;
    ///
    /// let config = Config::from_file("dist_obj.toml")?;
    /// # Ok::<(), dist_obj::core::DistObjError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--strict`: 开启严格模式
    /// - `--no-mtl`: 不加载材质库
    /// - `--linear-dedup`: 使用线性扫描去重
    /// - `--orthonormalize`: GPU 顶点导出时正交化切线
    /// - `--log-level <level>`: 设置日志级别
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--strict") {
            self.loader.strict = true;
        }

        if args.iter().any(|a| a == "--no-mtl") {
            self.loader.load_materials = false;
        }

        if args.iter().any(|a| a == "--linear-dedup") {
            self.assembly.dedup = DedupStrategy::Linear;
        }

        if args.iter().any(|a| a == "--orthonormalize") {
            self.assembly.orthonormalize_tangents = true;
        }

        if let Some(idx) = args.iter().position(|a| a == "--log-level") {
            if let Some(level) = args.get(idx + 1).and_then(|s| LogLevel::parse(s)) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.logging.file_output && self.logging.log_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.log_file".to_string(),
                reason: "A log file path is required when file_output is enabled".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl LogLevel {
    /// 从字符串解析日志级别（不区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl DedupStrategy {
    /// 获取策略名称
    pub fn name(&self) -> &'static str {
        match self {
            DedupStrategy::Linear => "linear",
            DedupStrategy::Spatial => "spatial",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.loader.strict);
        assert!(config.loader.load_materials);
        assert_eq!(config.assembly.dedup, DedupStrategy::Spatial);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [assembly]
            dedup = "linear"
            "#,
        )
        .unwrap();

        assert_eq!(config.assembly.dedup, DedupStrategy::Linear);
        assert!(!config.assembly.orthonormalize_tangents);
        assert!(config.loader.load_materials);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = Config::from_toml_str("[assembly]\ndedup = \"octree\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["dist_obj", "model.obj", "--strict", "--linear-dedup", "--log-level", "debug"]);

        assert!(config.loader.strict);
        assert_eq!(config.assembly.dedup, DedupStrategy::Linear);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.loader.load_materials);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.logging.file_output = true;
        config.logging.log_file = String::new();
        assert!(config.validate().is_err());
    }
}
