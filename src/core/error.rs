//! 错误处理模块
//!
//! 定义了加载器中使用的统一错误类型。
//!
//! # 错误分层
//!
//! - `DistObjError`：对外的统一错误，所有 `Result` 都使用它
//! - `ParseError`：OBJ/MTL 解析中不可恢复的错误（中止当前文件）
//! - `FaceError`：单个面的可恢复错误，该面被丢弃并记录到诊断信息中
//!
//! 可恢复的问题不会走 `Err` 路径，而是写入
//! [`Diagnostics`](crate::core::diagnostics::Diagnostics)，由调用方决定如何处理。

use std::fmt;
use std::path::PathBuf;

use crate::core::diagnostics::SourceLocation;
use crate::geometry::raw::AttributeKind;

/// 加载器统一的 Result 类型
pub type Result<T> = std::result::Result<T, DistObjError>;

/// DistObj 的错误类型
#[derive(Debug)]
pub enum DistObjError {
    /// 配置错误
    Config(ConfigError),

    /// 解析错误
    Parse(ParseError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// OBJ/MTL 解析中不可恢复的错误
#[derive(Debug)]
pub enum ParseError {
    /// 文件不存在（仅严格模式；宽松模式下记录为诊断信息）
    FileNotFound(PathBuf),

    /// 不支持的文件格式
    UnsupportedFormat(String),

    /// 文本编码错误（非 UTF-8）
    Encoding(String),

    /// 顶点记录的属性数量不合法
    InvalidVertex(String),

    /// 面引用了从未声明过的属性类型
    ///
    /// 这是解析器内部的不变量被破坏，不可恢复。
    UndeclaredAttribute {
        location: SourceLocation,
        kind: AttributeKind,
    },

    /// 唯一顶点数量超出 32 位索引范围
    IndexOverflow(usize),

    /// 严格模式下诊断信息中出现了错误
    Strict { errors: usize },
}

/// 单个面的可恢复错误
///
/// 出现时该面被整体丢弃，不影响同一文件中的其他面。
#[derive(Debug, Clone, PartialEq)]
pub enum FaceError {
    /// 索引超出原始属性表范围
    IndexOutOfRange {
        kind: AttributeKind,
        index: usize,
        len: usize,
    },

    /// 同一个面内某个属性部分角点有、部分角点没有
    InconsistentAttributes { kind: AttributeKind },

    /// 角点数量不足以构成三角形
    TooFewCorners(usize),

    /// 顶点记录构造失败
    InvalidVertex(String),
}

impl fmt::Display for DistObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistObjError::Config(e) => write!(f, "Configuration error: {}", e),
            DistObjError::Parse(e) => write!(f, "Parse error: {}", e),
            DistObjError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            ParseError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            ParseError::Encoding(msg) => write!(f, "Invalid text encoding: {}", msg),
            ParseError::InvalidVertex(msg) => write!(f, "Invalid vertex record: {}", msg),
            ParseError::UndeclaredAttribute { location, kind } => write!(
                f,
                "{}: face references {} data that was never declared",
                location,
                kind.name()
            ),
            ParseError::IndexOverflow(count) => {
                write!(f, "Too many unique vertices for a 32-bit index buffer: {}", count)
            }
            ParseError::Strict { errors } => {
                write!(f, "Strict mode: {} error diagnostic(s) reported", errors)
            }
        }
    }
}

impl fmt::Display for FaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceError::IndexOutOfRange { kind, index, len } => write!(
                f,
                "{} index {} is out of range (count={})",
                kind.name(),
                index,
                len
            ),
            FaceError::InconsistentAttributes { kind } => write!(
                f,
                "{} data is present on some corners but missing on others",
                kind.name()
            ),
            FaceError::TooFewCorners(count) => {
                write!(f, "face needs at least 3 corners, found {}", count)
            }
            FaceError::InvalidVertex(msg) => write!(f, "invalid vertex: {}", msg),
        }
    }
}

impl std::error::Error for DistObjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DistObjError::Io(e) => Some(e),
            DistObjError::Config(e) => Some(e),
            DistObjError::Parse(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for ParseError {}
impl std::error::Error for FaceError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for DistObjError {
    fn from(err: std::io::Error) -> Self {
        DistObjError::Io(err)
    }
}

impl From<ConfigError> for DistObjError {
    fn from(err: ConfigError) -> Self {
        DistObjError::Config(err)
    }
}

impl From<ParseError> for DistObjError {
    fn from(err: ParseError) -> Self {
        DistObjError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_error_message() {
        let err = FaceError::IndexOutOfRange {
            kind: AttributeKind::Position,
            index: 9,
            len: 3,
        };
        assert_eq!(err.to_string(), "position index 9 is out of range (count=3)");
    }

    #[test]
    fn test_parse_error_converts_into_crate_error() {
        let err: DistObjError = ParseError::FileNotFound(PathBuf::from("missing.obj")).into();
        assert!(matches!(err, DistObjError::Parse(ParseError::FileNotFound(_))));
        assert!(err.to_string().contains("missing.obj"));
    }

    #[test]
    fn test_undeclared_attribute_mentions_line() {
        let err = ParseError::UndeclaredAttribute {
            location: SourceLocation::new(None, 7, "f 1/1 2/2 3/3"),
            kind: AttributeKind::TexCoord,
        };
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("texcoord"));
    }
}
