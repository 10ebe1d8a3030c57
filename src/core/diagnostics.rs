//! 诊断信息收集模块
//!
//! 解析过程中可恢复的问题（无法解析的数字、越界索引、被丢弃的面等）
//! 不会直接打印，也不会中断解析，而是收集到 [`Diagnostics`] 中，
//! 随解析结果一起返回。调用方可以选择记录日志、忽略或者视为失败。
//!
//! 每条诊断都带有 [`SourceLocation`]，足以复现出问题的原始输入行。

use std::fmt;
use std::path::{Path, PathBuf};

/// 诊断的严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// 输入被修正或部分忽略，结果仍然可用
    Warning,
    /// 输入的一部分被丢弃（例如整个面或整个文件）
    Error,
}

/// 诊断的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// 文件无法打开
    FileNotFound,
    /// 无法解析的数字记号（被丢弃）
    MalformedNumber,
    /// 面索引记号中的异常字符或槽位数量不一致
    MalformedFaceToken,
    /// 面因越界索引或属性不一致被丢弃
    FaceDropped,
    /// UV 三角形退化，切线/副切线置零
    DegenerateUv,
    /// `vt` 携带了第三个分量，被截断为 2 个
    TexcoordTruncated,
    /// 在 `newmtl` 之前出现了材质属性
    MissingMaterial,
    /// 识别但未支持的指令
    UnsupportedDirective,
    /// `-bm` 凹凸强度无法解析
    BumpIntensity,
    /// 同一网格中的面属性布局不一致，交错缓冲的步长不再统一
    LayoutMismatch,
}

/// 诊断对应的源位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// 源文件（从内存解析时为空）
    pub file: Option<PathBuf>,
    /// 行号（从 1 开始，0 表示整个文件）
    pub line: usize,
    /// 原始行文本
    pub text: String,
}

impl SourceLocation {
    pub fn new(file: Option<&Path>, line: usize, text: impl Into<String>) -> Self {
        Self {
            file: file.map(Path::to_path_buf),
            line,
            text: text.into(),
        }
    }

    /// 指向整个文件的位置
    pub fn whole_file(file: &Path) -> Self {
        Self::new(Some(file), 0, String::new())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) if self.line == 0 => write!(f, "{}", file.display()),
            Some(file) => write!(f, "{}, line {}", file.display(), self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// 单条诊断
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub location: SourceLocation,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{} [{:?}] {}: {}", severity, self.kind, self.location, self.message)?;
        if !self.location.text.is_empty() {
            write!(f, " (`{}`)", self.location.text)?;
        }
        Ok(())
    }
}

/// 诊断收集器
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// 记录一条警告
    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        location: SourceLocation,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            kind,
            location,
            message: message.into(),
        });
    }

    /// 记录一条错误
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        location: SourceLocation,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity: Severity::Error,
            kind,
            location,
            message: message.into(),
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// 按类别统计
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// 通过 tracing 输出所有诊断
    pub fn log_all(&self) {
        for diagnostic in &self.entries {
            match diagnostic.severity {
                Severity::Warning => tracing::warn!(target: "dist_obj::diagnostics", "{}", diagnostic),
                Severity::Error => tracing::error!(target: "dist_obj::diagnostics", "{}", diagnostic),
            }
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
