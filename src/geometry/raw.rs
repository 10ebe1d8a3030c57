//! 原始属性存储模块
//!
//! 按文件顺序累积 `v`/`vt`/`vn`/`vp` 指令的浮点数据。
//! 索引从 1 开始（与 OBJ 一致），0 表示“不存在”。
//! 解析期间只追加，解析完成后只读。

use std::fmt;

/// 原始属性类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    /// `v` 顶点位置（3 或 4 个分量）
    Position,
    /// `vt` 纹理坐标（2 个分量）
    TexCoord,
    /// `vn` 法线（3 个分量）
    Normal,
    /// `vp` 参数空间顶点
    Parameter,
}

impl AttributeKind {
    /// 所有属性类型，顺序与存储中的表一致
    pub const ALL: [AttributeKind; 4] = [
        AttributeKind::Position,
        AttributeKind::TexCoord,
        AttributeKind::Normal,
        AttributeKind::Parameter,
    ];

    /// 属性名称（用于错误信息）
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texcoord",
            AttributeKind::Normal => "normal",
            AttributeKind::Parameter => "parameter",
        }
    }

    /// 对应的 OBJ 指令
    pub fn directive(&self) -> &'static str {
        match self {
            AttributeKind::Position => "v",
            AttributeKind::TexCoord => "vt",
            AttributeKind::Normal => "vn",
            AttributeKind::Parameter => "vp",
        }
    }

    /// 在面索引元组 `v/vt/vn` 中的槽位
    ///
    /// 参数空间顶点不会被面引用。
    pub fn face_slot(&self) -> Option<usize> {
        match self {
            AttributeKind::Position => Some(0),
            AttributeKind::TexCoord => Some(1),
            AttributeKind::Normal => Some(2),
            AttributeKind::Parameter => None,
        }
    }

    #[inline]
    fn table_index(&self) -> usize {
        match self {
            AttributeKind::Position => 0,
            AttributeKind::TexCoord => 1,
            AttributeKind::Normal => 2,
            AttributeKind::Parameter => 3,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单一属性的原始数据表
///
/// 条目保持文件中的形状（分量个数），不做补齐。
#[derive(Debug, Clone)]
pub struct RawAttributeTable {
    kind: AttributeKind,
    entries: Vec<Vec<f32>>,
}

impl RawAttributeTable {
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// 追加一个条目，返回它的 1 基索引
    pub fn push(&mut self, values: Vec<f32>) -> usize {
        self.entries.push(values);
        self.entries.len()
    }

    /// 按 1 基索引查找；0 或越界返回 `None`
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(Vec::as_slice)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按文件顺序遍历 `(1 基索引, 数据)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, values)| (i + 1, values.as_slice()))
    }
}

/// 文档拥有的原始属性表集合
///
/// 顶点记录构造时通过 [`AttributeKind`] 定位到具体的表，
/// 表本身不会被共享或在文档之外存活。
#[derive(Debug, Clone)]
pub struct RawAttributeStore {
    tables: [RawAttributeTable; 4],
}

impl RawAttributeStore {
    pub fn new() -> Self {
        Self {
            tables: AttributeKind::ALL.map(RawAttributeTable::new),
        }
    }

    /// 追加数据到对应的表，返回 1 基索引
    pub fn push(&mut self, kind: AttributeKind, values: Vec<f32>) -> usize {
        self.tables[kind.table_index()].push(values)
    }

    #[inline]
    pub fn table(&self, kind: AttributeKind) -> &RawAttributeTable {
        &self.tables[kind.table_index()]
    }

    /// 按类型和 1 基索引查找
    pub fn get(&self, kind: AttributeKind, index: usize) -> Option<&[f32]> {
        self.table(kind).get(index)
    }

    pub fn positions(&self) -> &RawAttributeTable {
        self.table(AttributeKind::Position)
    }

    pub fn texcoords(&self) -> &RawAttributeTable {
        self.table(AttributeKind::TexCoord)
    }

    pub fn normals(&self) -> &RawAttributeTable {
        self.table(AttributeKind::Normal)
    }

    pub fn parameters(&self) -> &RawAttributeTable {
        self.table(AttributeKind::Parameter)
    }
}

impl Default for RawAttributeStore {
    fn default() -> Self {
        Self::new()
    }
}
