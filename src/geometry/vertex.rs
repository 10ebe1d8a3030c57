//! 顶点定义模块
//!
//! - [`VertexRecord`]：解析阶段每个面角点解析出的顶点记录，
//!   保留文件中的属性形状，定义近似相等
//! - [`GpuVertex`]：固定布局的 GPU 顶点，供索引导出使用

use bytemuck::{Pod, Zeroable};

use crate::core::error::ParseError;
use crate::math::utils::approx_eq_slice;
use crate::math::{Matrix4, Vector2, Vector3, Vector4};

const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

/// 法线旋转后绝对值低于该值的分量被置为 0
const NORMAL_SNAP: f32 = 1e-4;

/// 一个面角点解析出的顶点记录
///
/// 属性数量约束：
/// - 位置：3 或 4 个分量
/// - 纹理坐标：0 或 2 个分量
/// - 法线：0 或 3 个分量
///
/// 交错数据按 位置 → UV → 法线 的顺序存放在同一个数组中，
/// 派生视图（xyz、uv、法线向量）在构造时计算一次。
///
/// # 相等性
///
/// 两个记录相等当且仅当各属性的分量个数相同，
/// 且所有对应分量之差不超过 1e-6。
#[derive(Debug, Clone)]
pub struct VertexRecord {
    data: Vec<f32>,
    position_size: usize,
    texcoord_size: usize,
    normal_size: usize,

    xyz: Vector3,
    w: f32,
    uv: Vector2,
    n_xyz: Vector3,
}

impl VertexRecord {
    /// 从三个属性数组构造顶点记录
    ///
    /// # 错误
    ///
    /// 属性数量不满足约束时返回 `ParseError::InvalidVertex`。
    pub fn new(
        position: Vec<f32>,
        texcoord: Vec<f32>,
        normal: Vec<f32>,
    ) -> Result<Self, ParseError> {
        if !(3..=4).contains(&position.len()) {
            return Err(ParseError::InvalidVertex(format!(
                "position must have 3 or 4 components, found {}",
                position.len()
            )));
        }
        if !texcoord.is_empty() && texcoord.len() != 2 {
            return Err(ParseError::InvalidVertex(format!(
                "texcoord must have 0 or 2 components, found {}",
                texcoord.len()
            )));
        }
        if !normal.is_empty() && normal.len() != 3 {
            return Err(ParseError::InvalidVertex(format!(
                "normal must have 0 or 3 components, found {}",
                normal.len()
            )));
        }

        let position_size = position.len();
        let texcoord_size = texcoord.len();
        let normal_size = normal.len();

        let mut data = position;
        data.extend_from_slice(&texcoord);
        data.extend_from_slice(&normal);

        let mut record = Self {
            data,
            position_size,
            texcoord_size,
            normal_size,
            xyz: Vector3::zeros(),
            w: 1.0,
            uv: Vector2::zeros(),
            n_xyz: Vector3::zeros(),
        };
        record.refresh_views();
        Ok(record)
    }

    fn refresh_views(&mut self) {
        let (xyz, w) = {
            let p = self.position();
            (Vector3::new(p[0], p[1], p[2]), p.get(3).copied().unwrap_or(1.0))
        };
        self.xyz = xyz;
        self.w = w;

        self.uv = match *self.texcoord() {
            [u, v] => Vector2::new(u, v),
            _ => Vector2::zeros(),
        };

        self.n_xyz = match *self.normal() {
            [x, y, z] => Vector3::new(x, y, z),
            _ => Vector3::zeros(),
        };
    }

    /// 位置分量
    #[inline]
    pub fn position(&self) -> &[f32] {
        &self.data[..self.position_size]
    }

    /// 纹理坐标分量（可能为空）
    #[inline]
    pub fn texcoord(&self) -> &[f32] {
        &self.data[self.position_size..self.position_size + self.texcoord_size]
    }

    /// 法线分量（可能为空）
    #[inline]
    pub fn normal(&self) -> &[f32] {
        &self.data[self.position_size + self.texcoord_size..]
    }

    /// 交错数据：位置 + UV + 法线
    #[inline]
    pub fn all_data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.xyz.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.xyz.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.xyz.z
    }

    /// 第四个位置分量，缺省为 1.0
    #[inline]
    pub fn w(&self) -> f32 {
        self.w
    }

    #[inline]
    pub fn xy(&self) -> Vector2 {
        self.xyz.xy()
    }

    #[inline]
    pub fn xyz(&self) -> Vector3 {
        self.xyz
    }

    #[inline]
    pub fn xyzw(&self) -> Vector4 {
        Vector4::new(self.xyz.x, self.xyz.y, self.xyz.z, self.w)
    }

    /// 纹理坐标；没有 UV 时为 `None`
    #[inline]
    pub fn uv(&self) -> Option<Vector2> {
        self.has_texcoord().then_some(self.uv)
    }

    #[inline]
    pub fn u(&self) -> f32 {
        self.uv.x
    }

    #[inline]
    pub fn v(&self) -> f32 {
        self.uv.y
    }

    /// 法线向量；没有法线时为零向量
    #[inline]
    pub fn n_xyz(&self) -> Vector3 {
        self.n_xyz
    }

    #[inline]
    pub fn nx(&self) -> f32 {
        self.n_xyz.x
    }

    #[inline]
    pub fn ny(&self) -> f32 {
        self.n_xyz.y
    }

    #[inline]
    pub fn nz(&self) -> f32 {
        self.n_xyz.z
    }

    #[inline]
    pub fn has_texcoord(&self) -> bool {
        self.texcoord_size > 0
    }

    #[inline]
    pub fn has_normal(&self) -> bool {
        self.normal_size > 0
    }

    #[inline]
    pub fn position_size(&self) -> usize {
        self.position_size
    }

    #[inline]
    pub fn texcoord_size(&self) -> usize {
        self.texcoord_size
    }

    #[inline]
    pub fn normal_size(&self) -> usize {
        self.normal_size
    }

    /// UV 在交错顶点中的字节偏移
    #[inline]
    pub fn uv_offset(&self) -> usize {
        self.position_size * FLOAT_SIZE
    }

    /// 法线在交错顶点中的字节偏移
    #[inline]
    pub fn normal_offset(&self) -> usize {
        self.uv_offset() + self.texcoord_size * FLOAT_SIZE
    }

    /// 交错顶点的字节步长
    #[inline]
    pub fn stride(&self) -> usize {
        self.data.len() * FLOAT_SIZE
    }

    /// 属性形状是否相同（步长、偏移一致）
    #[inline]
    pub fn same_layout(&self, other: &VertexRecord) -> bool {
        self.position_size == other.position_size
            && self.texcoord_size == other.texcoord_size
            && self.normal_size == other.normal_size
    }

    /// 只保留位置分量的副本
    pub fn position_only(&self) -> Self {
        let mut record = Self {
            data: self.position().to_vec(),
            position_size: self.position_size,
            texcoord_size: 0,
            normal_size: 0,
            xyz: Vector3::zeros(),
            w: 1.0,
            uv: Vector2::zeros(),
            n_xyz: Vector3::zeros(),
        };
        record.refresh_views();
        record
    }

    /// 近似相等：布局相同，且所有分量之差不超过 1e-6
    pub fn approx_eq(&self, other: &VertexRecord) -> bool {
        self.same_layout(other) && approx_eq_slice(&self.data, &other.data)
    }

    /// 用矩阵变换位置，法线保持不变
    pub fn modify_position(&mut self, matrix: &Matrix4) {
        let transformed = matrix * self.xyzw();
        self.write_position(&transformed);
        self.refresh_views();
    }

    /// 用矩阵旋转位置和法线
    ///
    /// 法线按方向向量变换（不受平移影响），
    /// 绝对值小于 1e-4 的分量置为 0。
    pub fn rotate(&mut self, matrix: &Matrix4) {
        let transformed = matrix * self.xyzw();
        self.write_position(&transformed);

        if self.has_normal() {
            let n = matrix.transform_vector(&self.n_xyz);
            let start = self.position_size + self.texcoord_size;
            for (i, component) in n.iter().enumerate() {
                self.data[start + i] = if component.abs() < NORMAL_SNAP { 0.0 } else { *component };
            }
        }

        self.refresh_views();
    }

    fn write_position(&mut self, transformed: &Vector4) {
        for i in 0..self.position_size {
            self.data[i] = transformed[i];
        }
    }
}

impl PartialEq for VertexRecord {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

/// 固定布局的 GPU 顶点
///
/// 内存布局与GPU兼容，使用 `#[repr(C)]` 保证顺序和对齐。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - texcoord: 8 bytes (2 * f32)
/// - normal: 12 bytes (3 * f32)
/// - tangent: 12 bytes (3 * f32)
/// - bitangent: 12 bytes (3 * f32)
/// - **总计**: 56 bytes
///
/// 缺失的属性填零，位置的 w 分量被丢弃。
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl GpuVertex {
    /// 从顶点记录和累加的切线空间构造
    pub fn from_record(record: &VertexRecord, tangent: &Vector3, bitangent: &Vector3) -> Self {
        let uv = record.uv().unwrap_or_else(Vector2::zeros);
        let n = record.n_xyz();
        let p = record.xyz();
        Self {
            position: [p.x, p.y, p.z],
            texcoord: [uv.x, uv.y],
            normal: [n.x, n.y, n.z],
            tangent: [tangent.x, tangent.y, tangent.z],
            bitangent: [bitangent.x, bitangent.y, bitangent.z],
        }
    }
}

/// GPU 顶点数组的字节视图
pub fn vertex_bytes(vertices: &[GpuVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}
