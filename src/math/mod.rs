//! 数学库模块
//!
//! 基于 `nalgebra` 的类型别名和浮点比较工具。
//!
//! - **基础类型**：Vector2/3/4, Matrix4
//! - **常量**：顶点比较使用的 EPSILON
//! - **几何处理**：切线/副切线计算（见 geometry 子模块）

pub mod geometry;

pub use nalgebra::{Matrix4 as Mat4, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector2 = Vec2<f32>;
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;

/// 数学常量
pub mod constants {
    /// 顶点属性逐分量比较的 epsilon
    pub const EPSILON: f32 = 1e-6;
}

/// 数学工具函数
pub mod utils {
    use super::constants::EPSILON;

    /// 两个浮点数之差不超过 [`EPSILON`] 时视为相等
    ///
    /// 任一参数为 NaN 时返回 false。
    #[inline]
    pub fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() <= EPSILON
    }

    /// 两个切片长度相同且逐分量近似相等
    pub fn approx_eq_slice(a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_eq(*x, *y))
    }
}
