//! 几何数学工具模块
//!
//! 提供网格组装使用的切线空间计算：
//! - 单个三角形的切线/副切线（用于法线贴图）
//! - Gram-Schmidt 正交化

use crate::geometry::vertex::VertexRecord;

use super::{Vector2, Vector3};

/// 行列式绝对值低于该值时认为 UV 三角形退化
pub const DEGENERATE_DET: f32 = 1e-12;

/// 缺失 UV 时使用的备用三角形 (0,0), (1,1), (1,0)
///
/// 只是为了避免除零，不保证得到有意义的切线方向。
pub const FALLBACK_UVS: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];

/// 一个三角形的切线空间基（未归一化）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub tangent: Vector3,
    pub bitangent: Vector3,
    /// UV 三角形退化，切线和副切线被置零
    pub degenerate: bool,
    /// 至少一个角点没有 UV，使用了备用三角形
    pub used_fallback_uv: bool,
}

impl TangentFrame {
    /// 零切线空间
    pub fn zero() -> Self {
        Self {
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
            degenerate: true,
            used_fallback_uv: false,
        }
    }
}

/// 计算三角形的切线和副切线
///
/// # 算法
///
/// - 位置导数: dp1 = p1 - p0, dp2 = p2 - p0
/// - UV 导数: duv1 = uv1 - uv0, duv2 = uv2 - uv0
/// - r = 1 / (duv1.x * duv2.y - duv1.y * duv2.x)
/// - tangent = (dp1 * duv2.y - dp2 * duv1.y) * r
/// - bitangent = (dp2 * duv1.x - dp1 * duv2.x) * r
///
/// 角点缺失 UV 时使用 [`FALLBACK_UVS`] 中对应位置的值。
/// 行列式退化时返回零向量并设置 `degenerate`。
pub fn tangent_bitangent(corners: &[VertexRecord; 3]) -> TangentFrame {
    let p0 = corners[0].xyz();
    let p1 = corners[1].xyz();
    let p2 = corners[2].xyz();

    let mut used_fallback_uv = false;
    let mut uv = |slot: usize| -> Vector2 {
        match corners[slot].uv() {
            Some(uv) => uv,
            None => {
                used_fallback_uv = true;
                Vector2::new(FALLBACK_UVS[slot][0], FALLBACK_UVS[slot][1])
            }
        }
    };
    let uv0 = uv(0);
    let uv1 = uv(1);
    let uv2 = uv(2);

    let dp1 = p1 - p0;
    let dp2 = p2 - p0;
    let duv1 = uv1 - uv0;
    let duv2 = uv2 - uv0;

    let det = duv1.x * duv2.y - duv1.y * duv2.x;
    let r = 1.0 / det;

    if det.abs() < DEGENERATE_DET || !r.is_finite() {
        return TangentFrame {
            used_fallback_uv,
            ..TangentFrame::zero()
        };
    }

    TangentFrame {
        tangent: (dp1 * duv2.y - dp2 * duv1.y) * r,
        bitangent: (dp2 * duv1.x - dp1 * duv2.x) * r,
        degenerate: false,
        used_fallback_uv,
    }
}

/// Gram-Schmidt 正交化并归一化切线
///
/// tangent' = normalize(tangent - normal * dot(normal, tangent))
///
/// 结果长度过小时返回零向量。
pub fn orthonormalize(normal: &Vector3, tangent: &Vector3) -> Vector3 {
    let orthogonal = tangent - normal * normal.dot(tangent);
    normalize_or_zero(&orthogonal)
}

/// 归一化向量；长度小于 1e-6 时返回零向量
#[inline]
pub fn normalize_or_zero(v: &Vector3) -> Vector3 {
    let length = v.norm();
    if length < 1e-6 {
        Vector3::zeros()
    } else {
        v / length
    }
}
