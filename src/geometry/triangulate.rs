//! 面三角化模块
//!
//! 将一行 `f` 指令解析出的索引元组解析为顶点记录，
//! 并按扇形分解为三角形：(0,1,2), (0,2,3), (0,3,4), …，保持绕序。

use crate::core::diagnostics::SourceLocation;
use crate::core::error::{FaceError, ParseError};
use crate::geometry::raw::{AttributeKind, RawAttributeStore};
use crate::geometry::vertex::VertexRecord;

/// 面索引元组中按槽位排列的属性类型
pub const FACE_SLOTS: [AttributeKind; 3] = [
    AttributeKind::Position,
    AttributeKind::TexCoord,
    AttributeKind::Normal,
];

/// 三角化后的面：恰好 3 个顶点记录
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    corners: [VertexRecord; 3],
}

impl Face {
    pub fn new(corners: [VertexRecord; 3]) -> Self {
        Self { corners }
    }

    #[inline]
    pub fn corners(&self) -> &[VertexRecord; 3] {
        &self.corners
    }

    #[inline]
    pub fn corner(&self, index: usize) -> &VertexRecord {
        &self.corners[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VertexRecord> {
        self.corners.iter()
    }

    pub(crate) fn corners_mut(&mut self) -> &mut [VertexRecord; 3] {
        &mut self.corners
    }
}

/// 扇形分解中的一个三角形
///
/// `indices` 是多边形中的角点下标。第一个三角形的三个角点都是新的，
/// 之后的三角形只有最后一个角点是新引入的（另外两个与前一个三角形共享）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanTriangle {
    pub indices: [usize; 3],
    pub first: bool,
}

impl FanTriangle {
    /// 本三角形新引入的角点在 `indices` 中的位置
    pub fn fresh_slots(&self) -> std::ops::Range<usize> {
        if self.first {
            0..3
        } else {
            2..3
        }
    }
}

/// 对 `corner_count` 个角点的多边形做扇形分解
///
/// 角点少于 3 个时不产生三角形；n 个角点产生 n-2 个三角形。
pub fn fan(corner_count: usize) -> impl Iterator<Item = FanTriangle> {
    (1..corner_count.saturating_sub(1)).map(|i| FanTriangle {
        indices: [0, i, i + 1],
        first: i == 1,
    })
}

/// 检查面引用的每个属性都已经在文档中声明过
///
/// `declared` 是文档中属性类型首次出现的顺序。
/// 面元组超过 3 个槽位，或者非零槽位对应的属性从未出现，
/// 都属于不可恢复的错误。
pub fn check_declared(
    tuples: &[Vec<usize>],
    declared: &[AttributeKind],
    location: &SourceLocation,
) -> Result<(), ParseError> {
    let width = tuples.first().map_or(0, Vec::len);
    if width > FACE_SLOTS.len() {
        return Err(ParseError::UnsupportedFormat(format!(
            "{}: face corner has {} index slots, at most {} are supported",
            location,
            width,
            FACE_SLOTS.len()
        )));
    }

    for (slot, kind) in FACE_SLOTS.iter().enumerate().take(width) {
        let referenced = tuples.iter().any(|t| slot_index(t, slot) != 0);
        if referenced && !declared.contains(kind) {
            return Err(ParseError::UndeclaredAttribute {
                location: location.clone(),
                kind: *kind,
            });
        }
    }

    Ok(())
}

/// 元组中某个槽位的索引，缺失的槽位视为 0
#[inline]
fn slot_index(tuple: &[usize], slot: usize) -> usize {
    tuple.get(slot).copied().unwrap_or(0)
}

/// 把一个面的索引元组解析为顶点记录
///
/// - 位置索引必须存在（非 0）且在范围内
/// - 纹理坐标和法线要么所有角点都有，要么都没有
/// - 索引越界、属性不一致、角点不足都会使整个面被丢弃
pub fn resolve_corners(
    tuples: &[Vec<usize>],
    store: &RawAttributeStore,
) -> Result<Vec<VertexRecord>, FaceError> {
    if tuples.len() < 3 {
        return Err(FaceError::TooFewCorners(tuples.len()));
    }

    // 纹理坐标和法线在整个面上必须一致
    for (i, kind) in FACE_SLOTS.iter().enumerate().skip(1) {
        let present = tuples.iter().filter(|t| slot_index(t, i) != 0).count();
        if present != 0 && present != tuples.len() {
            return Err(FaceError::InconsistentAttributes { kind: *kind });
        }
    }

    tuples
        .iter()
        .map(|tuple| {
            let mut attributes: [Vec<f32>; 3] = Default::default();
            for (i, kind) in FACE_SLOTS.iter().enumerate() {
                let index = slot_index(tuple, i);
                if index == 0 && *kind != AttributeKind::Position {
                    continue;
                }
                let table = store.table(*kind);
                let values = table.get(index).ok_or(FaceError::IndexOutOfRange {
                    kind: *kind,
                    index,
                    len: table.len(),
                })?;
                attributes[i] = values.to_vec();
            }

            let [position, texcoord, normal] = attributes;
            VertexRecord::new(position, texcoord, normal)
                .map_err(|e| FaceError::InvalidVertex(e.to_string()))
        })
        .collect()
}

/// 把多边形的顶点记录扇形分解为三角形面
pub fn triangulate(corners: &[VertexRecord]) -> Vec<Face> {
    fan(corners.len())
        .map(|tri| {
            let [a, b, c] = tri.indices;
            Face::new([corners[a].clone(), corners[b].clone(), corners[c].clone()])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_quad() -> RawAttributeStore {
        let mut store = RawAttributeStore::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] {
            store.push(AttributeKind::Position, p.to_vec());
        }
        for uv in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            store.push(AttributeKind::TexCoord, uv.to_vec());
        }
        store.push(AttributeKind::Normal, vec![0.0, 0.0, 1.0]);
        store
    }

    #[test]
    fn test_fan_yields_n_minus_two_triangles() {
        for n in 3..10 {
            let triangles: Vec<_> = fan(n).collect();
            assert_eq!(triangles.len(), n - 2);
            assert!(triangles.iter().all(|t| t.indices[0] == 0));
            assert!(triangles[0].first);
            assert!(triangles.iter().skip(1).all(|t| !t.first));
        }
    }

    #[test]
    fn test_fan_preserves_winding() {
        let triangles: Vec<_> = fan(5).map(|t| t.indices).collect();
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn test_fan_degenerate_inputs() {
        assert_eq!(fan(0).count(), 0);
        assert_eq!(fan(2).count(), 0);
    }

    #[test]
    fn test_fresh_slots() {
        let mut triangles = fan(4);
        assert_eq!(triangles.next().map(|t| t.fresh_slots()), Some(0..3));
        assert_eq!(triangles.next().map(|t| t.fresh_slots()), Some(2..3));
    }

    #[test]
    fn test_resolve_full_quad() {
        let store = store_with_quad();
        let tuples = vec![vec![1, 1, 1], vec![2, 2, 1], vec![3, 3, 1], vec![4, 4, 1]];

        let corners = resolve_corners(&tuples, &store).unwrap();
        assert_eq!(corners.len(), 4);
        assert_eq!(corners[2].position(), &[1.0, 1.0, 0.0]);
        assert_eq!(corners[2].texcoord(), &[1.0, 1.0]);
        assert_eq!(corners[2].normal(), &[0.0, 0.0, 1.0]);

        let faces = triangulate(&corners);
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].corner(0), faces[1].corner(0));
        assert_eq!(faces[1].corner(1), &corners[2]);
    }

    #[test]
    fn test_resolve_position_and_normal_only() {
        let store = store_with_quad();
        let tuples = vec![vec![1, 0, 1], vec![2, 0, 1], vec![3, 0, 1]];

        let corners = resolve_corners(&tuples, &store).unwrap();
        assert!(corners.iter().all(|c| !c.has_texcoord() && c.has_normal()));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let store = store_with_quad();
        let tuples = vec![vec![1], vec![2], vec![9]];

        let err = resolve_corners(&tuples, &store).unwrap_err();
        assert_eq!(
            err,
            FaceError::IndexOutOfRange {
                kind: AttributeKind::Position,
                index: 9,
                len: 4,
            }
        );
    }

    #[test]
    fn test_resolve_inconsistent_texcoords() {
        let store = store_with_quad();
        let tuples = vec![vec![1, 1], vec![2, 0], vec![3, 3]];

        let err = resolve_corners(&tuples, &store).unwrap_err();
        assert_eq!(err, FaceError::InconsistentAttributes { kind: AttributeKind::TexCoord });
    }

    #[test]
    fn test_resolve_too_few_corners() {
        let store = store_with_quad();
        let err = resolve_corners(&[vec![1], vec![2]], &store).unwrap_err();
        assert_eq!(err, FaceError::TooFewCorners(2));
    }

    #[test]
    fn test_check_declared_rejects_unknown_kind() {
        let location = SourceLocation::new(None, 3, "f 1//1 2//1 3//1");
        let tuples = vec![vec![1, 0, 1], vec![2, 0, 1], vec![3, 0, 1]];

        let declared = [AttributeKind::Position];
        let err = check_declared(&tuples, &declared, &location).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UndeclaredAttribute { kind: AttributeKind::Normal, .. }
        ));

        let declared = [AttributeKind::Position, AttributeKind::Normal];
        assert!(check_declared(&tuples, &declared, &location).is_ok());
    }

    #[test]
    fn test_check_declared_rejects_wide_tuples() {
        let location = SourceLocation::new(None, 1, "f 1/1/1/1 2/2/2/2 3/3/3/3");
        let tuples = vec![vec![1, 1, 1, 1]; 3];
        let declared = AttributeKind::ALL;

        assert!(matches!(
            check_declared(&tuples, &declared, &location),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }
}
