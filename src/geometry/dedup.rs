//! 顶点去重索引
//!
//! 为网格组装提供“已接受的唯一顶点中是否存在近似相等者”的查找。
//! 两种策略的匹配语义完全相同：逐分量 epsilon 比较，
//! 存在多个匹配时取最小索引。
//!
//! - 线性：扫描全部唯一顶点
//! - 空间哈希：按位置量化到格子，只比较相邻 27 个格子中的候选

use std::collections::HashMap;

use crate::core::config::DedupStrategy;
use crate::geometry::vertex::VertexRecord;

/// 空间哈希的格子边长
///
/// 必须不小于顶点比较的 epsilon，保证任意两个近似相等的位置
/// 落在相同或相邻的格子中。
const CELL_SIZE: f32 = 1e-3;

type CellKey = (i64, i64, i64);

/// 顶点去重索引
#[derive(Debug, Clone)]
pub struct DedupIndex {
    strategy: DedupStrategy,
    cells: HashMap<CellKey, Vec<u32>>,
}

impl DedupIndex {
    pub fn new(strategy: DedupStrategy) -> Self {
        Self {
            strategy,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn strategy(&self) -> DedupStrategy {
        self.strategy
    }

    /// 在 `vertices` 中查找与 `record` 近似相等的最小索引
    ///
    /// `vertices` 必须是按索引顺序排列的全部唯一顶点，
    /// 并且此前每个顶点都已通过 [`insert`](Self::insert) 登记。
    pub fn find(&self, vertices: &[VertexRecord], record: &VertexRecord) -> Option<u32> {
        match self.strategy {
            DedupStrategy::Linear => vertices
                .iter()
                .position(|v| v == record)
                .map(|i| i as u32),
            DedupStrategy::Spatial => {
                let (x, y, z) = quantize(record);
                let mut best: Option<u32> = None;

                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            let key = (
                                x.saturating_add(dx),
                                y.saturating_add(dy),
                                z.saturating_add(dz),
                            );
                            let Some(candidates) = self.cells.get(&key) else {
                                continue;
                            };
                            // 格子内按插入顺序递增，第一个匹配就是该格子的最小索引
                            let hit = candidates
                                .iter()
                                .copied()
                                .find(|&i| vertices.get(i as usize).is_some_and(|v| v == record));
                            if let Some(i) = hit {
                                best = Some(best.map_or(i, |b| b.min(i)));
                            }
                        }
                    }
                }

                best
            }
        }
    }

    /// 登记一个新接受的唯一顶点
    pub fn insert(&mut self, record: &VertexRecord, index: u32) {
        if self.strategy == DedupStrategy::Spatial {
            self.cells.entry(quantize(record)).or_default().push(index);
        }
    }

    /// 顶点被修改后（例如变换位置）重建索引
    pub fn rebuild(&mut self, vertices: &[VertexRecord]) {
        self.cells.clear();
        for (i, vertex) in vertices.iter().enumerate() {
            self.insert(vertex, i as u32);
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// 位置量化到格子坐标
///
/// 浮点到整数的 `as` 转换是饱和的（NaN 映射为 0），
/// 极端坐标不会溢出。
fn quantize(record: &VertexRecord) -> CellKey {
    let p = record.xyz();
    (
        (p.x / CELL_SIZE).floor() as i64,
        (p.y / CELL_SIZE).floor() as i64,
        (p.z / CELL_SIZE).floor() as i64,
    )
}
