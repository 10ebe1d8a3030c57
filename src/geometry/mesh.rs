//! 网格数据结构模块
//!
//! 定义CPU侧的网格组装器：接收三角化后的面，
//! 对顶点记录去重生成紧凑的索引缓冲，同时按共享顶点累加切线/副切线。
//!
//! # 导出视图
//!
//! - 交错数据：按面、按角点拼接 位置+UV+法线，不去重
//! - 索引数据：唯一顶点的 位置+UV+法线+切线+副切线，配合 `element_index`
//! - GPU 顶点：固定 56 字节布局的 [`GpuVertex`]

use std::collections::HashMap;
use std::ops::Range;

use crate::core::config::DedupStrategy;
use crate::core::error::ParseError;
use crate::geometry::dedup::DedupIndex;
use crate::geometry::triangulate::{fan, Face};
use crate::geometry::vertex::{GpuVertex, VertexRecord};
use crate::math::geometry::{orthonormalize, tangent_bitangent, TangentFrame};
use crate::math::{Matrix4, Vector3, Vector4};

const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

/// 切线和副切线的分量个数
pub const TANGENT_SIZE: usize = 3;

/// 交错顶点布局
///
/// 由 [`MeshData::set_mesh_data`] 从第一个面的第一个角点生成，
/// 偏移和步长以字节为单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshLayout {
    pub position_size: usize,
    pub texcoord_size: usize,
    pub normal_size: usize,
    pub stride: usize,
    pub uv_offset: usize,
    pub normal_offset: usize,
    /// (位置 + UV + 法线 分量数) × 面数
    pub float_count: usize,
}

/// CPU侧网格数据
///
/// # 不变量
///
/// - `vertex_map`、`tangent_map`、`bitangent_map` 长度相同（同一个键域）
/// - `element_index.len() == 3 * face_count()`
/// - `element_index` 中的每个值都小于唯一顶点数
#[derive(Debug, Clone)]
pub struct MeshData {
    name: Option<String>,
    material: Option<String>,

    /// 三角化后的面（非去重导出使用）
    faces: Vec<Face>,
    /// 每个面的切线空间基
    face_frames: Vec<TangentFrame>,
    /// 扁平缓冲中的角点引用 (面, 角点)
    ///
    /// 多边形扇形分解时只登记新引入的角点。
    flat_corners: Vec<(usize, usize)>,

    vertex_map: Vec<VertexRecord>,
    tangent_map: Vec<Vector3>,
    bitangent_map: Vec<Vector3>,
    element_index: Vec<u32>,

    dedup: DedupIndex,
    layout: Option<MeshLayout>,
}

impl MeshData {
    /// 创建一个空的网格数据
    pub fn new(strategy: DedupStrategy) -> Self {
        Self {
            name: None,
            material: None,
            faces: Vec::new(),
            face_frames: Vec::new(),
            flat_corners: Vec::new(),
            vertex_map: Vec::new(),
            tangent_map: Vec::new(),
            bitangent_map: Vec::new(),
            element_index: Vec::new(),
            dedup: DedupIndex::new(strategy),
            layout: None,
        }
    }

    /// 创建一个指定名称的空网格数据
    pub fn with_name(name: impl Into<String>, strategy: DedupStrategy) -> Self {
        let mut mesh = Self::new(strategy);
        mesh.name = Some(name.into());
        mesh
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// 网格使用的材质名（`usemtl`）
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn set_material(&mut self, material: impl Into<String>) {
        self.material = Some(material.into());
    }

    /// 添加一个三角形面
    ///
    /// 计算该面的切线空间基，然后对三个角点逐一去重：
    /// 找到近似相等的已有顶点时复用其索引并累加切线/副切线，
    /// 否则分配下一个索引。返回该面的切线空间基，
    /// 调用方可以据此报告退化的 UV。
    ///
    /// # 错误
    ///
    /// 唯一顶点数超出 32 位索引范围时返回 `ParseError::IndexOverflow`，
    /// 此时网格不被修改。
    pub fn add_face(&mut self, face: Face) -> Result<TangentFrame, ParseError> {
        self.push_face(face, 0..3)
    }

    /// 添加一个多边形（角点按绕序排列），按扇形分解为三角形
    ///
    /// 角点少于 3 个时不添加任何面。
    pub fn add_polygon(&mut self, corners: &[VertexRecord]) -> Result<Vec<TangentFrame>, ParseError> {
        let mut frames = Vec::with_capacity(corners.len().saturating_sub(2));
        for tri in fan(corners.len()) {
            let [a, b, c] = tri.indices;
            let face = Face::new([corners[a].clone(), corners[b].clone(), corners[c].clone()]);
            frames.push(self.push_face(face, tri.fresh_slots())?);
        }
        Ok(frames)
    }

    /// 顶点布局是否与网格第一个面的第一个角点一致（空网格总是一致）
    pub fn matches_layout(&self, vertex: &VertexRecord) -> bool {
        self.first_corner().map_or(true, |first| first.same_layout(vertex))
    }

    fn push_face(&mut self, face: Face, fresh: Range<usize>) -> Result<TangentFrame, ParseError> {
        let unique = self.vertex_map.len();
        if unique + 3 > u32::MAX as usize {
            return Err(ParseError::IndexOverflow(unique + 3));
        }

        let frame = tangent_bitangent(face.corners());
        let face_index = self.faces.len();

        for corner in face.iter() {
            let index = match self.dedup.find(&self.vertex_map, corner) {
                Some(i) => {
                    self.tangent_map[i as usize] += frame.tangent;
                    self.bitangent_map[i as usize] += frame.bitangent;
                    i
                }
                None => {
                    let i = self.vertex_map.len() as u32;
                    self.dedup.insert(corner, i);
                    self.vertex_map.push(corner.clone());
                    self.tangent_map.push(frame.tangent);
                    self.bitangent_map.push(frame.bitangent);
                    i
                }
            };
            self.element_index.push(index);
        }

        self.flat_corners.extend(fresh.map(|c| (face_index, c)));
        self.faces.push(face);
        self.face_frames.push(frame);

        Ok(frame)
    }

    /// 生成交错布局信息
    ///
    /// 所有面添加完之后调用。没有面时返回 `None`。
    pub fn set_mesh_data(&mut self) -> Option<MeshLayout> {
        let first = self.faces.first()?.corner(0);
        let per_vertex = first.position_size() + first.texcoord_size() + first.normal_size();

        let layout = MeshLayout {
            position_size: first.position_size(),
            texcoord_size: first.texcoord_size(),
            normal_size: first.normal_size(),
            stride: first.stride(),
            uv_offset: first.uv_offset(),
            normal_offset: first.normal_offset(),
            float_count: per_vertex * self.faces.len(),
        };
        self.layout = Some(layout);
        Some(layout)
    }

    /// 最近一次 [`set_mesh_data`](Self::set_mesh_data) 的结果
    pub fn layout(&self) -> Option<&MeshLayout> {
        self.layout.as_ref()
    }

    /// 交错数据：按面顺序、角点顺序拼接 位置+UV+法线（不去重）
    pub fn interleave_data(&self) -> Vec<f32> {
        self.faces
            .iter()
            .flat_map(|face| face.iter())
            .flat_map(|corner| corner.all_data().iter().copied())
            .collect()
    }

    /// 索引顶点数据：每个唯一顶点的 位置+UV+法线+切线+副切线
    ///
    /// 与 [`element_index`](Self::element_index) 配合作为 GPU 索引缓冲。
    pub fn indexed_vertex_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertex_map.len() * (self.stride_floats() + 6));
        for ((vertex, tangent), bitangent) in self
            .vertex_map
            .iter()
            .zip(&self.tangent_map)
            .zip(&self.bitangent_map)
        {
            data.extend_from_slice(vertex.all_data());
            data.extend_from_slice(tangent.as_slice());
            data.extend_from_slice(bitangent.as_slice());
        }
        data
    }

    /// 不带切线的索引数据
    ///
    /// 从面列表重新去重，返回 (唯一顶点的 位置+UV+法线, 索引)。
    pub fn indexed_vertex_data_with_indices(&self) -> (Vec<f32>, Vec<u32>) {
        let mut index = DedupIndex::new(self.dedup.strategy());
        let mut unique: Vec<VertexRecord> = Vec::new();
        let mut indices = Vec::with_capacity(self.faces.len() * 3);

        for corner in self.faces.iter().flat_map(|face| face.iter()) {
            let i = match index.find(&unique, corner) {
                Some(i) => i,
                None => {
                    let i = unique.len() as u32;
                    index.insert(corner, i);
                    unique.push(corner.clone());
                    i
                }
            };
            indices.push(i);
        }

        let data = unique
            .iter()
            .flat_map(|v| v.all_data().iter().copied())
            .collect();
        (data, indices)
    }

    /// GPU 顶点数组（每个唯一顶点一个）
    ///
    /// `orthonormalize` 为 true 时对切线做 Gram-Schmidt 正交化并归一化，
    /// 否则保持累加值。
    pub fn gpu_vertices(&self, orthonormalize_tangents: bool) -> Vec<GpuVertex> {
        self.vertex_map
            .iter()
            .zip(&self.tangent_map)
            .zip(&self.bitangent_map)
            .map(|((vertex, tangent), bitangent)| {
                if orthonormalize_tangents {
                    let t = orthonormalize(&vertex.n_xyz(), tangent);
                    let b = orthonormalize(&vertex.n_xyz(), bitangent);
                    GpuVertex::from_record(vertex, &t, &b)
                } else {
                    GpuVertex::from_record(vertex, tangent, bitangent)
                }
            })
            .collect()
    }

    /// 索引缓冲的字节视图
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.element_index)
    }

    // ---- 扁平缓冲 ----

    fn flat_records(&self) -> impl Iterator<Item = &VertexRecord> {
        self.flat_corners
            .iter()
            .map(|&(f, c)| self.faces[f].corner(c))
    }

    /// 扁平位置缓冲
    pub fn positions(&self) -> Vec<f32> {
        self.flat_records()
            .flat_map(|v| v.position().iter().copied())
            .collect()
    }

    /// 扁平纹理坐标缓冲
    pub fn texcoords(&self) -> Vec<f32> {
        self.flat_records()
            .flat_map(|v| v.texcoord().iter().copied())
            .collect()
    }

    /// 扁平法线缓冲
    pub fn normals(&self) -> Vec<f32> {
        self.flat_records()
            .flat_map(|v| v.normal().iter().copied())
            .collect()
    }

    /// 每个扁平角点所在面的切线
    pub fn corner_tangents(&self) -> Vec<f32> {
        self.flat_corners
            .iter()
            .flat_map(|&(f, _)| self.face_frames[f].tangent.as_slice().to_vec())
            .collect()
    }

    /// 每个扁平角点所在面的副切线
    pub fn corner_bitangents(&self) -> Vec<f32> {
        self.flat_corners
            .iter()
            .flat_map(|&(f, _)| self.face_frames[f].bitangent.as_slice().to_vec())
            .collect()
    }

    // ---- 计数 ----

    /// 扁平缓冲中的角点数
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.flat_corners.len()
    }

    /// 三角形数
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// 去重后的唯一顶点数
    #[inline]
    pub fn unique_vertex_count(&self) -> usize {
        self.vertex_map.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.element_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    fn first_corner(&self) -> Option<&VertexRecord> {
        self.faces.first().map(|face| face.corner(0))
    }

    pub fn position_size(&self) -> usize {
        self.first_corner().map_or(0, VertexRecord::position_size)
    }

    pub fn texcoord_size(&self) -> usize {
        self.first_corner().map_or(0, VertexRecord::texcoord_size)
    }

    pub fn normal_size(&self) -> usize {
        self.first_corner().map_or(0, VertexRecord::normal_size)
    }

    #[inline]
    pub fn tangent_size(&self) -> usize {
        TANGENT_SIZE
    }

    #[inline]
    pub fn bitangent_size(&self) -> usize {
        TANGENT_SIZE
    }

    fn stride_floats(&self) -> usize {
        self.first_corner().map_or(0, |v| v.stride() / FLOAT_SIZE)
    }

    // ---- 原始访问 ----

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_map(&self) -> &[VertexRecord] {
        &self.vertex_map
    }

    pub fn tangent_map(&self) -> &[Vector3] {
        &self.tangent_map
    }

    pub fn bitangent_map(&self) -> &[Vector3] {
        &self.bitangent_map
    }

    pub fn element_index(&self) -> &[u32] {
        &self.element_index
    }

    // ---- 几何视图 ----

    /// 每个三角形的三个位置
    pub fn triangles_vec3(&self) -> Vec<[Vector3; 3]> {
        self.faces
            .iter()
            .map(|face| face.corners().each_ref().map(VertexRecord::xyz))
            .collect()
    }

    /// 每个三角形的三个齐次位置（w 缺省为 1）
    pub fn triangles_vec4(&self) -> Vec<[Vector4; 3]> {
        self.faces
            .iter()
            .map(|face| face.corners().each_ref().map(VertexRecord::xyzw))
            .collect()
    }

    /// 边界边：不被其他三角形（任意方向）共享的边
    ///
    /// 按位置判断共享，UV 接缝处的边不算边界。
    /// 结果按面顺序排列，每条边保持原三角形中的方向。
    pub fn outer_edges(&self) -> Vec<[Vector3; 2]> {
        let position_ids = self.position_ids();

        let corner_ids = |f: usize| -> [u32; 3] {
            [0, 1, 2].map(|c| position_ids[self.element_index[f * 3 + c] as usize])
        };

        let mut usage: HashMap<(u32, u32), usize> = HashMap::new();
        for f in 0..self.faces.len() {
            let ids = corner_ids(f);
            for c in 0..3 {
                let (a, b) = (ids[c], ids[(c + 1) % 3]);
                *usage.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }

        let mut edges = Vec::new();
        for (f, face) in self.faces.iter().enumerate() {
            let ids = corner_ids(f);
            for c in 0..3 {
                let next = (c + 1) % 3;
                let (a, b) = (ids[c], ids[next]);
                if usage.get(&(a.min(b), a.max(b))) == Some(&1) {
                    edges.push([face.corner(c).xyz(), face.corner(next).xyz()]);
                }
            }
        }
        edges
    }

    /// 唯一顶点按位置再次去重后的编号
    fn position_ids(&self) -> Vec<u32> {
        let mut index = DedupIndex::new(self.dedup.strategy());
        let mut positions: Vec<VertexRecord> = Vec::new();

        self.vertex_map
            .iter()
            .map(|vertex| {
                let position = vertex.position_only();
                match index.find(&positions, &position) {
                    Some(i) => i,
                    None => {
                        let i = positions.len() as u32;
                        index.insert(&position, i);
                        positions.push(position);
                        i
                    }
                }
            })
            .collect()
    }

    // ---- 变换 ----

    /// 用矩阵变换所有位置，法线和切线保持不变
    pub fn modify_position(&mut self, matrix: &Matrix4) {
        for face in &mut self.faces {
            for corner in face.corners_mut() {
                corner.modify_position(matrix);
            }
        }
        for vertex in &mut self.vertex_map {
            vertex.modify_position(matrix);
        }
        self.dedup.rebuild(&self.vertex_map);
    }

    /// 用矩阵旋转位置、法线和切线
    pub fn rotate(&mut self, matrix: &Matrix4) {
        for face in &mut self.faces {
            for corner in face.corners_mut() {
                corner.rotate(matrix);
            }
        }
        for vertex in &mut self.vertex_map {
            vertex.rotate(matrix);
        }

        let turn = |v: &mut Vector3| *v = matrix.transform_vector(v);
        self.tangent_map.iter_mut().for_each(turn);
        self.bitangent_map.iter_mut().for_each(turn);
        for frame in &mut self.face_frames {
            turn(&mut frame.tangent);
            turn(&mut frame.bitangent);
        }

        self.dedup.rebuild(&self.vertex_map);
    }

    /// 验证网格数据的有效性
    ///
    /// 检查：
    /// - 三个映射的键域相同
    /// - 索引数量是面数的 3 倍
    /// - 所有索引都在唯一顶点范围内
    pub fn validate(&self) -> Result<(), String> {
        let unique = self.vertex_map.len();
        if self.tangent_map.len() != unique || self.bitangent_map.len() != unique {
            return Err(format!(
                "mapping sizes differ: vertices={}, tangents={}, bitangents={}",
                unique,
                self.tangent_map.len(),
                self.bitangent_map.len()
            ));
        }

        if self.element_index.len() != self.faces.len() * 3 {
            return Err(format!(
                "index count {} is not 3 x face count {}",
                self.element_index.len(),
                self.faces.len()
            ));
        }

        if let Some((i, &index)) = self
            .element_index
            .iter()
            .enumerate()
            .find(|(_, &index)| index as usize >= unique)
        {
            return Err(format!(
                "index {} at position {} is out of range (unique vertices={})",
                index, i, unique
            ));
        }

        Ok(())
    }
}

impl Default for MeshData {
    fn default() -> Self {
        Self::new(DedupStrategy::Spatial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::utils::approx_eq;

    fn v(position: [f32; 3], uv: [f32; 2]) -> VertexRecord {
        VertexRecord::new(position.to_vec(), uv.to_vec(), vec![0.0, 0.0, 1.0]).unwrap()
    }

    fn p(position: [f32; 3]) -> VertexRecord {
        VertexRecord::new(position.to_vec(), vec![], vec![]).unwrap()
    }

    fn quad() -> Vec<VertexRecord> {
        vec![
            v([0.0, 0.0, 0.0], [0.0, 0.0]),
            v([1.0, 0.0, 0.0], [1.0, 0.0]),
            v([1.0, 1.0, 0.0], [1.0, 1.0]),
            v([0.0, 1.0, 0.0], [0.0, 1.0]),
        ]
    }

    fn assert_vec3(actual: &Vector3, expected: &Vector3) {
        assert!(
            (actual - expected).norm() < 1e-5,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_single_triangle() {
        let mut mesh = MeshData::default();
        mesh.add_face(Face::new([
            p([0.0, 0.0, 0.0]),
            p([1.0, 0.0, 0.0]),
            p([1.0, 1.0, 0.0]),
        ]))
        .unwrap();

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.unique_vertex_count(), 3);
        assert_eq!(mesh.element_index(), &[0, 1, 2]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_matches_layout() {
        let mut mesh = MeshData::default();
        assert!(mesh.matches_layout(&p([0.0, 0.0, 0.0])));

        mesh.add_polygon(&quad()).unwrap();
        assert!(mesh.matches_layout(&v([5.0, 5.0, 5.0], [0.5, 0.5])));
        assert!(!mesh.matches_layout(&p([0.0, 0.0, 0.0])));
    }

    #[test]
    fn test_quad_shares_corner() {
        let mut mesh = MeshData::default();
        let frames = mesh.add_polygon(&quad()).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.unique_vertex_count(), 4);
        assert_eq!(mesh.element_index(), &[0, 1, 2, 0, 2, 3]);
        // 扁平缓冲只登记新引入的角点
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.positions().len(), 12);
        assert_eq!(mesh.texcoords().len(), 8);
        assert_eq!(mesh.corner_tangents().len(), 12);
        // 交错数据不去重
        assert_eq!(mesh.interleave_data().len(), 6 * 8);
    }

    #[test]
    fn test_dedup_idempotence() {
        let mut mesh = MeshData::default();
        let face = Face::new([
            v([0.0, 0.0, 0.0], [0.0, 0.0]),
            v([1.0, 0.0, 0.0], [1.0, 0.0]),
            v([0.0, 1.0, 0.0], [0.0, 1.0]),
        ]);

        mesh.add_face(face.clone()).unwrap();
        assert_eq!(mesh.unique_vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);

        mesh.add_face(face).unwrap();
        assert_eq!(mesh.unique_vertex_count(), 3);
        assert_eq!(mesh.index_count(), 6);

        // 只有一个新角点
        mesh.add_face(Face::new([
            v([0.0, 0.0, 0.0], [0.0, 0.0]),
            v([0.0, 1.0, 0.0], [0.0, 1.0]),
            v([-1.0, 0.0, 0.0], [-1.0, 0.0]),
        ]))
        .unwrap();
        assert_eq!(mesh.unique_vertex_count(), 4);
        assert_eq!(mesh.index_count(), 9);
    }

    #[test]
    fn test_tangents_are_summed() {
        let mut mesh = MeshData::default();
        let frames = mesh.add_polygon(&quad()).unwrap();

        // 角点 0 和 2 被两个三角形共享
        let expected = frames[0].tangent + frames[1].tangent;
        assert_vec3(&mesh.tangent_map()[0], &expected);
        assert_vec3(&mesh.tangent_map()[2], &expected);
        assert_vec3(&mesh.tangent_map()[1], &frames[0].tangent);
        assert_vec3(&mesh.tangent_map()[3], &frames[1].tangent);

        let expected_b = frames[0].bitangent + frames[1].bitangent;
        assert_vec3(&mesh.bitangent_map()[0], &expected_b);
    }

    #[test]
    fn test_indexed_round_trip() {
        let mut mesh = MeshData::default();
        mesh.add_polygon(&quad()).unwrap();
        mesh.add_face(Face::new([
            v([1.0, 1.0, 0.0], [1.0, 1.0]),
            v([2.0, 1.0, 0.0], [0.0, 0.0]),
            v([1.0, 2.0, 0.0], [0.5, 0.5]),
        ]))
        .unwrap();

        let interleaved = mesh.interleave_data();
        let indexed = mesh.indexed_vertex_data();
        let stride = 8;
        let indexed_stride = stride + 6;

        for (corner, &index) in mesh.element_index().iter().enumerate() {
            let expected = &interleaved[corner * stride..corner * stride + 3];
            let start = index as usize * indexed_stride;
            let actual = &indexed[start..start + 3];
            for (a, b) in actual.iter().zip(expected) {
                assert!(approx_eq(*a, *b));
            }
        }
    }

    #[test]
    fn test_indexed_with_indices_matches_element_index() {
        let mut mesh = MeshData::default();
        mesh.add_polygon(&quad()).unwrap();

        let (data, indices) = mesh.indexed_vertex_data_with_indices();
        assert_eq!(indices, mesh.element_index());
        assert_eq!(data.len(), 4 * 8);
    }

    #[test]
    fn test_strategies_produce_same_indices() {
        let mut linear = MeshData::new(DedupStrategy::Linear);
        let mut spatial = MeshData::new(DedupStrategy::Spatial);
        for mesh in [&mut linear, &mut spatial] {
            mesh.add_polygon(&quad()).unwrap();
            mesh.add_polygon(&quad()).unwrap();
        }

        assert_eq!(linear.element_index(), spatial.element_index());
        assert_eq!(linear.unique_vertex_count(), spatial.unique_vertex_count());
    }

    #[test]
    fn test_missing_uvs_do_not_produce_nan() {
        let mut mesh = MeshData::default();
        let normal = vec![0.0, 0.0, 1.0];
        let corners: Vec<_> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]
            .iter()
            .map(|p| VertexRecord::new(p.to_vec(), vec![], normal.clone()).unwrap())
            .collect();

        let frames = mesh.add_polygon(&corners).unwrap();
        assert!(frames[0].used_fallback_uv);
        assert!(mesh.indexed_vertex_data().iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_set_mesh_data_layout() {
        let mut mesh = MeshData::default();
        assert_eq!(mesh.set_mesh_data(), None);

        mesh.add_polygon(&quad()).unwrap();
        let layout = mesh.set_mesh_data().unwrap();

        assert_eq!(layout.position_size, 3);
        assert_eq!(layout.texcoord_size, 2);
        assert_eq!(layout.normal_size, 3);
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.uv_offset, 12);
        assert_eq!(layout.normal_offset, 20);
        assert_eq!(layout.float_count, 8 * 2);
        assert_eq!(mesh.layout(), Some(&layout));
    }

    #[test]
    fn test_triangle_views() {
        let mut mesh = MeshData::default();
        mesh.add_polygon(&quad()).unwrap();

        let tris = mesh.triangles_vec3();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1][2], Vector3::new(0.0, 1.0, 0.0));

        let tris4 = mesh.triangles_vec4();
        assert_eq!(tris4[0][1], Vector4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_outer_edges_of_quad() {
        let mut mesh = MeshData::default();
        mesh.add_polygon(&quad()).unwrap();

        let edges = mesh.outer_edges();
        // 对角线 0-2 被两个三角形共享
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|[a, b]| {
            !(a.x == 0.0 && a.y == 0.0 && b.x == 1.0 && b.y == 1.0)
                && !(a.x == 1.0 && a.y == 1.0 && b.x == 0.0 && b.y == 0.0)
        }));
    }

    #[test]
    fn test_modify_position_rebuilds_index() {
        let mut mesh = MeshData::default();
        mesh.add_polygon(&quad()).unwrap();
        mesh.modify_position(&Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));

        assert_eq!(mesh.triangles_vec3()[0][0], Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(mesh.vertex_map()[1].position(), &[11.0, 0.0, 0.0]);

        // 移动后的位置应当能匹配到已有顶点
        mesh.add_face(Face::new([
            v([10.0, 0.0, 0.0], [0.0, 0.0]),
            v([11.0, 0.0, 0.0], [1.0, 0.0]),
            v([11.0, 1.0, 0.0], [1.0, 1.0]),
        ]))
        .unwrap();
        assert_eq!(mesh.unique_vertex_count(), 4);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_rotate_turns_tangents() {
        let mut mesh = MeshData::default();
        mesh.add_face(Face::new([
            v([0.0, 0.0, 0.0], [0.0, 0.0]),
            v([1.0, 0.0, 0.0], [1.0, 0.0]),
            v([0.0, 1.0, 0.0], [0.0, 1.0]),
        ]))
        .unwrap();
        assert_vec3(&mesh.tangent_map()[0], &Vector3::new(1.0, 0.0, 0.0));

        let rotation = Matrix4::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        mesh.rotate(&rotation);

        assert_vec3(&mesh.tangent_map()[0], &Vector3::new(0.0, 1.0, 0.0));
        assert_vec3(&mesh.bitangent_map()[0], &Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(mesh.vertex_map()[0].normal(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_gpu_export() {
        let mut mesh = MeshData::default();
        mesh.add_polygon(&quad()).unwrap();

        let vertices = mesh.gpu_vertices(true);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[2].position, [1.0, 1.0, 0.0]);
        // 正交化后切线为单位长度
        let t = Vector3::from(vertices[0].tangent);
        assert!((t.norm() - 1.0).abs() < 1e-5);

        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }

    #[test]
    fn test_validate_empty() {
        let mesh = MeshData::with_name("empty", DedupStrategy::Linear);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.name(), Some("empty"));
        assert_eq!(mesh.position_size(), 0);
    }
}
