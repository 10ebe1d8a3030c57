//! OBJ 文件加载器
//!
//! 逐行解析 Wavefront OBJ 文本，构建 [`ObjDocument`]：
//! 原始属性表、按 `g`/`v` 切分的网格列表、`mtllib` 引用以及诊断信息。
//!
//! # 状态机
//!
//! ```text
//! BeforeFirstMesh --v/vt/vn/vp/f--> Accumulating --g--> GeometryEnded
//!                                        ^                    |
//!                                        +------ v (新网格) ---+
//! ```
//!
//! - `g`：当前网格还没有面时直接命名当前网格；否则结束当前网格，
//!   名字留给下一个网格
//! - `v`：在 GeometryEnded 状态下开始新网格，继承最近的材质名
//! - `usemtl`：设置当前材质名；GeometryEnded 状态下只对下一个网格生效，
//!   否则同时标记到当前网格
//! - `mtllib`：记录材质库文件名（后出现的覆盖先出现的）
//! - 文件结束：对每个网格调用 `set_mesh_data()`

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use super::directive::{classify, extract_name, split_directive, Directive};
use super::mtl_loader::MaterialLibrary;
use super::numeric::{extract_face_sequence, extract_floats};
use super::AssetLoader;
use crate::core::config::Config;
use crate::core::diagnostics::{DiagnosticKind, Diagnostics, SourceLocation};
use crate::core::error::{DistObjError, ParseError, Result};
use crate::geometry::mesh::MeshData;
use crate::geometry::raw::{AttributeKind, RawAttributeStore};
use crate::geometry::triangulate::{check_declared, resolve_corners};

/// 解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    BeforeFirstMesh,
    Accumulating,
    GeometryEnded,
}

/// 一次 OBJ 解析的结果
///
/// 解析完成后只读。
#[derive(Debug, Clone)]
pub struct ObjDocument {
    source: Option<PathBuf>,
    raw: RawAttributeStore,
    meshes: Vec<MeshData>,
    material_lib: Option<String>,
    attribute_order: Vec<AttributeKind>,
    diagnostics: Diagnostics,
}

impl ObjDocument {
    fn empty(source: Option<&Path>) -> Self {
        Self {
            source: source.map(Path::to_path_buf),
            raw: RawAttributeStore::new(),
            meshes: Vec::new(),
            material_lib: None,
            attribute_order: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// 从文件解析
    ///
    /// 文件不存在时不返回错误，而是返回一个没有网格的文档，
    /// 并在诊断信息中记录 `FileNotFound`（严格模式下返回 `ParseError::FileNotFound`）。
    pub fn parse_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let _span = crate::span_trace!("obj_parse_file").entered();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                crate::loader_warn!("OBJ file not found: {}", path.display());
                if config.loader.strict {
                    return Err(ParseError::FileNotFound(path.to_path_buf()).into());
                }
                let mut document = Self::empty(Some(path));
                document.diagnostics.error(
                    DiagnosticKind::FileNotFound,
                    SourceLocation::whole_file(path),
                    format!("unable to open obj file: {}", path.display()),
                );
                return Ok(document);
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse_reader(BufReader::new(file), Some(path), config)
    }

    /// 从内存中的文本解析
    pub fn parse_str(text: &str, config: &Config) -> Result<Self> {
        Self::parse_reader(text.as_bytes(), None, config)
    }

    /// 从任意按行读取的来源解析
    pub fn parse_reader<R: BufRead>(reader: R, source: Option<&Path>, config: &Config) -> Result<Self> {
        let mut parser = ObjParser::new(source, config);

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| match e.kind() {
                ErrorKind::InvalidData => DistObjError::Parse(ParseError::Encoding(format!(
                    "line {}: {}",
                    i + 1,
                    e
                ))),
                _ => DistObjError::Io(e),
            })?;
            parser.parse_line(i + 1, &line)?;
        }

        let document = parser.finish();
        crate::loader_info!(
            "Loaded OBJ {}: {} mesh(es), {} triangle(s), {} diagnostic(s)",
            document.display_name(),
            document.meshes.len(),
            document.meshes.iter().map(MeshData::face_count).sum::<usize>(),
            document.diagnostics.len()
        );

        finish_strict(document, config)
    }

    fn display_name(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn into_meshes(self) -> Vec<MeshData> {
        self.meshes
    }

    /// 原始属性表
    pub fn raw(&self) -> &RawAttributeStore {
        &self.raw
    }

    /// 属性类型首次出现的顺序
    pub fn attribute_order(&self) -> &[AttributeKind] {
        &self.attribute_order
    }

    /// `mtllib` 引用的文件名
    pub fn material_lib(&self) -> Option<&str> {
        self.material_lib.as_deref()
    }

    /// 材质库路径，相对于 OBJ 文件所在目录解析
    pub fn material_path(&self) -> Option<PathBuf> {
        let lib = self.material_lib.as_ref()?;
        let base = self
            .source
            .as_ref()
            .and_then(|p| p.parent())
            .unwrap_or_else(|| Path::new(""));
        Some(base.join(lib))
    }

    /// 加载 `mtllib` 引用的材质库；没有引用时返回 `None`
    pub fn load_materials(&self, config: &Config) -> Result<Option<MaterialLibrary>> {
        match self.material_path() {
            Some(path) => MaterialLibrary::parse_file(path, config).map(Some),
            None => Ok(None),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

fn finish_strict(document: ObjDocument, config: &Config) -> Result<ObjDocument> {
    if config.loader.strict && document.diagnostics.has_errors() {
        let errors = document.diagnostics.errors().count();
        return Err(ParseError::Strict { errors }.into());
    }
    Ok(document)
}

/// 单次解析的可变状态
struct ObjParser<'a> {
    config: &'a Config,
    state: ParseState,
    current_material: Option<String>,
    pending_name: Option<String>,
    document: ObjDocument,
}

impl<'a> ObjParser<'a> {
    fn new(source: Option<&Path>, config: &'a Config) -> Self {
        let mut document = ObjDocument::empty(source);
        document.meshes.push(MeshData::new(config.assembly.dedup));
        Self {
            config,
            state: ParseState::BeforeFirstMesh,
            current_material: None,
            pending_name: None,
            document,
        }
    }

    fn location(&self, line_no: usize, line: &str) -> SourceLocation {
        SourceLocation::new(self.document.source.as_deref(), line_no, line.trim_end())
    }

    fn current_mesh(&mut self) -> &mut MeshData {
        if self.document.meshes.is_empty() {
            self.document.meshes.push(MeshData::new(self.config.assembly.dedup));
        }
        let last = self.document.meshes.len() - 1;
        &mut self.document.meshes[last]
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> std::result::Result<(), ParseError> {
        match classify(line) {
            Directive::Vertex => {
                if self.state == ParseState::GeometryEnded {
                    self.start_mesh();
                }
                self.state = ParseState::Accumulating;
                self.add_raw(AttributeKind::Position, line_no, line);
            }
            Directive::TexCoord => {
                self.begin_geometry();
                self.add_raw(AttributeKind::TexCoord, line_no, line);
            }
            Directive::Normal => {
                self.begin_geometry();
                self.add_raw(AttributeKind::Normal, line_no, line);
            }
            Directive::ParamVertex => {
                self.begin_geometry();
                self.add_raw(AttributeKind::Parameter, line_no, line);
            }
            Directive::Face => {
                self.begin_geometry();
                self.add_face(line_no, line)?;
            }
            Directive::Group => self.group(extract_name(line)),
            Directive::UseMaterial => {
                let name = extract_name(line).to_string();
                // 几何已结束时材质留给下一个网格
                if self.state != ParseState::GeometryEnded {
                    self.current_mesh().set_material(name.clone());
                }
                self.current_material = Some(name);
            }
            Directive::MaterialLib => {
                self.document.material_lib = Some(extract_name(line).to_string());
            }
            Directive::Undefined => {}
            other => {
                crate::loader_debug!("line {}: ignoring {:?} in OBJ file", line_no, other);
            }
        }
        Ok(())
    }

    fn begin_geometry(&mut self) {
        if self.state == ParseState::BeforeFirstMesh {
            self.state = ParseState::Accumulating;
        }
    }

    fn group(&mut self, name: &str) {
        if self.current_mesh().is_empty() {
            self.current_mesh().set_name(name);
        } else {
            self.pending_name = Some(name.to_string());
            self.state = ParseState::GeometryEnded;
        }
    }

    fn start_mesh(&mut self) {
        let mut mesh = MeshData::new(self.config.assembly.dedup);
        if let Some(name) = self.pending_name.take() {
            mesh.set_name(name);
        }
        if let Some(material) = &self.current_material {
            mesh.set_material(material.clone());
        }
        crate::loader_debug!(
            "starting mesh #{} ({})",
            self.document.meshes.len(),
            mesh.name().unwrap_or("unnamed")
        );
        self.document.meshes.push(mesh);
    }

    fn add_raw(&mut self, kind: AttributeKind, line_no: usize, line: &str) {
        if !self.document.attribute_order.contains(&kind) {
            self.document.attribute_order.push(kind);
        }

        let (_, args) = split_directive(line);
        let extraction = extract_floats(args);
        if !extraction.rejected.is_empty() {
            let location = self.location(line_no, line);
            self.document.diagnostics.warn(
                DiagnosticKind::MalformedNumber,
                location,
                format!("dropped non-numeric token(s): {}", extraction.rejected.join(", ")),
            );
        }

        let mut values = extraction.values;
        match kind {
            AttributeKind::TexCoord if values.len() == 3 => {
                values.truncate(2);
                let location = self.location(line_no, line);
                self.document.diagnostics.warn(
                    DiagnosticKind::TexcoordTruncated,
                    location,
                    "3-component texcoord truncated to 2 components",
                );
            }
            AttributeKind::Position if values.len() > 4 => {
                values.truncate(3);
                let location = self.location(line_no, line);
                self.document.diagnostics.warn(
                    DiagnosticKind::UnsupportedDirective,
                    location,
                    "vertex colours are not supported, kept x y z",
                );
            }
            _ => {}
        }

        self.document.raw.push(kind, values);
    }

    fn add_face(&mut self, line_no: usize, line: &str) -> std::result::Result<(), ParseError> {
        let location = self.location(line_no, line);
        let (_, args) = split_directive(line);
        let sequence = extract_face_sequence(args);

        for issue in &sequence.issues {
            self.document
                .diagnostics
                .warn(DiagnosticKind::MalformedFaceToken, location.clone(), issue.clone());
        }

        check_declared(&sequence.tuples, &self.document.attribute_order, &location)?;

        let corners = match resolve_corners(&sequence.tuples, &self.document.raw) {
            Ok(corners) => corners,
            Err(e) => {
                self.document.diagnostics.error(
                    DiagnosticKind::FaceDropped,
                    location,
                    format!("face dropped: {}", e),
                );
                return Ok(());
            }
        };

        if !self.current_mesh().matches_layout(&corners[0]) {
            self.document.diagnostics.warn(
                DiagnosticKind::LayoutMismatch,
                location.clone(),
                "face attribute layout differs from the first face of the mesh",
            );
        }

        let frames = self.current_mesh().add_polygon(&corners)?;
        let degenerate = frames.iter().filter(|f| f.degenerate).count();
        if degenerate > 0 {
            self.document.diagnostics.warn(
                DiagnosticKind::DegenerateUv,
                location,
                format!("{} triangle(s) with degenerate UVs, tangent frame set to zero", degenerate),
            );
        }

        Ok(())
    }

    fn finish(mut self) -> ObjDocument {
        for mesh in &mut self.document.meshes {
            mesh.set_mesh_data();
        }
        self.document
    }
}

/// OBJ 格式加载器
pub struct ObjLoader;

impl AssetLoader for ObjLoader {
    type Output = ObjDocument;

    fn load_from_file(path: &Path, config: &Config) -> Result<ObjDocument> {
        ObjDocument::parse_file(path, config)
    }

    fn load_from_memory(data: &[u8], config: &Config) -> Result<ObjDocument> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ParseError::Encoding(e.to_string()))?;
        ObjDocument::parse_str(text, config)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

/// 使用默认配置解析 OBJ 文件并返回其中的网格
pub fn generate_meshes<P: AsRef<Path>>(path: P) -> Result<Vec<MeshData>> {
    ObjDocument::parse_file(path, &Config::default()).map(ObjDocument::into_meshes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DedupStrategy;

    fn parse(text: &str) -> ObjDocument {
        ObjDocument::parse_str(text, &Config::default()).unwrap()
    }

    fn asset(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
    }

    #[test]
    fn test_single_triangle() {
        let doc = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n");

        assert_eq!(doc.meshes().len(), 1);
        let mesh = &doc.meshes()[0];
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.unique_vertex_count(), 3);
        assert_eq!(mesh.element_index(), &[0, 1, 2]);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let doc = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             vn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
             f 1/1/1 2/2/2 3/3/3 4/4/4\n",
        );

        let mesh = &doc.meshes()[0];
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.element_index(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.faces()[0].corner(0), mesh.faces()[1].corner(0));

        let layout = mesh.layout().unwrap();
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.float_count, 16);
    }

    #[test]
    fn test_missing_texcoords_use_fallback() {
        let doc = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
             f 1//1 2//2 3//3\n",
        );

        let mesh = &doc.meshes()[0];
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.vertex_map().iter().all(|v| v.has_normal() && !v.has_texcoord()));
        assert!(mesh.indexed_vertex_data().iter().all(|f| f.is_finite()));
        assert_eq!(doc.diagnostics().count_of(DiagnosticKind::DegenerateUv), 0);
    }

    #[test]
    fn test_out_of_range_face_is_dropped() {
        let doc = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\nf 1 2 9\n");

        assert_eq!(doc.meshes()[0].face_count(), 1);
        let errors: Vec<_> = doc.diagnostics().errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, DiagnosticKind::FaceDropped);
        assert_eq!(errors[0].location.line, 5);
        assert!(errors[0].message.contains("position index 9"));
    }

    #[test]
    fn test_undeclared_attribute_is_fatal() {
        let result = ObjDocument::parse_str(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1/1 2/2 3/3\n",
            &Config::default(),
        );

        match result {
            Err(DistObjError::Parse(ParseError::UndeclaredAttribute { location, kind })) => {
                assert_eq!(kind, AttributeKind::TexCoord);
                assert_eq!(location.line, 4);
            }
            other => panic!("unexpected result: {:?}", other.map(|d| d.meshes().len())),
        }
    }

    #[test]
    fn test_malformed_numbers_are_reported() {
        let doc = parse("v 0 0 0 oops\nv 1 0 0\nv 1 1 0\nf 1 2 3\n");

        assert_eq!(doc.raw().positions().get(1), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(doc.diagnostics().count_of(DiagnosticKind::MalformedNumber), 1);
        assert_eq!(doc.meshes()[0].face_count(), 1);
    }

    #[test]
    fn test_comments_and_unknown_directives() {
        let doc = parse(
            "# header\n\no cube\ns 1\nv 0 0 0\r\nv 1 0 0\r\nv 1 1 0\r\n  f 1 2 3 \r\n",
        );

        assert_eq!(doc.meshes()[0].face_count(), 1);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_groups_split_meshes() {
        let doc = parse(
            "mtllib first.mtl\n\
             g left\nusemtl red\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n\
             g right\n\
             v 2 0 0\nv 3 0 0\nv 3 1 0\nf 4 5 6\n\
             usemtl blue\nf 4 6 5\n\
             mtllib second.mtl\n",
        );

        assert_eq!(doc.meshes().len(), 2);
        let (left, right) = (&doc.meshes()[0], &doc.meshes()[1]);

        assert_eq!(left.name(), Some("left"));
        assert_eq!(left.material(), Some("red"));
        assert_eq!(left.face_count(), 1);

        assert_eq!(right.name(), Some("right"));
        assert_eq!(right.material(), Some("blue"));
        assert_eq!(right.face_count(), 2);
        // 每个网格的索引从 0 开始
        assert_eq!(right.element_index(), &[0, 1, 2, 0, 2, 1]);

        assert_eq!(doc.material_lib(), Some("second.mtl"));
    }

    #[test]
    fn test_usemtl_after_group_belongs_to_next_mesh() {
        let doc = parse(
            "g a\nusemtl red\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n\
             g b\nusemtl blue\n\
             v 2 0 0\nv 3 0 0\nv 3 1 0\nf 4 5 6\n",
        );

        let meshes = doc.meshes();
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[0].name(), Some("a"));
        assert_eq!(meshes[0].material(), Some("red"));
        assert_eq!(meshes[1].name(), Some("b"));
        assert_eq!(meshes[1].material(), Some("blue"));
    }

    #[test]
    fn test_mixed_face_layouts_are_reported() {
        let doc = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\n\
             f 1/1 2/2 3/3\nf 1 2 3\n",
        );

        assert_eq!(doc.meshes()[0].face_count(), 2);
        assert_eq!(doc.diagnostics().count_of(DiagnosticKind::LayoutMismatch), 1);
        assert!(!doc.diagnostics().has_errors());
    }

    #[test]
    fn test_new_mesh_inherits_material() {
        let doc = parse(
            "usemtl stone\nv 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n\
             g next\nv 0 0 1\nv 1 0 1\nv 1 1 1\nf 4 5 6\n",
        );

        assert_eq!(doc.meshes()[1].material(), Some("stone"));
        assert_eq!(doc.meshes()[1].name(), Some("next"));
    }

    #[test]
    fn test_faces_after_group_without_vertices_stay_in_mesh() {
        let doc = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\ng other\nf 1 3 4\n");

        assert_eq!(doc.meshes().len(), 1);
        assert_eq!(doc.meshes()[0].face_count(), 2);
    }

    #[test]
    fn test_texcoord_truncation() {
        let doc = parse("vt 0.5 0.25 0\n");
        assert_eq!(doc.raw().texcoords().get(1), Some(&[0.5, 0.25][..]));
        assert_eq!(doc.diagnostics().count_of(DiagnosticKind::TexcoordTruncated), 1);
    }

    #[test]
    fn test_attribute_order_is_first_seen() {
        let doc = parse("vn 0 0 1\nv 0 0 0\nvt 0 0\nv 1 1 1\nvp 0.5\n");
        assert_eq!(
            doc.attribute_order(),
            &[
                AttributeKind::Normal,
                AttributeKind::Position,
                AttributeKind::TexCoord,
                AttributeKind::Parameter
            ]
        );
    }

    #[test]
    fn test_strict_mode_fails_on_dropped_face() {
        let mut config = Config::default();
        config.loader.strict = true;

        let result = ObjDocument::parse_str("v 0 0 0\nf 1 2 3\n", &config);
        assert!(matches!(
            result,
            Err(DistObjError::Parse(ParseError::Strict { errors: 1 }))
        ));
    }

    #[test]
    fn test_missing_file_yields_empty_document() {
        let doc = ObjDocument::parse_file(asset("does_not_exist.obj"), &Config::default()).unwrap();

        assert!(doc.meshes().is_empty());
        assert_eq!(doc.diagnostics().count_of(DiagnosticKind::FileNotFound), 1);
        assert!(doc.diagnostics().has_errors());
    }

    #[test]
    fn test_strict_mode_missing_file_is_an_error() {
        let mut config = Config::default();
        config.loader.strict = true;

        let result = ObjDocument::parse_file(asset("does_not_exist.obj"), &config);
        assert!(matches!(
            result,
            Err(DistObjError::Parse(ParseError::FileNotFound(ref p))) if p.ends_with("does_not_exist.obj")
        ));
    }

    #[test]
    fn test_linear_and_spatial_dedup_agree() {
        let text = std::fs::read_to_string(asset("quad.obj")).unwrap();
        let mut config = Config::default();

        config.assembly.dedup = DedupStrategy::Linear;
        let linear = ObjDocument::parse_str(&text, &config).unwrap();
        config.assembly.dedup = DedupStrategy::Spatial;
        let spatial = ObjDocument::parse_str(&text, &config).unwrap();

        for (a, b) in linear.meshes().iter().zip(spatial.meshes()) {
            assert_eq!(a.element_index(), b.element_index());
        }
    }

    #[test]
    fn test_fixture_and_material_path() {
        let doc = ObjDocument::parse_file(asset("quad.obj"), &Config::default()).unwrap();

        assert_eq!(doc.meshes().len(), 1);
        assert_eq!(doc.meshes()[0].face_count(), 2);
        assert_eq!(doc.material_path(), Some(asset("quad.mtl")));

        let library = doc.load_materials(&Config::default()).unwrap().unwrap();
        assert!(library.get("checker").is_some());
    }

    #[test]
    fn test_load_from_memory_rejects_invalid_utf8() {
        let result = ObjLoader::load_from_memory(&[b'v', b' ', 0xff, 0xfe], &Config::default());
        assert!(matches!(result, Err(DistObjError::Parse(ParseError::Encoding(_)))));
    }

    #[test]
    fn test_generate_meshes() {
        let meshes = generate_meshes(asset("quad.obj")).unwrap();
        assert_eq!(meshes.len(), 1);
        assert!(meshes[0].validate().is_ok());
    }
}
