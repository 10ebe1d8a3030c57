//! MTL 文件加载器
//!
//! 与 OBJ 解析共用行分类和数字提取，产出按 `newmtl` 名称索引的材质表。
//! 纹理只记录文件名。

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use super::directive::{classify, extract_name, split_directive, Directive};
use super::numeric::extract_floats;
use super::AssetLoader;
use crate::core::config::Config;
use crate::core::diagnostics::{DiagnosticKind, Diagnostics, SourceLocation};
use crate::core::error::{DistObjError, ParseError, Result};
use crate::geometry::material::{MaterialData, MaterialProperty, TextureRole};
use crate::math::Vector3;

/// 一个 MTL 文件解析出的材质表
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    source: Option<PathBuf>,
    materials: HashMap<String, MaterialData>,
    /// `newmtl` 出现的顺序
    order: Vec<String>,
    diagnostics: Diagnostics,
}

impl MaterialLibrary {
    /// 从文件解析
    ///
    /// 文件不存在时返回空的材质表，并在诊断信息中记录 `FileNotFound`
    /// （严格模式下返回 `ParseError::FileNotFound`）。
    pub fn parse_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                crate::loader_warn!("MTL file not found: {}", path.display());
                if config.loader.strict {
                    return Err(ParseError::FileNotFound(path.to_path_buf()).into());
                }
                let mut library = Self {
                    source: Some(path.to_path_buf()),
                    ..Self::default()
                };
                library.diagnostics.error(
                    DiagnosticKind::FileNotFound,
                    SourceLocation::whole_file(path),
                    format!("unable to open mtl file: {}", path.display()),
                );
                return Ok(library);
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse_reader(BufReader::new(file), Some(path), config)
    }

    pub fn parse_str(text: &str, config: &Config) -> Result<Self> {
        Self::parse_reader(text.as_bytes(), None, config)
    }

    pub fn parse_reader<R: BufRead>(reader: R, source: Option<&Path>, config: &Config) -> Result<Self> {
        let mut parser = MtlParser {
            library: Self {
                source: source.map(Path::to_path_buf),
                ..Self::default()
            },
            current: None,
        };

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| match e.kind() {
                ErrorKind::InvalidData => DistObjError::Parse(ParseError::Encoding(format!(
                    "line {}: {}",
                    i + 1,
                    e
                ))),
                _ => DistObjError::Io(e),
            })?;
            parser.parse_line(i + 1, &line);
        }

        let library = parser.library;
        crate::loader_info!(
            "Loaded MTL {}: {} material(s), {} diagnostic(s)",
            library
                .source
                .as_ref()
                .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string()),
            library.len(),
            library.diagnostics.len()
        );

        library.finish_strict(config)
    }

    fn finish_strict(self, config: &Config) -> Result<Self> {
        if config.loader.strict && self.diagnostics.has_errors() {
            let errors = self.diagnostics.errors().count();
            return Err(ParseError::Strict { errors }.into());
        }
        Ok(self)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&MaterialData> {
        self.materials.get(name)
    }

    /// 按定义顺序遍历材质
    pub fn iter(&self) -> impl Iterator<Item = &MaterialData> {
        self.order.iter().filter_map(|name| self.materials.get(name))
    }

    pub fn materials(&self) -> &HashMap<String, MaterialData> {
        &self.materials
    }

    pub fn into_materials(self) -> HashMap<String, MaterialData> {
        self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// 单次解析的可变状态
struct MtlParser {
    library: MaterialLibrary,
    /// 当前 `newmtl` 的名称
    current: Option<String>,
}

impl MtlParser {
    fn location(&self, line_no: usize, line: &str) -> SourceLocation {
        SourceLocation::new(self.library.source.as_deref(), line_no, line.trim_end())
    }

    fn parse_line(&mut self, line_no: usize, line: &str) {
        let directive = classify(line);
        match directive {
            Directive::Undefined => return,
            Directive::NewMaterial => {
                let name = extract_name(line).to_string();
                if self
                    .library
                    .materials
                    .insert(name.clone(), MaterialData::new(name.clone()))
                    .is_none()
                {
                    self.library.order.push(name.clone());
                }
                self.current = Some(name);
                return;
            }
            Directive::MapAmbient | Directive::MapSpecularExponent | Directive::Decal => {
                let location = self.location(line_no, line);
                self.library.diagnostics.warn(
                    DiagnosticKind::UnsupportedDirective,
                    location,
                    format!("{:?} maps are not supported", directive),
                );
                return;
            }
            Directive::Vertex
            | Directive::TexCoord
            | Directive::Normal
            | Directive::ParamVertex
            | Directive::Face
            | Directive::Group
            | Directive::UseMaterial
            | Directive::MaterialLib => {
                crate::loader_debug!("line {}: ignoring {:?} in MTL file", line_no, directive);
                return;
            }
            _ => {}
        }

        let location = self.location(line_no, line);
        let Some(material) = self
            .current
            .as_ref()
            .and_then(|name| self.library.materials.get_mut(name))
        else {
            self.library.diagnostics.warn(
                DiagnosticKind::MissingMaterial,
                location,
                "material property before any newmtl",
            );
            return;
        };
        let diagnostics = &mut self.library.diagnostics;

        match directive {
            Directive::Ambient | Directive::Diffuse | Directive::Specular | Directive::Dissolve => {
                let (_, args) = split_directive(line);
                let extraction = extract_floats(args);
                if !extraction.rejected.is_empty() {
                    diagnostics.warn(
                        DiagnosticKind::MalformedNumber,
                        location,
                        format!("dropped non-numeric token(s): {}", extraction.rejected.join(", ")),
                    );
                }

                let property = match directive {
                    Directive::Ambient => MaterialProperty::Ambient,
                    Directive::Diffuse => MaterialProperty::Diffuse,
                    Directive::Specular => MaterialProperty::Specular,
                    _ => MaterialProperty::Dissolve,
                };
                if let (MaterialProperty::Specular, [r, g, b, ..]) = (property, extraction.values.as_slice()) {
                    material.set_specular_color(Vector3::new(*r, *g, *b));
                }
                material.set_data(property, extraction.values);
            }
            Directive::SpecularExponent => {
                let (_, args) = split_directive(line);
                let extraction = extract_floats(args);
                match extraction.values.first() {
                    Some(value) => material.set_specular_dampening(*value),
                    None => diagnostics.warn(
                        DiagnosticKind::MalformedNumber,
                        location,
                        "Ns without a numeric value",
                    ),
                }
            }
            Directive::MapDiffuse => material.set_texture(TextureRole::Diffuse, extract_name(line)),
            Directive::MapSpecular => material.set_texture(TextureRole::Specular, extract_name(line)),
            Directive::MapDissolve => {
                material.set_texture(TextureRole::Transparency, extract_name(line))
            }
            Directive::Displacement => material.set_texture(TextureRole::Normal, extract_name(line)),
            Directive::MapBump => {
                let bump = parse_bump(extract_name(line));
                if let Some(filename) = bump.filename {
                    material.set_texture(TextureRole::Bump, filename);
                }
                match bump.intensity {
                    Some(Ok(value)) => material.set_bump_value(value),
                    Some(Err(token)) => diagnostics.warn(
                        DiagnosticKind::BumpIntensity,
                        location,
                        format!("invalid -bm intensity `{}`", token),
                    ),
                    None => {}
                }
            }
            _ => {}
        }
    }
}

/// `map_bump` / `bump` 的参数
#[derive(Debug, Clone, PartialEq)]
struct BumpArgs {
    filename: Option<String>,
    /// `-bm` 之后的值；解析失败时保留原始记号
    intensity: Option<std::result::Result<f32, String>>,
}

/// 解析凹凸贴图参数
///
/// `-bm <value>` 可以出现在文件名之前或之后；文件名内部的空白原样保留。
fn parse_bump(args: &str) -> BumpArgs {
    // 两侧补空格，使行首和行尾的 `-bm` 也能按 " -bm " 切分
    let padded = format!(" {} ", args.trim());
    let Some((before, after)) = padded.split_once(" -bm ") else {
        return BumpArgs {
            filename: non_empty(padded.trim()),
            intensity: None,
        };
    };

    let after = after.trim_start();
    let (value, rest) = after.split_once(char::is_whitespace).unwrap_or((after, ""));
    let intensity = value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| value.to_string());

    let filename = match (before.trim(), rest.trim()) {
        ("", rest) => non_empty(rest),
        (before, _) => non_empty(before),
    };

    BumpArgs {
        filename,
        intensity: Some(intensity),
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// MTL 格式加载器
pub struct MtlLoader;

impl AssetLoader for MtlLoader {
    type Output = MaterialLibrary;

    fn load_from_file(path: &Path, config: &Config) -> Result<MaterialLibrary> {
        MaterialLibrary::parse_file(path, config)
    }

    fn load_from_memory(data: &[u8], config: &Config) -> Result<MaterialLibrary> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ParseError::Encoding(e.to_string()))?;
        MaterialLibrary::parse_str(text, config)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["mtl"]
    }
}

/// 使用默认配置解析 MTL 文件并返回材质表
pub fn generate_materials<P: AsRef<Path>>(path: P) -> Result<HashMap<String, MaterialData>> {
    MaterialLibrary::parse_file(path, &Config::default()).map(MaterialLibrary::into_materials)
}
