//! 模型加载器模块
//!
//! 提供统一的加载接口和 OBJ/MTL 的具体实现。
//!
//! # 支持的格式
//!
//! - **OBJ**: Wavefront OBJ 几何（`v`、`vt`、`vn`、`vp`、`f`、`g`、`usemtl`、`mtllib`）
//! - **MTL**: Wavefront 材质库
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use dist_obj::core::Config;
//! use dist_obj::geometry::loaders::{AssetLoader, ObjLoader};
//! use std::path::Path;
//!
//! let document = ObjLoader::load_from_file(Path::new("model.obj"), &Config::default())?;
//! for mesh in document.meshes() {
//!     println!("{:?}: {} triangles", mesh.name(), mesh.face_count());
//! }
//! # Ok::<(), dist_obj::core::DistObjError>(())
//! ```

use std::path::Path;

use crate::core::config::Config;
use crate::core::error::{ParseError, Result};

pub mod directive;
pub mod numeric;
pub mod obj_loader;
pub mod mtl_loader;

// 重新导出加载器
pub use mtl_loader::{generate_materials, MaterialLibrary, MtlLoader};
pub use obj_loader::{generate_meshes, ObjDocument, ObjLoader};

/// 资源加载器 trait
///
/// 所有格式的加载器都实现此 trait。加载器本身无状态，
/// 每次调用产生一个独立的解析结果。
pub trait AssetLoader {
    /// 解析结果
    type Output;

    /// 从文件路径加载
    ///
    /// # 错误
    ///
    /// - 读取失败（文件不存在除外，见各实现）
    /// - 文本不是 UTF-8
    /// - 不可恢复的解析错误，或严格模式下出现错误级诊断
    fn load_from_file(path: &Path, config: &Config) -> Result<Self::Output>;

    /// 从内存数据加载
    fn load_from_memory(data: &[u8], config: &Config) -> Result<Self::Output>;

    /// 支持的文件扩展名（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 按扩展名加载出的资源
#[derive(Debug)]
pub enum Asset {
    Obj(ObjDocument),
    Mtl(MaterialLibrary),
}

/// 根据文件扩展名选择合适的加载器
pub fn load_asset(path: &Path, config: &Config) -> Result<Asset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            ParseError::UnsupportedFormat(format!(
                "cannot determine file extension: {}",
                path.display()
            ))
        })?;

    if ObjLoader::supported_extensions().contains(&extension.as_str()) {
        ObjLoader::load_from_file(path, config).map(Asset::Obj)
    } else if MtlLoader::supported_extensions().contains(&extension.as_str()) {
        MtlLoader::load_from_file(path, config).map(Asset::Mtl)
    } else {
        Err(ParseError::UnsupportedFormat(format!("unsupported file format: .{}", extension)).into())
    }
}
