//! 几何体加载和处理模块
//!
//! 从 OBJ/MTL 文本构建可直接上传到GPU的索引网格。
//!
//! # 模块结构
//!
//! - `raw`: 原始属性表（`v`/`vt`/`vn`/`vp`）
//! - `vertex`: 顶点记录和 GPU 顶点
//! - `triangulate`: 面索引解析和扇形三角化
//! - `dedup`: 顶点去重索引
//! - `mesh`: 网格组装器
//! - `material`: 材质数据
//! - `loaders`: OBJ/MTL 加载器
//!
//! # 数据流
//!
//! ```text
//! 文本行
//!     ↓
//! 行分类 (directive)
//!     ↓                       ↓
//! 数字提取 → 原始属性表    面三角化 → 顶点记录
//!                             ↓
//!                  MeshData（去重 + 切线累加）
//!                             ↓
//!                  交错/索引缓冲（交给渲染端）
//! ```

pub mod raw;
pub mod vertex;
pub mod triangulate;
pub mod dedup;
pub mod mesh;
pub mod material;
pub mod loaders;

// 重新导出常用类型
pub use material::{MaterialData, MaterialProperty, TextureRole};
pub use mesh::{MeshData, MeshLayout};
pub use raw::{AttributeKind, RawAttributeStore, RawAttributeTable};
pub use triangulate::Face;
pub use vertex::{GpuVertex, VertexRecord};
