//! DistObj - Wavefront OBJ/MTL 加载器
//!
//! 将 OBJ/MTL 文本解析为去重后的索引顶点缓冲，并计算法线贴图所需的切线空间。
//! 只负责 CPU 侧的数据准备，GPU 资源由渲染端自行管理。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理、诊断信息）
//! - `math`: nalgebra 类型别名和切线空间计算
//! - `geometry`: 原始属性表、顶点记录、三角化、网格组装、材质和加载器
//!
//! # 使用示例
//!
//! ```no_run
//! use dist_obj::core::Config;
//! use dist_obj::geometry::loaders::ObjDocument;
//!
//! let config = Config::default();
//! let document = ObjDocument::parse_file("model.obj", &config)?;
//! document.diagnostics().log_all();
//!
//! for mesh in document.meshes() {
//!     let vertices = mesh.indexed_vertex_data();
//!     let indices = mesh.element_index();
//!     println!("{} floats, {} indices", vertices.len(), indices.len());
//! }
//! # Ok::<(), dist_obj::core::DistObjError>(())
//! ```

pub mod core;
pub mod math;
pub mod geometry;
