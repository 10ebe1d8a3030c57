//! DistObj 命令行工具
//!
//! 加载一个 OBJ 文件（以及它引用的 MTL 材质库），输出网格和材质摘要。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件 dist_obj.toml（不存在时使用默认配置）
//! cargo run -- assets/quad.obj
//!
//! # 命令行覆盖
//! cargo run -- assets/quad.obj --strict --linear-dedup --log-level debug
//! ```
//!
//! # 命令行参数
//!
//! - `--strict`: 出现错误级诊断时失败
//! - `--no-mtl`: 不加载材质库
//! - `--linear-dedup`: 使用线性扫描去重
//! - `--orthonormalize`: 导出 GPU 顶点时正交化切线
//! - `--log-level <level>`: 日志级别

use std::path::PathBuf;

use anyhow::{bail, Context};
use dist_obj::core::{log, Config};
use dist_obj::geometry::loaders::ObjDocument;
use dist_obj::geometry::TextureRole;
use dist_obj::{app_error, app_info};

/// 取第一个不是选项（也不是 `--log-level` 取值）的参数作为输入文件
fn input_path(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args.iter().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--log-level" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn run(config: &Config, path: PathBuf) -> anyhow::Result<()> {
    let document = ObjDocument::parse_file(&path, config)
        .with_context(|| format!("failed to load {}", path.display()))?;
    document.diagnostics().log_all();

    println!("{}", path.display());
    if let Some(lib) = document.material_lib() {
        println!("  mtllib: {}", lib);
    }
    println!(
        "  raw: {} positions, {} texcoords, {} normals, {} parameter vertices",
        document.raw().positions().len(),
        document.raw().texcoords().len(),
        document.raw().normals().len(),
        document.raw().parameters().len()
    );

    for (i, mesh) in document.meshes().iter().enumerate() {
        println!(
            "  mesh #{} {:?} material={:?}: {} triangles, {} unique vertices, {} indices",
            i,
            mesh.name().unwrap_or("unnamed"),
            mesh.material().unwrap_or("none"),
            mesh.face_count(),
            mesh.unique_vertex_count(),
            mesh.index_count()
        );
        if let Some(layout) = mesh.layout() {
            println!(
                "    layout: stride={} uv_offset={} normal_offset={} floats={}",
                layout.stride, layout.uv_offset, layout.normal_offset, layout.float_count
            );
        }
        if let Err(e) = mesh.validate() {
            bail!("mesh #{} failed validation: {}", i, e);
        }

        let gpu = mesh.gpu_vertices(config.assembly.orthonormalize_tangents);
        println!(
            "    gpu: {} vertex bytes, {} index bytes",
            dist_obj::geometry::vertex::vertex_bytes(&gpu).len(),
            mesh.index_bytes().len()
        );
    }

    if config.loader.load_materials {
        if let Some(library) = document
            .load_materials(config)
            .context("failed to load material library")?
        {
            library.diagnostics().log_all();
            for material in library.iter() {
                let textures: Vec<String> = [
                    TextureRole::Diffuse,
                    TextureRole::Bump,
                    TextureRole::Normal,
                    TextureRole::Specular,
                    TextureRole::Transparency,
                ]
                .iter()
                .filter_map(|role| material.texture(*role).map(|t| format!("{}={}", role.name(), t)))
                .collect();
                println!("  material {:?}: {}", material.name(), textures.join(", "));
            }
        }
    }

    let diagnostics = document.diagnostics();
    println!(
        "  diagnostics: {} error(s), {} warning(s)",
        diagnostics.errors().count(),
        diagnostics.warnings().count()
    );

    Ok(())
}

fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("dist_obj.toml");

    // 2. 应用命令行参数
    let args: Vec<String> = std::env::args().collect();
    config.apply_args(&args);

    // 3. 验证配置
    config.validate().context("invalid configuration")?;

    // 4. 初始化日志系统
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    app_info!(version = env!("CARGO_PKG_VERSION"), dedup = config.assembly.dedup.name(), "DistObj starting");

    let Some(path) = input_path(&args) else {
        app_error!("no input file given");
        bail!("usage: dist_obj <file.obj> [--strict] [--no-mtl] [--linear-dedup] [--orthonormalize] [--log-level <level>]");
    };

    run(&config, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_path_skips_options() {
        let parsed = input_path(&args(&["dist_obj", "--log-level", "debug", "--strict", "model.obj"]));
        assert_eq!(parsed, Some(PathBuf::from("model.obj")));
    }

    #[test]
    fn test_input_path_missing() {
        assert_eq!(input_path(&args(&["dist_obj", "--strict"])), None);
    }
}
