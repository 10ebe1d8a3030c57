/// OBJ 模型加载示例
///
/// 演示如何使用 dist_obj 加载 OBJ 文件并取得可上传到 GPU 的缓冲。
///
/// 运行方式：
/// ```
/// cargo run --example load_obj
/// ```

use dist_obj::core::Config;
use dist_obj::geometry::loaders::{AssetLoader, ObjLoader};
use dist_obj::geometry::vertex::vertex_bytes;
use std::path::Path;

fn main() {
    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== DistObj OBJ 加载器示例 ===\n");

    let obj_path = Path::new("assets/quad.obj");
    let config = Config::default();

    println!("正在加载: {}", obj_path.display());

    let document = match ObjLoader::load_from_file(obj_path, &config) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("\n✗ 加载失败: {}", e);
            std::process::exit(1);
        }
    };

    document.diagnostics().log_all();
    println!("\n✓ 加载成功！共 {} 个网格\n", document.meshes().len());

    for mesh in document.meshes() {
        println!("网格 {:?}（材质 {:?}）:", mesh.name().unwrap_or("unnamed"), mesh.material());
        println!("  三角形数: {}", mesh.face_count());
        println!("  唯一顶点数: {}", mesh.unique_vertex_count());
        println!("  索引: {:?}", mesh.element_index());

        let vertices = mesh.indexed_vertex_data();
        // 位置+UV+法线之后紧跟切线和副切线各 3 个分量
        let stride = mesh.layout().map_or(0, |l| l.stride / 4 + 6);
        if stride > 6 {
            for (i, chunk) in vertices.chunks(stride).take(4).enumerate() {
                println!("  顶点 {}: {:?}", i, chunk);
            }
        }

        let gpu = mesh.gpu_vertices(true);
        println!("  GPU 顶点缓冲: {} 字节", vertex_bytes(&gpu).len());
        println!("  GPU 索引缓冲: {} 字节\n", mesh.index_bytes().len());
    }

    match document.load_materials(&config) {
        Ok(Some(library)) => {
            for material in library.iter() {
                println!("材质 {}: diffuse_map={:?} bump={}",
                    material.name(),
                    material.texture(dist_obj::geometry::TextureRole::Diffuse),
                    material.bump_value());
            }
        }
        Ok(None) => println!("未引用材质库"),
        Err(e) => eprintln!("材质加载失败: {}", e),
    }
}
