//! 材质数据模块
//!
//! MTL 文件中 `newmtl` 定义的一组材质属性。
//! 与网格之间只通过材质名（`usemtl`）关联。
//! 纹理只记录文件名，解码和上传由渲染端负责。

use std::collections::HashMap;

use crate::math::Vector3;

/// 以向量形式存储的材质属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialProperty {
    /// `Ka`
    Ambient,
    /// `Kd`
    Diffuse,
    /// `Ks`
    Specular,
    /// `d` / `Tr` / `Tf`
    Dissolve,
}

/// 纹理的用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    /// `map_Kd`
    Diffuse,
    /// `map_bump` / `bump`
    Bump,
    /// `disp`
    Normal,
    /// `map_Ks`
    Specular,
    /// `map_d`
    Transparency,
}

impl TextureRole {
    pub fn name(&self) -> &'static str {
        match self {
            TextureRole::Diffuse => "diffuse",
            TextureRole::Bump => "bump",
            TextureRole::Normal => "normal",
            TextureRole::Specular => "specular",
            TextureRole::Transparency => "transparency",
        }
    }
}

/// 材质数据
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    name: String,
    properties: HashMap<MaterialProperty, Vec<f32>>,
    textures: HashMap<TextureRole, String>,

    bump_value: f32,
    specular_value: f32,
    specular_color: Vector3,
    specular_dampening: f32,
    default_diffuse_color: Vector3,
    global_transparency: f32,
    specular_ignores_transparency: bool,
}

impl MaterialData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            textures: HashMap::new(),
            bump_value: 0.5,
            specular_value: 0.5,
            specular_color: Vector3::new(1.0, 1.0, 1.0),
            specular_dampening: 10.0,
            default_diffuse_color: Vector3::new(0.5, 0.5, 0.5),
            global_transparency: 0.0,
            specular_ignores_transparency: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置向量属性（按文件中的分量原样保存）
    pub fn set_data(&mut self, property: MaterialProperty, values: Vec<f32>) {
        self.properties.insert(property, values);
    }

    /// 向量属性；未设置时为 `[0, 0, 0, 0]`
    pub fn data(&self, property: MaterialProperty) -> Vec<f32> {
        self.properties
            .get(&property)
            .cloned()
            .unwrap_or_else(|| vec![0.0; 4])
    }

    pub fn has_data(&self, property: MaterialProperty) -> bool {
        self.properties.contains_key(&property)
    }

    /// 记录纹理文件名
    pub fn set_texture(&mut self, role: TextureRole, filename: impl Into<String>) {
        self.textures.insert(role, filename.into());
    }

    pub fn texture(&self, role: TextureRole) -> Option<&str> {
        self.textures.get(&role).map(String::as_str)
    }

    /// 该用途的贴图是否启用
    pub fn map_enabled(&self, role: TextureRole) -> bool {
        self.textures.contains_key(&role)
    }

    /// 凹凸强度，限制在 [0, 1]
    pub fn set_bump_value(&mut self, value: f32) {
        self.bump_value = value.clamp(0.0, 1.0);
    }

    pub fn bump_value(&self) -> f32 {
        self.bump_value
    }

    /// 高光强度，限制在 [0, 1]
    pub fn set_specular_value(&mut self, value: f32) {
        self.specular_value = value.clamp(0.0, 1.0);
    }

    pub fn specular_value(&self) -> f32 {
        self.specular_value
    }

    pub fn set_specular_color(&mut self, color: Vector3) {
        self.specular_color = color;
    }

    pub fn specular_color(&self) -> Vector3 {
        self.specular_color
    }

    /// 高光指数，负值取 0
    pub fn set_specular_dampening(&mut self, value: f32) {
        self.specular_dampening = value.max(0.0);
    }

    pub fn specular_dampening(&self) -> f32 {
        self.specular_dampening
    }

    pub fn set_default_diffuse_color(&mut self, color: Vector3) {
        self.default_diffuse_color = color;
    }

    pub fn default_diffuse_color(&self) -> Vector3 {
        self.default_diffuse_color
    }

    /// 整体透明度，限制在 [0, 1]
    pub fn set_global_transparency(&mut self, value: f32) {
        self.global_transparency = value.clamp(0.0, 1.0);
    }

    pub fn global_transparency(&self) -> f32 {
        self.global_transparency
    }

    pub fn set_specular_ignores_transparency(&mut self, ignores: bool) {
        self.specular_ignores_transparency = ignores;
    }

    pub fn specular_ignores_transparency(&self) -> bool {
        self.specular_ignores_transparency
    }
}
