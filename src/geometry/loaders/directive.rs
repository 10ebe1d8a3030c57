//! 行分类
//!
//! 根据行首第一个记号把一行 OBJ/MTL 文本映射到指令类型。
//! 空行、注释行（`#`）以及未识别的前缀（`s`、`o`、`l` 等）都归为
//! [`Directive::Undefined`]，由调用方跳过。

/// 指令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    // ---- OBJ ----
    /// `v`
    Vertex,
    /// `vt`
    TexCoord,
    /// `vn`
    Normal,
    /// `vp`
    ParamVertex,
    /// `f`
    Face,
    /// `g`
    Group,
    /// `usemtl`
    UseMaterial,
    /// `mtllib`
    MaterialLib,

    // ---- MTL ----
    /// `newmtl`
    NewMaterial,
    /// `Ka`
    Ambient,
    /// `Kd`
    Diffuse,
    /// `Ks`
    Specular,
    /// `Ns`
    SpecularExponent,
    /// `d` / `Tr` / `Tf`
    Dissolve,
    /// `map_Ka`
    MapAmbient,
    /// `map_Kd`
    MapDiffuse,
    /// `map_Ks`
    MapSpecular,
    /// `map_Ns`
    MapSpecularExponent,
    /// `map_d`
    MapDissolve,
    /// `map_bump` / `bump`
    MapBump,
    /// `disp`
    Displacement,
    /// `decal`
    Decal,

    Undefined,
}

impl Directive {
    /// 由指令记号得到类型
    pub fn from_token(token: &str) -> Self {
        match token {
            "v" => Directive::Vertex,
            "vt" => Directive::TexCoord,
            "vn" => Directive::Normal,
            "vp" => Directive::ParamVertex,
            "f" => Directive::Face,
            "g" => Directive::Group,
            "usemtl" => Directive::UseMaterial,
            "mtllib" => Directive::MaterialLib,
            "newmtl" => Directive::NewMaterial,
            "Ka" => Directive::Ambient,
            "Kd" => Directive::Diffuse,
            "Ks" => Directive::Specular,
            "Ns" => Directive::SpecularExponent,
            "d" | "Tr" | "Tf" => Directive::Dissolve,
            "map_Ka" => Directive::MapAmbient,
            "map_Kd" => Directive::MapDiffuse,
            "map_Ks" => Directive::MapSpecular,
            "map_Ns" => Directive::MapSpecularExponent,
            "map_d" => Directive::MapDissolve,
            "map_bump" | "bump" => Directive::MapBump,
            "disp" => Directive::Displacement,
            "decal" => Directive::Decal,
            _ => Directive::Undefined,
        }
    }
}

/// 去掉行首空白和行尾的 `\r`/空白
#[inline]
pub fn clean_line(line: &str) -> &str {
    line.trim()
}

/// 拆分为 (指令记号, 其余文本)
///
/// 其余文本去掉了两端空白，内部空白保持原样。
pub fn split_directive(line: &str) -> (&str, &str) {
    let line = clean_line(line);
    match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (line, ""),
    }
}

/// 对一行文本分类
pub fn classify(line: &str) -> Directive {
    let (token, _) = split_directive(line);
    if token.is_empty() || token.starts_with('#') {
        return Directive::Undefined;
    }
    Directive::from_token(token)
}

/// 指令记号之后的名称（组名、材质名、文件名）
///
/// 名称中可以包含空格。
pub fn extract_name(line: &str) -> &str {
    split_directive(line).1
}
