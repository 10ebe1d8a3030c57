//! 数字提取
//!
//! - [`extract_floats`]：空白分隔的浮点数，无法解析的记号被丢弃
//! - [`extract_face_sequence`]：`i`、`i/j`、`i/j/k`、`i//k` 形式的面索引元组
//!
//! 两者都是宽松的：问题记录在返回值里，由调用方写入诊断信息。

/// 浮点提取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatExtraction {
    pub values: Vec<f32>,
    /// 被丢弃的记号（非数字、溢出或非有限值）
    pub rejected: Vec<String>,
}

/// 从指令之后的文本中提取浮点数
///
/// `args` 不应包含指令记号本身。
pub fn extract_floats(args: &str) -> FloatExtraction {
    let mut extraction = FloatExtraction::default();
    for token in args.split_whitespace() {
        match token.parse::<f32>() {
            Ok(value) if value.is_finite() => extraction.values.push(value),
            _ => extraction.rejected.push(token.to_string()),
        }
    }
    extraction
}

/// 面索引提取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceSequence {
    /// 每个角点一个元组，长度都等于第一个角点的槽位数
    pub tuples: Vec<Vec<usize>>,
    /// 被修正的问题（异常字符、槽位数不一致）
    pub issues: Vec<String>,
}

impl FaceSequence {
    /// 元组宽度（第一个角点的槽位数）
    pub fn width(&self) -> usize {
        self.tuples.first().map_or(0, Vec::len)
    }
}

/// 从指令之后的文本中提取面索引元组
///
/// 索引从 1 开始；缺失的槽位（如 `1//3` 中间的槽位）为 0，表示“不存在”。
/// 元组宽度由第一个角点决定，之后的角点按该宽度补 0 或截断。
pub fn extract_face_sequence(args: &str) -> FaceSequence {
    let mut sequence = FaceSequence::default();
    let mut width: Option<usize> = None;

    for group in args.split_whitespace() {
        let mut tuple: Vec<usize> = group
            .split('/')
            .map(|part| digits_to_index(part, &mut sequence.issues))
            .collect();

        let expected = *width.get_or_insert(tuple.len());
        if tuple.len() != expected {
            sequence.issues.push(format!(
                "corner `{}` has {} slots, expected {}",
                group,
                tuple.len(),
                expected
            ));
            tuple.resize(expected, 0);
        }

        sequence.tuples.push(tuple);
    }

    sequence
}

/// 按位权求和把数字字符转换为索引
///
/// 非数字字符被忽略并记录；没有数字时为 0。
/// 超出 `usize` 的值饱和到 `usize::MAX`，随后必然被判定为越界。
fn digits_to_index(part: &str, issues: &mut Vec<String>) -> usize {
    let mut digits: Vec<usize> = Vec::with_capacity(part.len());
    for ch in part.chars() {
        match ch.to_digit(10) {
            Some(d) => digits.push(d as usize),
            None => issues.push(format!("ignored non-digit character `{}` in `{}`", ch, part)),
        }
    }

    let count = digits.len();
    digits.iter().enumerate().fold(0usize, |total, (n, &digit)| {
        let nth = (count - 1 - n) as u32;
        let weight = 10usize.saturating_pow(nth);
        total.saturating_add(digit.saturating_mul(weight))
    })
}
