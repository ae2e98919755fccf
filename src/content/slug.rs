use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// 生成文章 slug
///
/// 若 `suggested` 存在且去除空白后非空，则原样返回；否则从 `title` 推导：
///
/// 1. 转为小写并做 NFD 分解
/// 2. 去掉组合附加符号以及除 ASCII 单词字符 (`[A-Za-z0-9_]`) 和 ASCII 空白之外的所有字符
/// 3. 连续的空白或 `-` 合并为一个 `-`，去掉首尾分隔
///
/// ```
/// use euregjug_site::content::generate_slug;
///
/// assert_eq!(generate_slug(None, "Hello, Wörld!"), "hello-world");
/// assert_eq!(generate_slug(Some("custom"), "Hello"), "custom");
/// ```
pub fn generate_slug(suggested: Option<&str>, title: &str) -> String {
    if let Some(slug) = suggested.filter(|s| !s.trim().is_empty()) {
        return slug.to_string();
    }

    let cleaned: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| is_word(*c) || is_space(*c))
        .collect();

    cleaned
        .split(|c: char| is_space(c) || c == '-')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// 与 ASCII `\s` 一致，包含垂直制表符
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
}
