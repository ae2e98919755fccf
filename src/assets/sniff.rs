use std::io;

/// 无法识别时使用的 MIME 类型
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// MIME 类型识别
///
/// 识别可能失败（例如实现需要访问外部资源），调用方应当容忍错误。
pub trait ContentTypeDetector: Send + Sync {
    fn detect(&self, data: &[u8], filename: &str) -> io::Result<String>;
}

/// 依次根据文件头、扩展名和内容编码识别 MIME 类型
///
/// 1. 文件头魔数（[`infer`]）
/// 2. 文件扩展名（[`mime_guess`]）
/// 3. 合法 UTF-8 且不含 NUL 的内容视为 `text/plain`
/// 4. 其余情况为 [`DEFAULT_CONTENT_TYPE`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffingDetector;

impl ContentTypeDetector for SniffingDetector {
    fn detect(&self, data: &[u8], filename: &str) -> io::Result<String> {
        if let Some(kind) = infer::get(data) {
            return Ok(kind.mime_type().to_string());
        }

        if let Some(mime) = mime_guess::from_path(filename).first_raw() {
            return Ok(mime.to_string());
        }

        if !data.is_empty() && !data.contains(&0) && std::str::from_utf8(data).is_ok() {
            return Ok("text/plain".to_string());
        }

        Ok(DEFAULT_CONTENT_TYPE.to_string())
    }
}
