use chrono::NaiveDate;
use serde::Serialize;

/// 文章链接信息
///
/// 只包含生成文章地址所需的字段，用于上一篇/下一篇导航。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostLink {
    pub published_on: NaiveDate,
    pub slug: String,
    pub title: String,
}
