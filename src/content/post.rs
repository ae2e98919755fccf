use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::generate_slug;
use crate::error::{Error, Result};

/// 标题与 slug 的最大长度（字符数）
pub const MAX_TEXT_LEN: usize = 512;

/// 文章正文格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_format", rename_all = "lowercase")]
pub enum Format {
    #[default]
    Asciidoc,
    Markdown,
}

/// 文章状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "post_status", rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Published,
    Hidden,
}

/// 博客文章
///
/// `(published_on, slug)` 在所有文章中唯一，相等性也只按这两个字段判断。
/// 每次写入数据库前都必须调用 [`Post::prepare_for_write`]，由它补全 slug 并维护时间戳。
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// 主键，首次写入前为 `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i32>,
    pub(crate) published_on: NaiveDate,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) slug: String,
    pub title: String,
    pub content: String,
    pub format: Format,
    pub status: Status,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub locale: String,
    #[serde(skip)]
    pub(crate) created_at: Option<DateTime<Local>>,
    #[serde(skip)]
    pub(crate) updated_at: Option<DateTime<Local>>,
}

impl Post {
    /// 创建一篇草稿
    ///
    /// `slug` 可以为空，此时会在写入时根据标题生成。
    pub fn new(
        published_on: NaiveDate,
        slug: Option<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            published_on,
            slug: slug.unwrap_or_default(),
            title: title.into(),
            content: content.into(),
            format: Format::default(),
            status: Status::Draft,
            locale: String::new(),
            created_at: Some(Local::now()),
            updated_at: None,
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn published_on(&self) -> NaiveDate {
        self.published_on
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    pub fn publish(&mut self) {
        self.status = Status::Published;
    }

    pub fn hide(&mut self) {
        self.status = Status::Hidden;
    }

    /// 写入前的回调：补全创建时间、重新生成空 slug、刷新更新时间
    pub fn prepare_for_write(&mut self) {
        let now = Local::now();
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.slug = generate_slug(Some(&self.slug), &self.title);
        self.updated_at = Some(now);
    }

    /// 校验必填字段和长度限制
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title must not be blank".into()));
        }
        if self.title.chars().count() > MAX_TEXT_LEN {
            return Err(Error::Validation(format!(
                "title must not exceed {MAX_TEXT_LEN} characters"
            )));
        }
        if self.content.trim().is_empty() {
            return Err(Error::Validation("content must not be blank".into()));
        }
        if self.slug.chars().count() > MAX_TEXT_LEN {
            return Err(Error::Validation(format!(
                "slug must not exceed {MAX_TEXT_LEN} characters"
            )));
        }
        if self.locale.trim().is_empty() {
            return Err(Error::Validation("locale must not be blank".into()));
        }
        Ok(())
    }

    /// 全文索引使用的 Postgres 文本检索配置，按 locale 的语言部分选择
    pub fn search_config(&self) -> &'static str {
        search_config_for(&self.locale)
    }
}

impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.published_on == other.published_on && self.slug == other.slug
    }
}

impl Eq for Post {}

/// 根据 locale（如 `de`、`en_US`、`nl-BE`）选择文本检索配置
pub fn search_config_for(locale: &str) -> &'static str {
    let language = locale
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match language.as_str() {
        "de" => "german",
        "en" => "english",
        "nl" => "dutch",
        "fr" => "french",
        _ => "simple",
    }
}
