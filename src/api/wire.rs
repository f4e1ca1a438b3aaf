//! Prismic REST v2 response shapes and their mapping onto the content model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::content::rich_text::as_text;
use crate::content::{Cursor, PageResult, PostDetail, PostSummary, RichText, Section};

/// `GET /api/v2`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRoot {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, rename = "isMasterRef")]
    pub is_master_ref: bool,
}

impl ApiRoot {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// `GET /api/v2/documents/search`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Document>,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: PostFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PostFields {
    #[serde(deserialize_with = "text_field")]
    pub title: String,
    #[serde(deserialize_with = "text_field")]
    pub subtitle: String,
    #[serde(deserialize_with = "text_field")]
    pub author: String,
    pub banner: Option<ImageField>,
    pub content: Option<Vec<SectionFields>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ImageField {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SectionFields {
    #[serde(deserialize_with = "text_field")]
    pub heading: String,
    #[serde(deserialize_with = "rich_text_field")]
    pub body: RichText,
}

/// Key Text fields arrive as strings, Title fields as rich text
#[derive(Deserialize)]
#[serde(untagged)]
enum TextValue {
    Plain(String),
    Rich(RichText),
}

fn text_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<TextValue>::deserialize(deserializer)? {
        Some(TextValue::Plain(text)) => text,
        Some(TextValue::Rich(text)) => as_text(&text, " "),
        None => String::new(),
    })
}

fn rich_text_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RichText, D::Error> {
    Ok(Option::<RichText>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse Prismic's `2021-03-25T19:25:28+0000`, accepting RFC 3339 as well
pub(crate) fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| tracing::warn!("Unparseable publication date {:?}: {}", raw, e))
        .ok()
}

impl Document {
    fn uid(&self) -> String {
        self.uid.clone().unwrap_or_else(|| self.id.clone())
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.first_publication_date
            .as_deref()
            .and_then(parse_publication_date)
    }

    pub fn into_summary(self) -> PostSummary {
        PostSummary {
            uid: self.uid(),
            published_at: self.published_at(),
            title: self.data.title,
            subtitle: self.data.subtitle,
            author: self.data.author,
        }
    }

    pub fn into_detail(self) -> PostDetail {
        let uid = self.uid();
        let published_at = self.published_at();
        let data = self.data;
        PostDetail {
            uid,
            published_at,
            title: data.title,
            author: data.author,
            banner_url: data.banner.and_then(|b| b.url).unwrap_or_default(),
            sections: data
                .content
                .unwrap_or_default()
                .into_iter()
                .map(|s| Section {
                    heading: s.heading,
                    body: s.body,
                })
                .collect(),
        }
    }
}

impl SearchResponse {
    pub fn into_page(self) -> PageResult {
        PageResult {
            items: self
                .results
                .into_iter()
                .map(Document::into_summary)
                .collect(),
            next_cursor: self.next_page.and_then(Cursor::new),
        }
    }
}
