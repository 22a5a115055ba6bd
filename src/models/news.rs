use serde::Serialize;
use serde_json::Value;
use url::Url;

/// One article from a feed page. Built only by [`Article::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub source_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing or mistyped required field `{0}`")]
    MissingRequiredField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

/// Where a field lives in a raw record and what happens when it is unusable.
#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    path: &'static [&'static str],
    presence: Presence,
}

impl FieldRule {
    const fn required(name: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            name,
            path,
            presence: Presence::Required,
        }
    }

    const fn optional(name: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            name,
            path,
            presence: Presence::Optional,
        }
    }

    fn lookup<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.path.iter().try_fold(record, |node, key| node.get(*key))
    }

    /// `Ok(None)` only for optional fields; a required field that is absent,
    /// null or of the wrong type fails the whole record.
    fn extract<T>(
        &self,
        record: &Value,
        cast: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<Option<T>, DecodeError> {
        match (self.lookup(record).and_then(cast), self.presence) {
            (Some(value), _) => Ok(Some(value)),
            (None, Presence::Optional) => Ok(None),
            (None, Presence::Required) => Err(DecodeError::MissingRequiredField(self.name)),
        }
    }

    fn required_i64(&self, record: &Value) -> Result<i64, DecodeError> {
        self.extract(record, Value::as_i64)?
            .ok_or(DecodeError::MissingRequiredField(self.name))
    }

    fn required_string(&self, record: &Value) -> Result<String, DecodeError> {
        self.optional_string(record)?
            .ok_or(DecodeError::MissingRequiredField(self.name))
    }

    fn optional_string(&self, record: &Value) -> Result<Option<String>, DecodeError> {
        self.extract(record, |v| v.as_str().map(str::to_string))
    }
}

const NEWS_ID: FieldRule = FieldRule::required("newsId", &["newsId"]);
const TITLE: FieldRule = FieldRule::required("title", &["title"]);
const ANNOUNCE: FieldRule = FieldRule::required("announce", &["announce"]);
const IMAGE_URL: FieldRule = FieldRule::optional("img.url", &["img", "url"]);
const SOURCE_LINK: FieldRule = FieldRule::optional("sourceLink", &["sourceLink"]);
const FULL_TEXT: FieldRule = FieldRule::optional("fullText", &["fullText"]);

impl Article {
    /// Decode one raw feed record.
    ///
    /// `newsId`, `title` and `announce` are mandatory. `img.url` and
    /// `sourceLink` fall back to an empty string and `fullText` to `None`
    /// when they are missing, null or mistyped.
    pub fn decode(record: &Value) -> Result<Self, DecodeError> {
        Ok(Self {
            id: NEWS_ID.required_i64(record)?,
            title: TITLE.required_string(record)?,
            description: ANNOUNCE.required_string(record)?,
            image_url: IMAGE_URL.optional_string(record)?.unwrap_or_default(),
            source_link: SOURCE_LINK.optional_string(record)?.unwrap_or_default(),
            full_text: FULL_TEXT.optional_string(record)?,
        })
    }

    /// Shareable link to the full article, if `source_link` is an absolute URL.
    pub fn full_article_url(&self) -> Option<Url> {
        if self.source_link.is_empty() {
            return None;
        }
        Url::parse(&self.source_link).ok()
    }

    /// Text for the detail screen: the full body when the source sent one.
    pub fn body_text(&self) -> &str {
        match self.full_text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => &self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Value {
        json!({
            "newsId": 1,
            "title": "T",
            "announce": "D",
            "img": { "url": "http://x/i.png" },
            "sourceLink": "http://x/a",
            "fullText": "Body"
        })
    }

    #[test]
    fn decodes_complete_record() {
        let article = Article::decode(&full_record()).unwrap();
        assert_eq!(
            article,
            Article {
                id: 1,
                title: "T".into(),
                description: "D".into(),
                image_url: "http://x/i.png".into(),
                source_link: "http://x/a".into(),
                full_text: Some("Body".into()),
            }
        );
    }

    #[test]
    fn missing_required_fields_fail() {
        for field in ["newsId", "title", "announce"] {
            let mut record = full_record();
            record.as_object_mut().unwrap().remove(field);
            assert_eq!(
                Article::decode(&record),
                Err(DecodeError::MissingRequiredField(field)),
                "removing {field}"
            );
        }
    }

    #[test]
    fn mistyped_required_fields_fail() {
        let mut record = full_record();
        record["newsId"] = json!("1");
        assert_eq!(
            Article::decode(&record),
            Err(DecodeError::MissingRequiredField("newsId"))
        );

        let mut record = full_record();
        record["title"] = Value::Null;
        assert_eq!(
            Article::decode(&record),
            Err(DecodeError::MissingRequiredField("title"))
        );
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let record = json!({ "newsId": 7, "title": "T", "announce": "D" });
        let article = Article::decode(&record).unwrap();
        assert_eq!(article.image_url, "");
        assert_eq!(article.source_link, "");
        assert_eq!(article.full_text, None);
    }

    #[test]
    fn optional_fields_default_when_mistyped() {
        let record = json!({
            "newsId": 7,
            "title": "T",
            "announce": "D",
            "img": { "url": 42 },
            "sourceLink": ["not", "a", "string"],
            "fullText": null
        });
        let article = Article::decode(&record).unwrap();
        assert_eq!(article.image_url, "");
        assert_eq!(article.source_link, "");
        assert_eq!(article.full_text, None);

        let record = json!({ "newsId": 7, "title": "T", "announce": "D", "img": "flat" });
        assert_eq!(Article::decode(&record).unwrap().image_url, "");
    }

    #[test]
    fn decoding_is_repeatable() {
        let record = full_record();
        assert_eq!(Article::decode(&record), Article::decode(&record));
    }

    #[test]
    fn full_article_url_requires_absolute_link() {
        let mut article = Article::decode(&full_record()).unwrap();
        assert_eq!(
            article.full_article_url().map(|u| u.to_string()),
            Some("http://x/a".to_string())
        );

        article.source_link.clear();
        assert!(article.full_article_url().is_none());

        article.source_link = "not a url".into();
        assert!(article.full_article_url().is_none());
    }

    #[test]
    fn body_text_falls_back_to_description() {
        let mut article = Article::decode(&full_record()).unwrap();
        assert_eq!(article.body_text(), "Body");

        article.full_text = Some(String::new());
        assert_eq!(article.body_text(), "D");

        article.full_text = None;
        assert_eq!(article.body_text(), "D");
    }
}
