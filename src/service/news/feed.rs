use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::{Article, DecodeError};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed feed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed response has no `news` list")]
    MissingNewsList,
    #[error("article #{index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: DecodeError,
    },
}

/// Decode a feed response body into articles, keeping the source order.
///
/// A single undecodable record fails the whole page.
pub fn parse_feed(body: &[u8]) -> Result<Vec<Article>, FeedError> {
    let data: Value = serde_json::from_slice(body)?;
    let news = data
        .get("news")
        .and_then(|n| n.as_array())
        .ok_or(FeedError::MissingNewsList)?;

    news.iter()
        .enumerate()
        .map(|(index, record)| {
            Article::decode(record).map_err(|source| {
                warn!("Dropping feed page, record {} failed: {}", index, source);
                FeedError::Record { index, source }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_source_order() {
        let body = br#"{"news":[
            {"newsId":3,"title":"c","announce":"C"},
            {"newsId":1,"title":"a","announce":"A"},
            {"newsId":2,"title":"b","announce":"B"}
        ]}"#;
        let ids: Vec<i64> = parse_feed(body).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn empty_list_is_an_empty_page() {
        assert!(parse_feed(br#"{"news":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_news_list_fails() {
        assert!(matches!(
            parse_feed(br#"{"items":[]}"#),
            Err(FeedError::MissingNewsList)
        ));
        assert!(matches!(
            parse_feed(br#"{"news":{"newsId":1}}"#),
            Err(FeedError::MissingNewsList)
        ));
    }

    #[test]
    fn one_bad_record_fails_the_page() {
        let body = br#"{"news":[
            {"newsId":1,"title":"a","announce":"A"},
            {"title":"b","announce":"B"}
        ]}"#;
        match parse_feed(body) {
            Err(FeedError::Record { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source, DecodeError::MissingRequiredField("newsId"));
            }
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_fails() {
        assert!(matches!(parse_feed(b"<html>"), Err(FeedError::Json(_))));
    }
}
