//! arXiv feed source implementation.

use async_trait::async_trait;
use feed_rs::parser;

use crate::models::{Entry, Link, LinkRole, SearchQuery};
use crate::sources::{FeedSource, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv research source
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    api_url: String,
}

impl ArxivSource {
    /// Create a source talking to the public arXiv API
    pub fn new(client: HttpClient) -> Self {
        Self::with_api_url(client, ARXIV_API_URL)
    }

    /// Create a source with a custom endpoint (mirrors, tests)
    pub fn with_api_url(client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Full request URL for `query`
    pub fn request_url(&self, query: &SearchQuery) -> String {
        format!("{}?{}", self.api_url, query.to_query_string())
    }

    /// Decode an Atom response body into entries, preserving feed order
    pub fn parse_feed(body: &[u8]) -> Result<Vec<Entry>, SourceError> {
        let feed = parser::parse(body)?;
        feed.entries.iter().map(Self::parse_entry).collect()
    }

    /// Convert one Atom entry
    fn parse_entry(entry: &feed_rs::model::Entry) -> Result<Entry, SourceError> {
        // The API reports query errors as a feed holding a single entry
        // whose id points under /api/errors.
        if entry.id.contains("/api/errors") {
            let message = entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_else(|| entry.id.clone());
            return Err(SourceError::Api(message));
        }

        let id = entry
            .id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SourceError::Parse("Missing entry id".to_string()))?
            .to_string();

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_default();

        let authors = entry.authors.iter().map(|a| a.name.clone()).collect();

        let (published, updated) = match (entry.published, entry.updated) {
            (Some(p), Some(u)) => (p, u),
            (Some(p), None) => (p, p),
            (None, Some(u)) => (u, u),
            (None, None) => {
                return Err(SourceError::Parse(format!(
                    "Entry {} has neither a published nor an updated date",
                    id
                )))
            }
        };

        let links = entry
            .links
            .iter()
            .filter(|l| !l.href.is_empty())
            .map(|l| Link {
                href: l.href.clone(),
                role: Self::link_role(l),
            })
            .collect();

        Ok(Entry {
            id,
            title,
            authors,
            published,
            updated,
            links,
        })
    }

    /// arXiv marks the PDF link with `title="pdf"`; some mirrors only set the type
    fn link_role(link: &feed_rs::model::Link) -> LinkRole {
        let titled_pdf = link.title.as_deref() == Some("pdf");
        let typed_pdf = link.media_type.as_deref() == Some("application/pdf");
        if titled_pdf || typed_pdf {
            LinkRole::PrimaryDocument
        } else {
            LinkRole::Other
        }
    }
}

#[async_trait]
impl FeedSource for ArxivSource {
    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Entry>, SourceError> {
        let url = self.request_url(query);
        tracing::debug!("querying {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let entries = Self::parse_feed(bytes.as_ref())?;
        tracing::debug!("feed returned {} entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortBy, SortOrder};
    use chrono::Datelike;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2024-01-05T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2309.06314v2</id>
    <updated>2024-01-03T08:30:00Z</updated>
    <published>2023-09-12T10:00:00Z</published>
    <title>Quantum Unique Ergodicity</title>
    <summary>Abstract text.</summary>
    <author><name>Art I. Ficial</name></author>
    <author><name>Jane Doe</name></author>
    <link href="http://arxiv.org/abs/2309.06314v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2309.06314v2" rel="related" type="application/pdf"/>
    <link title="doi" href="http://dx.doi.org/10.1000/xyz" rel="related"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/math/0104020v1</id>
    <updated>2001-04-02T00:00:00Z</updated>
    <published>2001-04-02T00:00:00Z</published>
    <title>Old Style Identifier</title>
    <author><name>Someone</name></author>
    <link title="pdf" href="http://arxiv.org/pdf/math/0104020v1" rel="related"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let entries = ArxivSource::parse_feed(FEED.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.id, "2309.06314v2");
        assert_eq!(first.title, "Quantum Unique Ergodicity");
        assert_eq!(first.authors, vec!["Art I. Ficial", "Jane Doe"]);
        assert_eq!(first.publish_year(), 2023);
        assert_eq!(first.update_year(), 2024);
        assert_eq!(
            first.primary_links().collect::<Vec<_>>(),
            vec!["http://arxiv.org/pdf/2309.06314v2"]
        );
        assert_eq!(first.other_links().count(), 2);

        let second = &entries[1];
        assert_eq!(second.id, "0104020v1");
        assert_eq!(second.published.year(), 2001);
        assert_eq!(second.primary_links().count(), 1);
    }

    #[test]
    fn test_parse_error_entry() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <id>http://arxiv.org/api/xyz</id>
  <updated>2024-01-05T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
    <updated>2024-01-05T00:00:00-05:00</updated>
    <link href="http://arxiv.org/api/errors#incorrect_id_format_for_1234" rel="alternate" type="text/html"/>
    <author><name>arXiv api core</name></author>
  </entry>
</feed>"#;

        match ArxivSource::parse_feed(feed.as_bytes()) {
            Err(SourceError::Api(message)) => assert_eq!(message, "incorrect id format for 1234"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_feed() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <id>http://arxiv.org/api/empty</id>
  <updated>2024-01-05T00:00:00-05:00</updated>
</feed>"#;
        assert!(ArxivSource::parse_feed(feed.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            ArxivSource::parse_feed(b"not xml at all"),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_request_url() {
        let client = HttpClient::new().unwrap();
        let source = ArxivSource::new(client);
        let query = SearchQuery::new("ti:quantum")
            .max_results(3)
            .sort_by(SortBy::Relevance)
            .sort_order(SortOrder::Ascending);
        assert_eq!(
            source.request_url(&query),
            "http://export.arxiv.org/api/query?search_query=ti%3Aquantum&id_list=\
             &start=0&max_results=3&sortBy=relevance&sortOrder=ascending"
        );
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::UrlEncoded(
                "search_query".into(),
                "au:ficial_a_i".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/atom+xml")
            .with_body(FEED)
            .create_async()
            .await;

        let source = ArxivSource::with_api_url(
            HttpClient::new().unwrap(),
            format!("{}/api/query", server.url()),
        );
        let entries = source.search(&SearchQuery::new("au:ficial_a_i")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "2309.06314v2");
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let source = ArxivSource::with_api_url(HttpClient::new().unwrap(), server.url());
        let result = source.search(&SearchQuery::default()).await;
        assert!(matches!(result, Err(SourceError::Api(_))));
    }
}
