use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FeedError;

/// Where a sheet's rows come from: the published gviz endpoint, or a CSV
/// export of the same sheet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote(String),
    LocalCsv(PathBuf),
}

impl FeedSource {
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            FeedSource::Remote(location.to_string())
        } else {
            FeedSource::LocalCsv(PathBuf::from(location))
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Remote(url) => f.write_str(url),
            FeedSource::LocalCsv(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One sheet cell: the raw value and, when the sheet applies a number or
/// date format, the formatted display string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedCell {
    #[serde(rename = "v", default)]
    pub raw: Option<Value>,
    #[serde(rename = "f", default)]
    pub formatted: Option<String>,
}

impl FeedCell {
    pub fn text(value: &str) -> Self {
        Self {
            raw: Some(Value::String(value.to_string())),
            formatted: Some(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedRow {
    #[serde(rename = "c", default)]
    pub cells: Vec<Option<FeedCell>>,
}

impl FeedRow {
    pub fn cell(&self, index: usize) -> Option<&FeedCell> {
        self.cells.get(index).and_then(|cell| cell.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct GvizEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<GvizError>,
    #[serde(default)]
    table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
struct GvizError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detailed_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
    #[serde(default)]
    rows: Vec<FeedRow>,
}

/// Unwraps the `google.visualization.Query.setResponse(...)` callback and
/// returns the table rows.
pub fn parse_gviz_payload(text: &str) -> Result<Vec<FeedRow>, FeedError> {
    let start = text
        .find('{')
        .ok_or_else(|| FeedError::Malformed("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| FeedError::Malformed("unterminated JSON object in response".to_string()))?;

    let envelope: GvizEnvelope = serde_json::from_str(&text[start..=end])?;

    if envelope.status.as_deref() == Some("error") {
        let message = envelope
            .errors
            .into_iter()
            .next()
            .and_then(|err| err.detailed_message.or(err.message))
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(FeedError::Query(message));
    }

    let table = envelope
        .table
        .ok_or_else(|| FeedError::Malformed("response has no table".to_string()))?;
    Ok(table.rows)
}

/// Reads a CSV export of a sheet. The header row is skipped and blank
/// cells become empty cells.
pub fn parse_csv_payload<R: Read>(reader: R) -> Result<Vec<FeedRow>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = record
            .iter()
            .map(|value| {
                if value.trim().is_empty() {
                    None
                } else {
                    Some(FeedCell::text(value))
                }
            })
            .collect();
        rows.push(FeedRow { cells });
    }

    Ok(rows)
}

pub struct FeedClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub async fn fetch(&self, source: &FeedSource) -> Result<Vec<FeedRow>, FeedError> {
        let rows = match source {
            FeedSource::Remote(url) => self.fetch_remote(url).await?,
            FeedSource::LocalCsv(path) => {
                let file = std::fs::File::open(path).map_err(|source| FeedError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_csv_payload(file)?
            }
        };

        info!(source = %source, rows = rows.len(), "feed loaded");
        Ok(rows)
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<FeedRow>, FeedError> {
        debug!(url, "requesting feed");
        let transport = |source: reqwest::Error| FeedError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        parse_gviz_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","status":"ok","table":{"cols":[],"rows":[{"c":[{"v":"Date(2024,1,1)","f":"01/02/2024"},{"v":"Asha"},{"v":3.0},null]},{"c":[]}]}});"#;

    #[test]
    fn unwraps_gviz_callback() {
        let rows = parse_gviz_payload(PAYLOAD).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(
            first.cell(0).and_then(|cell| cell.formatted.as_deref()),
            Some("01/02/2024")
        );
        assert_eq!(
            first.cell(1).and_then(|cell| cell.raw.clone()),
            Some(Value::String("Asha".to_string()))
        );
        assert!(first.cell(3).is_none());
        assert!(first.cell(9).is_none());
        assert!(rows[1].cells.is_empty());
    }

    #[test]
    fn reports_query_errors() {
        let payload = r#"setResponse({"status":"error","errors":[{"reason":"access_denied","message":"Access denied","detailed_message":"Sheet is private"}]});"#;
        match parse_gviz_payload(payload) {
            Err(FeedError::Query(message)) => assert_eq!(message, "Sheet is private"),
            other => panic!("expected query error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_json_bodies() {
        assert!(matches!(
            parse_gviz_payload("<html>Sign in</html>"),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            parse_gviz_payload("setResponse({\"status\": );"),
            Err(FeedError::Malformed(_))
        ));
    }

    #[test]
    fn csv_export_skips_header_and_blank_cells() {
        let data = "Date,Name,Leads\n01/02/2024,Asha,4\n02/02/2024,,\n";
        let rows = parse_csv_payload(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(1), Some(&FeedCell::text("Asha")));
        assert!(rows[1].cell(1).is_none());
    }

    #[test]
    fn locations_pick_remote_or_local() {
        assert_eq!(
            FeedSource::from_location("https://docs.google.com/x"),
            FeedSource::Remote("https://docs.google.com/x".to_string())
        );
        assert_eq!(
            FeedSource::from_location("data/performance.csv"),
            FeedSource::LocalCsv(PathBuf::from("data/performance.csv"))
        );
    }

    #[tokio::test]
    async fn missing_local_file_is_an_io_error() {
        let client = FeedClient::new(Duration::from_secs(1));
        let source = FeedSource::LocalCsv(PathBuf::from("/definitely/not/here.csv"));
        assert!(matches!(
            client.fetch(&source).await,
            Err(FeedError::Io { .. })
        ));
    }
}
