use crate::domain::model::SheetRow;
use crate::domain::ports::SheetSource;
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Fetches the two published CSV exports over HTTP. Every request is
/// bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    client: Client,
    responses_url: String,
    roster_url: String,
}

impl HttpSheetSource {
    pub fn new(responses_url: String, roster_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            responses_url,
            roster_url,
        })
    }

    async fn fetch_sheet(&self, url: &str) -> Result<Vec<SheetRow>> {
        tracing::debug!(url = %url, "fetching sheet");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let rows = parse_rows(&text);
        tracing::debug!(url = %url, rows = rows.len(), "sheet fetched");
        Ok(rows)
    }
}

impl SheetSource for HttpSheetSource {
    async fn fetch_responses(&self) -> Result<Vec<SheetRow>> {
        self.fetch_sheet(&self.responses_url).await
    }

    async fn fetch_roster(&self) -> Result<Vec<SheetRow>> {
        self.fetch_sheet(&self.roster_url).await
    }
}

/// CSV text with a header row → ordered header→cell mappings. Cells are
/// whitespace-trimmed; malformed rows are skipped with a warning, not fatal.
pub fn parse_rows(text: &str) -> Vec<SheetRow> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            tracing::warn!(error = %err, "sheet has no readable header row");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                let row: SheetRow = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, cell)| (header.to_string(), cell.to_string()))
                    .collect();
                rows.push(row);
            }
            Err(err) => tracing::warn!(error = %err, "skipping malformed sheet row"),
        }
    }
    rows
}
