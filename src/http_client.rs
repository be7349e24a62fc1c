use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

pub const REQUEST_TIMEOUT_SECS: u64 = 30;
const AGENT: &str = "fbr_match_stats/0.1";

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One HTTP exchange. Any status code is a successful `Reply`; `Err` is
/// reserved for failures below HTTP (connect, timeout, body read).
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, &str)], query: &[(&str, String)])
    -> Result<Reply>;

    fn post(&self, url: &str) -> Result<Reply>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, String)],
    ) -> Result<Reply> {
        let mut req = self.client.get(url).header(USER_AGENT, AGENT).query(query);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = req.send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        Ok(Reply { status, body })
    }

    fn post(&self, url: &str) -> Result<Reply> {
        let resp = self
            .client
            .post(url)
            .header(USER_AGENT, AGENT)
            .send()
            .context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        Ok(Reply { status, body })
    }
}
