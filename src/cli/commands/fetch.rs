//! `applog fetch`: GET a URL through the logging interceptor.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use crate::cli::output::{format_size, output, truncate, CommandOutput};
use crate::domain::models::{HttpRequest, LoggerConfig};
use crate::domain::ports::HttpTransport;
use crate::infrastructure::http::{LoggingInterceptor, ReqwestTransport};
use crate::services::Logger;

/// Arguments of `applog fetch`
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Absolute URL to fetch
    pub url: String,

    /// Request header as `Name: value`, repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Skip interceptor logging for this request
    #[arg(long)]
    pub no_log: bool,
}

fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Header must look like 'Name: value', got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Header name is empty in '{raw}'");
    }
    Ok((name, value.trim()))
}

/// Summary of a fetched response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutput {
    /// Requested URL
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header
    pub content_type: String,
    /// Body length in bytes
    pub size_bytes: u64,
    /// First characters of a text body
    pub preview: String,
}

impl CommandOutput for FetchOutput {
    fn to_human(&self) -> String {
        format!(
            "{} {} ({}, {})\n{}",
            self.status,
            self.url,
            self.content_type,
            format_size(self.size_bytes),
            self.preview
        )
    }
}

/// Perform a GET through the logging interceptor and print a summary.
pub async fn execute(args: FetchArgs, config: &LoggerConfig, json_mode: bool) -> Result<()> {
    let mut request = HttpRequest::get(&args.url);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    if args.no_log {
        request = request.without_logging();
    }

    let logger = Arc::new(Logger::from_config(config.clone()).context("Failed to build logger")?);
    let client = LoggingInterceptor::new(ReqwestTransport::new()?, Arc::clone(&logger));
    let result = client.send(request).await;

    logger.flush().await;
    logger.shutdown().await;

    let response = result.context("Request failed")?;
    let text = String::from_utf8_lossy(&response.body);
    let fetched = FetchOutput {
        url: response.url.clone(),
        status: response.status.as_u16(),
        content_type: response.content_type(),
        size_bytes: response.body.len() as u64,
        preview: truncate(&text, 200),
    };
    output(&fetched, json_mode);
    Ok(())
}
