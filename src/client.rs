//! Quote client: asks the local service for the current bid and keeps it in
//! a text file.

use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::BidResponse;
use crate::core::config::ClientConfig;

/// Requests `url` once and returns the bid from its JSON body. The whole
/// exchange, body read included, must finish within `deadline`.
pub async fn fetch_bid(url: &str, deadline: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent("cotacao/1.0")
        .build()
        .context("Failed to build HTTP client")?;

    let request = client
        .get(url)
        .build()
        .with_context(|| format!("Failed to build request for {url}"))?;

    let exchange = async {
        let response = client
            .execute(request)
            .await
            .context("Request to quote server failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Quote server returned {status}: {body}");
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;
        let parsed: BidResponse =
            serde_json::from_slice(&body).context("Failed to parse quote server response")?;
        Ok::<_, anyhow::Error>(parsed.bid)
    };

    tokio::time::timeout(deadline, exchange)
        .await
        .map_err(|_| anyhow!("Request to quote server timed out after {deadline:?}"))?
}

/// Replaces the content of `path` with the formatted bid.
pub fn save_bid<P: AsRef<Path>>(path: P, bid: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, format!("Dólar: {bid}"))
        .with_context(|| format!("Failed to write quote file {}", path.display()))?;
    debug!("Wrote bid to {}", path.display());
    Ok(())
}

pub async fn run(config: &ClientConfig) -> Result<String> {
    info!(url = %config.server_url, "Requesting quote");
    let bid = fetch_bid(&config.server_url, config.timeout()).await?;
    save_bid(&config.output_path, &bid)?;

    println!("Cotação do dólar: {bid}");
    println!(
        "Cotação salva com sucesso no arquivo '{}'",
        config.output_path.display()
    );
    Ok(bid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cotacao"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn config(server: &MockServer, dir: &TempDir) -> ClientConfig {
        ClientConfig {
            server_url: format!("{}/cotacao", server.uri()),
            timeout_ms: 300,
            output_path: dir.path().join("cotacao.txt"),
        }
    }

    #[tokio::test]
    async fn test_fetch_bid() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(r#"{"bid":"5.43"}"#))
                .await;

        let bid = fetch_bid(
            &format!("{}/cotacao", mock_server.uri()),
            Duration::from_millis(300),
        )
        .await
        .unwrap();
        assert_eq!(bid, "5.43");
    }

    #[tokio::test]
    async fn test_run_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(r#"{"bid":"5.43"}"#))
                .await;
        let config = config(&mock_server, &temp_dir);

        let bid = run(&config).await.unwrap();

        assert_eq!(bid, "5.43");
        assert_eq!(fs::read_to_string(&config.output_path).unwrap(), "Dólar: 5.43");
    }

    #[tokio::test]
    async fn test_run_overwrites_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(r#"{"bid":"5.43"}"#))
                .await;
        let config = config(&mock_server, &temp_dir);
        fs::write(&config.output_path, "Dólar: 4.99 and some much longer old content").unwrap();

        run(&config).await.unwrap();
        run(&config).await.unwrap();

        assert_eq!(fs::read_to_string(&config.output_path).unwrap(), "Dólar: 5.43");
    }

    #[tokio::test]
    async fn test_slow_server_times_out_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"bid":"5.43"}"#)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let config = ClientConfig {
            timeout_ms: 50,
            ..config(&mock_server, &temp_dir)
        };

        let result = run(&config).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timed out"));
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn test_server_error_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = create_mock_server(
            ResponseTemplate::new(500).set_body_string("Erro ao buscar cotação"),
        )
        .await;
        let config = config(&mock_server, &temp_dir);

        let result = run(&config).await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Quote server returned 500 Internal Server Error: Erro ao buscar cotação"
        );
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn test_malformed_body_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(r#"{"ask":"5.43"}"#))
                .await;
        let config = config(&mock_server, &temp_dir);

        let result = run(&config).await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to parse quote server response"
        );
        assert!(!config.output_path.exists());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_fatal() {
        let result = fetch_bid("http://127.0.0.1:1/cotacao", Duration::from_secs(2)).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Request to quote server failed"
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_fatal() {
        let result = fetch_bid("not a url", Duration::from_secs(1)).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to build request")
        );
    }

    #[test]
    fn test_save_bid_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = save_bid(temp_dir.path().join("missing").join("cotacao.txt"), "5.43");
        assert!(result.is_err());
    }
}
