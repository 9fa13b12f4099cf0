use std::fs;
use tracing::{error, info};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Daily closes at 10:00 UTC starting 2024-01-01 (1704103200).
    pub fn chart_response(currency: &str, closes: &[f64]) -> String {
        let timestamps: Vec<String> = (0..closes.len())
            .map(|i| (1_704_103_200 + i as i64 * 86_400).to_string())
            .collect();
        let closes: Vec<String> = closes.iter().map(|c| c.to_string()).collect();
        format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "currency": "{currency}", "gmtoffset": 0 }},
                        "timestamp": [{}],
                        "indicators": {{ "quote": [{{ "close": [{}] }}] }}
                    }}],
                    "error": null
                }}
            }}"#,
            timestamps.join(", "),
            closes.join(", ")
        )
    }

    pub async fn mount_chart(server: &MockServer, symbol: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn create_mock_server() -> MockServer {
        let server = MockServer::start().await;
        mount_chart(
            &server,
            "SPY",
            chart_response("USD", &[100.0, 101.0, 103.0, 102.0, 105.0, 106.0]),
        )
        .await;
        mount_chart(
            &server,
            "LYPE.DE",
            chart_response("EUR", &[50.0, 50.5, 51.0, 50.0, 52.0, 53.0]),
        )
        .await;
        mount_chart(
            &server,
            "EUR=X",
            chart_response("EUR", &[0.90, 0.91, 0.92, 0.91, 0.90, 0.92]),
        )
        .await;
        server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str, symbols: &[(&str, &str)]) -> String {
        let instruments: String = symbols
            .iter()
            .map(|(name, symbol)| format!("  - name: \"{name}\"\n    symbol: \"{symbol}\"\n"))
            .collect();
        let config = format!(
            r#"currency: "EUR"
data_path: "{}"
providers:
  yahoo:
    base_url: "{base_url}"
instruments:
{instruments}forex:
  - symbol: "EUR=X"
    base: "USD"
    quote: "EUR"
analysis:
  span: 3
"#,
            dir.join("data").display()
        );
        let path = dir.join("config.yaml");
        std::fs::write(&path, config).expect("Failed to write config file");
        path.to_str().unwrap().to_string()
    }
}

#[test_log::test(tokio::test)]
async fn test_fetch_compare_extract_flow() {
    let mock_server = test_utils::create_mock_server().await;
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        &mock_server.uri(),
        &[("SP500", "SPY"), ("msci-health", "LYPE.DE")],
    );

    let result = etfcmp::run_command(etfcmp::AppCommand::Fetch, Some(&config_path)).await;
    assert!(result.is_ok(), "Fetch failed with: {:?}", result.err());

    let data = dir.path().join("data");
    let sp500 = etfcmp::storage::json::read_series(&data.join("SP500.json"), "EUR").unwrap();
    assert_eq!(sp500.len(), 6);
    assert_eq!(sp500.first().value, 0.0);
    // 106 * 0.92 against 100 * 0.90
    let expected = (106.0 * 0.92 / (100.0 * 0.90) - 1.0) * 100.0;
    assert!((sp500.last().value - expected).abs() < 1e-9);
    assert!(data.join("msci-health.json").exists());

    let output_dir = dir.path().join("report");
    let options = etfcmp::cli::compare::CompareOptions {
        output_dir: Some(output_dir.clone()),
        ..Default::default()
    };
    let result =
        etfcmp::run_command(etfcmp::AppCommand::Compare(options), Some(&config_path)).await;
    assert!(result.is_ok(), "Compare failed with: {:?}", result.err());

    let performance = fs::read_to_string(output_dir.join("performance.csv")).unwrap();
    assert!(performance.starts_with("date,SP500,msci-health\n2024-01-01,0.0,0.0\n"));
    assert_eq!(performance.lines().count(), 7);
    let correlation = fs::read_to_string(output_dir.join("correlation_raw.csv")).unwrap();
    assert!(correlation.starts_with(",SP500,msci-health\n"));

    let result = etfcmp::run_command(
        etfcmp::AppCommand::Extract {
            input: data.join("SP500.json"),
            output: None,
        },
        Some(&config_path),
    )
    .await;
    assert!(result.is_ok(), "Extract failed with: {:?}", result.err());
    let csv = fs::read_to_string(data.join("SP500.csv")).unwrap();
    assert!(csv.starts_with("date,value,\n2024-01-01,0.0,\n"));
}

#[test_log::test(tokio::test)]
async fn test_fetch_unknown_symbol_writes_nothing() {
    let mock_server = test_utils::create_mock_server().await;
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        &mock_server.uri(),
        &[("SP500", "SPY"), ("missing", "NOPE")],
    );

    let result = etfcmp::run_command(etfcmp::AppCommand::Fetch, Some(&config_path)).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Failed to load missing (NOPE)"
    );
    let data = dir.path().join("data");
    assert!(!data.join("SP500.json").exists());
    assert!(!data.join("missing.json").exists());
    assert!(!data.exists());
}

#[test_log::test(tokio::test)]
async fn test_compare_needs_two_series() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("only.json"),
        r#"{"series": [{"date": "2024-01-01", "value": {"raw": 0.0}}]}"#,
    )
    .unwrap();

    let options = etfcmp::cli::compare::CompareOptions {
        input_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, "currency: \"EUR\"\n").unwrap();

    let result = etfcmp::run_command(
        etfcmp::AppCommand::Compare(options),
        config_path.to_str(),
    )
    .await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "only 1 series available, at least 2 required"
    );
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access"]
async fn test_real_yahoo_history_api() {
    use etfcmp::core::HistoryProvider;
    use etfcmp::providers::{Cache, YahooHistoryProvider};

    let base_url = "https://query1.finance.yahoo.com";
    let cache = std::sync::Arc::new(Cache::new());
    let provider = YahooHistoryProvider::new(base_url, cache);

    let symbol = "EUR=X";
    info!(?symbol, "Fetching history from Yahoo Finance");

    match provider.fetch_history(symbol).await {
        Ok(history) => {
            info!(
                observations = history.observations.len(),
                currency = %history.currency,
                "Received successful history response"
            );
            assert!(!history.observations.is_empty());
            let series = etfcmp::core::pipeline::prepare_series("eurusd", &history).unwrap();
            assert!(series.validate().is_ok());
        }
        Err(e) => {
            error!("History API request failed: {e}\n{e:?}");
            panic!("History API request failed: {e}");
        }
    }
}
