//! Integration tests for configuration loading

use std::io::Write;
use ticker_stream::config::Config;
use ticker_stream::session::WsSession;

#[test]
fn test_example_config_builds_a_session() {
    let config = Config::example().unwrap();
    let session = WsSession::with_websocket(&config.stream).unwrap();
    assert_eq!(
        session.update_interval(),
        std::time::Duration::from_millis(1000)
    );
}

#[test]
fn test_partial_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [stream]
        update_interval_ms = 2000
        window_size = 60

        [telemetry]
        log_level = "debug"
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.stream.update_interval_ms, 2000);
    assert_eq!(config.stream.window_size, 60);
    assert_eq!(config.rest.quote_asset, "USDT");
    assert_eq!(config.telemetry.log_level, "debug");
}
