//! Request dispatch against an in-memory transport
//!
//! Covers clock synchronization at construction, signed URL assembly,
//! response classification and the one-call-per-request rule.

use rstest::*;
use serde_json::json;

use tradewire_core::{ClockOffset, ManualClock};
use tradewire_exchanges::binance::{
    sign, ApiResponse, FuturesRestClient, ParamValue, ParameterMap, SecurityType, API_KEY_HEADER,
};
use tradewire_exchanges::{ExchangeError, HttpMethod};
use tradewire_tests::{client_at, split_signed_url, test_config, MockTransport, TEST_API_KEY, TEST_BASE_URL, TEST_SECRET};

const BALANCES: &str = r#"[{"accountAlias":"SgsR","asset":"USDT","balance":"122.5","crossWalletBalance":"23.7"}]"#;

// ============================================================================
// CLOCK SYNCHRONIZATION
// ============================================================================

#[cfg(test)]
mod clock_tests {
    use super::*;

    #[monoio::test]
    async fn test_offset_applied_to_signed_timestamp() {
        let transport = MockTransport::new()
            .with_server_time(1_700_000_005_000)
            .with_json(200, BALANCES);
        let local = ManualClock::new(1_700_000_000_000);

        let client = FuturesRestClient::with_transport(test_config(), transport, Box::new(local.clone()))
            .await
            .unwrap();
        assert_eq!(client.clock().offset().as_millis(), 5000);

        local.set(1_700_000_010_000);
        assert_eq!(client.clock().now_millis(), 1_700_000_015_000);

        client.get_balances().await.unwrap();

        let request = client.transport().last_request().unwrap();
        let (_, canonical, _) = split_signed_url(&request.url).unwrap();
        assert_eq!(canonical, "recvWindow=5000&timestamp=1700000015000");
    }

    #[monoio::test]
    async fn test_sync_failure_falls_back_to_zero() {
        let transport = MockTransport::new()
            .with_error(ExchangeError::Timeout("server time".into()))
            .with_json(200, BALANCES);
        let local = ManualClock::new(1_700_000_000_000);

        let client = FuturesRestClient::with_transport(test_config(), transport, Box::new(local))
            .await
            .unwrap();

        assert_eq!(client.clock().offset(), ClockOffset::ZERO);
        assert_eq!(client.clock().now_millis(), 1_700_000_000_000);
        assert!(client.get_balances().await.is_ok());
    }

    #[monoio::test]
    async fn test_construction_sends_time_request_first() {
        let transport = MockTransport::new().with_server_time(1_700_000_000_000);
        let client = FuturesRestClient::with_transport(
            test_config(),
            transport,
            Box::new(ManualClock::new(1_700_000_000_000)),
        )
        .await
        .unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, format!("{TEST_BASE_URL}/fapi/v1/time"));
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].header(API_KEY_HEADER), None);
    }

    #[monoio::test]
    async fn test_missing_credentials_fail_before_network() {
        let config = test_config().with_credentials("   ", TEST_SECRET);
        let result = FuturesRestClient::with_transport(
            config,
            MockTransport::new(),
            Box::new(ManualClock::new(0)),
        )
        .await;

        match result {
            Err(err) => assert!(matches!(err, ExchangeError::MissingCredentials(_))),
            Ok(_) => panic!("empty API key accepted"),
        }
    }
}

// ============================================================================
// SIGNED REQUESTS
// ============================================================================

#[cfg(test)]
mod signed_tests {
    use super::*;

    #[monoio::test]
    async fn test_signed_url_layout() {
        let (client, _) = client_at(MockTransport::new().with_json(200, BALANCES), 0, 1_700_000_000_000);

        client.get_balances().await.unwrap();

        let request = client.transport().last_request().unwrap();
        let (target, canonical, signature) = split_signed_url(&request.url).unwrap();

        assert_eq!(target, format!("{TEST_BASE_URL}/fapi/v2/balance"));
        assert_eq!(signature, sign(TEST_SECRET, canonical).unwrap());
        assert_eq!(request.header(API_KEY_HEADER), Some(TEST_API_KEY));
        assert!(request.body.is_none());
    }

    #[monoio::test]
    async fn test_caller_recv_window_kept() {
        let (client, _) = client_at(MockTransport::new().with_json(200, "{}"), 0, 1_700_000_000_000);

        let params = ParameterMap::new()
            .with("recvWindow", 60_000u64)
            .with("timestamp", ParamValue::Null);
        client
            .request(HttpMethod::Get, "/fapi/v2/account", params, SecurityType::Signed)
            .await
            .unwrap();

        let request = client.transport().last_request().unwrap();
        let (_, canonical, _) = split_signed_url(&request.url).unwrap();
        assert_eq!(canonical, "recvWindow=60000&timestamp=1700000000000");
    }

    #[rstest]
    #[case(5000)]
    #[case(-5000)]
    #[case(0)]
    #[monoio::test]
    async fn test_timestamp_tracks_offset(#[case] offset_ms: i64) {
        let (client, local) = client_at(MockTransport::new().with_json(200, "{}"), offset_ms, 1_700_000_000_000);
        local.advance(250);

        client
            .request(HttpMethod::Get, "/fapi/v2/account", ParameterMap::new(), SecurityType::Signed)
            .await
            .unwrap();

        let expected = (1_700_000_000_250i64 + offset_ms).to_string();
        let request = client.transport().last_request().unwrap();
        assert!(request.url.contains(&format!("timestamp={expected}&")));
    }

    #[monoio::test]
    async fn test_debug_mode_does_not_change_request() {
        let (plain, _) = client_at(MockTransport::new().with_json(200, "{}"), 0, 1_700_000_000_000);
        let transport = MockTransport::new().with_json(200, "{}");
        let clock = tradewire_core::ServerClock::new(ClockOffset::ZERO, Box::new(ManualClock::new(1_700_000_000_000)));
        let debug = FuturesRestClient::with_clock(test_config().with_debug(true), transport, clock).unwrap();

        plain.get_account_info().await.unwrap();
        debug.get_account_info().await.unwrap();

        assert_eq!(
            plain.transport().last_request().unwrap().url,
            debug.transport().last_request().unwrap().url
        );
    }
}

// ============================================================================
// PUBLIC REQUESTS
// ============================================================================

#[cfg(test)]
mod public_tests {
    use super::*;

    #[monoio::test]
    async fn test_ping_has_no_query() {
        let (client, _) = client_at(MockTransport::new().with_json(200, "{}"), 0, 0);

        client.ping().await.unwrap();

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.url, format!("{TEST_BASE_URL}/fapi/v1/ping"));
        assert_eq!(request.header(API_KEY_HEADER), Some(TEST_API_KEY));
    }

    #[monoio::test]
    async fn test_public_params_unsigned() {
        let (client, _) = client_at(MockTransport::new().with_json(200, "{}"), 0, 0);

        let params = ParameterMap::new()
            .with("symbol", "BTCUSDT")
            .with("limit", 5)
            .with("fromId", ParamValue::Null);
        client
            .request(HttpMethod::Get, "/fapi/v1/depth", params, SecurityType::Public)
            .await
            .unwrap();

        let url = client.transport().last_request().unwrap().url;
        assert!(url.contains("symbol=BTCUSDT"));
        assert!(url.contains("limit=5"));
        assert!(!url.contains("fromId"));
        assert!(!url.contains("signature="));
        assert!(!url.contains("timestamp="));
    }

    #[monoio::test]
    async fn test_server_time() {
        let (client, _) = client_at(MockTransport::new().with_server_time(1_700_000_123_456), 0, 0);
        assert_eq!(client.server_time().await.unwrap(), 1_700_000_123_456);
    }
}

// ============================================================================
// RESPONSE HANDLING
// ============================================================================

#[cfg(test)]
mod response_tests {
    use super::*;

    #[monoio::test]
    async fn test_rejection_carries_body() {
        let body = r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}"#;
        let (client, _) = client_at(MockTransport::new().with_json(401, body), 0, 0);

        let err = client.get_balances().await.unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.rejection().unwrap().code, -2015);
        assert!(err.to_string().contains(body));
    }

    #[monoio::test]
    async fn test_text_response() {
        let (client, _) = client_at(MockTransport::new().with_text(200, "OK"), 0, 0);

        let response = client
            .request(HttpMethod::Get, "/fapi/v1/ping", ParameterMap::new(), SecurityType::Public)
            .await
            .unwrap();
        assert_eq!(response, ApiResponse::Text("OK".to_string()));
    }

    #[monoio::test]
    async fn test_json_response() {
        let (client, _) = client_at(
            MockTransport::new().with_response(200, "application/json; charset=UTF-8", r#"{"feeTier":1}"#),
            0,
            0,
        );

        let response = client
            .request(HttpMethod::Get, "/fapi/v2/account", ParameterMap::new(), SecurityType::Signed)
            .await
            .unwrap();
        assert_eq!(response, ApiResponse::Json(json!({"feeTier": 1})));
    }

    #[monoio::test]
    async fn test_malformed_json() {
        let (client, _) = client_at(MockTransport::new().with_json(200, "{\"feeTier\":"), 0, 0);

        let err = client.get_account_info().await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidResponse(_)));
    }

    #[monoio::test]
    async fn test_text_where_json_required() {
        let (client, _) = client_at(MockTransport::new().with_text(200, "maintenance"), 0, 0);

        let err = client.get_balances().await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidResponse(_)));
    }

    #[monoio::test]
    async fn test_transport_error_not_retried() {
        let transport = MockTransport::new()
            .with_error(ExchangeError::NetworkError("connection reset".into()))
            .with_json(200, BALANCES);
        let (client, _) = client_at(transport, 0, 0);

        let err = client.get_balances().await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(client.transport().request_count(), 1);
    }

    #[monoio::test]
    async fn test_typed_balances() {
        let (client, _) = client_at(MockTransport::new().with_json(200, BALANCES), 0, 0);

        let balances = client.get_balances().await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].display_amount().to_string(), "122.5");
    }
}
