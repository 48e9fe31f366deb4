use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::routing::post;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tempfile::NamedTempFile;
use tierkms_auth::AuthorizationPolicy;
use tierkms_client::{ClientError, KeyWrapper, KmsClient, KmsClientConfig, Tier};
use tierkms_server::api::build_router;
use tierkms_server::config::DEFAULT_BODY_LIMIT_BYTES;
use tierkms_server::{KmsService, MasterKeyTable};

struct TestServer {
    base_url: String,
    ca_bundle: NamedTempFile,
}

impl TestServer {
    /// Serve `router` over TLS on an ephemeral loopback port with a fresh
    /// self-signed certificate for `localhost`.
    async fn start(router: Router) -> Self {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert_pem = certified.cert.pem();
        let tls = RustlsConfig::from_pem(
            cert_pem.clone().into_bytes(),
            certified.key_pair.serialize_pem().into_bytes(),
        )
        .await
        .unwrap();

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = axum_server::from_tcp_rustls(listener, tls)
                .serve(router.into_make_service())
                .await;
        });

        let mut ca_bundle = NamedTempFile::new().unwrap();
        ca_bundle.write_all(cert_pem.as_bytes()).unwrap();
        Self {
            base_url: format!("https://localhost:{}", port),
            ca_bundle,
        }
    }

    fn config(&self) -> KmsClientConfig {
        KmsClientConfig::new(self.base_url.clone())
            .with_ca_bundle(self.ca_bundle.path())
            .with_timeout(Duration::from_secs(5))
    }
}

fn kms_router() -> Router {
    let service = KmsService::new(MasterKeyTable::demo().unwrap(), AuthorizationPolicy::tier_names());
    build_router(Arc::new(service), DEFAULT_BODY_LIMIT_BYTES)
}

#[tokio::test]
async fn wrap_then_unwrap_round_trips() {
    let server = TestServer::start(kms_router()).await;
    let client = KmsClient::new(server.config().with_credential("CONFIDENTIAL")).unwrap();

    let key = [0x3cu8; 32];
    let wrapped = client.wrap_key(&key, Tier::Confidential).await.unwrap();
    assert_eq!(wrapped.len(), 40);
    assert_ne!(&wrapped[8..], &key[..]);

    let unwrapped = client.unwrap_key(&wrapped, Tier::Confidential).await.unwrap();
    assert_eq!(unwrapped, key);

    // Lower tiers are cleared by the same credential.
    let wrapped = client.wrap_key(&key[..16], Tier::Internal).await.unwrap();
    assert_eq!(client.unwrap_key(&wrapped, Tier::Internal).await.unwrap(), &key[..16]);
}

#[tokio::test]
async fn credential_header_decides_unwrap() {
    let server = TestServer::start(kms_router()).await;
    let anonymous = KmsClient::new(server.config()).unwrap();
    let internal = KmsClient::new(server.config().with_credential("INTERNAL")).unwrap();

    let wrapped = anonymous.wrap_key(&[1u8; 16], Tier::Internal).await.unwrap();

    let err = anonymous.unwrap_key(&wrapped, Tier::Internal).await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(ref m) if m == "forbidden"), "got {:?}", err);
    assert!(!err.is_retryable());

    assert_eq!(internal.unwrap_key(&wrapped, Tier::Internal).await.unwrap(), [1u8; 16]);

    let public = anonymous.wrap_key(&[2u8; 16], Tier::Public).await.unwrap();
    assert_eq!(anonymous.unwrap_key(&public, Tier::Public).await.unwrap(), [2u8; 16]);
}

#[tokio::test]
async fn remote_failures_keep_their_kind() {
    let server = TestServer::start(kms_router()).await;
    let client: Arc<dyn KeyWrapper> =
        Arc::new(KmsClient::new(server.config().with_credential("RESTRICTED")).unwrap());

    let err = client.unwrap(&[0u8; 24], Tier::Restricted).await.unwrap_err();
    assert!(matches!(err, ClientError::UnprocessableKey(_)), "got {:?}", err);

    let err = client.wrap(&[0u8; 15], Tier::Public).await.unwrap_err();
    assert!(
        matches!(err, ClientError::BadRequest(ref m) if m == "key length must be a multiple of 8 bytes"),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn untrusted_certificate_is_not_retryable() {
    let server = TestServer::start(kms_router()).await;
    // Platform trust store only; the test certificate is self-signed.
    let config = KmsClientConfig::new(server.base_url.clone()).with_timeout(Duration::from_secs(5));
    let client = KmsClient::new(config).unwrap();

    let err = client.wrap_key(&[0u8; 16], Tier::Public).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn stalled_response_body_times_out() {
    let router = Router::new().route(
        "/api/v1/wrap/:tier_id",
        post(|| async {
            let stalled = futures::stream::once(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, std::io::Error>(r#"{"key":""}"#)
            });
            Body::from_stream(stalled)
        }),
    );
    let server = TestServer::start(router).await;
    let client = KmsClient::new(server.config().with_timeout(Duration::from_secs(1))).unwrap();

    let err = client.wrap_key(&[0u8; 16], Tier::Public).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout), "got {:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn stalled_response_headers_time_out() {
    let router = Router::new().route(
        "/api/v1/unwrap/:tier_id",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "late"
        }),
    );
    let server = TestServer::start(router).await;
    let client = KmsClient::new(server.config().with_timeout(Duration::from_secs(1))).unwrap();

    let err = client.unwrap_key(&[0u8; 24], Tier::Public).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout), "got {:?}", err);
}
