//! Cloudinary client against a loopback stand-in for the upload API

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use chitrapost::storage::cloudinary::sign;
use chitrapost::storage::{CloudinaryStorage, ProviderError, RemoteStorage, SignatureAlgorithm};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

const API_KEY: &str = "123456789";
const API_SECRET: &str = "abcd";
const CLOUD: &str = "demo";

#[derive(Clone)]
struct Stub {
    algorithm: SignatureAlgorithm,
    seen: Arc<parking_lot::Mutex<Vec<HashMap<String, Bytes>>>>,
}

async fn upload(
    State(stub): State<Stub>,
    Path(cloud): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap_or_default();
        fields.insert(name, data);
    }
    stub.seen.lock().push(fields.clone());

    let text = |name: &str| {
        fields
            .get(name)
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default()
    };

    let expected = sign(
        &[
            ("folder", text("folder").as_str()),
            ("timestamp", text("timestamp").as_str()),
        ],
        API_SECRET,
        stub.algorithm,
    );
    if text("api_key") != API_KEY || text("signature") != expected {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "Invalid Signature" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "secure_url": format!("https://res.test/{cloud}/{}/abc.png", text("folder")),
            "url": "http://res.test/insecure.png",
        })),
    )
}

async fn spawn_stub(algorithm: SignatureAlgorithm) -> (String, Stub) {
    let stub = Stub {
        algorithm,
        seen: Arc::default(),
    };
    let app = Router::new()
        .route("/v1_1/{cloud}/image/upload", post(upload))
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{address}/v1_1"), stub)
}

#[tokio::test]
async fn test_signed_upload_returns_secure_url() {
    let (api_base, stub) = spawn_stub(SignatureAlgorithm::Sha1).await;
    let storage = CloudinaryStorage::new(
        &format!("cloudinary://{API_KEY}:{API_SECRET}@{CLOUD}"),
        api_base,
        SignatureAlgorithm::Sha1,
    )
    .unwrap();

    let locator = storage
        .upload(Bytes::from_static(b"\x89PNG\r\n\x1a\nrest"), "chitrapost")
        .await
        .unwrap();

    assert_eq!(locator.as_str(), "https://res.test/demo/chitrapost/abc.png");

    let seen = stub.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["file"].as_ref(), b"\x89PNG\r\n\x1a\nrest");
    assert_eq!(seen[0]["folder"].as_ref(), b"chitrapost");
    assert!(!seen[0].contains_key("signature_algorithm"));
}

#[tokio::test]
async fn test_sha256_signature_is_announced() {
    let (api_base, stub) = spawn_stub(SignatureAlgorithm::Sha256).await;
    let storage = CloudinaryStorage::new(
        &format!("cloudinary://{API_KEY}:{API_SECRET}@{CLOUD}"),
        api_base,
        SignatureAlgorithm::Sha256,
    )
    .unwrap();

    storage
        .upload(Bytes::from_static(b"\xff\xd8\xff\xe0"), "chitrapost")
        .await
        .unwrap();

    let seen = stub.seen.lock();
    assert_eq!(seen[0]["signature_algorithm"].as_ref(), b"sha256");
    assert_eq!(seen[0]["signature"].len(), 64);
}

#[tokio::test]
async fn test_rejection_carries_provider_message() {
    let (api_base, _stub) = spawn_stub(SignatureAlgorithm::Sha1).await;
    let storage = CloudinaryStorage::new(
        &format!("cloudinary://{API_KEY}:wrong-secret@{CLOUD}"),
        api_base,
        SignatureAlgorithm::Sha1,
    )
    .unwrap();

    let err = storage
        .upload(Bytes::from_static(b"\xff\xd8\xff\xe0"), "chitrapost")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Rejected {
            status: 401,
            message: "Invalid Signature".to_string(),
        }
    );
}
