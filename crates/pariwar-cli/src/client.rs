//! Async HTTP client wrapping the pariwar JSON API.
//!
//! [`ApiClient`] implements [`RecordStore`], so the form and list controllers
//! run unchanged against the remote server or a local store.

use std::time::Duration;

use futures_util::StreamExt as _;
use pariwar_core::{
  feed::SnapshotFeed,
  record::{Record, RecordFields},
  snapshot::Snapshot,
  store::RecordStore,
  subscription::Subscription,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::sse::SseDecoder;

/// Connection settings for the pariwar API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}: {message}")]
  Status {
    method:  &'static str,
    path:    String,
    status:  StatusCode,
    message: String,
  },

  #[error("malformed snapshot: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Body of a non-2xx API response.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the pariwar JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  /// Only the connect phase is bounded; the snapshot stream stays open
  /// indefinitely.
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }
}

/// Pass 2xx responses through; turn anything else into [`ClientError::Status`].
async fn check(
  method: &'static str,
  path: &str,
  resp: Response,
) -> Result<Response, ClientError> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = match resp.json::<ErrorBody>().await {
    Ok(body) => body.error,
    Err(_) => status.canonical_reason().unwrap_or_default().to_owned(),
  };
  Err(ClientError::Status {
    method,
    path: path.to_owned(),
    status,
    message,
  })
}

impl RecordStore for ApiClient {
  type Error = ClientError;

  /// `POST /api/records`
  async fn create(&self, fields: RecordFields) -> Result<Record, ClientError> {
    let resp = self
      .client
      .post(self.url("/records"))
      .json(&fields)
      .send()
      .await?;
    Ok(check("POST", "/records", resp).await?.json().await?)
  }

  /// `GET /api/records/<id>`
  async fn get(&self, id: Uuid) -> Result<Option<Record>, ClientError> {
    let path = format!("/records/{id}");
    let resp = self.client.get(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Ok(Some(check("GET", &path, resp).await?.json().await?))
  }

  /// `PUT /api/records/<id>`
  async fn update(
    &self,
    id: Uuid,
    fields: RecordFields,
  ) -> Result<Option<Record>, ClientError> {
    let path = format!("/records/{id}");
    let resp = self
      .client
      .put(self.url(&path))
      .json(&fields)
      .send()
      .await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Ok(Some(check("PUT", &path, resp).await?.json().await?))
  }

  /// `DELETE /api/records/<id>`
  async fn delete(&self, id: Uuid) -> Result<bool, ClientError> {
    let path = format!("/records/{id}");
    let resp = self.client.delete(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    check("DELETE", &path, resp).await?;
    Ok(true)
  }

  /// `GET /api/records`
  async fn list(&self) -> Result<Snapshot, ClientError> {
    let resp = self.client.get(self.url("/records")).send().await?;
    Ok(check("GET", "/records", resp).await?.json().await?)
  }

  /// `GET /api/snapshots`, consumed on a background task.
  ///
  /// Connection and decode failures arrive on the subscription as failure
  /// events; nothing is retried. Dropping the subscription closes the stream.
  async fn subscribe(&self) -> Result<Subscription, ClientError> {
    let feed = SnapshotFeed::new();
    let subscription = feed.subscribe();
    let request = self
      .client
      .get(self.url("/snapshots"))
      .header(header::ACCEPT, "text/event-stream");
    tokio::spawn(pump_snapshots(request, feed));
    Ok(subscription)
  }
}

async fn pump_snapshots(request: RequestBuilder, feed: SnapshotFeed) {
  tokio::select! {
    () = feed.closed() => tracing::debug!("snapshot subscription dropped"),
    result = read_snapshots(request, &feed) => {
      let message = match result {
        Ok(()) => "snapshot stream closed by server".to_owned(),
        Err(e) => e.to_string(),
      };
      tracing::error!(%message, "live query ended");
      feed.fail(message);
    }
  }
}

async fn read_snapshots(
  request: RequestBuilder,
  feed: &SnapshotFeed,
) -> Result<(), ClientError> {
  let resp = check("GET", "/snapshots", request.send().await?).await?;
  tracing::info!("snapshot stream connected");

  let mut decoder = SseDecoder::default();
  let mut body = resp.bytes_stream();
  while let Some(chunk) = body.next().await {
    for frame in decoder.push(&chunk?) {
      match frame.event.as_deref() {
        Some("snapshot") => {
          let snapshot: Snapshot = serde_json::from_str(&frame.data)?;
          feed.publish(snapshot);
        }
        Some("error") => feed.fail(frame.data),
        other => tracing::debug!(event = ?other, "ignoring event"),
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::Router;
  use pariwar_core::feed::SnapshotEvent;
  use pariwar_store_sqlite::SqliteStore;
  use tokio::{net::TcpListener, time::timeout};

  use super::*;

  /// Serve the API over a real socket and point a client at it.
  async fn serve() -> (Arc<SqliteStore>, ApiClient, String) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let app = Router::new().nest("/api", pariwar_api::api_router(Arc::clone(&store)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, app).await });

    let client = ApiClient::new(ApiConfig { base_url: base_url.clone() }).unwrap();
    (store, client, base_url)
  }

  /// Next snapshot from `sub`, panicking on a failure event.
  async fn next_snapshot(sub: &mut Subscription) -> Arc<Snapshot> {
    let event = timeout(Duration::from_secs(5), sub.next())
      .await
      .expect("event in time")
      .expect("subscription open");
    match event {
      SnapshotEvent::Snapshot(s) => s,
      SnapshotEvent::Failed(e) => panic!("live query failed: {e}"),
    }
  }

  // ─── Requests ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_get_update_roundtrip() {
    let (_store, client, _) = serve().await;

    let created = client.create(RecordFields::new("1", "Ram")).await.unwrap();
    assert_eq!(client.get(created.id).await.unwrap(), Some(created.clone()));

    let mut fields = created.fields.clone();
    fields.father_name = "Dasharath".into();
    let updated = client.update(created.id, fields).await.unwrap().unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.fields.father_name, "Dasharath");
  }

  #[tokio::test]
  async fn missing_records_map_to_none_and_false() {
    let (_store, client, _) = serve().await;
    let id = Uuid::new_v4();

    assert_eq!(client.get(id).await.unwrap(), None);
    assert_eq!(
      client.update(id, RecordFields::new("1", "Ram")).await.unwrap(),
      None
    );
    assert!(!client.delete(id).await.unwrap());
  }

  #[tokio::test]
  async fn delete_reports_whether_a_record_was_removed() {
    let (store, client, _) = serve().await;
    let record = client.create(RecordFields::new("1", "Ram")).await.unwrap();

    assert!(client.delete(record.id).await.unwrap());
    assert!(!client.delete(record.id).await.unwrap());
    assert!(store.list().await.unwrap().records.is_empty());
  }

  #[tokio::test]
  async fn rejected_create_carries_the_server_message() {
    let (store, client, _) = serve().await;

    let err = client.create(RecordFields::new("1", "")).await.unwrap_err();
    match err {
      ClientError::Status { method, path, status, message } => {
        assert_eq!(method, "POST");
        assert_eq!(path, "/records");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("Name"), "{message}");
      }
      other => panic!("unexpected error: {other}"),
    }
    assert!(store.list().await.unwrap().records.is_empty());
  }

  #[tokio::test]
  async fn error_without_json_body_falls_back_to_reason() {
    let (_store, _, base_url) = serve().await;
    let client = ApiClient::new(ApiConfig { base_url: format!("{base_url}/elsewhere") }).unwrap();

    let err = client.list().await.unwrap_err();
    match err {
      ClientError::Status { status, message, .. } => {
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Not Found");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn list_is_ordered_by_serial_number() {
    let (_store, client, _) = serve().await;
    client.create(RecordFields::new("2", "Shyam")).await.unwrap();
    client.create(RecordFields::new("10", "Hari")).await.unwrap();

    let snapshot = client.list().await.unwrap();
    let serials: Vec<&str> = snapshot
      .records
      .iter()
      .map(|r| r.fields.serial_number.as_str())
      .collect();
    assert_eq!(serials, ["10", "2"]);
  }

  // ─── Live query ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn subscription_follows_server_snapshots() {
    let (_store, client, _) = serve().await;
    let mut sub = client.subscribe().await.unwrap();

    let initial = next_snapshot(&mut sub).await;
    assert!(initial.records.is_empty());

    client.create(RecordFields::new("1", "Ram")).await.unwrap();
    let after = next_snapshot(&mut sub).await;
    assert!(after.supersedes(&initial));
    assert_eq!(after.records.len(), 1);
    assert_eq!(after.records[0].fields.name, "Ram");
  }

  #[tokio::test]
  async fn unreachable_server_surfaces_as_a_failure_event() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = ApiClient::new(ApiConfig { base_url }).unwrap();
    let mut sub = client.subscribe().await.unwrap();
    let event = timeout(Duration::from_secs(5), sub.next())
      .await
      .expect("event in time");
    assert!(matches!(event, Some(SnapshotEvent::Failed(_))));
  }

  #[tokio::test]
  async fn dropping_the_subscription_closes_the_stream() {
    let (store, client, _) = serve().await;
    let baseline = store.subscriber_count();

    let mut sub = client.subscribe().await.unwrap();
    next_snapshot(&mut sub).await;
    assert_eq!(store.subscriber_count(), baseline + 1);

    drop(sub);
    // The server notices the closed connection on its next write.
    timeout(Duration::from_secs(5), async {
      let mut serial = 0;
      while store.subscriber_count() > baseline {
        serial += 1;
        store
          .create(RecordFields::new(serial.to_string(), "Ram"))
          .await
          .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
      }
    })
    .await
    .expect("server-side subscription released");
  }
}
