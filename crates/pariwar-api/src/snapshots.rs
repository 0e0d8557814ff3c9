//! Handler for `GET /snapshots` — the live query as Server-Sent Events.
//!
//! Each event is either `snapshot` (data: JSON
//! [`Snapshot`](pariwar_core::snapshot::Snapshot)) or `error`
//! (data: a message). The first event reflects the collection at connect
//! time. Keep-alive comments are sent while the collection is idle.

use std::{convert::Infallible, sync::Arc};

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use pariwar_core::{feed::SnapshotEvent, store::RecordStore};

use crate::error::ApiError;

/// `GET /snapshots`
pub async fn stream<S>(
  State(store): State<Arc<S>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError>
where
  S: RecordStore,
{
  let subscription = store.subscribe().await.map_err(ApiError::store)?;
  tracing::info!("snapshot subscriber connected");

  let events = stream::unfold(subscription, |mut sub| async move {
    let event = sub.next().await?;
    Some((Ok(to_sse(&event)), sub))
  });

  Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_sse(event: &SnapshotEvent) -> Event {
  match event {
    SnapshotEvent::Snapshot(snapshot) => match Event::default()
      .event("snapshot")
      .json_data(snapshot.as_ref())
    {
      Ok(e) => e,
      Err(e) => {
        tracing::error!(error = %e, "could not encode snapshot");
        Event::default().event("error").data(e.to_string())
      }
    },
    SnapshotEvent::Failed(e) => Event::default().event("error").data(e.to_string()),
  }
}
