//! Generation session: the Op/Event loop tying prompt construction, the
//! model client, the stream driver, and asset prefetch together.
//!
//! Each `StartGeneration` gets a fresh parser and a fresh asset cache;
//! nothing is shared between requests.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use deck_common::MarkerSet;
use deck_protocol::{Event, Op};

use crate::assets::{AssetCache, AssetPrefetcher, NoopPrefetcher};
use crate::client::ModelClient;
use crate::driver::StreamDriver;

const SUBMISSION_CHANNEL_CAPACITY: usize = 64;

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

struct Inner {
    tx_submit: mpsc::Sender<Op>,
    rx_event: Mutex<UnboundedReceiver<Event>>,
    assets: Arc<Mutex<AssetCache>>,
}

pub struct GenerationSession;

impl GenerationSession {
    pub async fn spawn(client: Arc<dyn ModelClient + Send + Sync>) -> Result<SessionHandle> {
        Self::spawn_with_prefetcher(client, Arc::new(NoopPrefetcher)).await
    }

    pub async fn spawn_with_prefetcher(
        client: Arc<dyn ModelClient + Send + Sync>,
        prefetcher: Arc<dyn AssetPrefetcher + Send + Sync>,
    ) -> Result<SessionHandle> {
        let (tx_submit, mut rx_submit) = mpsc::channel::<Op>(SUBMISSION_CHANNEL_CAPACITY);
        let (tx_event, rx_event) = mpsc::unbounded_channel::<Event>();
        let assets = Arc::new(Mutex::new(AssetCache::new()));

        let _ = tx_event.send(Event::SessionConfigured {});

        let task_assets = Arc::clone(&assets);
        tokio::spawn(async move {
            while let Some(op) = rx_submit.recv().await {
                match op {
                    Op::StartGeneration { request } => {
                        // Each request owns a fresh cache.
                        task_assets.lock().await.clear();
                        let _ = tx_event.send(Event::GenerationStarted);

                        let prompt = deck_chatgpt::build_presentation_prompt(
                            &request,
                            &MarkerSet::default(),
                        );
                        let rx_chunks = match client.stream(prompt).await {
                            Ok(rx) => rx,
                            Err(err) => {
                                let _ = tx_event.send(Event::Error {
                                    message: err.to_string(),
                                });
                                continue;
                            }
                        };

                        let (mut driver, mut rx_snapshots) = StreamDriver::new(rx_chunks);
                        driver.set_slide_callback(slide_hook(
                            tx_event.clone(),
                            Arc::clone(&prefetcher),
                            Arc::clone(&task_assets),
                        ));

                        let tx_snap_events = tx_event.clone();
                        let forward = tokio::spawn(async move {
                            while let Some(snapshot) = rx_snapshots.recv().await {
                                let _ = tx_snap_events.send(Event::Snapshot {
                                    presentation: snapshot,
                                });
                            }
                        });

                        match driver.run().await {
                            Ok(presentation) => {
                                let _ = tx_event.send(Event::Completed { presentation });
                            }
                            Err(err) => {
                                if let Some(partial) = err.partial() {
                                    debug!(
                                        "generation failed with {} slide(s) recovered",
                                        partial.slides.len()
                                    );
                                }
                                let _ = tx_event.send(Event::Error {
                                    message: err.to_string(),
                                });
                            }
                        }
                        let _ = forward.await;
                    }
                    Op::Shutdown => {
                        let _ = tx_event.send(Event::ShutdownComplete);
                        return;
                    }
                }
            }
        });

        Ok(SessionHandle {
            inner: Arc::new(Inner {
                tx_submit,
                rx_event: Mutex::new(rx_event),
                assets,
            }),
        })
    }
}

impl SessionHandle {
    pub async fn submit(&self, op: Op) -> Result<()> {
        self.inner
            .tx_submit
            .send(op)
            .await
            .map_err(|_| anyhow::anyhow!("session task has shut down"))
    }

    pub async fn next_event(&self) -> Option<Event> {
        self.inner.rx_event.lock().await.recv().await
    }

    /// Assets prefetched for the current request.
    pub fn assets(&self) -> Arc<Mutex<AssetCache>> {
        Arc::clone(&self.inner.assets)
    }
}

/// Per-slide hook: announce the slide, then kick off asset prefetch for its
/// image prompt without blocking the parse loop.
fn slide_hook(
    tx_event: UnboundedSender<Event>,
    prefetcher: Arc<dyn AssetPrefetcher + Send + Sync>,
    assets: Arc<Mutex<AssetCache>>,
) -> crate::assembler::SlideCallback {
    Box::new(move |slide, index| {
        let _ = tx_event.send(Event::SlideReady {
            slide: slide.clone(),
            index,
        });
        if slide.image_prompt.is_empty() {
            return;
        }
        let key = slide.image_prompt.clone();
        let prefetcher = Arc::clone(&prefetcher);
        let assets = Arc::clone(&assets);
        tokio::spawn(async move {
            if assets.lock().await.contains(&key) {
                return;
            }
            match prefetcher.fetch(&key).await {
                Ok(bytes) => assets.lock().await.insert(key, bytes),
                Err(err) => warn!("asset prefetch failed for {key:?}: {err}"),
            }
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_common::GenerationRequest;

    use crate::client::StubClient;

    #[tokio::test]
    async fn test_session_streams_events_to_completion() {
        let request = GenerationRequest::new("Streams");
        let client = Arc::new(StubClient::new(request.clone()));
        let session = GenerationSession::spawn(client).await.unwrap();

        session
            .submit(Op::StartGeneration { request })
            .await
            .unwrap();

        let mut saw_started = false;
        let mut slide_events = 0usize;
        let mut snapshots = 0usize;
        loop {
            match session.next_event().await {
                Some(Event::SessionConfigured {}) => {}
                Some(Event::GenerationStarted) => saw_started = true,
                Some(Event::SlideReady { .. }) => slide_events += 1,
                Some(Event::Snapshot { .. }) => snapshots += 1,
                Some(Event::Completed { presentation }) => {
                    assert!(presentation.is_complete);
                    assert_eq!(presentation.main_title.as_deref(), Some("Streams"));
                    assert_eq!(presentation.slides.len(), 6);
                    break;
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(saw_started);
        assert_eq!(slide_events, 6);
        // title snapshot + one per slide + final
        assert_eq!(snapshots, 8);
    }

    #[tokio::test]
    async fn test_shutdown() {
        let client = Arc::new(StubClient::new(GenerationRequest::new("x")));
        let session = GenerationSession::spawn(client).await.unwrap();
        session.submit(Op::Shutdown).await.unwrap();
        loop {
            match session.next_event().await {
                Some(Event::ShutdownComplete) => break,
                Some(_) => {}
                None => panic!("event channel closed before shutdown ack"),
            }
        }
    }
}
