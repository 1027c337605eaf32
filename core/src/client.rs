use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

use deck_common::{GenerationRequest, MarkerSet};

/// One event on a model output stream. `Completed` and `Error` are terminal;
/// nothing follows them.
#[derive(Debug, Clone)]
pub enum ResponseEvent {
    TextDelta(String),
    Completed,
    Error(String),
}

#[async_trait]
pub trait ModelClient {
    async fn stream(&self, prompt: String) -> Result<Receiver<ResponseEvent>>;
}

/// Offline client: streams a canned, correctly delimited transcript in
/// deliberately awkward chunk sizes. Lets `deck generate` run end-to-end
/// without an API key and doubles as a live demo of chunk tolerance.
pub struct StubClient {
    request: GenerationRequest,
}

impl StubClient {
    pub fn new(request: GenerationRequest) -> Self {
        Self { request }
    }

    fn transcript(request: &GenerationRequest) -> String {
        let markers = MarkerSet::default();
        let mut out = format!("{{\"main_title\": \"{}\"}}\n", request.topic);
        for i in 1..=request.num_slides.max(1) {
            let layout = if i == 1 { "title_only" } else { "title_content" };
            out.push_str(&format!(
                "{}\n{{\"title\":\"Section {i}\",\"content\":\"Notes on {} ({i})\",\"layout\":\"{layout}\",\"keyPoints\":[\"point one\",\"point two\"]}}\n{}\n",
                markers.slide_start, request.topic, markers.slide_end
            ));
        }
        out.push_str(&markers.presentation_complete);
        out
    }
}

#[async_trait]
impl ModelClient for StubClient {
    async fn stream(&self, _prompt: String) -> Result<Receiver<ResponseEvent>> {
        let transcript = Self::transcript(&self.request);
        let (tx, rx) = tokio::sync::mpsc::channel(32);
        tokio::spawn(async move {
            // Uneven splits on purpose, including mid-marker.
            let mut rest = transcript.as_str();
            let sizes = [7usize, 13, 3, 41, 11, 29];
            let mut i = 0;
            while !rest.is_empty() {
                let mut n = sizes[i % sizes.len()].min(rest.len());
                while !rest.is_char_boundary(n) {
                    n += 1;
                }
                let (head, tail) = rest.split_at(n);
                if tx.send(ResponseEvent::TextDelta(head.to_string())).await.is_err() {
                    return;
                }
                rest = tail;
                i += 1;
            }
            let _ = tx.send(ResponseEvent::Completed).await;
        });
        Ok(rx)
    }
}

/// Adapter wrapping the OpenAI streaming client into `ModelClient`.
pub struct OpenAiAdapter {
    inner: deck_chatgpt::OpenAiModelClient,
}

impl OpenAiAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            inner: deck_chatgpt::OpenAiModelClient::new(api_key),
        }
    }

    pub fn new_with_model(api_key: String, model: String) -> Self {
        Self {
            inner: deck_chatgpt::OpenAiModelClient::new_with_model(api_key, model),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiAdapter {
    async fn stream(&self, prompt: String) -> Result<Receiver<ResponseEvent>> {
        let mut rx_chat = self.inner.stream_chat(prompt).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(64);
        tokio::spawn(async move {
            while let Some(ev) = rx_chat.recv().await {
                let mapped = match ev {
                    deck_chatgpt::ChatStreamEvent::Delta(text) => ResponseEvent::TextDelta(text),
                    deck_chatgpt::ChatStreamEvent::Done => ResponseEvent::Completed,
                    deck_chatgpt::ChatStreamEvent::Failed(message) => ResponseEvent::Error(message),
                };
                let terminal = !matches!(mapped, ResponseEvent::TextDelta(_));
                if tx.send(mapped).await.is_err() || terminal {
                    return;
                }
            }
            let _ = tx.send(ResponseEvent::Completed).await;
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_client_streams_terminal_marker() {
        let client = StubClient::new(GenerationRequest::new("Rust"));
        let mut rx = client.stream(String::new()).await.unwrap();
        let mut text = String::new();
        let mut completed = false;
        while let Some(ev) = rx.recv().await {
            match ev {
                ResponseEvent::TextDelta(t) => text.push_str(&t),
                ResponseEvent::Completed => {
                    completed = true;
                    break;
                }
                ResponseEvent::Error(e) => panic!("stub errored: {e}"),
            }
        }
        assert!(completed);
        assert!(text.contains("\"main_title\": \"Rust\""));
        assert!(text.ends_with(deck_common::PRESENTATION_COMPLETE));
    }
}
