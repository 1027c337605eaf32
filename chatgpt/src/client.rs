use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One event on the raw chat stream. `Done` and `Failed` are terminal.
#[derive(Debug, Clone)]
pub enum ChatStreamEvent {
    Delta(String),
    Done,
    Failed(String),
}

/// Minimal OpenAI Chat Completions streaming client.
pub struct OpenAiModelClient {
    api_key: String,
    pub model: String,
}

impl OpenAiModelClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn new_with_model(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }

    pub async fn stream_chat(&self, prompt: String) -> Result<mpsc::Receiver<ChatStreamEvent>> {
        let client = reqwest::Client::new();
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role":"user","content": prompt}],
            "stream": true,
        });

        let mut req = client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json");
        if let Ok(project) = std::env::var("OPENAI_PROJECT") {
            if !project.is_empty() {
                req = req.header("OpenAI-Project", project);
            }
        }
        if let Ok(org) = std::env::var("OPENAI_ORG") {
            if !org.is_empty() {
                req = req.header("OpenAI-Organization", org);
            }
        }
        let resp = req.json(&body).send().await.map_err(|e| anyhow!(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("openai http {status}: {text}"));
        }

        let stream = resp.bytes_stream();
        let (tx, rx) = mpsc::channel::<ChatStreamEvent>(64);
        tokio::spawn(async move {
            use futures::StreamExt;
            let mut buf = Vec::new();
            let mut stream = Box::pin(stream);
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        buf.extend_from_slice(&bytes);
                        // SSE events are separated by a blank line.
                        while let Some(pos) = memchr::memmem::find(&buf, b"\n\n") {
                            let part = buf.drain(..pos + 2).collect::<Vec<u8>>();
                            let Ok(text) = String::from_utf8(part) else {
                                continue;
                            };
                            for line in text.lines() {
                                let line = line.trim_start();
                                let Some(rest) = line.strip_prefix("data: ") else {
                                    continue;
                                };
                                if rest == "[DONE]" {
                                    let _ = tx.send(ChatStreamEvent::Done).await;
                                    return;
                                }
                                match serde_json::from_str::<serde_json::Value>(rest) {
                                    Ok(v) => {
                                        if let Some(delta) =
                                            v["choices"][0]["delta"]["content"].as_str()
                                        {
                                            if tx
                                                .send(ChatStreamEvent::Delta(delta.to_string()))
                                                .await
                                                .is_err()
                                            {
                                                return;
                                            }
                                        }
                                    }
                                    Err(err) => {
                                        debug!("skipping unparseable SSE payload: {err}");
                                    }
                                }
                            }
                        }
                    }
                    Err(err) => {
                        warn!("chat stream transport error: {err}");
                        let _ = tx.send(ChatStreamEvent::Failed(err.to_string())).await;
                        return;
                    }
                }
            }
            let _ = tx.send(ChatStreamEvent::Done).await;
        });
        Ok(rx)
    }
}
