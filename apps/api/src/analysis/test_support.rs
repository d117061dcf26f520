use std::sync::Mutex;

use async_trait::async_trait;

use crate::analysis::extractor::EncodedDocumentPart;
use crate::llm_client::{LlmError, ModelClient};

/// Recording `ModelClient` used by the analysis and router tests.
pub struct FakeModel {
    pub calls: Mutex<Vec<(String, EncodedDocumentPart, String)>>,
    reply: Result<String, String>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Ok(text.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Err(message.to_string()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn submit(
        &self,
        instruction: &str,
        document_part: &EncodedDocumentPart,
        text: &str,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((
            instruction.to_string(),
            document_part.clone(),
            text.to_string(),
        ));
        self.reply.clone().map_err(|message| LlmError::Api {
            status: 400,
            message,
        })
    }
}
