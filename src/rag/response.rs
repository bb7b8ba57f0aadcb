//! RAG response generation.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk};
use crate::config::{CompletionSettings, Prompts};
use crate::embedding::Embedder;
use crate::error::{KildeError, Result};
use crate::openai::create_compatible_client;
use crate::source::SourceKind;
use crate::vector_store::VectorStore;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// RAG engine for mode-scoped question answering.
///
/// Each call is stateless: no conversation history is kept server-side.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    context_builder: ContextBuilder,
    prompts: Prompts,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        completion: &CompletionSettings,
        top_k: usize,
    ) -> Self {
        let context_builder =
            ContextBuilder::new(vector_store, embedder).with_top_k(top_k);

        Self {
            client: create_compatible_client(
                completion.base_url.as_deref(),
                &completion.api_key_env,
            ),
            model: completion.model.clone(),
            temperature: completion.temperature,
            context_builder,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the grounding system prompt for a kind and its retrieved context.
    fn system_prompt(&self, kind: SourceKind, chunks: &[ContextChunk]) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "source_hint".to_string(),
            kind.collection_spec().prompt_hint.to_string(),
        );
        vars.insert("context".to_string(), format_context_for_prompt(chunks));
        self.prompts
            .render_with_custom(&self.prompts.rag.system, &vars)
    }

    /// Answer a question from the collection of `kind`.
    #[instrument(skip(self), fields(question = %question, mode = %kind))]
    pub async fn answer(&self, question: &str, kind: SourceKind) -> Result<RagResponse> {
        info!("Answering question in mode {}", kind);

        let context_chunks = self.context_builder.build(question, kind).await?;
        debug!("Retrieved {} context chunks", context_chunks.len());

        let system_prompt = self.system_prompt(kind, &context_chunks);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.rag.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| KildeError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| KildeError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| KildeError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| KildeError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| KildeError::Rag("Empty response from LLM".to_string()))?
            .clone();

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Source chunks used for the answer.
    pub sources: Vec<ContextChunk>,
}
