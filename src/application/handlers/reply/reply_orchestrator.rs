//! ReplyOrchestrator - Handles one inbound post end to end.
//!
//! Each turn either escalates (canned reply, flagged user turn, no provider
//! call), is answered from the FAQ cache, or is composed by the provider and
//! sanitized. Turns on the same conversation are serialized so history stays
//! in arrival order; turns on different conversations run concurrently.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::{AiConfig, ReplyConfig};
use crate::domain::conversation::{
    describe_turn, plain_handle, select_persona, user_turns, ContextBuilder, EscalationPolicy,
    EscalationReason, FaqCache, Message, Persona, PersonaPrompts, ResponseSanitizer,
    SanitizerLimits, SentimentLabel,
};
use crate::domain::foundation::{ConversationKey, ValidationError};
use crate::ports::{
    CompletionParams, CompletionProvider, CompletionRequest, ConversationStore, ProviderError,
    StorageError,
};

/// Degraded reply callers send when the provider is unavailable.
pub const FALLBACK_REPLY: &str = "Sorry, we couldn't generate a response at this time.";

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// An inbound post with its externally computed sentiment.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Author handle, with or without a leading `@`.
    pub handle: String,
    /// Thread identifier; defaults to the handle.
    pub conversation_id: Option<String>,
    pub text: String,
    /// Sentiment score in `[-1, 1]`.
    pub sentiment: f32,
}

impl InboundMessage {
    pub fn new(handle: impl Into<String>, text: impl Into<String>, sentiment: f32) -> Self {
        Self {
            handle: handle.into(),
            conversation_id: None,
            text: text.into(),
            sentiment,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    fn validate(&self) -> Result<ConversationKey, ValidationError> {
        if self.handle.trim().is_empty() {
            return Err(ValidationError::empty_field("handle"));
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        if !self.sentiment.is_finite() || !(-1.0..=1.0).contains(&self.sentiment) {
            return Err(ValidationError::out_of_range(
                "sentiment",
                -1.0,
                1.0,
                f64::from(self.sentiment),
            ));
        }

        match &self.conversation_id {
            Some(id) if !id.trim().is_empty() => ConversationKey::new(id.trim()),
            _ => ConversationKey::new(self.handle.trim()),
        }
    }
}

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum ReplyRoute {
    Escalated { reason: EscalationReason },
    Faq,
    Composed { persona: Persona },
}

/// Result of a handled turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOutcome {
    pub conversation: ConversationKey,
    pub reply: String,
    pub route: ReplyRoute,
}

impl ReplyOutcome {
    pub fn escalated(&self) -> bool {
        matches!(self.route, ReplyRoute::Escalated { .. })
    }
}

/// Errors that can occur when handling a turn.
#[derive(Debug, Clone, Error)]
pub enum ReplyError {
    /// Any provider failure: error, timeout or unusable output.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ProviderError> for ReplyError {
    fn from(err: ProviderError) -> Self {
        ReplyError::ProviderUnavailable(err.to_string())
    }
}

/// Snapshot of reply counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyStats {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub escalated: u64,
    pub faq_answers: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    total: AtomicU64,
    positive: AtomicU64,
    negative: AtomicU64,
    neutral: AtomicU64,
    escalated: AtomicU64,
    faq_answers: AtomicU64,
}

impl StatsCounters {
    fn record_turn(&self, sentiment: f32) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let bucket = match SentimentLabel::from_score(sentiment) {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Negative => &self.negative,
            SentimentLabel::Neutral => &self.neutral,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ReplyStats {
        ReplyStats {
            total: self.total.load(Ordering::Relaxed),
            positive: self.positive.load(Ordering::Relaxed),
            negative: self.negative.load(Ordering::Relaxed),
            neutral: self.neutral.load(Ordering::Relaxed),
            escalated: self.escalated.load(Ordering::Relaxed),
            faq_answers: self.faq_answers.load(Ordering::Relaxed),
        }
    }
}

type ConversationLocks = HashMap<ConversationKey, Arc<tokio::sync::Mutex<()>>>;

/// Composes escalation, persona selection, context assembly, the provider
/// call and sanitization into one turn.
pub struct ReplyOrchestrator {
    conversations: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    faq: Arc<RwLock<FaqCache>>,
    policy: EscalationPolicy,
    prompts: PersonaPrompts,
    context: ContextBuilder,
    sanitizer: ResponseSanitizer,
    params: CompletionParams,
    timeout: Duration,
    rng: Mutex<StdRng>,
    locks: Mutex<ConversationLocks>,
    stats: StatsCounters,
}

impl ReplyOrchestrator {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        provider: Arc<dyn CompletionProvider>,
        faq: Arc<RwLock<FaqCache>>,
    ) -> Self {
        Self {
            conversations,
            provider,
            faq,
            policy: EscalationPolicy::default(),
            prompts: PersonaPrompts::default(),
            context: ContextBuilder::default(),
            sanitizer: ResponseSanitizer::new(),
            params: CompletionParams::default(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            rng: Mutex::new(StdRng::from_entropy()),
            locks: Mutex::new(HashMap::new()),
            stats: StatsCounters::default(),
        }
    }

    /// Applies reply and provider settings.
    pub fn configured(self, reply: &ReplyConfig, ai: &AiConfig) -> Self {
        let orchestrator = self
            .with_policy(reply.escalation_policy())
            .with_prompts(reply.persona_prompts())
            .with_context_builder(reply.context_builder())
            .with_limits(reply.sanitizer_limits())
            .with_params(ai.params())
            .with_timeout(ai.timeout());
        match reply.canned_reply_seed {
            Some(seed) => orchestrator.with_seed(seed),
            None => orchestrator,
        }
    }

    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_prompts(mut self, prompts: PersonaPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_context_builder(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    pub fn with_limits(mut self, limits: SanitizerLimits) -> Self {
        self.sanitizer = ResponseSanitizer::with_limits(limits);
        self
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    /// Upper bound on a single provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Makes canned reply selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Handles one inbound post.
    ///
    /// # Errors
    ///
    /// `ReplyError::ProviderUnavailable` when the provider fails, times out or
    /// returns nothing usable. No messages are recorded in that case and the
    /// caller answers with [`FALLBACK_REPLY`].
    pub async fn handle(&self, message: InboundMessage) -> Result<ReplyOutcome, ReplyError> {
        let key = message.validate()?;
        self.stats.record_turn(message.sentiment);

        let lock = self.conversation_lock(&key);
        let _turn = lock.lock().await;

        let history = self.conversations.history(&key).await?;
        let prior_user_turns = user_turns(&history);
        let turn = describe_turn(&message.handle, &message.text, message.sentiment);

        // 1. Escalation takes precedence over everything else
        if let Some(reason) = self
            .policy
            .classify(&message.text, message.sentiment, prior_user_turns)
        {
            self.conversations
                .append(&key, vec![Message::user(turn).flagged()])
                .await?;
            self.stats.escalated.fetch_add(1, Ordering::Relaxed);
            tracing::info!(conversation = %key, reason = ?reason, "Turn escalated to human review");

            return Ok(ReplyOutcome {
                conversation: key,
                reply: self.canned_reply(plain_handle(&message.handle)),
                route: ReplyRoute::Escalated { reason },
            });
        }

        // 2. Known question answered from the FAQ cache
        let cached = self.faq.read().await.lookup(&message.text).map(str::to_string);
        if let Some(answer) = cached {
            self.conversations
                .append(&key, vec![Message::user(turn), Message::assistant(answer.clone())])
                .await?;
            self.stats.faq_answers.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(conversation = %key, "Answered from FAQ cache");

            return Ok(ReplyOutcome {
                conversation: key,
                reply: answer,
                route: ReplyRoute::Faq,
            });
        }

        // 3. Compose with the provider
        let persona = select_persona(&message.text, message.sentiment);
        let messages = self
            .context
            .build(self.prompts.prompt_for(persona), &history, &turn);
        let request = CompletionRequest::new(messages, self.params);
        let trace_id = request.trace_id.clone();

        let reply = match self.compose(request, &message.handle).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    conversation = %key,
                    trace_id = %trace_id,
                    error = %err,
                    "Provider unavailable, no reply recorded"
                );
                return Err(err.into());
            }
        };

        self.conversations
            .append(&key, vec![Message::user(turn), Message::assistant(reply.clone())])
            .await?;
        tracing::info!(
            conversation = %key,
            persona = ?persona,
            chars = reply.chars().count(),
            "Reply composed"
        );

        Ok(ReplyOutcome {
            conversation: key,
            reply,
            route: ReplyRoute::Composed { persona },
        })
    }

    /// Full recorded history of a conversation.
    pub async fn history(&self, key: &ConversationKey) -> Result<Vec<Message>, ReplyError> {
        Ok(self.conversations.history(key).await?)
    }

    pub fn stats(&self) -> ReplyStats {
        self.stats.snapshot()
    }

    async fn compose(
        &self,
        request: CompletionRequest,
        handle: &str,
    ) -> Result<String, ProviderError> {
        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ProviderError::timeout(self.timeout.as_secs()))??;

        if !response.content.chars().any(char::is_alphanumeric) {
            return Err(ProviderError::malformed("no usable text in completion"));
        }

        let reply = self.sanitizer.sanitize(&response.content, Some(handle));
        if !reply.chars().any(char::is_alphanumeric) {
            return Err(ProviderError::malformed("completion was empty after cleanup"));
        }
        Ok(reply)
    }

    fn canned_reply(&self, name: &str) -> String {
        let pick = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..CANNED_REPLIES);
        canned_reply(pick, name)
    }

    fn conversation_lock(&self, key: &ConversationKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }
}

const CANNED_REPLIES: usize = 4;

fn canned_reply(index: usize, name: &str) -> String {
    match index % CANNED_REPLIES {
        0 => format!(
            "Hi {}, thanks for reaching out! I've passed this to our team who will look into it right away.",
            name
        ),
        1 => format!(
            "Hey {}, I appreciate you bringing this to our attention. Our team is reviewing this now and will get back to you shortly.",
            name
        ),
        2 => format!(
            "{}, thanks for your message. We're looking into this for you and someone will follow up soon.",
            name
        ),
        _ => format!(
            "I've shared this with our specialist team, {}. They'll be in touch with you very soon.",
            name
        ),
    }
}
