//! Integration tests for the reply pipeline.
//!
//! These tests drive `ReplyOrchestrator` through its public API:
//! 1. Escalation short-circuits the provider and flags the user turn
//! 2. Composed replies are sanitized and recorded with the user turn
//! 3. Provider failures record nothing and surface `ProviderUnavailable`
//! 4. Corrections submitted as feedback answer later questions from the FAQ cache
//!
//! Uses in-memory adapters and the mock provider.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use reply_desk::adapters::ai::MockCompletionProvider;
use reply_desk::adapters::storage::{
    InMemoryConversationStore, InMemoryFeedbackStore, InMemoryTrainingLog,
};
use reply_desk::application::{
    InboundMessage, ReplyError, ReplyOrchestrator, ReplyRoute, RetrainTrigger,
    SubmitFeedbackCommand, SubmitFeedbackHandler,
};
use reply_desk::config::{AiConfig, ReplyConfig};
use reply_desk::domain::conversation::{FaqCache, MessageRole, Persona, HARD_CAP_CHARS};
use reply_desk::domain::feedback::NewFeedback;
use reply_desk::domain::foundation::ConversationKey;
use reply_desk::ports::{ConversationStore, ProviderError};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Pipeline {
    orchestrator: ReplyOrchestrator,
    feedback: SubmitFeedbackHandler,
    provider: MockCompletionProvider,
    conversations: Arc<InMemoryConversationStore>,
}

fn pipeline(provider: MockCompletionProvider) -> Pipeline {
    let conversations = Arc::new(InMemoryConversationStore::new());
    let faq = Arc::new(RwLock::new(FaqCache::new()));
    let feedback_store = Arc::new(InMemoryFeedbackStore::new());
    let trigger = Arc::new(RetrainTrigger::new(
        feedback_store.clone(),
        Arc::new(InMemoryTrainingLog::new()),
    ));

    let reply = ReplyConfig {
        canned_reply_seed: Some(42),
        ..ReplyConfig::default()
    };
    let orchestrator = ReplyOrchestrator::new(
        conversations.clone(),
        Arc::new(provider.clone()),
        faq.clone(),
    )
    .configured(&reply, &AiConfig::default());
    let feedback = SubmitFeedbackHandler::new(feedback_store, faq, trigger);

    Pipeline {
        orchestrator,
        feedback,
        provider,
        conversations,
    }
}

fn key(value: &str) -> ConversationKey {
    ConversationKey::new(value).unwrap()
}

// =============================================================================
// Escalation
// =============================================================================

#[tokio::test]
async fn refund_demand_is_escalated_without_provider_call() {
    let p = pipeline(MockCompletionProvider::new().with_response("should not be used"));

    let outcome = p
        .orchestrator
        .handle(InboundMessage::new(
            "@riley",
            "This is broken and I want a refund immediately",
            -0.8,
        ))
        .await
        .unwrap();

    assert!(outcome.escalated());
    assert!(outcome.reply.contains("riley"));
    assert_eq!(p.provider.call_count(), 0);

    let history = p.conversations.history(&key("@riley")).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].escalated);
}

#[tokio::test]
async fn long_question_is_escalated() {
    let p = pipeline(MockCompletionProvider::new());
    let text = format!(
        "{} can you explain how the billing works?",
        "I have a question. ".repeat(12)
    );

    let outcome = p
        .orchestrator
        .handle(InboundMessage::new("riley", text, 0.1))
        .await
        .unwrap();

    assert!(outcome.escalated());
}

// =============================================================================
// Composition
// =============================================================================

#[tokio::test]
async fn overlong_completion_is_cut_to_a_complete_sentence() {
    let long = format!(
        "Thanks for asking! {} We ship worldwide and",
        "Our integrations cover many tools that teams use every day. ".repeat(6)
    );
    let p = pipeline(MockCompletionProvider::new().with_response(long));

    let outcome = p
        .orchestrator
        .handle(InboundMessage::new("riley", "How do I connect the API?", 0.1))
        .await
        .unwrap();

    assert_eq!(
        outcome.route,
        ReplyRoute::Composed {
            persona: Persona::Technical
        }
    );
    assert!(outcome.reply.chars().count() <= HARD_CAP_CHARS);
    assert!(
        outcome.reply.ends_with('.') || outcome.reply.ends_with('!') || outcome.reply.ends_with('?')
    );
}

#[tokio::test]
async fn history_window_bounds_the_request() {
    let mut provider = MockCompletionProvider::new();
    for i in 0..6 {
        provider = provider.with_response(format!("Answer number {}.", i));
    }
    let p = pipeline(provider);

    for i in 0..6 {
        p.orchestrator
            .handle(InboundMessage::new("riley", format!("note {}", i), 0.1))
            .await
            .unwrap();
    }

    let last = p.provider.calls().pop().unwrap();
    // system prompt + 5 history messages + current turn
    assert_eq!(last.messages.len(), 7);
    assert_eq!(last.messages[0].role, MessageRole::System);
    assert_eq!(last.messages[6].role, MessageRole::User);

    let history = p.orchestrator.history(&key("riley")).await.unwrap();
    assert_eq!(history.len(), 12);
}

#[tokio::test]
async fn conversations_do_not_share_history() {
    let p = pipeline(MockCompletionProvider::new());
    p.orchestrator
        .handle(InboundMessage::new("one", "hello", 0.1))
        .await
        .unwrap();
    p.orchestrator
        .handle(InboundMessage::new("two", "hello", 0.1))
        .await
        .unwrap();

    let second = &p.provider.calls()[1];
    // system prompt + current turn only
    assert_eq!(second.messages.len(), 2);
}

// =============================================================================
// Provider failure
// =============================================================================

#[tokio::test]
async fn provider_error_surfaces_as_unavailable_and_records_nothing() {
    let p = pipeline(MockCompletionProvider::new().with_error(ProviderError::network("reset")));

    let err = p
        .orchestrator
        .handle(InboundMessage::new("riley", "hello", 0.1))
        .await
        .unwrap_err();

    assert!(matches!(err, ReplyError::ProviderUnavailable(_)));
    assert!(p.conversations.history(&key("riley")).await.unwrap().is_empty());

    // The next turn still works.
    let outcome = p
        .orchestrator
        .handle(InboundMessage::new("riley", "hello again", 0.1))
        .await
        .unwrap();
    assert!(!outcome.escalated());
}

#[tokio::test(start_paused = true)]
async fn hung_provider_is_bounded_by_the_timeout() {
    let provider = MockCompletionProvider::new().with_delay(Duration::from_secs(3600));
    let p = pipeline(provider);

    let err = p
        .orchestrator
        .handle(InboundMessage::new("riley", "hello", 0.1))
        .await
        .unwrap_err();

    assert!(matches!(err, ReplyError::ProviderUnavailable(_)));
}

// =============================================================================
// FAQ shortcut
// =============================================================================

#[tokio::test]
async fn corrected_answer_is_reused_for_the_same_question() {
    let p = pipeline(MockCompletionProvider::new());

    p.feedback
        .handle(SubmitFeedbackCommand {
            feedback: NewFeedback::new(
                "What are your support hours?",
                "We are open.",
                "Our team is online 9am to 6pm CET, Monday to Friday.",
            ),
        })
        .await
        .unwrap();

    let outcome = p
        .orchestrator
        .handle(InboundMessage::new(
            "riley",
            "Quick one: what are your support hours?",
            0.1,
        ))
        .await
        .unwrap();

    assert_eq!(outcome.route, ReplyRoute::Faq);
    assert_eq!(
        outcome.reply,
        "Our team is online 9am to 6pm CET, Monday to Friday."
    );
    assert_eq!(p.provider.call_count(), 0);
}
