//! reply-desk binary.
//!
//! Wires configuration, adapters and handlers together, then serves
//! newline-delimited JSON requests on stdin and writes one JSON response per
//! line to stdout. Logs go to stderr.
//!
//! ```text
//! {"type":"message","handle":"@ana","text":"Do you ship to Canada?","sentiment":0.2}
//! {"type":"feedback","originalPrompt":"...","originalResponse":"...","correctedResponse":"..."}
//! {"type":"train"}
//! {"type":"stats"}
//! {"type":"history","conversationId":"@ana"}
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use reply_desk::adapters::ai::provider_from_config;
use reply_desk::adapters::storage::{
    InMemoryConversationStore, InMemoryFeedbackStore, InMemoryTrainingLog, JsonFileFeedbackStore,
    JsonFileTrainingLog,
};
use reply_desk::application::{
    InboundMessage, ReplyError, ReplyOrchestrator, RetrainOutcome, RetrainScheduler,
    RetrainTrigger, SubmitFeedbackCommand, SubmitFeedbackHandler, FALLBACK_REPLY,
};
use reply_desk::config::{AppConfig, LoggingConfig, StorageBackend};
use reply_desk::domain::conversation::FaqCache;
use reply_desk::domain::feedback::NewFeedback;
use reply_desk::domain::foundation::ConversationKey;
use reply_desk::ports::{FeedbackStore, TrainingSink};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One line of input.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Request {
    Message {
        handle: String,
        #[serde(default, rename = "conversationId")]
        conversation_id: Option<String>,
        text: String,
        sentiment: f32,
    },
    Feedback(NewFeedback),
    Train,
    Stats,
    History {
        #[serde(rename = "conversationId")]
        conversation_id: String,
    },
}

struct App {
    orchestrator: ReplyOrchestrator,
    submit_feedback: SubmitFeedbackHandler,
    trigger: Arc<RetrainTrigger>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.validate() {
        eprintln!("Invalid configuration: {}", err);
        return ExitCode::FAILURE;
    }

    init_tracing(&config.logging);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "reply-desk stopped with an error");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    if let Some(implied) = config.reply.threshold_mismatch() {
        tracing::warn!(
            escalation_threshold = config.reply.escalation_threshold,
            implied_cutoff = implied,
            severe_sentiment_cutoff = config.reply.severe_sentiment_cutoff,
            "escalation_threshold is not used by the classifier; severe_sentiment_cutoff applies"
        );
    }

    let app = build(&config).await?;
    let scheduler = RetrainScheduler::new(Arc::clone(&app.trigger))
        .with_interval(config.training.interval())
        .with_check_on_start(config.training.check_on_start)
        .start();

    tracing::info!("reply-desk ready, reading requests from stdin");
    let served = serve(&app).await;

    scheduler.stop().await;
    tracing::info!(stats = ?app.orchestrator.stats(), "reply-desk shut down");
    served
}

async fn build(config: &AppConfig) -> Result<App, BoxError> {
    let provider = provider_from_config(&config.ai)?;

    let feedback_store: Arc<dyn FeedbackStore> = match config.feedback.backend {
        StorageBackend::File => {
            Arc::new(JsonFileFeedbackStore::open(&config.feedback.store_path).await?)
        }
        StorageBackend::Memory => Arc::new(InMemoryFeedbackStore::new()),
    };
    let sink: Arc<dyn TrainingSink> = match config.training.backend {
        StorageBackend::File => Arc::new(JsonFileTrainingLog::new(&config.training.log_path)),
        StorageBackend::Memory => Arc::new(InMemoryTrainingLog::new()),
    };

    let faq = Arc::new(RwLock::new(FaqCache::new()));
    let trigger = Arc::new(
        RetrainTrigger::new(Arc::clone(&feedback_store), sink)
            .with_threshold(config.feedback.threshold),
    );

    let orchestrator = ReplyOrchestrator::new(
        Arc::new(InMemoryConversationStore::new()),
        provider,
        Arc::clone(&faq),
    )
    .configured(&config.reply, &config.ai);
    let submit_feedback = SubmitFeedbackHandler::new(feedback_store, faq, Arc::clone(&trigger));

    Ok(App {
        orchestrator,
        submit_feedback,
        trigger,
    })
}

async fn serve(app: &App) -> Result<(), BoxError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(app, request).await,
            Err(err) => json!({ "ok": false, "error": format!("invalid request: {}", err) }),
        };

        stdout.write_all(response.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
}

async fn dispatch(app: &App, request: Request) -> Value {
    match request {
        Request::Message {
            handle,
            conversation_id,
            text,
            sentiment,
        } => {
            let mut message = InboundMessage::new(handle, text, sentiment);
            message.conversation_id = conversation_id;

            match app.orchestrator.handle(message).await {
                Ok(outcome) => json!({
                    "ok": true,
                    "conversationId": outcome.conversation,
                    "reply": outcome.reply,
                    "escalated": outcome.escalated(),
                    "detail": outcome.route,
                }),
                Err(ReplyError::ProviderUnavailable(reason)) => json!({
                    "ok": true,
                    "reply": FALLBACK_REPLY,
                    "escalated": false,
                    "degraded": reason,
                }),
                Err(err) => json!({ "ok": false, "error": err.to_string() }),
            }
        }

        Request::Feedback(feedback) => {
            match app
                .submit_feedback
                .handle(SubmitFeedbackCommand { feedback })
                .await
            {
                Ok(result) => json!({
                    "ok": true,
                    "id": result.id,
                    "count": result.total,
                    "retrainStarted": result.retrain_started,
                }),
                Err(err) => json!({ "ok": false, "error": err.to_string() }),
            }
        }

        Request::Train => match app.trigger.run().await {
            Ok(RetrainOutcome::Completed { applied, pending }) => {
                json!({ "ok": true, "status": "completed", "applied": applied, "pending": pending })
            }
            Ok(RetrainOutcome::NoOp) => json!({ "ok": true, "status": "no_op" }),
            Ok(RetrainOutcome::Skipped) => json!({ "ok": true, "status": "skipped" }),
            Err(err) => json!({ "ok": false, "error": err.to_string() }),
        },

        Request::Stats => json!({ "ok": true, "stats": app.orchestrator.stats() }),

        Request::History { conversation_id } => {
            let history = match ConversationKey::new(conversation_id) {
                Ok(key) => app.orchestrator.history(&key).await.map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            match history {
                Ok(messages) => json!({ "ok": true, "messages": messages }),
                Err(error) => json!({ "ok": false, "error": error }),
            }
        }
    }
}
