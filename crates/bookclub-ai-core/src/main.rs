use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use bookclub_ai_core::config::Settings;
use bookclub_ai_core::database::{self, Repository};
use bookclub_ai_core::discussion::session_store::RedisSessionStore;
use bookclub_ai_core::discussion::summarizer::Summarizer;
use bookclub_ai_core::discussion::token_budget::TokenizerKind;
use bookclub_ai_core::discussion::{ContextBuilder, DiscussionSessionEngine, SessionCache};
use bookclub_ai_core::document::TextChunker;
use bookclub_ai_core::handlers;
use bookclub_ai_core::llm::gateway::LlmGateway;
use bookclub_ai_core::logging::{ActivityLogger, LoggerConfig};
use bookclub_ai_core::meeting::MeetingLifecycleCoordinator;
use bookclub_ai_core::ocr::{OcrClient, OcrIngestPipeline};
use bookclub_ai_core::services::{EmbeddingService, ProofreadingService, QuizService};
use bookclub_ai_core::state::AppState;
use bookclub_ai_core::stream::StreamConnectionRegistry;
use bookclub_ai_core::utils::limiters::Limiters;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,bookclub_ai_core=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("starting bookclub-ai-core");

    let settings = Settings::load()?;
    info!("configuration loaded");

    let db_pool = database::pool::connect(&settings.database).await?;
    info!("database connection established");

    let limiters = Arc::new(Limiters::new(&settings.limits));
    let repository = Arc::new(Repository::new(db_pool.clone()));

    let llm: Arc<LlmGateway> = Arc::new(LlmGateway::new(settings.llm.clone(), limiters.clone()));
    let embeddings = Arc::new(EmbeddingService::new(
        settings.embedding.base_url.clone(),
        settings.embedding.clone(),
        limiters.clone(),
        settings.limits.embedding_batch_size,
        settings.embedding.api_key.clone(),
    ));

    let vector = Arc::new(bookclub_ai_core::vector::VectorIndexManager::new(
        db_pool.clone(),
        limiters.clone(),
    ));

    let ocr_client = OcrClient::new(settings.ocr.worker_url.clone());
    let ocr = Arc::new(OcrIngestPipeline::new(ocr_client, settings.ocr.max_document_bytes));
    let chunker = Arc::new(TextChunker::new(
        settings.rag.chunk_min_chars,
        settings.rag.chunk_max_chars,
        settings.rag.chunk_overlap_chars,
    ));

    let session_ttl = Duration::from_secs(settings.redis.session_ttl_seconds);
    let session_store = Arc::new(RedisSessionStore::new(&settings.redis.url, session_ttl)?);
    let session_cache = Arc::new(SessionCache::new(session_store.clone()));

    let tokenizer = TokenizerKind::parse(&settings.llm.tokenizer_kind);
    let summarizer = Arc::new(Summarizer::new(llm.clone()));
    let context_builder = Arc::new(ContextBuilder::new(summarizer, tokenizer));

    let activity_logger = Arc::new(ActivityLogger::new(db_pool.clone(), LoggerConfig::default()));

    let discussion = Arc::new(DiscussionSessionEngine::new(
        session_cache,
        session_store,
        vector.clone(),
        embeddings.clone(),
        llm.clone(),
        context_builder,
        activity_logger.clone(),
        settings.discussion.clone(),
        settings.rag.clone(),
        tokenizer,
        settings.prompts.discussion_system_prompt.clone(),
    ));

    let streams = Arc::new(StreamConnectionRegistry::new());
    let quiz = Arc::new(QuizService::new(vector.clone(), embeddings.clone(), llm.clone()));
    let proofreading = Arc::new(ProofreadingService::new(llm.clone()));
    let meeting_coordinator = Arc::new(MeetingLifecycleCoordinator::new(
        discussion.clone(),
        vector.clone(),
        streams.clone(),
        quiz.clone(),
        proofreading.clone(),
    ));

    let state = Arc::new(AppState {
        settings: settings.clone(),
        db_pool,
        repository,
        vector,
        chunker,
        ocr,
        embeddings,
        discussion,
        meeting_coordinator,
        streams,
        quiz,
        proofreading,
        activity_logger,
        limiters,
    });

    let app = build_router(state);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let api_routes = Router::new()
        .route("/api/meetings", post(handlers::meeting::create_meeting))
        .route("/api/meetings", get(handlers::meeting::list_active_meetings))
        .route("/api/meetings/{meeting_id}", get(handlers::meeting::get_meeting))
        .route("/api/meetings/{meeting_id}/end", post(handlers::meeting::end_meeting))
        .route("/api/meetings/{meeting_id}/status", get(handlers::meeting::meeting_status))
        .route("/api/meetings/{meeting_id}/documents", post(handlers::ingest::upload_document))
        .route("/api/meetings/{meeting_id}/quiz", post(handlers::quiz::generate_quiz))
        .route("/api/meetings/{meeting_id}/sessions", post(handlers::discussion::start_discussion))
        .route(
            "/api/meetings/{meeting_id}/sessions/{session_id}",
            axum::routing::delete(handlers::discussion::end_discussion),
        )
        .route("/api/sessions/{session_id}/messages", post(handlers::discussion::post_message))
        .route("/api/sessions/{session_id}/messages/stream", post(handlers::discussion::stream_message))
        .route("/api/proofreading", post(handlers::proofreading::review_passage))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(
            CorsLayer::permissive()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
        .layer(DefaultBodyLimit::max(100 * 1024 * 1024))
}
