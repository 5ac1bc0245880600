// region:    --- Imports
use auction_site::config::Config;
use auction_site::database::DatabaseManager;
use auction_site::event_store::PostgresEventStore;
use auction_site::message_broker::KafkaManager;
use auction_site::notifications::NotificationConsumer;
use auction_site::routes;
use auction_site::scheduler::ExpiryScheduler;
use auction_site::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = Config::load().inspect_err(|e| {
        error!("{:<12} --> 설정 로드 실패: {}", "Main", e);
    })?;

    // DatabaseManager 생성 및 스키마 적용
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);
    if let Err(e) = db_manager.initialize_database(config.db_reset).await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 매니저 생성 및 토픽 생성
    let kafka_manager = KafkaManager::new(&config)?;
    kafka_manager.create_topic(3, 1).await?;
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    let event_store = Arc::new(PostgresEventStore::new(
        kafka_manager.get_producer(),
        kafka_manager.topic(),
    ));

    // 관심 목록 알림 구독
    let notifier = NotificationConsumer::new(
        db_manager.get_pool(),
        kafka_manager.get_consumer(),
        kafka_manager.topic(),
    );
    tokio::spawn(async move {
        notifier.start().await;
    });

    // 만료 스케줄러 (설정 시에만)
    if let Some(scheduler) = ExpiryScheduler::new(
        Arc::clone(&db_manager),
        Arc::clone(&event_store),
        config.expiry_interval_secs,
    ) {
        scheduler.start();
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(db_manager, event_store, config);
    let routes_all = routes::router(state);

    // 리스너 생성
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
