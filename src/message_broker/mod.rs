// region:    --- Imports
use crate::config::Config;
use crate::error::AppError;
use crate::event_store::Event;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Broker Error
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("topic creation failed for {topic}: {code:?}")]
    TopicCreation {
        topic: String,
        code: RDKafkaErrorCode,
    },
}
// endregion: --- Broker Error

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(
        &self,
        topic: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BrokerError> {
        debug!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| BrokerError::Kafka(e))?;

        Ok(())
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Consumer
pub struct KafkaConsumer {
    consumer: Arc<StreamConsumer>,
}

/// KafkaConsumer 구현
impl KafkaConsumer {
    pub fn new(brokers: &str, group_id: &str) -> Result<Self, BrokerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .set("allow.auto.create.topics", "true")
            .create()?;

        Ok(KafkaConsumer {
            consumer: Arc::new(consumer),
        })
    }

    /// 상품 이벤트 구독 (연결이 끊기지 않는 한 반환하지 않음)
    pub async fn consume_events<F, Fut>(&self, topic: &str, handler: F) -> Result<(), BrokerError>
    where
        F: Fn(Event) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        info!("{:<12} --> Kafka 이벤트 구독 시작: topic={}", "Consumer", topic);
        self.consumer.subscribe(&[topic])?;

        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    debug!(
                        "{:<12} --> 메시지 수신: topic={}, partition={}, offset={}",
                        "Consumer",
                        message.topic(),
                        message.partition(),
                        message.offset()
                    );

                    let Some(payload) = message.payload() else {
                        warn!("{:<12} --> 빈 페이로드 수신", "Consumer");
                        continue;
                    };

                    match serde_json::from_slice::<Event>(payload) {
                        Ok(event) => {
                            let event_id = event.id;
                            if let Err(e) = handler(event).await {
                                error!(
                                    "{:<12} --> 이벤트 처리 오류 id={}: {:?}",
                                    "Consumer", event_id, e
                                );
                            }
                        }
                        Err(e) => error!("{:<12} --> deserialize 오류: {:?}", "Consumer", e),
                    }
                }
                Err(e) => error!("{:<12} --> 메시지 수신 오류: {:?}", "Consumer", e),
            }
        }
    }
}

// endregion: --- Kafka Consumer

// region:    --- Kafka Manager
pub struct KafkaManager {
    producer: Arc<KafkaProducer>,
    consumer: Arc<KafkaConsumer>,
    brokers: String,
    topic: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(config: &Config) -> Result<Self, BrokerError> {
        let producer = Arc::new(KafkaProducer::new(&config.kafka_brokers)?);
        let consumer = Arc::new(KafkaConsumer::new(
            &config.kafka_brokers,
            &config.kafka_group_id,
        )?);

        Ok(KafkaManager {
            producer,
            consumer,
            brokers: config.kafka_brokers.clone(),
            topic: config.kafka_topic.clone(),
        })
    }

    /// 프로듀서 반환
    pub fn get_producer(&self) -> Arc<KafkaProducer> {
        Arc::clone(&self.producer)
    }

    /// 컨슈머 반환
    pub fn get_consumer(&self) -> Arc<KafkaConsumer> {
        Arc::clone(&self.consumer)
    }

    /// 상품 이벤트 토픽
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 토픽 생성 (이미 있으면 성공으로 취급)
    pub async fn create_topic(
        &self,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), BrokerError> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", self.topic);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()?;

        let new_topic = NewTopic::new(
            &self.topic,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        let results = admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await?;

        for result in results {
            match result {
                Ok(topic) => info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic),
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("{:<12} --> Kafka 토픽 이미 존재: {}", "Manager", topic)
                }
                Err((topic, code)) => {
                    error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Manager", code);
                    return Err(BrokerError::TopicCreation { topic, code });
                }
            }
        }
        Ok(())
    }
}

// endregion: --- Kafka Manager
