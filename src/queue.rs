use crate::error::PipelineError;
use futures_util::{Stream, StreamExt};
use lapin::message::Delivery;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};
use log::info;
use std::pin::Pin;
use std::task::{Context, Poll};

const CONTENT_TYPE: &str = "text/plain";
const CLOSE_REPLY_CODE: u16 = 200;

/// One AMQP connection with a single channel shared by publishers and consumers.
pub struct QueueClient {
    connection: Connection,
    channel: Channel,
}

impl QueueClient {
    pub async fn connect(url: &str) -> Result<Self, PipelineError> {
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        info!("Connected to RabbitMQ, channel {}", channel.id());

        Ok(Self {
            connection,
            channel,
        })
    }

    /// Declare a durable, non-exclusive, non-auto-delete queue. Idempotent.
    pub async fn declare_queue(&self, name: &str) -> Result<(), PipelineError> {
        let options = QueueDeclareOptions {
            durable: true,
            exclusive: false,
            auto_delete: false,
            ..QueueDeclareOptions::default()
        };

        let queue = self
            .channel
            .queue_declare(name, options, FieldTable::default())
            .await?;

        info!(
            "Declared queue {} ({} messages waiting)",
            queue.name().as_str(),
            queue.message_count()
        );
        Ok(())
    }

    /// Publish through the default exchange. No publisher confirms are awaited.
    pub async fn publish(&self, queue_name: &str, payload: &[u8]) -> Result<(), PipelineError> {
        self.channel
            .basic_publish(
                "",
                queue_name,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type(CONTENT_TYPE.into()),
            )
            .await?;
        Ok(())
    }

    /// Start a new consumer and return its payloads as an endless stream.
    ///
    /// Deliveries are auto-acknowledged: a message counts as handled the
    /// moment it reaches the consumer, whatever happens to it afterwards.
    pub async fn consume(
        &self,
        queue_name: &str,
    ) -> Result<Deliveries, PipelineError> {
        let options = BasicConsumeOptions {
            no_ack: true,
            ..BasicConsumeOptions::default()
        };

        let consumer = self
            .channel
            .basic_consume(queue_name, "", options, FieldTable::default())
            .await?;

        info!("Consumer {} subscribed to {}", consumer.tag().as_str(), queue_name);

        Ok(Deliveries { consumer })
    }

    pub async fn close(self) -> Result<(), PipelineError> {
        self.channel.close(CLOSE_REPLY_CODE, "Bye").await?;
        self.connection.close(CLOSE_REPLY_CODE, "Bye").await?;
        info!("RabbitMQ connection closed");
        Ok(())
    }
}

/// Raw payloads of an auto-acknowledged consumer. Never restarts once it ends.
pub struct Deliveries {
    consumer: Consumer,
}

impl Stream for Deliveries {
    type Item = Result<Vec<u8>, lapin::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.consumer
            .poll_next_unpin(cx)
            .map(|delivery| delivery.map(|delivery| delivery.map(|d: Delivery| d.data)))
    }
}
