use chrono::Utc;
use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, Message, MessageStatus, ResultEngine, messages, util::normalize_required_text,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct NewMessage {
    pub receiver_id: String,
    pub content: String,
    pub rfq_id: Option<Uuid>,
    pub bid_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub struct MessageListFilter {
    /// Only the conversation with this user.
    pub counterpart: Option<String>,
    pub rfq_id: Option<Uuid>,
}

impl Engine {
    pub async fn send_message(&self, username: &str, new_message: NewMessage) -> ResultEngine<Message> {
        let content = normalize_required_text(&new_message.content, "content")?;
        if new_message.receiver_id == username {
            return Err(EngineError::InvalidInput(
                "cannot send a message to yourself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &new_message.receiver_id).await?;
            if let Some(rfq_id) = new_message.rfq_id {
                self.require_rfq_visible(&db_tx, rfq_id, username).await?;
            }
            if let Some(bid_id) = new_message.bid_id {
                self.require_bid(&db_tx, bid_id).await?;
            }
            let message = Message {
                id: Uuid::new_v4(),
                sender_id: username.to_string(),
                receiver_id: new_message.receiver_id.clone(),
                rfq_id: new_message.rfq_id,
                bid_id: new_message.bid_id,
                content,
                status: MessageStatus::Sent,
                created_at: Utc::now(),
            };
            messages::ActiveModel::from(&message).insert(&db_tx).await?;
            Ok(message)
        })
    }

    /// Messages the caller sent or received, newest first.
    ///
    /// Received messages still `sent` are marked `delivered` first.
    pub async fn list_messages(
        &self,
        username: &str,
        filter: MessageListFilter,
    ) -> ResultEngine<Vec<Message>> {
        with_tx!(self, |db_tx| {
            let mut delivered = messages::Entity::update_many()
                .col_expr(
                    messages::Column::Status,
                    Expr::value(MessageStatus::Delivered.as_str()),
                )
                .filter(messages::Column::ReceiverId.eq(username))
                .filter(messages::Column::Status.eq(MessageStatus::Sent.as_str()));
            if let Some(counterpart) = filter.counterpart.as_deref() {
                delivered = delivered.filter(messages::Column::SenderId.eq(counterpart));
            }
            if let Some(rfq_id) = filter.rfq_id {
                delivered = delivered.filter(messages::Column::RfqId.eq(rfq_id.to_string()));
            }
            delivered.exec(&db_tx).await?;

            let mut query = messages::Entity::find().filter(
                Condition::any()
                    .add(messages::Column::SenderId.eq(username))
                    .add(messages::Column::ReceiverId.eq(username)),
            );
            if let Some(counterpart) = filter.counterpart.as_deref() {
                query = query.filter(
                    Condition::any()
                        .add(messages::Column::SenderId.eq(counterpart))
                        .add(messages::Column::ReceiverId.eq(counterpart)),
                );
            }
            if let Some(rfq_id) = filter.rfq_id {
                query = query.filter(messages::Column::RfqId.eq(rfq_id.to_string()));
            }
            let rows = query
                .order_by_desc(messages::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Message::try_from).collect()
        })
    }

    /// Receiver-only.
    pub async fn mark_message_read(&self, username: &str, id: Uuid) -> ResultEngine<Message> {
        with_tx!(self, |db_tx| {
            let model = messages::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("message not exists".to_string()))?;
            let mut message = Message::try_from(model)?;
            if message.receiver_id != username {
                return Err(EngineError::Forbidden(
                    "only the receiver can mark a message read".to_string(),
                ));
            }
            if message.status != MessageStatus::Read {
                message.status = MessageStatus::Read;
                messages::ActiveModel::from(&message).update(&db_tx).await?;
            }
            Ok(message)
        })
    }
}
