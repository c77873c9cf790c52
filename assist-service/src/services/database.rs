use crate::models::{ChatSession, FaqEntry, Message, Ticket, TicketStatus, User};
use assist_core::error::AppError;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime},
    options::{IndexOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};

/// Typed access to the four collections backing the service.
///
/// The application holds no authoritative in-memory state; every operation
/// re-reads what it needs through this handle. The driver pools connections
/// internally, so `AssistDb` is cheap to clone.
#[derive(Clone)]
pub struct AssistDb {
    client: MongoClient,
    db: Database,
}

impl AssistDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Provision the indexes the queries below rely on. Replaces the
    /// one-shot init script of earlier deployments.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for assist-service");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users().create_index(email_index, None).await?;

        // Sessions are always listed per user, newest activity first.
        let session_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "last_updated": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_last_updated_idx".to_string())
                    .build(),
            )
            .build();
        self.chat_sessions().create_index(session_index, None).await?;

        let ticket_created_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_idx".to_string())
                    .build(),
            )
            .build();
        self.tickets().create_index(ticket_created_index, None).await?;

        // Notification feed: answered tickets per user.
        let ticket_user_status_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_status_idx".to_string())
                    .build(),
            )
            .build();
        self.tickets()
            .create_index(ticket_user_status_index, None)
            .await?;

        // One knowledge-base entry per ticket; the answer write upserts on this.
        let faq_ticket_index = IndexModel::builder()
            .keys(doc! { "ticket_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("ticket_id_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.faqs().create_index(faq_ticket_index, None).await?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn chat_sessions(&self) -> Collection<ChatSession> {
        self.db.collection("chat_sessions")
    }

    pub fn tickets(&self) -> Collection<Ticket> {
        self.db.collection("tickets")
    }

    pub fn faqs(&self) -> Collection<FaqEntry> {
        self.db.collection("faqs")
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    pub async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn insert_user(&self, user: &User) -> Result<ObjectId, AppError> {
        let result = self.users().insert_one(user, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("inserted user has no id")))
    }

    // ------------------------------------------------------------------
    // Chat sessions
    // ------------------------------------------------------------------

    pub async fn list_sessions(&self, user_id: ObjectId) -> Result<Vec<ChatSession>, AppError> {
        let find_options = mongodb::options::FindOptions::builder()
            .sort(doc! { "last_updated": -1 })
            .build();
        let cursor = self
            .chat_sessions()
            .find(doc! { "user_id": user_id }, find_options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Ownership is part of the lookup predicate: a session owned by another
    /// user is indistinguishable from a missing one.
    pub async fn find_session(
        &self,
        user_id: ObjectId,
        session_id: ObjectId,
    ) -> Result<Option<ChatSession>, AppError> {
        Ok(self
            .chat_sessions()
            .find_one(doc! { "_id": session_id, "user_id": user_id }, None)
            .await?)
    }

    /// Upsert by (user, title): overwrite messages and bump the timestamp if
    /// a session with this title exists, insert otherwise. Find-then-upsert,
    /// not atomic; concurrent saves race with last-write-wins.
    pub async fn create_or_update_session(
        &self,
        user_id: ObjectId,
        title: &str,
        messages: Vec<Message>,
    ) -> Result<ChatSession, AppError> {
        let existing = self
            .chat_sessions()
            .find_one(doc! { "user_id": user_id, "title": title }, None)
            .await?;

        let now = Utc::now();
        if let Some(mut session) = existing {
            let messages_bson = mongodb::bson::to_bson(&messages).map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to serialize messages: {}", e))
            })?;
            self.chat_sessions()
                .update_one(
                    doc! { "_id": session.id },
                    doc! { "$set": {
                        "messages": messages_bson,
                        "last_updated": BsonDateTime::from_chrono(now),
                    } },
                    None,
                )
                .await?;
            session.messages = messages;
            session.last_updated = now;
            return Ok(session);
        }

        let mut session = ChatSession::new(user_id, title.to_string(), messages);
        session.last_updated = now;
        let result = self.chat_sessions().insert_one(&session, None).await?;
        session.id = result.inserted_id.as_object_id();
        Ok(session)
    }

    /// Rename and overwrite a session. Fails with `Conflict` when another
    /// session owned by the same user already carries the new title, and
    /// `NotFound` when (id, user) matches nothing.
    pub async fn rename_and_update_session(
        &self,
        user_id: ObjectId,
        session_id: ObjectId,
        title: &str,
        messages: Vec<Message>,
    ) -> Result<(), AppError> {
        let duplicate = self
            .chat_sessions()
            .find_one(
                doc! {
                    "user_id": user_id,
                    "title": title,
                    "_id": { "$ne": session_id },
                },
                None,
            )
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "A session with this title already exists"
            )));
        }

        let messages_bson = mongodb::bson::to_bson(&messages).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to serialize messages: {}", e))
        })?;
        let result = self
            .chat_sessions()
            .update_one(
                doc! { "_id": session_id, "user_id": user_id },
                doc! { "$set": {
                    "title": title,
                    "messages": messages_bson,
                    "last_updated": BsonDateTime::now(),
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Chat session not found")));
        }
        Ok(())
    }

    pub async fn delete_session(
        &self,
        user_id: ObjectId,
        session_id: ObjectId,
    ) -> Result<(), AppError> {
        let result = self
            .chat_sessions()
            .delete_one(doc! { "_id": session_id, "user_id": user_id }, None)
            .await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Chat session not found or unauthorized"
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    pub async fn insert_ticket(&self, ticket: &Ticket) -> Result<ObjectId, AppError> {
        let result = self.tickets().insert_one(ticket, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("inserted ticket has no id")))
    }

    pub async fn list_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        let find_options = mongodb::options::FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.tickets().find(doc! {}, find_options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Full-collection snapshot for the analytics aggregator.
    pub async fn all_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        let cursor = self.tickets().find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Answer a ticket and record the answer in the knowledge base.
    ///
    /// The two writes are not transactional; the knowledge-base entry is
    /// upserted by ticket id, so replaying after a partial failure cannot
    /// duplicate it.
    pub async fn answer_ticket(&self, ticket_id: ObjectId, answer: &str) -> Result<(), AppError> {
        let ticket = self
            .tickets()
            .find_one(doc! { "_id": ticket_id }, None)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Ticket not found")))?;

        self.tickets()
            .update_one(
                doc! { "_id": ticket_id },
                doc! { "$set": {
                    "status": mongodb::bson::to_bson(&TicketStatus::Answered)
                        .unwrap_or_else(|_| "answered".into()),
                    "answer": answer,
                    "answered_at": BsonDateTime::now(),
                } },
                None,
            )
            .await?;

        self.upsert_faq_entry(&FaqEntry::from_helpdesk(
            ticket_id,
            ticket.question,
            answer.to_string(),
        ))
        .await
    }

    async fn upsert_faq_entry(&self, entry: &FaqEntry) -> Result<(), AppError> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.faqs()
            .update_one(
                doc! { "ticket_id": entry.ticket_id },
                doc! {
                    "$set": {
                        "question": &entry.question,
                        "answer": &entry.answer,
                        "source": &entry.source,
                    },
                    "$setOnInsert": {
                        "created_at": BsonDateTime::from_chrono(entry.created_at),
                    },
                },
                options,
            )
            .await?;
        Ok(())
    }

    pub async fn reject_ticket(&self, ticket_id: ObjectId) -> Result<(), AppError> {
        let result = self
            .tickets()
            .update_one(
                doc! { "_id": ticket_id },
                doc! { "$set": {
                    "status": mongodb::bson::to_bson(&TicketStatus::Rejected)
                        .unwrap_or_else(|_| "rejected".into()),
                    "rejected_at": BsonDateTime::now(),
                } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Ticket not found")));
        }
        Ok(())
    }

    pub async fn delete_ticket(&self, ticket_id: ObjectId) -> Result<(), AppError> {
        let result = self
            .tickets()
            .delete_one(doc! { "_id": ticket_id }, None)
            .await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Ticket not found")));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub async fn list_answered_tickets(&self, user_id: &str) -> Result<Vec<Ticket>, AppError> {
        let find_options = mongodb::options::FindOptions::builder()
            .sort(doc! { "answered_at": -1 })
            .build();
        let cursor = self
            .tickets()
            .find(
                doc! {
                    "user_id": user_id,
                    "status": mongodb::bson::to_bson(&TicketStatus::Answered)
                        .unwrap_or_else(|_| "answered".into()),
                },
                find_options,
            )
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Set the read receipt. The user id is part of the match, so marking
    /// another user's ticket fails exactly like a missing ticket.
    pub async fn mark_ticket_seen(
        &self,
        ticket_id: ObjectId,
        user_id: &str,
    ) -> Result<(), AppError> {
        let result = self
            .tickets()
            .update_one(
                doc! { "_id": ticket_id, "user_id": user_id },
                doc! { "$set": { "seen": true } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Ticket not found or not authorized"
            )));
        }
        Ok(())
    }
}
