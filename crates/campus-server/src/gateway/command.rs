//! The closed set of operations the gateway can perform.
//!
//! A [`Command`] is only ever built by [`Command::decode`], which validates
//! every input. Once decoded, executing it touches the store exactly once.

use axum::http::StatusCode;
use campus_core::{
  catalog::{Subject, SubjectFilter},
  chat::{ChatMessage, ChatQuery, NewChatMessage},
  quota::QuotaLedger,
  store::SchoolStore,
  user::{NewUser, UserSummary},
};
use serde::{Deserialize, Serialize};

use super::{Endpoint, Method, envelope::{RequestEnvelope, ResponseEnvelope}};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// `GET chat?type=&limit=`
  ListMessages(ChatQuery),
  /// `POST chat`
  PostMessage(NewChatMessage),
  /// `GET users`
  ListUsers,
  /// `POST users`
  CreateUser(NewUser),
  /// `GET subjects?grade=&quarter=`
  FilterSubjects(SubjectFilter),
  /// `GET quota?login=`
  GetQuota(String),
}

// ─── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PostMessageBody {
  chat_type:    Option<String>,
  #[serde(default)]
  sender_login: String,
  sender_name:  Option<String>,
  #[serde(default)]
  message_text: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserBody {
  #[serde(default)]
  login:        String,
  #[serde(default)]
  display_name: String,
  role:         Option<String>,
  grade:        Option<i64>,
  created_by:   Option<String>,
}

// ─── Response bodies ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesBody {
  messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct MessageBody {
  message: ChatMessage,
}

#[derive(Serialize)]
struct UsersBody {
  users: Vec<UserSummary>,
}

#[derive(Serialize)]
struct UserBody {
  user: UserSummary,
}

#[derive(Serialize)]
struct SubjectsBody {
  subjects: Vec<Subject>,
}

#[derive(Serialize)]
struct QuotaBody {
  quota: QuotaLedger,
}

// ─── Decode ──────────────────────────────────────────────────────────────────

impl Command {
  /// Turn an envelope into a validated command.
  ///
  /// `OPTIONS` is answered before decoding and is rejected here like any
  /// method the endpoint does not serve.
  pub fn decode(endpoint: Endpoint, method: Method, req: &RequestEnvelope) -> Result<Self, Error> {
    match (endpoint, method) {
      (Endpoint::Chat, Method::Get) => {
        Ok(Self::ListMessages(ChatQuery::from_params(req.param("type"), req.param("limit"))?))
      }
      (Endpoint::Chat, Method::Post) => {
        let body: PostMessageBody = req.json_body()?;
        Ok(Self::PostMessage(NewChatMessage::new(
          body.chat_type.as_deref(),
          &body.sender_login,
          body.sender_name.as_deref(),
          &body.message_text,
        )?))
      }
      (Endpoint::Users, Method::Get) => Ok(Self::ListUsers),
      (Endpoint::Users, Method::Post) => {
        let body: CreateUserBody = req.json_body()?;
        Ok(Self::CreateUser(NewUser::new(
          &body.login,
          &body.display_name,
          body.role.as_deref(),
          body.grade,
          body.created_by.as_deref(),
        )?))
      }
      (Endpoint::Subjects, Method::Get) => {
        Ok(Self::FilterSubjects(SubjectFilter::from_params(
          req.param("grade"),
          req.param("quarter"),
        )?))
      }
      (Endpoint::Quota, Method::Get) => match req.param("login").map(str::trim) {
        Some(login) if !login.is_empty() => Ok(Self::GetQuota(login.to_owned())),
        _ => Err(Error::InvalidQuery("login is required".to_owned())),
      },
      (Endpoint::Subjects | Endpoint::Quota, Method::Post) | (_, Method::Options) => {
        Err(Error::MethodNotAllowed)
      }
    }
  }

  // ─── Execute ─────────────────────────────────────────────────────────────

  /// Run the command against `store` and render the success envelope.
  pub async fn execute<S: SchoolStore>(self, store: &S) -> Result<ResponseEnvelope, Error> {
    match self {
      Self::ListMessages(query) => {
        let messages = store.list_messages(query).await.map_err(backend)?;
        ResponseEnvelope::json(StatusCode::OK, &MessagesBody { messages })
      }
      Self::PostMessage(input) => {
        let message = store.append_message(input).await.map_err(backend)?;
        ResponseEnvelope::json(StatusCode::CREATED, &MessageBody { message })
      }
      Self::ListUsers => {
        let users = store.list_users().await.map_err(backend)?;
        ResponseEnvelope::json(StatusCode::OK, &UsersBody { users })
      }
      Self::CreateUser(input) => {
        let user = store.create_user(input).await.map_err(backend)?;
        ResponseEnvelope::json(StatusCode::CREATED, &UserBody { user: user.into() })
      }
      Self::FilterSubjects(filter) => {
        let subjects = store.filter_subjects(filter).await.map_err(backend)?;
        ResponseEnvelope::json(StatusCode::OK, &SubjectsBody { subjects })
      }
      Self::GetQuota(login) => {
        let quota = store
          .quota_for(login.clone())
          .await
          .map_err(backend)?
          .ok_or_else(|| Error::NotFound(format!("no quota ledger for {login}")))?;
        ResponseEnvelope::json(StatusCode::OK, &QuotaBody { quota })
      }
    }
  }
}

fn backend<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  tracing::error!(error = %e, "store operation failed");
  Error::Backend(Box::new(e))
}
