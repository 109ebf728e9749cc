use log::*;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::Value as JsonValue;

use libreauth::pass;

use jsonwebtoken::errors::Error as JwtError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  // 401
  #[error("unauthorized: {0}")]
  Unauthorized(JsonValue),

  // 404
  #[error("not found: {0}")]
  NotFound(JsonValue),

  // 400, `{"msg": ...}` envelope
  #[error("bad request: {0}")]
  BadRequest(JsonValue),

  // 400, `{"errors": [{"msg": ...}]}` envelope
  #[error("validation failed: {0}")]
  Validation(JsonValue),

  // 500
  #[error("internal server error")]
  InternalServerError,

  // Json error
  #[error("Json error: {source}")]
  JsonError {
    #[from]
    source: serde_json::Error,
  },

  // Password error
  #[error("Password error: {0}")]
  PasswordError(String),

  #[error("JWT error")]
  JwtError {
    #[from]
    source: JwtError,
  },

  #[error("disconnected: {0}")]
  DisconnectedError(String),

  #[error("postgres error")]
  PgError {
    #[from]
    source: tokio_postgres::error::Error,
  },

  #[error("http client error")]
  HttpClientError {
    #[from]
    source: reqwest::Error,
  },

  #[error("crossbeam recv error")]
  RecvError {
    #[from]
    source: crossbeam_channel::RecvError,
  },

  #[error("std io error")]
  IOError {
    #[from]
    source: std::io::Error,
  },

  #[error("config error")]
  ConfigError {
    #[from]
    source: config::ConfigError,
  },

  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl From<pass::ErrorCode> for Error {
  fn from(code: pass::ErrorCode) -> Self {
    Error::PasswordError(format!("code={:?}", code))
  }
}

impl Error {
  /// 404 with the `{"msg": ...}` envelope.
  pub fn not_found(msg: &str) -> Error {
    Error::NotFound(json!({ "msg": msg }))
  }

  /// 400 with the `{"msg": ...}` envelope.
  pub fn bad_request(msg: &str) -> Error {
    Error::BadRequest(json!({ "msg": msg }))
  }

  /// 401 with the `{"msg": ...}` envelope.
  pub fn unauthorized(msg: &str) -> Error {
    Error::Unauthorized(json!({ "msg": msg }))
  }

  /// 400 with the field-level `{"errors": [{"msg": ...}]}` envelope.
  pub fn validation(msgs: &[&str]) -> Error {
    let errors = msgs.iter()
      .map(|msg| json!({ "msg": msg }))
      .collect::<Vec<JsonValue>>();
    Error::Validation(json!({ "errors": errors }))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// the ResponseError trait lets us convert errors to http responses with appropriate data
// https://actix.rs/docs/errors/
impl ResponseError for Error {
  fn error_response(&self) -> HttpResponse {
    match self {
      Error::Unauthorized(ref message) => HttpResponse::Unauthorized().json(message),
      Error::NotFound(ref message) => HttpResponse::NotFound().json(message),
      Error::BadRequest(ref message) => {
        HttpResponse::build(StatusCode::BAD_REQUEST).json(message)
      },
      Error::Validation(ref message) => {
        HttpResponse::build(StatusCode::BAD_REQUEST).json(message)
      },
      Error::DisconnectedError(ref message) => {
        HttpResponse::build(StatusCode::BAD_GATEWAY).json(message)
      },
      ref err => {
        // full detail stays server-side, the caller only sees an opaque body.
        error!("InternalServerError: {:?}", err);
        HttpResponse::InternalServerError().body("Server Error")
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validation_builds_field_error_array() {
    let err = Error::validation(&["Status is required", "Skills is required"]);
    match err {
      Error::Validation(body) => {
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["msg"], "Status is required");
        assert_eq!(errors[1]["msg"], "Skills is required");
      },
      other => panic!("expected Validation, got {:?}", other),
    }
  }

  #[test]
  fn msg_envelope_helpers() {
    match Error::not_found("Post not found") {
      Error::NotFound(body) => assert_eq!(body["msg"], "Post not found"),
      other => panic!("expected NotFound, got {:?}", other),
    }
    match Error::unauthorized("User not authorized") {
      Error::Unauthorized(body) => assert_eq!(body["msg"], "User not authorized"),
      other => panic!("expected Unauthorized, got {:?}", other),
    }
  }
}
