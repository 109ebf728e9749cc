use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
  pub id: i32,
  pub name: String,
  pub email: String,
  pub password: String,
  pub avatar: Option<String>,
  pub created_at: NaiveDateTime,
}

/// User record with the password hash stripped.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserDetails {
  pub id: i32,
  pub name: String,
  pub email: String,
  pub avatar: Option<String>,
  pub created_at: NaiveDateTime,
}

impl From<User> for UserDetails {
  fn from(user: User) -> Self {
    UserDetails {
      id: user.id,
      name: user.name,
      email: user.email,
      avatar: user.avatar,
      created_at: user.created_at,
    }
  }
}

/// Populated owner fields attached to a profile at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Owner {
  pub id: i32,
  pub name: String,
  pub avatar: Option<String>,
}
