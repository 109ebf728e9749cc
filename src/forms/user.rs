use serde::{Deserialize, Serialize};

use crate::error::*;

const NAME_REQUIRED: &str = "Name is required";
const EMAIL_INVALID: &str = "Please include a valid email";
const PASSWORD_LENGTH: &str = "Please enter a password with 6 or more characters";
const PASSWORD_REQUIRED: &str = "Password is required";

fn looks_like_email(email: &str) -> bool {
  let email = email.trim();
  match email.find('@') {
    Some(at) => at > 0 && at + 1 < email.len(),
    None => false,
  }
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RegisterUser {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

impl RegisterUser {
  pub fn validate(&self) -> Result<()> {
    let mut msgs = Vec::new();
    if self.name.trim().is_empty() {
      msgs.push(NAME_REQUIRED);
    }
    if !looks_like_email(&self.email) {
      msgs.push(EMAIL_INVALID);
    }
    if self.password.chars().count() < 6 {
      msgs.push(PASSWORD_LENGTH);
    }
    if msgs.is_empty() {
      Ok(())
    } else {
      Err(Error::validation(&msgs))
    }
  }
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LoginUser {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

impl LoginUser {
  pub fn validate(&self) -> Result<()> {
    let mut msgs = Vec::new();
    if !looks_like_email(&self.email) {
      msgs.push(EMAIL_INVALID);
    }
    if self.password.is_empty() {
      msgs.push(PASSWORD_REQUIRED);
    }
    if msgs.is_empty() {
      Ok(())
    } else {
      Err(Error::validation(&msgs))
    }
  }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
  pub token: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn register_rejects_blank_fields() {
    let form = RegisterUser::default();
    assert!(form.validate().is_err());
  }

  #[test]
  fn register_rejects_short_passwords() {
    let form = RegisterUser {
      name: "Ada".to_string(),
      email: "ada@example.com".to_string(),
      password: "12345".to_string(),
    };
    assert!(form.validate().is_err());

    let form = RegisterUser { password: "123456".to_string(), ..form };
    assert!(form.validate().is_ok());
  }

  #[test]
  fn login_requires_an_email_shape_and_a_password() {
    let form = LoginUser {
      email: "not-an-email".to_string(),
      password: "".to_string(),
    };
    assert!(form.validate().is_err());

    let form = LoginUser {
      email: "ada@example.com".to_string(),
      password: "secret".to_string(),
    };
    assert!(form.validate().is_ok());
  }
}
