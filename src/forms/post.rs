use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::*;

const TEXT_REQUIRED: &str = "Text is required";

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreatePost {
  #[serde(default)]
  pub text: String,
  // untyped on purpose, see `is_public`.
  #[serde(default)]
  pub ispublic: Option<JsonValue>,
}

impl CreatePost {
  pub fn validate(&self) -> Result<()> {
    if self.text.trim().is_empty() {
      return Err(Error::validation(&[TEXT_REQUIRED]));
    }
    Ok(())
  }

  /// A post is private only when the submitted value is exactly the JSON
  /// boolean `false`.  Strings, numbers, null and absence all leave the
  /// default (public).  Deliberate contract, do not coerce.
  pub fn is_public(&self) -> bool {
    !matches!(self.ispublic, Some(JsonValue::Bool(false)))
  }
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateComment {
  #[serde(default)]
  pub text: String,
}

impl CreateComment {
  pub fn validate(&self) -> Result<()> {
    if self.text.trim().is_empty() {
      return Err(Error::validation(&[TEXT_REQUIRED]));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn post_with_flag(flag: &str) -> CreatePost {
    serde_json::from_str(&format!(r#"{{"text": "hi", "ispublic": {}}}"#, flag)).unwrap()
  }

  #[test]
  fn ispublic_defaults_to_true() {
    let form: CreatePost = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
    assert!(form.is_public());
  }

  #[test]
  fn only_the_exact_boolean_false_makes_a_post_private() {
    assert!(!post_with_flag("false").is_public());
    assert!(post_with_flag("true").is_public());
    // any other type is ignored.
    assert!(post_with_flag(r#""false""#).is_public());
    assert!(post_with_flag("0").is_public());
    assert!(post_with_flag("null").is_public());
  }

  #[test]
  fn empty_text_is_rejected() {
    let form = CreatePost { text: "  ".to_string(), ispublic: None };
    assert!(form.validate().is_err());
    let form = CreateComment { text: "".to_string() };
    assert!(form.validate().is_err());
  }
}
