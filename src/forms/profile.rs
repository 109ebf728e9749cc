use serde::{Deserialize, Serialize};

use crate::error::*;
use crate::models::Social;

const STATUS_REQUIRED: &str = "Status is required";
const SKILLS_REQUIRED: &str = "Skills is required";
const TITLE_REQUIRED: &str = "Title is required";
const COMPANY_REQUIRED: &str = "Company is required";
const SCHOOL_REQUIRED: &str = "School is required";
const DEGREE_REQUIRED: &str = "Degree is required";
const FIELD_REQUIRED: &str = "Field of study is required";
const FROM_REQUIRED: &str = "From date is required";

fn is_blank(field: &Option<String>) -> bool {
  field.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsertProfile {
  pub company: Option<String>,
  pub website: Option<String>,
  pub location: Option<String>,
  pub bio: Option<String>,
  pub status: Option<String>,
  pub githubusername: Option<String>,
  // comma-separated, see `skill_list`.
  pub skills: Option<String>,
  pub social: Option<Social>,
}

impl UpsertProfile {
  pub fn validate(&self) -> Result<()> {
    let mut msgs = Vec::new();
    if is_blank(&self.status) {
      msgs.push(STATUS_REQUIRED);
    }
    if is_blank(&self.skills) {
      msgs.push(SKILLS_REQUIRED);
    }
    if msgs.is_empty() {
      Ok(())
    } else {
      Err(Error::validation(&msgs))
    }
  }

  /// Comma-split and trimmed skills, when present.
  pub fn skill_list(&self) -> Option<Vec<String>> {
    self.skills.as_deref().map(|skills| {
      skills.split(',').map(|skill| skill.trim().to_string()).collect()
    })
  }
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateExperience {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub company: String,
  pub location: Option<String>,
  #[serde(default)]
  pub from: String,
  pub to: Option<String>,
  #[serde(default)]
  pub current: bool,
  pub description: Option<String>,
}

impl CreateExperience {
  pub fn validate(&self) -> Result<()> {
    let mut msgs = Vec::new();
    if self.title.trim().is_empty() {
      msgs.push(TITLE_REQUIRED);
    }
    if self.company.trim().is_empty() {
      msgs.push(COMPANY_REQUIRED);
    }
    if self.from.trim().is_empty() {
      msgs.push(FROM_REQUIRED);
    }
    if msgs.is_empty() {
      Ok(())
    } else {
      Err(Error::validation(&msgs))
    }
  }
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateEducation {
  #[serde(default)]
  pub school: String,
  #[serde(default)]
  pub degree: String,
  #[serde(default)]
  pub fieldofstudy: String,
  pub location: Option<String>,
  #[serde(default)]
  pub from: String,
  pub to: Option<String>,
  #[serde(default)]
  pub current: bool,
  pub description: Option<String>,
}

impl CreateEducation {
  pub fn validate(&self) -> Result<()> {
    let mut msgs = Vec::new();
    if self.school.trim().is_empty() {
      msgs.push(SCHOOL_REQUIRED);
    }
    if self.degree.trim().is_empty() {
      msgs.push(DEGREE_REQUIRED);
    }
    if self.fieldofstudy.trim().is_empty() {
      msgs.push(FIELD_REQUIRED);
    }
    if self.from.trim().is_empty() {
      msgs.push(FROM_REQUIRED);
    }
    if msgs.is_empty() {
      Ok(())
    } else {
      Err(Error::validation(&msgs))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn validation_msgs(err: Error) -> Vec<String> {
    match err {
      Error::Validation(body) => body["errors"].as_array().unwrap()
        .iter()
        .map(|e| e["msg"].as_str().unwrap().to_string())
        .collect(),
      other => panic!("expected Validation, got {:?}", other),
    }
  }

  #[test]
  fn status_and_skills_are_required() {
    let form = UpsertProfile::default();
    let msgs = validation_msgs(form.validate().unwrap_err());
    assert_eq!(msgs, vec!["Status is required", "Skills is required"]);
  }

  #[test]
  fn skills_are_split_and_trimmed() {
    let form = UpsertProfile {
      status: Some("dev".to_string()),
      skills: Some("rust , sql,  actix".to_string()),
      ..Default::default()
    };
    assert!(form.validate().is_ok());
    assert_eq!(form.skill_list().unwrap(), vec!["rust", "sql", "actix"]);
  }

  #[test]
  fn experience_requires_title_company_and_from() {
    let form = CreateExperience::default();
    let msgs = validation_msgs(form.validate().unwrap_err());
    assert_eq!(msgs, vec![
      "Title is required",
      "Company is required",
      "From date is required",
    ]);
  }

  #[test]
  fn education_requires_school_degree_field_and_from() {
    let form = CreateEducation {
      school: "MIT".to_string(),
      ..Default::default()
    };
    let msgs = validation_msgs(form.validate().unwrap_err());
    assert_eq!(msgs, vec![
      "Degree is required",
      "Field of study is required",
      "From date is required",
    ]);
  }
}
