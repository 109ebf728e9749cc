use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::forms::profile::*;
use crate::models::Owner;

/// Social links.  All optional; absent fields are omitted from responses.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Social {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub youtube: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub twitter: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub facebook: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub linkedin: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub instagram: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub devpost: Option<String>,
}

impl Social {
  /// Overwrite only the fields present in `other`.
  pub fn merge(&mut self, other: &Social) {
    if other.youtube.is_some() { self.youtube = other.youtube.clone(); }
    if other.twitter.is_some() { self.twitter = other.twitter.clone(); }
    if other.facebook.is_some() { self.facebook = other.facebook.clone(); }
    if other.linkedin.is_some() { self.linkedin = other.linkedin.clone(); }
    if other.instagram.is_some() { self.instagram = other.instagram.clone(); }
    if other.devpost.is_some() { self.devpost = other.devpost.clone(); }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
  pub id: String,
  pub title: String,
  pub company: String,
  pub location: Option<String>,
  pub from: String,
  pub to: Option<String>,
  pub current: bool,
  pub description: Option<String>,
}

impl Experience {
  pub fn new(form: &CreateExperience) -> Experience {
    Experience {
      id: Uuid::new_v4().to_string(),
      title: form.title.clone(),
      company: form.company.clone(),
      location: form.location.clone(),
      from: form.from.clone(),
      to: form.to.clone(),
      current: form.current,
      description: form.description.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
  pub id: String,
  pub school: String,
  pub degree: String,
  pub fieldofstudy: String,
  pub location: Option<String>,
  pub from: String,
  pub to: Option<String>,
  pub current: bool,
  pub description: Option<String>,
}

impl Education {
  pub fn new(form: &CreateEducation) -> Education {
    Education {
      id: Uuid::new_v4().to_string(),
      school: form.school.clone(),
      degree: form.degree.clone(),
      fieldofstudy: form.fieldofstudy.clone(),
      location: form.location.clone(),
      from: form.from.clone(),
      to: form.to.clone(),
      current: form.current,
      description: form.description.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
  pub id: i32,
  pub user_id: i32,
  pub company: Option<String>,
  pub website: Option<String>,
  pub location: Option<String>,
  pub bio: Option<String>,
  pub status: String,
  pub githubusername: Option<String>,
  pub skills: Vec<String>,
  pub social: Social,
  pub experience: Vec<Experience>,
  pub education: Vec<Education>,
  pub created_at: NaiveDateTime,
}

impl Profile {
  /// Fresh profile built from exactly the fields present in the form.
  /// The id is assigned by the store on insert.
  pub fn new(user_id: i32, form: &UpsertProfile) -> Profile {
    let mut profile = Profile {
      id: 0,
      user_id,
      company: None,
      website: None,
      location: None,
      bio: None,
      status: String::new(),
      githubusername: None,
      skills: Vec::new(),
      social: Social::default(),
      experience: Vec::new(),
      education: Vec::new(),
      created_at: chrono::Utc::now().naive_utc(),
    };
    profile.apply_update(form);
    profile
  }

  /// Merge-update: only the keys present in the form are written, absent
  /// keys keep their stored value.  A present skills string fully replaces
  /// the prior list.
  pub fn apply_update(&mut self, form: &UpsertProfile) {
    if let Some(company) = &form.company { self.company = Some(company.clone()); }
    if let Some(website) = &form.website { self.website = Some(website.clone()); }
    if let Some(location) = &form.location { self.location = Some(location.clone()); }
    if let Some(bio) = &form.bio { self.bio = Some(bio.clone()); }
    if let Some(status) = &form.status { self.status = status.clone(); }
    if let Some(githubusername) = &form.githubusername {
      self.githubusername = Some(githubusername.clone());
    }
    if let Some(skills) = form.skill_list() { self.skills = skills; }
    if let Some(social) = &form.social { self.social.merge(social); }
  }

  pub fn add_experience(&mut self, exp: Experience) {
    self.experience.insert(0, exp);
  }

  /// Remove by id.  Silently a no-op when the id matches nothing.
  pub fn remove_experience(&mut self, exp_id: &str) {
    self.experience.retain(|e| e.id != exp_id);
  }

  pub fn add_education(&mut self, edu: Education) {
    self.education.insert(0, edu);
  }

  /// Remove by id.  Silently a no-op when the id matches nothing.
  pub fn remove_education(&mut self, edu_id: &str) {
    self.education.retain(|e| e.id != edu_id);
  }
}

/// Profile with the owning user's public fields populated at read time.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileDetails {
  pub id: i32,
  pub user: Owner,
  pub company: Option<String>,
  pub website: Option<String>,
  pub location: Option<String>,
  pub bio: Option<String>,
  pub status: String,
  pub githubusername: Option<String>,
  pub skills: Vec<String>,
  pub social: Social,
  pub experience: Vec<Experience>,
  pub education: Vec<Education>,
  pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn upsert_form(status: &str, skills: &str) -> UpsertProfile {
    UpsertProfile {
      status: Some(status.to_string()),
      skills: Some(skills.to_string()),
      ..Default::default()
    }
  }

  fn exp_form(title: &str) -> CreateExperience {
    CreateExperience {
      title: title.to_string(),
      company: "Acme".to_string(),
      from: "2019-01-01".to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn new_profile_takes_exactly_the_present_fields() {
    let mut form = upsert_form("developer", "rust, sql");
    form.bio = Some("hi".to_string());
    let profile = Profile::new(5, &form);

    assert_eq!(profile.user_id, 5);
    assert_eq!(profile.status, "developer");
    assert_eq!(profile.skills, vec!["rust", "sql"]);
    assert_eq!(profile.bio.as_deref(), Some("hi"));
    assert_eq!(profile.company, None);
    assert_eq!(profile.social, Social::default());
  }

  #[test]
  fn second_update_wins_on_overlap_and_keeps_the_rest() {
    let mut first = upsert_form("developer", "rust");
    first.company = Some("Acme".to_string());
    first.location = Some("Berlin".to_string());
    let mut profile = Profile::new(5, &first);

    let mut second = upsert_form("manager", "sql, go");
    second.location = Some("Paris".to_string());
    profile.apply_update(&second);

    // second-call values win on overlapping keys.
    assert_eq!(profile.status, "manager");
    assert_eq!(profile.skills, vec!["sql", "go"]);
    assert_eq!(profile.location.as_deref(), Some("Paris"));
    // keys never mentioned by the second call remain from the first.
    assert_eq!(profile.company.as_deref(), Some("Acme"));
  }

  #[test]
  fn social_links_merge_independently() {
    let mut form = upsert_form("dev", "rust");
    form.social = Some(Social {
      twitter: Some("@a".to_string()),
      youtube: Some("yt/a".to_string()),
      ..Default::default()
    });
    let mut profile = Profile::new(5, &form);

    let mut next = upsert_form("dev", "rust");
    next.social = Some(Social {
      twitter: Some("@b".to_string()),
      ..Default::default()
    });
    profile.apply_update(&next);

    assert_eq!(profile.social.twitter.as_deref(), Some("@b"));
    assert_eq!(profile.social.youtube.as_deref(), Some("yt/a"));
  }

  #[test]
  fn experience_is_head_inserted_and_removed_by_id() {
    let mut profile = Profile::new(5, &upsert_form("dev", "rust"));
    profile.add_experience(Experience::new(&exp_form("junior")));
    profile.add_experience(Experience::new(&exp_form("senior")));
    assert_eq!(profile.experience[0].title, "senior");
    assert_eq!(profile.experience[1].title, "junior");

    let id = profile.experience[1].id.clone();
    profile.remove_experience(&id);
    assert_eq!(profile.experience.len(), 1);
    assert_eq!(profile.experience[0].title, "senior");
  }

  #[test]
  fn removing_an_unknown_entry_is_a_noop() {
    let mut profile = Profile::new(5, &upsert_form("dev", "rust"));
    profile.add_experience(Experience::new(&exp_form("junior")));
    let before = profile.clone();

    profile.remove_experience("no-such-id");
    profile.remove_education("no-such-id");
    assert_eq!(profile, before);
  }

  #[test]
  fn education_mirrors_experience_semantics() {
    let mut profile = Profile::new(5, &upsert_form("dev", "rust"));
    let edu = CreateEducation {
      school: "MIT".to_string(),
      degree: "BSc".to_string(),
      fieldofstudy: "CS".to_string(),
      from: "2015-09-01".to_string(),
      ..Default::default()
    };
    profile.add_education(Education::new(&edu));
    assert_eq!(profile.education[0].school, "MIT");

    let id = profile.education[0].id.clone();
    profile.remove_education(&id);
    assert!(profile.education.is_empty());
  }
}
