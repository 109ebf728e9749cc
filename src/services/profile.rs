use actix_web::{
  get, post, put, delete, web, HttpResponse,
};
use serde_json::Value as JsonValue;

use crate::error::*;
use crate::app::*;
use crate::models::*;
use crate::forms::profile::*;
use crate::auth::AuthData;
use crate::db::DbService;
use crate::middleware::Auth;

const NO_PROFILE: &str = "There is no profile for this user";
const PROFILE_NOT_FOUND: &str = "Profile not found";
const NO_GITHUB_PROFILE: &str = "No Github profile found";

/// Profile lookup used by the experience/education mutations.
async fn own_profile(db: &DbService, user_id: i32) -> Result<Profile> {
  match db.profile.get_by_user(user_id).await? {
    Some(profile) => Ok(profile),
    None => Err(Error::not_found(PROFILE_NOT_FOUND)),
  }
}

/// get the authenticated user's profile
#[get("/profile/me", wrap="Auth::required()")]
async fn me(
  auth: AuthData,
  db: web::Data<DbService>,
) -> Result<HttpResponse> {
  match db.profile.details_by_user(auth.user_id).await? {
    Some(profile) => Ok(HttpResponse::Ok().json(profile)),
    // 400 here, not 404.  Load-bearing inconsistency.
    None => Err(Error::bad_request(NO_PROFILE)),
  }
}

/// create or merge-update the authenticated user's profile
#[post("/profile", wrap="Auth::required()")]
async fn upsert(
  auth: AuthData,
  db: web::Data<DbService>,
  form: web::Json<UpsertProfile>,
) -> Result<HttpResponse> {
  let form = form.into_inner();
  form.validate()?;

  match db.profile.get_by_user(auth.user_id).await? {
    Some(mut profile) => {
      // merge: only the keys present in the form are written.
      profile.apply_update(&form);
      db.profile.save(&profile).await?;
      Ok(HttpResponse::Ok().json(profile))
    },
    None => {
      let profile = db.profile.insert(&Profile::new(auth.user_id, &form)).await?;
      Ok(HttpResponse::Ok().json(profile))
    },
  }
}

/// list all profiles
#[get("/profile")]
async fn list(
  db: web::Data<DbService>,
) -> Result<HttpResponse> {
  let profiles = db.profile.all().await?;
  Ok(HttpResponse::Ok().json(profiles))
}

/// get a profile by the owning user's id
#[get("/profile/user/{user_id}")]
async fn by_user(
  db: web::Data<DbService>,
  user_id: web::Path<String>,
) -> Result<HttpResponse> {
  // a malformed id gets the same answer as an unmatched one.
  let user_id: i32 = user_id.parse()
    .map_err(|_| Error::bad_request(PROFILE_NOT_FOUND))?;
  match db.profile.details_by_user(user_id).await? {
    Some(profile) => Ok(HttpResponse::Ok().json(profile)),
    None => Err(Error::bad_request(PROFILE_NOT_FOUND)),
  }
}

/// delete the authenticated user's profile and account
#[delete("/profile", wrap="Auth::required()")]
async fn remove(
  auth: AuthData,
  db: web::Data<DbService>,
) -> Result<HttpResponse> {
  // TODO: also delete the user's posts once the cascade behavior is decided.
  db.profile.delete_by_user(auth.user_id).await?;
  db.user.delete(auth.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "msg": "User deleted" })))
}

/// add an experience entry
#[put("/profile/experience", wrap="Auth::required()")]
async fn add_experience(
  auth: AuthData,
  db: web::Data<DbService>,
  form: web::Json<CreateExperience>,
) -> Result<HttpResponse> {
  let form = form.into_inner();
  form.validate()?;

  let mut profile = own_profile(&db, auth.user_id).await?;
  profile.add_experience(Experience::new(&form));
  db.profile.save(&profile).await?;
  Ok(HttpResponse::Ok().json(profile))
}

/// remove an experience entry; unmatched ids are a silent no-op
#[delete("/profile/experience/{exp_id}", wrap="Auth::required()")]
async fn remove_experience(
  auth: AuthData,
  db: web::Data<DbService>,
  exp_id: web::Path<String>,
) -> Result<HttpResponse> {
  let mut profile = own_profile(&db, auth.user_id).await?;
  profile.remove_experience(&exp_id);
  db.profile.save(&profile).await?;
  Ok(HttpResponse::Ok().json(profile))
}

/// add an education entry
#[put("/profile/education", wrap="Auth::required()")]
async fn add_education(
  auth: AuthData,
  db: web::Data<DbService>,
  form: web::Json<CreateEducation>,
) -> Result<HttpResponse> {
  let form = form.into_inner();
  form.validate()?;

  let mut profile = own_profile(&db, auth.user_id).await?;
  profile.add_education(Education::new(&form));
  db.profile.save(&profile).await?;
  Ok(HttpResponse::Ok().json(profile))
}

/// remove an education entry; unmatched ids are a silent no-op
#[delete("/profile/education/{edu_id}", wrap="Auth::required()")]
async fn remove_education(
  auth: AuthData,
  db: web::Data<DbService>,
  edu_id: web::Path<String>,
) -> Result<HttpResponse> {
  let mut profile = own_profile(&db, auth.user_id).await?;
  profile.remove_education(&edu_id);
  db.profile.save(&profile).await?;
  Ok(HttpResponse::Ok().json(profile))
}

/// pass-through of the user's five most recent GitHub repositories
#[get("/profile/github/{username}")]
async fn github_repos(
  cfg: web::Data<ProfileService>,
  username: web::Path<String>,
) -> Result<HttpResponse> {
  let url = format!("{}/users/{}/repos?per_page=5&sort=created:asc",
    cfg.github_api, username);
  let resp = cfg.client.get(&url)
    .header(reqwest::header::USER_AGENT, "devconnect")
    .send()
    .await?;

  if !resp.status().is_success() {
    return Err(Error::not_found(NO_GITHUB_PROFILE));
  }
  let repos: JsonValue = resp.json().await?;
  Ok(HttpResponse::Ok().json(repos))
}

#[derive(Debug, Clone, Default)]
pub struct ProfileService {
  pub github_api: String,
  client: reqwest::Client,
}

impl super::Service for ProfileService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    self.github_api = config.get_str("Profile.github_api")?
      .unwrap_or_else(|| "https://api.github.com".to_string());
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .data(self.clone())
      .service(me)
      .service(by_user)
      .service(github_repos)
      .service(upsert)
      .service(add_experience)
      .service(remove_experience)
      .service(add_education)
      .service(remove_education)
      .service(list)
      .service(remove);
  }
}

pub fn new_factory() -> ProfileService {
  Default::default()
}
