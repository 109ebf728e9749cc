use actix_web::{
  get, post, web, HttpResponse,
};

use crate::error::*;
use crate::app::*;
use crate::forms::*;
use crate::models::UserDetails;
use crate::auth::{AuthData, GenerateJwt};
use crate::auth::pass;

use crate::db::DbService;

use crate::middleware::Auth;

const USER_EXISTS: &str = "User already exists";
const INVALID_CREDENTIALS: &str = "Invalid Credentials";
const USER_NOT_FOUND: &str = "User not found";

/// register new user
#[post("/users")]
async fn register(
  cfg: web::Data<UserService>,
  db: web::Data<DbService>,
  form: web::Json<RegisterUser>,
) -> Result<HttpResponse> {
  if !cfg.allow_register {
    return Ok(HttpResponse::Forbidden().finish());
  }
  let form = form.into_inner();
  form.validate()?;

  if db.user.get_by_email(&form.email).await?.is_some() {
    return Err(Error::validation(&[USER_EXISTS]));
  }

  let avatar = crate::util::gravatar_url(&form.email);
  let hash = pass::hash_password(&form.password)?;
  let user = db.user.insert(&form.name, &form.email, &hash, Some(avatar.as_str())).await?;

  let token = user.generate_jwt()?;
  Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// login, returns a fresh token
#[post("/auth")]
async fn login(
  db: web::Data<DbService>,
  form: web::Json<LoginUser>,
) -> Result<HttpResponse> {
  let form = form.into_inner();
  form.validate()?;

  let user = match db.user.get_by_email(&form.email).await? {
    Some(user) => user,
    None => return Err(Error::validation(&[INVALID_CREDENTIALS])),
  };

  let res = pass::check_password(&user.password, &form.password)?;
  if !res.is_valid {
    return Err(Error::validation(&[INVALID_CREDENTIALS]));
  }
  if res.needs_update {
    // Rehash password.
    db.user.update_password(user.id, &form.password).await?;
  }

  let token = user.generate_jwt()?;
  Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// get the authenticated user, password hash stripped
#[get("/auth", wrap="Auth::required()")]
async fn get_user(
  auth: AuthData,
  db: web::Data<DbService>,
) -> Result<HttpResponse> {
  match db.user.get_by_id(auth.user_id).await? {
    Some(user) => Ok(HttpResponse::Ok().json(UserDetails::from(user))),
    None => Err(Error::not_found(USER_NOT_FOUND)),
  }
}

#[derive(Debug, Clone, Default)]
pub struct UserService {
  pub allow_register: bool,
}

impl super::Service for UserService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    self.allow_register = config.get_bool("User.allow_register")?.unwrap_or(false);
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .data(self.clone())
      .service(register)
      .service(login)
      .service(get_user);
  }
}

pub fn new_factory() -> UserService {
  Default::default()
}
