use crate::error::*;
use crate::models::*;

use crate::auth::pass;

use crate::db::*;
use crate::db::util::*;

use tokio_postgres::Row;

#[derive(Clone)]
pub struct UserStore {
  // gets
  user_by_id: PreparedQuery,
  user_by_email: PreparedQuery,

  // register
  insert_user: PreparedQuery,

  // login rehash
  rehash_password: PreparedQuery,

  // account removal
  delete_user: PreparedQuery,
}

lazy_static! {
  static ref USER_TABLE: TableColumns = {
    TableColumns {
      table_name: "users",
      columns: &[
        "id",
        "name",
        "email",
        "password",
        "avatar",
        "created_at",
      ],
    }
  };
}

fn user_from_row(row: &Row) -> User {
  User {
    id: row.get(0),
    name: row.get(1),
    email: row.get(2),
    password: row.get(3),
    avatar: row.get(4),
    created_at: row.get(5),
  }
}

fn user_from_opt_row(row: &Option<Row>) -> Option<User> {
  if let Some(ref row) = row {
    Some(user_from_row(row))
  } else {
    None
  }
}

impl UserStore {
  pub fn new(cl: SharedClient) -> Result<UserStore> {
    let select = USER_TABLE.select();
    // Build user_by_* queries
    let user_by_id = PreparedQuery::new(cl.clone(),
        &format!(r#"{} WHERE id = $1"#, select))?;
    let user_by_email = PreparedQuery::new(cl.clone(),
        &format!(r#"{} WHERE email = $1"#, select))?;

    let insert_user = PreparedQuery::new(cl.clone(),
        &USER_TABLE.insert_returning(&["name", "email", "password", "avatar"]))?;

    let rehash_password = PreparedQuery::new(cl.clone(),
        &USER_TABLE.update_where(&["password"], "id"))?;

    let delete_user = PreparedQuery::new(cl.clone(),
        r#"DELETE FROM users WHERE id = $1"#)?;

    Ok(UserStore {
      user_by_id,
      user_by_email,
      insert_user,
      rehash_password,
      delete_user,
    })
  }

  pub async fn prepare(&self) -> Result<()> {
    self.user_by_id.prepare().await?;
    self.user_by_email.prepare().await?;

    self.insert_user.prepare().await?;
    self.rehash_password.prepare().await?;
    self.delete_user.prepare().await?;

    Ok(())
  }

  pub async fn get_by_id(&self, user_id: i32) -> Result<Option<User>> {
    let row = self.user_by_id.query_opt(&[&user_id]).await?;
    Ok(user_from_opt_row(&row))
  }

  pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
    let row = self.user_by_email.query_opt(&[&email]).await?;
    Ok(user_from_opt_row(&row))
  }

  pub async fn insert(&self, name: &str, email: &str, password_hash: &str, avatar: Option<&str>) -> Result<User> {
    let row = self.insert_user.query_one(&[&name, &email, &password_hash, &avatar]).await?;
    Ok(user_from_row(&row))
  }

  /// Rehash and store the password, used when the hash scheme advances.
  pub async fn update_password(&self, user_id: i32, password: &str) -> Result<u64> {
    let hash = pass::hash_password(password)?;
    Ok(self.rehash_password.execute(&[&hash, &user_id]).await?)
  }

  pub async fn delete(&self, user_id: i32) -> Result<u64> {
    Ok(self.delete_user.execute(&[&user_id]).await?)
  }
}
