use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

use tokio_postgres::Row;
use tokio_postgres::types::Json;

#[derive(Clone)]
pub struct PostStore {
  // get one post
  post_by_id: PreparedQuery,

  // public timeline
  public_posts: PreparedQuery,

  // store post
  insert_post: PreparedQuery,

  // single-document save of the embedded arrays
  save_arrays: PreparedQuery,

  // delete post
  delete_post: PreparedQuery,
}

lazy_static! {
  static ref POST_TABLE: TableColumns = {
    TableColumns {
      table_name: "posts",
      columns: &[
        "id",
        "user_id",
        "text",
        "name",
        "avatar",
        "ispublic",
        "likes",
        "comments",
        "created_at",
      ],
    }
  };
}

fn post_from_row(row: &Row) -> Post {
  let likes: Json<Vec<Like>> = row.get(6);
  let comments: Json<Vec<Comment>> = row.get(7);

  Post {
    id: row.get(0),
    user_id: row.get(1),
    text: row.get(2),
    name: row.get(3),
    avatar: row.get(4),
    ispublic: row.get(5),
    likes: likes.0,
    comments: comments.0,
    created_at: row.get(8),
  }
}

fn post_from_opt_row(row: &Option<Row>) -> Option<Post> {
  if let Some(ref row) = row {
    Some(post_from_row(row))
  } else {
    None
  }
}

/// Timeline query: public posts only, newest first, no pagination.
fn public_timeline_sql() -> String {
  format!(r#"{} WHERE ispublic ORDER BY created_at DESC"#, POST_TABLE.select())
}

impl PostStore {
  pub fn new(cl: SharedClient) -> Result<PostStore> {
    let select = POST_TABLE.select();

    let post_by_id = PreparedQuery::new(cl.clone(),
        &format!(r#"{} WHERE id = $1"#, select))?;

    let public_posts = PreparedQuery::new(cl.clone(), &public_timeline_sql())?;

    let insert_post = PreparedQuery::new(cl.clone(),
        &POST_TABLE.insert_returning(&["user_id", "text", "name", "avatar", "ispublic"]))?;

    let save_arrays = PreparedQuery::new(cl.clone(),
        &POST_TABLE.update_where(&["likes", "comments"], "id"))?;

    let delete_post = PreparedQuery::new(cl.clone(),
        r#"DELETE FROM posts WHERE id = $1"#)?;

    Ok(PostStore {
      post_by_id,
      public_posts,
      insert_post,
      save_arrays,
      delete_post,
    })
  }

  pub async fn prepare(&self) -> Result<()> {
    self.post_by_id.prepare().await?;
    self.public_posts.prepare().await?;

    self.insert_post.prepare().await?;
    self.save_arrays.prepare().await?;
    self.delete_post.prepare().await?;

    Ok(())
  }

  pub async fn get_by_id(&self, post_id: i32) -> Result<Option<Post>> {
    let row = self.post_by_id.query_opt(&[&post_id]).await?;
    Ok(post_from_opt_row(&row))
  }

  pub async fn get_public(&self) -> Result<Vec<Post>> {
    let rows = self.public_posts.query(&[]).await?;
    Ok(rows.iter().map(post_from_row).collect())
  }

  /// Store a new post with the author snapshot taken from `author`.
  pub async fn insert(&self, author: &User, text: &str, ispublic: bool) -> Result<Post> {
    let row = self.insert_post.query_one(&[
        &author.id, &text, &author.name, &author.avatar, &ispublic,
    ]).await?;
    Ok(post_from_row(&row))
  }

  /// Write back the embedded like/comment arrays in one document save.
  pub async fn save(&self, post: &Post) -> Result<u64> {
    let likes = Json(&post.likes);
    let comments = Json(&post.comments);
    Ok(self.save_arrays.execute(&[&likes, &comments, &post.id]).await?)
  }

  pub async fn delete(&self, post_id: i32) -> Result<u64> {
    Ok(self.delete_post.execute(&[&post_id]).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timeline_filters_private_posts_and_sorts_newest_first() {
    let sql = public_timeline_sql();
    assert!(sql.contains("WHERE ispublic"), "sql: {}", sql);
    assert!(sql.ends_with("ORDER BY created_at DESC"), "sql: {}", sql);
  }
}
