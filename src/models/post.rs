use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
  pub user: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
  pub id: String,
  pub user: i32,
  pub text: String,
  pub name: String,
  pub avatar: Option<String>,
  pub created_at: NaiveDateTime,
}

impl Comment {
  /// New comment with a fresh id and an author snapshot taken now.
  pub fn new(author: &User, text: &str) -> Comment {
    Comment {
      id: Uuid::new_v4().to_string(),
      user: author.id,
      text: text.to_string(),
      name: author.name.clone(),
      avatar: author.avatar.clone(),
      created_at: chrono::Utc::now().naive_utc(),
    }
  }
}

#[derive(Debug, PartialEq)]
pub enum CommentRemoval {
  Removed,
  NotFound,
  NotOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
  pub id: i32,
  pub user_id: i32,
  pub text: String,
  // author snapshot captured at creation time, never re-synced.
  pub name: String,
  pub avatar: Option<String>,
  pub ispublic: bool,
  pub likes: Vec<Like>,
  pub comments: Vec<Comment>,
  pub created_at: NaiveDateTime,
}

impl Post {
  /// Head-insert a like.  Returns false when the user already liked the post.
  pub fn like(&mut self, user_id: i32) -> bool {
    if self.likes.iter().any(|like| like.user == user_id) {
      return false;
    }
    self.likes.insert(0, Like { user: user_id });
    true
  }

  /// Remove the user's like.  Returns false when the post was never liked.
  pub fn unlike(&mut self, user_id: i32) -> bool {
    match self.likes.iter().position(|like| like.user == user_id) {
      Some(idx) => {
        self.likes.remove(idx);
        true
      },
      None => false,
    }
  }

  pub fn add_comment(&mut self, comment: Comment) {
    self.comments.insert(0, comment);
  }

  /// Remove a comment by id.  Only the comment's author may remove it.
  pub fn remove_comment(&mut self, comment_id: &str, requester: i32) -> CommentRemoval {
    match self.comments.iter().find(|c| c.id == comment_id) {
      None => CommentRemoval::NotFound,
      Some(comment) if comment.user != requester => CommentRemoval::NotOwner,
      Some(_) => {
        self.comments.retain(|c| c.id != comment_id);
        CommentRemoval::Removed
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_user(id: i32, name: &str) -> User {
    User {
      id,
      name: name.to_string(),
      email: format!("{}@example.com", name),
      password: "hash".to_string(),
      avatar: None,
      created_at: chrono::Utc::now().naive_utc(),
    }
  }

  fn test_post(user_id: i32) -> Post {
    Post {
      id: 1,
      user_id,
      text: "hello".to_string(),
      name: "author".to_string(),
      avatar: None,
      ispublic: true,
      likes: Vec::new(),
      comments: Vec::new(),
      created_at: chrono::Utc::now().naive_utc(),
    }
  }

  #[test]
  fn like_is_unique_per_user() {
    let mut post = test_post(1);
    assert!(post.like(7));
    assert!(!post.like(7));
    assert_eq!(post.likes.len(), 1);
  }

  #[test]
  fn likes_are_head_inserted() {
    let mut post = test_post(1);
    post.like(7);
    post.like(8);
    post.like(9);
    let order: Vec<i32> = post.likes.iter().map(|l| l.user).collect();
    assert_eq!(order, vec![9, 8, 7]);
  }

  #[test]
  fn unlike_never_liked_fails() {
    let mut post = test_post(1);
    assert!(!post.unlike(7));
  }

  #[test]
  fn like_then_unlike_restores_sequence() {
    let mut post = test_post(1);
    post.like(7);
    post.like(8);
    let before = post.likes.clone();

    post.like(9);
    assert!(post.unlike(9));
    assert_eq!(post.likes, before);
  }

  #[test]
  fn comments_are_head_inserted() {
    let mut post = test_post(1);
    let alice = test_user(2, "alice");
    let bob = test_user(3, "bob");
    post.add_comment(Comment::new(&alice, "first"));
    post.add_comment(Comment::new(&bob, "second"));

    assert_eq!(post.comments[0].text, "second");
    assert_eq!(post.comments[1].text, "first");
  }

  #[test]
  fn comment_snapshot_captures_author_fields() {
    let mut author = test_user(2, "alice");
    author.avatar = Some("https://example.com/a.png".to_string());
    let comment = Comment::new(&author, "hi");
    assert_eq!(comment.user, 2);
    assert_eq!(comment.name, "alice");
    assert_eq!(comment.avatar.as_deref(), Some("https://example.com/a.png"));
    assert!(!comment.id.is_empty());
  }

  #[test]
  fn only_the_author_can_remove_a_comment() {
    let mut post = test_post(1);
    let alice = test_user(2, "alice");
    post.add_comment(Comment::new(&alice, "mine"));
    let id = post.comments[0].id.clone();

    assert_eq!(post.remove_comment(&id, 3), CommentRemoval::NotOwner);
    assert_eq!(post.comments.len(), 1);

    assert_eq!(post.remove_comment(&id, 2), CommentRemoval::Removed);
    assert!(post.comments.is_empty());
  }

  #[test]
  fn removing_a_comment_leaves_the_others() {
    let mut post = test_post(1);
    let alice = test_user(2, "alice");
    post.add_comment(Comment::new(&alice, "one"));
    post.add_comment(Comment::new(&alice, "two"));
    post.add_comment(Comment::new(&alice, "three"));
    let id = post.comments[1].id.clone();

    assert_eq!(post.remove_comment(&id, 2), CommentRemoval::Removed);
    let texts: Vec<&str> = post.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["three", "one"]);
  }

  #[test]
  fn removing_an_unknown_comment_reports_not_found() {
    let mut post = test_post(1);
    assert_eq!(post.remove_comment("no-such-id", 2), CommentRemoval::NotFound);
  }
}
