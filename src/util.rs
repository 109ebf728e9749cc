/// Gravatar URL for an email address: 200px, PG rated, "mystery man" default.
pub fn gravatar_url(email: &str) -> String {
  let digest = md5::compute(email.trim().to_lowercase().as_bytes());
  format!("https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm", digest)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gravatar_is_case_and_whitespace_insensitive() {
    let a = gravatar_url("Someone@Example.com ");
    let b = gravatar_url("someone@example.com");
    assert_eq!(a, b);
    assert!(a.starts_with("https://www.gravatar.com/avatar/"));
    assert!(a.ends_with("?s=200&r=pg&d=mm"));
  }
}
