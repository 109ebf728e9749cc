use std::io::Write;

/// Column list for one table, used to keep SELECT/INSERT/UPDATE statements
/// and the row mapping functions in one place.
#[derive(Debug, Clone)]
pub struct TableColumns {
  pub table_name: &'static str,
  pub columns: &'static [&'static str],
}

impl TableColumns {
  /// `SELECT <all columns> FROM <table>`
  pub fn select(&self) -> String {
    format!("SELECT {} FROM {}", self.columns.join(", "), self.table_name)
  }

  /// `SELECT <all columns, prefixed> FROM ...` for joined queries.
  pub fn select_prefixed(&self, prefix: &str) -> String {
    let cols = self.columns.iter()
      .map(|col| format!("{}.{}", prefix, col))
      .collect::<Vec<String>>()
      .join(", ");
    format!("SELECT {}", cols)
  }

  /// Insert the given columns, returning the full row so the caller can map
  /// store-assigned fields (id, created_at defaults) back into the model.
  pub fn insert_returning(&self, insert_columns: &[&str]) -> String {
    let mut buf = Vec::new();
    write!(buf, "INSERT INTO {}({}) VALUES(", self.table_name, insert_columns.join(", ")).unwrap();
    for idx in 0..insert_columns.len() {
      if idx > 0 {
        write!(buf, ", ").unwrap();
      }
      write!(buf, "${}", idx + 1).unwrap();
    }
    write!(buf, ") RETURNING {}", self.columns.join(", ")).unwrap();
    String::from_utf8_lossy(&buf).to_string()
  }

  /// `UPDATE <table> SET c1 = $1, ... WHERE <lookup> = $n+1`
  pub fn update_where(&self, set_columns: &[&str], lookup: &str) -> String {
    let mut buf = Vec::new();
    write!(buf, "UPDATE {} SET", self.table_name).unwrap();
    for (idx, col) in set_columns.iter().enumerate() {
      if idx > 0 {
        write!(buf, ",").unwrap();
      }
      write!(buf, " {} = ${}", col, idx + 1).unwrap();
    }
    write!(buf, " WHERE {} = ${}", lookup, set_columns.len() + 1).unwrap();
    String::from_utf8_lossy(&buf).to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TABLE: TableColumns = TableColumns {
    table_name: "things",
    columns: &["id", "label", "created_at"],
  };

  #[test]
  fn select_lists_all_columns() {
    assert_eq!(TABLE.select(), "SELECT id, label, created_at FROM things");
  }

  #[test]
  fn insert_returns_the_full_row() {
    assert_eq!(
      TABLE.insert_returning(&["label"]),
      "INSERT INTO things(label) VALUES($1) RETURNING id, label, created_at"
    );
  }

  #[test]
  fn update_places_the_lookup_param_last() {
    assert_eq!(
      TABLE.update_where(&["label"], "id"),
      "UPDATE things SET label = $1 WHERE id = $2"
    );
  }
}
