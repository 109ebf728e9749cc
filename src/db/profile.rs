use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

use tokio_postgres::Row;
use tokio_postgres::types::Json;

#[derive(Clone)]
pub struct ProfileStore {
  // raw row for mutation
  profile_by_user: PreparedQuery,

  // populated reads
  details_by_user: PreparedQuery,
  all_details: PreparedQuery,

  // store profile
  insert_profile: PreparedQuery,

  // whole-document save
  save_profile: PreparedQuery,

  // account removal
  delete_profile: PreparedQuery,
}

lazy_static! {
  static ref PROFILE_TABLE: TableColumns = {
    TableColumns {
      table_name: "profiles",
      columns: &[
        "id",
        "user_id",
        "company",
        "website",
        "location",
        "bio",
        "status",
        "githubusername",
        "skills",
        "social",
        "experience",
        "education",
        "created_at",
      ],
    }
  };
}

const MUTABLE_COLUMNS: &[&str] = &[
  "company",
  "website",
  "location",
  "bio",
  "status",
  "githubusername",
  "skills",
  "social",
  "experience",
  "education",
];

fn profile_from_row(row: &Row) -> Profile {
  let skills: Json<Vec<String>> = row.get(8);
  let social: Json<Social> = row.get(9);
  let experience: Json<Vec<Experience>> = row.get(10);
  let education: Json<Vec<Education>> = row.get(11);

  Profile {
    id: row.get(0),
    user_id: row.get(1),
    company: row.get(2),
    website: row.get(3),
    location: row.get(4),
    bio: row.get(5),
    status: row.get(6),
    githubusername: row.get(7),
    skills: skills.0,
    social: social.0,
    experience: experience.0,
    education: education.0,
    created_at: row.get(12),
  }
}

fn profile_from_opt_row(row: &Option<Row>) -> Option<Profile> {
  if let Some(ref row) = row {
    Some(profile_from_row(row))
  } else {
    None
  }
}

/// Same columns as `profile_from_row` plus the populated owner fields.
fn details_from_row(row: &Row) -> ProfileDetails {
  let profile = profile_from_row(row);
  let name: String = row.get(13);
  let avatar: Option<String> = row.get(14);

  ProfileDetails {
    id: profile.id,
    user: Owner {
      id: profile.user_id,
      name,
      avatar,
    },
    company: profile.company,
    website: profile.website,
    location: profile.location,
    bio: profile.bio,
    status: profile.status,
    githubusername: profile.githubusername,
    skills: profile.skills,
    social: profile.social,
    experience: profile.experience,
    education: profile.education,
    created_at: profile.created_at,
  }
}

fn details_from_opt_row(row: &Option<Row>) -> Option<ProfileDetails> {
  if let Some(ref row) = row {
    Some(details_from_row(row))
  } else {
    None
  }
}

impl ProfileStore {
  pub fn new(cl: SharedClient) -> Result<ProfileStore> {
    let select = PROFILE_TABLE.select();
    // populated select: the profile columns plus the owner's public fields.
    let details_select = format!(
        r#"{}, u.name, u.avatar FROM profiles p INNER JOIN users u ON p.user_id = u.id"#,
        PROFILE_TABLE.select_prefixed("p"));

    let profile_by_user = PreparedQuery::new(cl.clone(),
        &format!(r#"{} WHERE user_id = $1"#, select))?;

    let details_by_user = PreparedQuery::new(cl.clone(),
        &format!(r#"{} WHERE p.user_id = $1"#, details_select))?;
    let all_details = PreparedQuery::new(cl.clone(),
        &format!(r#"{} ORDER BY p.id"#, details_select))?;

    let insert_profile = PreparedQuery::new(cl.clone(),
        &PROFILE_TABLE.insert_returning(&[
          "user_id", "company", "website", "location", "bio", "status",
          "githubusername", "skills", "social", "experience", "education",
        ]))?;

    let save_profile = PreparedQuery::new(cl.clone(),
        &PROFILE_TABLE.update_where(MUTABLE_COLUMNS, "id"))?;

    let delete_profile = PreparedQuery::new(cl.clone(),
        r#"DELETE FROM profiles WHERE user_id = $1"#)?;

    Ok(ProfileStore {
      profile_by_user,
      details_by_user,
      all_details,
      insert_profile,
      save_profile,
      delete_profile,
    })
  }

  pub async fn prepare(&self) -> Result<()> {
    self.profile_by_user.prepare().await?;
    self.details_by_user.prepare().await?;
    self.all_details.prepare().await?;

    self.insert_profile.prepare().await?;
    self.save_profile.prepare().await?;
    self.delete_profile.prepare().await?;

    Ok(())
  }

  pub async fn get_by_user(&self, user_id: i32) -> Result<Option<Profile>> {
    let row = self.profile_by_user.query_opt(&[&user_id]).await?;
    Ok(profile_from_opt_row(&row))
  }

  pub async fn details_by_user(&self, user_id: i32) -> Result<Option<ProfileDetails>> {
    let row = self.details_by_user.query_opt(&[&user_id]).await?;
    Ok(details_from_opt_row(&row))
  }

  pub async fn all(&self) -> Result<Vec<ProfileDetails>> {
    let rows = self.all_details.query(&[]).await?;
    Ok(rows.iter().map(details_from_row).collect())
  }

  pub async fn insert(&self, profile: &Profile) -> Result<Profile> {
    let skills = Json(&profile.skills);
    let social = Json(&profile.social);
    let experience = Json(&profile.experience);
    let education = Json(&profile.education);
    let row = self.insert_profile.query_one(&[
        &profile.user_id, &profile.company, &profile.website, &profile.location,
        &profile.bio, &profile.status, &profile.githubusername,
        &skills, &social, &experience, &education,
    ]).await?;
    Ok(profile_from_row(&row))
  }

  /// Write the whole mutable part of the profile back in one save.
  pub async fn save(&self, profile: &Profile) -> Result<u64> {
    let skills = Json(&profile.skills);
    let social = Json(&profile.social);
    let experience = Json(&profile.experience);
    let education = Json(&profile.education);
    Ok(self.save_profile.execute(&[
        &profile.company, &profile.website, &profile.location, &profile.bio,
        &profile.status, &profile.githubusername,
        &skills, &social, &experience, &education,
        &profile.id,
    ]).await?)
  }

  pub async fn delete_by_user(&self, user_id: i32) -> Result<u64> {
    Ok(self.delete_profile.execute(&[&user_id]).await?)
  }
}
