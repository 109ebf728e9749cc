use log::*;

use std::rc::Rc;
use std::cell::RefCell;
use std::time::Duration;

use tokio::time::delay_for;

use tokio_postgres::{
  connect, Client, Statement, Row, NoTls,
  types::ToSql,
};

use crate::error::*;

use super::{
  UserStore,
  ProfileStore,
  PostStore,
};

const MAX_RETRIES: u32 = 10;
const RETRY_DELAY: Duration = Duration::from_millis(100);
const RECONNECT_DELAY: Duration = Duration::from_millis(500);

const DISCONNECTED: &str = "Failed to connect to database";

pub type RefClient = Rc<(u64, Client)>;

#[derive(Clone)]
enum ConnState {
  Down,
  Connecting(u64),
  Up(RefClient),
}

/// Postgres client shared by the stores of one worker.  A background task
/// keeps the connection alive; every established connection gets a fresh
/// version number so stale prepared statements can be detected.
#[derive(Clone)]
pub struct SharedClient {
  state: Rc<RefCell<ConnState>>,
}

impl SharedClient {
  pub fn new(url: &str) -> Self {
    let shared = Self {
      state: Rc::new(RefCell::new(ConnState::Down)),
    };
    let task = shared.clone();
    let url = url.to_string();
    actix_rt::spawn(async move {
      task.run_connection(url).await;
      debug!("db client background task stopped.");
    });
    shared
  }

  async fn run_connection(&self, url: String) {
    let mut version = 0u64;
    loop {
      version += 1;
      self.set_state(ConnState::Connecting(version));
      let (cl, conn) = loop {
        match connect(&url, NoTls).await {
          Ok(pair) => break pair,
          Err(e) => {
            debug!("db connect: ver={}: {}", version, e);
            delay_for(RECONNECT_DELAY).await;
          },
        }
      };
      debug!("db connect: ver={}: connected.", version);
      self.set_state(ConnState::Up(Rc::new((version, cl))));
      // drive the connection until it drops.
      match conn.await {
        Err(e) => debug!("db connection error: {}", e),
        Ok(()) => {
          debug!("db connection closed.");
          return;
        },
      }
      delay_for(RECONNECT_DELAY).await;
    }
  }

  pub async fn get_client(&self) -> Result<RefClient> {
    for _ in 0..MAX_RETRIES {
      match self.get_state() {
        ConnState::Up(cl) => return Ok(cl),
        _ => delay_for(RETRY_DELAY).await,
      }
    }
    Err(Error::DisconnectedError(DISCONNECTED.to_string()))
  }

  /// True while `version` is still the live connection.
  pub fn check_version(&self, version: u64) -> bool {
    match &*self.state.borrow() {
      ConnState::Up(cl) => cl.0 == version,
      _ => false,
    }
  }

  fn get_state(&self) -> ConnState {
    self.state.borrow().clone()
  }

  fn set_state(&self, state: ConnState) {
    self.state.replace(state);
  }
}

type RefPrepared = Rc<(RefClient, Statement)>;

#[derive(Clone)]
enum QueryState {
  New,
  Ready(RefPrepared),
}

macro_rules! impl_query_method {
  ($method:ident, $res_ty:ty) => {
    pub async fn $method(&self, params: &[&(dyn ToSql + Sync)]) -> Result<$res_ty> {
      let mut retries = 0;
      loop {
        let prepared = self.get_prepared().await?;
        let cl = &(prepared.0).1;
        match cl.$method(&prepared.1, params).await {
          Ok(res) => return Ok(res),
          Err(err) => {
            match err.code() {
              None if err.to_string() == "connection closed" => {
                retries += 1;
                if retries >= MAX_RETRIES {
                  return Err(Error::DisconnectedError(DISCONNECTED.to_string()));
                }
                info!("DB connection closed, retry query.");
                self.state.replace(QueryState::New);
                delay_for(RETRY_DELAY).await;
              },
              _ => {
                error!("Postgres error: {:?}, query=[[{}]]", err, self.query);
                return Err(err.into());
              },
            }
          },
        }
      }
    }
  };
}

/// Lazily prepared statement bound to the shared client.  Re-prepares
/// itself whenever the underlying connection has been replaced.
#[derive(Clone)]
pub struct PreparedQuery {
  shared_cl: SharedClient,
  state: RefCell<QueryState>,
  query: String,
}

impl PreparedQuery {
  pub fn new(shared_cl: SharedClient, query: &str) -> Result<Self> {
    Ok(Self {
      shared_cl,
      state: RefCell::new(QueryState::New),
      query: query.to_string(),
    })
  }

  pub async fn prepare(&self) -> Result<()> {
    self.get_prepared().await?;
    Ok(())
  }

  async fn get_prepared(&self) -> Result<RefPrepared> {
    {
      let state = self.state.borrow();
      if let QueryState::Ready(ref prepared) = *state {
        if self.shared_cl.check_version((prepared.0).0) {
          return Ok(prepared.clone());
        }
      }
    }
    let cl = self.shared_cl.get_client().await?;
    let statement = match cl.1.prepare(&self.query).await {
      Ok(statement) => statement,
      Err(err) => {
        error!("Postgres prepare error: {:?}, query=[[{}]]", err, self.query);
        return Err(err.into());
      },
    };
    let prepared = Rc::new((cl, statement));
    self.state.replace(QueryState::Ready(prepared.clone()));
    Ok(prepared)
  }

  impl_query_method!(query, Vec<Row>);
  impl_query_method!(query_one, Row);
  impl_query_method!(query_opt, Option<Row>);
  impl_query_method!(execute, u64);
}

#[derive(Clone)]
pub struct DbService {
  pub shared_cl: SharedClient,
  pub user: UserStore,
  pub profile: ProfileStore,
  pub post: PostStore,
}

impl DbService {
  pub fn new(db_url: &str) -> Result<DbService> {
    let shared_cl = SharedClient::new(db_url);

    Ok(DbService {
      user: UserStore::new(shared_cl.clone())?,
      profile: ProfileStore::new(shared_cl.clone())?,
      post: PostStore::new(shared_cl.clone())?,
      shared_cl,
    })
  }

  pub async fn prepare(&self) -> Result<()> {
    info!("DbService: prepare UserStore.");
    self.user.prepare().await?;
    info!("DbService: prepare ProfileStore.");
    self.profile.prepare().await?;
    info!("DbService: prepare PostStore.");
    self.post.prepare().await?;

    info!("DbService: finished.");
    Ok(())
  }
}
