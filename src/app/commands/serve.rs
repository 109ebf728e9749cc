use log::*;

use std::convert::TryInto;
use std::thread;
use futures::executor;

use crossbeam_channel::{
  bounded, Sender, Receiver,
};

use actix_rt::System;
use actix_web::{get, web, middleware, HttpResponse, App, HttpServer};
use actix_cors::Cors;

use crate::{
  error::*,
  app::*,
  db::DbService,
  services::config_services,
};

#[derive(Debug)]
enum StopEvent {
  Shutdown,
  StopServer,
  StopServerFinished(u32),
}

#[get("/stop")]
async fn stop_server(waiter: web::Data<ServerWaiter>) -> HttpResponse {
  info!("Got shutdown request.");
  waiter.main_shutdown();

  HttpResponse::Ok().body("Shutting down.")
}

#[derive(Clone)]
struct ServerStopper {
  id: u32,
  tx: Sender<StopEvent>,
}

impl ServerStopper {
  fn shutdown(&self) {
    debug!("Signal server({}) to stop.", self.id);
    self.tx.send(StopEvent::StopServer).unwrap();
  }
}

#[derive(Clone)]
struct ServerWaiter {
  id: u32,
  main_tx: Sender<StopEvent>,
  rx: Receiver<StopEvent>,
}

impl ServerWaiter {
  fn wait_shutdown(&self) -> Result<StopEvent> {
    Ok(self.rx.recv()?)
  }

  fn server_stopped(&self) {
    self.main_tx.send(StopEvent::StopServerFinished(self.id)).unwrap();
  }

  fn main_shutdown(&self) {
    info!("Signal main thread to shutdown.");
    self.main_tx.send(StopEvent::Shutdown).unwrap();
  }
}

/// Tracks the spawned servers and coordinates shutdown with them over
/// crossbeam channels.
struct MainStopper {
  tx: Sender<StopEvent>,
  rx: Receiver<StopEvent>,
  servers: Vec<ServerStopper>,
}

impl MainStopper {
  fn new() -> Self {
    let (tx, rx) = bounded(1);
    Self {
      tx, rx,
      servers: Vec::new(),
    }
  }

  fn new_server(&mut self) -> ServerWaiter {
    let id = self.servers.len() as u32;
    let (tx, rx) = bounded(1);
    self.servers.push(ServerStopper { id, tx });
    ServerWaiter {
      id,
      main_tx: self.tx.clone(),
      rx,
    }
  }

  fn wait_shutdown(&self) {
    let mut stopped = 0usize;
    // wait for a shutdown signal, or for every server to stop on its own.
    while stopped < self.servers.len() {
      match self.rx.recv() {
        Err(err) => {
          error!("Main thread waiter received error: {:?}", err);
          return;
        },
        Ok(StopEvent::Shutdown) => {
          info!("Got shutdown signal.  Stop servers.");
          break;
        },
        Ok(StopEvent::StopServerFinished(id)) => {
          stopped += 1;
          debug!("Server({}) stopped.  Remaining {}", id, self.servers.len() - stopped);
          if stopped == self.servers.len() {
            return;
          }
        },
        Ok(ev) => {
          panic!("Main thread received invalid event: {:?}", ev);
        },
      }
    }

    // Tell the remaining servers to shut down and wait for them.
    let mut remaining = self.servers.len() - stopped;
    for stopper in self.servers.iter() {
      stopper.shutdown();
    }
    while remaining > 0 {
      match self.rx.recv() {
        Err(err) => {
          error!("Main thread waiter received error during shutdown: {:?}", err);
          return;
        },
        Ok(StopEvent::StopServerFinished(id)) => {
          remaining -= 1;
          debug!("Server({}) stopped.  Remaining {}", id, remaining);
        },
        Ok(ev) => {
          panic!("Main thread received invalid event during shutdown: {:?}", ev);
        },
      }
    }
    info!("Stopped all servers.");
  }
}

pub fn execute(config: AppConfig) -> Result<()> {
  // Stopper for main thread.
  let mut main_stopper = MainStopper::new();

  let servers = config.get_array("servers")?.expect("Missing list of servers");
  for server in servers.iter() {
    let server = server.clone().into_str()?;
    let cfg = config.clone();
    let waiter = main_stopper.new_server();
    debug!("Spawn server: {}", server);
    thread::spawn(move || {
      match run_server(&cfg, &server, waiter) {
        Err(err) => {
          error!("Error from server({}): {:?}", server, err);
        },
        _ => (),
      }
      debug!("run_server: stopped.");
    });
  }

  // wait on main stopper
  main_stopper.wait_shutdown();

  info!("main thread: stopped.");
  Ok(())
}

async fn test_db(url: String) -> Result<()> {
  let db = DbService::new(&url)?;
  db.prepare().await
}

fn run_server(config: &AppConfig, prefix: &str, waiter: ServerWaiter) -> Result<()> {
  let mut sys = System::new(format!("system.{}", prefix));

  let debug = config.get_bool("debug")?.unwrap_or(false);

  if debug {
    // Check the db connection and all prepared statements up front.
    let db_url = config.get_str("db.url")?.expect("db.url must be set");
    sys.block_on(test_db(db_url))?;
  }

  // configure services
  info!("Serve.Services: configure services. prefix={}", prefix);
  let services = config_services(&config, prefix)?;

  // Check if stopper is enabled for this server
  let stopper = if config.get_bool(&format!("{}.stopper", prefix))?.unwrap_or_default() {
    Some(waiter.clone())
  } else {
    None
  };

  // Start http server
  let mut server = HttpServer::new(move || {
    // change default limits
    let form = web::FormConfig::default().limit(256 * 1024);

    let mut app = App::new()
      .app_data(form)
      .wrap(Cors::new().finish())
      .wrap(middleware::Compress::default())
      .configure(|web| services.web_config(web));

    if let Some(ref stopper) = stopper {
      // Server stopper
      app = app.data(stopper.clone())
      .service(stop_server);
    }

    app
  });

  // workers
  let workers = config.get_int(&format!("{}.workers", prefix))?
    .map(|n| n.try_into().expect("Workers must be > 0"))
    .unwrap_or_else(num_cpus::get);
  info!("Workers: {}", workers);
  server = server.workers(workers);

  // listen backlog
  if let Some(backlog) = config.get_int(&format!("{}.backlog", prefix))? {
    info!("Listen backlog: {}", backlog);
    server = server.backlog(backlog as i32);
  }

  // setup binds.
  let listen = config.get_str(&format!("{}.listen", prefix))?
    .expect(&format!("Missing {}.listen", prefix));
  info!("{} services listening on: {}", prefix, listen);
  server = server.bind(listen)?;

  // start server
  let server = server.run();

  {
    let srv = server.clone();
    let waiter = waiter.clone();
    thread::spawn(move || {
      // wait for shutdown signal.
      match waiter.wait_shutdown() {
        Err(_) => (),
        Ok(StopEvent::StopServer) => {
          debug!("Got shutdown signal.  Stop server: {}", waiter.id);
          executor::block_on(srv.stop(true));
          // notify main thread that we have stopped.
          waiter.server_stopped();
        },
        Ok(ev) => {
          error!("Server waiter received invalid event: {:?}", ev);
        },
      }
    });
  }

  // run server future
  let res = sys.block_on(server);
  waiter.server_stopped();
  Ok(res?)
}
