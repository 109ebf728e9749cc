pub mod user;
pub use user::*;

pub mod profile;
pub use profile::*;

pub mod post;
pub use post::*;
