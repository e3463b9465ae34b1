mod auth;
pub mod dto;
mod records;
pub mod response;
mod router;
mod sections;
mod shifts;
mod users;
pub mod validation;

pub use router::{AppState, create_router};
