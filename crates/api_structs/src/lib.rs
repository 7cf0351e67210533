mod exam;
mod session;
mod status;
mod user;

pub mod dtos {
    pub use crate::exam::dtos::*;
    pub use crate::session::dtos::*;
    pub use crate::user::dtos::*;
}

pub use crate::exam::api::*;
pub use crate::session::api::*;
pub use crate::status::api::*;
pub use crate::user::api::*;
