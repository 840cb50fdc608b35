pub mod announcement;
pub mod error;
pub mod manifest;
pub mod rows;
pub mod traits;

pub mod prelude {
    pub use super::announcement::*;
    pub use super::error::*;
    pub use super::manifest::*;
    pub use super::rows::*;
    pub use super::traits::*;
}
