pub mod classify;
pub mod credentials;
pub mod export;
pub mod ldif;
pub mod profile;
pub mod prompt;
pub mod query;
pub mod report;

pub mod prelude {
    pub use crate::classify::{ObjectType, Verdict};
    pub use crate::credentials::QueryCredentials;
    pub use crate::profile::Profile;
}
