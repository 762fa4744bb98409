pub mod auth;
pub mod engagement;
pub mod sessions;

pub use auth::IdentityClient;
pub use engagement::{EngagementStore, FeedState};
pub use sessions::SessionRegistry;
