// Professional-network OAuth: login redirect, code exchange, identity upsert.
// The same client publishes posts on the member's behalf.

pub mod handlers;
pub mod linkedin;

pub use linkedin::{IdentityProvider, LinkedInClient, LinkedInError};
