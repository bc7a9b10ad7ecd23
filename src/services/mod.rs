//! Services layer for turnstile
//!
//! Business logic between the HTTP routes and the stores. Every operation
//! that touches an owned resource takes the caller's
//! [`AuthorizationContext`](crate::auth::AuthorizationContext) explicitly.
//!
//! ## Services
//!
//! - **Users**: registration and profile updates
//! - **Accounts**: balance account lookups
//! - **Events**: owned event records

pub mod accounts;
pub mod events;
pub mod users;

pub use accounts::AccountService;
pub use events::EventService;
pub use users::{
    is_valid_email, ProfileUpdateRequest, RegisterRequest, Registered, UserService,
    MIN_PASSWORD_LEN,
};
