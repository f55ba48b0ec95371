//! Application Layer
//!
//! Configuration, authenticators and use cases.

pub mod authenticator;
pub mod config;
pub mod password_reset;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use authenticator::{AnyAuthenticator, Authenticator};
pub use config::{AuthConfig, AuthType, StoreKind};
pub use password_reset::{PasswordResetUseCase, UpdatePasswordInput};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
