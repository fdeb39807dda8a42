pub mod controller;
pub mod gate;
pub mod notifier;
pub mod reset_tokens;
pub mod router;
pub mod service;
pub mod tokens;

pub use gate::AuthenticationGate;
pub use notifier::{LogNotifier, ResetTokenNotifier};
pub use reset_tokens::PasswordResetTokenManager;
pub use service::AuthService;
pub use tokens::{RandomTokenGenerator, TokenGenerator};
