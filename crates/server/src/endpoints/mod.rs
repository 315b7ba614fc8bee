//! # サーバーエンドポイント

pub mod auth_check;
pub mod health;
pub mod login;
pub mod login_info;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auth_check::handle_auth_check;
pub use health::handle_health;
pub use login::handle_login;
pub use login_info::handle_login_info;
