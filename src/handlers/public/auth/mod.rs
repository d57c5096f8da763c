// handlers/public/auth/mod.rs - token acquisition endpoints

pub mod login; // POST /auth/login - authenticate and get JWT
pub mod signup; // POST /auth/signup - create account and get JWT

pub use login::login;
pub use signup::signup;
