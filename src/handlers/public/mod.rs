pub mod auth; // POST /auth/login, POST /auth/signup
pub mod user; // POST /users/post_user
