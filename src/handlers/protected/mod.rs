pub mod auth; // GET /auth/auth
pub mod resource; // get_one / get_many / get_all / create / update / delete for every resource
