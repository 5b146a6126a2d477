pub mod auth;

pub mod users;

pub mod classes;

pub mod students;

pub mod courses;

pub mod evaluations;

pub mod rankings;

pub mod system;

pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use courses::configure_courses_routes;
pub use evaluations::configure_evaluations_routes;
pub use rankings::configure_rankings_routes;
pub use students::configure_students_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
