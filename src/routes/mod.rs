pub mod auth;

pub mod onboarding;

pub mod institutions;

pub mod courses;

pub mod subjects;

pub mod classes;

pub mod students;

pub mod components;

pub mod grades;

pub mod health;

pub mod frontend;

pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use components::configure_components_routes;
pub use courses::configure_courses_routes;
pub use frontend::configure_frontend_routes;
pub use grades::configure_grades_routes;
pub use health::configure_health_routes;
pub use institutions::configure_institutions_routes;
pub use onboarding::configure_onboarding_routes;
pub use students::configure_students_routes;
pub use subjects::configure_subjects_routes;
