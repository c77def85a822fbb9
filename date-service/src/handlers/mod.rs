pub mod dates;
pub mod health;

pub use dates::{get_date, submit_date, test_page};
pub use health::{health_check, metrics, readiness_check};
