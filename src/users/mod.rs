pub mod handlers;
pub mod model;

pub use model::{SubscriptionPlan, User, UserStats};
