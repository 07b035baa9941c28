pub mod activity;
pub mod email;
pub mod ethos;
pub mod goal;
pub mod token;
pub mod user;

pub use activity::Activity;
pub use email::{EmailKind, EmailRecord};
pub use ethos::Ethos;
pub use goal::{Goal, GoalState, Subgoal};
pub use token::{ApiToken, ApiTokenResponse};
pub use user::{User, UserResponse};
