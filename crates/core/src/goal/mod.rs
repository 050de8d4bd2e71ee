//! Goal contributions and progress metrics.

pub mod error;
pub mod service;
pub mod types;


pub use error::GoalError;
pub use service::{GoalService, months_between};
pub use types::{
    ContributionPoint, ContributionSplit, GoalProgress, GoalProjection, GoalRecommendations,
    GoalSnapshot, MILESTONES,
};
