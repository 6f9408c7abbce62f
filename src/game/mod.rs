pub mod chart;
pub mod judgment;
pub mod leaderboard;
pub mod lifecycle;
pub mod note;
pub mod performance;
pub mod session;
pub mod settings;
