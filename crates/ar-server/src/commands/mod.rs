pub mod check;
pub mod players;
pub mod serve;
