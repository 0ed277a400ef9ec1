pub mod check;
pub mod name;
pub mod serve;
