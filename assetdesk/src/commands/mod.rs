pub mod check;
pub mod next_name;
pub mod run;
