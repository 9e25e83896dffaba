pub mod onboard;
pub mod run;
pub mod status;
