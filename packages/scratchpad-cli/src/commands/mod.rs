pub mod info;
pub mod run;
pub mod simulate;
