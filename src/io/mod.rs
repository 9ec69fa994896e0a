pub mod ensemble_csv;
pub mod export;
pub mod run_log;
