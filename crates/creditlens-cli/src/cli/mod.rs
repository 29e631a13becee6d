//! CLI subcommand implementations for the creditlens binary.

pub mod cache_cmd;
pub mod clients_cmd;
pub mod features_cmd;
pub mod fetch_cmd;
pub mod output;
pub mod prefetch_cmd;
pub mod score_cmd;
pub mod select_cmd;
