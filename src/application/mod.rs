pub mod credential_manager;
pub mod sheet_sync;
pub mod update_tally;
pub mod updater;
