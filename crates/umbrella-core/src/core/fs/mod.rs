//! Filesystem chores: numbered backups, executable lookup and directory listing.

pub mod backup;
pub mod listing;
pub mod which;
