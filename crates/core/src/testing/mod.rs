//! Test doubles for the external collaborators.

mod mock_client;

pub use mock_client::MockTorrentClient;
