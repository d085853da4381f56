pub mod replay_storage;

pub use replay_storage::{
    StorageError, delete_replay, load_replay, load_replay_from_path, replay_exists, save_replay,
};
