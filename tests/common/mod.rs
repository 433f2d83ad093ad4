use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use gradebook::GradebookStorage;

/// A store backed by a fresh SQLite file in the temp dir. The file is removed on drop.
pub struct TempStore {
    pub storage: GradebookStorage,
    path: PathBuf,
}

impl TempStore {
    pub async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "gradebook-{}-{}-{}.sqlite",
            tag,
            std::process::id(),
            nanos
        ));

        let database_url = format!("sqlite:{}", path.display());
        let storage = GradebookStorage::connect(&database_url)
            .await
            .expect("failed to open test database");
        Self { storage, path }
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("sqlite-wal"));
        let _ = std::fs::remove_file(self.path.with_extension("sqlite-shm"));
    }
}
