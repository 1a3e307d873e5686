use super::precompute::{MAGIC_SEED, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;

#[cfg(feature = "load_magic")]
const SNAPSHOT_ENV: &str = "OUTPOST_MAGIC_PATH";
#[cfg(feature = "load_magic")]
const SNAPSHOT_DEFAULT: &str = "magic.bin";

/// The process-wide sliding-attack tables. Generated once on first use;
/// every caller shares the same immutable reference, which is what makes
/// boards on different threads safe without locking.
pub fn magic_tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| {
        #[cfg(feature = "load_magic")]
        if let Some(tables) = read_snapshot() {
            return tables;
        }

        let tables = generate_magic_tables(MAGIC_SEED).expect("magic table generation failed");

        #[cfg(feature = "load_magic")]
        write_snapshot(&tables);

        tables
    })
}

#[cfg(feature = "load_magic")]
fn snapshot_path() -> std::path::PathBuf {
    std::env::var_os(SNAPSHOT_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from(SNAPSHOT_DEFAULT))
}

#[cfg(feature = "load_magic")]
fn read_snapshot() -> Option<MagicTables> {
    let bytes = std::fs::read(snapshot_path()).ok()?;
    match bincode::deserialize(&bytes) {
        Ok(tables) => Some(tables),
        Err(err) => {
            tracing::warn!(%err, "ignoring unreadable magic snapshot, regenerating");
            None
        }
    }
}

#[cfg(feature = "load_magic")]
fn write_snapshot(tables: &MagicTables) {
    let path = snapshot_path();
    match bincode::serialize(tables) {
        Ok(bytes) => {
            if let Err(err) = std::fs::write(&path, bytes) {
                tracing::warn!(%err, path = %path.display(), "failed to write magic snapshot");
            }
        }
        Err(err) => tracing::warn!(%err, "failed to serialize magic tables"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_returns_one_shared_instance() {
        let a = magic_tables() as *const MagicTables;
        let b = magic_tables() as *const MagicTables;
        assert_eq!(a, b);
    }
}
