use crate::model::Identity;
use eyre::ensure;
use sha2::{Digest, Sha256};

pub const UNKNOWN: &str = "?";

/// Deterministic variant index in `[0, count)` for a student. The same
/// identity, salt and count always give the same index, whatever the
/// machine or process.
pub fn assign_variant(identity: &Identity, salt: &str, count: usize) -> eyre::Result<usize> {
    ensure!(count > 0, "cannot pick a variant among zero variants");
    let mut h = Sha256::new();
    for part in [
        identity.last_name.trim(),
        identity.first_name.trim(),
        identity.middle_name.trim(),
        identity.group.trim(),
        salt,
    ] {
        h.update(part.as_bytes());
        h.update(b"|");
    }
    let digest = h.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    Ok((u64::from_be_bytes(prefix) % count as u64) as usize)
}

pub fn process_salt(salt: &str, task_number: usize) -> String {
    format!("{salt}/processes/task-{task_number}")
}

/// One-based variant number for display, or `?` when it cannot be
/// computed.
pub fn display_variant(identity: &Identity, salt: &str, count: usize) -> String {
    assign_variant(identity, salt, count)
        .map_or_else(|_| UNKNOWN.to_owned(), |v| (v + 1).to_string())
}
