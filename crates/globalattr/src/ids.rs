//! Node identifiers: `YYYYMMDDhhmmss-xxxxxxx` (local timestamp plus seven
//! random lowercase hex characters).

use chrono::Local;
use uuid::Uuid;

pub fn new_node_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Local::now().format("%Y%m%d%H%M%S"), &random[..7])
}

/// Whether `id` has the node id shape.
pub fn is_node_id(id: &str) -> bool {
    let Some((stamp, random)) = id.split_once('-') else {
        return false;
    };
    stamp.len() == 14
        && stamp.bytes().all(|b| b.is_ascii_digit())
        && random.len() == 7
        && random
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'z').contains(&b))
}
