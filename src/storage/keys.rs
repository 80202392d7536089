//! Object key layout.
//!
//! Asset files live at `media/{folder_id}/{file_name}`. Moving an asset to
//! another folder therefore changes its key.

/// Prefix shared by every asset object.
pub const MEDIA_PREFIX: &str = "media";

/// Build the object key for a file stored in a folder.
pub fn asset_key(folder_id: i64, file_name: &str) -> String {
    format!("{MEDIA_PREFIX}/{folder_id}/{file_name}")
}

/// Key prefix covering every object of one folder.
pub fn folder_prefix(folder_id: i64) -> String {
    format!("{MEDIA_PREFIX}/{folder_id}")
}

/// Split an asset key back into its folder id and file name.
///
/// Returns `None` for keys that do not follow the layout.
pub fn parse_asset_key(key: &str) -> Option<(i64, &str)> {
    let rest = key.strip_prefix(MEDIA_PREFIX)?.strip_prefix('/')?;
    let (folder, file) = rest.split_once('/')?;
    if file.is_empty() || file.contains('/') {
        return None;
    }
    Some((folder.parse().ok()?, file))
}
