//! Name rules and the messages shown when they are broken.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::{AssetManagerError, Result};

/// Characters allowed in folder and asset names.
pub const VALID_NAME_FORMAT: &str = r#"^[a-zA-Z0-9\-_'"&,.() ]+$"#;

/// Characters allowed in stored file names.
pub const VALID_FILE_NAME_FORMAT: &str = r"^[a-zA-Z0-9\-_.]+$";

static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALID_NAME_FORMAT).expect("name pattern compiles"));

static VALID_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALID_FILE_NAME_FORMAT).expect("file name pattern compiles"));

/// Label used for the parent of root-level folders in messages.
pub const ROOT_LABEL: &str = "root";

pub const FOLDER_SET_AS_OWN_PARENT: &str = "A Folder cannot be set as its own Parent! \
Please choose an alternative Folder or leave blank to create a root level Folder.";

pub const DESCENDANT_SET_AS_PARENT: &str = "A Folder's Parent cannot be one of its \
sub-folders! Please choose an alternative Folder or leave blank to create a root level Folder";

pub const MISSING_PARENT: &str =
    "No Parent Folder has been selected. Please choose a Parent Folder.";

pub fn invalid_name_msg(kind: &str) -> String {
    format!(
        "Invalid {kind} name, please use only: a-z A-Z 0-9 and these characters: _ - ' \" & , . ( )"
    )
}

pub fn duplicate_file_name_msg(file: &str, folder: &str, asset: &str) -> String {
    format!(
        "A file with the name \"{file}\" already exists in this Folder: {folder}, \
         attached to Asset {asset}. Please rename the file."
    )
}

pub fn duplicate_model_name_msg(kind: &str, name: &str, folder: &str) -> String {
    format!(
        "{kind} \"{name}\" already exists within Folder \"{folder}\" . \
         Please choose another name or a different parent."
    )
}

pub fn duplicate_inline_name_msg(kind: &str, name: &str) -> String {
    format!(
        "You are attempting to add more than one {kind} with the same name: \"{name}\". \
         Please choose unique names for each {kind}."
    )
}

/// Check a folder or asset name against the allowed character set.
///
/// `kind` is the word used in the message, e.g. `Folder` or `Asset`.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if VALID_NAME.is_match(name) {
        Ok(())
    } else {
        Err(AssetManagerError::Validation(invalid_name_msg(kind)))
    }
}

/// Check a stored file name against the allowed character set.
///
/// Names made only of dots are refused: they are not valid object path segments.
pub fn validate_file_name(name: &str) -> Result<()> {
    if VALID_FILE_NAME.is_match(name) && name.chars().any(|c| c != '.') {
        Ok(())
    } else {
        Err(AssetManagerError::Validation(invalid_name_msg("file")))
    }
}

/// Reject text longer than `max` characters.
pub fn check_length(value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        Err(AssetManagerError::Validation(format!(
            "Ensure this field has no more than {max} characters."
        )))
    } else {
        Ok(())
    }
}

/// Reject a batch of inline items that repeat a name.
pub fn check_inline_duplicates<'a>(
    kind: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(AssetManagerError::Validation(duplicate_inline_name_msg(
                kind, name,
            )));
        }
    }
    Ok(())
}

/// Reduce an uploaded file name to its last path component.
///
/// Browsers may send full client paths; only the base name is stored.
pub fn base_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}
