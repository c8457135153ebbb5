//! Lexical path helpers for locating a schema relative to its config

use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory, folding `.` and `..`
/// without touching the filesystem
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Express absolute `target` relative to absolute directory `base`
///
/// Returns `None` when the two paths have no common root (different drives or
/// UNC prefixes on Windows).
#[must_use]
pub fn relative_path(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();

    let target_root = root_of(&target);
    if target_root.is_empty() || target_root != root_of(&base) {
        return None;
    }

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(t, b)| t == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push(Component::ParentDir.as_os_str());
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(Component::CurDir.as_os_str());
    }

    Some(relative)
}

fn root_of<'a, 'p>(components: &'a [Component<'p>]) -> &'a [Component<'p>] {
    let len = components
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .count();
    &components[..len]
}

/// Path to write into a config so it points at `schema_path`
///
/// Relative to the directory holding `config_path` when possible, otherwise
/// the absolute schema path.
pub fn schema_reference_path(config_path: &Path, schema_path: &Path) -> io::Result<PathBuf> {
    let schema = absolutize(schema_path)?;
    let config = absolutize(config_path)?;
    let config_dir = config.parent().unwrap_or(&config);

    Ok(relative_path(&schema, config_dir).unwrap_or(schema))
}
