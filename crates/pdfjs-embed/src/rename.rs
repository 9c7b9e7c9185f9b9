use std::path::{Component, Path};

/// Map an absolute source path under `root` to its destination-relative path.
///
/// The result always uses `/` separators so destinations are identical on
/// every platform. Returns `None` when `full_path` is not under `root` or
/// names `root` itself.
pub fn relative_destination(root: &Path, full_path: &Path) -> Option<String> {
    let relative = full_path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join("/"))
}
