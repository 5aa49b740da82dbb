//! Static file serving.

use std::path::{Component, Path, PathBuf};

use http::StatusCode;
use tracing::debug;

use crate::context::Context;
use crate::handler::Handler;
use crate::response::ContentType;

/// A handler serving files below `root`.
///
/// The file is named by the `filepath` path parameter, so the handler is
/// meant for a route ending in `*filepath` (see
/// [`RouterGroup::static_files`](crate::RouterGroup::static_files)).
/// Missing files, directories and paths that try to leave `root` all get a
/// bodiless `404`.
pub fn serve_dir(root: PathBuf) -> impl Handler {
    move |c: &mut Context| {
        let Some(file) = c.param("filepath").and_then(|rel| resolve(&root, rel)) else {
            c.status(StatusCode::NOT_FOUND);
            return;
        };

        match std::fs::read(&file) {
            Ok(bytes) => {
                let ext = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
                c.writer_mut().set_content_type(ContentType::from_extension(ext));
                c.data(StatusCode::OK, &bytes);
            }
            Err(e) => {
                debug!(file = %file.display(), "static file unavailable: {e}");
                c.status(StatusCode::NOT_FOUND);
            }
        }
    }
}

/// Joins `rel` onto `root`, refusing anything but plain file names.
fn resolve(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            _ => return None,
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_nested_file() {
        let path = resolve(Path::new("/srv/static"), "css/a.css").unwrap();
        assert_eq!(path, Path::new("/srv/static/css/a.css"));
    }

    #[test]
    fn refuses_traversal() {
        assert!(resolve(Path::new("/srv/static"), "../etc/passwd").is_none());
        assert!(resolve(Path::new("/srv/static"), "css/../../x").is_none());
        assert!(resolve(Path::new("/srv/static"), "/etc/passwd").is_none());
    }
}
