use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve the application home directory to an absolute path.
///
/// `configured` may start with `~`, which expands to the user's home. When it
/// is `None` the directory is `<user home>/<default_subdir>`. Relative paths
/// are taken against the current working directory.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => user_home()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().context("user home directory is not known on this platform")
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(Path::new(raw).to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a/b");

        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".x", true).unwrap();

        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_expands_to_user_home() {
        let resolved = resolve_home_dir(Some("~/.roomcheck_t".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".roomcheck_t"));
        assert!(!resolved.to_string_lossy().contains('~'));
    }

    #[test]
    fn relative_path_is_anchored_to_cwd() {
        let resolved = resolve_home_dir(Some("data/home".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data/home"));
    }
}
