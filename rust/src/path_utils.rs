use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pagecraft.toml";

pub fn get_base_dir() -> PathBuf {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if has_config_candidate(&exe_dir) {
        return exe_dir;
    }

    if let Ok(cwd) = env::current_dir() {
        if has_config_candidate(&cwd) {
            return cwd;
        }
    }

    exe_dir
}

pub fn resolve_config_path(raw: Option<PathBuf>, base_dir: &Path) -> PathBuf {
    if let Some(path) = raw {
        if path.is_absolute() {
            return path;
        }
        if let Ok(cwd) = env::current_dir() {
            return cwd.join(path);
        }
        return path;
    }

    config_candidates(base_dir)
        .into_iter()
        .find(|path| path.exists())
        .unwrap_or_else(|| base_dir.join(CONFIG_FILE_NAME))
}

fn config_candidates(base_dir: &Path) -> [PathBuf; 2] {
    [
        base_dir.join(CONFIG_FILE_NAME),
        base_dir.join("config").join(CONFIG_FILE_NAME),
    ]
}

fn has_config_candidate(base_dir: &Path) -> bool {
    config_candidates(base_dir).iter().any(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::{resolve_config_path, CONFIG_FILE_NAME};
    use std::fs;
    use std::path::PathBuf;

    fn fixture_dir(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("page_craft_paths_{}_{}", name, std::process::id()));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).expect("fixture dir");
        dir
    }

    #[test]
    fn explicit_absolute_path_wins() {
        let dir = fixture_dir("explicit");
        let explicit = dir.join("custom.toml");
        assert_eq!(resolve_config_path(Some(explicit.clone()), &dir), explicit);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn finds_config_subdirectory_then_defaults_to_base() {
        let dir = fixture_dir("lookup");
        assert_eq!(resolve_config_path(None, &dir), dir.join(CONFIG_FILE_NAME));

        let nested = dir.join("config").join(CONFIG_FILE_NAME);
        fs::create_dir_all(nested.parent().expect("parent")).expect("config dir");
        fs::write(&nested, "").expect("nested config");
        assert_eq!(resolve_config_path(None, &dir), nested);

        fs::write(dir.join(CONFIG_FILE_NAME), "").expect("base config");
        assert_eq!(resolve_config_path(None, &dir), dir.join(CONFIG_FILE_NAME));

        fs::remove_dir_all(dir).ok();
    }
}
