use std::path::PathBuf;

const DATA_DIR_ENV: &str = "SALES_COUNT_DATA_DIR";
const DATA_DIR_NAME: &str = "sales-count";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub from_env: bool,
}

pub fn resolve_data_dir() -> Result<DataDirResolution, String> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(DataDirResolution {
            dir: PathBuf::from(dir),
            from_env: true,
        });
    }

    let base = match std::env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.trim().is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
            PathBuf::from(home).join(".local").join("share")
        }
    };

    Ok(DataDirResolution {
        dir: base.join(DATA_DIR_NAME),
        from_env: false,
    })
}
