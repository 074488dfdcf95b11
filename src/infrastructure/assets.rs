use std::fs;

/// Where remote assets live when remote storage is on.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://assets.od2net.org/tmp_npt_editor/";

pub struct AssetClient;

impl AssetClient {
    /// Fetches a text asset over HTTP(S), or from disk for any other location.
    pub fn fetch_text(location: &str) -> Result<String, String> {
        if is_remote(location) {
            let response = match reqwest::blocking::get(location) {
                Ok(response) => response,
                Err(e) => return Err(format!("{}: {}", location, e)),
            };
            match response.error_for_status() {
                Ok(response) => response.text().map_err(|e| e.to_string()),
                Err(e) => Err(format!("{}: {}", location, e)),
            }
        } else {
            fs::read_to_string(location).map_err(|e| format!("{}: {}", location, e))
        }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("od.csv");
        fs::write(&path, "from,to,count\nA,B,1\n").unwrap();

        let text = AssetClient::fetch_text(path.to_str().unwrap()).unwrap();
        assert!(text.starts_with("from,to,count"));
    }

    #[test]
    fn test_fetch_missing_local_file() {
        let err = AssetClient::fetch_text("/definitely/not/here.csv").unwrap_err();
        assert!(err.starts_with("/definitely/not/here.csv"));
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://assets.od2net.org/x.csv"));
        assert!(is_remote("http://localhost:8000/x.csv"));
        assert!(!is_remote("data/x.csv"));
    }
}
