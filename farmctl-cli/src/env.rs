//! `.env` loading

use tracing::debug;

/// Load `./.env`, then `~/.farmctl/.env`.
///
/// Variables already set in the process are never overwritten, so the
/// current directory wins over the home directory file and both lose to
/// the real environment.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
    }

    let Some(home) = dirs::home_dir() else {
        return;
    };
    let env_file = home.join(".farmctl").join(".env");
    if env_file.exists() {
        match dotenvy::from_path(&env_file) {
            Ok(()) => debug!("Loaded .env from {}", env_file.display()),
            Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
        }
    }
}
