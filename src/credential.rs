use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const NASA_API_KEY: &str = "NASA_API_KEY";

/// A managed store of secrets looked up by key.
pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Secrets kept in a flat TOML file, e.g. `NASA_API_KEY = "..."`.
pub struct TomlSecrets {
    path: Option<PathBuf>,
}

impl TomlSecrets {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl SecretStore for TomlSecrets {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("no secrets file configured"))?;
        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content)?;
        match table.get(key) {
            None => Ok(None),
            Some(toml::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(anyhow!("secret {} is a {}, not a string", key, other.type_str())),
        }
    }
}

/// Loads `KEY=value` pairs from a `.env` file into the process environment,
/// keeping variables that are already set. Without a path, `.env` is searched
/// from the working directory upwards. A missing file is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to read .env file"),
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves the API credential from the secret store first, then the process
/// environment. Resolution runs once per display cycle and is never cached.
pub struct CredentialResolver {
    secrets: Box<dyn SecretStore>,
    env: EnvLookup,
}

impl CredentialResolver {
    pub fn new(secrets: Box<dyn SecretStore>) -> Self {
        Self {
            secrets,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    pub fn with_env(
        secrets: Box<dyn SecretStore>,
        env: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            secrets,
            env: Box::new(env),
        }
    }

    pub fn resolve(&self, key: &str) -> Option<String> {
        resolve_credential(self.secrets.as_ref(), &*self.env, key)
    }
}

/// Returns the first non-empty value of the secret store and then the
/// environment. A failing secret lookup counts as absent.
pub fn resolve_credential(
    secrets: &dyn SecretStore,
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Option<String> {
    secrets
        .get(key)
        .ok()
        .flatten()
        .filter(|value| !value.is_empty())
        .or_else(|| env(key).filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedSecrets(Result<Option<String>, String>);

    impl SecretStore for FixedSecrets {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    fn env_with(value: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |_| value.map(str::to_string)
    }

    #[test]
    fn test_secret_store_wins_over_env() {
        let secrets = FixedSecrets(Ok(Some("from-secrets".to_string())));
        let key = resolve_credential(&secrets, &env_with(Some("from-env")), NASA_API_KEY);
        assert_eq!(key.as_deref(), Some("from-secrets"));
    }

    #[test]
    fn test_failed_secret_lookup_falls_through() {
        let secrets = FixedSecrets(Err("store unavailable".to_string()));
        let key = resolve_credential(&secrets, &env_with(Some("from-env")), NASA_API_KEY);
        assert_eq!(key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_secret_falls_through() {
        let secrets = FixedSecrets(Ok(Some(String::new())));
        let key = resolve_credential(&secrets, &env_with(Some("from-env")), NASA_API_KEY);
        assert_eq!(key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_absent_everywhere() {
        let secrets = FixedSecrets(Ok(None));
        assert_eq!(resolve_credential(&secrets, &env_with(None), NASA_API_KEY), None);
        assert_eq!(
            resolve_credential(&secrets, &env_with(Some("")), NASA_API_KEY),
            None
        );
    }

    #[test]
    fn test_toml_secrets_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NASA_API_KEY = \"abc123\"\nOTHER = 5").unwrap();
        let store = TomlSecrets::new(Some(file.path().to_path_buf()));
        assert_eq!(store.get(NASA_API_KEY).unwrap().as_deref(), Some("abc123"));
        assert_eq!(store.get("MISSING").unwrap(), None);
        assert!(store.get("OTHER").is_err());
    }

    #[test]
    fn test_missing_secrets_file_resolves_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CredentialResolver::with_env(
            Box::new(TomlSecrets::new(Some(dir.path().join("secrets.toml")))),
            |_| Some("env-key".to_string()),
        );
        assert_eq!(resolver.resolve(NASA_API_KEY).as_deref(), Some("env-key"));
    }

    #[test]
    fn test_malformed_secrets_file_resolves_from_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NASA_API_KEY = ").unwrap();
        let resolver = CredentialResolver::with_env(
            Box::new(TomlSecrets::new(Some(file.path().to_path_buf()))),
            |_| Some("env-key".to_string()),
        );
        assert_eq!(resolver.resolve(NASA_API_KEY).as_deref(), Some("env-key"));
    }

    #[test]
    fn test_dotenv_file_feeds_environment_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "WQDASH_DOTENV_TEST_KEY=from-dotenv\n").unwrap();

        assert_eq!(load_dotenv(Some(&path)).unwrap(), Some(path.clone()));
        let resolver = CredentialResolver::new(Box::new(TomlSecrets::new(None)));
        assert_eq!(
            resolver.resolve("WQDASH_DOTENV_TEST_KEY").as_deref(),
            Some("from-dotenv")
        );
    }

    #[test]
    fn test_missing_dotenv_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv(Some(&dir.path().join(".env"))).unwrap(), None);
    }
}
