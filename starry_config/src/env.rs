use crate::ConfigError;
use std::{fmt::Display, fs, path::PathBuf, str::FromStr};

/// Reads overrides out of the environment.
///
/// `KEY_FILE` points at a file holding the value (docker/k8s secrets) and beats `KEY`.
pub(crate) struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub(crate) fn new(lookup: F) -> Self {
        Self { lookup }
    }

    pub(crate) fn is_provided(&self, key: &str) -> bool {
        (self.lookup)(&format!("{}_FILE", key)).is_some() || (self.lookup)(key).is_some()
    }

    pub(crate) fn string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        if let Some(path) = (self.lookup)(&format!("{}_FILE", key)) {
            let contents =
                fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
                    key: key.to_string(),
                    path: PathBuf::from(path),
                    source,
                })?;
            return Ok(Some(strip_trailing_newline(contents)));
        }
        Ok((self.lookup)(key))
    }

    pub(crate) fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.string(key)? {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }
}

fn strip_trailing_newline(mut s: String) -> String {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn source(vars: &[(&str, &str)]) -> EnvSource<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvSource::new(move |k| map.get(k).cloned())
    }

    #[test]
    fn file_beats_plain_variable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let env = source(&[("DISCORD_TOKEN", "plain"), ("DISCORD_TOKEN_FILE", path.as_str())]);
        assert_eq!(
            env.string("DISCORD_TOKEN").unwrap().as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn missing_secret_file_is_an_error() {
        let env = source(&[("DATABASE_PASSWORD_FILE", "/definitely/not/here")]);
        match env.string("DATABASE_PASSWORD") {
            Err(ConfigError::SecretFile { key, .. }) => assert_eq!(key, "DATABASE_PASSWORD"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_names_the_key() {
        let env = source(&[("MINIMUM_REACTIONS", "lots")]);
        match env.parse::<i16>("MINIMUM_REACTIONS") {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "MINIMUM_REACTIONS"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(env.parse::<u16>("METRICS_PORT").unwrap(), None);
    }

    #[test]
    fn only_trailing_newlines_are_stripped() {
        assert_eq!(strip_trailing_newline("a b\r\n\n".to_string()), "a b");
        assert_eq!(strip_trailing_newline("  padded  ".to_string()), "  padded  ");
    }
}
