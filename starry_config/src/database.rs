use serde::{Deserialize, Serialize};

/// A enum that specifies the type of database connection to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConnection {
    /// Use a TCP socket to connect to the database.
    /// The first item is the host, and the second is the port.
    TcpSocket(String, u16),
    /// Use a Unix socket to connect to the database.
    /// The only item is the socket directory.
    UnixSocket(String),
}

/// The `[database]` table of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) db: Option<String>,
    pub(crate) unix_socket: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            db: None,
            unix_socket: None,
        }
    }
}

impl DatabaseConfig {
    /// Get the database login.
    ///
    /// Returned tuple is user, password, and database respectively.
    /// Postgres falls back to a database named after the user, so we do too.
    pub fn db_login(&self) -> (&str, &str, &str) {
        (
            &self.user,
            &self.password,
            self.db.as_deref().unwrap_or(&self.user),
        )
    }

    /// Get the database connection.
    ///
    /// A configured unix socket wins over host/port.
    pub fn db_connection(&self) -> DatabaseConnection {
        match &self.unix_socket {
            Some(socket) => DatabaseConnection::UnixSocket(socket.clone()),
            None => DatabaseConnection::TcpSocket(self.host.clone(), self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_defaults_to_user_name() {
        let cfg = DatabaseConfig {
            user: "starry".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(cfg.db_login(), ("starry", "", "starry"));
    }

    #[test]
    fn unix_socket_wins_over_tcp() {
        let mut cfg = DatabaseConfig::default();
        assert_eq!(
            cfg.db_connection(),
            DatabaseConnection::TcpSocket("localhost".to_string(), 5432)
        );
        cfg.unix_socket = Some("/var/run/postgresql/".to_string());
        assert_eq!(
            cfg.db_connection(),
            DatabaseConnection::UnixSocket("/var/run/postgresql/".to_string())
        );
    }
}
