/// Turns a `serenity::Error` into a human readable description.
#[macro_export]
macro_rules! describe_serenity_error {
    ($e:expr) => {{
        use std::io::ErrorKind as IoErrorKind;
        use $crate::__private::serde_json::error::Category;
        use $crate::__private::serenity::http::HttpError;
        use $crate::__private::serenity::Error;
        match &$e {
            Error::Decode(reason, _) => {
                format!(
                    "Something went wrong while decoding Discord's response... try again? {}",
                    reason
                )
            }
            Error::Format(err) => {
                format!(
                    "Something went wrong while formatting a response... try again? {}",
                    err
                )
            }
            Error::Io(err) => {
                let err_msg1 = match err.kind() {
                    IoErrorKind::NotFound => "Resource not found",
                    IoErrorKind::PermissionDenied => "Permission denied for resource",
                    IoErrorKind::ConnectionRefused => "Remote server refused connection",
                    IoErrorKind::ConnectionReset => "Remote server reset connection",
                    IoErrorKind::ConnectionAborted => "Remote server aborted connection",
                    IoErrorKind::NotConnected => "Network not connected yet",
                    IoErrorKind::BrokenPipe => "Broken pipe/pipe was closed",
                    IoErrorKind::TimedOut => "IO timeout reached",
                    IoErrorKind::UnexpectedEof => "Premature end of file",
                    _ => "Unknown error",
                };
                format!(
                    "A basic input/output error happened... try again? {} ({})",
                    err_msg1, err
                )
            }
            Error::Json(err) => {
                let err_msg1 = match err.classify() {
                    Category::Io => "Basic IO error",
                    Category::Syntax => "Invalid syntax",
                    Category::Data => "Wrong data type",
                    Category::Eof => "Premature end of file",
                };
                format!(
                    "Something went wrong while deserializing Discord's JSON response... try again? {} (l {} c {})",
                    err_msg1,
                    err.line(),
                    err.column()
                )
            }
            Error::Model(err) => {
                format!("Something went wrong while executing a action. {}", err)
            }
            Error::ExceededLimit(_, _) => {
                "Hit a limit when trying to do something... try again?".to_string()
            }
            Error::NotInRange(input, value, min, max) => {
                format!(
                    "Input {} not in range. (val {}, min {}, max {})",
                    input, value, min, max
                )
            }
            Error::Other(msg) => {
                format!("Some other error happened. {}", msg)
            }
            Error::Url(msg) => {
                format!("Failed to parse a URL. {}", msg)
            }
            Error::Client(err) => {
                format!("A client error happened. This is probably fatal. {}", err)
            }
            Error::Gateway(err) => {
                format!("A gateway error happened... try again? {}", err)
            }
            Error::Http(err) => {
                let err: &HttpError = err;
                let err_msg1 = match err {
                    HttpError::UnsuccessfulRequest(response) => format!(
                        "Discord answered {} to {}: {}",
                        response.status_code.as_u16(),
                        response.url,
                        response.error.message
                    ),
                    other => other.to_string(),
                };
                format!("A HTTP error happened... try again? {}", err_msg1)
            }
            _ => "Some other unknown error happened... try again?".to_string(),
        }
    }};
}

/// Logs a `serenity::Error` we can't do anything about.
#[macro_export]
macro_rules! handle_serenity_error {
    ($e:expr) => {{
        let description = $crate::describe_serenity_error!($e);
        $crate::__private::tracing::warn!("{}", description);
    }};
}

#[cfg(test)]
mod tests {
    use serenity::Error;

    #[test]
    fn describes_plain_errors() {
        let e = Error::Other("the pipes are clogged");
        assert_eq!(
            crate::describe_serenity_error!(e),
            "Some other error happened. the pipes are clogged"
        );

        let e = Error::NotInRange("limit", 200, 1, 100);
        assert_eq!(
            crate::describe_serenity_error!(e),
            "Input limit not in range. (val 200, min 1, max 100)"
        );
    }

    #[test]
    fn describes_json_errors() {
        let json_err = serde_json::from_str::<u8>("{").unwrap_err();
        let e = Error::Json(json_err);
        assert!(crate::describe_serenity_error!(e).contains("Premature end of file"));
    }

    #[test]
    fn handle_does_not_consume() {
        let e = Error::Url("not a url".to_string());
        crate::handle_serenity_error!(e);
        assert!(matches!(e, Error::Url(_)));
    }
}
