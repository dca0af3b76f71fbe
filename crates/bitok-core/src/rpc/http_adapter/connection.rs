use std::path::Path;

use reqwest::Url;

use crate::error::CoreError;

/// Resolve the basic-auth credentials sent with every request.
///
/// Precedence: explicit `user` + `pass`, then a cookie file holding
/// `username:password`, then empty credentials. The node expects an
/// `Authorization` header even when both halves are empty.
pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
    cookie_file: Option<&Path>,
) -> Result<(String, String), CoreError> {
    match (user, pass) {
        (Some(u), Some(p)) => return Ok((u.to_owned(), p.to_owned())),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CoreError::Config(
                "both rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    let Some(cookie_file) = cookie_file else {
        return Ok((String::new(), String::new()));
    };

    let content = std::fs::read_to_string(cookie_file).map_err(|e| {
        CoreError::Config(format!(
            "failed to read rpc cookie file {}: {e}",
            cookie_file.display()
        ))
    })?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| {
            CoreError::Config(format!(
                "rpc cookie file {} is empty",
                cookie_file.display()
            ))
        })?;

    let (cookie_user, cookie_pass) = line.split_once(':').ok_or_else(|| {
        CoreError::Config(format!(
            "rpc cookie file {} must contain `username:password`",
            cookie_file.display()
        ))
    })?;

    Ok((cookie_user.to_owned(), cookie_pass.to_owned()))
}

pub(super) fn parse_connection(connection: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::Config(format!(
            "invalid connection `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(connection.to_owned()),
        other => Err(CoreError::Config(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}
