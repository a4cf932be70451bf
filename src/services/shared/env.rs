use dotenvy::{dotenv, from_filename, var};

/// Reads a variable after loading the dotenv file matching `RUST_ENV`
/// (`.env.dev` by default, `.env.prod` in production, `.env` otherwise).
pub fn get_env_variable(variable_to_get: &str) -> Option<String> {
    let environment = var("RUST_ENV").unwrap_or_else(|_| "development".into());

    match environment.as_str() {
        "development" => from_filename(".env.dev").ok(),
        "production" => from_filename(".env.prod").ok(),
        _ => dotenv().ok(),
    };
    var(variable_to_get).ok().filter(|value| !value.trim().is_empty())
}
