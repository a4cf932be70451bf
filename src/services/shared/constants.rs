pub const DEFAULT_OUTPUT_PATH: &str = "OUTPUT/PROVENTOS_ACOES.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
