pub mod overrides;
pub mod price;

pub const EXIT_OK: u8 = 0;
pub const EXIT_PRICING_FAILURE: u8 = 1;
pub const EXIT_CONFIG_FAILURE: u8 = 2;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: EXIT_OK, output: output.into() }
    }

    pub fn failure(output: impl Into<String>, exit_code: u8) -> Self {
        Self { exit_code, output: output.into() }
    }
}
