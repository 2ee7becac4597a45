//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# NeonVibe Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[ai]
provider = "gemini"      # gemini, openrouter
# api_key = ""           # empty = GEMINI_API_KEY / OPENROUTER_API_KEY
# model = ""             # empty = gemini-2.5-flash / anthropic/claude-3.5-sonnet

[ai.endpoints]
# gemini = "https://generativelanguage.googleapis.com/v1beta/models"
# openrouter = "https://openrouter.ai/api/v1/chat/completions"

[ai.http]
# connect_timeout_secs = 10    # 1-3600
# request_timeout_secs = 300   # 1-3600

[logging]
# level = "INFO"         # DEBUG, INFO, WARNING, ERROR

[storage]
# history_file = ""      # empty = <data dir>/neonvibe/history.json
# max_sessions = 100     # 1-10000
"##
    .to_string()
}
