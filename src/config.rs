// Global configuration constants - single source of truth

pub struct Config;

impl Config {
    // Fetch/retry behaviour
    pub const MAX_FETCH_ATTEMPTS: u32 = 3;
    pub const COURTESY_DELAY_MS: u64 = 1000;
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const MAX_REDIRECTS: usize = 10;

    // Hosts involved in the rewrite
    pub const CURRENT_HOST: &'static str = "www.pmg.org.za";
    pub const LEGACY_HOST: &'static str = "legacy.pmg.org.za";

    // Meetings on or after this date keep their current URLs
    pub const CUTOFF_YEAR: i32 = 2015;
    pub const CUTOFF_MONTH: u32 = 1;
    pub const CUTOFF_DAY: u32 = 1;

    // Login page markers
    pub const LOGIN_URL: &'static str = "http://legacy.pmg.org.za/user/login";
    pub const LOGIN_FORM_NAME: &'static str = "login_user_form";
    pub const LOGIN_PROMPT_PATTERN: &'static str = r"Please login first";
    pub const LOGIN_FAILURE_PHRASE: &'static str = "Your password is incorrect";

    // Credential environment variables
    pub const USER_ENV_VAR: &'static str = "PMG_COMMITTEE_USER";
    pub const PASS_ENV_VAR: &'static str = "PMG_COMMITTEE_PASS";

    pub const USER_AGENT: &'static str = "HansardRelink/0.1";
}
