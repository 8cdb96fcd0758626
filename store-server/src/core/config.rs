/// Server configuration - all settings for the store backend
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/petal/store | working directory (db, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | {WORK_DIR}/store.db | SQLite database file |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | STORE_BASE_URL | http://localhost:3000 | public base URL (links, redirects) |
/// | RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET | unset | gateway creds; unset enables mock sessions |
/// | PHONEPE_MERCHANT_ID / PHONEPE_SALT_KEY / PHONEPE_SALT_INDEX | unset / 1 | PhonePe checksum inputs |
/// | PHONEPE_BASE_URL | sandbox | PhonePe API host |
/// | DELHIVERY_API_TOKEN / DELHIVERY_BASE_URL | unset / production | carrier tracking |
/// | RAPIDSHYP_EMAIL / RAPIDSHYP_PASSWORD / RAPIDSHYP_BASE_URL | unset | carrier tracking (token login) |
/// | WHATSAPP_TOKEN / WHATSAPP_PHONE_NUMBER_ID | unset | WhatsApp Cloud API |
/// | SMTP_HOST / SMTP_PORT / SMTP_USERNAME / SMTP_PASSWORD / SMTP_FROM | unset | transactional mail |
/// | GEO_API_URL | http://ip-api.com/json | reverse-IP geolocation |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Public base URL used in recovery links and payment redirects
    pub store_base_url: String,

    pub razorpay: RazorpayConfig,
    pub phonepe: PhonePeConfig,
    pub delhivery: DelhiveryConfig,
    pub rapidshyp: RapidShypConfig,
    pub whatsapp: WhatsAppConfig,
    pub smtp: SmtpConfig,

    /// Reverse-IP geolocation endpoint (ip-api style JSON)
    pub geo_api_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
}

impl RazorpayConfig {
    /// Without credentials the gateway runs in mock mode for local testing
    pub fn is_configured(&self) -> bool {
        self.key_id.is_some() && self.key_secret.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct PhonePeConfig {
    pub merchant_id: Option<String>,
    pub salt_key: Option<String>,
    pub salt_index: String,
    pub base_url: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct DelhiveryConfig {
    pub api_token: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RapidShypConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct WhatsAppConfig {
    pub token: Option<String>,
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/petal/store".into());
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| format!("{work_dir}/store.db"));

        Self {
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            store_base_url: std::env::var("STORE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            razorpay: RazorpayConfig {
                key_id: env_opt("RAZORPAY_KEY_ID"),
                key_secret: env_opt("RAZORPAY_KEY_SECRET"),
            },
            phonepe: PhonePeConfig {
                merchant_id: env_opt("PHONEPE_MERCHANT_ID"),
                salt_key: env_opt("PHONEPE_SALT_KEY"),
                salt_index: std::env::var("PHONEPE_SALT_INDEX").unwrap_or_else(|_| "1".into()),
                base_url: std::env::var("PHONEPE_BASE_URL")
                    .unwrap_or_else(|_| "https://api-preprod.phonepe.com/apis/pg-sandbox".into()),
                redirect_url: std::env::var("PHONEPE_REDIRECT_URL").unwrap_or_else(|_| {
                    let base =
                        std::env::var("STORE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
                    format!("{base}/payment/callback")
                }),
            },
            delhivery: DelhiveryConfig {
                api_token: env_opt("DELHIVERY_API_TOKEN"),
                base_url: std::env::var("DELHIVERY_BASE_URL")
                    .unwrap_or_else(|_| "https://track.delhivery.com".into()),
            },
            rapidshyp: RapidShypConfig {
                email: env_opt("RAPIDSHYP_EMAIL"),
                password: env_opt("RAPIDSHYP_PASSWORD"),
                base_url: std::env::var("RAPIDSHYP_BASE_URL")
                    .unwrap_or_else(|_| "https://api.rapidshyp.com".into()),
            },
            whatsapp: WhatsAppConfig {
                token: env_opt("WHATSAPP_TOKEN"),
                phone_number_id: env_opt("WHATSAPP_PHONE_NUMBER_ID"),
            },
            smtp: SmtpConfig {
                host: env_opt("SMTP_HOST"),
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: env_opt("SMTP_USERNAME"),
                password: env_opt("SMTP_PASSWORD"),
                from: env_opt("SMTP_FROM"),
            },

            geo_api_url: std::env::var("GEO_API_URL")
                .unwrap_or_else(|_| "http://ip-api.com/json".into()),
        }
    }

    /// Override a subset of settings, mainly for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        let work_dir = work_dir.into();
        config.database_path = format!("{work_dir}/store.db");
        config.work_dir = work_dir;
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
