pub const DEFAULT_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";
pub const DEFAULT_METRIC: &str = "custom.googleapis.com/sensors/temperature";
pub const DEFAULT_ENDPOINT: &str = "https://monitoring.googleapis.com";

/// Environment variable holding an OAuth bearer token for the monitoring
/// API, e.g. the output of `gcloud auth print-access-token`.
pub const TOKEN_ENV: &str = "MONITORING_TOKEN";
