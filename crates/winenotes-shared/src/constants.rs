/// Application name
pub const APP_NAME: &str = "Wine Notes";

/// Collection endpoint (list / create)
pub const WINES_PATH: &str = "/api/wines";

/// Photo upload endpoint (multipart)
pub const UPLOAD_PATH: &str = "/api/upload";

/// Prefix under which uploaded photos are served
pub const UPLOADS_PATH: &str = "/api/uploads";

/// Multipart field carrying the photo bytes
pub const UPLOAD_FIELD: &str = "file";

/// API base used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Marker that starts an inline (data URL) photo
pub const DATA_URL_PREFIX: &str = "data:";

/// Oldest accepted vintage
pub const VINTAGE_MIN: i32 = 1900;

/// Newest vintage the server accepts
pub const SERVER_VINTAGE_MAX: i32 = 2100;

/// Rating bounds (inclusive)
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 10;

/// Rating preselected on a fresh form
pub const DEFAULT_RATING: u8 = 5;

/// Maximum photo upload size in bytes (10 MiB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;
