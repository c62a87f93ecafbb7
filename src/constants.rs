// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Thumbnail parameters: the preview is bounded to a square box, aspect ratio preserved
pub const THUMBNAIL_SIZE: u32 = 150;
pub const JPEG_QUALITY: u8 = 85;

// Map framing
pub const DEFAULT_ZOOM: u8 = 10;
pub const POPUP_SIZE: u32 = 170;
pub const DEFAULT_OUTPUT: &str = "photo_map.html";

// Candidate files are matched on lowercase extension
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
