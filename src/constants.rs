// Takeout Reconcile Constants
// Limits and names observed in photo-backup exports. Changing them changes which files pair up.

// Scanning
pub const METADATA_EXTENSION: &str = "json";
pub const EXPORT_MANIFEST_FILENAME: &str = "metadata.json";
pub const HOUSEKEEPING_FILENAMES: [&str; 3] = [".DS_Store", "Thumbs.db", "desktop.ini"];

// Filename normalization
pub const MAX_TITLE_FILENAME_CHARS: usize = 51;
pub const UNSAFE_TITLE_CHARS: [char; 2] = ['\'', ';'];
pub const UNSAFE_TITLE_REPLACEMENT: char = '_';
pub const DUPLICATE_SUFFIX_PATTERN: &str = r"\(\d+\)";

// Output naming
pub const MAX_NAME_COUNTER: u32 = 999;
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

// Formats the tagging tool cannot write; these are byte-copied instead
pub const COPY_ONLY_EXTENSIONS: [&str; 4] = ["bmp", "avi", "wmv", "mkv"];

// Tagging tool
pub const JPEG_MISMATCH_SIGNATURE: &str = "looks more like a JPEG";
pub const JPEG_EXTENSION: &str = "jpg";
pub const GPS_LATITUDE_REF: &str = "N";
pub const GPS_LONGITUDE_REF: &str = "E";
pub const GPS_ALTITUDE_REF: &str = "Above Sea Level";
pub const DESCRIPTION_LINE_SEPARATOR: &str = " ; ";

// Run log
pub const DEFAULT_LOG_FILENAME: &str = "execution.log";
pub const EXIFTOOL_PATH_ENV: &str = "TAKEOUT_EXIFTOOL_PATH";
