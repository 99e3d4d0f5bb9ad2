//! Extension to category mapping.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;

use fsaudit_core::ConfigError;

/// Category assigned to extensions missing from the table.
pub const OTHER: &str = "Other";

/// Built-in category table. Later rows win when an extension repeats.
const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Text",
        &[
            "doc", "docx", "docm", "odt", "pdf", "txt", "rtf", "pages", "pfb", "mobi", "chm",
            "tex", "bib", "dvi", "abw", "text", "epub", "nfo", "log", "log1", "log2", "wks",
            "wps", "wpd", "emlx", "utf8", "ichat", "asc", "ott", "fra", "opf",
        ],
    ),
    (
        "Image",
        &[
            "img", "jpg", "jpeg", "png", "png0", "ai", "cr2", "ico", "icon", "jfif", "tiff",
            "tif", "gif", "bmp", "odg", "djvu", "fla", "pic", "ps", "psb", "svg", "dds", "hdr",
            "ithmb", "rds", "heic", "aae", "apalbum", "apfolder", "xmp", "dng", "px", "catalog",
            "ita", "photoscachefile", "visual", "shape", "appicon", "icns",
        ],
    ),
    (
        "Development",
        &[
            "py", "h", "m", "jar", "cs", "c", "c#", "cpp", "c++", "class", "java", "php", "phps",
            "php5", "htm", "html", "css", "xml", "3mf", "o", "obj", "json", "jsonp", "blg", "bbl",
            "j", "jav", "bash", "bsh", "sh", "rb", "vb", "vbscript", "vbs", "vhd", "vmwarevm",
            "js", "jsp", "xhtml", "md5", "nib", "strings", "frm", "myd", "myi", "props",
            "vcxproj", "vs", "lst", "sol", "vbox", "vbox-prev", "pch", "pdb", "lib", "nas",
            "assets", "sql", "sqlite-wal", "rss", "swift", "xsl", "manifest", "up_meta",
            "down_meta", "woff", "dist", "sublime-snippet", "d", "ashx", "tpm", "dsw", "hpp",
            "tga", "kf", "rq", "rdf", "ttl", "pyc", "pyo", "s", "lua", "vim", "p", "dashtoc",
        ],
    ),
    (
        "Spreadsheet",
        &["csv", "odf", "ods", "xlr", "xls", "xlsx", "numbers", "xlk"],
    ),
    (
        "System",
        &[
            "bif", "shs", "ds_store", "gadget", "so", "idx", "ipmeta", "sys", "dll", "dylib",
            "etl", "regtrans-ms", "key", "lock", "man", "inf", "x86", "dev", "config", "cfg",
            "cpl", "cur", "dmp", "drv", "mot", "ko", "supported", "pxe", "cgz", "0", "file",
            "install", "desktop", "ttc", "ttf", "fnt", "fon", "otf", "download", "acsm", "ini",
            "opt", "dat", "sav", "save", "aux", "raw", "temp", "tmp", "1", "2", "3", "4", "5",
            "6", "7", "8", "9", "10", "cache", "ipsw", "stt", "part", "appcache", "sbstore",
            "gpd", "sqm", "emf", "jrs", "pri", "vcrd", "mui", "localstorage",
            "localstorage-journal", "data", "crash", "webhistory", "settingcontent-ms", "itc",
            "atx", "apversion", "apmaster", "apdetected", "pos", "glk", "blob", "cat", "sns",
            "adv", "asd", "lrprev", "csl", "rdl", "sthlp", "tm2", "mcdb", "fragment", "nif",
            "blockdata", "continuousdata", "upk", "znb", "xnb", "idrc", "model", "primitives",
            "ovl", "sid", "stringtable", "foliage", "civ4savedgame", "cgs", "thewitchersave",
            "pssg", "pac", "unity3d", "ifi", "vmt", "vtf", "pfm", "deu", "map", "simss",
        ],
    ),
    (
        "Executable",
        &["exe", "bat", "dmg", "msi", "bin", "pak", "app", "com", "application"],
    ),
    (
        "Archive",
        &[
            "zip", "gz", "rar", "cab", "iso", "tar", "lzma", "bz2", "pkg", "xz", "7z", "vdi",
            "ova", "rpm", "z", "tgz", "deb", "vcd", "ost", "vmdk", "001", "002", "003", "004",
            "005", "006", "007", "008", "009", "arj", "package", "ims",
        ],
    ),
    ("Backup", &["bak", "backup", "back"]),
    (
        "Audio",
        &[
            "mp3", "m3u", "m4a", "wav", "ogg", "flac", "midi", "oct", "aac", "aiff", "aif", "wma",
            "pcm", "cda", "mid", "mpa", "ens", "adg", "dmpatch", "sngw", "seq", "wem", "mtp",
            "l6t", "lng", "adx", "link",
        ],
    ),
    (
        "Database",
        &[
            "accdb", "accde", "mdb", "mde", "odb", "db", "gdbtable", "gdbtablx", "gdbindexes",
            "sqlite", "enz", "enl", "sdf", "hdb", "cdb", "gdb", "cif", "xyz", "mat", "bgl", "r",
            "exp", "asy", "info", "meta", "adf", "appinfo", "xg0", "yg0",
        ],
    ),
    ("Presentation", &["ppt", "pptx", "pps", "ppsx", "odp", "key"]),
    (
        "Video",
        &[
            "mpg", "mpeg", "avi", "mp4", "flv", "h264", "mov", "mk4", "swf", "wmv", "mkv",
            "plist", "m4v", "trec", "3g2", "3gp", "rm", "vob",
        ],
    ),
    ("Bookmark", &["torrent", "url"]),
    (
        "PIM",
        &[
            "dbx", "eml", "msg", "ics", "pst", "vcf", "gdb", "ofx", "qif", "rem", "tax", "qbmb",
            "one", "note", "olk14message", "olk14msgattach", "olk14folder", "olkmsgsource",
            "olk14msgsource", "olk15message", "olk15messageattachment", "olk14event",
            "olk15msgattachment", "olk15msgsource", "vcs", "hbk",
        ],
    ),
    ("Shortcut", &["lnk"]),
];

static BUILTIN: LazyLock<ExtensionClassifier> = LazyLock::new(|| {
    ExtensionClassifier::from_table(
        BUILTIN_CATEGORIES
            .iter()
            .map(|(category, extensions)| (*category, extensions.iter().copied())),
    )
});

/// Immutable extension → category lookup.
///
/// Lookups ignore case and an optional leading dot, so `".JPG"`, `"jpg"` and
/// `".jpg"` all classify the same way.
#[derive(Debug, Clone, Default)]
pub struct ExtensionClassifier {
    by_extension: HashMap<String, String>,
    categories: Vec<String>,
}

impl ExtensionClassifier {
    /// The built-in table, built once per process.
    pub fn builtin() -> &'static ExtensionClassifier {
        &BUILTIN
    }

    /// Build a classifier from `(category, extensions)` rows.
    pub fn from_table<C, I, E>(rows: impl IntoIterator<Item = (C, I)>) -> Self
    where
        C: AsRef<str>,
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let mut classifier = Self::default();
        for (category, extensions) in rows {
            let category = category.as_ref().to_string();
            for extension in extensions {
                classifier
                    .by_extension
                    .insert(normalize(extension.as_ref()), category.clone());
            }
            if !classifier.categories.contains(&category) {
                classifier.categories.push(category);
            }
        }
        classifier
    }

    /// Parse a JSON object of `{"Category": [".ext", ...]}`.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::Categories {
            origin: origin.to_string(),
            message,
        };

        let table: IndexMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

        for (category, extensions) in &table {
            if category.trim().is_empty() {
                return Err(invalid("category names must not be empty".to_string()));
            }
            if extensions.iter().any(|ext| normalize(ext).is_empty()) {
                return Err(invalid(format!("category {category:?} lists an empty extension")));
            }
        }

        Ok(Self::from_table(table))
    }

    /// Load a JSON category table from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    /// Category for `extension`, or [`OTHER`].
    pub fn classify(&self, extension: &str) -> &str {
        self.by_extension
            .get(&normalize(extension))
            .map(String::as_str)
            .unwrap_or(OTHER)
    }

    /// Category names in table order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of mapped extensions.
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    /// Check if the table maps nothing.
    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

/// Classify with the built-in table.
pub fn classify(extension: &str) -> &'static str {
    ExtensionClassifier::builtin().classify(extension)
}

fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
