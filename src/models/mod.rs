pub mod item;
pub mod source;

pub use item::*;
pub use source::*;

/// Label in front of the source name on every news caption.
pub const ATTRIBUTION_LABEL: &str = "المصدر:";

/// Button label used by the news channels.
pub const FULL_ARTICLE_LABEL: &str = "الخبر كامل من الموقع الرسمي";

/// Button label used by the CVE channel.
pub const CVE_DETAILS_LABEL: &str = "Full details on CVE Details";
