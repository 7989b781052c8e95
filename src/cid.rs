// src/cid.rs
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn cid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(Qm[1-9A-HJ-NP-Za-km-z]{44}|baf[a-z2-7]{55,59})$").expect("static CID pattern")
    })
}

/// CIDv0 (`Qm...`, base58) or CIDv1 (`baf...`, base32) check, after trimming.
pub fn is_valid_cid(candidate: &str) -> bool {
    cid_pattern().is_match(candidate.trim())
}

pub fn validate_cid(candidate: &str) -> crate::Result<String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::Validation("Please enter a CID".to_string()));
    }
    if !is_valid_cid(trimmed) {
        return Err(crate::Error::InvalidCid(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Percent-encode a composite identifier for use as a query parameter.
pub fn encode_query(query: &str) -> String {
    urlencoding::encode(query).into_owned()
}

pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// A base CID plus the folder path beneath it, e.g. `Qm.../photos/2024`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CidPath {
    pub base: String,
    pub segments: Vec<String>,
}

impl CidPath {
    pub fn parse(query: &str) -> Self {
        let mut parts = query.trim().split('/').filter(|p| !p.is_empty());
        let base = parts.next().unwrap_or_default().to_string();
        let segments = parts.map(str::to_string).collect();
        CidPath { base, segments }
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn to_query(&self) -> String {
        join_query(&self.base, &self.segments)
    }
}

pub fn join_query(base: &str, segments: &[String]) -> String {
    if segments.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, segments.join("/"))
    }
}

impl fmt::Display for CidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V0: &str = "QmT78zSuBmuS4z925WZfrqQ1qHaJ56DQaTfyMUF7F8ff91";

    #[test]
    fn test_accepts_v0_cid() {
        assert_eq!(V0.len(), 46);
        assert!(is_valid_cid(V0));
        assert!(is_valid_cid(&format!("  {}  ", V0)));
    }

    #[test]
    fn test_accepts_v1_cid() {
        let v1 = format!("bafy{}", "b".repeat(55));
        assert!(v1.len() >= 58);
        assert!(is_valid_cid(&v1));
        assert!(is_valid_cid("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(!is_valid_cid("not-a-cid"));
        assert!(!is_valid_cid(""));
        // base58 excludes 0, O, I and l
        assert!(!is_valid_cid("Qm0000000000000000000000000000000000000000000"));
        assert!(!is_valid_cid(&format!("{}/docs", V0)));
    }

    #[test]
    fn test_validate_cid_errors() {
        assert!(matches!(validate_cid("   "), Err(crate::Error::Validation(_))));
        assert!(matches!(validate_cid("not-a-cid"), Err(crate::Error::InvalidCid(_))));
        assert_eq!(validate_cid(&format!(" {} ", V0)).unwrap(), V0);
    }

    #[test]
    fn test_parse_composite_query() {
        let parsed = CidPath::parse("QmBase/photos//2024/");
        assert_eq!(parsed.base, "QmBase");
        assert_eq!(parsed.segments, vec!["photos", "2024"]);
        assert_eq!(parsed.to_query(), "QmBase/photos/2024");
        assert_eq!(CidPath::parse("QmBase").to_query(), "QmBase");
        assert!(CidPath::parse("").is_empty());
    }

    #[test]
    fn test_path_and_encoding() {
        let parsed = CidPath::parse("QmBase/a/b c");
        assert_eq!(parsed.path(), "a/b c");
        assert_eq!(CidPath::parse("QmBase").path(), "");
        assert_eq!(encode_query("QmBase/a b"), "QmBase%2Fa%20b");
        assert_eq!(decode_segment("b%20c"), "b c");
        assert_eq!(decode_segment("100%"), "100%");
    }
}
