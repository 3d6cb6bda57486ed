//! Domain argument validation

use anyhow::{Result, bail};

/// Normalize and validate a domain name given on the command line
///
/// Basic RFC 1035 checks: at least two labels, each 1-63 alphanumerics or
/// hyphens not starting or ending with a hyphen, 253 characters overall.
pub fn parse_domain(raw: &str) -> Result<String> {
    let domain = raw.trim().trim_end_matches('.').to_ascii_lowercase();

    if domain.is_empty() {
        bail!("Domain name cannot be empty");
    }
    if domain.len() > 253 {
        bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }
    if !domain.contains('.') {
        bail!("Domain name must include a TLD (e.g. example.com). Got: {}", domain);
    }

    for label in domain.split('.') {
        if label.is_empty() {
            bail!("Domain name has empty label: '{}'", domain);
        }
        if label.len() > 63 {
            bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }
        if label.starts_with('-') || label.ends_with('-') {
            bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_whitespace_and_root_dot() {
        assert_eq!(parse_domain("  Example.COM. ").unwrap(), "example.com");
        assert_eq!(parse_domain("my-site.co.uk").unwrap(), "my-site.co.uk");
    }

    #[test]
    fn test_rejects_missing_tld() {
        assert!(parse_domain("localhost").is_err());
        assert!(parse_domain("").is_err());
        assert!(parse_domain("   ").is_err());
    }

    #[test]
    fn test_rejects_bad_labels() {
        assert!(parse_domain("example..com").is_err());
        assert!(parse_domain("-example.com").is_err());
        assert!(parse_domain("example-.com").is_err());
        assert!(parse_domain("exa_mple.com").is_err());
        assert!(parse_domain("exämple.com").is_err());
        assert!(parse_domain(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_rejects_overlong_name() {
        let long = format!("{}.com", vec!["a".repeat(60); 5].join("."));
        assert!(long.len() > 253);
        assert!(parse_domain(&long).is_err());
    }
}
