//! Unbound `local-data` rendering.

use crate::collector::HostMap;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::io;

/// First line of every generated file.
pub const MANAGED_HEADER: &str =
    "# The contents of this file will be overriden to add traefik endpoints dynamically";

/// Rendered include file plus its SHA-256 fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig {
    content: String,
    fingerprint: String,
}

impl RenderedConfig {
    /// File content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Hex-encoded SHA-256 of [`content`](Self::content).
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Renders `hosts` as an Unbound include file.
///
/// ```text
/// # The contents of this file will be overriden to add traefik endpoints dynamically
/// # Endpoints extracted from 10.0.0.5
/// local-data: "a.example.com A 10.0.0.5"
/// local-data: "b.example.com A 10.0.0.5"
/// ```
///
/// The attribution line names the address of the first hostname; it is
/// omitted when there are no hostnames.
#[must_use]
pub fn render(hosts: &HostMap) -> RenderedConfig {
    let mut content = String::with_capacity(MANAGED_HEADER.len() + 1 + hosts.len() * 48);
    content.push_str(MANAGED_HEADER);
    content.push('\n');

    if let Some(first) = hosts.values().next() {
        let _ = writeln!(content, "# Endpoints extracted from {first}");
    }
    for (host, ip) in hosts {
        let _ = writeln!(content, "local-data: \"{host} A {ip}\"");
    }

    let fingerprint = fingerprint(content.as_bytes());
    RenderedConfig {
        content,
        fingerprint,
    }
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Hex-encoded SHA-256 of everything `reader` yields.
///
/// # Errors
///
/// Returns the first read error.
pub fn fingerprint_reader(mut reader: impl io::Read) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn map(entries: &[(&str, [u8; 4])]) -> HostMap {
        entries
            .iter()
            .map(|(h, ip)| ((*h).to_string(), Ipv4Addr::from(*ip)))
            .collect()
    }

    #[test]
    fn renders_sorted_records() {
        let hosts = map(&[
            ("b.example.com", [10, 0, 0, 5]),
            ("a.example.com", [10, 0, 0, 5]),
        ]);
        let rendered = render(&hosts);
        assert_eq!(
            rendered.content(),
            format!(
                "{MANAGED_HEADER}\n\
                 # Endpoints extracted from 10.0.0.5\n\
                 local-data: \"a.example.com A 10.0.0.5\"\n\
                 local-data: \"b.example.com A 10.0.0.5\"\n"
            )
        );
    }

    #[test]
    fn attribution_uses_first_sorted_host() {
        let hosts = map(&[("zeta.lan", [10, 0, 0, 1]), ("alpha.lan", [10, 0, 0, 2])]);
        let rendered = render(&hosts);
        let second = rendered.content().lines().nth(1).unwrap();
        assert_eq!(second, "# Endpoints extracted from 10.0.0.2");
    }

    #[test]
    fn empty_map_renders_header_only() {
        let rendered = render(&HostMap::new());
        assert_eq!(rendered.content(), format!("{MANAGED_HEADER}\n"));
    }

    #[test]
    fn deterministic_output_and_fingerprint() {
        let hosts = map(&[("c.lan", [1, 2, 3, 4]), ("a.lan", [1, 2, 3, 4]), ("b.lan", [4, 3, 2, 1])]);
        let first = render(&hosts);
        let second = render(&hosts);
        assert_eq!(first, second);

        let names: Vec<_> = first
            .content()
            .lines()
            .filter_map(|l| l.strip_prefix("local-data: \""))
            .map(|l| l.split(' ').next().unwrap())
            .collect();
        assert_eq!(names, vec!["a.lan", "b.lan", "c.lan"]);
    }

    #[test]
    fn fingerprint_matches_reader() {
        let rendered = render(&map(&[("a.lan", [10, 0, 0, 1])]));
        let from_reader = fingerprint_reader(rendered.content().as_bytes()).unwrap();
        assert_eq!(rendered.fingerprint(), from_reader);
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
